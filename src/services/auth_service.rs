use crate::database::DbPool;
use crate::entities::{UserRole, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};

#[derive(Clone)]
pub struct AuthService {
    pool: DbPool,
    jwt_service: JwtService,
    referral_bonus: i64,
}

impl AuthService {
    pub fn new(pool: DbPool, jwt_service: JwtService, referral_bonus: i64) -> Self {
        Self {
            pool,
            jwt_service,
            referral_bonus: referral_bonus.max(0),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let name = require_text("Name", &request.name, 100)?;
        let email = normalize_email(&request.email)?;
        let phone = validate_phone(&request.phone)?;
        validate_password(&request.password)?;

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .count(self.pool.as_ref())
            .await?;
        if existing > 0 {
            return Err(AppError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }

        // Referrer lookup by the code the new user was given
        let referrer = match request
            .referral_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            Some(code) => {
                let referrer = users::Entity::find()
                    .filter(users::Column::ReferralCode.eq(code.to_uppercase()))
                    .one(self.pool.as_ref())
                    .await?
                    .ok_or_else(|| AppError::ValidationError("Invalid referral code".to_string()))?;
                Some(referrer)
            }
            None => None,
        };

        let password_hash = hash_password(&request.password)?;
        let referral_code = generate_unique_referral_code(self.pool.as_ref()).await?;
        let now = Utc::now();

        let txn = self.pool.begin().await?;

        let user = users::ActiveModel {
            name: Set(name),
            email: Set(email),
            password_hash: Set(password_hash),
            phone: Set(phone),
            is_email_verified: Set(false),
            referral_code: Set(referral_code),
            referred_by: Set(referrer.as_ref().map(|r| r.id)),
            wallet_balance: Set(0),
            role: Set(UserRole::User),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(referrer) = &referrer
            && self.referral_bonus > 0
        {
            users::Entity::update_many()
                .col_expr(
                    users::Column::WalletBalance,
                    Expr::col(users::Column::WalletBalance).add(self.referral_bonus),
                )
                .col_expr(users::Column::UpdatedAt, Expr::value(now))
                .filter(users::Column::Id.eq(referrer.id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        log::info!(
            "Registered user {} (referred_by={:?})",
            user.id,
            user.referred_by
        );

        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = request.email.trim().to_lowercase();

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            log::warn!("Failed login for user {}", user.id);
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        self.issue_tokens(user)
    }

    /// Rotates both tokens; the role is re-read so promotions apply on refresh.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        self.issue_tokens(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id, user.role)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn count_row(n: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
    }

    fn user(id: i64, email: &str, referral_code: &str) -> users::Model {
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
        users::Model {
            id,
            name: "Asha Rao".to_string(),
            email: email.to_string(),
            password_hash: hash_password("Password123").unwrap(),
            phone: "+919876543210".to_string(),
            is_email_verified: false,
            referral_code: referral_code.to_string(),
            referred_by: None,
            wallet_balance: 0,
            role: UserRole::User,
            created_at: at,
            updated_at: at,
        }
    }

    fn request(referral_code: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: "Asha Rao".to_string(),
            email: "Asha@Example.com".to_string(),
            password: "Password123".to_string(),
            phone: "+919876543210".to_string(),
            referral_code: referral_code.map(str::to_string),
        }
    }

    fn service(db: MockDatabase, bonus: i64) -> AuthService {
        let jwt = JwtService::new("test-secret", 3600, 7200);
        AuthService::new(Arc::new(db.into_connection()), jwt, bonus)
    }

    #[actix_web::test]
    async fn test_register_rejects_taken_email() {
        let db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[count_row(1)]]);

        match service(db, 0).register(request(None)).await {
            Err(AppError::ValidationError(msg)) => assert_eq!(msg, "Email is already registered"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn test_register_rejects_unknown_referral_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([Vec::<users::Model>::new()]);

        match service(db, 0).register(request(Some("nosuch12"))).await {
            Err(AppError::ValidationError(msg)) => assert_eq!(msg, "Invalid referral code"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[actix_web::test]
    async fn test_register_links_referrer_and_credits_bonus() {
        let referrer = user(7, "ravi@example.com", "K7QM2XPA");
        let mut created = user(42, "asha@example.com", "ZX8W3NPQ");
        created.referred_by = Some(7);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([[referrer]])
            .append_query_results([[count_row(0)]])
            .append_query_results([[created]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);
        let db = Arc::new(db.into_connection());
        let service = AuthService::new(db.clone(), JwtService::new("test-secret", 3600, 7200), 500);

        let auth = service.register(request(Some(" k7qm2xpa "))).await.unwrap();
        assert_eq!(auth.user.id, 42);
        assert_eq!(auth.user.referred_by, Some(7));
        assert!(!auth.access_token.is_empty());

        drop(service);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(log.contains("K7QM2XPA"));
        assert!(log.contains(r#"\"email\" = $1"#));
        assert!(log.contains("asha@example.com"));
        assert!(log.contains(r#"UPDATE \"users\" SET \"wallet_balance\""#));
        assert!(log.contains("BigInt(Some(500))"));
    }

    #[actix_web::test]
    async fn test_register_without_bonus_skips_wallet_update() {
        let created = user(42, "asha@example.com", "ZX8W3NPQ");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[count_row(0)]])
            .append_query_results([[count_row(0)]])
            .append_query_results([[created]]);
        let db = Arc::new(db.into_connection());
        let service = AuthService::new(db.clone(), JwtService::new("test-secret", 3600, 7200), 0);

        let auth = service.register(request(None)).await.unwrap();
        assert_eq!(auth.user.referred_by, None);

        drop(service);
        let log = format!("{:?}", Arc::try_unwrap(db).unwrap().into_transaction_log());
        assert!(!log.contains("UPDATE"));
    }

    #[actix_web::test]
    async fn test_login_checks_password() {
        let stored = user(42, "asha@example.com", "ZX8W3NPQ");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored.clone()]])
            .append_query_results([[stored]])
            .append_query_results([Vec::<users::Model>::new()]);
        let service = service(db, 0);

        let login = |email: &str, password: &str| LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let auth = service.login(login(" ASHA@example.com ", "Password123")).await.unwrap();
        assert_eq!(auth.user.id, 42);
        assert_eq!(auth.expires_in, 3600);

        for attempt in [
            login("asha@example.com", "Password124"),
            login("nobody@example.com", "Password123"),
        ] {
            match service.login(attempt).await {
                Err(AppError::AuthError(msg)) => assert_eq!(msg, "Invalid email or password"),
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }
}
