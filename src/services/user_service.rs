use crate::database::DbPool;
use crate::entities::{UserRole, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validate_phone;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
}

/// Resolves an assignee id, which must point at a staff account.
pub(crate) async fn resolve_staff<C: ConnectionTrait>(
    db: &C,
    user_id: i64,
) -> AppResult<users::Model> {
    let user = users::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignee {user_id} not found")))?;

    if !user.role.is_staff() {
        return Err(AppError::ValidationError(
            "Assignee must be a staff member".to_string(),
        ));
    }
    Ok(user)
}

impl UserService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_user(&self, user_id: i64) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Profile with the number of users this account referred.
    pub async fn get_user_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = self.find_user(user_id).await?;

        let total_referrals = users::Entity::find()
            .filter(users::Column::ReferredBy.eq(user_id))
            .count(self.pool.as_ref())
            .await?;

        let mut user_response = UserResponse::from(user);
        user_response.total_referrals = total_referrals;
        Ok(user_response)
    }

    pub async fn update_user_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        if request.name.is_none() && request.phone.is_none() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let name = request
            .name
            .as_deref()
            .map(|n| require_text("Name", n, 100))
            .transpose()?;
        let phone = request.phone.as_deref().map(validate_phone).transpose()?;

        let mut model = self.find_user(user_id).await?.into_active_model();
        if let Some(name) = name {
            model.name = Set(name);
        }
        if let Some(phone) = phone {
            model.phone = Set(phone);
        }
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;

        self.get_user_profile(user_id).await
    }

    pub async fn get_user_referrals(
        &self,
        user_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<UserResponse>> {
        let query = users::Entity::find().filter(users::Column::ReferredBy.eq(user_id));

        let total = query.clone().count(self.pool.as_ref()).await?;
        let models = query
            .order_by_desc(users::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;
        let items = models.into_iter().map(UserResponse::from).collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    pub async fn list_users(&self, query: UserQuery) -> AppResult<PaginatedResponse<UserResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let mut select = users::Entity::find();
        if let Some(role) = query.role {
            select = select.filter(users::Column::Role.eq(role));
        }

        let total = select.clone().count(self.pool.as_ref()).await?;
        let models = select
            .order_by_desc(users::Column::CreatedAt)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(self.pool.as_ref())
            .await?;
        let items = models.into_iter().map(UserResponse::from).collect();

        Ok(PaginatedResponse::new(items, &params, total))
    }

    pub async fn update_role(
        &self,
        actor_id: i64,
        user_id: i64,
        role: UserRole,
    ) -> AppResult<UserResponse> {
        // Keeps at least the acting admin in place
        if actor_id == user_id {
            return Err(AppError::ValidationError(
                "You cannot change your own role".to_string(),
            ));
        }

        let user = self.find_user(user_id).await?;
        let previous = user.role;

        let mut model = user.into_active_model();
        model.role = Set(role);
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;

        log::info!("User {user_id} role changed {previous} -> {role} by {actor_id}");
        self.get_user_profile(user_id).await
    }

    /// Signed wallet adjustment under a row lock; the balance never goes negative.
    pub async fn adjust_wallet(
        &self,
        actor_id: i64,
        user_id: i64,
        request: AdjustWalletRequest,
    ) -> AppResult<UserResponse> {
        let txn = self.pool.begin().await?;

        let user = users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let balance = apply_wallet_delta(user.wallet_balance, request.amount)?;

        let mut model = user.into_active_model();
        model.wallet_balance = Set(balance);
        model.updated_at = Set(Utc::now());
        model.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Wallet of user {user_id} adjusted by {} to {balance} by {actor_id} ({})",
            request.amount,
            request.reason.as_deref().unwrap_or("no reason given")
        );
        self.get_user_profile(user_id).await
    }
}
