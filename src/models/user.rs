use crate::entities::{UserRole, user_entity};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "asha@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
    #[schema(example = "+919876543210")]
    pub phone: String,
    /// Referral code of the user who invited this sign-up
    #[schema(example = "K7QM2XPA")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "asha@example.com")]
    pub email: String,
    #[schema(example = "Password123")]
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[schema(example = "Asha R.")]
    pub name: Option<String>,
    #[schema(example = "+919876543210")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub is_email_verified: bool,
    pub referral_code: String,
    pub referred_by: Option<i64>,
    pub wallet_balance: i64,
    pub role: UserRole,
    pub total_referrals: u64,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(user: user_entity::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            is_email_verified: user.is_email_verified,
            referral_code: user.referral_code,
            referred_by: user.referred_by,
            wallet_balance: user.wallet_balance,
            role: user.role,
            total_referrals: 0, // filled in by the profile query
            created_at: user.created_at,
        }
    }
}

/// Minimal view of a staff member used when resolving assignees.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

impl From<user_entity::Model> for StaffSummary {
    fn from(user: user_entity::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustWalletRequest {
    /// Signed delta in minor units; negative debits
    #[schema(example = 5000)]
    pub amount: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UserQuery {
    pub role: Option<UserRole>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Applies a signed delta, refusing to take the balance below zero.
pub fn apply_wallet_delta(balance: i64, delta: i64) -> AppResult<i64> {
    if delta == 0 {
        return Err(AppError::ValidationError(
            "Wallet adjustment must be non-zero".to_string(),
        ));
    }
    match balance.checked_add(delta) {
        Some(next) if next >= 0 => Ok(next),
        Some(_) => Err(AppError::ValidationError(
            "Insufficient wallet balance".to_string(),
        )),
        None => Err(AppError::ValidationError(
            "Wallet adjustment out of range".to_string(),
        )),
    }
}
