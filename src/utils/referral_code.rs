use crate::entities::user_entity as users;
use crate::error::AppResult;
use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};

const REFERRAL_CODE_LEN: usize = 8;
const REFERRAL_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Random 8-char code without the easily confused 0/O and 1/I.
pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| REFERRAL_CHARSET[rng.gen_range(0..REFERRAL_CHARSET.len())] as char)
        .collect()
}

/// Retries until the code is free; the unique index still guards the insert.
pub async fn generate_unique_referral_code(pool: &DatabaseConnection) -> AppResult<String> {
    loop {
        let code = generate_referral_code();

        let exists = users::Entity::find()
            .filter(users::Column::ReferralCode.eq(code.as_str()))
            .count(pool)
            .await?;

        if exists == 0 {
            return Ok(code);
        }
    }
}
