pub mod email;
pub mod jwt;
pub mod password;
pub mod phone;
pub mod referral_code;
pub mod slug;

pub use email::*;
pub use jwt::*;
pub use password::*;
pub use phone::*;
pub use referral_code::{generate_referral_code, generate_unique_referral_code};
pub use slug::*;
