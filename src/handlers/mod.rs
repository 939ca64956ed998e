pub mod admin;
pub mod auth;
pub mod callback;
pub mod enquiry;
pub mod package;
pub mod user;

pub use admin::admin_config;
pub use auth::auth_config;
pub use callback::callback_config;
pub use enquiry::enquiry_config;
pub use package::package_config;
pub use user::user_config;
