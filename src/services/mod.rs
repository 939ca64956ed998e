pub mod auth_service;
pub mod callback_service;
pub mod dashboard_service;
pub mod enquiry_service;
pub mod package_service;
pub mod user_service;

pub use auth_service::*;
pub use callback_service::*;
pub use dashboard_service::*;
pub use enquiry_service::*;
pub use package_service::*;
pub use user_service::UserService;
