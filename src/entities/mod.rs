pub mod callback_requests;
pub mod enquiries;
pub mod packages;
pub mod users;

pub use callback_requests as callback_request_entity;
pub use enquiries as enquiry_entity;
pub use packages as package_entity;
pub use users as user_entity;

pub use callback_requests::{CallbackSource, CallbackStatus};
pub use enquiries::{EnquirySource, EnquiryStatus};
pub use packages::{Activity, CategoryPrice, ItineraryDay, PackageCategory};
pub use users::UserRole;
