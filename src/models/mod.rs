pub mod callback;
pub mod common;
pub mod dashboard;
pub mod enquiry;
pub mod package;
pub mod pagination;
pub mod user;

pub use callback::*;
pub use common::*;
pub use dashboard::*;
pub use enquiry::*;
pub use package::*;
pub use pagination::*;
pub use user::*;

pub use crate::entities::{
    Activity, CallbackSource, CallbackStatus, CategoryPrice, EnquirySource, EnquiryStatus,
    ItineraryDay, PackageCategory, UserRole,
};
