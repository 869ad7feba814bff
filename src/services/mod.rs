pub mod otp_service;
pub mod otp_store;
pub mod submission_service;

pub use otp_service::*;
pub use otp_store::*;
pub use submission_service::*;
