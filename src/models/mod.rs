pub mod common;
pub mod otp;
pub mod submission;

pub use common::*;
pub use otp::*;
pub use submission::*;
