//! Business services

mod activation;
mod management;

pub use activation::{inactive_timestamp, ActivationService, INACTIVE_TIMESTAMP};
pub use management::{FlashMessage, Overview, Severity, UserManagement};
