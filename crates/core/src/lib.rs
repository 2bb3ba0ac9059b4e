//! Keyward Core Library
//!
//! Models, storage, security context and the account activation service
//! behind the Keyward user management tool.

pub mod error;
pub mod invariants;
pub mod models;
pub mod security;
pub mod service;
pub mod storage;

pub use error::{Error, Result};
pub use models::*;
pub use security::{AnonymousContext, SecurityContext, SessionContext};
pub use service::{
    inactive_timestamp, ActivationService, FlashMessage, Overview, Severity, UserManagement,
    INACTIVE_TIMESTAMP,
};
pub use storage::{
    AccountRepository, Database, RoleRepository, SessionRepository, Storage, UserRepository,
};
