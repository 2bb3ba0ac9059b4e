//! Data models for Keyward

mod account;
mod role;
mod session;
mod user;

pub use account::*;
pub use role::*;
pub use session::*;
pub use user::*;
