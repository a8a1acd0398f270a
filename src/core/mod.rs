//! Core building blocks: authentication, typed errors, time periods

pub mod auth;
pub mod error;
pub mod period;

pub use auth::{AuthContext, AuthProvider, SingleUserProvider, TokenAuthProvider};
pub use error::{AppError, AppResult};
pub use period::{Period, TimeRange};
