//! Error types for the identity service.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Unknown, revoked or expired token.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Account is disabled")]
    Inactive,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Identity store error: {0}")]
    Store(String),
}

impl From<String> for AuthError {
    fn from(msg: String) -> Self {
        AuthError::Store(msg)
    }
}
