//! # Identity Service
//!
//! Password login, opaque bearer tokens and the [`Principal`] handed to every operation that
//! needs to know who is calling.

pub mod error;
pub mod password;
pub mod token;

pub use error::*;
pub use password::{generate_password, hash_password, verify_password};
pub use token::{TokenPair, TokenService};

use crate::clients::UserClient;
use crate::model::{Role, User, UserId};
use tracing::warn;

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user: UserId,
    pub role: Role,
}

/// Checks an email and password pair against the User actor.
pub async fn authenticate(
    users: &UserClient,
    email: &str,
    password: &str,
) -> Result<User, AuthError> {
    let user = users
        .find_by_email(email)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?
        .ok_or(AuthError::InvalidCredentials)?;
    if !verify_password(password, &user.password_hash) {
        warn!(user_id = %user.id, "Wrong password");
        return Err(AuthError::InvalidCredentials);
    }
    if !user.active {
        return Err(AuthError::Inactive);
    }
    Ok(user)
}
