//! Bearer authentication and role gates.

use super::{AppError, AppState};
use crate::auth::Principal;
use crate::model::Role;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

#[axum::async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Authentication credentials were not provided"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Expected a Bearer token"))?;
        Ok(state.tokens.verify(token.trim()).await?)
    }
}

/// Admin or Vendeur.
pub fn require_staff(principal: &Principal) -> Result<(), AppError> {
    match principal.role {
        Role::Admin | Role::Vendeur => Ok(()),
        Role::Client => Err(AppError::forbidden("Staff only")),
    }
}

pub fn require_admin(principal: &Principal) -> Result<(), AppError> {
    match principal.role {
        Role::Admin => Ok(()),
        Role::Vendeur | Role::Client => Err(AppError::forbidden("Admins only")),
    }
}
