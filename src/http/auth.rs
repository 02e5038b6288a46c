//! `/auth/`: signup, login, refresh and logout.

use super::{body, AppError, AppState};
use crate::auth::{authenticate, hash_password};
use crate::model::{AccountType, CompanyNumbers, Role, User, UserCreate};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct Signup {
    pub email: String,
    pub full_name: String,
    pub password: String,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(flatten)]
    pub company: CompanyNumbers,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct Session {
    pub token: String,
    pub refresh_token: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct Detail {
    pub detail: &'static str,
}

fn session(state: &AppState, user: User) -> Session {
    let pair = state.tokens.issue(&user);
    Session {
        token: pair.access_token,
        refresh_token: pair.refresh_token,
        user,
    }
}

/// Creates a client account and logs it in.
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Signup>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let signup = body(payload)?;
    if signup.password.is_empty() {
        return Err(AppError::validation("password is required"));
    }
    let user = state
        .users
        .create_user(UserCreate {
            email: signup.email,
            full_name: signup.full_name,
            role: Role::Client,
            account_type: signup.account_type,
            phone: signup.phone,
            address: signup.address,
            company: signup.company,
            password_hash: hash_password(&signup.password)?,
        })
        .await?;
    info!(user_id = %user.id, "Client signed up");
    Ok(Json(session(&state, user)))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let credentials = body(payload)?;
    let user = authenticate(&state.users, &credentials.email, &credentials.password).await?;
    Ok(Json(session(&state, user)))
}

pub async fn refresh(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<AccessToken>, AppError> {
    let request = body(payload)?;
    let token = state.tokens.refresh(&request.refresh_token).await?;
    Ok(Json(AccessToken { token }))
}

/// Revokes the refresh token. Succeeds even if it was already gone.
pub async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<Detail>, AppError> {
    let request = body(payload)?;
    state.tokens.revoke(&request.refresh_token);
    Ok(Json(Detail {
        detail: "Successfully logged out.",
    }))
}
