//! `/users/`: account administration (admin) and `GET /users/me`.

use super::{body, require_admin, AppError, AppState};
use crate::auth::{generate_password, hash_password, Principal};
use crate::model::{AccountType, CompanyNumbers, Role, User, UserCreate, UserFilter, UserId, UserUpdate};
use actor_framework::ActorClient;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

const GENERATED_PASSWORD_LENGTH: usize = 12;

#[derive(Debug, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(flatten)]
    pub company: CompanyNumbers,
    /// Generated when absent.
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub user: User,
    /// Present only when the password was generated; shown once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub account_type: Option<AccountType>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub company: Option<CompanyNumbers>,
    pub password: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub role: Option<Role>,
    pub email: Option<String>,
}

pub async fn me(principal: Principal, State(state): State<AppState>) -> Result<Json<User>, AppError> {
    state
        .users
        .get(principal.user)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::unauthorized("Account no longer exists"))
}

pub async fn list_users(
    principal: Principal,
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    require_admin(&principal)?;
    let filter = UserFilter {
        email: query.email,
        role: query.role,
    };
    Ok(Json(state.users.list(filter).await?))
}

pub async fn get_user(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<User>, AppError> {
    require_admin(&principal)?;
    let id = UserId(id);
    state
        .users
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("User not found: {id}")))
}

pub async fn create_user(
    principal: Principal,
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUser>), AppError> {
    require_admin(&principal)?;
    let new_user = body(payload)?;
    let (password, generated_password) = match new_user.password {
        Some(password) if !password.is_empty() => (password, None),
        _ => {
            let password = generate_password(GENERATED_PASSWORD_LENGTH, true, true);
            (password.clone(), Some(password))
        }
    };
    let user = state
        .users
        .create_user(UserCreate {
            email: new_user.email,
            full_name: new_user.full_name,
            role: new_user.role,
            account_type: new_user.account_type,
            phone: new_user.phone,
            address: new_user.address,
            company: new_user.company,
            password_hash: hash_password(&password)?,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedUser {
            user,
            generated_password,
        }),
    ))
}

pub async fn update_user(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    require_admin(&principal)?;
    let patch = body(payload)?;
    let update = UserUpdate {
        email: patch.email,
        full_name: patch.full_name,
        role: patch.role,
        account_type: patch.account_type,
        phone: patch.phone,
        address: patch.address,
        company: patch.company,
        password_hash: patch.password.as_deref().map(hash_password).transpose()?,
        active: patch.active,
    };
    Ok(Json(state.users.update_user(UserId(id), update).await?))
}

pub async fn delete_user(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, AppError> {
    require_admin(&principal)?;
    if principal.user == UserId(id) {
        return Err(AppError::conflict("Admins cannot delete their own account"));
    }
    state.users.delete(UserId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
