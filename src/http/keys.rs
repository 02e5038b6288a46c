//! `/keys/`: the Key Pool's administrative surface. Staff only.
//!
//! Keys are consumed only by recording a purchase; nothing here can flip availability.

use super::{body, require_staff, AppError, AppState};
use crate::auth::Principal;
use crate::model::{Key, KeyCreate, KeyFilter, KeyId, KeyUpdate};
use actor_framework::ActorClient;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

pub async fn list_keys(
    principal: Principal,
    State(state): State<AppState>,
    Query(filter): Query<KeyFilter>,
) -> Result<Json<Vec<Key>>, AppError> {
    require_staff(&principal)?;
    Ok(Json(state.keys.list(filter).await?))
}

pub async fn get_key(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Key>, AppError> {
    require_staff(&principal)?;
    let id = KeyId(id);
    state
        .keys
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("Key not found: {id}")))
}

pub async fn create_key(
    principal: Principal,
    State(state): State<AppState>,
    payload: Result<Json<KeyCreate>, JsonRejection>,
) -> Result<(StatusCode, Json<Key>), AppError> {
    require_staff(&principal)?;
    let key = state.keys.create_key(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(key)))
}

/// Corrects the secret of a key that is still available.
pub async fn update_key(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<KeyUpdate>, JsonRejection>,
) -> Result<Json<Key>, AppError> {
    require_staff(&principal)?;
    let key = state.keys.update_key(KeyId(id), body(payload)?).await?;
    Ok(Json(key))
}

/// Refused with 409 for a consumed key.
pub async fn delete_key(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, AppError> {
    require_staff(&principal)?;
    state.keys.delete(KeyId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
