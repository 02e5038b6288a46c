//! Dashboard statistics, the delivery failure log and the health check.

use super::{require_admin, AppError, AppState};
use crate::auth::Principal;
use crate::model::{DeliveryFailure, DeliveryFailureFilter, DeliveryFailureId};
use crate::stats::DashboardStats;
use actor_framework::ActorClient;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn stats(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    require_admin(&principal)?;
    let stats = DashboardStats::collect(&state.users, &state.products, &state.ledger)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(stats))
}

pub async fn list_failures(
    principal: Principal,
    State(state): State<AppState>,
    Query(filter): Query<DeliveryFailureFilter>,
) -> Result<Json<Vec<DeliveryFailure>>, AppError> {
    require_admin(&principal)?;
    Ok(Json(state.failures.list(filter).await?))
}

pub async fn resolve_failure(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<DeliveryFailure>, AppError> {
    require_admin(&principal)?;
    Ok(Json(state.failures.resolve(DeliveryFailureId(id)).await?))
}
