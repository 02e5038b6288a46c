//! `/actions/`: recording purchases and quotes, and the ledger's read and edit surface.

use super::{body, require_admin, require_staff, AppError, AppState};
use crate::allocator::{ActionRequest, LineRequest};
use crate::auth::Principal;
use crate::model::{
    Action, ActionFilter, ActionId, ActionKind, ActionUpdate, Allocation, PaymentMethodId,
    ProductId, Role, UserId,
};
use actor_framework::ActorClient;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

/// `{action: {...}, produits: [...]}`.
#[derive(Debug, Deserialize)]
pub struct ActionBody {
    pub action: ActionHeader,
    #[serde(default)]
    pub produits: Vec<LineBody>,
}

/// The seller is always the caller. A `vendeur` sent in the body is ignored.
#[derive(Debug, Deserialize)]
pub struct ActionHeader {
    #[serde(rename = "type")]
    pub kind: String,
    pub client: UserId,
    pub methode_paiement: PaymentMethodId,
}

/// A requested line. A `prix_total` sent by the caller is ignored.
#[derive(Debug, Deserialize)]
pub struct LineBody {
    pub produit: ProductId,
    #[serde(default = "one")]
    pub quantite: i64,
}

fn one() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct ActionCreated {
    pub detail: &'static str,
    pub action_id: ActionId,
    pub cles: Allocation,
}

impl From<ActionBody> for ActionRequest {
    fn from(body: ActionBody) -> Self {
        ActionRequest {
            kind: body.action.kind,
            client: body.action.client,
            payment_method: body.action.methode_paiement,
            lines: body
                .produits
                .into_iter()
                .map(|line| LineRequest {
                    product: line.produit,
                    quantity: line.quantite,
                })
                .collect(),
        }
    }
}

pub async fn create_action(
    principal: Principal,
    State(state): State<AppState>,
    payload: Result<Json<ActionBody>, JsonRejection>,
) -> Result<Json<ActionCreated>, AppError> {
    require_staff(&principal)?;
    let request = ActionRequest::from(body(payload)?);
    let outcome = state.allocator.submit(&principal, request).await?;
    Ok(Json(ActionCreated {
        detail: outcome.detail,
        action_id: outcome.action_id,
        cles: outcome.allocation,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ActionQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub client: Option<UserId>,
    pub vendeur: Option<UserId>,
}

/// Staff see every action; a client only their own.
pub async fn list_actions(
    principal: Principal,
    State(state): State<AppState>,
    Query(query): Query<ActionQuery>,
) -> Result<Json<Vec<Action>>, AppError> {
    let kind = match query.kind.as_deref() {
        Some(raw) => Some(
            ActionKind::parse(raw)
                .ok_or_else(|| AppError::bad_request(format!("unknown action type {raw:?}")))?,
        ),
        None => None,
    };
    let client = match principal.role {
        Role::Admin | Role::Vendeur => query.client,
        Role::Client => Some(principal.user),
    };
    let filter = ActionFilter {
        kind,
        client,
        seller: query.vendeur,
    };
    Ok(Json(state.ledger.list(filter).await?))
}

pub async fn get_action(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Action>, AppError> {
    let id = ActionId(id);
    let action = state
        .ledger
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Action not found: {id}")))?;
    match principal.role {
        Role::Admin | Role::Vendeur => {}
        Role::Client if action.client == principal.user => {}
        Role::Client => return Err(AppError::not_found(format!("Action not found: {id}"))),
    }
    Ok(Json(action))
}

/// Delivered/paid flags and the agreed price. Never touches keys.
pub async fn update_action(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
    payload: Result<Json<ActionUpdate>, JsonRejection>,
) -> Result<Json<Action>, AppError> {
    require_staff(&principal)?;
    let action = state.ledger.update_action(ActionId(id), body(payload)?).await?;
    Ok(Json(action))
}

/// Removes the record only; consumed keys stay consumed.
pub async fn delete_action(
    principal: Principal,
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<StatusCode, AppError> {
    require_admin(&principal)?;
    state.ledger.delete(ActionId(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
