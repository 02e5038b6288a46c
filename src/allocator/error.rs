//! Errors returned by [`Allocator::submit`](super::Allocator::submit).

use crate::model::ProductId;
use serde::Serialize;
use thiserror::Error;

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn join_ids(ids: &[ProductId]) -> String {
    ids.iter()
        .map(|id| id.0.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AllocationError {
    #[error("Action type {0:?} is invalid; expected ACHAT or DEVIS")]
    InvalidActionType(String),

    #[error("Unknown products: {}", join_ids(.ids))]
    ProductNotFound { ids: Vec<ProductId> },

    /// Nothing was recorded and no key changed.
    #[error("Not enough keys for {name}: {available} available, {requested} requested")]
    InsufficientStock {
        product: ProductId,
        name: String,
        requested: usize,
        available: usize,
    },

    #[error("Invalid action request")]
    ValidationError(Vec<FieldError>),

    #[error("Only staff may record actions")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for AllocationError {
    fn from(msg: String) -> Self {
        AllocationError::Internal(msg)
    }
}
