//! Error types for the ledger actor.

use crate::key_actor::KeyError;
use crate::model::ProductId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("Action not found: {0}")]
    NotFound(String),

    #[error("Action validation error: {0}")]
    ValidationError(String),

    /// The authoritative claim came up short; nothing was recorded.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: usize,
        available: usize,
    },

    /// The Key actor refused the claim for another reason.
    #[error("Key pool error: {0}")]
    KeyPool(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for ActionError {
    fn from(msg: String) -> Self {
        ActionError::ActorCommunicationError(msg)
    }
}

impl From<KeyError> for ActionError {
    fn from(err: KeyError) -> Self {
        match err {
            KeyError::InsufficientStock {
                product,
                requested,
                available,
            } => ActionError::InsufficientStock {
                product,
                requested,
                available,
            },
            other => ActionError::KeyPool(other.to_string()),
        }
    }
}
