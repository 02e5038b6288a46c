//! Error types for the Key actor.

use crate::model::ProductId;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum KeyError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Key validation error: {0}")]
    ValidationError(String),

    /// Consumed keys are frozen: no second consumption, no edit, no delete.
    #[error("Key {0} is already consumed")]
    AlreadyConsumed(String),

    #[error("Key {key} is not held by {action}")]
    NotHeldBy { key: String, action: String },

    /// A claim found fewer available keys than requested.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: usize,
        available: usize,
    },

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for KeyError {
    fn from(msg: String) -> Self {
        KeyError::ActorCommunicationError(msg)
    }
}
