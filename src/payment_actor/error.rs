use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentMethodError {
    #[error("Payment method not found: {0}")]
    NotFound(String),

    #[error("Payment method already exists: {0}")]
    AlreadyExists(String),

    #[error("Payment method validation error: {0}")]
    ValidationError(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for PaymentMethodError {
    fn from(msg: String) -> Self {
        PaymentMethodError::ActorCommunicationError(msg)
    }
}
