use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FailureLogError {
    #[error("Delivery failure not found: {0}")]
    NotFound(String),

    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for FailureLogError {
    fn from(msg: String) -> Self {
        FailureLogError::ActorCommunicationError(msg)
    }
}
