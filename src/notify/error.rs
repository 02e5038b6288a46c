use crate::model::{ActionId, UserId};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotifyError {
    /// The mailer refused or could not reach its transport. Retried.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// The document could not be built. Not retried.
    #[error("Cannot render document: {0}")]
    Render(String),

    #[error("Action {0} not found")]
    MissingAction(ActionId),

    #[error("Client {0} not found")]
    MissingClient(UserId),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<String> for NotifyError {
    fn from(msg: String) -> Self {
        NotifyError::Store(msg)
    }
}
