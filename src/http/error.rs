//! Error responses.
//!
//! Every failure leaves the API as `{code, message, errors?}` with the matching status. Domain
//! errors convert through `From`, so handlers just use `?`.

use crate::allocator::{AllocationError, FieldError};
use crate::auth::AuthError;
use crate::catalog::CatalogError;
use crate::category_actor::CategoryError;
use crate::failure_actor::FailureLogError;
use crate::key_actor::KeyError;
use crate::ledger_actor::ActionError;
use crate::payment_actor::PaymentMethodError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    errors: Option<Vec<FieldError>>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [FieldError]>,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(code = self.code, message = %self.message, "Request failed");
        }
        let body = ErrorBody {
            code: self.code,
            message: &self.message,
            errors: self.errors.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::bad_request(rejection.body_text())
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        let message = err.to_string();
        match err {
            AllocationError::InvalidActionType(_) => {
                AppError::new(StatusCode::BAD_REQUEST, "INVALID_ACTION_TYPE", message)
            }
            AllocationError::ProductNotFound { ids } => {
                AppError::new(StatusCode::BAD_REQUEST, "PRODUCT_NOT_FOUND", message).with_errors(
                    ids.iter()
                        .map(|id| FieldError::new("produit", format!("unknown product {}", id.0)))
                        .collect(),
                )
            }
            AllocationError::InsufficientStock { .. } => {
                AppError::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK", message)
            }
            AllocationError::ValidationError(errors) => {
                AppError::validation(message).with_errors(errors)
            }
            AllocationError::Forbidden => AppError::forbidden(message),
            AllocationError::Internal(_) => AppError::internal(message),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::Inactive => {
                AppError::unauthorized(err.to_string())
            }
            AuthError::Hashing(_) | AuthError::Store(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound(_) => AppError::not_found(err.to_string()),
            CatalogError::Store(_) => AppError::internal(err.to_string()),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::NotFound(_) => AppError::not_found(message),
            UserError::AlreadyExists(_) => AppError::conflict(message),
            UserError::ValidationError(_) => AppError::validation(message),
            UserError::ActorCommunicationError(_) => AppError::internal(message),
        }
    }
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        let message = err.to_string();
        match err {
            CategoryError::NotFound(_) => AppError::not_found(message),
            CategoryError::AlreadyExists(_) | CategoryError::InUse(_) => {
                AppError::conflict(message)
            }
            CategoryError::ValidationError(_) => AppError::validation(message),
            CategoryError::ActorCommunicationError(_) => AppError::internal(message),
        }
    }
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        let message = err.to_string();
        match err {
            ProductError::NotFound(_) => AppError::not_found(message),
            ProductError::UnknownCategory(_) | ProductError::ValidationError(_) => {
                AppError::validation(message)
            }
            ProductError::InUse(_) => AppError::conflict(message),
            ProductError::ActorCommunicationError(_) => AppError::internal(message),
        }
    }
}

impl From<PaymentMethodError> for AppError {
    fn from(err: PaymentMethodError) -> Self {
        let message = err.to_string();
        match err {
            PaymentMethodError::NotFound(_) => AppError::not_found(message),
            PaymentMethodError::AlreadyExists(_) => AppError::conflict(message),
            PaymentMethodError::ValidationError(_) => AppError::validation(message),
            PaymentMethodError::ActorCommunicationError(_) => AppError::internal(message),
        }
    }
}

impl From<KeyError> for AppError {
    fn from(err: KeyError) -> Self {
        let message = err.to_string();
        match err {
            KeyError::NotFound(_) => AppError::not_found(message),
            KeyError::UnknownProduct(_) | KeyError::ValidationError(_) => {
                AppError::validation(message)
            }
            KeyError::AlreadyConsumed(_) => AppError::conflict(message),
            KeyError::InsufficientStock { .. } => {
                AppError::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK", message)
            }
            KeyError::ActorCommunicationError(_) => AppError::internal(message),
        }
    }
}

impl From<ActionError> for AppError {
    fn from(err: ActionError) -> Self {
        let message = err.to_string();
        match err {
            ActionError::NotFound(_) => AppError::not_found(message),
            ActionError::ValidationError(_) => AppError::validation(message),
            ActionError::InsufficientStock { .. } => {
                AppError::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_STOCK", message)
            }
            ActionError::KeyPool(_) | ActionError::ActorCommunicationError(_) => {
                AppError::internal(message)
            }
        }
    }
}

impl From<FailureLogError> for AppError {
    fn from(err: FailureLogError) -> Self {
        let message = err.to_string();
        match err {
            FailureLogError::NotFound(_) => AppError::not_found(message),
            FailureLogError::ActorCommunicationError(_) => AppError::internal(message),
        }
    }
}
