use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use sepay_engine::PaymentGatewayError;
use thiserror::Error;

use crate::data_objects::JsonResponse;

/// Errors returned by the request handlers.
///
/// Client-facing variants display their message verbatim, since it ends up in the `message` field of the JSON
/// response body.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("{0}")]
    BackendError(String),
    #[error("{0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("{0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    NoRecordFound(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(JsonResponse::failure(self))
    }
}

impl From<PaymentGatewayError> for ServerError {
    fn from(e: PaymentGatewayError) -> Self {
        match e {
            PaymentGatewayError::InvalidAmount(_) => Self::InvalidRequestBody(INVALID_TOTAL.into()),
            PaymentGatewayError::TransactionNotFound(_) => Self::NoRecordFound(e.to_string()),
            PaymentGatewayError::DatabaseError(_) => Self::BackendError(format!("Cannot access the database: {e}")),
            PaymentGatewayError::InitializationError(_) => Self::InitializeError(e.to_string()),
        }
    }
}

pub const INVALID_TOTAL: &str = "Invalid total amount";
pub const INVALID_ORDER_ID: &str = "Invalid order ID";
pub const ORDER_NOT_FOUND: &str = "Order not found";
pub const MISSING_WEBHOOK_FIELDS: &str = "No data or missing required fields";

/// Reasons for rejecting a call to the payment gateway webhook.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Unauthorized: Missing Authorization header")]
    MissingHeader,
    #[error("Unauthorized: Invalid Authorization format. Expected \"Apikey <api_key>\"")]
    InvalidFormat,
    #[error("Unauthorized: Invalid API key")]
    InvalidApiKey,
}
