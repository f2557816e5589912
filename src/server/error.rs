use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::abi::AbiError;
use crate::ethereum::ChainError;

pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by the HTTP handlers, rendered as plain text.
///
/// * `BadRequest` -> 400, malformed requests and codec failures
/// * `NotFound` -> 404, unknown selectors, functions, blocks or transactions
/// * `Upstream` -> 502, the node rejected or failed a request
/// * `Timeout` -> 504, the node did not answer in time
/// * `Internal` -> 500
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Timeout(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn from_chain(err: &ChainError, message: String) -> Self {
        match err {
            ChainError::Timeout { .. } => ApiError::Timeout(message),
            ChainError::NotFound(_) => ApiError::NotFound(message),
            ChainError::InvalidEndpoint { .. } => ApiError::BadRequest(message),
            ChainError::Rpc(_) => ApiError::Upstream(message),
        }
    }
}

impl From<AbiError> for ApiError {
    fn from(err: AbiError) -> Self {
        match err {
            AbiError::NoMatchingFunction(_) | AbiError::FunctionNotFound(_) => {
                ApiError::NotFound(err.to_string())
            }
            _ => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        let message = err.to_string();
        ApiError::from_chain(&err, message)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(abi) = err.downcast_ref::<AbiError>() {
            return abi.clone().into();
        }

        let message = format!("{:#}", err);
        match err.downcast_ref::<ChainError>() {
            Some(chain) => ApiError::from_chain(chain, message),
            None => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", status, self);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, self);
        }
        (status, self.to_string()).into_response()
    }
}
