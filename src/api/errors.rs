//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request tracking.

use crate::errors::{FairDiceError, GeneratorError, RegistryError, StorageError, VerificationError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// NOT_FOUND, BAD_REQUEST, UNPROCESSABLE_ENTITY or INTERNAL_ERROR
    pub code: String,
    pub message: String,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorKind {
    NotFound(String),
    BadRequest(String),
    Unprocessable(String),
    InternalError(String),
}

impl ApiError {
    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest(message),
            request_id,
        }
    }

    pub fn unprocessable(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::Unprocessable(message),
            request_id,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::InternalError(message),
            request_id,
        }
    }

    /// Map a service error onto an HTTP error kind
    pub fn from_service(request_id: String, err: FairDiceError) -> Self {
        let message = err.to_string();
        match err {
            FairDiceError::Storage(StorageError::NotFound(_))
            | FairDiceError::Verification(VerificationError::NotFound(_))
            | FairDiceError::Registry(RegistryError::GeneratorNotFound(_)) => {
                Self::not_found(request_id, message)
            }

            FairDiceError::Generator(GeneratorError::RangeError { .. })
            | FairDiceError::Generator(GeneratorError::InvalidRange { .. })
            | FairDiceError::Draw {
                source: GeneratorError::RangeError { .. } | GeneratorError::InvalidRange { .. },
                ..
            } => Self::bad_request(request_id, message),

            FairDiceError::Verification(_) => Self::unprocessable(request_id, message),

            _ => {
                tracing::error!(request_id = %request_id, error = %message, "Request failed");
                Self::internal_error(request_id, message)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind {
            ApiErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            ApiErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiErrorKind::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiErrorKind::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::NotFound(msg) => write!(f, "[{}] Not Found: {}", self.request_id, msg),
            ApiErrorKind::BadRequest(msg) => write!(f, "[{}] Bad Request: {}", self.request_id, msg),
            ApiErrorKind::Unprocessable(msg) => write!(f, "[{}] Unprocessable: {}", self.request_id, msg),
            ApiErrorKind::InternalError(msg) => write!(f, "[{}] Internal Error: {}", self.request_id, msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self.kind {
            ApiErrorKind::NotFound(msg) => ("NOT_FOUND", msg),
            ApiErrorKind::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiErrorKind::Unprocessable(msg) => ("UNPROCESSABLE_ENTITY", msg),
            ApiErrorKind::InternalError(msg) => ("INTERNAL_ERROR", msg),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id,
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DrawStage;

    fn status_of(err: FairDiceError) -> StatusCode {
        ApiError::from_service("req".to_string(), err).status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(StorageError::NotFound("r".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(VerificationError::NotFound("r".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(FairDiceError::Draw {
                stage: DrawStage::Player,
                source: GeneratorError::RangeError { min: i64::MIN, max: i64::MAX },
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(VerificationError::MissingDisclosure.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(VerificationError::NotVerifiable("uniform".into()).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(RegistryError::NoGeneratorsAvailable.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(StorageError::WriteFailed("disk".into()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_entropy_failure_is_internal() {
        let err = FairDiceError::Draw {
            stage: DrawStage::House,
            source: GeneratorError::Entropy("no bytes".into()),
        };
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
