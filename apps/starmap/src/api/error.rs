//! # API Errors
//!
//! Maps every failure a handler can produce onto a status code and the JSON
//! envelope `{"detail": "...", "errors": [...]}`.
//!
//! | Error                                   | Status |
//! |-----------------------------------------|--------|
//! | `NotFound`, enrichment `NotFound`       | 404    |
//! | `Validation`                            | 422    |
//! | malformed JSON body                     | the rejection's own (400/415/422) |
//! | malformed path segment                  | the rejection's own (400) |
//! | `HasDependents`                         | 409    |
//! | anything else                           | 500, raw message |

use crate::enrichment::EnrichmentError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use starmap_core::{FieldError, StarmapError, ValidationErrors};
use thiserror::Error;

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] StarmapError),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    /// The body or a path segment could not be decoded into the expected
    /// shape; `status` is the one axum chose for the rejection.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Core(StarmapError::NotFound { .. }) | Self::Enrichment(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Core(StarmapError::Validation(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Core(StarmapError::HasDependents { .. }) => StatusCode::CONFLICT,
            Self::Core(
                StarmapError::AmbiguousName { .. }
                | StarmapError::SumOverflow { .. }
                | StarmapError::DuplicateKey { .. }
                | StarmapError::Storage(_)
                | StarmapError::Serialization(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Rejected { status, .. } => *status,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Core(StarmapError::Validation(errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = match self {
            Self::Core(StarmapError::Validation(errors)) => ErrorResponse {
                detail: "Validation failed".to_string(),
                errors: errors.errors,
            },
            other => ErrorResponse {
                detail: other.to_string(),
                errors: Vec::new(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn status_mapping() {
        let cases = [
            (
                ApiError::from(StarmapError::not_found(
                    starmap_core::EntityKind::System,
                    Uuid::nil(),
                )),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(ValidationErrors::single("name", "must not be empty")),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(StarmapError::HasDependents {
                    entity: starmap_core::EntityKind::System,
                    id: Uuid::nil(),
                    dependents: starmap_core::EntityKind::Planet,
                    count: 2,
                }),
                StatusCode::CONFLICT,
            ),
            (
                ApiError::from(StarmapError::SumOverflow {
                    entity: starmap_core::EntityKind::System,
                    id: Uuid::nil(),
                }),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(StarmapError::Storage("disk full".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::from(EnrichmentError::NotFound {
                    email: "x@y.z".to_string(),
                    reason: "timeout".to_string(),
                }),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected, "{}", error);
        }
    }

    #[test]
    fn server_errors_surface_raw_message() {
        let error = ApiError::from(StarmapError::AmbiguousName {
            entity: starmap_core::EntityKind::System,
            name: "Sol".to_string(),
        });
        assert_eq!(error.to_string(), "Multiple systems named 'Sol'");
    }
}
