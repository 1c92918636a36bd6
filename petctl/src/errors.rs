use crate::db::errors::DbError;
use crate::types::Operation;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error as ThisError;
use utoipa::ToSchema;

/// A single input problem, reported back to the client in the `errors` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldError {
    /// Name of the offending request field, if the problem is tied to one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    pub msg: String,
}

impl FieldError {
    pub fn new(param: &str, msg: impl Into<String>) -> Self {
        Self {
            param: Some(param.to_string()),
            msg: msg.into(),
        }
    }
}

#[derive(ThisError, Debug)]
pub enum Error {
    /// Request body failed the input contract
    #[error("Invalid input: {}", join_messages(.errors))]
    Validation { errors: Vec<FieldError> },

    /// An identity with the same unique key already exists
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Login failed. Deliberately says nothing about which half was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Session token missing, malformed, forged or expired
    #[error("Not authenticated")]
    Unauthenticated { message: Option<String> },

    /// Authenticated, but not the owner of the resource
    #[error("Not authorized to {action} {resource}")]
    Forbidden { action: Operation, resource: String },

    /// Requested resource not found
    #[error("{resource} with ID {id} not found")]
    NotFound { resource: String, id: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Store operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn join_messages(errors: &[FieldError]) -> String {
    errors.iter().map(|e| e.msg.as_str()).collect::<Vec<_>>().join(", ")
}

impl Error {
    pub fn validation(param: &str, msg: impl Into<String>) -> Self {
        Error::Validation {
            errors: vec![FieldError::new(param, msg)],
        }
    }

    /// Ownership failures share 401 with authentication failures.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation { .. } | Error::Conflict { .. } | Error::InvalidCredentials => StatusCode::BAD_REQUEST,
            Error::Unauthenticated { .. } | Error::Forbidden { .. } => StatusCode::UNAUTHORIZED,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Database(DbError::NotFound) => StatusCode::NOT_FOUND,
            Error::Database(DbError::UniqueViolation { .. }) => StatusCode::BAD_REQUEST,
            Error::Internal { .. } | Error::Database(DbError::Other(_)) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation { errors } => join_messages(errors),
            Error::Conflict { message } => message.clone(),
            Error::InvalidCredentials => "Invalid email or password".to_string(),
            Error::Unauthenticated { message } => message.clone().unwrap_or_else(|| "Authentication required".to_string()),
            Error::Forbidden { .. } => "User not authorized".to_string(),
            Error::NotFound { resource, .. } => format!("{resource} not found"),
            Error::Database(DbError::NotFound) => "Resource not found".to_string(),
            Error::Database(DbError::UniqueViolation { .. }) => "Resource already exists".to_string(),
            Error::Internal { .. } | Error::Database(DbError::Other(_)) | Error::Other(_) => "Server error".to_string(),
        }
    }

    /// JSON body for the response.
    ///
    /// Input-shaped failures use the `{"errors": [...]}` list; everything else is a single
    /// `{"msg": ...}`.
    fn body(&self) -> serde_json::Value {
        match self {
            Error::Validation { errors } => json!({ "errors": errors }),
            Error::Conflict { .. } | Error::InvalidCredentials | Error::Database(DbError::UniqueViolation { .. }) => {
                json!({ "errors": [FieldError { param: None, msg: self.user_message() }] })
            }
            _ => json!({ "msg": self.user_message() }),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details server-side - different log levels based on severity
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Unauthenticated { .. } | Error::Forbidden { .. } | Error::InvalidCredentials => {
                tracing::info!("Authorization error: {}", self);
            }
            Error::Conflict { .. } | Error::Database(_) => {
                tracing::warn!("Conflict error: {}", self);
            }
            Error::Validation { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        (self.status_code(), Json(self.body())).into_response()
    }
}

/// Malformed or non-JSON bodies are input errors like any other
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation {
            errors: vec![FieldError {
                param: None,
                msg: rejection.body_text(),
            }],
        }
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(error: Error) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak_detail() {
        let (status, body) = body_of(Error::Internal {
            operation: "connect to db at postgres://secret@host".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "msg": "Server error" }));
    }

    #[tokio::test]
    async fn test_forbidden_uses_unauthorized_status() {
        let (status, body) = body_of(Error::Forbidden {
            action: Operation::Delete,
            resource: "pet".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({ "msg": "User not authorized" }));
    }

    #[tokio::test]
    async fn test_validation_body_lists_fields() {
        let (status, body) = body_of(Error::Validation {
            errors: vec![
                FieldError::new("name", "Please enter your name"),
                FieldError::new("email", "Please enter a valid email"),
            ],
        })
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);
        assert_eq!(body["errors"][1]["param"], "email");
    }

    #[tokio::test]
    async fn test_invalid_credentials_is_generic() {
        let (status, body) = body_of(Error::InvalidCredentials).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "errors": [{ "msg": "Invalid email or password" }] }));
    }

    #[tokio::test]
    async fn test_not_found_body_omits_id() {
        let (status, body) = body_of(Error::NotFound {
            resource: "Pet".to_string(),
            id: "1234".to_string(),
        })
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "msg": "Pet not found" }));
    }
}
