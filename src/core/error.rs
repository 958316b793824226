//! Typed error handling for generic views
//!
//! Every fallible view operation returns a [`ViewResult`]. Errors carry their
//! HTTP mapping so a handler can bubble them up with `?` and let axum render
//! them through [`IntoResponse`].
//!
//! # Error Categories
//!
//! - [`ViewError::ImproperlyConfigured`]: the view is missing something it
//!   needs (a model, a schema class, a URL keyword). Developer error.
//! - [`ViewError::NotFound`]: an expected, recoverable lookup miss.
//! - [`ViewError::NotImplemented`]: an abstract strategy method was called.
//! - [`ViewError::Validation`]: a schema rejected the request payload.
//! - [`ViewError::Query`]: the query collaborator failed.
//!
//! # Example
//!
//! ```rust,ignore
//! async fn retrieve(&self, request: ApiRequest, args: ViewArgs) -> ViewResult<Response> {
//!     let view = self.config.bind(request, &args);
//!     let user = view.get_object()?; // 404 when no row matches
//!     Ok(Json(user).into_response())
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// The main error type for view operations
#[derive(Debug, Error)]
pub enum ViewError {
    /// The view configuration cannot serve this call
    #[error("'{view}' is improperly configured: {message}")]
    ImproperlyConfigured { view: String, message: String },

    /// No row matched the lookup
    #[error("{entity_type} not found")]
    NotFound {
        entity_type: String,
        lookup: Option<String>,
    },

    /// An abstract method was called on a strategy that does not provide it
    #[error("{method} must be implemented")]
    NotImplemented { method: String },

    /// Payload validation failed
    #[error("Validation failed: {}", join_field_errors(.0))]
    Validation(Vec<FieldValidationError>),

    /// Malformed request
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// The view does not bind this HTTP verb
    #[error("Method {method} not allowed")]
    MethodNotAllowed { method: String },

    /// The query collaborator failed
    #[error(transparent)]
    Query(#[from] QueryError),
}

/// A single field validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn join_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while building or executing a [`Query`](crate::core::query::Query)
#[derive(Debug, Error)]
pub enum QueryError {
    /// `one()` found no row
    #[error("No row was found for {table}")]
    NoResultFound { table: String },

    /// `one()` found more than one row
    #[error("Multiple rows were found for {table} when exactly one was required")]
    MultipleResultsFound { table: String },

    /// Row could not be converted into the model type
    #[error("Failed to decode {table} row: {message}")]
    Decode { table: String, message: String },

    /// Model instance could not be converted into a row
    #[error("Failed to encode {table} row: {message}")]
    Encode { table: String, message: String },

    /// The session backend failed
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ViewError {
    /// Shorthand for a configuration fault on the named view
    pub fn improperly_configured(view: impl Into<String>, message: impl Into<String>) -> Self {
        ViewError::ImproperlyConfigured {
            view: view.into(),
            message: message.into(),
        }
    }

    pub fn not_implemented(method: impl Into<String>) -> Self {
        ViewError::NotImplemented {
            method: method.into(),
        }
    }

    pub fn not_found(entity_type: impl Into<String>) -> Self {
        ViewError::NotFound {
            entity_type: entity_type.into(),
            lookup: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ViewError::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ViewError::ImproperlyConfigured { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ViewError::NotFound { .. } => StatusCode::NOT_FOUND,
            ViewError::NotImplemented { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ViewError::Validation(_) => StatusCode::BAD_REQUEST,
            ViewError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ViewError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ViewError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ViewError::ImproperlyConfigured { .. } => "IMPROPERLY_CONFIGURED",
            ViewError::NotFound { .. } => "NOT_FOUND",
            ViewError::NotImplemented { .. } => "NOT_IMPLEMENTED",
            ViewError::Validation(_) => "VALIDATION_ERROR",
            ViewError::BadRequest { .. } => "BAD_REQUEST",
            ViewError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            ViewError::Query(QueryError::NoResultFound { .. }) => "NO_RESULT_FOUND",
            ViewError::Query(QueryError::MultipleResultsFound { .. }) => "MULTIPLE_RESULTS_FOUND",
            ViewError::Query(_) => "QUERY_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ViewError::NotFound {
                entity_type,
                lookup: Some(lookup),
            } => Some(serde_json::json!({
                "entity_type": entity_type,
                "lookup": lookup,
            })),
            ViewError::Validation(errors) => Some(serde_json::json!({ "fields": errors })),
            _ => None,
        }
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), "{}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}

impl From<validator::ValidationErrors> for ViewError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ViewError::Validation(fields)
    }
}

/// A specialized Result type for view operations
pub type ViewResult<T> = Result<T, ViewError>;
