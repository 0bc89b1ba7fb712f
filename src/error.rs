//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error code.
///
/// # Error Categories
///
/// - **Database Errors**: Any sqlx::Error from database operations
/// - **Tenant Errors**: Missing subdomain or unknown agency
/// - **Resource Errors**: Requested record not found within the tenant
/// - **Validation Errors**: Invalid request data
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Database operation failed (e.g., connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The request did not name a tenant.
    #[error("Subdomain required")]
    SubdomainRequired,

    /// The portal request did not carry a `studentId`.
    #[error("Student ID is required")]
    StudentIdRequired,

    /// No agency is registered under the requested subdomain.
    #[error("Agency not found")]
    AgencyNotFound,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Campaign not found")]
    CampaignNotFound,

    #[error("Lead not found")]
    LeadNotFound,

    #[error("Workflow not found")]
    WorkflowNotFound,

    /// Request body or parameters are invalid.
    ///
    /// The String contains details about what was invalid.
    #[error("Invalid request")]
    InvalidRequest(String),
}

impl AppError {
    /// HTTP status and stable machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::SubdomainRequired => (StatusCode::BAD_REQUEST, "subdomain_required"),
            AppError::StudentIdRequired => (StatusCode::BAD_REQUEST, "student_id_required"),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            AppError::AgencyNotFound => (StatusCode::NOT_FOUND, "agency_not_found"),
            AppError::StudentNotFound => (StatusCode::NOT_FOUND, "student_not_found"),
            AppError::CampaignNotFound => (StatusCode::NOT_FOUND, "campaign_not_found"),
            AppError::LeadNotFound => (StatusCode::NOT_FOUND, "lead_not_found"),
            AppError::WorkflowNotFound => (StatusCode::NOT_FOUND, "workflow_not_found"),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

// Extractor rejections share the standard error body instead of axum's
// plain-text responses.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// ```json
/// {
///   "error": {
///     "code": "campaign_not_found",
///     "message": "Campaign not found"
///   }
/// }
/// ```
///
/// Database errors are logged here and replaced by a generic message so no
/// internals reach the caller.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::InvalidRequest(msg) => msg,
            AppError::Database(ref err) => {
                tracing::error!(error = %err, "database error while handling request");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
