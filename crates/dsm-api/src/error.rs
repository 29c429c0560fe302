use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ErrorBody;

/// Error taxonomy used to pick a status code and a client-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Unauthorized,
    Forbidden,
    NotFound,
    Duplicate,
    RateLimited,
    Internal,
}

impl ErrorKind {
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Validation | Self::Duplicate => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Duplicate(String),
    #[error("Too many requests, please try again later")]
    RateLimited,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("Email error: {0}")]
    Email(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Message attached to unauthenticated requests on protected routes
pub const NOT_AUTHORIZED: &str = "Not authorized to access this route";

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Underlying error text carried as a response extension.
///
/// Only surfaced to clients in development, see `middleware::error_detail`.
#[derive(Clone, Debug)]
pub struct ErrorReport(pub String);

impl ApiError {
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }

    pub fn unauthorized() -> Self {
        Self::Auth(NOT_AUTHORIZED.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Auth(_) => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Duplicate(_) => ErrorKind::Duplicate,
            Self::RateLimited => ErrorKind::RateLimited,
            Self::Database(e) => classify_database_error(e).0,
            // Verification failures become `unauthorized()` in `auth::jwt`,
            // so what reaches here is a signing failure
            Self::Jwt(_) | Self::Bcrypt(_) | Self::Email(_) | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Message safe to return to clients
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::Auth(msg)
            | Self::Forbidden(msg)
            | Self::NotFound(msg)
            | Self::Duplicate(msg) => msg.clone(),
            Self::RateLimited => self.to_string(),
            Self::Database(e) => classify_database_error(e).1,
            Self::Jwt(_) | Self::Bcrypt(_) | Self::Email(_) | Self::Internal(_) => {
                INTERNAL_MESSAGE.to_string()
            }
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{err:#}"))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {err}"))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        Self::Validation("Invalid id format".to_string())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let status = kind.status();

        if kind == ErrorKind::Internal {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut response = (status, Json(ErrorBody::new(self.public_message()))).into_response();
        if kind == ErrorKind::Internal {
            response
                .extensions_mut()
                .insert(ErrorReport(self.to_string()));
        }
        response
    }
}

// Table names, longest shared prefixes first so constraint names strip cleanly
const TABLES: &[&str] = &[
    "vehicle_maintenance",
    "payment_plans",
    "exam_results",
    "enrollments",
    "instructors",
    "candidates",
    "payments",
    "sessions",
    "vehicles",
    "courses",
    "admins",
    "exams",
];

/// Extract the column part of a constraint name such as `candidates_email_key`
fn constraint_field(constraint: &str, suffix: &str) -> String {
    let base = constraint.strip_suffix(suffix).unwrap_or(constraint);
    TABLES
        .iter()
        .find_map(|table| base.strip_prefix(table)?.strip_prefix('_'))
        .unwrap_or(base)
        .to_string()
}

fn duplicate_message(constraint: &str) -> String {
    match constraint {
        "sessions_instructor_slot_key" => {
            "Instructor already has a session scheduled at this date and time".to_string()
        }
        "sessions_vehicle_slot_key" => {
            "Vehicle is already booked at this date and time".to_string()
        }
        "instructors_vehicle_id_key" => {
            "Vehicle is already assigned to another instructor".to_string()
        }
        "enrollments_active_category_key" => {
            "Candidate already has an active enrollment for this license category".to_string()
        }
        "exam_results_exam_id_candidate_id_key" => {
            "A result is already recorded for this candidate and exam".to_string()
        }
        other => format!(
            "Duplicate value for field: {}",
            constraint_field(other, "_key")
        ),
    }
}

/// Map a sqlx error to an error kind and a client-facing message.
///
/// Postgres codes: 23505 unique, 23503 foreign key, 23514 check, 22P02 bad input.
pub fn classify_database_error(err: &sqlx::Error) -> (ErrorKind, String) {
    match err {
        sqlx::Error::RowNotFound => (ErrorKind::NotFound, "Resource not found".to_string()),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or_default();
            match db_err.code().as_deref() {
                Some("23505") => (ErrorKind::Duplicate, duplicate_message(constraint)),
                Some("23503") if db_err.message().starts_with("update or delete") => (
                    ErrorKind::Validation,
                    "Cannot delete: record is still referenced by other records".to_string(),
                ),
                Some("23503") => (
                    ErrorKind::Validation,
                    format!(
                        "Invalid reference: {} does not exist",
                        constraint_field(constraint, "_fkey")
                    ),
                ),
                Some("23514") => (
                    ErrorKind::Validation,
                    format!("Value out of allowed range ({constraint})"),
                ),
                Some("22P02") | Some("22007") | Some("22008") => {
                    (ErrorKind::Validation, "Invalid input value".to_string())
                }
                _ => (ErrorKind::Internal, INTERNAL_MESSAGE.to_string()),
            }
        }
        sqlx::Error::PoolTimedOut => (
            ErrorKind::Internal,
            "Service temporarily unavailable".to_string(),
        ),
        _ => (ErrorKind::Internal, INTERNAL_MESSAGE.to_string()),
    }
}
