use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use crate::database::models::TransitionRejection;
use crate::handlers::shared::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient balance: requested {requested} {kind}, remaining {remaining}")]
    InsufficientBalance {
        kind: String,
        requested: f64,
        remaining: f64,
    },

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Schedule conflict: {0}")]
    ScheduleConflict(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidRange(_) => StatusCode::BAD_REQUEST,
            AppError::ScheduleConflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        if status_code.is_server_error() {
            log::error!(
                "Request failed with status {}: {}",
                status_code,
                error_message
            );
        } else {
            log::warn!("Request rejected with status {}: {}", status_code, error_message);
        }

        let response_body = ApiResponse::<()>::error_with_code(self.code(), &error_message);

        HttpResponse::build(status_code).json(response_body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_error) = error {
            if db_error.is_unique_violation() {
                return AppError::Conflict(db_error.message().to_string());
            }
        }
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        log::error!("Anyhow error: {}", error);

        match error.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => AppError::from(sqlx_err),
            Err(original_error) => AppError::InternalServerError(Some(original_error.to_string())),
        }
    }
}

impl AppError {
    /// Stable machine-readable name for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::DatabaseError(_) => "database_error",
            AppError::Validation(_) => "validation_error",
            AppError::InsufficientBalance { .. } => "insufficient_balance",
            AppError::InvalidRange(_) => "invalid_range",
            AppError::ScheduleConflict(_) => "schedule_conflict",
            AppError::InvalidStateTransition { .. } => "invalid_state_transition",
            AppError::Conflict(_) => "conflict",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::Unauthorized => "unauthorized",
            AppError::InternalServerError(_) => "internal_error",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        AppError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Maps a rejected state-machine edge to the error reported to the caller.
    pub fn from_rejection(
        rejection: TransitionRejection,
        from: impl ToString,
        to: impl ToString,
    ) -> Self {
        match rejection {
            TransitionRejection::NoRole => {
                AppError::Forbidden("Not a party to this request".to_string())
            }
            TransitionRejection::Terminal | TransitionRejection::NotAllowed => {
                AppError::invalid_transition(from, to)
            }
        }
    }

    pub fn internal_server_error_message(message: impl Into<String>) -> Self {
        AppError::InternalServerError(Some(message.into()))
    }
}
