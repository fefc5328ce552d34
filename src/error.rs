use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

static EXPOSE_INTERNAL_ERRORS: AtomicBool = AtomicBool::new(false);

/// Let 500 responses carry the underlying error message (development only).
pub fn expose_internal_errors(enabled: bool) {
    EXPOSE_INTERNAL_ERRORS.store(enabled, Ordering::Relaxed);
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Invalid credentials")]
    InvalidCredentials { attempts_left: Option<i32> },

    #[error("Account locked until {lock_until}")]
    AccountLocked { lock_until: DateTime<Utc> },

    #[error("Admin user already exists")]
    AlreadyInitialized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {0}")]
    FileTooLarge(String),

    #[error("Too many files: maximum is {0}")]
    TooManyFiles(usize),

    #[error("Maximum {0} images can be pinned")]
    PinLimitExceeded(u64),

    #[error("Invalid payment signature")]
    InvalidSignature,

    #[error("Too many requests")]
    TooManyRequests(String),

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::InvalidCredentials { .. } => "INVALID_CREDENTIALS",
            AppError::AccountLocked { .. } => "ACCOUNT_LOCKED",
            AppError::AlreadyInitialized => "ALREADY_INITIALIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            AppError::FileTooLarge(_) => "FILE_TOO_LARGE",
            AppError::TooManyFiles(_) => "TOO_MANY_FILES",
            AppError::PinLimitExceeded(_) => "PIN_LIMIT_EXCEEDED",
            AppError::InvalidSignature => "INVALID_SIGNATURE",
            AppError::TooManyRequests(_) => "RATE_LIMITED",
            AppError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::InvalidFileType(msg)
            | AppError::FileTooLarge(msg)
            | AppError::TooManyRequests(msg) => msg.clone(),
            AppError::JwtError(_) => "Invalid or expired token".to_string(),
            AppError::InvalidCredentials {
                attempts_left: Some(left),
            } => format!("Invalid credentials. {left} attempts remaining before account lockout."),
            AppError::InvalidCredentials { attempts_left: None } => {
                "Invalid credentials".to_string()
            }
            AppError::AccountLocked { lock_until } => {
                let minutes = (*lock_until - Utc::now()).num_seconds().max(0) as f64 / 60.0;
                format!(
                    "Account is temporarily locked. Please try again in {} minutes.",
                    minutes.ceil() as i64
                )
            }
            AppError::AlreadyInitialized
            | AppError::TooManyFiles(_)
            | AppError::PinLimitExceeded(_)
            | AppError::InvalidSignature => self.to_string(),
            AppError::ExternalApiError(_) => "Payment gateway request failed".to_string(),
            _ if EXPOSE_INTERNAL_ERRORS.load(Ordering::Relaxed) => self.to_string(),
            _ => "Something went wrong!".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::AlreadyInitialized
            | AppError::InvalidFileType(_)
            | AppError::FileTooLarge(_)
            | AppError::TooManyFiles(_)
            | AppError::PinLimitExceeded(_)
            | AppError::InvalidSignature => StatusCode::BAD_REQUEST,
            AppError::AuthError(_)
            | AppError::JwtError(_)
            | AppError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            AppError::AccountLocked { .. } => StatusCode::LOCKED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        match self {
            AppError::ValidationError(msg) => log::warn!("Validation error: {msg}"),
            AppError::AuthError(msg) => log::warn!("Authentication error: {msg}"),
            AppError::InvalidCredentials { .. } | AppError::AccountLocked { .. } => {
                log::warn!("{self}")
            }
            AppError::ExternalApiError(msg) => log::error!("External API error: {msg}"),
            AppError::DatabaseError(err) => log::error!("Database error: {err}"),
            _ if status_code.is_server_error() => log::error!("Internal error: {self}"),
            _ => {}
        }

        let mut body = json!({
            "success": false,
            "message": self.public_message(),
            "code": self.code(),
        });
        match self {
            AppError::InvalidCredentials {
                attempts_left: Some(left),
            } => body["attemptsLeft"] = json!(left),
            AppError::AccountLocked { lock_until } => {
                body["attemptsLeft"] = json!(0);
                body["lockUntil"] = json!(lock_until);
            }
            _ => {}
        }

        HttpResponse::build(status_code).json(body)
    }
}
