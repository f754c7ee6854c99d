//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used by every HTTP handler.
//! Lower layers have their own narrow error types (`StoreError` for persistence,
//! `AuthError` for token validation); both funnel into `AppError` through `From`
//! implementations so handlers can use the `?` operator.
//!
//! `AppError` implements `actix_web::error::ResponseError`, which turns each
//! variant into an HTTP status code and a `{ "error": message }` JSON body.

use actix_web::{error::ResponseError, HttpResponse};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::AuthError;
use crate::store::StoreError;

/// Represents all possible errors that can surface from a request handler.
#[derive(Debug)]
pub enum AppError {
    /// Authentication failed or is required but missing (HTTP 401).
    Unauthorized(String),
    /// Malformed or conflicting request (HTTP 400).
    BadRequest(String),
    /// The requested resource does not exist or is not visible to the caller (HTTP 404).
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500).
    InternalServerError(String),
    /// The persistence layer is unavailable or rejected a write (HTTP 500).
    StorageError(String),
    /// Input failed validation (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::StorageError(msg) => write!(f, "Storage Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::Unauthorized(msg) => HttpResponse::Unauthorized().json(json!({
                "error": msg
            })),
            AppError::BadRequest(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
            AppError::NotFound(msg) => HttpResponse::NotFound().json(json!({
                "error": msg
            })),
            AppError::InternalServerError(msg) => {
                log::error!("internal error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": msg
                }))
            }
            // Storage details stay in the log; clients only learn that the store failed.
            AppError::StorageError(msg) => {
                log::error!("storage error: {}", msg);
                HttpResponse::InternalServerError().json(json!({
                    "error": "Storage unavailable"
                }))
            }
            AppError::ValidationError(msg) => HttpResponse::BadRequest().json(json!({
                "error": msg
            })),
        }
    }
}

/// `EmailTaken` is a client mistake; `Backend` is a server fault.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("Record not found".into()),
            StoreError::EmailTaken => AppError::BadRequest("Email already registered".into()),
            StoreError::Backend(msg) => AppError::StorageError(msg),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(error: AuthError) -> AppError {
        match error {
            AuthError::InvalidToken => AppError::Unauthorized("Invalid token".into()),
            AuthError::Storage(e) => e.into(),
            AuthError::Signing(msg) => {
                AppError::InternalServerError(format!("Failed to sign token: {}", msg))
            }
        }
    }
}

/// The detailed validation messages are preserved.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}
