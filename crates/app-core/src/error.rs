//! The error type every handler and use case returns, and its mapping onto
//! HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bb8_redis::bb8;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use super::config::ConfigError;
use super::crypto::CryptoError;
use super::jwt::JwtError;
use super::oauth::OAuthError;

const INTERNAL_MESSAGE: &str = "An internal server error occurred";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Validation failed")]
    ValidationStr(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid request format: {0}")]
    RequestFormat(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Internal Libraries
    #[error("Config operation failed")]
    Config(#[from] ConfigError),

    #[error("Crypto operation failed")]
    Crypto(#[from] CryptoError),

    #[error("JWT operation failed")]
    Jwt(#[from] JwtError),

    #[error("Identity provider request failed: {0}")]
    OAuth(#[from] OAuthError),

    // Third Party Libraries
    #[error("Sea ORM operation failed")]
    Database(#[from] sea_orm::DbErr),

    #[error("Redis operation failed")]
    Redis(#[from] redis::RedisError),

    #[error("Redis connection pool operation failed")]
    RedisPool(#[from] bb8::RunError<redis::RedisError>),

    #[error("Template rendering failed")]
    Template(#[from] askama::Error),

    #[error("Serde JSON operation failed")]
    JsonParse(#[from] serde_json::Error),

    #[error("An internal server error occurred")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

fn internal() -> (StatusCode, String, Option<serde_json::Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string(), None)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, details) = match self {
            AppError::Validation(err) => {
                let details = json!(err.field_errors());
                (StatusCode::UNPROCESSABLE_ENTITY, "Validation failed".to_string(), Some(details))
            },
            AppError::ValidationStr(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg, None),
            AppError::BadRequest(msg) | AppError::RequestFormat(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),

            // Internal Libraries
            AppError::Config(err) => {
                tracing::error!("Config getter error: {:?}", err);
                internal()
            },
            AppError::Crypto(err) => {
                tracing::error!("Crypto error: {:?}", err);
                internal()
            },
            AppError::Jwt(err) => match err {
                JwtError::TokenExpired | JwtError::InvalidToken => {
                    tracing::debug!("JWT rejected: {:?}", err);
                    (StatusCode::UNAUTHORIZED, err.to_string(), None)
                },
                JwtError::TokenCreation => {
                    tracing::error!("JWT error: {:?}", err);
                    internal()
                },
            },
            AppError::OAuth(err) => {
                tracing::error!("Identity provider error: {:?}", err);
                match err {
                    OAuthError::InvalidUrl(_) => internal(),
                    _ => (StatusCode::BAD_GATEWAY, "Identity provider unavailable".to_string(), None),
                }
            },

            // Third Party Libraries
            AppError::Database(err) => {
                tracing::error!("Database error: {:?}", err);
                internal()
            },
            AppError::Redis(err) | AppError::RedisPool(bb8::RunError::User(err)) => {
                tracing::error!("Redis error: {:?}", err);
                internal()
            },
            AppError::RedisPool(bb8::RunError::TimedOut) => {
                tracing::error!("Redis connection pool timed out");
                internal()
            },
            AppError::Template(err) => {
                tracing::error!("Template error: {:?}", err);
                internal()
            },
            AppError::JsonParse(err) => {
                tracing::error!("Failed to parse JSON: {:?}", err);
                internal()
            },
            AppError::Internal => internal(),
        };

        (status, Json(ErrorResponse { message, details })).into_response()
    }
}
