//! Folds axum's extractor rejections into [`AppError`] so malformed input is
//! answered with a 400 carrying the same JSON error body as every other error.

use axum::extract::rejection::{JsonRejection, QueryRejection};

use super::error::AppError;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(status = %rejection.status(), "Rejected JSON body");
        AppError::RequestFormat(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::RequestFormat(rejection.body_text())
    }
}
