//! Envelope for JSON API responses: `{"message": ..., "data": ...}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct Response<T> {
    message: String,
    data: T,
}

impl<T> Response<T> {
    pub fn with_message(data: T, message: &str) -> Self {
        Self { message: message.to_string(), data }
    }
}

impl<T: Serialize> IntoResponse for Response<T> {
    fn into_response(self) -> axum::response::Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    #[tokio::test]
    async fn test_response_into_response() {
        let http_resp = Response::with_message(json!({"access_token": "a"}), "Token refreshed").into_response();

        assert_eq!(http_resp.status(), StatusCode::OK);

        let body_bytes = to_bytes(http_resp.into_body(), usize::MAX).await.unwrap();
        let json_val: Value = serde_json::from_slice(&body_bytes).unwrap();

        assert_eq!(json_val["message"], json!("Token refreshed"));
        assert_eq!(json_val["data"]["access_token"], json!("a"));
    }
}
