//! Query and JSON extractors that reject with [`AppError`].

use axum::body::Body;
use axum::extract::{FromRequest, FromRequestParts, Json, Query};
use axum::http::Request;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::error::AppError;

pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{Method, StatusCode, Uri};
    use axum::routing::put;
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct LoginQuery {
        #[serde(default)]
        jwt: bool,
        #[serde(default)]
        redirect: String,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct SettingsBody {
        initial_repetitions: Option<i32>,
    }

    #[tokio::test]
    async fn test_app_query_defaults() {
        let uri = "/login/usos?jwt=true".parse::<Uri>().unwrap();
        let (mut parts, _) = Request::builder().uri(uri).body(Body::empty()).unwrap().into_parts();

        let AppQuery(query) = AppQuery::<LoginQuery>::from_request_parts(&mut parts, &()).await.unwrap();

        assert_eq!(query, LoginQuery { jwt: true, redirect: String::new() });
    }

    #[tokio::test]
    async fn test_app_query_rejects_bad_bool() {
        let uri = "/login/usos?jwt=maybe".parse::<Uri>().unwrap();
        let (mut parts, _) = Request::builder().uri(uri).body(Body::empty()).unwrap().into_parts();

        let result = AppQuery::<LoginQuery>::from_request_parts(&mut parts, &()).await;

        assert!(matches!(result, Err(AppError::RequestFormat(_))));
    }

    #[tokio::test]
    async fn test_app_json_success() {
        let request = Request::builder()
            .method(Method::PUT)
            .header("content-type", "application/json")
            .body(Body::from(r#"{"initial_repetitions": 3}"#))
            .unwrap();

        let AppJson(body) = AppJson::<SettingsBody>::from_request(request, &()).await.unwrap();

        assert_eq!(body, SettingsBody { initial_repetitions: Some(3) });
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let app = Router::new().route("/api/settings", put(|AppJson(_): AppJson<SettingsBody>| async { "ok" }));

        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/settings")
            .header("content-type", "application/json")
            .body(Body::from("{invalid json}"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
