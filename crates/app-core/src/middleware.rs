//! Application-specific Axum middleware: caller identification and request
//! logging.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{FromRequestParts, OptionalFromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{HeaderName, HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_cookies::Cookies;

use super::error::AppError;
use super::jwt::TokenManager;
use super::session::SessionManager;

#[derive(Clone)]
pub struct AuthContext {
    pub token: Arc<dyn TokenManager>,
    pub sessions: SessionManager,
}

/// The authenticated caller, placed in request extensions by [`identify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .ok_or_else(|| AppError::Forbidden("Authentication required".to_string()))
    }
}

impl<S> OptionalFromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Option<Self>, Self::Rejection> {
        Ok(parts.extensions.get::<Identity>().copied())
    }
}

/// Resolves the caller from a bearer access token or, failing that, from the
/// session cookie. A bearer token that does not validate is rejected with 401;
/// a missing or stale session simply leaves the request anonymous.
pub async fn identify(
    State(ctx): State<AuthContext>,
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let identity = match bearer {
        Some(token) => {
            let claims = ctx.token.validate_access_token(token)?;
            Some(Identity { user_id: claims.sub })
        },
        None => ctx.sessions.user_id(&cookies).map(|user_id| Identity { user_id }),
    };

    if let Some(identity) = identity {
        req.extensions_mut().insert(identity);
    }

    Ok(next.run(req).await)
}

pub async fn request_response_logger(mut req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let start_time = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let c_id = req
        .headers()
        .get("x-request-id")
        .and_then(|id| id.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    req.extensions_mut().insert(c_id.clone());

    tracing::info!(_cID = c_id, method = %method, uri = %uri, "Incoming request");

    let mut response = next.run(req).await;

    let duration_ms = start_time.elapsed().as_millis();
    let status = response.status();

    response.headers_mut().insert(
        HeaderName::from_static("x-request-id"),
        HeaderValue::from_str(c_id.as_str()).unwrap_or_else(|_| HeaderValue::from_static("invalid-correlation-id")),
    );

    if status.is_server_error() {
        tracing::error!(_cID = c_id, method = %method, uri = %uri, status = %status, duration_ms, "Request completed with server error");
    } else if status.is_client_error() {
        tracing::warn!(_cID = c_id, method = %method, uri = %uri, status = %status, duration_ms, "Request completed with client error");
    } else {
        tracing::info!(_cID = c_id, method = %method, uri = %uri, status = %status, duration_ms, "Request completed successfully");
    }

    Ok(response)
}
