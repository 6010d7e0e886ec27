use axum::http::HeaderValue;
use axum::response::Redirect;

pub mod api;
pub mod login;
pub mod page;

/// Redirects to a caller-supplied target, falling back to `/` when the target
/// cannot be sent as a `Location` header (control characters and the like).
pub(crate) fn redirect_or_root(target: &str) -> Redirect {
    if HeaderValue::try_from(target).is_ok() {
        Redirect::to(target)
    } else {
        tracing::warn!(redirect = %target.escape_debug(), "Redirect target is not a valid header value");
        Redirect::to("/")
    }
}
