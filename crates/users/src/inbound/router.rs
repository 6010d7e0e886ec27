use app_core::middleware::{AuthContext, identify};
use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::inbound::http::api::*;
use crate::inbound::http::login::*;
use crate::inbound::http::page::*;
use crate::inbound::state::UsersState;

/// Every route runs behind [`identify`]; handlers that need a caller take an
/// `Identity` and reject anonymous requests themselves.
pub fn create_router(state: UsersState, auth: AuthContext) -> Router {
    let page_routes = Router::new()
        .route("/", get(dashboard))
        .route("/login", get(login_page))
        .route("/profile", get(profile))
        .route("/refresh", get(refresh));

    let login_routes = Router::new()
        .route("/login/usos", get(login_usos))
        .route("/authorize", get(authorize))
        .route("/logout", get(logout));

    let api_routes = Router::new()
        .route("/api/settings", get(get_settings).put(update_settings))
        .route("/api/user", get(current_user))
        .route("/api/token/refresh", post(refresh_token));

    Router::new()
        .merge(page_routes)
        .merge(login_routes)
        .merge(api_routes)
        .layer(middleware::from_fn_with_state(auth, identify))
        .with_state(state)
}
