use app_core::error::AppError;
use app_core::extractors::AppQuery;
use app_core::middleware::Identity;
use askama::Template;
use axum::debug_handler;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tower_cookies::Cookies;

use crate::domain::inout::prelude::*;
use crate::inbound::http::redirect_or_root;
use crate::inbound::model::prelude::*;
use crate::inbound::state::UsersState;
use crate::inbound::view::{DashboardPage, LoginPage, ProfilePage};

const REFRESH_FAILED_FLASH: &str = "Wystąpił błąd podczas odświeżania danych użytkownika";

#[debug_handler]
pub async fn dashboard(
    State(state): State<UsersState>,
    identity: Option<Identity>,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let output = state.profile.dashboard(identity.map(|id| id.user_id)).await?;

    let page = DashboardPage {
        flashes: state.sessions.take_flashes(&cookies),
        logged_in: identity.is_some(),
        recent_quizzes: output.recent_quizzes,
    };

    Ok(Html(page.render()?))
}

#[debug_handler]
pub async fn login_page(
    State(state): State<UsersState>,
    identity: Option<Identity>,
    cookies: Cookies,
) -> Result<Html<String>, AppError> {
    let page = LoginPage { flashes: state.sessions.take_flashes(&cookies), logged_in: identity.is_some() };

    Ok(Html(page.render()?))
}

#[debug_handler]
pub async fn profile(
    State(state): State<UsersState>,
    identity: Option<Identity>,
    cookies: Cookies,
) -> Result<Response, AppError> {
    let Some(identity) = identity else {
        return Ok(Redirect::to("/login").into_response());
    };

    let user = state.profile.current_user(identity.user_id).await?;
    let page = ProfilePage { flashes: state.sessions.take_flashes(&cookies), logged_in: true, user };

    Ok(Html(page.render()?).into_response())
}

/// Re-synchronizes the caller with the identity provider. Failures are
/// reported as a flash message; the caller is redirected to `next` either way.
#[debug_handler]
pub async fn refresh(
    State(state): State<UsersState>,
    identity: Identity,
    cookies: Cookies,
    AppQuery(q): AppQuery<RefreshUserRequest>,
) -> Redirect {
    if let Err(err) = state.sync.refresh_user(RefreshUserInput { user_id: identity.user_id }).await {
        tracing::warn!(user_id = identity.user_id, error = %err, "Refreshing user data failed");
        state.sessions.push_flash(&cookies, &format!("{REFRESH_FAILED_FLASH}: {err}"));
    }

    redirect_or_root(&q.next)
}
