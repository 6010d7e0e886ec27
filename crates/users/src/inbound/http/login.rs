use app_core::error::AppError;
use app_core::extractors::{AppJson, AppQuery};
use app_core::response::Response;
use axum::debug_handler;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect};
use tower_cookies::Cookies;

use crate::domain::inout::prelude::*;
use crate::inbound::http::redirect_or_root;
use crate::inbound::model::prelude::*;
use crate::inbound::state::UsersState;

#[debug_handler]
pub async fn login_usos(
    State(state): State<UsersState>,
    AppQuery(q): AppQuery<LoginUsosRequest>,
) -> Result<Redirect, AppError> {
    let output = state
        .login
        .initiate(InitiateLoginInput { confirm_user: q.confirm_user, jwt: q.jwt, redirect: q.redirect })
        .await?;

    Ok(Redirect::to(&output.authorization_url))
}

#[debug_handler]
pub async fn authorize(
    State(state): State<UsersState>,
    cookies: Cookies,
    AppQuery(q): AppQuery<AuthorizeRequest>,
) -> Result<Redirect, AppError> {
    let output = state
        .login
        .authorize(AuthorizeInput {
            oauth_token: q.oauth_token,
            oauth_verifier: q.oauth_verifier,
            jwt: q.jwt,
            redirect: q.redirect,
        })
        .await?;

    match output {
        AuthorizeOutput::Session { user_id, redirect } => {
            state.sessions.login(&cookies, user_id)?;
            Ok(redirect_or_root(&redirect))
        },
        AuthorizeOutput::Tokens { redirect_url, .. } => Ok(redirect_or_root(&redirect_url)),
    }
}

#[debug_handler]
pub async fn logout(State(state): State<UsersState>, cookies: Cookies) -> Redirect {
    state.sessions.logout(&cookies);
    Redirect::to("/")
}

#[debug_handler]
pub async fn refresh_token(
    State(state): State<UsersState>,
    AppJson(req): AppJson<RefreshTokenRequest>,
) -> impl IntoResponse {
    state
        .login
        .refresh_token(RefreshTokenInput { refresh_token: req.refresh_token })
        .await
        .map(|output| RefreshTokenResponse { access_token: output.access_token, refresh_token: output.refresh_token })
        .map(|data| Response::with_message(data, "Token refreshed"))
}
