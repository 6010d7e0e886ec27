use app_core::error::AppError;
use app_core::extractors::AppJson;
use app_core::middleware::Identity;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, debug_handler};

use crate::domain::inout::prelude::*;
use crate::inbound::model::prelude::*;
use crate::inbound::state::UsersState;

#[debug_handler]
pub async fn get_settings(
    State(state): State<UsersState>,
    identity: Identity,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = state.settings.get_settings(identity.user_id).await?;

    Ok(Json(SettingsResponse::from(settings)))
}

#[debug_handler]
pub async fn update_settings(
    State(state): State<UsersState>,
    identity: Identity,
    AppJson(req): AppJson<UpdateSettingsRequest>,
) -> Result<StatusCode, AppError> {
    state
        .settings
        .update_settings(UpdateSettingsInput { user_id: identity.user_id, patch: req.into() })
        .await?;

    Ok(StatusCode::OK)
}

#[debug_handler]
pub async fn current_user(
    State(state): State<UsersState>,
    identity: Identity,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.profile.current_user(identity.user_id).await?;

    Ok(Json(UserResponse::from(user)))
}
