use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::entity::settings::Settings;
use crate::domain::inout::prelude::*;
use crate::outbound::repository::UserRepository;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SettingsUseCase: Send + Sync {
    /// Stored settings, or the defaults when the user never saved any.
    async fn get_settings(&self, user_id: i64) -> Result<Settings, AppError>;

    async fn update_settings(&self, input: UpdateSettingsInput) -> Result<Settings, AppError>;
}

pub struct SettingsService {
    repo: Arc<dyn UserRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SettingsUseCase for SettingsService {
    async fn get_settings(&self, user_id: i64) -> Result<Settings, AppError> {
        Ok(self.repo.find_settings(user_id).await?.unwrap_or_default())
    }

    async fn update_settings(&self, input: UpdateSettingsInput) -> Result<Settings, AppError> {
        let mut settings = self.get_settings(input.user_id).await?;

        settings
            .apply(input.patch)
            .map_err(|reason| AppError::BadRequest(reason.to_string()))?;

        self.repo.save_settings(input.user_id, settings).await?;

        Ok(settings)
    }
}
