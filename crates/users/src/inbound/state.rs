use std::sync::Arc;

use app_core::session::SessionManager;

use crate::usecase::login::LoginUseCase;
use crate::usecase::profile::ProfileUseCase;
use crate::usecase::settings::SettingsUseCase;
use crate::usecase::sync::SyncUseCase;

#[derive(Clone)]
pub struct UsersState {
    pub sessions: SessionManager,
    pub login: Arc<dyn LoginUseCase>,
    pub sync: Arc<dyn SyncUseCase>,
    pub settings: Arc<dyn SettingsUseCase>,
    pub profile: Arc<dyn ProfileUseCase>,
}

impl UsersState {
    pub fn new(
        sessions: SessionManager,
        login: Arc<dyn LoginUseCase>,
        sync: Arc<dyn SyncUseCase>,
        settings: Arc<dyn SettingsUseCase>,
        profile: Arc<dyn ProfileUseCase>,
    ) -> Self {
        Self { sessions, login, sync, settings, profile }
    }
}
