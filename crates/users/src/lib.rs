//! Users feature: login through USOS, profile synchronization, settings and
//! the dashboard.

mod domain;
mod inbound;
mod outbound;
mod usecase;

use std::sync::Arc;
use std::time::Duration;

use app_core::config::{Config, ConfigError};
use app_core::crypto::SecretCipher;
use app_core::error::AppError;
use app_core::jwt::TokenManager;
use app_core::oauth::IdentityProvider;
use app_core::session::SessionManager;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
pub use inbound::router::create_router;
pub use inbound::state::UsersState;
use sea_orm::DatabaseConnection;

use crate::outbound::orm::UserORM;
use crate::outbound::pending::{MemoryPendingStore, PendingTokenStore, RedisPendingStore};
use crate::usecase::login::LoginService;
use crate::usecase::profile::ProfileService;
use crate::usecase::settings::SettingsService;
use crate::usecase::sync::SyncService;

pub struct Dependency {
    pub db: Arc<DatabaseConnection>,
    pub rds: Option<Pool<RedisConnectionManager>>,
    pub config: Arc<Config>,
    pub token: Arc<dyn TokenManager>,
    pub cipher: Arc<dyn SecretCipher>,
    pub provider: Arc<dyn IdentityProvider>,
    pub sessions: SessionManager,
}

fn pending_store(dep: &Dependency) -> Result<Arc<dyn PendingTokenStore>, AppError> {
    let ttl = Duration::from_secs(dep.config.get_or("pending_tokens.ttl_secs", 600));
    let backend: String = dep.config.get_or("pending_tokens.backend", "memory".to_string());

    match (backend.as_str(), &dep.rds) {
        ("redis", Some(pool)) => Ok(Arc::new(RedisPendingStore::new(pool.clone(), ttl))),
        ("redis", None) => Err(AppError::Config(ConfigError::Invalid(
            "pending_tokens.backend is redis but redis.url is not configured".to_string(),
        ))),
        _ => {
            let capacity = dep.config.get_or("pending_tokens.capacity", 10_000);
            Ok(Arc::new(MemoryPendingStore::new(ttl, capacity)))
        },
    }
}

pub fn new(dep: Dependency) -> Result<UsersState, AppError> {
    let pending = pending_store(&dep)?;
    let repo = Arc::new(UserORM::new(dep.db));

    let sync_svc = Arc::new(SyncService::new(dep.provider.clone(), dep.cipher, repo.clone()));
    let login_svc = Arc::new(LoginService::new(dep.config, dep.provider, pending, sync_svc.clone(), dep.token));
    let settings_svc = Arc::new(SettingsService::new(repo.clone()));
    let profile_svc = Arc::new(ProfileService::new(repo));

    Ok(UsersState::new(dep.sessions, login_svc, sync_svc, settings_svc, profile_svc))
}
