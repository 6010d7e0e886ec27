use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::entity::quiz::RecentQuiz;
use crate::domain::entity::settings::Settings;
use crate::domain::entity::sync::UserSyncPayload;
use crate::domain::entity::user::{SealedCredentials, User};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    /// Writes the user, their terms, groups and memberships atomically and
    /// returns the stored user.
    async fn sync_user(&self, payload: UserSyncPayload) -> Result<User, AppError>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// `None` when the user is unknown or has never stored a token pair.
    async fn find_credentials(&self, user_id: i64) -> Result<Option<SealedCredentials>, AppError>;

    async fn find_settings(&self, user_id: i64) -> Result<Option<Settings>, AppError>;

    async fn save_settings(&self, user_id: i64, settings: Settings) -> Result<(), AppError>;

    /// Quizzes ordered by the user's latest activity, newest first.
    async fn find_recent_quizzes(&self, user_id: i64, limit: u64) -> Result<Vec<RecentQuiz>, AppError>;
}
