use std::sync::Arc;

use app_core::error::AppError;
use async_trait::async_trait;

use crate::domain::entity::user::User;
use crate::domain::inout::prelude::*;
use crate::outbound::repository::UserRepository;

const USER_NOT_FOUND_MSG: &str = "User not found";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ProfileUseCase: Send + Sync {
    async fn current_user(&self, user_id: i64) -> Result<User, AppError>;

    /// Dashboard content; anonymous visitors get an empty dashboard.
    async fn dashboard(&self, user_id: Option<i64>) -> Result<DashboardOutput, AppError>;
}

pub struct ProfileService {
    repo: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ProfileUseCase for ProfileService {
    async fn current_user(&self, user_id: i64) -> Result<User, AppError> {
        self.repo
            .find_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND_MSG.to_string()))
    }

    async fn dashboard(&self, user_id: Option<i64>) -> Result<DashboardOutput, AppError> {
        let Some(user_id) = user_id else {
            return Ok(DashboardOutput::default());
        };

        let recent_quizzes = self.repo.find_recent_quizzes(user_id, RECENT_QUIZZES_LIMIT).await?;

        Ok(DashboardOutput { recent_quizzes })
    }
}
