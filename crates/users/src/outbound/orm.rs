use std::sync::Arc;

use app_core::error::AppError;
use app_core::time::now_fixed;
use app_orm::prelude::{QuizProgress, Quizzes, StudyGroups, Terms, UserSettings, UserStudyGroups, Users};
use app_orm::{quiz_progress, quizzes, study_groups, terms, user_settings, user_study_groups, users};
use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use super::repository::UserRepository;
use crate::domain::entity::quiz::{QuizVisibility, RecentQuiz};
use crate::domain::entity::settings::Settings;
use crate::domain::entity::study_group::StudyGroup;
use crate::domain::entity::sync::UserSyncPayload;
use crate::domain::entity::user::{SealedCredentials, Sex, StaffStatus, StudentStatus, User};

/// Data access for users, their study groups, settings and quiz activity.
pub struct UserORM {
    db: Arc<DatabaseConnection>,
}

impl UserORM {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ===== Mappers from database models to domain entities =====

    fn to_user(&self, model: users::Model, groups: Vec<study_groups::Model>) -> User {
        User {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            student_number: model.student_number,
            sex: Sex::from_code(model.sex.as_deref()),
            student_status: StudentStatus::from_i16(model.student_status),
            staff_status: StaffStatus::from_i16(model.staff_status),
            photo_url: model.photo_url,
            study_groups: groups.into_iter().map(|g| self.to_study_group(g)).collect(),
        }
    }

    fn to_study_group(&self, model: study_groups::Model) -> StudyGroup {
        StudyGroup { id: model.id, name: model.name, term_id: model.term_id }
    }

    fn to_settings(&self, model: user_settings::Model) -> Settings {
        Settings {
            sync_progress: model.sync_progress,
            initial_repetitions: model.initial_repetitions,
            wrong_answer_repetitions: model.wrong_answer_repetitions,
        }
    }

    fn to_recent_quiz(&self, progress: quiz_progress::Model, quiz: quizzes::Model) -> RecentQuiz {
        RecentQuiz {
            id: quiz.id,
            title: quiz.title,
            visibility: QuizVisibility::from_i16(quiz.visibility).unwrap_or_else(|| {
                tracing::warn!(quiz_id = %quiz.id, code = quiz.visibility, "Unknown quiz visibility, treating as private");
                QuizVisibility::Private
            }),
            last_activity: progress.last_activity.into(),
        }
    }

    // ===== Helpers =====

    /// Inserts the user row keyed by provider id, or refreshes its profile and
    /// tokens when it exists. Password and creation time are written once.
    async fn upsert_user<C>(&self, db: &C, payload: &UserSyncPayload) -> Result<(), AppError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        let now = now_fixed();
        let model = users::ActiveModel {
            id: ActiveValue::Set(payload.id),
            first_name: ActiveValue::Set(payload.first_name.clone()),
            last_name: ActiveValue::Set(payload.last_name.clone()),
            email: ActiveValue::Set(payload.email.clone()),
            student_number: ActiveValue::Set(payload.student_number.clone()),
            sex: ActiveValue::Set(payload.sex.code().map(str::to_string)),
            student_status: ActiveValue::Set(payload.student_status as i16),
            staff_status: ActiveValue::Set(payload.staff_status as i16),
            photo_url: ActiveValue::Set(payload.photo_url.clone()),
            access_token: ActiveValue::Set(Some(payload.sealed_access_token.clone())),
            access_token_secret: ActiveValue::Set(Some(payload.sealed_access_token_secret.clone())),
            // Identity is provider-only; this can never match a password hash.
            password: ActiveValue::Set(format!("!{}", Uuid::new_v4().simple())),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
        };

        let on_conflict = OnConflict::column(users::Column::Id)
            .update_columns([
                users::Column::FirstName,
                users::Column::LastName,
                users::Column::Email,
                users::Column::StudentNumber,
                users::Column::Sex,
                users::Column::StudentStatus,
                users::Column::StaffStatus,
                users::Column::PhotoUrl,
                users::Column::AccessToken,
                users::Column::AccessTokenSecret,
                users::Column::UpdatedAt,
            ])
            .to_owned();

        tracing::debug!(user_id = payload.id, "Upserting user from identity provider profile");
        Users::insert(model).on_conflict(on_conflict).exec_without_returning(db).await?;

        Ok(())
    }

    async fn ensure_term<C>(&self, db: &C, term_id: &str) -> Result<(), AppError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        let term = terms::ActiveModel { id: ActiveValue::Set(term_id.to_string()) };
        let on_conflict = OnConflict::column(terms::Column::Id).do_nothing().to_owned();

        ignore_existing(Terms::insert(term).on_conflict(on_conflict).exec_without_returning(db).await)
    }

    async fn upsert_study_group<C>(&self, db: &C, group: &StudyGroup) -> Result<(), AppError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        let model = study_groups::ActiveModel {
            id: ActiveValue::Set(group.id.clone()),
            name: ActiveValue::Set(group.name.clone()),
            term_id: ActiveValue::Set(group.term_id.clone()),
        };
        let on_conflict = OnConflict::column(study_groups::Column::Id)
            .update_columns([study_groups::Column::Name, study_groups::Column::TermId])
            .to_owned();

        StudyGroups::insert(model).on_conflict(on_conflict).exec_without_returning(db).await?;
        Ok(())
    }

    async fn ensure_membership<C>(&self, db: &C, user_id: i64, group_id: &str) -> Result<(), AppError>
    where
        C: ConnectionTrait + Send + Sync,
    {
        let link = user_study_groups::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            study_group_id: ActiveValue::Set(group_id.to_string()),
        };
        let on_conflict =
            OnConflict::columns([user_study_groups::Column::UserId, user_study_groups::Column::StudyGroupId])
                .do_nothing()
                .to_owned();

        ignore_existing(UserStudyGroups::insert(link).on_conflict(on_conflict).exec_without_returning(db).await)
    }
}

/// An `ON CONFLICT DO NOTHING` insert that hit an existing row is not an error.
fn ignore_existing(result: Result<u64, DbErr>) -> Result<(), AppError> {
    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl UserRepository for UserORM {
    async fn sync_user(&self, payload: UserSyncPayload) -> Result<User, AppError> {
        let txn = self.db.begin().await?;

        self.upsert_user(&txn, &payload).await?;
        for group in &payload.groups {
            self.ensure_term(&txn, &group.term_id).await?;
            self.upsert_study_group(&txn, group).await?;
            self.ensure_membership(&txn, payload.id, &group.id).await?;
        }

        txn.commit().await?;

        self.find_user_by_id(payload.id).await?.ok_or(AppError::Internal)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let Some(user) = Users::find_by_id(id).one(self.db.as_ref()).await? else {
            return Ok(None);
        };

        let groups = StudyGroups::find()
            .inner_join(UserStudyGroups)
            .filter(user_study_groups::Column::UserId.eq(id))
            .order_by_asc(study_groups::Column::Name)
            .all(self.db.as_ref())
            .await?;

        Ok(Some(self.to_user(user, groups)))
    }

    async fn find_credentials(&self, user_id: i64) -> Result<Option<SealedCredentials>, AppError> {
        let user = Users::find_by_id(user_id).one(self.db.as_ref()).await?;

        Ok(user.and_then(|u| match (u.access_token, u.access_token_secret) {
            (Some(access_token), Some(access_token_secret)) => {
                Some(SealedCredentials { access_token, access_token_secret })
            },
            _ => None,
        }))
    }

    async fn find_settings(&self, user_id: i64) -> Result<Option<Settings>, AppError> {
        let model = UserSettings::find_by_id(user_id).one(self.db.as_ref()).await?;

        Ok(model.map(|m| self.to_settings(m)))
    }

    async fn save_settings(&self, user_id: i64, settings: Settings) -> Result<(), AppError> {
        let model = user_settings::ActiveModel {
            user_id: ActiveValue::Set(user_id),
            sync_progress: ActiveValue::Set(settings.sync_progress),
            initial_repetitions: ActiveValue::Set(settings.initial_repetitions),
            wrong_answer_repetitions: ActiveValue::Set(settings.wrong_answer_repetitions),
        };

        let on_conflict = OnConflict::column(user_settings::Column::UserId)
            .update_columns([
                user_settings::Column::SyncProgress,
                user_settings::Column::InitialRepetitions,
                user_settings::Column::WrongAnswerRepetitions,
            ])
            .to_owned();

        UserSettings::insert(model).on_conflict(on_conflict).exec_without_returning(self.db.as_ref()).await?;

        Ok(())
    }

    async fn find_recent_quizzes(&self, user_id: i64, limit: u64) -> Result<Vec<RecentQuiz>, AppError> {
        let rows = QuizProgress::find()
            .filter(quiz_progress::Column::UserId.eq(user_id))
            .order_by_desc(quiz_progress::Column::LastActivity)
            .limit(limit)
            .find_also_related(Quizzes)
            .all(self.db.as_ref())
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(progress, quiz)| quiz.map(|q| self.to_recent_quiz(progress, q)))
            .collect())
    }
}
