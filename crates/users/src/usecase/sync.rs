use std::sync::Arc;

use app_core::crypto::SecretCipher;
use app_core::error::AppError;
use app_core::oauth::{AccessToken, IdentityProvider};
use async_trait::async_trait;

use crate::domain::entity::study_group::StudyGroup;
use crate::domain::entity::sync::UserSyncPayload;
use crate::domain::entity::user::User;
use crate::domain::inout::prelude::*;
use crate::outbound::repository::UserRepository;

const MISSING_CREDENTIALS_MSG: &str = "Access token and secret are required";
const NO_STORED_CREDENTIALS_MSG: &str = "No identity provider credentials stored for this user";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait SyncUseCase: Send + Sync {
    /// Pulls the profile and groups behind an access token pair and stores
    /// them locally.
    async fn sync_user(&self, input: SyncUserInput) -> Result<User, AppError>;

    /// Re-runs [`SyncUseCase::sync_user`] with the token pair stored for an
    /// existing user.
    async fn refresh_user(&self, input: RefreshUserInput) -> Result<User, AppError>;
}

pub struct SyncService {
    provider: Arc<dyn IdentityProvider>,
    cipher: Arc<dyn SecretCipher>,
    repo: Arc<dyn UserRepository>,
}

impl SyncService {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        cipher: Arc<dyn SecretCipher>,
        repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self { provider, cipher, repo }
    }
}

#[async_trait]
impl SyncUseCase for SyncService {
    async fn sync_user(&self, input: SyncUserInput) -> Result<User, AppError> {
        if input.access_token.is_empty() || input.access_token_secret.is_empty() {
            return Err(AppError::ValidationStr(MISSING_CREDENTIALS_MSG.to_string()));
        }

        let access = AccessToken { token: input.access_token, secret: input.access_token_secret };

        // Everything remote is fetched before the write transaction opens.
        let profile = self.provider.fetch_user(&access).await?;
        let groups: Vec<StudyGroup> = self.provider.fetch_groups(&access).await?.iter().map(StudyGroup::from).collect();

        let payload = UserSyncPayload::new(
            profile,
            groups,
            self.cipher.seal(&access.token)?,
            self.cipher.seal(&access.secret)?,
        );

        tracing::debug!(user_id = payload.id, groups = payload.groups.len(), "Synchronizing user");

        self.repo.sync_user(payload).await
    }

    async fn refresh_user(&self, input: RefreshUserInput) -> Result<User, AppError> {
        let sealed = self
            .repo
            .find_credentials(input.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(NO_STORED_CREDENTIALS_MSG.to_string()))?;

        self.sync_user(SyncUserInput {
            access_token: self.cipher.open(&sealed.access_token)?,
            access_token_secret: self.cipher.open(&sealed.access_token_secret)?,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use app_core::crypto::MockSecretCipher;
    use app_core::oauth::{LangDict, MockIdentityProvider, OAuthError, ProviderGroup, ProviderUser};
    use mockall::predicate::*;

    use super::*;
    use crate::domain::entity::user::{SealedCredentials, Sex, StaffStatus, StudentStatus};
    use crate::outbound::repository::MockUserRepository;

    fn provider_user() -> ProviderUser {
        ProviderUser {
            id: 250123,
            first_name: "Jan".into(),
            last_name: "Kowalski".into(),
            email: Some("jan@example.com".into()),
            student_number: Some("250123".into()),
            sex: Some("M".into()),
            student_status: Some(2),
            staff_status: Some(0),
            photo_urls: HashMap::from([("200x200".to_string(), "https://photos/200.jpg".to_string())]),
        }
    }

    fn provider_group() -> ProviderGroup {
        ProviderGroup {
            course_unit_id: "81234".into(),
            group_number: 2,
            course_name: LangDict { pl: Some("Analiza".into()), en: None },
            term_id: "2024/25-Z".into(),
            class_type: LangDict { pl: Some("Wykład".into()), en: None },
        }
    }

    fn stored_user() -> User {
        User {
            id: 250123,
            first_name: "Jan".into(),
            last_name: "Kowalski".into(),
            email: Some("jan@example.com".into()),
            student_number: Some("250123".into()),
            sex: Sex::Male,
            student_status: StudentStatus::Active,
            staff_status: StaffStatus::None,
            photo_url: Some("https://photos/200.jpg".into()),
            study_groups: vec![],
        }
    }

    fn sealing_cipher() -> MockSecretCipher {
        let mut cipher = MockSecretCipher::new();
        cipher.expect_seal().returning(|plain| Ok(format!("sealed:{plain}")));
        cipher
            .expect_open()
            .returning(|sealed| Ok(sealed.trim_start_matches("sealed:").to_string()));
        cipher
    }

    #[tokio::test]
    async fn test_sync_user_builds_payload() {
        let mut provider = MockIdentityProvider::new();
        provider
            .expect_fetch_user()
            .withf(|access| access.token == "tok" && access.secret == "sec")
            .returning(|_| Box::pin(async move { Ok(provider_user()) }));
        provider
            .expect_fetch_groups()
            .returning(|_| Box::pin(async move { Ok(vec![provider_group()]) }));

        let mut repo = MockUserRepository::new();
        repo.expect_sync_user()
            .withf(|payload| {
                payload.id == 250123
                    && payload.sealed_access_token == "sealed:tok"
                    && payload.sealed_access_token_secret == "sealed:sec"
                    && payload.photo_url.as_deref() == Some("https://photos/200.jpg")
                    && payload.groups.len() == 1
                    && payload.groups[0].id == "81234-2"
                    && payload.groups[0].name == "Analiza - Wykład, grupa 2"
            })
            .times(1)
            .returning(|_| Box::pin(async move { Ok(stored_user()) }));

        let service = SyncService::new(Arc::new(provider), Arc::new(sealing_cipher()), Arc::new(repo));

        let user = service
            .sync_user(SyncUserInput { access_token: "tok".into(), access_token_secret: "sec".into() })
            .await
            .unwrap();

        assert_eq!(user.id, 250123);
    }

    #[tokio::test]
    async fn test_sync_user_requires_credentials() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_fetch_user().never();
        let mut repo = MockUserRepository::new();
        repo.expect_sync_user().never();

        let service = SyncService::new(Arc::new(provider), Arc::new(sealing_cipher()), Arc::new(repo));

        let result = service
            .sync_user(SyncUserInput { access_token: "tok".into(), access_token_secret: String::new() })
            .await;

        assert!(matches!(result, Err(AppError::ValidationStr(_))));
    }

    #[tokio::test]
    async fn test_sync_user_provider_failure_writes_nothing() {
        let mut provider = MockIdentityProvider::new();
        provider.expect_fetch_user().returning(|_| Box::pin(async move { Ok(provider_user()) }));
        provider.expect_fetch_groups().returning(|_| {
            Box::pin(async move { Err(OAuthError::Upstream { status: 503, body: "down".into() }) })
        });
        let mut repo = MockUserRepository::new();
        repo.expect_sync_user().never();

        let service = SyncService::new(Arc::new(provider), Arc::new(sealing_cipher()), Arc::new(repo));

        let result = service
            .sync_user(SyncUserInput { access_token: "tok".into(), access_token_secret: "sec".into() })
            .await;

        assert!(matches!(result, Err(AppError::OAuth(_))));
    }

    #[tokio::test]
    async fn test_refresh_user_uses_stored_credentials() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_credentials().with(eq(250123)).returning(|_| {
            Box::pin(async move {
                Ok(Some(SealedCredentials {
                    access_token: "sealed:tok".into(),
                    access_token_secret: "sealed:sec".into(),
                }))
            })
        });
        repo.expect_sync_user()
            .withf(|payload| payload.sealed_access_token == "sealed:tok")
            .returning(|_| Box::pin(async move { Ok(stored_user()) }));

        let mut provider = MockIdentityProvider::new();
        provider
            .expect_fetch_user()
            .withf(|access| access.token == "tok" && access.secret == "sec")
            .returning(|_| Box::pin(async move { Ok(provider_user()) }));
        provider.expect_fetch_groups().returning(|_| Box::pin(async move { Ok(vec![]) }));

        let service = SyncService::new(Arc::new(provider), Arc::new(sealing_cipher()), Arc::new(repo));

        let user = service.refresh_user(RefreshUserInput { user_id: 250123 }).await.unwrap();

        assert_eq!(user.id, 250123);
    }

    #[tokio::test]
    async fn test_refresh_user_without_credentials() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_credentials().returning(|_| Box::pin(async move { Ok(None) }));

        let service =
            SyncService::new(Arc::new(MockIdentityProvider::new()), Arc::new(sealing_cipher()), Arc::new(repo));

        let result = service.refresh_user(RefreshUserInput { user_id: 1 }).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
