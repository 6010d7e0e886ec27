use std::sync::Arc;

use app_core::config::Config;
use app_core::error::AppError;
use app_core::jwt::TokenManager;
use app_core::oauth::{IdentityProvider, OAuthError, RequestToken};
use async_trait::async_trait;
use url::Url;
use validator::Validate;

use crate::domain::inout::prelude::*;
use crate::outbound::pending::PendingTokenStore;
use crate::usecase::sync::SyncUseCase;

const JWT_WITHOUT_REDIRECT_MSG: &str = "Redirect URL must be provided when using JWT";
const UNKNOWN_REQUEST_TOKEN_MSG: &str = "Unknown or expired request token";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait LoginUseCase: Send + Sync {
    /// Starts the identity provider handshake and returns where to send the
    /// user.
    async fn initiate(&self, input: InitiateLoginInput) -> Result<InitiateLoginOutput, AppError>;

    /// Completes the handshake for a request token issued by
    /// [`LoginUseCase::initiate`].
    async fn authorize(&self, input: AuthorizeInput) -> Result<AuthorizeOutput, AppError>;

    async fn refresh_token(&self, input: RefreshTokenInput) -> Result<RefreshTokenOutput, AppError>;
}

pub struct LoginService {
    config: Arc<Config>,
    provider: Arc<dyn IdentityProvider>,
    pending: Arc<dyn PendingTokenStore>,
    sync: Arc<dyn SyncUseCase>,
    token: Arc<dyn TokenManager>,
}

impl LoginService {
    pub fn new(
        config: Arc<Config>,
        provider: Arc<dyn IdentityProvider>,
        pending: Arc<dyn PendingTokenStore>,
        sync: Arc<dyn SyncUseCase>,
        token: Arc<dyn TokenManager>,
    ) -> Self {
        Self { config, provider, pending, sync, token }
    }

    /// `{public_url}/authorize?jwt=..[&redirect=..]`, echoing the login flags
    /// back to the callback.
    fn callback_url(&self, jwt: bool, redirect: &str) -> Result<String, AppError> {
        let public_url: String = self.config.get("server.public_url")?;
        let mut url = Url::parse(&public_url)
            .and_then(|base| base.join("authorize"))
            .map_err(OAuthError::from)?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("jwt", if jwt { "true" } else { "false" });
            if !redirect.is_empty() {
                query.append_pair("redirect", redirect);
            }
        }

        Ok(url.to_string())
    }
}

/// Appends the token pair to `redirect`, keeping any query it already has.
fn with_token_query(redirect: &str, access_token: &str, refresh_token: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("access_token", access_token)
        .append_pair("refresh_token", refresh_token)
        .finish();
    let separator = if redirect.contains('?') { '&' } else { '?' };

    format!("{redirect}{separator}{query}")
}

#[async_trait]
impl LoginUseCase for LoginService {
    async fn initiate(&self, input: InitiateLoginInput) -> Result<InitiateLoginOutput, AppError> {
        if input.jwt && input.redirect.is_empty() {
            return Err(AppError::Forbidden(JWT_WITHOUT_REDIRECT_MSG.to_string()));
        }

        let callback_url = self.callback_url(input.jwt, &input.redirect)?;
        let request = self.provider.request_authorization(&callback_url, input.confirm_user).await?;

        self.pending
            .put(&request.request_token.token, &request.request_token.secret)
            .await?;

        Ok(InitiateLoginOutput { authorization_url: request.url })
    }

    async fn authorize(&self, input: AuthorizeInput) -> Result<AuthorizeOutput, AppError> {
        input.validate()?;

        let secret = self
            .pending
            .take(&input.oauth_token)
            .await?
            .ok_or_else(|| AppError::Forbidden(UNKNOWN_REQUEST_TOKEN_MSG.to_string()))?;

        let request_token = RequestToken { token: input.oauth_token, secret };
        let access = self.provider.exchange_verifier(&request_token, &input.oauth_verifier).await?;

        let user = self
            .sync
            .sync_user(SyncUserInput { access_token: access.token, access_token_secret: access.secret })
            .await?;

        tracing::info!(user_id = user.id, jwt = input.jwt, "User logged in through identity provider");

        if input.jwt {
            let tokens = self.token.create_pair(user.id)?;
            let redirect_url = with_token_query(&input.redirect, &tokens.access_token, &tokens.refresh_token);
            return Ok(AuthorizeOutput::Tokens { redirect_url, tokens });
        }

        Ok(AuthorizeOutput::Session { user_id: user.id, redirect: input.redirect })
    }

    async fn refresh_token(&self, input: RefreshTokenInput) -> Result<RefreshTokenOutput, AppError> {
        input.validate()?;

        let claims = self.token.validate_refresh_token(&input.refresh_token)?;
        let pair = self.token.create_pair(claims.sub)?;

        Ok(RefreshTokenOutput { access_token: pair.access_token, refresh_token: pair.refresh_token })
    }
}

#[cfg(test)]
mod tests {
    use app_core::config::test_utils::TestConfigBuilder;
    use app_core::jwt::{Claims, JwtError, MockTokenManager, TokenKind, TokenPair};
    use app_core::oauth::{AccessToken, AuthorizationRequest, MockIdentityProvider};
    use mockall::predicate::*;

    use super::*;
    use crate::domain::entity::user::{Sex, StaffStatus, StudentStatus, User};
    use crate::outbound::pending::MockPendingTokenStore;
    use crate::usecase::sync::MockSyncUseCase;

    struct Mocks {
        provider: MockIdentityProvider,
        pending: MockPendingTokenStore,
        sync: MockSyncUseCase,
        token: MockTokenManager,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                provider: MockIdentityProvider::new(),
                pending: MockPendingTokenStore::new(),
                sync: MockSyncUseCase::new(),
                token: MockTokenManager::new(),
            }
        }

        fn into_service(self) -> LoginService {
            let config = TestConfigBuilder::new().with("server.public_url", "http://localhost:8000").build();
            LoginService::new(
                Arc::new(config),
                Arc::new(self.provider),
                Arc::new(self.pending),
                Arc::new(self.sync),
                Arc::new(self.token),
            )
        }
    }

    fn user() -> User {
        User {
            id: 250123,
            first_name: "Jan".into(),
            last_name: "Kowalski".into(),
            email: None,
            student_number: None,
            sex: Sex::Unknown,
            student_status: StudentStatus::Active,
            staff_status: StaffStatus::None,
            photo_url: None,
            study_groups: vec![],
        }
    }

    fn authorize_input(jwt: bool, redirect: &str) -> AuthorizeInput {
        AuthorizeInput {
            oauth_token: "req".into(),
            oauth_verifier: "12345".into(),
            jwt,
            redirect: redirect.into(),
        }
    }

    #[tokio::test]
    async fn test_initiate_jwt_without_redirect_is_forbidden() {
        let mut mocks = Mocks::new();
        mocks.provider.expect_request_authorization().never();
        mocks.pending.expect_put().never();

        let result = mocks
            .into_service()
            .initiate(InitiateLoginInput { confirm_user: false, jwt: true, redirect: String::new() })
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(ref m)) if m == JWT_WITHOUT_REDIRECT_MSG));
    }

    #[tokio::test]
    async fn test_initiate_stores_request_token() {
        let mut mocks = Mocks::new();
        mocks
            .provider
            .expect_request_authorization()
            .with(
                eq("http://localhost:8000/authorize?jwt=true&redirect=https%3A%2F%2Fapp.example%2Fdone"),
                eq(true),
            )
            .times(1)
            .returning(|_, _| {
                Box::pin(async move {
                    Ok(AuthorizationRequest {
                        url: "https://usos.example/services/oauth/authorize?oauth_token=req".into(),
                        request_token: RequestToken { token: "req".into(), secret: "req-secret".into() },
                    })
                })
            });
        mocks
            .pending
            .expect_put()
            .with(eq("req"), eq("req-secret"))
            .times(1)
            .returning(|_, _| Box::pin(async move { Ok(()) }));

        let output = mocks
            .into_service()
            .initiate(InitiateLoginInput { confirm_user: true, jwt: true, redirect: "https://app.example/done".into() })
            .await
            .unwrap();

        assert_eq!(output.authorization_url, "https://usos.example/services/oauth/authorize?oauth_token=req");
    }

    #[tokio::test]
    async fn test_initiate_session_login_omits_redirect() {
        let mut mocks = Mocks::new();
        mocks
            .provider
            .expect_request_authorization()
            .with(eq("http://localhost:8000/authorize?jwt=false"), eq(false))
            .returning(|_, _| {
                Box::pin(async move {
                    Ok(AuthorizationRequest {
                        url: "https://usos.example/authorize".into(),
                        request_token: RequestToken { token: "t".into(), secret: "s".into() },
                    })
                })
            });
        mocks.pending.expect_put().returning(|_, _| Box::pin(async move { Ok(()) }));

        let result = mocks.into_service().initiate(InitiateLoginInput::default()).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_authorize_unknown_token_is_forbidden() {
        let mut mocks = Mocks::new();
        mocks.pending.expect_take().with(eq("req")).returning(|_| Box::pin(async move { Ok(None) }));
        mocks.provider.expect_exchange_verifier().never();
        mocks.sync.expect_sync_user().never();

        let result = mocks.into_service().authorize(authorize_input(false, "/")).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_authorize_empty_token_is_forbidden() {
        let mut mocks = Mocks::new();
        mocks.pending.expect_take().with(eq("")).times(1).returning(|_| Box::pin(async move { Ok(None) }));
        mocks.provider.expect_exchange_verifier().never();
        mocks.sync.expect_sync_user().never();

        let input = AuthorizeInput { oauth_token: String::new(), ..authorize_input(false, "/") };
        let result = mocks.into_service().authorize(input).await;

        assert!(matches!(result, Err(AppError::Forbidden(msg)) if msg == UNKNOWN_REQUEST_TOKEN_MSG));
    }

    #[tokio::test]
    async fn test_authorize_empty_verifier_is_rejected() {
        let mut mocks = Mocks::new();
        mocks.pending.expect_take().never();

        let input = AuthorizeInput { oauth_verifier: String::new(), ..authorize_input(false, "/") };
        let result = mocks.into_service().authorize(input).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_authorize_session() {
        let mut mocks = Mocks::new();
        mocks
            .pending
            .expect_take()
            .returning(|_| Box::pin(async move { Ok(Some("req-secret".to_string())) }));
        mocks
            .provider
            .expect_exchange_verifier()
            .withf(|token, verifier| token.secret == "req-secret" && verifier == "12345")
            .returning(|_, _| {
                Box::pin(async move { Ok(AccessToken { token: "acc".into(), secret: "acc-secret".into() }) })
            });
        mocks
            .sync
            .expect_sync_user()
            .with(eq(SyncUserInput { access_token: "acc".into(), access_token_secret: "acc-secret".into() }))
            .times(1)
            .returning(|_| Box::pin(async move { Ok(user()) }));
        mocks.token.expect_create_pair().never();

        let output = mocks.into_service().authorize(authorize_input(false, "/profile")).await.unwrap();

        assert_eq!(output, AuthorizeOutput::Session { user_id: 250123, redirect: "/profile".into() });
    }

    #[tokio::test]
    async fn test_authorize_jwt_appends_tokens() {
        let mut mocks = Mocks::new();
        mocks
            .pending
            .expect_take()
            .returning(|_| Box::pin(async move { Ok(Some("req-secret".to_string())) }));
        mocks.provider.expect_exchange_verifier().returning(|_, _| {
            Box::pin(async move { Ok(AccessToken { token: "acc".into(), secret: "acc-secret".into() }) })
        });
        mocks.sync.expect_sync_user().returning(|_| Box::pin(async move { Ok(user()) }));
        mocks
            .token
            .expect_create_pair()
            .with(eq(250123))
            .returning(|_| Ok(TokenPair { access_token: "a.b.c".into(), refresh_token: "d.e.f".into() }));

        let output = mocks
            .into_service()
            .authorize(authorize_input(true, "https://app.example/done?state=1"))
            .await
            .unwrap();

        match output {
            AuthorizeOutput::Tokens { redirect_url, .. } => assert_eq!(
                redirect_url,
                "https://app.example/done?state=1&access_token=a.b.c&refresh_token=d.e.f"
            ),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_refresh_token() {
        let mut mocks = Mocks::new();
        mocks.token.expect_validate_refresh_token().with(eq("refresh")).returning(|_| {
            Ok(Claims {
                sub: 9,
                jti: "j".into(),
                iss: "i".into(),
                aud: "a".into(),
                exp: 1,
                iat: 0,
                kind: TokenKind::Refresh,
            })
        });
        mocks
            .token
            .expect_create_pair()
            .with(eq(9))
            .returning(|_| Ok(TokenPair { access_token: "new-a".into(), refresh_token: "new-r".into() }));

        let output = mocks
            .into_service()
            .refresh_token(RefreshTokenInput { refresh_token: "refresh".into() })
            .await
            .unwrap();

        assert_eq!(output.access_token, "new-a");
        assert_eq!(output.refresh_token, "new-r");
    }

    #[tokio::test]
    async fn test_refresh_token_invalid() {
        let mut mocks = Mocks::new();
        mocks.token.expect_validate_refresh_token().returning(|_| Err(JwtError::TokenExpired));

        let result = mocks
            .into_service()
            .refresh_token(RefreshTokenInput { refresh_token: "old".into() })
            .await;

        assert!(matches!(result, Err(AppError::Jwt(JwtError::TokenExpired))));
    }
}
