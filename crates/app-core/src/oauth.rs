//! Client for the university identity provider (USOS API), an OAuth 1.0a
//! service. Request signing is delegated to `oauth1-request`.

use std::collections::{BTreeMap, HashMap};

use oauth1_request::{Builder, Credentials, HMAC_SHA1, Token};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use url::Url;

pub const DEFAULT_SCOPES: &[&str] = &["offline_access", "studies", "email", "photo", "grades"];

const USER_FIELDS: &str =
    "id|first_name|last_name|email|student_number|sex|student_status|staff_status|photo_urls";
const GROUP_FIELDS: &str = "course_unit_id|group_number|course_name|term_id|class_type";

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Provider responded with {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("OAuth token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Failed to parse provider response: {0}")]
    ResponseParse(String),
}

/// A one-time credential pair obtained before the user is sent to the
/// provider's consent page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    pub token: String,
    pub secret: String,
}

/// A long-lived credential pair acting on behalf of a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub request_token: RequestToken,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LangDict {
    pub pl: Option<String>,
    pub en: Option<String>,
}

impl LangDict {
    /// The Polish text, falling back to English.
    pub fn text(&self) -> &str {
        self.pl.as_deref().or(self.en.as_deref()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderUser {
    #[serde(deserialize_with = "de_i64")]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub student_number: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub student_status: Option<i16>,
    #[serde(default)]
    pub staff_status: Option<i16>,
    #[serde(default)]
    pub photo_urls: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderGroup {
    #[serde(deserialize_with = "de_string")]
    pub course_unit_id: String,
    pub group_number: i32,
    pub course_name: LangDict,
    pub term_id: String,
    pub class_type: LangDict,
}

#[async_trait::async_trait]
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait IdentityProvider: Send + Sync {
    /// Obtains a request token and the URL the user must visit to grant
    /// access. `confirm_user` forces the provider to ask the user again even
    /// when consent was already given.
    async fn request_authorization(
        &self,
        callback_url: &str,
        confirm_user: bool,
    ) -> Result<AuthorizationRequest, OAuthError>;

    /// Trades the verifier returned to the callback for an access token.
    async fn exchange_verifier(&self, request_token: &RequestToken, verifier: &str)
    -> Result<AccessToken, OAuthError>;

    async fn fetch_user(&self, access: &AccessToken) -> Result<ProviderUser, OAuthError>;

    async fn fetch_groups(&self, access: &AccessToken) -> Result<Vec<ProviderGroup>, OAuthError>;
}

#[derive(oauth1_request::Request)]
struct ScopesParam<'a> {
    scopes: &'a str,
}

#[derive(oauth1_request::Request)]
struct FieldsParam<'a> {
    fields: &'a str,
}

pub struct UsosProvider {
    http: Client,
    base_url: Url,
    consumer_key: String,
    consumer_secret: String,
    scopes: String,
}

impl UsosProvider {
    pub fn new(
        base_url: &str,
        consumer_key: String,
        consumer_secret: String,
        scopes: &[String],
    ) -> Result<Self, OAuthError> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { http: Client::new(), base_url, consumer_key, consumer_secret, scopes: scopes.join("|") })
    }

    fn endpoint(&self, path: &str) -> Result<Url, OAuthError> {
        Ok(self.base_url.join(path)?)
    }

    fn client_credentials(&self) -> Credentials<&str> {
        Credentials::new(self.consumer_key.as_str(), self.consumer_secret.as_str())
    }

    async fn read_body(response: Response) -> Result<String, OAuthError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Identity provider returned an error");
            return Err(OAuthError::Upstream { status: status.as_u16(), body });
        }
        Ok(body)
    }

    fn parse_token_pair(body: &str) -> Result<(String, String), OAuthError> {
        let mut values: HashMap<String, String> = url::form_urlencoded::parse(body.as_bytes()).into_owned().collect();

        let token = values
            .remove("oauth_token")
            .ok_or_else(|| OAuthError::TokenExchange("response is missing oauth_token".into()))?;
        let secret = values
            .remove("oauth_token_secret")
            .ok_or_else(|| OAuthError::TokenExchange("response is missing oauth_token_secret".into()))?;

        Ok((token, secret))
    }

    async fn get_signed<T>(&self, path: &str, fields: &str, access: &AccessToken) -> Result<T, OAuthError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let uri = self.endpoint(path)?;
        let token = Credentials::new(access.token.as_str(), access.secret.as_str());
        let authorization = Builder::with_token(Token::new(self.client_credentials(), token), HMAC_SHA1)
            .get(uri.as_str(), &FieldsParam { fields });

        let response = self
            .http
            .get(uri)
            .query(&[("fields", fields)])
            .header(AUTHORIZATION, authorization)
            .send()
            .await?;
        let body = Self::read_body(response).await?;

        serde_json::from_str(&body).map_err(|e| OAuthError::ResponseParse(e.to_string()))
    }
}

#[derive(Deserialize)]
struct GroupsResponse {
    // term id -> groups in that term
    groups: BTreeMap<String, Vec<ProviderGroup>>,
}

#[async_trait::async_trait]
impl IdentityProvider for UsosProvider {
    async fn request_authorization(
        &self,
        callback_url: &str,
        confirm_user: bool,
    ) -> Result<AuthorizationRequest, OAuthError> {
        let uri = self.endpoint("services/oauth/request_token")?;

        // No token yet; the token type is only pinned for inference.
        let mut builder = Builder::<_, &str, &str>::new(self.client_credentials(), HMAC_SHA1);
        builder.callback(callback_url);
        let authorization = builder.post(uri.as_str(), &ScopesParam { scopes: &self.scopes });

        let response = self
            .http
            .post(uri)
            .header(AUTHORIZATION, authorization)
            .form(&[("scopes", self.scopes.as_str())])
            .send()
            .await?;
        let (token, secret) = Self::parse_token_pair(&Self::read_body(response).await?)?;

        let mut url = self.endpoint("services/oauth/authorize")?;
        url.query_pairs_mut().append_pair("oauth_token", &token);
        if confirm_user {
            url.query_pairs_mut().append_pair("interactivity", "confirm_user");
        }

        tracing::debug!("Obtained request token from identity provider");

        Ok(AuthorizationRequest { url: url.to_string(), request_token: RequestToken { token, secret } })
    }

    async fn exchange_verifier(
        &self,
        request_token: &RequestToken,
        verifier: &str,
    ) -> Result<AccessToken, OAuthError> {
        let uri = self.endpoint("services/oauth/access_token")?;
        let token = Credentials::new(request_token.token.as_str(), request_token.secret.as_str());

        let mut builder = Builder::with_token(Token::new(self.client_credentials(), token), HMAC_SHA1);
        builder.verifier(verifier);
        let authorization = builder.post(uri.as_str(), &());

        let response = self.http.post(uri).header(AUTHORIZATION, authorization).send().await?;
        let (token, secret) = Self::parse_token_pair(&Self::read_body(response).await?)?;

        Ok(AccessToken { token, secret })
    }

    async fn fetch_user(&self, access: &AccessToken) -> Result<ProviderUser, OAuthError> {
        self.get_signed("services/users/user", USER_FIELDS, access).await
    }

    async fn fetch_groups(&self, access: &AccessToken) -> Result<Vec<ProviderGroup>, OAuthError> {
        let response: GroupsResponse = self.get_signed("services/groups/user", GROUP_FIELDS, access).await?;

        Ok(response.groups.into_values().flatten().collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(i64),
}

fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

fn de_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Number(n) => Ok(n),
        StringOrNumber::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
