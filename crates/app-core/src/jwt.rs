//! Issuance and validation of the access/refresh token pair handed out to
//! API clients that log in with `jwt=true`.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token format or signature")]
    InvalidToken,

    #[error("Failed to create token")]
    TokenCreation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenManager: Send + Sync {
    fn create_access_token(&self, user_id: i64) -> Result<String, JwtError>;
    fn create_refresh_token(&self, user_id: i64) -> Result<String, JwtError>;
    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError>;
    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError>;

    fn create_pair(&self, user_id: i64) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.create_access_token(user_id)?,
            refresh_token: self.create_refresh_token(user_id)?,
        })
    }
}

pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_exp_secs: i64,
    pub refresh_exp_secs: i64,
    pub issuer: String,
    pub audience: String,
}

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }

    fn create_token(&self, user_id: i64, kind: TokenKind) -> Result<String, JwtError> {
        let (secret, expires_in_secs) = self.params(kind);
        let now = Utc::now();
        let exp = (now + Duration::seconds(expires_in_secs)).timestamp() as usize;

        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4().to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp,
            iat: now.timestamp() as usize,
            kind,
        };

        encode(&Header::new(Algorithm::HS512), &claims, &EncodingKey::from_secret(secret.as_ref()))
            .map_err(|_| JwtError::TokenCreation)
    }

    fn validate_token(&self, token: &str, kind: TokenKind) -> Result<Claims, JwtError> {
        let (secret, _) = self.params(kind);
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let claims = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })?;

        if claims.kind != kind {
            return Err(JwtError::InvalidToken);
        }

        Ok(claims)
    }

    fn params(&self, kind: TokenKind) -> (&str, i64) {
        match kind {
            TokenKind::Access => (&self.config.access_secret, self.config.access_exp_secs),
            TokenKind::Refresh => (&self.config.refresh_secret, self.config.refresh_exp_secs),
        }
    }
}

impl TokenManager for JwtService {
    fn create_access_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.create_token(user_id, TokenKind::Access)
    }

    fn create_refresh_token(&self, user_id: i64) -> Result<String, JwtError> {
        self.create_token(user_id, TokenKind::Refresh)
    }

    fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, TokenKind::Access)
    }

    fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        self.validate_token(token, TokenKind::Refresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> JwtConfig {
        JwtConfig {
            access_secret: "test_access_secret_key_12345".to_string(),
            refresh_secret: "test_refresh_secret_key_12345".to_string(),
            access_exp_secs: 300,
            refresh_exp_secs: 86400,
            issuer: "quizdeck".to_string(),
            audience: "quizdeck-api".to_string(),
        }
    }

    #[test]
    fn test_create_pair_yields_valid_tokens() {
        let service = JwtService::new(create_test_config());

        let pair = service.create_pair(250123).unwrap();

        let access = service.validate_access_token(&pair.access_token).unwrap();
        let refresh = service.validate_refresh_token(&pair.refresh_token).unwrap();
        assert_eq!(access.sub, 250123);
        assert_eq!(access.kind, TokenKind::Access);
        assert_eq!(refresh.sub, 250123);
        assert_eq!(refresh.kind, TokenKind::Refresh);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_claims_timestamps() {
        let service = JwtService::new(create_test_config());

        let token = service.create_access_token(1).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.exp, claims.iat + 300);
        assert_eq!(claims.iss, "quizdeck");
        assert_eq!(claims.aud, "quizdeck-api");
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let service = JwtService::new(create_test_config());

        let refresh = service.create_refresh_token(1).unwrap();

        assert!(matches!(service.validate_access_token(&refresh), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_same_secret_still_checks_kind() {
        let mut config = create_test_config();
        config.refresh_secret = config.access_secret.clone();
        let service = JwtService::new(config);

        let access = service.create_access_token(1).unwrap();

        assert!(matches!(service.validate_refresh_token(&access), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_validate_malformed_token() {
        let service = JwtService::new(create_test_config());

        assert!(matches!(service.validate_access_token("not_a_jwt"), Err(JwtError::InvalidToken)));
    }

    #[test]
    fn test_token_expiration() {
        let mut config = create_test_config();
        config.access_exp_secs = -1_000_000;
        let service = JwtService::new(config);

        let token = service.create_access_token(1).unwrap();

        assert!(matches!(service.validate_access_token(&token), Err(JwtError::TokenExpired)));
    }
}
