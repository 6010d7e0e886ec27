use app_core::jwt::TokenPair;
use validator::Validate;

// ╔════════════════════════════╗
// ║      Initiate Login        ║
// ╚════════════════════════════╝

#[derive(Debug, Clone, Default)]
pub struct InitiateLoginInput {
    pub confirm_user: bool,
    pub jwt: bool,
    pub redirect: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateLoginOutput {
    pub authorization_url: String,
}

// ╔════════════════════════════╗
// ║        Authorize           ║
// ╚════════════════════════════╝

#[derive(Debug, Clone, Validate)]
pub struct AuthorizeInput {
    /// Not validated: an empty token is simply unknown to the pending store.
    pub oauth_token: String,
    #[validate(length(min = 1, message = "oauth_verifier cannot be empty"))]
    pub oauth_verifier: String,
    pub jwt: bool,
    pub redirect: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizeOutput {
    /// Establish a browser session for the user, then go to `redirect`.
    Session { user_id: i64, redirect: String },
    /// Redirect to `redirect_url`, which carries the issued token pair.
    Tokens { redirect_url: String, tokens: TokenPair },
}

// ╔════════════════════════════╗
// ║       Refresh Token        ║
// ╚════════════════════════════╝

#[derive(Debug, Validate)]
pub struct RefreshTokenInput {
    #[validate(length(min = 1, message = "refresh token cannot be empty"))]
    pub refresh_token: String,
}

#[derive(Debug)]
pub struct RefreshTokenOutput {
    pub access_token: String,
    pub refresh_token: String,
}
