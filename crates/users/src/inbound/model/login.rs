use serde::{Deserialize, Serialize};

fn default_redirect() -> String {
    "/".to_string()
}

// ╔════════════════════════════╗
// ║      Login With USOS       ║
// ╚════════════════════════════╝

#[derive(Debug, Deserialize)]
pub struct LoginUsosRequest {
    #[serde(default)]
    pub confirm_user: bool,
    #[serde(default)]
    pub jwt: bool,
    #[serde(default)]
    pub redirect: String,
}

// ╔════════════════════════════╗
// ║        Authorize           ║
// ╚════════════════════════════╝

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    #[serde(default)]
    pub oauth_token: String,
    #[serde(default)]
    pub oauth_verifier: String,
    #[serde(default)]
    pub jwt: bool,
    #[serde(default = "default_redirect")]
    pub redirect: String,
}

// ╔════════════════════════════╗
// ║       Refresh Token        ║
// ╚════════════════════════════╝

#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
}
