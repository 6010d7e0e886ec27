//! Browser sessions and one-shot flash messages, both kept in private
//! (encrypted and authenticated) cookies.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::{SameSite, time};
use tower_cookies::{Cookie, Cookies, Key};

pub const SESSION_COOKIE: &str = "__session";
pub const FLASH_COOKIE: &str = "__flash";

#[derive(Debug, Serialize, Deserialize)]
struct SessionPayload {
    uid: i64,
    exp: i64,
}

#[derive(Clone)]
pub struct SessionManager {
    key: Key,
    ttl_secs: i64,
    secure: bool,
}

impl SessionManager {
    pub fn new(key: Key, ttl_secs: i64, secure: bool) -> Self {
        Self { key, ttl_secs, secure }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    fn cookie(&self, name: &'static str, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .path("/")
            .max_age(max_age)
            .same_site(SameSite::Lax)
            .build()
    }

    pub fn login(&self, cookies: &Cookies, user_id: i64) -> Result<(), serde_json::Error> {
        let payload = SessionPayload { uid: user_id, exp: Utc::now().timestamp() + self.ttl_secs };
        let value = serde_json::to_string(&payload)?;

        cookies
            .private(&self.key)
            .add(self.cookie(SESSION_COOKIE, value, time::Duration::seconds(self.ttl_secs)));

        Ok(())
    }

    pub fn logout(&self, cookies: &Cookies) {
        cookies.private(&self.key).remove(Cookie::build(SESSION_COOKIE).path("/").build());
    }

    /// The logged-in user, if the session cookie is present, authentic and
    /// not expired.
    pub fn user_id(&self, cookies: &Cookies) -> Option<i64> {
        let cookie = cookies.private(&self.key).get(SESSION_COOKIE)?;
        let payload: SessionPayload = serde_json::from_str(cookie.value()).ok()?;

        (payload.exp > Utc::now().timestamp()).then_some(payload.uid)
    }

    pub fn push_flash(&self, cookies: &Cookies, message: &str) {
        let mut messages = self.read_flashes(cookies);
        messages.push(message.to_string());

        let value = serde_json::to_string(&messages).unwrap_or_else(|_| "[]".to_string());
        cookies.private(&self.key).add(self.cookie(FLASH_COOKIE, value, time::Duration::minutes(5)));
    }

    /// Returns pending flash messages and clears them.
    pub fn take_flashes(&self, cookies: &Cookies) -> Vec<String> {
        let messages = self.read_flashes(cookies);
        if !messages.is_empty() {
            cookies.private(&self.key).remove(Cookie::build(FLASH_COOKIE).path("/").build());
        }
        messages
    }

    fn read_flashes(&self, cookies: &Cookies) -> Vec<String> {
        cookies
            .private(&self.key)
            .get(FLASH_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default()
    }
}
