use serde::Deserialize;

fn default_next() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize)]
pub struct RefreshUserRequest {
    #[serde(default = "default_next")]
    pub next: String,
}
