// ╔════════════════════════════╗
// ║        Sync User           ║
// ╚════════════════════════════╝

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncUserInput {
    pub access_token: String,
    pub access_token_secret: String,
}

// ╔════════════════════════════╗
// ║       Refresh User         ║
// ╚════════════════════════════╝

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshUserInput {
    pub user_id: i64,
}
