use crate::domain::entity::settings::SettingsPatch;

// ╔════════════════════════════╗
// ║      Update Settings       ║
// ╚════════════════════════════╝

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateSettingsInput {
    pub user_id: i64,
    pub patch: SettingsPatch,
}
