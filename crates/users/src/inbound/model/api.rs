use serde::{Deserialize, Serialize};

use crate::domain::entity::settings::{Settings, SettingsPatch};
use crate::domain::entity::study_group::StudyGroup;
use crate::domain::entity::user::User;

// ╔════════════════════════════╗
// ║         Settings           ║
// ╚════════════════════════════╝

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub sync_progress: bool,
    pub initial_repetitions: i32,
    pub wrong_answer_repetitions: i32,
}

impl From<Settings> for SettingsResponse {
    fn from(settings: Settings) -> Self {
        Self {
            sync_progress: settings.sync_progress,
            initial_repetitions: settings.initial_repetitions,
            wrong_answer_repetitions: settings.wrong_answer_repetitions,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    pub sync_progress: Option<bool>,
    pub initial_repetitions: Option<i32>,
    pub wrong_answer_repetitions: Option<i32>,
}

impl From<UpdateSettingsRequest> for SettingsPatch {
    fn from(req: UpdateSettingsRequest) -> Self {
        Self {
            sync_progress: req.sync_progress,
            initial_repetitions: req.initial_repetitions,
            wrong_answer_repetitions: req.wrong_answer_repetitions,
        }
    }
}

// ╔════════════════════════════╗
// ║       Current User         ║
// ╚════════════════════════════╝

#[derive(Debug, Serialize)]
pub struct StudyGroupResponse {
    pub id: String,
    pub name: String,
    pub term_id: String,
}

impl From<StudyGroup> for StudyGroupResponse {
    fn from(group: StudyGroup) -> Self {
        Self { id: group.id, name: group.name, term_id: group.term_id }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub student_number: Option<String>,
    pub sex: Option<&'static str>,
    pub student_status: i16,
    pub staff_status: i16,
    pub photo_url: Option<String>,
    pub study_groups: Vec<StudyGroupResponse>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name(),
            sex: user.sex.code(),
            student_status: user.student_status as i16,
            staff_status: user.staff_status as i16,
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            student_number: user.student_number,
            photo_url: user.photo_url,
            study_groups: user.study_groups.into_iter().map(StudyGroupResponse::from).collect(),
        }
    }
}
