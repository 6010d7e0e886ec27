use app_core::oauth::ProviderUser;

use super::study_group::StudyGroup;
use super::user::{Sex, StaffStatus, StudentStatus};

/// Everything the synchronizer writes for one user in a single transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSyncPayload {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub student_number: Option<String>,
    pub sex: Sex,
    pub student_status: StudentStatus,
    pub staff_status: StaffStatus,
    pub photo_url: Option<String>,
    pub sealed_access_token: String,
    pub sealed_access_token_secret: String,
    pub groups: Vec<StudyGroup>,
}

impl UserSyncPayload {
    pub fn new(
        profile: ProviderUser,
        groups: Vec<StudyGroup>,
        sealed_access_token: String,
        sealed_access_token_secret: String,
    ) -> Self {
        let photo_url = preferred_photo(&profile);

        Self {
            id: profile.id,
            first_name: profile.first_name,
            last_name: profile.last_name,
            email: profile.email.filter(|e| !e.is_empty()),
            student_number: profile.student_number.filter(|n| !n.is_empty()),
            sex: Sex::from_code(profile.sex.as_deref()),
            student_status: StudentStatus::from_i16(profile.student_status.unwrap_or_default()),
            staff_status: StaffStatus::from_i16(profile.staff_status.unwrap_or_default()),
            photo_url,
            sealed_access_token,
            sealed_access_token_secret,
            groups,
        }
    }
}

fn preferred_photo(profile: &ProviderUser) -> Option<String> {
    ["original", "200x200"]
        .iter()
        .find_map(|size| profile.photo_urls.get(*size))
        .or_else(|| {
            // Any remaining size, picked deterministically.
            let mut sizes: Vec<_> = profile.photo_urls.keys().collect();
            sizes.sort();
            sizes.first().and_then(|size| profile.photo_urls.get(*size))
        })
        .cloned()
}
