use std::fmt;

use super::study_group::StudyGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sex {
    Male,
    Female,
    Unknown,
}

impl Sex {
    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("M") => Sex::Male,
            Some("K") | Some("F") => Sex::Female,
            _ => Sex::Unknown,
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            Sex::Male => Some("M"),
            Sex::Female => Some("F"),
            Sex::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentStatus {
    None,
    Inactive,
    Active,
}

impl StudentStatus {
    pub fn from_i16(code: i16) -> Self {
        match code {
            1 => StudentStatus::Inactive,
            2 => StudentStatus::Active,
            _ => StudentStatus::None,
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StudentStatus::None => "Brak",
            StudentStatus::Inactive => "Nieaktywny student",
            StudentStatus::Active => "Aktywny student",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffStatus {
    None,
    NonAcademic,
    Academic,
}

impl StaffStatus {
    pub fn from_i16(code: i16) -> Self {
        match code {
            1 => StaffStatus::NonAcademic,
            2 => StaffStatus::Academic,
            _ => StaffStatus::None,
        }
    }
}

impl fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StaffStatus::None => "Brak",
            StaffStatus::NonAcademic => "Pracownik niebędący nauczycielem",
            StaffStatus::Academic => "Nauczyciel akademicki",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub student_number: Option<String>,
    pub sex: Sex,
    pub student_status: StudentStatus,
    pub staff_status: StaffStatus,
    pub photo_url: Option<String>,
    pub study_groups: Vec<StudyGroup>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn is_student(&self) -> bool {
        self.student_status == StudentStatus::Active
    }

    pub fn is_staff(&self) -> bool {
        self.staff_status != StaffStatus::None
    }
}

/// The identity provider token pair as stored, i.e. still sealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedCredentials {
    pub access_token: String,
    pub access_token_secret: String,
}
