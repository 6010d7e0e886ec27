use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizVisibility {
    Private = 0,
    Shared = 1,
    #[default]
    Unlisted = 2,
    Public = 3,
}

impl QuizVisibility {
    pub fn from_i16(code: i16) -> Option<Self> {
        match code {
            0 => Some(QuizVisibility::Private),
            1 => Some(QuizVisibility::Shared),
            2 => Some(QuizVisibility::Unlisted),
            3 => Some(QuizVisibility::Public),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuizVisibility::Private => "Prywatny",
            QuizVisibility::Shared => "Dla udostępnionych",
            QuizVisibility::Unlisted => "Niepubliczny (z linkiem)",
            QuizVisibility::Public => "Publiczny",
        }
    }
}

impl fmt::Display for QuizVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentQuiz {
    pub id: Uuid,
    pub title: String,
    pub visibility: QuizVisibility,
    pub last_activity: DateTime<Utc>,
}
