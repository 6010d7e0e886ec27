//! Database entities shared by the feature crates.

pub mod prelude;

pub mod quiz_progress;
pub mod quizzes;
pub mod study_groups;
pub mod terms;
pub mod user_settings;
pub mod user_study_groups;
pub mod users;
