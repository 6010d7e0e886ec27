pub use super::quiz_progress::Entity as QuizProgress;
pub use super::quizzes::Entity as Quizzes;
pub use super::study_groups::Entity as StudyGroups;
pub use super::terms::Entity as Terms;
pub use super::user_settings::Entity as UserSettings;
pub use super::user_study_groups::Entity as UserStudyGroups;
pub use super::users::Entity as Users;
