pub mod quiz;
pub mod settings;
pub mod study_group;
pub mod sync;
pub mod user;
