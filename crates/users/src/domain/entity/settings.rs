pub const INITIAL_REPETITIONS_MSG: &str = "Initial repetitions must be greater or equal to 1";
pub const WRONG_ANSWER_REPETITIONS_MSG: &str = "Wrong answer repetitions must be greater or equal to 0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub sync_progress: bool,
    pub initial_repetitions: i32,
    pub wrong_answer_repetitions: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self { sync_progress: false, initial_repetitions: 1, wrong_answer_repetitions: 1 }
    }
}

/// A partial update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub sync_progress: Option<bool>,
    pub initial_repetitions: Option<i32>,
    pub wrong_answer_repetitions: Option<i32>,
}

impl Settings {
    pub fn apply(&mut self, patch: SettingsPatch) -> Result<(), &'static str> {
        if let Some(sync_progress) = patch.sync_progress {
            self.sync_progress = sync_progress;
        }
        if let Some(initial_repetitions) = patch.initial_repetitions {
            if initial_repetitions < 1 {
                return Err(INITIAL_REPETITIONS_MSG);
            }
            self.initial_repetitions = initial_repetitions;
        }
        if let Some(wrong_answer_repetitions) = patch.wrong_answer_repetitions {
            if wrong_answer_repetitions < 0 {
                return Err(WRONG_ANSWER_REPETITIONS_MSG);
            }
            self.wrong_answer_repetitions = wrong_answer_repetitions;
        }
        Ok(())
    }
}
