use crate::domain::entity::quiz::RecentQuiz;

pub const RECENT_QUIZZES_LIMIT: u64 = 4;

// ╔════════════════════════════╗
// ║        Dashboard           ║
// ╚════════════════════════════╝

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardOutput {
    pub recent_quizzes: Vec<RecentQuiz>,
}
