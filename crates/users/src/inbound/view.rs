//! Server-rendered pages.

use askama::Template;

use crate::domain::entity::quiz::RecentQuiz;
use crate::domain::entity::user::User;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub flashes: Vec<String>,
    pub logged_in: bool,
    pub recent_quizzes: Vec<RecentQuiz>,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub flashes: Vec<String>,
    pub logged_in: bool,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfilePage {
    pub flashes: Vec<String>,
    pub logged_in: bool,
    pub user: User,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;
    use crate::domain::entity::quiz::QuizVisibility;
    use crate::domain::entity::study_group::StudyGroup;
    use crate::domain::entity::user::{Sex, StaffStatus, StudentStatus};

    #[test]
    fn test_dashboard_lists_recent_quizzes() {
        let page = DashboardPage {
            flashes: vec!["Zalogowano".to_string()],
            logged_in: true,
            recent_quizzes: vec![RecentQuiz {
                id: Uuid::nil(),
                title: "Analiza matematyczna".to_string(),
                visibility: QuizVisibility::Public,
                last_activity: Utc.with_ymd_and_hms(2025, 1, 17, 15, 8, 0).unwrap(),
            }],
        };

        let html = page.render().unwrap();

        assert!(html.contains("Analiza matematyczna"));
        assert!(html.contains("Publiczny"));
        assert!(html.contains("Zalogowano"));
        assert!(html.contains("/logout"));
    }

    #[test]
    fn test_anonymous_dashboard_links_to_login() {
        let page = DashboardPage { flashes: vec![], logged_in: false, recent_quizzes: vec![] };

        let html = page.render().unwrap();

        assert!(html.contains("/login"));
        assert!(!html.contains("/logout"));
    }

    #[test]
    fn test_profile_shows_groups_and_escapes() {
        let page = ProfilePage {
            flashes: vec![],
            logged_in: true,
            user: User {
                id: 250123,
                first_name: "Jan".into(),
                last_name: "<Kowalski>".into(),
                email: Some("jan@example.com".into()),
                student_number: Some("123456".into()),
                sex: Sex::Male,
                student_status: StudentStatus::Active,
                staff_status: StaffStatus::None,
                photo_url: None,
                study_groups: vec![StudyGroup {
                    id: "1000-ALG-1".into(),
                    name: "Algebra liniowa - Ćwiczenia, grupa nr 1".into(),
                    term_id: "2024Z".into(),
                }],
            },
        };

        let html = page.render().unwrap();

        assert!(html.contains("&lt;Kowalski&gt;"));
        assert!(html.contains("Aktywny student"));
        assert!(html.contains("Algebra liniowa - Ćwiczenia, grupa nr 1"));
        assert!(html.contains("2024Z"));
        assert!(html.contains(r#"<span class="badge">Student</span>"#));
        assert!(!html.contains(r#"<span class="badge">Pracownik</span>"#));
    }

    #[test]
    fn test_profile_badges_follow_statuses() {
        let page = ProfilePage {
            flashes: vec![],
            logged_in: true,
            user: User {
                id: 1,
                first_name: "Ewa".into(),
                last_name: "Lis".into(),
                email: None,
                student_number: None,
                sex: Sex::Female,
                student_status: StudentStatus::Inactive,
                staff_status: StaffStatus::Academic,
                photo_url: None,
                study_groups: vec![],
            },
        };

        let html = page.render().unwrap();

        assert!(!html.contains(r#"<span class="badge">Student</span>"#));
        assert!(html.contains(r#"<span class="badge">Pracownik</span>"#));
    }
}
