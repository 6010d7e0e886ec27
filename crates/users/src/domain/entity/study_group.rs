use app_core::oauth::ProviderGroup;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudyGroup {
    pub id: String,
    pub name: String,
    pub term_id: String,
}

impl From<&ProviderGroup> for StudyGroup {
    fn from(group: &ProviderGroup) -> Self {
        Self {
            id: format!("{}-{}", group.course_unit_id, group.group_number),
            name: format!(
                "{} - {}, grupa {}",
                group.course_name.text(),
                group.class_type.text(),
                group.group_number
            ),
            term_id: group.term_id.clone(),
        }
    }
}
