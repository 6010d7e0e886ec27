use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Issued by the identity provider, never generated locally.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub student_number: Option<String>,
    pub sex: Option<String>,
    pub student_status: i16,
    pub staff_status: i16,
    pub photo_url: Option<String>,
    /// Sealed with the application's secret cipher.
    pub access_token: Option<String>,
    /// Sealed with the application's secret cipher.
    pub access_token_secret: Option<String>,
    pub password: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_study_groups::Entity")]
    UserStudyGroups,
    #[sea_orm(has_one = "super::user_settings::Entity")]
    UserSettings,
    #[sea_orm(has_many = "super::quiz_progress::Entity")]
    QuizProgress,
}

impl Related<super::user_study_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserStudyGroups.def()
    }
}

impl Related<super::user_settings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserSettings.def()
    }
}

impl Related<super::quiz_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizProgress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
