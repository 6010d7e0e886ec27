use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "quizzes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub maintainer_id: Option<i64>,
    /// 0 private, 1 shared, 2 unlisted (default), 3 public.
    #[sea_orm(default_value = 2)]
    pub visibility: i16,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::quiz_progress::Entity")]
    QuizProgress,
}

impl Related<super::quiz_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuizProgress.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
