use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "study_groups")]
pub struct Model {
    /// `{course_unit_id}-{group_number}`
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub term_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(belongs_to = "super::terms::Entity", from = "Column::TermId", to = "super::terms::Column::Id")]
    Terms,
    #[sea_orm(has_many = "super::user_study_groups::Entity")]
    UserStudyGroups,
}

impl Related<super::terms::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Terms.def()
    }
}

impl Related<super::user_study_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserStudyGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
