use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "terms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::study_groups::Entity")]
    StudyGroups,
}

impl Related<super::study_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudyGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
