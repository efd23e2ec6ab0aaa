use sea_orm::entity::prelude::*;

use super::todo_item;

/// Edge `todo_id -> depends_on_id`: the first todo waits on the second.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "todo_dependencies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub todo_id: i64,
    pub depends_on_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Todo,
    DependsOn,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Todo => Entity::belongs_to(todo_item::Entity)
                .from(Column::TodoId)
                .to(todo_item::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Self::DependsOn => Entity::belongs_to(todo_item::Entity)
                .from(Column::DependsOnId)
                .to(todo_item::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
