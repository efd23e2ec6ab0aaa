use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::todo_item;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "todo_subtasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub todo_id: i64,
    pub title: String,
    pub completed: bool,
    pub order_index: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Todo,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Todo => Entity::belongs_to(todo_item::Entity)
                .from(Column::TodoId)
                .to(todo_item::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<todo_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Todo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
