use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::{guest, itinerary_item, timeline_task, todo_item};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub date: Option<String>,
    pub guest_count: i32,
    pub party_type: String,
    pub duration: i32,
    pub theme: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Guest,
    TimelineTask,
    TodoItem,
    ItineraryItem,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Guest => Entity::has_many(guest::Entity).into(),
            Self::TimelineTask => Entity::has_many(timeline_task::Entity).into(),
            Self::TodoItem => Entity::has_many(todo_item::Entity).into(),
            Self::ItineraryItem => Entity::has_many(itinerary_item::Entity).into(),
        }
    }
}

impl Related<guest::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Guest.def()
    }
}

impl Related<timeline_task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TimelineTask.def()
    }
}

impl Related<todo_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TodoItem.def()
    }
}

impl Related<itinerary_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItineraryItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
