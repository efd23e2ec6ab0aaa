use sea_orm::entity::prelude::*;
use serde::Serialize;

use super::party;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize)]
#[sea_orm(table_name = "beverage_calculations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub party_id: i64,
    pub guest_count: i32,
    pub duration: i32,
    pub party_type: String,
    pub include_alcohol: bool,
    pub water_bottles: i32,
    pub soft_drinks: i32,
    pub beer_bottles: i32,
    pub wine_bottles: i32,
    pub cocktail_servings: i32,
    pub calculated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Party,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Self::Party => Entity::belongs_to(party::Entity)
                .from(Column::PartyId)
                .to(party::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
