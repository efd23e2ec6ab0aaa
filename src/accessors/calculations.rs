use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{record, require_party};
use crate::calc::{self, BeverageRequest};
use crate::db::Database;
use crate::entities::{beverage_calculation, pizza_calculation};
use crate::error::AppError;
use crate::model::PartyType;

/// Append-only history of calculator runs for one party.
pub struct CalculationLog<'a> {
    db: &'a Database,
    party_id: i64,
    pizzas: Vec<pizza_calculation::Model>,
    beverages: Vec<beverage_calculation::Model>,
    error: Option<String>,
}

impl<'a> CalculationLog<'a> {
    pub fn new(db: &'a Database, party_id: i64) -> Self {
        Self {
            db,
            party_id,
            pizzas: Vec::new(),
            beverages: Vec::new(),
            error: None,
        }
    }

    /// Newest first.
    pub fn pizzas(&self) -> &[pizza_calculation::Model] {
        &self.pizzas
    }

    /// Newest first.
    pub fn beverages(&self) -> &[beverage_calculation::Model] {
        &self.beverages
    }

    pub fn latest_pizza(&self) -> Option<&pizza_calculation::Model> {
        self.pizzas.first()
    }

    pub fn latest_beverage(&self) -> Option<&beverage_calculation::Model> {
        self.beverages.first()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self) -> Result<(), AppError> {
        let result = list_history(self.db, self.party_id).await;
        let (pizzas, beverages) = record(&mut self.error, "load calculations", result)?;
        self.pizzas = pizzas;
        self.beverages = beverages;
        Ok(())
    }

    pub async fn record_pizza(&mut self, guests: u32) -> Result<pizza_calculation::Model, AppError> {
        let result = insert_pizza(self.db, self.party_id, guests).await;
        let row = record(&mut self.error, "record pizza calculation", result)?;
        self.load().await?;
        Ok(row)
    }

    pub async fn record_beverages(
        &mut self,
        guests: u32,
        hours: u32,
        party_type: PartyType,
        include_alcohol: bool,
    ) -> Result<beverage_calculation::Model, AppError> {
        let request = BeverageRequest {
            guests,
            hours,
            party_type,
            include_alcohol,
        };
        let result = insert_beverages(self.db, self.party_id, request).await;
        let row = record(&mut self.error, "record beverage calculation", result)?;
        self.load().await?;
        Ok(row)
    }

    pub async fn delete_pizza(&mut self, id: i64) -> Result<(), AppError> {
        let result = delete_row(self.db, "pizza_calculations", "pizza calculation", self.party_id, id).await;
        record(&mut self.error, "delete pizza calculation", result)?;
        self.load().await
    }

    pub async fn delete_beverage(&mut self, id: i64) -> Result<(), AppError> {
        let result =
            delete_row(self.db, "beverage_calculations", "beverage calculation", self.party_id, id).await;
        record(&mut self.error, "delete beverage calculation", result)?;
        self.load().await
    }
}

async fn list_history(
    db: &Database,
    party_id: i64,
) -> Result<(Vec<pizza_calculation::Model>, Vec<beverage_calculation::Model>), AppError> {
    let conn = db.conn()?;
    let pizzas = pizza_calculation::Entity::find()
        .filter(pizza_calculation::Column::PartyId.eq(party_id))
        .order_by_desc(pizza_calculation::Column::CalculatedAt)
        .order_by_desc(pizza_calculation::Column::Id)
        .all(conn)
        .await?;
    let beverages = beverage_calculation::Entity::find()
        .filter(beverage_calculation::Column::PartyId.eq(party_id))
        .order_by_desc(beverage_calculation::Column::CalculatedAt)
        .order_by_desc(beverage_calculation::Column::Id)
        .all(conn)
        .await?;
    Ok((pizzas, beverages))
}

fn to_column(label: &str, value: u32) -> Result<i32, AppError> {
    i32::try_from(value)
        .map_err(|_| AppError::InvalidInput(format!("{label} is too large (got {value})")))
}

async fn insert_pizza(
    db: &Database,
    party_id: i64,
    guests: u32,
) -> Result<pizza_calculation::Model, AppError> {
    let conn = db.conn()?;
    require_party(conn, party_id).await?;
    let active = pizza_calculation::ActiveModel {
        party_id: Set(party_id),
        guest_count: Set(to_column("guest count", guests)?),
        pizzas_needed: Set(to_column("pizzas", calc::pizzas_needed(guests))?),
        calculated_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

async fn insert_beverages(
    db: &Database,
    party_id: i64,
    request: BeverageRequest,
) -> Result<beverage_calculation::Model, AppError> {
    if request.hours == 0 {
        return Err(AppError::InvalidInput(
            "duration must be at least one hour".to_string(),
        ));
    }
    let conn = db.conn()?;
    require_party(conn, party_id).await?;
    let estimate = calc::beverages(request);
    let active = beverage_calculation::ActiveModel {
        party_id: Set(party_id),
        guest_count: Set(to_column("guest count", request.guests)?),
        duration: Set(to_column("duration", request.hours)?),
        party_type: Set(request.party_type.as_str().to_string()),
        include_alcohol: Set(request.include_alcohol),
        water_bottles: Set(to_column("water bottles", estimate.water_bottles)?),
        soft_drinks: Set(to_column("soft drinks", estimate.soft_drinks)?),
        beer_bottles: Set(to_column("beer bottles", estimate.beer_bottles)?),
        wine_bottles: Set(to_column("wine bottles", estimate.wine_bottles)?),
        cocktail_servings: Set(to_column("cocktail servings", estimate.cocktail_servings)?),
        calculated_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

async fn delete_row(
    db: &Database,
    table: &str,
    what: &str,
    party_id: i64,
    id: i64,
) -> Result<(), AppError> {
    let result = db
        .update(
            &format!("DELETE FROM {table} WHERE id = ? AND party_id = ?"),
            vec![id.into(), party_id.into()],
        )
        .await?;
    if result.changes == 0 {
        return Err(AppError::NotFound(format!("{what} id {id}")));
    }
    Ok(())
}
