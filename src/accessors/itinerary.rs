use chrono::Utc;
use sea_orm::ActiveValue::Unchanged;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{debug, warn};

use super::{map_update_error, patch_text, record, require_party};
use crate::db::{Database, SqlStatement};
use crate::entities::itinerary_item;
use crate::error::AppError;
use crate::model::{
    ensure_non_empty, optional_text, parse_clock, ItineraryChanges, ItineraryInput,
};
use crate::templates::{self, ItinerarySlot, ItineraryTemplate};

pub struct ItineraryPlan<'a> {
    db: &'a Database,
    party_id: i64,
    items: Vec<itinerary_item::Model>,
    error: Option<String>,
}

impl<'a> ItineraryPlan<'a> {
    pub fn new(db: &'a Database, party_id: i64) -> Self {
        Self {
            db,
            party_id,
            items: Vec::new(),
            error: None,
        }
    }

    pub fn items(&self) -> &[itinerary_item::Model] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self) -> Result<&[itinerary_item::Model], AppError> {
        let result = list_items(self.db, self.party_id).await;
        self.items = record(&mut self.error, "load itinerary", result)?;
        Ok(&self.items)
    }

    pub async fn add(&mut self, input: ItineraryInput) -> Result<itinerary_item::Model, AppError> {
        let result = add_item(self.db, self.party_id, input).await;
        let item = record(&mut self.error, "add itinerary item", result)?;
        self.load().await?;
        Ok(item)
    }

    pub async fn update(
        &mut self,
        id: i64,
        changes: ItineraryChanges,
    ) -> Result<itinerary_item::Model, AppError> {
        let result = update_item(self.db, self.party_id, id, changes).await;
        let item = record(&mut self.error, "update itinerary item", result)?;
        self.load().await?;
        Ok(item)
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        let result = delete_item(self.db, self.party_id, id).await;
        record(&mut self.error, "delete itinerary item", result)?;
        self.load().await?;
        Ok(())
    }

    /// Copies an item to the end of the plan as an open "(Copy)".
    pub async fn duplicate(&mut self, id: i64) -> Result<itinerary_item::Model, AppError> {
        let result = duplicate_item(self.db, self.party_id, id).await;
        let item = record(&mut self.error, "duplicate itinerary item", result)?;
        self.load().await?;
        Ok(item)
    }

    /// Moves `ids` to the front in the given order and renumbers the whole plan
    /// `0..n` in one transaction.
    pub async fn reorder(&mut self, ids: &[i64]) -> Result<(), AppError> {
        let result = reorder_items(self.db, self.party_id, ids).await;
        record(&mut self.error, "reorder itinerary", result)?;
        self.load().await?;
        Ok(())
    }

    pub async fn templates(&mut self) -> Result<Vec<ItineraryTemplate>, AppError> {
        let result = match self.db.conn() {
            Ok(conn) => templates::itinerary_templates(conn).await,
            Err(err) => Err(err),
        };
        record(&mut self.error, "list itinerary templates", result)
    }

    /// Saves the loaded plan as a reusable template.
    pub async fn save_template(
        &mut self,
        name: &str,
        party_type: Option<String>,
        description: Option<String>,
    ) -> Result<ItineraryTemplate, AppError> {
        let result = save_template(self.db, self.party_id, name, party_type, description).await;
        record(&mut self.error, "save itinerary template", result)
    }

    /// Replaces the whole plan with the template's slots, optionally shifted so the
    /// first slot offset counts from `start_time`.
    pub async fn apply_template(
        &mut self,
        template_id: &str,
        start_time: Option<&str>,
    ) -> Result<usize, AppError> {
        let result = apply_template(self.db, self.party_id, template_id, start_time).await;
        let count = record(&mut self.error, "apply itinerary template", result)?;
        self.load().await?;
        Ok(count)
    }
}

/// Decodes the stored preparations list. Unreadable data reads as empty.
pub fn preparations(item: &itinerary_item::Model) -> Vec<String> {
    match item.preparations.as_deref() {
        None => Vec::new(),
        Some(raw) if raw.trim().is_empty() => Vec::new(),
        Some(raw) => serde_json::from_str(raw).unwrap_or_else(|err| {
            warn!(item_id = item.id, error = %err, "unreadable preparations list");
            Vec::new()
        }),
    }
}

fn encode_preparations(list: &[String]) -> Result<Option<String>, AppError> {
    let cleaned: Vec<&str> = list
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .collect();
    if cleaned.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(&cleaned)?))
    }
}

/// Clock text is stored zero-padded.
fn normalize_clock(label: &str, value: &str) -> Result<String, AppError> {
    parse_clock(label, value).map(crate::model::format_clock)
}

async fn list_items(db: &Database, party_id: i64) -> Result<Vec<itinerary_item::Model>, AppError> {
    Ok(itinerary_item::Entity::find()
        .filter(itinerary_item::Column::PartyId.eq(party_id))
        .order_by_asc(itinerary_item::Column::OrderIndex)
        .order_by_asc(itinerary_item::Column::StartTime)
        .order_by_asc(itinerary_item::Column::Id)
        .all(db.conn()?)
        .await?)
}

async fn require_item(
    db: &Database,
    party_id: i64,
    id: i64,
) -> Result<itinerary_item::Model, AppError> {
    itinerary_item::Entity::find_by_id(id)
        .filter(itinerary_item::Column::PartyId.eq(party_id))
        .one(db.conn()?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("itinerary item id {id}")))
}

async fn next_order(db: &Database, party_id: i64) -> Result<i32, AppError> {
    Ok(itinerary_item::Entity::find()
        .filter(itinerary_item::Column::PartyId.eq(party_id))
        .order_by_desc(itinerary_item::Column::OrderIndex)
        .one(db.conn()?)
        .await?
        .map(|last| last.order_index + 1)
        .unwrap_or(0))
}

async fn add_item(
    db: &Database,
    party_id: i64,
    input: ItineraryInput,
) -> Result<itinerary_item::Model, AppError> {
    ensure_non_empty("itinerary title", &input.title)?;
    let start_time = normalize_clock("start time", &input.start_time)?;
    let end_time = normalize_clock("end time", &input.end_time)?;
    let preparations = encode_preparations(&input.preparations)?;
    require_party(db.conn()?, party_id).await?;
    let order_index = next_order(db, party_id).await?;

    let active = itinerary_item::ActiveModel {
        party_id: Set(party_id),
        start_time: Set(start_time),
        end_time: Set(end_time),
        title: Set(input.title.trim().to_string()),
        description: Set(optional_text(input.description)),
        category: Set(input.category.as_str().to_string()),
        location: Set(optional_text(input.location)),
        responsible: Set(optional_text(input.responsible)),
        preparations: Set(preparations),
        notes: Set(optional_text(input.notes)),
        completed: Set(input.completed),
        order_index: Set(order_index),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(db.conn()?).await?)
}

async fn update_item(
    db: &Database,
    party_id: i64,
    id: i64,
    changes: ItineraryChanges,
) -> Result<itinerary_item::Model, AppError> {
    require_item(db, party_id, id).await?;
    let mut active = itinerary_item::ActiveModel {
        id: Unchanged(id),
        ..Default::default()
    };
    if let Some(start) = changes.start_time {
        active.start_time = Set(normalize_clock("start time", &start)?);
    }
    if let Some(end) = changes.end_time {
        active.end_time = Set(normalize_clock("end time", &end)?);
    }
    if let Some(title) = changes.title {
        ensure_non_empty("itinerary title", &title)?;
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = patch_text(changes.description) {
        active.description = Set(description);
    }
    if let Some(category) = changes.category {
        active.category = Set(category.as_str().to_string());
    }
    if let Some(location) = patch_text(changes.location) {
        active.location = Set(location);
    }
    if let Some(responsible) = patch_text(changes.responsible) {
        active.responsible = Set(responsible);
    }
    if let Some(list) = changes.preparations {
        active.preparations = Set(encode_preparations(&list)?);
    }
    if let Some(notes) = patch_text(changes.notes) {
        active.notes = Set(notes);
    }
    if let Some(completed) = changes.completed {
        active.completed = Set(completed);
    }
    if !active.is_changed() {
        return Err(AppError::InvalidInput(
            "no itinerary fields to update".to_string(),
        ));
    }

    active
        .update(db.conn()?)
        .await
        .map_err(|err| map_update_error(err, "itinerary item", id))
}

async fn delete_item(db: &Database, party_id: i64, id: i64) -> Result<(), AppError> {
    let result = db
        .update(
            "DELETE FROM itinerary_items WHERE id = ? AND party_id = ?",
            vec![id.into(), party_id.into()],
        )
        .await?;
    if result.changes == 0 {
        return Err(AppError::NotFound(format!("itinerary item id {id}")));
    }
    Ok(())
}

async fn duplicate_item(
    db: &Database,
    party_id: i64,
    id: i64,
) -> Result<itinerary_item::Model, AppError> {
    let source = require_item(db, party_id, id).await?;
    let order_index = next_order(db, party_id).await?;
    let active = itinerary_item::ActiveModel {
        party_id: Set(party_id),
        start_time: Set(source.start_time),
        end_time: Set(source.end_time),
        title: Set(format!("{} (Copy)", source.title)),
        description: Set(source.description),
        category: Set(source.category),
        location: Set(source.location),
        responsible: Set(source.responsible),
        preparations: Set(source.preparations),
        notes: Set(source.notes),
        completed: Set(false),
        order_index: Set(order_index),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(db.conn()?).await?)
}

async fn reorder_items(db: &Database, party_id: i64, ids: &[i64]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Err(AppError::InvalidInput("nothing to reorder".to_string()));
    }
    let existing: Vec<i64> = list_items(db, party_id)
        .await?
        .into_iter()
        .map(|item| item.id)
        .collect();
    for (position, id) in ids.iter().enumerate() {
        if !existing.contains(id) {
            return Err(AppError::NotFound(format!("itinerary item id {id}")));
        }
        if ids[..position].contains(id) {
            return Err(AppError::InvalidInput(format!(
                "itinerary item {id} listed twice"
            )));
        }
    }

    // Unlisted items follow the listed ones in their current order.
    let rest = existing.iter().filter(|id| !ids.contains(*id));
    let statements = ids
        .iter()
        .chain(rest)
        .enumerate()
        .map(|(position, id)| {
            SqlStatement::new(
                "UPDATE itinerary_items SET order_index = ? WHERE id = ? AND party_id = ?",
                vec![(position as i32).into(), (*id).into(), party_id.into()],
            )
        })
        .collect();
    db.transaction(statements).await?;
    debug!(party_id, moved = ids.len(), total = existing.len(), "itinerary reordered");
    Ok(())
}

async fn save_template(
    db: &Database,
    party_id: i64,
    name: &str,
    party_type: Option<String>,
    description: Option<String>,
) -> Result<ItineraryTemplate, AppError> {
    let party = require_party(db.conn()?, party_id).await?;
    let items = list_items(db, party_id).await?;
    if items.is_empty() {
        return Err(AppError::InvalidInput(
            "party has no itinerary items to save as a template".to_string(),
        ));
    }
    let slots = items
        .iter()
        .map(|item| ItinerarySlot {
            start_time: item.start_time.clone(),
            end_time: item.end_time.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            category: item.category.clone(),
            location: item.location.clone(),
            preparations: preparations(item),
        })
        .collect();
    templates::save_itinerary_template(
        db.conn()?,
        name,
        party_type,
        Some(party.duration),
        description,
        slots,
    )
    .await
}

async fn apply_template(
    db: &Database,
    party_id: i64,
    template_id: &str,
    start_time: Option<&str>,
) -> Result<usize, AppError> {
    let template = templates::find_itinerary_template(db.conn()?, template_id).await?;
    require_party(db.conn()?, party_id).await?;
    let statements = templates::itinerary_statements(party_id, &template, start_time)?;
    db.transaction(statements).await?;
    debug!(party_id, template = %template.id, items = template.slots.len(), "itinerary template applied");
    Ok(template.slots.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::parties::PartyList;
    use crate::db::open_for_test;
    use crate::model::{ItineraryCategory, PartyInput};

    async fn party(db: &Database) -> i64 {
        PartyList::new(db)
            .create(PartyInput::named("Reunion"))
            .await
            .expect("party")
            .id
    }

    fn item(start: &str, title: &str) -> ItineraryInput {
        ItineraryInput::new(start, "23:00", title, ItineraryCategory::Activity)
    }

    #[tokio::test]
    async fn items_append_with_dense_order() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut plan = ItineraryPlan::new(&db, party_id);
        let first = plan.add(item("19:00", "Toast")).await.expect("toast");
        let second = plan.add(item("9:30", "Brunch")).await.expect("brunch");
        assert_eq!(first.order_index, 0);
        assert_eq!(second.order_index, 1);
        assert_eq!(second.start_time, "09:30");

        let titles: Vec<&str> = plan.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Toast", "Brunch"]);
    }

    #[tokio::test]
    async fn invalid_clock_is_rejected() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut plan = ItineraryPlan::new(&db, party_id);
        let err = plan.add(item("19:75", "Late")).await.expect_err("bad clock");
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(plan.error().is_some());
    }

    #[tokio::test]
    async fn preparations_round_trip_as_a_list() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut plan = ItineraryPlan::new(&db, party_id);
        let created = plan
            .add(ItineraryInput {
                preparations: vec!["Chill drinks".to_string(), " ".to_string(), "Cue music".to_string()],
                ..item("18:00", "Welcome")
            })
            .await
            .expect("add");
        assert_eq!(preparations(&created), vec!["Chill drinks", "Cue music"]);

        let updated = plan
            .update(
                created.id,
                ItineraryChanges {
                    preparations: Some(Vec::new()),
                    completed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert!(updated.preparations.is_none());
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn duplicate_appends_an_open_copy() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut plan = ItineraryPlan::new(&db, party_id);
        let original = plan
            .add(ItineraryInput {
                completed: true,
                ..item("20:00", "Speeches")
            })
            .await
            .expect("add");
        let copy = plan.duplicate(original.id).await.expect("duplicate");
        assert_eq!(copy.title, "Speeches (Copy)");
        assert!(!copy.completed);
        assert_eq!(copy.order_index, 1);
        assert_eq!(plan.items().len(), 2);
    }

    #[tokio::test]
    async fn reorder_rewrites_positions() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut plan = ItineraryPlan::new(&db, party_id);
        let a = plan.add(item("18:00", "A")).await.expect("a").id;
        let b = plan.add(item("19:00", "B")).await.expect("b").id;
        let c = plan.add(item("20:00", "C")).await.expect("c").id;

        plan.reorder(&[c, a, b]).await.expect("reorder");
        let order: Vec<(i64, i32)> = plan
            .items()
            .iter()
            .map(|item| (item.id, item.order_index))
            .collect();
        assert_eq!(order, vec![(c, 0), (a, 1), (b, 2)]);

        plan.reorder(&[b]).await.expect("partial reorder");
        let order: Vec<(i64, i32)> = plan
            .items()
            .iter()
            .map(|item| (item.id, item.order_index))
            .collect();
        assert_eq!(order, vec![(b, 0), (c, 1), (a, 2)]);

        assert!(matches!(
            plan.reorder(&[a, a]).await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            plan.reorder(&[a, 9999]).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn applying_a_template_replaces_the_plan() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut plan = ItineraryPlan::new(&db, party_id);
        plan.add(item("12:00", "Leftover")).await.expect("add");

        let count = plan
            .apply_template("birthday-party-3h", Some("18:00"))
            .await
            .expect("apply");
        assert_eq!(plan.items().len(), count);
        assert_eq!(plan.items()[0].start_time, "18:00");
        plan.apply_template("birthday-party-3h", Some("18:00"))
            .await
            .expect("apply again");
        assert_eq!(plan.items().len(), count);
        let positions: Vec<i32> = plan.items().iter().map(|item| item.order_index).collect();
        assert_eq!(positions, (0..count as i32).collect::<Vec<_>>());
        assert!(plan.items().iter().all(|item| item.title != "Leftover"));
    }

    #[tokio::test]
    async fn saved_template_can_be_applied_elsewhere() {
        let db = open_for_test().await;
        let source = party(&db).await;
        let mut plan = ItineraryPlan::new(&db, source);
        plan.add(item("18:00", "Mingle")).await.expect("add");
        plan.add(item("19:30", "Dinner")).await.expect("add");
        let saved = plan
            .save_template("Evening", Some("dinner".to_string()), None)
            .await
            .expect("save");
        assert_eq!(saved.slots.len(), 2);
        assert_eq!(plan.templates().await.expect("templates").len(), 3);

        let target = party(&db).await;
        let mut other = ItineraryPlan::new(&db, target);
        other.apply_template(&saved.id, None).await.expect("apply");
        let titles: Vec<&str> = other.items().iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Mingle", "Dinner"]);
    }
}
