use chrono::Utc;
use sea_orm::ActiveValue::Unchanged;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set, TransactionTrait};
use tracing::info;

use super::{map_update_error, patch_text, record, require_party};
use crate::db::{finalize_transaction, Database};
use crate::entities::{party, timeline_task};
use crate::error::AppError;
use crate::model::{
    ensure_non_empty, ensure_non_negative, optional_text, parse_date, PartyChanges, PartyInput,
};
use crate::schema::DEFAULT_TIMELINE_TASKS;

pub struct PartyList<'a> {
    db: &'a Database,
    parties: Vec<party::Model>,
    error: Option<String>,
}

impl<'a> PartyList<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            parties: Vec::new(),
            error: None,
        }
    }

    pub fn parties(&self) -> &[party::Model] {
        &self.parties
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Newest first.
    pub async fn load(&mut self) -> Result<&[party::Model], AppError> {
        let result = list_parties(self.db).await;
        self.parties = record(&mut self.error, "load parties", result)?;
        Ok(&self.parties)
    }

    pub async fn get(&mut self, id: i64) -> Result<party::Model, AppError> {
        let result = match self.db.conn() {
            Ok(conn) => require_party(conn, id).await,
            Err(err) => Err(err),
        };
        record(&mut self.error, "get party", result)
    }

    /// Inserts the party together with the default timeline in one transaction.
    pub async fn create(&mut self, input: PartyInput) -> Result<party::Model, AppError> {
        let result = create_party(self.db, input).await;
        let party = record(&mut self.error, "create party", result)?;
        info!(party_id = party.id, name = %party.name, "party created");
        self.load().await?;
        Ok(party)
    }

    pub async fn update(&mut self, id: i64, changes: PartyChanges) -> Result<party::Model, AppError> {
        let result = update_party(self.db, id, changes).await;
        let party = record(&mut self.error, "update party", result)?;
        self.load().await?;
        Ok(party)
    }

    /// Removes the party and, through the foreign keys, everything it owns.
    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        let result = delete_party(self.db, id).await;
        record(&mut self.error, "delete party", result)?;
        info!(party_id = id, "party deleted");
        self.load().await?;
        Ok(())
    }
}

async fn list_parties(db: &Database) -> Result<Vec<party::Model>, AppError> {
    Ok(party::Entity::find()
        .order_by_desc(party::Column::CreatedAt)
        .order_by_desc(party::Column::Id)
        .all(db.conn()?)
        .await?)
}

fn ensure_duration(duration: i32) -> Result<(), AppError> {
    if duration <= 0 {
        return Err(AppError::InvalidInput(format!(
            "duration must be at least one hour (got {duration})"
        )));
    }
    Ok(())
}

async fn create_party(db: &Database, input: PartyInput) -> Result<party::Model, AppError> {
    ensure_non_empty("party name", &input.name)?;
    ensure_non_negative("guest count", input.guest_count)?;
    ensure_duration(input.duration)?;
    let date = optional_text(input.date);
    if let Some(date) = date.as_deref() {
        parse_date("party date", date)?;
    }

    let txn = db.conn()?.begin().await?;
    let result: Result<party::Model, AppError> = async {
        let now = Utc::now();
        let party = party::ActiveModel {
            name: Set(input.name.trim().to_string()),
            date: Set(date),
            guest_count: Set(input.guest_count),
            party_type: Set(input.party_type.as_str().to_string()),
            duration: Set(input.duration),
            theme: Set(optional_text(input.theme)),
            notes: Set(optional_text(input.notes)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let tasks = DEFAULT_TIMELINE_TASKS
            .iter()
            .map(|task| timeline_task::ActiveModel {
                party_id: Set(party.id),
                task: Set(task.task.to_string()),
                time_frame: Set(task.time_frame.as_str().to_string()),
                category: Set(task.category.as_str().to_string()),
                completed: Set(false),
                is_custom: Set(false),
                created_at: Set(now),
                ..Default::default()
            });
        timeline_task::Entity::insert_many(tasks).exec(&txn).await?;
        Ok(party)
    }
    .await;

    finalize_transaction(txn, result).await
}

async fn update_party(
    db: &Database,
    id: i64,
    changes: PartyChanges,
) -> Result<party::Model, AppError> {
    let mut active = party::ActiveModel {
        id: Unchanged(id),
        ..Default::default()
    };

    if let Some(name) = changes.name {
        ensure_non_empty("party name", &name)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(date) = patch_text(changes.date) {
        if let Some(date) = date.as_deref() {
            parse_date("party date", date)?;
        }
        active.date = Set(date);
    }
    if let Some(guest_count) = changes.guest_count {
        ensure_non_negative("guest count", guest_count)?;
        active.guest_count = Set(guest_count);
    }
    if let Some(party_type) = changes.party_type {
        active.party_type = Set(party_type.as_str().to_string());
    }
    if let Some(duration) = changes.duration {
        ensure_duration(duration)?;
        active.duration = Set(duration);
    }
    if let Some(theme) = patch_text(changes.theme) {
        active.theme = Set(theme);
    }
    if let Some(notes) = patch_text(changes.notes) {
        active.notes = Set(notes);
    }
    if !active.is_changed() {
        return Err(AppError::InvalidInput("no party fields to update".to_string()));
    }
    active.updated_at = Set(Utc::now());

    active
        .update(db.conn()?)
        .await
        .map_err(|err| map_update_error(err, "party", id))
}

async fn delete_party(db: &Database, id: i64) -> Result<(), AppError> {
    let result = db
        .update("DELETE FROM parties WHERE id = ?", vec![id.into()])
        .await?;
    if result.changes == 0 {
        return Err(AppError::NotFound(format!("party id {id}")));
    }
    Ok(())
}
