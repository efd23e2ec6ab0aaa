use chrono::Utc;
use sea_orm::ActiveValue::Unchanged;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use super::{map_update_error, record, require_party};
use crate::db::Database;
use crate::entities::timeline_task;
use crate::error::AppError;
use crate::model::{ensure_non_empty, TimeFrame, TimelineTaskChanges, TimelineTaskInput};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Completion {
    pub total: usize,
    pub completed: usize,
    /// Rounded to the nearest whole percent; 0 when there are no tasks.
    pub percentage: u32,
}

pub struct TimelineTaskList<'a> {
    db: &'a Database,
    party_id: i64,
    tasks: Vec<timeline_task::Model>,
    error: Option<String>,
}

impl<'a> TimelineTaskList<'a> {
    pub fn new(db: &'a Database, party_id: i64) -> Self {
        Self {
            db,
            party_id,
            tasks: Vec::new(),
            error: None,
        }
    }

    pub fn tasks(&self) -> &[timeline_task::Model] {
        &self.tasks
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Known buckets furthest-out first, custom buckets after; creation order within.
    pub async fn load(&mut self) -> Result<&[timeline_task::Model], AppError> {
        let result = list_tasks(self.db, self.party_id).await;
        self.tasks = record(&mut self.error, "load timeline", result)?;
        Ok(&self.tasks)
    }

    pub async fn add(&mut self, input: TimelineTaskInput) -> Result<timeline_task::Model, AppError> {
        let result = add_task(self.db, self.party_id, input).await;
        let task = record(&mut self.error, "add timeline task", result)?;
        self.load().await?;
        Ok(task)
    }

    pub async fn update(
        &mut self,
        id: i64,
        changes: TimelineTaskChanges,
    ) -> Result<timeline_task::Model, AppError> {
        let result = update_task(self.db, self.party_id, id, changes).await;
        let task = record(&mut self.error, "update timeline task", result)?;
        self.load().await?;
        Ok(task)
    }

    pub async fn toggle(&mut self, id: i64) -> Result<timeline_task::Model, AppError> {
        let result = toggle_task(self.db, self.party_id, id).await;
        let task = record(&mut self.error, "toggle timeline task", result)?;
        self.load().await?;
        Ok(task)
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        let result = delete_task(self.db, self.party_id, id).await;
        record(&mut self.error, "delete timeline task", result)?;
        self.load().await?;
        Ok(())
    }

    /// Groups the loaded tasks by bucket, keeping bucket order.
    pub fn by_time_frame(&self) -> Vec<(&str, Vec<&timeline_task::Model>)> {
        let mut groups: Vec<(&str, Vec<&timeline_task::Model>)> = Vec::new();
        for task in &self.tasks {
            match groups.iter_mut().find(|(frame, _)| *frame == task.time_frame) {
                Some((_, members)) => members.push(task),
                None => groups.push((task.time_frame.as_str(), vec![task])),
            }
        }
        groups
    }

    pub fn completion(&self) -> Completion {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|task| task.completed).count();
        let percentage = if total == 0 {
            0
        } else {
            (completed as f64 / total as f64 * 100.0).round() as u32
        };
        Completion {
            total,
            completed,
            percentage,
        }
    }
}

async fn list_tasks(db: &Database, party_id: i64) -> Result<Vec<timeline_task::Model>, AppError> {
    let mut tasks = timeline_task::Entity::find()
        .filter(timeline_task::Column::PartyId.eq(party_id))
        .all(db.conn()?)
        .await?;
    tasks.sort_by(|a, b| {
        TimeFrame::rank_of(&a.time_frame)
            .cmp(&TimeFrame::rank_of(&b.time_frame))
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(tasks)
}

async fn add_task(
    db: &Database,
    party_id: i64,
    input: TimelineTaskInput,
) -> Result<timeline_task::Model, AppError> {
    ensure_non_empty("task", &input.task)?;
    ensure_non_empty("time frame", &input.time_frame)?;
    let conn = db.conn()?;
    require_party(conn, party_id).await?;

    let active = timeline_task::ActiveModel {
        party_id: Set(party_id),
        task: Set(input.task.trim().to_string()),
        time_frame: Set(canonical_frame(&input.time_frame)),
        category: Set(input.category.as_str().to_string()),
        completed: Set(false),
        is_custom: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

/// Known buckets are stored with their canonical spelling.
fn canonical_frame(value: &str) -> String {
    TimeFrame::parse(value)
        .map(|frame| frame.as_str().to_string())
        .unwrap_or_else(|| value.trim().to_string())
}

async fn require_task<C: ConnectionTrait>(
    conn: &C,
    party_id: i64,
    id: i64,
) -> Result<timeline_task::Model, AppError> {
    timeline_task::Entity::find_by_id(id)
        .filter(timeline_task::Column::PartyId.eq(party_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("timeline task id {id}")))
}

async fn update_task(
    db: &Database,
    party_id: i64,
    id: i64,
    changes: TimelineTaskChanges,
) -> Result<timeline_task::Model, AppError> {
    require_task(db.conn()?, party_id, id).await?;
    let mut active = timeline_task::ActiveModel {
        id: Unchanged(id),
        ..Default::default()
    };
    if let Some(task) = changes.task {
        ensure_non_empty("task", &task)?;
        active.task = Set(task.trim().to_string());
    }
    if let Some(frame) = changes.time_frame {
        ensure_non_empty("time frame", &frame)?;
        active.time_frame = Set(canonical_frame(&frame));
    }
    if let Some(category) = changes.category {
        active.category = Set(category.as_str().to_string());
    }
    if let Some(completed) = changes.completed {
        active.completed = Set(completed);
    }
    if !active.is_changed() {
        return Err(AppError::InvalidInput(
            "no timeline task fields to update".to_string(),
        ));
    }

    active
        .update(db.conn()?)
        .await
        .map_err(|err| map_update_error(err, "timeline task", id))
}

async fn toggle_task(
    db: &Database,
    party_id: i64,
    id: i64,
) -> Result<timeline_task::Model, AppError> {
    let conn = db.conn()?;
    let task = require_task(conn, party_id, id).await?;
    let completed = !task.completed;
    let mut active: timeline_task::ActiveModel = task.into();
    active.completed = Set(completed);
    Ok(active.update(conn).await?)
}

async fn delete_task(db: &Database, party_id: i64, id: i64) -> Result<(), AppError> {
    let result = db
        .update(
            "DELETE FROM timeline_tasks WHERE id = ? AND party_id = ?",
            vec![id.into(), party_id.into()],
        )
        .await?;
    if result.changes == 0 {
        return Err(AppError::NotFound(format!("timeline task id {id}")));
    }
    Ok(())
}
