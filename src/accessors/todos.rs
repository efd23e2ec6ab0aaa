use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Unchanged;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, Order, QueryFilter, QueryOrder,
    Set,
};
use tracing::debug;

use super::{map_update_error, patch_text, record, require_party};
use crate::db::Database;
use crate::entities::{todo_attachment, todo_dependency, todo_item, todo_subtask};
use crate::error::AppError;
use crate::model::{
    ensure_non_empty, optional_text, parse_date, AttachmentInput, SubTaskChanges, TodoChanges,
    TodoInput, TodoPriority,
};
use crate::templates::{self, TodoBlueprint, TodoTemplate};

#[derive(Clone, Debug, PartialEq)]
pub struct TodoDetail {
    pub todo: todo_item::Model,
    pub subtasks: Vec<todo_subtask::Model>,
    /// Ids of the todos this one waits on.
    pub dependencies: Vec<i64>,
    pub attachments: Vec<todo_attachment::Model>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodoStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub overdue: usize,
    /// Actual cost where recorded, otherwise the estimate.
    pub total_cost: f64,
    /// Estimated minutes left on incomplete todos.
    pub remaining_minutes: i64,
    pub by_category: BTreeMap<String, usize>,
    pub by_priority: BTreeMap<String, usize>,
    pub completion_rate: u32,
}

pub struct TodoList<'a> {
    db: &'a Database,
    party_id: i64,
    todos: Vec<TodoDetail>,
    error: Option<String>,
}

impl<'a> TodoList<'a> {
    pub fn new(db: &'a Database, party_id: i64) -> Self {
        Self {
            db,
            party_id,
            todos: Vec::new(),
            error: None,
        }
    }

    pub fn todos(&self) -> &[TodoDetail] {
        &self.todos
    }

    pub fn find(&self, id: i64) -> Option<&TodoDetail> {
        self.todos.iter().find(|detail| detail.todo.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Open todos first, then by priority (critical first) and due date.
    pub async fn load(&mut self) -> Result<&[TodoDetail], AppError> {
        let result = list_todos(self.db, self.party_id).await;
        self.todos = record(&mut self.error, "load todos", result)?;
        Ok(&self.todos)
    }

    pub async fn add(&mut self, input: TodoInput) -> Result<todo_item::Model, AppError> {
        let result = add_todo(self.db, self.party_id, input).await;
        let todo = record(&mut self.error, "add todo", result)?;
        self.load().await?;
        Ok(todo)
    }

    /// Repeating the stored `completed` value keeps `completed_at` as it is.
    pub async fn update(&mut self, id: i64, changes: TodoChanges) -> Result<todo_item::Model, AppError> {
        let result = update_todo(self.db, self.party_id, id, changes).await;
        let todo = record(&mut self.error, "update todo", result)?;
        self.load().await?;
        Ok(todo)
    }

    pub async fn toggle(&mut self, id: i64) -> Result<todo_item::Model, AppError> {
        let current = match self.db.conn() {
            Ok(conn) => require_todo(conn, self.party_id, id).await,
            Err(err) => Err(err),
        };
        let current = record(&mut self.error, "toggle todo", current)?;
        self.update(
            id,
            TodoChanges {
                completed: Some(!current.completed),
                ..Default::default()
            },
        )
        .await
    }

    /// Subtasks, attachments and dependency edges in both directions go with it.
    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        let result = delete_todo(self.db, self.party_id, id).await;
        record(&mut self.error, "delete todo", result)?;
        self.load().await?;
        Ok(())
    }

    pub async fn add_subtask(&mut self, todo_id: i64, title: &str) -> Result<todo_subtask::Model, AppError> {
        let result = add_subtask(self.db, self.party_id, todo_id, title).await;
        let subtask = record(&mut self.error, "add subtask", result)?;
        self.load().await?;
        Ok(subtask)
    }

    pub async fn update_subtask(
        &mut self,
        id: i64,
        changes: SubTaskChanges,
    ) -> Result<todo_subtask::Model, AppError> {
        let result = update_subtask(self.db, self.party_id, id, changes).await;
        let subtask = record(&mut self.error, "update subtask", result)?;
        self.load().await?;
        Ok(subtask)
    }

    pub async fn delete_subtask(&mut self, id: i64) -> Result<(), AppError> {
        let result = delete_subtask(self.db, self.party_id, id).await;
        record(&mut self.error, "delete subtask", result)?;
        self.load().await?;
        Ok(())
    }

    /// Records that `todo_id` waits on `depends_on_id`. Self-edges, duplicates and
    /// edges that would close a cycle are rejected.
    pub async fn add_dependency(&mut self, todo_id: i64, depends_on_id: i64) -> Result<(), AppError> {
        let result = add_dependency(self.db, self.party_id, todo_id, depends_on_id).await;
        record(&mut self.error, "add dependency", result)?;
        self.load().await?;
        Ok(())
    }

    pub async fn remove_dependency(&mut self, todo_id: i64, depends_on_id: i64) -> Result<(), AppError> {
        let result = remove_dependency(self.db, self.party_id, todo_id, depends_on_id).await;
        record(&mut self.error, "remove dependency", result)?;
        self.load().await?;
        Ok(())
    }

    pub async fn add_attachment(
        &mut self,
        todo_id: i64,
        input: AttachmentInput,
    ) -> Result<todo_attachment::Model, AppError> {
        let result = add_attachment(self.db, self.party_id, todo_id, input).await;
        let attachment = record(&mut self.error, "add attachment", result)?;
        self.load().await?;
        Ok(attachment)
    }

    pub async fn delete_attachment(&mut self, id: i64) -> Result<(), AppError> {
        let result = delete_attachment(self.db, self.party_id, id).await;
        record(&mut self.error, "delete attachment", result)?;
        self.load().await?;
        Ok(())
    }

    pub async fn templates(&mut self) -> Result<Vec<TodoTemplate>, AppError> {
        let result = match self.db.conn() {
            Ok(conn) => templates::todo_templates(conn).await,
            Err(err) => Err(err),
        };
        record(&mut self.error, "list todo templates", result)
    }

    /// Saves the loaded todos as a reusable template. Due dates become offsets
    /// from the party date when both are known.
    pub async fn save_template(
        &mut self,
        name: &str,
        party_type: Option<String>,
        guest_count_range: Option<String>,
    ) -> Result<TodoTemplate, AppError> {
        let result = save_template(self.db, self.party_id, name, party_type, guest_count_range).await;
        record(&mut self.error, "save todo template", result)
    }

    /// Appends the template's todos. Due dates count back from `reference`, the
    /// party date, or today, in that order of preference.
    pub async fn apply_template(
        &mut self,
        template_id: &str,
        reference: Option<NaiveDate>,
    ) -> Result<usize, AppError> {
        let result = apply_template(self.db, self.party_id, template_id, reference).await;
        let added = record(&mut self.error, "apply todo template", result)?;
        self.load().await?;
        Ok(added)
    }

    pub fn stats(&self) -> TodoStats {
        self.stats_on(Utc::now().date_naive())
    }

    pub fn stats_on(&self, today: NaiveDate) -> TodoStats {
        let mut stats = TodoStats {
            total: self.todos.len(),
            ..TodoStats::default()
        };
        for TodoDetail { todo, .. } in &self.todos {
            if todo.completed {
                stats.completed += 1;
            } else {
                stats.remaining_minutes += i64::from(todo.estimated_time.unwrap_or(0));
                let overdue = todo
                    .due_date
                    .as_deref()
                    .and_then(|due| NaiveDate::parse_from_str(due, "%Y-%m-%d").ok())
                    .is_some_and(|due| due < today);
                if overdue {
                    stats.overdue += 1;
                }
            }
            stats.total_cost += todo.actual_cost.or(todo.estimated_cost).unwrap_or(0.0);
            *stats.by_category.entry(todo.category.clone()).or_default() += 1;
            *stats.by_priority.entry(todo.priority.clone()).or_default() += 1;
        }
        stats.pending = stats.total - stats.completed;
        stats.completion_rate = if stats.total == 0 {
            0
        } else {
            (stats.completed as f64 / stats.total as f64 * 100.0).round() as u32
        };
        stats
    }
}

fn priority_rank_sql() -> String {
    let arms: String = TodoPriority::ALL
        .iter()
        .map(|priority| format!(" WHEN '{}' THEN {}", priority.as_str(), priority.rank()))
        .collect();
    format!("CASE priority{arms} ELSE 0 END")
}

async fn list_todos(db: &Database, party_id: i64) -> Result<Vec<TodoDetail>, AppError> {
    let conn = db.conn()?;
    let todos = todo_item::Entity::find()
        .filter(todo_item::Column::PartyId.eq(party_id))
        .order_by_asc(todo_item::Column::Completed)
        .order_by(Expr::cust(priority_rank_sql()), Order::Desc)
        .order_by(Expr::cust("due_date IS NULL"), Order::Asc)
        .order_by_asc(todo_item::Column::DueDate)
        .order_by_asc(todo_item::Column::Id)
        .all(conn)
        .await?;
    let ids: Vec<i64> = todos.iter().map(|todo| todo.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut subtasks: HashMap<i64, Vec<todo_subtask::Model>> = HashMap::new();
    for subtask in todo_subtask::Entity::find()
        .filter(todo_subtask::Column::TodoId.is_in(ids.clone()))
        .order_by_asc(todo_subtask::Column::OrderIndex)
        .order_by_asc(todo_subtask::Column::Id)
        .all(conn)
        .await?
    {
        subtasks.entry(subtask.todo_id).or_default().push(subtask);
    }

    let mut attachments: HashMap<i64, Vec<todo_attachment::Model>> = HashMap::new();
    for attachment in todo_attachment::Entity::find()
        .filter(todo_attachment::Column::TodoId.is_in(ids.clone()))
        .order_by_asc(todo_attachment::Column::Id)
        .all(conn)
        .await?
    {
        attachments.entry(attachment.todo_id).or_default().push(attachment);
    }

    let mut dependencies: HashMap<i64, Vec<i64>> = HashMap::new();
    for edge in todo_dependency::Entity::find()
        .filter(todo_dependency::Column::TodoId.is_in(ids))
        .order_by_asc(todo_dependency::Column::DependsOnId)
        .all(conn)
        .await?
    {
        dependencies.entry(edge.todo_id).or_default().push(edge.depends_on_id);
    }

    Ok(todos
        .into_iter()
        .map(|todo| TodoDetail {
            subtasks: subtasks.remove(&todo.id).unwrap_or_default(),
            dependencies: dependencies.remove(&todo.id).unwrap_or_default(),
            attachments: attachments.remove(&todo.id).unwrap_or_default(),
            todo,
        })
        .collect())
}

async fn require_todo<C: ConnectionTrait>(
    db: &C,
    party_id: i64,
    id: i64,
) -> Result<todo_item::Model, AppError> {
    todo_item::Entity::find_by_id(id)
        .filter(todo_item::Column::PartyId.eq(party_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("todo id {id}")))
}

fn ensure_non_negative_amount(label: &str, value: Option<f64>) -> Result<(), AppError> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => Err(AppError::InvalidInput(
            format!("{label} must be a non-negative number (got {amount})"),
        )),
        _ => Ok(()),
    }
}

fn ensure_minutes(value: Option<i32>) -> Result<(), AppError> {
    match value {
        Some(minutes) if minutes < 0 => Err(AppError::InvalidInput(format!(
            "estimated time cannot be negative (got {minutes})"
        ))),
        _ => Ok(()),
    }
}

async fn add_todo(db: &Database, party_id: i64, input: TodoInput) -> Result<todo_item::Model, AppError> {
    ensure_non_empty("todo title", &input.title)?;
    ensure_minutes(input.estimated_time)?;
    ensure_non_negative_amount("estimated cost", input.estimated_cost)?;
    ensure_non_negative_amount("actual cost", input.actual_cost)?;
    let due_date = optional_text(input.due_date);
    if let Some(due) = due_date.as_deref() {
        parse_date("due date", due)?;
    }
    let conn = db.conn()?;
    require_party(conn, party_id).await?;

    let now = Utc::now();
    let active = todo_item::ActiveModel {
        party_id: Set(party_id),
        title: Set(input.title.trim().to_string()),
        description: Set(optional_text(input.description)),
        category: Set(input.category.as_str().to_string()),
        priority: Set(input.priority.as_str().to_string()),
        due_date: Set(due_date),
        estimated_time: Set(input.estimated_time),
        completed: Set(input.completed),
        assigned_to: Set(optional_text(input.assigned_to)),
        location: Set(optional_text(input.location)),
        estimated_cost: Set(input.estimated_cost),
        actual_cost: Set(input.actual_cost),
        notes: Set(optional_text(input.notes)),
        created_at: Set(now),
        completed_at: Set(input.completed.then_some(now)),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

async fn update_todo(
    db: &Database,
    party_id: i64,
    id: i64,
    changes: TodoChanges,
) -> Result<todo_item::Model, AppError> {
    if changes.is_empty() {
        return Err(AppError::InvalidInput("no todo fields to update".to_string()));
    }
    let conn = db.conn()?;
    let current = require_todo(conn, party_id, id).await?;

    let mut active = todo_item::ActiveModel {
        id: Unchanged(id),
        ..Default::default()
    };
    if let Some(title) = changes.title {
        ensure_non_empty("todo title", &title)?;
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = patch_text(changes.description) {
        active.description = Set(description);
    }
    if let Some(category) = changes.category {
        active.category = Set(category.as_str().to_string());
    }
    if let Some(priority) = changes.priority {
        active.priority = Set(priority.as_str().to_string());
    }
    if let Some(due_date) = patch_text(changes.due_date) {
        if let Some(due) = due_date.as_deref() {
            parse_date("due date", due)?;
        }
        active.due_date = Set(due_date);
    }
    if let Some(minutes) = changes.estimated_time {
        ensure_minutes(Some(minutes))?;
        active.estimated_time = Set(Some(minutes));
    }
    if let Some(completed) = changes.completed {
        if completed != current.completed {
            active.completed = Set(completed);
            active.completed_at = Set(completed.then(Utc::now));
        }
    }
    if let Some(assigned_to) = patch_text(changes.assigned_to) {
        active.assigned_to = Set(assigned_to);
    }
    if let Some(location) = patch_text(changes.location) {
        active.location = Set(location);
    }
    if let Some(cost) = changes.estimated_cost {
        ensure_non_negative_amount("estimated cost", Some(cost))?;
        active.estimated_cost = Set(Some(cost));
    }
    if let Some(cost) = changes.actual_cost {
        ensure_non_negative_amount("actual cost", Some(cost))?;
        active.actual_cost = Set(Some(cost));
    }
    if let Some(notes) = patch_text(changes.notes) {
        active.notes = Set(notes);
    }
    if !active.is_changed() {
        return Ok(current);
    }

    active
        .update(conn)
        .await
        .map_err(|err| map_update_error(err, "todo", id))
}

async fn delete_todo(db: &Database, party_id: i64, id: i64) -> Result<(), AppError> {
    let result = db
        .update(
            "DELETE FROM todo_items WHERE id = ? AND party_id = ?",
            vec![id.into(), party_id.into()],
        )
        .await?;
    if result.changes == 0 {
        return Err(AppError::NotFound(format!("todo id {id}")));
    }
    Ok(())
}

async fn add_subtask(
    db: &Database,
    party_id: i64,
    todo_id: i64,
    title: &str,
) -> Result<todo_subtask::Model, AppError> {
    ensure_non_empty("subtask title", title)?;
    let conn = db.conn()?;
    require_todo(conn, party_id, todo_id).await?;

    let next_order = todo_subtask::Entity::find()
        .filter(todo_subtask::Column::TodoId.eq(todo_id))
        .order_by_desc(todo_subtask::Column::OrderIndex)
        .one(conn)
        .await?
        .map(|last| last.order_index + 1)
        .unwrap_or(0);
    let active = todo_subtask::ActiveModel {
        todo_id: Set(todo_id),
        title: Set(title.trim().to_string()),
        completed: Set(false),
        order_index: Set(next_order),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

async fn require_subtask<C: ConnectionTrait>(
    db: &C,
    party_id: i64,
    id: i64,
) -> Result<todo_subtask::Model, AppError> {
    let subtask = todo_subtask::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("subtask id {id}")))?;
    require_todo(db, party_id, subtask.todo_id)
        .await
        .map_err(|_| AppError::NotFound(format!("subtask id {id}")))?;
    Ok(subtask)
}

async fn update_subtask(
    db: &Database,
    party_id: i64,
    id: i64,
    changes: SubTaskChanges,
) -> Result<todo_subtask::Model, AppError> {
    let conn = db.conn()?;
    require_subtask(conn, party_id, id).await?;

    let mut active = todo_subtask::ActiveModel {
        id: Unchanged(id),
        ..Default::default()
    };
    if let Some(title) = changes.title {
        ensure_non_empty("subtask title", &title)?;
        active.title = Set(title.trim().to_string());
    }
    if let Some(completed) = changes.completed {
        active.completed = Set(completed);
    }
    if let Some(order_index) = changes.order_index {
        if order_index < 0 {
            return Err(AppError::InvalidInput(format!(
                "subtask order cannot be negative (got {order_index})"
            )));
        }
        active.order_index = Set(order_index);
    }
    if !active.is_changed() {
        return Err(AppError::InvalidInput("no subtask fields to update".to_string()));
    }
    active
        .update(conn)
        .await
        .map_err(|err| map_update_error(err, "subtask", id))
}

async fn delete_subtask(db: &Database, party_id: i64, id: i64) -> Result<(), AppError> {
    require_subtask(db.conn()?, party_id, id).await?;
    db.update("DELETE FROM todo_subtasks WHERE id = ?", vec![id.into()])
        .await?;
    Ok(())
}

async fn add_dependency(
    db: &Database,
    party_id: i64,
    todo_id: i64,
    depends_on_id: i64,
) -> Result<(), AppError> {
    if todo_id == depends_on_id {
        return Err(AppError::InvalidInput(format!(
            "todo {todo_id} cannot depend on itself"
        )));
    }
    let conn = db.conn()?;
    require_todo(conn, party_id, todo_id).await?;
    require_todo(conn, party_id, depends_on_id).await?;

    let party_todo_ids: Vec<i64> = todo_item::Entity::find()
        .filter(todo_item::Column::PartyId.eq(party_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|todo| todo.id)
        .collect();
    let edges = todo_dependency::Entity::find()
        .filter(todo_dependency::Column::TodoId.is_in(party_todo_ids))
        .all(conn)
        .await?;

    if edges
        .iter()
        .any(|edge| edge.todo_id == todo_id && edge.depends_on_id == depends_on_id)
    {
        return Err(AppError::InvalidInput(format!(
            "todo {todo_id} already depends on {depends_on_id}"
        )));
    }
    if reaches(&edges, depends_on_id, todo_id) {
        return Err(AppError::InvalidInput(format!(
            "todo {todo_id} cannot depend on {depends_on_id}: {depends_on_id} already waits on {todo_id}"
        )));
    }

    let active = todo_dependency::ActiveModel {
        todo_id: Set(todo_id),
        depends_on_id: Set(depends_on_id),
        ..Default::default()
    };
    active.insert(conn).await?;
    debug!(todo_id, depends_on_id, "dependency added");
    Ok(())
}

/// Whether `target` is reachable from `start` by following "waits on" edges.
fn reaches(edges: &[todo_dependency::Model], start: i64, target: i64) -> bool {
    let mut queue = VecDeque::from([start]);
    let mut seen = HashSet::from([start]);
    while let Some(node) = queue.pop_front() {
        if node == target {
            return true;
        }
        for edge in edges.iter().filter(|edge| edge.todo_id == node) {
            if seen.insert(edge.depends_on_id) {
                queue.push_back(edge.depends_on_id);
            }
        }
    }
    false
}

async fn remove_dependency(
    db: &Database,
    party_id: i64,
    todo_id: i64,
    depends_on_id: i64,
) -> Result<(), AppError> {
    require_todo(db.conn()?, party_id, todo_id).await?;
    let result = db
        .update(
            "DELETE FROM todo_dependencies WHERE todo_id = ? AND depends_on_id = ?",
            vec![todo_id.into(), depends_on_id.into()],
        )
        .await?;
    if result.changes == 0 {
        return Err(AppError::NotFound(format!(
            "dependency {todo_id} -> {depends_on_id}"
        )));
    }
    Ok(())
}

async fn add_attachment(
    db: &Database,
    party_id: i64,
    todo_id: i64,
    input: AttachmentInput,
) -> Result<todo_attachment::Model, AppError> {
    ensure_non_empty("attachment name", &input.name)?;
    ensure_non_empty("attachment url", &input.url)?;
    let conn = db.conn()?;
    require_todo(conn, party_id, todo_id).await?;

    let active = todo_attachment::ActiveModel {
        todo_id: Set(todo_id),
        name: Set(input.name.trim().to_string()),
        kind: Set(input.kind.as_str().to_string()),
        url: Set(input.url.trim().to_string()),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

async fn delete_attachment(db: &Database, party_id: i64, id: i64) -> Result<(), AppError> {
    let conn = db.conn()?;
    let attachment = todo_attachment::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("attachment id {id}")))?;
    require_todo(conn, party_id, attachment.todo_id)
        .await
        .map_err(|_| AppError::NotFound(format!("attachment id {id}")))?;
    db.update("DELETE FROM todo_attachments WHERE id = ?", vec![id.into()])
        .await?;
    Ok(())
}

async fn party_date<C: ConnectionTrait>(db: &C, party_id: i64) -> Result<Option<NaiveDate>, AppError> {
    let party = require_party(db, party_id).await?;
    party
        .date
        .as_deref()
        .map(|date| parse_date("party date", date))
        .transpose()
}

async fn save_template(
    db: &Database,
    party_id: i64,
    name: &str,
    party_type: Option<String>,
    guest_count_range: Option<String>,
) -> Result<TodoTemplate, AppError> {
    let conn = db.conn()?;
    let reference = party_date(conn, party_id).await?;
    let todos = todo_item::Entity::find()
        .filter(todo_item::Column::PartyId.eq(party_id))
        .order_by_asc(todo_item::Column::DueDate)
        .order_by_asc(todo_item::Column::Id)
        .all(conn)
        .await?;
    if todos.is_empty() {
        return Err(AppError::InvalidInput(
            "party has no todos to save as a template".to_string(),
        ));
    }

    let items = todos
        .into_iter()
        .map(|todo| {
            let days_before_party = match (reference, todo.due_date.as_deref()) {
                (Some(reference), Some(due)) => NaiveDate::parse_from_str(due, "%Y-%m-%d")
                    .ok()
                    .map(|due| (reference - due).num_days()),
                _ => None,
            };
            TodoBlueprint {
                title: todo.title,
                description: todo.description,
                category: todo.category,
                priority: todo.priority,
                estimated_time: todo.estimated_time,
                estimated_cost: todo.estimated_cost,
                days_before_party,
            }
        })
        .collect();
    templates::save_todo_template(conn, name, party_type, guest_count_range, items).await
}

async fn apply_template(
    db: &Database,
    party_id: i64,
    template_id: &str,
    reference: Option<NaiveDate>,
) -> Result<usize, AppError> {
    let conn = db.conn()?;
    let template = templates::find_todo_template(conn, template_id).await?;
    let reference = match reference {
        Some(reference) => reference,
        None => party_date(conn, party_id)
            .await?
            .unwrap_or_else(|| Utc::now().date_naive()),
    };
    require_party(conn, party_id).await?;

    let statements = templates::todo_statements(party_id, &template, reference);
    let added = statements.len();
    db.transaction(statements).await?;
    debug!(party_id, template = %template.id, added, "todo template applied");
    Ok(added)
}
