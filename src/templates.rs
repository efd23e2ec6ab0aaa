//! Itinerary and todo blueprints.
//!
//! Built-in templates are compiled in and addressed by a slug; saved templates live
//! in `itinerary_templates` / `todo_templates` and are addressed by their numeric id.
//! Both kinds store their items as camelCase JSON in `template_data`.

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::SqlStatement;
use crate::entities::{itinerary_template, todo_template};
use crate::error::AppError;
use crate::model::{
    ensure_non_empty, format_clock, optional_text, parse_clock, parse_offset, ItineraryCategory,
    TodoCategory, TodoPriority,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItinerarySlot {
    pub start_time: String,
    pub end_time: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preparations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItineraryTemplate {
    pub id: String,
    pub name: String,
    pub party_type: Option<String>,
    pub duration: Option<i32>,
    pub description: Option<String>,
    pub slots: Vec<ItinerarySlot>,
    pub is_default: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoBlueprint {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub priority: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_before_party: Option<i64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TodoTemplate {
    pub id: String,
    pub name: String,
    pub party_type: Option<String>,
    pub guest_count_range: Option<String>,
    pub items: Vec<TodoBlueprint>,
    pub is_default: bool,
}

fn slot(
    start_time: &str,
    end_time: &str,
    title: &str,
    category: ItineraryCategory,
    description: &str,
) -> ItinerarySlot {
    ItinerarySlot {
        start_time: start_time.to_string(),
        end_time: end_time.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        category: category.as_str().to_string(),
        location: None,
        preparations: Vec::new(),
    }
}

fn blueprint(
    title: &str,
    category: TodoCategory,
    priority: TodoPriority,
    estimated_time: i32,
    estimated_cost: Option<f64>,
    days_before_party: i64,
) -> TodoBlueprint {
    TodoBlueprint {
        title: title.to_string(),
        description: None,
        category: category.as_str().to_string(),
        priority: priority.as_str().to_string(),
        estimated_time: Some(estimated_time),
        estimated_cost,
        days_before_party: Some(days_before_party),
    }
}

pub fn builtin_itinerary_templates() -> Vec<ItineraryTemplate> {
    use ItineraryCategory::*;

    vec![
        ItineraryTemplate {
            id: "birthday-party-3h".to_string(),
            name: "Birthday Party (3 hours)".to_string(),
            party_type: Some("birthday".to_string()),
            duration: Some(3),
            description: Some("A classic birthday party template for all ages".to_string()),
            slots: vec![
                slot("00:00", "00:30", "Guest arrival & welcome drinks", Arrival, "Welcome guests and serve welcome drinks"),
                slot("00:30", "01:00", "Mingling & appetizers", Food, "Light snacks and socializing time"),
                slot("01:00", "01:30", "Main activities/games", Activity, "Planned party games and activities"),
                slot("01:30", "02:00", "Food service", Food, "Main meal or party food"),
                slot("02:00", "02:30", "Cake & celebration", Entertainment, "Birthday cake, singing, and special moments"),
                slot("02:30", "03:00", "Farewell & cleanup", Cleanup, "Goodbyes and initial cleanup"),
            ],
            is_default: true,
        },
        ItineraryTemplate {
            id: "dinner-party-4h".to_string(),
            name: "Dinner Party (4 hours)".to_string(),
            party_type: Some("dinner".to_string()),
            duration: Some(4),
            description: Some("An elegant dinner party template".to_string()),
            slots: vec![
                slot("00:00", "00:30", "Cocktail hour", Arrival, "Welcome drinks and appetizers"),
                slot("00:30", "01:30", "Dinner service", Food, "Main course and dining"),
                slot("01:30", "02:30", "Conversation & socializing", Activity, "Post-dinner conversation and activities"),
                slot("02:30", "03:30", "Dessert & coffee", Food, "Dessert service and coffee"),
                slot("03:30", "04:00", "Farewell", Cleanup, "Goodbyes and end of evening"),
            ],
            is_default: true,
        },
    ]
}

pub fn builtin_todo_templates() -> Vec<TodoTemplate> {
    use TodoCategory::*;
    use TodoPriority::*;

    vec![
        TodoTemplate {
            id: "birthday-party-basic".to_string(),
            name: "Birthday Party Essentials".to_string(),
            party_type: Some("birthday".to_string()),
            guest_count_range: Some("10-30".to_string()),
            items: vec![
                blueprint("Set party date and send save-the-dates", Planning, High, 60, None, 28),
                blueprint("Create guest list and send invitations", Planning, High, 90, None, 21),
                blueprint("Book venue or prepare space", Booking, High, 120, None, 21),
                blueprint("Plan menu and order cake", Planning, High, 90, Some(150.0), 14),
                blueprint("Shop for decorations and party supplies", Shopping, Medium, 120, Some(80.0), 7),
                blueprint("Confirm RSVPs and finalize headcount", Coordination, High, 30, None, 7),
                blueprint("Shop for food and beverages", Shopping, High, 90, Some(200.0), 2),
                blueprint("Prepare food that can be made ahead", Preparation, Medium, 180, None, 1),
                blueprint("Set up decorations and party space", Preparation, High, 120, None, 0),
                blueprint("Prepare fresh food and set up serving areas", Preparation, Critical, 90, None, 0),
            ],
            is_default: true,
        },
        TodoTemplate {
            id: "dinner-party-elegant".to_string(),
            name: "Elegant Dinner Party".to_string(),
            party_type: Some("dinner".to_string()),
            guest_count_range: Some("6-12".to_string()),
            items: vec![
                blueprint("Plan menu and wine pairings", Planning, High, 120, None, 14),
                blueprint("Send elegant invitations", Coordination, High, 60, None, 14),
                blueprint("Shop for special ingredients and wines", Shopping, High, 90, Some(300.0), 3),
                blueprint("Prepare table settings and ambiance", Preparation, Medium, 60, None, 1),
                blueprint("Prep appetizers and desserts", Preparation, High, 150, None, 1),
                blueprint("Final cooking and presentation", Preparation, Critical, 180, None, 0),
            ],
            is_default: true,
        },
    ]
}

/// Built-in templates first, then saved ones by name. Saved rows whose data no
/// longer decodes are skipped.
pub async fn itinerary_templates<C: ConnectionTrait>(
    db: &C,
) -> Result<Vec<ItineraryTemplate>, AppError> {
    let mut templates = builtin_itinerary_templates();
    let rows = itinerary_template::Entity::find()
        .order_by_asc(itinerary_template::Column::Name)
        .order_by_asc(itinerary_template::Column::Id)
        .all(db)
        .await?;
    for row in rows {
        match itinerary_from_row(row) {
            Ok(template) => templates.push(template),
            Err(err) => warn!(error = %err, "skipping unreadable itinerary template"),
        }
    }
    Ok(templates)
}

pub async fn todo_templates<C: ConnectionTrait>(db: &C) -> Result<Vec<TodoTemplate>, AppError> {
    let mut templates = builtin_todo_templates();
    let rows = todo_template::Entity::find()
        .order_by_asc(todo_template::Column::Name)
        .order_by_asc(todo_template::Column::Id)
        .all(db)
        .await?;
    for row in rows {
        match todo_from_row(row) {
            Ok(template) => templates.push(template),
            Err(err) => warn!(error = %err, "skipping unreadable todo template"),
        }
    }
    Ok(templates)
}

pub async fn find_itinerary_template<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<ItineraryTemplate, AppError> {
    let id = id.trim();
    if let Some(template) = builtin_itinerary_templates()
        .into_iter()
        .find(|template| template.id == id)
    {
        return Ok(template);
    }
    let row_id = id
        .parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("itinerary template {id}")))?;
    let row = itinerary_template::Entity::find_by_id(row_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("itinerary template {id}")))?;
    itinerary_from_row(row)
}

pub async fn find_todo_template<C: ConnectionTrait>(
    db: &C,
    id: &str,
) -> Result<TodoTemplate, AppError> {
    let id = id.trim();
    if let Some(template) = builtin_todo_templates()
        .into_iter()
        .find(|template| template.id == id)
    {
        return Ok(template);
    }
    let row_id = id
        .parse::<i64>()
        .map_err(|_| AppError::NotFound(format!("todo template {id}")))?;
    let row = todo_template::Entity::find_by_id(row_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("todo template {id}")))?;
    todo_from_row(row)
}

pub async fn save_itinerary_template<C: ConnectionTrait>(
    db: &C,
    name: &str,
    party_type: Option<String>,
    duration: Option<i32>,
    description: Option<String>,
    slots: Vec<ItinerarySlot>,
) -> Result<ItineraryTemplate, AppError> {
    ensure_non_empty("template name", name)?;
    for slot in &slots {
        ItineraryCategory::from_input("slot category", &slot.category)?;
        parse_offset("slot start", &slot.start_time)?;
        parse_offset("slot end", &slot.end_time)?;
    }
    let active = itinerary_template::ActiveModel {
        name: Set(name.trim().to_string()),
        party_type: Set(optional_text(party_type)),
        duration: Set(duration),
        description: Set(optional_text(description)),
        template_data: Set(Some(serde_json::to_string(&slots)?)),
        is_default: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    itinerary_from_row(active.insert(db).await?)
}

pub async fn save_todo_template<C: ConnectionTrait>(
    db: &C,
    name: &str,
    party_type: Option<String>,
    guest_count_range: Option<String>,
    items: Vec<TodoBlueprint>,
) -> Result<TodoTemplate, AppError> {
    ensure_non_empty("template name", name)?;
    for item in &items {
        TodoCategory::from_input("todo category", &item.category)?;
        TodoPriority::from_input("todo priority", &item.priority)?;
    }
    let active = todo_template::ActiveModel {
        name: Set(name.trim().to_string()),
        party_type: Set(optional_text(party_type)),
        guest_count_range: Set(optional_text(guest_count_range)),
        template_data: Set(Some(serde_json::to_string(&items)?)),
        is_default: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    todo_from_row(active.insert(db).await?)
}

/// Replaces every itinerary item of the party with the template's slots. With a
/// start time, each slot is offset by it; the result is not wrapped at midnight.
pub fn itinerary_statements(
    party_id: i64,
    template: &ItineraryTemplate,
    start_time: Option<&str>,
) -> Result<Vec<SqlStatement>, AppError> {
    let offset = start_time
        .map(|value| parse_clock("start time", value))
        .transpose()?;
    let now = Utc::now();

    let mut statements = vec![SqlStatement::new(
        "DELETE FROM itinerary_items WHERE party_id = ?",
        vec![party_id.into()],
    )];
    for (index, slot) in template.slots.iter().enumerate() {
        let (start, end) = match offset {
            Some(offset) => (
                shift_clock(offset, "slot start", &slot.start_time)?,
                shift_clock(offset, "slot end", &slot.end_time)?,
            ),
            None => (slot.start_time.clone(), slot.end_time.clone()),
        };
        let preparations = if slot.preparations.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&slot.preparations)?)
        };
        statements.push(SqlStatement::new(
            "INSERT INTO itinerary_items (party_id, start_time, end_time, title, description, category, location, responsible, preparations, notes, completed, order_index, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL, ?, NULL, 0, ?, ?)",
            vec![
                party_id.into(),
                start.into(),
                end.into(),
                slot.title.clone().into(),
                slot.description.clone().into(),
                slot.category.clone().into(),
                slot.location.clone().into(),
                preparations.into(),
                (index as i32).into(),
                now.into(),
            ],
        ));
    }
    Ok(statements)
}

/// Adds a slot offset to the start time. The result is not wrapped at midnight.
fn shift_clock(start: u32, label: &str, slot: &str) -> Result<String, AppError> {
    start
        .checked_add(parse_offset(label, slot)?)
        .map(format_clock)
        .ok_or_else(|| AppError::InvalidInput(format!("{label} '{slot}' is out of range")))
}

/// Inserts one todo per blueprint; existing todos are left alone.
pub fn todo_statements(
    party_id: i64,
    template: &TodoTemplate,
    reference: NaiveDate,
) -> Vec<SqlStatement> {
    let now = Utc::now();
    template
        .items
        .iter()
        .map(|item| {
            let due_date = item
                .days_before_party
                .map(|days| (reference - Duration::days(days)).format("%Y-%m-%d").to_string());
            SqlStatement::new(
                "INSERT INTO todo_items (party_id, title, description, category, priority, due_date, estimated_time, completed, estimated_cost, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?)",
                vec![
                    party_id.into(),
                    item.title.clone().into(),
                    item.description.clone().into(),
                    item.category.clone().into(),
                    item.priority.clone().into(),
                    due_date.into(),
                    item.estimated_time.into(),
                    item.estimated_cost.into(),
                    now.into(),
                ],
            )
        })
        .collect()
}

fn itinerary_from_row(row: itinerary_template::Model) -> Result<ItineraryTemplate, AppError> {
    let slots = match row.template_data.as_deref() {
        Some(data) if !data.trim().is_empty() => serde_json::from_str(data)?,
        _ => Vec::new(),
    };
    Ok(ItineraryTemplate {
        id: row.id.to_string(),
        name: row.name,
        party_type: row.party_type,
        duration: row.duration,
        description: row.description,
        slots,
        is_default: row.is_default,
    })
}

fn todo_from_row(row: todo_template::Model) -> Result<TodoTemplate, AppError> {
    let items = match row.template_data.as_deref() {
        Some(data) if !data.trim().is_empty() => serde_json::from_str(data)?,
        _ => Vec::new(),
    };
    Ok(TodoTemplate {
        id: row.id.to_string(),
        name: row.name,
        party_type: row.party_type,
        guest_count_range: row.guest_count_range,
        items,
        is_default: row.is_default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_for_test;
    use sea_orm::Value;

    #[test]
    fn builtin_templates_are_well_formed() {
        let itineraries = builtin_itinerary_templates();
        assert_eq!(itineraries[0].slots.len(), 6);
        assert_eq!(itineraries[1].slots.len(), 5);
        for template in &itineraries {
            for slot in &template.slots {
                assert!(ItineraryCategory::parse(&slot.category).is_some());
                assert!(parse_clock("start", &slot.start_time).is_ok());
            }
        }

        let todos = builtin_todo_templates();
        assert_eq!(todos[0].items.len(), 10);
        assert_eq!(todos[1].items.len(), 6);
        for item in todos.iter().flat_map(|template| &template.items) {
            assert!(TodoCategory::parse(&item.category).is_some());
            assert!(TodoPriority::parse(&item.priority).is_some());
        }
    }

    #[test]
    fn start_time_shifts_slots_without_wrapping() {
        let template = &builtin_itinerary_templates()[1];
        let statements = itinerary_statements(1, template, Some("22:00")).expect("statements");
        assert_eq!(statements.len(), template.slots.len() + 1);
        assert!(statements[0].sql.starts_with("DELETE"));

        let last = statements.last().expect("last slot");
        assert_eq!(last.values[1], Value::from("25:30"));
        assert_eq!(last.values[2], Value::from("26:00"));
    }

    #[test]
    fn bad_start_time_is_rejected() {
        let template = &builtin_itinerary_templates()[0];
        assert!(matches!(
            itinerary_statements(1, template, Some("7pm")),
            Err(AppError::InvalidInput(_))
        ));
        for start in ["24:00", "99999999:00", "+18:00"] {
            assert!(matches!(
                itinerary_statements(1, template, Some(start)),
                Err(AppError::InvalidInput(_))
            ));
        }

        let mut oversized = template.clone();
        oversized.slots[0].end_time = "71582788:00".to_string();
        assert!(matches!(
            itinerary_statements(1, &oversized, Some("23:00")),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn todo_due_dates_count_back_from_reference() {
        let template = &builtin_todo_templates()[0];
        let reference = NaiveDate::from_ymd_opt(2025, 6, 30).expect("date");
        let statements = todo_statements(7, template, reference);
        assert_eq!(statements.len(), 10);
        assert_eq!(statements[0].values[5], Value::from(Some("2025-06-02".to_string())));
        assert_eq!(statements[9].values[5], Value::from(Some("2025-06-30".to_string())));
    }

    #[tokio::test]
    async fn saved_templates_follow_builtins() {
        let db = open_for_test().await;
        let conn = db.conn().expect("conn");
        let saved = save_itinerary_template(
            conn,
            "Brunch",
            None,
            Some(2),
            None,
            vec![slot("00:00", "01:00", "Coffee", ItineraryCategory::Food, "Coffee bar")],
        )
        .await
        .expect("save");

        let all = itinerary_templates(conn).await.expect("list");
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].name, "Brunch");
        assert!(!all[2].is_default);

        let found = find_itinerary_template(conn, &saved.id).await.expect("find");
        assert_eq!(found.slots, saved.slots);
        assert!(matches!(
            find_itinerary_template(conn, "nope").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn saving_rejects_unknown_categories() {
        let db = open_for_test().await;
        let conn = db.conn().expect("conn");
        let item = TodoBlueprint {
            title: "Hire a clown".to_string(),
            description: None,
            category: "circus".to_string(),
            priority: "high".to_string(),
            estimated_time: None,
            estimated_cost: None,
            days_before_party: None,
        };
        assert!(matches!(
            save_todo_template(conn, "Odd", None, None, vec![item]).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
