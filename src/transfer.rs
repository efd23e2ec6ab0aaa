//! JSON export and import of parties with their guests and timeline tasks.
//!
//! A single-party file carries `party`, `guests` and `timelineTasks`; a backup
//! carries a `parties` array of the same bundles. Imports always create fresh
//! rows and report their outcome as an [`ImportResult`] instead of an error.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use crate::db::{finalize_transaction, Database};
use crate::entities::{guest, party, timeline_task};
use crate::error::AppError;
use crate::model::{optional_text, PartyType, Rsvp, TaskCategory, TimeFrame};

pub const EXPORT_VERSION: &str = "1.0";
const IMPORTED_SUFFIX: &str = " (Imported)";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyBundle {
    pub party: party::Model,
    pub guests: Vec<guest::Model>,
    pub timeline_tasks: Vec<timeline_task::Model>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PartyExport {
    #[serde(flatten)]
    bundle: PartyBundle,
    export_date: String,
    version: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupExport {
    parties: Vec<PartyBundle>,
    export_date: String,
    version: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub success: bool,
    pub message: String,
    pub imported_parties: usize,
    pub imported_guests: usize,
    pub imported_tasks: usize,
}

impl ImportResult {
    fn failed(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            ..Self::default()
        }
    }
}

fn export_date() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

async fn load_bundle(db: &Database, party: party::Model) -> Result<PartyBundle, AppError> {
    let conn = db.conn()?;
    let guests = guest::Entity::find()
        .filter(guest::Column::PartyId.eq(party.id))
        .order_by_asc(guest::Column::Id)
        .all(conn)
        .await?;
    let timeline_tasks = timeline_task::Entity::find()
        .filter(timeline_task::Column::PartyId.eq(party.id))
        .order_by_asc(timeline_task::Column::Id)
        .all(conn)
        .await?;
    Ok(PartyBundle {
        party,
        guests,
        timeline_tasks,
    })
}

/// Pretty-printed export of one party.
pub async fn export_party(db: &Database, party_id: i64) -> Result<String, AppError> {
    let party = party::Entity::find_by_id(party_id)
        .one(db.conn()?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("party id {party_id}")))?;
    let export = PartyExport {
        bundle: load_bundle(db, party).await?,
        export_date: export_date(),
        version: EXPORT_VERSION,
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Pretty-printed backup of every party, newest first.
pub async fn export_all(db: &Database) -> Result<String, AppError> {
    let parties = party::Entity::find()
        .order_by_desc(party::Column::CreatedAt)
        .order_by_desc(party::Column::Id)
        .all(db.conn()?)
        .await?;
    let mut bundles = Vec::with_capacity(parties.len());
    for party in parties {
        bundles.push(load_bundle(db, party).await?);
    }
    let backup = BackupExport {
        parties: bundles,
        export_date: export_date(),
        version: EXPORT_VERSION,
    };
    Ok(serde_json::to_string_pretty(&backup)?)
}

/// `party-<slug>-<millis>.json`, where the slug maps every character outside
/// `[a-z0-9]` to `-`.
pub fn party_file_name(party_name: &str, millis: i64) -> String {
    let slug: String = party_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    format!("party-{slug}-{millis}.json")
}

pub fn backup_file_name(millis: i64) -> String {
    format!("party-planner-backup-{millis}.json")
}

/// Writes the party export into `dir` and returns the file path.
pub async fn export_party_to(db: &Database, party_id: i64, dir: &Path) -> Result<PathBuf, AppError> {
    let party = party::Entity::find_by_id(party_id)
        .one(db.conn()?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("party id {party_id}")))?;
    let contents = export_party(db, party_id).await?;
    let path = dir.join(party_file_name(&party.name, Utc::now().timestamp_millis()));
    fs::write(&path, contents)?;
    info!(party_id, path = %path.display(), "party exported");
    Ok(path)
}

/// Writes the full backup into `dir` and returns the file path.
pub async fn export_all_to(db: &Database, dir: &Path) -> Result<PathBuf, AppError> {
    let contents = export_all(db).await?;
    let path = dir.join(backup_file_name(Utc::now().timestamp_millis()));
    fs::write(&path, contents)?;
    info!(path = %path.display(), "backup exported");
    Ok(path)
}

pub async fn import_from_path(db: &Database, path: &Path) -> ImportResult {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "import file unreadable");
            return ImportResult::failed("Failed to read file");
        }
    };
    match serde_json::from_str::<JsonValue>(&text) {
        Ok(data) => import_value(db, &data, "Unrecognized file format").await,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "import file is not valid JSON");
            ImportResult::failed("Invalid JSON file or corrupted data")
        }
    }
}

pub async fn import_from_json(db: &Database, text: &str) -> ImportResult {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(data) => import_value(db, &data, "Unrecognized data format").await,
        Err(err) => {
            warn!(error = %err, "import text is not valid JSON");
            ImportResult::failed("Invalid JSON data")
        }
    }
}

fn is_present(data: &JsonValue, key: &str) -> bool {
    !matches!(data.get(key), None | Some(JsonValue::Null))
}

async fn import_value(db: &Database, data: &JsonValue, unrecognized: &str) -> ImportResult {
    if is_present(data, "party") {
        import_single(db, data).await
    } else if is_present(data, "parties") {
        import_backup(db, data).await
    } else {
        ImportResult::failed(unrecognized)
    }
}

async fn import_single(db: &Database, data: &JsonValue) -> ImportResult {
    let has_lists = data.get("guests").is_some_and(JsonValue::is_array)
        && data.get("timelineTasks").is_some_and(JsonValue::is_array);
    if !is_present(data, "party") || !has_lists {
        return ImportResult::failed("Invalid party data format");
    }
    match insert_bundle(db, data).await {
        Ok(result) => result,
        Err(err) => {
            error!(error = %err, "party import failed");
            ImportResult::failed("Failed to import party data")
        }
    }
}

/// Parties that fail to import are skipped; the rest are counted.
async fn import_backup(db: &Database, data: &JsonValue) -> ImportResult {
    let Some(parties) = data.get("parties").and_then(JsonValue::as_array) else {
        return ImportResult::failed("Invalid backup data format");
    };
    let mut total = ImportResult {
        success: true,
        ..ImportResult::default()
    };
    for bundle in parties {
        let result = import_single(db, bundle).await;
        if result.success {
            total.imported_parties += result.imported_parties;
            total.imported_guests += result.imported_guests;
            total.imported_tasks += result.imported_tasks;
        }
    }
    total.message = format!("Successfully imported {} parties", total.imported_parties);
    total
}

#[derive(Debug, Deserialize)]
struct PartyRecord {
    name: String,
    date: Option<String>,
    guest_count: Option<i64>,
    party_type: Option<String>,
    duration: Option<i64>,
    theme: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GuestRecord {
    name: String,
    email: Option<String>,
    rsvp: Option<String>,
    dietary_restrictions: Option<String>,
    additional_guests: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    plus_one: Option<bool>,
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskRecord {
    task: String,
    time_frame: String,
    category: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    completed: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    is_custom: Option<bool>,
}

/// Accepts `true/false`, `0/1` and `null`.
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(None),
        JsonValue::Bool(value) => Ok(Some(value)),
        JsonValue::Number(number) => match number.as_i64() {
            Some(0) => Ok(Some(false)),
            Some(1) => Ok(Some(true)),
            _ => Err(de::Error::custom(format!("expected 0 or 1, got {number}"))),
        },
        other => Err(de::Error::custom(format!("expected a boolean, got {other}"))),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(what: &str, value: &JsonValue) -> Result<T, AppError> {
    T::deserialize(value).map_err(|err| AppError::ImportValidation(format!("{what}: {err}")))
}

fn to_i32(what: &str, value: i64) -> Result<i32, AppError> {
    i32::try_from(value)
        .ok()
        .filter(|value| *value >= 0)
        .ok_or_else(|| AppError::ImportValidation(format!("{what} out of range: {value}")))
}

fn enum_or_default<T: Copy>(
    what: &str,
    value: Option<&str>,
    parse: fn(&str) -> Option<T>,
    fallback: T,
) -> T {
    match value {
        None => fallback,
        Some(raw) => parse(raw).unwrap_or_else(|| {
            warn!(field = what, value = raw, "unknown value on import; using default");
            fallback
        }),
    }
}

async fn insert_bundle(db: &Database, data: &JsonValue) -> Result<ImportResult, AppError> {
    let record: PartyRecord = decode("party", &data["party"])?;
    let guests: Vec<GuestRecord> = decode("guests", &data["guests"])?;
    let tasks: Vec<TaskRecord> = decode("timelineTasks", &data["timelineTasks"])?;
    if record.name.trim().is_empty() {
        return Err(AppError::ImportValidation("party name is blank".to_string()));
    }

    let txn = db.conn()?.begin().await?;
    let result: Result<ImportResult, AppError> = async {
        let now = Utc::now();
        let party_type = enum_or_default(
            "party_type",
            record.party_type.as_deref(),
            PartyType::parse,
            PartyType::Mixed,
        );
        let created = party::ActiveModel {
            name: Set(format!("{}{IMPORTED_SUFFIX}", record.name)),
            date: Set(optional_text(record.date.clone())),
            guest_count: Set(to_i32("guest_count", record.guest_count.unwrap_or(0))?),
            party_type: Set(party_type.as_str().to_string()),
            duration: Set(to_i32("duration", record.duration.unwrap_or(3))?.max(1)),
            theme: Set(optional_text(record.theme.clone())),
            notes: Set(optional_text(record.notes.clone())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for row in &guests {
            let additional = match (row.additional_guests, row.plus_one) {
                (Some(count), _) => count,
                (None, Some(plus_one)) => i64::from(plus_one),
                (None, None) => 0,
            };
            let rsvp = enum_or_default("rsvp", row.rsvp.as_deref(), Rsvp::parse, Rsvp::Pending);
            guest::ActiveModel {
                party_id: Set(created.id),
                name: Set(row.name.clone()),
                email: Set(optional_text(row.email.clone())),
                rsvp: Set(rsvp.as_str().to_string()),
                dietary_restrictions: Set(optional_text(row.dietary_restrictions.clone())),
                additional_guests: Set(to_i32("additional_guests", additional)?),
                notes: Set(optional_text(row.notes.clone())),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        for row in &tasks {
            if row.time_frame.trim().is_empty() {
                return Err(AppError::ImportValidation(format!(
                    "timeline task '{}' has no time frame",
                    row.task
                )));
            }
            let category = enum_or_default(
                "category",
                row.category.as_deref(),
                TaskCategory::parse,
                TaskCategory::Planning,
            );
            let time_frame = TimeFrame::parse(&row.time_frame)
                .map(|frame| frame.as_str().to_string())
                .unwrap_or_else(|| row.time_frame.trim().to_string());
            timeline_task::ActiveModel {
                party_id: Set(created.id),
                task: Set(row.task.clone()),
                time_frame: Set(time_frame),
                category: Set(category.as_str().to_string()),
                completed: Set(row.completed.unwrap_or(false)),
                is_custom: Set(row.is_custom.unwrap_or(false)),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        Ok(ImportResult {
            success: true,
            message: format!("Successfully imported party \"{}\"", record.name),
            imported_parties: 1,
            imported_guests: guests.len(),
            imported_tasks: tasks.len(),
        })
    }
    .await;

    let result = finalize_transaction(txn, result).await?;
    info!(
        guests = result.imported_guests,
        tasks = result.imported_tasks,
        "party imported"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::guests::GuestList;
    use crate::accessors::parties::PartyList;
    use crate::db::open_for_test;
    use crate::model::{GuestInput, PartyInput};
    use tempfile::TempDir;

    #[test]
    fn file_names_slug_the_party_name() {
        assert_eq!(
            party_file_name("Mia's 30th Bash!", 1700000000000),
            "party-mia-s-30th-bash--1700000000000.json"
        );
        assert_eq!(backup_file_name(42), "party-planner-backup-42.json");
    }

    #[tokio::test]
    async fn export_then_import_preserves_counts() {
        let db = open_for_test().await;
        let party = PartyList::new(&db)
            .create(PartyInput::named("Picnic"))
            .await
            .expect("party");
        let mut guests = GuestList::new(&db, party.id);
        guests
            .add(GuestInput {
                rsvp: Rsvp::Yes,
                additional_guests: 2,
                ..GuestInput::named("Ana")
            })
            .await
            .expect("ana");
        guests.add(GuestInput::named("Ben")).await.expect("ben");

        let exported = export_party(&db, party.id).await.expect("export");
        let value: JsonValue = serde_json::from_str(&exported).expect("json");
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["timelineTasks"].as_array().map(Vec::len), Some(21));
        assert_eq!(value["guests"][0]["additional_guests"], 2);
        assert_eq!(value["timelineTasks"][0]["completed"], false);

        let result = import_from_json(&db, &exported).await;
        assert!(result.success, "{}", result.message);
        assert_eq!(result.imported_parties, 1);
        assert_eq!(result.imported_guests, 2);
        assert_eq!(result.imported_tasks, 21);
        assert_eq!(result.message, "Successfully imported party \"Picnic\"");

        let mut parties = PartyList::new(&db);
        let names: Vec<String> = parties
            .load()
            .await
            .expect("load")
            .iter()
            .map(|party| party.name.clone())
            .collect();
        assert!(names.contains(&"Picnic (Imported)".to_string()));
    }

    #[tokio::test]
    async fn legacy_rows_with_numeric_booleans_import() {
        let db = open_for_test().await;
        let legacy = r#"{
            "party": {"id": 9, "name": "Old", "guest_count": 4, "party_type": "casual", "duration": 2},
            "guests": [
                {"name": "Cy", "rsvp": "yes", "plus_one": 1},
                {"name": "Di", "rsvp": "maybe", "plus_one": 0}
            ],
            "timelineTasks": [
                {"task": "Buy ice", "time_frame": "day before", "category": "shopping", "completed": 1, "is_custom": 0}
            ]
        }"#;
        let result = import_from_json(&db, legacy).await;
        assert!(result.success, "{}", result.message);

        let party = PartyList::new(&db).load().await.expect("load")[0].clone();
        assert_eq!(party.name, "Old (Imported)");
        let mut guests = GuestList::new(&db, party.id);
        guests.load().await.expect("guests");
        let stats = guests.stats();
        assert_eq!(stats.confirmed, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total_attending, 2);

        let tasks = timeline_task::Entity::find()
            .filter(timeline_task::Column::PartyId.eq(party.id))
            .all(db.conn().expect("conn"))
            .await
            .expect("tasks");
        assert_eq!(tasks[0].time_frame, "Day before");
        assert!(tasks[0].completed);
    }

    #[tokio::test]
    async fn backup_round_trip_imports_every_party() {
        let db = open_for_test().await;
        let mut parties = PartyList::new(&db);
        parties.create(PartyInput::named("One")).await.expect("one");
        parties.create(PartyInput::named("Two")).await.expect("two");

        let dir = TempDir::new().expect("tempdir");
        let path = export_all_to(&db, dir.path()).await.expect("export");
        let name = path.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("party-planner-backup-"));

        let result = import_from_path(&db, &path).await;
        assert!(result.success);
        assert_eq!(result.imported_parties, 2);
        assert_eq!(result.imported_tasks, 42);
        assert_eq!(result.message, "Successfully imported 2 parties");
        assert_eq!(parties.load().await.expect("load").len(), 4);
    }

    #[tokio::test]
    async fn bad_input_reports_failure_without_writing() {
        let db = open_for_test().await;
        let cases = [
            ("not json", "Invalid JSON data"),
            (r#"{"hello": 1}"#, "Unrecognized data format"),
            (r#"{"party": {"name": "X"}}"#, "Invalid party data format"),
            (
                r#"{"party": {"name": "X"}, "guests": [{"rsvp": "yes"}], "timelineTasks": []}"#,
                "Failed to import party data",
            ),
        ];
        for (input, message) in cases {
            let result = import_from_json(&db, input).await;
            assert!(!result.success, "{input}");
            assert_eq!(result.message, message);
        }
        assert!(PartyList::new(&db).load().await.expect("load").is_empty());

        let missing = import_from_path(&db, Path::new("/nonexistent/backup.json")).await;
        assert_eq!(missing.message, "Failed to read file");
    }
}
