//! The live database and the three primitives every accessor goes through.
//!
//! The working copy is a SQLite file inside a private scratch directory. Its full
//! image is mirrored into a [`KeyValueStore`] slot after startup, on an autosave
//! interval, and once more when the database is closed.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction,
    FromQueryResult, JsonValue, Statement, TransactionTrait, Value,
};
use tempfile::{NamedTempFile, TempDir};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::AppError;
use crate::storage::KeyValueStore;
use crate::{migrate, schema};

pub const SNAPSHOT_KEY: &str = "party-planner-db";
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(30);

const LIVE_DB_FILE: &str = "live.db";
const LOCK_FILE: &str = "partyplan.lock";

#[derive(Clone, Debug)]
pub struct Config {
    /// `None` disables the background snapshot task.
    pub autosave_interval: Option<Duration>,
}

impl Config {
    pub fn manual() -> Self {
        Self {
            autosave_interval: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave_interval: Some(AUTOSAVE_INTERVAL),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SqlStatement {
    pub sql: String,
    pub values: Vec<Value>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            values,
        }
    }

    pub fn plain(sql: impl Into<String>) -> Self {
        Self::new(sql, Vec::new())
    }

    fn to_statement(&self) -> Statement {
        Statement::from_sql_and_values(DatabaseBackend::Sqlite, self.sql.as_str(), self.values.clone())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateResult {
    pub changes: u64,
    pub last_insert_id: i64,
}

pub struct Database {
    conn: Option<DatabaseConnection>,
    store: Arc<dyn KeyValueStore>,
    scratch: TempDir,
    autosave: Option<JoinHandle<()>>,
}

impl Database {
    /// Restores the last snapshot (or starts empty), brings the schema up to date
    /// and writes a fresh snapshot. Only schema and migration failures are fatal.
    pub async fn open(store: Arc<dyn KeyValueStore>, config: Config) -> Result<Self, AppError> {
        let scratch = TempDir::new()?;
        let live_path = scratch.path().join(LIVE_DB_FILE);
        let conn = restore_or_create(store.as_ref(), &live_path).await?;
        schema::ensure_schema(&conn)
            .await
            .map_err(|err| AppError::Initialization(err.to_string()))?;

        let mut database = Self {
            conn: Some(conn),
            store,
            scratch,
            autosave: None,
        };
        let applied = migrate::run(&database).await?;
        if applied > 0 {
            info!(applied, "schema migrations applied");
        }
        database.save_snapshot().await;

        if let Some(period) = config.autosave_interval.filter(|period| !period.is_zero()) {
            let conn = database.conn()?.clone();
            database.autosave = Some(spawn_autosave(
                conn,
                Arc::clone(&database.store),
                database.scratch.path().to_path_buf(),
                period,
            ));
        }
        debug!("database ready");
        Ok(database)
    }

    pub fn is_ready(&self) -> bool {
        self.conn.is_some()
    }

    pub fn conn(&self) -> Result<&DatabaseConnection, AppError> {
        self.conn.as_ref().ok_or(AppError::NotReady)
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub async fn query(&self, sql: &str, values: Vec<Value>) -> Result<Vec<JsonValue>, AppError> {
        let conn = self.conn()?;
        let statement = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values);
        JsonValue::find_by_statement(statement)
            .all(conn)
            .await
            .map_err(|source| AppError::Query {
                sql: sql.to_string(),
                source,
            })
    }

    pub async fn update(&self, sql: &str, values: Vec<Value>) -> Result<UpdateResult, AppError> {
        let conn = self.conn()?;
        let statement = Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values);
        let result = conn
            .execute(statement)
            .await
            .map_err(|source| AppError::Update {
                sql: sql.to_string(),
                source,
            })?;
        Ok(UpdateResult {
            changes: result.rows_affected(),
            last_insert_id: result.last_insert_id() as i64,
        })
    }

    /// Runs the batch all-or-nothing. The error names the statement that failed.
    pub async fn transaction(
        &self,
        statements: Vec<SqlStatement>,
    ) -> Result<Vec<UpdateResult>, AppError> {
        let conn = self.conn()?;
        let txn = conn
            .begin()
            .await
            .map_err(|source| AppError::Transaction {
                sql: "BEGIN".to_string(),
                source,
            })?;

        let mut results = Vec::with_capacity(statements.len());
        for statement in &statements {
            match txn.execute(statement.to_statement()).await {
                Ok(result) => results.push(UpdateResult {
                    changes: result.rows_affected(),
                    last_insert_id: result.last_insert_id() as i64,
                }),
                Err(source) => {
                    if let Err(rollback_err) = txn.rollback().await {
                        warn!(error = %rollback_err, "rollback failed");
                    }
                    return Err(AppError::Transaction {
                        sql: statement.sql.clone(),
                        source,
                    });
                }
            }
        }

        txn.commit()
            .await
            .map_err(|source| AppError::Transaction {
                sql: "COMMIT".to_string(),
                source,
            })?;
        Ok(results)
    }

    /// Mirrors the live database into the snapshot slot. Failures are logged only.
    pub async fn save_snapshot(&self) {
        let Some(conn) = self.conn.as_ref() else {
            return;
        };
        match write_snapshot(conn, self.store.as_ref(), self.scratch.path()).await {
            Ok(bytes) => debug!(bytes, "snapshot saved"),
            Err(err) => warn!(error = %err, "failed to save database snapshot"),
        }
    }

    /// Stops autosave, writes a final snapshot and releases the handle.
    pub async fn close(&mut self) -> Result<(), AppError> {
        if let Some(handle) = self.autosave.take() {
            handle.abort();
            let _ = handle.await;
        }
        self.save_snapshot().await;
        if let Some(conn) = self.conn.take() {
            conn.close().await?;
        }
        debug!("database closed");
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Some(handle) = self.autosave.take() {
            handle.abort();
        }
    }
}

pub async fn finalize_transaction<T>(
    txn: DatabaseTransaction,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                return Err(rollback_err.into());
            }
            Err(err)
        }
    }
}

pub fn open_lock(data_dir: &Path) -> Result<fd_lock::RwLock<File>, AppError> {
    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(resolve_lock_path(data_dir))?;
    Ok(fd_lock::RwLock::new(file))
}

pub fn resolve_lock_path(data_dir: &Path) -> PathBuf {
    data_dir.join(LOCK_FILE)
}

async fn connect(path: &Path) -> Result<DatabaseConnection, AppError> {
    let mut url = Url::from_file_path(path)
        .map_err(|_| AppError::InvalidInput(format!("invalid sqlite path: {}", path.display())))?;
    url.set_query(Some("mode=rwc"));
    let sqlite_url = url.as_str().replacen("file://", "sqlite://", 1);

    let mut options = ConnectOptions::new(sqlite_url);
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    Ok(sea_orm::Database::connect(options).await?)
}

async fn restore_or_create(
    store: &dyn KeyValueStore,
    live_path: &Path,
) -> Result<DatabaseConnection, AppError> {
    match store.get(SNAPSHOT_KEY) {
        Ok(Some(image)) => match restore(&image, live_path).await {
            Ok(conn) => {
                debug!("restored database snapshot");
                return Ok(conn);
            }
            Err(err) => {
                warn!(error = %err, "discarding unreadable database snapshot");
                remove_if_exists(live_path)?;
            }
        },
        Ok(None) => debug!("no database snapshot; starting empty"),
        Err(err) => warn!(error = %err, "could not read database snapshot; starting empty"),
    }

    connect(live_path)
        .await
        .map_err(|err| AppError::Initialization(err.to_string()))
}

async fn restore(image: &str, live_path: &Path) -> Result<DatabaseConnection, AppError> {
    let bytes: Vec<u8> = serde_json::from_str(image)?;
    fs::write(live_path, &bytes)?;
    let conn = connect(live_path).await?;
    if let Err(err) = probe(&conn).await {
        if let Err(close_err) = conn.close().await {
            debug!(error = %close_err, "closing rejected snapshot failed");
        }
        return Err(err);
    }
    Ok(conn)
}

async fn probe(conn: &DatabaseConnection) -> Result<(), AppError> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "PRAGMA quick_check",
        ))
        .await?;
    let verdict: String = match row {
        Some(row) => row.try_get_by_index(0)?,
        None => String::new(),
    };
    if verdict != "ok" {
        return Err(AppError::Initialization(format!(
            "snapshot failed integrity check: {verdict}"
        )));
    }
    Ok(())
}

async fn write_snapshot(
    conn: &DatabaseConnection,
    store: &dyn KeyValueStore,
    scratch: &Path,
) -> Result<usize, AppError> {
    // VACUUM INTO needs a missing or empty target.
    let target = NamedTempFile::new_in(scratch)?;
    let escaped = target.path().to_string_lossy().replace('\'', "''");
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        format!("VACUUM INTO '{escaped}'"),
    ))
    .await?;
    let bytes = fs::read(target.path())?;
    store.set(SNAPSHOT_KEY, &serde_json::to_string(&bytes)?)?;
    Ok(bytes.len())
}

fn spawn_autosave(
    conn: DatabaseConnection,
    store: Arc<dyn KeyValueStore>,
    scratch: PathBuf,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; open() has just saved.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match write_snapshot(&conn, store.as_ref(), &scratch).await {
                Ok(bytes) => debug!(bytes, "autosave snapshot written"),
                Err(err) => warn!(error = %err, "autosave failed"),
            }
        }
    })
}

fn remove_if_exists(path: &Path) -> Result<(), AppError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
pub(crate) async fn open_for_test() -> Database {
    use crate::storage::MemoryStore;

    Database::open(Arc::new(MemoryStore::new()), Config::manual())
        .await
        .expect("open database")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    async fn count_parties(db: &Database) -> usize {
        db.query("SELECT id FROM parties", vec![])
            .await
            .expect("query parties")
            .len()
    }

    async fn insert_party(db: &Database, name: &str) -> UpdateResult {
        db.update(
            "INSERT INTO parties (name, created_at, updated_at) VALUES (?, ?, ?)",
            vec![
                name.into(),
                chrono::Utc::now().into(),
                chrono::Utc::now().into(),
            ],
        )
        .await
        .expect("insert party")
    }

    #[tokio::test]
    async fn query_returns_rows_as_json_objects() {
        let db = open_for_test().await;
        let inserted = insert_party(&db, "Picnic").await;
        assert_eq!(inserted.changes, 1);
        assert!(inserted.last_insert_id > 0);

        let rows = db
            .query(
                "SELECT id, name FROM parties WHERE id = ?",
                vec![inserted.last_insert_id.into()],
            )
            .await
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Picnic");
        assert_eq!(rows[0]["id"], inserted.last_insert_id);
    }

    #[tokio::test]
    async fn failed_statements_carry_their_sql() {
        let db = open_for_test().await;
        let err = db
            .query("SELECT * FROM no_such_table", vec![])
            .await
            .expect_err("missing table");
        assert!(matches!(&err, AppError::Query { sql, .. } if sql.contains("no_such_table")));

        let err = db
            .update("UPDATE no_such_table SET x = 1", vec![])
            .await
            .expect_err("missing table");
        assert!(matches!(err, AppError::Update { .. }));
    }

    #[tokio::test]
    async fn transaction_rolls_back_whole_batch() {
        let db = open_for_test().await;
        let now = chrono::Utc::now();
        let err = db
            .transaction(vec![
                SqlStatement::new(
                    "INSERT INTO parties (name, created_at, updated_at) VALUES (?, ?, ?)",
                    vec!["First".into(), now.into(), now.into()],
                ),
                SqlStatement::plain("INSERT INTO missing_table VALUES (1)"),
            ])
            .await
            .expect_err("batch should fail");
        match err {
            AppError::Transaction { sql, .. } => assert!(sql.contains("missing_table")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(count_parties(&db).await, 0);
    }

    #[tokio::test]
    async fn closed_database_is_not_ready() {
        let mut db = open_for_test().await;
        assert!(db.is_ready());
        db.close().await.expect("close");
        assert!(!db.is_ready());
        assert!(matches!(
            db.query("SELECT 1", vec![]).await,
            Err(AppError::NotReady)
        ));
        assert!(matches!(
            db.update("DELETE FROM parties", vec![]).await,
            Err(AppError::NotReady)
        ));
        assert!(matches!(db.transaction(vec![]).await, Err(AppError::NotReady)));
    }

    #[tokio::test]
    async fn snapshot_survives_reopen() {
        let dir = TempDir::new().expect("temp dir");
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));

        let mut db = Database::open(Arc::clone(&store), Config::manual())
            .await
            .expect("open");
        insert_party(&db, "Reunion").await;
        db.close().await.expect("close");

        let mut reopened = Database::open(Arc::clone(&store), Config::manual())
            .await
            .expect("reopen");
        let rows = reopened
            .query("SELECT name FROM parties", vec![])
            .await
            .expect("query");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Reunion");
        reopened.close().await.expect("close");
    }

    #[tokio::test]
    async fn consecutive_snapshots_are_identical() {
        let store = Arc::new(MemoryStore::new());
        let mut db = Database::open(store.clone(), Config::manual())
            .await
            .expect("open");
        insert_party(&db, "Gala").await;

        db.save_snapshot().await;
        let first = store.get(SNAPSHOT_KEY).expect("get").expect("snapshot");
        db.save_snapshot().await;
        let second = store.get(SNAPSHOT_KEY).expect("get").expect("snapshot");
        assert_eq!(first, second);

        let bytes: Vec<u8> = serde_json::from_str(&first).expect("byte array");
        assert!(bytes.starts_with(b"SQLite format 3\0"));
        db.close().await.expect("close");
    }

    #[tokio::test]
    async fn unreadable_snapshot_falls_back_to_empty_database() {
        for image in ["[1,2,3,4]", "not json at all", "{\"bytes\": true}"] {
            let store = Arc::new(MemoryStore::new());
            store.set(SNAPSHOT_KEY, image).expect("seed");

            let mut db = Database::open(store.clone(), Config::manual())
                .await
                .expect("open despite bad snapshot");
            assert_eq!(count_parties(&db).await, 0);
            db.close().await.expect("close");

            let replaced = store.get(SNAPSHOT_KEY).expect("get").expect("snapshot");
            assert_ne!(replaced, image);
        }
    }

    #[tokio::test]
    async fn autosave_writes_snapshot_on_interval() {
        let store = Arc::new(MemoryStore::new());
        let config = Config {
            autosave_interval: Some(Duration::from_millis(50)),
        };
        let mut db = Database::open(store.clone(), config).await.expect("open");
        let before = store.get(SNAPSHOT_KEY).expect("get").expect("snapshot");

        insert_party(&db, "Barbecue").await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        let after = store.get(SNAPSHOT_KEY).expect("get").expect("snapshot");
        assert_ne!(before, after);
        db.close().await.expect("close");
    }

    #[test]
    fn lock_file_lives_in_data_dir() {
        let dir = TempDir::new().expect("temp dir");
        let mut lock = open_lock(dir.path()).expect("open lock");
        let _guard = lock.write().expect("lock");
        assert!(resolve_lock_path(dir.path()).exists());
    }
}
