//! Versioned schema changes applied on top of the baseline tables.
//!
//! Each migration runs as one transaction together with its ledger row, so a
//! failure leaves both the schema and the ledger exactly as they were.

use chrono::Utc;
use sea_orm::{EntityTrait, JsonValue, QueryOrder};
use tracing::{error, info};

use crate::db::{Database, SqlStatement};
use crate::entities::migration;
use crate::error::AppError;

#[derive(Clone, Copy, Debug)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub statements: &'static [&'static str],
}

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "update_guests_plus_one_to_additional_guests",
        statements: &[
            "ALTER TABLE guests ADD COLUMN additional_guests INTEGER DEFAULT 0",
            "UPDATE guests SET additional_guests = CASE WHEN plus_one THEN 1 ELSE 0 END",
            "CREATE TABLE guests_new (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                party_id INTEGER NOT NULL,
                name TEXT NOT NULL,
                email TEXT,
                rsvp TEXT DEFAULT 'pending',
                dietary_restrictions TEXT,
                additional_guests INTEGER NOT NULL DEFAULT 0,
                notes TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (party_id) REFERENCES parties (id) ON DELETE CASCADE
            )",
            "INSERT INTO guests_new (id, party_id, name, email, rsvp, dietary_restrictions, additional_guests, notes, created_at)
             SELECT id, party_id, name, email, rsvp, dietary_restrictions, COALESCE(additional_guests, 0), notes, created_at
             FROM guests",
            "DROP TABLE guests",
            "ALTER TABLE guests_new RENAME TO guests",
            "CREATE INDEX IF NOT EXISTS idx_guests_party_id ON guests(party_id)",
        ],
    },
    Migration {
        version: 2,
        name: "add_ordering_indexes",
        statements: &[
            "CREATE INDEX IF NOT EXISTS idx_itinerary_items_order ON itinerary_items(party_id, order_index)",
            "CREATE INDEX IF NOT EXISTS idx_todo_subtasks_order ON todo_subtasks(todo_id, order_index)",
            "CREATE INDEX IF NOT EXISTS idx_todo_dependencies_depends_on ON todo_dependencies(depends_on_id)",
        ],
    },
    Migration {
        version: 3,
        name: "unique_todo_dependency_edges",
        statements: &[
            "DELETE FROM todo_dependencies WHERE id NOT IN (
                SELECT MIN(id) FROM todo_dependencies GROUP BY todo_id, depends_on_id
            )",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_todo_dependencies_edge ON todo_dependencies(todo_id, depends_on_id)",
        ],
    },
];

const LEDGER_DDL: &str = "CREATE TABLE IF NOT EXISTS migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
)";

pub async fn run(db: &Database) -> Result<usize, AppError> {
    run_migrations(db, MIGRATIONS).await
}

/// Applies every migration newer than the ledger and returns how many ran.
pub async fn run_migrations(db: &Database, migrations: &[Migration]) -> Result<usize, AppError> {
    ensure_ascending(migrations)?;
    let current = if ledger_exists(db).await? {
        current_version(db).await?
    } else {
        db.update(LEDGER_DDL, vec![]).await?;
        0
    };

    let mut applied = 0;
    for migration in migrations.iter().filter(|m| m.version > current) {
        info!(
            version = migration.version,
            name = migration.name,
            "applying migration"
        );
        let mut batch: Vec<SqlStatement> = migration
            .statements
            .iter()
            .map(|sql| SqlStatement::plain(*sql))
            .collect();
        batch.push(SqlStatement::new(
            "INSERT INTO migrations (version, name, applied_at) VALUES (?, ?, ?)",
            vec![
                migration.version.into(),
                migration.name.into(),
                Utc::now().into(),
            ],
        ));

        if let Err(err) = db.transaction(batch).await {
            error!(
                version = migration.version,
                name = migration.name,
                error = %err,
                "migration failed"
            );
            return Err(AppError::Migration {
                version: migration.version,
                name: migration.name.to_string(),
                source: Box::new(err),
            });
        }
        applied += 1;
    }
    Ok(applied)
}

pub async fn current_version(db: &Database) -> Result<i64, AppError> {
    let rows = db
        .query(
            "SELECT version FROM migrations ORDER BY version DESC LIMIT 1",
            vec![],
        )
        .await?;
    Ok(rows
        .first()
        .and_then(|row| row.get("version"))
        .and_then(JsonValue::as_i64)
        .unwrap_or(0))
}

pub async fn applied(db: &Database) -> Result<Vec<migration::Model>, AppError> {
    Ok(migration::Entity::find()
        .order_by_asc(migration::Column::Version)
        .all(db.conn()?)
        .await?)
}

async fn ledger_exists(db: &Database) -> Result<bool, AppError> {
    let rows = db
        .query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
            vec!["migrations".into()],
        )
        .await?;
    Ok(!rows.is_empty())
}

fn ensure_ascending(migrations: &[Migration]) -> Result<(), AppError> {
    for pair in migrations.windows(2) {
        if pair[1].version <= pair[0].version {
            return Err(AppError::Initialization(format!(
                "migration {} ({}) is out of order after {} ({})",
                pair[1].version, pair[1].name, pair[0].version, pair[0].name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_for_test;
    use crate::schema;

    #[tokio::test]
    async fn fresh_database_is_fully_migrated() {
        let db = open_for_test().await;
        let ledger = applied(&db).await.expect("ledger");
        let versions: Vec<i64> = ledger.iter().map(|row| row.version).collect();
        assert_eq!(versions, vec![1, 2, 3]);
        assert_eq!(ledger[0].name, "update_guests_plus_one_to_additional_guests");
        assert_eq!(current_version(&db).await.expect("version"), 3);

        assert_eq!(run(&db).await.expect("rerun"), 0);
        assert_eq!(applied(&db).await.expect("ledger").len(), 3);
    }

    #[tokio::test]
    async fn failed_migration_leaves_no_trace() {
        let db = open_for_test().await;
        let broken = [Migration {
            version: 4,
            name: "broken",
            statements: &[
                "CREATE TABLE scratch_table (id INTEGER)",
                "INSERT INTO missing_table VALUES (1)",
            ],
        }];

        let err = run_migrations(&db, &broken).await.expect_err("should fail");
        match err {
            AppError::Migration { version, name, .. } => {
                assert_eq!(version, 4);
                assert_eq!(name, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(current_version(&db).await.expect("version"), 3);
        let tables = db
            .query(
                "SELECT name FROM sqlite_master WHERE name = 'scratch_table'",
                vec![],
            )
            .await
            .expect("query");
        assert!(tables.is_empty());
    }

    #[tokio::test]
    async fn out_of_order_list_is_rejected() {
        let db = open_for_test().await;
        let list = [
            Migration {
                version: 5,
                name: "later",
                statements: &[],
            },
            Migration {
                version: 4,
                name: "earlier",
                statements: &[],
            },
        ];
        assert!(matches!(
            run_migrations(&db, &list).await,
            Err(AppError::Initialization(_))
        ));
    }

    #[tokio::test]
    async fn plus_one_flags_become_additional_guests() {
        let db = open_for_test().await;
        db.update("DROP TABLE guests", vec![]).await.expect("drop");
        schema::ensure_schema(db.conn().expect("conn"))
            .await
            .expect("recreate legacy guests");
        db.update("DELETE FROM migrations", vec![])
            .await
            .expect("reset ledger");

        let now = Utc::now();
        let party = db
            .update(
                "INSERT INTO parties (name, created_at, updated_at) VALUES (?, ?, ?)",
                vec!["Legacy".into(), now.into(), now.into()],
            )
            .await
            .expect("party");
        for (name, plus_one) in [("Ana", true), ("Ben", false)] {
            db.update(
                "INSERT INTO guests (party_id, name, plus_one, created_at) VALUES (?, ?, ?, ?)",
                vec![party.last_insert_id.into(), name.into(), plus_one.into(), now.into()],
            )
            .await
            .expect("legacy guest");
        }

        assert_eq!(run(&db).await.expect("migrate"), 3);

        let rows = db
            .query(
                "SELECT name, additional_guests FROM guests ORDER BY name",
                vec![],
            )
            .await
            .expect("guests");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["additional_guests"], 1);
        assert_eq!(rows[1]["additional_guests"], 0);

        assert!(db
            .query("SELECT plus_one FROM guests", vec![])
            .await
            .is_err());
    }
}
