use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{}", labeled("Not found", .0))]
    NotFound(String),
    #[error("{}", labeled("Invalid input", .0))]
    InvalidInput(String),
    #[error("database not initialized")]
    NotReady,
    #[error("failed to initialize database: {0}")]
    Initialization(String),
    #[error("migration {version} ({name}) failed: {source}")]
    Migration {
        version: i64,
        name: String,
        #[source]
        source: Box<AppError>,
    },
    #[error("query failed: {source}\n  sql: {sql}")]
    Query {
        sql: String,
        #[source]
        source: sea_orm::DbErr,
    },
    #[error("update failed: {source}\n  sql: {sql}")]
    Update {
        sql: String,
        #[source]
        source: sea_orm::DbErr,
    },
    #[error("transaction failed: {source}\n  sql: {sql}")]
    Transaction {
        sql: String,
        #[source]
        source: sea_orm::DbErr,
    },
    #[error("invalid import data: {0}")]
    ImportValidation(String),
}

fn labeled(label: &str, message: &str) -> String {
    if message.contains('\n') {
        format!("{label}:\n{message}")
    } else {
        format!("{label}: {message}")
    }
}
