//! Per-entity state holders used by the CLI.
//!
//! Each accessor keeps the list it last loaded and the message of its last
//! failure. Failures are logged and recorded before being returned.
//!
//! Updates take a `*Changes` patch. A patch that names no field is rejected with
//! `InvalidInput`; a patch that names fields succeeds even when every value
//! matches the stored row.

pub mod calculations;
pub mod guests;
pub mod itinerary;
pub mod parties;
pub mod timeline;
pub mod todos;

use sea_orm::{ConnectionTrait, EntityTrait};
use tracing::error;

use crate::entities::party;
use crate::error::AppError;

fn record<T>(
    slot: &mut Option<String>,
    operation: &'static str,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            *slot = None;
            Ok(value)
        }
        Err(err) => {
            error!(operation, error = %err, "operation failed");
            *slot = Some(err.to_string());
            Err(err)
        }
    }
}

async fn require_party<C: ConnectionTrait>(db: &C, party_id: i64) -> Result<party::Model, AppError> {
    party::Entity::find_by_id(party_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("party id {party_id}")))
}

fn map_update_error(err: sea_orm::DbErr, what: &str, id: i64) -> AppError {
    match err {
        sea_orm::DbErr::RecordNotFound(_) | sea_orm::DbErr::RecordNotUpdated => {
            AppError::NotFound(format!("{what} id {id}"))
        }
        err => err.into(),
    }
}

/// `Some("")` clears an optional text column; `None` leaves it untouched.
fn patch_text(value: Option<String>) -> Option<Option<String>> {
    value.map(|text| {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
