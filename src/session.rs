//! The "current party" selection, persisted in its own storage slot.

use sea_orm::EntityTrait;
use tracing::{debug, warn};

use crate::db::Database;
use crate::entities::party;
use crate::error::AppError;
use crate::storage::KeyValueStore;

pub const SELECTED_PARTY_KEY: &str = "selected-party-id";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub current_party_id: Option<i64>,
}

impl Session {
    /// Reads the stored selection. Ids that no longer name a party are cleared.
    pub async fn restore(db: &Database) -> Result<Self, AppError> {
        let store = db.store();
        let Some(raw) = store.get(SELECTED_PARTY_KEY)? else {
            return Ok(Self::default());
        };
        let Ok(id) = raw.trim().parse::<i64>() else {
            warn!(value = %raw.trim(), "ignoring malformed party selection");
            store.remove(SELECTED_PARTY_KEY)?;
            return Ok(Self::default());
        };

        let exists = party::Entity::find_by_id(id).one(db.conn()?).await?.is_some();
        if !exists {
            debug!(party_id = id, "selected party no longer exists");
            store.remove(SELECTED_PARTY_KEY)?;
            return Ok(Self::default());
        }
        Ok(Self {
            current_party_id: Some(id),
        })
    }

    pub fn persist(&self, store: &dyn KeyValueStore) -> Result<(), AppError> {
        match self.current_party_id {
            Some(id) => store.set(SELECTED_PARTY_KEY, &id.to_string()),
            None => store.remove(SELECTED_PARTY_KEY),
        }
    }

    pub fn select(&mut self, party_id: i64) {
        self.current_party_id = Some(party_id);
    }

    pub fn clear(&mut self) {
        self.current_party_id = None;
    }

    pub fn require_party(&self) -> Result<i64, AppError> {
        self.current_party_id.ok_or_else(|| {
            AppError::InvalidInput(
                "no party selected; run `party select <ID>` or pass --party".to_string(),
            )
        })
    }
}
