use chrono::Utc;
use sea_orm::ActiveValue::Unchanged;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use super::{map_update_error, patch_text, record, require_party};
use crate::db::Database;
use crate::entities::guest;
use crate::error::AppError;
use crate::model::{
    ensure_non_empty, ensure_non_negative, optional_text, GuestChanges, GuestInput, Rsvp,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GuestStats {
    pub confirmed: usize,
    pub declined: usize,
    pub pending: usize,
    /// Extra people brought by confirmed guests.
    pub additional_guests: i64,
    pub total_attending: i64,
    pub total_invited: usize,
}

pub struct GuestList<'a> {
    db: &'a Database,
    party_id: i64,
    guests: Vec<guest::Model>,
    error: Option<String>,
}

impl<'a> GuestList<'a> {
    pub fn new(db: &'a Database, party_id: i64) -> Self {
        Self {
            db,
            party_id,
            guests: Vec::new(),
            error: None,
        }
    }

    pub fn guests(&self) -> &[guest::Model] {
        &self.guests
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load(&mut self) -> Result<&[guest::Model], AppError> {
        let result = list_guests(self.db, self.party_id).await;
        self.guests = record(&mut self.error, "load guests", result)?;
        Ok(&self.guests)
    }

    pub async fn add(&mut self, input: GuestInput) -> Result<guest::Model, AppError> {
        let result = add_guest(self.db, self.party_id, input).await;
        let guest = record(&mut self.error, "add guest", result)?;
        self.load().await?;
        Ok(guest)
    }

    pub async fn update(&mut self, id: i64, changes: GuestChanges) -> Result<guest::Model, AppError> {
        let result = update_guest(self.db, self.party_id, id, changes).await;
        let guest = record(&mut self.error, "update guest", result)?;
        self.load().await?;
        Ok(guest)
    }

    pub async fn set_rsvp(&mut self, id: i64, rsvp: Rsvp) -> Result<guest::Model, AppError> {
        self.update(
            id,
            GuestChanges {
                rsvp: Some(rsvp),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete(&mut self, id: i64) -> Result<(), AppError> {
        let result = delete_guest(self.db, self.party_id, id).await;
        record(&mut self.error, "delete guest", result)?;
        self.load().await?;
        Ok(())
    }

    /// Aggregates over the loaded list.
    pub fn stats(&self) -> GuestStats {
        let mut stats = GuestStats {
            total_invited: self.guests.len(),
            ..GuestStats::default()
        };
        for guest in &self.guests {
            match Rsvp::parse(&guest.rsvp) {
                Some(Rsvp::Yes) => {
                    stats.confirmed += 1;
                    stats.additional_guests += i64::from(guest.additional_guests);
                }
                Some(Rsvp::No) => stats.declined += 1,
                Some(Rsvp::Pending) | None => stats.pending += 1,
            }
        }
        stats.total_attending = stats.confirmed as i64 + stats.additional_guests;
        stats
    }
}

async fn list_guests(db: &Database, party_id: i64) -> Result<Vec<guest::Model>, AppError> {
    Ok(guest::Entity::find()
        .filter(guest::Column::PartyId.eq(party_id))
        .order_by_asc(guest::Column::Name)
        .order_by_asc(guest::Column::Id)
        .all(db.conn()?)
        .await?)
}

async fn add_guest(db: &Database, party_id: i64, input: GuestInput) -> Result<guest::Model, AppError> {
    ensure_non_empty("guest name", &input.name)?;
    ensure_non_negative("additional guests", input.additional_guests)?;
    let conn = db.conn()?;
    require_party(conn, party_id).await?;

    let active = guest::ActiveModel {
        party_id: Set(party_id),
        name: Set(input.name.trim().to_string()),
        email: Set(optional_text(input.email)),
        rsvp: Set(input.rsvp.as_str().to_string()),
        dietary_restrictions: Set(optional_text(input.dietary_restrictions)),
        additional_guests: Set(input.additional_guests),
        notes: Set(optional_text(input.notes)),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    Ok(active.insert(conn).await?)
}

async fn require_guest(db: &Database, party_id: i64, id: i64) -> Result<guest::Model, AppError> {
    guest::Entity::find_by_id(id)
        .filter(guest::Column::PartyId.eq(party_id))
        .one(db.conn()?)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("guest id {id}")))
}

async fn update_guest(
    db: &Database,
    party_id: i64,
    id: i64,
    changes: GuestChanges,
) -> Result<guest::Model, AppError> {
    require_guest(db, party_id, id).await?;
    let mut active = guest::ActiveModel {
        id: Unchanged(id),
        ..Default::default()
    };
    if let Some(name) = changes.name {
        ensure_non_empty("guest name", &name)?;
        active.name = Set(name.trim().to_string());
    }
    if let Some(email) = patch_text(changes.email) {
        active.email = Set(email);
    }
    if let Some(rsvp) = changes.rsvp {
        active.rsvp = Set(rsvp.as_str().to_string());
    }
    if let Some(dietary) = patch_text(changes.dietary_restrictions) {
        active.dietary_restrictions = Set(dietary);
    }
    if let Some(additional) = changes.additional_guests {
        ensure_non_negative("additional guests", additional)?;
        active.additional_guests = Set(additional);
    }
    if let Some(notes) = patch_text(changes.notes) {
        active.notes = Set(notes);
    }
    if !active.is_changed() {
        return Err(AppError::InvalidInput("no guest fields to update".to_string()));
    }

    active
        .update(db.conn()?)
        .await
        .map_err(|err| map_update_error(err, "guest", id))
}

async fn delete_guest(db: &Database, party_id: i64, id: i64) -> Result<(), AppError> {
    let result = db
        .update(
            "DELETE FROM guests WHERE id = ? AND party_id = ?",
            vec![id.into(), party_id.into()],
        )
        .await?;
    if result.changes == 0 {
        return Err(AppError::NotFound(format!("guest id {id}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessors::parties::PartyList;
    use crate::db::open_for_test;
    use crate::model::PartyInput;

    async fn party(db: &Database) -> i64 {
        PartyList::new(db)
            .create(PartyInput::named("Housewarming"))
            .await
            .expect("party")
            .id
    }

    #[tokio::test]
    async fn guests_load_alphabetically() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut guests = GuestList::new(&db, party_id);
        for name in ["Zoe", "Ana", "Mia"] {
            guests.add(GuestInput::named(name)).await.expect("add");
        }
        let names: Vec<&str> = guests.guests().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Mia", "Zoe"]);
    }

    #[tokio::test]
    async fn stats_count_only_confirmed_companions() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut guests = GuestList::new(&db, party_id);
        guests
            .add(GuestInput {
                rsvp: Rsvp::Yes,
                additional_guests: 2,
                ..GuestInput::named("Ana")
            })
            .await
            .expect("ana");
        guests
            .add(GuestInput {
                rsvp: Rsvp::Yes,
                ..GuestInput::named("Ben")
            })
            .await
            .expect("ben");
        guests
            .add(GuestInput {
                rsvp: Rsvp::No,
                additional_guests: 3,
                ..GuestInput::named("Cy")
            })
            .await
            .expect("cy");
        let dee = guests
            .add(GuestInput {
                additional_guests: 1,
                ..GuestInput::named("Dee")
            })
            .await
            .expect("dee");

        assert_eq!(
            guests.stats(),
            GuestStats {
                confirmed: 2,
                declined: 1,
                pending: 1,
                additional_guests: 2,
                total_attending: 4,
                total_invited: 4,
            }
        );

        guests.set_rsvp(dee.id, Rsvp::Yes).await.expect("rsvp");
        let stats = guests.stats();
        assert_eq!(stats.confirmed, 3);
        assert_eq!(stats.total_attending, 6);
    }

    #[tokio::test]
    async fn add_requires_existing_party_and_valid_fields() {
        let db = open_for_test().await;
        let mut guests = GuestList::new(&db, 999);
        assert!(matches!(
            guests.add(GuestInput::named("Ghost")).await,
            Err(AppError::NotFound(_))
        ));
        assert!(guests.error().is_some());

        let party_id = party(&db).await;
        let mut guests = GuestList::new(&db, party_id);
        assert!(matches!(
            guests
                .add(GuestInput {
                    additional_guests: -2,
                    ..GuestInput::named("Ana")
                })
                .await,
            Err(AppError::InvalidInput(_))
        ));
        assert!(matches!(
            guests.add(GuestInput::named("")).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn update_clears_blank_optional_fields() {
        let db = open_for_test().await;
        let party_id = party(&db).await;
        let mut guests = GuestList::new(&db, party_id);
        let ana = guests
            .add(GuestInput {
                email: Some("ana@example.com".to_string()),
                dietary_restrictions: Some("vegan".to_string()),
                ..GuestInput::named("Ana")
            })
            .await
            .expect("add");

        let updated = guests
            .update(
                ana.id,
                GuestChanges {
                    email: Some(" ".to_string()),
                    additional_guests: Some(1),
                    ..Default::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.email, None);
        assert_eq!(updated.dietary_restrictions.as_deref(), Some("vegan"));
        assert_eq!(updated.additional_guests, 1);

        let same = guests
            .update(
                ana.id,
                GuestChanges {
                    additional_guests: Some(1),
                    ..Default::default()
                },
            )
            .await
            .expect("same value");
        assert_eq!(same.additional_guests, 1);
        assert!(matches!(
            guests.update(ana.id, GuestChanges::default()).await,
            Err(AppError::InvalidInput(_))
        ));

        guests.delete(ana.id).await.expect("delete");
        assert!(guests.guests().is_empty());
        assert!(matches!(
            guests.delete(ana.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn updates_stay_inside_the_party() {
        let db = open_for_test().await;
        let home = party(&db).await;
        let other = party(&db).await;
        let theirs = GuestList::new(&db, other)
            .add(GuestInput::named("Ben"))
            .await
            .expect("add");

        let mut guests = GuestList::new(&db, home);
        assert!(matches!(
            guests
                .update(
                    theirs.id,
                    GuestChanges {
                        name: Some("Renamed".to_string()),
                        ..Default::default()
                    },
                )
                .await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            guests.set_rsvp(theirs.id, Rsvp::No).await,
            Err(AppError::NotFound(_))
        ));

        let mut owner = GuestList::new(&db, other);
        let unchanged = owner.load().await.expect("load");
        assert_eq!(unchanged[0].name, "Ben");
        assert_eq!(unchanged[0].rsvp, Rsvp::Pending.as_str());
    }
}
