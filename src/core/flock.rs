//! Flock business logic - Entering, listing and editing batches of birds.

use crate::{
    core::forms::FormFields,
    entities::{Flock, User, flock, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// A flock as submitted on the add or edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFlock {
    pub breed: String,
    pub quantity: i32,
    pub age: i32,
    pub deaths: i32,
    pub sold: i32,
    pub entry_date: NaiveDate,
}

impl NewFlock {
    /// Reads the flock fields. `deaths` and `sold` default to 0 and
    /// `entry_date` to today.
    pub fn from_form(values: &HashMap<String, String>) -> Result<Self> {
        let mut form = FormFields::new(values);
        let input = Self {
            breed: form.text_max("breed", 50),
            quantity: form.integer("quantity", 1, None),
            age: form.integer("age", 0, None),
            deaths: form.integer("deaths", 0, Some(0)),
            sold: form.integer("sold", 0, Some(0)),
            entry_date: form
                .date("entry_date")
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
        };
        let input = form.finish(input)?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<()> {
        if self.breed.trim().is_empty() {
            return Err(Error::invalid_field("breed", "This field is required."));
        }
        if self.quantity < 1 {
            return Err(Error::invalid_field("quantity", "Number must be at least 1."));
        }
        for (field, value) in [("age", self.age), ("deaths", self.deaths), ("sold", self.sold)] {
            if value < 0 {
                return Err(Error::invalid_field(field, "Number must be at least 0."));
            }
        }
        Ok(())
    }
}

/// A flock together with the user who entered it, if still present.
#[derive(Debug, Clone, Serialize)]
pub struct FlockListing {
    pub flock: flock::Model,
    pub owner: Option<user::Model>,
}

pub async fn create_flock(
    db: &DatabaseConnection,
    input: NewFlock,
    owner: Option<&user::Model>,
) -> Result<flock::Model> {
    input.validate()?;
    let now = chrono::Utc::now().naive_utc();

    let flock = flock::ActiveModel {
        breed: Set(input.breed.trim().to_string()),
        quantity: Set(input.quantity),
        age: Set(input.age),
        deaths: Set(input.deaths),
        sold: Set(input.sold),
        entry_date: Set(input.entry_date),
        user_id: Set(owner.map(|u| u.id)),
        created_by_username: Set(owner.map(|u| u.username.clone())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = flock.insert(db).await?;
    info!(flock_id = created.id, breed = %created.breed, "flock recorded");
    Ok(created)
}

/// All flocks with their owners, newest first.
pub async fn list_flocks(db: &DatabaseConnection) -> Result<Vec<FlockListing>> {
    let rows = Flock::find()
        .find_also_related(User)
        .order_by_desc(flock::Column::CreatedAt)
        .order_by_desc(flock::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(flock, owner)| FlockListing { flock, owner })
        .collect())
}

pub async fn get_flock_by_id(db: &DatabaseConnection, flock_id: i64) -> Result<Option<flock::Model>> {
    Flock::find_by_id(flock_id).one(db).await.map_err(Into::into)
}

/// Replaces every editable field; ownership is left untouched.
pub async fn update_flock(
    db: &DatabaseConnection,
    flock_id: i64,
    input: NewFlock,
) -> Result<flock::Model> {
    input.validate()?;
    let existing = get_flock_by_id(db, flock_id)
        .await?
        .ok_or_else(|| not_found(flock_id))?;

    let mut active: flock::ActiveModel = existing.into();
    active.breed = Set(input.breed.trim().to_string());
    active.quantity = Set(input.quantity);
    active.age = Set(input.age);
    active.deaths = Set(input.deaths);
    active.sold = Set(input.sold);
    active.entry_date = Set(input.entry_date);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

pub async fn delete_flock(db: &DatabaseConnection, flock_id: i64) -> Result<()> {
    let result = Flock::delete_by_id(flock_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(flock_id));
    }
    info!(flock_id, "flock deleted");
    Ok(())
}

fn not_found(id: i64) -> Error {
    Error::RecordNotFound {
        kind: "flock".to_string(),
        id,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::forms::fields;
    use crate::test_utils::*;

    #[test]
    fn test_only_required_fields_defaults_counts() {
        let input = NewFlock::from_form(&fields(&[
            ("breed", "Rhode Island Red"),
            ("quantity", "25"),
            ("age", "8"),
        ]))
        .unwrap();
        assert_eq!(input.deaths, 0);
        assert_eq!(input.sold, 0);
        assert_eq!(input.entry_date, chrono::Utc::now().date_naive());
    }

    #[test]
    fn test_quantity_must_be_positive() {
        let result = NewFlock::from_form(&fields(&[
            ("breed", "Leghorn"),
            ("quantity", "0"),
            ("age", "3"),
        ]));
        assert!(matches!(result, Err(Error::Validation { .. })));
    }

    #[tokio::test]
    async fn test_create_flock_validation() -> Result<()> {
        let db = setup_test_db().await?;
        let input = NewFlock {
            breed: "   ".to_string(),
            quantity: 5,
            age: 1,
            deaths: 0,
            sold: 0,
            entry_date: chrono::Utc::now().date_naive(),
        };
        let result = create_flock(&db, input, None).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(list_flocks(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_records_owner() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let flock = create_test_flock(&db, "Sussex", 12, Some(&alice)).await?;

        assert_eq!(flock.user_id, Some(alice.id));
        assert_eq!(flock.created_by_username.as_deref(), Some("alice"));
        assert_eq!(flock.deaths, 0);
        assert_eq!(flock.created_at, flock.updated_at);

        let listed = list_flocks(&db).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].owner.as_ref().map(|u| u.id), Some(alice.id));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_preserves_owner_and_refreshes_timestamp() -> Result<()> {
        let db = setup_test_db().await?;
        let alice = create_test_user(&db, "alice").await?;
        let flock = create_test_flock(&db, "Sussex", 12, Some(&alice)).await?;

        let edited = update_flock(
            &db,
            flock.id,
            NewFlock {
                breed: "Sussex".to_string(),
                quantity: 12,
                age: 9,
                deaths: 2,
                sold: 3,
                entry_date: flock.entry_date,
            },
        )
        .await?;
        assert_eq!(edited.deaths, 2);
        assert_eq!(edited.sold, 3);
        assert_eq!(edited.user_id, Some(alice.id));
        assert!(edited.updated_at >= flock.updated_at);
        assert_eq!(edited.created_at, flock.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_flock() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(get_flock_by_id(&db, 99).await?.is_none());
        assert!(matches!(
            delete_flock(&db, 99).await,
            Err(Error::RecordNotFound { id: 99, .. })
        ));
        Ok(())
    }
}
