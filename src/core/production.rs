//! Egg production business logic.

use crate::{
    core::forms::FormFields,
    entities::{Production, User, production, user},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// One day's collection as submitted on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduction {
    pub number_eggs_collected: i32,
    pub eggs_sold: i32,
    pub date_collected: NaiveDate,
}

impl NewProduction {
    /// `eggs_sold` defaults to 0 and `date_collected` to today.
    pub fn from_form(values: &HashMap<String, String>) -> Result<Self> {
        let mut form = FormFields::new(values);
        let input = Self {
            number_eggs_collected: form.integer("number_eggs_collected", 0, None),
            eggs_sold: form.integer("eggs_sold", 0, Some(0)),
            date_collected: form
                .date("date_collected")
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
        };
        let input = form.finish(input)?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<()> {
        if self.number_eggs_collected < 0 {
            return Err(Error::invalid_field(
                "number_eggs_collected",
                "Must be a non-negative value",
            ));
        }
        if self.eggs_sold < 0 {
            return Err(Error::invalid_field("eggs_sold", "Must be a non-negative value"));
        }
        Ok(())
    }
}

/// A production record with the user who entered it.
#[derive(Debug, Clone, Serialize)]
pub struct ProductionListing {
    pub production: production::Model,
    pub owner: Option<user::Model>,
}

pub async fn create_production(
    db: &DatabaseConnection,
    input: NewProduction,
    owner: Option<&user::Model>,
) -> Result<production::Model> {
    input.validate()?;
    let now = chrono::Utc::now().naive_utc();

    let record = production::ActiveModel {
        number_eggs_collected: Set(input.number_eggs_collected),
        eggs_sold: Set(input.eggs_sold),
        date_collected: Set(input.date_collected),
        user_id: Set(owner.map(|u| u.id)),
        created_by_username: Set(owner.map(|u| u.username.clone())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = record.insert(db).await?;
    info!(production_id = created.id, "production recorded");
    Ok(created)
}

/// All production records with their owners, newest first.
pub async fn list_productions(db: &DatabaseConnection) -> Result<Vec<ProductionListing>> {
    let rows = Production::find()
        .find_also_related(User)
        .order_by_desc(production::Column::CreatedAt)
        .order_by_desc(production::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(production, owner)| ProductionListing { production, owner })
        .collect())
}

pub async fn get_production_by_id(
    db: &DatabaseConnection,
    production_id: i64,
) -> Result<Option<production::Model>> {
    Production::find_by_id(production_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn update_production(
    db: &DatabaseConnection,
    production_id: i64,
    input: NewProduction,
) -> Result<production::Model> {
    input.validate()?;
    let existing = get_production_by_id(db, production_id)
        .await?
        .ok_or_else(|| not_found(production_id))?;

    let mut active: production::ActiveModel = existing.into();
    active.number_eggs_collected = Set(input.number_eggs_collected);
    active.eggs_sold = Set(input.eggs_sold);
    active.date_collected = Set(input.date_collected);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active.update(db).await.map_err(Into::into)
}

pub async fn delete_production(db: &DatabaseConnection, production_id: i64) -> Result<()> {
    let result = Production::delete_by_id(production_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(production_id));
    }
    info!(production_id, "production deleted");
    Ok(())
}

fn not_found(id: i64) -> Error {
    Error::RecordNotFound {
        kind: "production".to_string(),
        id,
    }
}
