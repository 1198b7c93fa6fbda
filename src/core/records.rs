//! Generic dispatch over the four record kinds.
//!
//! The edit and delete routes take the kind as a path segment. [`RecordKind`]
//! is the closed set of accepted tags; anything else is rejected before the
//! store is touched.

use crate::{
    core::{flock, health_record, inventory, production},
    entities,
    errors::{Error, Result},
};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::{collections::HashMap, fmt, str::FromStr};

/// The record kinds that can be edited and deleted generically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Inventory,
    Production,
    Flock,
    HealthRecord,
}

impl RecordKind {
    pub const ALL: [Self; 4] = [
        Self::Inventory,
        Self::Production,
        Self::Flock,
        Self::HealthRecord,
    ];

    /// Path tag, e.g. `health_record`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Production => "production",
            Self::Flock => "flock",
            Self::HealthRecord => "health_record",
        }
    }

    /// Human readable name for flash messages, e.g. `Flock record`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Inventory => "Inventory record",
            Self::Production => "Production record",
            Self::Flock => "Flock record",
            Self::HealthRecord => "Health record",
        }
    }

    /// Loads one record of this kind.
    ///
    /// # Errors
    /// A miss is [`Error::RecordNotFound`].
    pub async fn find(self, db: &DatabaseConnection, id: i64) -> Result<Record> {
        let record = match self {
            Self::Inventory => inventory::get_inventory_by_id(db, id)
                .await?
                .map(Record::Inventory),
            Self::Production => production::get_production_by_id(db, id)
                .await?
                .map(Record::Production),
            Self::Flock => flock::get_flock_by_id(db, id).await?.map(Record::Flock),
            Self::HealthRecord => health_record::get_health_record_by_id(db, id)
                .await?
                .map(Record::HealthRecord),
        };
        record.ok_or_else(|| self.not_found(id))
    }

    /// Parses a submitted form for this kind.
    pub fn parse_form(self, values: &HashMap<String, String>) -> Result<RecordInput> {
        Ok(match self {
            Self::Inventory => RecordInput::Inventory(inventory::NewInventory::from_form(values)?),
            Self::Production => {
                RecordInput::Production(production::NewProduction::from_form(values)?)
            }
            Self::Flock => RecordInput::Flock(flock::NewFlock::from_form(values)?),
            Self::HealthRecord => {
                RecordInput::HealthRecord(health_record::NewHealthRecord::from_form(values)?)
            }
        })
    }

    pub async fn delete(self, db: &DatabaseConnection, id: i64) -> Result<()> {
        match self {
            Self::Inventory => inventory::delete_inventory(db, id).await,
            Self::Production => production::delete_production(db, id).await,
            Self::Flock => flock::delete_flock(db, id).await,
            Self::HealthRecord => health_record::delete_health_record(db, id).await,
        }
    }

    fn not_found(self, id: i64) -> Error {
        Error::RecordNotFound {
            kind: self.as_str().to_string(),
            id,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| Error::InvalidRecordKind {
                kind: s.to_string(),
            })
    }
}

/// A stored record of any kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Record {
    Inventory(entities::InventoryModel),
    Production(entities::ProductionModel),
    Flock(entities::FlockModel),
    HealthRecord(entities::HealthRecordModel),
}

impl Record {
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Inventory(_) => RecordKind::Inventory,
            Self::Production(_) => RecordKind::Production,
            Self::Flock(_) => RecordKind::Flock,
            Self::HealthRecord(_) => RecordKind::HealthRecord,
        }
    }
}

/// A parsed edit form of any kind.
#[derive(Debug, Clone)]
pub enum RecordInput {
    Inventory(inventory::NewInventory),
    Production(production::NewProduction),
    Flock(flock::NewFlock),
    HealthRecord(health_record::NewHealthRecord),
}

/// Applies an edit to record `id`, whose kind is given by the input.
pub async fn update_record(db: &DatabaseConnection, id: i64, input: RecordInput) -> Result<Record> {
    Ok(match input {
        RecordInput::Inventory(input) => {
            Record::Inventory(inventory::update_inventory(db, id, input).await?)
        }
        RecordInput::Production(input) => {
            Record::Production(production::update_production(db, id, input).await?)
        }
        RecordInput::Flock(input) => Record::Flock(flock::update_flock(db, id, input).await?),
        RecordInput::HealthRecord(input) => {
            Record::HealthRecord(health_record::update_health_record(db, id, input).await?)
        }
    })
}
