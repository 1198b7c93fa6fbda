//! Inventory business logic - purchases of livestock, supplies, equipment and utilities.
//!
//! An item may be bought repeatedly, but at most once per purchase date. The
//! pair is pre-checked here and enforced by the `unique_inventory_entry` index.

use crate::{
    core::forms::FormFields,
    entities::{Inventory, inventory, user},
    errors::{Error, Result, conflict_on_unique},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::HashMap;
use tracing::{info, warn};

/// Accepted inventory categories
pub const CATEGORIES: [&str; 4] = ["Livestock", "Supplies", "Equipment", "Utilities"];
/// Accepted currencies
pub const CURRENCIES: [&str; 3] = ["USD", "EUR", "NGN"];
/// Currency used when none is given
pub const DEFAULT_CURRENCY: &str = "USD";

const DUPLICATE_ENTRY: &str = "This item was already recorded for that purchase date.";

/// A purchase as submitted on the form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventory {
    pub item_name: String,
    pub category: String,
    pub quantity: i32,
    pub unit: String,
    pub cost: f64,
    pub currency: String,
    pub purchase_order_number: Option<String>,
    pub purchase_date: NaiveDate,
}

impl NewInventory {
    pub fn from_form(values: &HashMap<String, String>) -> Result<Self> {
        let mut form = FormFields::new(values);
        let input = Self {
            item_name: form.text_max("item_name", 100),
            category: form.choice("category", &CATEGORIES),
            quantity: form.integer("quantity", 1, None),
            unit: form.text_max("unit", 50),
            cost: form.amount("cost"),
            currency: form.choice_or("currency", &CURRENCIES, DEFAULT_CURRENCY),
            purchase_order_number: form.optional_text("purchase_order_number"),
            purchase_date: form
                .date("purchase_date")
                .unwrap_or_else(|| chrono::Utc::now().date_naive()),
        };
        let input = form.finish(input)?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<()> {
        if self.item_name.trim().is_empty() {
            return Err(Error::invalid_field("item_name", "This field is required."));
        }
        if self.unit.trim().is_empty() {
            return Err(Error::invalid_field("unit", "This field is required."));
        }
        if !CATEGORIES.contains(&self.category.as_str()) {
            return Err(Error::invalid_field("category", "Not a valid choice."));
        }
        if !CURRENCIES.contains(&self.currency.as_str()) {
            return Err(Error::invalid_field("currency", "Not a valid choice."));
        }
        if self.quantity < 1 {
            return Err(Error::invalid_field("quantity", "Number must be at least 1."));
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(Error::invalid_field("cost", "Must be a non-negative value"));
        }
        Ok(())
    }
}

fn duplicate_entry() -> Error {
    Error::Conflict {
        field: "item_name".to_string(),
        message: DUPLICATE_ENTRY.to_string(),
    }
}

/// Finds another entry for the same item on the same date, ignoring `except_id`.
async fn find_duplicate(
    db: &DatabaseConnection,
    item_name: &str,
    purchase_date: NaiveDate,
    except_id: Option<i64>,
) -> Result<Option<inventory::Model>> {
    let mut query = Inventory::find()
        .filter(inventory::Column::ItemName.eq(item_name))
        .filter(inventory::Column::PurchaseDate.eq(purchase_date));
    if let Some(id) = except_id {
        query = query.filter(inventory::Column::Id.ne(id));
    }
    query.one(db).await.map_err(Into::into)
}

pub async fn create_inventory(
    db: &DatabaseConnection,
    input: NewInventory,
    owner: Option<&user::Model>,
) -> Result<inventory::Model> {
    input.validate()?;
    let item_name = input.item_name.trim().to_string();

    if find_duplicate(db, &item_name, input.purchase_date, None)
        .await?
        .is_some()
    {
        warn!(%item_name, purchase_date = %input.purchase_date, "duplicate inventory entry");
        return Err(duplicate_entry());
    }

    let now = chrono::Utc::now().naive_utc();
    let item = inventory::ActiveModel {
        item_name: Set(item_name),
        category: Set(input.category),
        quantity: Set(input.quantity),
        unit: Set(input.unit.trim().to_string()),
        cost: Set(input.cost),
        currency: Set(input.currency),
        purchase_order_number: Set(input.purchase_order_number),
        purchase_date: Set(input.purchase_date),
        user_id: Set(owner.map(|u| u.id)),
        created_by_username: Set(owner.map(|u| u.username.clone())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = item
        .insert(db)
        .await
        .map_err(|e| conflict_on_unique(e, "item_name", DUPLICATE_ENTRY))?;
    info!(inventory_id = created.id, item_name = %created.item_name, "inventory recorded");
    Ok(created)
}

/// All inventory entries, newest first.
pub async fn list_inventory(db: &DatabaseConnection) -> Result<Vec<inventory::Model>> {
    Inventory::find()
        .order_by_desc(inventory::Column::CreatedAt)
        .order_by_desc(inventory::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_inventory_by_id(
    db: &DatabaseConnection,
    inventory_id: i64,
) -> Result<Option<inventory::Model>> {
    Inventory::find_by_id(inventory_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn update_inventory(
    db: &DatabaseConnection,
    inventory_id: i64,
    input: NewInventory,
) -> Result<inventory::Model> {
    input.validate()?;
    let existing = get_inventory_by_id(db, inventory_id)
        .await?
        .ok_or_else(|| not_found(inventory_id))?;
    let item_name = input.item_name.trim().to_string();

    if find_duplicate(db, &item_name, input.purchase_date, Some(inventory_id))
        .await?
        .is_some()
    {
        return Err(duplicate_entry());
    }

    let mut active: inventory::ActiveModel = existing.into();
    active.item_name = Set(item_name);
    active.category = Set(input.category);
    active.quantity = Set(input.quantity);
    active.unit = Set(input.unit.trim().to_string());
    active.cost = Set(input.cost);
    active.currency = Set(input.currency);
    active.purchase_order_number = Set(input.purchase_order_number);
    active.purchase_date = Set(input.purchase_date);
    active.updated_at = Set(chrono::Utc::now().naive_utc());
    active
        .update(db)
        .await
        .map_err(|e| conflict_on_unique(e, "item_name", DUPLICATE_ENTRY))
}

pub async fn delete_inventory(db: &DatabaseConnection, inventory_id: i64) -> Result<()> {
    let result = Inventory::delete_by_id(inventory_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(not_found(inventory_id));
    }
    info!(inventory_id, "inventory deleted");
    Ok(())
}

fn not_found(id: i64) -> Error {
    Error::RecordNotFound {
        kind: "inventory".to_string(),
        id,
    }
}
