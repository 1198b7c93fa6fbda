//! Inventory entity - Purchased items (feed, supplies, equipment, ...).
//!
//! The same item may be bought many times, but only once per purchase date:
//! `(item_name, purchase_date)` is covered by the `unique_inventory_entry`
//! index created alongside the table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the composite unique index on `(item_name, purchase_date)`
pub const UNIQUE_ENTRY_INDEX: &str = "unique_inventory_entry";

/// Inventory database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    /// Unique identifier for the inventory item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Item name (e.g., "Layer Mash")
    pub item_name: String,
    /// One of Livestock, Supplies, Equipment, Utilities
    #[sea_orm(indexed)]
    pub category: String,
    /// Units purchased, at least 1
    pub quantity: i32,
    /// Unit of measure (kg, liters, bags, pc)
    pub unit: String,
    /// Cost of the purchase
    pub cost: f64,
    /// Currency of `cost`, USD unless stated
    pub currency: String,
    pub purchase_order_number: Option<String>,
    /// Date of purchase
    pub purchase_date: Date,
    /// Owning user; nulled when that user is removed
    pub user_id: Option<i64>,
    /// Username of the creator, kept after the owner is removed
    pub created_by_username: Option<String>,
    /// When the record was created
    pub created_at: DateTime,
    /// When the record was last modified
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each inventory item optionally belongs to the user who entered it
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Owner,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
