//! Flock entity - A batch of birds of one breed entered on a given date.
//!
//! `deaths` and `sold` start at zero and are adjusted through admin edits.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Flock database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flocks")]
pub struct Model {
    /// Unique identifier for the flock
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Breed of the birds (e.g., "Rhode Island Red")
    pub breed: String,
    /// Number of birds in the flock, at least 1
    pub quantity: i32,
    /// Age of the birds
    pub age: i32,
    /// Birds lost since entry
    pub deaths: i32,
    /// Birds sold since entry
    pub sold: i32,
    /// Date the flock was entered
    pub entry_date: Date,
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
    /// Each flock optionally belongs to the user who entered it
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
