//! Production entity - Eggs collected (and sold) on a given day.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Egg production database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production")]
pub struct Model {
    /// Unique identifier for the production record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Eggs collected on `date_collected`
    pub number_eggs_collected: i32,
    /// Eggs sold out of that collection
    pub eggs_sold: i32,
    /// Collection date
    pub date_collected: Date,
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
    /// Each production record optionally belongs to the user who entered it
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
