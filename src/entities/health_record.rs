//! Health record entity - Sick birds, their symptom and the medication given.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Health record database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "health_records")]
pub struct Model {
    /// Unique identifier for the health record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Number of sick birds
    pub number_sick: i32,
    /// Observed symptom, used as the chart grouping key
    pub symptom: String,
    /// Medication administered
    pub medication_given: String,
    /// Date the issue was reported
    pub date_reported: Date,
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
    /// Each health record optionally belongs to the user who reported it
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
