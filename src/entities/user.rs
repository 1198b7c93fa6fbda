//! User entity - Accounts that sign in and enter records.
//!
//! Every user holds exactly one [`Role`]. The password is only ever stored as a
//! bcrypt hash and is never serialized.

use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The two roles a user can hold.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Data-entry staff: may create records
    #[sea_orm(string_value = "worker")]
    Worker,
    /// Operator: everything a worker can do plus oversight and user management
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// Lowercase name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Worker => "worker",
            Self::Admin => "admin",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub const fn is_worker(self) -> bool {
        matches!(self, Self::Worker)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "worker" => Ok(Self::Worker),
            "admin" => Ok(Self::Admin),
            other => Err(Error::InvalidRole {
                role: other.to_string(),
            }),
        }
    }
}

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique across all users
    #[sea_orm(unique)]
    pub username: String,
    /// Email address, unique across all users
    #[sea_orm(unique, indexed)]
    pub email: String,
    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Access role
    #[sea_orm(indexed)]
    pub role: Role,
    /// When the account was created
    pub created_at: DateTime,
    /// When the account was last modified
    pub updated_at: DateTime,
}

impl Model {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[must_use]
    pub const fn is_worker(&self) -> bool {
        self.role.is_worker()
    }
}

/// A user owns the records they entered
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::flock::Entity")]
    Flocks,
    #[sea_orm(has_many = "super::production::Entity")]
    Productions,
    #[sea_orm(has_many = "super::inventory::Entity")]
    Inventories,
    #[sea_orm(has_many = "super::health_record::Entity")]
    HealthRecords,
}

impl Related<super::flock::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flocks.def()
    }
}

impl Related<super::production::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Productions.def()
    }
}

impl Related<super::inventory::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Inventories.def()
    }
}

impl Related<super::health_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HealthRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
