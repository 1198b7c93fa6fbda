//! Database configuration module for `FowlTrak`.
//!
//! This module handles database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! structs. Creation is idempotent (`IF NOT EXISTS`) and runs on every startup.

use crate::entities::{Flock, HealthRecord, Inventory, Production, User, inventory};
use crate::errors::Result;
use sea_orm::{
    ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema, sea_query::Index,
};
use tracing::{debug, info, instrument};

/// Default `SQLite` file used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/fowltrak.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the given database URL.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database");
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables and indexes if they do not already exist.
///
/// `users` is created first since every record table references it.
#[instrument(skip(db))]
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, User).await?;
    create_table(db, Flock).await?;
    create_table(db, Production).await?;
    create_table(db, Inventory).await?;
    create_table(db, HealthRecord).await?;

    let builder = db.get_database_backend();
    let unique_entry = Index::create()
        .name(inventory::UNIQUE_ENTRY_INDEX)
        .table(Inventory)
        .col(inventory::Column::ItemName)
        .col(inventory::Column::PurchaseDate)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&unique_entry)).await?;

    info!("Database tables ensured");
    Ok(())
}

async fn create_table<E>(db: &DatabaseConnection, entity: E) -> Result<()>
where
    E: EntityTrait + Copy,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut table = schema.create_table_from_entity(entity);
    table.if_not_exists();
    db.execute(builder.build(&table)).await?;

    for mut index in schema.create_index_from_entity(entity) {
        index.if_not_exists();
        db.execute(builder.build(&index)).await?;
    }
    Ok(())
}
