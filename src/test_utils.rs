//! Shared test utilities for `FowlTrak`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating users and records with sensible defaults.

use crate::{
    core::{
        auth::{self, RegistrationForm},
        flock::{self, NewFlock},
        health_record::{self, NewHealthRecord},
        production::{self, NewProduction},
        user,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Lowest bcrypt cost, keeps hashing fast in tests
pub const TEST_BCRYPT_COST: u32 = crate::config::settings::MIN_BCRYPT_COST;
/// Password given to every user made by [`create_test_user`]
pub const TEST_PASSWORD: &str = "password123";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    // Each pooled connection to `sqlite::memory:` would be a separate database
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = sea_orm::Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a registration whose confirmation matches the password.
pub fn registration(username: &str, email: &str, password: &str) -> RegistrationForm {
    RegistrationForm {
        username: username.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
    }
}

/// Registers a worker named `username`.
///
/// # Defaults
/// * email: `{username}@example.com`
/// * password: [`TEST_PASSWORD`]
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    auth::register(
        db,
        registration(username, &format!("{username}@example.com"), TEST_PASSWORD),
        TEST_BCRYPT_COST,
    )
    .await
}

/// Registers a user and promotes them to admin.
pub async fn create_test_admin(
    db: &DatabaseConnection,
    username: &str,
) -> Result<entities::user::Model> {
    let account = create_test_user(db, username).await?;
    user::promote(db, account.id).await?;
    user::require_user(db, account.id).await
}

/// Creates a flock entered today, with no deaths or sales.
///
/// # Defaults
/// * age: 6
pub async fn create_test_flock(
    db: &DatabaseConnection,
    breed: &str,
    quantity: i32,
    owner: Option<&entities::user::Model>,
) -> Result<entities::flock::Model> {
    flock::create_flock(
        db,
        NewFlock {
            breed: breed.to_string(),
            quantity,
            age: 6,
            deaths: 0,
            sold: 0,
            entry_date: chrono::Utc::now().date_naive(),
        },
        owner,
    )
    .await
}

/// Creates today's production record with nothing sold.
pub async fn create_test_production(
    db: &DatabaseConnection,
    eggs_collected: i32,
    owner: Option<&entities::user::Model>,
) -> Result<entities::production::Model> {
    production::create_production(
        db,
        NewProduction {
            number_eggs_collected: eggs_collected,
            eggs_sold: 0,
            date_collected: chrono::Utc::now().date_naive(),
        },
        owner,
    )
    .await
}

/// Creates a health record reported today.
///
/// # Defaults
/// * `medication_given`: "Vitamins"
pub async fn create_test_health_record(
    db: &DatabaseConnection,
    symptom: &str,
    number_sick: i32,
    owner: Option<&entities::user::Model>,
) -> Result<entities::health_record::Model> {
    health_record::create_health_record(
        db,
        NewHealthRecord {
            number_sick,
            symptom: symptom.to_string(),
            medication_given: "Vitamins".to_string(),
            date_reported: chrono::Utc::now().date_naive(),
        },
        owner,
    )
    .await
}
