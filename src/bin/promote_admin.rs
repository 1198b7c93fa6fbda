//! Promotes an existing account to admin.
//!
//! Usage: `promote-admin [username]`. Without an argument the username comes
//! from `OWNER_USERNAME`, falling back to `farm_owner`.

use dotenvy::dotenv;
use fowltrak::{
    config::database,
    core::user::{RoleChange, promote_by_username},
    errors::Result,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_OWNER: &str = "farm_owner";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    dotenv().ok();

    let username = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("OWNER_USERNAME").ok())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string());

    let db = database::create_connection(&database::get_database_url()).await?;
    database::create_tables(&db).await?;

    match promote_by_username(&db, &username).await? {
        None => println!("User '{username}' not found."),
        Some(RoleChange::Unchanged(_)) => println!("User '{username}' is already an admin."),
        Some(change) => {
            info!(user_id = change.user().id, "promoted from the command line");
            println!("User '{username}' has been promoted to admin.");
        }
    }
    Ok(())
}
