use dotenvy::dotenv;
use fowltrak::{
    config::{AppConfig, database},
    errors::Result,
    web::{AppState, build_router},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also come from the real environment
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Resolve settings; a missing SECRET_KEY stops startup here
    let config = AppConfig::load()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;
    info!(?config, "Configuration loaded.");

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Serve
    let bind_address = config.bind_address.clone();
    let app = build_router(AppState::new(db, config));
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", bind_address, e))?;
    info!("Listening on {}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
