/// Database configuration and connection management
pub mod database;

/// Application settings from the environment and an optional TOML file
pub mod settings;

pub use settings::AppConfig;
