/// Chart data endpoints
pub mod api;
/// Home, registration, login, logout and account settings
pub mod auth;
/// Dashboards and worker management
pub mod dashboards;
/// Record entry, listing, edit and delete
pub mod records;
