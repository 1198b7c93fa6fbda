//! Core business logic - framework-agnostic operations on users and farm records.
//!
//! Nothing in here knows about HTTP; the web layer parses requests into the
//! typed inputs defined here and maps the returned errors to responses.

/// Role-based access rules and decisions
pub mod access;
/// Password hashing, registration and login
pub mod auth;
/// Flock records
pub mod flock;
/// Form-field parsing with per-field errors
pub mod forms;
/// Health records
pub mod health_record;
/// Inventory purchases
pub mod inventory;
/// Egg production records
pub mod production;
/// Dispatch over record kinds for generic edit and delete
pub mod records;
/// Chart series and farm summary
pub mod report;
/// User lookups, role changes, removal and account settings
pub mod user;
