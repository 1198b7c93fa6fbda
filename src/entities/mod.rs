//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod flock;
pub mod health_record;
pub mod inventory;
pub mod production;
pub mod user;

// Re-export specific types to avoid conflicts
pub use flock::{Column as FlockColumn, Entity as Flock, Model as FlockModel};
pub use health_record::{
    Column as HealthRecordColumn, Entity as HealthRecord, Model as HealthRecordModel,
};
pub use inventory::{Column as InventoryColumn, Entity as Inventory, Model as InventoryModel};
pub use production::{Column as ProductionColumn, Entity as Production, Model as ProductionModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
