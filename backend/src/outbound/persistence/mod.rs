//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL through `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   types. Ownership checks are part of every `WHERE` clause; everything
//!   else is the services' business.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Typed errors**: Diesel and pool failures map onto each port's
//!   `Connection`/`Query` variants; unique constraints become the port's
//!   duplicate variants.
//!
//! ```ignore
//! use brewlog::outbound::persistence::{DbPool, DieselEntryRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/brewlog")).await?;
//! let entries = DieselEntryRepository::new(pool);
//! ```

mod diesel_companion_repository;
mod diesel_custom_type_repository;
mod diesel_entry_repository;
pub(crate) mod diesel_helpers;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_companion_repository::DieselCompanionRepository;
pub use diesel_custom_type_repository::DieselCustomTypeRepository;
pub use diesel_entry_repository::DieselEntryRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
