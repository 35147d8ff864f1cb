//! Port for user-defined coffee type persistence.
//!
//! Deleting a custom type must leave referencing entries in place with their
//! reference cleared and their stored caffeine untouched.

use async_trait::async_trait;

use crate::domain::{CustomCoffeeType, CustomTypeId, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by custom type repository adapters.
    pub enum CustomTypeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "custom type repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "custom type repository query failed: {message}",
        /// The owner already has a custom type with this name.
        DuplicateName { name: String } => "custom type name already in use: {name}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomTypeRepository: Send + Sync {
    /// Persist a new custom type.
    async fn insert(&self, custom_type: &CustomCoffeeType)
    -> Result<(), CustomTypeRepositoryError>;

    /// All custom types owned by `user_id`, ordered by name.
    async fn list(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<CustomCoffeeType>, CustomTypeRepositoryError>;

    /// Fetch one owned custom type.
    async fn find(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
    ) -> Result<Option<CustomCoffeeType>, CustomTypeRepositoryError>;

    /// Overwrite the stored row; `false` when no owned row matched.
    async fn update(
        &self,
        custom_type: &CustomCoffeeType,
    ) -> Result<bool, CustomTypeRepositoryError>;

    /// Delete an owned custom type; `false` when nothing matched.
    async fn delete(
        &self,
        user_id: &UserId,
        id: &CustomTypeId,
    ) -> Result<bool, CustomTypeRepositoryError>;
}
