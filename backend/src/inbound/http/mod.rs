//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod companions;
pub mod custom_types;
pub mod entries;
pub mod error;
pub mod health;
pub mod routes;
pub mod schemas;
pub mod state;
pub mod stats;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;
