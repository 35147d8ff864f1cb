//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversion into domain types lives in the
//! repository modules that own each table.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{coffee_entries, companions, custom_coffee_types, entry_companions, users};

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Custom coffee types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = custom_coffee_types)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomTypeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub caffeine_mg: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `caffeine_mg` is written even when `None` so clearing it sticks.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = custom_coffee_types)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CustomTypeUpdate<'a> {
    pub name: &'a str,
    pub caffeine_mg: Option<i32>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Companions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = companions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CompanionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = companions)]
pub(crate) struct CompanionUpdate<'a> {
    pub name: &'a str,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Coffee entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = coffee_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub coffee_type: Option<String>,
    pub custom_type_id: Option<Uuid>,
    pub size: String,
    pub caffeine_mg: i32,
    pub notes: Option<String>,
    pub consumed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full replacement of the mutable entry columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = coffee_entries)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EntryUpdate<'a> {
    pub coffee_type: Option<&'a str>,
    pub custom_type_id: Option<Uuid>,
    pub size: &'a str,
    pub caffeine_mg: i32,
    pub notes: Option<&'a str>,
    pub consumed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = entry_companions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EntryCompanionRow {
    pub entry_id: Uuid,
    pub companion_id: Uuid,
}
