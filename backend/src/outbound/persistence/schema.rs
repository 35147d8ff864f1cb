//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Registered accounts. `email` and `username` are unique.
    users (id) {
        id -> Uuid,
        email -> Varchar,
        username -> Varchar,
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// User-defined drinks with an optional base caffeine amount.
    ///
    /// `(user_id, name)` is unique.
    custom_coffee_types (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Varchar,
        caffeine_mg -> Nullable<Int4>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// People a user drinks coffee with. `(user_id, name)` is unique.
    companions (id) {
        id -> Uuid,
        user_id -> Uuid,
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Logged drinks.
    ///
    /// Exactly one of `coffee_type` and `custom_type_id` is set on write;
    /// deleting a custom type nulls `custom_type_id` and keeps the row.
    coffee_entries (id) {
        id -> Uuid,
        user_id -> Uuid,
        coffee_type -> Nullable<Varchar>,
        custom_type_id -> Nullable<Uuid>,
        size -> Varchar,
        caffeine_mg -> Int4,
        notes -> Nullable<Text>,
        consumed_at -> Timestamptz,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Join table between entries and companions.
    entry_companions (entry_id, companion_id) {
        entry_id -> Uuid,
        companion_id -> Uuid,
    }
}

diesel::joinable!(custom_coffee_types -> users (user_id));
diesel::joinable!(companions -> users (user_id));
diesel::joinable!(coffee_entries -> users (user_id));
diesel::joinable!(coffee_entries -> custom_coffee_types (custom_type_id));
diesel::joinable!(entry_companions -> coffee_entries (entry_id));
diesel::joinable!(entry_companions -> companions (companion_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    custom_coffee_types,
    companions,
    coffee_entries,
    entry_companions,
);
