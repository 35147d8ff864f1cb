//! Shared helpers and macros for Diesel repository implementations.
//!
//! Every repository error in the domain carries `Connection` and `Query`
//! variants; [`RepositoryFailure`] lets the helpers here build either one
//! without knowing which port they serve.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::{debug, warn};

use crate::domain::ports::{
    CompanionRepositoryError, CustomTypeRepositoryError, EntryRepositoryError,
    UserPersistenceError,
};

use super::pool::PoolError;

/// Repository error types the Diesel adapters can produce.
pub(crate) trait RepositoryFailure: Sized {
    fn connection_failure(message: String) -> Self;

    fn query_failure(message: String) -> Self;

    /// Map a pool checkout failure to a connection error.
    fn from_pool(error: PoolError) -> Self {
        Self::connection_failure(map_pool_error_message(error))
    }

    /// Map a Diesel failure, treating unique violations as query errors.
    fn from_diesel(error: DieselError) -> Self {
        Self::from_diesel_write(error, |_| None)
    }

    /// Map a Diesel failure, letting the caller claim unique violations.
    ///
    /// `on_unique` receives the violated constraint name when Postgres
    /// reports one; returning `None` falls back to a query error.
    fn from_diesel_write<F>(error: DieselError, on_unique: F) -> Self
    where
        F: FnOnce(Option<&str>) -> Option<Self>,
    {
        match &error {
            DieselError::DatabaseError(kind, info) => {
                debug!(?kind, message = info.message(), "diesel operation failed");
            }
            _ => debug!(
                error_type = %std::any::type_name_of_val(&error),
                "diesel operation failed"
            ),
        }

        match error {
            DieselError::NotFound => Self::query_failure("record not found".to_owned()),
            DieselError::QueryBuilderError(_) => {
                Self::query_failure("database query error".to_owned())
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                let constraint = info.constraint_name();
                on_unique(constraint).unwrap_or_else(|| {
                    warn!(
                        constraint_name = ?constraint,
                        "unrecognised unique violation"
                    );
                    Self::query_failure("duplicate record".to_owned())
                })
            }
            DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                Self::connection_failure("database connection error".to_owned())
            }
            _ => Self::query_failure("database error".to_owned()),
        }
    }
}

macro_rules! impl_repository_failure {
    ($($error:ty),* $(,)?) => {
        $(
            impl RepositoryFailure for $error {
                fn connection_failure(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_failure(message: String) -> Self {
                    Self::query(message)
                }
            }
        )*
    };
}

impl_repository_failure!(
    UserPersistenceError,
    EntryRepositoryError,
    CustomTypeRepositoryError,
    CompanionRepositoryError,
);

/// Extract a readable message from a pool error.
pub fn map_pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    }
}

/// Convert a stored non-negative integer column into its domain type.
pub(crate) fn non_negative<E: RepositoryFailure>(value: i32, column: &str) -> Result<u32, E> {
    u32::try_from(value)
        .map_err(|_| E::query_failure(format!("negative {column} in database: {value}")))
}

/// Convert a domain amount into an `INTEGER` column value.
pub(crate) fn to_column<E: RepositoryFailure>(value: u32, column: &str) -> Result<i32, E> {
    i32::try_from(value)
        .map_err(|_| E::query_failure(format!("{column} out of range: {value}")))
}

/// Convert a Postgres `COUNT`/`SUM` result into an unsigned total.
pub(crate) fn to_total(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Collect row conversion results, stopping at the first failure.
pub fn collect_rows<T, E>(results: impl Iterator<Item = Result<T, E>>) -> Result<Vec<T>, E> {
    results.collect()
}

/// Macro for query methods that return `Option<T>`.
///
/// Acquire a connection, run the filtered query, map errors through
/// `$error`'s [`RepositoryFailure`] impl, then convert the row with a
/// fallible `$converter`.
#[macro_export]
macro_rules! query_optional {
    (
        $self:ident,
        $error:ty,
        $table:expr,
        $filter:expr,
        $row_type:ty,
        $converter:expr
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::outbound::persistence::diesel_helpers::RepositoryFailure as _;

        let mut conn = $self.pool.get().await.map_err(<$error>::from_pool)?;

        let result: Option<$row_type> = $table
            .filter($filter)
            .select(<$row_type>::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(<$error>::from_diesel)?;

        result.map($converter).transpose()
    }};
}

/// Macro for query methods that return `Vec<T>`.
///
/// Same shape as [`query_optional!`] with an explicit ordering.
#[macro_export]
macro_rules! query_vec {
    (
        $self:ident,
        $error:ty,
        $table:expr,
        $filter:expr,
        $order_by:expr,
        $row_type:ty,
        $converter:expr
    ) => {{
        use diesel::prelude::*;
        use diesel_async::RunQueryDsl;
        use $crate::outbound::persistence::diesel_helpers::RepositoryFailure as _;
        use $crate::outbound::persistence::diesel_helpers::collect_rows;

        let mut conn = $self.pool.get().await.map_err(<$error>::from_pool)?;

        let rows: Vec<$row_type> = $table
            .filter($filter)
            .select(<$row_type>::as_select())
            .order_by($order_by)
            .load(&mut conn)
            .await
            .map_err(<$error>::from_diesel)?;

        collect_rows(rows.into_iter().map($converter))
    }};
}
