//! PostgreSQL-backed `UserRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{
    Email, PasswordHash, User, UserAccount, UserId, UserValidationError, Username,
};
use crate::query_optional;

use super::diesel_helpers::RepositoryFailure;
use super::models::{NewUserRow, UserRow};
use super::pool::DbPool;
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_account(row: UserRow) -> Result<UserAccount, UserPersistenceError> {
    let id = row.id;
    let corrupt = move |err: UserValidationError| {
        UserPersistenceError::query(format!("invalid user row {id}: {err}"))
    };
    let user = User {
        id: UserId::from(id),
        email: Email::new(&row.email).map_err(corrupt)?,
        username: Username::new(&row.username).map_err(corrupt)?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(UserAccount {
        user,
        password_hash: PasswordHash::new(row.password_hash),
    })
}

fn claim_unique_violation(constraint: Option<&str>) -> Option<UserPersistenceError> {
    match constraint {
        Some(EMAIL_CONSTRAINT) => Some(UserPersistenceError::duplicate_email()),
        Some(USERNAME_CONSTRAINT) => Some(UserPersistenceError::duplicate_username()),
        _ => None,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, account: &UserAccount) -> Result<(), UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(UserPersistenceError::from_pool)?;
        let user = &account.user;
        let row = NewUserRow {
            id: *user.id.as_uuid(),
            email: user.email.as_ref(),
            username: user.username.as_ref(),
            password_hash: account.password_hash.as_str(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(|err| UserPersistenceError::from_diesel_write(err, claim_unique_violation))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let account: Option<UserAccount> = query_optional!(
            self,
            UserPersistenceError,
            users::table,
            users::id.eq(id.as_uuid()),
            UserRow,
            row_to_account
        )?;
        Ok(account.map(|account| account.user))
    }

    async fn find_account_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        query_optional!(
            self,
            UserPersistenceError,
            users::table,
            users::email.eq(email),
            UserRow,
            row_to_account
        )
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(UserPersistenceError::from_pool)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::email.eq(email.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(UserPersistenceError::from_diesel)
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(UserPersistenceError::from_pool)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::username.eq(username.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(UserPersistenceError::from_diesel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use uuid::Uuid;

    fn row(email: &str, username: &str) -> UserRow {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().expect("valid");
        UserRow {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            username: username.to_owned(),
            password_hash: "$2b$04$hash".to_owned(),
            created_at: at,
            updated_at: at,
        }
    }

    #[rstest]
    fn rows_convert_to_accounts() {
        let account = row_to_account(row("ada@example.com", "ada")).expect("valid row");

        assert_eq!(account.user.email.as_ref(), "ada@example.com");
        assert_eq!(account.password_hash.as_str(), "$2b$04$hash");
    }

    #[rstest]
    fn corrupt_rows_are_query_errors() {
        let error = row_to_account(row("not-an-email", "ada")).expect_err("corrupt");

        assert!(matches!(error, UserPersistenceError::Query { .. }));
    }

    #[rstest]
    #[case(Some(EMAIL_CONSTRAINT), Some(UserPersistenceError::DuplicateEmail))]
    #[case(Some(USERNAME_CONSTRAINT), Some(UserPersistenceError::DuplicateUsername))]
    #[case(Some("users_pkey"), None)]
    #[case(None, None)]
    fn unique_constraints_map_to_duplicates(
        #[case] constraint: Option<&str>,
        #[case] expected: Option<UserPersistenceError>,
    ) {
        assert_eq!(claim_unique_violation(constraint), expected);
    }
}
