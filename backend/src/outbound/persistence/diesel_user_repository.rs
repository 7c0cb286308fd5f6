//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Logins are unique at the database level; the constraint violation is
//! surfaced as [`UserRepositoryError::DuplicateLogin`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::{NewUser, User, UserCandidate, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, |message| UserRepositoryError::connection(message))
}

fn map_diesel_error(error: DieselError) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

fn map_insert_error(error: DieselError, login: &str) -> UserRepositoryError {
    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserRepositoryError::duplicate_login(login)
        }
        other => map_diesel_error(other),
    }
}

/// Convert a database row into a validated domain user.
pub(super) fn row_to_user(row: UserRow) -> Result<User, UserRepositoryError> {
    let UserRow { id, login, email } = row;
    let id = UserId::new(id).map_err(|err| UserRepositoryError::query(err.to_string()))?;
    let user = NewUser::try_from(UserCandidate {
        login: Some(login),
        email,
    })
    .map_err(|err| UserRepositoryError::query(format!("stored user {id}: {err}")))?;
    Ok(user.with_id(id))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let login = user.login().as_ref();

        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                login,
                email: user.email().map(AsRef::as_ref),
            })
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_insert_error(err, login))?;

        row_to_user(row)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::id.eq(id.value()))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn unique_violation_maps_to_duplicate_login() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value violates unique constraint".to_owned()),
        );

        let mapped = map_insert_error(error, "ada");

        assert_eq!(mapped, UserRepositoryError::duplicate_login("ada"));
    }

    #[rstest]
    fn other_insert_failures_stay_query_errors() {
        let mapped = map_insert_error(DieselError::NotFound, "ada");

        assert!(matches!(mapped, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_with_email_converts() {
        let user = row_to_user(UserRow {
            id: 3,
            login: "ada".to_owned(),
            email: Some("ada@example.org".to_owned()),
        })
        .expect("valid row");

        assert_eq!(user.login().as_ref(), "ada");
        assert_eq!(user.email().map(AsRef::as_ref), Some("ada@example.org"));
    }
}
