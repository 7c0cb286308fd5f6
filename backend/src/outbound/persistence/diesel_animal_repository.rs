//! PostgreSQL-backed `AnimalRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{AnimalRepository, AnimalRepositoryError};
use crate::domain::{Animal, AnimalCandidate, AnimalId, NewAnimal};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{AnimalRow, AnimalWrite};
use super::pool::{DbPool, PoolError};
use super::schema::animals;

/// Diesel-backed implementation of the animal repository port.
#[derive(Clone)]
pub struct DieselAnimalRepository {
    pool: DbPool,
}

impl DieselAnimalRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AnimalRepositoryError {
    map_basic_pool_error(error, |message| AnimalRepositoryError::connection(message))
}

fn map_diesel_error(error: diesel::result::Error) -> AnimalRepositoryError {
    map_basic_diesel_error(
        error,
        AnimalRepositoryError::query,
        AnimalRepositoryError::connection,
    )
}

fn to_write(animal: &NewAnimal) -> AnimalWrite<'_> {
    AnimalWrite {
        name: animal.name().as_ref(),
        picture_url: animal.picture_url().map(url::Url::as_str),
    }
}

/// Convert a database row into a validated domain animal.
fn row_to_animal(row: AnimalRow) -> Result<Animal, AnimalRepositoryError> {
    let AnimalRow {
        id,
        name,
        picture_url,
    } = row;
    let id = AnimalId::new(id).map_err(|err| AnimalRepositoryError::query(err.to_string()))?;
    let animal = NewAnimal::try_from(AnimalCandidate {
        name: Some(name),
        picture_url,
    })
    .map_err(|err| AnimalRepositoryError::query(format!("stored animal {id}: {err}")))?;
    Ok(animal.with_id(id))
}

#[async_trait]
impl AnimalRepository for DieselAnimalRepository {
    async fn create(&self, animal: &NewAnimal) -> Result<Animal, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::insert_into(animals::table)
            .values(&to_write(animal))
            .returning(AnimalRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_animal(row)
    }

    async fn update(
        &self,
        id: AnimalId,
        animal: &NewAnimal,
    ) -> Result<Option<Animal>, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = diesel::update(animals::table.filter(animals::id.eq(id.value())))
            .set(&to_write(animal))
            .returning(AnimalRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_animal).transpose()
    }

    async fn find_by_id(&self, id: AnimalId) -> Result<Option<Animal>, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = animals::table
            .filter(animals::id.eq(id.value()))
            .select(AnimalRow::as_select())
            .first::<AnimalRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_animal).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Animal>, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<AnimalRow> = animals::table
            .order(animals::id.asc())
            .select(AnimalRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_animal).collect()
    }

    async fn delete(&self, id: AnimalId) -> Result<bool, AnimalRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(animals::table.filter(animals::id.eq(id.value())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn row_with_picture_converts() {
        let animal = row_to_animal(AnimalRow {
            id: 4,
            name: "Lynx".to_owned(),
            picture_url: Some("https://example.org/lynx.png".to_owned()),
        })
        .expect("valid row");

        assert_eq!(animal.id().value(), 4);
        assert_eq!(
            animal.picture_url().map(url::Url::as_str),
            Some("https://example.org/lynx.png")
        );
    }

    #[rstest]
    #[case::blank_name(1, "  ")]
    #[case::bad_id(0, "Lynx")]
    fn corrupt_rows_surface_as_query_errors(#[case] id: i64, #[case] name: &str) {
        let err = row_to_animal(AnimalRow {
            id,
            name: name.to_owned(),
            picture_url: None,
        })
        .expect_err("corrupt row");

        assert!(matches!(err, AnimalRepositoryError::Query { .. }));
    }
}
