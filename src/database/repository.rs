use sqlx::{postgres::PgRow, FromRow, PgPool};

use crate::api::PageParams;
use crate::database::manager::{DatabaseError, DatabaseManager};

/// Read and delete access to one table or view, decoding rows into `T`.
///
/// Table and column names are validated identifiers and are the only text
/// spliced into SQL; every value is bound.
pub struct Repository<T> {
    table_name: &'static str,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    pub fn new(table_name: &'static str, pool: PgPool) -> Result<Self, DatabaseError> {
        check_identifier(table_name)?;
        Ok(Self {
            table_name,
            pool,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// One page of rows, newest first, optionally filtered by a
    /// case-insensitive substring match on `search_column`. Returns the rows
    /// and the total number of matches.
    pub async fn paginate(&self, search_column: &str, params: &PageParams) -> Result<(Vec<T>, i64), DatabaseError> {
        check_identifier(search_column)?;

        if params.search.is_empty() {
            let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table_name))
                .fetch_one(&self.pool)
                .await?;

            let rows = sqlx::query_as::<_, T>(&format!(
                "SELECT * FROM {} ORDER BY id DESC LIMIT $1 OFFSET $2",
                self.table_name
            ))
            .bind(params.limit)
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

            return Ok((rows, total));
        }

        let pattern = params.like_pattern();

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {} WHERE {} ILIKE $1",
            self.table_name, search_column
        ))
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, T>(&format!(
            "SELECT * FROM {} WHERE {} ILIKE $1 ORDER BY id DESC LIMIT $2 OFFSET $3",
            self.table_name, search_column
        ))
        .bind(&pattern)
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    pub async fn find(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        let row = sqlx::query_as::<_, T>(&format!("SELECT * FROM {} WHERE id = $1", self.table_name))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Like `find`, but absence is `DatabaseError::NotFound(not_found)`
    pub async fn find_or(&self, id: i64, not_found: &str) -> Result<T, DatabaseError> {
        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(not_found.to_string()))
    }

    /// First row where `column = value`
    pub async fn find_by(&self, column: &str, value: &str) -> Result<Option<T>, DatabaseError> {
        check_identifier(column)?;
        let row = sqlx::query_as::<_, T>(&format!(
            "SELECT * FROM {} WHERE {} = $1 LIMIT 1",
            self.table_name, column
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Every row, newest first
    pub async fn all(&self) -> Result<Vec<T>, DatabaseError> {
        let rows = sqlx::query_as::<_, T>(&format!("SELECT * FROM {} ORDER BY id DESC", self.table_name))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// The `n` newest rows
    pub async fn latest(&self, n: i64) -> Result<Vec<T>, DatabaseError> {
        let rows = sqlx::query_as::<_, T>(&format!(
            "SELECT * FROM {} ORDER BY id DESC LIMIT $1",
            self.table_name
        ))
        .bind(n)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn count(&self) -> Result<i64, DatabaseError> {
        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", self.table_name))
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Delete by id. Returns false when no row matched.
    pub async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", self.table_name))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn check_identifier(name: &str) -> Result<(), DatabaseError> {
    if DatabaseManager::is_valid_identifier(name) {
        Ok(())
    } else {
        Err(DatabaseError::InvalidIdentifier(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(FromRow)]
    struct Row {
        #[allow(dead_code)]
        id: i64,
    }

    #[tokio::test]
    async fn rejects_unsafe_table_names() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();

        assert!(Repository::<Row>::new("posts", pool.clone()).is_ok());
        assert!(matches!(
            Repository::<Row>::new("posts; DROP TABLE users", pool),
            Err(DatabaseError::InvalidIdentifier(_))
        ));
    }
}
