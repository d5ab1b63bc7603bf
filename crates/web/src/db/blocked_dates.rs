//! Blocked delivery dates.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use pandi_dorty_core::{AdminUserId, BlockedDateId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::BlockedDate;

#[derive(Debug, sqlx::FromRow)]
struct BlockedDateRow {
    id: i32,
    date: NaiveDate,
    created_by_id: Option<i32>,
    created_by_name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BlockedDateRow> for BlockedDate {
    fn from(row: BlockedDateRow) -> Self {
        Self {
            id: BlockedDateId::new(row.id),
            date: row.date,
            created_by: row.created_by_id.map(AdminUserId::new),
            created_by_name: row.created_by_name,
            created_at: row.created_at,
        }
    }
}

/// Repository for blocked dates.
pub struct BlockedDateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlockedDateRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All blocked dates with the name of the admin who added them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<BlockedDate>, RepositoryError> {
        let rows = sqlx::query_as::<_, BlockedDateRow>(
            r"
            SELECT b.id, b.date, b.created_by_id, a.name AS created_by_name, b.created_at
            FROM bakery.blocked_date b
            LEFT JOIN bakery.admin_user a ON a.id = b.created_by_id
            ORDER BY b.date
            ",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Blocked dates on or after `from`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_from(&self, from: NaiveDate) -> Result<Vec<NaiveDate>, RepositoryError> {
        let dates = sqlx::query_scalar(
            "SELECT date FROM bakery.blocked_date WHERE date >= $1 ORDER BY date",
        )
        .bind(from)
        .fetch_all(self.pool)
        .await?;
        Ok(dates)
    }

    /// Whether deliveries are blocked on `date`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_blocked(&self, date: NaiveDate) -> Result<bool, RepositoryError> {
        let blocked = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM bakery.blocked_date WHERE date = $1)",
        )
        .bind(date)
        .fetch_one(self.pool)
        .await?;
        Ok(blocked)
    }

    /// Block a date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the date is already blocked.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add(
        &self,
        date: NaiveDate,
        created_by: AdminUserId,
    ) -> Result<BlockedDate, RepositoryError> {
        let row = sqlx::query_as::<_, BlockedDateRow>(
            r"
            WITH inserted AS (
                INSERT INTO bakery.blocked_date (date, created_by_id)
                VALUES ($1, $2)
                RETURNING id, date, created_by_id, created_at
            )
            SELECT i.id, i.date, i.created_by_id, a.name AS created_by_name, i.created_at
            FROM inserted i
            LEFT JOIN bakery.admin_user a ON a.id = i.created_by_id
            ",
        )
        .bind(date)
        .bind(created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "blocked date"))?;
        Ok(row.into())
    }

    /// Unblock a date.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such blocked date exists.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, id: BlockedDateId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bakery.blocked_date WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
