//! Photo repository. Image bytes are stored base64 encoded.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pandi_dorty_core::{OrderId, PhotoId};

use super::RepositoryError;
use crate::models::{NewPhoto, Photo, PhotoMeta};

const META_COLUMNS: &str = "id, order_id, original_name, mime_type, file_size, uploaded_at";

#[derive(Debug, sqlx::FromRow)]
struct PhotoMetaRow {
    id: i32,
    order_id: i32,
    original_name: String,
    mime_type: String,
    file_size: i32,
    uploaded_at: DateTime<Utc>,
}

impl From<PhotoMetaRow> for PhotoMeta {
    fn from(row: PhotoMetaRow) -> Self {
        Self {
            id: PhotoId::new(row.id),
            order_id: OrderId::new(row.order_id),
            original_name: row.original_name,
            mime_type: row.mime_type,
            file_size: row.file_size,
            uploaded_at: row.uploaded_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PhotoRow {
    #[sqlx(flatten)]
    meta: PhotoMetaRow,
    image_data: String,
}

impl TryFrom<PhotoRow> for Photo {
    type Error = RepositoryError;

    fn try_from(row: PhotoRow) -> Result<Self, Self::Error> {
        let bytes = BASE64.decode(row.image_data.as_bytes()).map_err(|e| {
            RepositoryError::DataCorruption(format!("photo {}: invalid base64: {e}", row.meta.id))
        })?;
        Ok(Self {
            meta: row.meta.into(),
            bytes,
        })
    }
}

/// Repository for order photos.
pub struct PhotoRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PhotoRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Store a photo for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        order_id: OrderId,
        photo: &NewPhoto,
    ) -> Result<PhotoMeta, RepositoryError> {
        let size = i32::try_from(photo.bytes().len()).unwrap_or(i32::MAX);
        let sql = format!(
            r"
            INSERT INTO bakery.order_photo (order_id, original_name, mime_type, file_size, image_data)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {META_COLUMNS}
            "
        );
        let row = sqlx::query_as::<_, PhotoMetaRow>(&sql)
            .bind(order_id)
            .bind(photo.original_name())
            .bind(photo.mime_type())
            .bind(size)
            .bind(BASE64.encode(photo.bytes()))
            .fetch_one(self.pool)
            .await?;
        Ok(row.into())
    }

    /// Get a photo with its bytes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored data is not base64.
    pub async fn get(&self, id: PhotoId) -> Result<Option<Photo>, RepositoryError> {
        let sql = format!("SELECT {META_COLUMNS}, image_data FROM bakery.order_photo WHERE id = $1");
        let row = sqlx::query_as::<_, PhotoRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Metadata of all photos of the given orders, without image data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_orders(
        &self,
        order_ids: &[OrderId],
    ) -> Result<Vec<PhotoMeta>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = order_ids.iter().map(|id| id.as_i32()).collect();
        let sql = format!(
            "SELECT {META_COLUMNS} FROM bakery.order_photo WHERE order_id = ANY($1) ORDER BY id"
        );
        let rows = sqlx::query_as::<_, PhotoMetaRow>(&sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
