//! Serves stored order photos.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use pandi_dorty_core::PhotoId;

use super::parse_id;
use crate::db::PhotoRepository;
use crate::error::AppError;
use crate::state::AppState;

/// Photo bytes with long-lived caching; stored photos never change.
pub async fn show(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, AppError> {
    let id: PhotoId = parse_id(&raw_id, "photo")?;
    let photo = PhotoRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Fotografie nebyla nalezena".to_owned()))?;

    let headers = [
        (header::CONTENT_TYPE, photo.meta.mime_type.clone()),
        (header::CONTENT_LENGTH, photo.bytes.len().to_string()),
        (header::CACHE_CONTROL, "public, max-age=31536000".to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!(
                "inline; filename=\"{}\"",
                header_safe_filename(&photo.meta.original_name)
            ),
        ),
    ];

    Ok((headers, photo.bytes).into_response())
}

/// Replace characters that cannot appear in a quoted header filename.
fn header_safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && !matches!(c, '"' | '\\')) {
                c
            } else {
                '_'
            }
        })
        .collect()
}
