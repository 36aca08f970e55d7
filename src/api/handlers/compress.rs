use crate::AppState;
use crate::api::error::AppError;
use crate::services::compression::FileKind;
use crate::utils::validation::{display_filename, normalized_extension};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartRejection},
    },
};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

const SUCCESS_MESSAGE: &str = "File compressed successfully!";

#[derive(Serialize, ToSchema)]
pub struct CompressResponse {
    pub message: String,
    /// URL of the compressed artifact, e.g. `/uploads/compressed/<id>.jpg`
    pub file: String,
}

/// Multipart form accepted by `/compress`
#[derive(ToSchema)]
pub struct CompressUpload {
    /// JPEG, PNG or PDF, at most 10 MB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/compress",
    request_body(content = CompressUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File compressed", body = CompressResponse),
        (status = 400, description = "Unsupported file type", body = String, content_type = "text/plain"),
        (status = 413, description = "Upload exceeds the size limit", body = String, content_type = "text/plain"),
        (status = 500, description = "Upload or compression failed", body = String, content_type = "text/plain")
    ),
    tag = "compress"
)]
pub async fn compress_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<CompressResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::Upload(e.body_text()))?;

    // One id per request names both the staged upload and its output
    let id = Uuid::new_v4();
    let mut staged: Option<(PathBuf, FileKind)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(AppError::from_multipart)?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        let ext = normalized_extension(&original).unwrap_or_default();
        let kind = FileKind::from_extension(&ext).ok_or(AppError::UnsupportedFileType)?;

        info!(
            "📥 Upload {} received: '{}' ({:?})",
            id,
            display_filename(&original),
            kind
        );

        let path = stage_field(&state, field, &id, &ext).await?;
        staged = Some((path, kind));
        break;
    }

    let (path, kind) = staged.ok_or_else(|| {
        AppError::Upload("no file field named `file` in form".to_string())
    })?;

    let compressed = state.compressor.compress(path, kind, id).await?;

    let file = state
        .storage
        .public_url(&compressed.path)
        .ok_or_else(|| AppError::Upload("compressed file has no usable name".to_string()))?;

    Ok(Json(CompressResponse {
        message: SUCCESS_MESSAGE.to_string(),
        file,
    }))
}

/// Stream a multipart field to a new staging file, chunk by chunk.
async fn stage_field(
    state: &AppState,
    mut field: Field<'_>,
    id: &Uuid,
    ext: &str,
) -> Result<PathBuf, AppError> {
    let (path, mut file) = state
        .storage
        .create_staging_file(id, ext)
        .await
        .map_err(AppError::Save)?;

    let mut written: u64 = 0;
    while let Some(chunk) = field.chunk().await.map_err(AppError::from_multipart)? {
        file.write_all(&chunk).await.map_err(AppError::Write)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(AppError::Write)?;

    info!("💾 Staged {} bytes at {}", written, path.display());
    Ok(path)
}
