//! Multipart photo intake.
//!
//! Photos arrive as multipart forms with an `image` part plus optional text
//! parts. Bytes land under the configured upload directory; only the path is
//! persisted.

use axum::extract::Multipart;
use inspect_core::FieldErrors;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub description: String,
    pub location: String,
}

/// Drain a multipart form into a [`PhotoUpload`]. The `image` part is
/// required; oversized or missing images are a validation failure.
pub async fn read_photo(multipart: &mut Multipart, max_bytes: usize) -> ApiResult<PhotoUpload> {
    let mut upload = PhotoUpload {
        file_name: String::new(),
        bytes: Vec::new(),
        description: String::new(),
        location: String::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("image") => {
                upload.file_name = field.file_name().unwrap_or("photo.jpg").to_string();
                upload.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read image: {e}")))?
                    .to_vec();
            }
            Some("description") => {
                upload.description = field.text().await.unwrap_or_default();
            }
            Some("location") => {
                upload.location = field.text().await.unwrap_or_default();
            }
            _ => {}
        }
    }

    if upload.bytes.is_empty() {
        let mut errors = FieldErrors::new();
        errors.add("image", "an image file is required");
        return Err(errors.into());
    }
    if upload.bytes.len() > max_bytes {
        let mut errors = FieldErrors::new();
        errors.add("image", format!("image exceeds the {max_bytes} byte limit"));
        return Err(errors.into());
    }
    Ok(upload)
}

/// Write the image under `<upload_dir>/<subdir>/` with a generated name and
/// return the stored path.
pub async fn store_photo(upload_dir: &str, subdir: &str, upload: &PhotoUpload) -> ApiResult<String> {
    let extension = std::path::Path::new(&upload.file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("jpg");
    let dir = format!("{upload_dir}/{subdir}");
    tokio::fs::create_dir_all(&dir).await?;
    let path = format!("{dir}/{}.{extension}", Uuid::new_v4());
    tokio::fs::write(&path, &upload.bytes).await?;
    Ok(path)
}

/// Best-effort removal of a stored photo file; the row delete already
/// happened, a missing file is not an error.
pub async fn remove_photo(path: &str) {
    let _ = tokio::fs::remove_file(path).await;
}
