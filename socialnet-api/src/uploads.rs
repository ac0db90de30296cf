/// Multipart form parsing and image storage
///
/// Uploaded images are written to the configured upload directory under a
/// generated name, `<uuid>.<ext>`; the client's file name is only used for its
/// extension. The returned reference is the public path `/uploads/<name>`,
/// which the router serves read-only from the same directory.

use std::path::Path;

use axum::{body::Bytes, extract::Multipart};
use socialnet_shared::CoreError;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Public path prefix for stored uploads
pub const UPLOADS_ROUTE: &str = "/uploads";

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// An image file part
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Fields of the create-post form
#[derive(Debug, Default)]
pub struct PostForm {
    pub content: String,
    pub image: Option<ImageUpload>,
}

/// Lowercased extension if it is an accepted image type
pub fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();

    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Reads `content` and the optional `image` part
///
/// A file input left empty arrives as a part with no bytes; that counts as no
/// image. Unknown parts are skipped.
pub async fn read_post_form(mut multipart: Multipart) -> ApiResult<PostForm> {
    let mut form = PostForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "content" => form.content = field.text().await?,
            "image" => form.image = read_image(field).await?,
            other => debug!(field = other, "Skipping unknown form field"),
        }
    }

    Ok(form)
}

/// Reads the `image` part of an avatar form
pub async fn read_image_form(mut multipart: Multipart) -> ApiResult<Option<ImageUpload>> {
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            image = read_image(field).await?;
        }
    }

    Ok(image)
}

async fn read_image(field: axum::extract::multipart::Field<'_>) -> ApiResult<Option<ImageUpload>> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let bytes = field.bytes().await?;

    if bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(ImageUpload { file_name, bytes }))
}

/// Writes an image under `dir` and returns its public reference
pub async fn save_image(dir: &Path, upload: &ImageUpload) -> ApiResult<String> {
    let ext = image_extension(&upload.file_name).ok_or_else(|| {
        ApiError::from(CoreError::invalid(
            "image",
            "Image must be a jpg, jpeg, png, gif or webp file",
        ))
    })?;

    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        error!("Failed to create upload directory {}: {}", dir.display(), e);
        ApiError::InternalError("Failed to store upload".to_string())
    })?;

    let name = format!("{}.{}", Uuid::new_v4(), ext);
    let path = dir.join(&name);

    let mut file = tokio::fs::File::create(&path).await.map_err(|e| {
        error!("Failed to create file {}: {}", path.display(), e);
        ApiError::InternalError("Failed to store upload".to_string())
    })?;
    file.write_all(&upload.bytes).await.map_err(|e| {
        error!("Failed to write file {}: {}", path.display(), e);
        ApiError::InternalError("Failed to store upload".to_string())
    })?;

    debug!(file = %name, size = upload.bytes.len(), "Stored upload");

    Ok(format!("{}/{}", UPLOADS_ROUTE, name))
}

/// Deletes an image stored by [`save_image`]
///
/// Used when the row referencing the upload could not be written. Failures are
/// logged and otherwise ignored.
pub async fn remove_image(dir: &Path, reference: &str) {
    let Some(name) = reference
        .strip_prefix(UPLOADS_ROUTE)
        .and_then(|rest| rest.strip_prefix('/'))
        .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && !name.contains(".."))
    else {
        warn!(reference = %reference, "Refusing to remove unrecognized upload reference");
        return;
    };

    let path = dir.join(name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => debug!(file = %name, "Removed orphaned upload"),
        Err(e) => warn!("Failed to remove upload {}: {}", path.display(), e),
    }
}
