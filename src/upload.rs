//! 图片上传处理器：类型白名单、大小限制与原子落盘。

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Extension, Multipart};
use axum::http::StatusCode;
use axum::response::Json as JsonResponse;
use futures_util::stream::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::atomic::AtomicFile;
use crate::config::{ALLOWED_IMAGE_TYPES, IMAGE_FIELD};
use crate::documents::SavedResponse;
use crate::error::ApiError;
use crate::storage::{Area, Storage};

const TYPE_NOT_ALLOWED: &str = "Only .png, .jpeg, and .jpg files are allowed!";
const TOO_LARGE: &str = "File too large";

#[derive(Debug)]
pub struct UploadConfig {
    pub max_file_size: u64,
}

/// Per-destination wording of the upload responses.
struct Destination {
    area: Area,
    saved: &'static str,
    missing: &'static str,
}

const IMAGES: Destination = Destination {
    area: Area::Images,
    saved: "File uploaded successfully",
    missing: "No file uploaded or file type is not .png",
};

const SPECIAL_IMAGES: Destination = Destination {
    area: Area::SpecialImages,
    saved: "Special image uploaded successfully",
    missing: "No file uploaded or file type is not allowed",
};

/// 上传通用图片。
pub async fn upload_image(
    Extension(storage): Extension<Arc<Storage>>,
    Extension(upload): Extension<Arc<UploadConfig>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<JsonResponse<SavedResponse>, ApiError> {
    receive(&storage, &upload, &IMAGES, multipart).await
}

/// 上传 special 图片。
pub async fn upload_special_image(
    Extension(storage): Extension<Arc<Storage>>,
    Extension(upload): Extension<Arc<UploadConfig>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<JsonResponse<SavedResponse>, ApiError> {
    receive(&storage, &upload, &SPECIAL_IMAGES, multipart).await
}

async fn receive(
    storage: &Storage,
    upload: &UploadConfig,
    destination: &Destination,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<JsonResponse<SavedResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!(error = %rejection, "upload is not multipart");
        ApiError::BadRequest(destination.missing.into())
    })?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            debug!(field = field.name().unwrap_or(""), "skip multipart field");
            continue;
        }
        let filename = store_field(storage, upload, destination.area, field, destination.missing)
            .await?;
        return Ok(JsonResponse(SavedResponse {
            message: destination.saved,
            filename,
        }));
    }

    Err(ApiError::BadRequest(destination.missing.into()))
}

async fn store_field(
    storage: &Storage,
    upload: &UploadConfig,
    area: Area,
    mut field: Field<'_>,
    missing: &str,
) -> Result<String, ApiError> {
    let Some(filename) = field.file_name().and_then(client_file_name) else {
        return Err(ApiError::BadRequest(missing.into()));
    };
    let content_type = field.content_type().unwrap_or("").to_ascii_lowercase();
    if !ALLOWED_IMAGE_TYPES.contains(&content_type.as_str()) {
        warn!(content_type, "rejected upload type");
        return Err(ApiError::BadRequest(TYPE_NOT_ALLOWED.into()));
    }
    let target = storage
        .resolve(area, &filename)
        .map_err(ApiError::from_write)?;

    let mut atomic = AtomicFile::new(&target)
        .await
        .map_err(|err| ApiError::from_write(err.into()))?;
    let write_result: Result<(), ApiError> = async {
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(multipart_error)?;
            if atomic.written() + chunk.len() as u64 > upload.max_file_size {
                warn!(filename, limit = upload.max_file_size, "rejected oversized upload");
                return Err(ApiError::PayloadTooLarge(TOO_LARGE.into()));
            }
            atomic
                .write(&chunk)
                .await
                .map_err(|err| ApiError::from_write(err.into()))?;
        }
        Ok(())
    }
    .await;
    if let Err(err) = write_result {
        atomic.cleanup().await;
        return Err(err);
    }
    let size = atomic.written();
    atomic
        .finalize()
        .await
        .map_err(|err| ApiError::from_write(err.into()))?;

    info!(filename, size, area = ?area, "stored upload");
    Ok(filename)
}

/// Last path component of the client-supplied filename; browsers on some
/// platforms send the full local path.
fn client_file_name(raw: &str) -> Option<String> {
    raw.rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn multipart_error(err: MultipartError) -> ApiError {
    warn!(error = %err, "multipart stream failed");
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(TOO_LARGE.into())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::client_file_name;

    #[test]
    fn client_paths_are_reduced_to_file_name() {
        assert_eq!(client_file_name("pic.png").as_deref(), Some("pic.png"));
        assert_eq!(client_file_name("dir/pic.png").as_deref(), Some("pic.png"));
        assert_eq!(client_file_name("C:\\x\\pic.png").as_deref(), Some("pic.png"));
        assert_eq!(client_file_name(""), None);
        assert_eq!(client_file_name("dir/"), None);
    }
}
