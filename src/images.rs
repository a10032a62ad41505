//! 图片读取处理器。

use axum::body::Body as AxumBody;
use axum::extract::{Extension, Path};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use httpdate::fmt_http_date;
use std::sync::Arc;
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{error, info};

use crate::error::{ApiError, PlainApiError, SEND_FAILED};
use crate::storage::{Area, Storage};

/// 读取通用图片。
pub async fn show_image(
    Path(name): Path<String>,
    Extension(storage): Extension<Arc<Storage>>,
) -> Result<Response, PlainApiError> {
    serve(&storage, Area::Images, &name).await
}

/// 读取 special 图片。
pub async fn show_special_image(
    Path(name): Path<String>,
    Extension(storage): Extension<Arc<Storage>>,
) -> Result<Response, PlainApiError> {
    serve(&storage, Area::SpecialImages, &name).await
}

async fn serve(storage: &Storage, area: Area, name: &str) -> Result<Response, PlainApiError> {
    let (path, metadata) = storage
        .open_image(area, name)
        .await
        .map_err(|err| ApiError::from_storage(err, SEND_FAILED))?;
    let file = File::open(&path).await.map_err(|err| {
        error!(error = %err, name, "failed to open image");
        ApiError::Internal(SEND_FAILED.into())
    })?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.essence_str())
            .map_err(|_| ApiError::Internal("invalid mime type".into()))?,
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()));
    if let Ok(modified) = metadata.modified()
        && let Ok(value) = HeaderValue::from_str(&fmt_http_date(modified))
    {
        headers.insert(header::LAST_MODIFIED, value);
    }

    info!(name, size = metadata.len(), area = ?area, "serve image");
    Ok((
        StatusCode::OK,
        headers,
        AxumBody::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}
