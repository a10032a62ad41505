//! 统一的 API 错误类型与转换。

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::io::ErrorKind;
use tracing::error;

use crate::storage::StorageError;

pub const FILE_NOT_FOUND: &str = "File not found";
pub const READ_FAILED: &str = "Error reading the file";
pub const PARSE_FAILED: &str = "Error parsing JSON";
pub const SAVE_FAILED: &str = "Error saving the file";
pub const SEND_FAILED: &str = "Error sending file";

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    PayloadTooLarge(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::Internal(msg) => msg,
        }
    }

    /// 将存储错误映射为 API 错误，内部错误统一使用 `internal` 文案。
    pub fn from_storage(err: StorageError, internal: &str) -> Self {
        match err {
            StorageError::InvalidName => ApiError::BadRequest("invalid name".into()),
            StorageError::Io(err) if err.kind() == ErrorKind::NotFound => {
                ApiError::NotFound(FILE_NOT_FOUND.into())
            }
            StorageError::Io(err) => {
                error!(error = %err, "{internal}");
                ApiError::Internal(internal.into())
            }
            StorageError::Parse(err) => {
                error!(error = %err, "stored document is not valid json");
                ApiError::Internal(PARSE_FAILED.into())
            }
        }
    }

    /// 写入路径的错误映射：除非法名称外一律视为保存失败。
    pub fn from_write(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName => ApiError::BadRequest("invalid name".into()),
            StorageError::Io(err) => {
                error!(error = %err, "{SAVE_FAILED}");
                ApiError::Internal(SAVE_FAILED.into())
            }
            StorageError::Parse(err) => {
                error!(error = %err, "{SAVE_FAILED}");
                ApiError::Internal(SAVE_FAILED.into())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (
            status,
            Json(ErrorBody {
                error: self.message(),
            }),
        )
            .into_response()
    }
}

/// 以纯文本返回错误内容（图片路由使用）。
#[derive(Debug)]
pub struct PlainApiError(pub ApiError);

impl From<ApiError> for PlainApiError {
    fn from(err: ApiError) -> Self {
        PlainApiError(err)
    }
}

impl IntoResponse for PlainApiError {
    fn into_response(self) -> Response {
        let PlainApiError(err) = self;
        (err.status(), err.message().to_string()).into_response()
    }
}
