//! JSON 文档的读取与保存处理器。

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Json, Path};
use axum::response::Json as JsonResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{ApiError, READ_FAILED};
use crate::naming::{NamingConfig, largest_numbered};
use crate::storage::{Area, Storage};

const SAVED: &str = "File saved successfully";
const DATA_REQUIRED: &str = "JSON data is required";
const NAME_AND_DATA_REQUIRED: &str = "Filename and JSON data are required";

#[derive(Deserialize)]
pub(crate) struct DocumentBody {
    #[serde(rename = "JsonData")]
    json_data: Option<Value>,
}

#[derive(Deserialize)]
pub(crate) struct SpecialDocumentBody {
    filename: Option<String>,
    #[serde(rename = "JsonData")]
    json_data: Option<Value>,
}

#[derive(Serialize)]
pub(crate) struct SavedResponse {
    pub message: &'static str,
    pub filename: String,
}

/// 读取通用目录中的 JSON 文档。
pub async fn show_document(
    Path(name): Path<String>,
    Extension(storage): Extension<Arc<Storage>>,
) -> Result<JsonResponse<Value>, ApiError> {
    show(&storage, Area::Data, &name).await
}

/// 读取 special 目录中的 JSON 文档。
pub async fn show_special_document(
    Path(name): Path<String>,
    Extension(storage): Extension<Arc<Storage>>,
) -> Result<JsonResponse<Value>, ApiError> {
    show(&storage, Area::Special, &name).await
}

/// 以路径中的名称保存通用文档。
pub async fn save_named_document(
    Path(name): Path<String>,
    Extension(storage): Extension<Arc<Storage>>,
    payload: Result<Json<DocumentBody>, JsonRejection>,
) -> Result<JsonResponse<SavedResponse>, ApiError> {
    let Json(body) = payload.map_err(reject_body)?;
    let data = present(body.json_data).ok_or_else(|| ApiError::BadRequest(DATA_REQUIRED.into()))?;
    save(&storage, Area::Data, name, &data).await
}

/// 以请求体中的 `filename` 保存 special 文档。
pub async fn save_special_document(
    Extension(storage): Extension<Arc<Storage>>,
    payload: Result<Json<SpecialDocumentBody>, JsonRejection>,
) -> Result<JsonResponse<SavedResponse>, ApiError> {
    let Json(body) = payload.map_err(reject_body)?;
    let name = body.filename.filter(|name| !name.is_empty());
    let (Some(name), Some(data)) = (name, present(body.json_data)) else {
        return Err(ApiError::BadRequest(NAME_AND_DATA_REQUIRED.into()));
    };
    save(&storage, Area::Special, name, &data).await
}

/// 自动命名保存通用文档。
pub async fn save_auto_document(
    Extension(storage): Extension<Arc<Storage>>,
    Extension(naming): Extension<Arc<NamingConfig>>,
    payload: Result<Json<DocumentBody>, JsonRejection>,
) -> Result<JsonResponse<SavedResponse>, ApiError> {
    let Json(body) = payload.map_err(reject_body)?;
    let data = present(body.json_data)
        .ok_or_else(|| ApiError::BadRequest(NAME_AND_DATA_REQUIRED.into()))?;
    let largest = largest_numbered(&storage.dir(Area::Data))
        .await
        .map_err(|err| ApiError::from_write(err.into()))?;
    let name = naming.next_name(largest);
    save(&storage, Area::Data, name, &data).await
}

/// 按固定名称读取通用文档（用于被静态路由遮蔽的名称）。
pub async fn show_data_document(
    storage: &Storage,
    name: &str,
) -> Result<JsonResponse<Value>, ApiError> {
    show(storage, Area::Data, name).await
}

async fn show(storage: &Storage, area: Area, name: &str) -> Result<JsonResponse<Value>, ApiError> {
    let value = storage
        .read_document(area, name)
        .await
        .map_err(|err| ApiError::from_storage(err, READ_FAILED))?;
    Ok(JsonResponse(value))
}

async fn save(
    storage: &Storage,
    area: Area,
    name: String,
    data: &Value,
) -> Result<JsonResponse<SavedResponse>, ApiError> {
    let bytes = storage
        .write_document(area, &name, data)
        .await
        .map_err(ApiError::from_write)?;
    info!(name, bytes, area = ?area, "saved document");
    Ok(JsonResponse(SavedResponse {
        message: SAVED,
        filename: name,
    }))
}

/// Drops the falsy JSON values (`null`, `false`, `0`, `""`) a caller may send
/// in place of real data.
fn present(value: Option<Value>) -> Option<Value> {
    value.filter(|value| match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

fn reject_body(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection, "rejected request body");
    ApiError::BadRequest(rejection.body_text())
}
