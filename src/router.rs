//! 路由表组装：访问控制、安全头与各资源处理器。

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Extension, Json, Path};
use axum::routing::{MethodRouter, get, post};
use axum::{Router, middleware};
use std::sync::Arc;

use crate::auth::{AccessConfig, api_key_middleware};
use crate::documents;
use crate::error::ApiError;
use crate::http::add_security_headers;
use crate::images;
use crate::naming::NamingConfig;
use crate::storage::Storage;
use crate::upload::{self, UploadConfig};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub access: Arc<AccessConfig>,
    pub upload: Arc<UploadConfig>,
    pub naming: Arc<NamingConfig>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/data/{name}/show", get(documents::show_document))
        .route("/data/{name}/show/", get(documents::show_document))
        .route("/data/images/show", shadowed_show("images"))
        .route("/data/images/show/", shadowed_show("images"))
        .route("/data/upload/show", shadowed_upload_show())
        .route("/data/upload/show/", shadowed_upload_show())
        .route("/data/sp/{name}/show", get(documents::show_special_document))
        .route("/data/sp/{name}/show/", get(documents::show_special_document))
        .route("/data/images/{name}", get(images::show_image))
        .route("/data/images/{name}/", get(images::show_image))
        .route("/data/sp/image/{name}", get(images::show_special_image))
        .route(
            "/data/images/upload",
            post(upload::upload_image).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/data/sp/image/upload",
            post(upload::upload_special_image).layer(DefaultBodyLimit::disable()),
        )
        .route("/data/special/upload", post(documents::save_special_document))
        .route("/data/upload/{name}", post(documents::save_named_document))
        .route("/data/upload/{name}/", post(documents::save_named_document))
        .route("/data/upload", post(documents::save_auto_document))
        .fallback(not_found)
        .layer(middleware::from_fn(api_key_middleware))
        .layer(middleware::from_fn(add_security_headers))
        .layer(Extension(state.storage))
        .layer(Extension(state.access))
        .layer(Extension(state.upload))
        .layer(Extension(state.naming))
}

/// `/data/{name}/show` wins over the image and upload routes when the name
/// collides with their literal segment.
fn shadowed_show(name: &'static str) -> MethodRouter {
    get(move |Extension(storage): Extension<Arc<Storage>>| async move {
        documents::show_data_document(&storage, name).await
    })
}

fn shadowed_upload_show() -> MethodRouter {
    shadowed_show("upload").post(
        |storage: Extension<Arc<Storage>>,
         payload: Result<Json<documents::DocumentBody>, JsonRejection>| {
            documents::save_named_document(Path("show".to_string()), storage, payload)
        },
    )
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".into())
}
