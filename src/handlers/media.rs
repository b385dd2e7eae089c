use crate::assets;
use crate::db;
use crate::error::ApiError;
use crate::models::{MediaItem, MediaItemInput, MediaItemPatch};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

pub async fn list_media_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let items = db::list_items(&state.pool).await?;
    Ok(Json(json!({ "data": items })))
}

// POST is upsert-by-src: resubmitting a payload replaces the existing record
// instead of duplicating it.
pub async fn create_media_handler(
    State(state): State<Arc<AppState>>,
    Json(mut input): Json<MediaItemInput>,
) -> Result<Json<MediaItem>, ApiError> {
    // missing and blank src are the same client error
    match input.src.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => {}
        _ => return Err(ApiError::BadRequest("src is required".to_string())),
    }
    // identifiers are server-owned
    input.extra.remove("id");
    let item = db::upsert_item(&state.pool, &input).await?;
    tracing::info!(src = %item.src, id = item.id, "media item upserted");
    Ok(Json(item))
}

pub async fn update_media_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(mut patch): Json<MediaItemPatch>,
) -> Result<Json<Value>, ApiError> {
    patch.extra.remove("id");
    match db::update_item(&state.pool, id, &patch).await? {
        Some(_) => Ok(Json(json!({ "ok": true }))),
        None => Err(ApiError::NotFound(format!("no media item with id {}", id))),
    }
}

#[derive(serde::Deserialize)]
pub struct DeleteQuery {
    pub src: Option<String>,
}

// Deletes all records matching ?src=<path>; the backing file is removed
// best-effort afterwards and its absence never fails the request.
pub async fn delete_media_handler(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<Value>, ApiError> {
    let src = q
        .src
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing src query parameter".to_string()))?;

    let deleted = db::delete_by_src(&state.pool, &src).await?;
    if deleted > 0 {
        assets::remove_asset(&state.static_root, &src).await;
    }
    Ok(Json(json!({ "deleted": deleted })))
}
