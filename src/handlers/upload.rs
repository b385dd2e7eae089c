use crate::assets::{self, PendingAsset};
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

// Streams one multipart field to disk; the pending asset is cleaned up on
// any failure so no temp file or name reservation leaks.
async fn store_field(state: &AppState, field: &mut Field<'_>, original: &str, content_type: &str)
    -> Result<String, ApiError> {
    let subdir = assets::destination_for(content_type);
    let mut pending = PendingAsset::create(&state.static_root, subdir, original).await?;
    let mut written = 0usize;
    loop {
        match field.chunk().await {
            Ok(Some(chunk)) => {
                written += chunk.len();
                if let Err(e) = pending.write_chunk(&chunk).await {
                    pending.discard().await;
                    return Err(e.into());
                }
            }
            Ok(None) => break,
            Err(e) => {
                pending.discard().await;
                return Err(ApiError::BadRequest(format!("failed to read upload: {}", e)));
            }
        }
    }
    let rel_path = pending.commit().await?;
    tracing::info!(path = %rel_path, bytes = written, "upload stored");
    Ok(rel_path)
}

// POST /api/upload. Takes the file field named "filedata", or the first field
// carrying a filename when the client drifted on the field name. The response
// path is what the client persists as MediaItem.src in its follow-up write;
// the two calls are deliberately not transacted together.
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut stored: Option<(String, String)> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {}", e)))?
    {
        let original = match field.file_name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let is_filedata = field.name() == Some("filedata");
        if stored.is_some() && !is_filedata {
            continue;
        }
        let content_type = field.content_type().map(str::to_string).unwrap_or_else(|| {
            mime_guess::from_path(&original)
                .first_or_octet_stream()
                .to_string()
        });

        let rel_path = store_field(&state, &mut field, &original, &content_type).await?;
        // a late "filedata" field supersedes an earlier fallback pick
        if let Some((old_path, _)) = stored.replace((rel_path, content_type)) {
            assets::remove_asset(&state.static_root, &old_path).await;
        }
        if is_filedata {
            break;
        }
    }

    let (rel_path, content_type) = stored
        .ok_or_else(|| ApiError::BadRequest("no file field in upload".to_string()))?;

    Ok(Json(json!({
        "data": { "filedata": rel_path, "contentType": content_type }
    })))
}
