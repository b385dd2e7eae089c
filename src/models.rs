use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A persisted media record. `src` is the natural key: at most one item per
/// distinct `src` value exists at any time (enforced by a UNIQUE constraint).
/// Any client-supplied fields beyond the named ones are carried opaquely in
/// `extra` and flattened back into the JSON representation.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: i64,
    // relative path to the backing asset file, e.g. "content/img/123_photo.jpg"
    pub src: String,
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    pub created_at: String,
    pub updated_at: String,
}

/// Client payload for POST /api/mediaitems. No `id`: identifiers are
/// server-owned, and a stray `id` key in the body is dropped before the write.
/// `src` is optional at the type level so that a body omitting it reaches the
/// handler and gets a 400 there, instead of a 422 from the extractor.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemInput {
    pub src: Option<String>,
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Partial update payload for PUT /api/mediaitems/:id. Absent fields keep
/// their stored values.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MediaItemPatch {
    pub src: Option<String>,
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
