use crate::models::{MediaItem, MediaItemInput, MediaItemPatch};
use serde_json::{Map, Value};
use sqlx::{query, SqlitePool};

type ItemRow = (
    i64,            // id
    String,         // src
    Option<String>, // title
    Option<String>, // content_type
    Option<f64>,    // lat
    Option<f64>,    // lon
    Option<String>, // extra (JSON object)
    String,         // created_at
    String,         // updated_at
);

const ITEM_COLUMNS: &str =
    "id, src, title, content_type, lat, lon, extra, created_at, updated_at";

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // src is the natural key: the UNIQUE constraint is what makes
    // upsert-by-src atomic and duplicate-free.
    let create = r#"
        CREATE TABLE IF NOT EXISTS media_items (
            id INTEGER PRIMARY KEY,
            src TEXT NOT NULL UNIQUE,
            title TEXT,
            content_type TEXT,
            lat REAL,
            lon REAL,
            extra TEXT,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )
    "#;
    query(create).execute(pool).await?;
    Ok(())
}

fn row_to_item(r: ItemRow) -> MediaItem {
    let extra: Map<String, Value> = r
        .6
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default();
    MediaItem {
        id: r.0,
        src: r.1,
        title: r.2,
        content_type: r.3,
        lat: r.4,
        lon: r.5,
        extra,
        created_at: r.7,
        updated_at: r.8,
    }
}

fn extra_json(extra: &Map<String, Value>) -> Option<String> {
    if extra.is_empty() {
        None
    } else {
        serde_json::to_string(extra).ok()
    }
}

/// All records, in the order the store reports them. Callers must not rely on
/// a stable ordering across writes.
pub async fn list_items(pool: &SqlitePool) -> Result<Vec<MediaItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {} FROM media_items",
        ITEM_COLUMNS
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_to_item).collect())
}

pub async fn get_item_by_src(
    pool: &SqlitePool,
    src: &str,
) -> Result<Option<MediaItem>, sqlx::Error> {
    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {} FROM media_items WHERE src = ?1",
        ITEM_COLUMNS
    ))
    .bind(src)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_item))
}

pub async fn get_item_by_id(
    pool: &SqlitePool,
    id: i64,
) -> Result<Option<MediaItem>, sqlx::Error> {
    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {} FROM media_items WHERE id = ?1",
        ITEM_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_to_item))
}

/// The sole create/update path. A single INSERT .. ON CONFLICT statement, so
/// concurrent upserts of the same src serialize last-writer-wins and a record
/// is never left partially updated. Repeating an identical payload changes
/// nothing but updated_at. Callers validate that `src` is present; a missing
/// one trips the NOT NULL constraint here.
pub async fn upsert_item(
    pool: &SqlitePool,
    input: &MediaItemInput,
) -> Result<MediaItem, sqlx::Error> {
    let q = r#"
        INSERT INTO media_items (src, title, content_type, lat, lon, extra)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(src) DO UPDATE SET
            title=excluded.title,
            content_type=excluded.content_type,
            lat=excluded.lat,
            lon=excluded.lon,
            extra=excluded.extra,
            updated_at=CURRENT_TIMESTAMP
    "#;
    query(q)
        .bind(input.src.as_deref())
        .bind(&input.title)
        .bind(&input.content_type)
        .bind(input.lat)
        .bind(input.lon)
        .bind(extra_json(&input.extra))
        .execute(pool)
        .await?;

    let row = sqlx::query_as::<_, ItemRow>(&format!(
        "SELECT {} FROM media_items WHERE src = ?1",
        ITEM_COLUMNS
    ))
    .bind(input.src.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row_to_item(row))
}

/// Partial update by id; fields absent from the patch keep their stored
/// values, and extra maps are merged key-by-key. Returns None when no record
/// matched.
pub async fn update_item(
    pool: &SqlitePool,
    id: i64,
    patch: &MediaItemPatch,
) -> Result<Option<MediaItem>, sqlx::Error> {
    let current = match get_item_by_id(pool, id).await? {
        Some(item) => item,
        None => return Ok(None),
    };

    let src = patch.src.clone().unwrap_or(current.src);
    let title = patch.title.clone().or(current.title);
    let content_type = patch.content_type.clone().or(current.content_type);
    let lat = patch.lat.or(current.lat);
    let lon = patch.lon.or(current.lon);
    let mut extra = current.extra;
    for (k, v) in &patch.extra {
        extra.insert(k.clone(), v.clone());
    }

    let q = r#"
        UPDATE media_items
        SET src=?1, title=?2, content_type=?3, lat=?4, lon=?5, extra=?6,
            updated_at=CURRENT_TIMESTAMP
        WHERE id=?7
    "#;
    query(q)
        .bind(&src)
        .bind(&title)
        .bind(&content_type)
        .bind(lat)
        .bind(lon)
        .bind(extra_json(&extra))
        .bind(id)
        .execute(pool)
        .await?;

    get_item_by_id(pool, id).await
}

/// Removes every record matching `src` (defensive against duplicates from any
/// pre-constraint data) and reports how many were removed. Zero is a normal
/// outcome, not an error.
pub async fn delete_by_src(pool: &SqlitePool, src: &str) -> Result<u64, sqlx::Error> {
    let res = query("DELETE FROM media_items WHERE src = ?1")
        .bind(src)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
