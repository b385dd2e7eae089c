use sqlx::SqlitePool;
use std::path::PathBuf;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    // root of the served directory tree; uploaded assets live below it
    pub static_root: PathBuf,
    pub index_document: String,
}
