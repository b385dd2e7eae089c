use crate::config::AppConfig;
use crate::db;
use crate::handlers::{
    create_media_handler, delete_media_handler, list_media_handler, serve_static_handler,
    update_media_handler, upload_handler,
};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub fn load_config(cli_path: Option<PathBuf>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    use ::config::{builder::DefaultState, ConfigBuilder, File};

    let mut builder = ConfigBuilder::<DefaultState>::default();
    let mut chosen: Option<PathBuf> = None;

    // If a CLI path is provided, use it as-is; let deserialization fail if
    // the format is wrong.
    if let Some(p) = cli_path {
        chosen = Some(p);
    } else {
        let push_if_exists = |p: PathBuf| -> Option<PathBuf> { p.exists().then_some(p) };

        if let Ok(cwd) = std::env::current_dir() {
            if let Some(found) = push_if_exists(cwd.join("config.json")) {
                chosen = Some(found);
            }
        }
        if chosen.is_none() {
            if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
                let p = PathBuf::from(xdg).join("asset-server/config.json");
                if let Some(found) = push_if_exists(p) {
                    chosen = Some(found);
                }
            }
            if chosen.is_none() {
                if let Some(home) = dirs::home_dir() {
                    let p = home.join(".config/asset-server/config.json");
                    if let Some(found) = push_if_exists(p) {
                        chosen = Some(found);
                    }
                }
            }
        }
        if chosen.is_none() {
            if let Some(found) = push_if_exists(PathBuf::from("/etc/asset-server/config.json")) {
                chosen = Some(found);
            }
        }
    }

    if let Some(cfg_path) = chosen {
        tracing::info!("Using configuration file: {}", cfg_path.display());
        builder = builder.add_source(File::from(cfg_path));
    } else {
        return Err("No config.json found. Provide --config <file.json> or place config.json in ./, XDG (~/.config/asset-server/), or /etc/asset-server/".into());
    }

    let settings = builder
        .build()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)?;
    let cfg: AppConfig = settings
        .try_deserialize()
        .map_err(|e| Box::new(e) as Box<dyn std::error::Error>)?;
    Ok(cfg)
}

pub async fn init_db(config: &AppConfig) -> sqlx::SqlitePool {
    let db_path = PathBuf::from(&config.db_path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .expect("Failed to create parent directory for the database file");
    }
    tracing::info!("Resolved DB path: {}", db_path.display());
    if db_path.exists() {
        if db_path.is_dir() {
            panic!("Configured db_path is a directory: {}", db_path.display());
        }
    } else {
        std::fs::File::create(&db_path).expect("Failed to create database file");
    }
    let db_url = format!("sqlite://{}", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await
        .expect("Failed to create sqlx pool");
    db::init_schema(&pool).await.expect("db init failed");
    pool
}

// The client uploads images and videos; make sure both target directories
// exist before the first request.
pub fn prepare_content_dirs(static_root: &Path) {
    for sub in ["content/img", "content/mov"] {
        let dir = static_root.join(sub);
        if let Err(e) = std::fs::create_dir_all(&dir) {
            tracing::warn!("could not create {}: {}", dir.display(), e);
        }
    }
}

pub fn build_cors(config: &AppConfig) -> Result<CorsLayer, String> {
    let mut cors_layer = CorsLayer::new().allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]);

    let valid_origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .clone()
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| HeaderValue::from_str(&s).ok())
        .collect();

    if config.cors_allow_credentials.unwrap_or(false) {
        // tower-http panics at runtime on credentials combined with wildcard
        // origins or headers; refuse the configuration up front instead
        if valid_origins.is_empty() {
            return Err(
                "cors_allow_credentials requires at least one valid entry in cors_allowed_origins"
                    .to_string(),
            );
        }
        return Ok(cors_layer
            .allow_credentials(true)
            .allow_headers([axum::http::header::CONTENT_TYPE])
            .allow_origin(tower_http::cors::AllowOrigin::list(valid_origins)));
    }

    cors_layer = cors_layer.allow_headers(Any);
    cors_layer = match valid_origins.len() {
        0 => cors_layer.allow_origin(Any),
        1 => cors_layer.allow_origin(tower_http::cors::AllowOrigin::exact(
            valid_origins.into_iter().next().unwrap_or(HeaderValue::from_static("*")),
        )),
        _ => cors_layer.allow_origin(tower_http::cors::AllowOrigin::list(valid_origins)),
    };

    Ok(cors_layer)
}

/// Routes plus the static fallback. Shared between main and the integration
/// tests so both exercise the same surface.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/mediaitems",
            get(list_media_handler)
                .post(create_media_handler)
                .delete(delete_media_handler),
        )
        .route("/api/mediaitems/:id", put(update_media_handler))
        .route(
            "/api/upload",
            post(upload_handler).layer(DefaultBodyLimit::disable()),
        )
        .fallback(serve_static_handler)
        .with_state(state)
}

pub fn log_startup_info(config: &AppConfig) {
    tracing::info!("Static root: {}", config.static_root);
    tracing::info!("Index document: {}", config.index_document());
    tracing::info!(
        "Listening on {}:{}",
        config.host.as_deref().unwrap_or("127.0.0.1"),
        config.port.unwrap_or(7077)
    );
}
