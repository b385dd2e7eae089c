use serde::Deserialize;

#[derive(Deserialize)]
pub struct AppConfig {
    pub db_path: String,
    // directory served to the client; uploaded assets land under <static_root>/content
    pub static_root: String,
    // document served for "/" (defaults to app.html)
    pub index_document: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
}

impl AppConfig {
    pub fn index_document(&self) -> &str {
        self.index_document.as_deref().unwrap_or("app.html")
    }
}
