//! Application configuration.
//!
//! Values come from `config.toml` (path overridable with `CONFIG_PATH`), then
//! environment variables override individual fields, then the result is
//! normalized and validated. Every section has defaults so a bare
//! environment is enough to boot a development server.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// Allowed CORS origins. Empty means any origin (credentials are then
    /// mirrored back from the request).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4), cors_origins: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default = "default_db_name")]
    pub name: String,
    #[serde(default = "default_services_collection")]
    pub services_collection: String,
    #[serde(default = "default_popular_collection")]
    pub popular_collection: String,
    #[serde(default = "default_bookings_collection")]
    pub bookings_collection: String,
    #[serde(default = "default_selection_timeout")]
    pub server_selection_timeout_secs: u64,
    #[serde(default)]
    pub app_name: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            name: default_db_name(),
            services_collection: default_services_collection(),
            popular_collection: default_popular_collection(),
            bookings_collection: default_bookings_collection(),
            server_selection_timeout_secs: default_selection_timeout(),
            app_name: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub token_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Secure + SameSite=None cookies when true.
    #[serde(default)]
    pub production: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
            cookie_name: default_cookie_name(),
            production: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    #[serde(default = "default_popular_limit")]
    pub popular_limit: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { max_page_size: default_max_page_size(), popular_limit: default_popular_limit() }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }
fn default_db_name() -> String { "medConsultPro".into() }
fn default_services_collection() -> String { "services".into() }
fn default_popular_collection() -> String { "popularServices".into() }
fn default_bookings_collection() -> String { "bookings".into() }
fn default_selection_timeout() -> u64 { 10 }
fn default_token_ttl() -> u64 { 24 * 60 * 60 }
fn default_cookie_name() -> String { "token".into() }
fn default_max_page_size() -> u64 { 100 }
fn default_popular_limit() -> u64 { 6 }

pub const DEV_TOKEN_SECRET: &str = "dev-secret-change-me";

/// `CONFIG_PATH`, or `config.toml` in the working directory.
fn default_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_default() -> Result<Option<AppConfig>> {
    load_optional(&default_path())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).with_context(|| format!("cannot read config file {path}"))?;
    from_toml_str(&content).with_context(|| format!("invalid config file {path}"))
}

/// Like [`load_from_file`], but a file that does not exist is `Ok(None)`.
/// Any other read or parse failure is still an error.
pub fn load_optional(path: &str) -> Result<Option<AppConfig>> {
    match load_from_file(path) {
        Ok(cfg) => Ok(Some(cfg)),
        Err(e) if is_not_found(&e) => Ok(None),
        Err(e) => Err(e),
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>().is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound)
}

pub fn from_toml_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// File (if present) + process environment, normalized and validated.
    /// A config file that exists but does not parse is an error.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?.unwrap_or_default();
        cfg.apply_env(|k| std::env::var(k).ok().filter(|v| !v.trim().is_empty()));
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay environment values on top of file values.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").or_else(|| lookup("SERVER_PORT")).and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(origins) = lookup("CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        if let Some(uri) = lookup("MONGODB_URI") {
            self.database.uri = uri;
        } else if self.database.uri.trim().is_empty() {
            if let (Some(user), Some(pass)) = (lookup("DB_USER"), lookup("DB_PASS")) {
                let host = lookup("DB_HOST").unwrap_or_else(|| "cluster0.mongodb.net".to_string());
                self.database.uri = format!(
                    "mongodb+srv://{user}:{pass}@{host}/?retryWrites=true&w=majority"
                );
            }
        }
        if let Some(name) = lookup("DB_NAME") {
            self.database.name = name;
        }

        if let Some(secret) = lookup("ACCESS_TOKEN_SECRET") {
            self.auth.token_secret = secret;
        }
        if let Some(ttl) = lookup("TOKEN_TTL_SECS").and_then(|v| v.parse().ok()) {
            self.auth.token_ttl_secs = ttl;
        }
        if let Some(env) = lookup("APP_ENV").or_else(|| lookup("NODE_ENV")) {
            if env.trim().eq_ignore_ascii_case("production") {
                self.auth.production = true;
            }
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.normalize();
        self.database.validate()?;
        self.auth.normalize_and_validate()?;
        self.listing.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    fn normalize(&mut self) {
        if self.uri.trim().is_empty() {
            self.uri = "mongodb://localhost:27017".to_string();
        }
        if self.name.trim().is_empty() {
            self.name = default_db_name();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let lower = self.uri.to_lowercase();
        if !(lower.starts_with("mongodb://") || lower.starts_with("mongodb+srv://")) {
            return Err(anyhow!("database.uri must start with mongodb:// or mongodb+srv://"));
        }
        for (key, name) in [
            ("services_collection", &self.services_collection),
            ("popular_collection", &self.popular_collection),
            ("bookings_collection", &self.bookings_collection),
        ] {
            if name.trim().is_empty() {
                return Err(anyhow!("database.{key} is empty"));
            }
        }
        if self.server_selection_timeout_secs == 0 {
            return Err(anyhow!("database.server_selection_timeout_secs must be positive"));
        }
        Ok(())
    }
}

impl AuthConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        if self.token_secret.trim().is_empty() {
            if self.production {
                return Err(anyhow!("auth.token_secret (ACCESS_TOKEN_SECRET) is required in production"));
            }
            self.token_secret = DEV_TOKEN_SECRET.to_string();
        }
        if self.token_ttl_secs == 0 {
            return Err(anyhow!("auth.token_ttl_secs must be positive"));
        }
        if self.cookie_name.trim().is_empty() {
            self.cookie_name = default_cookie_name();
        }
        Ok(())
    }
}

impl ListingConfig {
    fn validate(&self) -> Result<()> {
        if self.max_page_size == 0 {
            return Err(anyhow!("listing.max_page_size must be >= 1"));
        }
        if self.popular_limit == 0 {
            return Err(anyhow!("listing.popular_limit must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_validate_in_development() {
        let mut cfg = AppConfig::default();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.database.uri, "mongodb://localhost:27017");
        assert_eq!(cfg.database.name, "medConsultPro");
        assert_eq!(cfg.auth.token_secret, DEV_TOKEN_SECRET);
        assert_eq!(cfg.auth.token_ttl_secs, 86_400);
        assert_eq!(cfg.listing.popular_limit, 6);
    }

    #[test]
    fn toml_sections_are_optional() {
        let cfg = from_toml_str(
            r#"
            [server]
            port = 8081

            [listing]
            max_page_size = 25
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8081);
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.listing.max_page_size, 25);
        assert_eq!(cfg.database.bookings_collection, "bookings");
    }

    #[test]
    fn env_builds_srv_uri_from_credentials() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("DB_USER", "u"), ("DB_PASS", "p"), ("DB_HOST", "c0.example.net")]));
        assert_eq!(cfg.database.uri, "mongodb+srv://u:p@c0.example.net/?retryWrites=true&w=majority");
    }

    #[test]
    fn explicit_uri_wins_over_credentials() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("MONGODB_URI", "mongodb://db:27017"), ("DB_USER", "u"), ("DB_PASS", "p")]));
        assert_eq!(cfg.database.uri, "mongodb://db:27017");
    }

    #[test]
    fn production_requires_secret() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("APP_ENV", "production")]));
        assert!(cfg.auth.production);
        assert!(cfg.normalize_and_validate().is_err());

        cfg.apply_env(env(&[("ACCESS_TOKEN_SECRET", "s3cret")]));
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.auth.token_secret, "s3cret");
    }

    #[test]
    fn rejects_non_mongo_uri() {
        let mut cfg = AppConfig::default();
        cfg.database.uri = "postgres://localhost/db".into();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn cors_origins_split_on_commas() {
        let mut cfg = AppConfig::default();
        cfg.apply_env(env(&[("CORS_ORIGINS", "http://localhost:5173, https://app.example.com,")]));
        assert_eq!(cfg.server.cors_origins, vec!["http://localhost:5173", "https://app.example.com"]);
    }

    fn scratch_file(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("med_consult_{}_{name}.toml", std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn malformed_file_is_an_error_not_defaults() {
        let path = scratch_file("bad_port", "[server]\nport = \"not a number\"\n");
        let path_str = path.to_str().unwrap();
        assert!(load_from_file(path_str).is_err());
        let err = load_optional(path_str).unwrap_err();
        assert!(format!("{err:#}").contains("invalid config file"));

        let broken = scratch_file("bad_syntax", "[server\nport = 1");
        assert!(load_optional(broken.to_str().unwrap()).is_err());

        std::fs::remove_file(path).ok();
        std::fs::remove_file(broken).ok();
    }

    #[test]
    fn missing_file_falls_back() {
        let path = std::env::temp_dir().join(format!("med_consult_{}_absent.toml", std::process::id()));
        assert!(load_optional(path.to_str().unwrap()).unwrap().is_none());
        assert!(load_from_file(path.to_str().unwrap()).is_err());
    }

    #[test]
    fn readable_file_is_loaded() {
        let path = scratch_file("good", "[server]\nport = 8080\n");
        let cfg = load_optional(path.to_str().unwrap()).unwrap().unwrap();
        assert_eq!(cfg.server.port, 8080);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn zero_popular_limit_is_rejected() {
        let mut cfg = from_toml_str("[listing]\npopular_limit = 0\n").unwrap();
        let err = cfg.normalize_and_validate().unwrap_err();
        assert!(err.to_string().contains("popular_limit"));
    }
}
