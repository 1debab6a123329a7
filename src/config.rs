use crate::core::resolver::DEFAULT_MAX_ATTEMPTS;
use crate::core::vocabulary::Vocabulary;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub vision: VisionSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
    pub database: DatabaseSettings,
    #[serde(default)]
    pub vocabulary: Vocabulary,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
}

fn default_max_image_bytes() -> usize { 8 * 1024 * 1024 }

#[derive(Debug, Clone, Deserialize)]
pub struct VisionSettings {
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    /// Ordered provider list, fastest/cheapest first
    pub models: Vec<String>,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_vision_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_attempts() -> usize { DEFAULT_MAX_ATTEMPTS }
fn default_vision_timeout() -> u64 { 45 }
fn default_max_tokens() -> u32 { 1200 }
fn default_temperature() -> f32 { 0.3 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_backend")]
    pub backend: CatalogBackend,
    /// JSON product list for the memory backend
    pub seed_path: Option<String>,
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_secs: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            seed_path: None,
            lookup_timeout_secs: default_lookup_timeout(),
        }
    }
}

fn default_backend() -> CatalogBackend { CatalogBackend::Postgres }
fn default_lookup_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub acquire_timeout_secs: Option<u64>,
    pub idle_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with OUTFIT__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., OUTFIT__SERVER__PORT -> server.port
            .add_source(environment())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }
}

fn environment() -> Environment {
    Environment::with_prefix("OUTFIT")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("vision.models")
        .try_parsing(true)
}

/// Apply well-known environment variables that don't follow the OUTFIT__ scheme
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(database_url) = env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", database_url)?;
    }
    if let Ok(api_key) = env::var("OUTFIT_VISION_API_KEY") {
        builder = builder.set_override("vision.api_key", api_key)?;
    }

    builder.build()
}
