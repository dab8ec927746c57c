use config::{Config, ConfigError, File};
use directory_scraper::{AiModelConfig, ApiKeysConfig, ScraperSettings};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_ACTOR: &str = "System";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub server: Option<ServerConfig>,
    pub cors: Option<CorsConfig>,
    pub database: Option<DatabaseConfig>,
    pub scraper: Option<ScraperSettings>,
    pub refresh: Option<RefreshConfig>,
    pub api_keys: Option<ApiKeysConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ai_models: Vec<AiModelConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: Some(ServerConfig::default()),
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            }),
            database: None,
            scraper: Some(ScraperSettings::default()),
            refresh: Some(RefreshConfig::default()),
            api_keys: None,
            ai_models: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RefreshConfig {
    pub default_actor: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            default_actor: DEFAULT_ACTOR.to_string(),
        }
    }
}

impl ApiConfig {
    /// Reads `api.toml`, writing a default one first when it does not exist.
    pub fn load(path: Option<PathBuf>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.unwrap_or_else(get_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            let default_config = toml::to_string_pretty(&ApiConfig::default()).map_err(|e| {
                ConfigError::Message(format!("Failed to serialize default config: {e}"))
            })?;
            std::fs::write(&config_path, default_config).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn scraper(&self) -> ScraperSettings {
        self.scraper.clone().unwrap_or_default()
    }

    pub fn default_actor(&self) -> String {
        self.refresh
            .as_ref()
            .map(|refresh| refresh.default_actor.trim())
            .filter(|actor| !actor.is_empty())
            .unwrap_or(DEFAULT_ACTOR)
            .to_string()
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        self.database.as_ref().and_then(|db| db.path.clone())
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("business-directory").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
