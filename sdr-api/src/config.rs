use chrono_tz::Tz;
use config::{Config, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    pub server: Option<ServerConfig>,
    pub cors: Option<CorsConfig>,
    pub services: Option<ServicesConfig>,
    pub storage: Option<StorageConfig>,
    pub cache: Option<CacheConfig>,
    pub calendar: Option<CalendarConfig>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            server: Some(ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            }),
            cors: Some(CorsConfig {
                allowed_origins: vec!["http://localhost:3000".to_string()],
            }),
            services: Some(ServicesConfig::default()),
            storage: None,
            cache: None,
            calendar: None,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// The AI backend, which also fronts the mail/calendar and meeting-bot providers
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServicesConfig {
    pub api_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Bearer token for calls made without a user session
    pub service_token: Option<String>,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: default_request_timeout(),
            service_token: None,
        }
    }
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

/// Shared snapshot cache written by the analysis jobs. Without a Redis URL a
/// local SQLite file in the data directory is used instead.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CalendarConfig {
    /// IANA zone name; the host zone is used when unset
    pub timezone: Option<String>,
    pub max_results: Option<u32>,
}

impl ApiConfig {
    pub fn load(path: Option<PathBuf>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.unwrap_or_else(get_config_path);

        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        // Create default config file if it doesn't exist
        if !config_path.exists() {
            let default_config = r#"
[server]
host = "127.0.0.1"
port = 8080

[cors]
allowed_origins = ["http://localhost:3000"]

[services]
api_url = "http://localhost:8000"
request_timeout_secs = 30
# service_token = "token-for-unauthenticated-calls"

[storage]
# data_dir = "/path/to/sdr-dashboard/data"

[cache]
# redis_url = "redis://localhost:6379"

[calendar]
# timezone = "America/New_York"
max_results = 15
"#;
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
        self.server.clone().unwrap_or(ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        })
    }

    pub fn services(&self) -> ServicesConfig {
        self.services.clone().unwrap_or_default()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .as_ref()
            .and_then(|s| s.data_dir.clone())
            .unwrap_or_else(default_data_dir)
    }

    pub fn redis_url(&self) -> Option<String> {
        self.cache
            .as_ref()
            .and_then(|c| c.redis_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    pub fn calendar_timezone(&self) -> Result<Option<Tz>, ConfigError> {
        let Some(name) = self.calendar.as_ref().and_then(|c| c.timezone.as_deref()) else {
            return Ok(None);
        };
        name.parse::<Tz>()
            .map(Some)
            .map_err(|_| ConfigError::Message(format!("Unknown calendar timezone '{}'", name)))
    }

    pub fn calendar_max_results(&self) -> u32 {
        self.calendar
            .as_ref()
            .and_then(|c| c.max_results)
            .unwrap_or(sdr_core::calendar::DEFAULT_MAX_RESULTS)
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("sdr-dashboard").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("sdr-dashboard")
    } else {
        PathBuf::from("data")
    }
}
