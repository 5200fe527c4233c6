use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::errors::{AppError, Result};

const ENV_PREFIX: &str = "MEDIA_DL";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the download server; endpoints are joined onto it.
    pub server_url: String,
    pub download_path: PathBuf,
    /// `None` leaves requests unbounded.
    pub request_timeout_secs: Option<u64>,
    pub proxy: Option<String>,
    /// Follow the result reference as soon as a download completes.
    pub auto_navigate: bool,
    /// Disable the trigger button while its request is in flight.
    pub guard_double_submit: bool,
    pub ui: UiConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub show_timestamps: bool,
    pub show_progress: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            download_path: dirs::download_dir()
                .unwrap_or_else(|| PathBuf::from("./downloads")),
            request_timeout_secs: None,
            proxy: None,
            auto_navigate: false,
            guard_double_submit: true,
            ui: UiConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: false,
            show_progress: true,
        }
    }
}

impl AppConfig {
    /// Loads the user config, writing the defaults first if none exists yet.
    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::get_config_path()?)
    }

    /// Like [`AppConfig::load_from`], but writes the defaults to `path` first
    /// when nothing is there yet.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            AppConfig::default().save_to(path)?;
        }

        Self::load_from(path)
    }

    /// Reads `path` (if present) and applies `MEDIA_DL_*` environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_layered(path, ENV_PREFIX)
    }

    fn load_layered(path: &Path, env_prefix: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Json)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                std::fs::create_dir_all(config_dir)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("config.json"))
    }

    /// Where the server session cookie is kept between runs.
    pub fn get_session_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("session"))
    }

    fn app_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            AppError::Config(config::ConfigError::Message(
                "Could not find config directory".to_string(),
            ))
        })?;

        Ok(config_dir.join("media-dl-client"))
    }

    fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.server_url)?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(config::ConfigError::Message(format!(
                "server_url is not a base URL: {}",
                self.server_url
            ))));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}
