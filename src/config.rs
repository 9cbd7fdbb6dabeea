use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::canvas::CanvasStyle;
use crate::error::ConfigError;
use crate::joke::{DEFAULT_API_URL, FALLBACK_JOKE};
use crate::pipeline::EXPORT_FILE_NAME;
use crate::share::ShareSettings;
use crate::units::Px;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Application configuration, read from `config.toml`. Every field is optional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// JokeAPI-compatible endpoint
    pub api_url: String,
    /// Shown when no joke could be fetched
    pub fallback_joke: String,
    pub request_timeout_secs: u64,
    /// Where exports are written; the platform cache directory when unset
    pub cache_dir: Option<PathBuf>,
    pub file_name: String,
    /// Width of the window the exported image is shown in
    pub viewport_width: Px,
    /// Extra font files made available to the canvas
    pub fonts: Vec<PathBuf>,
    /// PNG, JPEG or SVG logo replacing the bundled one
    pub logo: Option<PathBuf>,
    pub canvas: CanvasStyle,
    pub share: ShareSettings,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            fallback_joke: FALLBACK_JOKE.to_string(),
            request_timeout_secs: 10,
            cache_dir: None,
            file_name: EXPORT_FILE_NAME.to_string(),
            viewport_width: Px(390.0),
            fonts: Vec::new(),
            logo: None,
            canvas: CanvasStyle::default(),
            share: ShareSettings::default(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))
}

impl Config {
    /// `<config dir>/jokexp/config.toml`, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Load the configuration. An explicit `path` must exist; the default
    /// location is optional and falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(path) => Config::from_file(path),
            None => match Config::default_path() {
                Some(path) if path.is_file() => Config::from_file(&path),
                _ => {
                    tracing::debug!("no configuration file, using defaults");
                    Ok(Config::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Config::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => project_dirs()
                .map(|dirs| dirs.cache_dir().to_path_buf())
                .ok_or(ConfigError::NoCacheDir),
        }
    }

    /// The file every export overwrites
    pub fn export_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.cache_dir()?.join(&self.file_name))
    }
}
