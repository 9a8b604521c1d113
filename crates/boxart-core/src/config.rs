//! Viewer configuration from TOML files, command-line flags, or URL parameters

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::platform::Platform;
use crate::record::{AssetSet, InitialData};
use crate::repository::DEFAULT_STORAGE_KEY;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Front art source (URL, path, or data URL)
    #[serde(default)]
    pub front: Option<String>,
    /// Back art source, defaults to front
    #[serde(default)]
    pub back: Option<String>,
    /// Spine art source, defaults to front
    #[serde(default)]
    pub spine: Option<String>,
    #[serde(default)]
    pub platform: Platform,
    /// Title preset for the customizer
    #[serde(default)]
    pub title: Option<String>,
    /// Start with the box spinning
    #[serde(default = "default_true")]
    pub auto_rotate: bool,
    /// Relay prefix for cross-origin images, e.g. `https://relay.example/?url=`
    #[serde(default)]
    pub cors_proxy: Option<String>,
    /// Storage key holding the saved records
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Open the customizer on startup
    #[serde(default)]
    pub open_customizer: bool,
}

fn default_true() -> bool {
    true
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            front: None,
            back: None,
            spine: None,
            platform: Platform::default(),
            title: None,
            auto_rotate: true,
            cors_proxy: None,
            storage_key: default_storage_key(),
            open_customizer: false,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load from a file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("Config {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Overlay URL query parameters (`front`, `back`, `spine`, `platform`,
    /// `title`, `proxy`, `rotate`, `customize`) onto this config
    pub fn apply_query_pairs<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            let value: String = value.into();
            match key.as_ref() {
                "front" => self.front = non_empty(value),
                "back" => self.back = non_empty(value),
                "spine" => self.spine = non_empty(value),
                "title" => self.title = non_empty(value),
                "proxy" => self.cors_proxy = non_empty(value),
                "platform" => match value.parse::<Platform>() {
                    Ok(platform) => self.platform = platform,
                    Err(e) => warn!("{}", e),
                },
                "rotate" => self.auto_rotate = parse_flag(&value).unwrap_or(self.auto_rotate),
                "customize" => {
                    self.open_customizer = parse_flag(&value).unwrap_or(true);
                }
                other => warn!("Ignoring unknown parameter '{}'", other),
            }
        }
    }

    /// The viewer's asset set, or `None` when no front art is configured
    pub fn asset_set(&self) -> Option<AssetSet> {
        self.front
            .as_ref()
            .map(|front| AssetSet::new(front.clone(), self.back.clone(), self.spine.clone()))
    }

    pub fn initial_data(&self) -> InitialData {
        InitialData {
            assets: self.asset_set(),
            platform: Some(self.platform),
            title: self.title.clone(),
        }
    }
}

/// Prefix `http(s)` sources with `proxy`; other sources pass through
pub fn with_cors_proxy(proxy: Option<&str>, source: &str) -> String {
    let Some(proxy) = proxy.filter(|p| !p.is_empty()) else {
        return source.to_string();
    };
    let lower = source.to_ascii_lowercase();
    if (lower.starts_with("http://") || lower.starts_with("https://")) && !source.starts_with(proxy) {
        format!("{}{}", proxy, source)
    } else {
        source.to_string()
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
