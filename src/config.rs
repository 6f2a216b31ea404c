use crate::analyzer::DEFAULT_TOLERANCE;
use crate::archive::DEFAULT_JPEG_QUALITY;
use crate::error::{JunctionError, Result};
use crate::platform::{default_platforms, PlatformSpec};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogoConfig {
    pub enabled: bool,
    pub path: Option<String>,
    pub height: u32,
    pub x: i64,
    pub y: i64,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            height: 20,
            x: 10,
            y: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub tolerance: u8,
    pub jpeg_quality: u8,
    pub selected_platform: String,
    pub selected_product: Option<String>,
    pub advanced_setting: bool,
    pub advanced_buffer1: i64,
    pub advanced_buffer2: i64,
    pub last_input_folder: Option<String>,
    pub last_output_folder: Option<String>,
    pub logo: LogoConfig,
    pub platforms: Vec<PlatformSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            selected_platform: "LD".to_string(),
            selected_product: None,
            advanced_setting: false,
            advanced_buffer1: 0,
            advanced_buffer2: 200,
            last_input_folder: None,
            last_output_folder: None,
            logo: LogoConfig::default(),
            platforms: default_platforms(),
        }
    }
}

impl AppConfig {
    /// `<config dir>/ImageJunction/config.json`, falling back to the
    /// working directory when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ImageJunction")
            .join("config.json")
    }

    /// Missing or unreadable files yield the defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            info!("Config file does not exist at {:?}, using defaults", path);
            return Self::default();
        }
        match fs::read_to_string(path)
            .map_err(JunctionError::from)
            .and_then(|content| Self::from_json(&content))
        {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load config from {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let mut config: AppConfig = serde_json::from_str(content)?;
        if config.platforms.is_empty() {
            config.platforms = default_platforms();
        }
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        info!("Saved config to {:?}", path);
        Ok(())
    }
}
