//! Configuration File Loading
//!
//! Handles loading and saving configuration files from the usual locations,
//! in TOML or JSON, falling back to defaults when nothing is found.

use super::Config;
use crate::error::{Error, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "AZDTERM_CONFIG";

/// Configuration file loader
pub struct ConfigLoader {
    /// Search paths for configuration files, without extension
    search_paths: Vec<PathBuf>,
    /// Supported configuration file formats, in priority order
    supported_formats: Vec<ConfigFormat>,
    /// Current configuration file path (if loaded)
    current_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Format implied by a file extension; anything unknown is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }

    fn name(self) -> &'static str {
        match self {
            ConfigFormat::Toml => "TOML",
            ConfigFormat::Json => "JSON",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Whether to fall back to the default config if none exists
    pub create_default: bool,
    /// Whether to validate configuration after loading
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            create_default: true,
            validate: true,
        }
    }
}

impl ConfigLoader {
    /// Create a new configuration loader using the default search paths
    pub fn new() -> Self {
        Self {
            search_paths: Self::get_search_paths(),
            supported_formats: vec![ConfigFormat::Toml, ConfigFormat::Json],
            current_path: None,
        }
    }

    /// Load configuration with default options
    pub fn load() -> Result<Config> {
        Self::new().load_with_options(LoadOptions::default())
    }

    /// Load configuration from an explicit file, bypassing the search
    pub fn load_from_path(path: &Path) -> Result<Config> {
        let config = Self::load_config_file(path, ConfigFormat::from_path(path))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first file found on the search paths
    pub fn load_with_options(&mut self, options: LoadOptions) -> Result<Config> {
        if let Some((path, config)) = self.find_and_load_config()? {
            info!("Configuration loaded from {}", path.display());
            self.current_path = Some(path);
            if options.validate {
                config.validate()?;
            }
            return Ok(config);
        }

        if options.create_default {
            debug!("No configuration file found, using defaults");
            Ok(Config::default())
        } else {
            Err(Error::ConfigNotFound)
        }
    }

    /// Save configuration to a specific path, format chosen by extension
    pub fn save_to_path(&self, config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let format = ConfigFormat::from_path(path);
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(config).map_err(|e| {
                Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                }
            })?,
            ConfigFormat::Toml => {
                toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializationFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })?
            }
        };

        fs::write(path, content)?;
        Ok(())
    }

    /// Find and load configuration from search paths
    fn find_and_load_config(&self) -> Result<Option<(PathBuf, Config)>> {
        if let Ok(explicit) = env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(explicit);
            if path.exists() {
                let config = Self::load_config_file(&path, ConfigFormat::from_path(&path))?;
                return Ok(Some((path, config)));
            }
            warn!(
                "{} points to {}, which does not exist",
                CONFIG_ENV_VAR,
                path.display()
            );
        }

        for base in &self.search_paths {
            for format in &self.supported_formats {
                let config_path = base.with_extension(format.extension());
                if !config_path.exists() {
                    continue;
                }

                match Self::load_config_file(&config_path, *format) {
                    Ok(config) => return Ok(Some((config_path, config))),
                    Err(e) => {
                        // Keep searching, a later location may be usable
                        warn!("Failed to load config from {}: {}", config_path.display(), e);
                    }
                }
            }
        }

        Ok(None)
    }

    /// Load a specific configuration file
    fn load_config_file(path: &Path, format: ConfigFormat) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        match format {
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                format: format.name().to_string(),
                reason: e.to_string(),
            }),
            ConfigFormat::Json => {
                serde_json::from_str(&content).map_err(|e| Error::ConfigParseFailed {
                    format: format.name().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Get default search paths for configuration files
    fn get_search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("azdterm").join("config"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".azdterm").join("config"));
        }

        if let Ok(cwd) = env::current_dir() {
            paths.push(cwd.join("azdterm"));
        }

        paths
    }

    /// Get the current configuration file path
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// List all search paths
    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Clear all search paths and add a single path
    pub fn set_search_path(&mut self, path: PathBuf) {
        self.search_paths = vec![path];
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
