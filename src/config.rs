// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Missing file means defaults; a broken file is reported and defaults are used.
// Loading happens before the logger exists, so the outcome is handed back as a
// `ConfigSource` and reported by the caller.
// The bootstrap never reads this directly: it gets a `BootstrapOptions`.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::ffi::CString;
use std::path::{Path, PathBuf};

use crate::backend::{BootstrapOptions, ExtensionPolicy};

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan".to_string(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    pub application_name: String,
    pub extension_policy: ExtensionPolicy,
    pub validation_layer_names: Vec<String>,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            application_name: "Hello Triangle".to_string(),
            extension_policy: ExtensionPolicy::Strict,
            validation_layer_names: vec!["VK_LAYER_KHRONOS_validation".to_string()],
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    pub verbose_logging: bool,
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
            verbose_logging: true,
            log_level: "info".to_string(),
        }
    }
}

/// Where the configuration came from
#[derive(Debug)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at the path
    Defaults(PathBuf),
    /// The file exists but could not be read or parsed
    Fallback { path: PathBuf, error: anyhow::Error },
}

impl ConfigSource {
    /// Log the outcome; call once logging is initialised
    pub fn report(&self) {
        match self {
            ConfigSource::File(path) => log::info!("Loaded configuration from {:?}", path),
            ConfigSource::Defaults(path) => {
                log::info!("Config file not found at {:?}, using defaults", path)
            }
            ConfigSource::Fallback { path, error } => {
                log::warn!("Failed to load {:?}: {:#}. Using defaults.", path, error)
            }
        }
    }
}

impl Config {
    /// Load config.toml from the working directory, falling back to defaults
    pub fn load() -> (Self, ConfigSource) {
        Self::load_or_default("config.toml")
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> (Self, ConfigSource) {
        let path = path.as_ref();
        match Self::load_from_path(path) {
            Ok(Some(config)) => (config, ConfigSource::File(path.to_path_buf())),
            Ok(None) => (Config::default(), ConfigSource::Defaults(path.to_path_buf())),
            Err(error) => (
                Config::default(),
                ConfigSource::Fallback {
                    path: path.to_path_buf(),
                    error,
                },
            ),
        }
    }

    /// Load configuration from a specific path, `None` if there is no file
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(Some(config))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn log_level(&self) -> Result<log::LevelFilter> {
        self.debug
            .log_level
            .parse()
            .map_err(|_| anyhow!("Unknown log level '{}'", self.debug.log_level))
    }

    /// Options for the bootstrap sequence.
    ///
    /// Validation layers only take effect in debug builds.
    pub fn bootstrap_options(&self) -> Result<BootstrapOptions> {
        let application_name = CString::new(self.graphics.application_name.as_str())
            .context("application_name contains a NUL byte")?;

        let validation_layers = self
            .graphics
            .validation_layer_names
            .iter()
            .map(|name| {
                CString::new(name.as_str())
                    .with_context(|| format!("validation layer name {:?} contains a NUL byte", name))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BootstrapOptions {
            application_name,
            diagnostics: cfg!(debug_assertions) && self.debug.validation_layers,
            verbose_logging: self.debug.verbose_logging,
            extension_policy: self.graphics.extension_policy,
            validation_layers,
        })
    }
}
