//! Viewer settings persisted as `config.ron`.
//!
//! Every struct is `#[serde(default)]`, so older files missing a field and
//! newer files with extra fields both load.

use std::path::Path;

use horizon_raymarch::SceneMode;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub scene: SceneConfig,
    pub debug: DebugConfig,
}

/// Main window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Logical pixels.
    pub width: u32,
    pub height: u32,
    /// Borderless fullscreen on the current monitor.
    pub fullscreen: bool,
    /// Present with `Fifo`; otherwise prefer `Mailbox` or `Immediate`.
    pub vsync: bool,
    /// Window title prefix; the mode switch label is appended.
    pub title: String,
}

/// Scene selection and animation clock.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Mode shown at startup.
    pub initial_mode: SceneMode,
    /// Multiplier on wall-clock time before it reaches the shader.
    pub time_scale: f64,
    /// Start with the animation clock frozen.
    pub paused: bool,
}

/// Diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// A level (`"debug"`) or full filter directives (`"warn,horizon_render=trace"`).
    pub log_level: String,
    /// Log frames per second once a second.
    pub show_frame_stats: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Horizon".to_string(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            initial_mode: SceneMode::BlackHole,
            time_scale: 1.0,
            paused: false,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_frame_stats: false,
        }
    }
}

impl Config {
    /// Checks values the type system cannot: window size and clock scale.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "window",
                reason: format!(
                    "size {}x{} must be at least 1x1",
                    self.window.width, self.window.height
                ),
            });
        }
        let scale = self.scene.time_scale;
        if !scale.is_finite() || scale < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "scene.time_scale",
                reason: format!("{scale} must be a finite, non-negative number"),
            });
        }
        Ok(())
    }

    fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = ron::from_str(contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads `config.ron` from `config_dir`, writing the defaults there first
    /// if it does not exist.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config = Self::parse(&contents)?;
            log::info!("Config loaded from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Wrote default config to {}", config_path.display());
            Ok(config)
        }
    }

    /// Writes `config.ron` into `config_dir`, creating the directory.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-reads the file; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config = Self::parse(&contents)?;

        if &new_config != self {
            log::info!("Config file changed on disk");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
