//! Game configuration resource.
//!
//! Manages runtime settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [grid]
//! cell_size = 254
//!
//! [events]
//! queue_capacity = 64
//!
//! [animation]
//! looping = true
//!
//! [ui]
//! gate_prompt = repeat    ; repeat | once
//! health_report = current ; current | healed
//! message_log = 16
//!
//! [simulation]
//! turn_delta = 0.016
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;
use thiserror::Error;

use crate::resources::eventqueue::DEFAULT_QUEUE_CAPACITY;
use crate::resources::messagelog::DEFAULT_MESSAGE_LOG;

/// Default safe values for startup
const DEFAULT_CELL_SIZE: f32 = 254.0;
const DEFAULT_ANIMATION_LOOPING: bool = true;
const DEFAULT_TURN_DELTA: f32 = 1.0 / 60.0;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config file: {0}")]
    Load(String),
    #[error("failed to save config file {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value for [{section}] {key}: {value}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        value: String,
    },
}

/// How often the "need a key" prompt is shown while standing next to a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePromptPolicy {
    /// Prompt on every detection pass while adjacent.
    #[default]
    Repeat,
    /// Prompt once per adjacency streak.
    Once,
}

impl GatePromptPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "repeat" => Some(Self::Repeat),
            "once" => Some(Self::Once),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Repeat => "repeat",
            Self::Once => "once",
        }
    }
}

/// Which health value the health-pickup UI event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthReport {
    /// Health before the pickup bonus is applied.
    #[default]
    Current,
    /// Health after the pickup bonus is applied.
    Healed,
}

impl HealthReport {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "current" => Some(Self::Current),
            "healed" => Some(Self::Healed),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Healed => "healed",
        }
    }
}

/// Game configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct GameConfig {
    /// Distance between the centers of two adjacent cells.
    pub cell_size: f32,
    /// Initial capacity of the event queue.
    pub queue_capacity: usize,
    /// Whether animation clips loop.
    pub animation_looping: bool,
    pub gate_prompt: GatePromptPolicy,
    pub health_report: HealthReport,
    /// Number of textbox messages kept by the message log.
    pub message_log: usize,
    /// Seconds of simulation time advanced per tick by the headless runner.
    pub turn_delta: f32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            animation_looping: DEFAULT_ANIMATION_LOOPING,
            gate_prompt: GatePromptPolicy::default(),
            health_report: HealthReport::default(),
            message_log: DEFAULT_MESSAGE_LOG,
            turn_delta: DEFAULT_TURN_DELTA,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    pub fn load_from_file(&mut self) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.load(&self.config_path).map_err(ConfigError::Load)?;
        self.apply(&config)
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), ConfigError> {
        let mut config = Ini::new();
        config.read(text.to_string()).map_err(ConfigError::Load)?;
        self.apply(&config)
    }

    fn apply(&mut self, config: &Ini) -> Result<(), ConfigError> {
        // [grid] section
        if let Some(size) = config.getfloat("grid", "cell_size").ok().flatten() {
            if size <= 0.0 {
                return Err(ConfigError::Invalid {
                    section: "grid",
                    key: "cell_size",
                    value: size.to_string(),
                });
            }
            self.cell_size = size as f32;
        }

        // [events] section
        if let Some(capacity) = config.getuint("events", "queue_capacity").ok().flatten() {
            self.queue_capacity = capacity as usize;
        }

        // [animation] section
        if let Some(looping) = config.getbool("animation", "looping").ok().flatten() {
            self.animation_looping = looping;
        }

        // [ui] section
        if let Some(value) = config.get("ui", "gate_prompt") {
            self.gate_prompt =
                GatePromptPolicy::parse(&value).ok_or_else(|| ConfigError::Invalid {
                    section: "ui",
                    key: "gate_prompt",
                    value: value.clone(),
                })?;
        }
        if let Some(value) = config.get("ui", "health_report") {
            self.health_report = HealthReport::parse(&value).ok_or_else(|| ConfigError::Invalid {
                section: "ui",
                key: "health_report",
                value: value.clone(),
            })?;
        }
        if let Some(size) = config.getuint("ui", "message_log").ok().flatten() {
            self.message_log = size as usize;
        }

        // [simulation] section
        if let Some(dt) = config.getfloat("simulation", "turn_delta").ok().flatten() {
            self.turn_delta = dt as f32;
        }

        info!(
            "Loaded config: cell_size={}, queue_capacity={}, looping={}, gate_prompt={}, health_report={}",
            self.cell_size,
            self.queue_capacity,
            self.animation_looping,
            self.gate_prompt.as_str(),
            self.health_report.as_str()
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let mut config = Ini::new();

        config.set("grid", "cell_size", Some(self.cell_size.to_string()));
        config.set("events", "queue_capacity", Some(self.queue_capacity.to_string()));
        config.set("animation", "looping", Some(self.animation_looping.to_string()));
        config.set("ui", "gate_prompt", Some(self.gate_prompt.as_str().to_string()));
        config.set("ui", "health_report", Some(self.health_report.as_str().to_string()));
        config.set("ui", "message_log", Some(self.message_log.to_string()));
        config.set("simulation", "turn_delta", Some(self.turn_delta.to_string()));

        config
            .write(&self.config_path)
            .map_err(|source| ConfigError::Save {
                path: self.config_path.clone(),
                source,
            })?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
