use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use lavarun_core::parser::{default_actor_symbols, default_obstacle_symbols};
use lavarun_core::{ContractError, LevelParser, level::DEFAULT_FINISH_DELAY};

use crate::controller::ControllerConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LAVARUN_CONFIG";
/// Config path used when the environment variable is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/lavarun.toml";
/// Shortest accepted sub-step or frame, in seconds.
pub const MIN_STEP_SECS: f64 = 1.0e-4;

/// Tick driver and campaign settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seconds a level keeps running after it is won or lost.
    pub finish_delay: f64,
    /// Largest simulated sub-step in seconds.
    pub max_step: f64,
    /// Frame length used by the headless campaign runner.
    pub frame_secs: f64,
    /// Attempts that run longer than this count as lost.
    pub attempt_timeout_secs: f64,
    /// Tries per level before the campaign gives up.
    pub max_attempts: u32,
    /// Seed for coin phases. Unset means a fresh OS seed each run.
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            finish_delay: DEFAULT_FINISH_DELAY,
            max_step: 0.05,
            frame_secs: 1.0 / 60.0,
            attempt_timeout_secs: 60.0,
            max_attempts: 3,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Replace non-finite or out-of-range values with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        Self {
            finish_delay: in_range("finish_delay", self.finish_delay, 0.0, defaults.finish_delay),
            max_step: in_range("max_step", self.max_step, MIN_STEP_SECS, defaults.max_step),
            frame_secs: in_range("frame_secs", self.frame_secs, MIN_STEP_SECS, defaults.frame_secs),
            attempt_timeout_secs: in_range(
                "attempt_timeout_secs",
                self.attempt_timeout_secs,
                0.0,
                defaults.attempt_timeout_secs,
            ),
            max_attempts: self.max_attempts.max(1),
            seed: self.seed,
        }
    }
}

fn in_range(name: &str, value: f64, min: f64, default: f64) -> f64 {
    if value.is_finite() && value >= min {
        value
    } else {
        tracing::warn!("session.{name} = {value} is out of range, using {default}");
        default
    }
}

/// Level text symbol tables, keyed by single-character strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    pub actors: HashMap<String, String>,
    pub obstacles: HashMap<String, String>,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            actors: default_actor_symbols()
                .into_iter()
                .map(|(symbol, kind)| (symbol.to_string(), kind.as_str().to_string()))
                .collect(),
            obstacles: default_obstacle_symbols()
                .into_iter()
                .map(|(symbol, tag)| (symbol.to_string(), tag.as_str().to_string()))
                .collect(),
        }
    }
}

/// Top-level game configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub session: SessionConfig,
    pub controller: ControllerConfig,
    pub symbols: SymbolConfig,
}

impl GameConfig {
    /// Load config from the file named by `LAVARUN_CONFIG`. Falls back to
    /// defaults if the file is missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<GameConfig>(&content) {
                Ok(cfg) => GameConfig {
                    session: cfg.session.sanitized(),
                    ..cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    GameConfig::default()
                },
            },
            Err(_) => GameConfig::default(),
        }
    }

    /// Level parser for the configured symbol tables.
    pub fn parser(&self) -> Result<LevelParser, ContractError> {
        LevelParser::from_symbols(&self.symbols.actors, &self.symbols.obstacles)
    }
}
