//! Configuration for flowboard.
//!
//! TOML file plus `FLOWBOARD_`-prefixed environment overrides, and
//! translation to `flowboard_api::SimulatorConfig` and
//! `flowboard_core::BoardConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use flowboard_api::SimulatorConfig;
use flowboard_core::BoardConfig;

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "FLOWBOARD_CONFIG";

const ENV_PREFIX: &str = "FLOWBOARD_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteSettings,

    #[serde(default)]
    pub board: BoardSettings,
}

/// How the simulated backend behaves.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RemoteSettings {
    /// Delay before every remote call resolves.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,

    /// Probability in `[0, 1]` that a call fails.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,

    /// Seed for reproducible failure sequences.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            failure_rate: default_failure_rate(),
            rng_seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardSettings {
    /// One in-flight mutation per item.
    #[serde(default = "default_true")]
    pub serialize_per_item: bool,

    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            serialize_per_item: true,
            notification_capacity: default_notification_capacity(),
        }
    }
}

fn default_latency_ms() -> u64 {
    1500
}
fn default_failure_rate() -> f64 {
    0.2
}
fn default_true() -> bool {
    true
}
fn default_notification_capacity() -> usize {
    64
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validated simulator settings.
    pub fn simulator_config(&self) -> Result<SimulatorConfig, ConfigError> {
        let rate = self.remote.failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Validation {
                field: "remote.failure_rate".into(),
                reason: format!("expected a value between 0 and 1, got {rate}"),
            });
        }
        Ok(SimulatorConfig {
            latency: Duration::from_millis(self.remote.latency_ms),
            failure_rate: rate,
            rng_seed: self.remote.rng_seed,
        })
    }

    /// Validated board settings, seeded with the default items.
    pub fn board_config(&self) -> Result<BoardConfig, ConfigError> {
        if self.board.notification_capacity == 0 {
            return Err(ConfigError::Validation {
                field: "board.notification_capacity".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(BoardConfig {
            serialize_per_item: self.board.serialize_per_item,
            notification_capacity: self.board.notification_capacity,
            ..BoardConfig::default()
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `FLOWBOARD_CONFIG` if set, otherwise
/// the platform config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("dev", "flowboard", "flowboard").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("flowboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` + environment. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = file_figment(path)
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn load_file(path: &Path) -> Config {
        file_figment(path).extract().unwrap()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_file(&dir.path().join("absent.toml"));
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.remote.latency_ms, 1500);
        assert!((cfg.remote.failure_rate - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[remote]\nfailure_rate = 0.5\nrng_seed = 7\n").unwrap();

        let cfg = load_file(&path);
        assert_eq!(cfg.remote.latency_ms, 1500);
        assert_eq!(cfg.remote.rng_seed, Some(7));
        assert!(cfg.board.serialize_per_item);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.remote.latency_ms = 10;
        cfg.board.serialize_per_item = false;

        save_config_to(&cfg, &path).unwrap();
        assert_eq!(load_file(&path), cfg);
    }

    #[test]
    fn rejects_out_of_range_failure_rate() {
        let mut cfg = Config::default();
        cfg.remote.failure_rate = 1.5;
        assert!(matches!(
            cfg.simulator_config(),
            Err(ConfigError::Validation { .. })
        ));
        cfg.remote.failure_rate = f64::NAN;
        assert!(cfg.simulator_config().is_err());
    }

    #[test]
    fn rejects_zero_notification_capacity() {
        let mut cfg = Config::default();
        cfg.board.notification_capacity = 0;
        assert!(cfg.board_config().is_err());
    }

    #[test]
    fn translates_to_runtime_configs() {
        let cfg = Config::default();
        let sim = cfg.simulator_config().unwrap();
        assert_eq!(sim.latency, Duration::from_millis(1500));
        let board = cfg.board_config().unwrap();
        assert_eq!(board, BoardConfig::default());
    }
}
