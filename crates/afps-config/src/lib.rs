//! Layered configuration for the whole server: loads a single TOML file
//! composing every crate's tunables, writing out defaults on first run.
//! Selected fields are then overridable by `AFPS_`-prefixed environment
//! variables, read after the file load and before the config is handed
//! to the rest of the system.

mod arena;
mod error;
mod logging;
mod transport;

use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};

use afps_combat::WeaponConfig;
use afps_sim::SimConfig;
use afps_signaling::SignalingConfig;
use afps_tick::PickupDefinition;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

pub use arena::default_pickups;
pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use transport::TransportConfig;

/// `AFPS_CONFIG_PATH` overrides the on-disk config location; unset falls
/// back to `afps.toml` in the current directory.
pub const CONFIG_PATH_ENV: &str = "AFPS_CONFIG_PATH";
/// `AFPS_LOG` overrides `LoggingConfig::filter`.
pub const LOG_FILTER_ENV: &str = "AFPS_LOG";
/// Read but unused: the collision-mesh loader this would feed is out of
/// scope. Kept so the config layer still surfaces the variable's
/// presence in `ServerConfig` for anything that later wires a real loader.
pub const COLLISION_MESH_PATH_ENV: &str = "AFPS_COLLISION_MESH_PATH";

/// Top-level configuration: one sub-table per owning crate, plus the
/// pickup layout the tick loop seeds its world with. Derives `Default`
/// from each sub-config's own literal defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub sim: SimConfig,
    pub weapons: WeaponConfig,
    pub signaling: SignalingConfig,
    pub transport: TransportConfig,
    pub logging: LoggingConfig,
    pub character_allowlist: Vec<String>,
    pub pickups: Vec<PickupDefinition>,
    /// Overridden by `AFPS_COLLISION_MESH_PATH`; the loader itself is out
    /// of scope, so this path is never opened.
    pub collision_mesh_path: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            weapons: WeaponConfig::default(),
            signaling: SignalingConfig::default(),
            transport: TransportConfig::default(),
            logging: LoggingConfig::default(),
            character_allowlist: vec!["ranger".to_owned(), "tank".to_owned(), "scout".to_owned()],
            pickups: default_pickups(),
            collision_mesh_path: None,
        }
    }
}

impl ServerConfig {
    /// Loads `path`, writing `Self::default()` to it first if absent, then
    /// applies `AFPS_`-prefixed environment overrides. Any I/O or parse
    /// failure is `ConfigError`, which the binary logs and exits on at
    /// startup; it never propagates into the running server.
    #[instrument]
    pub fn load<P: AsRef<Path> + Debug>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            info!("loading configuration file");
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source: Box::new(source),
            })?
        } else {
            info!("configuration file not found, writing defaults");
            let default_config = Self::default();
            let serialized = toml::to_string_pretty(&default_config)?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(source) = std::fs::create_dir_all(parent) {
                        warn!(?parent, %source, "failed to create config parent directory, using defaults without writing");
                        return Ok(default_config);
                    }
                }
            }
            std::fs::write(path, serialized).map_err(|source| ConfigError::Write {
                path: path.display().to_string(),
                source,
            })?;
            default_config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Path read from `AFPS_CONFIG_PATH`, defaulting to `afps.toml`.
    #[must_use]
    pub fn path_from_env() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("afps.toml"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(filter) = std::env::var(LOG_FILTER_ENV) {
            self.logging.filter = filter;
        }
        if let Ok(path) = std::env::var(COLLISION_MESH_PATH_ENV) {
            self.collision_mesh_path = Some(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = ServerConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let parsed: ServerConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.transport.tick_rate, config.transport.tick_rate);
        assert_eq!(parsed.pickups.len(), config.pickups.len());
    }

    #[test]
    fn missing_file_writes_and_returns_defaults() {
        let dir = std::env::temp_dir().join(format!("afps-config-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("afps.toml");
        let _ = std::fs::remove_file(&path);

        let config = ServerConfig::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.transport.tick_rate, afps_protocol::SERVER_TICK_RATE);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn log_filter_env_override_applies() {
        let dir = std::env::temp_dir().join(format!("afps-config-env-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("afps.toml");
        let _ = std::fs::remove_file(&path);

        // SAFETY: test-only, single-threaded within this test function.
        unsafe {
            std::env::set_var(LOG_FILTER_ENV, "afps=trace");
        }
        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.logging.filter, "afps=trace");
        unsafe {
            std::env::remove_var(LOG_FILTER_ENV);
        }
        std::fs::remove_file(&path).unwrap();
    }
}
