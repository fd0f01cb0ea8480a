//! Configuration management
//!
//! Values are layered: built-in defaults, then `config/autodial.toml` if it
//! exists, then `AUTODIAL__*` environment variables.

use config::{ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONFIG_FILE: &str = "config/autodial";
const ENV_PREFIX: &str = "AUTODIAL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub dialer: DialerConfig,
    pub telephony: TelephonyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialerConfig {
    /// Pause between two call attempts
    pub inter_call_delay_secs: u64,
    /// Finished calls shown by the stats endpoint
    pub recent_calls_limit: usize,
}

impl DialerConfig {
    pub fn inter_call_delay(&self) -> Duration {
        Duration::from_secs(self.inter_call_delay_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelephonyMode {
    /// Random outcomes, MicroSIP-like timings
    Simulated,
    /// Dry run: nothing is dialed, every call resolves `Not Answer` at once
    Scripted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    pub mode: TelephonyMode,
    pub server: String,
    pub port: u16,
    pub username: String,
    pub domain: String,
    /// Connect to the device when the service starts
    pub connect_on_start: bool,
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Fixed RNG seed for repeatable runs
    pub seed: Option<u64>,
    pub connect_delay_ms: u64,
    pub setup_delay_ms: u64,
    pub min_ring_secs: u64,
    pub max_ring_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set
    pub level: String,
}

impl Config {
    /// Load configuration from the default file and the environment
    pub fn load() -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Layer a TOML document over the defaults
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            dialer: DialerConfig::default(),
            telephony: TelephonyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for DialerConfig {
    fn default() -> Self {
        Self {
            inter_call_delay_secs: 5,
            recent_calls_limit: 5,
        }
    }
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            mode: TelephonyMode::Simulated,
            server: "127.0.0.1".to_string(),
            port: 5060,
            username: "operator".to_string(),
            domain: "localhost".to_string(),
            connect_on_start: false,
            simulator: SimulatorConfig::default(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            connect_delay_ms: 1000,
            setup_delay_ms: 1000,
            min_ring_secs: 1,
            max_ring_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.dialer.inter_call_delay(), Duration::from_secs(5));
        assert_eq!(config.telephony.mode, TelephonyMode::Simulated);
        assert_eq!(config.telephony.simulator.max_ring_secs, 10);
        assert_eq!(config.bind_address(), "0.0.0.0:5000");
    }

    #[test]
    fn test_toml_overrides_only_given_keys() {
        let config = Config::from_toml_str(
            r#"
            [dialer]
            inter_call_delay_secs = 2

            [telephony]
            mode = "scripted"
            server = "10.1.1.1"
            "#,
        )
        .unwrap();

        assert_eq!(config.dialer.inter_call_delay_secs, 2);
        assert_eq!(config.dialer.recent_calls_limit, 5);
        assert_eq!(config.telephony.mode, TelephonyMode::Scripted);
        assert_eq!(config.telephony.server, "10.1.1.1");
        assert_eq!(config.telephony.port, 5060);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_mode_rejected() {
        let result = Config::from_toml_str(
            r#"
            [telephony]
            mode = "carrier-pigeon"
            "#,
        );
        assert!(result.is_err());
    }
}
