//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `FAQMATCH_*` environment
//! variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_SMALL_TALK_CUTOFF};

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `FAQMATCH_*` overrides on top of
/// defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Directory holding the bundle artifacts (vocabulary, catalog,
    /// weights, embedding matrix). Required for serving.
    pub bundle_dir: Option<PathBuf>,

    /// Minimum cosine similarity for a confident catalog answer
    /// (inclusive). Default: `0.80`.
    pub confidence_threshold: f32,

    /// Fuzzy cutoff for the small-talk intercept. Default: `0.75`.
    pub small_talk_cutoff: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            bundle_dir: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            small_talk_cutoff: DEFAULT_SMALL_TALK_CUTOFF,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "FAQMATCH_PORT";
    const ENV_BIND_ADDR: &'static str = "FAQMATCH_BIND_ADDR";
    const ENV_BUNDLE_DIR: &'static str = "FAQMATCH_BUNDLE_DIR";
    const ENV_CONFIDENCE_THRESHOLD: &'static str = "FAQMATCH_CONFIDENCE_THRESHOLD";
    const ENV_SMALL_TALK_CUTOFF: &'static str = "FAQMATCH_SMALL_TALK_CUTOFF";

    /// Loads configuration from environment variables (falling back to
    /// defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let bundle_dir = Self::parse_optional_path_from_env(Self::ENV_BUNDLE_DIR);
        let confidence_threshold = Self::parse_f32_from_env(
            Self::ENV_CONFIDENCE_THRESHOLD,
            "confidence threshold",
            defaults.confidence_threshold,
        )?;
        let small_talk_cutoff = Self::parse_f32_from_env(
            Self::ENV_SMALL_TALK_CUTOFF,
            "small-talk cutoff",
            defaults.small_talk_cutoff,
        )?;

        Ok(Self {
            port,
            bind_addr,
            bundle_dir,
            confidence_threshold,
            small_talk_cutoff,
        })
    }

    /// Validates paths and policy ranges (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref path) = self.bundle_dir {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Self::check_range("confidence threshold", self.confidence_threshold, -1.0, 1.0)?;
        Self::check_range("small-talk cutoff", self.small_talk_cutoff, 0.0, 1.0)?;

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn check_range(
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    ) -> Result<(), ConfigError> {
        if !value.is_finite() || value < min || value > max {
            return Err(ConfigError::ThresholdOutOfRange {
                name,
                value,
                min,
                max,
            });
        }
        Ok(())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_f32_from_env(
        var_name: &str,
        name: &'static str,
        default: f32,
    ) -> Result<f32, ConfigError> {
        match env::var(var_name) {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|e| ConfigError::ThresholdParseError {
                    name,
                    value,
                    source: e,
                }),
            Err(_) => Ok(default),
        }
    }
}
