use std::net::AddrParseError;
use std::num::{ParseFloatError, ParseIntError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port value {value:?}: {source}")]
    PortParseError {
        value: String,
        source: ParseIntError,
    },

    #[error("port must be non-zero, got {value:?}")]
    InvalidPort { value: String },

    #[error("invalid bind address {value:?}: {source}")]
    InvalidBindAddr {
        value: String,
        source: AddrParseError,
    },

    #[error("invalid value {value:?} for {name}: {source}")]
    ThresholdParseError {
        name: &'static str,
        value: String,
        source: ParseFloatError,
    },

    #[error("{name} must be in [{min}, {max}], got {value}")]
    ThresholdOutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}
