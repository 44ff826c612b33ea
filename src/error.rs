//! Error types for configuration parsing and validation.
//!
//! Probing never produces errors; every connect failure collapses into a
//! not-open outcome. Only building the configuration can fail.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid network prefix {value:?}: expected `a.b.c` or `a.b.c.0/24`")]
    InvalidNetwork { value: String },

    #[error("invalid port value: {0}")]
    InvalidPort(String),

    #[error("line {line}: {message}")]
    PortsLine { line: usize, message: String },

    #[error("invalid host range {0:?}: expected `start-end` with values 0-255")]
    InvalidHostRange(String),

    #[error("max concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,

    #[error("failed to read ports file {}: {source}", path.display())]
    PortsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
