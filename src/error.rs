use thiserror::Error;

use crate::resolver::ResolveError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid forwarder address: {0}")]
    InvalidForwarderAddress(String),

    #[error("Invalid interest lifetime: {0}")]
    InvalidLifetime(String),

    #[error("Invalid chain limit: {0}")]
    InvalidChainLimit(String),

    #[error("Invalid round-trip limit: {0}")]
    InvalidRoundTrips(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid regex {pattern}: {reason}")]
    InvalidRegex { pattern: String, reason: String },

    #[error("Invalid public key for {key_name}: {reason}")]
    InvalidPublicKey { key_name: String, reason: String },

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

/// Top-level error for the command-line resolver.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

pub type Result<T> = std::result::Result<T, Error>;
