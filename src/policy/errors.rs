use std::fmt;

use crate::ndn::{Name, TransportError};

/// Reasons a signed object failed to verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// A certificate fetch got no answer
    Timeout(Name),
    /// Signature check failed for the object at `depth` (0 is the object
    /// being verified, higher numbers are its certificates)
    SignatureInvalid { name: Name, depth: usize },
    /// More certificate fetches were needed than the limit allows
    ChainTooLong(usize),
    /// No anchor or rule lets `key` sign `data`
    Unauthorized { key: Name, data: Name },
    /// Key locator of a type this policy cannot follow
    UnknownLocatorType(u64),
    /// Key material could not be decoded
    InvalidKey { name: Name, reason: String },
    /// Network failure other than a timeout
    Transport(String),
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(name) => write!(f, "Timed out fetching certificate {}", name),
            Self::SignatureInvalid { name, depth } => {
                write!(f, "Signature on {} (chain depth {}) is invalid", name, depth)
            }
            Self::ChainTooLong(limit) => {
                write!(f, "Certificate chain exceeds limit of {} fetches", limit)
            }
            Self::Unauthorized { key, data } => {
                write!(f, "Key {} is not authorized to sign {}", key, data)
            }
            Self::UnknownLocatorType(kind) => write!(f, "Unknown key locator type: {}", kind),
            Self::InvalidKey { name, reason } => write!(f, "Invalid key in {}: {}", name, reason),
            Self::Transport(msg) => write!(f, "Transport error during verification: {}", msg),
        }
    }
}

impl std::error::Error for VerifyError {}

impl From<TransportError> for VerifyError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(name) => Self::Timeout(name),
            other => Self::Transport(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
