use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, trace};

use super::data::SignedObject;
use super::name::Name;

/// Default interest lifetime in milliseconds.
pub const DEFAULT_INTEREST_LIFETIME_MS: u64 = 4000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Interest timed out: {0}")]
    Timeout(Name),

    #[error("Interest {name} was nacked (reason {reason})")]
    Nack { name: Name, reason: u64 },

    #[error("Face is closed")]
    Closed,

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// Per-request selectors for an interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterestOptions {
    pub must_be_fresh: bool,
    pub can_be_prefix: bool,
    pub lifetime: Duration,
}

impl Default for InterestOptions {
    fn default() -> Self {
        Self {
            must_be_fresh: false,
            can_be_prefix: true,
            lifetime: Duration::from_millis(DEFAULT_INTEREST_LIFETIME_MS),
        }
    }
}

impl InterestOptions {
    pub fn with_lifetime(lifetime: Duration) -> Self {
        Self {
            lifetime,
            ..Self::default()
        }
    }

    /// Options that ask the network to skip stale cached copies.
    pub fn bypass_cache(lifetime: Duration) -> Self {
        Self {
            must_be_fresh: true,
            ..Self::with_lifetime(lifetime)
        }
    }

    /// True if a Data packet named `data_name` satisfies an interest for
    /// `interest_name` under these options.
    pub fn satisfied_by(&self, interest_name: &Name, data_name: &Name) -> bool {
        if self.can_be_prefix {
            interest_name.is_prefix_of(data_name)
        } else {
            interest_name == data_name
        }
    }
}

/// A session with the network. Each face is used by one task at a time.
#[async_trait]
pub trait Face: Send {
    /// Express an interest and wait for the matching signed object.
    async fn express_interest(
        &mut self,
        name: &Name,
        options: &InterestOptions,
    ) -> Result<SignedObject, TransportError>;

    /// Release the session. Calling it again has no effect.
    fn close(&mut self);
}

/// Opens faces onto some network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self) -> Result<Box<dyn Face>, TransportError>;
}

/// A face owned by one resolution or verification session.
///
/// Enforces the interest lifetime and closes the face exactly once, either
/// through [`FaceScope::close`] or on drop.
pub struct FaceScope {
    face: Box<dyn Face>,
    owner: &'static str,
    closed: bool,
}

impl FaceScope {
    pub async fn open(transport: &dyn Transport, owner: &'static str) -> Result<Self, TransportError> {
        let face = transport.open().await?;
        debug!("Opened {} face", owner);
        Ok(Self {
            face,
            owner,
            closed: false,
        })
    }

    pub async fn express(
        &mut self,
        name: &Name,
        options: &InterestOptions,
    ) -> Result<SignedObject, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        trace!("{} expressing interest {}", self.owner, name);
        match tokio::time::timeout(options.lifetime, self.face.express_interest(name, options)).await {
            Ok(result) => result,
            Err(_) => {
                debug!("Interest {} timed out after {:?}", name, options.lifetime);
                Err(TransportError::Timeout(name.clone()))
            }
        }
    }

    pub fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.face.close();
            debug!("Closed {} face", self.owner);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for FaceScope {
    fn drop(&mut self) {
        self.close();
    }
}
