//! Iterative NDNS resolution: walk the zone hierarchy one label at a time,
//! verifying every response before acting on it.

pub mod state;

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use state::{AnswerKind, Expecting, ResolutionState, Transition};

use crate::config::ResolverConfig;
use crate::dns::{DNSMessage, ParseError};
use crate::ndn::{FaceScope, InterestOptions, Name, Transport, TransportError};
use crate::policy::{TrustPolicy, TrustVerifier, Verified, VerifyError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Interest timed out: {0}")]
    Timeout(Name),

    #[error("Verification failed: {0}")]
    Verification(#[from] VerifyError),

    #[error("Content of {name} is not a DNS message: {source}")]
    NotADnsPacket { name: Name, source: ParseError },

    #[error("Delegation target {target} is outside zone {zone}")]
    DomainMismatch { zone: Name, target: String },

    #[error("Expected {expecting} answer, got {found}")]
    UnexpectedAnswer {
        expecting: Expecting,
        found: AnswerKind,
    },

    #[error("Resolution did not finish within {0} round trips")]
    TooManyRoundTrips(usize),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid record type: {0}")]
    InvalidRecordType(String),

    #[error("Transport error: {0}")]
    Transport(TransportError),
}

impl From<TransportError> for ResolveError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout(name) => ResolveError::Timeout(name),
            other => ResolveError::Transport(other),
        }
    }
}

/// The verified answer to a resolution.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub message: DNSMessage,
    /// Name of the signed object that carried the answer
    pub data_name: Name,
    /// Deepest zone reached
    pub zone: Name,
    pub round_trips: usize,
    pub verified: Verified,
}

pub struct ResolutionEngine {
    transport: Arc<dyn Transport>,
    verifier: TrustVerifier,
    lifetime: Duration,
    strict_delegation: bool,
    max_round_trips: usize,
}

impl ResolutionEngine {
    pub fn new(config: &ResolverConfig, transport: Arc<dyn Transport>, policy: Arc<TrustPolicy>) -> Self {
        let verifier = TrustVerifier::new(policy, transport.clone(), config.interest_lifetime);
        Self {
            transport,
            verifier,
            lifetime: config.interest_lifetime,
            strict_delegation: config.strict_delegation,
            max_round_trips: config.max_round_trips,
        }
    }

    pub fn verifier(&self) -> &TrustVerifier {
        &self.verifier
    }

    /// Resolve `name` (dotted or NDN URI) for `record_type`.
    pub async fn resolve(&self, name: &str, record_type: &str) -> Result<Resolution, ResolveError> {
        let mut state =
            ResolutionState::new(name, record_type)?.with_strict_delegation(self.strict_delegation);
        info!("Resolving {} {} iteratively", name, record_type);

        let mut face = FaceScope::open(self.transport.as_ref(), "resolver").await?;
        let options = InterestOptions::with_lifetime(self.lifetime);
        let mut question = state.first_question();
        let mut round_trips = 0;

        loop {
            if round_trips >= self.max_round_trips {
                warn!("Giving up on {} after {} round trips", name, round_trips);
                return Err(ResolveError::TooManyRoundTrips(self.max_round_trips));
            }
            round_trips += 1;
            debug!("Round trip {}: {}", round_trips, question);

            let data = face.express(&question, &options).await?;
            debug!("Data name: {}", data.name);

            let verified = self.verifier.verify(&data).await?;
            let message = DNSMessage::parse(&data.content).map_err(|source| {
                ResolveError::NotADnsPacket {
                    name: data.name.clone(),
                    source,
                }
            })?;

            match state.advance(&message)? {
                Transition::Query(next) => question = next,
                Transition::Complete => {
                    face.close();
                    info!(
                        "Resolved {} {} in {} round trips (zone {})",
                        name,
                        record_type,
                        round_trips,
                        state.zone()
                    );
                    return Ok(Resolution {
                        message,
                        data_name: data.name,
                        zone: state.zone().clone(),
                        round_trips,
                        verified,
                    });
                }
            }
        }
    }
}
