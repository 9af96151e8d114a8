//! In-process network used by tests, benchmarks and offline tooling.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use super::data::SignedObject;
use super::name::Name;
use super::tlv::{self, TlvError};
use super::transport::{Face, InterestOptions, Transport, TransportError};

#[derive(Debug, Default)]
struct NetworkState {
    published: Vec<SignedObject>,
    interests: Vec<Name>,
    faces_opened: usize,
    faces_closed: usize,
    latency: Option<Duration>,
}

/// A set of published Data packets answered by prefix match.
///
/// Interests with no matching packet fail with [`TransportError::Timeout`]
/// straight away. Cloning shares the same network.
#[derive(Debug, Clone, Default)]
pub struct MemoryNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an encoded Data packet. Returns the packet's name.
    pub fn publish(&self, wire: &[u8]) -> Result<Name, TlvError> {
        let object = tlv::decode_data(wire)?;
        let name = object.name.clone();
        trace!("Publishing {}", name);
        self.state.lock().published.push(object);
        Ok(name)
    }

    /// Delay every answer by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().latency = Some(latency);
    }

    /// Every interest expressed so far, in order.
    pub fn interests(&self) -> Vec<Name> {
        self.state.lock().interests.clone()
    }

    pub fn faces_opened(&self) -> usize {
        self.state.lock().faces_opened
    }

    pub fn faces_closed(&self) -> usize {
        self.state.lock().faces_closed
    }

    fn lookup(&self, name: &Name, options: &InterestOptions) -> (Option<SignedObject>, Option<Duration>) {
        let mut state = self.state.lock();
        state.interests.push(name.clone());
        let found = state
            .published
            .iter()
            .find(|object| options.satisfied_by(name, &object.name))
            .cloned();
        (found, state.latency)
    }
}

#[async_trait]
impl Transport for MemoryNetwork {
    async fn open(&self) -> Result<Box<dyn Face>, TransportError> {
        self.state.lock().faces_opened += 1;
        Ok(Box::new(MemoryFace {
            network: self.clone(),
            open: true,
        }))
    }
}

struct MemoryFace {
    network: MemoryNetwork,
    open: bool,
}

#[async_trait]
impl Face for MemoryFace {
    async fn express_interest(
        &mut self,
        name: &Name,
        options: &InterestOptions,
    ) -> Result<SignedObject, TransportError> {
        if !self.open {
            return Err(TransportError::Closed);
        }
        let (found, latency) = self.network.lookup(name, options);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        found.ok_or_else(|| TransportError::Timeout(name.clone()))
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.network.state.lock().faces_closed += 1;
        }
    }
}
