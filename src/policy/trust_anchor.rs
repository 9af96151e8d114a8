use std::collections::HashMap;

use super::key::PublicKey;
use crate::ndn::Name;

/// A key trusted without a certificate, for data under `namespace`.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    pub key_name: Name,
    pub namespace: Name,
    pub public_key: PublicKey,
}

impl TrustAnchor {
    pub fn new(key_name: Name, namespace: Name, public_key: PublicKey) -> Self {
        Self {
            key_name,
            namespace,
            public_key,
        }
    }

    pub fn covers(&self, data_name: &Name) -> bool {
        self.namespace.is_prefix_of(data_name)
    }
}

/// Anchors indexed by key name.
#[derive(Debug, Clone, Default)]
pub struct TrustAnchorStore {
    anchors: HashMap<Name, Vec<TrustAnchor>>,
}

impl TrustAnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_anchor(&mut self, anchor: TrustAnchor) {
        self.anchors
            .entry(anchor.key_name.clone())
            .or_default()
            .push(anchor);
    }

    /// First anchor for exactly `key_name` whose namespace covers `data_name`.
    pub fn find(&self, key_name: &Name, data_name: &Name) -> Option<&TrustAnchor> {
        self.anchors
            .get(key_name)?
            .iter()
            .find(|anchor| anchor.covers(data_name))
    }

    pub fn len(&self) -> usize {
        self.anchors.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
