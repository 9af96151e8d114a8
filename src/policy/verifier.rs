use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

use super::errors::{Result, VerifyError};
use super::key::PublicKey;
use super::rule::AuthorizationRule;
use super::trust_anchor::TrustAnchorStore;
use crate::ndn::{FaceScope, InterestOptions, KeyLocator, Name, SignedObject, Transport};

/// Longest certificate chain followed by default.
pub const DEFAULT_CHAIN_LIMIT: usize = 10;

/// Where verification of a chain bottomed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrustRoot {
    /// A configured anchor with this key name.
    Anchor(Name),
    /// A key embedded in the last object of the chain.
    EmbeddedKey,
}

/// Outcome of checking one object against the policy.
#[derive(Debug, Clone)]
pub enum Authorization {
    /// Stop here and verify the chain with this key.
    Terminal(TrustRoot, PublicKey),
    /// Fetch the named certificate and continue.
    Fetch(Name),
}

/// A successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    pub root: TrustRoot,
    pub certificates_fetched: usize,
}

/// Trust anchors, authorization rules and the chain-length limit.
#[derive(Debug, Clone)]
pub struct TrustPolicy {
    anchors: TrustAnchorStore,
    rules: Vec<AuthorizationRule>,
    chain_limit: usize,
}

impl TrustPolicy {
    pub fn new(anchors: TrustAnchorStore, rules: Vec<AuthorizationRule>, chain_limit: usize) -> Self {
        Self {
            anchors,
            rules,
            chain_limit,
        }
    }

    pub fn chain_limit(&self) -> usize {
        self.chain_limit
    }

    pub fn anchors(&self) -> &TrustAnchorStore {
        &self.anchors
    }

    pub fn rules(&self) -> &[AuthorizationRule] {
        &self.rules
    }

    /// True if some rule lets `key_name` sign `data_name`.
    pub fn authorize_by_rules(&self, key_name: &Name, data_name: &Name) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.authorizes(key_name, data_name))
    }

    /// Decide what to do with the object on top of the chain.
    pub fn authorize(&self, object: &SignedObject) -> Result<Authorization> {
        match &object.key_locator {
            KeyLocator::ByName(key_name) => {
                if let Some(anchor) = self.anchors.find(key_name, &object.name) {
                    trace!("{} is covered by anchor {}", object.name, anchor.key_name);
                    return Ok(Authorization::Terminal(
                        TrustRoot::Anchor(anchor.key_name.clone()),
                        anchor.public_key.clone(),
                    ));
                }
                if self.authorize_by_rules(key_name, &object.name) {
                    return Ok(Authorization::Fetch(key_name.clone()));
                }
                Err(VerifyError::Unauthorized {
                    key: key_name.clone(),
                    data: object.name.clone(),
                })
            }
            KeyLocator::ByKey(encoded) => {
                let key = PublicKey::decode(encoded).map_err(|e| VerifyError::InvalidKey {
                    name: object.name.clone(),
                    reason: e.to_string(),
                })?;
                Ok(Authorization::Terminal(TrustRoot::EmbeddedKey, key))
            }
            KeyLocator::Unsupported(kind) => Err(VerifyError::UnknownLocatorType(*kind)),
        }
    }
}

/// The object being verified plus the certificates fetched for it, newest
/// certificate on top.
#[derive(Debug)]
pub struct VerificationChain {
    object: SignedObject,
    certificates: Vec<SignedObject>,
    fetched: usize,
    limit: usize,
}

impl VerificationChain {
    pub fn new(object: SignedObject, limit: usize) -> Self {
        Self {
            object,
            certificates: Vec::new(),
            fetched: 0,
            limit,
        }
    }

    pub fn top(&self) -> &SignedObject {
        self.certificates.last().unwrap_or(&self.object)
    }

    pub fn depth(&self) -> usize {
        self.certificates.len() + 1
    }

    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Account for one more certificate fetch, failing once the limit is
    /// passed.
    pub fn reserve_fetch(&mut self) -> Result<()> {
        self.fetched += 1;
        if self.fetched > self.limit {
            return Err(VerifyError::ChainTooLong(self.limit));
        }
        Ok(())
    }

    pub fn push(&mut self, certificate: SignedObject) {
        self.certificates.push(certificate);
    }

    /// Unwind from the top: check each certificate with the current key and
    /// take the next key from its content, then check the object itself.
    pub fn unwind(self, root_key: PublicKey) -> Result<()> {
        let mut key = root_key;
        for (index, certificate) in self.certificates.iter().enumerate().rev() {
            check_signature(&key, certificate, index + 1)?;
            key = PublicKey::decode(&certificate.content).map_err(|e| VerifyError::InvalidKey {
                name: certificate.name.clone(),
                reason: e.to_string(),
            })?;
        }
        check_signature(&key, &self.object, 0)
    }
}

fn check_signature(key: &PublicKey, object: &SignedObject, depth: usize) -> Result<()> {
    if !key.verify_object(object) {
        return Err(VerifyError::SignatureInvalid {
            name: object.name.clone(),
            depth,
        });
    }
    trace!("Verified {} with key {}", object.name, key.fingerprint());
    Ok(())
}

/// Verifies signed objects by walking their certificate chain to a trust
/// anchor or an embedded key.
#[derive(Clone)]
pub struct TrustVerifier {
    policy: Arc<TrustPolicy>,
    transport: Arc<dyn Transport>,
    lifetime: Duration,
}

impl TrustVerifier {
    pub fn new(policy: Arc<TrustPolicy>, transport: Arc<dyn Transport>, lifetime: Duration) -> Self {
        Self {
            policy,
            transport,
            lifetime,
        }
    }

    pub fn policy(&self) -> &TrustPolicy {
        &self.policy
    }

    pub async fn verify(&self, object: &SignedObject) -> Result<Verified> {
        debug!("Verifying {}", object.name);
        let mut chain = VerificationChain::new(object.clone(), self.policy.chain_limit);
        // Opened on the first certificate fetch
        let mut face: Option<FaceScope> = None;

        let outcome = loop {
            let decision = self.policy.authorize(chain.top());
            match decision {
                Ok(Authorization::Terminal(root, key)) => break Ok((root, key)),
                Ok(Authorization::Fetch(key_name)) => {
                    if let Err(e) = chain.reserve_fetch() {
                        break Err(e);
                    }
                    match self.fetch(&mut face, &key_name).await {
                        Ok(certificate) => chain.push(certificate),
                        Err(e) => break Err(e),
                    }
                }
                Err(e) => break Err(e),
            }
        };

        if let Some(mut face) = face {
            face.close();
        }

        let (root, key) =
            outcome.inspect_err(|e| warn!("Verification of {} failed: {}", object.name, e))?;
        let certificates_fetched = chain.fetched();
        chain
            .unwind(key)
            .inspect_err(|e| warn!("Verification of {} failed: {}", object.name, e))?;

        info!(
            "Verified {} via {:?} after {} certificate fetches",
            object.name, root, certificates_fetched
        );
        Ok(Verified {
            root,
            certificates_fetched,
        })
    }

    async fn fetch(&self, face: &mut Option<FaceScope>, key_name: &Name) -> Result<SignedObject> {
        let mut scope = match face.take() {
            Some(scope) => scope,
            None => FaceScope::open(self.transport.as_ref(), "verifier").await?,
        };
        debug!("Fetching certificate {}", key_name);
        let result = scope
            .express(key_name, &InterestOptions::bypass_cache(self.lifetime))
            .await;
        *face = Some(scope);
        result.map_err(VerifyError::from)
    }
}
