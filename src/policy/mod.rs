//! Trust policy: decides which keys may sign which names and verifies
//! signed objects against a chain of certificates.

pub mod algorithm;
pub mod errors;
pub mod key;
pub mod rule;
pub mod trust_anchor;
pub mod verifier;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

pub use algorithm::KeyAlgorithm;
pub use errors::VerifyError;
pub use key::{KeyError, PublicKey};
pub use rule::AuthorizationRule;
pub use trust_anchor::{TrustAnchor, TrustAnchorStore};
pub use verifier::{Authorization, TrustPolicy, TrustRoot, TrustVerifier, VerificationChain, Verified};

use crate::config::PolicyConfig;
use crate::error::ConfigError;
use crate::ndn::Name;

impl TrustPolicy {
    /// Build a policy from its file form. `chain_limit` overrides the
    /// file's limit when set.
    pub fn from_config(config: &PolicyConfig, chain_limit: Option<usize>) -> Result<Self, ConfigError> {
        let mut anchors = TrustAnchorStore::new();
        for anchor in &config.anchors {
            let key_name = Name::from_uri(&anchor.key_name)
                .map_err(|e| ConfigError::InvalidName(format!("{}: {}", anchor.key_name, e)))?;
            let namespace = Name::from_uri(&anchor.namespace)
                .map_err(|e| ConfigError::InvalidName(format!("{}: {}", anchor.namespace, e)))?;
            let invalid_key = |reason: String| ConfigError::InvalidPublicKey {
                key_name: anchor.key_name.clone(),
                reason,
            };
            let algorithm = anchor.algorithm.parse::<KeyAlgorithm>().map_err(invalid_key)?;
            let key_bytes = STANDARD
                .decode(anchor.public_key.trim())
                .map_err(|e| invalid_key(e.to_string()))?;
            let public_key =
                PublicKey::new(algorithm, key_bytes).map_err(|e| invalid_key(e.to_string()))?;
            debug!(
                "Loaded trust anchor {} for {} ({}, {})",
                key_name,
                namespace,
                algorithm,
                public_key.fingerprint()
            );
            anchors.add_anchor(TrustAnchor::new(key_name, namespace, public_key));
        }

        let rules = config
            .rules
            .iter()
            .map(|rule| {
                AuthorizationRule::new(
                    &rule.key_pattern,
                    &rule.key_rewrite,
                    &rule.data_pattern,
                    &rule.data_rewrite,
                )
                .map_err(|e| ConfigError::InvalidRegex {
                    pattern: format!("{} / {}", rule.key_pattern, rule.data_pattern),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let chain_limit = chain_limit.unwrap_or(config.chain_limit);
        if chain_limit == 0 {
            return Err(ConfigError::InvalidChainLimit("0".to_string()));
        }
        Ok(TrustPolicy::new(anchors, rules, chain_limit))
    }
}
