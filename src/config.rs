use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::ndn::transport::DEFAULT_INTEREST_LIFETIME_MS;
use crate::policy::verifier::DEFAULT_CHAIN_LIMIT;

/// Runtime settings for the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Forwarder the UDP transport talks to
    pub forwarder_addr: SocketAddr,
    /// Lifetime of every interest, and the per-request timeout
    pub interest_lifetime: Duration,
    /// Require delegation targets to sit under the current zone
    pub strict_delegation: bool,
    /// Upper bound on interests per resolution
    pub max_round_trips: usize,
    /// TOML trust policy; without one no anchors are configured
    pub policy_file: Option<PathBuf>,
    /// Overrides the policy file's chain limit
    pub chain_limit: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            forwarder_addr: SocketAddr::from(([127, 0, 0, 1], 6363)),
            interest_lifetime: Duration::from_millis(DEFAULT_INTEREST_LIFETIME_MS),
            strict_delegation: true,
            max_round_trips: 64,
            policy_file: None,
            chain_limit: None,
        }
    }
}

impl ResolverConfig {
    /// Read `NDNS_*` environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ResolverConfig::from_env`], with variables supplied by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("NDNS_FORWARDER") {
            config.forwarder_addr = addr
                .parse()
                .map_err(|_| ConfigError::InvalidForwarderAddress(addr))?;
        }

        if let Some(lifetime) = lookup("NDNS_INTEREST_LIFETIME_MS") {
            let millis = lifetime
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidLifetime(lifetime.clone()))?;
            config.interest_lifetime = Duration::from_millis(millis);
        }

        if let Some(strict) = lookup("NDNS_STRICT_DELEGATION") {
            config.strict_delegation = parse_bool(&strict, config.strict_delegation);
        }

        if let Some(max) = lookup("NDNS_MAX_ROUND_TRIPS") {
            config.max_round_trips = max
                .parse()
                .map_err(|_| ConfigError::InvalidRoundTrips(max.clone()))?;
        }

        if let Some(limit) = lookup("NDNS_CHAIN_LIMIT") {
            config.chain_limit = Some(
                limit
                    .parse()
                    .map_err(|_| ConfigError::InvalidChainLimit(limit.clone()))?,
            );
        }

        if let Some(path) = lookup("NDNS_POLICY_FILE") {
            if !path.is_empty() {
                config.policy_file = Some(PathBuf::from(path));
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interest_lifetime.is_zero() || self.interest_lifetime > Duration::from_secs(60) {
            return Err(ConfigError::InvalidLifetime(format!(
                "{}ms is outside 1ms..=60s",
                self.interest_lifetime.as_millis()
            )));
        }
        if !(1..=1024).contains(&self.max_round_trips) {
            return Err(ConfigError::InvalidRoundTrips(format!(
                "{} is outside 1..=1024",
                self.max_round_trips
            )));
        }
        if let Some(limit) = self.chain_limit {
            validate_chain_limit(limit)?;
        }
        Ok(())
    }
}

fn validate_chain_limit(limit: usize) -> Result<(), ConfigError> {
    if !(1..=64).contains(&limit) {
        return Err(ConfigError::InvalidChainLimit(format!(
            "{} is outside 1..=64",
            limit
        )));
    }
    Ok(())
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}

/// A key trusted for a namespace, as written in the policy file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnchorConfig {
    pub key_name: String,
    #[serde(default = "root_namespace")]
    pub namespace: String,
    /// Mnemonic such as `ED25519` or a DNSSEC algorithm number
    pub algorithm: String,
    /// Base64 of the raw public key
    pub public_key: String,
}

/// Regex authorization rule, as written in the policy file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleConfig {
    pub key_pattern: String,
    pub key_rewrite: String,
    pub data_pattern: String,
    pub data_rewrite: String,
}

impl RuleConfig {
    pub fn new(key_pattern: &str, key_rewrite: &str, data_pattern: &str, data_rewrite: &str) -> Self {
        Self {
            key_pattern: key_pattern.to_string(),
            key_rewrite: key_rewrite.to_string(),
            data_pattern: data_pattern.to_string(),
            data_rewrite: data_rewrite.to_string(),
        }
    }
}

/// Trust policy file contents.
///
/// ```toml
/// chain_limit = 10
///
/// [[anchor]]
/// key_name = "/ndn/keys/ksk-1"
/// namespace = "/"
/// algorithm = "ED25519"
/// public_key = "base64..."
/// ```
///
/// Without any `[[rule]]` tables the NDNS hierarchy rules apply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    #[serde(default = "default_chain_limit")]
    pub chain_limit: usize,
    #[serde(default, rename = "anchor")]
    pub anchors: Vec<AnchorConfig>,
    #[serde(default = "hierarchy_rules", rename = "rule")]
    pub rules: Vec<RuleConfig>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            chain_limit: DEFAULT_CHAIN_LIMIT,
            anchors: Vec::new(),
            rules: hierarchy_rules(),
        }
    }
}

impl PolicyConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        validate_chain_limit(config.chain_limit)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

fn default_chain_limit() -> usize {
    DEFAULT_CHAIN_LIMIT
}

fn root_namespace() -> String {
    "/".to_string()
}

const ZONE_KEY_PATTERN: &str = r"^((?:/[^/]+)*)/DNS((?:/[^/]+)*)/[^/]+/NDNCERT$";

/// Rules for the NDNS hierarchy:
///
/// 1. a zone key signs records in its own zone;
/// 2. a zone key signs records of a dotted child label, e.g. `/a/b.c/DNS/x`
///    is treated as living under `/a/c/b`;
/// 3. a zone key signs anything under its zone's name.
pub fn hierarchy_rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig::new(ZONE_KEY_PATTERN, "$1$2", r"^((?:/[^/]+)*)/DNS((?:/[^/]+)*)$", "$1$2"),
        RuleConfig::new(
            ZONE_KEY_PATTERN,
            "$1$2",
            r"^((?:/[^/]+)*)/([^/\.]+)\.([^/\.]+)/DNS((?:/[^/]+)*)$",
            "$1/$3/$2$4",
        ),
        RuleConfig::new(ZONE_KEY_PATTERN, "$1$2", "(.*)", "$1"),
    ]
}
