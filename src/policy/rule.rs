use regex::Regex;
use tracing::trace;

use crate::ndn::Name;

/// Lets a key sign data when both names match their patterns and the key's
/// rewritten namespace is a prefix of the data's rewritten namespace.
///
/// Patterns run against NDN URIs. Rewrites replace the first match, with
/// `$1`-style group references.
#[derive(Debug, Clone)]
pub struct AuthorizationRule {
    key_pattern: Regex,
    key_rewrite: String,
    data_pattern: Regex,
    data_rewrite: String,
}

impl AuthorizationRule {
    pub fn new(
        key_pattern: &str,
        key_rewrite: &str,
        data_pattern: &str,
        data_rewrite: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            key_pattern: Regex::new(key_pattern)?,
            key_rewrite: key_rewrite.to_string(),
            data_pattern: Regex::new(data_pattern)?,
            data_rewrite: data_rewrite.to_string(),
        })
    }

    pub fn matches(&self, key_name: &Name, data_name: &Name) -> bool {
        self.key_pattern.is_match(&key_name.to_uri()) && self.data_pattern.is_match(&data_name.to_uri())
    }

    /// True if this rule matches and authorizes `key_name` to sign `data_name`.
    pub fn authorizes(&self, key_name: &Name, data_name: &Name) -> bool {
        if !self.matches(key_name, data_name) {
            return false;
        }
        let key_uri = key_name.to_uri();
        let data_uri = data_name.to_uri();
        let key_namespace = self.key_pattern.replace(&key_uri, self.key_rewrite.as_str());
        let data_namespace = self.data_pattern.replace(&data_uri, self.data_rewrite.as_str());

        match (Name::from_uri(&key_namespace), Name::from_uri(&data_namespace)) {
            (Ok(key_ns), Ok(data_ns)) => {
                trace!(
                    "Rule {} rewrote key to {} and data to {}",
                    self.key_pattern, key_ns, data_ns
                );
                key_ns.is_prefix_of(&data_ns)
            }
            _ => {
                trace!("Rule {} produced an unparsable namespace", self.key_pattern);
                false
            }
        }
    }
}
