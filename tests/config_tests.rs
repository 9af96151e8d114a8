mod common;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

use common::*;
use ndns::ndn::Transport;
use ndns::policy::TrustRoot;
use ndns::{ConfigError, PolicyConfig, ResolutionEngine, TrustPolicy};

fn policy_toml(key: &TestKey, extra: &str) -> String {
    format!(
        r#"
chain_limit = 4
{extra}

[[anchor]]
key_name = "/anchor/KEY"
algorithm = "ED25519"
public_key = "{}"
"#,
        STANDARD.encode(key.public_key().key_bytes())
    )
}

fn write_policy(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_policy_file() {
    let key = TestKey::generate();
    let file = write_policy(&policy_toml(&key, ""));

    let config = PolicyConfig::load(file.path()).unwrap();
    assert_eq!(config.chain_limit, 4);
    assert_eq!(config.anchors.len(), 1);
    assert_eq!(config.anchors[0].namespace, "/");
    assert_eq!(config.rules.len(), 3);

    let policy = TrustPolicy::from_config(&config, None).unwrap();
    assert_eq!(policy.chain_limit(), 4);
    assert_eq!(policy.anchors().len(), 1);
    assert_eq!(policy.rules().len(), 3);

    let overridden = TrustPolicy::from_config(&config, Some(7)).unwrap();
    assert_eq!(overridden.chain_limit(), 7);
}

#[tokio::test]
async fn test_loaded_policy_drives_resolution() {
    let key = TestKey::generate();
    let file = write_policy(&policy_toml(&key, ""));
    let policy = TrustPolicy::from_config(&PolicyConfig::load(file.path()).unwrap(), None).unwrap();

    let network = delegation_network(&key);
    let transport: Arc<dyn Transport> = Arc::new(network.clone());
    let engine = ResolutionEngine::new(&test_config(), transport, Arc::new(policy));

    let resolution = engine.resolve("example.b.a", "TXT").await.unwrap();
    assert_eq!(resolution.verified.root, TrustRoot::Anchor(name("/anchor/KEY")));
}

#[test]
fn test_explicit_rules_replace_defaults() {
    let key = TestKey::generate();
    let text = policy_toml(
        &key,
        r#"
[[rule]]
key_pattern = "^/certs/.*$"
key_rewrite = "/"
data_pattern = "^(.*)$"
data_rewrite = "$1"
"#,
    );

    let config = PolicyConfig::from_toml_str(&text).unwrap();
    assert_eq!(config.rules.len(), 1);
    let policy = TrustPolicy::from_config(&config, None).unwrap();
    assert!(policy.authorize_by_rules(&name("/certs/k1"), &name("/anything/at/all")));
    assert!(!policy.authorize_by_rules(&name("/other/k1"), &name("/anything")));
}

#[test]
fn test_invalid_regex() {
    let config = PolicyConfig::from_toml_str(
        r#"
[[rule]]
key_pattern = "^(unclosed"
key_rewrite = "$1"
data_pattern = ".*"
data_rewrite = ""
"#,
    )
    .unwrap();

    assert!(matches!(
        TrustPolicy::from_config(&config, None),
        Err(ConfigError::InvalidRegex { .. })
    ));
}

#[test]
fn test_invalid_anchor_keys() {
    let bad_base64 = r#"
[[anchor]]
key_name = "/k"
algorithm = "ED25519"
public_key = "not base64!"
"#;
    let config = PolicyConfig::from_toml_str(bad_base64).unwrap();
    assert!(matches!(
        TrustPolicy::from_config(&config, None),
        Err(ConfigError::InvalidPublicKey { key_name, .. }) if key_name == "/k"
    ));

    let bad_algorithm = r#"
[[anchor]]
key_name = "/k"
algorithm = "DSA"
public_key = "AAAA"
"#;
    let config = PolicyConfig::from_toml_str(bad_algorithm).unwrap();
    assert!(matches!(
        TrustPolicy::from_config(&config, None),
        Err(ConfigError::InvalidPublicKey { .. })
    ));

    let empty_key = r#"
[[anchor]]
key_name = "/k"
algorithm = "15"
public_key = ""
"#;
    let config = PolicyConfig::from_toml_str(empty_key).unwrap();
    assert!(matches!(
        TrustPolicy::from_config(&config, None),
        Err(ConfigError::InvalidPublicKey { .. })
    ));
}

#[test]
fn test_invalid_anchor_name() {
    let config = PolicyConfig::from_toml_str(
        r#"
[[anchor]]
key_name = "/k/%ZZ"
algorithm = "ED25519"
public_key = "AAAA"
"#,
    )
    .unwrap();
    assert!(matches!(
        TrustPolicy::from_config(&config, None),
        Err(ConfigError::InvalidName(_))
    ));
}

#[test]
fn test_malformed_policy_files() {
    assert!(matches!(
        PolicyConfig::from_toml_str("chain_limit = \"ten\""),
        Err(ConfigError::ParseError(_))
    ));
    assert!(matches!(
        PolicyConfig::from_toml_str("unknown_field = 1"),
        Err(ConfigError::ParseError(_))
    ));
    assert!(matches!(
        PolicyConfig::from_toml_str("chain_limit = 0"),
        Err(ConfigError::InvalidChainLimit(_))
    ));
    assert!(matches!(
        PolicyConfig::load(std::path::Path::new("/nonexistent/ndns/policy.toml")),
        Err(ConfigError::Io(_))
    ));
}
