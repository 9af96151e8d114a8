mod common;

use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use ndns::config::hierarchy_rules;
use ndns::ndn::{KeyLocator, MemoryNetwork, SignedObject, Transport, tlv};
use ndns::policy::{
    Authorization, AuthorizationRule, TrustRoot, TrustVerifier, VerifyError,
};

const LIFETIME: Duration = Duration::from_millis(200);

fn hierarchy() -> Vec<AuthorizationRule> {
    hierarchy_rules()
        .iter()
        .map(|r| {
            AuthorizationRule::new(&r.key_pattern, &r.key_rewrite, &r.data_pattern, &r.data_rewrite)
                .unwrap()
        })
        .collect()
}

/// Any `/certs/...` key may sign anything.
fn permissive() -> Vec<AuthorizationRule> {
    vec![AuthorizationRule::new("^/certs/.*$", "/", "^(.*)$", "$1").unwrap()]
}

fn decode(wire: &Bytes) -> SignedObject {
    tlv::decode_data(wire).unwrap()
}

fn verifier(network: &MemoryNetwork, policy: Arc<ndns::TrustPolicy>) -> TrustVerifier {
    let transport: Arc<dyn Transport> = Arc::new(network.clone());
    TrustVerifier::new(policy, transport, LIFETIME)
}

#[tokio::test]
async fn test_anchor_short_circuits_without_fetching() {
    let anchor = TestKey::generate();
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &anchor, hierarchy(), 10);
    let object = decode(&signed_by("/DNS/a/NS", b"records", "/anchor/KEY", &anchor));

    let verified = verifier(&network, policy).verify(&object).await.unwrap();
    assert_eq!(verified.root, TrustRoot::Anchor(name("/anchor/KEY")));
    assert_eq!(verified.certificates_fetched, 0);
    assert_eq!(network.faces_opened(), 0);
    assert!(network.interests().is_empty());
}

#[tokio::test]
async fn test_zone_key_chain_to_root_anchor() {
    let root = TestKey::generate();
    let zone = TestKey::generate();
    let network = MemoryNetwork::new();
    network
        .publish(&certificate("/a/DNS/ksk-2/NDNCERT", &zone, "/DNS/ksk-1/NDNCERT", &root))
        .unwrap();
    let policy = anchored_policy("/DNS/ksk-1/NDNCERT", &root, hierarchy(), 10);
    let record = decode(&signed_by("/a/DNS/b/NS", b"ns", "/a/DNS/ksk-2/NDNCERT", &zone));

    let verified = verifier(&network, policy).verify(&record).await.unwrap();
    assert_eq!(verified.root, TrustRoot::Anchor(name("/DNS/ksk-1/NDNCERT")));
    assert_eq!(verified.certificates_fetched, 1);
    assert_eq!(network.interests(), vec![name("/a/DNS/ksk-2/NDNCERT")]);
    assert_eq!(network.faces_opened(), 1);
    assert_eq!(network.faces_closed(), 1);
}

#[test]
fn test_dotted_child_label_authorized() {
    let zone = TestKey::generate();
    let policy = anchored_policy("/anchor/KEY", &TestKey::generate(), hierarchy(), 10);
    let record = decode(&signed_by("/a/c.b/DNS/x/NS", b"ns", "/a/b/DNS/ksk-1/NDNCERT", &zone));

    // /a/b may sign for c.b, which lives under /a/b/c
    assert!(matches!(
        policy.authorize(&record).unwrap(),
        Authorization::Fetch(key) if key == name("/a/b/DNS/ksk-1/NDNCERT")
    ));
}

#[tokio::test]
async fn test_key_outside_zone_unauthorized() {
    let zone = TestKey::generate();
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &TestKey::generate(), hierarchy(), 10);
    let record = decode(&signed_by("/c/DNS/x/NS", b"ns", "/a/DNS/ksk-2/NDNCERT", &zone));

    let err = verifier(&network, policy).verify(&record).await.unwrap_err();
    assert_eq!(
        err,
        VerifyError::Unauthorized {
            key: name("/a/DNS/ksk-2/NDNCERT"),
            data: name("/c/DNS/x/NS"),
        }
    );
    assert!(network.interests().is_empty());
}

#[tokio::test]
async fn test_chain_too_long() {
    let k1 = TestKey::generate();
    let k2 = TestKey::generate();
    let k3 = TestKey::generate();
    let network = MemoryNetwork::new();
    network.publish(&certificate("/certs/k1", &k1, "/certs/k2", &k2)).unwrap();
    network.publish(&certificate("/certs/k2", &k2, "/certs/k3", &k3)).unwrap();
    let policy = anchored_policy("/anchor/KEY", &TestKey::generate(), permissive(), 2);
    let object = decode(&signed_by("/data", b"x", "/certs/k1", &k1));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert_eq!(err, VerifyError::ChainTooLong(2));
    assert_eq!(network.interests().len(), 2);
    assert_eq!(network.faces_opened(), 1);
    assert_eq!(network.faces_closed(), 1);
}

#[tokio::test]
async fn test_chain_at_limit_succeeds() {
    let anchor = TestKey::generate();
    let k1 = TestKey::generate();
    let k2 = TestKey::generate();
    let network = MemoryNetwork::new();
    network.publish(&certificate("/certs/k1", &k1, "/certs/k2", &k2)).unwrap();
    network.publish(&certificate("/certs/k2", &k2, "/anchor/KEY", &anchor)).unwrap();
    let policy = anchored_policy("/anchor/KEY", &anchor, permissive(), 2);
    let object = decode(&signed_by("/data", b"x", "/certs/k1", &k1));

    let verified = verifier(&network, policy).verify(&object).await.unwrap();
    assert_eq!(verified.certificates_fetched, 2);
    assert_eq!(verified.root, TrustRoot::Anchor(name("/anchor/KEY")));
}

#[tokio::test]
async fn test_signature_by_wrong_key_rejected() {
    let anchor = TestKey::generate();
    let impostor = TestKey::generate();
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &anchor, hierarchy(), 10);
    let object = decode(&signed_by("/DNS/a/NS", b"ns", "/anchor/KEY", &impostor));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert_eq!(
        err,
        VerifyError::SignatureInvalid {
            name: name("/DNS/a/NS"),
            depth: 0,
        }
    );
}

#[tokio::test]
async fn test_forged_certificate_rejected_at_its_depth() {
    let anchor = TestKey::generate();
    let k1 = TestKey::generate();
    let network = MemoryNetwork::new();
    // Claims to be signed by the anchor but is not
    network
        .publish(&certificate("/certs/k1", &k1, "/anchor/KEY", &k1))
        .unwrap();
    let policy = anchored_policy("/anchor/KEY", &anchor, permissive(), 10);
    let object = decode(&signed_by("/data", b"x", "/certs/k1", &k1));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert_eq!(
        err,
        VerifyError::SignatureInvalid {
            name: name("/certs/k1"),
            depth: 1,
        }
    );
}

#[tokio::test]
async fn test_tampered_content_rejected() {
    let anchor = TestKey::generate();
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &anchor, hierarchy(), 10);
    let mut object = decode(&signed_by("/DNS/a/NS", b"ns", "/anchor/KEY", &anchor));
    let mut portion = object.signed_portion.to_vec();
    let last = portion.len() - 1;
    portion[last] ^= 0xff;
    object.signed_portion = Bytes::from(portion);

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert!(matches!(err, VerifyError::SignatureInvalid { depth: 0, .. }));
}

#[tokio::test]
async fn test_missing_certificate_times_out() {
    let k1 = TestKey::generate();
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &TestKey::generate(), permissive(), 10);
    let object = decode(&signed_by("/data", b"x", "/certs/k1", &k1));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert_eq!(err, VerifyError::Timeout(name("/certs/k1")));
    assert_eq!(network.faces_closed(), 1);
}

#[tokio::test]
async fn test_slow_certificate_hits_lifetime() {
    let anchor = TestKey::generate();
    let k1 = TestKey::generate();
    let network = MemoryNetwork::new();
    network
        .publish(&certificate("/certs/k1", &k1, "/anchor/KEY", &anchor))
        .unwrap();
    network.set_latency(LIFETIME * 3);
    let policy = anchored_policy("/anchor/KEY", &anchor, permissive(), 10);
    let object = decode(&signed_by("/data", b"x", "/certs/k1", &k1));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert_eq!(err, VerifyError::Timeout(name("/certs/k1")));
    assert_eq!(network.faces_opened(), 1);
    assert_eq!(network.faces_closed(), 1);
}

#[tokio::test]
async fn test_unknown_locator_type() {
    let key = TestKey::generate();
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &key, hierarchy(), 10);
    // KeyDigest locator
    let object = decode(&signed_data(&name("/data"), b"x", KeyLocator::Unsupported(0x1d), &key));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert_eq!(err, VerifyError::UnknownLocatorType(0x1d));
}

#[tokio::test]
async fn test_embedded_key_terminates_chain() {
    let key = TestKey::generate();
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &TestKey::generate(), hierarchy(), 10);
    let locator = KeyLocator::ByKey(key.public_key().encode());
    let object = decode(&signed_data(&name("/self/signed"), b"x", locator, &key));

    let verified = verifier(&network, policy).verify(&object).await.unwrap();
    assert_eq!(verified.root, TrustRoot::EmbeddedKey);
    assert_eq!(network.faces_opened(), 0);
}

#[tokio::test]
async fn test_embedded_key_must_match_signature() {
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &TestKey::generate(), hierarchy(), 10);
    let locator = KeyLocator::ByKey(TestKey::generate().public_key().encode());
    let object = decode(&signed_data(&name("/self/signed"), b"x", locator, &TestKey::generate()));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert!(matches!(err, VerifyError::SignatureInvalid { depth: 0, .. }));
}

#[tokio::test]
async fn test_garbage_embedded_key() {
    let network = MemoryNetwork::new();
    let policy = anchored_policy("/anchor/KEY", &TestKey::generate(), hierarchy(), 10);
    let locator = KeyLocator::ByKey(Bytes::from_static(&[99, 1, 2, 3]));
    let object = decode(&signed_data(&name("/bad"), b"x", locator, &TestKey::generate()));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert!(matches!(err, VerifyError::InvalidKey { .. }));
}

#[tokio::test]
async fn test_certificate_with_bad_key_content() {
    let anchor = TestKey::generate();
    let k1 = TestKey::generate();
    let network = MemoryNetwork::new();
    network
        .publish(&signed_by("/certs/k1", b"not a key", "/anchor/KEY", &anchor))
        .unwrap();
    let policy = anchored_policy("/anchor/KEY", &anchor, permissive(), 10);
    let object = decode(&signed_by("/data", b"x", "/certs/k1", &k1));

    let err = verifier(&network, policy).verify(&object).await.unwrap_err();
    assert!(matches!(err, VerifyError::InvalidKey { name: bad, .. } if bad == name("/certs/k1")));
}

#[tokio::test]
async fn test_verifier_reusable_across_objects() {
    let anchor = TestKey::generate();
    let network = MemoryNetwork::new();
    let verifier = verifier(&network, anchored_policy("/anchor/KEY", &anchor, hierarchy(), 10));

    for record in ["/DNS/a/NS", "/DNS/b/NS", "/DNS/c/FH"] {
        let object = decode(&signed_by(record, b"r", "/anchor/KEY", &anchor));
        verifier.verify(&object).await.unwrap();
    }
    assert_eq!(network.faces_opened(), network.faces_closed());
}
