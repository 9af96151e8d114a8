//! Shared fixtures for the NDNS integration tests: signing keys, signed
//! packets and canned DNS responses.

#![allow(dead_code)] // Each test binary uses a different subset

use bytes::Bytes;
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair};
use std::sync::Arc;
use std::time::Duration;

use ndns::config::ResolverConfig;
use ndns::dns::{
    DNSMessage, DNSResourceData, DNSResourceType, question::DNSQuestion, resource::DNSResource,
};
use ndns::ndn::{KeyLocator, MemoryNetwork, Name, tlv};
use ndns::policy::{
    AuthorizationRule, KeyAlgorithm, PublicKey, TrustAnchor, TrustAnchorStore, TrustPolicy,
};

/// An Ed25519 signing key.
pub struct TestKey {
    pair: Ed25519KeyPair,
}

impl TestKey {
    pub fn generate() -> Self {
        let rng = SystemRandom::new();
        let pkcs8 = Ed25519KeyPair::generate_pkcs8(&rng).expect("key generation");
        let pair = Ed25519KeyPair::from_pkcs8(pkcs8.as_ref()).expect("valid pkcs8");
        Self { pair }
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::new(KeyAlgorithm::Ed25519, Bytes::copy_from_slice(self.pair.public_key().as_ref()))
            .expect("non-empty key")
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.pair.sign(message).as_ref().to_vec()
    }
}

pub fn name(uri: &str) -> Name {
    Name::from_uri(uri).expect("valid test name")
}

/// Encode a Data packet signed by `signer`.
pub fn signed_data(data_name: &Name, content: &[u8], locator: KeyLocator, signer: &TestKey) -> Bytes {
    tlv::encode_data(data_name, content, &locator, tlv::SIGNATURE_ED25519, |portion| {
        signer.sign(portion)
    })
}

/// Data signed by `signer`, whose locator names `key_name`.
pub fn signed_by(data_name: &str, content: &[u8], key_name: &str, signer: &TestKey) -> Bytes {
    signed_data(
        &name(data_name),
        content,
        KeyLocator::ByName(name(key_name)),
        signer,
    )
}

/// Certificate for `subject`'s public key, signed by `signer`.
pub fn certificate(cert_name: &str, subject: &TestKey, signer_name: &str, signer: &TestKey) -> Bytes {
    signed_by(cert_name, &subject.public_key().encode(), signer_name, signer)
}

/// Policy trusting `anchor_key` under the `/` namespace.
pub fn anchored_policy(
    anchor_name: &str,
    anchor_key: &TestKey,
    rules: Vec<AuthorizationRule>,
    chain_limit: usize,
) -> Arc<TrustPolicy> {
    let mut anchors = TrustAnchorStore::new();
    anchors.add_anchor(TrustAnchor::new(
        name(anchor_name),
        Name::new(),
        anchor_key.public_key(),
    ));
    Arc::new(TrustPolicy::new(anchors, rules, chain_limit))
}

pub fn test_config() -> ResolverConfig {
    ResolverConfig {
        interest_lifetime: Duration::from_millis(200),
        ..ResolverConfig::default()
    }
}

fn response(owner: &str, qtype: DNSResourceType, record: Option<DNSResource>) -> Vec<u8> {
    DNSMessage::response(DNSQuestion::new(owner, qtype), record.into_iter().collect())
        .serialize()
        .expect("serializable response")
}

pub fn delegation(owner: &str, target: &str) -> Vec<u8> {
    let labels = target
        .split('.')
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    response(
        owner,
        DNSResourceType::NS,
        Some(DNSResource::new(owner, 3600, DNSResourceData::Delegation(labels))),
    )
}

pub fn forwarding_hint(owner: &str, hint: &str) -> Vec<u8> {
    response(
        owner,
        DNSResourceType::FH,
        Some(DNSResource::new(
            owner,
            3600,
            DNSResourceData::ForwardingHint {
                preference: 10,
                hint: name(hint),
            },
        )),
    )
}

pub fn nonexistence(owner: &str) -> Vec<u8> {
    response(
        owner,
        DNSResourceType::NS,
        Some(DNSResource::new(owner, 3600, DNSResourceData::Nonexistence)),
    )
}

pub fn txt(owner: &str, text: &str) -> Vec<u8> {
    let mut rdata = vec![text.len() as u8];
    rdata.extend_from_slice(text.as_bytes());
    response(
        owner,
        DNSResourceType::TXT,
        Some(DNSResource::raw(owner, DNSResourceType::TXT, 300, rdata)),
    )
}

/// Network for `example.b.a` TXT: `/a` delegated with hint `/H1`, `/a/b`
/// delegated with hint `/H2`, `example` not a zone cut. Everything is
/// signed by the anchor key `/anchor/KEY`.
pub fn delegation_network(anchor: &TestKey) -> MemoryNetwork {
    let network = MemoryNetwork::new();
    let records: Vec<(&str, Vec<u8>)> = vec![
        ("/DNS/a/NS", delegation("a.", "a.")),
        ("/DNS/a/FH", forwarding_hint("a.", "/H1")),
        ("/H1/%F0./a/DNS/b/NS", delegation("b.a.", "b.a.")),
        ("/H1/%F0./a/DNS/b/FH", forwarding_hint("b.a.", "/H2")),
        ("/H2/%F0./a/b/DNS/example/NS", nonexistence("example.b.a.")),
        ("/H2/%F0./a/b/DNS/example/TXT", txt("example.b.a.", "hello")),
    ];
    for (data_name, content) in records {
        network
            .publish(&signed_by(data_name, &content, "/anchor/KEY", anchor))
            .expect("publishable");
    }
    network
}
