use bytes::{Bytes, BytesMut};
use std::cell::RefCell;
use std::time::Duration;

use ndns::ndn::tlv::{self, Packet, TlvError};
use ndns::ndn::{InterestOptions, KeyLocator, Name};

fn name(uri: &str) -> Name {
    Name::from_uri(uri).unwrap()
}

fn data(locator: KeyLocator) -> Bytes {
    tlv::encode_data(&name("/a/b"), b"hello", &locator, tlv::SIGNATURE_ED25519, |_| {
        vec![0xAA; 4]
    })
}

#[test]
fn test_interest_encoding() {
    let wire = tlv::encode_interest(&name("/a"), &InterestOptions::default(), 0x01020304);
    assert_eq!(
        wire.as_ref(),
        &[
            0x05, 17, // Interest
            0x07, 3, 0x08, 1, b'a', // Name
            0x21, 0, // CanBePrefix
            0x0a, 4, 1, 2, 3, 4, // Nonce
            0x0c, 2, 0x0f, 0xa0, // InterestLifetime 4000
        ]
    );
    assert_eq!(tlv::decode_packet(&wire).unwrap(), Packet::Interest(name("/a")));
}

#[test]
fn test_fresh_interest_flags() {
    let options = InterestOptions::bypass_cache(Duration::from_millis(100));
    let wire = tlv::encode_interest(&name("/k"), &options, 0);
    // CanBePrefix then MustBeFresh after the name
    assert_eq!(&wire[7..11], &[0x21, 0, 0x12, 0]);
}

#[test]
fn test_data_signed_portion() {
    let seen = RefCell::new(Vec::new());
    let wire = tlv::encode_data(
        &name("/a/b"),
        b"hello",
        &KeyLocator::ByName(name("/key")),
        tlv::SIGNATURE_ED25519,
        |portion| {
            seen.borrow_mut().extend_from_slice(portion);
            vec![1, 2, 3]
        },
    );

    let object = tlv::decode_data(&wire).unwrap();
    assert_eq!(object.name, name("/a/b"));
    assert_eq!(object.content.as_ref(), b"hello");
    assert_eq!(object.key_locator, KeyLocator::ByName(name("/key")));
    assert_eq!(object.key_name(), Some(&name("/key")));
    assert_eq!(object.signature_type, tlv::SIGNATURE_ED25519);
    assert_eq!(object.signature.as_ref(), &[1, 2, 3]);
    assert_eq!(object.signed_portion.as_ref(), seen.borrow().as_slice());
}

#[test]
fn test_embedded_and_unsupported_locators() {
    let embedded = tlv::decode_data(&data(KeyLocator::ByKey(Bytes::from_static(&[15, 9])))).unwrap();
    assert_eq!(embedded.key_locator, KeyLocator::ByKey(Bytes::from_static(&[15, 9])));
    assert_eq!(embedded.key_name(), None);

    let digest = tlv::decode_data(&data(KeyLocator::Unsupported(0x1d))).unwrap();
    assert_eq!(digest.key_locator, KeyLocator::Unsupported(0x1d));
}

#[test]
fn test_link_layer_envelope() {
    let inner = data(KeyLocator::ByName(name("/key")));
    let mut fragment = BytesMut::new();
    tlv::write_tlv(&mut fragment, tlv::LP_FRAGMENT, &inner);
    let mut lp = BytesMut::new();
    tlv::write_tlv(&mut lp, tlv::LP_PACKET, &fragment);

    match tlv::decode_packet(&lp).unwrap() {
        Packet::Data(object) => assert_eq!(object.name, name("/a/b")),
        other => panic!("expected Data, got {:?}", other),
    }
}

#[test]
fn test_nack() {
    let interest = tlv::encode_interest(&name("/q"), &InterestOptions::default(), 7);
    let mut reason = BytesMut::new();
    tlv::write_non_negative_integer(&mut reason, tlv::LP_NACK_REASON, 150);
    let mut fields = BytesMut::new();
    tlv::write_tlv(&mut fields, tlv::LP_NACK, &reason);
    tlv::write_tlv(&mut fields, tlv::LP_FRAGMENT, &interest);
    let mut lp = BytesMut::new();
    tlv::write_tlv(&mut lp, tlv::LP_PACKET, &fields);

    assert_eq!(
        tlv::decode_packet(&lp).unwrap(),
        Packet::Nack {
            name: name("/q"),
            reason: 150,
        }
    );
    assert_eq!(
        tlv::decode_data(&lp),
        Err(TlvError::UnexpectedType {
            expected: tlv::DATA,
            found: tlv::LP_NACK,
        })
    );
}

#[test]
fn test_malformed_packets() {
    let wire = data(KeyLocator::ByName(name("/key")));
    assert!(matches!(
        tlv::decode_data(&wire[..wire.len() - 1]),
        Err(TlvError::Truncated(_))
    ));

    let mut unsigned = BytesMut::new();
    let mut inner = BytesMut::new();
    inner.extend_from_slice(&tlv::encode_name(&name("/x")));
    tlv::write_tlv(&mut inner, tlv::CONTENT, b"c");
    tlv::write_tlv(&mut unsigned, tlv::DATA, &inner);
    assert_eq!(
        tlv::decode_data(&unsigned),
        Err(TlvError::MissingField("SignatureInfo"))
    );

    assert_eq!(tlv::decode_packet(&[0x99, 0]).unwrap(), Packet::Other(0x99));
}

fn lp_wrap(inner: &[u8]) -> BytesMut {
    let mut fragment = BytesMut::new();
    tlv::write_tlv(&mut fragment, tlv::LP_FRAGMENT, inner);
    let mut lp = BytesMut::new();
    tlv::write_tlv(&mut lp, tlv::LP_PACKET, &fragment);
    lp
}

#[test]
fn test_nested_link_layer_envelope_rejected() {
    let twice = lp_wrap(&lp_wrap(&data(KeyLocator::ByName(name("/key")))));
    assert_eq!(tlv::decode_packet(&twice), Err(TlvError::NestedLpPacket));
}

#[test]
fn test_deeply_nested_envelopes() {
    let mut wire = BytesMut::from(&data(KeyLocator::ByName(name("/key")))[..]);
    for _ in 0..2000 {
        wire = lp_wrap(&wire);
    }
    assert_eq!(tlv::decode_packet(&wire), Err(TlvError::NestedLpPacket));
}
