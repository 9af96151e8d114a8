//! NDN-TLV packet encoding for the subset of Interest and Data this crate uses.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;
use tracing::trace;

use super::data::{KeyLocator, SignedObject};
use super::name::{Component, Name};
use super::transport::InterestOptions;
use crate::wire::{CodecError, WireCodec};

pub const INTEREST: u64 = 0x05;
pub const DATA: u64 = 0x06;
pub const NAME: u64 = 0x07;
pub const CAN_BE_PREFIX: u64 = 0x21;
pub const MUST_BE_FRESH: u64 = 0x12;
pub const NONCE: u64 = 0x0a;
pub const INTEREST_LIFETIME: u64 = 0x0c;
pub const META_INFO: u64 = 0x14;
pub const CONTENT: u64 = 0x15;
pub const SIGNATURE_INFO: u64 = 0x16;
pub const SIGNATURE_VALUE: u64 = 0x17;
pub const SIGNATURE_TYPE: u64 = 0x1b;
pub const KEY_LOCATOR: u64 = 0x1c;
/// Key locator carrying the signer's public key itself.
pub const KEY_LOCATOR_KEY: u64 = 0x80;

pub const LP_PACKET: u64 = 0x64;
pub const LP_FRAGMENT: u64 = 0x50;
pub const LP_NACK: u64 = 0x0320;
pub const LP_NACK_REASON: u64 = 0x0321;

pub const SIGNATURE_SHA256_WITH_RSA: u64 = 1;
pub const SIGNATURE_SHA256_WITH_ECDSA: u64 = 3;
pub const SIGNATURE_ED25519: u64 = 5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TlvError {
    #[error("Truncated TLV: {0}")]
    Truncated(#[from] CodecError),

    #[error("Expected TLV type {expected:#x}, found {found:#x}")]
    UnexpectedType { expected: u64, found: u64 },

    #[error("TLV length {0} does not fit in memory")]
    Length(u64),

    #[error("Invalid non-negative integer of {0} bytes")]
    NonNegativeInteger(usize),

    #[error("Packet is missing {0}")]
    MissingField(&'static str),

    #[error("Link-layer packet nested inside another link-layer packet")]
    NestedLpPacket,
}

/// A decoded network-layer packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Data(SignedObject),
    Interest(Name),
    Nack { name: Name, reason: u64 },
    Other(u64),
}

pub fn read_var_number(codec: &mut WireCodec<'_>) -> Result<u64, TlvError> {
    let first = codec.read_u8()?;
    Ok(match first {
        253 => codec.read_u16()? as u64,
        254 => codec.read_u32()? as u64,
        255 => {
            let high = codec.read_u32()? as u64;
            let low = codec.read_u32()? as u64;
            (high << 32) | low
        }
        n => n as u64,
    })
}

/// Read one TLV element, returning its type and value.
pub fn read_tlv<'a>(codec: &mut WireCodec<'a>) -> Result<(u64, &'a [u8]), TlvError> {
    let kind = read_var_number(codec)?;
    let length = read_var_number(codec)?;
    let length = usize::try_from(length).map_err(|_| TlvError::Length(length))?;
    Ok((kind, codec.read_bytes(length)?))
}

pub fn read_non_negative_integer(value: &[u8]) -> Result<u64, TlvError> {
    let mut codec = WireCodec::new(value);
    match value.len() {
        1 | 2 | 4 => Ok(codec.read_uint(value.len())? as u64),
        8 => {
            let high = codec.read_u32()? as u64;
            Ok((high << 32) | codec.read_u32()? as u64)
        }
        n => Err(TlvError::NonNegativeInteger(n)),
    }
}

pub fn write_var_number(buf: &mut BytesMut, n: u64) {
    if n < 253 {
        buf.put_u8(n as u8);
    } else if n <= u16::MAX as u64 {
        buf.put_u8(253);
        buf.put_u16(n as u16);
    } else if n <= u32::MAX as u64 {
        buf.put_u8(254);
        buf.put_u32(n as u32);
    } else {
        buf.put_u8(255);
        buf.put_u64(n);
    }
}

pub fn write_tlv(buf: &mut BytesMut, kind: u64, value: &[u8]) {
    write_var_number(buf, kind);
    write_var_number(buf, value.len() as u64);
    buf.put_slice(value);
}

pub fn write_non_negative_integer(buf: &mut BytesMut, kind: u64, n: u64) {
    let mut value = BytesMut::with_capacity(8);
    if n <= u8::MAX as u64 {
        value.put_u8(n as u8);
    } else if n <= u16::MAX as u64 {
        value.put_u16(n as u16);
    } else if n <= u32::MAX as u64 {
        value.put_u32(n as u32);
    } else {
        value.put_u64(n);
    }
    write_tlv(buf, kind, &value);
}

pub fn encode_name(name: &Name) -> Bytes {
    let mut inner = BytesMut::new();
    for component in name.components() {
        write_tlv(&mut inner, component.kind(), component.value());
    }
    let mut out = BytesMut::with_capacity(inner.len() + 4);
    write_tlv(&mut out, NAME, &inner);
    out.freeze()
}

/// Decode the value of a Name TLV.
pub fn decode_name(value: &[u8]) -> Result<Name, TlvError> {
    let mut codec = WireCodec::new(value);
    let mut name = Name::new();
    while !codec.at_end() {
        let (kind, bytes) = read_tlv(&mut codec)?;
        name.push(Component::typed(kind, Bytes::copy_from_slice(bytes)));
    }
    Ok(name)
}

pub fn encode_interest(name: &Name, options: &InterestOptions, nonce: u32) -> Bytes {
    let mut inner = BytesMut::new();
    inner.put_slice(&encode_name(name));
    if options.can_be_prefix {
        write_tlv(&mut inner, CAN_BE_PREFIX, &[]);
    }
    if options.must_be_fresh {
        write_tlv(&mut inner, MUST_BE_FRESH, &[]);
    }
    write_tlv(&mut inner, NONCE, &nonce.to_be_bytes());
    write_non_negative_integer(
        &mut inner,
        INTEREST_LIFETIME,
        options.lifetime.as_millis() as u64,
    );

    let mut out = BytesMut::with_capacity(inner.len() + 4);
    write_tlv(&mut out, INTEREST, &inner);
    out.freeze()
}

/// Encode a Data packet. `sign` receives the bytes from the Name through the
/// end of SignatureInfo and returns the signature value.
pub fn encode_data<F>(
    name: &Name,
    content: &[u8],
    key_locator: &KeyLocator,
    signature_type: u64,
    sign: F,
) -> Bytes
where
    F: FnOnce(&[u8]) -> Vec<u8>,
{
    let mut signed = BytesMut::new();
    signed.put_slice(&encode_name(name));
    write_tlv(&mut signed, CONTENT, content);

    let mut signature_info = BytesMut::new();
    write_non_negative_integer(&mut signature_info, SIGNATURE_TYPE, signature_type);
    match key_locator {
        KeyLocator::ByName(key_name) => {
            write_tlv(&mut signature_info, KEY_LOCATOR, &encode_name(key_name));
        }
        KeyLocator::ByKey(key) => {
            let mut locator = BytesMut::new();
            write_tlv(&mut locator, KEY_LOCATOR_KEY, key);
            write_tlv(&mut signature_info, KEY_LOCATOR, &locator);
        }
        KeyLocator::Unsupported(kind) => {
            let mut locator = BytesMut::new();
            write_tlv(&mut locator, *kind, &[]);
            write_tlv(&mut signature_info, KEY_LOCATOR, &locator);
        }
    }
    write_tlv(&mut signed, SIGNATURE_INFO, &signature_info);

    let signature = sign(&signed[..]);
    let mut inner = signed;
    write_tlv(&mut inner, SIGNATURE_VALUE, &signature);

    let mut out = BytesMut::with_capacity(inner.len() + 4);
    write_tlv(&mut out, DATA, &inner);
    out.freeze()
}

/// Decode one packet, unwrapping a link-layer envelope if present.
pub fn decode_packet(wire: &[u8]) -> Result<Packet, TlvError> {
    decode_network_packet(wire, true)
}

/// `allow_lp` is false inside a fragment: envelopes never nest.
fn decode_network_packet(wire: &[u8], allow_lp: bool) -> Result<Packet, TlvError> {
    let mut codec = WireCodec::new(wire);
    let (kind, value) = read_tlv(&mut codec)?;
    match kind {
        DATA => Ok(Packet::Data(decode_data_value(value)?)),
        INTEREST => Ok(Packet::Interest(decode_interest_name(value)?)),
        LP_PACKET if allow_lp => decode_lp_packet(value),
        LP_PACKET => Err(TlvError::NestedLpPacket),
        other => {
            trace!("Ignoring packet of TLV type {:#x}", other);
            Ok(Packet::Other(other))
        }
    }
}

/// Decode a bare Data packet.
pub fn decode_data(wire: &[u8]) -> Result<SignedObject, TlvError> {
    match decode_packet(wire)? {
        Packet::Data(object) => Ok(object),
        Packet::Interest(_) => Err(TlvError::UnexpectedType {
            expected: DATA,
            found: INTEREST,
        }),
        Packet::Nack { .. } => Err(TlvError::UnexpectedType {
            expected: DATA,
            found: LP_NACK,
        }),
        Packet::Other(found) => Err(TlvError::UnexpectedType {
            expected: DATA,
            found,
        }),
    }
}

fn decode_lp_packet(value: &[u8]) -> Result<Packet, TlvError> {
    let mut codec = WireCodec::new(value);
    let mut nack_reason = None;
    let mut fragment = None;
    while !codec.at_end() {
        let (kind, field) = read_tlv(&mut codec)?;
        match kind {
            LP_NACK => {
                let mut nack = WireCodec::new(field);
                let mut reason = 0;
                while !nack.at_end() {
                    let (kind, value) = read_tlv(&mut nack)?;
                    if kind == LP_NACK_REASON {
                        reason = read_non_negative_integer(value)?;
                    }
                }
                nack_reason = Some(reason);
            }
            LP_FRAGMENT => fragment = Some(field),
            _ => {}
        }
    }

    let fragment = fragment.ok_or(TlvError::MissingField("Fragment"))?;
    match (decode_network_packet(fragment, false)?, nack_reason) {
        (Packet::Interest(name), Some(reason)) => Ok(Packet::Nack { name, reason }),
        (packet, _) => Ok(packet),
    }
}

fn decode_interest_name(value: &[u8]) -> Result<Name, TlvError> {
    let mut codec = WireCodec::new(value);
    let (kind, name) = read_tlv(&mut codec)?;
    if kind != NAME {
        return Err(TlvError::UnexpectedType {
            expected: NAME,
            found: kind,
        });
    }
    decode_name(name)
}

fn decode_data_value(value: &[u8]) -> Result<SignedObject, TlvError> {
    let mut codec = WireCodec::new(value);

    let (kind, name) = read_tlv(&mut codec)?;
    if kind != NAME {
        return Err(TlvError::UnexpectedType {
            expected: NAME,
            found: kind,
        });
    }
    let name = decode_name(name)?;

    let mut content = Bytes::new();
    let mut signature_info = None;
    let mut signature = None;
    let mut signed_end = 0;
    while !codec.at_end() {
        let start = codec.position();
        let (kind, field) = read_tlv(&mut codec)?;
        match kind {
            META_INFO => {}
            CONTENT => content = Bytes::copy_from_slice(field),
            SIGNATURE_INFO => signature_info = Some(decode_signature_info(field)?),
            SIGNATURE_VALUE => {
                signed_end = start;
                signature = Some(Bytes::copy_from_slice(field));
                break;
            }
            _ => trace!("Skipping unrecognized Data field {:#x}", kind),
        }
    }

    let (signature_type, key_locator) =
        signature_info.ok_or(TlvError::MissingField("SignatureInfo"))?;
    let signature = signature.ok_or(TlvError::MissingField("SignatureValue"))?;

    Ok(SignedObject {
        name,
        content,
        key_locator,
        signature_type,
        signed_portion: Bytes::copy_from_slice(&value[..signed_end]),
        signature,
    })
}

fn decode_signature_info(value: &[u8]) -> Result<(u64, KeyLocator), TlvError> {
    let mut codec = WireCodec::new(value);
    let mut signature_type = None;
    let mut key_locator = KeyLocator::Unsupported(KEY_LOCATOR);
    while !codec.at_end() {
        let (kind, field) = read_tlv(&mut codec)?;
        match kind {
            SIGNATURE_TYPE => signature_type = Some(read_non_negative_integer(field)?),
            KEY_LOCATOR => key_locator = decode_key_locator(field)?,
            _ => {}
        }
    }
    let signature_type = signature_type.ok_or(TlvError::MissingField("SignatureType"))?;
    Ok((signature_type, key_locator))
}

fn decode_key_locator(value: &[u8]) -> Result<KeyLocator, TlvError> {
    if value.is_empty() {
        return Ok(KeyLocator::Unsupported(KEY_LOCATOR));
    }
    let mut codec = WireCodec::new(value);
    let (kind, field) = read_tlv(&mut codec)?;
    Ok(match kind {
        NAME => KeyLocator::ByName(decode_name(field)?),
        KEY_LOCATOR_KEY => KeyLocator::ByKey(Bytes::copy_from_slice(field)),
        other => KeyLocator::Unsupported(other),
    })
}
