use bytes::{BufMut, Bytes, BytesMut};
use ring::{digest, signature};
use thiserror::Error;

use super::algorithm::KeyAlgorithm;
use crate::ndn::SignedObject;
use crate::wire::{CodecError, WireCodec};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key data is truncated: {0}")]
    Truncated(#[from] CodecError),

    #[error("Unsupported key algorithm {0}")]
    UnsupportedAlgorithm(u8),

    #[error("Key data is empty")]
    Empty,
}

/// A verification key: one algorithm octet followed by the key in the form
/// the algorithm expects (raw Ed25519 key, uncompressed EC point, or
/// PKCS#1 RSAPublicKey).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    algorithm: KeyAlgorithm,
    key: Bytes,
}

impl PublicKey {
    pub fn new(algorithm: KeyAlgorithm, key: impl Into<Bytes>) -> Result<Self, KeyError> {
        let key = key.into();
        if key.is_empty() {
            return Err(KeyError::Empty);
        }
        Ok(Self { algorithm, key })
    }

    /// Decode the key encoding carried in certificate content and embedded
    /// key locators.
    pub fn decode(data: &[u8]) -> Result<Self, KeyError> {
        let mut codec = WireCodec::new(data);
        let number = codec.read_u8()?;
        let algorithm = KeyAlgorithm::from_u8(number).ok_or(KeyError::UnsupportedAlgorithm(number))?;
        let key = codec.read_bytes(codec.remaining())?;
        Self::new(algorithm, Bytes::copy_from_slice(key))
    }

    pub fn encode(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.key.len() + 1);
        out.put_u8(self.algorithm.to_u8());
        out.put_slice(&self.key);
        out.freeze()
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn key_bytes(&self) -> &[u8] {
        &self.key
    }

    /// Short SHA-256 fingerprint for log lines.
    pub fn fingerprint(&self) -> String {
        let hash = digest::digest(&digest::SHA256, &self.key);
        hex::encode(&hash.as_ref()[..8])
    }

    pub fn verify(&self, message: &[u8], sig: &[u8]) -> bool {
        signature::UnparsedPublicKey::new(self.algorithm.ring_algorithm(), &self.key)
            .verify(message, sig)
            .is_ok()
    }

    /// Check `object`'s signature over its signed portion. The object's
    /// signature type must agree with this key's algorithm.
    pub fn verify_object(&self, object: &SignedObject) -> bool {
        object.signature_type == self.algorithm.signature_type()
            && self.verify(&object.signed_portion, &object.signature)
    }
}
