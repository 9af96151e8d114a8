use bytes::Bytes;

use super::name::Name;

/// How a signed object identifies the key that signed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyLocator {
    /// Signer named indirectly; the certificate must be fetched.
    ByName(Name),
    /// Signer's public key embedded in the packet.
    ByKey(Bytes),
    /// Any other locator form, carrying the TLV type that was found.
    Unsupported(u64),
}

/// A named, signed response from the network.
///
/// `signed_portion` is the exact byte region the transport reports as covered
/// by `signature`; this crate verifies it but never recomputes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedObject {
    pub name: Name,
    pub content: Bytes,
    pub key_locator: KeyLocator,
    pub signature_type: u64,
    pub signed_portion: Bytes,
    pub signature: Bytes,
}

impl SignedObject {
    /// Name of the signing key, when the locator names one.
    pub fn key_name(&self) -> Option<&Name> {
        match &self.key_locator {
            KeyLocator::ByName(name) => Some(name),
            _ => None,
        }
    }
}
