use std::fmt;
use std::str::FromStr;

use crate::ndn::tlv;

/// Public-key algorithms accepted for signed responses, numbered as in the
/// DNSSEC algorithm registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum KeyAlgorithm {
    /// RSA/SHA-256 (RFC 5702)
    RsaSha256 = 8,
    /// RSA/SHA-512 (RFC 5702)
    RsaSha512 = 10,
    /// ECDSA Curve P-256 with SHA-256 (RFC 6605)
    EcdsaP256Sha256 = 13,
    /// ECDSA Curve P-384 with SHA-384 (RFC 6605)
    EcdsaP384Sha384 = 14,
    /// Ed25519 (RFC 8080)
    Ed25519 = 15,
}

impl KeyAlgorithm {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            8 => Some(Self::RsaSha256),
            10 => Some(Self::RsaSha512),
            13 => Some(Self::EcdsaP256Sha256),
            14 => Some(Self::EcdsaP384Sha384),
            15 => Some(Self::Ed25519),
            _ => None,
        }
    }

    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Signature type a Data packet signed with this algorithm carries.
    pub fn signature_type(&self) -> u64 {
        match self {
            Self::RsaSha256 | Self::RsaSha512 => tlv::SIGNATURE_SHA256_WITH_RSA,
            Self::EcdsaP256Sha256 | Self::EcdsaP384Sha384 => tlv::SIGNATURE_SHA256_WITH_ECDSA,
            Self::Ed25519 => tlv::SIGNATURE_ED25519,
        }
    }

    pub fn ring_algorithm(&self) -> &'static dyn ring::signature::VerificationAlgorithm {
        match self {
            Self::RsaSha256 => &ring::signature::RSA_PKCS1_2048_8192_SHA256,
            Self::RsaSha512 => &ring::signature::RSA_PKCS1_2048_8192_SHA512,
            Self::EcdsaP256Sha256 => &ring::signature::ECDSA_P256_SHA256_ASN1,
            Self::EcdsaP384Sha384 => &ring::signature::ECDSA_P384_SHA384_ASN1,
            Self::Ed25519 => &ring::signature::ED25519,
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RsaSha256 => write!(f, "RSASHA256"),
            Self::RsaSha512 => write!(f, "RSASHA512"),
            Self::EcdsaP256Sha256 => write!(f, "ECDSAP256SHA256"),
            Self::EcdsaP384Sha384 => write!(f, "ECDSAP384SHA384"),
            Self::Ed25519 => write!(f, "ED25519"),
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = String;

    /// Mnemonic (any case) or algorithm number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(number) = s.parse::<u8>() {
            return Self::from_u8(number).ok_or_else(|| format!("Unsupported algorithm: {}", s));
        }
        match s.to_ascii_uppercase().as_str() {
            "RSASHA256" => Ok(Self::RsaSha256),
            "RSASHA512" => Ok(Self::RsaSha512),
            "ECDSAP256SHA256" => Ok(Self::EcdsaP256Sha256),
            "ECDSAP384SHA384" => Ok(Self::EcdsaP384Sha384),
            "ED25519" => Ok(Self::Ed25519),
            _ => Err(format!("Unsupported algorithm: {}", s)),
        }
    }
}
