use std::fmt;
use std::str::FromStr;

/// Record types understood by the resolver. NDNS adds FH (forwarding hint)
/// and NEXISTS (authoritative non-existence) in the private-use range.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DNSResourceType {
    #[default]
    A,
    NS,
    CNAME,
    SOA,
    PTR,
    MX,
    TXT,
    AAAA,
    SRV,
    FH,
    NEXISTS,
    Unknown(u16),
}

impl DNSResourceType {
    pub const FH_CODE: u16 = 65281;
    pub const NEXISTS_CODE: u16 = 65282;

    pub fn mnemonic(&self) -> Option<&'static str> {
        Some(match self {
            DNSResourceType::A => "A",
            DNSResourceType::NS => "NS",
            DNSResourceType::CNAME => "CNAME",
            DNSResourceType::SOA => "SOA",
            DNSResourceType::PTR => "PTR",
            DNSResourceType::MX => "MX",
            DNSResourceType::TXT => "TXT",
            DNSResourceType::AAAA => "AAAA",
            DNSResourceType::SRV => "SRV",
            DNSResourceType::FH => "FH",
            DNSResourceType::NEXISTS => "NEXISTS",
            DNSResourceType::Unknown(_) => return None,
        })
    }
}

impl From<u16> for DNSResourceType {
    fn from(value: u16) -> Self {
        match value {
            1 => DNSResourceType::A,
            2 => DNSResourceType::NS,
            5 => DNSResourceType::CNAME,
            6 => DNSResourceType::SOA,
            12 => DNSResourceType::PTR,
            15 => DNSResourceType::MX,
            16 => DNSResourceType::TXT,
            28 => DNSResourceType::AAAA,
            33 => DNSResourceType::SRV,
            DNSResourceType::FH_CODE => DNSResourceType::FH,
            DNSResourceType::NEXISTS_CODE => DNSResourceType::NEXISTS,
            x => DNSResourceType::Unknown(x),
        }
    }
}

impl From<DNSResourceType> for u16 {
    fn from(value: DNSResourceType) -> Self {
        match value {
            DNSResourceType::A => 1,
            DNSResourceType::NS => 2,
            DNSResourceType::CNAME => 5,
            DNSResourceType::SOA => 6,
            DNSResourceType::PTR => 12,
            DNSResourceType::MX => 15,
            DNSResourceType::TXT => 16,
            DNSResourceType::AAAA => 28,
            DNSResourceType::SRV => 33,
            DNSResourceType::FH => DNSResourceType::FH_CODE,
            DNSResourceType::NEXISTS => DNSResourceType::NEXISTS_CODE,
            DNSResourceType::Unknown(x) => x,
        }
    }
}

impl fmt::Display for DNSResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mnemonic() {
            Some(mnemonic) => f.write_str(mnemonic),
            None => write!(f, "TYPE{}", u16::from(*self)),
        }
    }
}

impl FromStr for DNSResourceType {
    type Err = String;

    /// Accepts a mnemonic in any case, or the generic `TYPEnnn` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let parsed = match upper.as_str() {
            "A" => DNSResourceType::A,
            "NS" => DNSResourceType::NS,
            "CNAME" => DNSResourceType::CNAME,
            "SOA" => DNSResourceType::SOA,
            "PTR" => DNSResourceType::PTR,
            "MX" => DNSResourceType::MX,
            "TXT" => DNSResourceType::TXT,
            "AAAA" => DNSResourceType::AAAA,
            "SRV" => DNSResourceType::SRV,
            "FH" => DNSResourceType::FH,
            "NEXISTS" => DNSResourceType::NEXISTS,
            other => {
                let code = other
                    .strip_prefix("TYPE")
                    .and_then(|n| n.parse::<u16>().ok())
                    .ok_or_else(|| format!("Unknown record type: {}", s))?;
                DNSResourceType::from(code)
            }
        };
        Ok(parsed)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DNSResourceClass {
    #[default]
    IN,
    CS,
    CH,
    HS,
    Unknown(u16),
}

impl From<u16> for DNSResourceClass {
    fn from(value: u16) -> Self {
        match value {
            1 => DNSResourceClass::IN,
            2 => DNSResourceClass::CS,
            3 => DNSResourceClass::CH,
            4 => DNSResourceClass::HS,
            x => DNSResourceClass::Unknown(x),
        }
    }
}

impl From<DNSResourceClass> for u16 {
    fn from(value: DNSResourceClass) -> Self {
        match value {
            DNSResourceClass::IN => 1,
            DNSResourceClass::CS => 2,
            DNSResourceClass::CH => 3,
            DNSResourceClass::HS => 4,
            DNSResourceClass::Unknown(x) => x,
        }
    }
}

impl fmt::Display for DNSResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DNSResourceClass::IN => f.write_str("IN"),
            DNSResourceClass::CS => f.write_str("CS"),
            DNSResourceClass::CH => f.write_str("CH"),
            DNSResourceClass::HS => f.write_str("HS"),
            DNSResourceClass::Unknown(x) => write!(f, "CLASS{}", x),
        }
    }
}
