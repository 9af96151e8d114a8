use bitstream_io::{BigEndian, BitWrite, BitWriter, Endianness};
use bytes::Bytes;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use super::{
    ParseError,
    common::{
        PacketComponent, labels_to_name, name_to_labels, read_component_sequence, read_labels,
        write_component_sequence, write_labels,
    },
    enums::{DNSResourceClass, DNSResourceType},
};
use crate::ndn::Name;
use crate::wire::WireCodec;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSResource {
    pub labels: Vec<String>,
    pub rtype: DNSResourceType,
    pub rclass: DNSResourceClass,
    pub ttl: u32,
    pub rdata: DNSResourceData,
}

/// Decoded record data. Types the resolver does not act on stay raw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DNSResourceData {
    #[default]
    Empty,
    /// NS: the delegated zone's name server.
    Delegation(Vec<String>),
    /// FH: where to route queries for the delegated zone.
    ForwardingHint { preference: u16, hint: Name },
    /// NEXISTS: the queried label is not a zone cut.
    Nonexistence,
    Raw(Bytes),
}

impl DNSResource {
    /// Record whose type follows from its data.
    pub fn new(owner: &str, ttl: u32, rdata: DNSResourceData) -> Self {
        let rtype = match &rdata {
            DNSResourceData::Delegation(_) => DNSResourceType::NS,
            DNSResourceData::ForwardingHint { .. } => DNSResourceType::FH,
            DNSResourceData::Nonexistence => DNSResourceType::NEXISTS,
            DNSResourceData::Empty | DNSResourceData::Raw(_) => DNSResourceType::Unknown(0),
        };
        Self {
            labels: name_to_labels(owner),
            rtype,
            rclass: DNSResourceClass::IN,
            ttl,
            rdata,
        }
    }

    pub fn raw(owner: &str, rtype: DNSResourceType, ttl: u32, data: impl Into<Bytes>) -> Self {
        Self {
            rtype,
            ..Self::new(owner, ttl, DNSResourceData::Raw(data.into()))
        }
    }

    pub fn name(&self) -> String {
        labels_to_name(&self.labels)
    }

    /// Dotted name server target of an NS record.
    pub fn delegation_target(&self) -> Option<String> {
        match &self.rdata {
            DNSResourceData::Delegation(labels) => Some(labels_to_name(labels)),
            _ => None,
        }
    }

    fn read_rdata(&mut self, codec: &mut WireCodec<'_>, rdlength: usize) -> Result<(), ParseError> {
        self.rdata = match self.rtype {
            DNSResourceType::NS => DNSResourceData::Delegation(read_labels(codec)?),
            DNSResourceType::FH => {
                let preference = codec.read_u16()?;
                let hint = read_component_sequence(codec)?;
                DNSResourceData::ForwardingHint { preference, hint }
            }
            DNSResourceType::NEXISTS => DNSResourceData::Nonexistence,
            _ => DNSResourceData::Raw(Bytes::copy_from_slice(codec.read_bytes(rdlength)?)),
        };
        Ok(())
    }

    fn write_rdata(&self) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::new();
        let mut writer: BitWriter<&mut Vec<u8>, BigEndian> = BitWriter::new(&mut buf);
        match &self.rdata {
            DNSResourceData::Empty | DNSResourceData::Nonexistence => {}
            DNSResourceData::Delegation(labels) => write_labels(&mut writer, labels)?,
            DNSResourceData::ForwardingHint { preference, hint } => {
                writer.write_var::<u16>(16, *preference)?;
                write_component_sequence(&mut writer, hint)?;
            }
            DNSResourceData::Raw(data) => writer.write_bytes(data)?,
        }
        Ok(buf)
    }
}

impl PacketComponent for DNSResource {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError> {
        let rdata = self.write_rdata()?;
        let rdlength = u16::try_from(rdata.len()).map_err(|_| ParseError::RdataLength {
            declared: u16::MAX as usize,
            consumed: rdata.len(),
        })?;
        write_labels(writer, &self.labels)?;
        writer.write_var::<u16>(16, self.rtype.into())?;
        writer.write_var::<u16>(16, self.rclass.into())?;
        writer.write_var::<u32>(32, self.ttl)?;
        writer.write_var::<u16>(16, rdlength)?;
        writer.write_bytes(&rdata)?;
        Ok(())
    }

    fn read(&mut self, codec: &mut WireCodec<'_>) -> Result<(), ParseError> {
        self.labels = read_labels(codec)?;
        self.rtype = codec.read_u16()?.into();
        self.rclass = codec.read_u16()?.into();
        self.ttl = codec.read_u32()?;
        let rdlength = codec.read_u16()? as usize;
        if rdlength > codec.remaining() {
            return Err(ParseError::RdataOverrun {
                declared: rdlength,
                available: codec.remaining(),
            });
        }

        let start = codec.position();
        self.read_rdata(codec, rdlength)?;
        let consumed = codec.position() - start;
        if consumed != rdlength {
            return Err(ParseError::RdataLength {
                declared: rdlength,
                consumed,
            });
        }
        Ok(())
    }
}

impl fmt::Display for DNSResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t",
            self.name(),
            self.ttl,
            self.rclass,
            self.rtype
        )?;
        match &self.rdata {
            DNSResourceData::Empty | DNSResourceData::Nonexistence => Ok(()),
            DNSResourceData::Delegation(labels) => f.write_str(&labels_to_name(labels)),
            DNSResourceData::ForwardingHint { preference, hint } => {
                write!(f, "{} {}", preference, hint)
            }
            DNSResourceData::Raw(data) => fmt_raw(f, self.rtype, data),
        }
    }
}

fn fmt_raw(f: &mut fmt::Formatter<'_>, rtype: DNSResourceType, data: &[u8]) -> fmt::Result {
    match (rtype, data.len()) {
        (DNSResourceType::A, 4) => {
            write!(f, "{}", Ipv4Addr::new(data[0], data[1], data[2], data[3]))
        }
        (DNSResourceType::AAAA, 16) => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(data);
            write!(f, "{}", Ipv6Addr::from(octets))
        }
        (DNSResourceType::TXT, _) => {
            let mut rest = data;
            let mut first = true;
            while let Some((&len, tail)) = rest.split_first() {
                let len = (len as usize).min(tail.len());
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "\"{}\"", String::from_utf8_lossy(&tail[..len]).escape_default())?;
                rest = &tail[len..];
                first = false;
            }
            Ok(())
        }
        // RFC 3597 generic form
        _ => write!(f, "\\# {} {}", data.len(), hex::encode(data)),
    }
}
