pub mod common;
pub mod enums;
pub mod header;
pub mod question;
pub mod resource;

use bitstream_io::{BigEndian, BitWriter};
use common::PacketComponent;
use header::DNSHeader;
use question::DNSQuestion;
use resource::DNSResource;
use std::fmt;
use tracing::{debug, trace};

pub use enums::{DNSResourceClass, DNSResourceType};
pub use resource::DNSResourceData;

use crate::wire::{CodecError, WireCodec};

/// Smallest possible resource record: root owner, fixed fields, no data.
const MIN_RECORD_SIZE: usize = 11;

/// A DNS message carried as the content of an NDNS response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DNSMessage {
    pub header: DNSHeader,
    pub question: DNSQuestion,
    pub answers: Vec<DNSResource>,
    pub authorities: Vec<DNSResource>,
    pub additionals: Vec<DNSResource>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidHeader,
    InvalidLabel,
    QuestionCount(u16),
    PointerLoop(usize),
    RdataOverrun { declared: usize, available: usize },
    RdataLength { declared: usize, consumed: usize },
    TrailingBytes(usize),
    Codec(CodecError),
    InvalidBitStream(String),
}

impl From<std::io::Error> for ParseError {
    fn from(e: std::io::Error) -> Self {
        ParseError::InvalidBitStream(e.to_string())
    }
}

impl From<CodecError> for ParseError {
    fn from(e: CodecError) -> Self {
        ParseError::Codec(e)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidHeader => write!(f, "Invalid DNS header"),
            ParseError::InvalidLabel => write!(f, "Invalid DNS label"),
            ParseError::QuestionCount(n) => {
                write!(f, "Expected exactly one question, found {}", n)
            }
            ParseError::PointerLoop(at) => {
                write!(f, "Compression pointer at offset {} does not point backwards", at)
            }
            ParseError::RdataOverrun {
                declared,
                available,
            } => write!(
                f,
                "Record data of {} bytes overruns packet ({} bytes left)",
                declared, available
            ),
            ParseError::RdataLength { declared, consumed } => write!(
                f,
                "Record data declared {} bytes but decoding used {}",
                declared, consumed
            ),
            ParseError::TrailingBytes(n) => write!(f, "{} trailing bytes after last record", n),
            ParseError::Codec(e) => write!(f, "Truncated packet: {}", e),
            ParseError::InvalidBitStream(e) => write!(f, "Invalid bit stream: {}", e),
        }
    }
}

impl std::error::Error for ParseError {}

impl DNSMessage {
    /// Authoritative response to `question` carrying `answers`.
    pub fn response(question: DNSQuestion, answers: Vec<DNSResource>) -> Self {
        Self {
            header: DNSHeader {
                qr: true,
                aa: true,
                ..DNSHeader::default()
            },
            question,
            answers,
            ..Self::default()
        }
    }

    pub fn first_answer(&self) -> Option<&DNSResource> {
        self.answers.first()
    }

    pub fn parse(buf: &[u8]) -> Result<Self, ParseError> {
        trace!("Parsing DNS message, size: {} bytes", buf.len());
        let mut codec = WireCodec::new(buf);
        let mut message = DNSMessage::default();
        message.header.read(&mut codec)?;
        debug!(
            "Parsed DNS header: id={}, qr={}, rcode={}, answers={}",
            message.header.id, message.header.qr, message.header.rcode, message.header.ancount
        );
        if message.header.qdcount != 1 {
            return Err(ParseError::QuestionCount(message.header.qdcount));
        }
        message.question.read(&mut codec)?;

        message.answers = read_section(&mut codec, message.header.ancount)?;
        message.authorities = read_section(&mut codec, message.header.nscount)?;
        message.additionals = read_section(&mut codec, message.header.arcount)?;

        if !codec.at_end() {
            return Err(ParseError::TrailingBytes(codec.remaining()));
        }
        Ok(message)
    }

    /// Encode without name compression; section counts are taken from the
    /// section lengths, not the stored header.
    pub fn serialize(&self) -> Result<Vec<u8>, ParseError> {
        let mut buf = Vec::new();
        let mut writer: BitWriter<&mut Vec<u8>, BigEndian> = BitWriter::new(&mut buf);

        let mut header = self.header.clone();
        header.qdcount = 1;
        header.ancount = section_count(&self.answers)?;
        header.nscount = section_count(&self.authorities)?;
        header.arcount = section_count(&self.additionals)?;
        header.write(&mut writer)?;

        self.question.write(&mut writer)?;
        for record in self
            .answers
            .iter()
            .chain(&self.authorities)
            .chain(&self.additionals)
        {
            record.write(&mut writer)?;
        }

        Ok(buf)
    }
}

fn read_section(codec: &mut WireCodec<'_>, count: u16) -> Result<Vec<DNSResource>, ParseError> {
    // Counts come off the wire; don't let them size the allocation
    let mut records = Vec::with_capacity((count as usize).min(codec.remaining() / MIN_RECORD_SIZE));
    for _ in 0..count {
        let mut record = DNSResource::default();
        record.read(codec)?;
        records.push(record);
    }
    Ok(records)
}

fn section_count(records: &[DNSResource]) -> Result<u16, ParseError> {
    u16::try_from(records.len()).map_err(|_| ParseError::InvalidHeader)
}

impl fmt::Display for DNSMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            ";; id: {}, rcode: {}, answers: {}, authority: {}, additional: {}",
            self.header.id,
            self.header.rcode,
            self.answers.len(),
            self.authorities.len(),
            self.additionals.len()
        )?;
        writeln!(f, ";; QUESTION")?;
        writeln!(
            f,
            ";{}\t\t{}\t{}",
            self.question.name(),
            self.question.qclass,
            self.question.qtype
        )?;
        for (title, records) in [
            ("ANSWER", &self.answers),
            ("AUTHORITY", &self.authorities),
            ("ADDITIONAL", &self.additionals),
        ] {
            if records.is_empty() {
                continue;
            }
            writeln!(f, ";; {}", title)?;
            for record in records {
                writeln!(f, "{}", record)?;
            }
        }
        Ok(())
    }
}
