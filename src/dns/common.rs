use bitstream_io::{BitWrite, BitWriter, Endianness};
use bytes::Bytes;

use super::ParseError;
use crate::ndn::{Component, Name};
use crate::wire::{CodecError, WireCodec};

pub const MAX_LABEL_LENGTH: usize = 63;
pub const MAX_NAME_LENGTH: usize = 255;
/// Compression pointers followed while reading a single name.
pub const MAX_POINTER_JUMPS: usize = 16;

pub trait PacketComponent {
    fn write<E: Endianness>(
        &self,
        writer: &mut BitWriter<&mut Vec<u8>, E>,
    ) -> Result<(), ParseError>;
    fn read(&mut self, codec: &mut WireCodec<'_>) -> Result<(), ParseError>;
}

/// Read a domain name as labels, following compression pointers.
///
/// Pointers must jump strictly backwards; after the name the cursor sits just
/// past the first pointer (or the terminating zero label).
pub fn read_labels(codec: &mut WireCodec<'_>) -> Result<Vec<String>, ParseError> {
    let mut labels = Vec::new();
    let mut resume_at = None;
    let mut jumps = 0;
    let mut wire_len = 1;

    loop {
        let len = codec.peek_byte()?;
        match len & 0xC0 {
            0xC0 => {
                let pointer_at = codec.position();
                let target = (codec.read_u16()? & 0x3FFF) as usize;
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS || target >= pointer_at {
                    return Err(ParseError::PointerLoop(pointer_at));
                }
                if resume_at.is_none() {
                    resume_at = Some(codec.position());
                }
                codec.seek(target);
            }
            0x00 => {
                codec.advance(1);
                if len == 0 {
                    break;
                }
                let label = codec.read_string(len as usize).map_err(|e| match e {
                    CodecError::NotAscii => ParseError::InvalidLabel,
                    other => ParseError::Codec(other),
                })?;
                // Labels are joined with dots downstream
                if label.contains('.') {
                    return Err(ParseError::InvalidLabel);
                }
                wire_len += label.len() + 1;
                if wire_len > MAX_NAME_LENGTH {
                    return Err(ParseError::InvalidLabel);
                }
                labels.push(label);
            }
            _ => return Err(ParseError::InvalidLabel),
        }
    }

    if let Some(pos) = resume_at {
        codec.seek(pos);
    }
    Ok(labels)
}

/// Write labels uncompressed, followed by the root label.
pub fn write_labels<E: Endianness>(
    writer: &mut BitWriter<&mut Vec<u8>, E>,
    labels: &[String],
) -> Result<(), ParseError> {
    for label in labels {
        if label.is_empty() || label.len() > MAX_LABEL_LENGTH || label.contains('.') {
            return Err(ParseError::InvalidLabel);
        }
        writer.write_var::<u8>(8, label.len() as u8)?;
        writer.write_bytes(label.as_bytes())?;
    }
    writer.write_var::<u8>(8, 0)?;
    Ok(())
}

/// Read a length-prefixed component sequence terminated by a zero length.
/// Used for names embedded in record data; never compressed.
pub fn read_component_sequence(codec: &mut WireCodec<'_>) -> Result<Name, ParseError> {
    let mut name = Name::new();
    loop {
        let len = codec.read_u8()?;
        if len == 0 {
            return Ok(name);
        }
        let value = codec.read_bytes(len as usize)?;
        name.push(Component::new(Bytes::copy_from_slice(value)));
    }
}

pub fn write_component_sequence<E: Endianness>(
    writer: &mut BitWriter<&mut Vec<u8>, E>,
    name: &Name,
) -> Result<(), ParseError> {
    for component in name.components() {
        let value = component.value();
        if value.is_empty() || value.len() > u8::MAX as usize {
            return Err(ParseError::InvalidLabel);
        }
        writer.write_var::<u8>(8, value.len() as u8)?;
        writer.write_bytes(value)?;
    }
    writer.write_var::<u8>(8, 0)?;
    Ok(())
}

/// Dotted, absolute form of a label list: `["b", "a"]` is `b.a.`, the empty
/// list is `.`.
pub fn labels_to_name(labels: &[String]) -> String {
    if labels.is_empty() {
        return ".".to_string();
    }
    let mut name = labels.join(".");
    name.push('.');
    name
}

pub fn name_to_labels(name: &str) -> Vec<String> {
    name.split('.')
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_to_name() {
        assert_eq!(labels_to_name(&[]), ".");
        assert_eq!(labels_to_name(&["b".to_string(), "a".to_string()]), "b.a.");
        assert_eq!(name_to_labels("b.a."), vec!["b", "a"]);
        assert!(name_to_labels(".").is_empty());
    }

    #[test]
    fn test_pointer_must_jump_backwards() {
        // Pointer at offset 0 pointing at itself
        let buf = [0xC0, 0x00];
        let mut codec = WireCodec::new(&buf);
        assert_eq!(read_labels(&mut codec), Err(ParseError::PointerLoop(0)));
    }

    #[test]
    fn test_reserved_label_bits_rejected() {
        let buf = [0x40, 0x00];
        let mut codec = WireCodec::new(&buf);
        assert_eq!(read_labels(&mut codec), Err(ParseError::InvalidLabel));
    }
}
