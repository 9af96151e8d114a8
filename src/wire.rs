//! Bounded reads over an untrusted byte buffer.

use bitstream_io::{BigEndian, BitRead, BitReader};
use thiserror::Error;

/// Widest integer `read_uint` will decode, in bytes.
pub const MAX_UINT_WIDTH: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Read out of bounds: need {need} bytes, have {have} bytes")]
    OutOfBounds { need: usize, have: usize },

    #[error("Integer width {0} exceeds 4 bytes")]
    WidthError(usize),

    #[error("Text field is not ASCII")]
    NotAscii,
}

/// Cursor over a fixed byte buffer.
///
/// Reads check bounds against the cursor; `seek` and `advance` only move it,
/// so a bad position surfaces on the next read instead.
#[derive(Debug, Clone)]
pub struct WireCodec<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireCodec<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Return the next `n` bytes and advance past them.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        let have = self.remaining();
        if n > have {
            return Err(CodecError::OutOfBounds { need: n, have });
        }
        let start = self.pos;
        self.pos += n;
        Ok(&self.buf[start..self.pos])
    }

    /// Read `n` bytes as ASCII text.
    pub fn read_string(&mut self, n: usize) -> Result<String, CodecError> {
        let bytes = self.read_bytes(n)?;
        if !bytes.is_ascii() {
            return Err(CodecError::NotAscii);
        }
        // ASCII is always valid UTF-8
        Ok(bytes.iter().map(|&b| b as char).collect())
    }

    /// Read `n` bytes as a big-endian unsigned integer (`n <= 4`).
    pub fn read_uint(&mut self, n: usize) -> Result<u32, CodecError> {
        if n > MAX_UINT_WIDTH {
            return Err(CodecError::WidthError(n));
        }
        let bytes = self.read_bytes(n)?;
        if n == 0 {
            return Ok(0);
        }
        let mut reader = BitReader::<_, BigEndian>::new(bytes);
        reader
            .read_var::<u32>(n as u32 * 8)
            .map_err(|_| CodecError::OutOfBounds { need: n, have: 0 })
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.read_uint(1)? as u8)
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(self.read_uint(2)? as u16)
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.read_uint(4)
    }

    /// Byte at the cursor, without advancing.
    pub fn peek_byte(&self) -> Result<u8, CodecError> {
        self.buf
            .get(self.pos)
            .copied()
            .ok_or(CodecError::OutOfBounds { need: 1, have: 0 })
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn advance(&mut self, n: usize) {
        self.pos = self.pos.saturating_add(n);
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
