#![forbid(unsafe_code)]

//! Length-prefixed binary codec shared by every message on the transport.
//!
//! Encodings:
//! - `bool`: one byte, `0x00` or `0x01`.
//! - `vint`: unsigned 32-bit, 7 bits per byte, least significant group first.
//! - `i64`: 8 bytes big-endian.
//! - string: `vint` byte length, then UTF-8 bytes.
//! - optional values: presence `bool`, then the value when present.

use thiserror::Error;

pub const DEFAULT_MAX_STRING_LEN: usize = 16 * 1024;

const VINT_MAX_BYTES: usize = 5;
// Only the low 4 payload bits of the fifth byte fit in a u32.
const VINT_LAST_BYTE_OVERFLOW_MASK: u8 = 0x70;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of stream at offset {offset}: needed {needed} more byte(s)")]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("invalid boolean byte 0x{byte:02x} at offset {offset}")]
    InvalidBool { offset: usize, byte: u8 },
    #[error("variable-length integer at offset {offset} is longer than 5 bytes")]
    VIntTooLong { offset: usize },
    #[error("variable-length integer at offset {offset} overflows 32 bits")]
    VIntOverflow { offset: usize },
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
    #[error("declared length {declared} at offset {offset} exceeds limit {limit}")]
    LengthLimitExceeded {
        offset: usize,
        declared: usize,
        limit: usize,
    },
    #[error("{remaining} trailing byte(s) after message")]
    TrailingBytes { remaining: usize },
}

/// Types that know how to encode themselves on a [`StreamOutput`].
pub trait Writeable {
    fn write_to(&self, out: &mut StreamOutput);
}

/// Types that can be reconstructed in one step from a [`StreamInput`].
pub trait Readable: Sized {
    fn read_from(input: &mut StreamInput<'_>) -> Result<Self, DecodeError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOutput {
    buf: Vec<u8>,
}

impl StreamOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(u8::from(value));
    }

    pub fn write_vint(&mut self, mut value: u32) {
        while value >= 0x80 {
            self.buf.push(((value & 0x7f) as u8) | 0x80);
            value >>= 7;
        }
        self.buf.push(value as u8);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes `value` behind its byte-length prefix.
    ///
    /// # Panics
    ///
    /// Panics if `value` is longer than `u32::MAX` bytes, which no length prefix can
    /// express.
    pub fn write_string(&mut self, value: &str) {
        assert!(
            value.len() <= u32::MAX as usize,
            "string length exceeds u32::MAX"
        );
        self.write_vint(value.len() as u32);
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn write_optional_string(&mut self, value: Option<&str>) {
        match value {
            Some(v) => {
                self.write_bool(true);
                self.write_string(v);
            }
            None => self.write_bool(false),
        }
    }

    pub fn write_optional_writeable<W: Writeable>(&mut self, value: Option<&W>) {
        match value {
            Some(v) => {
                self.write_bool(true);
                v.write_to(self);
            }
            None => self.write_bool(false),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

#[derive(Debug, Clone)]
pub struct StreamInput<'a> {
    buf: &'a [u8],
    pos: usize,
    max_string_len: usize,
}

impl<'a> StreamInput<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }

    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn expect_end(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(DecodeError::TrailingBytes { remaining }),
        }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let offset = self.pos;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            byte => Err(DecodeError::InvalidBool { offset, byte }),
        }
    }

    pub fn read_vint(&mut self) -> Result<u32, DecodeError> {
        let offset = self.pos;
        let mut value: u32 = 0;
        for idx in 0..VINT_MAX_BYTES {
            let byte = self.read_u8()?;
            if idx == VINT_MAX_BYTES - 1 && byte & VINT_LAST_BYTE_OVERFLOW_MASK != 0 {
                return Err(DecodeError::VIntOverflow { offset });
            }
            value |= u32::from(byte & 0x7f) << (7 * idx);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::VIntTooLong { offset })
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(i64::from_be_bytes(raw))
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let offset = self.pos;
        let declared = self.read_vint()? as usize;
        if declared > self.max_string_len {
            return Err(DecodeError::LengthLimitExceeded {
                offset,
                declared,
                limit: self.max_string_len,
            });
        }
        let body_offset = self.pos;
        let bytes = self.take(declared)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8 {
                offset: body_offset,
            })
    }

    pub fn read_optional_string(&mut self) -> Result<Option<String>, DecodeError> {
        if self.read_bool()? {
            self.read_string().map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn read_optional_readable<R: Readable>(&mut self) -> Result<Option<R>, DecodeError> {
        if self.read_bool()? {
            R::read_from(self).map(Some)
        } else {
            Ok(None)
        }
    }
}
