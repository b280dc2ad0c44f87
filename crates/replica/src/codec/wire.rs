// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire format v1 primitives.
//!
//! ```text
//! frame   := magic "RPL" | version u8 | fingerprint [u8; 8] | value
//! value   := tag u8 | payload
//! ```
//!
//! | Payload        | Encoding                                         |
//! |----------------|--------------------------------------------------|
//! | bool           | one byte, 0 or 1                                 |
//! | signed int     | zig-zag LEB128 varint                            |
//! | unsigned int   | LEB128 varint                                    |
//! | f32 / f64      | IEEE-754 little-endian, 4 / 8 bytes              |
//! | char           | varint code point                                |
//! | string         | varint byte length, UTF-8 bytes                  |
//! | time           | zig-zag varint seconds since epoch, varint nanos |
//! | pointer        | presence byte, then value if present             |
//! | polymorphic    | presence byte, then string name and value        |
//! | array/sequence | varint count, then values                        |
//! | map            | varint count, then key/value pairs               |
//! | record         | varint visible-field count, then values          |

use crate::config::{MAX_VARINT_LEN, PREALLOC_LIMIT};
use crate::error::{DecodeError, EncodeError};
use crate::reflect::LeafKind;
use std::io::{self, Read, Write};

/// One-byte kind marker preceding every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireTag {
    Bool = 0x01,
    I8 = 0x02,
    I16 = 0x03,
    I32 = 0x04,
    I64 = 0x05,
    Isize = 0x06,
    U8 = 0x07,
    U16 = 0x08,
    U32 = 0x09,
    U64 = 0x0A,
    Usize = 0x0B,
    F32 = 0x0C,
    F64 = 0x0D,
    Char = 0x0E,
    String = 0x0F,
    Time = 0x10,
    Pointer = 0x20,
    Polymorphic = 0x21,
    Array = 0x22,
    Sequence = 0x23,
    Map = 0x24,
    Record = 0x25,
}

impl WireTag {
    pub const fn leaf(kind: LeafKind) -> Self {
        match kind {
            LeafKind::Bool => WireTag::Bool,
            LeafKind::I8 => WireTag::I8,
            LeafKind::I16 => WireTag::I16,
            LeafKind::I32 => WireTag::I32,
            LeafKind::I64 => WireTag::I64,
            LeafKind::Isize => WireTag::Isize,
            LeafKind::U8 => WireTag::U8,
            LeafKind::U16 => WireTag::U16,
            LeafKind::U32 => WireTag::U32,
            LeafKind::U64 => WireTag::U64,
            LeafKind::Usize => WireTag::Usize,
            LeafKind::F32 => WireTag::F32,
            LeafKind::F64 => WireTag::F64,
            LeafKind::Char => WireTag::Char,
            LeafKind::String => WireTag::String,
            LeafKind::Time => WireTag::Time,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Presence byte values for pointers and polymorphic slots.
pub(crate) const ABSENT: u8 = 0;
pub(crate) const PRESENT: u8 = 1;

#[inline]
pub(crate) fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub(crate) fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

/// Byte sink with a running count.
pub(crate) struct WireWriter<'w> {
    inner: &'w mut dyn Write,
    written: usize,
}

impl<'w> WireWriter<'w> {
    pub(crate) fn new(inner: &'w mut dyn Write) -> Self {
        Self { inner, written: 0 }
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    pub(crate) fn put(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    pub(crate) fn put_u8(&mut self, byte: u8) -> Result<(), EncodeError> {
        self.put(&[byte])
    }

    pub(crate) fn put_varint(&mut self, mut value: u64) -> Result<(), EncodeError> {
        let mut buf = [0u8; MAX_VARINT_LEN];
        let mut len = 0;
        loop {
            let byte = (value & 0x7F) as u8;
            value >>= 7;
            if value == 0 {
                buf[len] = byte;
                len += 1;
                break;
            }
            buf[len] = byte | 0x80;
            len += 1;
        }
        self.put(&buf[..len])
    }

    pub(crate) fn put_zigzag(&mut self, value: i64) -> Result<(), EncodeError> {
        self.put_varint(zigzag_encode(value))
    }

    pub(crate) fn put_len(&mut self, len: usize) -> Result<(), EncodeError> {
        self.put_varint(len as u64)
    }

    pub(crate) fn put_str(&mut self, value: &str) -> Result<(), EncodeError> {
        self.put_len(value.len())?;
        self.put(value.as_bytes())
    }

    pub(crate) fn flush(&mut self) -> Result<(), EncodeError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Byte source with a running count. Short reads surface as [`DecodeError::Truncated`].
pub(crate) struct WireReader<'r> {
    inner: &'r mut dyn Read,
    consumed: usize,
}

impl<'r> WireReader<'r> {
    pub(crate) fn new(inner: &'r mut dyn Read) -> Self {
        Self { inner, consumed: 0 }
    }

    pub(crate) fn consumed(&self) -> usize {
        self.consumed
    }

    pub(crate) fn exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeError> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.consumed += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(DecodeError::Truncated),
            Err(e) => Err(DecodeError::Io(e)),
        }
    }

    pub(crate) fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut buf = [0u8; N];
        self.exact(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn byte(&mut self) -> Result<u8, DecodeError> {
        let [byte] = self.array::<1>()?;
        Ok(byte)
    }

    pub(crate) fn varint(&mut self) -> Result<u64, DecodeError> {
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.byte()?;
            let bits = u64::from(byte & 0x7F);
            // The tenth byte may only contribute the top bit.
            if i == MAX_VARINT_LEN - 1 && bits > 1 {
                return Err(DecodeError::VarintOverflow);
            }
            value |= bits << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(DecodeError::VarintOverflow)
    }

    pub(crate) fn zigzag(&mut self) -> Result<i64, DecodeError> {
        Ok(zigzag_decode(self.varint()?))
    }

    /// Length prefix checked against `limit` before anything is allocated.
    pub(crate) fn len(&mut self, limit: usize) -> Result<usize, DecodeError> {
        let len = self.varint()?;
        match usize::try_from(len) {
            Ok(n) if n <= limit => Ok(n),
            _ => Err(DecodeError::TooLarge { len, limit }),
        }
    }

    pub(crate) fn string(&mut self, limit: usize) -> Result<String, DecodeError> {
        let len = self.len(limit)?;
        let mut bytes = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        let read = (&mut *self.inner).take(len as u64).read_to_end(&mut bytes)?;
        self.consumed += read;
        if read < len {
            return Err(DecodeError::Truncated);
        }
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }

    /// Counts and discards whatever is left in the source.
    pub(crate) fn drain(&mut self) -> Result<usize, DecodeError> {
        let remaining = io::copy(&mut self.inner, &mut io::sink())?;
        Ok(usize::try_from(remaining).unwrap_or(usize::MAX))
    }
}
