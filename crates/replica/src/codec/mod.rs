// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven binary codec.
//!
//! Every [`TypeDescriptor`] carries the encode and decode function for its
//! kind, selected once at compile time. Encoding a value looks up its
//! descriptor, writes the frame header and hands the value to that function,
//! which recurses through child descriptors by id. Decoding mirrors it
//! against a zero value of the target type.
//!
//! The wire format is described in [`wire`]. Hidden record fields are never
//! written; on decode they keep their zero value.
//!
//! # Example
//!
//! ```rust
//! use replica::{Reflect, TypeRegistry};
//!
//! #[derive(Reflect, Debug, Clone, Default, PartialEq)]
//! pub struct Sample {
//!     pub id: u32,
//!     pub label: String,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TypeRegistry::new();
//! registry.register::<Sample>("demo.Sample")?;
//! let registry = registry.seal();
//!
//! let sample = Sample { id: 7, label: "seven".into() };
//! let mut buf = Vec::new();
//! registry.encoder().encode(None, &sample, &mut buf)?;
//!
//! let back: Sample = registry.decoder().decode_from_slice(&buf)?;
//! assert_eq!(back, sample);
//! # Ok(())
//! # }
//! ```

mod decode;
mod encode;
pub mod wire;

#[cfg(test)]
mod tests;

pub use wire::WireTag;

use crate::config::{CodecConfig, FINGERPRINT_LEN, WIRE_MAGIC, WIRE_VERSION};
use crate::error::{DecodeError, EncodeError};
use crate::reflect::{Reflect, Typed};
use crate::registry::{DescriptorId, DescriptorKind, SealedRegistry, TypeDescriptor};
use std::io::{Read, Write};
use wire::{WireReader, WireWriter};

/// Per-kind encode function stored in a descriptor.
pub type EncodeFn = fn(&mut EncodeCtx<'_>, &TypeDescriptor, &dyn Reflect) -> Result<(), EncodeError>;
/// Per-kind decode function stored in a descriptor.
pub type DecodeFn =
    fn(&mut DecodeCtx<'_>, &TypeDescriptor, &mut dyn Reflect) -> Result<(), DecodeError>;

/// Selects the encode/decode pair for a descriptor kind.
pub(crate) fn dispatch(kind: &DescriptorKind) -> (EncodeFn, DecodeFn) {
    match kind {
        DescriptorKind::Leaf(_) => (encode::leaf, decode::leaf),
        DescriptorKind::Pointer { .. } => (encode::pointer, decode::pointer),
        DescriptorKind::Polymorphic { .. } => (encode::polymorphic, decode::polymorphic),
        DescriptorKind::Array { .. } | DescriptorKind::Sequence { .. } => {
            (encode::list, decode::list)
        }
        DescriptorKind::Map { .. } => (encode::map, decode::map),
        DescriptorKind::Record { .. } => (encode::record, decode::record),
    }
}

/// State threaded through one encode call.
pub struct EncodeCtx<'a> {
    registry: &'a SealedRegistry,
    sink: WireWriter<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> EncodeCtx<'a> {
    /// Encodes `value` as an instance of descriptor `id`.
    pub(crate) fn value(&mut self, id: DescriptorId, value: &dyn Reflect) -> Result<(), EncodeError> {
        let registry = self.registry;
        let descriptor = registry
            .descriptor_by_id(id)
            .ok_or(EncodeError::InconsistentDescriptor {
                type_name: value.type_name(),
            })?;
        self.emit(descriptor, value)
    }

    pub(crate) fn emit(&mut self, descriptor: &TypeDescriptor, value: &dyn Reflect) -> Result<(), EncodeError> {
        if value.concrete_type_id() != descriptor.type_id {
            return Err(EncodeError::KindMismatch {
                expected: descriptor.type_name,
                found: value.type_name(),
            });
        }
        if self.depth >= self.max_depth {
            return Err(EncodeError::DepthExceeded {
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        let result = self
            .sink
            .put_u8(descriptor.wire_tag().as_u8())
            .and_then(|()| (descriptor.encode)(self, descriptor, value));
        self.depth -= 1;
        result
    }

    pub(crate) fn registry(&self) -> &'a SealedRegistry {
        self.registry
    }

    pub(crate) fn sink(&mut self) -> &mut WireWriter<'a> {
        &mut self.sink
    }
}

/// State threaded through one decode call.
pub struct DecodeCtx<'a> {
    registry: &'a SealedRegistry,
    source: WireReader<'a>,
    depth: usize,
    config: CodecConfig,
}

impl<'a> DecodeCtx<'a> {
    /// Decodes an instance of descriptor `id` into `dst`.
    pub(crate) fn value(&mut self, id: DescriptorId, dst: &mut dyn Reflect) -> Result<(), DecodeError> {
        let registry = self.registry;
        let descriptor = registry
            .descriptor_by_id(id)
            .ok_or(DecodeError::InconsistentDescriptor {
                type_name: dst.type_name(),
            })?;
        self.emit(descriptor, dst)
    }

    pub(crate) fn emit(&mut self, descriptor: &TypeDescriptor, dst: &mut dyn Reflect) -> Result<(), DecodeError> {
        if dst.concrete_type_id() != descriptor.type_id {
            return Err(DecodeError::KindMismatch {
                expected: descriptor.type_name,
                found: dst.type_name(),
            });
        }
        if self.depth >= self.config.max_depth {
            return Err(DecodeError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        let expected = descriptor.wire_tag().as_u8();
        let found = self.source.byte()?;
        if found != expected {
            return Err(DecodeError::UnexpectedTag { expected, found });
        }

        self.depth += 1;
        let result = (descriptor.decode)(self, descriptor, dst);
        self.depth -= 1;
        result
    }

    pub(crate) fn registry(&self) -> &'a SealedRegistry {
        self.registry
    }

    pub(crate) fn source(&mut self) -> &mut WireReader<'a> {
        &mut self.source
    }

    pub(crate) fn max_collection_len(&self) -> usize {
        self.config.max_collection_len
    }
}

/// Encodes values against a sealed registry.
#[derive(Debug, Clone, Copy)]
pub struct Encoder<'r> {
    registry: &'r SealedRegistry,
    config: CodecConfig,
}

impl<'r> Encoder<'r> {
    pub fn new(registry: &'r SealedRegistry) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: &'r SealedRegistry, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    /// Writes one frame for `value` to `sink` and returns the byte count.
    ///
    /// Without an explicit descriptor, the value's own type is looked up.
    pub fn encode(
        &self,
        descriptor: Option<&TypeDescriptor>,
        value: &dyn Reflect,
        sink: &mut dyn Write,
    ) -> Result<usize, EncodeError> {
        let descriptor = match descriptor {
            Some(descriptor) => self.own(descriptor)?,
            None => self
                .registry
                .descriptor(value.concrete_type_id())
                .map(|d| d.as_ref())
                .ok_or(EncodeError::TypeNotRegistered {
                    type_name: value.type_name(),
                })?,
        };

        let mut ctx = EncodeCtx {
            registry: self.registry,
            sink: WireWriter::new(sink),
            depth: 0,
            max_depth: self.config.max_depth,
        };
        ctx.sink.put(&WIRE_MAGIC)?;
        ctx.sink.put_u8(WIRE_VERSION)?;
        ctx.sink.put(&descriptor.fingerprint)?;
        ctx.emit(descriptor, value)?;
        ctx.sink.flush()?;

        log::trace!(
            "[CODEC] encoded {} ({} bytes)",
            descriptor.type_name,
            ctx.sink.written()
        );
        Ok(ctx.sink.written())
    }

    pub fn encode_to_vec<T: Reflect>(&self, value: &T) -> Result<Vec<u8>, EncodeError> {
        let mut out = Vec::new();
        self.encode(None, value, &mut out)?;
        Ok(out)
    }

    fn own<'d>(&self, descriptor: &'d TypeDescriptor) -> Result<&'d TypeDescriptor, EncodeError> {
        match self.registry.descriptor_by_id(descriptor.id) {
            Some(own) if std::ptr::eq(own.as_ref(), descriptor) => Ok(descriptor),
            _ => Err(EncodeError::ForeignDescriptor {
                type_name: descriptor.type_name,
            }),
        }
    }
}

/// Decodes values against a sealed registry.
#[derive(Debug, Clone, Copy)]
pub struct Decoder<'r> {
    registry: &'r SealedRegistry,
    config: CodecConfig,
}

impl<'r> Decoder<'r> {
    pub fn new(registry: &'r SealedRegistry) -> Self {
        Self::with_config(registry, CodecConfig::default())
    }

    pub fn with_config(registry: &'r SealedRegistry, config: CodecConfig) -> Self {
        Self { registry, config }
    }

    /// Reads one frame into `dst` and returns the number of bytes consumed.
    ///
    /// Without an explicit descriptor, the destination's own type is looked up.
    pub fn decode_into(
        &self,
        descriptor: Option<&TypeDescriptor>,
        source: &mut dyn Read,
        dst: &mut dyn Reflect,
    ) -> Result<usize, DecodeError> {
        let descriptor = match descriptor {
            Some(descriptor) => self.own(descriptor)?,
            None => self
                .registry
                .descriptor(dst.concrete_type_id())
                .map(|d| d.as_ref())
                .ok_or(DecodeError::TypeNotRegistered {
                    type_name: dst.type_name(),
                })?,
        };

        let mut ctx = DecodeCtx {
            registry: self.registry,
            source: WireReader::new(source),
            depth: 0,
            config: self.config,
        };
        read_header(&mut ctx.source, descriptor, self.config.verify_fingerprint)?;
        ctx.emit(descriptor, dst)?;

        log::trace!(
            "[CODEC] decoded {} ({} bytes)",
            descriptor.type_name,
            ctx.source.consumed()
        );
        Ok(ctx.source.consumed())
    }

    /// Reads one frame into a fresh boxed value of the descriptor's type.
    pub fn decode_dyn(
        &self,
        descriptor: &TypeDescriptor,
        source: &mut dyn Read,
    ) -> Result<Box<dyn Reflect>, DecodeError> {
        let mut value = descriptor.zero_value();
        self.decode_into(Some(descriptor), source, value.as_mut())?;
        Ok(value)
    }

    pub fn decode<T: Typed>(&self, source: &mut dyn Read) -> Result<T, DecodeError> {
        let mut value = T::zero();
        self.decode_into(None, source, &mut value)?;
        Ok(value)
    }

    /// Decodes exactly one frame; leftover bytes are an error.
    pub fn decode_from_slice<T: Typed>(&self, bytes: &[u8]) -> Result<T, DecodeError> {
        let mut cursor = bytes;
        let value = self.decode::<T>(&mut cursor)?;
        if !cursor.is_empty() {
            return Err(DecodeError::TrailingBytes {
                count: cursor.len(),
            });
        }
        Ok(value)
    }

    /// Like [`decode_into`](Self::decode_into), but requires the source to
    /// end after the frame.
    pub fn decode_exact(
        &self,
        descriptor: Option<&TypeDescriptor>,
        source: &mut dyn Read,
        dst: &mut dyn Reflect,
    ) -> Result<usize, DecodeError> {
        let consumed = self.decode_into(descriptor, source, dst)?;
        let count = WireReader::new(source).drain()?;
        if count > 0 {
            return Err(DecodeError::TrailingBytes { count });
        }
        Ok(consumed)
    }

    fn own<'d>(&self, descriptor: &'d TypeDescriptor) -> Result<&'d TypeDescriptor, DecodeError> {
        match self.registry.descriptor_by_id(descriptor.id) {
            Some(own) if std::ptr::eq(own.as_ref(), descriptor) => Ok(descriptor),
            _ => Err(DecodeError::ForeignDescriptor {
                type_name: descriptor.type_name,
            }),
        }
    }
}

fn read_header(
    source: &mut WireReader<'_>,
    descriptor: &TypeDescriptor,
    verify_fingerprint: bool,
) -> Result<(), DecodeError> {
    let magic = source.array::<3>()?;
    if magic != WIRE_MAGIC {
        return Err(DecodeError::BadMagic { found: magic });
    }
    let version = source.byte()?;
    if version != WIRE_VERSION {
        return Err(DecodeError::UnsupportedVersion { found: version });
    }
    let fingerprint = source.array::<FINGERPRINT_LEN>()?;
    if verify_fingerprint && fingerprint != descriptor.fingerprint {
        log::debug!(
            "[CODEC] fingerprint mismatch for {}: frame {:02x?}, local {:02x?}",
            descriptor.type_name,
            fingerprint,
            descriptor.fingerprint
        );
        return Err(DecodeError::FingerprintMismatch {
            type_name: descriptor.type_name,
        });
    }
    Ok(())
}
