// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-kind decode functions, the mirror of `encode`. The caller
//! (`DecodeCtx::emit`) has already consumed and checked the wire tag.

use super::wire::{ABSENT, PRESENT};
use super::DecodeCtx;
use crate::config::PREALLOC_LIMIT;
use crate::error::DecodeError;
use crate::reflect::{LeafKind, LeafRef, Reflect, ValueMut};
use crate::registry::{DescriptorKind, TypeDescriptor};
use std::time::{Duration, SystemTime};

fn mismatch(descriptor: &TypeDescriptor, dst: &dyn Reflect) -> DecodeError {
    DecodeError::KindMismatch {
        expected: descriptor.type_name(),
        found: dst.type_name(),
    }
}

fn narrow<T: TryFrom<i64>>(value: i64, kind: LeafKind) -> Result<T, DecodeError> {
    T::try_from(value).map_err(|_| DecodeError::OutOfRange { kind })
}

fn narrow_unsigned<T: TryFrom<u64>>(value: u64, kind: LeafKind) -> Result<T, DecodeError> {
    T::try_from(value).map_err(|_| DecodeError::OutOfRange { kind })
}

pub(super) fn leaf(
    ctx: &mut DecodeCtx<'_>,
    descriptor: &TypeDescriptor,
    dst: &mut dyn Reflect,
) -> Result<(), DecodeError> {
    let DescriptorKind::Leaf(kind) = *descriptor.kind() else {
        return Err(mismatch(descriptor, dst));
    };
    let limit = ctx.max_collection_len();
    let source = ctx.source();

    // Strings need owned storage that outlives the borrowed LeafRef.
    let text;
    let value = match kind {
        LeafKind::Bool => match source.byte()? {
            0 => LeafRef::Bool(false),
            1 => LeafRef::Bool(true),
            _ => return Err(DecodeError::InvalidData("bool byte must be 0 or 1")),
        },
        LeafKind::I8 => LeafRef::I8(narrow(source.zigzag()?, kind)?),
        LeafKind::I16 => LeafRef::I16(narrow(source.zigzag()?, kind)?),
        LeafKind::I32 => LeafRef::I32(narrow(source.zigzag()?, kind)?),
        LeafKind::I64 => LeafRef::I64(source.zigzag()?),
        LeafKind::Isize => LeafRef::Isize(narrow(source.zigzag()?, kind)?),
        LeafKind::U8 => LeafRef::U8(narrow_unsigned(source.varint()?, kind)?),
        LeafKind::U16 => LeafRef::U16(narrow_unsigned(source.varint()?, kind)?),
        LeafKind::U32 => LeafRef::U32(narrow_unsigned(source.varint()?, kind)?),
        LeafKind::U64 => LeafRef::U64(source.varint()?),
        LeafKind::Usize => LeafRef::Usize(narrow_unsigned(source.varint()?, kind)?),
        LeafKind::F32 => LeafRef::F32(f32::from_le_bytes(source.array::<4>()?)),
        LeafKind::F64 => LeafRef::F64(f64::from_le_bytes(source.array::<8>()?)),
        LeafKind::Char => {
            let code: u32 = narrow_unsigned(source.varint()?, kind)?;
            LeafRef::Char(char::from_u32(code).ok_or(DecodeError::InvalidChar(code))?)
        }
        LeafKind::String => {
            text = source.string(limit)?;
            LeafRef::String(&text)
        }
        LeafKind::Time => {
            let secs = source.zigzag()?;
            let nanos: u32 = narrow_unsigned(source.varint()?, kind)?;
            LeafRef::Time(join_time(secs, nanos)?)
        }
    };

    let ValueMut::Leaf(slot) = dst.reflect_mut() else {
        return Err(mismatch(descriptor, dst));
    };
    slot.assign(value).map_err(|_| DecodeError::KindMismatch {
        expected: descriptor.type_name(),
        found: kind.name(),
    })
}

/// Inverse of `encode::split_time`.
pub(super) fn join_time(secs: i64, nanos: u32) -> Result<SystemTime, DecodeError> {
    let out_of_range = DecodeError::OutOfRange {
        kind: LeafKind::Time,
    };
    if nanos >= 1_000_000_000 {
        return Err(out_of_range);
    }
    let time = if secs >= 0 {
        SystemTime::UNIX_EPOCH.checked_add(Duration::new(secs.unsigned_abs(), nanos))
    } else {
        SystemTime::UNIX_EPOCH
            .checked_sub(Duration::from_secs(secs.unsigned_abs()))
            .and_then(|t| t.checked_add(Duration::from_nanos(u64::from(nanos))))
    };
    time.ok_or(out_of_range)
}

pub(super) fn pointer(
    ctx: &mut DecodeCtx<'_>,
    descriptor: &TypeDescriptor,
    dst: &mut dyn Reflect,
) -> Result<(), DecodeError> {
    let DescriptorKind::Pointer { pointee, nullable } = *descriptor.kind() else {
        return Err(mismatch(descriptor, dst));
    };
    let presence = ctx.source().byte()?;
    let type_name = dst.type_name();
    let ValueMut::Pointer(pointer) = dst.reflect_mut() else {
        return Err(DecodeError::KindMismatch {
            expected: descriptor.type_name(),
            found: type_name,
        });
    };

    match presence {
        ABSENT if nullable => {
            pointer.clear();
            Ok(())
        }
        ABSENT => Err(DecodeError::InvalidData("null value for non-nullable pointer")),
        PRESENT => ctx.value(pointee, pointer.alloc()),
        _ => Err(DecodeError::InvalidData("pointer presence byte must be 0 or 1")),
    }
}

pub(super) fn polymorphic(
    ctx: &mut DecodeCtx<'_>,
    descriptor: &TypeDescriptor,
    dst: &mut dyn Reflect,
) -> Result<(), DecodeError> {
    let DescriptorKind::Polymorphic { capability } = *descriptor.kind() else {
        return Err(mismatch(descriptor, dst));
    };

    let presence = ctx.source().byte()?;
    let inner = match presence {
        ABSENT => None,
        PRESENT => {
            let limit = ctx.max_collection_len();
            let name = ctx.source().string(limit)?;
            let registry = ctx.registry();
            let concrete = registry
                .descriptor_by_name(&name)
                .ok_or_else(|| DecodeError::UnknownName { name: name.clone() })?;
            if !registry.accepts(descriptor.id(), concrete.id()) {
                return Err(DecodeError::NotAVariant { name, capability });
            }
            let mut inner = concrete.zero_value();
            ctx.emit(concrete, inner.as_mut())?;
            Some(inner)
        }
        _ => {
            return Err(DecodeError::InvalidData(
                "polymorphic presence byte must be 0 or 1",
            ))
        }
    };

    let type_name = dst.type_name();
    let ValueMut::Polymorphic(slot) = dst.reflect_mut() else {
        return Err(DecodeError::KindMismatch {
            expected: descriptor.type_name(),
            found: type_name,
        });
    };
    match inner {
        Some(inner) => slot.set_inner(inner),
        None => slot.clear(),
    }
    Ok(())
}

pub(super) fn list(
    ctx: &mut DecodeCtx<'_>,
    descriptor: &TypeDescriptor,
    dst: &mut dyn Reflect,
) -> Result<(), DecodeError> {
    let element = match *descriptor.kind() {
        DescriptorKind::Array { element, .. } | DescriptorKind::Sequence { element } => element,
        _ => return Err(mismatch(descriptor, dst)),
    };
    let limit = ctx.max_collection_len();
    let len = ctx.source().len(limit)?;

    let type_name = dst.type_name();
    let (ValueMut::Array(items) | ValueMut::Sequence(items)) = dst.reflect_mut() else {
        return Err(DecodeError::KindMismatch {
            expected: descriptor.type_name(),
            found: type_name,
        });
    };
    if items.fixed_len().is_some() {
        if !items.reset(len) {
            return Err(DecodeError::LengthMismatch {
                expected: items.len(),
                found: len,
            });
        }
        for index in 0..len {
            let slot = items
                .get_mut(index)
                .ok_or(DecodeError::InvalidData("array slot missing after reset"))?;
            ctx.value(element, slot)?;
        }
        return Ok(());
    }

    // Grow with the data actually read, not with the claimed length
    items.reset(0);
    items.reserve(len.min(PREALLOC_LIMIT));
    for _ in 0..len {
        let slot = items
            .push_zero()
            .ok_or(DecodeError::InvalidData("sequence refused a new element"))?;
        ctx.value(element, slot)?;
    }
    Ok(())
}

pub(super) fn map(
    ctx: &mut DecodeCtx<'_>,
    descriptor: &TypeDescriptor,
    dst: &mut dyn Reflect,
) -> Result<(), DecodeError> {
    let DescriptorKind::Map { key, value } = *descriptor.kind() else {
        return Err(mismatch(descriptor, dst));
    };
    let limit = ctx.max_collection_len();
    let len = ctx.source().len(limit)?;

    let type_name = dst.type_name();
    let ValueMut::Map(entries) = dst.reflect_mut() else {
        return Err(DecodeError::KindMismatch {
            expected: descriptor.type_name(),
            found: type_name,
        });
    };
    entries.clear();
    for _ in 0..len {
        let mut k = entries.fresh_key();
        ctx.value(key, k.as_mut())?;
        let mut v = entries.fresh_value();
        ctx.value(value, v.as_mut())?;
        if !entries.insert_boxed(k, v) {
            return Err(DecodeError::KindMismatch {
                expected: descriptor.type_name(),
                found: type_name,
            });
        }
    }
    Ok(())
}

pub(super) fn record(
    ctx: &mut DecodeCtx<'_>,
    descriptor: &TypeDescriptor,
    dst: &mut dyn Reflect,
) -> Result<(), DecodeError> {
    let expected = descriptor.visible_fields().count();
    let found = ctx.source().varint()?;
    if found != expected as u64 {
        return Err(DecodeError::LengthMismatch {
            expected,
            found: usize::try_from(found).unwrap_or(usize::MAX),
        });
    }
    for field in descriptor.visible_fields() {
        let slot = field
            .read_mut(dst)
            .ok_or(DecodeError::InvalidData("record field accessor rejected destination"))?;
        ctx.value(field.descriptor(), slot)?;
    }
    Ok(())
}
