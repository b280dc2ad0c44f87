// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-kind encode functions. The caller (`EncodeCtx::emit`) has already
//! written the wire tag and checked the value's concrete type.

use super::wire::{ABSENT, PRESENT};
use super::EncodeCtx;
use crate::error::EncodeError;
use crate::reflect::{LeafRef, Reflect, ValueRef};
use crate::registry::{DescriptorKind, TypeDescriptor};
use std::time::SystemTime;

fn mismatch(descriptor: &TypeDescriptor, value: &dyn Reflect) -> EncodeError {
    EncodeError::KindMismatch {
        expected: descriptor.type_name(),
        found: value.type_name(),
    }
}

pub(super) fn leaf(
    ctx: &mut EncodeCtx<'_>,
    descriptor: &TypeDescriptor,
    value: &dyn Reflect,
) -> Result<(), EncodeError> {
    let ValueRef::Leaf(leaf) = value.reflect_ref() else {
        return Err(mismatch(descriptor, value));
    };
    let sink = ctx.sink();
    match leaf {
        LeafRef::Bool(v) => sink.put_u8(u8::from(v)),
        LeafRef::I8(v) => sink.put_zigzag(i64::from(v)),
        LeafRef::I16(v) => sink.put_zigzag(i64::from(v)),
        LeafRef::I32(v) => sink.put_zigzag(i64::from(v)),
        LeafRef::I64(v) => sink.put_zigzag(v),
        LeafRef::Isize(v) => sink.put_zigzag(v as i64),
        LeafRef::U8(v) => sink.put_varint(u64::from(v)),
        LeafRef::U16(v) => sink.put_varint(u64::from(v)),
        LeafRef::U32(v) => sink.put_varint(u64::from(v)),
        LeafRef::U64(v) => sink.put_varint(v),
        LeafRef::Usize(v) => sink.put_varint(v as u64),
        LeafRef::F32(v) => sink.put(&v.to_le_bytes()),
        LeafRef::F64(v) => sink.put(&v.to_le_bytes()),
        LeafRef::Char(v) => sink.put_varint(u64::from(u32::from(v))),
        LeafRef::String(v) => sink.put_str(v),
        LeafRef::Time(v) => {
            let (secs, nanos) = split_time(v);
            sink.put_zigzag(secs)?;
            sink.put_varint(u64::from(nanos))
        }
    }
}

/// Splits a time into whole seconds relative to the Unix epoch (floored) and
/// a non-negative nanosecond remainder.
pub(super) fn split_time(time: SystemTime) -> (i64, u32) {
    match time.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(after) => (after.as_secs() as i64, after.subsec_nanos()),
        Err(before) => {
            let before = before.duration();
            let secs = before.as_secs() as i64;
            match before.subsec_nanos() {
                0 => (-secs, 0),
                nanos => (-secs - 1, 1_000_000_000 - nanos),
            }
        }
    }
}

pub(super) fn pointer(
    ctx: &mut EncodeCtx<'_>,
    descriptor: &TypeDescriptor,
    value: &dyn Reflect,
) -> Result<(), EncodeError> {
    let (ValueRef::Pointer(pointer), DescriptorKind::Pointer { pointee, .. }) =
        (value.reflect_ref(), descriptor.kind())
    else {
        return Err(mismatch(descriptor, value));
    };
    match pointer.pointee() {
        None => ctx.sink().put_u8(ABSENT),
        Some(inner) => {
            ctx.sink().put_u8(PRESENT)?;
            ctx.value(*pointee, inner)
        }
    }
}

pub(super) fn polymorphic(
    ctx: &mut EncodeCtx<'_>,
    descriptor: &TypeDescriptor,
    value: &dyn Reflect,
) -> Result<(), EncodeError> {
    let ValueRef::Polymorphic(poly) = value.reflect_ref() else {
        return Err(mismatch(descriptor, value));
    };
    let Some(inner) = poly.inner() else {
        return ctx.sink().put_u8(ABSENT);
    };

    let registry = ctx.registry();
    let concrete = registry
        .descriptor(inner.concrete_type_id())
        .ok_or(EncodeError::TypeNotFound {
            type_name: inner.type_name(),
        })?;
    let name = concrete.name().ok_or(EncodeError::Unnamed {
        type_name: inner.type_name(),
    })?;

    ctx.sink().put_u8(PRESENT)?;
    ctx.sink().put_str(name)?;
    ctx.emit(concrete, inner)
}

pub(super) fn list(
    ctx: &mut EncodeCtx<'_>,
    descriptor: &TypeDescriptor,
    value: &dyn Reflect,
) -> Result<(), EncodeError> {
    let element = match descriptor.kind() {
        DescriptorKind::Array { element, .. } | DescriptorKind::Sequence { element } => *element,
        _ => return Err(mismatch(descriptor, value)),
    };
    let (ValueRef::Array(items) | ValueRef::Sequence(items)) = value.reflect_ref() else {
        return Err(mismatch(descriptor, value));
    };

    ctx.sink().put_len(items.len())?;
    for index in 0..items.len() {
        let item = items.get(index).ok_or_else(|| mismatch(descriptor, value))?;
        ctx.value(element, item)?;
    }
    Ok(())
}

pub(super) fn map(
    ctx: &mut EncodeCtx<'_>,
    descriptor: &TypeDescriptor,
    value: &dyn Reflect,
) -> Result<(), EncodeError> {
    let (ValueRef::Map(entries), DescriptorKind::Map { key, value: item }) =
        (value.reflect_ref(), descriptor.kind())
    else {
        return Err(mismatch(descriptor, value));
    };

    ctx.sink().put_len(entries.len())?;
    for (k, v) in entries.entries() {
        ctx.value(*key, k)?;
        ctx.value(*item, v)?;
    }
    Ok(())
}

pub(super) fn record(
    ctx: &mut EncodeCtx<'_>,
    descriptor: &TypeDescriptor,
    value: &dyn Reflect,
) -> Result<(), EncodeError> {
    let count = descriptor.visible_fields().count();
    ctx.sink().put_len(count)?;
    for field in descriptor.visible_fields() {
        let field_value = field.read(value).ok_or_else(|| mismatch(descriptor, value))?;
        ctx.value(field.descriptor(), field_value)?;
    }
    Ok(())
}
