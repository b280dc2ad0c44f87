// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural fingerprints.
//!
//! The fingerprint of a type is a hash of a canonical text rendering of its
//! shape: leaf kinds, pointer nullability, array lengths, visible field names
//! in declaration order. Declared names and Rust type paths do not take part,
//! so two programs agree on a fingerprint when their schemas agree.
//!
//! Recursive references render as `^n`, the distance back up the current
//! path, which keeps the rendering finite.

use crate::config::FINGERPRINT_LEN;
use crate::reflect::{ShapeKind, TypeShape};
use std::any::TypeId;

/// Truncated structural hash carried in every frame header.
pub type Fingerprint = [u8; FINGERPRINT_LEN];

pub(crate) fn compute(shape: &TypeShape) -> Fingerprint {
    digest(canonical(shape).as_bytes())
}

/// Canonical text rendering of a shape.
pub(crate) fn canonical(shape: &TypeShape) -> String {
    let mut out = String::new();
    let mut path = Vec::new();
    render(shape, &mut path, &mut out);
    out
}

fn render(shape: &TypeShape, path: &mut Vec<TypeId>, out: &mut String) {
    if let Some(pos) = path.iter().position(|id| *id == shape.type_id) {
        out.push_str(&format!("^{}", path.len() - pos));
        return;
    }
    path.push(shape.type_id);

    match &shape.kind {
        ShapeKind::Leaf(kind) => out.push_str(kind.name()),
        ShapeKind::Pointer { pointee, nullable } => {
            out.push(if *nullable { '?' } else { '*' });
            render(&pointee(), path, out);
        }
        ShapeKind::Array { element, len } => {
            out.push_str(&format!("[{len}]"));
            render(&element(), path, out);
        }
        ShapeKind::Sequence { element } => {
            out.push_str("[]");
            render(&element(), path, out);
        }
        ShapeKind::Map { key, value } => {
            out.push_str("map[");
            render(&key(), path, out);
            out.push(']');
            render(&value(), path, out);
        }
        ShapeKind::Record { fields } => {
            out.push('{');
            for field in fields.iter().filter(|f| f.visible) {
                out.push_str(field.name);
                out.push(':');
                render(&(field.shape)(), path, out);
                out.push(';');
            }
            out.push('}');
        }
        ShapeKind::Polymorphic { .. } => out.push_str("poly"),
        ShapeKind::Opaque => out.push('!'),
    }

    path.pop();
}

#[cfg(feature = "fingerprint")]
fn digest(bytes: &[u8]) -> Fingerprint {
    use md5::{Digest, Md5};

    let mut hasher = Md5::new();
    hasher.update(bytes);
    let result = hasher.finalize();

    // Truncate MD5 (16 bytes) to the header width
    let mut out = [0u8; FINGERPRINT_LEN];
    out.copy_from_slice(&result[..FINGERPRINT_LEN]);
    out
}

/// FNV-1a fallback when the `fingerprint` feature is disabled.
#[cfg(not(feature = "fingerprint"))]
fn digest(bytes: &[u8]) -> Fingerprint {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash.to_le_bytes()
}

pub(crate) fn to_hex(fingerprint: &Fingerprint) -> String {
    let mut out = String::with_capacity(FINGERPRINT_LEN * 2);
    for byte in fingerprint {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
