// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::{Reflect, ValueRef};

/// Structural equality over reflected values.
///
/// Two values are equal when they have the same concrete type and every
/// reachable leaf compares equal. Hidden record fields take part; opaque
/// values never compare equal. Map comparison is quadratic.
pub fn structural_eq(a: &dyn Reflect, b: &dyn Reflect) -> bool {
    if a.concrete_type_id() != b.concrete_type_id() {
        return false;
    }

    match (a.reflect_ref(), b.reflect_ref()) {
        (ValueRef::Leaf(x), ValueRef::Leaf(y)) => x == y,
        (ValueRef::Pointer(x), ValueRef::Pointer(y)) => match (x.pointee(), y.pointee()) {
            (None, None) => true,
            (Some(x), Some(y)) => structural_eq(x, y),
            _ => false,
        },
        (ValueRef::Polymorphic(x), ValueRef::Polymorphic(y)) => match (x.inner(), y.inner()) {
            (None, None) => true,
            (Some(x), Some(y)) => structural_eq(x, y),
            _ => false,
        },
        (ValueRef::Array(x), ValueRef::Array(y)) | (ValueRef::Sequence(x), ValueRef::Sequence(y)) => {
            x.len() == y.len()
                && (0..x.len()).all(|i| match (x.get(i), y.get(i)) {
                    (Some(x), Some(y)) => structural_eq(x, y),
                    _ => false,
                })
        }
        (ValueRef::Map(x), ValueRef::Map(y)) => {
            x.len() == y.len()
                && x.entries().all(|(xk, xv)| {
                    y.entries()
                        .any(|(yk, yv)| structural_eq(xk, yk) && structural_eq(xv, yv))
                })
        }
        (ValueRef::Record(x), ValueRef::Record(y)) => {
            x.field_count() == y.field_count()
                && (0..x.field_count()).all(|i| match (x.field(i), y.field(i)) {
                    (Some(x), Some(y)) => structural_eq(x, y),
                    _ => false,
                })
        }
        _ => false,
    }
}
