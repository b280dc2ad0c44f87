// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Static type shapes.
//!
//! A [`TypeShape`] describes a type without a live value. Child types are
//! referenced through `fn() -> TypeShape` so that recursive types (a record
//! holding `Option<Box<Self>>`) have a finite shape; the descriptor compiler
//! follows those links and breaks cycles with reserved slots.

use super::{LeafKind, Reflect};
use crate::copy::CopyOverride;
use std::any::{type_name, TypeId};
use std::fmt;

/// Field accessor on a type-erased record.
pub type FieldGet = fn(&dyn Reflect) -> Option<&dyn Reflect>;
/// Mutable field accessor on a type-erased record.
pub type FieldGetMut = fn(&mut dyn Reflect) -> Option<&mut dyn Reflect>;

/// Statically known reflection information.
///
/// Every reflectable type has a zero value: numeric zero, empty string and
/// collections, `None`, the Unix epoch, or `Default::default()` for records.
pub trait Typed: Reflect + Clone + Sized {
    /// `Some` for leaf types; lets containers take the bulk-copy path.
    const LEAF: Option<LeafKind> = None;

    fn shape() -> TypeShape;

    fn zero() -> Self;
}

/// Shape of one record field.
#[derive(Clone)]
pub struct FieldShape {
    pub name: &'static str,
    /// Optional metadata string from `#[replica(tag = "...")]`.
    pub tag: Option<&'static str>,
    /// `pub` fields are visible; hidden fields are skipped by copy and codec.
    pub visible: bool,
    /// Byte offset within the record.
    pub offset: usize,
    pub shape: fn() -> TypeShape,
    pub get: FieldGet,
    pub get_mut: FieldGetMut,
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("visible", &self.visible)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

/// Structural kind of a shape, with links to child shapes.
#[derive(Clone)]
pub enum ShapeKind {
    Leaf(LeafKind),
    Pointer {
        pointee: fn() -> TypeShape,
        nullable: bool,
    },
    Array {
        element: fn() -> TypeShape,
        len: usize,
    },
    Sequence {
        element: fn() -> TypeShape,
    },
    Map {
        key: fn() -> TypeShape,
        value: fn() -> TypeShape,
    },
    Record {
        fields: Vec<FieldShape>,
    },
    Polymorphic {
        capability: &'static str,
    },
    Opaque,
}

impl ShapeKind {
    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Leaf(_) => "leaf",
            ShapeKind::Pointer { .. } => "pointer",
            ShapeKind::Array { .. } => "array",
            ShapeKind::Sequence { .. } => "sequence",
            ShapeKind::Map { .. } => "map",
            ShapeKind::Record { .. } => "record",
            ShapeKind::Polymorphic { .. } => "polymorphic",
            ShapeKind::Opaque => "opaque",
        }
    }
}

impl fmt::Debug for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeKind::Leaf(kind) => f.debug_tuple("Leaf").field(kind).finish(),
            ShapeKind::Array { len, .. } => f.debug_struct("Array").field("len", len).finish(),
            ShapeKind::Pointer { nullable, .. } => f
                .debug_struct("Pointer")
                .field("nullable", nullable)
                .finish(),
            ShapeKind::Record { fields } => f.debug_struct("Record").field("fields", fields).finish(),
            ShapeKind::Polymorphic { capability } => f
                .debug_struct("Polymorphic")
                .field("capability", capability)
                .finish(),
            other => f.write_str(other.label()),
        }
    }
}

/// Static description of one type.
#[derive(Clone)]
pub struct TypeShape {
    pub type_id: TypeId,
    pub type_name: &'static str,
    pub kind: ShapeKind,
    pub zero: fn() -> Box<dyn Reflect>,
    pub copy: CopyOverride,
}

impl TypeShape {
    pub fn of<T: Typed>(kind: ShapeKind) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: type_name::<T>(),
            kind,
            zero: zero_boxed::<T>,
            copy: CopyOverride::None,
        }
    }

    #[must_use]
    pub fn with_copy(mut self, copy: CopyOverride) -> Self {
        self.copy = copy;
        self
    }

    /// Follows pointer links down to the first non-pointer shape.
    pub fn strip_pointers(mut self) -> Self {
        while let ShapeKind::Pointer { pointee, .. } = self.kind {
            self = pointee();
        }
        self
    }
}

impl fmt::Debug for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeShape")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind)
            .field("copy", &self.copy.kind())
            .finish_non_exhaustive()
    }
}

fn zero_boxed<T: Typed>() -> Box<dyn Reflect> {
    Box::new(T::zero())
}
