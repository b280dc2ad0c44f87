// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compiled type descriptors.
//!
//! A [`TypeDescriptor`] is built once per type by the compiler and never
//! mutated afterwards, except for its declared name which may be bound
//! exactly once. Child types are referenced by [`DescriptorId`], an index
//! into the owning registry's arena, which is how recursive types close.

use crate::codec::{self, DecodeFn, EncodeFn, WireTag};
use crate::copy::OverrideKind;
use crate::reflect::{leaf_shape, FieldGet, FieldGetMut, LeafKind, Reflect, TypeShape};
use crate::registry::fingerprint::{self, Fingerprint};
use std::any::TypeId;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Index of a descriptor in its registry. Leaf kinds occupy the first slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(pub(crate) u32);

impl DescriptorId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn leaf(kind: LeafKind) -> Self {
        DescriptorId(kind.index() as u32)
    }

    pub const fn is_leaf(self) -> bool {
        self.index() < LeafKind::COUNT
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Compiled structure of a type.
#[derive(Debug, Clone)]
pub enum DescriptorKind {
    Leaf(LeafKind),
    Pointer {
        pointee: DescriptorId,
        nullable: bool,
    },
    Array {
        element: DescriptorId,
        len: usize,
    },
    Sequence {
        element: DescriptorId,
    },
    Map {
        key: DescriptorId,
        value: DescriptorId,
    },
    Record {
        fields: Vec<FieldDescriptor>,
    },
    Polymorphic {
        capability: &'static str,
    },
}

impl DescriptorKind {
    pub(crate) fn wire_tag(&self) -> WireTag {
        match self {
            DescriptorKind::Leaf(kind) => WireTag::leaf(*kind),
            DescriptorKind::Pointer { .. } => WireTag::Pointer,
            DescriptorKind::Array { .. } => WireTag::Array,
            DescriptorKind::Sequence { .. } => WireTag::Sequence,
            DescriptorKind::Map { .. } => WireTag::Map,
            DescriptorKind::Record { .. } => WireTag::Record,
            DescriptorKind::Polymorphic { .. } => WireTag::Polymorphic,
        }
    }

    /// Only records and polymorphic slots carry a declared name.
    pub fn is_nameable(&self) -> bool {
        matches!(
            self,
            DescriptorKind::Record { .. } | DescriptorKind::Polymorphic { .. }
        )
    }
}

/// Compiled field of a record descriptor.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub(crate) name: &'static str,
    pub(crate) tag: Option<&'static str>,
    pub(crate) visible: bool,
    pub(crate) offset: usize,
    pub(crate) descriptor: DescriptorId,
    pub(crate) get: FieldGet,
    pub(crate) get_mut: FieldGetMut,
}

impl FieldDescriptor {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn descriptor(&self) -> DescriptorId {
        self.descriptor
    }

    /// Reads this field out of a record of the described type.
    pub fn read<'v>(&self, record: &'v dyn Reflect) -> Option<&'v dyn Reflect> {
        (self.get)(record)
    }

    pub fn read_mut<'v>(&self, record: &'v mut dyn Reflect) -> Option<&'v mut dyn Reflect> {
        (self.get_mut)(record)
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("visible", &self.visible)
            .field("offset", &self.offset)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// Immutable per-type metadata, shared by every encode/decode of the type.
pub struct TypeDescriptor {
    pub(crate) id: DescriptorId,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: &'static str,
    pub(crate) name: OnceLock<String>,
    pub(crate) kind: DescriptorKind,
    pub(crate) copy: OverrideKind,
    pub(crate) zero: fn() -> Box<dyn Reflect>,
    pub(crate) fingerprint: Fingerprint,
    pub(crate) encode: EncodeFn,
    pub(crate) decode: DecodeFn,
}

impl TypeDescriptor {
    /// Assembles a descriptor and selects its encode/decode functions.
    pub(crate) fn new(id: DescriptorId, shape: &TypeShape, kind: DescriptorKind) -> Self {
        let (encode, decode) = codec::dispatch(&kind);
        Self {
            id,
            type_id: shape.type_id,
            type_name: shape.type_name,
            name: OnceLock::new(),
            copy: shape.copy.kind(),
            zero: shape.zero,
            fingerprint: fingerprint::compute(shape),
            encode,
            decode,
            kind,
        }
    }

    pub fn id(&self) -> DescriptorId {
        self.id
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Rust type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Declared registry name, if one was bound.
    pub fn name(&self) -> Option<&str> {
        self.name.get().map(String::as_str)
    }

    pub fn kind(&self) -> &DescriptorKind {
        &self.kind
    }

    pub fn copy_override(&self) -> OverrideKind {
        self.copy
    }

    pub fn fingerprint(&self) -> Fingerprint {
        self.fingerprint
    }

    /// Fields of a record descriptor, empty for other kinds.
    pub fn fields(&self) -> &[FieldDescriptor] {
        match &self.kind {
            DescriptorKind::Record { fields } => fields,
            _ => &[],
        }
    }

    /// Fields that take part in copy and codec.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields().iter().filter(|f| f.visible)
    }

    /// Zero value of the described type.
    pub fn zero_value(&self) -> Box<dyn Reflect> {
        (self.zero)()
    }

    pub(crate) fn wire_tag(&self) -> WireTag {
        self.kind.wire_tag()
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("id", &self.id)
            .field("type_name", &self.type_name)
            .field("name", &self.name())
            .field("kind", &self.kind)
            .field("copy", &self.copy)
            .field("fingerprint", &fingerprint::to_hex(&self.fingerprint))
            .finish()
    }
}

/// Shared leaf descriptors, one per [`LeafKind`], used by every registry.
pub(crate) fn leaf_descriptors() -> &'static [Arc<TypeDescriptor>] {
    static LEAVES: OnceLock<Vec<Arc<TypeDescriptor>>> = OnceLock::new();
    LEAVES.get_or_init(|| {
        LeafKind::ALL
            .iter()
            .map(|&kind| {
                let shape = leaf_shape(kind);
                Arc::new(TypeDescriptor::new(
                    DescriptorId::leaf(kind),
                    &shape,
                    DescriptorKind::Leaf(kind),
                ))
            })
            .collect()
    })
}
