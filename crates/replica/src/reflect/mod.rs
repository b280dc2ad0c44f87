// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime reflection model.
//!
//! Every value the engines touch implements [`Reflect`], an object-safe trait
//! that exposes one *kind view* of the value:
//!
//! | Kind          | Rust types                                   | View trait         |
//! |---------------|----------------------------------------------|--------------------|
//! | Leaf          | `bool`, integers, floats, `char`, `String`, `SystemTime` | [`LeafSlot`] |
//! | Pointer       | `Box<T>`, `Arc<T>`, `Option<T>`              | [`ReflectPointer`] |
//! | Polymorphic   | [`Poly<C>`]                                  | [`ReflectPoly`]    |
//! | Array         | `[T; N]`                                     | [`ReflectList`]    |
//! | Sequence      | `Vec<T>`                                     | [`ReflectList`]    |
//! | Map           | `HashMap<K, V>`, `BTreeMap<K, V>`            | [`ReflectMap`]     |
//! | Record        | `#[derive(Reflect)]` structs                 | [`ReflectRecord`]  |
//! | Opaque        | `mpsc::Sender<T>`, `mpsc::SyncSender<T>`     | none               |
//!
//! [`Typed`] is the static side: it describes a type's [`TypeShape`] without a
//! live value, which is what the descriptor compiler consumes.

mod containers;
mod eq;
mod leaf;
mod opaque;
mod pointer;
mod poly;
mod shape;


pub use eq::structural_eq;
pub use leaf::{LeafKind, LeafMismatch, LeafRef, LeafSlot};
pub(crate) use leaf::leaf_shape;
pub use poly::{Capability, Implements, Poly};
pub use shape::{FieldGet, FieldGetMut, FieldShape, ShapeKind, TypeShape, Typed};

use crate::copy::CopyOverride;
use std::any::{Any, TypeId};

/// Object-safe reflection over a live value.
///
/// Implement it with `#[derive(Reflect)]` for records; the crate covers leaves,
/// pointers, containers and [`Poly`].
pub trait Reflect: Any + Send + Sync {
    /// Rust type name of the concrete value.
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn as_reflect(&self) -> &dyn Reflect;
    fn as_reflect_mut(&mut self) -> &mut dyn Reflect;

    fn reflect_ref(&self) -> ValueRef<'_>;
    fn reflect_mut(&mut self) -> ValueMut<'_>;

    /// Zero value of the same concrete type.
    fn fresh(&self) -> Box<dyn Reflect>;

    /// By-value clone of the same concrete type.
    fn clone_boxed(&self) -> Box<dyn Reflect>;

    /// Copy behaviour declared by the type, consulted before structural copy.
    fn copy_override(&self) -> CopyOverride {
        CopyOverride::None
    }
}

impl dyn Reflect {
    /// `TypeId` of the concrete value behind the trait object.
    pub fn concrete_type_id(&self) -> TypeId {
        Any::type_id(self.as_any())
    }

    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Coarse kind of the value.
    pub fn kind(&self) -> Kind {
        self.reflect_ref().kind()
    }
}

/// Unboxes a reflected value into its concrete type.
pub fn downcast_boxed<T: Reflect>(value: Box<dyn Reflect>) -> Option<Box<T>> {
    value.into_any().downcast::<T>().ok()
}

impl std::fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("dyn Reflect")
            .field("type", &self.type_name())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Coarse classification of a reflected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Leaf(LeafKind),
    Pointer,
    Polymorphic,
    Array,
    Sequence,
    Map,
    Record,
    Opaque,
}

/// Read-only kind view of a value.
pub enum ValueRef<'a> {
    Leaf(LeafRef<'a>),
    Pointer(&'a dyn ReflectPointer),
    Polymorphic(&'a dyn ReflectPoly),
    Array(&'a dyn ReflectList),
    Sequence(&'a dyn ReflectList),
    Map(&'a dyn ReflectMap),
    Record(&'a dyn ReflectRecord),
    Opaque,
}

impl ValueRef<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ValueRef::Leaf(leaf) => Kind::Leaf(leaf.kind()),
            ValueRef::Pointer(_) => Kind::Pointer,
            ValueRef::Polymorphic(_) => Kind::Polymorphic,
            ValueRef::Array(_) => Kind::Array,
            ValueRef::Sequence(_) => Kind::Sequence,
            ValueRef::Map(_) => Kind::Map,
            ValueRef::Record(_) => Kind::Record,
            ValueRef::Opaque => Kind::Opaque,
        }
    }
}

/// Mutable kind view of a value.
pub enum ValueMut<'a> {
    Leaf(&'a mut dyn LeafSlot),
    Pointer(&'a mut dyn ReflectPointer),
    Polymorphic(&'a mut dyn ReflectPoly),
    Array(&'a mut dyn ReflectList),
    Sequence(&'a mut dyn ReflectList),
    Map(&'a mut dyn ReflectMap),
    Record(&'a mut dyn ReflectRecord),
    Opaque,
}

impl ValueMut<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            ValueMut::Leaf(slot) => Kind::Leaf(slot.kind()),
            ValueMut::Pointer(_) => Kind::Pointer,
            ValueMut::Polymorphic(_) => Kind::Polymorphic,
            ValueMut::Array(_) => Kind::Array,
            ValueMut::Sequence(_) => Kind::Sequence,
            ValueMut::Map(_) => Kind::Map,
            ValueMut::Record(_) => Kind::Record,
            ValueMut::Opaque => Kind::Opaque,
        }
    }
}

/// Single-level indirection (`Box`, `Arc`, `Option`).
pub trait ReflectPointer {
    /// `Option` can be empty; `Box` and `Arc` always hold a pointee.
    fn is_nullable(&self) -> bool;
    fn pointee(&self) -> Option<&dyn Reflect>;
    /// For `Arc` this detaches shared storage first (copy-on-write).
    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect>;
    /// Replaces the pointee with fresh zero storage and returns it.
    fn alloc(&mut self) -> &mut dyn Reflect;
    /// Empties a nullable pointer. Returns false for non-nullable pointers.
    fn clear(&mut self) -> bool;
    /// Heap address of the pointee, `None` when the pointer owns no heap cell.
    fn address(&self) -> Option<usize>;
}

/// Slot holding a value whose concrete type is chosen at runtime.
pub trait ReflectPoly {
    /// Type name of the capability marker this slot is declared against.
    fn capability(&self) -> &'static str;
    fn inner(&self) -> Option<&dyn Reflect>;
    fn inner_mut(&mut self) -> Option<&mut dyn Reflect>;
    fn set_inner(&mut self, value: Box<dyn Reflect>);
    fn clear(&mut self);
}

/// Ordered homogeneous collection (`[T; N]`, `Vec<T>`).
pub trait ReflectList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Some(N)` for fixed arrays.
    fn fixed_len(&self) -> Option<usize>;
    /// Leaf kind of the element type, if the element is a leaf.
    fn element_leaf(&self) -> Option<LeafKind>;
    fn get(&self, index: usize) -> Option<&dyn Reflect>;
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
    /// Resets to `len` zero-valued elements. Fixed arrays only accept their own length.
    fn reset(&mut self, len: usize) -> bool;
    /// Appends a zero element and returns it. `None` for fixed arrays.
    fn push_zero(&mut self) -> Option<&mut dyn Reflect>;
    /// Capacity hint for upcoming `push_zero` calls.
    fn reserve(&mut self, _additional: usize) {}
    /// Overwrites self with a by-value clone of `src` if it is the same concrete type.
    fn assign_from(&mut self, src: &dyn Reflect) -> bool;
}

/// Key/value collection (`HashMap`, `BTreeMap`).
pub trait ReflectMap {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_>;
    fn fresh_key(&self) -> Box<dyn Reflect>;
    fn fresh_value(&self) -> Box<dyn Reflect>;
    /// Returns false if either box holds the wrong concrete type.
    fn insert_boxed(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) -> bool;
    fn clear(&mut self);
    /// Overwrites self with a by-value clone of `src` if it is the same concrete type.
    fn assign_from(&mut self, src: &dyn Reflect) -> bool;
}

/// Struct with named fields, usually implemented by `#[derive(Reflect)]`.
///
/// Hidden fields (non-`pub`) are reachable here but skipped by the engines.
pub trait ReflectRecord {
    fn field_count(&self) -> usize;
    fn field_name(&self, index: usize) -> Option<&'static str>;
    fn field_visible(&self, index: usize) -> bool;
    fn field(&self, index: usize) -> Option<&dyn Reflect>;
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Index of the field called `name`.
    fn field_index(&self, name: &str) -> Option<usize> {
        (0..self.field_count()).find(|&i| self.field_name(i) == Some(name))
    }
}

/// Expands the `Reflect` methods that only depend on `Self: Typed`.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_boilerplate {
    () => {
        fn type_name(&self) -> &'static str {
            ::core::any::type_name::<Self>()
        }

        fn as_any(&self) -> &dyn ::core::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
            self
        }

        fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::core::any::Any> {
            self
        }

        fn as_reflect(&self) -> &dyn $crate::Reflect {
            self
        }

        fn as_reflect_mut(&mut self) -> &mut dyn $crate::Reflect {
            self
        }

        fn fresh(&self) -> ::std::boxed::Box<dyn $crate::Reflect> {
            ::std::boxed::Box::new(<Self as $crate::Typed>::zero())
        }

        fn clone_boxed(&self) -> ::std::boxed::Box<dyn $crate::Reflect> {
            ::std::boxed::Box::new(::core::clone::Clone::clone(self))
        }
    };
}
