// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Polymorphic slots.
//!
//! A [`Poly<C>`] holds any reflectable value whose type declares
//! [`Implements<C>`]. The capability `C` is a marker type. A decoder only
//! places a type in the slot once it was attached to `C` with
//! `TypeRegistry::attach::<C, T>()`.
//!
//! ```rust
//! use replica::{Capability, Implements, Poly, Reflect};
//!
//! pub struct Shape;
//! impl Capability for Shape {}
//!
//! #[derive(Reflect, Debug, Clone, Default, PartialEq)]
//! pub struct Circle {
//!     pub radius: f64,
//! }
//! impl Implements<Shape> for Circle {}
//!
//! let slot: Poly<Shape> = Poly::new(Circle { radius: 2.0 });
//! assert_eq!(slot.downcast_ref::<Circle>().map(|c| c.radius), Some(2.0));
//! ```

use super::{structural_eq, Reflect, ReflectPoly, ShapeKind, TypeShape, Typed, ValueMut, ValueRef};
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

/// Marker for an interface-like capability.
pub trait Capability: Send + Sync + 'static {}

/// Declares that `Self` may be stored in a `Poly<C>`.
pub trait Implements<C: Capability>: Typed {}

/// Runtime-typed slot constrained to implementors of `C`.
pub struct Poly<C: Capability> {
    inner: Option<Box<dyn Reflect>>,
    _capability: PhantomData<fn() -> C>,
}

impl<C: Capability> Poly<C> {
    pub fn new<T: Implements<C>>(value: T) -> Self {
        Self {
            inner: Some(Box::new(value)),
            _capability: PhantomData,
        }
    }

    /// Empty slot, the zero value.
    pub fn empty() -> Self {
        Self {
            inner: None,
            _capability: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_none()
    }

    pub fn get(&self) -> Option<&dyn Reflect> {
        self.inner.as_deref()
    }

    pub fn get_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.inner.as_deref_mut()
    }

    pub fn set<T: Implements<C>>(&mut self, value: T) {
        self.inner = Some(Box::new(value));
    }

    pub fn take(&mut self) -> Option<Box<dyn Reflect>> {
        self.inner.take()
    }

    pub fn downcast_ref<T: Implements<C>>(&self) -> Option<&T> {
        self.get().and_then(|v| v.downcast_ref::<T>())
    }

    pub fn downcast_mut<T: Implements<C>>(&mut self) -> Option<&mut T> {
        self.get_mut().and_then(|v| v.downcast_mut::<T>())
    }

    /// Rust type name of the held value.
    pub fn concrete_type_name(&self) -> Option<&'static str> {
        self.get().map(|v| v.type_name())
    }
}

impl<C: Capability> Default for Poly<C> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<C: Capability> Clone for Poly<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.as_ref().map(|v| v.clone_boxed()),
            _capability: PhantomData,
        }
    }
}

impl<C: Capability> PartialEq for Poly<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self.get(), other.get()) {
            (None, None) => true,
            (Some(a), Some(b)) => structural_eq(a, b),
            _ => false,
        }
    }
}

impl<C: Capability> fmt::Debug for Poly<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Poly")
            .field("capability", &type_name::<C>())
            .field("inner", &self.concrete_type_name())
            .finish()
    }
}

impl<C: Capability> ReflectPoly for Poly<C> {
    fn capability(&self) -> &'static str {
        type_name::<C>()
    }

    fn inner(&self) -> Option<&dyn Reflect> {
        self.get()
    }

    fn inner_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.get_mut()
    }

    fn set_inner(&mut self, value: Box<dyn Reflect>) {
        self.inner = Some(value);
    }

    fn clear(&mut self) {
        self.inner = None;
    }
}

impl<C: Capability> Reflect for Poly<C> {
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Polymorphic(self)
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Polymorphic(self)
    }
}

impl<C: Capability> Typed for Poly<C> {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Polymorphic {
            capability: type_name::<C>(),
        })
    }

    fn zero() -> Self {
        Self::empty()
    }
}
