// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pointer kinds: `Box<T>`, `Arc<T>` and `Option<T>`.

use super::{Reflect, ReflectPointer, ShapeKind, TypeShape, Typed, ValueMut, ValueRef};
use std::sync::Arc;

fn heap_address<T>(value: &T) -> Option<usize> {
    // Zero-sized pointees share a dangling address.
    if std::mem::size_of::<T>() == 0 {
        return None;
    }
    Some(value as *const T as usize)
}

impl<T: Typed> ReflectPointer for Box<T> {
    fn is_nullable(&self) -> bool {
        false
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(&mut **self)
    }

    fn alloc(&mut self) -> &mut dyn Reflect {
        *self = Box::new(T::zero());
        &mut **self
    }

    fn clear(&mut self) -> bool {
        false
    }

    fn address(&self) -> Option<usize> {
        heap_address::<T>(&**self)
    }
}

impl<T: Typed> Reflect for Box<T> {
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Pointer(self)
    }
}

impl<T: Typed> Typed for Box<T> {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Pointer {
            pointee: T::shape,
            nullable: false,
        })
    }

    fn zero() -> Self {
        Box::new(T::zero())
    }
}

impl<T: Typed> ReflectPointer for Arc<T> {
    fn is_nullable(&self) -> bool {
        false
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        Some(&**self)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        Some(Arc::<T>::make_mut(self))
    }

    fn alloc(&mut self) -> &mut dyn Reflect {
        *self = Arc::new(T::zero());
        Arc::<T>::make_mut(self)
    }

    fn clear(&mut self) -> bool {
        false
    }

    fn address(&self) -> Option<usize> {
        heap_address::<T>(&**self)
    }
}

impl<T: Typed> Reflect for Arc<T> {
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Pointer(self)
    }
}

impl<T: Typed> Typed for Arc<T> {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Pointer {
            pointee: T::shape,
            nullable: false,
        })
    }

    fn zero() -> Self {
        Arc::new(T::zero())
    }
}

impl<T: Typed> ReflectPointer for Option<T> {
    fn is_nullable(&self) -> bool {
        true
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        self.as_ref().map(|v| v as &dyn Reflect)
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Reflect> {
        self.as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn alloc(&mut self) -> &mut dyn Reflect {
        self.insert(T::zero())
    }

    fn clear(&mut self) -> bool {
        *self = None;
        true
    }

    fn address(&self) -> Option<usize> {
        // Inline storage, no heap cell of its own.
        None
    }
}

impl<T: Typed> Reflect for Option<T> {
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Pointer(self)
    }
}

impl<T: Typed> Typed for Option<T> {
    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Pointer {
            pointee: T::shape,
            nullable: true,
        })
    }

    fn zero() -> Self {
        None
    }
}
