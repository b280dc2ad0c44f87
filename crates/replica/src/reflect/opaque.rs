// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Opaque kinds: values that can be reflected over but neither copied nor
//! described. Reaching one is an `UnsupportedType` copy error or an
//! `Unsupported` registry error.

use super::{Reflect, ShapeKind, TypeShape, Typed, ValueMut, ValueRef};
use std::sync::mpsc::{self, Sender, SyncSender};

macro_rules! opaque {
    ($ty:ident, $zero:expr) => {
        impl<T: Send + 'static> Reflect for $ty<T> {
            crate::__reflect_boilerplate!();

            fn reflect_ref(&self) -> ValueRef<'_> {
                ValueRef::Opaque
            }

            fn reflect_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Opaque
            }
        }

        impl<T: Send + 'static> Typed for $ty<T> {
            fn shape() -> TypeShape {
                TypeShape::of::<Self>(ShapeKind::Opaque)
            }

            /// Disconnected sender.
            fn zero() -> Self {
                $zero.0
            }
        }
    };
}

opaque!(Sender, mpsc::channel());
opaque!(SyncSender, mpsc::sync_channel(0));
