// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Leaf kinds: primitives, `String` and `SystemTime`.
//!
//! Leaves are copied by value and encoded by the shared leaf descriptors, so
//! nothing about them is ever compiled per registry.

use super::{Reflect, ShapeKind, TypeShape, Typed, ValueMut, ValueRef};
use std::time::SystemTime;

/// Primitive kinds with a fixed per-kind encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LeafKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
    String,
    /// `std::time::SystemTime`, copied by value.
    Time,
}

impl LeafKind {
    pub const COUNT: usize = 16;

    pub const ALL: [LeafKind; Self::COUNT] = [
        LeafKind::Bool,
        LeafKind::I8,
        LeafKind::I16,
        LeafKind::I32,
        LeafKind::I64,
        LeafKind::Isize,
        LeafKind::U8,
        LeafKind::U16,
        LeafKind::U32,
        LeafKind::U64,
        LeafKind::Usize,
        LeafKind::F32,
        LeafKind::F64,
        LeafKind::Char,
        LeafKind::String,
        LeafKind::Time,
    ];

    /// Position in [`LeafKind::ALL`], also the leaf's descriptor slot.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            LeafKind::Bool => "bool",
            LeafKind::I8 => "i8",
            LeafKind::I16 => "i16",
            LeafKind::I32 => "i32",
            LeafKind::I64 => "i64",
            LeafKind::Isize => "isize",
            LeafKind::U8 => "u8",
            LeafKind::U16 => "u16",
            LeafKind::U32 => "u32",
            LeafKind::U64 => "u64",
            LeafKind::Usize => "usize",
            LeafKind::F32 => "f32",
            LeafKind::F64 => "f64",
            LeafKind::Char => "char",
            LeafKind::String => "string",
            LeafKind::Time => "time",
        }
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            LeafKind::I8 | LeafKind::I16 | LeafKind::I32 | LeafKind::I64 | LeafKind::Isize
        )
    }

    pub const fn is_unsigned(self) -> bool {
        matches!(
            self,
            LeafKind::U8 | LeafKind::U16 | LeafKind::U32 | LeafKind::U64 | LeafKind::Usize
        )
    }
}

impl std::fmt::Display for LeafKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed leaf value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeafRef<'a> {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Isize(isize),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Usize(usize),
    F32(f32),
    F64(f64),
    Char(char),
    String(&'a str),
    Time(SystemTime),
}

impl LeafRef<'_> {
    pub fn kind(&self) -> LeafKind {
        match self {
            LeafRef::Bool(_) => LeafKind::Bool,
            LeafRef::I8(_) => LeafKind::I8,
            LeafRef::I16(_) => LeafKind::I16,
            LeafRef::I32(_) => LeafKind::I32,
            LeafRef::I64(_) => LeafKind::I64,
            LeafRef::Isize(_) => LeafKind::Isize,
            LeafRef::U8(_) => LeafKind::U8,
            LeafRef::U16(_) => LeafKind::U16,
            LeafRef::U32(_) => LeafKind::U32,
            LeafRef::U64(_) => LeafKind::U64,
            LeafRef::Usize(_) => LeafKind::Usize,
            LeafRef::F32(_) => LeafKind::F32,
            LeafRef::F64(_) => LeafKind::F64,
            LeafRef::Char(_) => LeafKind::Char,
            LeafRef::String(_) => LeafKind::String,
            LeafRef::Time(_) => LeafKind::Time,
        }
    }
}

/// Returned when a leaf is assigned a value of another kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("leaf kind mismatch: expected {expected}, got {got}")]
pub struct LeafMismatch {
    pub expected: LeafKind,
    pub got: LeafKind,
}

/// Mutable access to a leaf.
pub trait LeafSlot {
    fn kind(&self) -> LeafKind;
    fn assign(&mut self, value: LeafRef<'_>) -> Result<(), LeafMismatch>;
}

macro_rules! scalar_leaf {
    ($($ty:ty => $kind:ident, $zero:expr;)*) => {$(
        impl LeafSlot for $ty {
            fn kind(&self) -> LeafKind {
                LeafKind::$kind
            }

            fn assign(&mut self, value: LeafRef<'_>) -> Result<(), LeafMismatch> {
                match value {
                    LeafRef::$kind(v) => {
                        *self = v;
                        Ok(())
                    }
                    other => Err(LeafMismatch {
                        expected: LeafKind::$kind,
                        got: other.kind(),
                    }),
                }
            }
        }

        impl Reflect for $ty {
            crate::__reflect_boilerplate!();

            fn reflect_ref(&self) -> ValueRef<'_> {
                ValueRef::Leaf(LeafRef::$kind(*self))
            }

            fn reflect_mut(&mut self) -> ValueMut<'_> {
                ValueMut::Leaf(self)
            }
        }

        impl Typed for $ty {
            const LEAF: Option<LeafKind> = Some(LeafKind::$kind);

            fn shape() -> TypeShape {
                TypeShape::of::<Self>(ShapeKind::Leaf(LeafKind::$kind))
            }

            fn zero() -> Self {
                $zero
            }
        }
    )*};
}

scalar_leaf! {
    bool => Bool, false;
    i8 => I8, 0;
    i16 => I16, 0;
    i32 => I32, 0;
    i64 => I64, 0;
    isize => Isize, 0;
    u8 => U8, 0;
    u16 => U16, 0;
    u32 => U32, 0;
    u64 => U64, 0;
    usize => Usize, 0;
    f32 => F32, 0.0;
    f64 => F64, 0.0;
    char => Char, '\0';
    SystemTime => Time, SystemTime::UNIX_EPOCH;
}

impl LeafSlot for String {
    fn kind(&self) -> LeafKind {
        LeafKind::String
    }

    fn assign(&mut self, value: LeafRef<'_>) -> Result<(), LeafMismatch> {
        match value {
            LeafRef::String(s) => {
                self.clear();
                self.push_str(s);
                Ok(())
            }
            other => Err(LeafMismatch {
                expected: LeafKind::String,
                got: other.kind(),
            }),
        }
    }
}

impl Reflect for String {
    crate::__reflect_boilerplate!();

    fn reflect_ref(&self) -> ValueRef<'_> {
        ValueRef::Leaf(LeafRef::String(self.as_str()))
    }

    fn reflect_mut(&mut self) -> ValueMut<'_> {
        ValueMut::Leaf(self)
    }
}

impl Typed for String {
    const LEAF: Option<LeafKind> = Some(LeafKind::String);

    fn shape() -> TypeShape {
        TypeShape::of::<Self>(ShapeKind::Leaf(LeafKind::String))
    }

    fn zero() -> Self {
        String::new()
    }
}

/// Static shape of the canonical Rust type for a leaf kind.
pub(crate) fn leaf_shape(kind: LeafKind) -> TypeShape {
    match kind {
        LeafKind::Bool => bool::shape(),
        LeafKind::I8 => i8::shape(),
        LeafKind::I16 => i16::shape(),
        LeafKind::I32 => i32::shape(),
        LeafKind::I64 => i64::shape(),
        LeafKind::Isize => isize::shape(),
        LeafKind::U8 => u8::shape(),
        LeafKind::U16 => u16::shape(),
        LeafKind::U32 => u32::shape(),
        LeafKind::U64 => u64::shape(),
        LeafKind::Usize => usize::shape(),
        LeafKind::F32 => f32::shape(),
        LeafKind::F64 => f64::shape(),
        LeafKind::Char => char::shape(),
        LeafKind::String => String::shape(),
        LeafKind::Time => SystemTime::shape(),
    }
}
