// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Copy overrides.
//!
//! A type can take over its own deep copy in two ways, declared on the derive:
//!
//! ```rust,ignore
//! #[derive(Reflect, Clone, Default)]
//! #[replica(self_copy)]        // uses SelfCopy::self_copy
//! pub struct Handle { ... }
//!
//! #[derive(Reflect, Clone, Default)]
//! #[replica(export_import)]    // export() on the source, import() into a zero value
//! pub struct Ledger { ... }
//! ```
//!
//! When both are declared, the self-copy hook wins.

use crate::error::CopyError;
use crate::reflect::{Reflect, Typed};
use std::fmt;

/// Type-erased copy hook: reads `src`, writes `dst` (same concrete type).
pub type CopyFn = fn(&dyn Reflect, &mut dyn Reflect) -> Result<(), CopyError>;

/// Produces an independent copy of `self`.
pub trait SelfCopy {
    fn self_copy(&self) -> Self
    where
        Self: Sized;
}

/// Round-trips a value through an intermediate representation.
pub trait ExportImport: Sized {
    type Repr;
    type Error: fmt::Display;

    fn export(&self) -> Self::Repr;
    fn import(&mut self, repr: Self::Repr) -> Result<(), Self::Error>;
}

/// Which override, if any, a type declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverrideKind {
    None,
    SelfCopy,
    ExportImport,
}

/// Resolved copy override of a type.
#[derive(Clone, Copy, Default)]
pub enum CopyOverride {
    #[default]
    None,
    SelfCopy(CopyFn),
    ExportImport(CopyFn),
}

impl CopyOverride {
    /// Picks the override by precedence: self-copy, then export/import.
    pub const fn resolve(self_copy: Option<CopyFn>, export_import: Option<CopyFn>) -> Self {
        match (self_copy, export_import) {
            (Some(hook), _) => CopyOverride::SelfCopy(hook),
            (None, Some(hook)) => CopyOverride::ExportImport(hook),
            (None, None) => CopyOverride::None,
        }
    }

    pub const fn kind(&self) -> OverrideKind {
        match self {
            CopyOverride::None => OverrideKind::None,
            CopyOverride::SelfCopy(_) => OverrideKind::SelfCopy,
            CopyOverride::ExportImport(_) => OverrideKind::ExportImport,
        }
    }

    pub const fn hook(&self) -> Option<CopyFn> {
        match self {
            CopyOverride::None => None,
            CopyOverride::SelfCopy(hook) | CopyOverride::ExportImport(hook) => Some(*hook),
        }
    }
}

impl fmt::Debug for CopyOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.kind(), f)
    }
}

fn downcast_pair<'s, 'd, T: Reflect>(
    src: &'s dyn Reflect,
    dst: &'d mut dyn Reflect,
) -> Result<(&'s T, &'d mut T), CopyError> {
    let destination_type = dst.type_name();
    match (src.downcast_ref::<T>(), dst.downcast_mut::<T>()) {
        (Some(src), Some(dst)) => Ok((src, dst)),
        _ => Err(CopyError::TypeMismatch {
            source_type: src.type_name(),
            destination_type,
        }),
    }
}

/// Hook installed by `#[replica(self_copy)]`.
pub fn self_copy_hook<T: SelfCopy + Reflect>(
    src: &dyn Reflect,
    dst: &mut dyn Reflect,
) -> Result<(), CopyError> {
    let (src, dst) = downcast_pair::<T>(src, dst)?;
    *dst = src.self_copy();
    Ok(())
}

/// Hook installed by `#[replica(export_import)]`.
///
/// The representation is imported into a zero value; `dst` is only replaced
/// when the import succeeds.
pub fn export_import_hook<T: ExportImport + Typed>(
    src: &dyn Reflect,
    dst: &mut dyn Reflect,
) -> Result<(), CopyError> {
    let (src, dst) = downcast_pair::<T>(src, dst)?;
    let mut imported = T::zero();
    imported
        .import(src.export())
        .map_err(|e| CopyError::Import {
            type_name: std::any::type_name::<T>(),
            message: e.to_string(),
        })?;
    *dst = imported;
    Ok(())
}
