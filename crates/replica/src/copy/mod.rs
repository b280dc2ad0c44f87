// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deep copy engine.
//!
//! Walks live values through their [`Reflect`] views; no descriptor or cache
//! is involved. For every value the decision order is:
//!
//! 1. empty pointer / empty polymorphic slot: destination is emptied
//! 2. self-copy hook declared by the type
//! 3. export/import hook declared by the type
//! 4. structural copy by kind
//!
//! Structural copy allocates fresh storage for pointers, copies leaves by
//! value, bulk-copies leaf sequences, recurses into record fields (hidden
//! fields are left at their zero value) and handles maps according to
//! [`MapCopyPolicy`]. Opaque values fail with [`CopyError::UnsupportedType`].

mod hooks;


pub use hooks::{
    export_import_hook, self_copy_hook, CopyFn, CopyOverride, ExportImport, OverrideKind, SelfCopy,
};

use crate::config::{CopyConfig, MapCopyPolicy};
use crate::error::CopyError;
use crate::reflect::{Reflect, ReflectList, ReflectMap, Typed, ValueMut, ValueRef};

/// Deep-copies `src` with the default configuration.
pub fn deep_copy<T: Typed>(src: &T) -> Result<T, CopyError> {
    Copier::new().copy(src)
}

/// Deep-copies a type-erased value into a new box of the same concrete type.
pub fn deep_copy_dyn(src: &dyn Reflect) -> Result<Box<dyn Reflect>, CopyError> {
    Copier::new().copy_dyn(src)
}

/// Configured deep copy engine. Stateless between calls and cheap to share.
#[derive(Debug, Clone, Copy, Default)]
pub struct Copier {
    config: CopyConfig,
}

impl Copier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CopyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CopyConfig {
        &self.config
    }

    pub fn copy<T: Typed>(&self, src: &T) -> Result<T, CopyError> {
        let mut dst = T::zero();
        self.copy_into(src, &mut dst)?;
        Ok(dst)
    }

    pub fn copy_dyn(&self, src: &dyn Reflect) -> Result<Box<dyn Reflect>, CopyError> {
        let mut dst = src.fresh();
        self.copy_into(src, dst.as_mut())?;
        Ok(dst)
    }

    /// Copies `src` into `dst`, which must have the same concrete type.
    ///
    /// An empty source `Option` or `Poly` empties the matching slot in `dst`.
    pub fn copy_into(&self, src: &dyn Reflect, dst: &mut dyn Reflect) -> Result<(), CopyError> {
        let mut walk = Walk {
            config: &self.config,
            depth: 0,
            path: Vec::new(),
        };
        walk.copy(src, dst)
    }
}

/// Per-call traversal state.
struct Walk<'c> {
    config: &'c CopyConfig,
    depth: usize,
    /// Heap addresses of the pointees currently being copied.
    path: Vec<usize>,
}

impl Walk<'_> {
    fn copy(&mut self, src: &dyn Reflect, dst: &mut dyn Reflect) -> Result<(), CopyError> {
        if src.concrete_type_id() != dst.concrete_type_id() {
            return Err(CopyError::TypeMismatch {
                source_type: src.type_name(),
                destination_type: dst.type_name(),
            });
        }

        if is_empty_reference(src) {
            clear_reference(dst);
            return Ok(());
        }

        match src.copy_override() {
            CopyOverride::None => {}
            CopyOverride::SelfCopy(hook) => {
                log::trace!("[COPY] {} via self-copy hook", src.type_name());
                return hook(src, dst);
            }
            CopyOverride::ExportImport(hook) => {
                log::trace!("[COPY] {} via export/import hook", src.type_name());
                return hook(src, dst);
            }
        }

        if self.depth >= self.config.max_depth {
            return Err(CopyError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }
        self.depth += 1;
        let result = self.structural(src, dst);
        self.depth -= 1;
        result
    }

    fn structural(&mut self, src: &dyn Reflect, dst: &mut dyn Reflect) -> Result<(), CopyError> {
        let type_name = src.type_name();
        match (src.reflect_ref(), dst.reflect_mut()) {
            (ValueRef::Leaf(value), ValueMut::Leaf(slot)) => slot
                .assign(value)
                .map_err(|_| CopyError::KindMismatch { type_name }),

            (ValueRef::Pointer(from), ValueMut::Pointer(to)) => {
                let Some(pointee) = from.pointee() else {
                    to.clear();
                    return Ok(());
                };
                let address = from.address();
                if let Some(address) = address {
                    if self.path.contains(&address) {
                        return Err(CopyError::CyclicStructure { type_name });
                    }
                    self.path.push(address);
                }
                let result = self.copy(pointee, to.alloc());
                if address.is_some() {
                    self.path.pop();
                }
                result
            }

            (ValueRef::Polymorphic(from), ValueMut::Polymorphic(to)) => {
                let Some(inner) = from.inner() else {
                    to.clear();
                    return Ok(());
                };
                // Fresh storage of the held value's own concrete type.
                let mut fresh = inner.fresh();
                self.copy(inner, fresh.as_mut())?;
                to.set_inner(fresh);
                Ok(())
            }

            (
                ValueRef::Array(from) | ValueRef::Sequence(from),
                ValueMut::Array(to) | ValueMut::Sequence(to),
            ) => self.copy_list(src, from, to),

            (ValueRef::Map(from), ValueMut::Map(to)) => self.copy_map(src, from, to),

            (ValueRef::Record(from), ValueMut::Record(to)) => {
                for index in 0..from.field_count() {
                    if !from.field_visible(index) {
                        continue;
                    }
                    match (from.field(index), to.field_mut(index)) {
                        (Some(field), Some(slot)) => self.copy(field, slot)?,
                        _ => return Err(CopyError::KindMismatch { type_name }),
                    }
                }
                Ok(())
            }

            (ValueRef::Opaque, _) => Err(CopyError::UnsupportedType { type_name }),

            _ => Err(CopyError::KindMismatch { type_name }),
        }
    }

    fn copy_list(
        &mut self,
        src: &dyn Reflect,
        from: &dyn ReflectList,
        to: &mut dyn ReflectList,
    ) -> Result<(), CopyError> {
        // Leaf elements carry no indirection: one by-value clone suffices.
        if from.element_leaf().is_some() && to.assign_from(src) {
            return Ok(());
        }

        let len = from.len();
        if !to.reset(len) {
            return Err(CopyError::LengthMismatch {
                type_name: src.type_name(),
                expected: to.len(),
                found: len,
            });
        }
        for index in 0..len {
            match (from.get(index), to.get_mut(index)) {
                (Some(element), Some(slot)) => self.copy(element, slot)?,
                _ => {
                    return Err(CopyError::KindMismatch {
                        type_name: src.type_name(),
                    })
                }
            }
        }
        Ok(())
    }

    fn copy_map(
        &mut self,
        src: &dyn Reflect,
        from: &dyn ReflectMap,
        to: &mut dyn ReflectMap,
    ) -> Result<(), CopyError> {
        let type_name = src.type_name();
        match self.config.map_policy {
            MapCopyPolicy::Shallow => {
                if to.assign_from(src) {
                    Ok(())
                } else {
                    Err(CopyError::KindMismatch { type_name })
                }
            }
            MapCopyPolicy::Deep => {
                to.clear();
                for (key, value) in from.entries() {
                    let mut new_key = key.fresh();
                    self.copy(key, new_key.as_mut())?;
                    let mut new_value = value.fresh();
                    self.copy(value, new_value.as_mut())?;
                    if !to.insert_boxed(new_key, new_value) {
                        return Err(CopyError::KindMismatch { type_name });
                    }
                }
                Ok(())
            }
        }
    }
}

/// Empties `dst`, whose zero value may hold something if `Default` filled it.
fn clear_reference(dst: &mut dyn Reflect) {
    match dst.reflect_mut() {
        ValueMut::Pointer(pointer) => {
            pointer.clear();
        }
        ValueMut::Polymorphic(poly) => poly.clear(),
        _ => {}
    }
}

/// Empty `Option` or empty `Poly` slot.
fn is_empty_reference(value: &dyn Reflect) -> bool {
    match value.reflect_ref() {
        ValueRef::Pointer(pointer) => pointer.pointee().is_none(),
        ValueRef::Polymorphic(poly) => poly.inner().is_none(),
        _ => false,
    }
}
