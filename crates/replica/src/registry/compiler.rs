// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor compiler.
//!
//! Turns a [`TypeShape`] into descriptors in the registry arena, recursing
//! into child shapes. A type's slot is reserved (and its `TypeId` indexed)
//! before its children are compiled, so a recursive reference resolves to the
//! reserved id instead of recursing forever.
//!
//! Compilation is all-or-nothing: on error every slot reserved by the call is
//! released again.

use super::descriptor::{DescriptorId, DescriptorKind, FieldDescriptor, TypeDescriptor};
use super::Tables;
use crate::error::RegistryError;
use crate::reflect::{ShapeKind, TypeShape};
use std::any::TypeId;
use std::sync::Arc;

pub(crate) struct Compiler<'t> {
    tables: &'t mut Tables,
    start: usize,
    reserved: Vec<TypeId>,
}

impl<'t> Compiler<'t> {
    /// Compiles `shape` and every type it reaches that is not yet known.
    pub(crate) fn compile(tables: &'t mut Tables, shape: &TypeShape) -> Result<DescriptorId, RegistryError> {
        let start = tables.slots.len();
        let mut compiler = Compiler {
            tables,
            start,
            reserved: Vec::new(),
        };
        match compiler.build(shape) {
            Ok(id) => {
                let added = compiler.tables.slots.len() - start;
                if added > 0 {
                    log::debug!(
                        "[REGISTRY] compiled {} descriptor(s) for {}",
                        added,
                        shape.type_name
                    );
                }
                Ok(id)
            }
            Err(err) => {
                compiler.rollback();
                Err(err)
            }
        }
    }

    fn build(&mut self, shape: &TypeShape) -> Result<DescriptorId, RegistryError> {
        if let Some(id) = self.tables.by_type.get(&shape.type_id) {
            return Ok(*id);
        }

        let id = self.reserve(shape.type_id)?;
        let kind = match &shape.kind {
            // Leaf kinds are only reachable through their canonical Rust types,
            // which the leaf table already indexes.
            ShapeKind::Leaf(_) | ShapeKind::Opaque => {
                return Err(RegistryError::Unsupported {
                    type_name: shape.type_name,
                })
            }
            ShapeKind::Pointer { pointee, nullable } => DescriptorKind::Pointer {
                pointee: self.build(&pointee())?,
                nullable: *nullable,
            },
            ShapeKind::Array { element, len } => DescriptorKind::Array {
                element: self.build(&element())?,
                len: *len,
            },
            ShapeKind::Sequence { element } => DescriptorKind::Sequence {
                element: self.build(&element())?,
            },
            ShapeKind::Map { key, value } => DescriptorKind::Map {
                key: self.build(&key())?,
                value: self.build(&value())?,
            },
            ShapeKind::Record { fields } => {
                let mut compiled = Vec::with_capacity(fields.len());
                for field in fields {
                    compiled.push(FieldDescriptor {
                        name: field.name,
                        tag: field.tag,
                        visible: field.visible,
                        offset: field.offset,
                        descriptor: self.build(&(field.shape)())?,
                        get: field.get,
                        get_mut: field.get_mut,
                    });
                }
                DescriptorKind::Record { fields: compiled }
            }
            ShapeKind::Polymorphic { capability } => DescriptorKind::Polymorphic {
                capability: *capability,
            },
        };

        let descriptor = TypeDescriptor::new(id, shape, kind);
        log::trace!(
            "[REGISTRY] descriptor {} = {} ({:?})",
            id,
            shape.type_name,
            descriptor.kind
        );
        self.tables.slots[id.index()] = Some(Arc::new(descriptor));
        Ok(id)
    }

    fn reserve(&mut self, type_id: TypeId) -> Result<DescriptorId, RegistryError> {
        let index = u32::try_from(self.tables.slots.len()).map_err(|_| RegistryError::Unsupported {
            type_name: "descriptor arena overflow",
        })?;
        let id = DescriptorId(index);
        self.tables.slots.push(None);
        self.tables.by_type.insert(type_id, id);
        self.reserved.push(type_id);
        Ok(id)
    }

    fn rollback(&mut self) {
        for type_id in self.reserved.drain(..) {
            self.tables.by_type.remove(&type_id);
        }
        self.tables.slots.truncate(self.start);
    }
}
