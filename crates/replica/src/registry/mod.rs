// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Name registry and descriptor compiler.
//!
//! # Lifecycle
//!
//! ```text
//!  setup (any thread)                          steady state
//!  ------------------                          ------------
//!  TypeRegistry::register::<T>(name)   seal()  SealedRegistry
//!  TypeRegistry::attach::<C, T>()     ------>  encoder() / decoder()
//!  (RwLock, compile on first use)              (immutable, lock-free, Clone)
//! ```
//!
//! A type is compiled at most once per registry; registering it again returns
//! the cached descriptor. Pointer types are stripped before naming, so
//! registering `Box<Point>` names `Point`. Names only attach to records and
//! polymorphic slots: a name supplied for any other kind is ignored with a
//! warning. The name <-> type mapping is a bijection; conflicting
//! registrations fail with [`RegistryError`].

mod compiler;
mod descriptor;
mod fingerprint;


pub use descriptor::{DescriptorId, DescriptorKind, FieldDescriptor, TypeDescriptor};
pub use fingerprint::Fingerprint;

use crate::codec::{Decoder, Encoder};
use crate::config::CodecConfig;
use crate::error::RegistryError;
use crate::reflect::{Capability, Implements, Poly, TypeShape, Typed};
use compiler::Compiler;
use descriptor::leaf_descriptors;
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Descriptor arena plus the indexes over it.
pub(crate) struct Tables {
    /// `None` only while a recursive compilation is in flight.
    pub(crate) slots: Vec<Option<Arc<TypeDescriptor>>>,
    pub(crate) by_type: HashMap<TypeId, DescriptorId>,
    by_name: HashMap<String, DescriptorId>,
    /// Capability descriptor -> attached named variants.
    variants: HashMap<DescriptorId, Vec<DescriptorId>>,
}

impl Tables {
    fn new() -> Self {
        let leaves = leaf_descriptors();
        let mut by_type = HashMap::with_capacity(leaves.len() * 4);
        for leaf in leaves {
            by_type.insert(leaf.type_id, leaf.id);
        }
        Self {
            slots: leaves.iter().cloned().map(Some).collect(),
            by_type,
            by_name: HashMap::new(),
            variants: HashMap::new(),
        }
    }

    fn get(&self, id: DescriptorId) -> Option<&Arc<TypeDescriptor>> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn by_type(&self, type_id: TypeId) -> Option<&Arc<TypeDescriptor>> {
        self.by_type.get(&type_id).and_then(|id| self.get(*id))
    }

    fn by_name(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.by_name.get(name).and_then(|id| self.get(*id))
    }

    fn variants(&self, capability: DescriptorId) -> &[DescriptorId] {
        self.variants
            .get(&capability)
            .map_or(&[][..], Vec::as_slice)
    }

    fn bind_name(&mut self, id: DescriptorId, name: &str, sealed: bool) -> Result<(), RegistryError> {
        let descriptor = self
            .get(id)
            .cloned()
            .ok_or(RegistryError::NotRegistered { type_name: "<reserved>" })?;

        if !descriptor.kind.is_nameable() {
            log::warn!(
                "[REGISTRY] ignoring name {:?} for non-record type {}",
                name,
                descriptor.type_name
            );
            return Ok(());
        }

        if let Some(existing) = descriptor.name() {
            if existing == name {
                return Ok(());
            }
            return Err(RegistryError::TypeNameConflict {
                type_name: descriptor.type_name,
                existing: existing.to_owned(),
                requested: name.to_owned(),
            });
        }

        if let Some(other) = self.by_name(name) {
            return Err(RegistryError::NameTaken {
                name: name.to_owned(),
                existing_type: other.type_name,
                requested_type: descriptor.type_name,
            });
        }

        if sealed {
            return Err(RegistryError::Sealed {
                type_name: descriptor.type_name,
            });
        }

        if descriptor.name.set(name.to_owned()).is_err() {
            return Err(RegistryError::TypeNameConflict {
                type_name: descriptor.type_name,
                existing: descriptor.name().unwrap_or_default().to_owned(),
                requested: name.to_owned(),
            });
        }
        self.by_name.insert(name.to_owned(), id);
        log::debug!(
            "[REGISTRY] {} registered as {:?} ({})",
            descriptor.type_name,
            name,
            id
        );
        Ok(())
    }
}

/// Setup-phase registry. Safe to share between threads during startup.
pub struct TypeRegistry {
    state: RwLock<Tables>,
    sealed: AtomicBool,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Tables::new()),
            sealed: AtomicBool::new(false),
        }
    }

    /// Registers `T` (pointers stripped) under `name` and returns its descriptor.
    ///
    /// An empty `name` compiles the type without naming it. Registering the
    /// same type with the same name again is a no-op.
    pub fn register<T: Typed>(&self, name: &str) -> Result<Arc<TypeDescriptor>, RegistryError> {
        self.register_shape(T::shape(), name)
    }

    /// Shape-based form of [`register`](Self::register).
    pub fn register_shape(
        &self,
        shape: TypeShape,
        name: &str,
    ) -> Result<Arc<TypeDescriptor>, RegistryError> {
        let shape = shape.strip_pointers();

        // Fast path: already compiled and already carrying this name
        {
            let tables = self.state.read();
            if let Some(descriptor) = tables.by_type(shape.type_id) {
                if name.is_empty() || descriptor.name() == Some(name) {
                    return Ok(Arc::clone(descriptor));
                }
            }
        }

        let mut tables = self.state.write();
        let id = self.compile_locked(&mut tables, &shape)?;
        if !name.is_empty() {
            tables.bind_name(id, name, self.is_sealed())?;
        }
        tables
            .get(id)
            .cloned()
            .ok_or(RegistryError::NotRegistered {
                type_name: shape.type_name,
            })
    }

    /// Declares `T` an accepted variant of the capability `C`.
    ///
    /// `T` must already be registered with a name; the name is what a
    /// polymorphic value carries on the wire.
    pub fn attach<C: Capability, T: Implements<C>>(&self) -> Result<(), RegistryError> {
        let mut tables = self.state.write();
        let capability = self.compile_locked(&mut tables, &Poly::<C>::shape())?;

        let type_name = std::any::type_name::<T>();
        let variant = tables
            .by_type(TypeId::of::<T>())
            .ok_or(RegistryError::NotRegistered { type_name })?;
        if variant.name().is_none() {
            return Err(RegistryError::Unnamed { type_name });
        }
        let variant = variant.id;

        if tables.variants(capability).contains(&variant) {
            return Ok(());
        }
        if self.is_sealed() {
            return Err(RegistryError::Sealed { type_name });
        }
        tables.variants.entry(capability).or_default().push(variant);
        log::debug!(
            "[REGISTRY] {} attached to {}",
            type_name,
            std::any::type_name::<C>()
        );
        Ok(())
    }

    /// Descriptor of `T`, compiled anonymously if needed.
    pub fn descriptor_of<T: Typed>(&self) -> Result<Arc<TypeDescriptor>, RegistryError> {
        if let Some(descriptor) = self.descriptor(TypeId::of::<T>()) {
            return Ok(descriptor);
        }
        let shape = T::shape();
        let mut tables = self.state.write();
        let id = self.compile_locked(&mut tables, &shape)?;
        tables.get(id).cloned().ok_or(RegistryError::NotRegistered {
            type_name: shape.type_name,
        })
    }

    pub fn descriptor(&self, type_id: TypeId) -> Option<Arc<TypeDescriptor>> {
        self.state.read().by_type(type_id).cloned()
    }

    /// Type registered under `name`.
    pub fn lookup_by_name(&self, name: &str) -> Option<TypeId> {
        self.state.read().by_name(name).map(|d| d.type_id)
    }

    /// Name registered for a type.
    pub fn lookup_by_type(&self, type_id: TypeId) -> Option<String> {
        self.state
            .read()
            .by_type(type_id)
            .and_then(|d| d.name().map(str::to_owned))
    }

    pub fn name_of<T: 'static>(&self) -> Option<String> {
        self.lookup_by_type(TypeId::of::<T>())
    }

    /// Number of descriptors, leaf descriptors included.
    pub fn descriptor_count(&self) -> usize {
        self.state.read().slots.len()
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Snapshots the registry into its immutable steady-state form.
    ///
    /// After sealing, this registry still answers lookups but refuses to
    /// compile new types, bind new names or attach new variants.
    pub fn seal(&self) -> SealedRegistry {
        let tables = self.state.read();
        self.sealed.store(true, Ordering::Release);

        let sealed = Tables {
            slots: tables.slots.clone(),
            by_type: tables.by_type.clone(),
            by_name: tables.by_name.clone(),
            variants: tables.variants.clone(),
        };
        log::debug!(
            "[REGISTRY] sealed with {} descriptors, {} names",
            sealed.slots.len(),
            sealed.by_name.len()
        );
        SealedRegistry {
            tables: Arc::new(sealed),
        }
    }

    fn compile_locked(&self, tables: &mut Tables, shape: &TypeShape) -> Result<DescriptorId, RegistryError> {
        if let Some(id) = tables.by_type.get(&shape.type_id) {
            return Ok(*id);
        }
        if self.is_sealed() {
            return Err(RegistryError::Sealed {
                type_name: shape.type_name,
            });
        }
        Compiler::compile(tables, shape)
    }
}

/// Immutable registry used by the encoder and decoder.
///
/// Cloning is cheap and every lookup is lock-free.
#[derive(Clone)]
pub struct SealedRegistry {
    tables: Arc<Tables>,
}

impl SealedRegistry {
    pub fn descriptor(&self, type_id: TypeId) -> Option<&Arc<TypeDescriptor>> {
        self.tables.by_type(type_id)
    }

    pub fn descriptor_of<T: 'static>(&self) -> Option<&Arc<TypeDescriptor>> {
        self.descriptor(TypeId::of::<T>())
    }

    pub fn descriptor_by_id(&self, id: DescriptorId) -> Option<&Arc<TypeDescriptor>> {
        self.tables.get(id)
    }

    pub fn descriptor_by_name(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.tables.by_name(name)
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<TypeId> {
        self.descriptor_by_name(name).map(|d| d.type_id)
    }

    pub fn lookup_by_type(&self, type_id: TypeId) -> Option<&str> {
        self.descriptor(type_id).and_then(|d| d.name())
    }

    /// Variants attached to a capability descriptor.
    pub fn variants_of(&self, capability: DescriptorId) -> &[DescriptorId] {
        self.tables.variants(capability)
    }

    /// Whether a polymorphic slot may hold `candidate`.
    ///
    /// Only variants attached through [`TypeRegistry::attach`] qualify; a
    /// capability with no attachments accepts nothing.
    pub fn accepts(&self, capability: DescriptorId, candidate: DescriptorId) -> bool {
        self.variants_of(capability).contains(&candidate)
    }

    /// Registered names in unspecified order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.by_name.keys().map(String::as_str)
    }

    pub fn descriptor_count(&self) -> usize {
        self.tables.slots.len()
    }

    pub fn encoder(&self) -> Encoder<'_> {
        Encoder::new(self)
    }

    pub fn decoder(&self) -> Decoder<'_> {
        Decoder::new(self)
    }

    pub fn encoder_with(&self, config: CodecConfig) -> Encoder<'_> {
        Encoder::with_config(self, config)
    }

    pub fn decoder_with(&self, config: CodecConfig) -> Decoder<'_> {
        Decoder::with_config(self, config)
    }
}

impl std::fmt::Debug for SealedRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedRegistry")
            .field("descriptors", &self.tables.slots.len())
            .field("names", &self.tables.by_name.len())
            .finish()
    }
}
