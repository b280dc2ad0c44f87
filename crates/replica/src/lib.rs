// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # replica - reflection-driven deep copy and descriptor-compiled codec
//!
//! `replica` gives Rust types a small runtime reflection layer and builds two
//! engines on top of it:
//!
//! - a **deep copy engine** that walks live values (no cached metadata) and
//!   honours per-type copy overrides, and
//! - a **descriptor-driven codec** that compiles one immutable
//!   [`TypeDescriptor`] per type into a sealed registry and reuses it for
//!   every encode/decode of that type.
//!
//! ## Quick Start
//!
//! ```rust
//! use replica::{deep_copy, Reflect, TypeRegistry};
//!
//! #[derive(Reflect, Debug, Clone, Default, PartialEq)]
//! pub struct Point {
//!     pub x: i32,
//!     pub y: i32,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = TypeRegistry::new();
//! registry.register::<Point>("pkg.Point")?;
//! let registry = registry.seal();
//!
//! let copy = deep_copy(&Point { x: 1, y: 2 })?;
//! assert_eq!(copy, Point { x: 1, y: 2 });
//!
//! let bytes = registry.encoder().encode_to_vec(&copy)?;
//! let back: Point = registry.decoder().decode_from_slice(&bytes)?;
//! assert_eq!(back, copy);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +------------------------------------------------------------------+
//! |   copy::Copier            codec::Encoder / codec::Decoder        |
//! |   (live values + hooks)   (descriptors + wire format v1)         |
//! +------------------------------------------------------------------+
//! |   registry::TypeRegistry --seal()--> registry::SealedRegistry    |
//! |   (names <-> types, descriptor compiler, leaf table)             |
//! +------------------------------------------------------------------+
//! |   reflect: Reflect / Typed / ValueRef / ValueMut / Poly<C>       |
//! |   #[derive(Reflect)] from replica-codegen                        |
//! +------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`reflect`] - value model, kind views, static shapes
//! - [`registry`] - name registry and descriptor compiler
//! - [`copy`] - deep copy engine and copy overrides
//! - [`codec`] - versioned binary wire format
//! - [`config`] - constants and engine configuration
//! - [`error`] - error types

// Allow the derive macro to work inside this crate's tests
extern crate self as replica;

/// Versioned binary encoder/decoder driven by compiled descriptors.
pub mod codec;
/// Wire constants and engine configuration.
pub mod config;
/// Deep copy engine and copy override hooks.
pub mod copy;
/// Error types for every fallible surface.
pub mod error;
/// Runtime reflection model.
pub mod reflect;
/// Name registry and descriptor compiler.
pub mod registry;

pub use codec::{Decoder, Encoder};
pub use config::{CodecConfig, CopyConfig, EngineConfig, MapCopyPolicy};
pub use copy::{
    deep_copy, deep_copy_dyn, Copier, CopyFn, CopyOverride, ExportImport, OverrideKind, SelfCopy,
};
pub use error::{CopyError, DecodeError, EncodeError, RegistryError};
pub use reflect::{
    structural_eq, Capability, FieldShape, Implements, Kind, LeafKind, LeafMismatch, LeafRef,
    LeafSlot, Poly, Reflect, ReflectList, ReflectMap, ReflectPointer, ReflectPoly, ReflectRecord,
    ShapeKind, TypeShape, Typed, ValueMut, ValueRef,
};
pub use registry::{
    DescriptorId, DescriptorKind, FieldDescriptor, Fingerprint, SealedRegistry, TypeDescriptor,
    TypeRegistry,
};

/// `#[derive(Reflect)]`: implements [`Reflect`], [`ReflectRecord`] and [`Typed`]
/// for a struct with named fields.
pub use replica_codegen::Reflect;
