// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types.
//!
//! Configuration problems (conflicting registrations, unsupported kinds) are
//! reported by [`RegistryError`] during setup. Everything that can go wrong
//! while copying, encoding or decoding a value is a recoverable error returned
//! to the caller; no path aborts the process.

use crate::reflect::LeafKind;
use std::io;
use thiserror::Error;

/// Registration and descriptor compilation failures.
///
/// These are programming mistakes; callers are expected to surface them at
/// startup and refuse to continue.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("type {type_name} is already registered as {existing:?}, cannot register it as {requested:?}")]
    TypeNameConflict {
        type_name: &'static str,
        existing: String,
        requested: String,
    },
    #[error("name {name:?} is already claimed by {existing_type}, requested by {requested_type}")]
    NameTaken {
        name: String,
        existing_type: &'static str,
        requested_type: &'static str,
    },
    #[error("unsupported type for descriptor compilation: {type_name}")]
    Unsupported { type_name: &'static str },
    #[error("type not registered: {type_name}")]
    NotRegistered { type_name: &'static str },
    #[error("type {type_name} has no registered name")]
    Unnamed { type_name: &'static str },
    #[error("registry is sealed, cannot register {type_name}")]
    Sealed { type_name: &'static str },
}

/// Deep copy failures.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("unsupported type for copy: {type_name}")]
    UnsupportedType { type_name: &'static str },
    #[error("cannot copy {source_type} into {destination_type}")]
    TypeMismatch {
        source_type: &'static str,
        destination_type: &'static str,
    },
    #[error("reflection kind mismatch while copying {type_name}")]
    KindMismatch { type_name: &'static str },
    #[error("import failed for {type_name}: {message}")]
    Import {
        type_name: &'static str,
        message: String,
    },
    #[error("length mismatch copying {type_name}: expected {expected}, found {found}")]
    LengthMismatch {
        type_name: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },
    #[error("cyclic structure detected at {type_name}")]
    CyclicStructure { type_name: &'static str },
}

/// Encoding failures.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("sink write failed: {0}")]
    Io(#[from] io::Error),
    #[error("type not registered: {type_name}")]
    TypeNotRegistered { type_name: &'static str },
    #[error("type not found for polymorphic value: {type_name}")]
    TypeNotFound { type_name: &'static str },
    #[error("concrete type {type_name} has no registered name")]
    Unnamed { type_name: &'static str },
    #[error("descriptor for {type_name} belongs to another registry")]
    ForeignDescriptor { type_name: &'static str },
    #[error("value of type {found} does not match descriptor for {expected}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("registry is missing a descriptor referenced by {type_name}")]
    InconsistentDescriptor { type_name: &'static str },
    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// Decoding failures.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("source read failed: {0}")]
    Io(#[from] io::Error),
    #[error("input ended before the value was complete")]
    Truncated,
    #[error("bad frame magic {found:02x?}")]
    BadMagic { found: [u8; 3] },
    #[error("unsupported wire version {found}")]
    UnsupportedVersion { found: u8 },
    #[error("schema fingerprint mismatch for {type_name}")]
    FingerprintMismatch { type_name: &'static str },
    #[error("unexpected wire tag 0x{found:02x}, expected 0x{expected:02x}")]
    UnexpectedTag { expected: u8, found: u8 },
    #[error("unknown type name {name:?}")]
    UnknownName { name: String },
    #[error("{name:?} is not an attached variant of {capability}")]
    NotAVariant {
        name: String,
        capability: &'static str,
    },
    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },
    #[error("collection length {len} exceeds limit of {limit}")]
    TooLarge { len: u64, limit: usize },
    #[error("invalid UTF-8 in string payload")]
    InvalidUtf8,
    #[error("invalid char code point 0x{0:x}")]
    InvalidChar(u32),
    #[error("value out of range for {kind:?}")]
    OutOfRange { kind: LeafKind },
    #[error("varint exceeds 64 bits")]
    VarintOverflow,
    #[error("invalid data: {0}")]
    InvalidData(&'static str),
    #[error("{count} trailing bytes after value")]
    TrailingBytes { count: usize },
    #[error("type not registered: {type_name}")]
    TypeNotRegistered { type_name: &'static str },
    #[error("descriptor for {type_name} belongs to another registry")]
    ForeignDescriptor { type_name: &'static str },
    #[error("destination of type {found} does not match descriptor for {expected}")]
    KindMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("registry is missing a descriptor referenced by {type_name}")]
    InconsistentDescriptor { type_name: &'static str },
    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },
}

/// Configuration loading failures.
#[cfg(feature = "config-loaders")]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] io::Error),
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config value: {0}")]
    Invalid(&'static str),
}
