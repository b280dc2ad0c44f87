// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and engine configuration.

#[cfg(feature = "config-loaders")]
use crate::error::ConfigError;
#[cfg(feature = "config-loaders")]
use std::path::Path;

/// Frame magic written before every encoded value.
pub const WIRE_MAGIC: [u8; 3] = *b"RPL";

/// Current wire format version.
pub const WIRE_VERSION: u8 = 1;

/// Length of a structural fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 8;

/// Frame header length: magic + version + fingerprint.
pub const HEADER_LEN: usize = WIRE_MAGIC.len() + 1 + FINGERPRINT_LEN;

/// Longest LEB128 encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Default nesting limit for copy, encode and decode.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default upper bound on a decoded collection length (16 Mi elements).
pub const DEFAULT_MAX_COLLECTION_LEN: usize = 1 << 24;

/// Most elements (or string bytes) the decoder reserves on the word of a
/// length prefix alone; beyond that, storage grows as data arrives.
pub const PREALLOC_LIMIT: usize = 4096;

/// How the deep copy engine treats map-kinded values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize, serde::Serialize),
    serde(rename_all = "snake_case")
)]
pub enum MapCopyPolicy {
    /// The copy gets its own map, but keys and values are cloned as-is:
    /// shared pointees (`Arc`) stay shared with the source.
    #[default]
    Shallow,
    /// Keys and values are deep-copied entry by entry.
    Deep,
}

/// Deep copy engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct CopyConfig {
    pub map_policy: MapCopyPolicy,
    pub max_depth: usize,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            map_policy: MapCopyPolicy::Shallow,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CopyConfig {
    #[must_use]
    pub fn map_policy(mut self, policy: MapCopyPolicy) -> Self {
        self.map_policy = policy;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Encoder/decoder configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct CodecConfig {
    pub max_depth: usize,
    /// Decoder rejects any length prefix above this value.
    pub max_collection_len: usize,
    /// When false the decoder skips the schema fingerprint comparison.
    pub verify_fingerprint: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_collection_len: DEFAULT_MAX_COLLECTION_LEN,
            verify_fingerprint: true,
        }
    }
}

impl CodecConfig {
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    #[must_use]
    pub fn max_collection_len(mut self, len: usize) -> Self {
        self.max_collection_len = len;
        self
    }

    #[must_use]
    pub fn verify_fingerprint(mut self, verify: bool) -> Self {
        self.verify_fingerprint = verify;
        self
    }
}

/// Combined configuration, loadable from YAML with the `config-loaders` feature.
///
/// ```yaml
/// copy:
///   map_policy: deep
///   max_depth: 64
/// codec:
///   max_collection_len: 65536
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "config-loaders",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct EngineConfig {
    pub copy: CopyConfig,
    pub codec: CodecConfig,
}

#[cfg(feature = "config-loaders")]
impl EngineConfig {
    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        log::debug!("[CONFIG] loaded engine config from {}", path.display());
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.copy.max_depth == 0 || self.codec.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_len() {
        assert_eq!(HEADER_LEN, 12);
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.copy.map_policy, MapCopyPolicy::Shallow);
        assert_eq!(config.copy.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.codec.max_collection_len, DEFAULT_MAX_COLLECTION_LEN);
        assert!(config.codec.verify_fingerprint);
    }

    #[test]
    fn test_builders() {
        let copy = CopyConfig::default()
            .map_policy(MapCopyPolicy::Deep)
            .max_depth(8);
        assert_eq!(copy.map_policy, MapCopyPolicy::Deep);
        assert_eq!(copy.max_depth, 8);

        let codec = CodecConfig::default()
            .max_collection_len(16)
            .verify_fingerprint(false);
        assert_eq!(codec.max_collection_len, 16);
        assert!(!codec.verify_fingerprint);
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml_partial_document() {
        let config = EngineConfig::from_yaml_str("copy:\n  map_policy: deep\n").unwrap();
        assert_eq!(config.copy.map_policy, MapCopyPolicy::Deep);
        assert_eq!(config.copy.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.codec, CodecConfig::default());
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml_rejects_zero_depth() {
        let err = EngineConfig::from_yaml_str("codec:\n  max_depth: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[cfg(feature = "config-loaders")]
    #[test]
    fn test_yaml_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "codec:\n  max_collection_len: 1024\n  verify_fingerprint: false").unwrap();
        let config = EngineConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.codec.max_collection_len, 1024);
        assert!(!config.codec.verify_fingerprint);
    }
}
