// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![no_main]

use libfuzzer_sys::fuzz_target;
use replica::{
    Capability, CodecConfig, Implements, Poly, Reflect, SealedRegistry, TypeRegistry,
};
use std::collections::HashMap;
use std::sync::OnceLock;

pub struct Item;
impl Capability for Item {}

#[derive(Reflect, Debug, Clone, Default)]
pub struct Tool {
    pub name: String,
    pub uses: u16,
}
impl Implements<Item> for Tool {}

#[derive(Reflect, Debug, Clone, Default)]
pub struct Crate {
    pub label: String,
    pub items: Vec<Poly<Item>>,
    pub counts: HashMap<String, i64>,
    pub next: Option<Box<Crate>>,
    pub grid: [u8; 4],
    pub glyph: char,
}
impl Implements<Item> for Crate {}

fn registry() -> &'static SealedRegistry {
    static REGISTRY: OnceLock<SealedRegistry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let registry = TypeRegistry::new();
        let _ = registry.register::<Tool>("fuzz.Tool");
        let _ = registry.register::<Crate>("fuzz.Crate");
        let _ = registry.attach::<Item, Tool>();
        let _ = registry.attach::<Item, Crate>();
        registry.seal()
    })
}

fuzz_target!(|data: &[u8]| {
    let config = CodecConfig::default()
        .verify_fingerprint(false)
        .max_collection_len(4096)
        .max_depth(64);
    let decoder = registry().decoder_with(config);

    // Fuzz frame decoding: any input must yield Ok or Err, never a panic
    let _ = decoder.decode_from_slice::<Crate>(data);
    let _ = decoder.decode_from_slice::<Tool>(data);
});
