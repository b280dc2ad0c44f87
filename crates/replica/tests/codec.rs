// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com
//
// Codec round trips through the public API.
//
// Random values are generated from a fixed seed, encoded, decoded and
// compared; one golden vector pins the exact wire layout of a small record
// so format changes are caught.

#![allow(clippy::float_cmp)]

use replica::{
    deep_copy, Capability, CodecConfig, DecodeError, Implements, Poly, Reflect, SealedRegistry,
    TypeRegistry,
};
use std::collections::HashMap;
use std::io::{Seek, SeekFrom, Write};
use std::time::{Duration, SystemTime};

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

pub struct Command;
impl Capability for Command {}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Move {
    pub to: Point,
    pub speed: f32,
}
impl Implements<Command> for Move {}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Say {
    pub text: String,
    pub loud: bool,
}
impl Implements<Command> for Say {}

#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct Script {
    pub name: String,
    pub created: SystemTime,
    pub steps: Vec<Poly<Command>>,
    pub vars: HashMap<String, i64>,
    pub checkpoint: Option<Box<Point>>,
    pub palette: [u32; 2],
    pub initial: char,
    scratch: Vec<u8>,
}

impl Default for Script {
    fn default() -> Self {
        Script {
            name: String::new(),
            created: SystemTime::UNIX_EPOCH,
            steps: Vec::new(),
            vars: HashMap::new(),
            checkpoint: None,
            palette: [0; 2],
            initial: '\0',
            scratch: Vec::new(),
        }
    }
}

fn registry() -> SealedRegistry {
    let registry = TypeRegistry::new();
    registry.register::<Point>("pkg.Point").unwrap();
    registry.register::<Move>("cmd.Move").unwrap();
    registry.register::<Say>("cmd.Say").unwrap();
    registry.register::<Script>("pkg.Script").unwrap();
    registry.attach::<Command, Move>().unwrap();
    registry.attach::<Command, Say>().unwrap();
    registry.seal()
}

fn random_script(rng: &mut fastrand::Rng) -> Script {
    let steps = (0..rng.usize(0..6))
        .map(|_| match rng.u8(0..3) {
            0 => Poly::empty(),
            1 => Poly::new(Move {
                to: Point {
                    x: rng.i32(..),
                    y: rng.i32(..),
                },
                speed: rng.f32(),
            }),
            _ => Poly::new(Say {
                text: (0..rng.usize(0..16)).map(|_| rng.alphanumeric()).collect(),
                loud: rng.bool(),
            }),
        })
        .collect();
    let vars = (0..rng.usize(0..5))
        .map(|i| (format!("v{i}"), rng.i64(..)))
        .collect();
    let offset = Duration::new(rng.u64(0..2_000_000_000), rng.u32(0..1_000_000_000));
    let created = if rng.bool() {
        SystemTime::UNIX_EPOCH + offset
    } else {
        SystemTime::UNIX_EPOCH - offset
    };
    Script {
        name: format!("script-{}", rng.u16(..)),
        created,
        steps,
        vars,
        checkpoint: rng.bool().then(|| {
            Box::new(Point {
                x: rng.i32(..),
                y: rng.i32(..),
            })
        }),
        palette: [rng.u32(..), rng.u32(..)],
        initial: rng.char(..),
        scratch: vec![rng.u8(..)],
    }
}

#[test]
fn test_random_roundtrips() {
    let registry = registry();
    let encoder = registry.encoder();
    let decoder = registry.decoder();
    let mut rng = fastrand::Rng::with_seed(2024);

    for _ in 0..250 {
        let script = random_script(&mut rng);
        let bytes = encoder.encode_to_vec(&script).unwrap();
        let back: Script = decoder.decode_from_slice(&bytes).unwrap();

        let expected = Script {
            scratch: Vec::new(),
            ..script
        };
        assert_eq!(back, expected);
    }
}

#[test]
fn test_reencode_is_stable() {
    let registry = registry();
    let mut rng = fastrand::Rng::with_seed(11);
    for _ in 0..50 {
        let script = Script {
            vars: HashMap::new(),
            ..random_script(&mut rng)
        };
        let first = registry.encoder().encode_to_vec(&script).unwrap();
        let back: Script = registry.decoder().decode_from_slice(&first).unwrap();
        let second = registry.encoder().encode_to_vec(&back).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_point_end_to_end() {
    let registry = TypeRegistry::new();
    registry.register::<Point>("pkg.Point").unwrap();
    let registry = registry.seal();
    assert_eq!(
        registry.lookup_by_name("pkg.Point"),
        Some(std::any::TypeId::of::<Point>())
    );

    let src = Box::new(Point { x: 1, y: 2 });
    let mut copy = deep_copy(&src).unwrap();
    assert_eq!(copy, src);
    assert!(!std::ptr::eq(copy.as_ref(), src.as_ref()));
    copy.x = 10;
    assert_eq!(src.x, 1);

    let bytes = registry.encoder().encode_to_vec(src.as_ref()).unwrap();
    let back: Point = registry.decoder().decode_from_slice(&bytes).unwrap();
    assert_eq!(back, Point { x: 1, y: 2 });
}

#[test]
fn test_golden_point() {
    let registry = registry();
    let bytes = registry
        .encoder()
        .encode_to_vec(&Point { x: 300, y: -2 })
        .unwrap();

    let fingerprint = registry.descriptor_of::<Point>().unwrap().fingerprint();
    let mut expected = b"RPL\x01".to_vec();
    expected.extend_from_slice(&fingerprint);
    expected.extend_from_slice(&[
        0x25, // record
        0x02, // two visible fields
        0x04, 0xD8, 0x04, // i32 300 -> zigzag 600
        0x04, 0x03, // i32 -2 -> zigzag 3
    ]);
    assert_eq!(bytes, expected);
}

#[test]
fn test_frames_through_file() {
    let registry = registry();
    let mut rng = fastrand::Rng::with_seed(5);
    let scripts: Vec<Script> = (0..8)
        .map(|_| Script {
            scratch: Vec::new(),
            ..random_script(&mut rng)
        })
        .collect();

    let mut file = tempfile::tempfile().unwrap();
    let mut total = 0;
    for script in &scripts {
        total += registry.encoder().encode(None, script, &mut file).unwrap();
    }
    file.flush().unwrap();
    assert_eq!(file.seek(SeekFrom::End(0)).unwrap(), total as u64);

    file.seek(SeekFrom::Start(0)).unwrap();
    let mut reader = std::io::BufReader::new(file);
    for script in &scripts {
        let back: Script = registry.decoder().decode(&mut reader).unwrap();
        assert_eq!(&back, script);
    }
    assert!(matches!(
        registry.decoder().decode::<Script>(&mut reader),
        Err(DecodeError::Truncated)
    ));
}

#[test]
fn test_schema_drift_detected() {
    // Same name, different shape: the receiver sees a fingerprint mismatch
    #[derive(Reflect, Debug, Clone, Default, PartialEq)]
    pub struct PointV2 {
        pub x: i32,
        pub y: i32,
        pub z: i32,
    }

    let sender = registry();
    let bytes = sender
        .encoder()
        .encode_to_vec(&Point { x: 1, y: 2 })
        .unwrap();

    let receiver = TypeRegistry::new();
    receiver.register::<PointV2>("pkg.Point").unwrap();
    let receiver = receiver.seal();
    assert!(matches!(
        receiver.decoder().decode_from_slice::<PointV2>(&bytes),
        Err(DecodeError::FingerprintMismatch { .. })
    ));

    // Without the check the record count catches it
    let lenient = receiver.decoder_with(CodecConfig::default().verify_fingerprint(false));
    assert!(matches!(
        lenient.decode_from_slice::<PointV2>(&bytes),
        Err(DecodeError::LengthMismatch {
            expected: 3,
            found: 2
        })
    ));
}

#[test]
fn test_random_garbage_never_panics() {
    let registry = registry();
    let decoder = registry.decoder_with(
        CodecConfig::default()
            .verify_fingerprint(false)
            .max_collection_len(1 << 10),
    );
    let mut rng = fastrand::Rng::with_seed(0xdead);
    let valid = registry.encoder().encode_to_vec(&random_script(&mut rng)).unwrap();

    for _ in 0..500 {
        let mut bytes = valid.clone();
        for _ in 0..rng.usize(1..4) {
            let at = rng.usize(..bytes.len());
            bytes[at] = rng.u8(..);
        }
        bytes.truncate(rng.usize(..=bytes.len()));
        // Only the absence of a panic matters here
        let _ = decoder.decode_from_slice::<Script>(&bytes);
    }
}
