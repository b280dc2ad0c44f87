// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::encode::split_time;
use super::*;
use crate::config::{CodecConfig, HEADER_LEN};
use crate::reflect::{Capability, Implements, LeafKind, Poly};
use crate::registry::TypeRegistry;
use crate::Reflect;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::time::{Duration, SystemTime};

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Telemetry {
    pub id: u64,
    pub name: String,
    pub samples: Vec<f32>,
    pub window: [i16; 3],
    pub labels: BTreeMap<String, u8>,
    pub origin: Option<Point>,
    pub glyph: char,
    cache: Vec<u8>,
}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Holder {
    pub inner: Box<Point>,
}

#[derive(Reflect, Debug, Clone, PartialEq)]
pub struct Event {
    pub at: SystemTime,
    pub spans: Vec<SystemTime>,
}

impl Default for Event {
    fn default() -> Self {
        Event {
            at: SystemTime::UNIX_EPOCH,
            spans: Vec::new(),
        }
    }
}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Node {
    pub value: u32,
    pub next: Option<Box<Node>>,
}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Unlisted {
    pub flag: bool,
}

pub struct Shape;
impl Capability for Shape {}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Circle {
    pub radius: f64,
}
impl Implements<Shape> for Circle {}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Square {
    pub side: f64,
}
impl Implements<Shape> for Square {}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Triangle {
    pub base: f64,
}
impl Implements<Shape> for Triangle {}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Canvas {
    pub title: String,
    pub main: Poly<Shape>,
}

struct BrokenSink;

impl io::Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn registry() -> SealedRegistry {
    let registry = TypeRegistry::new();
    registry.register::<Point>("pkg.Point").unwrap();
    registry.register::<Telemetry>("pkg.Telemetry").unwrap();
    registry.register::<Holder>("pkg.Holder").unwrap();
    registry.register::<Event>("pkg.Event").unwrap();
    registry.register::<Node>("list.Node").unwrap();
    registry.register::<Canvas>("pkg.Canvas").unwrap();
    registry.register::<Circle>("shape.Circle").unwrap();
    registry.register::<Square>("shape.Square").unwrap();
    registry.register::<Triangle>("shape.Triangle").unwrap();
    registry.attach::<Shape, Circle>().unwrap();
    registry.attach::<Shape, Square>().unwrap();
    registry.register::<HashMap<String, Vec<u8>>>("").unwrap();
    registry.register::<[u8; 4]>("").unwrap();
    registry.seal()
}

fn frame(descriptor: &TypeDescriptor, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(&crate::config::WIRE_MAGIC);
    out.push(crate::config::WIRE_VERSION);
    out.extend_from_slice(&descriptor.fingerprint());
    out.extend_from_slice(body);
    out
}

fn varint(value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    wire::WireWriter::new(&mut out).put_varint(value).unwrap();
    out
}

fn tag(kind: LeafKind) -> u8 {
    WireTag::leaf(kind).as_u8()
}

fn telemetry() -> Telemetry {
    Telemetry {
        id: u64::MAX,
        name: "probe-7".into(),
        samples: vec![1.5, -0.25, f32::MAX],
        window: [-3, 0, i16::MAX],
        labels: BTreeMap::from([("a".to_string(), 1), ("zz".to_string(), 255)]),
        origin: Some(Point { x: -4, y: 9 }),
        glyph: 'é',
        cache: vec![1, 2, 3],
    }
}

fn chain(len: u32) -> Node {
    let mut head = Node::default();
    for value in (0..len).rev() {
        head = Node {
            value,
            next: Some(Box::new(head)),
        };
    }
    head
}

#[test]
fn test_record_roundtrip_skips_hidden() {
    let registry = registry();
    let value = telemetry();
    let bytes = registry.encoder().encode_to_vec(&value).unwrap();
    let back: Telemetry = registry.decoder().decode_from_slice(&bytes).unwrap();

    assert_eq!(back.id, value.id);
    assert_eq!(back.name, value.name);
    assert_eq!(back.samples, value.samples);
    assert_eq!(back.window, value.window);
    assert_eq!(back.labels, value.labels);
    assert_eq!(back.origin, value.origin);
    assert_eq!(back.glyph, 'é');
    assert!(back.cache.is_empty());
}

#[test]
fn test_point_wire_layout() {
    let registry = registry();
    let descriptor = registry.descriptor_of::<Point>().unwrap();
    let mut buf = Vec::new();
    let written = registry
        .encoder()
        .encode(None, &Point { x: 1, y: -1 }, &mut buf)
        .unwrap();

    let expected = frame(
        descriptor,
        &[
            WireTag::Record.as_u8(),
            2,
            tag(LeafKind::I32),
            2,
            tag(LeafKind::I32),
            1,
        ],
    );
    assert_eq!(buf, expected);
    assert_eq!(written, buf.len());
    assert_eq!(&buf[..3], b"RPL");
    assert_eq!(buf[3], 1);
}

#[test]
fn test_optional_field_absent() {
    let registry = registry();
    let value = Telemetry {
        origin: None,
        ..Telemetry::default()
    };
    let bytes = registry.encoder().encode_to_vec(&value).unwrap();
    let back: Telemetry = registry.decoder().decode_from_slice(&bytes).unwrap();
    assert_eq!(back, value);
}

#[test]
fn test_polymorphic_roundtrip() {
    let registry = registry();
    for canvas in [
        Canvas {
            title: "round".into(),
            main: Poly::new(Circle { radius: 2.5 }),
        },
        Canvas {
            title: "square".into(),
            main: Poly::new(Square { side: 4.0 }),
        },
        Canvas {
            title: "blank".into(),
            main: Poly::empty(),
        },
    ] {
        let bytes = registry.encoder().encode_to_vec(&canvas).unwrap();
        let back: Canvas = registry.decoder().decode_from_slice(&bytes).unwrap();
        assert_eq!(back, canvas);
    }
}

#[test]
fn test_polymorphic_not_attached_variant() {
    let registry = registry();
    let canvas = Canvas {
        title: "tri".into(),
        main: Poly::new(Triangle { base: 1.0 }),
    };
    // Encoding only needs the name; attachment is checked on decode
    let bytes = registry.encoder().encode_to_vec(&canvas).unwrap();
    let err = registry
        .decoder()
        .decode_from_slice::<Canvas>(&bytes)
        .unwrap_err();
    assert!(
        matches!(err, DecodeError::NotAVariant { ref name, .. } if name == "shape.Triangle"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_polymorphic_rejects_non_implementor() {
    let registry = registry();
    let canvas = registry.descriptor_of::<Canvas>().unwrap();

    // A frame naming `pkg.Point`, which is registered but not a Shape
    let mut body = vec![WireTag::Record.as_u8(), 2, tag(LeafKind::String), 0];
    body.extend_from_slice(&[WireTag::Polymorphic.as_u8(), 1]);
    body.extend_from_slice(&varint(9));
    body.extend_from_slice(b"pkg.Point");
    body.extend_from_slice(&[
        WireTag::Record.as_u8(),
        2,
        tag(LeafKind::I32),
        2,
        tag(LeafKind::I32),
        4,
    ]);
    let bytes = frame(canvas, &body);

    let err = registry
        .decoder()
        .decode_from_slice::<Canvas>(&bytes)
        .unwrap_err();
    assert!(
        matches!(err, DecodeError::NotAVariant { ref name, .. } if name == "pkg.Point"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_polymorphic_without_attachments_rejected() {
    let sender = registry();
    let canvas = Canvas {
        title: "c".into(),
        main: Poly::new(Circle { radius: 1.0 }),
    };
    let bytes = sender.encoder().encode_to_vec(&canvas).unwrap();

    let receiver = TypeRegistry::new();
    receiver.register::<Canvas>("pkg.Canvas").unwrap();
    receiver.register::<Circle>("shape.Circle").unwrap();
    let receiver = receiver.seal();

    assert!(matches!(
        receiver.decoder().decode_from_slice::<Canvas>(&bytes),
        Err(DecodeError::NotAVariant { .. })
    ));

    // The registry that attached Circle reads the same frame
    let back: Canvas = sender.decoder().decode_from_slice(&bytes).unwrap();
    assert!(back.main.downcast_ref::<Circle>().is_some());
}

#[test]
fn test_polymorphic_unknown_name() {
    let sender = registry();
    let canvas = Canvas {
        title: "c".into(),
        main: Poly::new(Circle { radius: 1.0 }),
    };
    let bytes = sender.encoder().encode_to_vec(&canvas).unwrap();

    let receiver = TypeRegistry::new();
    receiver.register::<Canvas>("pkg.Canvas").unwrap();
    receiver.register::<Circle>("shape.Round").unwrap();
    let receiver = receiver.seal();

    let err = receiver
        .decoder()
        .decode_from_slice::<Canvas>(&bytes)
        .unwrap_err();
    assert!(matches!(err, DecodeError::UnknownName { ref name } if name == "shape.Circle"));
}

#[test]
fn test_polymorphic_inner_must_be_named() {
    let registry = TypeRegistry::new();
    registry.register::<Canvas>("pkg.Canvas").unwrap();
    registry.register::<Circle>("").unwrap();
    let registry = registry.seal();

    let circle = Canvas {
        title: String::new(),
        main: Poly::new(Circle { radius: 1.0 }),
    };
    assert!(matches!(
        registry.encoder().encode_to_vec(&circle),
        Err(EncodeError::Unnamed { .. })
    ));

    let square = Canvas {
        title: String::new(),
        main: Poly::new(Square { side: 1.0 }),
    };
    assert!(matches!(
        registry.encoder().encode_to_vec(&square),
        Err(EncodeError::TypeNotFound { .. })
    ));
}

#[test]
fn test_map_and_array_roundtrip() {
    let registry = registry();
    let mut map: HashMap<String, Vec<u8>> = HashMap::new();
    map.insert("one".into(), vec![1]);
    map.insert("empty".into(), Vec::new());
    map.insert("many".into(), (0..=255).collect());
    let bytes = registry.encoder().encode_to_vec(&map).unwrap();
    let back: HashMap<String, Vec<u8>> = registry.decoder().decode_from_slice(&bytes).unwrap();
    assert_eq!(back, map);

    let array = [9u8, 8, 7, 6];
    let bytes = registry.encoder().encode_to_vec(&array).unwrap();
    assert_eq!(
        registry.decoder().decode_from_slice::<[u8; 4]>(&bytes).unwrap(),
        array
    );
}

#[test]
fn test_time_roundtrip_before_and_after_epoch() {
    let registry = registry();
    let event = Event {
        at: SystemTime::UNIX_EPOCH + Duration::new(1_700_000_000, 999_999_999),
        spans: vec![
            SystemTime::UNIX_EPOCH - Duration::from_millis(1500),
            SystemTime::UNIX_EPOCH - Duration::from_secs(86_400),
            SystemTime::UNIX_EPOCH,
        ],
    };
    let bytes = registry.encoder().encode_to_vec(&event).unwrap();
    let back: Event = registry.decoder().decode_from_slice(&bytes).unwrap();
    assert_eq!(back, event);
}

#[test]
fn test_split_time_floors() {
    let before = SystemTime::UNIX_EPOCH - Duration::from_millis(1500);
    assert_eq!(split_time(before), (-2, 500_000_000));
    assert_eq!(split_time(SystemTime::UNIX_EPOCH), (0, 0));
    assert_eq!(
        split_time(SystemTime::UNIX_EPOCH - Duration::from_secs(3)),
        (-3, 0)
    );
    assert_eq!(
        decode::join_time(-2, 500_000_000).unwrap(),
        before
    );
}

#[test]
fn test_leaf_values_at_top_level() {
    let registry = registry();
    let bytes = registry.encoder().encode_to_vec(&String::from("héllo")).unwrap();
    assert_eq!(
        registry.decoder().decode_from_slice::<String>(&bytes).unwrap(),
        "héllo"
    );

    let bytes = registry.encoder().encode_to_vec(&i64::MIN).unwrap();
    assert_eq!(
        registry.decoder().decode_from_slice::<i64>(&bytes).unwrap(),
        i64::MIN
    );
}

#[test]
fn test_decode_dyn_and_exact() {
    let registry = registry();
    let point = Point { x: 10, y: 20 };
    let bytes = registry.encoder().encode_to_vec(&point).unwrap();
    let descriptor = registry.descriptor_of::<Point>().unwrap();

    let boxed = registry
        .decoder()
        .decode_dyn(descriptor, &mut &bytes[..])
        .unwrap();
    assert_eq!(boxed.downcast_ref::<Point>(), Some(&point));

    let mut dst = Point::default();
    let consumed = registry
        .decoder()
        .decode_exact(None, &mut &bytes[..], &mut dst)
        .unwrap();
    assert_eq!(consumed, bytes.len());
    assert_eq!(dst, point);
}

#[test]
fn test_stream_of_frames() {
    let registry = registry();
    let mut stream = Vec::new();
    for x in 0..3 {
        registry
            .encoder()
            .encode(None, &Point { x, y: -x }, &mut stream)
            .unwrap();
    }

    let mut source = &stream[..];
    for x in 0..3 {
        let point: Point = registry.decoder().decode(&mut source).unwrap();
        assert_eq!(point, Point { x, y: -x });
    }
    assert!(source.is_empty());
}

#[test]
fn test_header_errors() {
    let registry = registry();
    let bytes = registry
        .encoder()
        .encode_to_vec(&Point { x: 1, y: 2 })
        .unwrap();
    let decoder = registry.decoder();

    let mut bad_magic = bytes.clone();
    bad_magic[0] = b'X';
    assert!(matches!(
        decoder.decode_from_slice::<Point>(&bad_magic),
        Err(DecodeError::BadMagic { found }) if &found == b"XPL"
    ));

    let mut bad_version = bytes.clone();
    bad_version[3] = 2;
    assert!(matches!(
        decoder.decode_from_slice::<Point>(&bad_version),
        Err(DecodeError::UnsupportedVersion { found: 2 })
    ));

    let mut bad_fingerprint = bytes.clone();
    bad_fingerprint[4] ^= 0xFF;
    assert!(matches!(
        decoder.decode_from_slice::<Point>(&bad_fingerprint),
        Err(DecodeError::FingerprintMismatch { .. })
    ));

    let lenient = registry.decoder_with(CodecConfig::default().verify_fingerprint(false));
    assert_eq!(
        lenient.decode_from_slice::<Point>(&bad_fingerprint).unwrap(),
        Point { x: 1, y: 2 }
    );
}

#[test]
fn test_truncated_and_trailing_input() {
    let registry = registry();
    let bytes = registry.encoder().encode_to_vec(&telemetry()).unwrap();
    let decoder = registry.decoder();

    assert!(matches!(
        decoder.decode_from_slice::<Telemetry>(&[]),
        Err(DecodeError::Truncated)
    ));
    assert!(matches!(
        decoder.decode_from_slice::<Telemetry>(&bytes[..bytes.len() - 1]),
        Err(DecodeError::Truncated)
    ));

    let mut longer = bytes.clone();
    longer.extend_from_slice(&[0, 0]);
    assert!(matches!(
        decoder.decode_from_slice::<Telemetry>(&longer),
        Err(DecodeError::TrailingBytes { count: 2 })
    ));
    let mut dst = Telemetry::default();
    assert!(matches!(
        decoder.decode_exact(None, &mut &longer[..], &mut dst),
        Err(DecodeError::TrailingBytes { count: 2 })
    ));
}

#[test]
fn test_unexpected_tag() {
    let registry = registry();
    let mut bytes = registry
        .encoder()
        .encode_to_vec(&Point { x: 1, y: 2 })
        .unwrap();
    bytes[HEADER_LEN] = WireTag::Sequence.as_u8();
    let err = registry
        .decoder()
        .decode_from_slice::<Point>(&bytes)
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::UnexpectedTag { expected, found }
            if expected == WireTag::Record.as_u8() && found == WireTag::Sequence.as_u8()
    ));
}

#[derive(Reflect, Debug, Clone, Default, PartialEq)]
pub struct Bag {
    pub items: Vec<[u64; 4]>,
    pub note: String,
}

#[test]
fn test_oversized_prefix_on_short_input() {
    let registry = TypeRegistry::new();
    registry.register::<Bag>("pkg.Bag").unwrap();
    let registry = registry.seal();
    let bag = registry.descriptor_of::<Bag>().unwrap();

    // Claims the largest allowed sequence, then stops inside the first element
    let mut body = vec![WireTag::Record.as_u8(), 2, WireTag::Sequence.as_u8()];
    body.extend_from_slice(&varint(crate::config::DEFAULT_MAX_COLLECTION_LEN as u64));
    body.extend_from_slice(&[WireTag::Array.as_u8(), 4, tag(LeafKind::U64), 1]);
    let bytes = frame(bag, &body);
    assert!(matches!(
        registry.decoder().decode_from_slice::<Bag>(&bytes),
        Err(DecodeError::Truncated)
    ));

    // Same for a string prefix
    let mut body = vec![
        WireTag::Record.as_u8(),
        2,
        WireTag::Sequence.as_u8(),
        0,
        tag(LeafKind::String),
    ];
    body.extend_from_slice(&varint(crate::config::DEFAULT_MAX_COLLECTION_LEN as u64));
    body.extend_from_slice(b"xy");
    let bytes = frame(bag, &body);
    assert!(matches!(
        registry.decoder().decode_from_slice::<Bag>(&bytes),
        Err(DecodeError::Truncated)
    ));
}

#[test]
fn test_sequence_decode_replaces_contents() {
    let registry = registry();
    let bytes = registry.encoder().encode_to_vec(&vec![7.5f32, 8.0]).unwrap();
    let mut dst = vec![1.0f32, 2.0, 3.0, 4.0];
    registry
        .decoder()
        .decode_into(None, &mut bytes.as_slice(), &mut dst)
        .unwrap();
    assert_eq!(dst, vec![7.5, 8.0]);
}

#[test]
fn test_collection_limit() {
    let registry = registry();
    let bytes = registry
        .encoder()
        .encode_to_vec(&vec![1.0f32, 2.0, 3.0])
        .unwrap();
    let strict = registry.decoder_with(CodecConfig::default().max_collection_len(2));
    assert!(matches!(
        strict.decode_from_slice::<Vec<f32>>(&bytes),
        Err(DecodeError::TooLarge { len: 3, limit: 2 })
    ));

    // Strings share the limit
    let bytes = registry.encoder().encode_to_vec(&String::from("abc")).unwrap();
    assert!(matches!(
        strict.decode_from_slice::<String>(&bytes),
        Err(DecodeError::TooLarge { len: 3, limit: 2 })
    ));
}

#[test]
fn test_length_mismatches() {
    let registry = registry();

    let array = registry.descriptor_of::<[u8; 4]>().unwrap();
    let mut body = vec![WireTag::Array.as_u8(), 3];
    for v in [1u8, 2, 3] {
        body.extend_from_slice(&[tag(LeafKind::U8), v]);
    }
    assert!(matches!(
        registry
            .decoder()
            .decode_from_slice::<[u8; 4]>(&frame(array, &body)),
        Err(DecodeError::LengthMismatch {
            expected: 4,
            found: 3
        })
    ));

    let point = registry.descriptor_of::<Point>().unwrap();
    let body = [WireTag::Record.as_u8(), 1, tag(LeafKind::I32), 2];
    assert!(matches!(
        registry
            .decoder()
            .decode_from_slice::<Point>(&frame(point, &body)),
        Err(DecodeError::LengthMismatch {
            expected: 2,
            found: 1
        })
    ));
}

#[test]
fn test_invalid_payloads() {
    let registry = registry();
    let decoder = registry.decoder();

    let bool_desc = registry.descriptor_of::<bool>().unwrap();
    let bytes = frame(bool_desc, &[tag(LeafKind::Bool), 2]);
    assert!(matches!(
        decoder.decode_from_slice::<bool>(&bytes),
        Err(DecodeError::InvalidData(_))
    ));

    let u8_desc = registry.descriptor_of::<u8>().unwrap();
    let mut body = vec![tag(LeafKind::U8)];
    body.extend(varint(300));
    assert!(matches!(
        decoder.decode_from_slice::<u8>(&frame(u8_desc, &body)),
        Err(DecodeError::OutOfRange { kind: LeafKind::U8 })
    ));

    let char_desc = registry.descriptor_of::<char>().unwrap();
    let mut body = vec![tag(LeafKind::Char)];
    body.extend(varint(0xD800));
    assert!(matches!(
        decoder.decode_from_slice::<char>(&frame(char_desc, &body)),
        Err(DecodeError::InvalidChar(0xD800))
    ));

    let string_desc = registry.descriptor_of::<String>().unwrap();
    let bytes = frame(string_desc, &[tag(LeafKind::String), 2, 0xC3, 0x28]);
    assert!(matches!(
        decoder.decode_from_slice::<String>(&bytes),
        Err(DecodeError::InvalidUtf8)
    ));

    let holder = registry.descriptor_of::<Holder>().unwrap();
    let bytes = frame(
        holder,
        &[WireTag::Record.as_u8(), 1, WireTag::Pointer.as_u8(), 0],
    );
    assert!(matches!(
        decoder.decode_from_slice::<Holder>(&bytes),
        Err(DecodeError::InvalidData(_))
    ));
}

#[test]
fn test_unregistered_types() {
    let registry = registry();
    assert!(matches!(
        registry.encoder().encode_to_vec(&Unlisted { flag: true }),
        Err(EncodeError::TypeNotRegistered { .. })
    ));

    let other = TypeRegistry::new();
    other.register::<Unlisted>("pkg.Unlisted").unwrap();
    let bytes = other
        .seal()
        .encoder()
        .encode_to_vec(&Unlisted { flag: true })
        .unwrap();
    assert!(matches!(
        registry.decoder().decode_from_slice::<Unlisted>(&bytes),
        Err(DecodeError::TypeNotRegistered { .. })
    ));
}

#[test]
fn test_foreign_descriptor_rejected() {
    let registry = registry();
    let other = TypeRegistry::new();
    other.register::<Point>("pkg.Point").unwrap();
    let other = other.seal();
    let foreign = other.descriptor_of::<Point>().unwrap();

    let point = Point { x: 1, y: 1 };
    let mut buf = Vec::new();
    assert!(matches!(
        registry.encoder().encode(Some(foreign.as_ref()), &point, &mut buf),
        Err(EncodeError::ForeignDescriptor { .. })
    ));

    let bytes = registry.encoder().encode_to_vec(&point).unwrap();
    let mut dst = Point::default();
    assert!(matches!(
        registry
            .decoder()
            .decode_into(Some(foreign.as_ref()), &mut &bytes[..], &mut dst),
        Err(DecodeError::ForeignDescriptor { .. })
    ));

    // Leaf descriptors are shared by every registry
    let own_leaf = registry.descriptor_of::<u32>().unwrap();
    let other_leaf = other.descriptor_of::<u32>().unwrap();
    assert!(std::ptr::eq(own_leaf.as_ref(), other_leaf.as_ref()));
}

#[test]
fn test_descriptor_value_mismatch() {
    let registry = registry();
    let point = registry.descriptor_of::<Point>().unwrap();
    let mut buf = Vec::new();
    assert!(matches!(
        registry
            .encoder()
            .encode(Some(point.as_ref()), &Square { side: 1.0 }, &mut buf),
        Err(EncodeError::KindMismatch { .. })
    ));
}

#[test]
fn test_depth_limits() {
    let registry = registry();
    let list = chain(40);
    let bytes = registry.encoder().encode_to_vec(&list).unwrap();
    assert_eq!(
        registry.decoder().decode_from_slice::<Node>(&bytes).unwrap(),
        list
    );

    let shallow = CodecConfig::default().max_depth(16);
    assert!(matches!(
        registry.encoder_with(shallow).encode_to_vec(&list),
        Err(EncodeError::DepthExceeded { limit: 16 })
    ));
    assert!(matches!(
        registry.decoder_with(shallow).decode_from_slice::<Node>(&bytes),
        Err(DecodeError::DepthExceeded { limit: 16 })
    ));
}

#[test]
fn test_sink_errors_propagate() {
    let registry = registry();
    let err = registry
        .encoder()
        .encode(None, &Point::default(), &mut BrokenSink)
        .unwrap_err();
    assert!(matches!(err, EncodeError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
}
