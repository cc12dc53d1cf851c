use bso::{
    from_reader, from_slice, from_slice_with_options, to_bytes, to_bytes_with_options,
    to_writer_with_options, BinaryOptions, Endian, Error, LengthMode, Tag, TagList, TagMap,
};
use pretty_assertions::assert_eq;
use std::io::Cursor;

fn scenario_map() -> Tag {
    let inner = Tag::map([("r", Tag::String("X".into()))]).unwrap();
    Tag::map([("a", Tag::Byte(1)), ("b", Tag::Int(5)), ("q", inner)]).unwrap()
}

fn every_variant() -> Tag {
    let mut map = TagMap::new();
    let entries = vec![
        ("null", Tag::Null),
        ("yes", Tag::Bool(true)),
        ("no", Tag::Bool(false)),
        ("byte", Tag::Byte(-128)),
        ("ubyte", Tag::UByte(255)),
        ("short", Tag::Short(i16::MIN)),
        ("ushort", Tag::UShort(u16::MAX)),
        ("int", Tag::Int(-70_000)),
        ("uint", Tag::UInt(u32::MAX)),
        ("long", Tag::Long(i64::MIN)),
        ("ulong", Tag::ULong(u64::MAX)),
        ("float", Tag::Float(-0.25)),
        ("double", Tag::Double(1e300)),
        ("string", Tag::String("héllo wörld".into())),
        ("empty", Tag::String(String::new())),
        ("bytes", Tag::ByteArray(vec![-1, 0, 1])),
        ("ubytes", Tag::UByteArray(vec![0, 255])),
        ("shorts", Tag::ShortArray(vec![-300, 2])),
        ("ushorts", Tag::UShortArray(vec![65_535])),
        ("ints", Tag::IntArray(vec![20, -10, 10])),
        ("uints", Tag::UIntArray(vec![])),
        ("longs", Tag::LongArray(vec![i64::MAX, -1])),
        ("ulongs", Tag::ULongArray(vec![1, 70_000])),
        ("floats", Tag::FloatArray(vec![1.5, f32::MIN_POSITIVE])),
        ("doubles", Tag::DoubleArray(vec![f64::MAX, -0.0])),
        (
            "list",
            Tag::List(TagList::new(vec![Tag::Int(1), Tag::UInt(3_000_000_000)]).unwrap()),
        ),
        ("nested", scenario_map()),
    ];
    for (key, value) in entries {
        map.try_insert(key.to_string(), value).unwrap();
    }
    Tag::Map(map)
}

fn all_options() -> Vec<BinaryOptions> {
    let mut options = Vec::new();
    for endian in [Endian::Big, Endian::Little] {
        for mode in [LengthMode::Counted, LengthMode::Indefinite] {
            for narrow in [true, false] {
                options.push(
                    BinaryOptions::new()
                        .with_endian(endian)
                        .with_length_mode(mode)
                        .with_narrowing(narrow)
                        .with_indefinite_strings(mode == LengthMode::Indefinite),
                );
            }
        }
    }
    options
}

#[test]
fn test_scenario_map_round_trip() {
    let tag = scenario_map();
    let bytes = to_bytes(&tag).unwrap();
    assert_eq!(
        bytes,
        vec![
            0x28, 0x03, // map, 3 entries
            0x01, 0x00, 0x01, b'a', 0x01, // a: Byte 1
            0x33, 0x00, 0x01, b'b', 0x05, // b: Int 5 narrowed to one byte
            0x28, 0x00, 0x01, b'q', 0x01, // q: map, 1 entry
            0x17, 0x00, 0x01, b'r', 0x01, b'X', // r: "X"
        ]
    );
    assert_eq!(from_slice(&bytes).unwrap(), tag);
}

#[test]
fn test_scenario_int_array() {
    let bytes = to_bytes(&Tag::IntArray(vec![20, -10, 10])).unwrap();
    assert_eq!(bytes, vec![0xAC, 0x33, 0x03, 0x14, 0xF6, 0x0A]);
    assert_eq!(from_slice(&bytes).unwrap(), Tag::IntArray(vec![20, -10, 10]));
}

#[test]
fn test_width_minimality() {
    assert_eq!(to_bytes(&Tag::Int(100)).unwrap()[0] & 0x30, 0x30);
    assert_eq!(to_bytes(&Tag::Int(30_000)).unwrap()[0] & 0x30, 0x20);
    assert_eq!(to_bytes(&Tag::UInt(3_000_000_000)).unwrap()[0] & 0x30, 0x00);
    assert_eq!(to_bytes(&Tag::Long(3_000_000)).unwrap()[0] & 0x30, 0x10);
}

#[test]
fn test_every_variant_round_trips_under_every_option() {
    let tag = every_variant();
    for options in all_options() {
        let bytes = to_bytes_with_options(&tag, &options).unwrap();
        let decoded = from_slice_with_options(&bytes, &options).unwrap();
        assert_eq!(decoded, tag, "options: {options:?}");
    }
}

#[test]
fn test_indefinite_equivalence() {
    let tag = every_variant();
    let counted = to_bytes(&tag).unwrap();
    let indefinite = to_bytes_with_options(&tag, &BinaryOptions::indefinite()).unwrap();
    assert_ne!(counted, indefinite);
    assert_eq!(from_slice(&counted).unwrap(), from_slice(&indefinite).unwrap());
}

#[test]
fn test_byte_order_is_consistent() {
    let tag = Tag::Long(0x0102_0304_0506_0708);
    let big = to_bytes(&tag).unwrap();
    let little = to_bytes_with_options(&tag, &BinaryOptions::new().with_endian(Endian::Little))
        .unwrap();
    assert_eq!(&big[1..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(&little[1..], &[8, 7, 6, 5, 4, 3, 2, 1]);
}

#[test]
fn test_reader_consumes_one_document() {
    let options = BinaryOptions::indefinite();
    let mut buffer = Vec::new();
    to_writer_with_options(&mut buffer, &scenario_map(), &options).unwrap();
    to_writer_with_options(&mut buffer, &Tag::Short(-2), &options).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(from_reader(&mut cursor).unwrap(), scenario_map());
    assert_eq!(from_reader(&mut cursor).unwrap(), Tag::Short(-2));
    assert!(matches!(from_reader(&mut cursor), Err(Error::Truncated { .. })));
}

#[test]
fn test_undefined_qualifiers() {
    // (input, descriptor named by the error)
    let cases: &[(&[u8], u8)] = &[
        (&[0x10], 0x10),                   // bare End marker
        (&[0x20], 0x20),                   // Null with a qualifier
        (&[0x71], 0x71),                   // Byte with an undefined qualifier
        (&[0x12, 0x00, 0x00], 0x12),       // Short with a 4-byte width
        (&[0x13, 0x00], 0x13),             // Int with a 4-byte narrowed width
        (&[0x15, 0, 0, 0, 0], 0x15),       // Float with a qualifier
        (&[0x37, 0x00], 0x37),             // String with 0x30
        (&[0x4E, 0x00], 0x4E),             // unsigned FloatArray
        (&[0x8A, 0x31, 0x01, 0x00], 0x31), // narrowed ByteArray
        (&[0xAE, 0x35, 0x01, 0x3F, 0x80, 0, 0], 0xAE), // narrowed FloatArray
        (&[0xAF, 0x16, 0x01, 0x3F, 0xF0, 0, 0, 0, 0, 0, 0], 0xAF), // narrowed DoubleArray
        (&[0x3E, 0x35, 0x3F, 0x80, 0, 0, 0x10], 0x35), // Float element with a width
    ];
    for (bytes, expected) in cases {
        match from_slice(bytes) {
            Err(Error::InvalidEncoding { descriptor, .. }) => {
                assert_eq!(descriptor, *expected, "input {bytes:02x?}")
            }
            other => panic!("Expected InvalidEncoding for {bytes:02x?}, got {other:?}"),
        }
    }
}

#[test]
fn test_negative_count_rejected() {
    let result = from_slice(&[0x09, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert!(matches!(result, Err(Error::InvalidEncoding { descriptor: 0x09, .. })));
}

#[test]
fn test_truncated_inputs() {
    let cases: &[&[u8]] = &[
        &[],
        &[0x03, 0x00],                   // Int missing three bytes
        &[0x17, 0x05, b'a'],             // String shorter than its prefix
        &[0x27, b'a', b'b'],             // zero-terminated String without terminator
        &[0x29, 0x02, 0x33, 0x01],       // List missing its second element
        &[0x39, 0x33, 0x01],             // indefinite List without End marker
        &[0x38, 0x01, 0x00, 0x05, b'k'], // Map key shorter than its length
    ];
    for bytes in cases {
        assert!(
            matches!(from_slice(bytes), Err(Error::Truncated { .. })),
            "input {bytes:02x?}"
        );
    }
}

#[test]
fn test_heterogeneous_list_rejected() {
    let bytes = [0x29, 0x02, 0x33, 0x01, 0x17, 0x01, b'x'];
    match from_slice(&bytes) {
        Err(Error::TypeMismatch {
            index,
            expected,
            found,
        }) => {
            assert_eq!(index, 1);
            assert_eq!(expected, "Int");
            assert_eq!(found, "String");
        }
        other => panic!("Expected TypeMismatch, got {other:?}"),
    }
}

#[test]
fn test_duplicate_key_rejected() {
    let bytes = [
        0x28, 0x02, 0x01, 0x00, 0x01, b'a', 0x01, 0x01, 0x00, 0x01, b'a', 0x02,
    ];
    assert!(matches!(from_slice(&bytes), Err(Error::DuplicateKey(key)) if key == "a"));
}

#[test]
fn test_invalid_utf8_rejected() {
    assert!(matches!(
        from_slice(&[0x17, 0x01, 0xFF]),
        Err(Error::InvalidEncoding { descriptor: 0x17, .. })
    ));
}

#[test]
fn test_mismatched_indefinite_array_elements() {
    // ShortArray elements at one byte then two bytes
    let bytes = [0x3B, 0x32, 0x01, 0x02, 0x00, 0x02, 0x10];
    assert!(matches!(from_slice(&bytes), Err(Error::InvalidEncoding { .. })));
}

#[test]
fn test_depth_limit() {
    let mut bytes = Vec::new();
    for _ in 0..300 {
        bytes.extend_from_slice(&[0x29, 0x01]);
    }
    bytes.push(0x00);
    assert!(matches!(from_slice(&bytes), Err(Error::InvalidEncoding { .. })));

    let mut shallow = Vec::new();
    for _ in 0..100 {
        shallow.extend_from_slice(&[0x29, 0x01]);
    }
    shallow.push(0x00);
    assert!(from_slice(&shallow).is_ok());
}

#[test]
fn test_large_counts_use_wider_prefixes() {
    let list = Tag::List(TagList::new((0..300).map(|_| Tag::Null).collect()).unwrap());
    let bytes = to_bytes(&list).unwrap();
    assert_eq!(&bytes[..3], &[0x19, 0x01, 0x2C]);
    assert_eq!(from_slice(&bytes).unwrap(), list);

    let array = Tag::UByteArray(vec![9; 70_000]);
    let bytes = to_bytes(&array).unwrap();
    assert_eq!(&bytes[..5], &[0x4A, 0x00, 0x01, 0x11, 0x70]);
    assert_eq!(from_slice(&bytes).unwrap(), array);
}
