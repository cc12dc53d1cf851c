//! Property-based tests for the round-trip guarantees of both encodings.
//!
//! Floats are generated without NaN since NaN never compares equal to itself;
//! NaN rendering is covered by the text tests.

use bso::{
    from_slice_with_options, from_str, to_bytes, to_bytes_with_options, to_string,
    to_string_pretty, BinaryOptions, Endian, LengthMode, Tag, TagList,
};
use proptest::prelude::*;

fn float() -> impl Strategy<Value = f32> {
    any::<f32>().prop_filter("NaN is never equal to itself", |f| !f.is_nan())
}

fn double() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("NaN is never equal to itself", |d| !d.is_nan())
}

fn leaf() -> impl Strategy<Value = Tag> {
    prop_oneof![
        Just(Tag::Null),
        any::<bool>().prop_map(Tag::Bool),
        any::<i8>().prop_map(Tag::Byte),
        any::<u8>().prop_map(Tag::UByte),
        any::<i16>().prop_map(Tag::Short),
        any::<u16>().prop_map(Tag::UShort),
        any::<i32>().prop_map(Tag::Int),
        any::<u32>().prop_map(Tag::UInt),
        any::<i64>().prop_map(Tag::Long),
        any::<u64>().prop_map(Tag::ULong),
        float().prop_map(Tag::Float),
        double().prop_map(Tag::Double),
        "\\PC{0,16}".prop_map(Tag::String),
        prop::collection::vec(any::<i8>(), 0..8).prop_map(Tag::ByteArray),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(Tag::UByteArray),
        prop::collection::vec(any::<i16>(), 0..8).prop_map(Tag::ShortArray),
        prop::collection::vec(any::<u16>(), 0..8).prop_map(Tag::UShortArray),
        prop::collection::vec(any::<i32>(), 0..8).prop_map(Tag::IntArray),
        prop::collection::vec(any::<u32>(), 0..8).prop_map(Tag::UIntArray),
        prop::collection::vec(any::<i64>(), 0..8).prop_map(Tag::LongArray),
        prop::collection::vec(any::<u64>(), 0..8).prop_map(Tag::ULongArray),
        prop::collection::vec(float(), 0..8).prop_map(Tag::FloatArray),
        prop::collection::vec(double(), 0..8).prop_map(Tag::DoubleArray),
    ]
}

/// Keeps the elements sharing the first element's type, so the list is valid.
fn homogeneous(values: Vec<Tag>) -> Tag {
    let ty = values.first().map(Tag::tag_type);
    let kept = values
        .into_iter()
        .filter(|v| Some(v.tag_type()) == ty)
        .collect();
    Tag::List(TagList::new(kept).unwrap())
}

fn tag() -> impl Strategy<Value = Tag> {
    leaf().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(homogeneous),
            prop::collection::btree_map("[a-zA-Z0-9_ .:\"'-]{0,10}", inner, 0..6)
                .prop_map(|entries| Tag::map(entries).unwrap()),
        ]
    })
}

fn binary_options() -> impl Strategy<Value = BinaryOptions> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(little, indefinite, narrow, zero_terminated)| {
            BinaryOptions::new()
                .with_endian(if little { Endian::Little } else { Endian::Big })
                .with_length_mode(if indefinite {
                    LengthMode::Indefinite
                } else {
                    LengthMode::Counted
                })
                .with_narrowing(narrow)
                .with_indefinite_strings(zero_terminated)
        },
    )
}

proptest! {
    #[test]
    fn prop_binary_round_trip(tag in tag(), options in binary_options()) {
        let bytes = to_bytes_with_options(&tag, &options).unwrap();
        prop_assert_eq!(from_slice_with_options(&bytes, &options).unwrap(), tag);
    }

    #[test]
    fn prop_indefinite_equivalence(tag in tag()) {
        let counted = to_bytes(&tag).unwrap();
        let indefinite = to_bytes_with_options(&tag, &BinaryOptions::indefinite()).unwrap();
        let options = BinaryOptions::new();
        prop_assert_eq!(
            from_slice_with_options(&counted, &options).unwrap(),
            from_slice_with_options(&indefinite, &options).unwrap()
        );
    }

    #[test]
    fn prop_text_round_trip(tag in tag()) {
        let compact = to_string(&tag);
        prop_assert_eq!(from_str(&compact).unwrap(), tag.clone(), "text: {}", compact);
        prop_assert_eq!(from_str(&to_string_pretty(&tag)).unwrap(), tag);
    }

    #[test]
    fn prop_narrowing_never_grows(v in any::<i64>()) {
        let narrowed = to_bytes(&Tag::Long(v)).unwrap();
        let native = to_bytes_with_options(&Tag::Long(v), &BinaryOptions::new().with_narrowing(false))
            .unwrap();
        prop_assert!(narrowed.len() <= native.len());
        prop_assert_eq!(native.len(), 9);
    }

    #[test]
    fn prop_int_width_is_minimal(v in any::<i32>()) {
        let payload = to_bytes(&Tag::Int(v)).unwrap().len() - 1;
        let expected = if i8::try_from(v).is_ok() {
            1
        } else if i16::try_from(v).is_ok() {
            2
        } else {
            4
        };
        prop_assert_eq!(payload, expected);
    }

    #[test]
    fn prop_checked_constructors(v in any::<i64>()) {
        prop_assert_eq!(Tag::byte(v).is_ok(), i8::try_from(v).is_ok());
        prop_assert_eq!(Tag::ushort(v).is_ok(), u16::try_from(v).is_ok());
        prop_assert_eq!(Tag::int(v).is_ok(), i32::try_from(v).is_ok());
        prop_assert_eq!(Tag::ulong(v).is_ok(), v >= 0);
    }

    #[test]
    fn prop_decoder_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = bso::from_slice(&bytes);
    }

    #[test]
    fn prop_parser_never_panics(text in "\\PC{0,40}") {
        let _ = from_str(&text);
    }
}
