// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Wire primitive integration tests.
//!
//! Tests cover:
//! - Varint length boundaries and overlong encodings
//! - Zig-zag mapping of signed integers
//! - Tag validation
//! - Reader and writer agreement on fixed-width and length-delimited values

use protocodec::wire::varint::{
    decode_varint, encode_varint, encoded_len, zigzag_decode32, zigzag_decode64, zigzag_encode32,
    zigzag_encode64,
};
use protocodec::wire::{Tag, WireReader, WireType, WireWriter, MAX_FIELD_NUMBER};
use protocodec::CodecError;

// ============================================================================
// Varint
// ============================================================================

#[test]
fn test_varint_length_boundaries() {
    let cases: [(u64, usize); 10] = [
        (0, 1),
        (1, 1),
        (127, 1),
        (128, 2),
        (16383, 2),
        ((1 << 31) - 1, 5),
        (u64::from(u32::MAX), 5),
        ((1 << 63) - 1, 9),
        (u64::MAX, 10),
        (-1i64 as u64, 10),
    ];
    for (value, expected_len) in cases {
        let bytes = encode_varint(value);
        assert_eq!(bytes.len(), expected_len, "length of {value}");
        assert_eq!(encoded_len(value), expected_len, "encoded_len of {value}");
        assert_eq!(
            decode_varint(&bytes, 0).expect("decode"),
            (value, expected_len),
            "decode of {value}"
        );
    }
}

#[test]
fn test_varint_known_encodings() {
    assert_eq!(encode_varint(150), [0x96, 0x01]);
    assert_eq!(encode_varint(300), [0xAC, 0x02]);
    assert_eq!(
        encode_varint(u64::MAX),
        [0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
    );
}

#[test]
fn test_varint_decode_at_offset() {
    let bytes = [0xAA, 0x96, 0x01, 0x00];
    assert_eq!(decode_varint(&bytes, 1).expect("decode"), (150, 2));
}

#[test]
fn test_varint_overlong_is_malformed() {
    let eleven = [0xFF; 11];
    assert!(matches!(
        decode_varint(&eleven, 0),
        Err(CodecError::MalformedVarint { position: 0 })
    ));

    let mut reader = WireReader::new(&eleven);
    assert!(matches!(
        reader.read_varint(),
        Err(CodecError::MalformedVarint { .. })
    ));
}

#[test]
fn test_varint_incomplete() {
    // A bare decode reports a malformed varint; a reader reports truncation.
    assert!(matches!(
        decode_varint(&[0x96], 0),
        Err(CodecError::MalformedVarint { .. })
    ));
    let mut reader = WireReader::new(&[0x96]);
    assert!(matches!(
        reader.read_varint(),
        Err(CodecError::TruncatedMessage { .. })
    ));
}

// ============================================================================
// Zig-zag
// ============================================================================

#[test]
fn test_zigzag_mapping() {
    let pairs32: [(i32, u32); 5] = [(0, 0), (-1, 1), (1, 2), (-2, 3), (i32::MIN, u32::MAX)];
    for (signed, encoded) in pairs32 {
        assert_eq!(zigzag_encode32(signed), encoded);
        assert_eq!(zigzag_decode32(encoded), signed);
    }
    assert_eq!(zigzag_encode32(i32::MAX), u32::MAX - 1);

    assert_eq!(zigzag_encode64(-1), 1);
    assert_eq!(zigzag_encode64(i64::MIN), u64::MAX);
    assert_eq!(zigzag_decode64(u64::MAX - 1), i64::MAX);
}

// ============================================================================
// Tags
// ============================================================================

#[test]
fn test_tag_key() {
    assert_eq!(Tag::new(1, WireType::Varint).key(), 0x08);
    assert_eq!(Tag::new(2, WireType::LengthDelimited).key(), 0x12);
    assert_eq!(Tag::new(16, WireType::Varint).encoded_len(), 2);
    assert_eq!(Tag::new(MAX_FIELD_NUMBER, WireType::Fixed32).encoded_len(), 5);
}

#[test]
fn test_tag_rejects_group_and_reserved_wire_types() {
    for bits in [3u64, 4, 6, 7] {
        assert!(matches!(
            Tag::from_key((1 << 3) | bits, 0),
            Err(CodecError::InvalidWireType { .. })
        ));
    }
}

#[test]
fn test_tag_rejects_field_number_out_of_range() {
    assert!(matches!(
        Tag::from_key(0, 0),
        Err(CodecError::FieldNumberOutOfRange { field_number: 0, .. })
    ));
    let too_big = u64::from(MAX_FIELD_NUMBER) + 1;
    assert!(matches!(
        Tag::from_key(too_big << 3, 0),
        Err(CodecError::FieldNumberOutOfRange { .. })
    ));
    let max = Tag::from_key(u64::from(MAX_FIELD_NUMBER) << 3, 0).expect("max field number");
    assert_eq!(max.field_number, MAX_FIELD_NUMBER);
}

// ============================================================================
// Reader / Writer
// ============================================================================

#[test]
fn test_writer_output_reads_back() {
    let mut buf = [0u8; 32];
    let written = {
        let mut writer = WireWriter::new(&mut buf);
        writer.put_tag(Tag::new(1, WireType::Fixed32)).expect("tag");
        writer.put_fixed32(0xDEAD_BEEF).expect("fixed32");
        writer.put_tag(Tag::new(2, WireType::Fixed64)).expect("tag");
        writer.put_fixed64(1.5f64.to_bits()).expect("fixed64");
        writer.put_bytes_field(3, b"abc").expect("bytes");
        writer.position()
    };
    assert_eq!(written, 1 + 4 + 1 + 8 + 1 + 1 + 3);

    let mut reader = WireReader::new(&buf[..written]);
    assert_eq!(reader.read_tag().expect("tag"), Tag::new(1, WireType::Fixed32));
    assert_eq!(reader.read_fixed32().expect("fixed32"), 0xDEAD_BEEF);
    assert_eq!(reader.read_tag().expect("tag"), Tag::new(2, WireType::Fixed64));
    assert_eq!(f64::from_bits(reader.read_fixed64().expect("fixed64")), 1.5);
    assert_eq!(reader.read_tag().expect("tag").wire_type, WireType::LengthDelimited);
    let (payload, start) = reader.read_length_delimited().expect("payload");
    assert_eq!(payload, b"abc");
    assert_eq!(start, written - 3);
    assert!(reader.is_at_end());
}

#[test]
fn test_fixed_values_are_little_endian() {
    let mut buf = [0u8; 4];
    WireWriter::new(&mut buf).put_fixed32(1).expect("fixed32");
    assert_eq!(buf, [0x01, 0x00, 0x00, 0x00]);
}

#[test]
fn test_length_past_end_is_truncated() {
    let mut reader = WireReader::new(&[0x05, 0x61, 0x62]);
    assert!(matches!(
        reader.read_length_delimited(),
        Err(CodecError::TruncatedMessage {
            needed: 5,
            available: 2,
            ..
        })
    ));
}

#[test]
fn test_skip_value() {
    let bytes = [0x96, 0x01, 0x01, 0x02, 0x03, 0x04, 0x02, 0x61, 0x62, 0x2A];
    let mut reader = WireReader::new(&bytes);
    reader.skip_value(WireType::Varint).expect("varint");
    reader.skip_value(WireType::Fixed32).expect("fixed32");
    reader.skip_value(WireType::LengthDelimited).expect("bytes");
    assert_eq!(reader.position(), 9);
    assert!(reader.skip_value(WireType::Fixed64).is_err());
}

#[test]
fn test_writer_refuses_overrun() {
    let mut buf = [0u8; 1];
    let mut writer = WireWriter::new(&mut buf);
    assert!(writer.put_varint(300).is_err());
    assert_eq!(writer.position(), 0);
}
