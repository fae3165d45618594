// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Stream framing integration tests.

mod common;

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor};

use common::{demo_pool, item, sample_order, temp_path};
use protocodec::encoding::{
    decode_length_delimited, encode_length_delimited, split_length_delimited, FrameReader,
    FrameWriter,
};
use protocodec::{encode, CodecError, ProtobufCodec};

#[test]
fn test_varint_delimited_stream() {
    let pool = demo_pool();
    let codec = ProtobufCodec::new();
    let messages = [
        item(&pool, "A-1", 1, 1.0),
        item(&pool, "B-2", 2, 2.0),
        item(&pool, "", 0, 0.0),
    ];

    let mut stream = Vec::new();
    for message in &messages {
        stream.extend(encode_length_delimited(&codec, message).expect("encode"));
    }

    let frames = split_length_delimited(&stream).expect("split");
    assert_eq!(frames.len(), 3);
    assert!(frames[2].is_empty());

    let descriptor = pool.message("demo.Item").expect("Item");
    let mut rest = stream.as_slice();
    for expected in &messages {
        let (message, consumed) =
            decode_length_delimited(&codec, rest, &descriptor).expect("decode");
        assert_eq!(&message, expected);
        rest = &rest[consumed..];
    }
    assert!(rest.is_empty());
}

#[test]
fn test_split_rejects_truncated_frame() {
    assert!(matches!(
        split_length_delimited(&[0x02, 0x08, 0x01, 0x05, 0x08]),
        Err(CodecError::TruncatedMessage { .. })
    ));
}

#[test]
fn test_header_framed_file() {
    let pool = demo_pool();
    let descriptor = pool.message("demo.Order").expect("Order");
    let order = sample_order(&pool);
    let (path, _guard) = temp_path("orders.bin");

    {
        let file = File::create(&path).expect("create");
        let mut writer = FrameWriter::new(BufWriter::new(file));
        writer.write_message(&order).expect("write");
        writer.write_message(&order).expect("write");
        assert_eq!(writer.frame_count(), 2);
        writer.flush().expect("flush");
    }

    let file = File::open(&path).expect("open");
    let mut reader = FrameReader::new(BufReader::new(file));
    assert_eq!(reader.read_message(&descriptor).expect("read"), Some(order.clone()));
    let second_offset = reader.offset();
    assert_eq!(second_offset, 4 + encode(&order).expect("encode").len());
    assert_eq!(reader.read_message(&descriptor).expect("read"), Some(order));
    assert_eq!(reader.read_message(&descriptor).expect("read"), None);
}

#[test]
fn test_frame_header_is_big_endian() {
    let mut writer = FrameWriter::new(Vec::new());
    writer.write_frame(&[0xAA; 3]).expect("write");
    assert_eq!(writer.into_inner(), [0, 0, 0, 3, 0xAA, 0xAA, 0xAA]);
}

#[test]
fn test_partial_frame_is_truncated() {
    let mut reader = FrameReader::new(Cursor::new(vec![0, 0, 0, 5, 0x08]));
    assert!(matches!(
        reader.read_frame(),
        Err(CodecError::TruncatedMessage { needed: 5, available: 1, .. })
    ));

    let mut reader = FrameReader::new(Cursor::new(vec![0, 0]));
    assert!(matches!(
        reader.read_frame(),
        Err(CodecError::TruncatedMessage { .. })
    ));
}
