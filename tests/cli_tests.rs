// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! CLI integration tests.
//!
//! These tests run the actual protocodec binary and verify its behavior.

mod common;

use std::path::PathBuf;
use std::process::{Command, Output};

use common::{demo_pool, sample_order, temp_path};
use protocodec::encoding::{encode_length_delimited, FrameWriter};
use protocodec::wire::varint::encoded_len;
use protocodec::ProtobufCodec;

/// Get the path to the built protocodec binary
fn protocodec_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_protocodec"))
}

/// Run protocodec with arguments
fn run(args: &[&str]) -> Output {
    let bin = protocodec_bin();
    Command::new(&bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|_| panic!("Failed to run {:?}", bin))
}

/// Run protocodec and assert success
fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "Command failed: {:?}\nstdout: {}\nstderr: {}",
        args,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run protocodec and assert failure
fn run_err(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        !output.status.success(),
        "Command should have failed but succeeded: {:?}",
        args
    );
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = run_ok(&["--help"]);
    assert!(output.contains("decode-raw"));
    assert!(output.contains("decode"));
    assert!(output.contains("frames"));
    assert!(output.contains("--config"));
}

#[test]
fn test_cli_version() {
    let output = run_ok(&["--version"]);
    assert!(output.contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// decode-raw
// ============================================================================

#[test]
fn test_decode_raw_text() {
    let output = run_ok(&["decode-raw", "--hex", "08 96 01 12 03 68 69 21"]);
    assert!(output.contains("1: 150"), "{output}");
    assert!(output.contains("2: \"hi!\""), "{output}");
}

#[test]
fn test_decode_raw_json() {
    let output = run_ok(&["decode-raw", "--hex", "089601", "--json"]);
    let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
    assert_eq!(parsed[0]["number"], 1);
    assert_eq!(parsed[0]["wire_type"], "varint");
    assert_eq!(parsed[0]["value"], 150);
}

#[test]
fn test_decode_raw_rejects_truncated_input() {
    let stderr = run_err(&["decode-raw", "--hex", "0a05"]);
    assert!(stderr.contains("Error"), "{stderr}");
}

#[test]
fn test_decode_raw_requires_input() {
    run_err(&["decode-raw"]);
}

// ============================================================================
// frames
// ============================================================================

#[test]
fn test_frames_header_stream() {
    let pool = demo_pool();
    let (path, _guard) = temp_path("frames.bin");
    let mut writer = FrameWriter::new(Vec::new());
    writer.write_message(&sample_order(&pool)).expect("write");
    writer.write_frame(&[]).expect("write");
    std::fs::write(&path, writer.into_inner()).expect("write file");

    let output = run_ok(&["frames", path.to_str().expect("utf-8 path")]);
    assert!(output.contains("2 frame(s)"), "{output}");
}

#[test]
fn test_frames_varint_stream_json() {
    let pool = demo_pool();
    let codec = ProtobufCodec::new();
    let (path, _guard) = temp_path("frames.pb");
    let mut stream = encode_length_delimited(&codec, &sample_order(&pool)).expect("encode");
    stream.extend(encode_length_delimited(&codec, &sample_order(&pool)).expect("encode"));
    std::fs::write(&path, &stream).expect("write file");

    let output = run_ok(&["frames", "--varint", "--json", path.to_str().expect("utf-8 path")]);
    let parsed: serde_json::Value = serde_json::from_str(&output).expect("valid JSON");
    let frames = parsed.as_array().expect("array");
    assert_eq!(frames.len(), 2);
    let size = protocodec::computed_size(&sample_order(&pool)).expect("size");
    assert_eq!(frames[0]["offset"], encoded_len(size as u64));
    assert_eq!(frames[0]["length"], size);
    assert_eq!(frames[1]["index"], 1);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_is_applied() {
    let pool = demo_pool();
    let (config, _guard) = temp_path("limits.toml");
    std::fs::write(&config, "max_message_size = 4\n").expect("write config");
    let (stream, _stream_guard) = temp_path("big.bin");
    let mut writer = FrameWriter::new(Vec::new());
    writer.write_message(&sample_order(&pool)).expect("write");
    std::fs::write(&stream, writer.into_inner()).expect("write file");

    let stderr = run_err(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "frames",
        stream.to_str().expect("utf-8 path"),
    ]);
    assert!(stderr.contains("exceeds limit"), "{stderr}");
}

#[test]
fn test_bad_config_file() {
    let (config, _guard) = temp_path("bad.toml");
    std::fs::write(&config, "no_such_option = 1\n").expect("write config");
    let stderr = run_err(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "decode-raw",
        "--hex",
        "00",
    ]);
    assert!(stderr.contains("Failed to load config"), "{stderr}");
}
