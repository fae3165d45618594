// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Variable-length integer encoding.
//!
//! Each byte carries 7 bits of payload, least significant group first, with
//! the high bit set on every byte except the last. A 64-bit value needs at
//! most 10 bytes.
//!
//! SINT32/SINT64 values are zig-zag mapped before encoding so that small
//! negative numbers stay short. INT32/INT64 values are *not*: a negative
//! INT32 is sign-extended to 64 bits and always occupies 10 bytes.

use crate::core::{CodecError, Result};

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

const DATA_BITS_MASK: u8 = 0x7F;
const CONTINUATION_BIT_MASK: u8 = 0x80;

/// Outcome of scanning for a varint without failing eagerly.
///
/// The decoder needs to tell an exhausted input (truncation) apart from an
/// overlong encoding, so the scan reports both cases separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VarintScan {
    /// Decoded value and bytes consumed
    Complete(u64, usize),
    /// Input ended before a terminating byte
    Incomplete,
    /// More than 10 bytes, or bits beyond 64 in the tenth byte
    Overrun,
}

pub(crate) fn scan(bytes: &[u8], offset: usize) -> VarintScan {
    let mut result: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        let Some(&byte) = bytes.get(offset + i) else {
            return VarintScan::Incomplete;
        };
        if i == MAX_VARINT_LEN - 1 && byte > 1 {
            // Only one payload bit is left in the tenth byte.
            return VarintScan::Overrun;
        }
        result |= u64::from(byte & DATA_BITS_MASK) << (7 * i);
        if byte & CONTINUATION_BIT_MASK == 0 {
            return VarintScan::Complete(result, i + 1);
        }
    }
    VarintScan::Overrun
}

/// Decode a varint starting at `offset`.
///
/// Returns the value and the number of bytes consumed. Fails with
/// [`CodecError::MalformedVarint`] on an overlong encoding or when the input
/// ends mid-varint.
pub fn decode_varint(bytes: &[u8], offset: usize) -> Result<(u64, usize)> {
    match scan(bytes, offset) {
        VarintScan::Complete(value, consumed) => Ok((value, consumed)),
        VarintScan::Incomplete | VarintScan::Overrun => Err(CodecError::malformed_varint(offset)),
    }
}

/// Encode a varint into a new byte vector.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    encode_varint_to(value, &mut out);
    out
}

/// Append a varint to an existing byte vector.
pub fn encode_varint_to(mut value: u64, out: &mut Vec<u8>) {
    while value >= u64::from(CONTINUATION_BIT_MASK) {
        out.push((value as u8) | CONTINUATION_BIT_MASK);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Number of bytes needed to encode `value`.
#[inline]
pub const fn encoded_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Zig-zag map a 32-bit signed integer.
#[inline]
pub const fn zigzag_encode32(n: i32) -> u32 {
    ((n << 1) ^ (n >> 31)) as u32
}

/// Inverse of [`zigzag_encode32`].
#[inline]
pub const fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

/// Zig-zag map a 64-bit signed integer.
#[inline]
pub const fn zigzag_encode64(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

/// Inverse of [`zigzag_encode64`].
#[inline]
pub const fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_lengths() {
        let cases: [(u64, usize); 10] = [
            (0, 1),
            (1, 1),
            (127, 1),
            (128, 2),
            (16383, 2),
            ((1 << 31) - 1, 5),
            (u32::MAX as u64, 5),
            (i64::MAX as u64, 9),
            (u64::MAX, 10),
            (-1i64 as u64, 10),
        ];
        for (value, len) in cases {
            let encoded = encode_varint(value);
            assert_eq!(encoded.len(), len, "length of {value}");
            assert_eq!(encoded_len(value), len);
            assert_eq!(decode_varint(&encoded, 0).unwrap(), (value, len));
        }
    }

    #[test]
    fn test_known_encodings() {
        assert_eq!(encode_varint(0), vec![0x00]);
        assert_eq!(encode_varint(150), vec![0x96, 0x01]);
        assert_eq!(encode_varint(300), vec![0xAC, 0x02]);
        assert_eq!(
            encode_varint(u64::MAX),
            vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x01]
        );
    }

    #[test]
    fn test_decode_at_offset() {
        let data = [0xAA, 0x96, 0x01, 0x05];
        assert_eq!(decode_varint(&data, 1).unwrap(), (150, 2));
        assert_eq!(decode_varint(&data, 3).unwrap(), (5, 1));
    }

    #[test]
    fn test_decode_overrun() {
        let data = [0xFF; 11];
        assert!(matches!(
            decode_varint(&data, 0),
            Err(CodecError::MalformedVarint { position: 0 })
        ));

        // Tenth byte carrying more than the 64th bit.
        let mut data = vec![0xFF; 9];
        data.push(0x02);
        assert!(matches!(
            decode_varint(&data, 0),
            Err(CodecError::MalformedVarint { .. })
        ));
    }

    #[test]
    fn test_decode_exhausted() {
        assert!(matches!(
            decode_varint(&[0x80, 0x80], 0),
            Err(CodecError::MalformedVarint { .. })
        ));
        assert!(matches!(
            decode_varint(&[], 0),
            Err(CodecError::MalformedVarint { .. })
        ));
        assert_eq!(scan(&[0x80], 0), VarintScan::Incomplete);
    }

    #[test]
    fn test_non_canonical_varint_accepted() {
        // 1 encoded in two bytes still decodes.
        assert_eq!(decode_varint(&[0x81, 0x00], 0).unwrap(), (1, 2));
    }

    #[test]
    fn test_zigzag32() {
        assert_eq!(zigzag_encode32(0), 0);
        assert_eq!(zigzag_encode32(-1), 1);
        assert_eq!(zigzag_encode32(1), 2);
        assert_eq!(zigzag_encode32(-2), 3);
        assert_eq!(zigzag_encode32(i32::MAX), 4_294_967_294);
        assert_eq!(zigzag_encode32(i32::MIN), u32::MAX);
        for n in [0, 1, -1, 2, -2, i32::MAX, i32::MIN, 123_456, -654_321] {
            assert_eq!(zigzag_decode32(zigzag_encode32(n)), n);
        }
    }

    #[test]
    fn test_zigzag64() {
        assert_eq!(zigzag_encode64(-1), 1);
        assert_eq!(zigzag_encode64(1), 2);
        assert_eq!(zigzag_encode64(i64::MIN), u64::MAX);
        for n in [0, 1, -1, i64::MAX, i64::MIN, 1 << 40, -(1 << 40)] {
            assert_eq!(zigzag_decode64(zigzag_encode64(n)), n);
        }
    }

    #[test]
    fn test_negative_int32_is_ten_bytes() {
        let sign_extended = (-1i32) as i64 as u64;
        assert_eq!(encode_varint(sign_extended).len(), 10);
    }
}
