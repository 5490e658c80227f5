//! # Variable-Length Integer Encoding
//!
//! Length prefixes, sparse column tokens and `VarInt`/`VarUInt` values are
//! written as little-endian base-128 varints: seven payload bits per byte, the
//! high bit set on every byte except the last.
//!
//! | Value Range                | Bytes |
//! |----------------------------|-------|
//! | 0 - 127                    | 1     |
//! | 128 - 16383                | 2     |
//! | 16384 - 2097151            | 3     |
//! | ...                        | ...   |
//! | 2^63 - u64::MAX            | 10    |
//!
//! Signed values go through zigzag mapping first so that small negative
//! numbers stay short: 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, ...
//!
//! ## Usage Example
//!
//! ```rust
//! use turrow::encoding::varint::{decode_varint, encode_varint, varint_len};
//!
//! let mut buf = [0u8; 10];
//! let written = encode_varint(300, &mut buf);
//! assert_eq!(written, varint_len(300));
//!
//! let (value, read) = decode_varint(&buf).unwrap();
//! assert_eq!(value, 300);
//! assert_eq!(read, 2);
//! ```
//!
//! ## Error Handling
//!
//! `decode_varint` returns `eyre::Result`:
//! - Empty buffer: "empty buffer for varint decode"
//! - Missing continuation bytes: "truncated varint"
//! - More than ten bytes: "varint overflows u64"

use eyre::{bail, ensure, Result};

/// Longest encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

pub fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

pub fn encode_varint(mut value: u64, buf: &mut [u8]) -> usize {
    let mut i = 0;
    while value >= 0x80 {
        buf[i] = (value as u8) | 0x80;
        value >>= 7;
        i += 1;
    }
    buf[i] = value as u8;
    i + 1
}

/// Appends the encoding of `value` to `out`.
pub fn put_varint(out: &mut Vec<u8>, value: u64) -> usize {
    let mut tmp = [0u8; MAX_VARINT_LEN];
    let n = encode_varint(value, &mut tmp);
    out.extend_from_slice(&tmp[..n]);
    n
}

pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    ensure!(!buf.is_empty(), "empty buffer for varint decode");

    let mut value: u64 = 0;
    for (i, &byte) in buf.iter().enumerate().take(MAX_VARINT_LEN) {
        let payload = (byte & 0x7F) as u64;
        if i == MAX_VARINT_LEN - 1 && payload > 1 {
            bail!("varint overflows u64");
        }
        value |= payload << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if buf.len() >= MAX_VARINT_LEN {
        bail!("varint overflows u64")
    }
    bail!("truncated varint")
}

#[inline]
pub fn zigzag_encode(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

#[inline]
pub fn zigzag_decode(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
