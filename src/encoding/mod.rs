//! # Encoding Module
//!
//! - **Varint encoding**: length prefixes, sparse tokens, `VarInt`/`VarUInt` values
//! - **Checksums**: CRC-32 over record bodies

pub mod checksum;
pub mod varint;

pub use checksum::crc32;
pub use varint::{decode_varint, encode_varint, put_varint, varint_len};
