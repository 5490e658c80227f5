//! # Framing Header
//!
//! Every row-encoded frame starts with the same five bytes:
//!
//! ```text
//! +---------+----------------------+
//! | version | schema id (i32 LE)   |
//! | 1 byte  | 4 bytes              |
//! +---------+----------------------+
//! ```
//!
//! The schema id selects the layout of the row that follows. In a record
//! stream it is one of the two framing schemas: segment or record.

use eyre::{ensure, Result};
use zerocopy::little_endian::I32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::config::{ROW_HEADER_SIZE, ROW_VERSION};
use crate::schema::SchemaId;

#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
pub struct RowHeader {
    version: u8,
    schema_id: I32,
}

const _: () = assert!(std::mem::size_of::<RowHeader>() == ROW_HEADER_SIZE);

impl RowHeader {
    pub fn new(schema_id: SchemaId) -> Self {
        Self {
            version: ROW_VERSION,
            schema_id: I32::new(schema_id),
        }
    }

    /// Views the first `ROW_HEADER_SIZE` bytes without checking the version.
    pub fn peek(bytes: &[u8]) -> Option<&Self> {
        Self::ref_from_prefix(bytes).ok().map(|(header, _)| header)
    }

    /// Views and validates the header at the start of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<&Self> {
        ensure!(
            bytes.len() >= ROW_HEADER_SIZE,
            "buffer too small for row header: {} < {}",
            bytes.len(),
            ROW_HEADER_SIZE
        );
        let header = Self::peek(bytes)
            .ok_or_else(|| eyre::eyre!("failed to parse row header"))?;
        ensure!(
            header.version == ROW_VERSION,
            "unsupported row version: {:#04x} (expected {:#04x})",
            header.version,
            ROW_VERSION
        );
        Ok(header)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    zerocopy_accessors! {
        schema_id: i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_version_then_little_endian_id() {
        let header = RowHeader::new(0x0102_0304);
        assert_eq!(header.as_bytes(), &[ROW_VERSION, 0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn from_bytes_reads_prefix() {
        let bytes = [ROW_VERSION, 7, 0, 0, 0, 0xAA, 0xBB];
        let header = RowHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.schema_id(), 7);
        assert_eq!(header.version(), ROW_VERSION);
    }

    #[test]
    fn from_bytes_rejects_short_buffer() {
        let result = RowHeader::from_bytes(&[ROW_VERSION, 1, 0]);
        assert!(result.unwrap_err().to_string().contains("too small"));
        assert!(RowHeader::peek(&[ROW_VERSION]).is_none());
    }

    #[test]
    fn from_bytes_rejects_wrong_version() {
        let result = RowHeader::from_bytes(&[0x80, 1, 0, 0, 0]);
        assert!(result.unwrap_err().to_string().contains("unsupported row version"));
    }

    #[test]
    fn set_schema_id_round_trips() {
        let mut header = RowHeader::new(1);
        header.set_schema_id(-5);
        assert_eq!(header.schema_id(), -5);
    }
}
