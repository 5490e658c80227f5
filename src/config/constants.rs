//! # turrow Constants
//!
//! ## Dependency Graph
//!
//! ```text
//! ROW_HEADER_SIZE (5 bytes)
//!       │
//!       ├─> version byte (ROW_VERSION)
//!       └─> schema id (i32, little-endian)
//!             Every row-encoded frame starts with this header. The parser
//!             peeks it to pick between segment and record frames.
//!
//! SYSTEM SCHEMA IDS
//!       │
//!       ├─> SEGMENT_SCHEMA_ID
//!       ├─> RECORD_SCHEMA_ID
//!       └─> EMPTY_SCHEMA_ID
//!             Reserved; user namespaces may never declare them.
//!
//! DEFAULT_READ_BUFFER_SIZE (64KB)
//!       │
//!       └─> MAX_FRAME_SIZE (must be >=)
//!             The stream reader grows past its initial capacity only when a
//!             single frame needs more, and refuses frames above the cap.
//! ```

use crate::schema::SchemaId;

// ============================================================================
// ROW FRAMING
// ============================================================================

/// Format version carried in the first byte of every row.
pub const ROW_VERSION: u8 = 0x81;

/// Size of the framing header: version byte + little-endian schema id.
pub const ROW_HEADER_SIZE: usize = 5;

const _: () = assert!(
    ROW_HEADER_SIZE == 1 + std::mem::size_of::<SchemaId>(),
    "ROW_HEADER_SIZE must cover the version byte and the schema id"
);

// ============================================================================
// SYSTEM SCHEMAS
// ============================================================================

/// Schema id of the segment header row.
pub const SEGMENT_SCHEMA_ID: SchemaId = i32::MAX - 9999;

/// Schema id of the record header row.
pub const RECORD_SCHEMA_ID: SchemaId = i32::MAX - 9998;

/// Schema id of the schema with no columns.
pub const EMPTY_SCHEMA_ID: SchemaId = i32::MAX - 9997;

/// Name of the namespace holding the system schemas.
pub const SYSTEM_NAMESPACE: &str = "turrow.system";

pub fn is_system_schema_id(id: SchemaId) -> bool {
    matches!(id, SEGMENT_SCHEMA_ID | RECORD_SCHEMA_ID | EMPTY_SCHEMA_ID)
}

// ============================================================================
// LAYOUT COMPILER LIMITS
// ============================================================================

/// Minimum number of slots in a tagged scope (excluding the tag itself).
pub const TAGGED_MIN_ITEMS: usize = 1;

/// Maximum number of slots in a tagged scope (excluding the tag itself).
pub const TAGGED_MAX_ITEMS: usize = 2;

const _: () = assert!(TAGGED_MIN_ITEMS <= TAGGED_MAX_ITEMS);

// ============================================================================
// BUFFER SIZING
// ============================================================================

/// Initial capacity of a freshly formatted row.
pub const DEFAULT_ROW_CAPACITY: usize = 128;

/// Initial capacity of the stream reader's buffer.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Largest single frame the stream reader will buffer.
pub const MAX_FRAME_SIZE: usize = 256 * 1024 * 1024;

const _: () = assert!(
    DEFAULT_READ_BUFFER_SIZE <= MAX_FRAME_SIZE,
    "the initial read buffer must not exceed the frame cap"
);
