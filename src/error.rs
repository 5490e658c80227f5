//! # Error Taxonomy
//!
//! | Error | Raised by | Policy |
//! |-------|-----------|--------|
//! | [`LayoutCompileError`] | layout compiler | returned to the schema author, never cached |
//! | [`ResolveError`] | layout resolvers | `try_resolve` returns it, `resolve` panics |
//! | [`FramingError`] | record stream parser | returned from `process`; the parser is then faulted |
//!
//! Running out of input while parsing is not an error: the parser reports it as
//! `ParseResult::InsufficientBuffer` with the byte count it needs next.
//!
//! Row-level encode/decode and stream I/O use `eyre::Result` with contextual
//! messages.

use thiserror::Error;

use crate::schema::SchemaId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot compile layout for schema '{schema}': {message}")]
pub struct LayoutCompileError {
    pub schema: String,
    pub message: String,
}

impl LayoutCompileError {
    pub fn new(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("schema {0} is not registered with any resolver")]
    NotFound(SchemaId),
    #[error(transparent)]
    Compile(#[from] LayoutCompileError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FramingError {
    #[error("unsupported row version {found:#04x} (expected {expected:#04x})")]
    UnsupportedVersion { found: u8, expected: u8 },
    #[error("unexpected schema id {0} in framing header")]
    UnexpectedSchema(SchemaId),
    #[error("record checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
    #[error("invalid {what} length {length}")]
    InvalidLength { what: &'static str, length: i64 },
    #[error("malformed {what} row: {reason}")]
    MalformedRow { what: &'static str, reason: String },
    #[error("parser is faulted by an earlier framing error")]
    Faulted,
}
