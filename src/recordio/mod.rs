//! # Record Streams
//!
//! A record stream is a sequence of frames. Each frame is a row of one of the
//! built-in framing schemas, introduced by the five-byte framing header:
//!
//! ```text
//! +---------------------------+----------------------+----------------------+
//! | segment                   | record               | record               | ...
//! | hdr | length | comment    | hdr | len | crc32    | hdr | len | crc32    |
//! |     |        | sdl        |       body ...       |       body ...       |
//! +---------------------------+----------------------+----------------------+
//! ```
//!
//! - A segment describes the records that follow and may recur anywhere a
//!   frame may start.
//! - A record frames one opaque body with its length and CRC-32.
//!
//! ## Module Organization
//!
//! - `header`: the framing header
//! - `segment`: segment and record models
//! - `formatter`: frame encoding
//! - `parser`: resumable frame decoding
//! - `stream`: reader and writer over `std::io`

pub mod formatter;
pub mod header;
pub mod parser;
pub mod segment;
pub mod stream;

#[cfg(test)]
mod tests;

pub use formatter::RecordIoFormatter;
pub use header::RowHeader;
pub use parser::{ParseResult, ParserState, Production, RecordIoParser};
pub use segment::{Record, Segment};
pub use stream::{RecordIoReader, RecordIoWriter, RecordVisitor, StreamStats};
