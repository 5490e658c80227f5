//! # Row Codec
//!
//! Field-level encoding of a single row against a compiled layout.
//! [`RowBuffer`] builds rows, [`RowReader`] reads them without copying.
//!
//! ## Wire Format
//!
//! ```text
//! +--------+---------+--------------+---------------------+----------------------+
//! | header | bitmask | fixed region | variable region     | sparse region        |
//! +--------+---------+--------------+---------------------+----------------------+
//!                                   | [len][bytes] ...    | [token][code][value] |
//! ```
//!
//! - Bitmask bit set means present. Boolean columns keep their value in a
//!   second bit right after the presence bit.
//! - Fixed columns sit at the offset the layout assigned. Fixed strings are
//!   zero padded.
//! - Present variable columns follow in slot order. Absent ones take no bytes.
//! - Sparse entries name their column by token and repeat the type code, so a
//!   reader can skip entries it does not care about.
//!
//! The sparse region runs to the end of the buffer; the enclosing frame
//! carries the row length.

mod buffer;
mod reader;
mod value;


pub use buffer::RowBuffer;
pub use reader::{RowReader, SparseEntry};
pub use value::Value;
