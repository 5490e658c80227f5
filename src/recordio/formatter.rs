//! # Record Stream Formatter
//!
//! Produces the framed bytes of segments and records:
//!
//! ```text
//! segment: [header: segment id][length][comment?][sdl?]
//! record:  [header: record id][length][crc32] [body ...]
//! ```
//!
//! The segment and record layouts are resolved once per formatter and reused
//! for every frame.

use std::fmt;
use std::sync::Arc;

use eyre::Result;

use crate::config::{DEFAULT_ROW_CAPACITY, RECORD_SCHEMA_ID, SEGMENT_SCHEMA_ID};
use crate::layout::system::SEGMENT_LENGTH;
use crate::layout::{system, Layout, LayoutResolver};
use crate::recordio::segment::{Record, Segment};
use crate::row::{RowBuffer, Value};

type CapacityEstimator = Box<dyn Fn(usize) -> usize + Send + Sync>;

pub struct RecordIoFormatter {
    segment_layout: Arc<Layout>,
    record_layout: Arc<Layout>,
    estimator: CapacityEstimator,
}

impl RecordIoFormatter {
    pub fn new() -> Self {
        Self {
            segment_layout: system::segment_layout(),
            record_layout: system::record_layout(),
            estimator: Box::new(|needed| needed.max(DEFAULT_ROW_CAPACITY)),
        }
    }

    /// Formatter using framing layouts from `resolver` instead of the
    /// built-in ones.
    pub fn with_resolver(resolver: &dyn LayoutResolver) -> Self {
        Self {
            segment_layout: resolver.resolve(SEGMENT_SCHEMA_ID),
            record_layout: resolver.resolve(RECORD_SCHEMA_ID),
            ..Self::new()
        }
    }

    /// Sets how many bytes to reserve for a frame of at least `needed` bytes.
    pub fn with_capacity_estimator<F>(mut self, estimator: F) -> Self
    where
        F: Fn(usize) -> usize + Send + Sync + 'static,
    {
        self.estimator = Box::new(estimator);
        self
    }

    fn reserve(&self, out: &mut Vec<u8>, needed: usize) {
        let capacity = (self.estimator)(needed).max(needed);
        out.reserve(capacity);
    }

    pub fn format_segment(&self, segment: &Segment) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.format_segment_into(segment, &mut out)?;
        Ok(out)
    }

    /// Appends a segment frame to `out`, returning its length.
    pub fn format_segment_into(&self, segment: &Segment, out: &mut Vec<u8>) -> Result<usize> {
        let mut row = RowBuffer::new(Arc::clone(&self.segment_layout));
        segment.write_body(&mut row)?;

        let length = row.encoded_len();
        let encoded = i32::try_from(length)
            .map_err(|_| eyre::eyre!("segment of {} bytes is too large", length))?;
        row.write(SEGMENT_LENGTH, &Value::Int32(encoded))?;
        debug_assert_eq!(row.encoded_len(), length);

        self.reserve(out, length);
        row.write_to(out);
        Ok(length)
    }

    pub fn format_record(&self, body: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.format_record_into(body, &mut out)?;
        Ok(out)
    }

    /// Appends a record frame and its body to `out`, returning the bytes added.
    pub fn format_record_into(&self, body: &[u8], out: &mut Vec<u8>) -> Result<usize> {
        let record = Record::for_body(body)?;
        let mut row = RowBuffer::new(Arc::clone(&self.record_layout));
        record.write_row(&mut row)?;

        let length = row.encoded_len() + body.len();
        self.reserve(out, length);
        row.write_to(out);
        out.extend_from_slice(body);
        Ok(length)
    }
}

impl Default for RecordIoFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RecordIoFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordIoFormatter")
            .field("segment_layout", &self.segment_layout.name())
            .field("record_layout", &self.record_layout.name())
            .finish_non_exhaustive()
    }
}
