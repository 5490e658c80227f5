//! # Record Stream Parser
//!
//! A resumable state machine over caller-owned bytes. The parser never reads
//! from a source, never blocks and keeps no input buffer: each call to
//! [`RecordIoParser::process`] is handed the unconsumed bytes seen so far and
//! either yields one production or reports how many bytes it needs next.
//!
//! ## States
//!
//! ```text
//!  Start ──> NeedSegmentLength ──> NeedSegment ──> NeedHeader ──> NeedRecord ──> NeedRow
//!                   ^                                 │  ^                           │
//!                   └──────── segment header ─────────┘  └───────────────────────────┘
//!
//!  any decode failure ──> Error (terminal)
//! ```
//!
//! | State | Needs | On success |
//! |-------|-------|------------|
//! | `NeedSegmentLength` | header + minimal segment row | learns the segment length |
//! | `NeedSegment` | segment length | yields `Segment`, consumes it |
//! | `NeedHeader` | header | peeks the schema id, consumes nothing |
//! | `NeedRecord` | header + record row | consumes the record header |
//! | `NeedRow` | record length | verifies the CRC, yields `Record` |
//!
//! ## Byte Accounting
//!
//! `consumed` is the number of leading input bytes the call used up, whether
//! or not it produced anything. `need` in `InsufficientBuffer` counts from the
//! first unconsumed byte. Callers drop `consumed` bytes and call again once at
//! least `need` bytes are available; supplying more is always fine.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::config::{RECORD_SCHEMA_ID, ROW_HEADER_SIZE, ROW_VERSION, SEGMENT_SCHEMA_ID};
use crate::encoding::crc32;
use crate::error::FramingError;
use crate::layout::{system, Layout, LayoutResolver};
use crate::recordio::header::RowHeader;
use crate::recordio::segment::{Record, Segment};
use crate::row::RowReader;
use crate::schema::SchemaId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ParserState {
    Start,
    NeedSegmentLength,
    NeedSegment,
    NeedHeader,
    NeedRecord,
    NeedRow,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Production<'a> {
    Segment(Segment),
    /// Verified record body, borrowed from the input.
    Record(&'a [u8]),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult<'a> {
    Produced {
        production: Production<'a>,
        consumed: usize,
    },
    InsufficientBuffer {
        need: usize,
        consumed: usize,
    },
}

impl ParseResult<'_> {
    pub fn consumed(&self) -> usize {
        match self {
            ParseResult::Produced { consumed, .. }
            | ParseResult::InsufficientBuffer { consumed, .. } => *consumed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordIoParser {
    state: ParserState,
    segment: Option<Segment>,
    segment_length: usize,
    record: Record,
    segment_layout: Arc<Layout>,
    record_layout: Arc<Layout>,
}

impl RecordIoParser {
    pub fn new() -> Self {
        Self::from_layouts(system::segment_layout(), system::record_layout())
    }

    pub fn with_resolver(resolver: &dyn LayoutResolver) -> Self {
        Self::from_layouts(
            resolver.resolve(SEGMENT_SCHEMA_ID),
            resolver.resolve(RECORD_SCHEMA_ID),
        )
    }

    fn from_layouts(segment_layout: Arc<Layout>, record_layout: Arc<Layout>) -> Self {
        Self {
            state: ParserState::Start,
            segment: None,
            segment_length: 0,
            record: Record::default(),
            segment_layout,
            record_layout,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// True once a segment has been read and the parser is between frames
    /// or inside a record. A faulted parser reports whether it read one
    /// before failing.
    pub fn have_segment(&self) -> bool {
        match self.state {
            ParserState::Error => self.segment.is_some(),
            state => state >= ParserState::NeedHeader,
        }
    }

    /// The most recent segment.
    pub fn segment(&self) -> Option<&Segment> {
        self.segment.as_ref()
    }

    /// Bytes the segment length pre-read requires.
    pub fn min_segment_size(&self) -> usize {
        ROW_HEADER_SIZE + self.segment_layout.size()
    }

    /// Bytes of a record header.
    pub fn record_header_size(&self) -> usize {
        ROW_HEADER_SIZE + self.record_layout.size()
    }

    fn transition(&mut self, next: ParserState) {
        trace!(from = ?self.state, to = ?next, "record parser transition");
        self.state = next;
    }

    fn fail<T>(&mut self, err: FramingError) -> Result<T, FramingError> {
        warn!(state = ?self.state, error = %err, "record stream framing error");
        self.state = ParserState::Error;
        Err(err)
    }

    fn check_header(&mut self, bytes: &[u8]) -> Result<SchemaId, FramingError> {
        let Some(header) = RowHeader::peek(bytes) else {
            return self.fail(FramingError::InvalidLength {
                what: "header",
                length: bytes.len() as i64,
            });
        };
        if header.version() != ROW_VERSION {
            return self.fail(FramingError::UnsupportedVersion {
                found: header.version(),
                expected: ROW_VERSION,
            });
        }
        Ok(header.schema_id())
    }

    fn malformed<T>(&mut self, what: &'static str, err: eyre::Report) -> Result<T, FramingError> {
        self.fail(FramingError::MalformedRow {
            what,
            reason: format!("{:#}", err),
        })
    }

    /// Advances over `buffer`, yielding at most one production.
    pub fn process<'a>(&mut self, buffer: &'a [u8]) -> Result<ParseResult<'a>, FramingError> {
        let mut consumed = 0;
        loop {
            let available = &buffer[consumed..];
            match self.state {
                ParserState::Start => self.transition(ParserState::NeedSegmentLength),

                ParserState::NeedSegmentLength => {
                    let need = self.min_segment_size();
                    if available.len() < need {
                        return Ok(ParseResult::InsufficientBuffer { need, consumed });
                    }
                    let schema_id = self.check_header(available)?;
                    if schema_id != SEGMENT_SCHEMA_ID {
                        return self.fail(FramingError::UnexpectedSchema(schema_id));
                    }
                    let length = match RowReader::new(&available[..need], &self.segment_layout)
                        .and_then(|row| Segment::read_length(&row))
                    {
                        Ok(length) => length,
                        Err(err) => return self.malformed("segment", err),
                    };
                    if length < need as i32 {
                        return self.fail(FramingError::InvalidLength {
                            what: "segment",
                            length: length.into(),
                        });
                    }
                    self.segment_length = length as usize;
                    self.transition(ParserState::NeedSegment);
                }

                ParserState::NeedSegment => {
                    let need = self.segment_length;
                    if available.len() < need {
                        return Ok(ParseResult::InsufficientBuffer { need, consumed });
                    }
                    let segment = match RowReader::new(&available[..need], &self.segment_layout)
                        .and_then(|row| Segment::from_row(&row))
                    {
                        Ok(segment) => segment,
                        Err(err) => return self.malformed("segment", err),
                    };
                    consumed += need;
                    self.segment = Some(segment.clone());
                    self.transition(ParserState::NeedHeader);
                    return Ok(ParseResult::Produced {
                        production: Production::Segment(segment),
                        consumed,
                    });
                }

                ParserState::NeedHeader => {
                    if available.len() < ROW_HEADER_SIZE {
                        return Ok(ParseResult::InsufficientBuffer {
                            need: ROW_HEADER_SIZE,
                            consumed,
                        });
                    }
                    match self.check_header(available)? {
                        SEGMENT_SCHEMA_ID => self.transition(ParserState::NeedSegmentLength),
                        RECORD_SCHEMA_ID => self.transition(ParserState::NeedRecord),
                        other => return self.fail(FramingError::UnexpectedSchema(other)),
                    }
                }

                ParserState::NeedRecord => {
                    let need = self.record_header_size();
                    if available.len() < need {
                        return Ok(ParseResult::InsufficientBuffer { need, consumed });
                    }
                    let record = match RowReader::new(&available[..need], &self.record_layout)
                        .and_then(|row| Record::from_row(&row))
                    {
                        Ok(record) => record,
                        Err(err) => return self.malformed("record", err),
                    };
                    if record.length < 0 {
                        return self.fail(FramingError::InvalidLength {
                            what: "record",
                            length: record.length.into(),
                        });
                    }
                    self.record = record;
                    consumed += need;
                    self.transition(ParserState::NeedRow);
                }

                ParserState::NeedRow => {
                    let need = self.record.length as usize;
                    if available.len() < need {
                        return Ok(ParseResult::InsufficientBuffer { need, consumed });
                    }
                    let body = &available[..need];
                    let computed = crc32(0, body);
                    if computed != self.record.crc32 {
                        return self.fail(FramingError::ChecksumMismatch {
                            stored: self.record.crc32,
                            computed,
                        });
                    }
                    consumed += need;
                    self.transition(ParserState::NeedHeader);
                    return Ok(ParseResult::Produced {
                        production: Production::Record(body),
                        consumed,
                    });
                }

                ParserState::Error => return Err(FramingError::Faulted),
            }
        }
    }
}

impl Default for RecordIoParser {
    fn default() -> Self {
        Self::new()
    }
}
