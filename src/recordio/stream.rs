//! # Stream Reader and Writer
//!
//! Drives the parser and formatter over `std::io` streams.
//!
//! ## Buffer Management
//!
//! The reader owns one reusable buffer. Bytes the parser has consumed are
//! never copied; when the next frame needs more room than is left, only the
//! unconsumed tail is moved to the front, and the buffer grows only if the
//! frame is larger than its whole capacity:
//!
//! ```text
//! before: [ consumed ......... | tail | free ]
//! after:  [ tail | free ............................ ]
//! ```
//!
//! End of input exactly between frames ends the stream. End of input inside
//! a frame is an error.

use std::io::{ErrorKind, Read, Write};

use eyre::{Result, WrapErr};
use tracing::debug;

use crate::config::{DEFAULT_READ_BUFFER_SIZE, MAX_FRAME_SIZE};
use crate::recordio::formatter::RecordIoFormatter;
use crate::recordio::parser::{ParseResult, ParserState, Production, RecordIoParser};
use crate::recordio::segment::Segment;

/// Receives the productions of a stream in order.
pub trait RecordVisitor {
    fn visit_segment(&mut self, segment: &Segment) -> Result<()> {
        let _ = segment;
        Ok(())
    }

    fn visit_record(&mut self, body: &[u8]) -> Result<()>;
}

impl<F> RecordVisitor for F
where
    F: FnMut(&[u8]) -> Result<()>,
{
    fn visit_record(&mut self, body: &[u8]) -> Result<()> {
        self(body)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub segments: usize,
    pub records: usize,
    pub bytes: usize,
}

pub struct RecordIoReader<R> {
    inner: R,
    parser: RecordIoParser,
    buf: Vec<u8>,
    start: usize,
    end: usize,
    max_frame_size: usize,
}

impl<R: Read> RecordIoReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            parser: RecordIoParser::new(),
            buf: vec![0u8; DEFAULT_READ_BUFFER_SIZE],
            start: 0,
            end: 0,
            max_frame_size: MAX_FRAME_SIZE,
        }
    }

    /// Initial buffer size. The buffer still grows for larger frames.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.buf = vec![0u8; capacity.max(1)];
        self
    }

    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn with_parser(mut self, parser: RecordIoParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn parser(&self) -> &RecordIoParser {
        &self.parser
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Reads the whole stream, handing every production to `visitor`.
    pub fn read_all<V: RecordVisitor + ?Sized>(&mut self, visitor: &mut V) -> Result<StreamStats> {
        let mut stats = StreamStats::default();
        loop {
            let result = self
                .parser
                .process(&self.buf[self.start..self.end])
                .wrap_err_with(|| format!("invalid record stream at byte {}", stats.bytes))?;

            match result {
                ParseResult::Produced {
                    production,
                    consumed,
                } => {
                    match production {
                        Production::Segment(segment) => {
                            stats.segments += 1;
                            visitor.visit_segment(&segment)?;
                        }
                        Production::Record(body) => {
                            stats.records += 1;
                            visitor.visit_record(body)?;
                        }
                    }
                    self.start += consumed;
                    stats.bytes += consumed;
                }
                ParseResult::InsufficientBuffer { need, consumed } => {
                    self.start += consumed;
                    stats.bytes += consumed;
                    eyre::ensure!(
                        need <= self.max_frame_size,
                        "frame of {} bytes exceeds the {} byte limit",
                        need,
                        self.max_frame_size
                    );
                    if !self.fill(need)? {
                        return Ok(stats);
                    }
                }
            }
        }
    }

    fn make_room(&mut self, need: usize) {
        if self.buf.len() - self.start >= need {
            return;
        }
        self.buf.copy_within(self.start..self.end, 0);
        self.end -= self.start;
        self.start = 0;
        if self.buf.len() < need {
            let grown = need
                .max(self.buf.len().saturating_mul(2))
                .min(self.max_frame_size.max(need));
            debug!(from = self.buf.len(), to = grown, "growing record stream buffer");
            self.buf.resize(grown, 0);
        }
    }

    /// Reads until `need` unconsumed bytes are buffered. Returns `false` on
    /// a clean end of stream between frames.
    fn fill(&mut self, need: usize) -> Result<bool> {
        self.make_room(need);
        while self.end - self.start < need {
            let read = match self.inner.read(&mut self.buf[self.end..]) {
                Ok(read) => read,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err).wrap_err("failed to read record stream"),
            };
            if read == 0 {
                let between_frames = self.end == self.start
                    && matches!(
                        self.parser.state(),
                        ParserState::Start
                            | ParserState::NeedSegmentLength
                            | ParserState::NeedHeader
                    );
                if between_frames {
                    return Ok(false);
                }
                eyre::bail!(
                    "unexpected end of record stream: need {} bytes, have {}",
                    need,
                    self.end - self.start
                );
            }
            self.end += read;
        }
        Ok(true)
    }
}

pub struct RecordIoWriter<W: Write> {
    inner: W,
    formatter: RecordIoFormatter,
    scratch: Vec<u8>,
    stats: StreamStats,
}

impl<W: Write> RecordIoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_formatter(inner, RecordIoFormatter::new())
    }

    pub fn with_formatter(inner: W, formatter: RecordIoFormatter) -> Self {
        Self {
            inner,
            formatter,
            scratch: Vec::new(),
            stats: StreamStats::default(),
        }
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn write_segment(&mut self, segment: &Segment) -> Result<()> {
        self.scratch.clear();
        let written = self.formatter.format_segment_into(segment, &mut self.scratch)?;
        self.inner
            .write_all(&self.scratch)
            .wrap_err("failed to write segment")?;
        self.stats.segments += 1;
        self.stats.bytes += written;
        Ok(())
    }

    pub fn write_record(&mut self, body: &[u8]) -> Result<()> {
        eyre::ensure!(
            self.stats.segments > 0,
            "a segment must be written before the first record"
        );
        self.scratch.clear();
        let written = self.formatter.format_record_into(body, &mut self.scratch)?;
        self.inner
            .write_all(&self.scratch)
            .wrap_err("failed to write record")?;
        self.stats.records += 1;
        self.stats.bytes += written;
        Ok(())
    }

    pub fn write_records<I, B>(&mut self, bodies: I) -> Result<usize>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut count = 0;
        for body in bodies {
            self.write_record(body.as_ref())?;
            count += 1;
        }
        Ok(count)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush().wrap_err("failed to flush record stream")
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.inner)
    }
}
