//! # Record Stream Integration Tests
//!
//! Writes record streams to files and reads them back through the streaming
//! reader:
//!
//! 1. Writer/reader round trip through a temporary file
//! 2. Typed rows as record bodies, decoded with the segment's embedded schema
//! 3. Buffer growth for frames larger than the initial capacity
//! 4. Truncated and corrupted streams

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use eyre::Result;
use tempfile::tempfile;
use turrow::layout::{LayoutResolver, NamespaceResolver};
use turrow::recordio::{RecordIoReader, RecordIoWriter, RecordVisitor, Segment, StreamStats};
use turrow::row::{RowBuffer, RowReader, Value};
use turrow::schema::{Namespace, PrimitiveKind, Property, PropertyType, Schema};

#[derive(Default)]
struct Collector {
    segments: Vec<Segment>,
    records: Vec<Vec<u8>>,
}

impl RecordVisitor for Collector {
    fn visit_segment(&mut self, segment: &Segment) -> Result<()> {
        self.segments.push(segment.clone());
        Ok(())
    }

    fn visit_record(&mut self, body: &[u8]) -> Result<()> {
        self.records.push(body.to_vec());
        Ok(())
    }
}

fn event_namespace() -> Namespace {
    Namespace::new("events").with_schema(
        Schema::new("Event", 1)
            .with_property(Property::new(
                "seq",
                PropertyType::primitive(PrimitiveKind::Int64).fixed().non_nullable(),
            ))
            .with_property(Property::new(
                "kind",
                PropertyType::primitive(PrimitiveKind::Utf8).variable(),
            )),
    )
}

fn rewind(mut file: File) -> File {
    file.seek(SeekFrom::Start(0)).unwrap();
    file
}

mod round_trip_tests {
    use super::*;

    #[test]
    fn file_round_trip_preserves_order() {
        let file = tempfile().unwrap();
        let mut writer = RecordIoWriter::new(BufWriter::new(file));
        writer
            .write_segment(&Segment::new().with_comment("batch 1"))
            .unwrap();
        writer.write_record(b"one").unwrap();
        writer.write_record(b"").unwrap();
        let written = writer.write_records([&b"two"[..], &b"three"[..]]).unwrap();
        assert_eq!(written, 2);
        writer
            .write_segment(&Segment::new().with_comment("batch 2"))
            .unwrap();
        writer.write_record(b"four").unwrap();
        let write_stats = writer.stats();
        let file = writer.into_inner().unwrap().into_inner().unwrap();

        let mut reader = RecordIoReader::new(BufReader::new(rewind(file)));
        let mut collector = Collector::default();
        let read_stats = reader.read_all(&mut collector).unwrap();

        assert_eq!(read_stats, write_stats);
        assert_eq!(
            read_stats,
            StreamStats {
                segments: 2,
                records: 5,
                bytes: write_stats.bytes,
            }
        );
        let comments: Vec<_> = collector
            .segments
            .iter()
            .map(|s| s.comment.as_deref().unwrap())
            .collect();
        assert_eq!(comments, vec!["batch 1", "batch 2"]);
        assert_eq!(
            collector.records,
            vec![
                b"one".to_vec(),
                Vec::new(),
                b"two".to_vec(),
                b"three".to_vec(),
                b"four".to_vec()
            ]
        );
    }

    #[test]
    fn typed_rows_decode_with_embedded_schema() {
        let ns = event_namespace();
        let resolver = NamespaceResolver::new(ns.clone());
        let layout = resolver.resolve(1);

        let mut stream = Vec::new();
        let mut writer = RecordIoWriter::new(&mut stream);
        writer
            .write_segment(&Segment::new().with_schema(ns))
            .unwrap();
        let mut row = RowBuffer::new(Arc::clone(&layout));
        for (seq, kind) in [(1i64, "open"), (2, "click"), (3, "close")] {
            row.reset();
            row.write("seq", &Value::Int64(seq)).unwrap();
            row.write("kind", &Value::utf8(kind)).unwrap();
            writer.write_record(&row.to_bytes()).unwrap();
        }
        writer.flush().unwrap();
        drop(writer);

        let mut collector = Collector::default();
        RecordIoReader::new(Cursor::new(stream))
            .read_all(&mut collector)
            .unwrap();

        let embedded = collector.segments[0].schema.clone().unwrap();
        let decoded_layout = NamespaceResolver::new(embedded).resolve(1);
        let kinds: Vec<_> = collector
            .records
            .iter()
            .map(|body| {
                let reader = RowReader::new(body, &decoded_layout).unwrap();
                reader.read("kind").unwrap().into_owned()
            })
            .collect();
        assert_eq!(
            kinds,
            vec![Value::from("open"), Value::from("click"), Value::from("close")]
        );
    }

    #[test]
    fn closure_visitor_counts_bytes() {
        let mut stream = Vec::new();
        let mut writer = RecordIoWriter::new(&mut stream);
        writer.write_segment(&Segment::new()).unwrap();
        writer.write_records((0..10u8).map(|i| vec![i; i as usize])).unwrap();
        drop(writer);

        let mut total = 0;
        let mut visitor = |body: &[u8]| -> Result<()> {
            total += body.len();
            Ok(())
        };
        let stats = RecordIoReader::new(Cursor::new(&stream))
            .read_all(&mut visitor)
            .unwrap();
        assert_eq!(total, 45);
        assert_eq!(stats.records, 10);
        assert_eq!(stats.bytes, stream.len());
    }

    #[test]
    fn empty_stream_has_no_productions() {
        let mut collector = Collector::default();
        let stats = RecordIoReader::new(Cursor::new(Vec::new()))
            .read_all(&mut collector)
            .unwrap();
        assert_eq!(stats, StreamStats::default());
    }
}

mod buffer_tests {
    use super::*;

    #[test]
    fn large_frames_grow_the_buffer() {
        let big = vec![0x5A; 10_000];
        let mut stream = Vec::new();
        let mut writer = RecordIoWriter::new(&mut stream);
        writer.write_segment(&Segment::new()).unwrap();
        writer.write_record(&big).unwrap();
        writer.write_record(b"small").unwrap();
        drop(writer);

        let mut reader = RecordIoReader::new(Cursor::new(stream)).with_capacity(16);
        let mut collector = Collector::default();
        reader.read_all(&mut collector).unwrap();

        assert!(reader.capacity() >= big.len());
        assert_eq!(collector.records[0], big);
        assert_eq!(collector.records[1], b"small");
    }

    /// Hands out at most `step` bytes per read.
    struct Trickle<R> {
        inner: R,
        step: usize,
    }

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let len = buf.len().min(self.step);
            self.inner.read(&mut buf[..len])
        }
    }

    #[test]
    fn short_reads_are_accumulated() {
        let mut stream = Vec::new();
        let mut writer = RecordIoWriter::new(&mut stream);
        writer
            .write_segment(&Segment::new().with_comment("trickle"))
            .unwrap();
        writer.write_records([b"abc", b"def"]).unwrap();
        drop(writer);

        let source = Trickle {
            inner: Cursor::new(stream),
            step: 1,
        };
        let mut collector = Collector::default();
        let stats = RecordIoReader::new(source)
            .with_capacity(8)
            .read_all(&mut collector)
            .unwrap();
        assert_eq!(stats.records, 2);
        assert_eq!(collector.records, vec![b"abc".to_vec(), b"def".to_vec()]);
    }

    #[test]
    fn oversized_frames_are_rejected() {
        let mut stream = Vec::new();
        let mut writer = RecordIoWriter::new(&mut stream);
        writer.write_segment(&Segment::new()).unwrap();
        writer.write_record(&[0; 4096]).unwrap();
        drop(writer);

        let mut collector = Collector::default();
        let err = RecordIoReader::new(Cursor::new(stream))
            .with_max_frame_size(1024)
            .read_all(&mut collector)
            .unwrap_err();
        assert!(err.to_string().contains("exceeds the 1024 byte limit"));
    }
}

mod failure_tests {
    use super::*;

    fn two_record_stream() -> Vec<u8> {
        let mut stream = Vec::new();
        let mut writer = RecordIoWriter::new(&mut stream);
        writer.write_segment(&Segment::new()).unwrap();
        writer.write_records([b"first", b"other"]).unwrap();
        drop(writer);
        stream
    }

    #[test]
    fn truncated_stream_is_an_error() {
        let mut stream = two_record_stream();
        stream.truncate(stream.len() - 2);

        let mut collector = Collector::default();
        let err = RecordIoReader::new(Cursor::new(stream))
            .read_all(&mut collector)
            .unwrap_err();
        assert!(err.to_string().contains("unexpected end of record stream"));
        assert_eq!(collector.records.len(), 1);
    }

    #[test]
    fn corrupted_body_stops_the_stream() {
        let mut file = tempfile().unwrap();
        let mut stream = two_record_stream();
        let last = stream.len() - 1;
        stream[last] ^= 0x01;
        file.write_all(&stream).unwrap();

        let mut collector = Collector::default();
        let err = RecordIoReader::new(rewind(file))
            .read_all(&mut collector)
            .unwrap_err();
        assert!(format!("{:#}", err).contains("checksum mismatch"));
        assert_eq!(collector.records, vec![b"first".to_vec()]);
    }

    #[test]
    fn records_require_a_segment() {
        let mut writer = RecordIoWriter::new(Vec::new());
        let err = writer.write_record(b"orphan").unwrap_err();
        assert!(err.to_string().contains("segment must be written"));
    }
}
