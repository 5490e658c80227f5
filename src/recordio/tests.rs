//! Tests for the recordio module

use std::sync::Arc;

use super::*;
use crate::config::{RECORD_SCHEMA_ID, ROW_HEADER_SIZE, ROW_VERSION, SEGMENT_SCHEMA_ID};
use crate::error::FramingError;
use crate::layout::system::{self, SEGMENT_LENGTH};
use crate::row::{RowBuffer, Value};
use crate::schema::{Namespace, PrimitiveKind, Property, PropertyType, Schema};

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Segment(Option<String>),
    Record(Vec<u8>),
}

fn owned(production: Production<'_>) -> Item {
    match production {
        Production::Segment(segment) => Item::Segment(segment.comment),
        Production::Record(body) => Item::Record(body.to_vec()),
    }
}

/// Feeds `stream` in `chunk`-sized pieces, re-invoking the parser only once
/// it has the bytes it asked for.
fn drive(stream: &[u8], chunk: usize) -> Result<Vec<Item>, FramingError> {
    let mut parser = RecordIoParser::new();
    let mut pending: Vec<u8> = Vec::new();
    let mut offset = 0;
    let mut items = Vec::new();
    loop {
        match parser.process(&pending)? {
            ParseResult::Produced {
                production,
                consumed,
            } => {
                items.push(owned(production));
                pending.drain(..consumed);
            }
            ParseResult::InsufficientBuffer { need, consumed } => {
                pending.drain(..consumed);
                if offset == stream.len() {
                    assert!(pending.len() < need);
                    return Ok(items);
                }
                while pending.len() < need && offset < stream.len() {
                    let end = (offset + chunk).min(stream.len());
                    pending.extend_from_slice(&stream[offset..end]);
                    offset = end;
                }
            }
        }
    }
}

fn sample_namespace() -> Namespace {
    Namespace::new("app").with_schema(
        Schema::new("Person", 1)
            .with_property(Property::new(
                "id",
                PropertyType::primitive(PrimitiveKind::Int32).fixed(),
            ))
            .with_property(Property::new(
                "name",
                PropertyType::primitive(PrimitiveKind::Utf8).variable(),
            )),
    )
}

fn sample_stream() -> Vec<u8> {
    let formatter = RecordIoFormatter::new();
    let mut stream = Vec::new();
    formatter
        .format_segment_into(
            &Segment::new()
                .with_comment("first")
                .with_schema(sample_namespace()),
            &mut stream,
        )
        .unwrap();
    let bodies: [&[u8]; 4] = [b"alpha", &[], &[0u8; 300], &[0xFF; 3]];
    for body in bodies {
        formatter.format_record_into(body, &mut stream).unwrap();
    }
    formatter
        .format_segment_into(&Segment::new().with_comment("second"), &mut stream)
        .unwrap();
    formatter.format_record_into(b"omega", &mut stream).unwrap();
    stream
}

#[test]
fn end_to_end_segment_and_two_records() {
    let formatter = RecordIoFormatter::new();
    let segment = formatter
        .format_segment(&Segment::new().with_comment("s1"))
        .unwrap();
    let first = formatter.format_record(&[0x01, 0x02]).unwrap();
    let second = formatter.format_record(&[]).unwrap();
    let stream = [segment.clone(), first.clone(), second.clone()].concat();

    let mut parser = RecordIoParser::new();
    let mut offset = 0;

    match parser.process(&stream[offset..]).unwrap() {
        ParseResult::Produced {
            production: Production::Segment(parsed),
            consumed,
        } => {
            assert_eq!(consumed, segment.len());
            assert_eq!(parsed.comment.as_deref(), Some("s1"));
            assert_eq!(parsed.length as usize, segment.len());
            assert!(parsed.schema.is_none());
            offset += consumed;
        }
        other => panic!("expected segment, got {:?}", other),
    }
    assert!(parser.have_segment());

    let result = parser.process(&stream[offset..]).unwrap();
    assert_eq!(
        result,
        ParseResult::Produced {
            production: Production::Record(&[0x01, 0x02]),
            consumed: first.len(),
        }
    );
    offset += result.consumed();

    let result = parser.process(&stream[offset..]).unwrap();
    assert_eq!(
        result,
        ParseResult::Produced {
            production: Production::Record(&[]),
            consumed: second.len(),
        }
    );
    offset += result.consumed();
    assert_eq!(offset, stream.len());

    assert_eq!(
        parser.process(&stream[offset..]).unwrap(),
        ParseResult::InsufficientBuffer {
            need: ROW_HEADER_SIZE,
            consumed: 0,
        }
    );
}

#[test]
fn short_input_asks_for_minimal_segment() {
    let segment = RecordIoFormatter::new()
        .format_segment(&Segment::new().with_comment("s1"))
        .unwrap();
    let min = ROW_HEADER_SIZE + system::segment_layout().size();

    let mut parser = RecordIoParser::new();
    for len in [0, 1, min - 1] {
        assert_eq!(
            parser.process(&segment[..len]).unwrap(),
            ParseResult::InsufficientBuffer {
                need: min,
                consumed: 0,
            }
        );
    }
    assert_eq!(parser.state(), ParserState::NeedSegmentLength);
    assert!(!parser.have_segment());
}

#[test]
fn segment_length_is_learned_before_body() {
    let segment = RecordIoFormatter::new()
        .format_segment(&Segment::new().with_comment("a longer comment"))
        .unwrap();
    let min = ROW_HEADER_SIZE + system::segment_layout().size();

    let mut parser = RecordIoParser::new();
    assert_eq!(
        parser.process(&segment[..min]).unwrap(),
        ParseResult::InsufficientBuffer {
            need: segment.len(),
            consumed: 0,
        }
    );
    assert_eq!(parser.state(), ParserState::NeedSegment);
}

#[test]
fn partial_record_consumes_header_first() {
    let formatter = RecordIoFormatter::new();
    let segment = formatter.format_segment(&Segment::new()).unwrap();
    let record = formatter.format_record(&[7, 8]).unwrap();

    let mut parser = RecordIoParser::new();
    parser.process(&segment).unwrap();

    let header = ROW_HEADER_SIZE + system::record_layout().size();
    assert_eq!(
        parser.process(&record[..header + 1]).unwrap(),
        ParseResult::InsufficientBuffer {
            need: 2,
            consumed: header,
        }
    );
    assert_eq!(parser.state(), ParserState::NeedRow);
    assert_eq!(
        parser.process(&record[header..]).unwrap(),
        ParseResult::Produced {
            production: Production::Record(&[7, 8]),
            consumed: 2,
        }
    );
    assert_eq!(parser.state(), ParserState::NeedHeader);
}

#[test]
fn chunk_size_does_not_change_productions() {
    let stream = sample_stream();
    let whole = drive(&stream, stream.len()).unwrap();
    assert_eq!(whole.len(), 7);
    assert_eq!(whole[0], Item::Segment(Some("first".into())));
    assert_eq!(whole[2], Item::Record(Vec::new()));
    assert_eq!(whole[5], Item::Segment(Some("second".into())));
    assert_eq!(whole[6], Item::Record(b"omega".to_vec()));

    for chunk in [1, 2, 3, 5, 7, 13, 64, 301] {
        assert_eq!(drive(&stream, chunk).unwrap(), whole, "chunk size {}", chunk);
    }
}

#[test]
fn recurring_segment_replaces_current_segment() {
    let formatter = RecordIoFormatter::new();
    let stream = [
        formatter.format_segment(&Segment::new().with_comment("one")).unwrap(),
        formatter.format_record(b"a").unwrap(),
        formatter.format_segment(&Segment::new().with_comment("two")).unwrap(),
        formatter.format_record(b"b").unwrap(),
    ]
    .concat();

    let mut parser = RecordIoParser::new();
    let mut offset = 0;
    let mut comments = Vec::new();
    while offset < stream.len() {
        let result = parser.process(&stream[offset..]).unwrap();
        offset += result.consumed();
        if let ParseResult::Produced {
            production: Production::Segment(segment),
            ..
        } = result
        {
            comments.push(segment.comment.unwrap());
        }
    }
    assert_eq!(comments, vec!["one", "two"]);
    assert_eq!(parser.segment().unwrap().comment.as_deref(), Some("two"));
}

#[test]
fn embedded_schema_survives_framing() {
    let stream = RecordIoFormatter::new()
        .format_segment(&Segment::new().with_schema(sample_namespace()))
        .unwrap();
    let mut parser = RecordIoParser::new();
    parser.process(&stream).unwrap();
    assert_eq!(
        parser.segment().unwrap().schema.as_ref(),
        Some(&sample_namespace())
    );
}

#[test]
fn any_corrupted_body_byte_is_detected() {
    let formatter = RecordIoFormatter::new();
    let segment = formatter.format_segment(&Segment::new()).unwrap();
    let record = formatter.format_record(b"checksummed body").unwrap();
    let body_start = segment.len() + ROW_HEADER_SIZE + system::record_layout().size();
    let stream = [segment, record].concat();

    for index in body_start..stream.len() {
        let mut corrupt = stream.clone();
        corrupt[index] ^= 0x20;
        let err = drive(&corrupt, corrupt.len()).unwrap_err();
        assert!(
            matches!(err, FramingError::ChecksumMismatch { .. }),
            "byte {}: {:?}",
            index,
            err
        );
    }
}

#[test]
fn parser_stays_faulted_after_error() {
    let formatter = RecordIoFormatter::new();
    let segment = formatter.format_segment(&Segment::new()).unwrap();
    let mut record = formatter.format_record(b"xy").unwrap();
    let last = record.len() - 1;
    record[last] ^= 0xFF;

    let mut parser = RecordIoParser::new();
    parser.process(&segment).unwrap();
    assert!(matches!(
        parser.process(&record),
        Err(FramingError::ChecksumMismatch { .. })
    ));
    assert_eq!(parser.state(), ParserState::Error);
    assert!(parser.have_segment());
    assert_eq!(parser.process(&record), Err(FramingError::Faulted));
    assert_eq!(parser.process(&[]), Err(FramingError::Faulted));
}

#[test]
fn failure_before_any_segment_reports_no_segment() {
    let mut parser = RecordIoParser::new();
    assert!(matches!(
        parser.process(&[0x80; 32]),
        Err(FramingError::UnsupportedVersion { found: 0x80, .. })
    ));
    assert_eq!(parser.state(), ParserState::Error);
    assert!(parser.segment().is_none());
    assert!(!parser.have_segment());
}

#[test]
fn bad_version_is_rejected() {
    let formatter = RecordIoFormatter::new();
    let segment = formatter.format_segment(&Segment::new()).unwrap();
    let mut record = formatter.format_record(b"x").unwrap();
    record[0] = ROW_VERSION - 1;

    let mut parser = RecordIoParser::new();
    parser.process(&segment).unwrap();
    assert_eq!(
        parser.process(&record),
        Err(FramingError::UnsupportedVersion {
            found: ROW_VERSION - 1,
            expected: ROW_VERSION,
        })
    );
}

#[test]
fn unknown_schema_id_is_rejected() {
    let formatter = RecordIoFormatter::new();
    let segment = formatter.format_segment(&Segment::new()).unwrap();
    let mut record = formatter.format_record(b"x").unwrap();
    record[1..5].copy_from_slice(&42i32.to_le_bytes());

    let mut parser = RecordIoParser::new();
    parser.process(&segment).unwrap();
    assert_eq!(parser.process(&record), Err(FramingError::UnexpectedSchema(42)));
}

#[test]
fn stream_must_start_with_segment() {
    let record = RecordIoFormatter::new().format_record(&[0; 16]).unwrap();
    let mut parser = RecordIoParser::new();
    assert_eq!(
        parser.process(&record),
        Err(FramingError::UnexpectedSchema(RECORD_SCHEMA_ID))
    );
}

#[test]
fn negative_record_length_is_rejected() {
    let formatter = RecordIoFormatter::new();
    let segment = formatter.format_segment(&Segment::new()).unwrap();
    let mut row = RowBuffer::new(system::record_layout());
    Record {
        length: -1,
        crc32: 0,
    }
    .write_row(&mut row)
    .unwrap();

    let mut parser = RecordIoParser::new();
    parser.process(&segment).unwrap();
    assert_eq!(
        parser.process(&row.into_bytes()),
        Err(FramingError::InvalidLength {
            what: "record",
            length: -1,
        })
    );
}

#[test]
fn undersized_segment_length_is_rejected() {
    let mut row = RowBuffer::new(system::segment_layout());
    row.write(SEGMENT_LENGTH, &Value::Int32(3)).unwrap();
    let bytes = row.into_bytes();
    assert_eq!(bytes[1..5], SEGMENT_SCHEMA_ID.to_le_bytes());

    let mut parser = RecordIoParser::new();
    assert_eq!(
        parser.process(&bytes),
        Err(FramingError::InvalidLength {
            what: "segment",
            length: 3,
        })
    );
}

#[test]
fn malformed_segment_schema_is_rejected() {
    let mut row = RowBuffer::new(system::segment_layout());
    row.write(system::SEGMENT_SDL, &Value::utf8("{not json")).unwrap();
    let length = row.encoded_len() as i32;
    row.write(SEGMENT_LENGTH, &Value::Int32(length)).unwrap();

    let mut parser = RecordIoParser::new();
    let err = parser.process(&row.into_bytes()).unwrap_err();
    match err {
        FramingError::MalformedRow { what, reason } => {
            assert_eq!(what, "segment");
            assert!(reason.contains("invalid segment schema"));
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn parser_accepts_custom_resolver() {
    let resolver = Arc::new(crate::layout::NamespaceResolver::new(Namespace::new("app")));
    let stream = sample_stream();
    let mut parser = RecordIoParser::with_resolver(resolver.as_ref());
    let result = parser.process(&stream).unwrap();
    assert!(matches!(
        result,
        ParseResult::Produced {
            production: Production::Segment(_),
            ..
        }
    ));
}
