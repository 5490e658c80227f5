//! Fuzz testing for the record stream parser.
//!
//! Feeds arbitrary bytes to the parser in arbitrary chunkings and checks that
//! it never panics, never reports more consumed bytes than it was given, and
//! produces the same sequence regardless of how the input is split.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use turrow::recordio::{ParseResult, Production, RecordIoParser};

#[derive(Debug, Arbitrary)]
struct ParserInput {
    data: Vec<u8>,
    chunks: Vec<u8>,
}

#[derive(Debug, PartialEq)]
enum Item {
    Segment(Option<String>),
    Record(Vec<u8>),
    Failed,
}

fn run(data: &[u8], chunks: &[u8]) -> Vec<Item> {
    let mut parser = RecordIoParser::new();
    let mut pending = Vec::new();
    let mut offset = 0;
    let mut sizes = chunks.iter().map(|&c| c as usize + 1).cycle();
    let mut items = Vec::new();

    loop {
        match parser.process(&pending) {
            Ok(ParseResult::Produced {
                production,
                consumed,
            }) => {
                assert!(consumed <= pending.len());
                items.push(match production {
                    Production::Segment(segment) => Item::Segment(segment.comment),
                    Production::Record(body) => Item::Record(body.to_vec()),
                });
                pending.drain(..consumed);
            }
            Ok(ParseResult::InsufficientBuffer { need, consumed }) => {
                assert!(consumed <= pending.len());
                pending.drain(..consumed);
                if offset == data.len() {
                    return items;
                }
                while pending.len() < need && offset < data.len() {
                    let step = sizes.next().unwrap_or(data.len());
                    let end = (offset + step).min(data.len());
                    pending.extend_from_slice(&data[offset..end]);
                    offset = end;
                }
            }
            Err(_) => {
                items.push(Item::Failed);
                return items;
            }
        }
    }
}

fuzz_target!(|input: ParserInput| {
    if input.data.len() > 1 << 16 {
        return;
    }
    let whole = run(&input.data, &[]);
    let chunked = run(&input.data, &input.chunks);
    assert_eq!(whole, chunked);
});
