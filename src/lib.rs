//! # turrow - Schema-Driven Binary Rows
//!
//! turrow compiles logical schemas into physical row layouts and frames rows
//! into checksummed, resumable record streams.
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use turrow::layout::{LayoutResolver, NamespaceResolver};
//! use turrow::row::{RowBuffer, RowReader, Value};
//! use turrow::schema::{Namespace, PrimitiveKind, Property, PropertyType, Schema};
//!
//! let ns = Namespace::new("app").with_schema(
//!     Schema::new("Note", 1)
//!         .with_property(Property::new(
//!             "x",
//!             PropertyType::primitive(PrimitiveKind::Int32).fixed(),
//!         ))
//!         .with_property(Property::new(
//!             "note",
//!             PropertyType::primitive(PrimitiveKind::Utf8).variable(),
//!         )),
//! );
//! let resolver = NamespaceResolver::new(ns);
//! let layout = resolver.resolve(1);
//!
//! let mut row = RowBuffer::new(Arc::clone(&layout));
//! row.write("x", &Value::Int32(5))?;
//! row.write("note", &Value::utf8("hi"))?;
//! let bytes = row.into_bytes();
//!
//! let reader = RowReader::new(&bytes, &layout)?;
//! assert_eq!(reader.read("x")?, Value::Int32(5));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │  recordio: formatter / parser / streams   │
//! ├───────────────────────────────────────────┤
//! │  row: RowBuffer / RowReader               │
//! ├───────────────────────────────────────────┤
//! │  layout: compiler, resolvers, Layout      │
//! ├─────────────────────┬─────────────────────┤
//! │  schema (logical)   │  tokenizer (trie)   │
//! ├─────────────────────┴─────────────────────┤
//! │  encoding: varint, crc32  │  config       │
//! └───────────────────────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`schema`]: namespaces, schemas and property types
//! - [`tokenizer`]: path trie and path-to-token mapping
//! - [`layout`]: physical layouts, the compiler and resolvers
//! - [`row`]: field-level row encoding
//! - [`recordio`]: segment/record framing and stream parsing
//! - [`encoding`]: varints and checksums
//! - [`config`]: wire constants and defaults
//! - [`error`]: typed errors

#[macro_use]
mod macros;

pub mod config;
pub mod encoding;
pub mod error;
pub mod layout;
pub mod recordio;
pub mod row;
pub mod schema;
pub mod tokenizer;

pub use error::{FramingError, LayoutCompileError, ResolveError};
pub use layout::{Layout, LayoutCompiler, LayoutResolver, NamespaceResolver};
pub use recordio::{RecordIoFormatter, RecordIoParser, RecordIoReader, RecordIoWriter};
pub use row::{RowBuffer, RowReader, Value};
pub use schema::{Namespace, Schema, SchemaId};
