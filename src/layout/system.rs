//! Built-in schemas of the record stream format.
//!
//! | Schema | Id | Columns |
//! |--------|----|---------|
//! | Segment | `SEGMENT_SCHEMA_ID` | `length` int32 fixed, `comment` utf8 sparse, `sdl` utf8 sparse |
//! | Record | `RECORD_SCHEMA_ID` | `length` int32 fixed, `crc32` uint32 fixed |
//! | Empty | `EMPTY_SCHEMA_ID` | none |
//!
//! The system resolver and the segment/record layouts are created on first
//! use and live for the rest of the process.

use std::sync::{Arc, OnceLock};

use crate::config::{EMPTY_SCHEMA_ID, RECORD_SCHEMA_ID, SEGMENT_SCHEMA_ID, SYSTEM_NAMESPACE};
use crate::layout::resolver::{LayoutResolver, NamespaceResolver};
use crate::layout::Layout;
use crate::schema::{Namespace, PrimitiveKind, Property, PropertyType, Schema};

pub const SEGMENT_LENGTH: &str = "length";
pub const SEGMENT_COMMENT: &str = "comment";
pub const SEGMENT_SDL: &str = "sdl";
pub const RECORD_LENGTH: &str = "length";
pub const RECORD_CRC32: &str = "crc32";

static SYSTEM_RESOLVER: OnceLock<Arc<NamespaceResolver>> = OnceLock::new();
static SEGMENT_LAYOUT: OnceLock<Arc<Layout>> = OnceLock::new();
static RECORD_LAYOUT: OnceLock<Arc<Layout>> = OnceLock::new();

pub fn namespace() -> Namespace {
    let fixed = |kind| PropertyType::primitive(kind).fixed().non_nullable();
    let sparse_utf8 = || PropertyType::primitive(PrimitiveKind::Utf8);

    Namespace::new(SYSTEM_NAMESPACE)
        .with_schema(
            Schema::new("Segment", SEGMENT_SCHEMA_ID)
                .with_property(Property::new(SEGMENT_LENGTH, fixed(PrimitiveKind::Int32)))
                .with_property(Property::new(SEGMENT_COMMENT, sparse_utf8()))
                .with_property(Property::new(SEGMENT_SDL, sparse_utf8())),
        )
        .with_schema(
            Schema::new("Record", RECORD_SCHEMA_ID)
                .with_property(Property::new(RECORD_LENGTH, fixed(PrimitiveKind::Int32)))
                .with_property(Property::new(RECORD_CRC32, fixed(PrimitiveKind::UInt32))),
        )
        .with_schema(Schema::new("Empty", EMPTY_SCHEMA_ID))
}

/// Resolver over the built-in namespace. It has no parent.
pub fn resolver() -> Arc<NamespaceResolver> {
    Arc::clone(SYSTEM_RESOLVER.get_or_init(|| Arc::new(NamespaceResolver::system(namespace()))))
}

pub fn segment_layout() -> Arc<Layout> {
    Arc::clone(SEGMENT_LAYOUT.get_or_init(|| resolver().resolve(SEGMENT_SCHEMA_ID)))
}

pub fn record_layout() -> Arc<Layout> {
    Arc::clone(RECORD_LAYOUT.get_or_init(|| resolver().resolve(RECORD_SCHEMA_ID)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ColumnSlot;

    #[test]
    fn segment_length_is_first_fixed_column() {
        let layout = segment_layout();
        let length = layout.find(SEGMENT_LENGTH).unwrap();
        assert_eq!(length.slot(), ColumnSlot::Fixed { offset: 0, size: 4 });
        assert_eq!(length.null_bit(), None);
        assert_eq!(layout.num_bitmask_bytes(), 0);
        assert_eq!(layout.size(), 4);
    }

    #[test]
    fn record_layout_is_eight_fixed_bytes() {
        let layout = record_layout();
        assert_eq!(layout.size(), 8);
        assert_eq!(layout.num_fixed(), 2);
        assert_eq!(layout.find(RECORD_CRC32).unwrap().offset(), Some(4));
    }

    #[test]
    fn empty_schema_resolves() {
        let layout = resolver().resolve(EMPTY_SCHEMA_ID);
        assert!(layout.columns().is_empty());
        assert_eq!(layout.size(), 0);
    }

    #[test]
    fn system_layouts_are_shared() {
        assert!(Arc::ptr_eq(&segment_layout(), &segment_layout()));
        assert!(Arc::ptr_eq(
            &record_layout(),
            &resolver().resolve(RECORD_SCHEMA_ID)
        ));
    }
}
