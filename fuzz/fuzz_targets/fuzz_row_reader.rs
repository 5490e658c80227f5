//! Fuzz testing for the row reader.
//!
//! Reads every column of a fixed layout out of arbitrary bytes. Malformed
//! rows must surface as errors, never as panics.

#![no_main]

use std::sync::{Arc, OnceLock};

use libfuzzer_sys::fuzz_target;

use turrow::layout::{Layout, LayoutCompiler};
use turrow::row::RowReader;
use turrow::schema::{Namespace, PrimitiveKind, Property, PropertyType, Schema};

fn layout() -> &'static Arc<Layout> {
    static LAYOUT: OnceLock<Arc<Layout>> = OnceLock::new();
    LAYOUT.get_or_init(|| {
        let prim = PropertyType::primitive;
        let schema = Schema::new("Fuzz", 1)
            .with_property(Property::new("a", prim(PrimitiveKind::Int32).fixed()))
            .with_property(Property::new("b", prim(PrimitiveKind::Boolean).fixed()))
            .with_property(Property::new("c", prim(PrimitiveKind::Utf8).fixed().with_length(4)))
            .with_property(Property::new("d", prim(PrimitiveKind::Utf8).variable()))
            .with_property(Property::new("e", prim(PrimitiveKind::VarInt).variable()))
            .with_property(Property::new("f", prim(PrimitiveKind::Binary)))
            .with_property(Property::new("g", prim(PrimitiveKind::Float64)))
            .with_property(Property::new(
                "h",
                PropertyType::object(vec![Property::new("i", prim(PrimitiveKind::Guid))]),
            ));
        let ns = Namespace::new("fuzz").with_schema(schema.clone());
        Arc::new(LayoutCompiler::compile(&ns, &schema).expect("fuzz schema compiles"))
    })
}

fuzz_target!(|data: &[u8]| {
    let layout = layout();
    let Ok(reader) = RowReader::new(data, layout) else {
        return;
    };
    for column in layout.columns() {
        let _ = reader.read(column.full_path());
        let _ = reader.is_present(column.full_path());
    }
    let _ = reader.sparse_entries();
});
