//! # Logical Schema Model
//!
//! The logical side of a row format: a [`Namespace`] holds [`Schema`]s, a
//! schema holds named [`Property`] declarations, and each property has a
//! [`PropertyType`]. This model says *what* a row contains; the layout
//! compiler turns it into *where* every field lives.
//!
//! ## Hierarchy
//!
//! ```text
//! Namespace "app"
//! ├── Schema "Person" (id 1)
//! │   ├── Property "id"      int32, fixed
//! │   ├── Property "name"    utf8, variable
//! │   └── Property "address" object (sparse scope)
//! │       └── Property "city"  utf8, sparse
//! └── Schema "Address" (id 2)
//!     └── ...
//! ```
//!
//! ## Serialization
//!
//! Every type derives serde traits so a namespace can travel inside a stream
//! segment as JSON:
//!
//! ```json
//! { "name": "app", "schemas": [ { "name": "Person", "id": 1, "properties": [
//!   { "path": "id", "type": { "kind": "primitive", "type": "int32", "storage": "fixed" } }
//! ] } ] }
//! ```
//!
//! ## Defaults
//!
//! - Properties are nullable unless declared otherwise.
//! - Primitive storage defaults to sparse.

mod property;

pub use property::{PrimitiveKind, Property, PropertyType, StorageKind};

use serde::{Deserialize, Serialize};

pub type SchemaId = i32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub schemas: Vec<Schema>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn add_schema(&mut self, schema: Schema) {
        self.schemas.push(schema);
    }

    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    pub fn find_by_id(&self, id: SchemaId) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.id == id)
    }

    pub fn find_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Schema> + 'a {
        self.schemas.iter().filter(move |s| s.name == name)
    }

    pub fn to_json(&self) -> eyre::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> eyre::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub id: SchemaId,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Schema {
    pub fn new(name: impl Into<String>, id: SchemaId) -> Self {
        Self {
            name: name.into(),
            id,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Namespace {
        Namespace::new("app")
            .with_schema(
                Schema::new("Person", 1)
                    .with_property(Property::new(
                        "id",
                        PropertyType::primitive(PrimitiveKind::Int32).fixed().non_nullable(),
                    ))
                    .with_property(Property::new(
                        "tags",
                        PropertyType::array(PropertyType::primitive(PrimitiveKind::Utf8)),
                    )),
            )
            .with_schema(Schema::new("Address", 2))
    }

    #[test]
    fn namespace_finds_schemas_by_id_and_name() {
        let ns = sample();
        assert_eq!(ns.find_by_id(2).map(Schema::name), Some("Address"));
        assert!(ns.find_by_id(3).is_none());
        assert_eq!(ns.find_by_name("Person").count(), 1);
    }

    #[test]
    fn namespace_survives_json() {
        let ns = sample();
        let text = ns.to_json().unwrap();
        assert!(text.contains("\"kind\":\"primitive\""));
        assert_eq!(Namespace::from_json(&text).unwrap(), ns);
    }

    #[test]
    fn json_defaults_apply() {
        let text = r#"{ "name": "n", "schemas": [ { "name": "S", "id": 5, "properties": [
            { "path": "a", "type": { "kind": "primitive", "type": "int64" } }
        ] } ] }"#;
        let ns = Namespace::from_json(text).unwrap();
        let ty = &ns.schemas[0].properties[0].property_type;
        assert!(ty.is_nullable());
        assert!(matches!(
            ty,
            PropertyType::Primitive { storage: StorageKind::Sparse, length: 0, .. }
        ));
    }
}
