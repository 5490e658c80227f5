//! Property declarations and their logical types.

use serde::{Deserialize, Serialize};

use super::SchemaId;

fn default_nullable() -> bool {
    true
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Where a column's bytes live inside a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Self-describing entry in the sparse region; presence is implied by existence.
    #[default]
    Sparse,
    /// Constant offset in the fixed region.
    Fixed,
    /// Length-prefixed in the variable region; presence tracked in the bitmask.
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Null,
    Boolean,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    VarInt,
    VarUInt,
    Float32,
    Float64,
    DateTime,
    UnixDateTime,
    Guid,
    MongoDbObjectId,
    Utf8,
    Binary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub path: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
}

impl Property {
    pub fn new(path: impl Into<String>, property_type: PropertyType) -> Self {
        Self {
            path: path.into(),
            property_type,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Logical type of a property.
///
/// Scope-producing variants (object, array, set, map, tuple, tagged, udt)
/// nest other values. `Nullable` is only meaningful as an item wrapper and
/// `Any` only as an array item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PropertyType {
    Primitive {
        #[serde(rename = "type")]
        primitive: PrimitiveKind,
        #[serde(default)]
        storage: StorageKind,
        #[serde(default)]
        length: u32,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Object {
        #[serde(default)]
        properties: Vec<Property>,
        #[serde(default, skip_serializing_if = "is_false")]
        immutable: bool,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Array {
        #[serde(default)]
        items: Option<Box<PropertyType>>,
        #[serde(default, skip_serializing_if = "is_false")]
        immutable: bool,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Set {
        #[serde(default)]
        items: Option<Box<PropertyType>>,
        #[serde(default, skip_serializing_if = "is_false")]
        immutable: bool,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Map {
        #[serde(default)]
        keys: Option<Box<PropertyType>>,
        #[serde(default)]
        values: Option<Box<PropertyType>>,
        #[serde(default, skip_serializing_if = "is_false")]
        immutable: bool,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Tuple {
        #[serde(default)]
        items: Vec<PropertyType>,
        #[serde(default, skip_serializing_if = "is_false")]
        immutable: bool,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Tagged {
        #[serde(default)]
        items: Vec<PropertyType>,
        #[serde(default, skip_serializing_if = "is_false")]
        immutable: bool,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Udt {
        name: String,
        #[serde(default)]
        schema_id: Option<SchemaId>,
        #[serde(default, skip_serializing_if = "is_false")]
        immutable: bool,
        #[serde(default = "default_nullable")]
        nullable: bool,
    },
    Nullable {
        item: Box<PropertyType>,
    },
    Any,
}

impl PropertyType {
    pub fn primitive(primitive: PrimitiveKind) -> Self {
        Self::Primitive {
            primitive,
            storage: StorageKind::Sparse,
            length: 0,
            nullable: true,
        }
    }

    pub fn object(properties: Vec<Property>) -> Self {
        Self::Object {
            properties,
            immutable: false,
            nullable: true,
        }
    }

    pub fn array(items: PropertyType) -> Self {
        Self::Array {
            items: Some(Box::new(items)),
            immutable: false,
            nullable: true,
        }
    }

    pub fn untyped_array() -> Self {
        Self::Array {
            items: None,
            immutable: false,
            nullable: true,
        }
    }

    pub fn set(items: PropertyType) -> Self {
        Self::Set {
            items: Some(Box::new(items)),
            immutable: false,
            nullable: true,
        }
    }

    pub fn map(keys: PropertyType, values: PropertyType) -> Self {
        Self::Map {
            keys: Some(Box::new(keys)),
            values: Some(Box::new(values)),
            immutable: false,
            nullable: true,
        }
    }

    pub fn tuple(items: Vec<PropertyType>) -> Self {
        Self::Tuple {
            items,
            immutable: false,
            nullable: true,
        }
    }

    pub fn tagged(items: Vec<PropertyType>) -> Self {
        Self::Tagged {
            items,
            immutable: false,
            nullable: true,
        }
    }

    pub fn udt(name: impl Into<String>) -> Self {
        Self::Udt {
            name: name.into(),
            schema_id: None,
            immutable: false,
            nullable: true,
        }
    }

    pub fn udt_with_id(name: impl Into<String>, schema_id: SchemaId) -> Self {
        Self::Udt {
            name: name.into(),
            schema_id: Some(schema_id),
            immutable: false,
            nullable: true,
        }
    }

    pub fn nullable_of(item: PropertyType) -> Self {
        Self::Nullable {
            item: Box::new(item),
        }
    }

    pub fn fixed(self) -> Self {
        self.with_storage(StorageKind::Fixed)
    }

    pub fn variable(self) -> Self {
        self.with_storage(StorageKind::Variable)
    }

    pub fn sparse(self) -> Self {
        self.with_storage(StorageKind::Sparse)
    }

    /// Sets the storage class of a primitive; other kinds are returned unchanged.
    pub fn with_storage(mut self, kind: StorageKind) -> Self {
        if let Self::Primitive { storage, .. } = &mut self {
            *storage = kind;
        }
        self
    }

    /// Sets the declared byte length of a primitive (fixed utf8/binary, variable caps).
    pub fn with_length(mut self, len: u32) -> Self {
        if let Self::Primitive { length, .. } = &mut self {
            *length = len;
        }
        self
    }

    pub fn non_nullable(self) -> Self {
        self.with_nullable(false)
    }

    pub fn with_nullable(mut self, value: bool) -> Self {
        match &mut self {
            Self::Primitive { nullable, .. }
            | Self::Object { nullable, .. }
            | Self::Array { nullable, .. }
            | Self::Set { nullable, .. }
            | Self::Map { nullable, .. }
            | Self::Tuple { nullable, .. }
            | Self::Tagged { nullable, .. }
            | Self::Udt { nullable, .. } => *nullable = value,
            Self::Nullable { .. } | Self::Any => {}
        }
        self
    }

    pub fn immutable(mut self) -> Self {
        match &mut self {
            Self::Object { immutable, .. }
            | Self::Array { immutable, .. }
            | Self::Set { immutable, .. }
            | Self::Map { immutable, .. }
            | Self::Tuple { immutable, .. }
            | Self::Tagged { immutable, .. }
            | Self::Udt { immutable, .. } => *immutable = true,
            Self::Primitive { .. } | Self::Nullable { .. } | Self::Any => {}
        }
        self
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Primitive { nullable, .. }
            | Self::Object { nullable, .. }
            | Self::Array { nullable, .. }
            | Self::Set { nullable, .. }
            | Self::Map { nullable, .. }
            | Self::Tuple { nullable, .. }
            | Self::Tagged { nullable, .. }
            | Self::Udt { nullable, .. } => *nullable,
            Self::Nullable { .. } | Self::Any => true,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}
