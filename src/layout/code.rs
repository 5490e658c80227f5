//! # Physical Type Codes
//!
//! `LayoutCode` is the physical type of a column or type argument, and also
//! the one-byte type marker written in front of every sparse value.
//!
//! ## Discriminant Values
//!
//! - 1-24: primitives
//! - 30-53: scopes, in mutable/immutable pairs
//! - 68-69: schema (user-defined type / whole row)
//!
//! Every scope code is even; its immutable twin is the same code with the low
//! bit set, so `clear_immutable_bit` is a single mask.

use crate::schema::PrimitiveKind;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LayoutCode {
    Null = 1,
    Boolean = 3,
    Int8 = 5,
    Int16 = 6,
    Int32 = 7,
    Int64 = 8,
    UInt8 = 9,
    UInt16 = 10,
    UInt32 = 11,
    UInt64 = 12,
    VarInt = 13,
    VarUInt = 14,
    Float32 = 15,
    Float64 = 16,
    DateTime = 18,
    Guid = 19,
    Utf8 = 20,
    Binary = 21,
    UnixDateTime = 23,
    MongoDbObjectId = 24,

    ObjectScope = 30,
    ImmutableObjectScope = 31,
    ArrayScope = 32,
    ImmutableArrayScope = 33,
    TypedArrayScope = 34,
    ImmutableTypedArrayScope = 35,
    TypedTupleScope = 38,
    ImmutableTypedTupleScope = 39,
    TypedMapScope = 42,
    ImmutableTypedMapScope = 43,
    TypedSetScope = 46,
    ImmutableTypedSetScope = 47,
    NullableScope = 48,
    ImmutableNullableScope = 49,
    TaggedScope = 50,
    ImmutableTaggedScope = 51,
    Tagged2Scope = 52,
    ImmutableTagged2Scope = 53,

    Schema = 68,
    ImmutableSchema = 69,
}

const IMMUTABLE_BIT: u8 = 0x01;

impl LayoutCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        use LayoutCode::*;
        let decoded = match code {
            1 => Null,
            3 => Boolean,
            5 => Int8,
            6 => Int16,
            7 => Int32,
            8 => Int64,
            9 => UInt8,
            10 => UInt16,
            11 => UInt32,
            12 => UInt64,
            13 => VarInt,
            14 => VarUInt,
            15 => Float32,
            16 => Float64,
            18 => DateTime,
            19 => Guid,
            20 => Utf8,
            21 => Binary,
            23 => UnixDateTime,
            24 => MongoDbObjectId,
            30 => ObjectScope,
            31 => ImmutableObjectScope,
            32 => ArrayScope,
            33 => ImmutableArrayScope,
            34 => TypedArrayScope,
            35 => ImmutableTypedArrayScope,
            38 => TypedTupleScope,
            39 => ImmutableTypedTupleScope,
            42 => TypedMapScope,
            43 => ImmutableTypedMapScope,
            46 => TypedSetScope,
            47 => ImmutableTypedSetScope,
            48 => NullableScope,
            49 => ImmutableNullableScope,
            50 => TaggedScope,
            51 => ImmutableTaggedScope,
            52 => Tagged2Scope,
            53 => ImmutableTagged2Scope,
            68 => Schema,
            69 => ImmutableSchema,
            _ => return None,
        };
        Some(decoded)
    }

    pub fn from_primitive(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Null => Self::Null,
            PrimitiveKind::Boolean => Self::Boolean,
            PrimitiveKind::Int8 => Self::Int8,
            PrimitiveKind::Int16 => Self::Int16,
            PrimitiveKind::Int32 => Self::Int32,
            PrimitiveKind::Int64 => Self::Int64,
            PrimitiveKind::UInt8 => Self::UInt8,
            PrimitiveKind::UInt16 => Self::UInt16,
            PrimitiveKind::UInt32 => Self::UInt32,
            PrimitiveKind::UInt64 => Self::UInt64,
            PrimitiveKind::VarInt => Self::VarInt,
            PrimitiveKind::VarUInt => Self::VarUInt,
            PrimitiveKind::Float32 => Self::Float32,
            PrimitiveKind::Float64 => Self::Float64,
            PrimitiveKind::DateTime => Self::DateTime,
            PrimitiveKind::UnixDateTime => Self::UnixDateTime,
            PrimitiveKind::Guid => Self::Guid,
            PrimitiveKind::MongoDbObjectId => Self::MongoDbObjectId,
            PrimitiveKind::Utf8 => Self::Utf8,
            PrimitiveKind::Binary => Self::Binary,
        }
    }

    /// Selects the immutable twin of a scope code when `immutable` is set.
    pub fn scope(self, immutable: bool) -> Self {
        debug_assert!(self.is_scope());
        if immutable {
            Self::from_u8(self as u8 | IMMUTABLE_BIT).unwrap_or(self)
        } else {
            self
        }
    }

    pub fn clear_immutable_bit(self) -> Self {
        if self.is_scope() {
            Self::from_u8(self as u8 & !IMMUTABLE_BIT).unwrap_or(self)
        } else {
            self
        }
    }

    pub fn is_immutable(self) -> bool {
        self.is_scope() && (self as u8 & IMMUTABLE_BIT) != 0
    }

    pub fn is_scope(self) -> bool {
        self as u8 >= Self::ObjectScope as u8
    }

    pub fn is_null(self) -> bool {
        self == Self::Null
    }

    pub fn is_bool(self) -> bool {
        self == Self::Boolean
    }

    pub fn is_varint(self) -> bool {
        matches!(self, Self::VarInt | Self::VarUInt)
    }

    /// Byte width in the fixed region, or `None` when the width is not
    /// implied by the type. Null and Boolean occupy only bitmask bits.
    pub fn fixed_size(self) -> Option<usize> {
        match self {
            Self::Null | Self::Boolean => Some(0),
            Self::Int8 | Self::UInt8 => Some(1),
            Self::Int16 | Self::UInt16 => Some(2),
            Self::Int32 | Self::UInt32 | Self::Float32 => Some(4),
            Self::Int64
            | Self::UInt64
            | Self::Float64
            | Self::DateTime
            | Self::UnixDateTime => Some(8),
            Self::MongoDbObjectId => Some(12),
            Self::Guid => Some(16),
            _ => None,
        }
    }

    /// Types whose width comes from a declared length when stored fixed.
    pub fn is_length_sized(self) -> bool {
        matches!(self, Self::Utf8 | Self::Binary)
    }

    /// Types allowed in the variable region.
    pub fn is_variable_capable(self) -> bool {
        matches!(self, Self::Utf8 | Self::Binary | Self::VarInt | Self::VarUInt)
    }

    pub fn name(self) -> &'static str {
        match self.clear_immutable_bit() {
            Self::Null => "null",
            Self::Boolean => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::VarInt => "varint",
            Self::VarUInt => "varuint",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::DateTime => "datetime",
            Self::Guid => "guid",
            Self::Utf8 => "utf8",
            Self::Binary => "binary",
            Self::UnixDateTime => "unixdatetime",
            Self::MongoDbObjectId => "mongodbobjectid",
            Self::ObjectScope => "object",
            Self::ArrayScope => "array",
            Self::TypedArrayScope => "array_t",
            Self::TypedTupleScope => "tuple",
            Self::TypedMapScope => "map_t",
            Self::TypedSetScope => "set_t",
            Self::NullableScope => "nullable",
            Self::TaggedScope => "tagged",
            Self::Tagged2Scope => "tagged2",
            Self::Schema => "udt",
            _ => "unknown",
        }
    }
}

impl std::fmt::Display for LayoutCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_immutable() {
            write!(f, "im{}", self.name())
        } else {
            f.write_str(self.name())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_survives_byte_conversion() {
        for raw in 0..=u8::MAX {
            if let Some(code) = LayoutCode::from_u8(raw) {
                assert_eq!(code as u8, raw);
            }
        }
        assert_eq!(LayoutCode::from_u8(0), None);
        assert_eq!(LayoutCode::from_u8(2), None);
        assert_eq!(LayoutCode::from_u8(200), None);
    }

    #[test]
    fn immutable_twins_pair_up() {
        let scopes = [
            LayoutCode::ObjectScope,
            LayoutCode::ArrayScope,
            LayoutCode::TypedArrayScope,
            LayoutCode::TypedTupleScope,
            LayoutCode::TypedMapScope,
            LayoutCode::TypedSetScope,
            LayoutCode::NullableScope,
            LayoutCode::TaggedScope,
            LayoutCode::Tagged2Scope,
            LayoutCode::Schema,
        ];
        for scope in scopes {
            let immutable = scope.scope(true);
            assert_ne!(immutable, scope);
            assert!(immutable.is_immutable());
            assert!(!scope.is_immutable());
            assert_eq!(immutable.clear_immutable_bit(), scope);
            assert_eq!(scope.scope(false), scope);
        }
    }

    #[test]
    fn primitives_are_not_scopes() {
        assert!(!LayoutCode::Int32.is_scope());
        assert!(!LayoutCode::MongoDbObjectId.is_scope());
        assert!(LayoutCode::ObjectScope.is_scope());
        assert_eq!(LayoutCode::Binary.clear_immutable_bit(), LayoutCode::Binary);
        assert!(!LayoutCode::Null.is_immutable());
    }

    #[test]
    fn fixed_sizes() {
        assert_eq!(LayoutCode::Boolean.fixed_size(), Some(0));
        assert_eq!(LayoutCode::Int32.fixed_size(), Some(4));
        assert_eq!(LayoutCode::Guid.fixed_size(), Some(16));
        assert_eq!(LayoutCode::MongoDbObjectId.fixed_size(), Some(12));
        assert_eq!(LayoutCode::Utf8.fixed_size(), None);
        assert_eq!(LayoutCode::VarInt.fixed_size(), None);
        assert_eq!(LayoutCode::ObjectScope.fixed_size(), None);
    }

    #[test]
    fn display_marks_immutable_scopes() {
        assert_eq!(LayoutCode::TypedArrayScope.to_string(), "array_t");
        assert_eq!(LayoutCode::ImmutableTypedArrayScope.to_string(), "imarray_t");
        assert_eq!(LayoutCode::Int64.to_string(), "int64");
    }
}
