//! Column values and their byte encodings.
//!
//! Scalars are little-endian. Payloads in the variable and sparse regions are
//! self-delimiting:
//!
//! | Code | Payload |
//! |------|---------|
//! | null | nothing |
//! | bool | 1 byte (sparse only; fixed booleans live in the bitmask) |
//! | int/uint/float/datetime/guid/objectid | fixed-width little-endian bytes |
//! | varint | zigzag varint |
//! | varuint | varint |
//! | utf8/binary | varint length, then bytes |

use std::borrow::Cow;

use eyre::Result;

use crate::encoding::varint::{decode_varint, put_varint, zigzag_decode, zigzag_encode};
use crate::layout::LayoutCode;

#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    VarInt(i64),
    VarUInt(u64),
    Float32(f32),
    Float64(f64),
    /// 100-nanosecond ticks.
    DateTime(i64),
    /// Milliseconds since the Unix epoch.
    UnixDateTime(i64),
    Guid([u8; 16]),
    MongoDbObjectId([u8; 12]),
    Utf8(Cow<'a, str>),
    Binary(Cow<'a, [u8]>),
}

impl<'a> Value<'a> {
    pub fn code(&self) -> LayoutCode {
        match self {
            Value::Null => LayoutCode::Null,
            Value::Bool(_) => LayoutCode::Boolean,
            Value::Int8(_) => LayoutCode::Int8,
            Value::Int16(_) => LayoutCode::Int16,
            Value::Int32(_) => LayoutCode::Int32,
            Value::Int64(_) => LayoutCode::Int64,
            Value::UInt8(_) => LayoutCode::UInt8,
            Value::UInt16(_) => LayoutCode::UInt16,
            Value::UInt32(_) => LayoutCode::UInt32,
            Value::UInt64(_) => LayoutCode::UInt64,
            Value::VarInt(_) => LayoutCode::VarInt,
            Value::VarUInt(_) => LayoutCode::VarUInt,
            Value::Float32(_) => LayoutCode::Float32,
            Value::Float64(_) => LayoutCode::Float64,
            Value::DateTime(_) => LayoutCode::DateTime,
            Value::UnixDateTime(_) => LayoutCode::UnixDateTime,
            Value::Guid(_) => LayoutCode::Guid,
            Value::MongoDbObjectId(_) => LayoutCode::MongoDbObjectId,
            Value::Utf8(_) => LayoutCode::Utf8,
            Value::Binary(_) => LayoutCode::Binary,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn utf8(text: &'a str) -> Self {
        Value::Utf8(Cow::Borrowed(text))
    }

    pub fn binary(bytes: &'a [u8]) -> Self {
        Value::Binary(Cow::Borrowed(bytes))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(text) => Some(text.as_ref()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(bytes) => Some(bytes.as_ref()),
            _ => None,
        }
    }

    /// Widens any integer value to `i64`, if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int8(v) => Some(v.into()),
            Value::Int16(v) => Some(v.into()),
            Value::Int32(v) => Some(v.into()),
            Value::Int64(v) | Value::VarInt(v) => Some(v),
            Value::UInt8(v) => Some(v.into()),
            Value::UInt16(v) => Some(v.into()),
            Value::UInt32(v) => Some(v.into()),
            Value::UInt64(v) | Value::VarUInt(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Utf8(text) => Value::Utf8(Cow::Owned(text.into_owned())),
            Value::Binary(bytes) => Value::Binary(Cow::Owned(bytes.into_owned())),
            Value::Null => Value::Null,
            Value::Bool(v) => Value::Bool(v),
            Value::Int8(v) => Value::Int8(v),
            Value::Int16(v) => Value::Int16(v),
            Value::Int32(v) => Value::Int32(v),
            Value::Int64(v) => Value::Int64(v),
            Value::UInt8(v) => Value::UInt8(v),
            Value::UInt16(v) => Value::UInt16(v),
            Value::UInt32(v) => Value::UInt32(v),
            Value::UInt64(v) => Value::UInt64(v),
            Value::VarInt(v) => Value::VarInt(v),
            Value::VarUInt(v) => Value::VarUInt(v),
            Value::Float32(v) => Value::Float32(v),
            Value::Float64(v) => Value::Float64(v),
            Value::DateTime(v) => Value::DateTime(v),
            Value::UnixDateTime(v) => Value::UnixDateTime(v),
            Value::Guid(v) => Value::Guid(v),
            Value::MongoDbObjectId(v) => Value::MongoDbObjectId(v),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(text: &'a str) -> Self {
        Value::utf8(text)
    }
}

impl From<String> for Value<'static> {
    fn from(text: String) -> Self {
        Value::Utf8(Cow::Owned(text))
    }
}

impl From<bool> for Value<'static> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value<'static> {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value<'static> {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<u32> for Value<'static> {
    fn from(v: u32) -> Self {
        Value::UInt32(v)
    }
}

/// Writes a fixed-width scalar into `dst`, which must be exactly its width.
pub(crate) fn write_scalar(value: &Value<'_>, dst: &mut [u8]) -> Result<()> {
    match value {
        Value::Int8(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Int16(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Int32(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Int64(v) | Value::DateTime(v) | Value::UnixDateTime(v) => {
            dst.copy_from_slice(&v.to_le_bytes())
        }
        Value::UInt8(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::UInt16(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::UInt32(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::UInt64(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Float32(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Float64(v) => dst.copy_from_slice(&v.to_le_bytes()),
        Value::Guid(v) => dst.copy_from_slice(v),
        Value::MongoDbObjectId(v) => dst.copy_from_slice(v),
        other => eyre::bail!("{} is not a fixed-width scalar", other.code()),
    }
    Ok(())
}

fn array<const N: usize>(src: &[u8], code: LayoutCode) -> Result<[u8; N]> {
    src.get(..N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| {
            eyre::eyre!(
                "insufficient data for {}: need {} bytes, have {}",
                code,
                N,
                src.len()
            )
        })
}

/// Reads a fixed-width scalar of type `code` from the start of `src`.
pub(crate) fn read_scalar(code: LayoutCode, src: &[u8]) -> Result<Value<'static>> {
    let value = match code {
        LayoutCode::Int8 => Value::Int8(i8::from_le_bytes(array(src, code)?)),
        LayoutCode::Int16 => Value::Int16(i16::from_le_bytes(array(src, code)?)),
        LayoutCode::Int32 => Value::Int32(i32::from_le_bytes(array(src, code)?)),
        LayoutCode::Int64 => Value::Int64(i64::from_le_bytes(array(src, code)?)),
        LayoutCode::UInt8 => Value::UInt8(u8::from_le_bytes(array(src, code)?)),
        LayoutCode::UInt16 => Value::UInt16(u16::from_le_bytes(array(src, code)?)),
        LayoutCode::UInt32 => Value::UInt32(u32::from_le_bytes(array(src, code)?)),
        LayoutCode::UInt64 => Value::UInt64(u64::from_le_bytes(array(src, code)?)),
        LayoutCode::Float32 => Value::Float32(f32::from_le_bytes(array(src, code)?)),
        LayoutCode::Float64 => Value::Float64(f64::from_le_bytes(array(src, code)?)),
        LayoutCode::DateTime => Value::DateTime(i64::from_le_bytes(array(src, code)?)),
        LayoutCode::UnixDateTime => Value::UnixDateTime(i64::from_le_bytes(array(src, code)?)),
        LayoutCode::Guid => Value::Guid(array(src, code)?),
        LayoutCode::MongoDbObjectId => Value::MongoDbObjectId(array(src, code)?),
        other => eyre::bail!("{} is not a fixed-width scalar", other),
    };
    Ok(value)
}

/// Appends the self-delimiting payload of `value`.
pub(crate) fn encode_payload(value: &Value<'_>, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Null => {}
        Value::Bool(v) => out.push(u8::from(*v)),
        Value::VarInt(v) => {
            put_varint(out, zigzag_encode(*v));
        }
        Value::VarUInt(v) => {
            put_varint(out, *v);
        }
        Value::Utf8(text) => {
            put_varint(out, text.len() as u64);
            out.extend_from_slice(text.as_bytes());
        }
        Value::Binary(bytes) => {
            put_varint(out, bytes.len() as u64);
            out.extend_from_slice(bytes);
        }
        scalar => {
            let start = out.len();
            let width = scalar.code().fixed_size().unwrap_or(0);
            out.resize(start + width, 0);
            write_scalar(scalar, &mut out[start..])?;
        }
    }
    Ok(())
}

fn length_prefixed(src: &[u8], code: LayoutCode) -> Result<(&[u8], usize)> {
    let (len, prefix) = decode_varint(src)?;
    let len = usize::try_from(len).map_err(|_| eyre::eyre!("{} length {} overflows", code, len))?;
    let end = prefix
        .checked_add(len)
        .filter(|&end| end <= src.len())
        .ok_or_else(|| {
            eyre::eyre!(
                "truncated {} payload: need {} bytes, have {}",
                code,
                len,
                src.len() - prefix
            )
        })?;
    Ok((&src[prefix..end], end))
}

/// Decodes a payload written by [`encode_payload`], returning the value and
/// the number of bytes it occupied.
pub(crate) fn decode_payload(code: LayoutCode, src: &[u8]) -> Result<(Value<'_>, usize)> {
    match code {
        LayoutCode::Null => Ok((Value::Null, 0)),
        LayoutCode::Boolean => {
            let byte = *src
                .first()
                .ok_or_else(|| eyre::eyre!("insufficient data for bool"))?;
            eyre::ensure!(byte <= 1, "invalid bool byte {:#04x}", byte);
            Ok((Value::Bool(byte == 1), 1))
        }
        LayoutCode::VarInt => {
            let (raw, used) = decode_varint(src)?;
            Ok((Value::VarInt(zigzag_decode(raw)), used))
        }
        LayoutCode::VarUInt => {
            let (raw, used) = decode_varint(src)?;
            Ok((Value::VarUInt(raw), used))
        }
        LayoutCode::Utf8 => {
            let (bytes, used) = length_prefixed(src, code)?;
            let text = std::str::from_utf8(bytes)
                .map_err(|e| eyre::eyre!("invalid utf8 payload: {}", e))?;
            Ok((Value::Utf8(Cow::Borrowed(text)), used))
        }
        LayoutCode::Binary => {
            let (bytes, used) = length_prefixed(src, code)?;
            Ok((Value::Binary(Cow::Borrowed(bytes)), used))
        }
        scalar => {
            let width = scalar
                .fixed_size()
                .ok_or_else(|| eyre::eyre!("{} has no value payload", scalar))?;
            Ok((read_scalar(scalar, src)?, width))
        }
    }
}
