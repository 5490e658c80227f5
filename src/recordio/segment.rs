//! Segment and record frame models.
//!
//! Both are rows of a built-in schema (see `layout::system`). A segment
//! carries its own total frame length; a record carries the length and
//! CRC-32 of the opaque body that follows it.

use eyre::{Result, WrapErr};

use crate::encoding::crc32;
use crate::layout::system::{
    RECORD_CRC32, RECORD_LENGTH, SEGMENT_COMMENT, SEGMENT_LENGTH, SEGMENT_SDL,
};
use crate::row::{RowBuffer, RowReader, Value};
use crate::schema::Namespace;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    /// Total bytes of the segment frame, header included. Set when formatting.
    pub length: i32,
    pub comment: Option<String>,
    /// Namespace describing the records that follow.
    pub schema: Option<Namespace>,
}

impl Segment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_schema(mut self, schema: Namespace) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Writes comment and schema. The length is left to the caller, who
    /// knows the final frame size.
    pub(crate) fn write_body(&self, row: &mut RowBuffer) -> Result<()> {
        if let Some(comment) = &self.comment {
            row.write(SEGMENT_COMMENT, &Value::utf8(comment))?;
        }
        if let Some(schema) = &self.schema {
            let sdl = schema.to_json().wrap_err("failed to serialize segment schema")?;
            row.write(SEGMENT_SDL, &Value::from(sdl))?;
        }
        Ok(())
    }

    /// Reads only the length field; works on a fixed-size prefix.
    pub fn read_length(row: &RowReader<'_>) -> Result<i32> {
        match row.read(SEGMENT_LENGTH)? {
            Value::Int32(length) => Ok(length),
            other => eyre::bail!("segment length has unexpected value {:?}", other),
        }
    }

    pub fn from_row(row: &RowReader<'_>) -> Result<Self> {
        let length = Self::read_length(row)?;
        let comment = match row.read(SEGMENT_COMMENT)? {
            Value::Utf8(text) => Some(text.into_owned()),
            Value::Null => None,
            other => eyre::bail!("segment comment has unexpected value {:?}", other),
        };
        let schema = match row.read(SEGMENT_SDL)? {
            Value::Utf8(text) => {
                Some(Namespace::from_json(&text).wrap_err("invalid segment schema")?)
            }
            Value::Null => None,
            other => eyre::bail!("segment schema has unexpected value {:?}", other),
        };
        Ok(Self {
            length,
            comment,
            schema,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Record {
    /// Byte count of the body following the record header.
    pub length: i32,
    pub crc32: u32,
}

impl Record {
    pub fn for_body(body: &[u8]) -> Result<Self> {
        let length = i32::try_from(body.len())
            .map_err(|_| eyre::eyre!("record body of {} bytes is too large", body.len()))?;
        Ok(Self {
            length,
            crc32: crc32(0, body),
        })
    }

    pub(crate) fn write_row(&self, row: &mut RowBuffer) -> Result<()> {
        row.write(RECORD_LENGTH, &Value::Int32(self.length))?;
        row.write(RECORD_CRC32, &Value::UInt32(self.crc32))?;
        Ok(())
    }

    pub fn from_row(row: &RowReader<'_>) -> Result<Self> {
        let length = match row.read(RECORD_LENGTH)? {
            Value::Int32(length) => length,
            other => eyre::bail!("record length has unexpected value {:?}", other),
        };
        let crc32 = match row.read(RECORD_CRC32)? {
            Value::UInt32(crc) => crc,
            other => eyre::bail!("record crc32 has unexpected value {:?}", other),
        };
        Ok(Self { length, crc32 })
    }
}
