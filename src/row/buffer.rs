//! # RowBuffer - Row Construction
//!
//! Builds an encoded row against a [`Layout`]. Values are written by path in
//! any order; `write_to` lays them out in wire order.
//!
//! ## Usage
//!
//! ```ignore
//! let mut row = RowBuffer::new(layout);
//! row.write("x", &Value::Int32(5))?;
//! row.write("note", &Value::utf8("hi"))?;
//! let bytes = row.into_bytes();
//!
//! // Reuse for the next row
//! row.reset();
//! ```
//!
//! ## Null Handling
//!
//! Writing [`Value::Null`] removes a value. For a column of type `null` it
//! instead marks the column present; use [`RowBuffer::delete`] to clear it.

use std::sync::Arc;

use eyre::Result;
use zerocopy::IntoBytes;

use crate::config::ROW_HEADER_SIZE;
use crate::encoding::varint::{put_varint, varint_len};
use crate::layout::{ColumnSlot, Layout, LayoutBit, LayoutColumn};
use crate::recordio::header::RowHeader;
use crate::row::reader::{bit_is_set, ensure_readable, read_fixed};
use crate::row::value::{decode_payload, encode_payload, write_scalar, Value};

#[derive(Debug, Clone)]
pub struct RowBuffer {
    layout: Arc<Layout>,
    bitmask: Vec<u8>,
    fixed: Vec<u8>,
    payloads: Vec<Option<Vec<u8>>>,
}

impl RowBuffer {
    pub fn new(layout: Arc<Layout>) -> Self {
        let bitmask = vec![0u8; layout.num_bitmask_bytes()];
        let fixed = vec![0u8; layout.fixed_size()];
        let payloads = vec![None; layout.columns().len()];
        Self {
            layout,
            bitmask,
            fixed,
            payloads,
        }
    }

    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    pub fn reset(&mut self) {
        self.bitmask.fill(0);
        self.fixed.fill(0);
        for payload in &mut self.payloads {
            *payload = None;
        }
    }

    fn column(&self, path: &str) -> Result<LayoutColumn> {
        self.layout.find(path).cloned().ok_or_else(|| {
            eyre::eyre!("column '{}' not found in layout '{}'", path, self.layout.name())
        })
    }

    fn set_bit(&mut self, bit: LayoutBit, on: bool) {
        if on {
            self.bitmask[bit.byte()] |= bit.mask();
        } else {
            self.bitmask[bit.byte()] &= !bit.mask();
        }
    }

    pub fn write(&mut self, path: &str, value: &Value<'_>) -> Result<()> {
        let layout = Arc::clone(&self.layout);
        let column = layout.find(path).ok_or_else(|| {
            eyre::eyre!("column '{}' not found in layout '{}'", path, layout.name())
        })?;
        eyre::ensure!(
            !column.code().is_scope(),
            "column '{}' is a {} scope and cannot be written as a value",
            path,
            column.code()
        );

        if value.is_null() && !column.code().is_null() {
            return self.clear(column);
        }
        eyre::ensure!(
            value.code() == column.code(),
            "type mismatch for column '{}': expected {}, found {}",
            path,
            column.code(),
            value.code()
        );

        match column.slot() {
            ColumnSlot::Fixed { offset, size } => self.write_fixed(column, offset, size, value),
            ColumnSlot::Variable { .. } => {
                let len = match value {
                    Value::Utf8(text) => text.len(),
                    Value::Binary(bytes) => bytes.len(),
                    _ => 0,
                };
                let max = column.max_length() as usize;
                eyre::ensure!(
                    max == 0 || len <= max,
                    "value for column '{}' is {} bytes, limit is {}",
                    path,
                    len,
                    max
                );
                let mut payload = Vec::with_capacity(len + varint_len(len as u64));
                encode_payload(value, &mut payload)?;
                if let Some(bit) = column.null_bit() {
                    self.set_bit(bit, true);
                }
                self.payloads[column.index()] = Some(payload);
                Ok(())
            }
            ColumnSlot::Sparse => {
                let mut payload = Vec::new();
                encode_payload(value, &mut payload)?;
                self.payloads[column.index()] = Some(payload);
                Ok(())
            }
        }
    }

    fn write_fixed(
        &mut self,
        column: &LayoutColumn,
        offset: usize,
        size: usize,
        value: &Value<'_>,
    ) -> Result<()> {
        let range = offset..offset + size;
        match value {
            Value::Null => {}
            Value::Bool(on) => {
                let bit = column.bool_bit().ok_or_else(|| {
                    eyre::eyre!("boolean column '{}' has no value bit", column.full_path())
                })?;
                self.set_bit(bit, *on);
            }
            Value::Utf8(text) => {
                eyre::ensure!(
                    text.len() <= size,
                    "value for column '{}' is {} bytes, fixed length is {}",
                    column.full_path(),
                    text.len(),
                    size
                );
                let slot = &mut self.fixed[range];
                slot[..text.len()].copy_from_slice(text.as_bytes());
                slot[text.len()..].fill(0);
            }
            Value::Binary(bytes) => {
                eyre::ensure!(
                    bytes.len() == size,
                    "value for column '{}' is {} bytes, fixed length is {}",
                    column.full_path(),
                    bytes.len(),
                    size
                );
                self.fixed[range].copy_from_slice(bytes);
            }
            scalar => write_scalar(scalar, &mut self.fixed[range])?,
        }
        if let Some(bit) = column.null_bit() {
            self.set_bit(bit, true);
        }
        Ok(())
    }

    fn clear(&mut self, column: &LayoutColumn) -> Result<()> {
        match column.slot() {
            ColumnSlot::Fixed { offset, size } => {
                let bit = column.null_bit().ok_or_else(|| {
                    eyre::eyre!("column '{}' is not nullable", column.full_path())
                })?;
                self.set_bit(bit, false);
                if let Some(value_bit) = column.bool_bit() {
                    self.set_bit(value_bit, false);
                }
                self.fixed[offset..offset + size].fill(0);
            }
            ColumnSlot::Variable { .. } => {
                if let Some(bit) = column.null_bit() {
                    self.set_bit(bit, false);
                }
                self.payloads[column.index()] = None;
            }
            ColumnSlot::Sparse => self.payloads[column.index()] = None,
        }
        Ok(())
    }

    /// Removes the value of `path`, including the presence of `null` columns.
    pub fn delete(&mut self, path: &str) -> Result<()> {
        let column = self.column(path)?;
        self.clear(&column)
    }

    pub fn is_present(&self, path: &str) -> Result<bool> {
        let column = self.column(path)?;
        Ok(match column.slot() {
            ColumnSlot::Fixed { .. } | ColumnSlot::Variable { .. } => {
                bit_is_set(&self.bitmask, column.null_bit())
            }
            ColumnSlot::Sparse => self.payloads[column.index()].is_some(),
        })
    }

    pub fn read(&self, path: &str) -> Result<Value<'_>> {
        let column = self.layout.find(path).ok_or_else(|| {
            eyre::eyre!("column '{}' not found in layout '{}'", path, self.layout.name())
        })?;
        ensure_readable(column)?;
        match column.slot() {
            ColumnSlot::Fixed { .. } => read_fixed(column, &self.bitmask, &self.fixed),
            ColumnSlot::Variable { .. } | ColumnSlot::Sparse => {
                match &self.payloads[column.index()] {
                    Some(payload) => Ok(decode_payload(column.code(), payload)?.0),
                    None => Ok(Value::Null),
                }
            }
        }
    }

    /// Exact number of bytes `write_to` appends.
    pub fn encoded_len(&self) -> usize {
        let mut len = ROW_HEADER_SIZE + self.bitmask.len() + self.fixed.len();
        for column in self.layout.columns() {
            if let Some(payload) = &self.payloads[column.index()] {
                len += payload.len();
                if column.slot() == ColumnSlot::Sparse {
                    len += varint_len(column.token()) + 1;
                }
            }
        }
        len
    }

    pub fn write_to(&self, out: &mut Vec<u8>) {
        out.reserve(self.encoded_len());
        out.extend_from_slice(RowHeader::new(self.layout.schema_id()).as_bytes());
        out.extend_from_slice(&self.bitmask);
        out.extend_from_slice(&self.fixed);

        for column in self.layout.variable_columns() {
            if let Some(payload) = &self.payloads[column.index()] {
                out.extend_from_slice(payload);
            }
        }
        for column in self.layout.columns() {
            if column.slot() != ColumnSlot::Sparse {
                continue;
            }
            if let Some(payload) = &self.payloads[column.index()] {
                put_varint(out, column.token());
                out.push(column.code() as u8);
                out.extend_from_slice(payload);
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        self.write_to(&mut out);
        out
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.to_bytes()
    }
}
