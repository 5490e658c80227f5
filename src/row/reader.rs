//! # RowReader - Zero-Copy Row Access
//!
//! Reads values straight out of an encoded row. Strings and byte arrays are
//! returned as borrowed slices of the input.
//!
//! A reader only needs the framing header and the fixed part of the row
//! (`ROW_HEADER_SIZE + layout.size()` bytes) to be constructed. Fixed columns
//! can be read from such a prefix; reading a variable or sparse column then
//! fails with a truncation error instead of reading past the end.

use std::borrow::Cow;

use eyre::{Result, WrapErr};
use smallvec::SmallVec;

use crate::config::ROW_HEADER_SIZE;
use crate::encoding::varint::decode_varint;
use crate::layout::{ColumnSlot, Layout, LayoutBit, LayoutCode, LayoutColumn};
use crate::recordio::header::RowHeader;
use crate::row::value::{decode_payload, read_scalar, Value};

/// One decoded entry of the sparse region.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseEntry<'a> {
    pub column: &'a LayoutColumn,
    pub value: Value<'a>,
}

#[derive(Debug, Clone, Copy)]
pub struct RowReader<'a> {
    data: &'a [u8],
    header: &'a RowHeader,
    layout: &'a Layout,
}

impl<'a> RowReader<'a> {
    pub fn new(data: &'a [u8], layout: &'a Layout) -> Result<Self> {
        let header = RowHeader::from_bytes(data)?;
        eyre::ensure!(
            header.schema_id() == layout.schema_id(),
            "row schema id {} does not match layout '{}' ({})",
            header.schema_id(),
            layout.name(),
            layout.schema_id()
        );
        eyre::ensure!(
            data.len() >= ROW_HEADER_SIZE + layout.size(),
            "row too small for layout '{}': {} < {}",
            layout.name(),
            data.len(),
            ROW_HEADER_SIZE + layout.size()
        );
        Ok(Self {
            data,
            header,
            layout,
        })
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn layout(&self) -> &'a Layout {
        self.layout
    }

    pub fn header(&self) -> &'a RowHeader {
        self.header
    }

    pub fn bitmask(&self) -> &'a [u8] {
        let data = self.data;
        &data[ROW_HEADER_SIZE..ROW_HEADER_SIZE + self.layout.num_bitmask_bytes()]
    }

    pub fn fixed_region(&self) -> &'a [u8] {
        let data = self.data;
        let start = ROW_HEADER_SIZE + self.layout.num_bitmask_bytes();
        &data[start..start + self.layout.fixed_size()]
    }

    fn column(&self, path: &str) -> Result<&'a LayoutColumn> {
        self.layout.find(path).ok_or_else(|| {
            eyre::eyre!("column '{}' not found in layout '{}'", path, self.layout.name())
        })
    }

    pub fn is_present(&self, path: &str) -> Result<bool> {
        let column = self.column(path)?;
        match column.slot() {
            ColumnSlot::Fixed { .. } | ColumnSlot::Variable { .. } => {
                Ok(bit_is_set(self.bitmask(), column.null_bit()))
            }
            ColumnSlot::Sparse => Ok(self.find_sparse(column)?.is_some()),
        }
    }

    pub fn read(&self, path: &str) -> Result<Value<'a>> {
        let column = self.column(path)?;
        ensure_readable(column)?;
        match column.slot() {
            ColumnSlot::Fixed { .. } => read_fixed(column, self.bitmask(), self.fixed_region()),
            ColumnSlot::Variable { index } => self
                .read_variable(index)
                .wrap_err_with(|| format!("failed to read column '{}'", path)),
            ColumnSlot::Sparse => Ok(self
                .find_sparse(column)
                .wrap_err_with(|| format!("failed to read column '{}'", path))?
                .unwrap_or(Value::Null)),
        }
    }

    fn variable_start(&self) -> usize {
        ROW_HEADER_SIZE + self.layout.size()
    }

    /// Walks present variable columns, stopping early at slot `stop`.
    fn walk_variable(&self, stop: Option<usize>) -> Result<(Option<Value<'a>>, usize)> {
        let data = self.data;
        let mut pos = self.variable_start();
        for column in self.layout.variable_columns() {
            let ColumnSlot::Variable { index } = column.slot() else {
                continue;
            };
            if !bit_is_set(self.bitmask(), column.null_bit()) {
                if stop == Some(index) {
                    return Ok((Some(Value::Null), pos));
                }
                continue;
            }
            let (value, used) = decode_payload(column.code(), &data[pos..])?;
            if stop == Some(index) {
                return Ok((Some(value), pos));
            }
            pos += used;
        }
        Ok((None, pos))
    }

    fn read_variable(&self, index: usize) -> Result<Value<'a>> {
        let (value, _) = self.walk_variable(Some(index))?;
        value.ok_or_else(|| eyre::eyre!("variable slot {} out of range", index))
    }

    /// Offset of the first sparse entry.
    pub fn sparse_start(&self) -> Result<usize> {
        Ok(self.walk_variable(None)?.1)
    }

    /// Decodes every entry of the sparse region in wire order.
    pub fn sparse_entries(&self) -> Result<SmallVec<[SparseEntry<'a>; 8]>> {
        let mut entries = SmallVec::new();
        let mut pos = self.sparse_start()?;
        while pos < self.data.len() {
            let (entry, used) = self.decode_sparse_at(pos)?;
            entries.push(entry);
            pos += used;
        }
        Ok(entries)
    }

    fn find_sparse(&self, target: &LayoutColumn) -> Result<Option<Value<'a>>> {
        let mut pos = self.sparse_start()?;
        while pos < self.data.len() {
            let (entry, used) = self.decode_sparse_at(pos)?;
            if entry.column.index() == target.index() {
                return Ok(Some(entry.value));
            }
            pos += used;
        }
        Ok(None)
    }

    fn decode_sparse_at(&self, pos: usize) -> Result<(SparseEntry<'a>, usize)> {
        let data = self.data;
        let src = &data[pos..];
        let (token, token_len) = decode_varint(src)?;
        let raw_code = *src
            .get(token_len)
            .ok_or_else(|| eyre::eyre!("truncated sparse entry at offset {}", pos))?;
        let code = LayoutCode::from_u8(raw_code)
            .ok_or_else(|| eyre::eyre!("unknown type code {} at offset {}", raw_code, pos))?;
        let column = self
            .layout
            .column_by_token(token)
            .ok_or_else(|| eyre::eyre!("unknown sparse token {} at offset {}", token, pos))?;
        eyre::ensure!(
            column.slot() == ColumnSlot::Sparse && column.code() == code,
            "sparse entry for '{}' has type {}, expected {}",
            column.full_path(),
            code,
            column.code()
        );
        let header_len = token_len + 1;
        let (value, used) = decode_payload(code, &src[header_len..])?;
        Ok((SparseEntry { column, value }, header_len + used))
    }
}

pub(crate) fn bit_is_set(bitmask: &[u8], bit: Option<LayoutBit>) -> bool {
    match bit {
        Some(bit) => bitmask[bit.byte()] & bit.mask() != 0,
        None => true,
    }
}

pub(crate) fn ensure_readable(column: &LayoutColumn) -> Result<()> {
    eyre::ensure!(
        !column.code().is_scope(),
        "column '{}' is a {} scope, not a value",
        column.full_path(),
        column.code()
    );
    Ok(())
}

/// Reads a fixed column given the row's bitmask and fixed region.
pub(crate) fn read_fixed<'a>(
    column: &LayoutColumn,
    bitmask: &[u8],
    fixed: &'a [u8],
) -> Result<Value<'a>> {
    let ColumnSlot::Fixed { offset, size } = column.slot() else {
        eyre::bail!("column '{}' is not fixed", column.full_path());
    };
    if !bit_is_set(bitmask, column.null_bit()) {
        return Ok(Value::Null);
    }
    let bytes = &fixed[offset..offset + size];
    match column.code() {
        LayoutCode::Null => Ok(Value::Null),
        LayoutCode::Boolean => Ok(Value::Bool(bit_is_set(bitmask, column.bool_bit()))),
        LayoutCode::Utf8 => {
            let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
            let text = std::str::from_utf8(&bytes[..end]).map_err(|e| {
                eyre::eyre!("invalid utf8 in column '{}': {}", column.full_path(), e)
            })?;
            Ok(Value::Utf8(Cow::Borrowed(text)))
        }
        LayoutCode::Binary => Ok(Value::Binary(Cow::Borrowed(bytes))),
        code => read_scalar(code, bytes),
    }
}
