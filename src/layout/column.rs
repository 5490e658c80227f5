//! # Layout Columns
//!
//! One [`LayoutColumn`] per physical field. Where its bytes live is captured
//! by [`ColumnSlot`]:
//!
//! | Slot | Meaning |
//! |------|---------|
//! | `Fixed { offset, size }` | byte offset inside the fixed region and its width |
//! | `Variable { index }` | ordinal among variable columns; the byte position is found at encode time |
//! | `Sparse` | no position; the value is a self-describing entry in the sparse region |
//!
//! Presence and boolean values are tracked in the row bitmask through
//! [`LayoutBit`]s.

use crate::layout::code::LayoutCode;
use crate::layout::type_args::TypeArgumentList;
use crate::schema::StorageKind;
use crate::tokenizer::Token;

/// Index of one bit in a row's bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayoutBit(u32);

impl LayoutBit {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn byte(self) -> usize {
        (self.0 / 8) as usize
    }

    #[inline]
    pub fn mask(self) -> u8 {
        1 << (self.0 % 8)
    }

    pub fn num_bytes(bits: u32) -> usize {
        bits.div_ceil(8) as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnSlot {
    Fixed { offset: usize, size: usize },
    Variable { index: usize },
    Sparse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutColumn {
    pub(crate) index: usize,
    pub(crate) path: String,
    pub(crate) full_path: String,
    pub(crate) token: Token,
    pub(crate) code: LayoutCode,
    pub(crate) type_args: TypeArgumentList,
    pub(crate) slot: ColumnSlot,
    pub(crate) null_bit: Option<LayoutBit>,
    pub(crate) bool_bit: Option<LayoutBit>,
    pub(crate) parent: Option<usize>,
    pub(crate) max_length: u32,
}

impl LayoutColumn {
    /// Position in the layout's column list (declaration order, depth first).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name relative to the enclosing scope.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Dotted path from the top of the schema.
    pub fn full_path(&self) -> &str {
        &self.full_path
    }

    pub fn token(&self) -> Token {
        self.token
    }

    pub fn code(&self) -> LayoutCode {
        self.code
    }

    pub fn type_args(&self) -> &TypeArgumentList {
        &self.type_args
    }

    pub fn slot(&self) -> ColumnSlot {
        self.slot
    }

    pub fn storage(&self) -> StorageKind {
        match self.slot {
            ColumnSlot::Fixed { .. } => StorageKind::Fixed,
            ColumnSlot::Variable { .. } => StorageKind::Variable,
            ColumnSlot::Sparse => StorageKind::Sparse,
        }
    }

    /// Offset inside the fixed region, for fixed columns.
    pub fn offset(&self) -> Option<usize> {
        match self.slot {
            ColumnSlot::Fixed { offset, .. } => Some(offset),
            _ => None,
        }
    }

    /// Width in the fixed region, for fixed columns.
    pub fn size(&self) -> Option<usize> {
        match self.slot {
            ColumnSlot::Fixed { size, .. } => Some(size),
            _ => None,
        }
    }

    pub fn null_bit(&self) -> Option<LayoutBit> {
        self.null_bit
    }

    pub fn bool_bit(&self) -> Option<LayoutBit> {
        self.bool_bit
    }

    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    /// Declared byte limit for variable columns; 0 means unbounded.
    pub fn max_length(&self) -> u32 {
        self.max_length
    }

    pub fn is_nullable(&self) -> bool {
        match self.slot {
            ColumnSlot::Fixed { .. } => self.null_bit.is_some(),
            ColumnSlot::Variable { .. } | ColumnSlot::Sparse => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_map_to_bytes_and_masks() {
        let bit = LayoutBit::new(10);
        assert_eq!(bit.byte(), 1);
        assert_eq!(bit.mask(), 0b0000_0100);
        assert_eq!(LayoutBit::new(0).mask(), 1);
    }

    #[test]
    fn bitmask_bytes_round_up() {
        assert_eq!(LayoutBit::num_bytes(0), 0);
        assert_eq!(LayoutBit::num_bytes(1), 1);
        assert_eq!(LayoutBit::num_bytes(8), 1);
        assert_eq!(LayoutBit::num_bytes(9), 2);
    }
}
