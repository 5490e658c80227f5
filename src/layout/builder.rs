//! Offset and bit allocation for layout construction.
//!
//! Columns are registered in declaration order. Each storage class draws from
//! its own allocator:
//!
//! ```text
//! bits:   [null x][null note][null flag][value flag] ...
//! fixed:  [x: 4 bytes][flag: 0 bytes][id: 16 bytes] ...
//! var:    note -> #0, blob -> #1
//! sparse: no allocation
//! ```
//!
//! A boolean column takes its value bit immediately after its null bit, so
//! the two are always adjacent.

use hashbrown::HashMap;

use crate::error::LayoutCompileError;
use crate::layout::code::LayoutCode;
use crate::layout::column::{ColumnSlot, LayoutBit, LayoutColumn};
use crate::layout::type_args::TypeArgumentList;
use crate::layout::Layout;
use crate::schema::SchemaId;
use crate::tokenizer::StringTokenizer;

#[derive(Debug)]
pub(crate) struct LayoutBuilder {
    name: String,
    schema_id: SchemaId,
    columns: Vec<LayoutColumn>,
    top: Vec<usize>,
    scopes: Vec<usize>,
    path_map: HashMap<String, usize>,
    tokenizer: StringTokenizer,
    next_bit: u32,
    fixed_size: usize,
    num_fixed: usize,
    num_variable: usize,
}

impl LayoutBuilder {
    pub(crate) fn new(name: impl Into<String>, schema_id: SchemaId) -> Self {
        Self {
            name: name.into(),
            schema_id,
            columns: Vec::new(),
            top: Vec::new(),
            scopes: Vec::new(),
            path_map: HashMap::new(),
            tokenizer: StringTokenizer::new(),
            next_bit: 0,
            fixed_size: 0,
            num_fixed: 0,
            num_variable: 0,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Full dotted path `path` would get inside the current scope.
    pub(crate) fn full_path(&self, path: &str) -> String {
        match self.scopes.last() {
            Some(&parent) => format!("{}.{}", self.columns[parent].full_path, path),
            None => path.to_string(),
        }
    }

    fn allocate_bit(&mut self) -> LayoutBit {
        let bit = LayoutBit::new(self.next_bit);
        self.next_bit += 1;
        bit
    }

    pub(crate) fn add_fixed(
        &mut self,
        path: &str,
        code: LayoutCode,
        nullable: bool,
        size: usize,
    ) -> Result<usize, LayoutCompileError> {
        let null_bit = (nullable || code.is_null()).then(|| self.allocate_bit());
        let bool_bit = code.is_bool().then(|| self.allocate_bit());
        let slot = ColumnSlot::Fixed {
            offset: self.fixed_size,
            size,
        };
        let index = self.push(path, code, TypeArgumentList::empty(), slot, null_bit, bool_bit, 0)?;
        self.fixed_size += size;
        self.num_fixed += 1;
        Ok(index)
    }

    pub(crate) fn add_variable(
        &mut self,
        path: &str,
        code: LayoutCode,
        max_length: u32,
    ) -> Result<usize, LayoutCompileError> {
        let null_bit = Some(self.allocate_bit());
        let slot = ColumnSlot::Variable {
            index: self.num_variable,
        };
        let index = self.push(
            path,
            code,
            TypeArgumentList::empty(),
            slot,
            null_bit,
            None,
            max_length,
        )?;
        self.num_variable += 1;
        Ok(index)
    }

    pub(crate) fn add_sparse(
        &mut self,
        path: &str,
        code: LayoutCode,
        type_args: TypeArgumentList,
    ) -> Result<usize, LayoutCompileError> {
        self.push(path, code, type_args, ColumnSlot::Sparse, None, None, 0)
    }

    /// Makes `column` the parent of every column added until `pop_scope`.
    pub(crate) fn push_scope(&mut self, column: usize) {
        debug_assert!(self.columns[column].code.is_scope());
        self.scopes.push(column);
    }

    pub(crate) fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    #[allow(clippy::too_many_arguments)]
    fn push(
        &mut self,
        path: &str,
        code: LayoutCode,
        type_args: TypeArgumentList,
        slot: ColumnSlot,
        null_bit: Option<LayoutBit>,
        bool_bit: Option<LayoutBit>,
        max_length: u32,
    ) -> Result<usize, LayoutCompileError> {
        let full_path = self.full_path(path);
        if self.path_map.contains_key(&full_path) {
            return Err(LayoutCompileError::new(
                &self.name,
                format!("property '{}' is declared more than once", full_path),
            ));
        }

        let index = self.columns.len();
        let token = self.tokenizer.add(&full_path);
        let parent = self.scopes.last().copied();
        if parent.is_none() {
            self.top.push(index);
        }
        self.path_map.insert(full_path.clone(), index);
        self.columns.push(LayoutColumn {
            index,
            path: path.to_string(),
            full_path,
            token,
            code,
            type_args,
            slot,
            null_bit,
            bool_bit,
            parent,
            max_length,
        });
        Ok(index)
    }

    pub(crate) fn build(self) -> Layout {
        debug_assert!(self.scopes.is_empty());
        Layout {
            name: self.name,
            schema_id: self.schema_id,
            columns: self.columns,
            top: self.top,
            path_map: self.path_map,
            tokenizer: self.tokenizer,
            num_bitmask_bytes: LayoutBit::num_bytes(self.next_bit),
            fixed_size: self.fixed_size,
            num_fixed: self.num_fixed,
            num_variable: self.num_variable,
        }
    }
}
