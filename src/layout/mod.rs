//! # Physical Layouts
//!
//! A [`Layout`] is the compiled, immutable physical description of a schema:
//! which columns exist, where their bytes live, and which bitmask bits track
//! their presence. Layouts are built once by the [`LayoutCompiler`] and then
//! shared read-only (`Arc<Layout>`) between any number of threads.
//!
//! ## Row Shape
//!
//! ```text
//! +--------+---------+---------------+------------------+----------------+
//! | header | bitmask | fixed region  | variable region  | sparse region  |
//! | 5 B    | N bytes | fixed_size B  | length-prefixed  | token+code+val |
//! +--------+---------+---------------+------------------+----------------+
//!          |<------ layout.size() ------>|
//! ```
//!
//! `size()` is the minimum row size after the framing header: everything up to
//! the end of the fixed region. Fixed offsets are relative to the start of the
//! fixed region, so their absolute position never depends on row contents.
//!
//! ## Lookups
//!
//! Callers arrive with either text or raw bytes, so a layout answers both:
//!
//! | Method | Key | Backing structure |
//! |--------|-----|-------------------|
//! | `find` | `&str` | hash map of full paths |
//! | `find_bytes` | `&[u8]` | tokenizer trie, then token index |
//! | `column_by_token` | `Token` | direct index |
//!
//! ## Module Organization
//!
//! - `code`: physical type codes
//! - `type_args`: nested type arguments of typed scopes
//! - `column`: columns, slots and bitmask bits
//! - `builder`: offset and bit allocation
//! - `compiler`: logical schema to layout translation
//! - `resolver`: schema id to layout resolution with caching
//! - `system`: built-in segment, record and empty layouts

pub(crate) mod builder;
pub mod code;
pub mod column;
pub mod compiler;
pub mod resolver;
pub mod system;
pub mod type_args;


pub use code::LayoutCode;
pub use column::{ColumnSlot, LayoutBit, LayoutColumn};
pub use compiler::LayoutCompiler;
pub use resolver::{FnResolver, LayoutResolver, NamespaceResolver};
pub use type_args::{TypeArgument, TypeArgumentList};

use hashbrown::HashMap;

use crate::schema::SchemaId;
use crate::tokenizer::{StringTokenizer, Token, EMPTY_TOKEN};

#[derive(Debug, Clone)]
pub struct Layout {
    pub(crate) name: String,
    pub(crate) schema_id: SchemaId,
    pub(crate) columns: Vec<LayoutColumn>,
    pub(crate) top: Vec<usize>,
    pub(crate) path_map: HashMap<String, usize>,
    pub(crate) tokenizer: StringTokenizer,
    pub(crate) num_bitmask_bytes: usize,
    pub(crate) fixed_size: usize,
    pub(crate) num_fixed: usize,
    pub(crate) num_variable: usize,
}

impl Layout {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_id(&self) -> SchemaId {
        self.schema_id
    }

    /// All columns in declaration order, nested columns directly after their scope.
    pub fn columns(&self) -> &[LayoutColumn] {
        &self.columns
    }

    pub fn column(&self, index: usize) -> Option<&LayoutColumn> {
        self.columns.get(index)
    }

    pub fn top_columns(&self) -> impl Iterator<Item = &LayoutColumn> + '_ {
        self.top.iter().map(move |&idx| &self.columns[idx])
    }

    /// Direct children of the scope column at `parent`.
    pub fn children(&self, parent: usize) -> impl Iterator<Item = &LayoutColumn> + '_ {
        self.columns
            .iter()
            .filter(move |column| column.parent == Some(parent))
    }

    pub fn find(&self, path: &str) -> Option<&LayoutColumn> {
        self.path_map.get(path).map(|&idx| &self.columns[idx])
    }

    pub fn find_bytes(&self, path: &[u8]) -> Option<&LayoutColumn> {
        self.tokenizer
            .try_find_token_bytes(path)
            .and_then(|token| self.column_by_token(token))
    }

    pub fn column_by_token(&self, token: Token) -> Option<&LayoutColumn> {
        if token == EMPTY_TOKEN {
            return None;
        }
        let index = usize::try_from(token - 1).ok()?;
        self.columns.get(index).filter(|column| column.token == token)
    }

    pub fn tokenizer(&self) -> &StringTokenizer {
        &self.tokenizer
    }

    pub fn num_bitmask_bytes(&self) -> usize {
        self.num_bitmask_bytes
    }

    pub fn fixed_size(&self) -> usize {
        self.fixed_size
    }

    /// Minimum encoded size of a row body: bitmask plus fixed region.
    pub fn size(&self) -> usize {
        self.num_bitmask_bytes + self.fixed_size
    }

    pub fn num_fixed(&self) -> usize {
        self.num_fixed
    }

    pub fn num_variable(&self) -> usize {
        self.num_variable
    }

    /// Variable columns in slot order.
    pub fn variable_columns(&self) -> impl Iterator<Item = &LayoutColumn> + '_ {
        self.columns
            .iter()
            .filter(|column| matches!(column.slot, ColumnSlot::Variable { .. }))
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.schema_id == other.schema_id
            && self.columns == other.columns
            && self.num_bitmask_bytes == other.num_bitmask_bytes
            && self.fixed_size == other.fixed_size
    }
}

impl Eq for Layout {}
