//! # PathTrie - Arena-Backed Prefix Tree
//!
//! Maps byte-sequence keys to small `Copy` values in O(key length). Column
//! paths are interned through this structure when a layout is built and looked
//! up through it when a row is decoded.
//!
//! ## Arena Layout
//!
//! ```text
//! nodes: [ root | n1 | n2 | n3 | ... ]
//!           │
//!           └─ first_child ──> n1 ──next_sibling──> n3 ──> 0 (end)
//!                               │
//!                               └─ first_child ──> n2
//! ```
//!
//! All nodes live in one `Vec`. Children of a node form a singly linked list
//! threaded through `first_child` / `next_sibling` indices. Index 0 is the
//! root, which holds the value of the empty key, and also doubles as the "no
//! link" sentinel: a child or sibling can never be the root, so a link of 0
//! always means "none".
//!
//! Symbols are compared as raw bytes. Nothing is ever removed or rebalanced.

const ROOT: u32 = 0;
const NO_LINK: u32 = 0;

#[derive(Debug, Clone)]
struct Node<V> {
    symbol: u8,
    first_child: u32,
    next_sibling: u32,
    value: Option<V>,
}

impl<V> Node<V> {
    fn new(symbol: u8) -> Self {
        Self {
            symbol,
            first_child: NO_LINK,
            next_sibling: NO_LINK,
            value: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PathTrie<V> {
    nodes: Vec<Node<V>>,
    len: usize,
}

impl<V: Copy> PathTrie<V> {
    pub fn new() -> Self {
        Self::with_capacity(16)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(Node::new(0));
        Self { nodes, len: 0 }
    }

    /// Number of keys holding a value.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Adds `key` with `value` unless the key is already present.
    ///
    /// Returns `false`, leaving the stored value untouched, when the key exists.
    pub fn insert_if_absent(&mut self, key: &[u8], value: V) -> bool {
        let node = self.find_or_create(key);
        let slot = &mut self.nodes[node as usize].value;
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        self.len += 1;
        true
    }

    /// Inserts `key`, overwriting any previous value.
    pub fn upsert(&mut self, key: &[u8], value: V) {
        let node = self.find_or_create(key);
        if self.nodes[node as usize].value.replace(value).is_none() {
            self.len += 1;
        }
    }

    pub fn lookup(&self, key: &[u8]) -> Option<V> {
        let mut node = ROOT;
        for &symbol in key {
            node = self.find_child(node, symbol)?;
        }
        self.nodes[node as usize].value
    }

    fn find_child(&self, parent: u32, symbol: u8) -> Option<u32> {
        let mut child = self.nodes[parent as usize].first_child;
        while child != NO_LINK {
            let candidate = &self.nodes[child as usize];
            if candidate.symbol == symbol {
                return Some(child);
            }
            child = candidate.next_sibling;
        }
        None
    }

    fn find_or_create(&mut self, key: &[u8]) -> u32 {
        let mut node = ROOT;
        for &symbol in key {
            node = self.child_or_append(node, symbol);
        }
        node
    }

    fn child_or_append(&mut self, parent: u32, symbol: u8) -> u32 {
        let mut child = self.nodes[parent as usize].first_child;
        let mut tail = NO_LINK;
        while child != NO_LINK {
            let candidate = &self.nodes[child as usize];
            if candidate.symbol == symbol {
                return child;
            }
            tail = child;
            child = candidate.next_sibling;
        }

        let added = self.push_node(symbol);
        if tail == NO_LINK {
            self.nodes[parent as usize].first_child = added;
        } else {
            self.nodes[tail as usize].next_sibling = added;
        }
        added
    }

    fn push_node(&mut self, symbol: u8) -> u32 {
        if self.nodes.len() == self.nodes.capacity() {
            self.nodes.reserve(self.nodes.len());
        }
        let index = self.nodes.len();
        debug_assert_ne!(index, ROOT as usize);
        self.nodes.push(Node::new(symbol));
        index as u32
    }
}

impl<V: Copy> Default for PathTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}
