//! # Path Tokenization
//!
//! Every column path of a layout is assigned a small integer token in
//! first-seen order. Sparse values carry the token on the wire instead of the
//! path text, and decoding maps the token straight back to a column.
//!
//! Token 0 is reserved for the empty path and lives on the trie root; column
//! tokens therefore start at 1.
//!
//! ## Module Structure
//!
//! - `trie`: arena-backed `PathTrie` keyed by raw path bytes

pub mod trie;

pub use trie::PathTrie;

pub type Token = u64;

/// Token of the empty path.
pub const EMPTY_TOKEN: Token = 0;

#[derive(Debug, Clone)]
pub struct StringTokenizer {
    trie: PathTrie<Token>,
    paths: Vec<String>,
}

impl StringTokenizer {
    pub fn new() -> Self {
        let mut trie = PathTrie::new();
        trie.insert_if_absent(b"", EMPTY_TOKEN);
        Self {
            trie,
            paths: vec![String::new()],
        }
    }

    /// Returns the token for `path`, assigning the next one if it is new.
    pub fn add(&mut self, path: &str) -> Token {
        if let Some(token) = self.trie.lookup(path.as_bytes()) {
            return token;
        }
        let next = self.paths.len() as Token;
        self.trie.insert_if_absent(path.as_bytes(), next);
        self.paths.push(path.to_string());
        next
    }

    pub fn try_find_token(&self, path: &str) -> Option<Token> {
        self.trie.lookup(path.as_bytes())
    }

    pub fn try_find_token_bytes(&self, path: &[u8]) -> Option<Token> {
        self.trie.lookup(path)
    }

    pub fn try_find_string(&self, token: Token) -> Option<&str> {
        self.paths.get(token as usize).map(String::as_str)
    }

    /// Number of tokens handed out, including the empty path.
    pub fn count(&self) -> usize {
        self.paths.len()
    }
}

impl Default for StringTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_follow_first_seen_order() {
        let mut tokenizer = StringTokenizer::new();
        assert_eq!(tokenizer.add("a"), 1);
        assert_eq!(tokenizer.add("b"), 2);
        assert_eq!(tokenizer.add("a.c"), 3);
        assert_eq!(tokenizer.count(), 4);
    }

    #[test]
    fn adding_twice_returns_existing_token() {
        let mut tokenizer = StringTokenizer::new();
        let first = tokenizer.add("x");
        assert_eq!(tokenizer.add("x"), first);
        assert_eq!(tokenizer.count(), 2);
    }

    #[test]
    fn re_adding_keeps_tokens_stable() {
        let mut tokenizer = StringTokenizer::new();
        let a = tokenizer.add("a");
        let b = tokenizer.add("b");
        assert_eq!(tokenizer.add(""), EMPTY_TOKEN);
        assert_eq!(tokenizer.add("b"), b);
        assert_eq!(tokenizer.add("a"), a);
        assert_eq!(tokenizer.add("c"), 3);
        assert_eq!(tokenizer.count(), 4);
    }

    #[test]
    fn token_and_string_lookups_agree() {
        let mut tokenizer = StringTokenizer::new();
        tokenizer.add("name");
        tokenizer.add("address.city");

        let token = tokenizer.try_find_token("address.city").unwrap();
        assert_eq!(tokenizer.try_find_string(token), Some("address.city"));
        assert_eq!(tokenizer.try_find_token_bytes(b"name"), Some(1));
        assert_eq!(tokenizer.try_find_token("missing"), None);
        assert_eq!(tokenizer.try_find_string(99), None);
    }

    #[test]
    fn empty_path_is_token_zero() {
        let tokenizer = StringTokenizer::new();
        assert_eq!(tokenizer.try_find_token(""), Some(EMPTY_TOKEN));
        assert_eq!(tokenizer.try_find_string(EMPTY_TOKEN), Some(""));
    }
}
