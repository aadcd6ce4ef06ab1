//! Data structures for Mauka Trie.
//!
//! All implementations adhere to the project requirements:
//! - No unsafe code
//! - Fallible allocation on growth paths, surfaced as errors
//! - Cache-aware layouts (arena storage, flat rows)

pub mod niihau_trie;

// Re-export common data structures
pub use niihau_trie::{NiihauTrie, NiihauTrieError, NiihauTrieResult};
