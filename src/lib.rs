//! Mauka Trie Library
//!
//! A compressed trie with exact lookups, prefix enumeration and
//! Levenshtein-bounded fuzzy search, plus the configuration, error handling
//! and timing harness used by the `mauka_trie` driver binary.
//!
//! # Architecture
//!
//! - [`data_structures::niihau_trie`]: the trie itself (node store, engine,
//!   fuzzy search)
//! - [`config`]: layered configuration (defaults, file, environment)
//! - [`error`]: application error type and error reporting
//! - [`bench`]: single-shot timing scenarios

pub mod bench;
pub mod config;
pub mod data_structures;
pub mod error;

// Internal modules that are not part of the public API
#[cfg(test)]
pub(crate) mod tests;

pub use data_structures::niihau_trie::{
    LevenshteinMatch, NiihauTrie, NiihauTrieConfig, NiihauTrieError, NiihauTrieResult,
};

/// Version information for Mauka Trie.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
