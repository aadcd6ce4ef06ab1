//! Error types for the Niihau Trie.
//!
//! Missing keys are not errors: lookups return `None`. The variants here cover
//! rejected input and resource exhaustion.

/// Errors that can occur in Niihau Trie operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum NiihauTrieError {
    /// Node storage could not be allocated. The trie is left unchanged.
    #[error("Failed to allocate trie storage: {0}")]
    AllocationError(String),

    /// A fuzzy search was rejected before traversal.
    #[error("Invalid search query: {0}")]
    InvalidQuery(String),

    /// Error when a key exceeds the configured maximum length.
    #[error("Key of {length} bytes exceeds maximum key length of {max_length}")]
    KeyTooLong {
        /// Length of the rejected key in bytes.
        length: usize,
        /// The maximum allowed length.
        max_length: usize,
    },
}
