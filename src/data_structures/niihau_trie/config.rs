// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Configuration for the Niihau Trie.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigResult, Validate};
use crate::error::config::ConfigError;

/// Configuration options for the Niihau Trie.
///
/// Both limits are opt-in. With the defaults, any key can be inserted and any
/// non-empty query can be searched at any distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NiihauTrieConfig {
    /// Whether keys are compared byte for byte. When `false`, keys, prefixes
    /// and search queries are folded to ASCII lowercase.
    pub case_sensitive: bool,

    /// Longest key accepted by `insert`, in bytes. `None` means unbounded.
    pub max_key_length: Option<usize>,

    /// Largest edit distance a fuzzy search may ask for. `None` means
    /// unbounded.
    pub max_search_distance: Option<usize>,
}

impl Default for NiihauTrieConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            max_key_length: None,
            max_search_distance: None,
        }
    }
}

impl NiihauTrieConfig {
    /// Create a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether keys are compared case-sensitively.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Reject keys longer than `max_key_length` bytes on insert.
    pub fn with_max_key_length(mut self, max_key_length: usize) -> Self {
        self.max_key_length = Some(max_key_length);
        self
    }

    /// Reject fuzzy searches asking for more than `max_search_distance` edits.
    pub fn with_max_search_distance(mut self, max_search_distance: usize) -> Self {
        self.max_search_distance = Some(max_search_distance);
        self
    }
}

impl Validate for NiihauTrieConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.max_key_length == Some(0) {
            return Err(ConfigError::ValidationError(
                "max_key_length must be greater than 0".to_string(),
            ));
        }

        if let (Some(distance), Some(length)) = (self.max_search_distance, self.max_key_length) {
            if distance > length {
                return Err(ConfigError::ValueOutOfRange {
                    key: "trie.max_search_distance".to_string(),
                    message: format!("must not exceed max_key_length ({length})"),
                });
            }
        }

        Ok(())
    }
}
