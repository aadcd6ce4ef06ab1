//! Benchmark driver configuration.
//!
//! Defaults reproduce the classic trie drivers: one million `"item {i}"` keys
//! for the insert/lookup comparison, and a dictionary search for `"food"`
//! within one edit.

use super::{ConfigResult, Validate};
use crate::error::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Benchmark driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Number of keys inserted and looked up by `compare`
    pub item_count: usize,

    /// Keys are `{key_prefix}{i}` for `i` in `1..=item_count`
    pub key_prefix: String,

    /// Value stored under every generated key
    pub value: String,

    /// Word-per-line dictionary loaded by `search`
    pub dictionary: Option<PathBuf>,

    /// Query used by `search`
    pub search_word: String,

    /// Edit distance used by `search`
    pub search_distance: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            item_count: 1_000_000,
            key_prefix: "item ".to_string(),
            value: "sweet".to_string(),
            dictionary: Some(PathBuf::from("/usr/share/dict/web2")),
            search_word: "food".to_string(),
            search_distance: 1,
        }
    }
}

impl Validate for BenchConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.item_count == 0 {
            return Err(ConfigError::ValidationError(
                "item_count must be greater than 0".to_string(),
            ));
        }

        if self.search_word.is_empty() {
            return Err(ConfigError::MissingValue("bench.search_word".to_string()));
        }

        Ok(())
    }
}
