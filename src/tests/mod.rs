//! Test modules for Mauka Trie.
//!
//! This module contains the crate-internal test suites:
//! - Configuration loading and validation
//! - Error types and reporting
//! - Property-based tests of the Niihau Trie against reference models
//!
//! Shared strategies and fixtures live in `test_utils`.

pub mod test_utils;

// Re-export commonly used testing tools to simplify imports in test modules
pub use test_utils::{edit_distance, entries_strategy, key_strategy, TestFixture};
