//! Test utilities and fixtures for Mauka Trie.
//!
//! Provides proptest strategies for trie keys, a brute-force edit distance
//! used as the reference for fuzzy search, and a temporary-directory fixture
//! for configuration tests.

use proptest::prelude::*;
use proptest::strategy::{BoxedStrategy, Strategy};
use tempfile::TempDir;

/// Maximum number of entries generated for one trie.
const MAX_ENTRIES: usize = 40;

/// Generate keys over a small alphabet so that generated keys share prefixes
/// and sit within a few edits of each other.
pub fn key_strategy(max_length: usize) -> BoxedStrategy<Vec<u8>> {
    proptest::collection::vec(prop::sample::select(b"abcd".to_vec()), 0..=max_length).boxed()
}

/// Generate a list of `(key, value)` insertions, duplicates included.
pub fn entries_strategy() -> BoxedStrategy<Vec<(Vec<u8>, u32)>> {
    proptest::collection::vec((key_strategy(6), any::<u32>()), 0..MAX_ENTRIES).boxed()
}

/// Classic two-row Levenshtein distance between two byte strings.
pub fn edit_distance(a: &[u8], b: &[u8]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, &x) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &y) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(x != y);
            current[j + 1] = substitution.min(prev[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut prev, &mut current);
    }
    prev[b.len()]
}

/// Test fixture for tests that read files or set environment variables.
///
/// Environment variables set through the fixture are removed when it is dropped.
pub struct TestFixture {
    /// Temporary directory for test files
    pub temp_dir: TempDir,
    env_vars: Vec<String>,
}

impl TestFixture {
    /// Create a new test fixture.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp_dir: tempfile::tempdir()?,
            env_vars: Vec::new(),
        })
    }

    /// Set an environment variable for this test.
    pub fn set_env<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        let key = key.into();
        std::env::set_var(&key, value.into());
        self.env_vars.push(key);
    }

    /// Write `contents` to `name` inside the fixture directory.
    pub fn create_file<C: AsRef<[u8]>>(
        &self,
        name: &str,
        contents: C,
    ) -> std::io::Result<std::path::PathBuf> {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, contents)?;
        Ok(path)
    }
}

impl Drop for TestFixture {
    fn drop(&mut self) {
        for key in &self.env_vars {
            std::env::remove_var(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(b"", b"", 0; "both empty")]
    #[test_case(b"abc", b"", 3; "delete all")]
    #[test_case(b"", b"abc", 3; "insert all")]
    #[test_case(b"kitten", b"sitting", 3; "kitten sitting")]
    #[test_case(b"food", b"good", 1; "one substitution")]
    #[test_case(b"flaw", b"lawn", 2; "shifted")]
    fn test_edit_distance(a: &[u8], b: &[u8], expected: usize) {
        assert_eq!(edit_distance(a, b), expected);
        assert_eq!(edit_distance(b, a), expected);
    }
}
