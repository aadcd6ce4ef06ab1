//! Niihau Trie Implementation
//!
//! A compressed trie (radix tree) mapping byte-string keys to values, with
//! exact lookups, ordered prefix enumeration, Levenshtein-bounded fuzzy search
//! and an approximate memory footprint.
//!
//! # Example
//!
//! ```
//! use mauka_trie_lib::data_structures::niihau_trie::NiihauTrie;
//!
//! let mut trie = NiihauTrie::new();
//! trie.set("cat", 1).unwrap();
//! trie.set("cats", 2).unwrap();
//! trie.set("car", 3).unwrap();
//!
//! assert_eq!(trie.get("car"), Some(&3));
//! assert_eq!(trie.get("dog"), None);
//!
//! let mut matches: Vec<_> = trie
//!     .levenshtein_search("cat", 1)
//!     .unwrap()
//!     .map(|m| (m.key_lossy(), m.distance))
//!     .collect();
//! matches.sort();
//! assert_eq!(
//!     matches,
//!     vec![("car".to_string(), 1), ("cat".to_string(), 0), ("cats".to_string(), 1)]
//! );
//! ```
//!
//! The trie has no internal locking. Inserts take `&mut self` and reads take
//! `&self`; wrap the trie in a reader-writer lock to share it between threads.

mod config;
mod error;
mod iter;
mod levenshtein;
mod node;

use std::borrow::Cow;
use std::ops::ControlFlow;

pub use config::NiihauTrieConfig;
pub use error::NiihauTrieError;
pub use iter::Iter;
pub use levenshtein::{LevenshteinMatch, LevenshteinSearch};
use node::{NodeId, NodeStore, Position};

/// Result type for Niihau Trie operations
pub type NiihauTrieResult<T> = Result<T, NiihauTrieError>;

/// Niihau Trie is a compressed prefix tree with fuzzy search.
///
/// Key features:
/// * Path compression: a chain of single-child positions is stored as one
///   node carrying a byte label
/// * Exact lookups in O(key length)
/// * Levenshtein search that prunes subtrees once every alignment is out of
///   bounds
/// * Running memory estimate for reporting
/// * Optional ASCII case folding (configurable)
#[derive(Debug, Clone)]
pub struct NiihauTrie<V> {
    /// Arena holding every node, root first
    store: NodeStore<V>,

    /// Number of distinct keys holding a value
    key_count: usize,

    /// Configuration options
    config: NiihauTrieConfig,
}

impl<V> NiihauTrie<V> {
    /// Creates a new empty `NiihauTrie` with default configuration.
    pub fn new() -> Self {
        Self::with_config(NiihauTrieConfig::default())
    }

    /// Creates a new empty `NiihauTrie` with the specified configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration for the trie.
    pub fn with_config(config: NiihauTrieConfig) -> Self {
        Self {
            store: NodeStore::new(),
            key_count: 0,
            config,
        }
    }

    /// Returns the configuration this trie was created with.
    pub fn config(&self) -> &NiihauTrieConfig {
        &self.config
    }

    fn normalize<'k>(&self, key: &'k [u8]) -> Cow<'k, [u8]> {
        if self.config.case_sensitive || !key.iter().any(u8::is_ascii_uppercase) {
            Cow::Borrowed(key)
        } else {
            Cow::Owned(key.to_ascii_lowercase())
        }
    }

    /// Inserts a key-value pair into the trie.
    ///
    /// # Arguments
    ///
    /// * `key` - The key to insert.
    /// * `value` - The value to associate with the key.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(previous))` - The key existed; its value was replaced.
    /// * `Ok(None)` - The key is new.
    /// * `Err(NiihauTrieError)` - The key is longer than a configured
    ///   `max_key_length`, or storage could not be allocated. The trie is
    ///   unchanged in either case.
    pub fn insert<K>(&mut self, key: K, value: V) -> NiihauTrieResult<Option<V>>
    where
        K: AsRef<[u8]>,
    {
        let key = key.as_ref();
        if let Some(max_length) = self.config.max_key_length {
            if key.len() > max_length {
                return Err(NiihauTrieError::KeyTooLong {
                    length: key.len(),
                    max_length,
                });
            }
        }
        let key = self.normalize(key);

        let mut position = Position::ROOT;
        for i in 0..key.len() {
            position = self.store.get_or_create_child(position, &key[i..])?;
        }
        let node = self.store.end_at(position)?;

        let previous = self.store.node_mut(node).value.replace(value);
        if previous.is_none() {
            self.key_count += 1;
        }
        Ok(previous)
    }

    /// Sets the value for `key`, replacing any previous value.
    ///
    /// The indexed-assignment form of [`NiihauTrie::insert`].
    pub fn set<K>(&mut self, key: K, value: V) -> NiihauTrieResult<()>
    where
        K: AsRef<[u8]>,
    {
        self.insert(key, value).map(|_| ())
    }

    /// Walks the exact path of `key`, returning the node it ends on.
    fn find_node(&self, key: &[u8]) -> Option<NodeId> {
        if self
            .config
            .max_key_length
            .is_some_and(|max_length| key.len() > max_length)
        {
            return None;
        }
        let key = self.normalize(key);
        let position = self.locate(&key)?;
        let node = self.store.node(position.node);
        (position.offset == node.label.len()).then_some(position.node)
    }

    fn locate(&self, key: &[u8]) -> Option<Position> {
        key.iter()
            .try_fold(Position::ROOT, |position, &symbol| {
                self.store.get_child(position, symbol)
            })
    }

    /// Retrieves the value associated with a key.
    ///
    /// Returns `None` if the key was never inserted.
    pub fn get<K>(&self, key: K) -> Option<&V>
    where
        K: AsRef<[u8]>,
    {
        let node = self.find_node(key.as_ref())?;
        self.store.node(node).value.as_ref()
    }

    /// Retrieves a mutable reference to the value associated with a key.
    pub fn get_mut<K>(&mut self, key: K) -> Option<&mut V>
    where
        K: AsRef<[u8]>,
    {
        let node = self.find_node(key.as_ref())?;
        self.store.node_mut(node).value.as_mut()
    }

    /// Checks if a key exists in the trie.
    pub fn contains_key<K>(&self, key: K) -> bool
    where
        K: AsRef<[u8]>,
    {
        self.get(key).is_some()
    }

    /// Returns the number of distinct keys in the trie.
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Alias of [`NiihauTrie::key_count`].
    pub fn len(&self) -> usize {
        self.key_count
    }

    /// Checks if the trie holds no keys.
    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    /// Returns the number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.store.node_count()
    }

    /// Returns the approximate memory footprint of the trie in bytes.
    ///
    /// The estimate counts a fixed header per node, one entry per child link
    /// and the label bytes. It excludes allocator slack and whatever the
    /// values own on the heap, so it is meant for reporting only. It never
    /// decreases as keys are inserted.
    pub fn memory_estimate(&self) -> usize {
        self.store.memory_estimate()
    }

    /// Alias of [`NiihauTrie::memory_estimate`].
    pub fn memory(&self) -> usize {
        self.store.memory_estimate()
    }

    /// Recomputes the memory estimate by walking every node.
    #[cfg(test)]
    pub(crate) fn measured_memory(&self) -> usize {
        self.store.measure()
    }

    /// Iterates all entries in ascending byte order of keys.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter::from_node(&self.store, NodeId::ROOT, Vec::new())
    }

    /// Iterates every entry whose key starts with `prefix`, in ascending
    /// byte order of keys.
    ///
    /// An empty prefix yields every entry.
    pub fn find_by_prefix<P>(&self, prefix: P) -> Iter<'_, V>
    where
        P: AsRef<[u8]>,
    {
        let prefix = self.normalize(prefix.as_ref());
        match self.locate(&prefix) {
            Some(position) => {
                let key_before = prefix[..prefix.len() - position.offset].to_vec();
                Iter::from_node(&self.store, position.node, key_before)
            }
            None => Iter::empty(&self.store),
        }
    }

    /// Collects the values of every key starting with `prefix`.
    pub fn values_with_prefix<P>(&self, prefix: P) -> Vec<&V>
    where
        P: AsRef<[u8]>,
    {
        self.find_by_prefix(prefix).map(|(_, value)| value).collect()
    }

    /// Starts a fuzzy search for keys within `max_distance` edits of `query`.
    ///
    /// The returned iterator is lazy: nodes are visited only as matches are
    /// pulled. Matches come in ascending byte order of keys; sort by
    /// `distance` if closest-first order is needed, or use
    /// [`NiihauTrie::levenshtein_search_sorted`].
    ///
    /// # Errors
    ///
    /// `InvalidQuery` if `query` is empty, or if `max_distance` exceeds a
    /// configured `max_search_distance`. `AllocationError` if the first
    /// distance row cannot be allocated.
    pub fn levenshtein_search<Q>(
        &self,
        query: Q,
        max_distance: usize,
    ) -> NiihauTrieResult<LevenshteinSearch<'_, V>>
    where
        Q: AsRef<[u8]>,
    {
        let query = query.as_ref();
        if query.is_empty() {
            return Err(NiihauTrieError::InvalidQuery(
                "query must not be empty".to_string(),
            ));
        }
        if let Some(limit) = self.config.max_search_distance {
            if max_distance > limit {
                return Err(NiihauTrieError::InvalidQuery(format!(
                    "max distance {max_distance} exceeds limit of {limit}"
                )));
            }
        }
        let query = self.normalize(query).into_owned().into_boxed_slice();
        LevenshteinSearch::new(&self.store, query, max_distance)
    }

    /// Runs a fuzzy search, handing each match to `callback`.
    ///
    /// The traversal stops early when the callback returns
    /// `ControlFlow::Break(())`.
    ///
    /// # Returns
    ///
    /// The number of matches delivered to the callback, or the allocation
    /// error that cut the traversal short.
    pub fn levenshtein_search_with<Q, F>(
        &self,
        query: Q,
        max_distance: usize,
        mut callback: F,
    ) -> NiihauTrieResult<usize>
    where
        Q: AsRef<[u8]>,
        F: FnMut(LevenshteinMatch<'_, V>) -> ControlFlow<()>,
    {
        let mut search = self.levenshtein_search(query, max_distance)?;
        let mut delivered = 0;
        let mut stopped = false;
        for found in search.by_ref() {
            delivered += 1;
            if callback(found).is_break() {
                stopped = true;
                break;
            }
        }
        tracing::debug!(
            query = %String::from_utf8_lossy(search.query()),
            max_distance,
            delivered,
            stopped,
            nodes_visited = search.nodes_visited(),
            "Levenshtein search finished"
        );
        match search.take_error() {
            Some(error) => Err(error),
            None => Ok(delivered),
        }
    }

    /// Runs a fuzzy search to completion and returns the matches ordered by
    /// distance, then by key.
    pub fn levenshtein_search_sorted<Q>(
        &self,
        query: Q,
        max_distance: usize,
    ) -> NiihauTrieResult<Vec<LevenshteinMatch<'_, V>>>
    where
        Q: AsRef<[u8]>,
    {
        let mut search = self.levenshtein_search(query, max_distance)?;
        let mut matches: Vec<_> = search.by_ref().collect();
        if let Some(error) = search.take_error() {
            return Err(error);
        }
        matches.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.key.cmp(&b.key)));
        Ok(matches)
    }
}

impl<V> Default for NiihauTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> IntoIterator for &'a NiihauTrie<V> {
    type Item = (Vec<u8>, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_trie_basic_operations() {
        let mut trie = NiihauTrie::new();

        // Test initial state
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 1);

        // Test insertion
        assert_eq!(trie.insert("hello", "world").unwrap(), None);
        assert_eq!(trie.len(), 1);
        assert!(!trie.is_empty());

        // Test retrieval
        assert_eq!(trie.get("hello"), Some(&"world"));
        assert!(trie.contains_key("hello"));
        assert_eq!(trie.get("nonexistent"), None);
        assert_eq!(trie.get("hell"), None);
        assert_eq!(trie.get("hello!"), None);

        // Test update
        assert_eq!(trie.insert("hello", "planet").unwrap(), Some("world"));
        assert_eq!(trie.get("hello"), Some(&"planet"));
        assert_eq!(trie.key_count(), 1);
    }

    #[test]
    fn test_prefix_of_existing_key() {
        let mut trie = NiihauTrie::new();
        trie.set("cats", 2).unwrap();
        trie.set("cat", 1).unwrap();
        trie.set("ca", 0).unwrap();

        assert_eq!(trie.get("ca"), Some(&0));
        assert_eq!(trie.get("cat"), Some(&1));
        assert_eq!(trie.get("cats"), Some(&2));
        assert_eq!(trie.get("c"), None);
        assert_eq!(trie.key_count(), 3);
        assert_eq!(trie.node_count(), 4);
    }

    #[test]
    fn test_get_mut() {
        let mut trie = NiihauTrie::new();
        trie.set("counter", 1).unwrap();

        if let Some(value) = trie.get_mut("counter") {
            *value += 41;
        }
        assert_eq!(trie.get("counter"), Some(&42));
        assert!(trie.get_mut("missing").is_none());
    }

    #[test]
    fn test_case_insensitive_keys() {
        let config = NiihauTrieConfig::new().with_case_sensitive(false);
        let mut trie = NiihauTrie::with_config(config);

        trie.set("Content-Type", "json").unwrap();
        assert_eq!(trie.get("content-type"), Some(&"json"));
        assert_eq!(trie.get("CONTENT-TYPE"), Some(&"json"));

        let keys: Vec<_> = trie.find_by_prefix("CONTENT").map(|(key, _)| key).collect();
        assert_eq!(keys, vec![b"content-type".to_vec()]);

        let found = trie.levenshtein_search_sorted("CONTENT-TYPO", 1).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_key_too_long() {
        let config = NiihauTrieConfig::new().with_max_key_length(4);
        let mut trie = NiihauTrie::with_config(config);

        assert_eq!(
            trie.insert("abcde", 1),
            Err(NiihauTrieError::KeyTooLong {
                length: 5,
                max_length: 4
            })
        );
        assert!(trie.is_empty());
        assert_eq!(trie.node_count(), 1);
        assert_eq!(trie.get("abcde"), None);
    }

    #[test]
    fn test_trie_prefix_search() {
        let mut trie = NiihauTrie::new();

        // Insert some keys with common prefixes
        trie.insert("apple", "fruit").unwrap();
        trie.insert("application", "software").unwrap();
        trie.insert("apply", "verb").unwrap();
        trie.insert("banana", "yellow").unwrap();

        let keys: Vec<_> = trie
            .find_by_prefix("app")
            .map(|(key, _)| String::from_utf8(key).unwrap())
            .collect();
        assert_eq!(keys, vec!["apple", "application", "apply"]);

        // Prefix ending inside a compressed label
        let keys: Vec<_> = trie.find_by_prefix("ban").map(|(key, _)| key).collect();
        assert_eq!(keys, vec![b"banana".to_vec()]);

        assert_eq!(trie.values_with_prefix("appl"), vec![&"fruit", &"software", &"verb"]);

        // Test with no matches
        assert_eq!(trie.find_by_prefix("orange").count(), 0);
        assert_eq!(trie.find_by_prefix("").count(), 4);
    }

    #[test]
    fn test_iter_is_ordered() {
        let mut trie = NiihauTrie::new();
        for (i, key) in ["delta", "alpha", "charlie", "bravo", "alp"].iter().enumerate() {
            trie.set(key, i).unwrap();
        }

        let keys: Vec<_> = (&trie).into_iter().map(|(key, _)| key).collect();
        let mut expected: Vec<_> = ["alp", "alpha", "bravo", "charlie", "delta"]
            .iter()
            .map(|key| key.as_bytes().to_vec())
            .collect();
        expected.sort();
        assert_eq!(keys, expected);
    }

    #[test]
    fn test_invalid_queries() {
        let trie = NiihauTrie::<u8>::new();
        assert!(matches!(
            trie.levenshtein_search("", 1),
            Err(NiihauTrieError::InvalidQuery(_))
        ));

        let config = NiihauTrieConfig::new().with_max_search_distance(16);
        let trie = NiihauTrie::<u8>::with_config(config);
        assert!(matches!(
            trie.levenshtein_search("word", 17),
            Err(NiihauTrieError::InvalidQuery(_))
        ));
        assert!(trie.levenshtein_search("word", 16).is_ok());
    }

    #[test]
    fn test_search_distance_unbounded_by_default() {
        let mut trie = NiihauTrie::new();
        trie.set("cat", 1).unwrap();

        let found: Vec<_> = trie
            .levenshtein_search("anything at all", 17)
            .unwrap()
            .map(|m| m.distance)
            .collect();
        assert_eq!(found, vec![13]);
        assert_eq!(trie.levenshtein_search("cat", usize::MAX).unwrap().count(), 1);
    }

    #[test]
    fn test_long_keys_accepted_by_default() {
        let mut trie = NiihauTrie::new();
        let key = "a".repeat(5000);

        trie.set(&key, 1).unwrap();
        assert_eq!(trie.get(&key), Some(&1));
        assert_eq!(trie.get(&key[..4999]), None);
        assert_eq!(trie.node_count(), 2);
    }

    #[test]
    fn test_failed_insert_keeps_previous_state() {
        let mut trie = NiihauTrie::new();
        for (i, key) in ["cats", "cat", "dog"].iter().enumerate() {
            trie.set(key, i).unwrap();
        }

        let mut failures = 0;
        for budget in 0.. {
            let mut attempt = trie.clone();
            attempt.store.budget.set(budget);
            match attempt.insert("car", 9) {
                Ok(previous) => {
                    assert_eq!(previous, None);
                    assert_eq!(attempt.get("car"), Some(&9));
                    break;
                }
                Err(err) => {
                    failures += 1;
                    assert!(matches!(err, NiihauTrieError::AllocationError(_)));
                    assert_eq!(attempt.key_count(), trie.key_count());
                    assert_eq!(attempt.node_count(), trie.node_count());
                    assert_eq!(attempt.memory(), trie.memory());
                    assert_eq!(attempt.memory(), attempt.measured_memory());
                    assert_eq!(attempt.get("car"), None);
                    for (key, value) in trie.iter() {
                        assert_eq!(attempt.get(&key), Some(value));
                    }
                }
            }
        }
        assert!(failures > 0);
    }

    #[test]
    fn test_search_reports_allocation_failure() {
        let mut trie = NiihauTrie::new();
        trie.set("cat", 1).unwrap();
        trie.set("cot", 2).unwrap();

        // The first row is reserved, path rows are not
        trie.store.budget.set(1);
        let result = trie.levenshtein_search_with("cat", 1, |_| ControlFlow::Continue(()));
        assert!(matches!(result, Err(NiihauTrieError::AllocationError(_))));

        trie.store.budget.set(1);
        assert!(matches!(
            trie.levenshtein_search_sorted("cat", 1),
            Err(NiihauTrieError::AllocationError(_))
        ));

        trie.store.budget.set(0);
        assert!(matches!(
            trie.levenshtein_search("cat", 1),
            Err(NiihauTrieError::AllocationError(_))
        ));
    }

    #[test]
    fn test_search_with_callback_stops_early() {
        let mut trie = NiihauTrie::new();
        for key in ["cat", "cot", "cut", "cats"] {
            trie.set(key, key.len()).unwrap();
        }

        let mut seen = Vec::new();
        let delivered = trie
            .levenshtein_search_with("cat", 1, |found| {
                seen.push(found.key_lossy());
                if seen.len() == 2 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(delivered, 2);
        assert_eq!(seen, vec!["cat", "cats"]);

        let delivered = trie
            .levenshtein_search_with("cat", 1, |_| ControlFlow::Continue(()))
            .unwrap();
        assert_eq!(delivered, 4);
    }

    #[test]
    fn test_search_sorted_by_distance() {
        let mut trie = NiihauTrie::new();
        trie.set("cat", 1).unwrap();
        trie.set("cats", 2).unwrap();
        trie.set("car", 3).unwrap();

        let found: Vec<_> = trie
            .levenshtein_search_sorted("cat", 1)
            .unwrap()
            .into_iter()
            .map(|m| (m.key_lossy(), *m.value, m.distance))
            .collect();
        assert_eq!(
            found,
            vec![
                ("cat".to_string(), 1, 0),
                ("car".to_string(), 3, 1),
                ("cats".to_string(), 2, 1),
            ]
        );
    }

    #[test]
    fn test_memory_baseline_and_growth() {
        let mut trie = NiihauTrie::<u64>::new();
        let baseline = trie.memory();
        assert_eq!(baseline, NodeStore::<u64>::NODE_OVERHEAD);

        trie.set("item 1", 1).unwrap();
        let one = trie.memory();
        assert!(one > baseline);

        trie.set("item 1", 2).unwrap();
        assert_eq!(trie.memory(), one);

        trie.set("item 10", 10).unwrap();
        assert!(trie.memory() > one);
        assert_eq!(trie.memory_estimate(), trie.measured_memory());
    }

    /// Readers share the trie behind an `Arc` once all inserts are done.
    #[test]
    fn test_trie_shared_readers() {
        const THREAD_COUNT: usize = 8;
        const KEYS: usize = 500;

        let mut trie = NiihauTrie::new();
        for i in 0..KEYS {
            trie.set(format!("key_{i}"), i).unwrap();
        }
        let trie = Arc::new(trie);

        let handles: Vec<_> = (0..THREAD_COUNT)
            .map(|thread_id| {
                let trie = Arc::clone(&trie);
                thread::spawn(move || {
                    for i in (thread_id..KEYS).step_by(THREAD_COUNT) {
                        assert_eq!(trie.get(format!("key_{i}")), Some(&i));
                    }
                    trie.levenshtein_search("key_1", 1).unwrap().count()
                })
            })
            .collect();

        let expected = trie.levenshtein_search("key_1", 1).unwrap().count();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    }
}
