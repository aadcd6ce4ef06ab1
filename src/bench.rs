//! Timing harness for the trie drivers.
//!
//! Two scenarios are supported:
//! - `compare`: bulk insert followed by lookups of generated keys, timed for
//!   the Niihau Trie and for a `hashbrown::HashMap` baseline;
//! - `search`: load a word-per-line dictionary and time one fuzzy search.
//!
//! Criterion micro-benchmarks live in `benches/`; this module produces
//! single-shot wall-clock reports for the command line.

use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{BufRead, BufReader};
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use serde::Serialize;
use tracing::info;

use crate::config::BenchConfig;
use crate::data_structures::niihau_trie::{NiihauTrie, NiihauTrieConfig};
use crate::error::config::ConfigError;
use crate::error::{MaukaError, MaukaResult};

/// Timings for one data structure in the `compare` scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareReport {
    /// Name of the measured data structure
    pub structure: String,

    /// Number of keys inserted and looked up
    pub items: usize,

    /// Wall-clock time of the insert phase in milliseconds
    pub insert_ms: f64,

    /// Wall-clock time of the lookup phase in milliseconds
    pub lookup_ms: f64,

    /// Estimated memory footprint, when the structure reports one
    pub memory_bytes: Option<usize>,
}

impl Display for CompareReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} items, insert {:.1} ms, lookup {:.1} ms, total {:.1} ms",
            self.structure,
            self.items,
            self.insert_ms,
            self.lookup_ms,
            self.insert_ms + self.lookup_ms
        )?;
        if let Some(bytes) = self.memory_bytes {
            write!(f, ", ~{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))?;
        }
        Ok(())
    }
}

/// One dictionary word found by the `search` scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// The stored word
    pub word: String,

    /// Edit distance to the query
    pub distance: usize,
}

/// Result of the `search` scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    /// The query
    pub word: String,

    /// The distance bound
    pub max_distance: usize,

    /// Number of dictionary lines inserted
    pub words_loaded: usize,

    /// Estimated trie memory after loading
    pub memory_bytes: usize,

    /// Wall-clock time spent loading the dictionary
    pub load_ms: f64,

    /// Wall-clock time spent in the fuzzy search
    pub search_ms: f64,

    /// Matches ordered by distance, then word
    pub matches: Vec<SearchHit>,
}

impl Display for SearchReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for hit in &self.matches {
            writeln!(f, "{} ({})", hit.word, hit.distance)?;
        }
        writeln!(
            f,
            "{}Mb, {} words",
            self.memory_bytes / (1024 * 1024),
            self.words_loaded
        )?;
        writeln!(f, "load: {:.1} ms", self.load_ms)?;
        write!(f, "search: {:.3} ms", self.search_ms)
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_secs_f64() * 1000.0
}

fn item_key(bench: &BenchConfig, i: usize) -> String {
    format!("{}{}", bench.key_prefix, i)
}

/// Inserts `item_count` generated keys into a fresh trie and a hash map and
/// looks every one of them up again.
///
/// # Errors
///
/// Fails if an insert fails or a lookup misses a key that was inserted.
pub fn run_compare(
    bench: &BenchConfig,
    trie_config: &NiihauTrieConfig,
) -> MaukaResult<Vec<CompareReport>> {
    let items = bench.item_count;

    info!(items, "Timing Niihau trie");
    let mut trie = NiihauTrie::with_config(trie_config.clone());
    let start = Instant::now();
    for i in 1..=items {
        trie.set(item_key(bench, i), bench.value.clone())?;
    }
    let insert = start.elapsed();
    let start = Instant::now();
    for i in 1..=items {
        let key = item_key(bench, i);
        if trie.get(&key).is_none() {
            return Err(MaukaError::Custom(format!("trie lookup missed key {key:?}")));
        }
    }
    let lookup = start.elapsed();
    let trie_report = CompareReport {
        structure: "niihau_trie".to_string(),
        items,
        insert_ms: millis(insert),
        lookup_ms: millis(lookup),
        memory_bytes: Some(trie.memory()),
    };
    drop(trie);

    info!(items, "Timing hash map");
    let mut map = HashMap::new();
    let start = Instant::now();
    for i in 1..=items {
        map.insert(item_key(bench, i), bench.value.clone());
    }
    let insert = start.elapsed();
    let start = Instant::now();
    for i in 1..=items {
        let key = item_key(bench, i);
        if !map.contains_key(&key) {
            return Err(MaukaError::Custom(format!("map lookup missed key {key:?}")));
        }
    }
    let lookup = start.elapsed();
    let map_report = CompareReport {
        structure: "hash_map".to_string(),
        items,
        insert_ms: millis(insert),
        lookup_ms: millis(lookup),
        memory_bytes: None,
    };

    Ok(vec![trie_report, map_report])
}

/// Inserts every non-empty line of `reader` into `trie`, mapping the word to
/// itself.
///
/// # Returns
///
/// The number of words inserted.
pub fn load_dictionary<R: BufRead>(reader: R, trie: &mut NiihauTrie<String>) -> MaukaResult<usize> {
    let mut loaded = 0;
    for line in reader.lines() {
        let line = line?;
        let word = line.trim_end();
        if word.is_empty() {
            continue;
        }
        trie.set(word, word.to_string())?;
        loaded += 1;
    }
    Ok(loaded)
}

/// Loads the configured dictionary and runs one fuzzy search over it.
///
/// # Errors
///
/// Fails if no dictionary is configured, the file cannot be read, or the
/// search parameters are rejected by the trie.
pub fn run_search(bench: &BenchConfig, trie_config: &NiihauTrieConfig) -> MaukaResult<SearchReport> {
    let path = bench
        .dictionary
        .as_ref()
        .ok_or_else(|| ConfigError::MissingValue("bench.dictionary".to_string()))?;

    info!(dictionary = %path.display(), "Loading dictionary");
    let mut trie = NiihauTrie::with_config(trie_config.clone());
    let start = Instant::now();
    let words_loaded = load_dictionary(BufReader::new(fs::File::open(path)?), &mut trie)?;
    let load = start.elapsed();

    let start = Instant::now();
    let matches: Vec<SearchHit> = trie
        .levenshtein_search_sorted(&bench.search_word, bench.search_distance)?
        .into_iter()
        .map(|found| SearchHit {
            word: found.value.clone(),
            distance: found.distance,
        })
        .collect();
    let search = start.elapsed();
    info!(
        word = %bench.search_word,
        distance = bench.search_distance,
        matches = matches.len(),
        "Search finished"
    );

    Ok(SearchReport {
        word: bench.search_word.clone(),
        max_distance: bench.search_distance,
        words_loaded,
        memory_bytes: trie.memory(),
        load_ms: millis(load),
        search_ms: millis(search),
        matches,
    })
}
