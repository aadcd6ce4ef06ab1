// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Levenshtein-bounded search over a Niihau Trie.
//!
//! The search walks the trie depth-first and carries one dynamic-programming
//! row per consumed key byte. Row `r` at depth `d` holds, for every `j`, the
//! edit distance between the first `d` bytes of the current path and the
//! first `j` bytes of the query. Row 0 is `[0, 1, ..., len(query)]`, and each
//! label byte `s` derives a new row from the previous one:
//!
//! ```text
//! row[0] = prev[0] + 1
//! row[j] = min(prev[j] + 1, row[j - 1] + 1, prev[j - 1] + (s != query[j - 1]))
//! ```
//!
//! A subtree is abandoned as soon as the smallest entry of a row exceeds the
//! distance bound, because every entry can only grow further down the path.
//! A stored key matches when the last entry of its final row is within the
//! bound.
//!
//! All rows of the current path live in one flat buffer that is truncated on
//! backtrack, so the traversal allocates only when the path gets deeper than
//! it has been before. The buffer holds `(depth + 1) * (len(query) + 1)`
//! entries and grows with fallible reservation. If a reservation fails the
//! iterator ends early and the failure is kept for
//! [`LevenshteinSearch::take_error`].

use std::iter::FusedIterator;

use super::error::NiihauTrieError;
use super::node::{allocation_error, NodeId, NodeStore};
use super::NiihauTrieResult;

/// A stored key within the requested edit distance of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevenshteinMatch<'a, V> {
    /// The stored key
    pub key: Vec<u8>,

    /// Value stored under `key`
    pub value: &'a V,

    /// Exact edit distance between `key` and the query
    pub distance: usize,
}

impl<V> LevenshteinMatch<'_, V> {
    /// The key as UTF-8 text, with invalid sequences replaced.
    pub fn key_lossy(&self) -> String {
        String::from_utf8_lossy(&self.key).into_owned()
    }
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    /// Key length before this node's label
    depth: usize,
}

/// Lazy iterator over the matches of one fuzzy search.
///
/// Created by [`NiihauTrie::levenshtein_search`](super::NiihauTrie::levenshtein_search).
/// Each call to `next` resumes the depth-first traversal where the previous
/// match was found. Results are in traversal order (ascending byte order of
/// keys), not in distance order.
#[derive(Debug)]
pub struct LevenshteinSearch<'a, V> {
    store: &'a NodeStore<V>,
    query: Box<[u8]>,
    max_distance: usize,
    stack: Vec<Frame>,
    rows: Vec<usize>,
    key: Vec<u8>,
    visited: usize,
    error: Option<NiihauTrieError>,
}

impl<'a, V> LevenshteinSearch<'a, V> {
    /// Starts a search at the root. The query must be non-empty.
    pub(crate) fn new(
        store: &'a NodeStore<V>,
        query: Box<[u8]>,
        max_distance: usize,
    ) -> NiihauTrieResult<Self> {
        store.check_reservation()?;
        let mut rows = Vec::new();
        rows.try_reserve_exact(query.len() + 1)
            .map_err(allocation_error)?;
        rows.extend(0..=query.len());
        Ok(Self {
            store,
            query,
            max_distance,
            stack: vec![Frame {
                node: NodeId::ROOT,
                depth: 0,
            }],
            rows,
            key: Vec::new(),
            visited: 0,
            error: None,
        })
    }

    /// The (normalized) query this search runs against.
    pub fn query(&self) -> &[u8] {
        &self.query
    }

    /// The inclusive distance bound.
    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    /// Number of nodes entered so far.
    pub fn nodes_visited(&self) -> usize {
        self.visited
    }

    /// Takes the allocation failure that ended the search, if any.
    ///
    /// A search that ran out of memory stops yielding matches, so a `None`
    /// from `next` is only a complete result when this returns `None`.
    pub fn take_error(&mut self) -> Option<NiihauTrieError> {
        self.error.take()
    }

    fn width(&self) -> usize {
        self.query.len() + 1
    }

    fn last_row(&self) -> &[usize] {
        &self.rows[self.rows.len() - self.width()..]
    }

    /// Appends the row for one more path byte. Returns the row minimum.
    fn push_row(&mut self, symbol: u8) -> NiihauTrieResult<usize> {
        let width = self.width();
        self.store.check_reservation()?;
        self.rows.try_reserve(width).map_err(allocation_error)?;
        self.store.check_reservation()?;
        self.key.try_reserve(1).map_err(allocation_error)?;
        let prev = self.rows.len() - width;

        let mut current = self.rows[prev] + 1;
        let mut minimum = current;
        self.rows.push(current);
        for j in 1..width {
            let deletion = self.rows[prev + j] + 1;
            let insertion = current + 1;
            let substitution = self.rows[prev + j - 1] + usize::from(self.query[j - 1] != symbol);
            current = deletion.min(insertion).min(substitution);
            minimum = minimum.min(current);
            self.rows.push(current);
        }
        self.key.push(symbol);
        Ok(minimum)
    }
}

impl<'a, V> Iterator for LevenshteinSearch<'a, V> {
    type Item = LevenshteinMatch<'a, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        while let Some(frame) = self.stack.pop() {
            self.visited += 1;
            let width = self.width();
            self.rows.truncate((frame.depth + 1) * width);
            self.key.truncate(frame.depth);

            let node = store.node(frame.node);
            let mut pruned = false;
            for &symbol in &node.label {
                match self.push_row(symbol) {
                    Ok(minimum) if minimum > self.max_distance => {
                        pruned = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(error) => {
                        self.stack.clear();
                        self.error = Some(error);
                        return None;
                    }
                }
            }
            if pruned {
                continue;
            }

            let depth = self.key.len();
            self.stack.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|&(_, child)| Frame { node: child, depth }),
            );

            if let Some(value) = &node.value {
                let distance = self.last_row()[width - 1];
                if distance <= self.max_distance {
                    return Some(LevenshteinMatch {
                        key: self.key.clone(),
                        value,
                        distance,
                    });
                }
            }
        }
        None
    }
}

impl<V> FusedIterator for LevenshteinSearch<'_, V> {}
