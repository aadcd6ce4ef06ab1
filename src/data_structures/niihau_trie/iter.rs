// Copyright (c) 2025 Mauka MCP Authors
//
// Licensed under dual license:
// - MIT License (LICENSE-MIT or https://opensource.org/licenses/MIT)
// - Apache License, Version 2.0 (LICENSE-APACHE or https://www.apache.org/licenses/LICENSE-2.0)

//! Ordered iteration over the entries of a Niihau Trie.

use std::iter::FusedIterator;

use super::node::{NodeId, NodeStore};

/// Iterator over `(key, value)` entries in ascending byte order of keys.
///
/// Created by [`NiihauTrie::iter`](super::NiihauTrie::iter) and
/// [`NiihauTrie::find_by_prefix`](super::NiihauTrie::find_by_prefix).
#[derive(Debug)]
pub struct Iter<'a, V> {
    store: &'a NodeStore<V>,
    /// Nodes still to visit, with the key length before their label
    stack: Vec<(NodeId, usize)>,
    key: Vec<u8>,
}

impl<'a, V> Iter<'a, V> {
    /// Iterates the subtree of `node`, whose label starts after `key_before`.
    pub(crate) fn from_node(store: &'a NodeStore<V>, node: NodeId, key_before: Vec<u8>) -> Self {
        let depth = key_before.len();
        Self {
            store,
            stack: vec![(node, depth)],
            key: key_before,
        }
    }

    pub(crate) fn empty(store: &'a NodeStore<V>) -> Self {
        Self {
            store,
            stack: Vec::new(),
            key: Vec::new(),
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (Vec<u8>, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        while let Some((id, depth)) = self.stack.pop() {
            let node = store.node(id);
            self.key.truncate(depth);
            self.key.extend_from_slice(&node.label);

            let child_depth = self.key.len();
            self.stack
                .extend(node.children.iter().rev().map(|&(_, child)| (child, child_depth)));

            if let Some(value) = &node.value {
                return Some((self.key.clone(), value));
            }
        }
        None
    }
}

impl<V> FusedIterator for Iter<'_, V> {}
