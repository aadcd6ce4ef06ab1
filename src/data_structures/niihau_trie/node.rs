//! Node store for the Niihau Trie.
//!
//! Nodes live in a single arena and refer to each other by index. Every node
//! carries a compressed edge label, so a key path is a sequence of
//! [`Position`]s rather than a sequence of nodes. The store hides that detail
//! behind symbol-level operations ([`NodeStore::get_child`],
//! [`NodeStore::get_or_create_child`]) and keeps running counters for memory
//! accounting.

use std::mem;

use super::error::NiihauTrieError;
use super::NiihauTrieResult;

/// Index of a node inside the [`NodeStore`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

impl NodeId {
    /// The root node, created together with the store.
    pub(crate) const ROOT: NodeId = NodeId(0);
}

/// A node in the Niihau Trie.
#[derive(Debug, Clone)]
pub(crate) struct TrieNode<V> {
    /// Bytes on the edge entering this node. Empty only for the root.
    pub label: Vec<u8>,

    /// Children keyed by the first byte of their label, sorted by that byte.
    pub children: Vec<(u8, NodeId)>,

    /// Value of the key ending exactly at the end of `label`
    pub value: Option<V>,
}

impl<V> TrieNode<V> {
    fn with_label(label: Vec<u8>) -> Self {
        Self {
            label,
            children: Vec::new(),
            value: None,
        }
    }

    /// Looks up the child whose label starts with `symbol`.
    pub fn child(&self, symbol: u8) -> Option<NodeId> {
        self.children
            .binary_search_by_key(&symbol, |&(first, _)| first)
            .ok()
            .map(|index| self.children[index].1)
    }
}

/// A point on a key path: `offset` bytes of `node`'s label have been consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub node: NodeId,
    pub offset: usize,
}

impl Position {
    /// The position before any byte of any key.
    pub(crate) const ROOT: Position = Position {
        node: NodeId::ROOT,
        offset: 0,
    };
}

/// Arena owning every node of one trie.
#[derive(Debug, Clone)]
pub(crate) struct NodeStore<V> {
    nodes: Vec<TrieNode<V>>,
    child_links: usize,
    label_bytes: usize,
    #[cfg(test)]
    pub(crate) budget: ReservationBudget,
}

impl<V> NodeStore<V> {
    /// Estimated bytes of one node header.
    pub const NODE_OVERHEAD: usize = mem::size_of::<TrieNode<V>>();

    /// Estimated bytes of one entry in a child table.
    pub const CHILD_LINK_OVERHEAD: usize = mem::size_of::<(u8, NodeId)>();

    /// Creates a store holding only the root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::with_label(Vec::new())],
            child_links: 0,
            label_bytes: 0,
            #[cfg(test)]
            budget: ReservationBudget::default(),
        }
    }

    /// Charges one fallible reservation. Always succeeds outside tests.
    #[inline]
    pub(crate) fn check_reservation(&self) -> NiihauTrieResult<()> {
        #[cfg(test)]
        self.budget.spend()?;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> &TrieNode<V> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut TrieNode<V> {
        &mut self.nodes[id.0]
    }

    /// Number of nodes in the arena, root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Running memory estimate in bytes.
    pub fn memory_estimate(&self) -> usize {
        self.nodes.len() * Self::NODE_OVERHEAD
            + self.child_links * Self::CHILD_LINK_OVERHEAD
            + self.label_bytes
    }

    /// Recomputes the memory estimate by visiting every node.
    ///
    /// Always equal to [`NodeStore::memory_estimate`]; the walk exists so the
    /// incremental counters can be checked against the actual tree.
    #[cfg(test)]
    pub fn measure(&self) -> usize {
        self.nodes
            .iter()
            .map(|node| {
                Self::NODE_OVERHEAD
                    + node.children.len() * Self::CHILD_LINK_OVERHEAD
                    + node.label.len()
            })
            .sum()
    }

    /// Returns the position after consuming `symbol` from `position`, if the
    /// trie contains that path. Has no side effects.
    pub fn get_child(&self, position: Position, symbol: u8) -> Option<Position> {
        let node = self.node(position.node);
        if position.offset < node.label.len() {
            return (node.label[position.offset] == symbol).then_some(Position {
                node: position.node,
                offset: position.offset + 1,
            });
        }
        node.child(symbol).map(|child| Position {
            node: child,
            offset: 1,
        })
    }

    /// Returns the position after consuming `tail[0]` from `position`,
    /// creating the path when it is missing.
    ///
    /// A new leaf takes the whole of `tail` as its label, so the remaining
    /// symbols of the same key are found inside that label on the following
    /// calls. If `position` lies inside a label whose next byte differs, the
    /// node is split first. Memory is reserved before anything is modified.
    pub fn get_or_create_child(
        &mut self,
        position: Position,
        tail: &[u8],
    ) -> NiihauTrieResult<Position> {
        let Some(&symbol) = tail.first() else {
            return Ok(position);
        };
        if let Some(next) = self.get_child(position, symbol) {
            return Ok(next);
        }

        let needs_split = position.offset < self.node(position.node).label.len();
        self.check_reservation()?;
        self.nodes
            .try_reserve(if needs_split { 2 } else { 1 })
            .map_err(allocation_error)?;
        self.check_reservation()?;
        let mut label = Vec::new();
        label.try_reserve_exact(tail.len()).map_err(allocation_error)?;
        label.extend_from_slice(tail);

        let parent = position.node;
        if needs_split {
            self.split(position)?;
        } else {
            self.check_reservation()?;
            self.node_mut(parent)
                .children
                .try_reserve(1)
                .map_err(allocation_error)?;
        }

        let leaf = NodeId(self.nodes.len());
        self.label_bytes += label.len();
        self.nodes.push(TrieNode::with_label(label));
        self.link(parent, symbol, leaf);

        Ok(Position {
            node: leaf,
            offset: 1,
        })
    }

    /// Returns a node whose label ends exactly at `position`, splitting the
    /// node when the position falls inside its label.
    pub fn end_at(&mut self, position: Position) -> NiihauTrieResult<NodeId> {
        if position.offset < self.node(position.node).label.len() {
            self.check_reservation()?;
            self.nodes.try_reserve(1).map_err(allocation_error)?;
            self.split(position)?;
        }
        Ok(position.node)
    }

    /// Cuts `position.node` in two at `position.offset`.
    ///
    /// The upper half keeps the node id, so the parent's link stays valid.
    /// The lower half takes the label suffix, the children and the value.
    /// Label bytes, and with them the estimate, are unchanged apart from the
    /// new node header and child link.
    fn split(&mut self, position: Position) -> NiihauTrieResult<()> {
        self.check_reservation()?;
        let upper = self.node(position.node);
        let mut suffix = Vec::new();
        suffix
            .try_reserve_exact(upper.label.len() - position.offset)
            .map_err(allocation_error)?;
        suffix.extend_from_slice(&upper.label[position.offset..]);
        // Room for the lower half and a sibling leaf.
        self.check_reservation()?;
        let mut upper_children = Vec::new();
        upper_children.try_reserve(2).map_err(allocation_error)?;

        let lower = NodeId(self.nodes.len());
        let first = suffix[0];
        let upper = self.node_mut(position.node);
        upper.label.truncate(position.offset);
        let children = mem::replace(&mut upper.children, upper_children);
        let value = upper.value.take();
        upper.children.push((first, lower));

        self.nodes.push(TrieNode {
            label: suffix,
            children,
            value,
        });
        self.child_links += 1;
        Ok(())
    }

    fn link(&mut self, parent: NodeId, symbol: u8, child: NodeId) {
        let children = &mut self.node_mut(parent).children;
        let index = children
            .binary_search_by_key(&symbol, |&(first, _)| first)
            .unwrap_or_else(|index| index);
        children.insert(index, (symbol, child));
        self.child_links += 1;
    }
}

impl<V> Default for NodeStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Allocation fault injection for tests.
///
/// Every fallible reservation spends one unit; once the budget is exhausted
/// reservations fail with `AllocationError`. Unlimited by default.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct ReservationBudget(std::sync::atomic::AtomicUsize);

#[cfg(test)]
impl ReservationBudget {
    pub(crate) fn set(&self, remaining: usize) {
        self.0.store(remaining, std::sync::atomic::Ordering::SeqCst);
    }

    fn spend(&self) -> NiihauTrieResult<()> {
        use std::sync::atomic::Ordering;
        self.0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| match left {
                usize::MAX => Some(usize::MAX),
                0 => None,
                left => Some(left - 1),
            })
            .map(|_| ())
            .map_err(|_| NiihauTrieError::AllocationError("reservation budget exhausted".to_string()))
    }
}

#[cfg(test)]
impl Default for ReservationBudget {
    fn default() -> Self {
        Self(std::sync::atomic::AtomicUsize::new(usize::MAX))
    }
}

#[cfg(test)]
impl Clone for ReservationBudget {
    fn clone(&self) -> Self {
        use std::sync::atomic::{AtomicUsize, Ordering};
        Self(AtomicUsize::new(self.0.load(Ordering::SeqCst)))
    }
}

pub(crate) fn allocation_error(error: std::collections::TryReserveError) -> NiihauTrieError {
    tracing::error!(%error, "Niihau trie node allocation failed");
    NiihauTrieError::AllocationError(error.to_string())
}
