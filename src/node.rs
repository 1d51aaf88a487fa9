use std::fmt;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Node identifier, unique within one table state and never reused.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl From<u64> for NodeId {
    #[inline]
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Caller-supplied input record with its children.
///
/// The input must be a proper tree; ownership of the children already rules out cycles.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode<T> {
    /// Caller payload.
    pub value: T,
    /// Children in display order.
    pub children: Vec<Self>,
}

impl<T> TreeNode<T> {
    /// Creates a node with the given children.
    pub const fn new(value: T, children: Vec<Self>) -> Self {
        Self { value, children }
    }

    /// Creates a node without children.
    pub const fn leaf(value: T) -> Self {
        Self {
            value,
            children: Vec::new(),
        }
    }

    /// Appends a child and returns the node (builder style).
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// One entry of the flat pre-order array.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) id: NodeId,
    pub(crate) value: T,
    pub(crate) level: usize,
    // Insertion order, used to restore the default order after a sort.
    pub(crate) initial_pos: usize,
    pub(crate) is_leaf: bool,
    pub(crate) is_expanded: bool,
    pub(crate) is_matching: bool,
    pub(crate) is_hidden: bool,
    pub(crate) is_selected: bool,
}

impl<T> Node<T> {
    #[inline]
    pub(crate) const fn is_active(&self) -> bool {
        self.is_matching && !self.is_hidden
    }

    pub(crate) const fn list_view(&self) -> ListNodeView<'_, T> {
        ListNodeView {
            id: self.id,
            value: &self.value,
            is_selected: self.is_selected,
        }
    }

    pub(crate) const fn tree_view(&self) -> TreeNodeView<'_, T> {
        TreeNodeView {
            id: self.id,
            value: &self.value,
            is_selected: self.is_selected,
            is_expanded: self.is_expanded,
            level: self.level,
            is_leaf: self.is_leaf,
        }
    }
}

/// Returns the index range holding the descendants of `nodes[index]`.
///
/// The run starts right after `index` and ends at the first node whose level is not deeper
/// than the reference node (or at the end of the array). Every engine that walks a subtree
/// goes through this scan, so subtree walks cost O(subtree size).
pub(crate) fn descendant_range<T>(nodes: &[Node<T>], index: usize) -> Range<usize> {
    let level = nodes[index].level;
    let start = index + 1;
    let end = nodes[start..]
        .iter()
        .position(|node| node.level <= level)
        .map_or(nodes.len(), |offset| start + offset);
    start..end
}

/// Read-only projection of a node for flat list tables.
#[derive(Debug, PartialEq, Eq)]
pub struct ListNodeView<'a, T> {
    pub id: NodeId,
    pub value: &'a T,
    pub is_selected: bool,
}

impl<T> Clone for ListNodeView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ListNodeView<'_, T> {}

/// Read-only projection of a node for tree tables.
#[derive(Debug, PartialEq, Eq)]
pub struct TreeNodeView<'a, T> {
    pub id: NodeId,
    pub value: &'a T,
    pub is_selected: bool,
    pub is_expanded: bool,
    /// Depth in the source tree, 0 for roots.
    pub level: usize,
    /// Whether the node had no children when it was created.
    pub is_leaf: bool,
}

impl<T> Clone for TreeNodeView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TreeNodeView<'_, T> {}
