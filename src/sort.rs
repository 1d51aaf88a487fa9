use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::node::Node;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sort direction applied within every sibling group.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    Desc,
    /// Original insertion order.
    #[default]
    Default,
}

/// Sort state of a column, as shown by a header indicator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SortIndicator {
    pub column: usize,
    pub order: SortOrder,
}

/// Reorders `nodes` so every sibling group follows `compare` (or insertion order for
/// [`SortOrder::Default`]) while each parent still precedes its contiguous descendants.
pub(crate) fn sort_nodes<T, F>(nodes: Vec<Node<T>>, order: SortOrder, mut compare: F) -> Vec<Node<T>>
where
    F: FnMut(&T, &T) -> Ordering,
{
    match order {
        SortOrder::Asc => rebuild(nodes, |a, b| compare(&a.value, &b.value)),
        SortOrder::Desc => rebuild(nodes, |a, b| compare(&a.value, &b.value).reverse()),
        SortOrder::Default => rebuild(nodes, |a, b| a.initial_pos.cmp(&b.initial_pos)),
    }
}

fn rebuild<T, F>(nodes: Vec<Node<T>>, mut compare: F) -> Vec<Node<T>>
where
    F: FnMut(&Node<T>, &Node<T>) -> Ordering,
{
    let len = nodes.len();
    let mut roots: Vec<usize> = Vec::new();
    let mut children: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); len];

    // One forward pass: the nearest open node with a smaller level is the parent.
    let mut open: SmallVec<[usize; 16]> = SmallVec::new();
    for (idx, node) in nodes.iter().enumerate() {
        while open.last().is_some_and(|&top| nodes[top].level >= node.level) {
            open.pop();
        }
        match open.last() {
            Some(&parent) => children[parent].push(idx),
            None => roots.push(idx),
        }
        open.push(idx);
    }

    // Stable sorts keep equal siblings in their current relative order.
    roots.sort_by(|&a, &b| compare(&nodes[a], &nodes[b]));
    for group in &mut children {
        if group.len() > 1 {
            group.sort_by(|&a, &b| compare(&nodes[a], &nodes[b]));
        }
    }

    // LIFO rebuild: push each group reversed so pops come out in sorted order.
    let mut sequence = Vec::with_capacity(len);
    let mut stack: Vec<usize> = roots.into_iter().rev().collect();
    while let Some(idx) = stack.pop() {
        sequence.push(idx);
        stack.extend(children[idx].iter().rev().copied());
    }

    let mut slots: Vec<Option<Node<T>>> = nodes.into_iter().map(Some).collect();
    sequence
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}
