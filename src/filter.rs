use smallvec::SmallVec;

use crate::node::Node;

/// Recomputes `is_matching` for every node and returns how many nodes match.
///
/// The predicate is evaluated once per node in reverse index order. A branch that fails the
/// predicate still matches when any of its descendants matches, so the path to every match
/// stays reachable.
///
/// Instead of rescanning each branch's descendant range, the pass carries one flag per depth:
/// `below[d]` records whether a matching node deeper than `d` was seen since the last node at
/// depth `<= d`. In reverse pre-order that run is exactly the descendant range of the next
/// node at depth `d`.
pub(crate) fn apply_filter<T, F>(nodes: &mut [Node<T>], mut predicate: F) -> usize
where
    F: FnMut(&T) -> bool,
{
    let mut below: SmallVec<[bool; 16]> = SmallVec::new();
    let mut matching_count = 0;

    for node in nodes.iter_mut().rev() {
        let level = node.level;
        if below.len() <= level {
            below.resize(level + 1, false);
        }

        let mut matching = predicate(&node.value);
        if !matching && !node.is_leaf && below[level] {
            matching = true;
        }
        node.is_matching = matching;

        for flag in &mut below[level..] {
            *flag = false;
        }
        if matching {
            matching_count += 1;
            for flag in &mut below[..level] {
                *flag = true;
            }
        }
    }

    matching_count
}

/// Marks every node as matching again.
pub(crate) fn clear_filter<T>(nodes: &mut [Node<T>]) {
    for node in nodes {
        node.is_matching = true;
    }
}
