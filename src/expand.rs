use smallvec::SmallVec;

use crate::node::{Node, descendant_range};

/// Sets the expansion state of the branch nodes at `targets` (indexes, ascending).
///
/// Collapsing hides the whole subtree. Expanding always reveals the direct children; deeper
/// nodes keep their current state, so a grandchild hidden by an earlier collapse stays hidden
/// until its own parent is expanded again. Stored `is_expanded` flags of descendants are
/// never touched.
///
/// Returns the number of targets that were branch nodes.
pub(crate) fn set_expanded<T>(nodes: &mut [Node<T>], targets: &[usize], expanded: bool) -> usize {
    let mut applied = 0;
    for &idx in targets {
        let Some(node) = nodes.get_mut(idx) else {
            continue;
        };
        if node.is_leaf {
            continue;
        }
        node.is_expanded = expanded;
        applied += 1;

        let level = node.level;
        let range = descendant_range(nodes, idx);
        if expanded {
            for child in &mut nodes[range] {
                if child.level == level + 1 {
                    child.is_hidden = false;
                }
            }
        } else {
            for descendant in &mut nodes[range] {
                descendant.is_hidden = true;
            }
        }
    }
    applied
}

/// Re-derives `is_hidden` from the stored expansion flags: a node is visible when every
/// ancestor is expanded.
pub(crate) fn derive_hidden<T>(nodes: &mut [Node<T>]) {
    // (level, children visible) for the chain of open ancestors.
    let mut open: SmallVec<[(usize, bool); 16]> = SmallVec::new();
    for node in nodes.iter_mut() {
        while open.last().is_some_and(|&(level, _)| level >= node.level) {
            open.pop();
        }
        node.is_hidden = open.last().is_some_and(|&(_, visible)| !visible);
        open.push((node.level, !node.is_hidden && node.is_expanded));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::tests::nodes_from_levels;

    fn hidden(nodes: &[Node<u64>]) -> Vec<bool> {
        nodes.iter().map(|n| n.is_hidden).collect()
    }

    #[test]
    fn expand_reveals_direct_children_only() {
        let mut nodes = nodes_from_levels(&[0, 1, 2, 1]);
        set_expanded(&mut nodes, &[0], true);

        assert_eq!(hidden(&nodes), vec![false, false, true, false]);
    }

    #[test]
    fn collapse_hides_whole_subtree() {
        let mut nodes = nodes_from_levels(&[0, 1, 2, 1]);
        set_expanded(&mut nodes, &[0, 1], true);
        assert_eq!(hidden(&nodes), vec![false; 4]);

        set_expanded(&mut nodes, &[0], false);
        assert_eq!(hidden(&nodes), vec![false, true, true, true]);
        assert!(nodes[1].is_expanded);
    }

    #[test]
    fn re_expand_keeps_grandchildren_hidden() {
        let mut nodes = nodes_from_levels(&[0, 1, 2]);
        set_expanded(&mut nodes, &[0], true);
        set_expanded(&mut nodes, &[1], true);
        set_expanded(&mut nodes, &[0], false);
        set_expanded(&mut nodes, &[0], true);

        assert_eq!(hidden(&nodes), vec![false, false, true]);
    }

    #[test]
    fn expanding_hidden_branch_reveals_its_children() {
        let mut nodes = nodes_from_levels(&[0, 1, 2]);
        set_expanded(&mut nodes, &[1], true);

        assert!(nodes[1].is_expanded);
        assert_eq!(hidden(&nodes), vec![false, true, false]);

        set_expanded(&mut nodes, &[0], true);
        assert_eq!(hidden(&nodes), vec![false; 3]);
    }

    #[test]
    fn expand_result_does_not_depend_on_call_order() {
        let mut one_call = nodes_from_levels(&[0, 1, 2]);
        set_expanded(&mut one_call, &[0, 1], true);

        let mut two_calls = nodes_from_levels(&[0, 1, 2]);
        set_expanded(&mut two_calls, &[1], true);
        set_expanded(&mut two_calls, &[0], true);

        assert_eq!(hidden(&one_call), hidden(&two_calls));
    }

    #[test]
    fn leaves_are_skipped() {
        let mut nodes = nodes_from_levels(&[0, 0]);
        let applied = set_expanded(&mut nodes, &[0, 1, 7], true);

        assert_eq!(applied, 0);
        assert!(nodes.iter().all(|n| !n.is_expanded));
    }

    #[test]
    fn derive_hidden_follows_expanded_chain() {
        let mut nodes = nodes_from_levels(&[0, 1, 2, 1, 0, 1]);
        nodes[0].is_expanded = true;
        nodes[1].is_expanded = false;
        nodes[4].is_expanded = false;
        derive_hidden(&mut nodes);

        assert_eq!(hidden(&nodes), vec![false, false, true, false, false, true]);
    }
}
