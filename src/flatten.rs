use crate::node::{Node, NodeId, TreeNode};

/// Monotonic id source scoped to one table state.
#[derive(Clone, Debug, Default)]
pub(crate) struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub(crate) const fn new() -> Self {
        Self { next: 0 }
    }

    /// Returns the id the next call to [`Self::next_id`] will hand out.
    pub(crate) const fn peek(&self) -> NodeId {
        NodeId(self.next)
    }

    pub(crate) const fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next);
        self.next += 1;
        id
    }
}

/// Flattens `roots` into pre-order nodes.
///
/// Roots are placed at `base_level`; nodes deeper than that start hidden. Initial positions
/// are numbered from `first_pos` in pre-order.
pub(crate) fn flatten_roots<T>(
    roots: Vec<TreeNode<T>>,
    base_level: usize,
    first_pos: usize,
    ids: &mut IdGenerator,
) -> Vec<Node<T>> {
    let mut nodes = Vec::with_capacity(roots.len());
    // Explicit stack: depth is bounded by memory, not by the call stack.
    let mut stack: Vec<(TreeNode<T>, usize)> = Vec::with_capacity(roots.len());
    stack.extend(roots.into_iter().rev().map(|root| (root, base_level)));

    let mut pos = first_pos;
    while let Some((TreeNode { value, children }, level)) = stack.pop() {
        nodes.push(Node {
            id: ids.next_id(),
            value,
            level,
            initial_pos: pos,
            is_leaf: children.is_empty(),
            is_expanded: false,
            is_matching: true,
            is_hidden: level > base_level,
            is_selected: false,
        });
        pos += 1;
        stack.extend(children.into_iter().rev().map(|child| (child, level + 1)));
    }
    nodes
}

/// Flattens a plain list: every item becomes a visible root leaf.
pub(crate) fn flatten_items<T, I>(items: I, first_pos: usize, ids: &mut IdGenerator) -> Vec<Node<T>>
where
    I: IntoIterator<Item = T>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(offset, value)| Node {
            id: ids.next_id(),
            value,
            level: 0,
            initial_pos: first_pos + offset,
            is_leaf: true,
            is_expanded: false,
            is_matching: true,
            is_hidden: false,
            is_selected: false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TreeNode<&'static str>> {
        vec![
            TreeNode::new(
                "root",
                vec![
                    TreeNode::new("a", vec![TreeNode::leaf("a1")]),
                    TreeNode::leaf("b"),
                ],
            ),
            TreeNode::leaf("second"),
        ]
    }

    #[test]
    fn flattens_in_pre_order() {
        let mut ids = IdGenerator::new();
        let nodes = flatten_roots(sample(), 0, 0, &mut ids);

        let values: Vec<_> = nodes.iter().map(|n| n.value).collect();
        let levels: Vec<_> = nodes.iter().map(|n| n.level).collect();
        assert_eq!(values, vec!["root", "a", "a1", "b", "second"]);
        assert_eq!(levels, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn initial_flags_follow_depth() {
        let mut ids = IdGenerator::new();
        let nodes = flatten_roots(sample(), 0, 0, &mut ids);

        let hidden: Vec<_> = nodes.iter().map(|n| n.is_hidden).collect();
        let leaves: Vec<_> = nodes.iter().map(|n| n.is_leaf).collect();
        assert_eq!(hidden, vec![false, true, true, true, false]);
        assert_eq!(leaves, vec![false, false, true, true, true]);
        assert!(nodes.iter().all(|n| n.is_matching && !n.is_expanded && !n.is_selected));
        let positions: Vec<_> = nodes.iter().map(|n| n.initial_pos).collect();
        assert_eq!(positions, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut ids = IdGenerator::new();
        let first = flatten_roots(sample(), 0, 0, &mut ids);
        let second = flatten_roots(sample(), 0, 0, &mut ids);

        assert_eq!(first.last().map(|n| n.id), Some(NodeId(4)));
        assert_eq!(second.first().map(|n| n.id), Some(NodeId(5)));
        assert_eq!(ids.peek(), NodeId(10));
    }

    #[test]
    fn nested_base_level_keeps_roots_visible() {
        let mut ids = IdGenerator::new();
        let nodes = flatten_roots(
            vec![TreeNode::new(1, vec![TreeNode::leaf(2)])],
            3,
            10,
            &mut ids,
        );

        assert_eq!(nodes[0].level, 3);
        assert!(!nodes[0].is_hidden);
        assert_eq!(nodes[1].level, 4);
        assert!(nodes[1].is_hidden);
        assert_eq!(nodes[1].initial_pos, 11);
    }

    #[test]
    fn list_items_are_visible_leaves() {
        let mut ids = IdGenerator::new();
        let nodes = flatten_items(["x", "y"], 0, &mut ids);

        assert!(nodes.iter().all(|n| n.level == 0 && n.is_leaf && !n.is_hidden));
        assert_eq!(nodes[1].id, NodeId(1));
    }

    #[test]
    fn empty_input_is_supported() {
        let mut ids = IdGenerator::new();
        let nodes = flatten_roots(Vec::<TreeNode<u8>>::new(), 0, 0, &mut ids);
        assert!(nodes.is_empty());
    }
}
