/// Per-row data handed to label rendering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowContext {
    pub level: usize,
    pub is_leaf: bool,
    pub is_expanded: bool,
    pub is_selected: bool,
}

impl RowContext {
    /// Builds the context of a tree node projection.
    pub const fn from_view<T>(node: &crate::node::TreeNodeView<'_, T>) -> Self {
        Self {
            level: node.level,
            is_leaf: node.is_leaf,
            is_expanded: node.is_expanded,
            is_selected: node.is_selected,
        }
    }
}
