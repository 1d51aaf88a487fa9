pub use crate::{
    Cascade, CascadeDepth, ColumnDef, InsertPosition, NodeId, RowContext, Selectable,
    SimpleColumns, SortOrder, TableAction, TableColumns, TableEvent, TableMode, TreeGlyphs,
    TreeNode, TreeNodeView, TreeScrollPolicy, TreeTable, TreeTableOptions, TreeTableSnapshot,
    TreeTableState, TreeTableStyle, VirtualWindow,
};

#[cfg(feature = "keymap")]
pub use crate::{KeymapProfile, TableKeyBindings};
