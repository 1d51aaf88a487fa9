/// Actions that a user or application can initiate on the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableAction<Custom = ()> {
    /// Move the cursor to the previous active row.
    CursorPrev,
    /// Move the cursor to the next active row.
    CursorNext,
    /// Move the cursor to the first active row.
    CursorFirst,
    /// Move the cursor to the last active row.
    CursorLast,
    /// Move the cursor one viewport up.
    PageUp,
    /// Move the cursor one viewport down.
    PageDown,
    /// Expand or collapse the node under the cursor.
    ToggleNode,
    /// Expand every branch node.
    ExpandAll,
    /// Collapse every branch node.
    CollapseAll,
    /// Select or deselect the node under the cursor, using the configured cascade.
    ToggleSelection,
    /// Select every node, up to the selection cap.
    SelectAll,
    /// Deselect every node.
    DeselectAll,
    /// Custom action forwarded to the caller without internal handling.
    Custom(Custom),
}

/// Result of handling an action or key event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableEvent<Custom = ()> {
    /// The action was handled internally and state was updated.
    Handled,
    /// The action was ignored (e.g., empty table / nothing under the cursor).
    Unhandled,
    /// The action is forwarded to the caller for handling.
    Action(TableAction<Custom>),
}
