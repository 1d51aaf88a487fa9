use std::cmp::Ordering;

use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

use crate::action::{TableAction, TableEvent};
use crate::columns::TableColumns;
use crate::expand;
use crate::filter;
use crate::flatten::{self, IdGenerator};
use crate::node::{ListNodeView, Node, NodeId, TreeNode, TreeNodeView, descendant_range};
use crate::options::{OptionsError, TreeTableOptions};
use crate::scroll::ScrollCoalescer;
use crate::select::{self, Cascade};
use crate::sort::{self, SortIndicator, SortOrder};
use crate::style::TreeScrollPolicy;
use crate::window::{self, VirtualWindow};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "keymap")]
use crate::keymap::TableKeyBindings;
#[cfg(feature = "keymap")]
use crossterm::event::KeyEvent;

/// Where [`TreeTableState::insert`] places a new subtree.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InsertPosition {
    /// First root.
    Top,
    /// Last root.
    Bottom,
    /// Sibling placed right before the reference node (top if it is unknown).
    Before(NodeId),
    /// Sibling placed right after the reference node's subtree (bottom if it is unknown).
    After(NodeId),
}

/// Table state: the flat pre-order node array, its active rows and the virtual window.
///
/// Every mutating call runs to completion and leaves the active list and the window
/// consistent. Only scroll requests are deferred, see [`Self::request_scroll`].
pub struct TreeTableState<T> {
    nodes: Vec<Node<T>>,
    // Fast lookup from node id to array index.
    index: FxHashMap<NodeId, usize>,
    // Array indexes of matching, non-hidden nodes, ascending.
    active: Vec<usize>,
    // Window bounds within `active`.
    window_start: usize,
    window_len: usize,
    ids: IdGenerator,
    next_pos: usize,
    options: TreeTableOptions,
    scroll_offset: f64,
    scroll: ScrollCoalescer,
    cursor: Option<NodeId>,
    cursor_row: Option<usize>,
    cursor_moved: bool,
    filtered: bool,
    // Set while the array deviates from insertion order.
    reordered: bool,
    sort_indicator: Option<SortIndicator>,
    #[cfg(feature = "keymap")]
    keymap: TableKeyBindings,
}

/// Snapshot of view state (expansion, selection, cursor, scroll) keyed by node id.
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TreeTableSnapshot {
    /// Expanded branch nodes.
    pub expanded: Vec<NodeId>,
    /// Selected nodes.
    pub selected: Vec<NodeId>,
    /// Node under the cursor.
    pub cursor: Option<NodeId>,
    /// Scroll offset in row-height units.
    pub scroll_offset: f64,
}

impl<T> Default for TreeTableState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TreeTableState<T> {
    /// Creates an empty state with default options.
    pub fn new() -> Self {
        Self::build(TreeTableOptions::default())
    }

    /// Creates an empty state after validating `options`.
    pub fn with_options(options: TreeTableOptions) -> Result<Self, OptionsError> {
        options.validate()?;
        Ok(Self::build(options))
    }

    fn build(options: TreeTableOptions) -> Self {
        Self {
            nodes: Vec::new(),
            index: FxHashMap::default(),
            active: Vec::new(),
            window_start: 0,
            window_len: 0,
            ids: IdGenerator::new(),
            next_pos: 0,
            options,
            scroll_offset: 0.0,
            scroll: ScrollCoalescer::default(),
            cursor: None,
            cursor_row: None,
            cursor_moved: false,
            filtered: false,
            reordered: false,
            sort_indicator: None,
            #[cfg(feature = "keymap")]
            keymap: TableKeyBindings::new(),
        }
    }

    #[cfg(feature = "keymap")]
    /// Returns a mutable reference to the key binding set.
    pub const fn keymap_mut(&mut self) -> &mut TableKeyBindings {
        &mut self.keymap
    }

    /// Returns the current options.
    pub const fn options(&self) -> &TreeTableOptions {
        &self.options
    }

    /// Replaces the options after validating them.
    pub fn set_options(&mut self, options: TreeTableOptions) -> Result<(), OptionsError> {
        options.validate()?;
        self.options = options;
        self.recompute_active();
        Ok(())
    }

    /// Updates the number of rows that fit in the viewport (at least one).
    pub fn set_viewport_rows(&mut self, rows: usize) {
        let rows = rows.max(1);
        if self.options.viewport_rows != rows {
            self.options.viewport_rows = rows;
            self.scroll_offset = self.clamp_offset(self.scroll_offset);
            self.update_window();
        }
    }

    // ------------------------------------------------------------------
    // Loading and structural edits
    // ------------------------------------------------------------------

    /// Replaces all data with the given tree.
    pub fn load_roots(&mut self, roots: Vec<TreeNode<T>>) {
        self.nodes = flatten::flatten_roots(roots, 0, 0, &mut self.ids);
        self.after_load();
    }

    /// Replaces all data with a flat list; every item becomes a visible root leaf.
    pub fn load_items<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.nodes = flatten::flatten_items(items, 0, &mut self.ids);
        self.after_load();
    }

    fn after_load(&mut self) {
        self.next_pos = self.nodes.len();
        self.filtered = false;
        self.reordered = false;
        self.sort_indicator = None;
        self.cursor = None;
        self.cursor_row = None;
        self.scroll_offset = 0.0;
        self.scroll.clear();
        tdebug!(nodes = self.nodes.len(), "loaded data");
        self.rebuild_index();
        self.recompute_active();
    }

    /// Inserts `item` (with its subtree) and returns the id of its root.
    ///
    /// The new nodes take the level of the reference node; an unknown reference falls back to
    /// [`InsertPosition::Top`] or [`InsertPosition::Bottom`].
    pub fn insert(&mut self, item: TreeNode<T>, position: InsertPosition) -> NodeId {
        let (at, level, hidden) = self.insert_slot(position);
        let id = self.ids.peek();
        let mut fresh = flatten::flatten_roots(vec![item], level, self.next_pos, &mut self.ids);
        self.next_pos += fresh.len();
        if let Some(root) = fresh.first_mut() {
            root.is_hidden = hidden;
        }
        self.nodes.splice(at..at, fresh);

        // Keep the default order equal to the current one while nothing is sorted; inside a
        // sorted table new nodes go last among their siblings when the order is restored.
        if !self.reordered {
            for (pos, node) in self.nodes.iter_mut().enumerate() {
                node.initial_pos = pos;
            }
            self.next_pos = self.nodes.len();
        }
        if self.filtered {
            self.mark_ancestors_matching(at);
        }

        tdebug!(%id, index = at, level, "inserted subtree");
        self.rebuild_index();
        self.recompute_active();
        id
    }

    fn insert_slot(&self, position: InsertPosition) -> (usize, usize, bool) {
        match position {
            InsertPosition::Top => (0, 0, false),
            InsertPosition::Bottom => (self.nodes.len(), 0, false),
            InsertPosition::Before(id) => self.index_of(id).map_or_else(
                || {
                    twarn!(%id, "unknown reference node, inserting at top");
                    (0, 0, false)
                },
                |idx| (idx, self.nodes[idx].level, self.nodes[idx].is_hidden),
            ),
            InsertPosition::After(id) => self.index_of(id).map_or_else(
                || {
                    twarn!(%id, "unknown reference node, inserting at bottom");
                    (self.nodes.len(), 0, false)
                },
                |idx| {
                    let end = descendant_range(&self.nodes, idx).end;
                    (end, self.nodes[idx].level, self.nodes[idx].is_hidden)
                },
            ),
        }
    }

    fn mark_ancestors_matching(&mut self, index: usize) {
        let Some(mut level) = self.nodes.get(index).map(|node| node.level) else {
            return;
        };
        for node in self.nodes[..index].iter_mut().rev() {
            if level == 0 {
                break;
            }
            if node.level < level {
                level = node.level;
                node.is_matching = true;
            }
        }
    }

    /// Deletes the given nodes together with their descendants.
    ///
    /// Unknown ids are skipped. Returns the number of removed nodes.
    pub fn delete_by_ids(&mut self, ids: &[NodeId]) -> usize {
        let mut doomed = vec![false; self.nodes.len()];
        for &id in ids {
            match self.index_of(id) {
                Some(idx) => {
                    let end = descendant_range(&self.nodes, idx).end;
                    doomed[idx..end].fill(true);
                }
                None => ttrace!(%id, "delete skipped unknown id"),
            }
        }

        let before = self.nodes.len();
        let mut flags = doomed.into_iter();
        self.nodes.retain(|_| !flags.next().unwrap_or(false));
        let removed = before - self.nodes.len();
        if removed == 0 {
            return 0;
        }

        tdebug!(removed, remaining = self.nodes.len(), "deleted nodes");
        self.rebuild_index();
        self.recompute_active();
        removed
    }

    // ------------------------------------------------------------------
    // Filter and sort
    // ------------------------------------------------------------------

    /// Recomputes matches from `predicate` and returns the number of matching nodes.
    ///
    /// Ancestors of a matching node always match, so every match stays reachable by expanding.
    pub fn filter<F>(&mut self, predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let matching = filter::apply_filter(&mut self.nodes, predicate);
        self.filtered = true;
        tdebug!(matching, total = self.nodes.len(), "filter applied");
        self.recompute_active();
        matching
    }

    /// Marks every node as matching again.
    pub fn clear_filter(&mut self) {
        filter::clear_filter(&mut self.nodes);
        self.filtered = false;
        tdebug!(total = self.nodes.len(), "filter cleared");
        self.recompute_active();
    }

    /// Returns `true` while a filter is applied.
    pub const fn is_filtered(&self) -> bool {
        self.filtered
    }

    /// Sorts every sibling group with `compare`, or restores insertion order for
    /// [`SortOrder::Default`]. Clears the column sort indicator.
    pub fn sort<F>(&mut self, order: SortOrder, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.apply_sort(order, compare);
        self.sort_indicator = None;
    }

    /// Sorts by the comparator of `columns[column]`.
    ///
    /// Returns `false` without touching the data when the column does not exist or is not
    /// sortable.
    pub fn sort_by_column<C>(&mut self, columns: &C, column: usize, order: SortOrder) -> bool
    where
        C: TableColumns<T> + ?Sized,
    {
        let Some(compare) = columns.columns().get(column).and_then(|def| def.compare) else {
            twarn!(column, "sort requested on a column without comparator");
            return false;
        };
        self.apply_sort(order, compare);
        self.sort_indicator = (order != SortOrder::Default).then_some(SortIndicator { column, order });
        true
    }

    fn apply_sort<F>(&mut self, order: SortOrder, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let nodes = std::mem::take(&mut self.nodes);
        self.nodes = sort::sort_nodes(nodes, order, compare);
        self.reordered = order != SortOrder::Default;
        tdebug!(?order, nodes = self.nodes.len(), "sorted");
        self.rebuild_index();
        self.recompute_active();
    }

    /// Returns the column and direction of the last column sort, if any.
    pub const fn sort_indicator(&self) -> Option<SortIndicator> {
        self.sort_indicator
    }

    // ------------------------------------------------------------------
    // Expand / collapse
    // ------------------------------------------------------------------

    /// Expands or collapses the given nodes; an empty slice targets every branch node.
    ///
    /// Collapsing hides the whole subtree. Expanding reveals the direct children only.
    /// Returns the number of branch nodes affected.
    pub fn set_expanded(&mut self, ids: &[NodeId], expanded: bool) -> usize {
        let targets: Vec<usize> = if ids.is_empty() {
            (0..self.nodes.len())
                .filter(|&idx| !self.nodes[idx].is_leaf)
                .collect()
        } else {
            let mut targets = self.resolve(ids);
            targets.sort_unstable();
            targets.dedup();
            targets
        };

        let applied = expand::set_expanded(&mut self.nodes, &targets, expanded);
        tdebug!(expanded, applied, "expansion changed");
        self.recompute_active();
        applied
    }

    /// Expands the given nodes (all branch nodes when empty).
    pub fn expand(&mut self, ids: &[NodeId]) -> usize {
        self.set_expanded(ids, true)
    }

    /// Collapses the given nodes (all branch nodes when empty).
    pub fn collapse(&mut self, ids: &[NodeId]) -> usize {
        self.set_expanded(ids, false)
    }

    /// Expands every branch node.
    pub fn expand_all(&mut self) -> usize {
        self.set_expanded(&[], true)
    }

    /// Collapses every branch node.
    pub fn collapse_all(&mut self) -> usize {
        self.set_expanded(&[], false)
    }

    /// Flips the expansion of a branch node. Returns `false` for leaves and unknown ids.
    pub fn toggle_expanded(&mut self, id: NodeId) -> bool {
        let Some(node) = self.index_of(id).map(|idx| &self.nodes[idx]) else {
            return false;
        };
        if node.is_leaf {
            return false;
        }
        let expand = !node.is_expanded;
        self.set_expanded(&[id], expand) > 0
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Selects the given nodes (all nodes when empty), subject to the selection cap.
    ///
    /// Returns the number of nodes that became selected.
    pub fn select(&mut self, ids: &[NodeId], cascade: Cascade) -> usize {
        self.change_selection(ids, cascade, true)
    }

    /// Deselects the given nodes (all nodes when empty).
    ///
    /// Returns the number of nodes that became deselected.
    pub fn deselect(&mut self, ids: &[NodeId], cascade: Cascade) -> usize {
        self.change_selection(ids, cascade, false)
    }

    /// Selects nodes in array order until the selection cap is reached.
    pub fn select_all(&mut self) -> usize {
        self.select(&[], Cascade::none())
    }

    /// Deselects every node.
    pub fn deselect_all(&mut self) -> usize {
        self.deselect(&[], Cascade::none())
    }

    /// Flips the selection of one node (and its cascade). Returns `true` if anything changed.
    pub fn toggle_selected(&mut self, id: NodeId, cascade: Cascade) -> bool {
        let Some(idx) = self.index_of(id) else {
            return false;
        };
        if self.nodes[idx].is_selected {
            self.deselect(&[id], cascade) > 0
        } else {
            self.select(&[id], cascade) > 0
        }
    }

    fn change_selection(&mut self, ids: &[NodeId], cascade: Cascade, selected: bool) -> usize {
        if selected && !self.options.selectable.is_enabled() {
            twarn!(selectable = ?self.options.selectable, "selection is disabled");
            return 0;
        }

        let targets: Vec<usize> = if ids.is_empty() {
            (0..self.nodes.len()).collect()
        } else {
            select::cascade_targets(&self.nodes, &self.resolve(ids), cascade)
        };
        let quota = if selected {
            self.options.selectable.quota(self.selected_count())
        } else {
            usize::MAX
        };

        let changed = select::apply_selection(&mut self.nodes, &targets, selected, quota);
        tdebug!(selected, requested = targets.len(), changed, "selection changed");
        changed
    }

    /// Returns the number of selected nodes.
    pub fn selected_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_selected).count()
    }

    /// Returns the ids of selected nodes in array order.
    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.is_selected)
            .map(|node| node.id)
            .collect()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns the total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the table holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the array indexes of the active rows, in display order.
    pub fn active_indexes(&self) -> &[usize] {
        &self.active
    }

    /// Returns the number of active rows.
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if the node currently occupies a row.
    pub fn is_active(&self, id: NodeId) -> bool {
        self.active_position(id).is_some()
    }

    /// Returns the array index of a node.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Returns the tree projection of a node.
    pub fn get_node(&self, id: NodeId) -> Option<TreeNodeView<'_, T>> {
        self.index_of(id).map(|idx| self.nodes[idx].tree_view())
    }

    /// Returns the list projection of a node.
    pub fn get_list_node(&self, id: NodeId) -> Option<ListNodeView<'_, T>> {
        self.index_of(id).map(|idx| self.nodes[idx].list_view())
    }

    /// Returns the tree projection of the node at an array index.
    pub fn node_at(&self, index: usize) -> Option<TreeNodeView<'_, T>> {
        self.nodes.get(index).map(Node::tree_view)
    }

    /// Iterates over all nodes in array order.
    pub fn tree_nodes(&self) -> impl ExactSizeIterator<Item = TreeNodeView<'_, T>> + '_ {
        self.nodes.iter().map(Node::tree_view)
    }

    /// Iterates over all nodes in array order, list projection.
    pub fn list_nodes(&self) -> impl ExactSizeIterator<Item = ListNodeView<'_, T>> + '_ {
        self.nodes.iter().map(Node::list_view)
    }

    /// Iterates over the active rows.
    pub fn active_nodes(&self) -> impl ExactSizeIterator<Item = TreeNodeView<'_, T>> + '_ {
        self.active.iter().map(|&idx| self.nodes[idx].tree_view())
    }

    fn resolve(&self, ids: &[NodeId]) -> Vec<usize> {
        ids.iter()
            .filter_map(|&id| {
                let idx = self.index_of(id);
                if idx.is_none() {
                    ttrace!(%id, "skipping unknown id");
                }
                idx
            })
            .collect()
    }

    fn active_position(&self, id: NodeId) -> Option<usize> {
        let idx = self.index_of(id)?;
        self.active.binary_search(&idx).ok()
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        let extra = self.nodes.len().saturating_sub(self.index.capacity());
        if extra > 0 {
            self.index.reserve(extra);
        }
        self.index
            .extend(self.nodes.iter().enumerate().map(|(idx, node)| (node.id, idx)));
    }

    /// Rebuilds the active list, then re-anchors the cursor and recomputes the window.
    pub fn recompute_active(&mut self) {
        self.active.clear();
        self.active.extend(
            self.nodes
                .iter()
                .enumerate()
                .filter_map(|(idx, node)| node.is_active().then_some(idx)),
        );
        self.scroll_offset = self.clamp_offset(self.scroll_offset);
        self.sync_cursor();
        self.update_window();
    }

    // ------------------------------------------------------------------
    // Virtual window and scrolling
    // ------------------------------------------------------------------

    /// Computes the window of active rows for arbitrary scroll parameters.
    pub fn compute_window(
        &self,
        scroll_offset: f64,
        row_height: f64,
        viewport_rows: usize,
        padding: usize,
    ) -> VirtualWindow<'_> {
        window::compute_window(&self.active, scroll_offset, row_height, viewport_rows, padding)
    }

    /// Returns the window for the current scroll offset and options.
    pub fn window(&self) -> VirtualWindow<'_> {
        let start = self.window_start;
        let len = self.window_len;
        let top = self.first_visible_row();
        VirtualWindow {
            start_active_index: start,
            visible_indexes: window::window_slice(&self.active, start, len),
            leading_rows: top.saturating_sub(start).min(len),
        }
    }

    fn update_window(&mut self) {
        let (start, len) = window::window_bounds(
            self.active.len(),
            self.scroll_offset,
            self.options.row_height,
            self.options.viewport_rows,
            self.options.padding,
        );
        self.window_start = start;
        self.window_len = len;
        ttrace!(start, len, active = self.active.len(), "window updated");
    }

    /// Returns the current scroll offset.
    pub const fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Returns the active row at the top of the viewport.
    pub fn first_visible_row(&self) -> usize {
        window::first_row(self.scroll_offset, self.options.row_height)
    }

    /// Returns the total scrollable height of the active rows.
    pub fn content_height(&self) -> f64 {
        window::content_height(self.active.len(), self.options.row_height)
    }

    /// Scrolls immediately, dropping any pending request.
    pub fn set_scroll_offset(&mut self, offset: f64) {
        self.scroll.clear();
        self.scroll_offset = self.clamp_offset(offset);
        self.update_window();
    }

    /// Records a scroll request; only the latest one is applied by
    /// [`Self::apply_pending_scroll`], once per frame.
    pub const fn request_scroll(&mut self, offset: f64) {
        self.scroll.request(offset);
    }

    /// Returns `true` if a scroll request waits for the next frame.
    pub const fn has_pending_scroll(&self) -> bool {
        self.scroll.is_pending()
    }

    /// Applies the latest scroll request, if any. Returns `true` if the window was recomputed.
    pub fn apply_pending_scroll(&mut self) -> bool {
        ttrace!(superseded = self.scroll.superseded(), "applying coalesced scroll");
        let Some(offset) = self.scroll.take() else {
            return false;
        };
        self.scroll_offset = self.clamp_offset(offset);
        self.update_window();
        true
    }

    fn clamp_offset(&self, offset: f64) -> f64 {
        if !offset.is_finite() {
            return 0.0;
        }
        let scrollable = self.active.len().saturating_sub(self.options.viewport_rows);
        let max = window::content_height(scrollable, self.options.row_height);
        offset.max(0.0).min(max)
    }

    #[allow(clippy::cast_precision_loss)]
    fn row_offset(&self, row: usize) -> f64 {
        row as f64 * self.options.row_height
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    /// Returns the node under the cursor.
    pub const fn cursor(&self) -> Option<NodeId> {
        self.cursor
    }

    /// Returns the cursor position within the active rows.
    pub const fn cursor_row(&self) -> Option<usize> {
        self.cursor_row
    }

    /// Places the cursor on an active node. Returns `false` if the node is not active.
    pub fn set_cursor(&mut self, id: NodeId) -> bool {
        let Some(row) = self.active_position(id) else {
            return false;
        };
        self.cursor = Some(id);
        self.cursor_row = Some(row);
        self.cursor_moved = true;
        true
    }

    /// Removes the cursor.
    pub const fn clear_cursor(&mut self) {
        self.cursor = None;
        self.cursor_row = None;
    }

    /// Moves the cursor to the previous active row.
    pub fn cursor_prev(&mut self) {
        let row = self.cursor_row.map_or(0, |row| row.saturating_sub(1));
        self.move_cursor_to(row);
    }

    /// Moves the cursor to the next active row.
    pub fn cursor_next(&mut self) {
        let row = self.cursor_row.map_or(0, |row| row + 1);
        self.move_cursor_to(row);
    }

    /// Moves the cursor to the first active row.
    pub fn cursor_first(&mut self) {
        self.move_cursor_to(0);
    }

    /// Moves the cursor to the last active row.
    pub fn cursor_last(&mut self) {
        self.move_cursor_to(usize::MAX);
    }

    /// Moves the cursor one viewport up.
    pub fn page_up(&mut self) {
        let step = self.options.viewport_rows.max(1);
        let row = self.cursor_row.map_or(0, |row| row.saturating_sub(step));
        self.move_cursor_to(row);
    }

    /// Moves the cursor one viewport down.
    pub fn page_down(&mut self) {
        let step = self.options.viewport_rows.max(1);
        let row = self.cursor_row.map_or(0, |row| row.saturating_add(step));
        self.move_cursor_to(row);
    }

    fn move_cursor_to(&mut self, row: usize) {
        if self.active.is_empty() {
            self.clear_cursor();
            return;
        }
        let row = row.min(self.active.len() - 1);
        self.cursor_row = Some(row);
        self.cursor = Some(self.nodes[self.active[row]].id);
        self.cursor_moved = true;
        self.ensure_cursor_visible();
    }

    // Keeps the cursor on the same node when it is still active, otherwise on the same row.
    fn sync_cursor(&mut self) {
        let Some(id) = self.cursor else {
            self.cursor_row = None;
            return;
        };
        if let Some(row) = self.active_position(id) {
            self.cursor_row = Some(row);
            return;
        }
        if self.active.is_empty() {
            self.clear_cursor();
            return;
        }
        let row = self.cursor_row.unwrap_or(0).min(self.active.len() - 1);
        self.cursor_row = Some(row);
        self.cursor = Some(self.nodes[self.active[row]].id);
    }

    /// Adjusts the scroll offset so the cursor row is inside the viewport.
    pub fn ensure_cursor_visible(&mut self) {
        self.ensure_cursor_visible_with_policy(TreeScrollPolicy::KeepInView);
    }

    /// Adjusts the scroll offset according to the provided scroll policy.
    pub fn ensure_cursor_visible_with_policy(&mut self, policy: TreeScrollPolicy) {
        let Some(row) = self.cursor_row else {
            return;
        };
        let viewport = self.options.viewport_rows.max(1);
        let top = self.first_visible_row();
        let new_top = match policy {
            TreeScrollPolicy::KeepInView => {
                if row < top {
                    row
                } else if row >= top + viewport {
                    row + 1 - viewport
                } else {
                    return;
                }
            }
            TreeScrollPolicy::CenterOnSelect => {
                let total = self.active.len();
                if total <= viewport {
                    0
                } else {
                    // Center the cursor, then clamp to the valid scroll range.
                    row.saturating_sub(viewport / 2).min(total - viewport)
                }
            }
        };
        self.set_scroll_offset(self.row_offset(new_top));
    }

    /// Returns whether the cursor moved since the last call, and resets the flag.
    pub const fn take_cursor_moved(&mut self) -> bool {
        let moved = self.cursor_moved;
        self.cursor_moved = false;
        moved
    }

    // ------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------

    /// Captures expansion, selection, cursor and scroll state.
    pub fn snapshot(&self) -> TreeTableSnapshot {
        TreeTableSnapshot {
            expanded: self
                .nodes
                .iter()
                .filter(|node| node.is_expanded)
                .map(|node| node.id)
                .collect(),
            selected: self.selected_ids(),
            cursor: self.cursor,
            scroll_offset: self.scroll_offset,
        }
    }

    /// Restores a snapshot taken from the same data.
    ///
    /// Unknown ids are ignored; visibility is re-derived from the restored expansion flags and
    /// the selection is truncated to the current cap in array order.
    pub fn restore(&mut self, snapshot: TreeTableSnapshot) {
        let expanded: FxHashSet<NodeId> = snapshot.expanded.into_iter().collect();
        let mut selected =
            FxHashSet::with_capacity_and_hasher(snapshot.selected.len(), FxBuildHasher);
        selected.extend(snapshot.selected);

        for node in &mut self.nodes {
            node.is_expanded = !node.is_leaf && expanded.contains(&node.id);
            node.is_selected = false;
        }
        expand::derive_hidden(&mut self.nodes);

        let targets: Vec<usize> = (0..self.nodes.len())
            .filter(|&idx| selected.contains(&self.nodes[idx].id))
            .collect();
        let quota = self.options.selectable.quota(0);
        select::apply_selection(&mut self.nodes, &targets, true, quota);

        self.scroll.clear();
        self.cursor = snapshot.cursor.filter(|id| self.index.contains_key(id));
        self.cursor_row = None;
        self.recompute_active();
        self.scroll_offset = self.clamp_offset(snapshot.scroll_offset);
        self.update_window();
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Handles a table action and returns the resulting event.
    pub fn handle_action<C>(&mut self, action: TableAction<C>) -> TableEvent<C> {
        if matches!(&action, TableAction::Custom(_)) {
            return TableEvent::Action(action);
        }

        // Bulk actions still apply while a filter hides every row.
        let needs_rows = matches!(
            &action,
            TableAction::CursorPrev
                | TableAction::CursorNext
                | TableAction::CursorFirst
                | TableAction::CursorLast
                | TableAction::PageUp
                | TableAction::PageDown
                | TableAction::ToggleNode
                | TableAction::ToggleSelection
        );
        if self.nodes.is_empty() || (needs_rows && self.active.is_empty()) {
            return TableEvent::Unhandled;
        }

        match action {
            TableAction::CursorPrev => {
                self.cursor_prev();
                TableEvent::Handled
            }
            TableAction::CursorNext => {
                self.cursor_next();
                TableEvent::Handled
            }
            TableAction::CursorFirst => {
                self.cursor_first();
                TableEvent::Handled
            }
            TableAction::CursorLast => {
                self.cursor_last();
                TableEvent::Handled
            }
            TableAction::PageUp => {
                self.page_up();
                TableEvent::Handled
            }
            TableAction::PageDown => {
                self.page_down();
                TableEvent::Handled
            }
            TableAction::ToggleNode => {
                if let Some(id) = self.cursor
                    && self.toggle_expanded(id)
                {
                    return TableEvent::Handled;
                }
                TableEvent::Unhandled
            }
            TableAction::ExpandAll => {
                self.expand_all();
                TableEvent::Handled
            }
            TableAction::CollapseAll => {
                self.collapse_all();
                TableEvent::Handled
            }
            TableAction::ToggleSelection => {
                if let Some(id) = self.cursor
                    && self.toggle_selected(id, self.options.cascade)
                {
                    return TableEvent::Handled;
                }
                TableEvent::Unhandled
            }
            TableAction::SelectAll => {
                self.select_all();
                TableEvent::Handled
            }
            TableAction::DeselectAll => {
                self.deselect_all();
                TableEvent::Handled
            }
            TableAction::Custom(_) => TableEvent::Action(action),
        }
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event into an action and handles it.
    pub fn handle_key(&mut self, key: KeyEvent) -> TableEvent<()> {
        let Some(action) = self.keymap.resolve(key) else {
            return TableEvent::Unhandled;
        };
        self.handle_action(action)
    }

    #[cfg(feature = "keymap")]
    /// Resolves a key event with a custom mapping and handles it.
    pub fn handle_key_with<C, F>(&mut self, key: KeyEvent, custom: F) -> TableEvent<C>
    where
        F: Fn(KeyEvent) -> Option<C>,
    {
        let Some(action) = self.keymap.resolve_with(key, custom) else {
            return TableEvent::Unhandled;
        };
        self.handle_action(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::CascadeDepth;

    // A
    // └─ B
    //    └─ C
    fn chain() -> Vec<TreeNode<&'static str>> {
        vec![TreeNode::new(
            "A",
            vec![TreeNode::new("B", vec![TreeNode::leaf("C")])],
        )]
    }

    // root
    // ├─ left
    // │  └─ grandchild
    // └─ right
    fn small_tree() -> Vec<TreeNode<&'static str>> {
        vec![TreeNode::new(
            "root",
            vec![
                TreeNode::new("left", vec![TreeNode::leaf("grandchild")]),
                TreeNode::leaf("right"),
            ],
        )]
    }

    fn active_values<'a>(state: &TreeTableState<&'a str>) -> Vec<&'a str> {
        state.active_nodes().map(|node| *node.value).collect()
    }

    fn id_of(state: &TreeTableState<&str>, value: &str) -> NodeId {
        state
            .tree_nodes()
            .find(|node| *node.value == value)
            .map(|node| node.id)
            .expect("value present")
    }

    #[test]
    fn flattens_small_tree_in_pre_order() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());

        let levels: Vec<_> = state.tree_nodes().map(|node| node.level).collect();
        assert_eq!(state.len(), 4);
        assert_eq!(levels, vec![0, 1, 2, 1]);
        assert_eq!(active_values(&state), vec!["root"]);
    }

    #[test]
    fn collapse_is_deep_expand_is_shallow() {
        let mut state = TreeTableState::new();
        state.load_roots(chain());
        let (a, b) = (id_of(&state, "A"), id_of(&state, "B"));

        state.expand(&[a]);
        assert_eq!(active_values(&state), vec!["A", "B"]);
        state.expand(&[b]);
        assert_eq!(active_values(&state), vec!["A", "B", "C"]);
        state.collapse(&[a]);
        assert_eq!(active_values(&state), vec!["A"]);
        state.expand(&[a]);
        assert_eq!(active_values(&state), vec!["A", "B"]);
        assert_eq!(state.get_node(b).map(|node| node.is_expanded), Some(true));
    }

    #[test]
    fn expanding_a_chain_in_one_call_opens_every_level() {
        let mut state = TreeTableState::new();
        state.load_roots(chain());
        let (a, b) = (id_of(&state, "A"), id_of(&state, "B"));

        state.expand(&[b, a]);
        assert_eq!(active_values(&state), vec!["A", "B", "C"]);

        state.collapse_all();
        assert_eq!(active_values(&state), vec!["A"]);
        state.expand_all();
        assert_eq!(active_values(&state), vec!["A", "B", "C"]);
    }

    #[test]
    fn selection_cap_truncates_in_call_order() {
        let mut state = TreeTableState::with_options(
            TreeTableOptions::default().selectable(crate::Selectable::Limit(2)),
        )
        .expect("valid options");
        state.load_items(["zero", "one", "two", "three"]);

        let changed = state.select(&[NodeId(1), NodeId(2), NodeId(3)], Cascade::none());
        assert_eq!(changed, 2);
        assert_eq!(state.selected_ids(), vec![NodeId(1), NodeId(2)]);

        state.deselect(&[NodeId(1)], Cascade::none());
        state.select_all();
        assert_eq!(state.selected_ids(), vec![NodeId(0), NodeId(2)]);
    }

    #[test]
    fn zero_cap_and_disabled_selection_are_noops() {
        let mut state = TreeTableState::with_options(
            TreeTableOptions::default().selectable(crate::Selectable::Limit(0)),
        )
        .expect("valid options");
        state.load_items(["a", "b"]);
        assert_eq!(state.select_all(), 0);

        let mut state = TreeTableState::with_options(
            TreeTableOptions::default().selectable(crate::Selectable::Disabled),
        )
        .expect("valid options");
        state.load_items(["a", "b"]);
        assert_eq!(state.select(&[NodeId(0)], Cascade::none()), 0);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn selection_cascades_and_keeps_active_rows() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        let left = id_of(&state, "left");
        let active_before = state.active_indexes().to_vec();

        state.select(&[left], Cascade::both());
        let selected: Vec<_> = state
            .tree_nodes()
            .filter(|node| node.is_selected)
            .map(|node| *node.value)
            .collect();
        assert_eq!(selected, vec!["root", "left", "grandchild"]);
        assert_eq!(state.active_indexes(), active_before.as_slice());

        state.deselect(&[left], Cascade::none().with_children(CascadeDepth::All));
        assert_eq!(state.selected_ids(), vec![id_of(&state, "root")]);
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let mut state = TreeTableState::new();
        state.load_items(["a", "b"]);

        assert_eq!(state.select(&[NodeId(99), NodeId(1)], Cascade::none()), 1);
        assert_eq!(state.expand(&[NodeId(42)]), 0);
        assert_eq!(state.delete_by_ids(&[NodeId(42)]), 0);
        assert!(state.get_node(NodeId(42)).is_none());
    }

    #[test]
    fn filter_keeps_path_to_match() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        state.expand_all();

        let matching = state.filter(|value| *value == "grandchild");
        assert_eq!(matching, 3);
        assert!(state.is_filtered());
        assert_eq!(active_values(&state), vec!["root", "left", "grandchild"]);

        state.clear_filter();
        assert_eq!(active_values(&state), vec!["root", "left", "grandchild", "right"]);
    }

    #[test]
    fn sort_round_trips_to_default() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        let original: Vec<_> = state.tree_nodes().map(|node| node.id).collect();

        state.sort(SortOrder::Desc, |a, b| a.cmp(b));
        let sorted: Vec<_> = state.tree_nodes().map(|node| *node.value).collect();
        assert_eq!(sorted, vec!["root", "right", "left", "grandchild"]);

        state.sort(SortOrder::Default, |a, b| a.cmp(b));
        let restored: Vec<_> = state.tree_nodes().map(|node| node.id).collect();
        assert_eq!(restored, original);
    }

    #[test]
    fn delete_removes_subtree() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        state.expand_all();

        let removed = state.delete_by_ids(&[id_of(&state, "left")]);
        assert_eq!(removed, 2);
        assert_eq!(active_values(&state), vec!["root", "right"]);
        assert_eq!(state.index_of(id_of(&state, "right")), Some(1));
    }

    #[test]
    fn insert_positions() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        state.expand_all();
        let left = id_of(&state, "left");

        let top = state.insert(TreeNode::leaf("top"), InsertPosition::Top);
        state.insert(TreeNode::leaf("bottom"), InsertPosition::Bottom);
        state.insert(TreeNode::leaf("before-left"), InsertPosition::Before(left));
        state.insert(TreeNode::leaf("after-left"), InsertPosition::After(left));

        let values: Vec<_> = state.tree_nodes().map(|node| (*node.value, node.level)).collect();
        assert_eq!(
            values,
            vec![
                ("top", 0),
                ("root", 0),
                ("before-left", 1),
                ("left", 1),
                ("grandchild", 2),
                ("after-left", 1),
                ("right", 1),
                ("bottom", 0),
            ]
        );
        assert_eq!(top, NodeId(4));
        assert!(state.is_active(id_of(&state, "after-left")));

        // Insertion order is the new default order.
        state.sort(SortOrder::Asc, |a, b| a.cmp(b));
        state.sort(SortOrder::Default, |a, b| a.cmp(b));
        let restored: Vec<_> = state.tree_nodes().map(|node| *node.value).collect();
        assert_eq!(restored[2], "before-left");
    }

    #[test]
    fn insert_under_collapsed_parent_stays_hidden() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        let right = id_of(&state, "right");

        let id = state.insert(TreeNode::leaf("late"), InsertPosition::After(right));
        assert!(!state.is_active(id));
        assert_eq!(state.get_node(id).map(|node| node.level), Some(1));

        let unknown = state.insert(TreeNode::leaf("fallback"), InsertPosition::After(NodeId(999)));
        assert_eq!(state.index_of(unknown), Some(state.len() - 1));
    }

    #[test]
    fn window_follows_scroll_requests() {
        let mut state = TreeTableState::with_options(
            TreeTableOptions::default().row_height(40.0).viewport_rows(10),
        )
        .expect("valid options");
        state.load_items(0..100);

        let window = state.compute_window(400.0, 40.0, 10, 2);
        assert_eq!(window.start_active_index, 8);
        assert!(window.len() <= 14);

        state.request_scroll(80.0);
        state.request_scroll(400.0);
        assert_eq!(state.window().start_active_index, 0);
        assert!(state.apply_pending_scroll());
        assert!(!state.apply_pending_scroll());
        assert_eq!(state.window().start_active_index, 8);
        assert_eq!(state.window().leading_rows, 2);
    }

    #[test]
    fn scroll_offset_is_clamped_to_content() {
        let mut state = TreeTableState::with_options(TreeTableOptions::default().viewport_rows(5))
            .expect("valid options");
        state.load_items(0..20);
        state.set_scroll_offset(1000.0);
        assert!((state.scroll_offset() - 15.0).abs() < f64::EPSILON);

        state.filter(|value| *value < 3);
        assert!(state.scroll_offset().abs() < f64::EPSILON);
    }

    #[test]
    fn cursor_tracks_node_across_mutations() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        state.expand_all();
        let right = id_of(&state, "right");

        assert!(state.set_cursor(right));
        assert_eq!(state.cursor_row(), Some(3));
        state.collapse(&[id_of(&state, "left")]);
        assert_eq!(state.cursor(), Some(right));
        assert_eq!(state.cursor_row(), Some(2));

        state.collapse_all();
        assert_eq!(state.cursor_row(), Some(0));
        assert_eq!(state.cursor(), Some(id_of(&state, "root")));
    }

    #[test]
    fn cursor_movement_keeps_viewport() {
        let mut state = TreeTableState::with_options(TreeTableOptions::default().viewport_rows(3))
            .expect("valid options");
        state.load_items(0..10);

        state.cursor_last();
        assert_eq!(state.cursor_row(), Some(9));
        assert_eq!(state.first_visible_row(), 7);
        state.page_up();
        assert_eq!(state.cursor_row(), Some(6));
        state.cursor_first();
        assert_eq!(state.first_visible_row(), 0);
        assert!(state.take_cursor_moved());
        assert!(!state.take_cursor_moved());
    }

    #[test]
    fn actions_drive_state() {
        let mut state = TreeTableState::new();
        state.load_roots(chain());

        assert_eq!(state.handle_action::<()>(TableAction::CursorNext), TableEvent::Handled);
        assert_eq!(state.handle_action::<()>(TableAction::ToggleNode), TableEvent::Handled);
        assert_eq!(active_values(&state), vec!["A", "B"]);
        assert_eq!(
            state.handle_action::<()>(TableAction::ToggleSelection),
            TableEvent::Handled
        );
        assert_eq!(state.selected_count(), 1);
        assert_eq!(
            state.handle_action(TableAction::Custom(7)),
            TableEvent::Action(TableAction::Custom(7))
        );

        let mut empty = TreeTableState::<u8>::new();
        assert_eq!(empty.handle_action::<()>(TableAction::ExpandAll), TableEvent::Unhandled);
    }

    #[test]
    fn bulk_actions_apply_when_filter_hides_every_row() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        state.expand_all();
        state.select_all();
        state.filter(|_| false);
        assert_eq!(state.active_len(), 0);

        assert_eq!(state.handle_action::<()>(TableAction::CursorNext), TableEvent::Unhandled);
        assert_eq!(state.handle_action::<()>(TableAction::ToggleNode), TableEvent::Unhandled);
        assert_eq!(state.handle_action::<()>(TableAction::DeselectAll), TableEvent::Handled);
        assert_eq!(state.selected_count(), 0);
        assert_eq!(state.handle_action::<()>(TableAction::CollapseAll), TableEvent::Handled);
        assert!(state.tree_nodes().all(|node| !node.is_expanded));
    }

    #[test]
    fn expand_order_does_not_change_visible_rows() {
        let mut one_call = TreeTableState::new();
        one_call.load_roots(chain());
        let (a, b) = (id_of(&one_call, "A"), id_of(&one_call, "B"));
        one_call.expand(&[b, a]);

        let mut two_calls = TreeTableState::new();
        two_calls.load_roots(chain());
        two_calls.expand(&[b]);
        two_calls.expand(&[a]);

        assert_eq!(active_values(&one_call), vec!["A", "B", "C"]);
        assert_eq!(active_values(&two_calls), active_values(&one_call));
    }

    #[test]
    fn snapshot_round_trip() {
        let mut state = TreeTableState::new();
        state.load_roots(small_tree());
        let (root, left) = (id_of(&state, "root"), id_of(&state, "left"));
        state.expand(&[root, left]);
        state.select(&[left], Cascade::none());
        state.set_cursor(left);
        let snapshot = state.snapshot();

        state.collapse_all();
        state.deselect_all();
        state.restore(snapshot.clone());

        assert_eq!(active_values(&state), vec!["root", "left", "grandchild", "right"]);
        assert_eq!(state.selected_ids(), vec![left]);
        assert_eq!(state.cursor(), Some(left));
        assert_eq!(state.snapshot(), snapshot);
    }

    #[test]
    fn empty_table_is_supported() {
        let mut state = TreeTableState::<u8>::new();
        state.load_roots(Vec::new());
        state.filter(|_| true);
        state.sort(SortOrder::Asc, u8::cmp);
        state.expand_all();

        assert!(state.is_empty());
        assert!(state.window().is_empty());
        assert_eq!(state.select_all(), 0);
    }

    #[cfg(feature = "keymap")]
    #[test]
    fn keys_resolve_through_bindings() {
        use crossterm::event::{KeyCode, KeyModifiers};

        let mut state = TreeTableState::new();
        state.load_items(["a", "b"]);

        let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(state.handle_key(down), TableEvent::Handled);
        assert_eq!(state.handle_key(down), TableEvent::Handled);
        assert_eq!(state.cursor(), Some(NodeId(1)));

        let unbound = KeyEvent::new(KeyCode::F(5), KeyModifiers::NONE);
        assert_eq!(state.handle_key(unbound), TableEvent::Unhandled);
    }
}
