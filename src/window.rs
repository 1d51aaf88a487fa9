/// Slice of the active rows that must be materialized for a scroll position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VirtualWindow<'a> {
    /// Position of the first rendered row within the active list.
    pub start_active_index: usize,
    /// Node indexes to render, padding rows included.
    pub visible_indexes: &'a [usize],
    /// Number of padding rows in `visible_indexes` above the first on-screen row.
    pub leading_rows: usize,
}

impl VirtualWindow<'_> {
    /// Returns the window of an empty table.
    pub const fn empty() -> Self {
        Self {
            start_active_index: 0,
            visible_indexes: &[],
            leading_rows: 0,
        }
    }

    /// Node indexes of the rows that fall inside the viewport itself.
    pub fn on_screen(&self, viewport_rows: usize) -> &[usize] {
        let start = self.leading_rows.min(self.visible_indexes.len());
        let end = start.saturating_add(viewport_rows).min(self.visible_indexes.len());
        &self.visible_indexes[start..end]
    }

    pub const fn len(&self) -> usize {
        self.visible_indexes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.visible_indexes.is_empty()
    }
}

/// Returns the active row under `scroll_offset`.
///
/// A non-positive or non-finite row height yields row 0 instead of dividing by it.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn first_row(scroll_offset: f64, row_height: f64) -> usize {
    if !(row_height.is_finite() && row_height > 0.0) || !scroll_offset.is_finite() {
        return 0;
    }
    // Float-to-int casts saturate, so negative offsets land on 0.
    (scroll_offset / row_height).floor() as usize
}

/// Start position and length (within the active list) of the window for a scroll offset.
///
/// The start follows `max(0, first_row - padding)` even past the end of the list; only the
/// length is clamped, so a window beyond the last row is empty.
pub(crate) fn window_bounds(
    active_len: usize,
    scroll_offset: f64,
    row_height: f64,
    viewport_rows: usize,
    padding: usize,
) -> (usize, usize) {
    let top = first_row(scroll_offset, row_height);
    let start = top.saturating_sub(padding);
    let span = viewport_rows.saturating_add(padding.saturating_mul(2));
    let end = start.saturating_add(span).min(active_len);
    (start, end.saturating_sub(start))
}

/// Slice of `active` covered by a window from [`window_bounds`].
pub(crate) fn window_slice(active: &[usize], start: usize, len: usize) -> &[usize] {
    let from = start.min(active.len());
    &active[from..from + len]
}

/// Computes the window of `active` rows to render.
///
/// `start_active_index = max(0, floor(scroll_offset / row_height) - padding)` and the window
/// holds up to `viewport_rows + 2 * padding` rows from there. Padding rows are rendered off
/// screen so fast scrolling does not show blank rows before the next recompute.
pub fn compute_window(
    active: &[usize],
    scroll_offset: f64,
    row_height: f64,
    viewport_rows: usize,
    padding: usize,
) -> VirtualWindow<'_> {
    let (start, len) = window_bounds(active.len(), scroll_offset, row_height, viewport_rows, padding);
    let top = first_row(scroll_offset, row_height);
    VirtualWindow {
        start_active_index: start,
        visible_indexes: window_slice(active, start, len),
        leading_rows: top.saturating_sub(start).min(len),
    }
}

/// Total scrollable height of `active_len` rows.
#[allow(clippy::cast_precision_loss)]
pub fn content_height(active_len: usize, row_height: f64) -> f64 {
    active_len as f64 * row_height.max(0.0)
}
