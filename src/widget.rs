use ratatui::layout::Rect;
use ratatui::prelude::Buffer;
use ratatui::widgets::{
    Block, Borders, Cell, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget,
    Table, TableState,
};
use smallvec::SmallVec;

use crate::columns::TableColumns;
use crate::context::RowContext;
use crate::glyphs::{TreeGlyphs, header_label, tree_label_line};
use crate::state::TreeTableState;
use crate::style::{TableMode, TreeTableStyle};

/// Virtualized tree table widget (table + stateful).
///
/// Only the rows inside the viewport are built on each frame.
pub struct TreeTable<'a, T, C>
where
    C: TableColumns<T>,
{
    columns: &'a C,
    style: TreeTableStyle<'a>,
    glyphs: TreeGlyphs<'a>,
    mode: TableMode,
    _value: std::marker::PhantomData<fn(&T)>,
}

impl<'a, T, C> TreeTable<'a, T, C>
where
    C: TableColumns<T>,
{
    pub const fn new(columns: &'a C, style: TreeTableStyle<'a>) -> Self {
        Self {
            columns,
            style,
            glyphs: TreeGlyphs::unicode(),
            mode: TableMode::Tree,
            _value: std::marker::PhantomData,
        }
    }

    #[must_use]
    pub const fn glyphs(mut self, glyphs: TreeGlyphs<'a>) -> Self {
        self.glyphs = glyphs;
        self
    }

    #[must_use]
    pub const fn mode(mut self, mode: TableMode) -> Self {
        self.mode = mode;
        self
    }

    fn build_rows<'s>(&self, indexes: &[usize], state: &'s TreeTableState<T>) -> Vec<Row<'s>>
    where
        'a: 's,
    {
        let defs = self.columns.columns();
        let mut rows = Vec::with_capacity(indexes.len());
        for node in indexes.iter().filter_map(|&idx| state.node_at(idx)) {
            let ctx = RowContext::from_view(&node);
            let mut cells = SmallVec::<[Cell; 8]>::with_capacity(defs.len());
            for (col, def) in defs.iter().enumerate() {
                let line = def.render(node.value);
                let line = if col == 0 && self.mode == TableMode::Tree {
                    tree_label_line(&ctx, line, &self.glyphs)
                } else {
                    line
                };
                cells.push(Cell::from(line));
            }
            let mut row = Row::new(cells);
            if ctx.is_selected {
                row = row.style(self.style.selected_style);
            }
            rows.push(row);
        }
        rows
    }

    fn build_header(&self, state: &TreeTableState<T>) -> Option<Row<'a>> {
        if !self.columns.show_header() {
            return None;
        }
        let indicator = state.sort_indicator();
        let cells = self.columns.columns().iter().enumerate().map(|(col, def)| {
            let order = indicator
                .filter(|indicator| indicator.column == col)
                .map(|indicator| indicator.order);
            Cell::from(header_label(def.header, order, &self.glyphs).alignment(def.alignment))
        });
        Some(Row::new(cells).style(self.columns.header_style()))
    }

    fn render_scrollbar(
        area: Rect,
        buf: &mut Buffer,
        state: &TreeTableState<T>,
        inner_height: usize,
        scroll_rows: usize,
    ) {
        let scroll_len = scroll_rows.saturating_add(1);
        let position = state
            .first_visible_row()
            .min(scroll_len.saturating_sub(1));
        let mut scrollbar_state = ScrollbarState::new(scroll_len)
            .position(position)
            .viewport_content_length(inner_height);
        Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .render(area, buf, &mut scrollbar_state);
    }
}

impl<T, C> StatefulWidget for TreeTable<'_, T, C>
where
    C: TableColumns<T>,
{
    type State = TreeTableState<T>;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let header_height = u16::from(self.columns.show_header());
        let mut block = Block::default().borders(self.style.borders);
        if let Some(title) = self.style.title.clone() {
            block = block.title(title);
        }
        block = block
            .style(self.style.block_style)
            .border_style(self.style.border_style);

        let inner_height = block.inner(area).height.saturating_sub(header_height) as usize;
        state.set_viewport_rows(inner_height);
        state.apply_pending_scroll();
        if state.take_cursor_moved() {
            state.ensure_cursor_visible_with_policy(self.style.scroll_policy);
        }

        let state: &TreeTableState<T> = state;
        let window = state.window();
        let on_screen = window.on_screen(inner_height);
        let first_row = window.start_active_index.saturating_add(window.leading_rows);
        let rows = self.build_rows(on_screen, state);
        let header = self.build_header(state);

        // Rows are pre-sliced, so the table itself never scrolls.
        let mut table_state = TableState::default();
        if let Some(cursor) = state.cursor_row()
            && cursor >= first_row
            && cursor < first_row + on_screen.len()
        {
            table_state.select(Some(cursor - first_row));
        }

        let scroll_rows = state.active_len().saturating_sub(inner_height);
        let (table_area, table_block, scrollbar_area) = if scroll_rows > 0 {
            let table_area = Rect {
                width: area.width.saturating_sub(1),
                ..area
            };
            let scrollbar_area = Rect {
                x: area.x + area.width.saturating_sub(1),
                y: area.y,
                width: 1,
                height: area.height,
            };
            let mut table_borders = self.style.borders;
            table_borders.remove(Borders::RIGHT);
            (table_area, block.borders(table_borders), Some(scrollbar_area))
        } else {
            (area, block, None)
        };

        let constraints = self.columns.constraints();
        let mut table = Table::new(rows, constraints.iter().copied())
            .style(self.style.block_style)
            .block(table_block)
            .row_highlight_style(self.style.highlight_style)
            .highlight_symbol(self.style.highlight_symbol);
        if let Some(header) = header {
            table = table.header(header);
        }
        table.render(table_area, buf, &mut table_state);

        if let Some(scrollbar_area) = scrollbar_area {
            Self::render_scrollbar(scrollbar_area, buf, state, inner_height, scroll_rows);
        }
    }
}
