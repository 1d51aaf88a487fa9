// Minimal example: a small file tree with a name and a size column, sorted by size.
use std::cmp::Ordering;

use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::prelude::Buffer;
use ratatui::text::Line;
use ratatui::widgets::StatefulWidget;

use tui_treetable::{
    Cascade, ColumnDef, SimpleColumns, SortOrder, TreeNode, TreeTable, TreeTableState,
    TreeTableStyle,
};

struct Entry {
    name: &'static str,
    size: u64,
}

const fn entry(name: &'static str, size: u64) -> Entry {
    Entry { name, size }
}

fn name_cell(entry: &Entry) -> Line<'_> {
    Line::from(entry.name)
}

fn size_cell(entry: &Entry) -> Line<'_> {
    Line::from(entry.size.to_string())
}

fn by_size(a: &Entry, b: &Entry) -> Ordering {
    a.size.cmp(&b.size)
}

fn main() {
    // Columns are plain data; the first one gets the tree glyphs.
    let columns = SimpleColumns::new([
        ColumnDef::new("Name", Constraint::Fill(1), name_cell),
        ColumnDef::new("Size", Constraint::Length(8), size_cell)
            .sortable(by_size)
            .align(Alignment::Right),
    ]);

    // Nested input is flattened once on load.
    let tree = vec![
        TreeNode::new(
            entry("src", 27),
            vec![
                TreeNode::leaf(entry("lib.rs", 12)),
                TreeNode::leaf(entry("state.rs", 15)),
            ],
        ),
        TreeNode::leaf(entry("Cargo.toml", 2)),
    ];

    // State holds nodes, expansion, selection and scroll; it must live across frames.
    let mut state = TreeTableState::new();
    state.load_roots(tree);
    state.expand_all();
    state.sort_by_column(&columns, 1, SortOrder::Desc);
    let src = state
        .tree_nodes()
        .find(|node| node.value.name == "src")
        .map(|node| node.id);
    if let Some(id) = src {
        state.select(&[id], Cascade::children());
    }

    let widget = TreeTable::new(&columns, TreeTableStyle::default());

    // Render into an in-memory buffer (no terminal required for the example).
    let area = Rect::new(0, 0, 40, 8);
    let mut buffer = Buffer::empty(area);

    widget.render(area, &mut buffer, &mut state);
}
