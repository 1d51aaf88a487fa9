use ratatui::text::{Line, Span};

use crate::context::RowContext;
use crate::sort::SortOrder;

/// Glyph set for tree indentation, expanders and header sort indicators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeGlyphs<'a> {
    pub indent: &'a str,
    pub leaf: &'a str,
    pub expanded: &'a str,
    pub collapsed: &'a str,
    pub sort_asc: &'a str,
    pub sort_desc: &'a str,
}

impl Default for TreeGlyphs<'static> {
    fn default() -> Self {
        Self::unicode()
    }
}

impl TreeGlyphs<'static> {
    pub const fn unicode() -> Self {
        Self {
            indent: "  ",
            leaf: " ",
            expanded: "▼",
            collapsed: "▶",
            sort_asc: "▲",
            sort_desc: "▼",
        }
    }

    pub const fn ascii() -> Self {
        Self {
            indent: "  ",
            leaf: " ",
            expanded: "v",
            collapsed: ">",
            sort_asc: "^",
            sort_desc: "v",
        }
    }
}

impl<'a> TreeGlyphs<'a> {
    /// Returns the expander glyph for a row.
    pub const fn expander(&self, ctx: &RowContext) -> &'a str {
        if ctx.is_leaf {
            self.leaf
        } else if ctx.is_expanded {
            self.expanded
        } else {
            self.collapsed
        }
    }

    /// Returns the header indicator for a sort direction, empty for the default order.
    pub const fn sort_indicator(&self, order: SortOrder) -> &'a str {
        match order {
            SortOrder::Asc => self.sort_asc,
            SortOrder::Desc => self.sort_desc,
            SortOrder::Default => "",
        }
    }
}

/// Prefixes `line` with the indentation and expander of a tree row.
///
/// Style and alignment of `line` are kept.
pub fn tree_label_line<'a>(ctx: &RowContext, line: Line<'a>, glyphs: &TreeGlyphs<'a>) -> Line<'a> {
    let mut spans = Vec::with_capacity(ctx.level + line.spans.len() + 2);
    for _ in 0..ctx.level {
        spans.push(Span::raw(glyphs.indent));
    }
    spans.push(Span::raw(glyphs.expander(ctx)));
    spans.push(Span::raw(" "));
    spans.extend(line.spans);

    let mut label = Line::from(spans).style(line.style);
    label.alignment = line.alignment;
    label
}

/// Appends the sort indicator to a header label.
pub fn header_label<'a>(label: &'a str, order: Option<SortOrder>, glyphs: &TreeGlyphs<'a>) -> Line<'a> {
    match order.map(|order| glyphs.sort_indicator(order)) {
        Some(indicator) if !indicator.is_empty() => {
            Line::from(vec![Span::raw(label), Span::raw(" "), Span::raw(indicator)])
        }
        _ => Line::from(label),
    }
}
