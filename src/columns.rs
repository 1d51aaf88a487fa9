use std::cmp::Ordering;

use ratatui::layout::{Alignment, Constraint};
use ratatui::style::Style;
use ratatui::text::Line;
use smallvec::SmallVec;

/// Function pointer type for rendering a single column cell.
pub type CellFn<T> = for<'a> fn(&'a T) -> Line<'a>;

/// Function pointer type for comparing two values within one column.
pub type CompareFn<T> = fn(&T, &T) -> Ordering;

/// Column definition: header label, width constraint, cell renderer and optional comparator.
pub struct ColumnDef<T> {
    /// Header label for the column.
    pub header: &'static str,
    /// Width constraint for the column.
    pub constraint: Constraint,
    /// Horizontal alignment of header and cells.
    pub alignment: Alignment,
    /// Renderer for the column cell.
    pub cell: CellFn<T>,
    /// Comparator used by column sorting; `None` makes the column unsortable.
    pub compare: Option<CompareFn<T>>,
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ColumnDef<T> {}

impl<T> ColumnDef<T> {
    /// Creates an unsortable, left-aligned column.
    pub const fn new(header: &'static str, constraint: Constraint, cell: CellFn<T>) -> Self {
        Self {
            header,
            constraint,
            alignment: Alignment::Left,
            cell,
            compare: None,
        }
    }

    /// Makes the column sortable with `compare`.
    #[must_use]
    pub const fn sortable(mut self, compare: CompareFn<T>) -> Self {
        self.compare = Some(compare);
        self
    }

    /// Sets the horizontal alignment.
    #[must_use]
    pub const fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Returns `true` if the column has a comparator.
    pub const fn is_sortable(&self) -> bool {
        self.compare.is_some()
    }

    /// Renders the cell of `value` with the column alignment.
    pub fn render<'a>(&self, value: &'a T) -> Line<'a> {
        (self.cell)(value).alignment(self.alignment)
    }
}

/// Column set of a table. The first column carries the tree glyphs in tree mode.
pub trait TableColumns<T> {
    /// Returns the column definitions, in display order.
    fn columns(&self) -> &[ColumnDef<T>];

    /// Returns the width constraints of all columns.
    fn constraints(&self) -> SmallVec<[Constraint; 8]> {
        self.columns().iter().map(|column| column.constraint).collect()
    }

    /// Returns `false` to hide the header row.
    fn show_header(&self) -> bool {
        true
    }

    /// Returns the header row style.
    fn header_style(&self) -> Style {
        Style::default()
    }
}

/// Fixed set of `N` columns with optional header.
pub struct SimpleColumns<const N: usize, T> {
    columns: [ColumnDef<T>; N],
    header_style: Style,
    show_header: bool,
}

impl<const N: usize, T> SimpleColumns<N, T> {
    /// Creates a new fixed column set.
    pub const fn new(columns: [ColumnDef<T>; N]) -> Self {
        Self {
            columns,
            header_style: Style::new(),
            show_header: true,
        }
    }

    /// Sets the header row style.
    #[must_use]
    pub const fn header_style(mut self, style: Style) -> Self {
        self.header_style = style;
        self
    }

    /// Disables the header row.
    #[must_use]
    pub const fn without_header(mut self) -> Self {
        self.show_header = false;
        self
    }
}

impl<const N: usize, T> TableColumns<T> for SimpleColumns<N, T> {
    fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    fn show_header(&self) -> bool {
        self.show_header
    }

    fn header_style(&self) -> Style {
        self.header_style
    }
}

impl<T> TableColumns<T> for Vec<ColumnDef<T>> {
    fn columns(&self) -> &[ColumnDef<T>] {
        self
    }
}
