//! Virtualized hierarchical table for ratatui: a flat pre-order node model with filtering,
//! hierarchical sorting, expand/collapse, cascading selection and a scroll-driven row window.
//!
//! The data lives in [`TreeTableState`] as one array in pre-order, each node tagged with its
//! level. Subtrees are contiguous ranges, so every operation works on slices of that array and
//! the rows on screen are cut from the list of active (matching and not hidden) nodes.
//!
//! Feature flags:
//! - `keymap`: crossterm-based key bindings and `TreeTableState::handle_key*` helpers.
//! - `serde`: serde support for node ids, options and `TreeTableSnapshot`.
//! - `tracing`: debug and trace events for mutations and window updates.

#[macro_use]
mod macros;

mod action;
mod columns;
mod context;
mod expand;
mod filter;
mod flatten;
mod glyphs;
#[cfg(feature = "keymap")]
mod keymap;
mod node;
mod options;
pub mod prelude;
mod scroll;
mod select;
mod sort;
mod state;
mod style;
mod widget;
mod window;

pub use action::{TableAction, TableEvent};
pub use columns::{CellFn, ColumnDef, CompareFn, SimpleColumns, TableColumns};
pub use context::RowContext;
pub use glyphs::{TreeGlyphs, header_label, tree_label_line};
#[cfg(feature = "keymap")]
pub use keymap::{KeymapProfile, TableKeyBindings};
pub use node::{ListNodeView, NodeId, TreeNode, TreeNodeView};
pub use options::{DEFAULT_PADDING, OptionsError, TreeTableOptions};
pub use select::{Cascade, CascadeDepth, Selectable};
pub use sort::{SortIndicator, SortOrder};
pub use state::{InsertPosition, TreeTableSnapshot, TreeTableState};
pub use style::{TableMode, TreeScrollPolicy, TreeTableStyle};
pub use widget::TreeTable;
pub use window::{VirtualWindow, compute_window, content_height};
