use rustc_hash::{FxBuildHasher, FxHashSet};

use crate::node::{Node, descendant_range};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How far a selection change propagates in one direction.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CascadeDepth {
    /// No propagation.
    #[default]
    None,
    /// Propagate without limit.
    All,
    /// Propagate to at most this many nodes.
    Limit(usize),
}

impl CascadeDepth {
    /// Maximum number of nodes reached, `None` when disabled.
    const fn max_nodes(self) -> Option<usize> {
        match self {
            Self::None | Self::Limit(0) => None,
            Self::All => Some(usize::MAX),
            Self::Limit(limit) => Some(limit),
        }
    }
}

impl From<bool> for CascadeDepth {
    fn from(enabled: bool) -> Self {
        if enabled { Self::All } else { Self::None }
    }
}

impl From<usize> for CascadeDepth {
    fn from(limit: usize) -> Self {
        Self::Limit(limit)
    }
}

/// Selection propagation to descendants and/or ancestors.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cascade {
    /// Descendants reached, counted in array order.
    pub with_children: CascadeDepth,
    /// Ancestors reached, nearest first.
    pub with_parents: CascadeDepth,
}

impl Cascade {
    /// No propagation: only the targeted nodes change.
    pub const fn none() -> Self {
        Self {
            with_children: CascadeDepth::None,
            with_parents: CascadeDepth::None,
        }
    }

    /// Propagates to every descendant.
    pub const fn children() -> Self {
        Self {
            with_children: CascadeDepth::All,
            with_parents: CascadeDepth::None,
        }
    }

    /// Propagates to every ancestor.
    pub const fn parents() -> Self {
        Self {
            with_children: CascadeDepth::None,
            with_parents: CascadeDepth::All,
        }
    }

    /// Propagates in both directions without limit.
    pub const fn both() -> Self {
        Self {
            with_children: CascadeDepth::All,
            with_parents: CascadeDepth::All,
        }
    }

    #[must_use]
    pub const fn with_children(mut self, depth: CascadeDepth) -> Self {
        self.with_children = depth;
        self
    }

    #[must_use]
    pub const fn with_parents(mut self, depth: CascadeDepth) -> Self {
        self.with_parents = depth;
        self
    }

    const fn is_none(self) -> bool {
        self.with_children.max_nodes().is_none() && self.with_parents.max_nodes().is_none()
    }
}

/// Table-level limit on how many nodes may be selected at once.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Selectable {
    /// Selection is disabled.
    Disabled,
    /// Any number of nodes may be selected.
    #[default]
    Unlimited,
    /// At most this many nodes may be selected; `Limit(0)` disables selection.
    Limit(usize),
}

impl Selectable {
    /// Number of additional nodes that may still be selected.
    pub const fn quota(self, selected: usize) -> usize {
        match self {
            Self::Disabled => 0,
            Self::Unlimited => usize::MAX,
            Self::Limit(limit) => limit.saturating_sub(selected),
        }
    }

    /// Returns `true` if selection requests can have any effect.
    pub const fn is_enabled(self) -> bool {
        !matches!(self, Self::Disabled | Self::Limit(0))
    }
}

impl From<bool> for Selectable {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Unlimited
        } else {
            Self::Disabled
        }
    }
}

impl From<usize> for Selectable {
    fn from(limit: usize) -> Self {
        Self::Limit(limit)
    }
}

/// Expands `targets` with their cascaded descendants and ancestors.
///
/// Order is preserved: each target is followed by its descendants in array order and then its
/// ancestors, nearest first. Duplicates keep their first position.
pub(crate) fn cascade_targets<T>(nodes: &[Node<T>], targets: &[usize], cascade: Cascade) -> Vec<usize> {
    if cascade.is_none() {
        return dedup(targets.iter().copied(), targets.len());
    }

    let mut expanded = Vec::with_capacity(targets.len());
    for &idx in targets {
        if idx >= nodes.len() {
            continue;
        }
        expanded.push(idx);

        if let Some(max) = cascade.with_children.max_nodes() {
            expanded.extend(descendant_range(nodes, idx).take(max));
        }

        if let Some(max) = cascade.with_parents.max_nodes() {
            let mut level = nodes[idx].level;
            let mut added = 0;
            for ancestor in (0..idx).rev() {
                if added == max || level == 0 {
                    break;
                }
                if nodes[ancestor].level < level {
                    level = nodes[ancestor].level;
                    expanded.push(ancestor);
                    added += 1;
                }
            }
        }
    }

    let hint = expanded.len();
    dedup(expanded.into_iter(), hint)
}

fn dedup(indexes: impl Iterator<Item = usize>, hint: usize) -> Vec<usize> {
    let mut seen = FxHashSet::with_capacity_and_hasher(hint, FxBuildHasher);
    indexes.filter(|idx| seen.insert(*idx)).collect()
}

/// Sets `is_selected` on `indexes` in order, selecting at most `quota` nodes that were not
/// already selected. Returns the number of nodes whose flag changed.
pub(crate) fn apply_selection<T>(
    nodes: &mut [Node<T>],
    indexes: &[usize],
    selected: bool,
    mut quota: usize,
) -> usize {
    let mut changed = 0;
    for &idx in indexes {
        let Some(node) = nodes.get_mut(idx) else {
            continue;
        };
        if node.is_selected == selected {
            continue;
        }
        if selected {
            if quota == 0 {
                break;
            }
            quota -= 1;
        }
        node.is_selected = selected;
        changed += 1;
    }
    changed
}
