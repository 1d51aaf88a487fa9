use crate::select::{Cascade, Selectable};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rows rendered above and below the viewport while scrolling.
pub const DEFAULT_PADDING: usize = 2;

/// Behavioral configuration of a table state.
///
/// With the `serde` feature enabled, this type derives `Serialize`/`Deserialize`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeTableOptions {
    /// Height of one row in scroll-offset units (1.0 for terminal rows).
    pub row_height: f64,
    /// Number of rows that fit in the viewport.
    pub viewport_rows: usize,
    /// Off-screen rows kept on each side of the viewport.
    pub padding: usize,
    /// Selection cap.
    pub selectable: Selectable,
    /// Cascade used by the `ToggleSelection` action.
    pub cascade: Cascade,
}

impl Default for TreeTableOptions {
    fn default() -> Self {
        Self {
            row_height: 1.0,
            viewport_rows: 10,
            padding: DEFAULT_PADDING,
            selectable: Selectable::Unlimited,
            cascade: Cascade::none(),
        }
    }
}

impl TreeTableOptions {
    #[must_use]
    pub const fn row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    #[must_use]
    pub const fn viewport_rows(mut self, rows: usize) -> Self {
        self.viewport_rows = rows;
        self
    }

    #[must_use]
    pub const fn padding(mut self, padding: usize) -> Self {
        self.padding = padding;
        self
    }

    #[must_use]
    pub const fn selectable(mut self, selectable: Selectable) -> Self {
        self.selectable = selectable;
        self
    }

    #[must_use]
    pub const fn cascade(mut self, cascade: Cascade) -> Self {
        self.cascade = cascade;
        self
    }

    /// Checks the geometric settings.
    ///
    /// A selection cap of zero is accepted: it simply turns selection requests into no-ops.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            return Err(OptionsError::InvalidRowHeight(self.row_height));
        }
        if self.viewport_rows == 0 {
            return Err(OptionsError::EmptyViewport);
        }
        Ok(())
    }
}

/// Rejected table configuration.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum OptionsError {
    /// Row height must be a positive finite number.
    #[error("row height must be positive and finite, got {0}")]
    InvalidRowHeight(f64),
    /// The viewport must hold at least one row.
    #[error("viewport must hold at least one row")]
    EmptyViewport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(TreeTableOptions::default().validate(), Ok(()));
        assert_eq!(TreeTableOptions::default().padding, 2);
    }

    #[test]
    fn rejects_bad_row_height() {
        let options = TreeTableOptions::default().row_height(0.0);
        assert_eq!(options.validate(), Err(OptionsError::InvalidRowHeight(0.0)));

        let options = TreeTableOptions::default().row_height(f64::INFINITY);
        assert!(options.validate().is_err());
    }

    #[test]
    fn rejects_empty_viewport() {
        let options = TreeTableOptions::default().viewport_rows(0);
        assert_eq!(options.validate(), Err(OptionsError::EmptyViewport));
        assert_eq!(
            OptionsError::EmptyViewport.to_string(),
            "viewport must hold at least one row"
        );
    }

    #[test]
    fn zero_cap_is_accepted() {
        let options = TreeTableOptions::default().selectable(Selectable::Limit(0));
        assert!(options.validate().is_ok());
    }
}
