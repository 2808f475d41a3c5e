//! Tenner Grid compilation errors.

use crate::csp::CspError;

/// What is wrong with a grid handed to [`TennerBoard::new`](super::TennerBoard::new)
/// or loaded from a serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GridDefect {
    /// Row count outside `3..=7`.
    #[error("{0} rows, expected between 3 and 7")]
    RowCount(usize),

    /// A row without exactly 10 cells.
    #[error("row {row} has {len} cells, expected 10")]
    RowLength {
        /// Row index.
        row: usize,
        /// Number of cells found.
        len: usize,
    },

    /// A cell that is neither `-1` (empty) nor a digit.
    #[error("cell ({row}, {col}) holds {value}, expected -1 or a digit 0-9")]
    CellValue {
        /// Row index.
        row: usize,
        /// Column index.
        col: usize,
        /// The offending value.
        value: i32,
    },

    /// A stored variable grid whose cell list does not fill `rows × 10`.
    #[error("{found} cells, expected {expected}")]
    CellCount {
        /// `rows × 10`.
        expected: usize,
        /// Number of cells found.
        found: usize,
    },
}

/// Errors raised while building a Tenner Grid model.
///
/// Board errors are raised before any variable exists; a model is either
/// returned complete or not at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TennerError {
    /// The grid has the wrong shape or an out-of-range cell.
    #[error("malformed grid: {0}")]
    MalformedGrid(GridDefect),

    /// The column target vector does not have one entry per column.
    #[error("column target vector has {0} entries, expected 10")]
    TargetVectorMismatch(usize),

    /// The CSP container rejected a variable or constraint.
    #[error(transparent)]
    Model(#[from] CspError),
}

impl From<GridDefect> for TennerError {
    fn from(defect: GridDefect) -> Self {
        Self::MalformedGrid(defect)
    }
}
