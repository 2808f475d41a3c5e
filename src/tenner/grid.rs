//! Variable factory and the positional view over a model's variables.

use super::board::{Cell, TennerBoard, COLUMNS};
#[cfg(feature = "serde")]
use super::error::GridDefect;
use crate::csp::{CspError, CspModel, Value, VarId, Variable};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Domain of an empty cell.
pub const DIGITS: std::ops::Range<Value> = 0..10;

/// Stable variable name for the cell at `(row, col)`.
pub fn cell_name(row: usize, col: usize) -> String {
    format!("r{row}c{col}")
}

/// Creates the variable for one cell: `{v}` when pre-set, `{0..9}` otherwise.
pub fn cell_variable(cell: Cell, name: impl Into<String>) -> Variable {
    match cell.value() {
        Some(value) => Variable::fixed(name, value),
        None => Variable::new(name, DIGITS),
    }
}

/// `n × 10` view of the variables of a compiled model, indexed
/// `grid[(row, col)]`.
///
/// The [`CspModel`] owns the variables; the grid only records which
/// handle sits at each position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "GridParts"))]
pub struct VariableGrid {
    rows: usize,
    cells: Vec<VarId>,
}

impl VariableGrid {
    /// Adds one variable per cell to `model`, row by row, and records them.
    pub fn create(board: &TennerBoard, model: &mut CspModel) -> Result<Self, CspError> {
        let mut cells = Vec::with_capacity(board.row_count() * COLUMNS);
        for (row, line) in board.rows().iter().enumerate() {
            for (col, &cell) in line.iter().enumerate() {
                cells.push(model.add_variable(cell_variable(cell, cell_name(row, col)))?);
            }
        }
        Ok(Self {
            rows: board.row_count(),
            cells,
        })
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows
    }

    /// Handle at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<VarId> {
        if row < self.rows && col < COLUMNS {
            Some(self.cells[row * COLUMNS + col])
        } else {
            None
        }
    }

    /// Handles of one row, left to right.
    pub fn row(&self, row: usize) -> &[VarId] {
        &self.cells[row * COLUMNS..(row + 1) * COLUMNS]
    }

    /// Handles of one column, top to bottom.
    pub fn column(&self, col: usize) -> Vec<VarId> {
        self.cells.iter().skip(col).step_by(COLUMNS).copied().collect()
    }

    /// Iterates `((row, col), handle)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = ((usize, usize), VarId)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &id)| ((i / COLUMNS, i % COLUMNS), id))
    }
}

impl Index<(usize, usize)> for VariableGrid {
    type Output = VarId;

    fn index(&self, (row, col): (usize, usize)) -> &VarId {
        assert!(col < COLUMNS, "column {col} out of range");
        &self.cells[row * COLUMNS + col]
    }
}

#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct GridParts {
    rows: usize,
    cells: Vec<VarId>,
}

#[cfg(feature = "serde")]
impl TryFrom<GridParts> for VariableGrid {
    type Error = GridDefect;

    fn try_from(parts: GridParts) -> Result<Self, GridDefect> {
        let expected = parts.rows.saturating_mul(COLUMNS);
        if parts.cells.len() != expected {
            return Err(GridDefect::CellCount {
                expected,
                found: parts.cells.len(),
            });
        }
        Ok(Self {
            rows: parts.rows,
            cells: parts.cells,
        })
    }
}

/// Direction from the first cell of an adjacency pair to the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adjacency {
    /// `(r, c)` → `(r, c + 1)`
    Right,
    /// `(r, c)` → `(r + 1, c)`
    Down,
    /// `(r, c)` → `(r + 1, c + 1)`
    Diagonal,
    /// `(r, c + 1)` → `(r + 1, c)`
    AntiDiagonal,
}

impl Adjacency {
    /// Short label used in constraint names.
    pub fn label(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Down => "down",
            Self::Diagonal => "diagonal",
            Self::AntiDiagonal => "anti-diagonal",
        }
    }
}

/// A pair of touching cells that must hold different digits.
pub type AdjacentPair = (Adjacency, (usize, usize), (usize, usize));

/// Enumerates the touching cell pairs of an `rows × 10` grid.
///
/// For each column `c` in `0..9` and row `r`: every row gets "right";
/// rows above the last also get "down" and "diagonal". That is
/// `9·(rows-1)·3 + 9` pairs. With `complete`, the anti-diagonal pairs and
/// the vertical pairs of column 9 are appended, so every two cells that
/// touch appear once.
pub fn adjacent_pairs(rows: usize, complete: bool) -> Vec<AdjacentPair> {
    let mut pairs = Vec::new();
    for col in 0..COLUMNS - 1 {
        for row in 0..rows {
            pairs.push((Adjacency::Right, (row, col), (row, col + 1)));
            if row + 1 < rows {
                pairs.push((Adjacency::Down, (row, col), (row + 1, col)));
                pairs.push((Adjacency::Diagonal, (row, col), (row + 1, col + 1)));
                if complete {
                    pairs.push((Adjacency::AntiDiagonal, (row, col + 1), (row + 1, col)));
                }
            }
        }
    }
    if complete {
        let last = COLUMNS - 1;
        for row in 0..rows.saturating_sub(1) {
            pairs.push((Adjacency::Down, (row, last), (row + 1, last)));
        }
    }
    pairs
}
