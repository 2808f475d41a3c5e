//! Tenner Grid boards.
//!
//! A Tenner Grid has 10 columns and 3 to 7 rows. Every row holds the
//! digits 0-9 once each, touching cells (including diagonally) differ,
//! and each column adds up to its target.

use super::error::{GridDefect, TennerError};
use crate::csp::Value;
use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of columns of every Tenner Grid.
pub const COLUMNS: usize = 10;
/// Smallest supported row count.
pub const MIN_ROWS: usize = 3;
/// Largest supported row count.
pub const MAX_ROWS: usize = 7;
/// Raw cell value marking an empty cell.
pub const EMPTY: i32 = -1;

/// One cell of the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Cell {
    /// To be filled in.
    #[default]
    Empty,
    /// Pre-set digit, 0-9.
    Fixed(u8),
}

impl Cell {
    /// Decodes the raw form: [`EMPTY`] or a digit. `None` for anything else.
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            EMPTY => Some(Self::Empty),
            0..=9 => Some(Self::Fixed(value as u8)),
            _ => None,
        }
    }

    /// The pre-set digit, if any.
    pub fn value(self) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Fixed(digit) => Some(Value::from(digit)),
        }
    }

    /// Whether the cell is to be filled in.
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }
}

/// A validated Tenner Grid puzzle: `n` rows of 10 cells plus column targets.
///
/// # Examples
///
/// ```
/// use tenner_csp::tenner::{Cell, TennerBoard};
///
/// let board = TennerBoard::new(
///     vec![
///         vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
///         vec![-1; 10],
///         vec![-1; 10],
///     ],
///     vec![10, 12, 14, 16, 12, 14, 16, 12, 14, 16],
/// )
/// .unwrap();
/// assert_eq!(board.row_count(), 3);
/// assert_eq!(board.cell(0, 4), Cell::Fixed(4));
/// assert!(board.cell(1, 4).is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "BoardParts"))]
pub struct TennerBoard {
    rows: Vec<[Cell; COLUMNS]>,
    column_targets: [Value; COLUMNS],
}

impl TennerBoard {
    /// Validates the raw form used by board loaders: `-1` for empty cells.
    ///
    /// The grid is checked before the target vector.
    pub fn new(rows: Vec<Vec<i32>>, column_targets: Vec<i32>) -> Result<Self, TennerError> {
        check_row_count(rows.len())?;

        let mut cells = Vec::with_capacity(rows.len());
        for (row, raw) in rows.iter().enumerate() {
            if raw.len() != COLUMNS {
                return Err(GridDefect::RowLength {
                    row,
                    len: raw.len(),
                }
                .into());
            }
            let mut decoded = [Cell::Empty; COLUMNS];
            for (col, (&value, cell)) in raw.iter().zip(decoded.iter_mut()).enumerate() {
                *cell = Cell::from_raw(value).ok_or(GridDefect::CellValue { row, col, value })?;
            }
            cells.push(decoded);
        }

        let column_targets: [Value; COLUMNS] = column_targets
            .as_slice()
            .try_into()
            .map_err(|_| TennerError::TargetVectorMismatch(column_targets.len()))?;

        Ok(Self {
            rows: cells,
            column_targets,
        })
    }

    /// Builds a board from typed cells. Only the row count and the digits
    /// of fixed cells can be wrong here.
    pub fn from_cells(
        rows: Vec<[Cell; COLUMNS]>,
        column_targets: [Value; COLUMNS],
    ) -> Result<Self, TennerError> {
        check_row_count(rows.len())?;
        for (row, cells) in rows.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if let Cell::Fixed(digit) = *cell {
                    if digit > 9 {
                        return Err(GridDefect::CellValue {
                            row,
                            col,
                            value: i32::from(digit),
                        }
                        .into());
                    }
                }
            }
        }
        Ok(Self {
            rows,
            column_targets,
        })
    }

    /// Generates a random puzzle together with the completion it was cut from.
    ///
    /// A random valid grid is drawn row by row, the column targets are its
    /// column sums, and each cell is blanked with probability
    /// `blank_probability`.
    ///
    /// # Panics
    /// Panics if `blank_probability` is not within `[0, 1]`.
    pub fn random<R: Rng + ?Sized>(
        row_count: usize,
        blank_probability: f64,
        rng: &mut R,
    ) -> Result<(Self, Vec<[Value; COLUMNS]>), TennerError> {
        check_row_count(row_count)?;
        assert!(
            (0.0..=1.0).contains(&blank_probability),
            "blank_probability must be in [0, 1], got {blank_probability}"
        );

        let solution = random_completion(row_count, rng);

        let mut column_targets = [0; COLUMNS];
        for row in &solution {
            for (target, value) in column_targets.iter_mut().zip(row) {
                *target += value;
            }
        }

        let rows = solution
            .iter()
            .map(|row| {
                row.map(|value| {
                    if rng.random_bool(blank_probability) {
                        Cell::Empty
                    } else {
                        Cell::Fixed(value as u8)
                    }
                })
            })
            .collect();

        Ok((
            Self {
                rows,
                column_targets,
            },
            solution,
        ))
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> &[[Cell; COLUMNS]] {
        &self.rows
    }

    /// The cell at `(row, col)`.
    ///
    /// # Panics
    /// Panics if the position is outside the grid.
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.rows[row][col]
    }

    /// Target sum of column `col`.
    pub fn column_target(&self, col: usize) -> Value {
        self.column_targets[col]
    }

    /// All column targets, left to right.
    pub fn column_targets(&self) -> &[Value; COLUMNS] {
        &self.column_targets
    }

    /// Number of pre-set cells.
    pub fn fixed_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    /// Checks a filled grid against every rule of the puzzle: pre-set
    /// cells, distinct digits per row, all eight neighbours differing,
    /// and the column targets.
    pub fn is_solved_by(&self, grid: &[[Value; COLUMNS]]) -> bool {
        if grid.len() != self.row_count() {
            return false;
        }

        for (cells, values) in self.rows.iter().zip(grid) {
            let mut seen = [false; COLUMNS];
            for (cell, &value) in cells.iter().zip(values) {
                if !(0..=9).contains(&value) || seen[value as usize] {
                    return false;
                }
                seen[value as usize] = true;
                if cell.value().is_some_and(|fixed| fixed != value) {
                    return false;
                }
            }
        }

        if grid.windows(2).any(|pair| !compatible(&pair[0], &pair[1])) {
            return false;
        }

        (0..COLUMNS).all(|col| grid.iter().map(|row| row[col]).sum::<Value>() == self.column_targets[col])
    }
}

/// Unchecked serialized form of a [`TennerBoard`]; loading goes through
/// [`TennerBoard::from_cells`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct BoardParts {
    rows: Vec<[Cell; COLUMNS]>,
    column_targets: [Value; COLUMNS],
}

#[cfg(feature = "serde")]
impl TryFrom<BoardParts> for TennerBoard {
    type Error = TennerError;

    fn try_from(parts: BoardParts) -> Result<Self, TennerError> {
        Self::from_cells(parts.rows, parts.column_targets)
    }
}

fn check_row_count(count: usize) -> Result<(), GridDefect> {
    if (MIN_ROWS..=MAX_ROWS).contains(&count) {
        Ok(())
    } else {
        Err(GridDefect::RowCount(count))
    }
}

/// Whether `below` can sit under `above`: no digit repeats straight down
/// or diagonally.
fn compatible(above: &[Value; COLUMNS], below: &[Value; COLUMNS]) -> bool {
    (0..COLUMNS).all(|col| {
        let lo = col.saturating_sub(1);
        let hi = (col + 1).min(COLUMNS - 1);
        above[lo..=hi].iter().all(|&value| value != below[col])
    })
}

fn random_completion<R: Rng + ?Sized>(row_count: usize, rng: &mut R) -> Vec<[Value; COLUMNS]> {
    let mut digits: [Value; COLUMNS] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    let mut rows: Vec<[Value; COLUMNS]> = Vec::with_capacity(row_count);
    // every row admits a successor: each position forbids at most three digits
    while rows.len() < row_count {
        digits.shuffle(rng);
        if rows.last().map_or(true, |above| compatible(above, &digits)) {
            rows.push(digits);
        }
    }
    rows
}
