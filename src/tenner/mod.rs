//! Tenner Grid model compiler.
//!
//! Translates a partially filled Tenner Grid into a table-constraint
//! [`CspModel`](crate::csp::CspModel) for an external solver.
//!
//! # Key Types
//!
//! - [`TennerBoard`]: validated puzzle input (`n` rows × 10 columns, column targets)
//! - [`TennerConfig`]: decomposition choice and table construction options
//! - [`BuildModel`]: strategy trait, implemented by [`BinaryDecomposition`]
//!   (variant A) and [`NaryDecomposition`] (variant B)
//! - [`TennerModel`]: the compiled model plus its [`VariableGrid`]
//!
//! # Rules
//!
//! Each row holds the digits 0-9 once; touching cells differ; each column
//! sums to its target. Both decompositions encode the same rules and admit
//! the same solutions; they trade table size against arity.
//!
//! # Example
//!
//! ```
//! use tenner_csp::csp::{CspSolver, SimpleTableSolver, SolverConfig};
//! use tenner_csp::tenner::{tenner_model_binary, TennerBoard};
//!
//! let board = TennerBoard::new(
//!     vec![
//!         vec![0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
//!         vec![2, 3, -1, 5, 6, 7, 8, -1, 0, 1],
//!         vec![4, 5, 6, 7, 8, -1, 0, 1, 2, 3],
//!     ],
//!     vec![6, 9, 12, 15, 18, 21, 14, 17, 10, 13],
//! )
//! .unwrap();
//!
//! let model = tenner_model_binary(&board).unwrap();
//! let solution = SimpleTableSolver::new().solve(&model.csp, &SolverConfig::default());
//! let grid = model.read_grid(solution.first().unwrap()).unwrap();
//! assert_eq!(grid[1], [2, 3, 4, 5, 6, 7, 8, 9, 0, 1]);
//! ```

mod board;
mod config;
mod error;
mod grid;
mod model;

pub use board::{Cell, TennerBoard, COLUMNS, EMPTY, MAX_ROWS, MIN_ROWS};
pub use config::{ModelVariant, RowPermutations, TennerConfig};
pub use error::{GridDefect, TennerError};
pub use grid::{adjacent_pairs, cell_name, cell_variable, AdjacentPair, Adjacency, VariableGrid, DIGITS};
pub use model::{
    build_model, tenner_model_binary, tenner_model_nary, BinaryDecomposition, BuildModel,
    NaryDecomposition, TennerModel,
};
