//! Model assemblers: the binary and the n-ary decomposition.
//!
//! Both share the variable factory, the adjacency inequalities and the
//! column sums; they differ only in how a row's all-different rule is
//! written down.
//!
//! | Row rule       | Binary (A)            | N-ary (B)                     |
//! |----------------|-----------------------|-------------------------------|
//! | constraints    | 45 per row, arity 2   | 1 per row, arity 10           |
//! | tuples         | ≤ 90 each             | ≤ 10! each                    |
//! | also forces    | n/a                   | every digit used once per row |

use super::board::{Cell, TennerBoard, COLUMNS};
use super::config::{ModelVariant, RowPermutations, TennerConfig};
use super::error::TennerError;
use super::grid::{adjacent_pairs, cell_name, VariableGrid};
use crate::csp::{not_equal, sum_equals, CspError, CspModel, TableConstraint, Value, Variable};
use itertools::Itertools;
use log::{debug, info};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A compiled Tenner Grid: the CSP model plus the positional view of its
/// variables, so solved values can be read back by cell.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TennerModel {
    /// The model handed to a solver.
    pub csp: CspModel,
    /// `grid[(row, col)]` is the handle of the cell's variable.
    pub grid: VariableGrid,
}

impl TennerModel {
    /// The variable at `(row, col)`.
    pub fn variable(&self, row: usize, col: usize) -> Option<&Variable> {
        self.grid.get(row, col).and_then(|id| self.csp.variable(id))
    }

    /// Arranges a full assignment (one value per model variable, in handle
    /// order) into grid rows. `None` if the assignment is too short.
    pub fn read_grid(&self, assignment: &[Value]) -> Option<Vec<[Value; COLUMNS]>> {
        (0..self.grid.row_count())
            .map(|row| {
                let mut values = [0; COLUMNS];
                for (value, id) in values.iter_mut().zip(self.grid.row(row)) {
                    *value = *assignment.get(id.index())?;
                }
                Some(values)
            })
            .collect()
    }
}

/// A strategy turning a board into a [`TennerModel`].
pub trait BuildModel {
    /// The decomposition this strategy produces.
    fn variant(&self) -> ModelVariant;

    /// Compiles `board`. `config.variant` is ignored; the strategy decides.
    fn build(&self, board: &TennerBoard, config: &TennerConfig) -> Result<TennerModel, TennerError>;
}

/// Variant A: pairwise row inequalities, adjacency inequalities, column sums.
#[derive(Debug, Default, Clone, Copy)]
pub struct BinaryDecomposition;

/// Variant B: one permutation table per row, adjacency inequalities, column sums.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaryDecomposition;

impl BuildModel for BinaryDecomposition {
    fn variant(&self) -> ModelVariant {
        ModelVariant::Binary
    }

    fn build(&self, board: &TennerBoard, config: &TennerConfig) -> Result<TennerModel, TennerError> {
        let mut csp = CspModel::new(config.name.clone());
        let grid = VariableGrid::create(board, &mut csp)?;

        add_row_inequalities(&mut csp, &grid)?;
        add_adjacency(&mut csp, &grid, config.complete_adjacency)?;
        add_column_sums(&mut csp, &grid, board, config.parallel)?;

        Ok(finish(self.variant(), csp, grid))
    }
}

impl BuildModel for NaryDecomposition {
    fn variant(&self) -> ModelVariant {
        ModelVariant::Nary
    }

    fn build(&self, board: &TennerBoard, config: &TennerConfig) -> Result<TennerModel, TennerError> {
        let mut csp = CspModel::new(config.name.clone());
        let grid = VariableGrid::create(board, &mut csp)?;

        add_row_all_different(&mut csp, &grid, board, config)?;
        add_adjacency(&mut csp, &grid, config.complete_adjacency)?;
        add_column_sums(&mut csp, &grid, board, config.parallel)?;

        Ok(finish(self.variant(), csp, grid))
    }
}

/// Compiles `board` with the decomposition named by `config.variant`.
///
/// # Examples
///
/// ```
/// use tenner_csp::tenner::{build_model, ModelVariant, TennerBoard, TennerConfig};
///
/// let board = TennerBoard::new(vec![vec![-1; 10]; 3], vec![13; 10]).unwrap();
/// let model = build_model(&board, &TennerConfig::default()).unwrap();
/// assert_eq!(model.csp.variable_count(), 30);
/// // 3 × 45 row pairs + 63 adjacency pairs + 10 column sums
/// assert_eq!(model.csp.constraint_count(), 135 + 63 + 10);
/// ```
pub fn build_model(board: &TennerBoard, config: &TennerConfig) -> Result<TennerModel, TennerError> {
    match config.variant {
        ModelVariant::Binary => BinaryDecomposition.build(board, config),
        ModelVariant::Nary => NaryDecomposition.build(board, config),
    }
}

/// Variant A with the default configuration.
pub fn tenner_model_binary(board: &TennerBoard) -> Result<TennerModel, TennerError> {
    BinaryDecomposition.build(board, &TennerConfig::default())
}

/// Variant B with the default configuration.
pub fn tenner_model_nary(board: &TennerBoard) -> Result<TennerModel, TennerError> {
    NaryDecomposition.build(board, &TennerConfig::default())
}

fn finish(variant: ModelVariant, csp: CspModel, grid: VariableGrid) -> TennerModel {
    info!(
        "compiled {variant} model `{}`: {} rows, {} variables, {} constraints, {} tuples",
        csp.name,
        grid.row_count(),
        csp.variable_count(),
        csp.constraint_count(),
        csp.tuple_count()
    );
    TennerModel { csp, grid }
}

/// Every unordered pair of distinct columns within each row.
fn add_row_inequalities(csp: &mut CspModel, grid: &VariableGrid) -> Result<(), CspError> {
    for row in 0..grid.row_count() {
        for (i, j) in (0..COLUMNS).tuple_combinations() {
            let name = format!("row {row}: c{i} != c{j}");
            let constraint = not_equal(csp, name, grid[(row, i)], grid[(row, j)])?;
            csp.add_constraint(constraint)?;
        }
    }
    Ok(())
}

fn add_adjacency(csp: &mut CspModel, grid: &VariableGrid, complete: bool) -> Result<(), CspError> {
    let pairs = adjacent_pairs(grid.row_count(), complete);
    let count = pairs.len();
    for (direction, a, b) in pairs {
        let name = format!("{} {} {}", direction.label(), cell_name(a.0, a.1), cell_name(b.0, b.1));
        let constraint = not_equal(csp, name, grid[a], grid[b])?;
        csp.add_constraint(constraint)?;
    }
    debug!("added {count} adjacency constraints");
    Ok(())
}

fn add_column_sums(
    csp: &mut CspModel,
    grid: &VariableGrid,
    board: &TennerBoard,
    parallel: bool,
) -> Result<(), CspError> {
    let shared: &CspModel = csp;
    let tables = build_each(COLUMNS, parallel, |col| {
        let target = board.column_target(col);
        sum_equals(shared, format!("column {col} sums to {target}"), grid.column(col), target)
    })?;
    for table in tables {
        csp.add_constraint(table)?;
    }
    Ok(())
}

fn add_row_all_different(
    csp: &mut CspModel,
    grid: &VariableGrid,
    board: &TennerBoard,
    config: &TennerConfig,
) -> Result<(), CspError> {
    let tables = build_each(grid.row_count(), config.parallel, |row| {
        let tuples = row_permutations(&board.rows()[row], config.row_permutations);
        let table = TableConstraint::from_flat(
            format!("row {row} all-different"),
            grid.row(row).to_vec(),
            tuples,
        );
        debug!("row {row}: {} permutations", table.tuple_count());
        Ok(table)
    })?;
    for table in tables {
        csp.add_constraint(table)?;
    }
    Ok(())
}

/// Flattened permutations of 0..=9 that agree with the pre-set cells.
///
/// A row whose pre-set digits repeat admits no permutation.
pub(crate) fn row_permutations(cells: &[Cell; COLUMNS], strategy: RowPermutations) -> Vec<Value> {
    match strategy {
        RowPermutations::FilterAll => (0..COLUMNS as Value)
            .permutations(COLUMNS)
            .filter(|perm| {
                cells
                    .iter()
                    .zip(perm)
                    .all(|(cell, &value)| cell.value().map_or(true, |fixed| fixed == value))
            })
            .flatten()
            .collect(),
        RowPermutations::Direct => {
            let mut template = [0; COLUMNS];
            let mut used = [false; COLUMNS];
            let mut free = Vec::with_capacity(COLUMNS);
            for (col, cell) in cells.iter().enumerate() {
                match cell.value() {
                    Some(digit) if used[digit as usize] => return Vec::new(),
                    Some(digit) => {
                        used[digit as usize] = true;
                        template[col] = digit;
                    }
                    None => free.push(col),
                }
            }

            let missing: Vec<Value> = (0..COLUMNS as Value).filter(|&d| !used[d as usize]).collect();
            let mut flat = Vec::new();
            for perm in missing.into_iter().permutations(free.len()) {
                for (&col, value) in free.iter().zip(perm) {
                    template[col] = value;
                }
                flat.extend_from_slice(&template);
            }
            flat
        }
    }
}

/// Builds `count` independent tables, in index order.
#[cfg(feature = "parallel")]
fn build_each<F>(count: usize, parallel: bool, build: F) -> Result<Vec<TableConstraint>, CspError>
where
    F: Fn(usize) -> Result<TableConstraint, CspError> + Sync + Send,
{
    use rayon::prelude::*;

    if parallel {
        (0..count).into_par_iter().map(build).collect()
    } else {
        (0..count).map(build).collect()
    }
}

/// Builds `count` independent tables, in index order.
#[cfg(not(feature = "parallel"))]
fn build_each<F>(count: usize, _parallel: bool, build: F) -> Result<Vec<TableConstraint>, CspError>
where
    F: Fn(usize) -> Result<TableConstraint, CspError>,
{
    (0..count).map(build).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csp::{CspSolver, SimpleTableSolver, SolverConfig, SolverStatus};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeSet;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// A valid completion whose first row is 0..=9.
    fn completion() -> Vec<[Value; COLUMNS]> {
        vec![
            [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
            [2, 3, 4, 5, 6, 7, 8, 9, 0, 1],
            [4, 5, 6, 7, 8, 9, 0, 1, 2, 3],
        ]
    }

    fn targets(rows: &[[Value; COLUMNS]]) -> Vec<i32> {
        (0..COLUMNS).map(|c| rows.iter().map(|r| r[c]).sum()).collect()
    }

    /// Row 0 fixed; rows 1 and 2 keep `blanks` empty cells each.
    fn partial_board(blanks: &[usize]) -> TennerBoard {
        let solution = completion();
        let mut raw: Vec<Vec<i32>> = solution.iter().map(|r| r.to_vec()).collect();
        for row in &mut raw[1..] {
            for &col in blanks {
                row[col] = -1;
            }
        }
        TennerBoard::new(raw, targets(&solution)).unwrap()
    }

    fn check_tuple_validity(model: &TennerModel) {
        assert!(model.csp.validate().is_ok());
        for constraint in model.csp.constraints() {
            for tuple in constraint.tuples() {
                assert_eq!(tuple.len(), constraint.arity());
            }
        }
    }

    fn solution_set(model: &TennerModel) -> BTreeSet<Vec<[Value; COLUMNS]>> {
        let solution = SimpleTableSolver::new().solve(&model.csp, &SolverConfig::all_solutions());
        assert!(solution.exhausted);
        solution
            .assignments
            .iter()
            .map(|a| model.read_grid(a).unwrap())
            .collect()
    }

    #[test]
    fn test_domain_correctness() {
        let board = partial_board(&[1, 4, 8]);
        for model in [tenner_model_binary(&board).unwrap(), tenner_model_nary(&board).unwrap()] {
            for ((row, col), id) in model.grid.iter() {
                let var = &model.csp[id];
                match board.cell(row, col).value() {
                    Some(v) => assert_eq!(var.domain(), &[v]),
                    None => assert_eq!(var.domain(), &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]),
                }
                assert_eq!(var.name, cell_name(row, col));
            }
        }
    }

    #[test]
    fn test_variant_grids_identical() {
        let board = partial_board(&[0, 5]);
        let a = tenner_model_binary(&board).unwrap();
        let b = tenner_model_nary(&board).unwrap();
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.csp.variables(), b.csp.variables());
    }

    #[test]
    fn test_binary_constraint_counts() {
        init_logger();
        let mut rng = StdRng::seed_from_u64(11);
        for n in 3..=7 {
            let (board, _) = TennerBoard::random(n, 0.3, &mut rng).unwrap();
            let model = BinaryDecomposition
                .build(&board, &TennerConfig::default().with_parallel(false))
                .unwrap();
            let adjacency = 9 * (n - 1) * 3 + 9;
            assert_eq!(model.csp.constraint_count(), 45 * n + adjacency + COLUMNS);
            check_tuple_validity(&model);
        }
    }

    #[test]
    fn test_row_distinctness_binary() {
        let board = partial_board(&[2, 3, 7]);
        let model = tenner_model_binary(&board).unwrap();
        let row_constraints: Vec<_> = model
            .csp
            .constraints()
            .iter()
            .filter(|c| c.name.starts_with("row "))
            .collect();
        assert_eq!(row_constraints.len(), 45 * 3);
        for c in row_constraints {
            assert_eq!(c.arity(), 2);
            assert!(c.tuples().all(|t| t[0] != t[1]));
        }
    }

    #[test]
    fn test_row_permutation_nary() {
        let board = partial_board(&[0, 3, 6, 9]);
        let model = tenner_model_nary(&board).unwrap();
        check_tuple_validity(&model);

        for row in 0..3 {
            let c = model
                .csp
                .constraints()
                .iter()
                .find(|c| c.name == format!("row {row} all-different"))
                .unwrap();
            assert_eq!(c.scope(), model.grid.row(row));
            // row 0 is fully set, rows 1 and 2 have 4 free cells
            let expected = if row == 0 { 1 } else { 24 };
            assert_eq!(c.tuple_count(), expected);
            for tuple in c.tuples() {
                let digits: BTreeSet<Value> = tuple.iter().copied().collect();
                assert_eq!(digits.len(), COLUMNS);
                assert!(digits.iter().all(|d| (0..10).contains(d)));
                for (col, &value) in tuple.iter().enumerate() {
                    if let Some(fixed) = board.cell(row, col).value() {
                        assert_eq!(value, fixed);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sum_exactness() {
        let board = partial_board(&[1, 2, 3, 4, 5]);
        let model = tenner_model_binary(&board).unwrap();
        let sums: Vec<_> = model
            .csp
            .constraints()
            .iter()
            .filter(|c| c.name.starts_with("column "))
            .collect();
        assert_eq!(sums.len(), COLUMNS);
        for (col, c) in sums.iter().enumerate() {
            assert_eq!(c.scope(), model.grid.column(col).as_slice());
            assert!(c.tuple_count() > 0);
            assert!(c
                .tuples()
                .all(|t| t.iter().sum::<Value>() == board.column_target(col)));
        }
    }

    #[test]
    fn test_adjacency_coverage() {
        let board = partial_board(&[]);
        let model = tenner_model_nary(&board).unwrap();
        let adjacency: Vec<_> = model
            .csp
            .constraints()
            .iter()
            .filter(|c| ["right ", "down ", "diagonal "].iter().any(|p| c.name.starts_with(p)))
            .collect();
        assert_eq!(adjacency.len(), 9 * 2 * 3 + 9);

        let expected: BTreeSet<_> = adjacent_pairs(3, false)
            .into_iter()
            .map(|(_, a, b)| (model.grid[a], model.grid[b]))
            .collect();
        for c in &adjacency {
            assert_eq!(c.arity(), 2);
            assert!(expected.contains(&(c.scope()[0], c.scope()[1])));
            assert!(c.tuples().all(|t| t[0] != t[1]));
        }
        // n-ary rows, adjacency, and sums are the only constraints
        assert_eq!(model.csp.constraint_count(), 3 + adjacency.len() + COLUMNS);
    }

    #[test]
    fn test_complete_adjacency_counts() {
        let board = partial_board(&[]);
        let config = TennerConfig::default()
            .with_variant(ModelVariant::Nary)
            .with_complete_adjacency(true);
        let model = build_model(&board, &config).unwrap();
        // right 9·3, down 10·2, diagonal 9·2, anti-diagonal 9·2
        assert_eq!(model.csp.constraint_count(), 3 + 27 + 20 + 18 + 18 + COLUMNS);
    }

    #[test]
    fn test_direct_matches_filter_all() {
        let rows: [[Cell; COLUMNS]; 3] = [
            [Cell::Fixed(3), Cell::Empty, Cell::Empty, Cell::Fixed(7), Cell::Empty, Cell::Fixed(0), Cell::Empty, Cell::Empty, Cell::Fixed(9), Cell::Empty],
            [Cell::Fixed(0), Cell::Fixed(1), Cell::Fixed(2), Cell::Fixed(3), Cell::Fixed(4), Cell::Fixed(5), Cell::Fixed(6), Cell::Fixed(7), Cell::Fixed(8), Cell::Fixed(9)],
            [Cell::Fixed(4), Cell::Fixed(4), Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
        ];
        for cells in [&rows[0], &rows[2]] {
            let mut direct: Vec<Vec<Value>> = row_permutations(cells, RowPermutations::Direct)
                .chunks(COLUMNS)
                .map(<[Value]>::to_vec)
                .collect();
            let mut filtered: Vec<Vec<Value>> = row_permutations(cells, RowPermutations::FilterAll)
                .chunks(COLUMNS)
                .map(<[Value]>::to_vec)
                .collect();
            direct.sort();
            filtered.sort();
            assert_eq!(direct, filtered);
        }
        assert_eq!(row_permutations(&rows[0], RowPermutations::Direct).len(), 720 * COLUMNS);
        assert_eq!(row_permutations(&rows[1], RowPermutations::Direct).len(), COLUMNS);
        assert!(row_permutations(&rows[2], RowPermutations::Direct).is_empty());
    }

    #[test]
    fn test_repeated_fixed_digit_is_unsatisfiable() {
        let mut raw = vec![vec![-1; COLUMNS]; 3];
        raw[0][0] = 5;
        raw[0][5] = 5;
        let board = TennerBoard::new(raw, vec![13; COLUMNS]).unwrap();
        let model = tenner_model_nary(&board).unwrap();
        let row0 = &model.csp.constraints()[0];
        assert_eq!(row0.name, "row 0 all-different");
        assert!(row0.is_empty());

        let solution = SimpleTableSolver::new().solve(&model.csp, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_equivalence_of_variants() {
        init_logger();
        let board = partial_board(&[0, 3, 4, 8]);
        let a = solution_set(&tenner_model_binary(&board).unwrap());
        let b = solution_set(&tenner_model_nary(&board).unwrap());

        assert!(!a.is_empty());
        assert_eq!(a, b);
        assert!(a.contains(&completion()));
    }

    #[test]
    fn test_equivalence_with_complete_adjacency() {
        let board = partial_board(&[1, 2, 5, 6, 9]);
        let config = TennerConfig::default().with_complete_adjacency(true);
        let a = solution_set(&build_model(&board, &config).unwrap());
        let b = solution_set(&build_model(&board, &config.clone().with_variant(ModelVariant::Nary)).unwrap());

        assert_eq!(a, b);
        assert!(a.contains(&completion()));
        assert!(a.iter().all(|grid| board.is_solved_by(grid)));
    }

    /// Row 0 set, rows 1 and 2 blank. Variant B enumerates 10! tuples for
    /// each blank row, so the unoptimized build skips it.
    #[test]
    #[cfg_attr(debug_assertions, ignore = "builds two 10!-tuple tables")]
    fn test_equivalence_with_blank_rows() {
        let board = partial_board(&(0..COLUMNS).collect::<Vec<_>>());
        let a = solution_set(&tenner_model_binary(&board).unwrap());
        let b = solution_set(&tenner_model_nary(&board).unwrap());
        assert!(a.contains(&completion()));
        assert_eq!(a, b);
    }

    #[test]
    fn test_degenerate_all_zero_targets() {
        let board = TennerBoard::new(vec![vec![-1; COLUMNS]; 3], vec![0; COLUMNS]).unwrap();
        let model = tenner_model_binary(&board).unwrap();

        let sums: Vec<_> = model
            .csp
            .constraints()
            .iter()
            .filter(|c| c.name.starts_with("column "))
            .collect();
        assert!(sums.iter().all(|c| c.tuples().collect::<Vec<_>>() == vec![&[0, 0, 0][..]]));

        let solution = SimpleTableSolver::new().solve(&model.csp, &SolverConfig::default());
        assert_eq!(solution.status, SolverStatus::Infeasible);
    }

    #[test]
    fn test_read_grid() {
        let board = partial_board(&[]);
        let model = tenner_model_binary(&board).unwrap();
        let solution = SimpleTableSolver::new().solve(&model.csp, &SolverConfig::default());
        let grid = model.read_grid(solution.first().unwrap()).unwrap();
        assert_eq!(grid, completion());
        assert!(model.read_grid(&[1, 2, 3]).is_none());
        assert_eq!(model.variable(1, 2).unwrap().fixed_value(), Some(4));
        assert!(model.variable(3, 0).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut rng = StdRng::seed_from_u64(3);
        let (board, _) = TennerBoard::random(4, 0.4, &mut rng).unwrap();
        for variant in [ModelVariant::Binary, ModelVariant::Nary] {
            let config = TennerConfig::default().with_variant(variant);
            let parallel = build_model(&board, &config.clone().with_parallel(true)).unwrap();
            let sequential = build_model(&board, &config.with_parallel(false)).unwrap();
            assert_eq!(parallel, sequential);
        }
    }

    #[test]
    fn test_strategy_ignores_config_variant() {
        let board = partial_board(&[2]);
        let config = TennerConfig::default().with_variant(ModelVariant::Nary);
        let model = BinaryDecomposition.build(&board, &config).unwrap();
        assert_eq!(BinaryDecomposition.variant(), ModelVariant::Binary);
        assert_eq!(NaryDecomposition.variant(), ModelVariant::Nary);
        assert!(model.csp.constraints().iter().all(|c| c.arity() <= 3));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_random_boards_compile_and_solve(seed in any::<u64>(), rows in 3usize..=5) {
            let mut rng = StdRng::seed_from_u64(seed);
            let (board, completion) = TennerBoard::random(rows, 0.3, &mut rng).unwrap();
            let config = TennerConfig::default()
                .with_variant(ModelVariant::Nary)
                .with_complete_adjacency(true);
            let model = build_model(&board, &config).unwrap();
            prop_assert!(model.csp.validate().is_ok());

            let solved = SimpleTableSolver::new().solve(&model.csp, &SolverConfig::default());
            prop_assert!(solved.is_solution_found());
            let grid = model.read_grid(solved.first().unwrap()).unwrap();
            prop_assert!(board.is_solved_by(&grid));
            prop_assert!(board.is_solved_by(&completion));
        }

        #[test]
        fn prop_sum_tables_exact(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let (board, _) = TennerBoard::random(3, 0.6, &mut rng).unwrap();
            let model = tenner_model_binary(&board).unwrap();
            for col in 0..COLUMNS {
                let name = format!("column {col} sums to {}", board.column_target(col));
                let c = model.csp.constraints().iter().find(|c| c.name == name).unwrap();
                prop_assert!(c.tuple_count() > 0);
                prop_assert!(c.tuples().all(|t| t.iter().sum::<Value>() == board.column_target(col)));
            }
        }
    }
}
