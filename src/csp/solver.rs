//! CSP solver interface and a reference table solver.
//!
//! Compiled models are meant for an external solver. [`SimpleTableSolver`]
//! exists to check models in tests and benchmarks: chronological
//! backtracking with generalized arc consistency over the tables.

use super::model::CspModel;
use super::variables::{Value, VarId};
use log::{debug, trace};
use std::collections::VecDeque;

/// Status of the solver after execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverStatus {
    /// At least one solution was found.
    Feasible,
    /// The search space was exhausted without a solution.
    Infeasible,
    /// Model or configuration is invalid.
    ModelInvalid,
    /// The node limit stopped the search before any solution was found.
    LimitReached,
}

/// Solution from a CSP solver.
#[derive(Debug, Clone)]
pub struct CspSolution {
    /// Solver status.
    pub status: SolverStatus,
    /// Full assignments, one value per variable in handle order.
    pub assignments: Vec<Vec<Value>>,
    /// Whether the whole search space was explored.
    pub exhausted: bool,
    /// Number of search nodes visited.
    pub nodes: u64,
    /// Solve time in milliseconds.
    pub solve_time_ms: i64,
}

impl CspSolution {
    /// Creates an empty solution with the given status.
    pub fn empty(status: SolverStatus) -> Self {
        Self {
            status,
            assignments: Vec::new(),
            exhausted: false,
            nodes: 0,
            solve_time_ms: 0,
        }
    }

    /// Whether a feasible solution was found.
    pub fn is_solution_found(&self) -> bool {
        self.status == SolverStatus::Feasible
    }

    /// The first assignment found, if any.
    pub fn first(&self) -> Option<&[Value]> {
        self.assignments.first().map(Vec::as_slice)
    }
}

/// Solver configuration.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Stop after this many solutions. `None` enumerates all of them.
    pub solution_limit: Option<usize>,
    /// Stop after visiting this many search nodes.
    pub node_limit: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            solution_limit: Some(1),
            node_limit: None,
        }
    }
}

impl SolverConfig {
    /// Enumerates every solution.
    pub fn all_solutions() -> Self {
        Self {
            solution_limit: None,
            ..Self::default()
        }
    }

    /// Sets the solution limit.
    pub fn with_solution_limit(mut self, limit: usize) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    /// Sets the node limit.
    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = Some(limit);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.solution_limit == Some(0) {
            return Err("solution_limit must be positive".into());
        }
        if self.node_limit == Some(0) {
            return Err("node_limit must be positive".into());
        }
        Ok(())
    }
}

/// Trait for CSP solver implementations.
pub trait CspSolver {
    /// Solves the model and returns a solution.
    fn solve(&self, model: &CspModel, config: &SolverConfig) -> CspSolution;
}

/// Current domains during search, with a trail for backtracking.
///
/// Pruning a variable pushes its previous domain on the trail;
/// [`restore`](Self::restore) pops back to a [`mark`](Self::mark).
/// The model's initial domains are never touched.
#[derive(Debug, Clone)]
pub struct WorkingDomains {
    current: Vec<Vec<Value>>,
    trail: Vec<(VarId, Vec<Value>)>,
}

impl WorkingDomains {
    /// Starts from the model's initial domains.
    pub fn new(model: &CspModel) -> Self {
        Self {
            current: model.variables().iter().map(|v| v.domain().to_vec()).collect(),
            trail: Vec::new(),
        }
    }

    /// Current domain of `var`.
    pub fn domain(&self, var: VarId) -> &[Value] {
        &self.current[var.index()]
    }

    /// Whether `value` is still in the current domain of `var`.
    pub fn contains(&self, var: VarId, value: Value) -> bool {
        self.current[var.index()].binary_search(&value).is_ok()
    }

    /// Keeps only the values of `var` accepted by `keep`.
    ///
    /// Returns whether the domain changed.
    pub fn prune(&mut self, var: VarId, keep: impl Fn(Value) -> bool) -> bool {
        let domain = &self.current[var.index()];
        if domain.iter().all(|&v| keep(v)) {
            return false;
        }
        let reduced: Vec<Value> = domain.iter().copied().filter(|&v| keep(v)).collect();
        let previous = std::mem::replace(&mut self.current[var.index()], reduced);
        self.trail.push((var, previous));
        true
    }

    /// Reduces `var` to the single value `value`.
    pub fn assign(&mut self, var: VarId, value: Value) -> bool {
        self.prune(var, |v| v == value)
    }

    /// Current trail height, to be passed to [`restore`](Self::restore).
    pub fn mark(&self) -> usize {
        self.trail.len()
    }

    /// Undoes every prune made since `mark`.
    pub fn restore(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some((var, previous)) = self.trail.pop() {
                self.current[var.index()] = previous;
            }
        }
    }

    /// The values of a complete assignment, if every domain is a singleton.
    pub fn assignment(&self) -> Option<Vec<Value>> {
        self.current
            .iter()
            .map(|d| match d.as_slice() {
                [value] => Some(*value),
                _ => None,
            })
            .collect()
    }
}

/// Backtracking table solver for checking compiled models.
///
/// Picks the unfixed variable with the smallest current domain, tries its
/// values in ascending order, and restores table consistency after every
/// choice. Suited to small and medium tables; it is not a production solver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleTableSolver;

impl SimpleTableSolver {
    /// Creates the solver. It holds no state; one instance can serve any
    /// number of models.
    pub fn new() -> Self {
        Self
    }
}

impl CspSolver for SimpleTableSolver {
    fn solve(&self, model: &CspModel, config: &SolverConfig) -> CspSolution {
        if model.validate().is_err() || config.validate().is_err() {
            return CspSolution::empty(SolverStatus::ModelInvalid);
        }

        let start_time = std::time::Instant::now();

        let mut watchers: Vec<Vec<usize>> = vec![Vec::new(); model.variable_count()];
        for (index, constraint) in model.constraints().iter().enumerate() {
            for var in constraint.scope() {
                if watchers[var.index()].last() != Some(&index) {
                    watchers[var.index()].push(index);
                }
            }
        }

        let mut search = Search {
            model,
            config,
            watchers,
            domains: WorkingDomains::new(model),
            assignments: Vec::new(),
            nodes: 0,
            stopped: false,
        };

        let all: Vec<usize> = (0..model.constraint_count()).collect();
        if search.propagate(all) {
            search.descend();
        }

        let status = if !search.assignments.is_empty() {
            SolverStatus::Feasible
        } else if search.stopped {
            SolverStatus::LimitReached
        } else {
            SolverStatus::Infeasible
        };
        let reached_solution_limit = config
            .solution_limit
            .is_some_and(|limit| search.assignments.len() >= limit);

        debug!(
            "solved `{}`: {:?}, {} solutions, {} nodes",
            model.name,
            status,
            search.assignments.len(),
            search.nodes
        );

        CspSolution {
            status,
            exhausted: !search.stopped && !reached_solution_limit,
            assignments: search.assignments,
            nodes: search.nodes,
            solve_time_ms: start_time.elapsed().as_millis() as i64,
        }
    }
}

struct Search<'a> {
    model: &'a CspModel,
    config: &'a SolverConfig,
    // constraint indices per variable
    watchers: Vec<Vec<usize>>,
    domains: WorkingDomains,
    assignments: Vec<Vec<Value>>,
    nodes: u64,
    stopped: bool,
}

impl Search<'_> {
    fn descend(&mut self) {
        self.nodes += 1;
        if self.config.node_limit.is_some_and(|limit| self.nodes > limit) {
            self.stopped = true;
            return;
        }

        let branch = self
            .model
            .var_ids()
            .filter(|&var| self.domains.domain(var).len() > 1)
            .min_by_key(|&var| self.domains.domain(var).len());

        let Some(var) = branch else {
            if let Some(assignment) = self.domains.assignment() {
                trace!("solution #{}", self.assignments.len() + 1);
                self.assignments.push(assignment);
            }
            if self
                .config
                .solution_limit
                .is_some_and(|limit| self.assignments.len() >= limit)
            {
                self.stopped = true;
            }
            return;
        };

        let values = self.domains.domain(var).to_vec();
        for value in values {
            let mark = self.domains.mark();
            self.domains.assign(var, value);
            trace!("{} = {value}", self.model[var].name);
            if self.propagate(self.watchers[var.index()].clone()) {
                self.descend();
            }
            self.domains.restore(mark);
            if self.stopped {
                return;
            }
        }
    }

    /// Revises constraints until no domain changes. Returns `false` on a wipe-out.
    fn propagate(&mut self, seed: Vec<usize>) -> bool {
        let mut queued = vec![false; self.model.constraint_count()];
        let mut queue: VecDeque<usize> = VecDeque::with_capacity(seed.len());
        for index in seed {
            if !queued[index] {
                queued[index] = true;
                queue.push_back(index);
            }
        }

        while let Some(index) = queue.pop_front() {
            queued[index] = false;
            let Some(changed) = self.revise(index) else {
                return false;
            };
            for var in changed {
                for &other in &self.watchers[var.index()] {
                    if other != index && !queued[other] {
                        queued[other] = true;
                        queue.push_back(other);
                    }
                }
            }
        }
        true
    }

    /// Drops values with no live tuple. `None` if a domain empties.
    fn revise(&mut self, index: usize) -> Option<Vec<VarId>> {
        let constraint = &self.model.constraints()[index];
        let scope = constraint.scope();
        let mut supported: Vec<Vec<Value>> = vec![Vec::new(); scope.len()];

        for tuple in constraint.tuples() {
            let live = scope
                .iter()
                .zip(tuple)
                .all(|(&var, &value)| self.domains.contains(var, value));
            if live {
                for (support, &value) in supported.iter_mut().zip(tuple) {
                    support.push(value);
                }
            }
        }

        let mut changed = Vec::new();
        for (&var, mut support) in scope.iter().zip(supported) {
            support.sort_unstable();
            support.dedup();
            if self.domains.prune(var, |v| support.binary_search(&v).is_ok()) {
                changed.push(var);
            }
            if self.domains.domain(var).is_empty() {
                return None;
            }
        }
        Some(changed)
    }
}
