//! Finite-domain CSP modeling layer with table constraints.
//!
//! Provides a domain-agnostic container for constraint satisfaction
//! problems whose constraints are given in extension, as explicit lists
//! of satisfying tuples.
//!
//! # Key Components
//!
//! - **Variables**: [`Variable`] with an immutable initial domain, addressed by [`VarId`]
//! - **Constraints**: [`TableConstraint`]: ordered scope plus satisfying tuples
//! - **Model**: [`CspModel`]: arena owning variables and constraints
//! - **Tuple builder**: [`table_constraint`]: enumerates a scope's domain
//!   product against an admissibility predicate
//! - **Solver**: [`CspSolver`] trait, with [`SimpleTableSolver`] for checking models
//!
//! # Design
//!
//! Constraint scopes hold [`VarId`] handles into the model's variable
//! arena, so a variable shared by many constraints is stored once.
//! Search state lives in [`WorkingDomains`], owned by a solver; the
//! model's initial domains are never mutated after construction.
//!
//! # References
//!
//! Rossi, van Beek & Walsh (2006), "Handbook of Constraint Programming", ch. 3
//! Bessière (2006), "Constraint Propagation"

mod error;
mod model;
mod solver;
mod tuples;
mod variables;

pub use error::CspError;
pub use model::{CspModel, TableConstraint};
pub use solver::{
    CspSolution, CspSolver, SimpleTableSolver, SolverConfig, SolverStatus, WorkingDomains,
};
pub use tuples::{not_equal, sum_equals, table_constraint};
pub use variables::{Value, VarId, Variable};
