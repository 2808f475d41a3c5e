//! Tenner Grid constraint-model compiler.
//!
//! Translates a partially filled Tenner Grid (10 columns, 3-7 rows) into an
//! explicit finite-domain constraint satisfaction problem whose constraints
//! are tables of allowed tuples. Searching the model is left to a solver.
//!
//! - **CSP**: Domain-agnostic modeling layer: variables with initial
//!   domains, table constraints, the model arena, and a tuple builder
//!   over variable-arity Cartesian products.
//! - **Tenner**: Board validation and the two model assemblers: binary
//!   decomposition (pairwise row inequalities) and n-ary decomposition
//!   (one permutation table per row).
//!
//! # Features
//!
//! - `parallel`: builds column-sum and row tables with rayon.
//! - `serde`: `Serialize`/`Deserialize` for boards, configs and models.

pub mod csp;
pub mod tenner;
