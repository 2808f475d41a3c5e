//! Table construction by enumerating a scope's Cartesian product.
//!
//! [`table_constraint`] walks every combination of the scope's initial
//! domains and keeps the ones accepted by an admissibility predicate.
//! The product has a variable number of factors, so scopes of any arity
//! are enumerated directly without padding.
//!
//! # Cost
//!
//! Θ(D · arity) where D is the product of the scope's domain sizes. Ten
//! unconstrained digits give D = 10^10, which is why pairwise
//! decompositions exist at all.

use super::error::CspError;
use super::model::{CspModel, TableConstraint};
use super::variables::{Value, VarId};
use itertools::Itertools;
use log::debug;

/// Builds a table constraint over `scope` from the tuples of the scope's
/// domain product that satisfy `admissible`.
///
/// Domains are read from `model`; the returned constraint is not added to
/// it, so several tables can be built against the same model concurrently.
///
/// # Examples
///
/// ```
/// use tenner_csp::csp::{table_constraint, CspModel, Variable};
///
/// let mut model = CspModel::new("example");
/// let x = model.add_variable(Variable::new("x", 0..10)).unwrap();
/// let y = model.add_variable(Variable::fixed("y", 4)).unwrap();
/// let sum = table_constraint(&model, "x + y = 6", vec![x, y], |t| t[0] + t[1] == 6).unwrap();
/// assert_eq!(sum.tuples().collect::<Vec<_>>(), vec![&[2, 4][..]]);
/// ```
pub fn table_constraint<P>(
    model: &CspModel,
    name: impl Into<String>,
    scope: Vec<VarId>,
    admissible: P,
) -> Result<TableConstraint, CspError>
where
    P: Fn(&[Value]) -> bool,
{
    let name = name.into();
    if scope.is_empty() {
        return Err(CspError::EmptyScope(name));
    }

    let mut domains = Vec::with_capacity(scope.len());
    for &var in &scope {
        match model.variable(var) {
            Some(variable) => domains.push(variable.domain()),
            None => return Err(CspError::UnknownVariable { constraint: name, var }),
        }
    }

    let flat: Vec<Value> = domains
        .iter()
        .map(|domain| domain.iter().copied())
        .multi_cartesian_product()
        .filter(|tuple| admissible(tuple))
        .flatten()
        .collect();

    let constraint = TableConstraint::from_flat(name, scope, flat);
    debug!(
        "table `{}`: arity {}, {} tuples",
        constraint.name,
        constraint.arity(),
        constraint.tuple_count()
    );
    Ok(constraint)
}

/// Binary inequality table between `a` and `b`.
pub fn not_equal(
    model: &CspModel,
    name: impl Into<String>,
    a: VarId,
    b: VarId,
) -> Result<TableConstraint, CspError> {
    table_constraint(model, name, vec![a, b], |t| t[0] != t[1])
}

/// Table of tuples over `scope` whose values add up to exactly `target`.
pub fn sum_equals(
    model: &CspModel,
    name: impl Into<String>,
    scope: Vec<VarId>,
    target: Value,
) -> Result<TableConstraint, CspError> {
    table_constraint(model, name, scope, |t| t.iter().sum::<Value>() == target)
}
