//! CSP model definition.

use super::error::CspError;
use super::variables::{Value, VarId, Variable};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// A constraint given in extension: the explicit list of satisfying tuples.
///
/// Tuples align positionally with the scope. They are stored flat,
/// `arity` values per tuple, in the order they were produced. The order
/// carries no meaning; the set of tuples does.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ConstraintParts"))]
pub struct TableConstraint {
    /// Diagnostic name.
    pub name: String,
    scope: Vec<VarId>,
    tuples: Vec<Value>,
}

impl TableConstraint {
    /// Creates a table constraint from explicit tuples.
    ///
    /// Fails on an empty scope or on a tuple whose length differs from the
    /// scope's. Domain membership is checked by [`CspModel::validate`].
    pub fn new<T>(
        name: impl Into<String>,
        scope: Vec<VarId>,
        tuples: impl IntoIterator<Item = T>,
    ) -> Result<Self, CspError>
    where
        T: AsRef<[Value]>,
    {
        let name = name.into();
        if scope.is_empty() {
            return Err(CspError::EmptyScope(name));
        }

        let arity = scope.len();
        let mut flat = Vec::new();
        for tuple in tuples {
            let tuple = tuple.as_ref();
            if tuple.len() != arity {
                return Err(CspError::ArityMismatch {
                    constraint: name,
                    expected: arity,
                    found: tuple.len(),
                });
            }
            flat.extend_from_slice(tuple);
        }

        Ok(Self {
            name,
            scope,
            tuples: flat,
        })
    }

    /// Builds from already-flattened tuples. `flat.len()` must be a
    /// multiple of the (non-zero) scope length.
    pub(crate) fn from_flat(name: String, scope: Vec<VarId>, flat: Vec<Value>) -> Self {
        debug_assert!(!scope.is_empty());
        debug_assert_eq!(flat.len() % scope.len(), 0);
        Self {
            name,
            scope,
            tuples: flat,
        }
    }

    /// The ordered scope.
    pub fn scope(&self) -> &[VarId] {
        &self.scope
    }

    /// Number of variables in the scope.
    pub fn arity(&self) -> usize {
        self.scope.len()
    }

    /// Number of satisfying tuples.
    pub fn tuple_count(&self) -> usize {
        self.tuples.len() / self.arity()
    }

    /// Whether no tuple satisfies the constraint.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Iterates the satisfying tuples in scope order.
    pub fn tuples(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.tuples.chunks_exact(self.arity())
    }

    /// Whether `tuple` is one of the satisfying tuples.
    pub fn permits(&self, tuple: &[Value]) -> bool {
        tuple.len() == self.arity() && self.tuples().any(|t| t == tuple)
    }

    /// Whether `var` appears in the scope.
    pub fn involves(&self, var: VarId) -> bool {
        self.scope.contains(&var)
    }
}

/// A finite-domain CSP: a variable arena plus an ordered list of table
/// constraints whose scopes index into that arena.
///
/// # Examples
///
/// ```
/// use tenner_csp::csp::{CspModel, TableConstraint, Variable};
///
/// let mut model = CspModel::new("example");
/// let x = model.add_variable(Variable::new("x", 0..3)).unwrap();
/// let y = model.add_variable(Variable::fixed("y", 1)).unwrap();
/// let c = TableConstraint::new("x != y", vec![x, y], [[0, 1], [2, 1]]).unwrap();
/// model.add_constraint(c).unwrap();
/// assert!(model.validate().is_ok());
/// assert_eq!(model.tuple_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "ModelParts"))]
pub struct CspModel {
    /// Model name.
    pub name: String,
    variables: Vec<Variable>,
    constraints: Vec<TableConstraint>,
}

impl CspModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Moves a variable into the arena and returns its handle.
    pub fn add_variable(&mut self, var: Variable) -> Result<VarId, CspError> {
        if var.domain().is_empty() {
            return Err(CspError::EmptyDomain(var.name));
        }
        let id = VarId(self.variables.len());
        self.variables.push(var);
        Ok(id)
    }

    /// Appends a constraint after checking that its scope belongs to this model.
    pub fn add_constraint(&mut self, constraint: TableConstraint) -> Result<(), CspError> {
        self.check_scope(&constraint)?;
        self.constraints.push(constraint);
        Ok(())
    }

    fn check_scope(&self, constraint: &TableConstraint) -> Result<(), CspError> {
        match constraint
            .scope()
            .iter()
            .find(|var| var.index() >= self.variables.len())
        {
            Some(&var) => Err(CspError::UnknownVariable {
                constraint: constraint.name.clone(),
                var,
            }),
            None => Ok(()),
        }
    }

    /// Looks up a variable by handle.
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.index())
    }

    /// Initial domain of a variable.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this model.
    pub fn domain(&self, id: VarId) -> &[Value] {
        self[id].domain()
    }

    /// All variables, in handle order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// All handles, in arena order.
    pub fn var_ids(&self) -> impl Iterator<Item = VarId> {
        (0..self.variables.len()).map(VarId)
    }

    /// All constraints, in insertion order.
    pub fn constraints(&self) -> &[TableConstraint] {
        &self.constraints
    }

    /// Constraints whose scope mentions `var`.
    pub fn constraints_on(&self, var: VarId) -> impl Iterator<Item = &TableConstraint> + '_ {
        self.constraints.iter().filter(move |c| c.involves(var))
    }

    /// Returns the number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Total number of satisfying tuples across all constraints.
    pub fn tuple_count(&self) -> usize {
        self.constraints.iter().map(TableConstraint::tuple_count).sum()
    }

    /// Validates the model for consistency.
    ///
    /// Checks that every variable has a non-empty domain, every scope
    /// refers to variables of this model, and every tuple value lies in the
    /// initial domain of the variable at its position.
    pub fn validate(&self) -> Result<(), CspError> {
        if let Some(var) = self.variables.iter().find(|v| v.domain().is_empty()) {
            return Err(CspError::EmptyDomain(var.name.clone()));
        }

        for constraint in &self.constraints {
            self.check_scope(constraint)?;
            for tuple in constraint.tuples() {
                for (position, (&var, &value)) in constraint.scope().iter().zip(tuple).enumerate() {
                    let variable = &self[var];
                    if !variable.contains(value) {
                        return Err(CspError::ValueOutsideDomain {
                            constraint: constraint.name.clone(),
                            position,
                            variable: variable.name.clone(),
                            value,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Unchecked serialized form of a [`TableConstraint`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct ConstraintParts {
    name: String,
    scope: Vec<VarId>,
    tuples: Vec<Value>,
}

#[cfg(feature = "serde")]
impl TryFrom<ConstraintParts> for TableConstraint {
    type Error = CspError;

    fn try_from(parts: ConstraintParts) -> Result<Self, CspError> {
        if parts.scope.is_empty() {
            return Err(CspError::EmptyScope(parts.name));
        }
        let trailing = parts.tuples.len() % parts.scope.len();
        if trailing != 0 {
            return Err(CspError::ArityMismatch {
                constraint: parts.name,
                expected: parts.scope.len(),
                found: trailing,
            });
        }
        Ok(Self::from_flat(parts.name, parts.scope, parts.tuples))
    }
}

/// Unchecked serialized form of a [`CspModel`]. Loading replays
/// [`CspModel::add_variable`] and [`CspModel::add_constraint`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct ModelParts {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<TableConstraint>,
}

#[cfg(feature = "serde")]
impl TryFrom<ModelParts> for CspModel {
    type Error = CspError;

    fn try_from(parts: ModelParts) -> Result<Self, CspError> {
        let mut model = CspModel::new(parts.name);
        for var in parts.variables {
            model.add_variable(var)?;
        }
        for constraint in parts.constraints {
            model.add_constraint(constraint)?;
        }
        Ok(model)
    }
}

impl Index<VarId> for CspModel {
    type Output = Variable;

    fn index(&self, id: VarId) -> &Variable {
        &self.variables[id.index()]
    }
}
