//! Errors raised while assembling a CSP model.

use super::variables::{Value, VarId};

/// Reasons a variable or constraint cannot be part of a [`CspModel`](super::CspModel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CspError {
    /// A variable was added with no admissible value.
    #[error("variable `{0}` has an empty domain")]
    EmptyDomain(String),

    /// A constraint was built over no variables.
    #[error("constraint `{0}` has an empty scope")]
    EmptyScope(String),

    /// A scope refers to a handle the model never issued.
    #[error("constraint `{constraint}` refers to unknown variable #{}", .var.0)]
    UnknownVariable {
        /// Constraint name.
        constraint: String,
        /// The offending handle.
        var: VarId,
    },

    /// A tuple's length differs from the scope's.
    #[error("constraint `{constraint}`: tuple of arity {found}, scope has arity {expected}")]
    ArityMismatch {
        /// Constraint name.
        constraint: String,
        /// Scope length.
        expected: usize,
        /// Length of the offending tuple.
        found: usize,
    },

    /// A tuple holds a value outside the initial domain of its scope variable.
    #[error("constraint `{constraint}`: value {value} at position {position} is outside the domain of `{variable}`")]
    ValueOutsideDomain {
        /// Constraint name.
        constraint: String,
        /// Scope position of the value.
        position: usize,
        /// Name of the variable at that position.
        variable: String,
        /// The offending value.
        value: Value,
    },
}
