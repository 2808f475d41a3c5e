//! CSP variable types.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A value a variable may take.
pub type Value = i32;

/// Handle of a variable inside a [`CspModel`](super::CspModel) arena.
///
/// Handles are only meaningful for the model that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VarId(pub usize);

impl VarId {
    /// Position of the variable in the model arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A finite-domain variable.
///
/// The domain held here is the *initial* domain: sorted, deduplicated and
/// fixed once the variable is built. Solvers keep their own working copy
/// (see [`WorkingDomains`](super::WorkingDomains)).
///
/// # Examples
///
/// ```
/// use tenner_csp::csp::Variable;
///
/// let v = Variable::new("x", [3, 1, 2, 1]);
/// assert_eq!(v.domain(), &[1, 2, 3]);
/// assert!(!v.is_fixed());
///
/// let f = Variable::fixed("y", 7);
/// assert_eq!(f.fixed_value(), Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "VariableParts"))]
pub struct Variable {
    /// Variable name (unique within a model by convention, not enforced).
    pub name: String,
    domain: Vec<Value>,
}

impl Variable {
    /// Creates a variable over the given values.
    ///
    /// Duplicates are removed and the domain is kept sorted. An empty
    /// domain is accepted here and rejected when the variable is added to
    /// a model.
    pub fn new(name: impl Into<String>, values: impl IntoIterator<Item = Value>) -> Self {
        let mut domain: Vec<Value> = values.into_iter().collect();
        domain.sort_unstable();
        domain.dedup();
        Self {
            name: name.into(),
            domain,
        }
    }

    /// Creates a variable whose domain is the single value `value`.
    pub fn fixed(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            domain: vec![value],
        }
    }

    /// The initial domain, in ascending order.
    pub fn domain(&self) -> &[Value] {
        &self.domain
    }

    /// Number of values in the domain.
    pub fn domain_size(&self) -> usize {
        self.domain.len()
    }

    /// Whether the domain holds exactly one value.
    pub fn is_fixed(&self) -> bool {
        self.domain.len() == 1
    }

    /// The single value of a fixed variable.
    pub fn fixed_value(&self) -> Option<Value> {
        match self.domain.as_slice() {
            [value] => Some(*value),
            _ => None,
        }
    }

    /// Whether `value` lies in the domain.
    pub fn contains(&self, value: Value) -> bool {
        self.domain.binary_search(&value).is_ok()
    }
}

/// Serialized form of a [`Variable`]; the domain is re-sorted on load.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct VariableParts {
    name: String,
    domain: Vec<Value>,
}

#[cfg(feature = "serde")]
impl From<VariableParts> for Variable {
    fn from(parts: VariableParts) -> Self {
        Self::new(parts.name, parts.domain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_sorted_and_deduplicated() {
        let v = Variable::new("x", [9, 0, 4, 4, 2]);
        assert_eq!(v.domain(), &[0, 2, 4, 9]);
        assert_eq!(v.domain_size(), 4);
        assert!(v.contains(4));
        assert!(!v.contains(5));
        assert_eq!(v.fixed_value(), None);
    }

    #[test]
    fn test_fixed_variable() {
        let f = Variable::fixed("y", 3);
        assert!(f.is_fixed());
        assert_eq!(f.domain(), &[3]);
        assert_eq!(f.fixed_value(), Some(3));
    }

    #[test]
    fn test_singleton_from_new_is_fixed() {
        let v = Variable::new("z", [5, 5]);
        assert!(v.is_fixed());
        assert_eq!(v.fixed_value(), Some(5));
    }

    #[test]
    fn test_var_id_index() {
        assert_eq!(VarId(12).index(), 12);
    }
}
