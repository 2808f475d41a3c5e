//! Model compilation configuration.
//!
//! [`TennerConfig`] selects the decomposition and tunes how tables are built.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the all-different rule on each row is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ModelVariant {
    /// 45 pairwise inequalities per row. Small tables, weaker propagation.
    #[default]
    Binary,
    /// One 10-ary permutation table per row. Large tables, stronger propagation.
    Nary,
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Nary => write!(f, "n-ary"),
        }
    }
}

/// How row permutation tables are enumerated for [`ModelVariant::Nary`].
///
/// Both strategies produce the same tuple set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RowPermutations {
    /// Permute only the digits missing from the row over its empty cells.
    #[default]
    Direct,
    /// Enumerate all 10! permutations and keep those matching the pre-set cells.
    FilterAll,
}

/// Configuration for compiling a Tenner Grid into a CSP model.
///
/// # Defaults
///
/// ```
/// use tenner_csp::tenner::{ModelVariant, RowPermutations, TennerConfig};
///
/// let config = TennerConfig::default();
/// assert_eq!(config.variant, ModelVariant::Binary);
/// assert_eq!(config.row_permutations, RowPermutations::Direct);
/// assert!(!config.complete_adjacency);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use tenner_csp::tenner::{ModelVariant, TennerConfig};
///
/// let config = TennerConfig::default()
///     .with_variant(ModelVariant::Nary)
///     .with_name("puzzle-17")
///     .with_parallel(false);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TennerConfig {
    /// Name given to the produced [`CspModel`](crate::csp::CspModel).
    pub name: String,

    /// Decomposition used by [`build_model`](super::build_model).
    pub variant: ModelVariant,

    /// Row table enumeration for the n-ary decomposition.
    pub row_permutations: RowPermutations,

    /// Also constrain the anti-diagonal neighbours and the vertical pairs
    /// of the last column.
    ///
    /// Off by default: the standard geometry only links each cell to its
    /// right, lower and lower-right neighbours, for columns 0-8.
    pub complete_adjacency: bool,

    /// Whether to build column-sum and row tables in parallel using rayon.
    ///
    /// Only takes effect with the `parallel` feature.
    pub parallel: bool,
}

impl Default for TennerConfig {
    fn default() -> Self {
        Self {
            name: "tenner_csp".into(),
            variant: ModelVariant::default(),
            row_permutations: RowPermutations::default(),
            complete_adjacency: false,
            parallel: true,
        }
    }
}

impl TennerConfig {
    /// Sets the model name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the decomposition.
    pub fn with_variant(mut self, variant: ModelVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the row permutation strategy.
    pub fn with_row_permutations(mut self, strategy: RowPermutations) -> Self {
        self.row_permutations = strategy;
        self
    }

    /// Enables or disables the extra adjacency constraints.
    pub fn with_complete_adjacency(mut self, enabled: bool) -> Self {
        self.complete_adjacency = enabled;
        self
    }

    /// Enables or disables parallel table construction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
