//! LP variable types.

/// Domain of a decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarDomain {
    /// Real-valued within its bounds.
    Continuous,
    /// Restricted to {0, 1}. Bounds are ignored.
    Binary,
}

/// A decision variable with bounds and a domain.
///
/// # Examples
///
/// ```
/// use u_colgen::lp::{LpVariable, VarDomain};
///
/// let x = LpVariable::continuous("x", 0.0);
/// assert_eq!(x.lower, 0.0);
/// assert!(x.upper.is_none());
///
/// let y = LpVariable::binary("y");
/// assert_eq!(y.domain, VarDomain::Binary);
/// assert_eq!(y.upper_bound(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpVariable {
    /// Variable name (unique identifier within a model).
    pub name: String,
    /// Lower bound. Must be finite.
    pub lower: f64,
    /// Upper bound, `None` for unbounded.
    pub upper: Option<f64>,
    /// Variable domain.
    pub domain: VarDomain,
}

impl LpVariable {
    /// Creates a continuous variable with the given lower bound and no upper bound.
    pub fn continuous(name: impl Into<String>, lower: f64) -> Self {
        Self {
            name: name.into(),
            lower,
            upper: None,
            domain: VarDomain::Continuous,
        }
    }

    /// Creates a binary variable.
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lower: 0.0,
            upper: Some(1.0),
            domain: VarDomain::Binary,
        }
    }

    /// Sets an upper bound.
    pub fn with_upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    /// Effective upper bound (`f64::INFINITY` when unbounded).
    pub fn upper_bound(&self) -> f64 {
        self.upper.unwrap_or(f64::INFINITY)
    }

    /// Whether the variable takes integral values.
    pub fn is_integer(&self) -> bool {
        self.domain == VarDomain::Binary
    }
}
