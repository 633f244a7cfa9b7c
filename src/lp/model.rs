//! LP model definition.

use super::variables::LpVariable;
use std::collections::{HashMap, HashSet};

/// Relation between the left- and right-hand side of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
    /// `lhs == rhs`
    Eq,
}

impl Sense {
    /// Operator text used in LP exports.
    pub fn symbol(&self) -> &'static str {
        match self {
            Sense::Le => "<=",
            Sense::Ge => ">=",
            Sense::Eq => "=",
        }
    }
}

/// A named linear constraint `Σ coef·var (sense) rhs`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpConstraint {
    /// Constraint name (unique within a model).
    pub name: String,
    /// (variable_name, coefficient) pairs.
    pub terms: Vec<(String, f64)>,
    /// Constraint sense.
    pub sense: Sense,
    /// Right-hand side constant.
    pub rhs: f64,
}

impl LpConstraint {
    /// Creates a constraint.
    pub fn new(name: impl Into<String>, terms: Vec<(String, f64)>, sense: Sense, rhs: f64) -> Self {
        Self {
            name: name.into(),
            terms,
            sense,
            rhs,
        }
    }

    /// Left-hand side value for the given variable values.
    pub fn activity(&self, value_of: impl Fn(&str) -> f64) -> f64 {
        self.terms.iter().map(|(name, coef)| coef * value_of(name)).sum()
    }
}

/// A linear minimization model.
///
/// Variables and constraints keep their insertion order, which is the order
/// solvers see and the order of LP exports. Adding a variable or constraint
/// whose name already exists replaces the previous definition in place.
///
/// # Examples
///
/// ```
/// use u_colgen::lp::{LpModel, LpVariable, Sense};
///
/// let mut model = LpModel::new("example");
/// model.add_variable(LpVariable::continuous("x", 0.0));
/// model.add_variable(LpVariable::continuous("y", 0.0));
/// model.set_objective(vec![("x".into(), 1.0), ("y".into(), 2.0)]);
/// model.add_constraint("c1", vec![("x".into(), 1.0), ("y".into(), 1.0)], Sense::Ge, 1.0);
/// assert!(model.validate().is_ok());
/// assert_eq!(model.num_variables(), 2);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LpModel {
    name: String,
    variables: Vec<LpVariable>,
    var_index: HashMap<String, usize>,
    constraints: Vec<LpConstraint>,
    con_index: HashMap<String, usize>,
    objective: Vec<(String, f64)>,
}

impl LpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a variable.
    pub fn add_variable(&mut self, var: LpVariable) {
        match self.var_index.get(&var.name) {
            Some(&idx) => self.variables[idx] = var,
            None => {
                self.var_index.insert(var.name.clone(), self.variables.len());
                self.variables.push(var);
            }
        }
    }

    /// Adds a constraint.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: Vec<(String, f64)>,
        sense: Sense,
        rhs: f64,
    ) {
        let constraint = LpConstraint::new(name, terms, sense, rhs);
        match self.con_index.get(&constraint.name) {
            Some(&idx) => self.constraints[idx] = constraint,
            None => {
                self.con_index
                    .insert(constraint.name.clone(), self.constraints.len());
                self.constraints.push(constraint);
            }
        }
    }

    /// Sets the objective (minimized) as (variable_name, coefficient) pairs.
    pub fn set_objective(&mut self, terms: Vec<(String, f64)>) {
        self.objective = terms;
    }

    /// Objective terms.
    pub fn objective(&self) -> &[(String, f64)] {
        &self.objective
    }

    /// Variables in insertion order.
    pub fn variables(&self) -> &[LpVariable] {
        &self.variables
    }

    /// Constraints in insertion order.
    pub fn constraints(&self) -> &[LpConstraint] {
        &self.constraints
    }

    /// Looks up a variable by name.
    pub fn variable(&self, name: &str) -> Option<&LpVariable> {
        self.var_index.get(name).map(|&i| &self.variables[i])
    }

    /// Looks up a constraint by name.
    pub fn constraint(&self, name: &str) -> Option<&LpConstraint> {
        self.con_index.get(name).map(|&i| &self.constraints[i])
    }

    /// Position of a variable in insertion order.
    pub fn variable_position(&self, name: &str) -> Option<usize> {
        self.var_index.get(name).copied()
    }

    /// Overwrites a variable's lower bound. Returns `false` if the name is unknown.
    pub fn set_lower_bound(&mut self, name: &str, lower: f64) -> bool {
        match self.var_index.get(name) {
            Some(&i) => {
                self.variables[i].lower = lower;
                true
            }
            None => false,
        }
    }

    /// Overwrites a constraint's right-hand side. Returns `false` if the name is unknown.
    pub fn set_rhs(&mut self, name: &str, rhs: f64) -> bool {
        match self.con_index.get(name) {
            Some(&i) => {
                self.constraints[i].rhs = rhs;
                true
            }
            None => false,
        }
    }

    /// Whether any variable is integral.
    pub fn has_integer_vars(&self) -> bool {
        self.variables.iter().any(LpVariable::is_integer)
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Validates the model for consistency.
    ///
    /// Checks that all referenced variables exist, that no variable appears
    /// twice in one expression, and that bounds and coefficients are usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.variables.is_empty() {
            return Err("model has no variables".into());
        }
        for var in &self.variables {
            if !var.lower.is_finite() {
                return Err(format!("variable {} has non-finite lower bound", var.name));
            }
            if var.upper_bound() < var.lower {
                return Err(format!("variable {} has empty bounds", var.name));
            }
        }
        for (name, coef) in &self.objective {
            if !self.var_index.contains_key(name) {
                return Err(format!("objective references undefined variable: {name}"));
            }
            if !coef.is_finite() {
                return Err(format!("objective coefficient of {name} is not finite"));
            }
        }
        for constraint in &self.constraints {
            if !constraint.rhs.is_finite() {
                return Err(format!("constraint {} has non-finite rhs", constraint.name));
            }
            let mut seen: HashSet<&str> = HashSet::with_capacity(constraint.terms.len());
            for (name, coef) in &constraint.terms {
                if !self.var_index.contains_key(name) {
                    return Err(format!(
                        "constraint {} references undefined variable: {name}",
                        constraint.name
                    ));
                }
                if !coef.is_finite() {
                    return Err(format!(
                        "constraint {} has non-finite coefficient for {name}",
                        constraint.name
                    ));
                }
                if !seen.insert(name.as_str()) {
                    return Err(format!(
                        "constraint {} lists variable {name} twice",
                        constraint.name
                    ));
                }
            }
        }
        Ok(())
    }
}
