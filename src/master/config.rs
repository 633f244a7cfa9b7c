//! Master problem configuration.

use crate::lp::{SolverConfig, VarDomain};
use crate::stabilization::StabilizationConfig;

/// Domain of the route variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VariableMode {
    /// Continuous variables in `[0, ∞)`: the LP relaxation used during pricing.
    #[default]
    Relaxed,
    /// Binary variables: the final integer solve over the route pool.
    Integer,
}

impl VariableMode {
    /// LP domain used for route variables in this mode.
    pub fn domain(&self) -> VarDomain {
        match self {
            VariableMode::Relaxed => VarDomain::Continuous,
            VariableMode::Integer => VarDomain::Binary,
        }
    }
}

/// Configuration for the restricted master problem.
///
/// # Examples
///
/// ```
/// use u_colgen::master::{MasterConfig, VariableMode};
/// use u_colgen::lp::SolverConfig;
/// use u_colgen::stabilization::StabilizationConfig;
///
/// let config = MasterConfig::default()
///     .with_mode(VariableMode::Relaxed)
///     .with_solver(SolverConfig::default().with_time_limit_ms(5_000))
///     .with_stabilization(StabilizationConfig::default().with_trials(20));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterConfig {
    /// Variable domain of the next build.
    pub mode: VariableMode,
    /// Settings passed to every solver call, stabilization trials included.
    pub solver: SolverConfig,
    /// Dual stabilization settings.
    pub stabilization: StabilizationConfig,
}

impl MasterConfig {
    pub fn with_mode(mut self, mode: VariableMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_stabilization(mut self, stabilization: StabilizationConfig) -> Self {
        self.stabilization = stabilization;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.solver.validate()?;
        self.stabilization.validate()
    }
}
