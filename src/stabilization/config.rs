//! Stabilization configuration.

/// Configuration for randomized dual stabilization.
///
/// # Examples
///
/// ```
/// use u_colgen::stabilization::StabilizationConfig;
///
/// let config = StabilizationConfig::default()
///     .with_trials(20)
///     .with_seed(1)
///     .with_skip_failed_trials(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StabilizationConfig {
    /// When `false`, stabilization returns immediately and leaves duals untouched.
    pub enabled: bool,

    /// Number of perturbed re-solves averaged together.
    pub trials: usize,

    /// Seed of the generator created at the start of every invocation.
    pub seed: u64,

    /// Solve trials concurrently (requires the `parallel` feature).
    ///
    /// Random vectors are drawn up front in trial order, so parallel and
    /// sequential runs produce identical duals.
    pub parallel: bool,

    /// Leave trials that did not reach optimality out of the average.
    ///
    /// By default such trials are averaged in with whatever duals the solver
    /// returned (zero where it returned none).
    pub skip_failed_trials: bool,
}

impl Default for StabilizationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trials: 20,
            seed: 1,
            parallel: false,
            skip_failed_trials: false,
        }
    }
}

impl StabilizationConfig {
    /// A configuration that turns stabilization off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_trials(mut self, n: usize) -> Self {
        self.trials = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_skip_failed_trials(mut self, skip: bool) -> Self {
        self.skip_failed_trials = skip;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.trials == 0 {
            return Err("trials must be at least 1".into());
        }
        Ok(())
    }
}
