//! Execution limits for script evaluation
//!
//! A `while` loop whose condition never turns false would otherwise spin
//! forever. The limit is a safety bound: reaching it ends the loop quietly
//! (with a warning in the logs) instead of failing the script.

/// Limits applied while executing a script
#[derive(Debug, Clone)]
pub struct ExecutionLimits {
    /// Maximum passes through the body of a single `while` loop
    /// Default: 1,000
    pub max_loop_iterations: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            max_loop_iterations: 1_000,
        }
    }
}

impl ExecutionLimits {
    /// Create new limits with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum loop iterations
    pub fn max_loop_iterations(mut self, count: usize) -> Self {
        self.max_loop_iterations = count;
        self
    }
}

/// Iteration counter owned by one running loop.
///
/// Each loop gets its own counter so a nested loop never resets or consumes
/// the budget of the loop around it.
#[derive(Debug, Clone)]
pub struct LoopCounter {
    iterations: usize,
    max: usize,
}

impl LoopCounter {
    /// Create a counter bounded by `limits.max_loop_iterations`
    pub fn new(limits: &ExecutionLimits) -> Self {
        Self {
            iterations: 0,
            max: limits.max_loop_iterations,
        }
    }

    /// Count one more pass, returns error if the bound is exceeded
    pub fn tick(&mut self) -> Result<(), LimitExceeded> {
        self.iterations += 1;
        if self.iterations > self.max {
            return Err(LimitExceeded::MaxLoopIterations(self.max));
        }
        Ok(())
    }

    /// Passes completed so far
    pub fn iterations(&self) -> usize {
        self.iterations.min(self.max)
    }
}

/// Error returned when a limit is reached
#[derive(Debug, Clone, thiserror::Error)]
pub enum LimitExceeded {
    #[error("maximum loop iterations exceeded ({0})")]
    MaxLoopIterations(usize),
}
