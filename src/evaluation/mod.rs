//! Two-tier evaluation pipeline: quickscreen (fast, early-exit) and
//! deepeval (exhaustive), plus the scalar reward function.

pub mod deepeval;
pub mod quickscreen;
pub mod reward;
pub mod runner;

pub use deepeval::run_deepeval;
pub use quickscreen::run_quickscreen;
pub use reward::compute_reward;
pub use runner::{ProgramRunner, RunnerError, SubprocessRunner};

use crate::schema::Diagnostic;

/// Configuration for the two evaluation stages.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    pub quickscreen_timeout: std::time::Duration,
    pub quickscreen_max_tests: usize,
    pub deepeval_timeout: std::time::Duration,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            quickscreen_timeout: std::time::Duration::from_millis(200),
            quickscreen_max_tests: 3,
            deepeval_timeout: std::time::Duration::from_secs(1),
        }
    }
}

/// Shared result shape produced by both evaluation stages.
#[derive(Debug, Clone)]
pub struct EvalOutcome {
    pub passed: bool,
    pub passed_count: usize,
    pub total: usize,
    pub timeouts: usize,
    pub avg_runtime: Option<f64>,
    pub diagnostics: Vec<Diagnostic>,
}
