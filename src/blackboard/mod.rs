//! The shared knowledge base consulted and mutated by every agent proposal
//! and MCTS expansion.
//!
//! A `Blackboard` bundles four sub-boards — [`ProblemModel`], [`TestsBoard`],
//! [`StrategyBoard`], [`PatchBoard`] — plus the current candidate code and an
//! append-only [`crate::schema::FailureRecord`] log. It is `#[derive(Clone)]`:
//! every MCTS expansion edge deep-clones the whole structure so sibling
//! subtrees never alias each other's mutable state.

mod patch_board;
mod problem_model;
mod strategy_board;
mod tests_board;

pub use patch_board::{PatchBoard, PatchOutcome};
pub use problem_model::ProblemModel;
pub use strategy_board::StrategyBoard;
pub use tests_board::TestsBoard;

use crate::schema::Diagnostic;

/// The full shared state threaded through one synthesis run.
#[derive(Debug, Clone)]
pub struct Blackboard {
    pub problem: ProblemModel,
    pub tests: TestsBoard,
    pub strategy: StrategyBoard,
    pub patches: PatchBoard,
    pub code: String,
}

impl Blackboard {
    pub fn new(problem: ProblemModel) -> Self {
        Self {
            problem,
            tests: TestsBoard::default(),
            strategy: StrategyBoard::default(),
            patches: PatchBoard::default(),
            code: String::new(),
        }
    }

    pub fn with_seed(problem: ProblemModel, seed: u64) -> Self {
        Self {
            problem,
            tests: TestsBoard::with_seed(seed),
            strategy: StrategyBoard::with_seed(seed),
            patches: PatchBoard::default(),
            code: String::new(),
        }
    }

    /// Fold a diagnostic into the `TestsBoard`'s append-only failure log,
    /// then add each offending test as a counterexample (`failing_tests[i].testcase`
    /// when present, else `diag.test`) so the counterexample feedback loop and
    /// quickscreen's counterexamples group are fed.
    pub fn record_diagnostic(&mut self, diag: &Diagnostic) {
        self.tests.record_failure(diag);

        use crate::schema::DiagnosticStatus;
        let is_failure = matches!(diag.status, DiagnosticStatus::Wa | DiagnosticStatus::Re | DiagnosticStatus::Tle);
        if is_failure {
            if !diag.failing_tests.is_empty() {
                for result in &diag.failing_tests {
                    self.tests.add_counterexample(result.testcase.clone());
                }
            } else if let Some(test) = &diag.test {
                self.tests.add_counterexample(test.clone());
            }
        }
    }

    /// Count of consecutive trailing failures (non-`Pass` status) in the
    /// failure log, used by agents to detect thrashing.
    pub fn consecutive_failures(&self) -> usize {
        self.tests
            .failure_metadata()
            .iter()
            .rev()
            .take_while(|r| r.status != crate::schema::DiagnosticStatus::Pass)
            .count()
    }
}
