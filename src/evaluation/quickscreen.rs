//! Fast, early-terminating test pass over at most a handful of
//! representative tests.

use super::runner::ProgramRunner;
use super::EvalOutcome;
use crate::blackboard::TestsBoard;
use crate::schema::{Diagnostic, DiagnosticStatus, Stage, TestCase};
use std::time::Duration;

/// Pull at most `max_tests` tests from `tests.get_quickscreen_suite`, run
/// them sequentially against `code`, and stop at the first failure.
/// Returns exactly one diagnostic on failure, none on a full pass.
pub async fn run_quickscreen(
    code: &str,
    tests: &TestsBoard,
    runner: &dyn ProgramRunner,
    timeout: Duration,
    max_tests: usize,
) -> EvalOutcome {
    let suite = tests.get_quickscreen_suite(max_tests);
    let total = suite.len();
    let mut passed_count = 0;
    let mut timeouts = 0;
    let mut runtimes: Vec<f64> = Vec::new();

    for tc in &suite {
        let run = runner.run(code, &tc.input, timeout).await;
        let run = match run {
            Ok(r) => r,
            Err(_) => {
                let diag = re_diagnostic(tc, Stage::Quickscreen, "failed to execute candidate");
                return EvalOutcome {
                    passed: false,
                    passed_count,
                    total,
                    timeouts,
                    avg_runtime: avg(&runtimes),
                    diagnostics: vec![diag],
                };
            }
        };
        runtimes.push(run.runtime);

        let status = classify(&run, tc);
        match status {
            DiagnosticStatus::Pass => passed_count += 1,
            _ => {
                if status == DiagnosticStatus::Tle {
                    timeouts += 1;
                }
                let diag = make_diagnostic(Stage::Quickscreen, status, tc, &run);
                return EvalOutcome {
                    passed: false,
                    passed_count,
                    total,
                    timeouts,
                    avg_runtime: avg(&runtimes),
                    diagnostics: vec![diag],
                };
            }
        }
    }

    EvalOutcome {
        passed: true,
        passed_count,
        total,
        timeouts,
        avg_runtime: avg(&runtimes),
        diagnostics: Vec::new(),
    }
}

fn avg(runtimes: &[f64]) -> Option<f64> {
    if runtimes.is_empty() {
        None
    } else {
        Some(runtimes.iter().sum::<f64>() / runtimes.len() as f64)
    }
}

/// Status precedence: TLE if timed out; else RE if exit code ≠ 0; else WA
/// if trimmed stdout ≠ trimmed expected; else PASS.
fn classify(run: &super::runner::RunResult, tc: &TestCase) -> DiagnosticStatus {
    if run.timed_out {
        return DiagnosticStatus::Tle;
    }
    if run.exit_code != Some(0) {
        return DiagnosticStatus::Re;
    }
    if run.stdout.trim() != tc.expected_output().trim() {
        return DiagnosticStatus::Wa;
    }
    DiagnosticStatus::Pass
}

fn make_diagnostic(stage: Stage, status: DiagnosticStatus, tc: &TestCase, run: &super::runner::RunResult) -> Diagnostic {
    let message = match status {
        DiagnosticStatus::Tle => "test timed out".to_string(),
        DiagnosticStatus::Re => format!("nonzero exit code: {:?}", run.exit_code),
        DiagnosticStatus::Wa => "stdout did not match expected output".to_string(),
        _ => "unexpected status".to_string(),
    };
    let mut diag = Diagnostic::new(stage, status, Some(tc.clone()), message);
    diag.actual_output = Some(run.stdout.clone());
    diag.expected_output = tc.expected.clone();
    diag.runtime = Some(run.runtime);
    diag
}

fn re_diagnostic(tc: &TestCase, stage: Stage, message: &str) -> Diagnostic {
    Diagnostic::new(stage, DiagnosticStatus::Re, Some(tc.clone()), message.to_string())
}
