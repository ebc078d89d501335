//! Exhaustive test pass over every test in the problem's `tests` view,
//! accumulating one diagnostic per failing test.

use super::runner::ProgramRunner;
use super::EvalOutcome;
use crate::schema::{Diagnostic, DiagnosticStatus, Stage, TestCase};
use std::time::Duration;

/// Iterate all of `tests` (the problem view's `tests`, not `examples`)
/// against `code`. `passed = passed_count == total`.
pub async fn run_deepeval(code: &str, tests: &[TestCase], runner: &dyn ProgramRunner, timeout: Duration) -> EvalOutcome {
    let total = tests.len();
    let mut passed_count = 0;
    let mut timeouts = 0;
    let mut runtimes: Vec<f64> = Vec::new();
    let mut diagnostics = Vec::new();

    for tc in tests {
        let run = match runner.run(code, &tc.input, timeout).await {
            Ok(r) => r,
            Err(_) => {
                diagnostics.push(Diagnostic::new(
                    Stage::Deepeval,
                    DiagnosticStatus::Re,
                    Some(tc.clone()),
                    "failed to execute candidate",
                ));
                continue;
            }
        };
        runtimes.push(run.runtime);

        let status = classify(&run, tc);
        if status == DiagnosticStatus::Pass {
            passed_count += 1;
            continue;
        }
        if status == DiagnosticStatus::Tle {
            timeouts += 1;
        }

        let message = match status {
            DiagnosticStatus::Tle => "test timed out".to_string(),
            DiagnosticStatus::Re => format!("nonzero exit code: {:?}", run.exit_code),
            DiagnosticStatus::Wa => "stdout did not match expected output".to_string(),
            _ => "unexpected status".to_string(),
        };
        let mut diag = Diagnostic::new(Stage::Deepeval, status, Some(tc.clone()), message);
        diag.actual_output = Some(run.stdout.clone());
        diag.expected_output = tc.expected.clone();
        diag.runtime = Some(run.runtime);
        diagnostics.push(diag);
    }

    EvalOutcome {
        passed: passed_count == total,
        passed_count,
        total,
        timeouts,
        avg_runtime: if runtimes.is_empty() {
            None
        } else {
            Some(runtimes.iter().sum::<f64>() / runtimes.len() as f64)
        },
        diagnostics,
    }
}

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::runner::{passing_result, StubRunner};
    use crate::schema::TestOrigin;

    #[tokio::test]
    async fn accumulates_one_diagnostic_per_failing_test() {
        let tests = vec![
            TestCase::new("a", Some("1\n".into()), TestOrigin::AppsTest),
            TestCase::new("b", Some("2\n".into()), TestOrigin::AppsTest),
        ];
        let runner = StubRunner::new(passing_result("1\n")).with_output("b", passing_result("wrong\n"));

        let outcome = run_deepeval("code", &tests, &runner, Duration::from_secs(1)).await;
        assert!(!outcome.passed);
        assert_eq!(outcome.passed_count, 1);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].test.as_ref().unwrap().input, "b");
    }

    #[tokio::test]
    async fn all_pass_sets_passed_true() {
        let tests = vec![TestCase::new("a", Some("1\n".into()), TestOrigin::AppsTest)];
        let runner = StubRunner::new(passing_result("1\n"));
        let outcome = run_deepeval("code", &tests, &runner, Duration::from_secs(1)).await;
        assert!(outcome.passed);
    }

    #[tokio::test]
    async fn empty_test_set_is_vacuously_passed() {
        let outcome = run_deepeval("code", &[], &StubRunner::new(passing_result("")), Duration::from_secs(1)).await;
        assert!(outcome.passed);
        assert_eq!(outcome.total, 0);
    }
}
