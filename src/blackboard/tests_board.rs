//! Seed / generated / counterexample / minimized test buckets, the
//! append-only failure log, and deterministic quickscreen suite selection.

use crate::schema::{Diagnostic, FailureRecord, TestCase, TestOrigin};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Scan order `get_quickscreen_suite` walks when assembling a suite.
const QUICKSCREEN_GROUP_ORDER: [Group; 4] = [Group::Minimized, Group::Counterexamples, Group::Seed, Group::Generated];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Seed,
    Generated,
    Counterexamples,
    Minimized,
}

/// The four ordered, deduplicated-by-`input` test sequences plus the
/// append-only failure log.
#[derive(Debug, Clone)]
pub struct TestsBoard {
    seed: Vec<TestCase>,
    generated: Vec<TestCase>,
    counterexamples: Vec<TestCase>,
    minimized: Vec<TestCase>,
    failure_metadata: Vec<FailureRecord>,
    rng_seed: u64,
}

impl Default for TestsBoard {
    fn default() -> Self {
        Self {
            seed: Vec::new(),
            generated: Vec::new(),
            counterexamples: Vec::new(),
            minimized: Vec::new(),
            failure_metadata: Vec::new(),
            rng_seed: 0,
        }
    }
}

impl TestsBoard {
    pub fn with_seed(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::default()
        }
    }

    pub fn seed_tests(&self) -> &[TestCase] {
        &self.seed
    }

    pub fn generated_tests(&self) -> &[TestCase] {
        &self.generated
    }

    pub fn counterexamples(&self) -> &[TestCase] {
        &self.counterexamples
    }

    pub fn minimized(&self) -> &[TestCase] {
        &self.minimized
    }

    pub fn failure_metadata(&self) -> &[FailureRecord] {
        &self.failure_metadata
    }

    /// Insert a seed test, deduping by `input`. Not part of the quickscreen
    /// priority groups by default ordering — callers populate this at
    /// problem-construction time.
    pub fn add_seed_test(&mut self, tc: TestCase) {
        insert_unique(&mut self.seed, tc);
    }

    pub fn add_counterexample(&mut self, tc: TestCase) {
        insert_unique(&mut self.counterexamples, tc);
    }

    pub fn add_minimized(&mut self, tc: TestCase) {
        insert_unique(&mut self.minimized, tc);
    }

    /// Append a `FailureRecord` derived from `diag`. `timestamp` is the
    /// sequence length before append. The offending test is
    /// `diag.failing_tests[0].testcase` if present, else `diag.test`.
    pub fn record_failure(&mut self, diag: &Diagnostic) {
        let test = diag
            .failing_tests
            .first()
            .map(|r| r.testcase.clone())
            .or_else(|| diag.test.clone());
        let timestamp = self.failure_metadata.len() as u64;
        self.failure_metadata.push(FailureRecord {
            status: diag.status,
            test,
            stage: diag.stage,
            message: diag.message.clone(),
            timestamp,
        });
    }

    /// Route each test to the bucket matching its origin
    /// (`Minimized`→minimized, `Counterexample`→counterexamples, all
    /// others→generated), deduping within the destination bucket.
    pub fn add_generated_tests(&mut self, tests: impl IntoIterator<Item = TestCase>) {
        for tc in tests {
            match tc.origin {
                TestOrigin::Minimized => insert_unique(&mut self.minimized, tc),
                TestOrigin::Counterexample => insert_unique(&mut self.counterexamples, tc),
                _ => insert_unique(&mut self.generated, tc),
            }
        }
    }

    fn group(&self, group: Group) -> &[TestCase] {
        match group {
            Group::Seed => &self.seed,
            Group::Generated => &self.generated,
            Group::Counterexamples => &self.counterexamples,
            Group::Minimized => &self.minimized,
        }
    }

    /// Build a suite by scanning groups in priority order
    /// `[minimized, counterexamples, seed, generated]`, taking unique
    /// `input`s until `max_n` filled. A group exceeding the remaining
    /// budget is shuffled with a fresh `StdRng` seeded from the board's
    /// `rng_seed` and truncated. Returns a sequence of length
    /// `≤ max_n` with globally unique `input`s.
    pub fn get_quickscreen_suite(&self, max_n: usize) -> Vec<TestCase> {
        let mut rng = StdRng::seed_from_u64(self.rng_seed);
        let mut suite: Vec<TestCase> = Vec::new();
        let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();

        for group in QUICKSCREEN_GROUP_ORDER {
            if suite.len() >= max_n {
                break;
            }
            let remaining = max_n - suite.len();
            let unique: Vec<&TestCase> = self
                .group(group)
                .iter()
                .filter(|tc| !seen.contains(&tc.input))
                .collect();

            let chosen: Vec<&TestCase> = if unique.len() > remaining {
                let mut shuffled = unique;
                shuffled.shuffle(&mut rng);
                shuffled.into_iter().take(remaining).collect()
            } else {
                unique
            };

            for tc in chosen {
                seen.insert(tc.input.clone());
                suite.push(tc.clone());
            }
        }

        suite
    }
}

fn insert_unique(bucket: &mut Vec<TestCase>, tc: TestCase) {
    if !bucket.iter().any(|existing| existing.input == tc.input) {
        bucket.push(tc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DiagnosticStatus, Stage};

    fn tc(input: &str, origin: TestOrigin) -> TestCase {
        TestCase::new(input, Some(input.to_string()), origin)
    }

    #[test]
    fn dedup_by_input_within_bucket() {
        let mut board = TestsBoard::default();
        board.add_seed_test(tc("1", TestOrigin::AppsExample));
        board.add_seed_test(tc("1", TestOrigin::AppsExample));
        assert_eq!(board.seed_tests().len(), 1);
    }

    #[test]
    fn add_generated_tests_routes_by_origin() {
        let mut board = TestsBoard::default();
        board.add_generated_tests(vec![
            tc("a", TestOrigin::Minimized),
            tc("b", TestOrigin::Counterexample),
            tc("c", TestOrigin::GeneratedRandom),
        ]);
        assert_eq!(board.minimized().len(), 1);
        assert_eq!(board.counterexamples().len(), 1);
        assert_eq!(board.generated_tests().len(), 1);
    }

    #[test]
    fn quickscreen_suite_respects_priority_order_and_cap() {
        let mut board = TestsBoard::with_seed(42);
        board.add_seed_test(tc("seed1", TestOrigin::AppsExample));
        board.add_minimized(tc("min1", TestOrigin::Minimized));
        board.add_counterexample(tc("ce1", TestOrigin::Counterexample));

        let suite = board.get_quickscreen_suite(2);
        assert_eq!(suite.len(), 2);
        assert_eq!(suite[0].input, "min1");
        assert_eq!(suite[1].input, "ce1");
    }

    #[test]
    fn quickscreen_suite_has_globally_unique_inputs() {
        let mut board = TestsBoard::with_seed(7);
        board.add_minimized(tc("dup", TestOrigin::Minimized));
        board.add_counterexample(tc("dup", TestOrigin::Counterexample));
        board.add_seed_test(tc("other", TestOrigin::AppsExample));

        let suite = board.get_quickscreen_suite(10);
        let inputs: std::collections::HashSet<_> = suite.iter().map(|t| t.input.clone()).collect();
        assert_eq!(inputs.len(), suite.len());
    }

    #[test]
    fn record_failure_prefers_failing_tests_first_entry() {
        let mut board = TestsBoard::default();
        let mut diag = Diagnostic::new(Stage::Deepeval, DiagnosticStatus::Wa, Some(tc("fallback", TestOrigin::AppsTest)), "wrong answer");
        diag.failing_tests.push(crate::schema::TestCaseResult {
            testcase: tc("primary", TestOrigin::AppsTest),
            actual_output: Some("x".into()),
            expected_output: Some("y".into()),
        });
        board.record_failure(&diag);
        assert_eq!(board.failure_metadata()[0].test.as_ref().unwrap().input, "primary");
        assert_eq!(board.failure_metadata()[0].timestamp, 0);
    }
}
