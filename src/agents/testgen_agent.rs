//! Proposes new tests, falling back to a deterministic seeded generation
//! scheme when the LLM response is empty or unparseable.

use super::{blackboard_summary, prompts, Agent, AgentBase};
use crate::actions::Action;
use crate::blackboard::Blackboard;
use crate::llm::LlmClient;
use crate::schema::{TestCase, TestOrigin};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

const EXTREME_VALUES: [i64; 3] = [-10, -1, 0];
const RANDOM_PAIR_COUNT: usize = 3;
const RANDOM_RANGE: std::ops::RangeInclusive<i64> = -20..=20;

pub struct TestGenAgent {
    base: AgentBase,
    seed: u64,
}

impl TestGenAgent {
    pub fn new(seed: u64) -> Self {
        Self {
            base: AgentBase::new("testgen_agent"),
            seed,
        }
    }
}

impl Default for TestGenAgent {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TestGenAgent {
    pub fn base_reset(&self) {
        self.base.reset_iteration();
    }
}

#[async_trait(?Send)]
impl Agent for TestGenAgent {
    fn name(&self) -> &'static str {
        "testgen_agent"
    }

    async fn propose(&self, code: &str, blackboard: &mut Blackboard, llm: &dyn LlmClient) -> Vec<Action> {
        let summary = blackboard_summary(blackboard);
        let prompt = prompts::testgen_prompt(blackboard, self.seed);
        let response = self.base.call_llm(llm, code, &summary, &prompt).await;

        let tests = match response.and_then(|r| parse_tests(&r)) {
            Some(tests) if !tests.is_empty() => tests,
            _ => fallback_tests(blackboard, self.seed),
        };

        vec![Action::test_generation(tests)]
    }
}

fn parse_tests(text: &str) -> Option<Vec<TestCase>> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let array = value.get("tests")?.as_array()?;
    let mut tests = Vec::new();
    for item in array {
        let input = item.get("input")?.as_str()?.to_string();
        let expected = item
            .get("expected_output")
            .or_else(|| item.get("expected"))
            .and_then(|v| v.as_str())
            .map(String::from);
        let origin = item
            .get("origin")
            .and_then(|v| v.as_str())
            .map(TestOrigin::parse_lenient)
            .unwrap_or(TestOrigin::GeneratedRandom);
        tests.push(TestCase::new(input, expected, origin));
    }
    Some(tests)
}

/// 1. A minimized half-length counterexample from the latest
///    counterexample, if its input has ≥2 whitespace-separated tokens.
/// 2. A 3×3 cross-product of extreme pairs from `{-10, -1, 0}`.
/// 3. `RANDOM_PAIR_COUNT` random integer pairs in `[-20, 20]` from a fresh
///    seeded RNG.
fn fallback_tests(blackboard: &Blackboard, seed: u64) -> Vec<TestCase> {
    let wants_sum = {
        let lower = blackboard.problem.raw_statement.to_lowercase();
        lower.contains("sum") || lower.contains("add")
    };
    let expected_for = |input: &str| -> Option<String> {
        if !wants_sum {
            return None;
        }
        let total: i64 = input.split_whitespace().filter_map(|t| t.parse::<i64>().ok()).sum();
        Some(format!("{total}\n"))
    };

    let mut tests = Vec::new();

    if let Some(latest) = blackboard.tests.counterexamples().last() {
        let tokens: Vec<&str> = latest.input.split_whitespace().collect();
        if tokens.len() >= 2 {
            let half = tokens.len() / 2;
            let minimized_input = tokens[..half.max(1)].join(" ");
            let expected = expected_for(&minimized_input);
            tests.push(TestCase::new(minimized_input, expected, TestOrigin::Minimized));
        }
    }

    for a in EXTREME_VALUES {
        for b in EXTREME_VALUES {
            let input = format!("{a} {b}\n");
            let expected = expected_for(&input);
            tests.push(TestCase::new(input, expected, TestOrigin::GeneratedExtreme));
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..RANDOM_PAIR_COUNT {
        let a = rng.random_range(RANDOM_RANGE);
        let b = rng.random_range(RANDOM_RANGE);
        let input = format!("{a} {b}\n");
        let expected = expected_for(&input);
        tests.push(TestCase::new(input, expected, TestOrigin::GeneratedRandom));
    }

    tests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::ProblemModel;
    use crate::llm::StubLlmClient;

    fn bb_with_statement(stmt: &str) -> Blackboard {
        Blackboard::new(ProblemModel::new("p", stmt, ""))
    }

    #[tokio::test]
    async fn parses_wrapped_tests_object() {
        let mut board = bb_with_statement("Sort the array.");
        let agent = TestGenAgent::new(3);
        let response = r#"{"tests": [{"input": "5 1 3\n", "expected_output": "1 3 5\n", "origin": "GENERATED_RANDOM", "rationale": "basic case"}]}"#;
        let actions = agent.propose("code", &mut board, &StubLlmClient::responding(response)).await;
        match &actions[0].kind {
            crate::actions::ActionKind::TestGeneration { tests } => {
                assert_eq!(tests.len(), 1);
                assert_eq!(tests[0].input, "5 1 3\n");
                assert_eq!(tests[0].expected.as_deref(), Some("1 3 5\n"));
            }
            _ => panic!("expected TestGeneration"),
        }
    }

    #[tokio::test]
    async fn fallback_produces_nine_extreme_cases_plus_random_pairs() {
        let mut board = bb_with_statement("Compute the sum of two numbers.");
        let agent = TestGenAgent::new(7);
        let actions = agent.propose("code", &mut board, &StubLlmClient::empty()).await;
        match &actions[0].kind {
            crate::actions::ActionKind::TestGeneration { tests } => {
                let extreme_count = tests.iter().filter(|t| t.origin == TestOrigin::GeneratedExtreme).count();
                let random_count = tests.iter().filter(|t| t.origin == TestOrigin::GeneratedRandom).count();
                assert_eq!(extreme_count, 9);
                assert_eq!(random_count, RANDOM_PAIR_COUNT);
            }
            _ => panic!("expected TestGeneration"),
        }
    }

    #[tokio::test]
    async fn fallback_computes_expected_sum_when_statement_mentions_sum() {
        let mut board = bb_with_statement("Find the sum of a and b.");
        let agent = TestGenAgent::new(1);
        let actions = agent.propose("code", &mut board, &StubLlmClient::empty()).await;
        match &actions[0].kind {
            crate::actions::ActionKind::TestGeneration { tests } => {
                let zero_zero = tests.iter().find(|t| t.input == "0 0\n").unwrap();
                assert_eq!(zero_zero.expected.as_deref(), Some("0\n"));
            }
            _ => panic!("expected TestGeneration"),
        }
    }

    #[tokio::test]
    async fn fallback_leaves_expected_none_when_not_a_sum_problem() {
        let mut board = bb_with_statement("Sort the array.");
        let agent = TestGenAgent::new(1);
        let actions = agent.propose("code", &mut board, &StubLlmClient::empty()).await;
        match &actions[0].kind {
            crate::actions::ActionKind::TestGeneration { tests } => {
                assert!(tests.iter().all(|t| t.expected.is_none()));
            }
            _ => panic!("expected TestGeneration"),
        }
    }

    #[tokio::test]
    async fn fallback_minimizes_latest_counterexample() {
        let mut board = bb_with_statement("Sort the array.");
        board.tests.add_counterexample(TestCase::new("1 2 3 4", None, TestOrigin::Counterexample));
        let agent = TestGenAgent::new(1);
        let actions = agent.propose("code", &mut board, &StubLlmClient::empty()).await;
        match &actions[0].kind {
            crate::actions::ActionKind::TestGeneration { tests } => {
                let minimized = tests.iter().find(|t| t.origin == TestOrigin::Minimized);
                assert_eq!(minimized.unwrap().input, "1 2");
            }
            _ => panic!("expected TestGeneration"),
        }
    }
}
