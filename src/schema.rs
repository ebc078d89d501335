//! Core value types shared across the blackboard, actions, and evaluation
//! pipeline.
//!
//! These are plain aggregate records with value equality — no runtime
//! reflection, no dataclass-style defaults-via-metaclass. Enum parsing from
//! loosely-typed LLM JSON degrades to documented defaults rather than
//! failing (see [`PatchLevel::parse_lenient`] and
//! [`TestOrigin::parse_lenient`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a [`TestCase`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestOrigin {
    AppsExample,
    AppsTest,
    Counterexample,
    Minimized,
    GeneratedExtreme,
    GeneratedRandom,
    GeneratedEnum,
    MinimizationHint,
}

impl TestOrigin {
    /// Parse a free-form string (as produced by an LLM) into a `TestOrigin`,
    /// preserving the two legacy aliases and falling back to
    /// `GeneratedRandom` for anything unrecognized.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "APPS_EXAMPLE" => Self::AppsExample,
            "APPS_TEST" => Self::AppsTest,
            "COUNTEREXAMPLE" => Self::Counterexample,
            "MINIMIZED" => Self::Minimized,
            "GENERATED_EXTREME" => Self::GeneratedExtreme,
            "GENERATED_RANDOM" => Self::GeneratedRandom,
            "GENERATED_ENUM" => Self::GeneratedRandom,
            "MINIMIZATION_HINT" => Self::Minimized,
            _ => Self::GeneratedRandom,
        }
    }
}

/// Outcome classification for a single test execution or diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticStatus {
    Pass,
    Wa,
    Re,
    Tle,
    Unknown,
}

impl DiagnosticStatus {
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "PASS" => Self::Pass,
            "WA" => Self::Wa,
            "RE" => Self::Re,
            "TLE" => Self::Tle,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Wa => "WA",
            Self::Re => "RE",
            Self::Tle => "TLE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Which evaluation stage produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Quickscreen,
    Deepeval,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quickscreen => "quickscreen",
            Self::Deepeval => "deepeval",
        }
    }
}

/// Risk/structural tier of a [`Patch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatchLevel {
    L1Local,
    L2Structural,
    L3System,
}

impl PatchLevel {
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "L1_LOCAL" => Self::L1Local,
            "L2_STRUCTURAL" => Self::L2Structural,
            "L3_SYSTEM" => Self::L3System,
            _ => Self::L1Local,
        }
    }
}

impl Default for PatchLevel {
    fn default() -> Self {
        Self::L1Local
    }
}

/// A single test input/expected-output pair, tagged with provenance.
///
/// `input` is treated as raw bytes modulo trailing whitespace; equality on
/// `input` defines identity within a [`crate::blackboard::TestsBoard`]
/// bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub expected: Option<String>,
    pub origin: TestOrigin,
    pub weight: f64,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected: Option<String>, origin: TestOrigin) -> Self {
        Self {
            input: input.into(),
            expected,
            origin,
            weight: 1.0,
        }
    }

    /// Expected stdout, or an empty string when none was recorded.
    pub fn expected_output(&self) -> &str {
        self.expected.as_deref().unwrap_or("")
    }
}

/// A single test's result folded into a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub testcase: TestCase,
    pub actual_output: Option<String>,
    pub expected_output: Option<String>,
}

/// A structured failure (or pass) record emitted by the evaluation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub status: DiagnosticStatus,
    pub test: Option<TestCase>,
    pub message: String,
    pub actual_output: Option<String>,
    pub expected_output: Option<String>,
    pub runtime: Option<f64>,
    pub notes: HashMap<String, String>,
    pub failing_tests: Vec<TestCaseResult>,
}

impl Diagnostic {
    pub fn new(stage: Stage, status: DiagnosticStatus, test: Option<TestCase>, message: impl Into<String>) -> Self {
        Self {
            stage,
            status,
            test,
            message: message.into(),
            actual_output: None,
            expected_output: None,
            runtime: None,
            notes: HashMap::new(),
            failing_tests: Vec::new(),
        }
    }
}

/// Append-only failure log entry derived from a [`Diagnostic`].
///
/// `timestamp` is the pre-append sequence length of the owning log (a
/// monotonic integer, not wall-clock time — see spec Open Questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    pub status: DiagnosticStatus,
    pub test: Option<TestCase>,
    pub stage: Stage,
    pub message: String,
    pub timestamp: u64,
}

/// A proposed code-repair intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patch {
    pub id: String,
    pub level: PatchLevel,
    pub description: String,
    pub preconditions: Vec<String>,
    pub dependencies: Vec<String>,
    pub conflicts: Vec<String>,
    pub success_prob: f64,
    pub cost: f64,
    pub risk: f64,
    pub tags: Vec<String>,
}

/// A named algorithmic approach, with its bid stored separately in
/// [`crate::blackboard::StrategyBoard::bids`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyHypothesis {
    pub id: String,
    pub name: String,
    pub applicability_conditions: Vec<String>,
    pub complexity_upper_bound: String,
    pub risk_flags: Vec<String>,
    pub minimal_evidence_set: Vec<String>,
    pub notes: String,
}

impl StrategyHypothesis {
    /// The always-present baseline hypothesis every [`crate::blackboard::StrategyBoard`] starts with.
    pub fn default_baseline() -> Self {
        Self {
            id: "default".to_string(),
            name: "Baseline".to_string(),
            applicability_conditions: vec!["default".to_string()],
            complexity_upper_bound: "O(n)".to_string(),
            risk_flags: Vec::new(),
            minimal_evidence_set: Vec::new(),
            notes: "Default baseline hypothesis.".to_string(),
        }
    }
}

/// A derived, read-only view of the problem for evaluation and prompting —
/// see SPEC_FULL.md §3 ("Problem view projection").
#[derive(Debug, Clone)]
pub struct Problem {
    pub name: String,
    pub question: String,
    pub starter_code: String,
    pub examples: Vec<TestCase>,
    pub tests: Vec<TestCase>,
}
