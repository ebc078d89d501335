//! The static problem description and its derived views.

use crate::schema::{Problem, TestCase, TestOrigin};
use serde::{Deserialize, Serialize};

/// Static description of the competitive-programming problem being solved.
///
/// Immutable once constructed — agents read it, nothing in the pipeline
/// mutates it after the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemModel {
    pub name: String,
    pub objective: String,
    pub raw_statement: String,
    pub io_spec: String,
    pub starter_code: String,
    pub constraints: Vec<String>,
    pub invariants: Vec<String>,
    pub edge_case_checklist: Vec<String>,
    pub tags: Vec<String>,
    pub seed_tests: Vec<TestCase>,
}

impl ProblemModel {
    pub fn new(name: impl Into<String>, raw_statement: impl Into<String>, starter_code: impl Into<String>) -> Self {
        let raw_statement = raw_statement.into();
        Self {
            name: name.into(),
            objective: "solve".to_string(),
            raw_statement,
            io_spec: String::new(),
            starter_code: starter_code.into(),
            constraints: Vec::new(),
            invariants: Vec::new(),
            edge_case_checklist: Vec::new(),
            tags: Vec::new(),
            seed_tests: Vec::new(),
        }
    }

    /// Build a `ProblemModel` from a loosely-typed APPS-like JSON record:
    /// `name`, `question`, `starter_code`, `constraints`, `tags`. Missing
    /// fields default to empty.
    pub fn from_apps_like(record: &serde_json::Value) -> Self {
        let name = record
            .get("name")
            .or_else(|| record.get("id"))
            .and_then(|v| v.as_str())
            .unwrap_or("unnamed")
            .to_string();
        let question = record
            .get("question")
            .or_else(|| record.get("problem"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let starter_code = record
            .get("starter_code")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let constraints = record
            .get("constraints")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().filter_map(|v| v.as_str()).map(String::from).collect())
            .unwrap_or_default();
        let tags = record
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().filter_map(|v| v.as_str()).map(String::from).collect())
            .unwrap_or_default();

        Self {
            name,
            objective: "solve".to_string(),
            raw_statement: question,
            io_spec: String::new(),
            starter_code,
            constraints,
            invariants: Vec::new(),
            edge_case_checklist: Vec::new(),
            tags,
            seed_tests: Vec::new(),
        }
    }

    /// One-line summary used by the strategy agent's prompt construction:
    /// `"{objective}: {first line of raw_statement}"`.
    pub fn summarize(&self) -> String {
        let first_line = self.raw_statement.lines().next().unwrap_or("").trim();
        format!("{}: {}", self.objective, first_line)
    }

    /// Derived read-only view consumed by evaluation and prompting:
    /// `examples` are seed tests tagged `APPS_EXAMPLE`; `tests` are seed
    /// tests tagged `APPS_TEST`, falling back to all seed tests if none
    /// carry that tag.
    pub fn view(&self) -> Problem {
        let examples: Vec<TestCase> = self
            .seed_tests
            .iter()
            .filter(|t| t.origin == TestOrigin::AppsExample)
            .cloned()
            .collect();
        let tagged_tests: Vec<TestCase> = self
            .seed_tests
            .iter()
            .filter(|t| t.origin == TestOrigin::AppsTest)
            .cloned()
            .collect();
        let tests = if tagged_tests.is_empty() {
            self.seed_tests.clone()
        } else {
            tagged_tests
        };

        Problem {
            name: self.name.clone(),
            question: self.raw_statement.clone(),
            starter_code: self.starter_code.clone(),
            examples,
            tests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_falls_back_to_all_seed_tests_without_apps_test_tag() {
        let mut model = ProblemModel::new("p", "stmt", "");
        model.seed_tests.push(TestCase::new("1", Some("1".into()), TestOrigin::AppsExample));
        model.seed_tests.push(TestCase::new("2", Some("2".into()), TestOrigin::GeneratedRandom));

        let view = model.view();
        assert_eq!(view.examples.len(), 1);
        assert_eq!(view.tests.len(), 2);
    }

    #[test]
    fn view_prefers_apps_test_tag_when_present() {
        let mut model = ProblemModel::new("p", "stmt", "");
        model.seed_tests.push(TestCase::new("1", Some("1".into()), TestOrigin::AppsExample));
        model.seed_tests.push(TestCase::new("2", Some("2".into()), TestOrigin::AppsTest));

        let view = model.view();
        assert_eq!(view.tests.len(), 1);
        assert_eq!(view.tests[0].input, "2");
    }

    #[test]
    fn summarize_uses_first_line_only() {
        let model = ProblemModel::new("p", "Find the shortest path.\nConstraints: n <= 1e5", "");
        assert_eq!(model.summarize(), "solve: Find the shortest path.");
    }

    #[test]
    fn from_apps_like_defaults_missing_fields() {
        let record = serde_json::json!({"name": "two-sum", "question": "q"});
        let model = ProblemModel::from_apps_like(&record);
        assert_eq!(model.name, "two-sum");
        assert_eq!(model.raw_statement, "q");
        assert!(model.constraints.is_empty());
    }
}
