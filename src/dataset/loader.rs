//! `LoadProblems(path, limit?) -> [Blackboard]` (spec §6): reads a JSONL
//! dataset of APPS-like problem records into seeded [`Blackboard`]s.

use crate::blackboard::{Blackboard, ProblemModel};
use crate::schema::{TestCase, TestOrigin};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed JSON on line {line} of {path}: {source}")]
    Parse {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Loads a problem dataset into seeded [`Blackboard`]s. Each returned
/// blackboard has `ProblemModel` populated, `TestsBoard` seeded with
/// `APPS_EXAMPLE`/`APPS_TEST` items, `StrategyBoard` containing `"default"`
/// (the `Blackboard::new` default), and an empty `PatchBoard`.
#[async_trait]
pub trait ProblemLoader: Send + Sync {
    async fn load(&self, path: &str, limit: Option<usize>) -> Result<Vec<Blackboard>, DatasetError>;
}

/// Production loader: one APPS-like JSON record per line. Recognized
/// fields beyond [`ProblemModel::from_apps_like`]'s: `examples` (array of
/// `{input, output}`, tagged `APPS_EXAMPLE`) and either `tests` (same
/// shape, tagged `APPS_TEST`) or `input_output` (`{"inputs": [...],
/// "outputs": [...]}` parallel arrays, also tagged `APPS_TEST`).
pub struct JsonlProblemLoader {
    seed: u64,
}

impl Default for JsonlProblemLoader {
    fn default() -> Self {
        Self { seed: 0 }
    }
}

impl JsonlProblemLoader {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

#[async_trait]
impl ProblemLoader for JsonlProblemLoader {
    async fn load(&self, path: &str, limit: Option<usize>) -> Result<Vec<Blackboard>, DatasetError> {
        let path_str = path.to_string();
        let contents = tokio::fs::read_to_string(Path::new(path)).await.map_err(|source| DatasetError::Io {
            path: path_str.clone(),
            source,
        })?;

        let mut blackboards = Vec::new();
        for (idx, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(n) = limit {
                if blackboards.len() >= n {
                    break;
                }
            }

            let record: serde_json::Value = serde_json::from_str(line).map_err(|source| DatasetError::Parse {
                path: path_str.clone(),
                line: idx + 1,
                source,
            })?;

            let mut model = ProblemModel::from_apps_like(&record);
            model.seed_tests.extend(extract_tests(&record, "examples", TestOrigin::AppsExample));
            model.seed_tests.extend(extract_tests(&record, "tests", TestOrigin::AppsTest));
            model.seed_tests.extend(extract_input_output(&record));

            let mut board = Blackboard::with_seed(model, self.seed);
            for test in board.problem.seed_tests.clone() {
                board.tests.add_seed_test(test);
            }
            blackboards.push(board);
        }

        tracing::info!(path = %path_str, count = blackboards.len(), "loaded dataset");
        Ok(blackboards)
    }
}

fn extract_tests(record: &serde_json::Value, key: &str, origin: TestOrigin) -> Vec<TestCase> {
    record
        .get(key)
        .and_then(|v| v.as_array())
        .map(|array| {
            array
                .iter()
                .filter_map(|item| {
                    let input = item.get("input").and_then(|v| v.as_str())?.to_string();
                    let expected = item.get("output").and_then(|v| v.as_str()).map(String::from);
                    Some(TestCase::new(input, expected, origin))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// APPS-style `input_output` field: `{"inputs": [...], "outputs": [...]}`
/// parallel arrays, zipped into `APPS_TEST` cases.
fn extract_input_output(record: &serde_json::Value) -> Vec<TestCase> {
    let Some(io) = record.get("input_output") else {
        return Vec::new();
    };
    let io = match io {
        serde_json::Value::String(s) => serde_json::from_str::<serde_json::Value>(s).ok(),
        other => Some(other.clone()),
    };
    let Some(io) = io else {
        return Vec::new();
    };

    let inputs = io.get("inputs").and_then(|v| v.as_array()).cloned().unwrap_or_default();
    let outputs = io.get("outputs").and_then(|v| v.as_array()).cloned().unwrap_or_default();

    inputs
        .iter()
        .zip(outputs.iter())
        .filter_map(|(input, output)| {
            let input = value_to_stdin(input)?;
            let output = value_to_stdin(output);
            Some(TestCase::new(input, output, TestOrigin::AppsTest))
        })
        .collect()
}

fn value_to_stdin(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn loads_examples_and_tests_with_tagged_origin() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"name": "two-sum", "question": "Find two numbers.", "examples": [{{"input": "1 2", "output": "3"}}], "tests": [{{"input": "3 4", "output": "7"}}]}}"#
        )
        .unwrap();

        let loader = JsonlProblemLoader::default();
        let boards = loader.load(file.path().to_str().unwrap(), None).await.unwrap();
        assert_eq!(boards.len(), 1);

        let view = boards[0].problem.view();
        assert_eq!(view.examples.len(), 1);
        assert_eq!(view.examples[0].input, "1 2");
        assert_eq!(view.tests.len(), 1);
        assert_eq!(view.tests[0].input, "3 4");
        assert!(boards[0].strategy.has_hypothesis("default"));
        assert!(boards[0].patches.patches().is_empty());
        assert_eq!(boards[0].tests.seed_tests().len(), 2);
    }

    #[tokio::test]
    async fn respects_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"name": "a", "question": "q"}}"#).unwrap();
        writeln!(file, r#"{{"name": "b", "question": "q"}}"#).unwrap();
        writeln!(file, r#"{{"name": "c", "question": "q"}}"#).unwrap();

        let loader = JsonlProblemLoader::default();
        let boards = loader.load(file.path().to_str().unwrap(), Some(2)).await.unwrap();
        assert_eq!(boards.len(), 2);
    }

    #[tokio::test]
    async fn parses_apps_style_input_output_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"name": "sum", "question": "Sum.", "input_output": "{{\"inputs\": [\"2 3\"], \"outputs\": [\"5\"]}}"}}"#
        )
        .unwrap();

        let loader = JsonlProblemLoader::default();
        let boards = loader.load(file.path().to_str().unwrap(), None).await.unwrap();
        let view = boards[0].problem.view();
        assert_eq!(view.tests.len(), 1);
        assert_eq!(view.tests[0].input, "2 3");
        assert_eq!(view.tests[0].expected.as_deref(), Some("5"));
    }

    #[tokio::test]
    async fn malformed_line_surfaces_typed_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not json").unwrap();

        let loader = JsonlProblemLoader::default();
        let err = loader.load(file.path().to_str().unwrap(), None).await.unwrap_err();
        assert!(matches!(err, DatasetError::Parse { line: 1, .. }));
    }
}
