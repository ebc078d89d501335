//! Per-problem driver (spec §6, §2 "Dataset runner + summary"): loads a
//! dataset, runs one MCTS search per problem, and writes `Results.jsonl` +
//! `Summary.txt`.

use super::loader::ProblemLoader;
use super::result::{ResultRecord, RunDetail};
use super::summary::write_summary;
use crate::coordinator::Coordinator;
use crate::evaluation::runner::ProgramRunner;
use crate::evaluation::EvaluationConfig;
use crate::llm::{LlmClient, UsageStats};
use crate::mcts::{McTsConfig, Mcts, Node};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// CLI-facing configuration for a dataset run, one-to-one with the
/// original `DatasetRunConfig`.
#[derive(Debug, Clone)]
pub struct DatasetRunConfig {
    pub dataset_path: String,
    pub output_dir: String,
    pub run_name: Option<String>,
    pub limit: Option<usize>,
    pub iterations: u32,
    pub expansion_budget: usize,
    pub c: f64,
    pub tau: f64,
    pub seed: u64,
}

impl Default for DatasetRunConfig {
    fn default() -> Self {
        Self {
            dataset_path: "apps/apps_selected150.jsonl".to_string(),
            output_dir: "results".to_string(),
            run_name: None,
            limit: Some(10),
            iterations: 10,
            expansion_budget: 2,
            c: 1.4,
            tau: 1.0,
            seed: 0,
        }
    }
}

/// Run every problem in the dataset to completion (or iteration exhaustion),
/// writing per-problem results and an aggregate summary. Returns the
/// summary file path. A single problem's fatal error (e.g. missing LLM
/// credentials surfacing from `llm`) is reported and ends only that
/// problem's run — see §7 — by propagating here and letting the caller
/// decide whether to keep going; this driver itself does not catch and
/// skip, matching the original's eager `run_dataset`.
pub async fn run_dataset(
    config: &DatasetRunConfig,
    loader: &dyn ProblemLoader,
    llm: &dyn LlmClient,
    runner: &dyn ProgramRunner,
    usage: &Arc<UsageStats>,
) -> Result<PathBuf> {
    let run_name = config.run_name.clone().unwrap_or_else(timestamp_run_name);
    let run_dir = PathBuf::from(&config.output_dir).join(&run_name);
    tokio::fs::create_dir_all(&run_dir)
        .await
        .with_context(|| format!("creating run directory {}", run_dir.display()))?;

    let problems = loader
        .load(&config.dataset_path, config.limit)
        .await
        .with_context(|| format!("loading dataset {}", config.dataset_path))?;
    let total = problems.len();
    let mut results = Vec::with_capacity(total);
    let eval_config = EvaluationConfig::default();

    for (idx, blackboard) in problems.into_iter().enumerate() {
        let problem_name = blackboard.problem.name.clone();
        tracing::info!(index = idx + 1, total, name = %problem_name, "starting problem");
        usage.reset();
        let start = std::time::Instant::now();

        let root = Node::root("", blackboard);
        let coordinator = Coordinator::with_seed(config.seed);
        let mut mcts = Mcts::new(
            McTsConfig {
                iterations: config.iterations,
                expansion_budget: config.expansion_budget,
                c: config.c,
                tau: config.tau,
                seed: config.seed,
                ..Default::default()
            },
            coordinator,
        );
        let mcts_result = mcts.run(root, llm, runner, &eval_config).await;

        let elapsed = start.elapsed().as_secs_f64();
        let snapshot = usage.snapshot();

        tracing::info!(
            index = idx + 1,
            total,
            solved = mcts_result.solved,
            api_calls = snapshot.api_calls,
            elapsed,
            "finished problem"
        );

        results.push(ResultRecord {
            name: problem_name,
            problem_id: idx + 1,
            is_solved: mcts_result.solved,
            run_details: vec![RunDetail {
                prompt_tokens: snapshot.prompt_tokens,
                completion_tokens: snapshot.completion_tokens,
                taken_time: elapsed,
                api_calls: snapshot.api_calls,
                llm_time_s: snapshot.total_time_s,
            }],
            best_code: mcts_result.best_code,
        });
    }

    let results_path = run_dir.join("Results.jsonl");
    write_results_jsonl(&results_path, &results).await?;

    let summary_path = run_dir.join("Summary.txt");
    write_summary(&results, &summary_path).await?;

    Ok(summary_path)
}

async fn write_results_jsonl(path: &std::path::Path, results: &[ResultRecord]) -> Result<()> {
    let mut buf = String::new();
    for record in results {
        buf.push_str(&serde_json::to_string(record).context("serializing result record")?);
        buf.push('\n');
    }
    tokio::fs::write(path, buf).await.with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn timestamp_run_name() -> String {
    chrono::Local::now().format("%Y%m%d_%H%M%S").to_string()
}
