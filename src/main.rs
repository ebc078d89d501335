//! CLI entry point: wires the production collaborators (HTTP LLM client,
//! subprocess runner, JSONL dataset loader) and runs a full dataset pass.

use anyhow::Result;
use clap::Parser;
use progsynth::dataset::{run_dataset, DatasetRunConfig, JsonlProblemLoader};
use progsynth::evaluation::runner::SubprocessRunner;
use progsynth::llm::{HttpLlmClient, UsageStats};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run the program-synthesis engine over a dataset of competitive
/// programming problems, writing per-problem results and a summary.
#[derive(Debug, Parser)]
#[command(name = "progsynth", about = "MCTS-guided program synthesis over a problem dataset")]
struct Args {
    /// Path to the JSONL dataset file.
    #[arg(long, default_value = "apps/apps_selected150.jsonl")]
    dataset_path: String,

    /// Directory under which a timestamped (or named) run directory is created.
    #[arg(long, default_value = "results")]
    output_dir: String,

    /// Name of the run directory. Defaults to a timestamp.
    #[arg(long)]
    run_name: Option<String>,

    /// Maximum number of problems to load from the dataset.
    #[arg(long)]
    limit: Option<usize>,

    /// MCTS iterations per problem.
    #[arg(long, default_value_t = 10)]
    iterations: u32,

    /// Maximum number of children created per expansion.
    #[arg(long, default_value_t = 2)]
    expansion_budget: usize,

    /// UCB exploration constant.
    #[arg(long, default_value_t = 1.4)]
    c: f64,

    /// Softmax temperature for child selection and strategy sampling.
    #[arg(long, default_value_t = 1.0)]
    tau: f64,

    /// Seed for every deterministic RNG in the run.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let usage = Arc::new(UsageStats::default());
    let llm = HttpLlmClient::from_env(usage.clone())?;
    let runner = SubprocessRunner::default();
    let loader = JsonlProblemLoader::with_seed(args.seed);

    let config = DatasetRunConfig {
        dataset_path: args.dataset_path,
        output_dir: args.output_dir,
        run_name: args.run_name,
        limit: args.limit,
        iterations: args.iterations,
        expansion_budget: args.expansion_budget,
        c: args.c,
        tau: args.tau,
        seed: args.seed,
    };

    let summary_path = run_dataset(&config, &loader, &llm, &runner, &usage).await?;
    println!("Summary written to: {}", summary_path.display());

    Ok(())
}
