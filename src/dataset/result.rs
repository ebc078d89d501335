//! Result record shape (spec §6), serialized one-per-line to `Results.jsonl`
//! by [`super::runner::run_dataset`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDetail {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub taken_time: f64,
    pub api_calls: u64,
    pub llm_time_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub name: String,
    pub problem_id: usize,
    pub is_solved: bool,
    pub run_details: Vec<RunDetail>,
    pub best_code: String,
}
