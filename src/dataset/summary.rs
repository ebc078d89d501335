//! Fixed-width aggregate summary writer, mirroring the original
//! `evaluation/summary.py` column layout.

use super::result::ResultRecord;
use anyhow::{Context, Result};
use std::path::Path;

const NAME_WIDTH: usize = 30;
const VALUE_WIDTH: usize = 10;

/// Write accuracy, solved/unsolved counts, and token/time/api-call
/// aggregates (total + average, plus max/min api-calls-per-problem) to
/// `path`.
pub async fn write_summary(results: &[ResultRecord], path: &Path) -> Result<()> {
    let total = results.len();
    let solved = results.iter().filter(|r| r.is_solved).count();
    let unsolved = total - solved;
    let accuracy = if total == 0 { 0.0 } else { solved as f64 / total as f64 };

    let mut total_prompt_tokens = 0u64;
    let mut total_completion_tokens = 0u64;
    let mut total_taken_time = 0.0f64;
    let mut total_api_calls = 0u64;
    let mut api_calls_per_item: Vec<u64> = Vec::new();

    for record in results {
        let prompt_tokens: u64 = record.run_details.iter().map(|d| d.prompt_tokens).sum();
        let completion_tokens: u64 = record.run_details.iter().map(|d| d.completion_tokens).sum();
        let taken_time: f64 = record.run_details.iter().map(|d| d.taken_time).sum();
        let api_calls: u64 = record.run_details.iter().map(|d| d.api_calls).sum();

        total_prompt_tokens += prompt_tokens;
        total_completion_tokens += completion_tokens;
        total_taken_time += taken_time;
        total_api_calls += api_calls;
        api_calls_per_item.push(api_calls);
    }

    let max_api_calls = api_calls_per_item.iter().copied().max().unwrap_or(0);
    let min_api_calls = api_calls_per_item.iter().copied().min().unwrap_or(0);

    let average_prompt_tokens = if total == 0 { 0.0 } else { total_prompt_tokens as f64 / total as f64 };
    let average_completion_tokens = if total == 0 { 0.0 } else { total_completion_tokens as f64 / total as f64 };
    let average_taken_time = if total == 0 { 0.0 } else { total_taken_time / total as f64 };
    let average_api_calls = if total == 0 { 0.0 } else { total_api_calls as f64 / total as f64 };

    let mut out = String::new();
    out.push_str(&format!("{:<NAME_WIDTH$} {:>VALUE_WIDTH$.1}\n", "Accuracy:", accuracy * 100.0));
    out.push_str(&format!("{:<NAME_WIDTH$} {:>VALUE_WIDTH$}\n", "Solved:", solved));
    out.push_str(&format!("{:<NAME_WIDTH$} {:>VALUE_WIDTH$}\n", "Unsolved:", unsolved));
    out.push_str("\n\n");
    out.push_str(&format!(
        "{:<NAME_WIDTH$} {:>VALUE_WIDTH$}\n",
        "Total Prompt Tokens:", total_prompt_tokens
    ));
    out.push_str(&format!(
        "{:<NAME_WIDTH$} {:>VALUE_WIDTH$.0}\n",
        "Average Prompt Tokens:", average_prompt_tokens
    ));
    out.push('\n');
    out.push_str(&format!(
        "{:<NAME_WIDTH$} {:>VALUE_WIDTH$}\n",
        "Total Completion Tokens:", total_completion_tokens
    ));
    out.push_str(&format!(
        "{:<NAME_WIDTH$} {:>VALUE_WIDTH$.0}\n",
        "Average Completion Tokens:", average_completion_tokens
    ));
    out.push('\n');
    out.push_str(&format!("{:<NAME_WIDTH$} {:>VALUE_WIDTH$.2}s\n", "Total Taken Time:", total_taken_time));
    out.push_str(&format!(
        "{:<NAME_WIDTH$} {:>VALUE_WIDTH$.2}s\n",
        "Average Taken Time:", average_taken_time
    ));
    out.push('\n');
    out.push_str(&format!("{:<NAME_WIDTH$} {:>VALUE_WIDTH$.2}\n", "Total Api Calls:", total_api_calls as f64));
    out.push_str(&format!("{:<NAME_WIDTH$} {:>VALUE_WIDTH$}\n", "Max Api Calls:", max_api_calls));
    out.push_str(&format!("{:<NAME_WIDTH$} {:>VALUE_WIDTH$}\n", "Min Api Calls:", min_api_calls));
    out.push_str(&format!("{:<NAME_WIDTH$} {:>VALUE_WIDTH$.2}\n", "Average Api Calls:", average_api_calls));

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(path, out).await.with_context(|| format!("writing summary to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::result::RunDetail;

    fn record(solved: bool, api_calls: u64) -> ResultRecord {
        ResultRecord {
            name: "p".to_string(),
            problem_id: 1,
            is_solved: solved,
            run_details: vec![RunDetail {
                prompt_tokens: 10,
                completion_tokens: 5,
                taken_time: 1.0,
                api_calls,
                llm_time_s: 0.5,
            }],
            best_code: String::new(),
        }
    }

    #[tokio::test]
    async fn writes_accuracy_and_api_call_bounds() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Summary.txt");
        let results = vec![record(true, 2), record(false, 5)];

        write_summary(&results, &path).await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("Accuracy:"));
        assert!(contents.contains("50.0"));
        assert!(contents.contains("Max Api Calls:"));
        assert!(contents.contains("5"));
        assert!(contents.contains("Min Api Calls:"));
    }

    #[tokio::test]
    async fn empty_results_do_not_divide_by_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Summary.txt");
        write_summary(&[], &path).await.unwrap();
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(contents.contains("0.0"));
    }
}
