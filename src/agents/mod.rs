//! Specialist agents. Each implements `propose(code, blackboard) -> [Action]`,
//! bounded to at most one LLM call per MCTS iteration, with a deterministic
//! per-agent cache keyed on agent name + code + a blackboard summary.

pub mod codegen_agent;
pub mod prompts;
pub mod repair_agent;
pub mod scoring_agent;
pub mod strategy_agent;
pub mod testgen_agent;

pub use codegen_agent::CodeGenAgent;
pub use repair_agent::RepairAgent;
pub use scoring_agent::ScoringAgent;
pub use strategy_agent::StrategyAgent;
pub use testgen_agent::TestGenAgent;

use crate::actions::Action;
use crate::blackboard::Blackboard;
use crate::llm::LlmClient;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// A specialist agent proposing actions from the current code and
/// blackboard.
#[async_trait(?Send)]
pub trait Agent {
    fn name(&self) -> &'static str;

    async fn propose(&self, code: &str, blackboard: &mut Blackboard, llm: &dyn LlmClient) -> Vec<Action>;
}

/// Shared per-agent bookkeeping: the one-LLM-call-per-iteration budget and
/// the response cache. Agents embed this rather than duplicating the
/// bookkeeping.
pub struct AgentBase {
    name: &'static str,
    cache: RefCell<HashMap<String, String>>,
    calls_this_iteration: Cell<u32>,
}

impl AgentBase {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            cache: RefCell::new(HashMap::new()),
            calls_this_iteration: Cell::new(0),
        }
    }

    /// Reset the per-iteration call budget. Invoked by the coordinator for
    /// every agent before each enumeration.
    pub fn reset_iteration(&self) {
        self.calls_this_iteration.set(0);
    }

    fn cache_key(&self, code: &str, blackboard_summary: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update(code.as_bytes());
        hasher.update(blackboard_summary.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Attempt an LLM call bounded to one per iteration. Returns `None`
    /// when the budget is exhausted this iteration, the response is
    /// empty/malformed, or the transport errors — callers degrade to
    /// their deterministic fallback in every such case.
    pub async fn call_llm(
        &self,
        llm: &dyn LlmClient,
        code: &str,
        blackboard_summary: &str,
        prompt: &str,
    ) -> Option<String> {
        let key = self.cache_key(code, blackboard_summary);
        if let Some(cached) = self.cache.borrow().get(&key) {
            return Some(cached.clone());
        }
        if self.calls_this_iteration.get() >= 1 {
            return None;
        }
        self.calls_this_iteration.set(self.calls_this_iteration.get() + 1);

        match llm.complete(prompt).await {
            Ok(response) if !response.trim().is_empty() => {
                self.cache.borrow_mut().insert(key, response.clone());
                Some(response)
            }
            _ => None,
        }
    }
}

/// Deterministic summary of the parts of the blackboard that influence an
/// agent's prompt, used only as cache-key input (not for display).
pub fn blackboard_summary(blackboard: &Blackboard) -> String {
    format!(
        "active={:?};hyps={};patches={};failures={};tests={}",
        blackboard.strategy.get_active_hypothesis(),
        blackboard.strategy.hypotheses().len(),
        blackboard.patches.patches().len(),
        blackboard.tests.failure_metadata().len(),
        blackboard.tests.seed_tests().len()
            + blackboard.tests.generated_tests().len()
            + blackboard.tests.counterexamples().len()
            + blackboard.tests.minimized().len(),
    )
}

/// Extract code from a fenced markdown block: strips a leading
/// triple-backtick line (with optional language tag) and a trailing fence.
/// Returns the trimmed input unchanged if no fence is found.
pub fn extract_fenced_code(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let mut lines: Vec<&str> = trimmed.lines().collect();
    if lines.is_empty() {
        return String::new();
    }
    lines.remove(0);
    if let Some(last) = lines.last() {
        if last.trim() == "```" {
            lines.pop();
        }
    }
    lines.join("\n")
}
