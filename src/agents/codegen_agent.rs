//! Generates candidate code for the currently favored (or active)
//! strategy.

use super::{blackboard_summary, extract_fenced_code, prompts, Agent, AgentBase};
use crate::actions::Action;
use crate::blackboard::Blackboard;
use crate::llm::LlmClient;
use async_trait::async_trait;

pub struct CodeGenAgent {
    base: AgentBase,
}

impl Default for CodeGenAgent {
    fn default() -> Self {
        Self {
            base: AgentBase::new("codegen_agent"),
        }
    }
}

impl CodeGenAgent {
    pub fn base_reset(&self) {
        self.base.reset_iteration();
    }
}

#[async_trait(?Send)]
impl Agent for CodeGenAgent {
    fn name(&self) -> &'static str {
        "codegen_agent"
    }

    async fn propose(&self, code: &str, blackboard: &mut Blackboard, llm: &dyn LlmClient) -> Vec<Action> {
        let (strategy_id, confidence) = pick_strategy(blackboard);

        let summary = blackboard_summary(blackboard);
        let prompt = prompts::codegen_prompt(blackboard, &strategy_id);
        let response = self.base.call_llm(llm, code, &summary, &prompt).await;
        let code_override = response.map(|r| extract_fenced_code(&r));

        let mut action = Action::generate_code(Some(strategy_id), None, code_override);
        action.meta.confidence = Some(confidence);
        vec![action]
    }
}

/// `argmax(prior)` with confidence equal to that probability; falls back to
/// the active hypothesis at confidence `0.4` when there is no prior.
fn pick_strategy(blackboard: &Blackboard) -> (String, f64) {
    let prior = blackboard.strategy.compute_prior(1.0, 1.0, 1.0, 1.0);
    if prior.is_empty() {
        let active = blackboard.strategy.get_active_hypothesis().unwrap_or("default").to_string();
        return (active, 0.4);
    }

    let mut best_id = String::new();
    let mut best_p = f64::NEG_INFINITY;
    let mut ids: Vec<&String> = prior.keys().collect();
    ids.sort();
    for id in ids {
        let p = prior[id];
        if p > best_p {
            best_p = p;
            best_id = id.clone();
        }
    }
    (best_id, best_p)
}
