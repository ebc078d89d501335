//! Selects a budgeted patch subset and either applies an LLM-produced
//! repair directly or stages the selected patches for later application.

use super::{blackboard_summary, extract_fenced_code, prompts, Agent, AgentBase};
use crate::actions::Action;
use crate::blackboard::Blackboard;
use crate::llm::LlmClient;
use async_trait::async_trait;

const DEFAULT_PATCH_BUDGET: usize = 2;

pub struct RepairAgent {
    base: AgentBase,
    budget: usize,
}

impl RepairAgent {
    pub fn new(budget: usize) -> Self {
        Self {
            base: AgentBase::new("repair_agent"),
            budget,
        }
    }
}

impl Default for RepairAgent {
    fn default() -> Self {
        Self::new(DEFAULT_PATCH_BUDGET)
    }
}

#[async_trait(?Send)]
impl Agent for RepairAgent {
    fn name(&self) -> &'static str {
        "repair_agent"
    }

    async fn propose(&self, code: &str, blackboard: &mut Blackboard, llm: &dyn LlmClient) -> Vec<Action> {
        let selected = blackboard.patches.select_patch_subset(self.budget, 1.0, 1.0, 1.0);
        if selected.is_empty() {
            return Vec::new();
        }

        let failing_inputs: Vec<String> = blackboard
            .tests
            .failure_metadata()
            .iter()
            .filter_map(|r| r.test.as_ref().map(|t| t.input.clone()))
            .collect();
        let patch_descriptions: Vec<String> = selected
            .iter()
            .filter_map(|id| blackboard.patches.get(id).map(|p| format!("{id}: {}", p.description)))
            .collect();

        let summary = blackboard_summary(blackboard);
        let prompt = prompts::repair_prompt(blackboard, &failing_inputs, &patch_descriptions);
        let response = self.base.call_llm(llm, code, &summary, &prompt).await;
        let code_override = response.map(|r| extract_fenced_code(&r)).filter(|c| !c.is_empty());

        match code_override {
            Some(code) => {
                let first_id = &selected[0];
                let level = blackboard.patches.get(first_id).map(|p| p.level).unwrap_or_default();
                vec![Action::apply_patch(first_id, level, Some(code))]
            }
            None => selected
                .iter()
                .map(|id| {
                    let level = blackboard.patches.get(id).map(|p| p.level).unwrap_or_default();
                    Action::apply_patch(id, level, None)
                })
                .collect(),
        }
    }
}
