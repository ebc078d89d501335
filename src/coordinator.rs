//! Enumerates candidate actions for one MCTS expansion by consulting every
//! specialist agent in a fixed order, then re-attaches priors post hoc.

use crate::actions::Action;
use crate::agents::{Agent, CodeGenAgent, RepairAgent, ScoringAgent, StrategyAgent, TestGenAgent};
use crate::blackboard::Blackboard;
use crate::llm::LlmClient;
use crate::schema::Diagnostic;

/// Bundles one instance of each specialist agent for a synthesis run.
///
/// `ScoringAgent` is reactive-only (see [`crate::agents::ScoringAgent`]) and
/// has no `propose` — it is reset alongside the others but never
/// contributes actions to an enumeration.
pub struct Coordinator {
    pub scoring: ScoringAgent,
    pub testgen: TestGenAgent,
    pub codegen: CodeGenAgent,
    pub repair: RepairAgent,
    pub strategy: StrategyAgent,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self {
            scoring: ScoringAgent::default(),
            testgen: TestGenAgent::default(),
            codegen: CodeGenAgent::default(),
            repair: RepairAgent::default(),
            strategy: StrategyAgent::default(),
        }
    }
}

impl Coordinator {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            testgen: TestGenAgent::new(seed),
            ..Self::default()
        }
    }

    /// Reset every agent's per-iteration call budget, then call `propose`
    /// on TestGen, CodeGen, Repair, Strategy in that fixed order and
    /// concatenate. Priors are then re-attached post hoc: actions carrying
    /// `metadata.strategy = sid` get `confidence ← strategy_prior[sid]`;
    /// `ApplyPatch` actions get `confidence ← patch.success_prob` when the
    /// patch is known.
    pub async fn enumerate_actions(&self, code: &str, blackboard: &mut Blackboard, llm: &dyn LlmClient) -> Vec<Action> {
        self.scoring.base_reset();
        self.testgen.base_reset();
        self.codegen.base_reset();
        self.repair.base_reset();
        self.strategy.base_reset();

        let mut actions = Vec::new();
        actions.extend(self.testgen.propose(code, blackboard, llm).await);
        actions.extend(self.codegen.propose(code, blackboard, llm).await);
        actions.extend(self.repair.propose(code, blackboard, llm).await);
        actions.extend(self.strategy.propose(code, blackboard, llm).await);

        let prior = blackboard.strategy.compute_prior(1.0, 1.0, 1.0, 1.0);
        for action in &mut actions {
            if let Some(sid) = action.meta.strategy_id() {
                if let Some(p) = prior.get(sid) {
                    action.meta.confidence = Some(*p);
                }
            }
            if let crate::actions::ActionKind::ApplyPatch { patch_id, .. } = &action.kind {
                if let Some(patch) = blackboard.patches.get(patch_id) {
                    action.meta.confidence = Some(patch.success_prob);
                }
            }
        }

        actions
    }

    /// Delegates to the `ScoringAgent`.
    pub async fn handle_diagnostic(&self, diag: &Diagnostic, code: &str, blackboard: &mut Blackboard, llm: &dyn LlmClient) {
        self.scoring.handle_diagnostic(diag, code, blackboard, llm).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::ProblemModel;
    use crate::llm::StubLlmClient;

    #[tokio::test]
    async fn enumerate_actions_concatenates_four_proposing_agents() {
        let mut board = Blackboard::new(ProblemModel::new("p", "stmt", "starter()"));
        let coordinator = Coordinator::default();
        let actions = coordinator.enumerate_actions("code", &mut board, &StubLlmClient::empty()).await;

        let names: Vec<&str> = actions.iter().map(|a| a.name.as_str()).collect();
        assert!(names.contains(&"test_generation"));
        assert!(names.contains(&"generate_code"));
        assert!(names.contains(&"strategy_proposal"));
    }

    #[tokio::test]
    async fn apply_patch_confidence_overwritten_from_patch_success_prob() {
        let mut board = Blackboard::new(ProblemModel::new("p", "stmt", ""));
        board.patches.propose_patch(crate::schema::Patch {
            id: "A".to_string(),
            level: crate::schema::PatchLevel::L1Local,
            description: String::new(),
            preconditions: Vec::new(),
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            success_prob: 0.77,
            cost: 0.1,
            risk: 0.1,
            tags: Vec::new(),
        });

        let coordinator = Coordinator::default();
        let actions = coordinator.enumerate_actions("code", &mut board, &StubLlmClient::empty()).await;
        let patch_action = actions
            .iter()
            .find(|a| matches!(&a.kind, crate::actions::ActionKind::ApplyPatch { .. }))
            .unwrap();
        assert_eq!(patch_action.meta.confidence, Some(0.77));
    }
}
