//! Tagged-variant actions mutating code and the blackboard as the
//! coordinator enumerates them and the MCTS controller expands them.

use crate::blackboard::Blackboard;
use crate::schema::{Patch, PatchLevel, StrategyHypothesis, TestCase};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Uniform metadata carried by every action, beyond its variant-specific
/// fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionMeta {
    pub confidence: Option<f64>,
    pub cost: Option<f64>,
    pub risk: Option<f64>,
    pub extra: HashMap<String, String>,
}

impl ActionMeta {
    /// `metadata.strategy`, used by the coordinator to re-attach priors
    /// post hoc.
    pub fn strategy_id(&self) -> Option<&str> {
        self.extra.get("strategy").map(String::as_str)
    }

    pub fn with_strategy(mut self, id: impl Into<String>) -> Self {
        self.extra.insert("strategy".to_string(), id.into());
        self
    }
}

/// A proposed mutation to code and/or the blackboard.
#[derive(Debug, Clone)]
pub struct Action {
    pub name: String,
    pub meta: ActionMeta,
    pub kind: ActionKind,
}

#[derive(Debug, Clone)]
pub enum ActionKind {
    GenerateCode {
        strategy_id: Option<String>,
        expected_complexity: Option<String>,
        code_override: Option<String>,
    },
    ApplyPatch {
        patch_id: String,
        level: PatchLevel,
        code_override: Option<String>,
    },
    TestGeneration {
        tests: Vec<TestCase>,
    },
    StrategyProposal {
        hypotheses: Vec<StrategyHypothesis>,
        bids: HashMap<String, (f64, f64, f64)>,
        recommended_active_id: Option<String>,
    },
    Evaluate,
}

impl Action {
    pub fn generate_code(
        strategy_id: Option<String>,
        expected_complexity: Option<String>,
        code_override: Option<String>,
    ) -> Self {
        let meta = match &strategy_id {
            Some(sid) => ActionMeta::default().with_strategy(sid.clone()),
            None => ActionMeta::default(),
        };
        Self {
            name: "generate_code".to_string(),
            meta,
            kind: ActionKind::GenerateCode {
                strategy_id,
                expected_complexity,
                code_override,
            },
        }
    }

    pub fn apply_patch(patch_id: impl Into<String>, level: PatchLevel, code_override: Option<String>) -> Self {
        Self {
            name: "apply_patch".to_string(),
            meta: ActionMeta::default(),
            kind: ActionKind::ApplyPatch {
                patch_id: patch_id.into(),
                level,
                code_override,
            },
        }
    }

    pub fn test_generation(tests: Vec<TestCase>) -> Self {
        Self {
            name: "test_generation".to_string(),
            meta: ActionMeta::default(),
            kind: ActionKind::TestGeneration { tests },
        }
    }

    pub fn strategy_proposal(
        hypotheses: Vec<StrategyHypothesis>,
        bids: HashMap<String, (f64, f64, f64)>,
        recommended_active_id: Option<String>,
    ) -> Self {
        Self {
            name: "strategy_proposal".to_string(),
            meta: ActionMeta::default(),
            kind: ActionKind::StrategyProposal {
                hypotheses,
                bids,
                recommended_active_id,
            },
        }
    }

    pub fn evaluate() -> Self {
        Self {
            name: "evaluate".to_string(),
            meta: ActionMeta::default(),
            kind: ActionKind::Evaluate,
        }
    }

    /// Apply this action's effects to `blackboard`, returning the new code.
    pub fn apply(&self, code: &str, blackboard: &mut Blackboard) -> String {
        match &self.kind {
            ActionKind::GenerateCode {
                strategy_id,
                code_override,
                ..
            } => {
                if let Some(sid) = strategy_id {
                    blackboard.strategy.set_active_hypothesis(sid);
                }
                if let Some(override_code) = code_override {
                    override_code.clone()
                } else if !blackboard.problem.starter_code.is_empty() {
                    blackboard.problem.starter_code.clone()
                } else {
                    String::new()
                }
            }
            ActionKind::ApplyPatch { code_override, .. } => {
                code_override.clone().unwrap_or_else(|| code.to_string())
            }
            ActionKind::TestGeneration { tests } => {
                blackboard.tests.add_generated_tests(tests.iter().cloned());
                code.to_string()
            }
            ActionKind::StrategyProposal {
                hypotheses,
                bids,
                recommended_active_id,
            } => {
                for h in hypotheses {
                    blackboard.strategy.upsert_hypothesis(h.clone());
                }
                for (id, (p, c, r)) in bids {
                    blackboard.strategy.set_bid_components(id, *p, *c, *r);
                }
                let had_active = blackboard.strategy.get_active_hypothesis().is_some();
                if let Some(rec) = recommended_active_id {
                    blackboard.strategy.set_active_hypothesis(rec);
                } else if !had_active {
                    if let Some(first) = hypotheses.first() {
                        blackboard.strategy.set_active_hypothesis(&first.id);
                    }
                }
                code.to_string()
            }
            ActionKind::Evaluate => code.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::ProblemModel;
    use crate::schema::TestOrigin;

    fn bb() -> Blackboard {
        Blackboard::new(ProblemModel::new("p", "stmt", "starter()"))
    }

    #[test]
    fn generate_code_prefers_override_then_starter_then_empty() {
        let mut board = bb();
        let a = Action::generate_code(None, None, Some("override()".to_string()));
        assert_eq!(a.apply("ignored", &mut board), "override()");

        let a2 = Action::generate_code(None, None, None);
        assert_eq!(a2.apply("ignored", &mut board), "starter()");

        board.problem.starter_code.clear();
        let a3 = Action::generate_code(None, None, None);
        assert_eq!(a3.apply("ignored", &mut board), "");
    }

    #[test]
    fn apply_patch_without_override_is_noop() {
        let mut board = bb();
        let a = Action::apply_patch("P1", PatchLevel::L1Local, None);
        assert_eq!(a.apply("current_code", &mut board), "current_code");
    }

    #[test]
    fn apply_patch_with_override_replaces_code() {
        let mut board = bb();
        let a = Action::apply_patch("P1", PatchLevel::L1Local, Some("fixed()".to_string()));
        assert_eq!(a.apply("current_code", &mut board), "fixed()");
    }

    #[test]
    fn test_generation_folds_into_tests_board() {
        let mut board = bb();
        let a = Action::test_generation(vec![TestCase::new("1", Some("1".into()), TestOrigin::GeneratedRandom)]);
        a.apply("code", &mut board);
        assert_eq!(board.tests.generated_tests().len(), 1);
    }

    #[test]
    fn strategy_proposal_sets_active_only_when_unset() {
        let mut board = bb();
        let h = StrategyHypothesis {
            id: "h1".to_string(),
            name: "H1".to_string(),
            applicability_conditions: Vec::new(),
            complexity_upper_bound: "O(n)".to_string(),
            risk_flags: Vec::new(),
            minimal_evidence_set: Vec::new(),
            notes: String::new(),
        };
        let a = Action::strategy_proposal(vec![h], HashMap::new(), None);
        a.apply("code", &mut board);
        assert_eq!(board.strategy.get_active_hypothesis(), Some("h1"));
    }
}
