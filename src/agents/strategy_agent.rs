//! Proposes (or falls back to) algorithmic strategy hypotheses.

use super::{blackboard_summary, prompts, Agent, AgentBase};
use crate::actions::Action;
use crate::blackboard::Blackboard;
use crate::llm::LlmClient;
use crate::schema::{DiagnosticStatus, StrategyHypothesis};
use async_trait::async_trait;
use std::collections::HashMap;

pub struct StrategyAgent {
    base: AgentBase,
}

impl Default for StrategyAgent {
    fn default() -> Self {
        Self {
            base: AgentBase::new("strategy_agent"),
        }
    }
}

impl StrategyAgent {
    pub fn base_reset(&self) {
        self.base.reset_iteration();
    }
}

#[async_trait(?Send)]
impl Agent for StrategyAgent {
    fn name(&self) -> &'static str {
        "strategy_agent"
    }

    async fn propose(&self, code: &str, blackboard: &mut Blackboard, llm: &dyn LlmClient) -> Vec<Action> {
        let summary = blackboard_summary(blackboard);
        let prompt = prompts::strategy_prompt(blackboard);
        let response = self.base.call_llm(llm, code, &summary, &prompt).await;

        let (hypotheses, bids, recommended_active_id) = match response.and_then(|r| parse_hypotheses(&r)) {
            Some(parsed) if !parsed.0.is_empty() => parsed,
            _ => {
                let (hypotheses, bids) = fallback_hypotheses(blackboard);
                (hypotheses, bids, None)
            }
        };

        vec![Action::strategy_proposal(hypotheses, bids, recommended_active_id)]
    }
}

type ParsedStrategies = (Vec<StrategyHypothesis>, HashMap<String, (f64, f64, f64)>, Option<String>);

fn parse_hypotheses(text: &str) -> Option<ParsedStrategies> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let array = value.get("strategies")?.as_array()?;
    let recommended_active_id = value.get("recommended_active_id").and_then(|v| v.as_str()).map(String::from);
    let mut hypotheses = Vec::new();
    let mut bids = HashMap::new();

    for item in array {
        let id = item.get("id")?.as_str()?.to_string();
        let name = item.get("name").and_then(|v| v.as_str()).unwrap_or(&id).to_string();
        let complexity = item
            .get("complexity_upper_bound")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();
        let strings = |key: &str| -> Vec<String> {
            item.get(key)
                .and_then(|v| v.as_array())
                .map(|a| a.iter().filter_map(|v| v.as_str()).map(String::from).collect())
                .unwrap_or_default()
        };

        let bid = item.get("bid");
        let p = bid.and_then(|b| b.get("p")).and_then(|v| v.as_f64()).unwrap_or(0.5);
        let c = bid.and_then(|b| b.get("c")).and_then(|v| v.as_f64()).unwrap_or(0.5);
        let r = bid.and_then(|b| b.get("r")).and_then(|v| v.as_f64()).unwrap_or(0.5);
        bids.insert(id.clone(), (p, c, r));

        hypotheses.push(StrategyHypothesis {
            id,
            name,
            applicability_conditions: strings("applicability_conditions"),
            complexity_upper_bound: complexity,
            risk_flags: strings("risk_flags"),
            minimal_evidence_set: strings("minimal_evidence_set"),
            notes: item.get("notes").and_then(|v| v.as_str()).unwrap_or("").to_string(),
        });
    }

    Some((hypotheses, bids, recommended_active_id))
}

/// A `"default"` hypothesis if none exists, plus `"optimize"` on any TLE,
/// `"boundary_check"` on any WA, `"robust_io"` on any RE — each only if not
/// already present.
fn fallback_hypotheses(blackboard: &Blackboard) -> (Vec<StrategyHypothesis>, HashMap<String, (f64, f64, f64)>) {
    let mut hypotheses = Vec::new();
    let mut bids = HashMap::new();

    if !blackboard.strategy.has_hypothesis("default") {
        hypotheses.push(StrategyHypothesis::default_baseline());
        bids.insert("default".to_string(), (0.5, 0.5, 0.5));
    }

    let statuses: Vec<DiagnosticStatus> = blackboard.tests.failure_metadata().iter().map(|r| r.status).collect();

    let mut add_if_new = |id: &str, name: &str| {
        if !blackboard.strategy.has_hypothesis(id) {
            hypotheses.push(StrategyHypothesis {
                id: id.to_string(),
                name: name.to_string(),
                applicability_conditions: Vec::new(),
                complexity_upper_bound: "unknown".to_string(),
                risk_flags: Vec::new(),
                minimal_evidence_set: Vec::new(),
                notes: String::new(),
            });
            bids.insert(id.to_string(), (0.5, 0.5, 0.5));
        }
    };

    if statuses.iter().any(|s| *s == DiagnosticStatus::Tle) {
        add_if_new("optimize", "Optimize");
    }
    if statuses.iter().any(|s| *s == DiagnosticStatus::Wa) {
        add_if_new("boundary_check", "Boundary Check");
    }
    if statuses.iter().any(|s| *s == DiagnosticStatus::Re) {
        add_if_new("robust_io", "Robust IO");
    }

    (hypotheses, bids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackboard::ProblemModel;
    use crate::llm::StubLlmClient;
    use crate::schema::{Diagnostic, Stage};

    fn bb() -> Blackboard {
        Blackboard::new(ProblemModel::new("p", "stmt", ""))
    }

    #[tokio::test]
    async fn parses_wrapped_strategies_object_and_forwards_recommended_active_id() {
        let mut board = bb();
        let response = r#"{"strategies": [{"id": "two_pointer", "name": "Two Pointer", "bid": {"p": 0.8, "c": 0.2, "r": 0.1}}], "recommended_active_id": "two_pointer"}"#;
        let agent = StrategyAgent::default();
        let actions = agent.propose("code", &mut board, &StubLlmClient::responding(response)).await;
        assert_eq!(actions.len(), 1);
        match &actions[0].kind {
            crate::actions::ActionKind::StrategyProposal {
                hypotheses,
                recommended_active_id,
                ..
            } => {
                assert_eq!(hypotheses.len(), 1);
                assert_eq!(hypotheses[0].id, "two_pointer");
                assert_eq!(recommended_active_id.as_deref(), Some("two_pointer"));
            }
            _ => panic!("expected StrategyProposal"),
        }
    }

    #[tokio::test]
    async fn falls_back_to_failure_driven_hypotheses() {
        let mut board = bb();
        board.record_diagnostic(&Diagnostic::new(Stage::Deepeval, DiagnosticStatus::Tle, None, "slow"));
        board.record_diagnostic(&Diagnostic::new(Stage::Deepeval, DiagnosticStatus::Wa, None, "wrong"));

        let agent = StrategyAgent::default();
        let actions = agent.propose("code", &mut board, &StubLlmClient::empty()).await;
        assert_eq!(actions.len(), 1);
        match &actions[0].kind {
            crate::actions::ActionKind::StrategyProposal { hypotheses, .. } => {
                let ids: Vec<&str> = hypotheses.iter().map(|h| h.id.as_str()).collect();
                assert!(ids.contains(&"optimize"));
                assert!(ids.contains(&"boundary_check"));
                assert!(!ids.contains(&"robust_io"));
            }
            _ => panic!("expected StrategyProposal"),
        }
    }

    #[tokio::test]
    async fn does_not_duplicate_default_when_already_present() {
        let board = bb();
        assert!(board.strategy.has_hypothesis("default"));

        let agent = StrategyAgent::default();
        let mut board = board;
        let actions = agent.propose("code", &mut board, &StubLlmClient::empty()).await;
        match &actions[0].kind {
            crate::actions::ActionKind::StrategyProposal { hypotheses, .. } => {
                assert!(hypotheses.iter().all(|h| h.id != "default"));
            }
            _ => panic!("expected StrategyProposal"),
        }
    }
}
