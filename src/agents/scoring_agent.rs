//! Purely reactive agent: folds diagnostics into the blackboard and
//! proposes repair patches. Never appears in coordinator enumeration.

use super::{blackboard_summary, prompts, AgentBase};
use crate::blackboard::Blackboard;
use crate::llm::LlmClient;
use crate::schema::{Diagnostic, DiagnosticStatus, Patch, PatchLevel};

pub struct ScoringAgent {
    base: AgentBase,
}

impl Default for ScoringAgent {
    fn default() -> Self {
        Self {
            base: AgentBase::new("scoring_agent"),
        }
    }
}

impl ScoringAgent {
    /// Fold `diag` into the blackboard, then propose repair patches —
    /// from the LLM when possible, else a deterministic stub keyed on
    /// `diag.status`.
    pub async fn handle_diagnostic(&self, diag: &Diagnostic, code: &str, blackboard: &mut Blackboard, llm: &dyn LlmClient) {
        blackboard.record_diagnostic(diag);

        let summary = blackboard_summary(blackboard);
        let prompt = prompts::scoring_repair_prompt(&diag.message);
        let response = self.base.call_llm(llm, code, &summary, &prompt).await;

        let patches = match response.and_then(|r| parse_patches(&r)) {
            Some(patches) if !patches.is_empty() => patches,
            _ => vec![stub_patch(diag.status)],
        };

        for patch in patches {
            blackboard.patches.propose_patch(patch);
        }
    }
}

fn parse_patches(text: &str) -> Option<Vec<Patch>> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let array = value.get("patches")?.as_array()?;
    let mut patches = Vec::new();
    for item in array {
        let id = item.get("id")?.as_str()?.to_string();
        let level = item
            .get("level")
            .and_then(|v| v.as_str())
            .map(PatchLevel::parse_lenient)
            .unwrap_or_default();
        let tags = item
            .get("tags")
            .and_then(|v| v.as_array())
            .map(|a| a.iter().filter_map(|v| v.as_str()).map(String::from).collect())
            .unwrap_or_default();
        patches.push(Patch {
            id,
            level,
            description: item.get("description").and_then(|v| v.as_str()).unwrap_or("").to_string(),
            preconditions: Vec::new(),
            dependencies: Vec::new(),
            conflicts: Vec::new(),
            success_prob: item.get("success_prob").and_then(|v| v.as_f64()).unwrap_or(0.2),
            cost: item.get("cost").and_then(|v| v.as_f64()).unwrap_or(0.2),
            risk: item.get("risk").and_then(|v| v.as_f64()).unwrap_or(0.2),
            tags,
        });
    }
    Some(patches)
}

/// WA → local off-by-one fix, RE → local input guard, TLE → structural
/// loop optimization, each with `success_prob` in `[0.2, 0.25]`.
fn stub_patch(status: DiagnosticStatus) -> Patch {
    let (id, level, description, success_prob) = match status {
        DiagnosticStatus::Wa => ("stub_off_by_one", PatchLevel::L1Local, "adjust off-by-one boundary", 0.22),
        DiagnosticStatus::Re => ("stub_input_guard", PatchLevel::L1Local, "guard against malformed input", 0.25),
        DiagnosticStatus::Tle => ("stub_loop_opt", PatchLevel::L2Structural, "optimize hot loop", 0.2),
        _ => ("stub_generic", PatchLevel::L1Local, "generic repair attempt", 0.2),
    };
    Patch {
        id: id.to_string(),
        level,
        description: description.to_string(),
        preconditions: Vec::new(),
        dependencies: Vec::new(),
        conflicts: Vec::new(),
        success_prob,
        cost: 0.2,
        risk: 0.2,
        tags: Vec::new(),
    }
}
