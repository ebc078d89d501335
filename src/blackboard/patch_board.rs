//! Patch catalog, budgeted subset selection honoring dependencies and
//! conflicts, and the applied/rejected outcome log.

use crate::schema::{DiagnosticStatus, Patch};
use std::collections::{HashMap, HashSet};

/// Outcome of a single applied or rejected patch, recorded by
/// [`PatchBoard::record_patch_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    Rejected(DiagnosticStatus),
}

/// Catalog of proposed patches plus application history.
///
/// Proposing a patch with an existing id is idempotent (first-write-wins).
#[derive(Debug, Clone, Default)]
pub struct PatchBoard {
    patches: HashMap<String, Patch>,
    applied_history: Vec<String>,
    rejected: HashMap<String, DiagnosticStatus>,
}

impl PatchBoard {
    pub fn patches(&self) -> &HashMap<String, Patch> {
        &self.patches
    }

    pub fn applied_history(&self) -> &[String] {
        &self.applied_history
    }

    pub fn rejected(&self) -> &HashMap<String, DiagnosticStatus> {
        &self.rejected
    }

    pub fn get(&self, id: &str) -> Option<&Patch> {
        self.patches.get(id)
    }

    /// First-write-wins insert by id.
    pub fn propose_patch(&mut self, p: Patch) {
        self.patches.entry(p.id.clone()).or_insert(p);
    }

    /// `false` if `id` is unknown; `false, "missing dependency X"` if any
    /// dependency is not in `already_selected`; `false, "conflict with Y"`
    /// if any conflict is already selected, or if an already-selected patch
    /// declares a conflict with `id` (conflicts are symmetric).
    pub fn can_apply(&self, id: &str, already_selected: &[String]) -> (bool, Option<String>) {
        let Some(patch) = self.patches.get(id) else {
            return (false, Some(format!("unknown patch {id}")));
        };
        let selected: HashSet<&str> = already_selected.iter().map(String::as_str).collect();

        for dep in &patch.dependencies {
            if !selected.contains(dep.as_str()) {
                return (false, Some(format!("missing dependency {dep}")));
            }
        }
        for conflict in &patch.conflicts {
            if selected.contains(conflict.as_str()) {
                return (false, Some(format!("conflict with {conflict}")));
            }
        }
        for sel in already_selected {
            if let Some(sel_patch) = self.patches.get(sel.as_str()) {
                if sel_patch.conflicts.iter().any(|c| c == id) {
                    return (false, Some(format!("conflict with {sel}")));
                }
            }
        }
        (true, None)
    }

    /// Score each patch `s_i = w1·success_prob − w2·cost − w3·risk`, sort
    /// descending, then greedily accept in that order subject to
    /// `can_apply`, stopping once `budget_k` patches are selected.
    pub fn select_patch_subset(&self, budget_k: usize, w1: f64, w2: f64, w3: f64) -> Vec<String> {
        let mut scored: Vec<(&String, f64)> = self
            .patches
            .iter()
            .map(|(id, p)| (id, w1 * p.success_prob - w2 * p.cost - w3 * p.risk))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(b.0)));

        let mut selected: Vec<String> = Vec::new();
        for (id, _) in scored {
            if selected.len() == budget_k {
                break;
            }
            if self.can_apply(id, &selected).0 {
                selected.push(id.clone());
            }
        }
        selected
    }

    /// On success, append to `applied_history`; on failure, map
    /// `id → diag.status` in `rejected` (last-writer-wins).
    pub fn record_patch_outcome(&mut self, id: &str, success: bool, status: DiagnosticStatus) {
        if success {
            self.applied_history.push(id.to_string());
        } else {
            self.rejected.insert(id.to_string(), status);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(id: &str, deps: &[&str], conflicts: &[&str], p: f64) -> Patch {
        Patch {
            id: id.to_string(),
            level: crate::schema::PatchLevel::L1Local,
            description: String::new(),
            preconditions: Vec::new(),
            dependencies: deps.iter().map(|s| s.to_string()).collect(),
            conflicts: conflicts.iter().map(|s| s.to_string()).collect(),
            success_prob: p,
            cost: 0.1,
            risk: 0.1,
            tags: Vec::new(),
        }
    }

    #[test]
    fn propose_patch_is_first_write_wins() {
        let mut board = PatchBoard::default();
        board.propose_patch(patch("A", &[], &[], 0.5));
        board.propose_patch(patch("A", &[], &[], 0.9));
        assert_eq!(board.get("A").unwrap().success_prob, 0.5);
    }

    #[test]
    fn can_apply_detects_missing_dependency_and_conflict() {
        let mut board = PatchBoard::default();
        board.propose_patch(patch("A", &[], &[], 0.9));
        board.propose_patch(patch("B", &["A"], &[], 0.8));
        board.propose_patch(patch("C", &[], &["A"], 0.95));

        assert_eq!(board.can_apply("B", &[]).0, false);
        assert_eq!(board.can_apply("B", &["A".to_string()]).0, true);
        assert_eq!(board.can_apply("C", &["A".to_string()]).0, false);
    }

    /// Mirrors the patch-subset scenario: A{p=0.9}, B{deps:[A], p=0.8},
    /// C{conflicts:[A], p=0.95}, budget=2. Greedy score order is C, A, B;
    /// C is selected first, which blocks A (conflict), which blocks B
    /// (missing dependency) — result is `[C]`.
    #[test]
    fn select_patch_subset_honors_deps_and_conflicts_greedily() {
        let mut board = PatchBoard::default();
        board.propose_patch(patch("A", &[], &[], 0.9));
        board.propose_patch(patch("B", &["A"], &[], 0.8));
        board.propose_patch(patch("C", &[], &["A"], 0.95));

        let selected = board.select_patch_subset(2, 1.0, 1.0, 1.0);
        assert_eq!(selected, vec!["C".to_string()]);
    }

    #[test]
    fn can_apply_rejects_candidate_conflicting_with_already_selected_patch() {
        let mut board = PatchBoard::default();
        board.propose_patch(patch("A", &[], &[], 0.9));
        board.propose_patch(patch("C", &[], &["A"], 0.95));

        // C declares the conflict; selecting C first must also block A,
        // even though A itself declares no conflicts.
        assert_eq!(board.can_apply("A", &["C".to_string()]).0, false);
    }

    #[test]
    fn record_patch_outcome_rejected_is_last_writer_wins() {
        let mut board = PatchBoard::default();
        board.record_patch_outcome("A", false, DiagnosticStatus::Wa);
        board.record_patch_outcome("A", false, DiagnosticStatus::Re);
        assert_eq!(board.rejected()["A"], DiagnosticStatus::Re);
    }
}
