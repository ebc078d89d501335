//! Hypothesis catalog, bid components, prior computation, and active-
//! hypothesis tracking.

use crate::schema::StrategyHypothesis;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use std::collections::HashMap;

const DEFAULT_ID: &str = "default";
const DEFAULT_BID: (f64, f64, f64) = (0.5, 0.5, 0.5);

/// Catalog of strategy hypotheses and their `(success, cost, risk)` bids.
///
/// Invariant: `"default"` is always present with bid `(0.5, 0.5, 0.5)`
/// unless explicitly overwritten by a later upsert.
#[derive(Debug, Clone)]
pub struct StrategyBoard {
    hypotheses: HashMap<String, StrategyHypothesis>,
    bids: HashMap<String, (f64, f64, f64)>,
    active_id: Option<String>,
    rng_seed: u64,
}

impl Default for StrategyBoard {
    fn default() -> Self {
        let mut hypotheses = HashMap::new();
        let mut bids = HashMap::new();
        hypotheses.insert(DEFAULT_ID.to_string(), StrategyHypothesis::default_baseline());
        bids.insert(DEFAULT_ID.to_string(), DEFAULT_BID);
        Self {
            hypotheses,
            bids,
            active_id: None,
            rng_seed: 0,
        }
    }
}

impl StrategyBoard {
    pub fn with_seed(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            ..Self::default()
        }
    }

    pub fn hypotheses(&self) -> &HashMap<String, StrategyHypothesis> {
        &self.hypotheses
    }

    pub fn has_hypothesis(&self, id: &str) -> bool {
        self.hypotheses.contains_key(id)
    }

    /// Insert or replace a hypothesis by id. First insertion also
    /// initializes its bid to `(0.5, 0.5, 0.5)` if no bid is present yet.
    pub fn upsert_hypothesis(&mut self, h: StrategyHypothesis) {
        let id = h.id.clone();
        self.bids.entry(id.clone()).or_insert(DEFAULT_BID);
        self.hypotheses.insert(id, h);
    }

    pub fn set_bid_components(&mut self, id: &str, p: f64, c: f64, r: f64) {
        self.bids.insert(id.to_string(), (p, c, r));
    }

    pub fn bid(&self, id: &str) -> (f64, f64, f64) {
        self.bids.get(id).copied().unwrap_or(DEFAULT_BID)
    }

    pub fn get_active_hypothesis(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    /// No-op if `id` is unknown.
    pub fn set_active_hypothesis(&mut self, id: &str) {
        if self.hypotheses.contains_key(id) {
            self.active_id = Some(id.to_string());
        }
    }

    /// Min-max normalize bids per axis, score `s_i = α·p̂ − β·ĉ − γ·r̂`,
    /// then a numerically-stable softmax of `s_i/τ` (τ floored at `1e-6`).
    /// Output probabilities sum to 1.
    pub fn compute_prior(&self, alpha: f64, beta: f64, gamma: f64, tau: f64) -> HashMap<String, f64> {
        let ids: Vec<&String> = self.hypotheses.keys().collect();
        if ids.is_empty() {
            return HashMap::new();
        }

        let bids: Vec<(f64, f64, f64)> = ids.iter().map(|id| self.bid(id)).collect();

        let normalize = |axis: fn(&(f64, f64, f64)) -> f64| -> Vec<f64> {
            let values: Vec<f64> = bids.iter().map(axis).collect();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            if (max - min).abs() < f64::EPSILON {
                vec![0.5; values.len()]
            } else {
                values.iter().map(|v| (v - min) / (max - min)).collect()
            }
        };

        let p_hat = normalize(|b| b.0);
        let c_hat = normalize(|b| b.1);
        let r_hat = normalize(|b| b.2);

        let tau = tau.max(1e-6);
        let scores: Vec<f64> = (0..ids.len())
            .map(|i| alpha * p_hat[i] - beta * c_hat[i] - gamma * r_hat[i])
            .collect();

        let scaled: Vec<f64> = scores.iter().map(|s| s / tau).collect();
        let max_scaled = scaled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scaled.iter().map(|s| (s - max_scaled).exp()).collect();
        let sum: f64 = exps.iter().sum();

        ids.into_iter()
            .zip(exps.into_iter().map(|e| e / sum))
            .map(|(id, p)| (id.clone(), p))
            .collect()
    }

    /// Inverse-CDF sample over all hypotheses using a fresh `StdRng` seeded
    /// from the board's `rng_seed`. Falls back to `"default"` if empty.
    pub fn sample_hypothesis(&self) -> String {
        if self.hypotheses.is_empty() {
            return DEFAULT_ID.to_string();
        }
        let prior = self.compute_prior(1.0, 1.0, 1.0, 1.0);
        let mut ids: Vec<&String> = prior.keys().collect();
        ids.sort();

        let mut rng = StdRng::seed_from_u64(self.rng_seed);
        let draw: f64 = rng.random_range(0.0..1.0);

        let mut cumulative = 0.0;
        for id in &ids {
            cumulative += prior[*id];
            if draw <= cumulative {
                return (*id).clone();
            }
        }
        ids.last().map(|s| (*s).clone()).unwrap_or_else(|| DEFAULT_ID.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hypothesis(id: &str) -> StrategyHypothesis {
        StrategyHypothesis {
            id: id.to_string(),
            name: id.to_string(),
            applicability_conditions: Vec::new(),
            complexity_upper_bound: "O(n)".to_string(),
            risk_flags: Vec::new(),
            minimal_evidence_set: Vec::new(),
            notes: String::new(),
        }
    }

    #[test]
    fn default_hypothesis_present_at_construction() {
        let board = StrategyBoard::default();
        assert!(board.has_hypothesis("default"));
        assert_eq!(board.bid("default"), DEFAULT_BID);
    }

    #[test]
    fn upsert_initializes_bid_only_on_first_insert() {
        let mut board = StrategyBoard::default();
        board.upsert_hypothesis(hypothesis("h1"));
        assert_eq!(board.bid("h1"), DEFAULT_BID);

        board.set_bid_components("h1", 0.9, 0.1, 0.1);
        board.upsert_hypothesis(hypothesis("h1"));
        assert_eq!(board.bid("h1"), (0.9, 0.1, 0.1));
    }

    #[test]
    fn compute_prior_sums_to_one() {
        let mut board = StrategyBoard::default();
        board.upsert_hypothesis(hypothesis("h1"));
        board.set_bid_components("h1", 0.9, 0.1, 0.1);
        let prior = board.compute_prior(1.0, 1.0, 1.0, 1.0);
        let total: f64 = prior.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn compute_prior_falls_back_to_half_when_axis_constant() {
        let board = StrategyBoard::default();
        let prior = board.compute_prior(1.0, 1.0, 1.0, 1.0);
        assert_eq!(prior.len(), 1);
        assert!((prior["default"] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn set_active_hypothesis_is_noop_for_unknown_id() {
        let mut board = StrategyBoard::default();
        board.set_active_hypothesis("nonexistent");
        assert_eq!(board.get_active_hypothesis(), None);
    }

    #[test]
    fn sample_hypothesis_falls_back_to_default_for_empty_board() {
        let board = StrategyBoard {
            hypotheses: HashMap::new(),
            bids: HashMap::new(),
            active_id: None,
            rng_seed: 1,
        };
        assert_eq!(board.sample_hypothesis(), "default");
    }
}
