//! MCTS controller: selection (softmax-sampled UCB), two-tier simulation,
//! expansion via the [`crate::coordinator::Coordinator`], and incremental-mean
//! backpropagation.

use crate::blackboard::Blackboard;
use crate::coordinator::Coordinator;
use crate::evaluation::{compute_reward, run_deepeval, run_quickscreen, EvaluationConfig, ProgramRunner};
use crate::llm::LlmClient;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// One vertex of the search tree. Owns its `blackboard`; `parent` is a
/// non-owning back-reference so the tree (not the node) controls lifetime.
#[derive(Debug)]
pub struct Node {
    pub code: String,
    pub blackboard: Blackboard,
    pub parent: Weak<RefCell<Node>>,
    pub children: Vec<Rc<RefCell<Node>>>,
    pub action_taken: Option<String>,
    pub n: u64,
    pub xbar: f64,
}

impl Node {
    pub fn root(code: impl Into<String>, blackboard: Blackboard) -> Rc<RefCell<Node>> {
        Rc::new(RefCell::new(Node {
            code: code.into(),
            blackboard,
            parent: Weak::new(),
            children: Vec::new(),
            action_taken: None,
            n: 0,
            xbar: 0.0,
        }))
    }
}

/// Tunable MCTS parameters (spec §4.9): iteration budget, per-expansion
/// child cap, UCB exploration constant, softmax temperature, the epsilon
/// floor inside the UCB log/sqrt, and the RNG seed driving every stochastic
/// choice this controller makes.
#[derive(Debug, Clone)]
pub struct McTsConfig {
    pub iterations: u32,
    pub expansion_budget: usize,
    pub c: f64,
    pub tau: f64,
    pub epsilon: f64,
    pub seed: u64,
}

impl Default for McTsConfig {
    fn default() -> Self {
        Self {
            iterations: 20,
            expansion_budget: 2,
            c: 1.4,
            tau: 1.0,
            epsilon: 1e-6,
            seed: 0,
        }
    }
}

/// Outcome of a full search: the best-reward code seen (or the solving
/// code), the per-non-solved-iteration reward trajectory, the total number
/// of children created, and whether the search terminated via the
/// solved short-circuit.
#[derive(Debug, Clone)]
pub struct McTsResult {
    pub best_code: String,
    pub reward_trajectory: Vec<f64>,
    pub nodes_expanded: usize,
    pub solved: bool,
}

pub struct Mcts {
    config: McTsConfig,
    coordinator: Coordinator,
    rng: StdRng,
}

impl Mcts {
    pub fn new(config: McTsConfig, coordinator: Coordinator) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, coordinator, rng }
    }

    /// Run the configured number of iterations (or short-circuit on a
    /// solved leaf). `root.code` is the initial best-reward code and
    /// `best_reward` starts at `-inf` per spec.
    pub async fn run(
        &mut self,
        root: Rc<RefCell<Node>>,
        llm: &dyn LlmClient,
        runner: &dyn ProgramRunner,
        eval_config: &EvaluationConfig,
    ) -> McTsResult {
        let mut reward_trajectory = Vec::new();
        let mut nodes_expanded = 0usize;
        let mut best_code = root.borrow().code.clone();
        let mut best_reward = f64::NEG_INFINITY;

        for iteration in 0..self.config.iterations {
            tracing::debug!(iteration, "mcts iteration start");
            let leaf = self.select(&root);
            let (solved, reward) = self.simulate_and_evaluate(&leaf, llm, runner, eval_config).await;

            if solved {
                let code = leaf.borrow().code.clone();
                tracing::info!(iteration, "solved short-circuit");
                return McTsResult {
                    best_code: code,
                    reward_trajectory,
                    nodes_expanded,
                    solved: true,
                };
            }

            reward_trajectory.push(reward);
            if reward > best_reward {
                best_reward = reward;
                best_code = leaf.borrow().code.clone();
            }

            nodes_expanded += self.expand(&leaf, llm).await;
            backpropagate(&leaf, reward);
        }

        tracing::info!(nodes_expanded, iterations = self.config.iterations, "mcts exhausted without solving");
        McTsResult {
            best_code,
            reward_trajectory,
            nodes_expanded,
            solved: false,
        }
    }

    /// Walk from `root` through children until a childless node is reached,
    /// softmax-sampling (not argmax) a child at every internal step.
    fn select(&mut self, root: &Rc<RefCell<Node>>) -> Rc<RefCell<Node>> {
        let mut current = Rc::clone(root);
        loop {
            let has_children = !current.borrow().children.is_empty();
            if !has_children {
                return current;
            }
            current = self.select_child(&current);
        }
    }

    fn select_child(&mut self, node: &Rc<RefCell<Node>>) -> Rc<RefCell<Node>> {
        let parent_n = node.borrow().n;
        let scores: Vec<f64> = node
            .borrow()
            .children
            .iter()
            .map(|child| {
                let child_ref = child.borrow();
                child_ref.xbar
                    + self.config.c * ((parent_n as f64 + self.config.epsilon).ln() / (child_ref.n as f64 + self.config.epsilon)).sqrt()
            })
            .collect();

        let idx = self.softmax_sample(&scores);
        Rc::clone(&node.borrow().children[idx])
    }

    /// Numerically-stable softmax of `scores / tau` (tau floored at
    /// `1e-6`), then an inverse-CDF draw from this controller's seeded RNG.
    fn softmax_sample(&mut self, scores: &[f64]) -> usize {
        let tau = self.config.tau.max(1e-6);
        let scaled: Vec<f64> = scores.iter().map(|s| s / tau).collect();
        let max_scaled = scaled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scaled.iter().map(|s| (s - max_scaled).exp()).collect();
        let sum: f64 = exps.iter().sum();

        let draw: f64 = self.rng.random_range(0.0..1.0);
        let mut cumulative = 0.0;
        for (i, e) in exps.iter().enumerate() {
            cumulative += e / sum;
            if draw <= cumulative {
                return i;
            }
        }
        exps.len() - 1
    }

    /// Quickscreen first; on failure fold its single diagnostic and return
    /// a reward capped at 0.6 unconditionally. Otherwise deepeval; an
    /// all-pass deepeval returns the solved short-circuit. Otherwise fold
    /// every diagnostic and return the uncapped reward.
    async fn simulate_and_evaluate(
        &self,
        leaf: &Rc<RefCell<Node>>,
        llm: &dyn LlmClient,
        runner: &dyn ProgramRunner,
        eval_config: &EvaluationConfig,
    ) -> (bool, f64) {
        let (code, tests_snapshot) = {
            let node = leaf.borrow();
            (node.code.clone(), node.blackboard.tests.clone())
        };

        let quick = run_quickscreen(
            &code,
            &tests_snapshot,
            runner,
            eval_config.quickscreen_timeout,
            eval_config.quickscreen_max_tests,
        )
        .await;

        if !quick.passed {
            if let Some(diag) = quick.diagnostics.first().cloned() {
                let mut node = leaf.borrow_mut();
                self.coordinator.handle_diagnostic(&diag, &code, &mut node.blackboard, llm).await;
            }
            let reward = compute_reward(quick.passed_count, quick.total.max(1), quick.timeouts, quick.avg_runtime, &code);
            return (false, reward.min(0.6));
        }

        let problem_tests = leaf.borrow().blackboard.problem.view().tests;
        let deep = run_deepeval(&code, &problem_tests, runner, eval_config.deepeval_timeout).await;
        if deep.passed {
            return (true, 1.0);
        }

        for diag in &deep.diagnostics {
            let mut node = leaf.borrow_mut();
            self.coordinator.handle_diagnostic(diag, &code, &mut node.blackboard, llm).await;
        }
        let reward = compute_reward(deep.passed_count, deep.total.max(1), deep.timeouts, deep.avg_runtime, &code);
        (false, reward)
    }

    /// Enumerate actions via the coordinator, cap to `expansion_budget` via
    /// a uniformly-random seeded subset, then attach one cloned-blackboard
    /// child per surviving action. Returns the number of children created.
    async fn expand(&mut self, leaf: &Rc<RefCell<Node>>, llm: &dyn LlmClient) -> usize {
        let code = leaf.borrow().code.clone();
        let mut actions = {
            let mut node = leaf.borrow_mut();
            self.coordinator.enumerate_actions(&code, &mut node.blackboard, llm).await
        };

        if actions.len() > self.config.expansion_budget {
            let mut indices: Vec<usize> = (0..actions.len()).collect();
            indices.shuffle(&mut self.rng);
            indices.truncate(self.config.expansion_budget);
            let kept: Vec<crate::actions::Action> = indices.into_iter().map(|i| actions[i].clone()).collect();
            actions = kept;
        }

        let created = actions.len();
        for action in &actions {
            let mut child_blackboard = leaf.borrow().blackboard.clone();
            let new_code = action.apply(&code, &mut child_blackboard);
            let child = Rc::new(RefCell::new(Node {
                code: new_code,
                blackboard: child_blackboard,
                parent: Rc::downgrade(leaf),
                children: Vec::new(),
                action_taken: Some(action.name.clone()),
                n: 0,
                xbar: 0.0,
            }));
            leaf.borrow_mut().children.push(child);
        }
        created
    }
}

/// From `leaf` up to the root: `N += 1; Xbar += (reward - Xbar) / N`.
fn backpropagate(leaf: &Rc<RefCell<Node>>, reward: f64) {
    let mut current = Some(Rc::clone(leaf));
    while let Some(node) = current {
        let parent = {
            let mut n = node.borrow_mut();
            n.n += 1;
            n.xbar += (reward - n.xbar) / n.n as f64;
            n.parent.upgrade()
        };
        current = parent;
    }
}
