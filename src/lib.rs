//! MCTS-driven multi-agent program synthesis engine for competitive
//! programming problems.
//!
//! The core is the search and coordination engine: a [`blackboard::Blackboard`]
//! shared knowledge base, a [`coordinator::Coordinator`] that enumerates
//! candidate [`actions::Action`]s from specialist [`agents`], an
//! [`mcts::Mcts`] controller driving selection/evaluation/expansion/
//! backpropagation over a two-tier [`evaluation`] pipeline, and a scalar
//! [`evaluation::reward::compute_reward`]. Dataset loading, LLM transport,
//! and subprocess execution are reached through narrow collaborator traits
//! ([`dataset::ProblemLoader`], [`llm::LlmClient`],
//! [`evaluation::runner::ProgramRunner`]) so the search itself stays
//! deterministic given a seed.

pub mod actions;
pub mod agents;
pub mod blackboard;
pub mod coordinator;
pub mod dataset;
pub mod evaluation;
pub mod llm;
pub mod mcts;
pub mod schema;
