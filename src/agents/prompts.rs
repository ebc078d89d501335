//! Prompt templates, one constructor function per agent. Kept as plain
//! string-formatting helpers rather than a templating engine — the
//! prompts are short and the substitutions are all simple interpolations.

use crate::blackboard::Blackboard;

pub fn strategy_prompt(blackboard: &Blackboard) -> String {
    format!(
        "You are proposing algorithmic strategies for this problem.\n\
         Problem: {}\n\
         Respond with a JSON array of hypotheses, each with id, name, \
         applicability_conditions, complexity_upper_bound, risk_flags, \
         minimal_evidence_set, notes, and a bid object with p/c/r in [0,1].",
        blackboard.problem.summarize(),
    )
}

pub fn codegen_prompt(blackboard: &Blackboard, strategy_id: &str) -> String {
    format!(
        "Write a solution to this problem using the \"{strategy_id}\" strategy.\n\
         Problem: {}\n\
         Starter code:\n{}\n\
         Respond with the complete code in a fenced code block.",
        blackboard.problem.raw_statement,
        blackboard.problem.starter_code,
    )
}

pub fn testgen_prompt(blackboard: &Blackboard, seed: u64) -> String {
    format!(
        "Generate edge-case tests for this problem (seed={seed} for any \
         randomized fallback).\n\
         Problem: {}\n\
         Respond with a JSON array of test cases, each with input and \
         optional expected.",
        blackboard.problem.raw_statement,
    )
}

pub fn repair_prompt(blackboard: &Blackboard, failing_inputs: &[String], patch_descriptions: &[String]) -> String {
    format!(
        "The current solution fails on these inputs:\n{}\n\
         Candidate patches:\n{}\n\
         Respond with corrected code in a fenced code block, or an empty \
         response if no correction is available.",
        failing_inputs.join("\n"),
        patch_descriptions.join("\n"),
    )
}

pub fn scoring_repair_prompt(message: &str) -> String {
    format!(
        "A test failed with: {message}\n\
         Respond with a JSON array of candidate patches, each with id, \
         level, description, success_prob, cost, risk.",
    )
}
