//! Scalar reward combining correctness, performance, and structural
//! simplicity.

const ALPHA: f64 = 0.6;
const BETA: f64 = 0.2;
const GAMMA: f64 = 0.2;

/// `0.6·r_corr + 0.2·r_perf + 0.2·r_struct`, each term in `[0, 1]`.
///
/// `branches` counts literal occurrences of `"if"`, `"for"`, `"while"` as
/// substrings of `code` — intentionally naive, not an AST-aware count.
pub fn compute_reward(passed: usize, total: usize, timeouts: usize, avg_runtime: Option<f64>, code: &str) -> f64 {
    let r_corr = if total == 0 { 0.0 } else { passed as f64 / total as f64 };

    let mut r_perf = if total == 0 {
        1.0
    } else {
        1.0 - (timeouts as f64 / total as f64).min(1.0)
    };
    if let Some(rt) = avg_runtime {
        if rt > 0.0 {
            r_perf *= (1.0 - 0.5 * (rt / 0.5).min(1.0)).max(0.0);
        }
    }

    let branches = (count_substring(code, "if") + count_substring(code, "for") + count_substring(code, "while")) as f64;
    let r_struct = (1.0 - 0.5 * (code.len() as f64 / 2000.0).min(1.0) - 0.5 * (branches / 50.0).min(1.0)).max(0.0);

    ALPHA * r_corr + BETA * r_perf + GAMMA * r_struct
}

fn count_substring(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_pass_no_timeouts_short_code_is_near_one() {
        let r = compute_reward(3, 3, 0, Some(0.01), "print(1)");
        assert!(r > 0.95);
    }

    #[test]
    fn zero_total_gives_zero_correctness() {
        let r = compute_reward(0, 0, 0, None, "");
        assert!((r - (BETA * 1.0 + GAMMA * 1.0)).abs() < 1e-9);
    }

    #[test]
    fn timeouts_reduce_performance_term() {
        let r_no_timeout = compute_reward(2, 2, 0, None, "x");
        let r_timeout = compute_reward(2, 2, 2, None, "x");
        assert!(r_timeout < r_no_timeout);
    }

    #[test]
    fn long_code_with_many_branches_reduces_structure_term() {
        let short = compute_reward(1, 1, 0, None, "x = 1");
        let long_branchy = "if ".repeat(60) + &"x".repeat(3000);
        let long = compute_reward(1, 1, 0, None, &long_branchy);
        assert!(long < short);
    }

    #[test]
    fn branch_count_is_literal_substring_count() {
        let code = "if a: pass\nif b: pass\nfor x in y: pass";
        let r = compute_reward(1, 1, 0, None, code);
        let naive_branches = 3.0;
        let expected_struct = 1.0 - 0.5 * (code.len() as f64 / 2000.0).min(1.0) - 0.5 * (naive_branches / 50.0).min(1.0);
        let expected = ALPHA * 1.0 + BETA * 1.0 + GAMMA * expected_struct;
        assert!((r - expected).abs() < 1e-9);
    }
}
