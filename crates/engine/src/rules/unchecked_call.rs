//! Low-level external calls whose boolean success result is never consumed.
//! `.transfer` reverts on failure on its own and is therefore not reported.

use super::{candidate_for_line, Category};
use crate::finding::Candidate;
use crate::lex::Structure;
use crate::unit::SourceUnit;
use regex::Regex;
use std::sync::LazyLock;

const LOW_LEVEL_MARKERS: [&str; 4] = [".call(", ".call{", ".delegatecall(", ".send("];

static BOOL_CAPTURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\s*bool\s+([A-Za-z_$][A-Za-z0-9_$]*)").expect("static pattern")
});

static CONSUMING_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(require|if|return|revert|assert)\b").expect("static pattern")
});

/// How many following lines may hold the `require(ok)` / `if (!ok)` check
/// before a captured result counts as unchecked.
const CHECK_LOOKAHEAD_LINES: usize = 6;

pub struct UncheckedExternalCallRule;

impl UncheckedExternalCallRule {
    pub fn check(&self, unit: &SourceUnit, structure: &Structure) -> Vec<Candidate> {
        let lines: Vec<(usize, usize, &str)> = unit.normalized_lines().collect();
        let mut candidates = Vec::new();

        for (idx, (_, line_start, line)) in lines.iter().enumerate() {
            let Some(marker_pos) = LOW_LEVEL_MARKERS.iter().filter_map(|m| line.find(m)).min()
            else {
                continue;
            };

            // Result consumed on the same line.
            let before = &line[..marker_pos];
            if CONSUMING_KEYWORD.is_match(before) {
                continue;
            }

            if let Some(var) = BOOL_CAPTURE
                .captures(before)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
            {
                if capture_is_checked(structure, &lines, idx, *line_start, var) {
                    continue;
                }
                candidates.push(candidate_for_line(
                    unit,
                    Category::UncheckedExternalCall,
                    *line_start,
                    line,
                    0.6,
                    format!(
                        "The call's success flag '{var}' is captured but never checked; \
                         a failed call goes unnoticed. Add `require({var}, ...)` or revert \
                         on failure."
                    ),
                ));
            } else {
                candidates.push(candidate_for_line(
                    unit,
                    Category::UncheckedExternalCall,
                    *line_start,
                    line,
                    0.8,
                    "Low-level external call result is discarded; the call can fail \
                     silently. Capture the returned bool and require success."
                        .to_string(),
                ));
            }
        }

        candidates
    }
}

fn capture_is_checked(
    structure: &Structure,
    lines: &[(usize, usize, &str)],
    call_idx: usize,
    call_offset: usize,
    var: &str,
) -> bool {
    let body_end = structure
        .function_containing(call_offset)
        .and_then(|f| f.body.as_ref().map(|b| b.end));

    for (_, line_start, line) in lines.iter().skip(call_idx + 1).take(CHECK_LOOKAHEAD_LINES) {
        if body_end.is_some_and(|end| *line_start >= end) {
            break;
        }
        if !line.contains(var) {
            continue;
        }
        if CONSUMING_KEYWORD.is_match(line) || line.contains(&format!("!{var}")) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Structure;

    fn run(src: &str) -> Vec<Candidate> {
        let unit = SourceUnit::new(src);
        let structure = Structure::build(&unit);
        UncheckedExternalCallRule.check(&unit, &structure)
    }

    #[test]
    fn flags_discarded_result() {
        let src = "function pay(address to) external {\n  to.call{value: 1 ether}(\"\");\n}";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].span.line, 2);
        assert!((candidates[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn flags_captured_but_unchecked() {
        let src =
            "function pay(address to) external {\n  (bool ok, ) = to.call{value: 1}(\"\");\n  emit Paid(to);\n}";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].message.contains("'ok'"));
    }

    #[test]
    fn required_result_is_clean() {
        let src = "function pay(address to) external {\n  (bool ok, ) = to.call{value: 1}(\"\");\n  require(ok, \"call failed\");\n}";
        assert!(run(src).is_empty());
    }

    #[test]
    fn if_guarded_send_is_clean() {
        let src = "function pay(address payable to) external {\n  if (!to.send(1)) revert();\n}";
        assert!(run(src).is_empty());
    }

    #[test]
    fn transfer_is_not_reported() {
        let src = "function pay(address payable to) external {\n  to.transfer(1 ether);\n}";
        assert!(run(src).is_empty());
    }
}
