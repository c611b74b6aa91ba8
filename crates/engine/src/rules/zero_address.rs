//! Address-typed parameters stored without a zero-address guard. Sending
//! ownership or funds to `address(0)` is unrecoverable, so setters are
//! expected to reject it first.

use super::{candidate_for_line, Category};
use crate::finding::Candidate;
use crate::lex::Structure;
use crate::unit::SourceUnit;
use regex::Regex;
use std::sync::LazyLock;

static ADDRESS_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"address(?:\s+payable)?\s+([A-Za-z_$][A-Za-z0-9_$]*)").expect("static pattern")
});

static SENSITIVE_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(owner|admin|recipient|treasury|beneficiary|operator)").expect("static pattern")
});

pub struct MissingZeroAddressCheckRule;

impl MissingZeroAddressCheckRule {
    pub fn check(&self, unit: &SourceUnit, structure: &Structure) -> Vec<Candidate> {
        let normalized = unit.normalized();
        let mut candidates = Vec::new();

        for function in &structure.functions {
            let Some(body) = function.body.clone() else {
                continue;
            };
            let header = &normalized[function.header.clone()];
            // Parameters only; `returns (address)` clauses are cut off.
            let params = header.split("returns").next().unwrap_or(header);

            for capture in ADDRESS_PARAM.captures_iter(params) {
                let Some(param) = capture.get(1).map(|m| m.as_str()) else {
                    continue;
                };

                let Ok(assignment) = Regex::new(&format!(
                    r"([A-Za-z_$][A-Za-z0-9_$.\[\]]*)\s*=\s*{}\s*;",
                    regex::escape(param)
                )) else {
                    continue;
                };

                let body_text = &normalized[body.clone()];
                let Some(m) = assignment.find(body_text) else {
                    continue;
                };
                let assign_offset = body.start + m.start();

                if is_guarded(&body_text[..m.start()], param) {
                    continue;
                }

                let (line_no, _) = unit.line_col(assign_offset);
                let Some(line_start) = unit.line_offset(line_no) else {
                    continue;
                };
                let line = line_of(normalized, line_start);

                let target = assignment
                    .captures(body_text)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str())
                    .unwrap_or("");
                let mut confidence = 0.6;
                if SENSITIVE_TARGET.is_match(target) {
                    confidence += 0.15;
                }

                candidates.push(candidate_for_line(
                    unit,
                    Category::MissingZeroAddressCheck,
                    line_start,
                    line,
                    confidence,
                    format!(
                        "Parameter '{param}' is stored into '{target}' in '{}' without \
                         rejecting the zero address. Add `require({param} != address(0))` \
                         before the assignment.",
                        function.name
                    ),
                ));
            }
        }

        candidates
    }
}

fn is_guarded(body_before_assignment: &str, param: &str) -> bool {
    body_before_assignment
        .lines()
        .any(|l| l.contains("address(0)") && l.contains(param))
}

fn line_of(normalized: &str, line_start: usize) -> &str {
    let rest = &normalized[line_start..];
    rest.split('\n').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Structure;

    fn run(src: &str) -> Vec<Candidate> {
        let unit = SourceUnit::new(src);
        let structure = Structure::build(&unit);
        MissingZeroAddressCheckRule.check(&unit, &structure)
    }

    #[test]
    fn flags_unguarded_owner_setter() {
        let src = "function setOwner(address newOwner) external {\n  owner = newOwner;\n}";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].span.line, 2);
        assert!(candidates[0].confidence > 0.7);
        assert!(candidates[0].message.contains("'newOwner'"));
    }

    #[test]
    fn guarded_setter_is_clean() {
        let src = "function setOwner(address newOwner) external {\n  require(newOwner != address(0), \"zero addr\");\n  owner = newOwner;\n}";
        assert!(run(src).is_empty());
    }

    #[test]
    fn constructor_assignment_is_flagged() {
        let src = "constructor(address _treasury) {\n  treasury = _treasury;\n}";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn unstored_parameter_is_clean() {
        let src = "function ping(address who) external view returns (bool) {\n  return who != owner;\n}";
        assert!(run(src).is_empty());
    }
}
