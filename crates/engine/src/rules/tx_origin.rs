//! `tx.origin` used for an access-control decision. The transaction origin
//! identifies the outermost EOA, not the caller, so any contract in between
//! can relay a victim's transaction through the check.

use super::{candidate_for_line, Category};
use crate::finding::Candidate;
use crate::lex::{BlockKind, Structure};
use crate::unit::SourceUnit;

pub struct TxOriginAuthRule;

impl TxOriginAuthRule {
    pub fn check(&self, unit: &SourceUnit, structure: &Structure) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (_, line_start, line) in unit.normalized_lines() {
            let Some(pos) = line.find("tx.origin") else {
                continue;
            };

            let has_comparison = line.contains("==") || line.contains("!=");
            let guarded = line.contains("require(")
                || line.contains("require (")
                || line.contains("if(")
                || line.contains("if (")
                || line.contains("revert");
            let in_modifier = structure
                .function_containing(line_start + pos)
                .is_some_and(|f| f.kind == BlockKind::Modifier);

            let confidence = if has_comparison && guarded {
                0.9
            } else if in_modifier && has_comparison {
                0.85
            } else if in_modifier {
                0.7
            } else {
                // Bare tx.origin outside any guard is not an auth decision.
                continue;
            };

            candidates.push(candidate_for_line(
                unit,
                Category::TxOriginAuth,
                line_start,
                line,
                confidence,
                "Access control compares tx.origin instead of msg.sender; a phishing \
                 contract can relay a privileged user's transaction through this check. \
                 Compare msg.sender instead."
                    .to_string(),
            ));
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Structure;

    fn run(src: &str) -> Vec<Candidate> {
        let unit = SourceUnit::new(src);
        let structure = Structure::build(&unit);
        TxOriginAuthRule.check(&unit, &structure)
    }

    #[test]
    fn flags_require_comparison_in_modifier() {
        let src = r#"
contract Owned {
    address owner;
    modifier onlyOwner() {
        require(tx.origin == owner, "not owner");
        _;
    }
}
"#;
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].span.line, 5);
        assert!(candidates[0].evidence.contains("tx.origin == owner"));
    }

    #[test]
    fn flags_if_guard_in_function() {
        let src = "function sweep() external {\n  if (tx.origin != owner) revert();\n  pay();\n}";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].span.line, 2);
    }

    #[test]
    fn ignores_bare_logging_use() {
        let src = "function log() external {\n  emit Caller(tx.origin);\n}";
        assert!(run(src).is_empty());
    }

    #[test]
    fn ignores_msg_sender_auth() {
        let src = "modifier onlyOwner() { require(msg.sender == owner); _; }";
        assert!(run(src).is_empty());
    }
}
