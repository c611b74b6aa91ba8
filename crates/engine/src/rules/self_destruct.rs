//! Presence of `selfdestruct` (or the legacy `suicide` alias) anywhere in the
//! contract. Reported unconditionally; whether the call is reachable or
//! guarded is for the reviewer to decide.

use super::Category;
use crate::finding::Candidate;
use crate::lex::{tokenize, Structure, TokenKind};
use crate::unit::SourceUnit;

pub struct SelfDestructRule;

impl SelfDestructRule {
    pub fn check(&self, unit: &SourceUnit, structure: &Structure) -> Vec<Candidate> {
        let normalized = unit.normalized();
        let tokens = tokenize(normalized);
        let mut candidates = Vec::new();

        for (idx, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Ident {
                continue;
            }
            let text = token.text(normalized);
            if text != "selfdestruct" && text != "suicide" {
                continue;
            }
            let followed_by_call = tokens
                .get(idx + 1)
                .is_some_and(|t| t.kind == TokenKind::Punct && t.text(normalized) == "(");
            if !followed_by_call {
                continue;
            }

            let end = statement_end(normalized, token.end);
            let span = unit.span(token.start, end);
            let in_function = structure
                .function_containing(token.start)
                .map(|f| f.name.clone());
            let message = match in_function {
                Some(name) => format!(
                    "Function '{name}' can destroy the contract via {text}; all funds \
                     are forwarded and the code is removed permanently. Verify the call \
                     is strictly access-controlled or remove it."
                ),
                None => format!(
                    "{text} is present in the source; the contract can be destroyed \
                     permanently. Verify the call is strictly access-controlled."
                ),
            };

            candidates.push(Candidate {
                category: Category::SelfDestructUsage,
                span,
                evidence: unit.evidence(&span).to_string(),
                confidence: 0.95,
                message,
            });
        }

        candidates
    }
}

/// End offset of the call expression: through the matching close paren, or to
/// end of line for malformed input.
fn statement_end(normalized: &str, after_ident: usize) -> usize {
    let bytes = normalized.as_bytes();
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(after_ident) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            b'\n' if depth == 0 => return i,
            _ => {}
        }
    }
    normalized.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Structure;

    fn run(src: &str) -> Vec<Candidate> {
        let unit = SourceUnit::new(src);
        let structure = Structure::build(&unit);
        SelfDestructRule.check(&unit, &structure)
    }

    #[test]
    fn flags_selfdestruct_call() {
        let src = "function kill() external {\n  selfdestruct(payable(owner));\n}";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].span.line, 2);
        assert_eq!(candidates[0].evidence, "selfdestruct(payable(owner))");
        assert!(candidates[0].message.contains("'kill'"));
    }

    #[test]
    fn flags_legacy_suicide_alias() {
        let src = "function kill() external { suicide(owner); }";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].evidence.starts_with("suicide("));
    }

    #[test]
    fn ignores_identifier_containing_the_word() {
        let src = "function f() external { selfdestructed = true; emit Note(selfdestruct_count); }";
        assert!(run(src).is_empty());
    }

    #[test]
    fn ignores_mention_in_comment() {
        let src = "// calls selfdestruct(owner) when done\nfunction f() external { tick(); }";
        assert!(run(src).is_empty());
    }
}
