//! Classic reentrancy: an external value transfer followed by a storage write
//! in the same function body, with no guard toggled before the call.

use super::{candidate_for_line, Category};
use crate::finding::Candidate;
use crate::lex::Structure;
use crate::unit::SourceUnit;

const VALUE_TRANSFER_MARKERS: [&str; 4] = [".call{", ".call(", ".send(", ".transfer("];

pub struct ReentrancyRule;

impl ReentrancyRule {
    pub fn check(&self, unit: &SourceUnit, structure: &Structure) -> Vec<Candidate> {
        let normalized = unit.normalized();
        let mut candidates = Vec::new();

        for function in &structure.functions {
            let Some(body) = function.body.clone() else {
                continue;
            };
            let header = &normalized[function.header.clone()];
            if header.contains("nonReentrant") {
                continue;
            }

            let body_lines = body_lines(unit, body.start, body.end);

            // Lock toggled before the transfer disarms the pattern.
            let lock_line = body_lines
                .iter()
                .position(|(_, _, l)| is_lock_acquire(l));

            for (call_idx, (_, call_start, call_line)) in body_lines.iter().enumerate() {
                if !is_value_transfer(call_line) {
                    continue;
                }
                if lock_line.is_some_and(|lock| lock < call_idx) {
                    continue;
                }

                for (_, _, write_line) in body_lines.iter().skip(call_idx + 1) {
                    if !is_storage_write(write_line) {
                        continue;
                    }
                    let mut confidence: f64 = 0.65;
                    if write_line.contains('[') {
                        confidence += 0.15;
                    }
                    if call_line.contains(".call{") || call_line.contains(".call(") {
                        confidence += 0.1;
                    }
                    candidates.push(candidate_for_line(
                        unit,
                        Category::Reentrancy,
                        *call_start,
                        call_line,
                        confidence.min(0.95),
                        format!(
                            "Function '{}' makes an external value transfer and then writes \
                             storage ('{}'). Untrusted code can reenter before the state is \
                             finalized; apply checks-effects-interactions or a reentrancy guard.",
                            function.name,
                            write_line.trim()
                        ),
                    ));
                    break;
                }
            }
        }

        candidates
    }
}

fn body_lines(unit: &SourceUnit, start: usize, end: usize) -> Vec<(usize, usize, &str)> {
    unit.normalized_lines()
        .filter(|(_, line_start, line)| *line_start >= start && line_start + line.len() <= end)
        .collect()
}

fn is_value_transfer(line: &str) -> bool {
    VALUE_TRANSFER_MARKERS.iter().any(|m| line.contains(m))
}

fn is_lock_acquire(line: &str) -> bool {
    if !line.contains("= true") {
        return false;
    }
    let lhs = line.split('=').next().unwrap_or("");
    let lhs = lhs.to_ascii_lowercase();
    lhs.contains("lock") || lhs.contains("entered") || lhs.contains("mutex")
}

/// Assignment whose left side looks like contract state rather than a local
/// declaration: mapping index writes, member writes, or a bare lowercase
/// identifier without a type keyword in front.
fn is_storage_write(line: &str) -> bool {
    let trimmed = line.trim_start();
    for ty in [
        "uint", "int", "bool", "address", "bytes", "string ", "mapping",
    ] {
        if trimmed.starts_with(ty) {
            return false;
        }
    }
    let Some(eq) = find_assignment_eq(line) else {
        return false;
    };
    let lhs = line[..eq].trim_end().trim_end_matches(['+', '-', '*', '/']);
    if lhs.contains('[') && lhs.contains(']') {
        return true;
    }
    if lhs.contains('.') {
        return !lhs.starts_with("msg.") && !lhs.starts_with("block.") && !lhs.starts_with("tx.");
    }
    lhs.rsplit(char::is_whitespace)
        .next()
        .and_then(|id| id.chars().next())
        .map(|c| c.is_ascii_lowercase() || c == '_')
        .unwrap_or(false)
        && !lhs.contains('(')
        && !trimmed.starts_with("require")
        && !trimmed.starts_with("emit")
        && !trimmed.starts_with("return")
}

/// Position of an `=` that is an assignment, not part of a comparison or
/// arrow. Compound assignments (`+=`, `-=`, ...) count.
fn find_assignment_eq(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'=' {
            continue;
        }
        let prev = i.checked_sub(1).map(|p| bytes[p]);
        let next = bytes.get(i + 1).copied();
        if next == Some(b'=') || next == Some(b'>') {
            return None;
        }
        if matches!(prev, Some(b'=') | Some(b'!') | Some(b'<') | Some(b'>')) {
            return None;
        }
        return Some(i);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::Structure;

    fn run(src: &str) -> Vec<Candidate> {
        let unit = SourceUnit::new(src);
        let structure = Structure::build(&unit);
        ReentrancyRule.check(&unit, &structure)
    }

    const VULNERABLE: &str = r#"
contract Vault {
    mapping(address => uint256) balances;

    function withdraw(uint256 amount) external {
        require(balances[msg.sender] >= amount);
        (bool success, ) = msg.sender.call{value: amount}("");
        require(success);
        balances[msg.sender] -= amount;
    }
}
"#;

    #[test]
    fn flags_state_write_after_transfer() {
        let candidates = run(VULNERABLE);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].span.line, 7);
        assert!(candidates[0].confidence > 0.8);
    }

    #[test]
    fn corroborated_confidence_stays_capped() {
        // Mapping write plus a .call transfer stacks both bumps.
        let candidates = run(VULNERABLE);
        assert!((candidates[0].confidence - 0.9).abs() < 1e-9);
        assert!(candidates[0].confidence <= 0.95);
    }

    #[test]
    fn checks_effects_interactions_is_clean() {
        let src = r#"
contract Vault {
    mapping(address => uint256) balances;

    function withdraw(uint256 amount) external {
        balances[msg.sender] -= amount;
        (bool success, ) = msg.sender.call{value: amount}("");
        require(success);
    }
}
"#;
        assert!(run(src).is_empty());
    }

    #[test]
    fn non_reentrant_modifier_suppresses() {
        let src = VULNERABLE.replace("external {", "external nonReentrant {");
        assert!(run(&src).is_empty());
    }

    #[test]
    fn manual_lock_before_call_suppresses() {
        let src = r#"
contract Vault {
    function withdraw(uint256 amount) external {
        locked = true;
        (bool success, ) = msg.sender.call{value: amount}("");
        balances[msg.sender] -= amount;
        locked = false;
    }
}
"#;
        assert!(run(src).is_empty());
    }
}
