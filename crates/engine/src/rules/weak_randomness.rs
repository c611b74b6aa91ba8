//! "Random" values derived from predictable on-chain state. Block fields are
//! miner-influenced and publicly visible, so anything derived from them can
//! be predicted or gamed.

use super::{candidate_for_line, Category};
use crate::finding::Candidate;
use crate::lex::Structure;
use crate::unit::SourceUnit;
use regex::Regex;
use std::sync::LazyLock;

static PREDICTABLE_SOURCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(block\.timestamp|block\.difficulty|block\.prevrandao|block\.number|blockhash|now)\b",
    )
    .expect("static pattern")
});

static RANDOM_NAME_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\w*(random|seed|lottery|winner|jackpot|lucky)\w*\b").expect("static pattern")
});

pub struct WeakRandomnessRule;

impl WeakRandomnessRule {
    pub fn check(&self, unit: &SourceUnit, _structure: &Structure) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for (_, line_start, line) in unit.normalized_lines() {
            let Some(source) = PREDICTABLE_SOURCE.find(line) else {
                continue;
            };

            // A block field on its own is ordinary time/height logic; only
            // flag it when the line is visibly deriving entropy from it.
            let hashed = line.contains("keccak256")
                || line.contains("sha256")
                || line.contains("abi.encodePacked");
            let modulo = line.contains('%');
            let named_random = RANDOM_NAME_HINT.is_match(line);

            let confidence = if hashed {
                0.9
            } else if modulo {
                0.8
            } else if named_random {
                0.65
            } else {
                continue;
            };

            candidates.push(candidate_for_line(
                unit,
                Category::WeakRandomness,
                line_start,
                line,
                confidence,
                format!(
                    "Randomness is derived from {}, which miners and other contracts \
                     can predict or influence. Use a commit-reveal scheme or a \
                     verifiable randomness oracle instead.",
                    source.as_str()
                ),
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
        WeakRandomnessRule.check(&unit, &structure)
    }

    #[test]
    fn flags_hashed_timestamp() {
        let src = "uint winner = uint(keccak256(abi.encodePacked(block.timestamp, msg.sender)));";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert!((candidates[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn flags_blockhash_modulo() {
        let src = "uint pick = uint(blockhash(block.number - 1)) % entries;";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn plain_deadline_check_is_clean() {
        let src = "require(block.timestamp >= deadline, \"too early\");";
        assert!(run(src).is_empty());
    }

    #[test]
    fn named_seed_assignment_is_flagged_low() {
        let src = "seed = block.timestamp;";
        let candidates = run(src);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].confidence < 0.7);
    }
}
