//! External calls lexically inside a loop body. One failing or gas-hungry
//! recipient can make the whole loop revert, a classic denial-of-service
//! shape for payout loops.

use super::{contains_external_call, Category, EXTERNAL_CALL_MARKERS};
use crate::finding::Candidate;
use crate::lex::Structure;
use crate::unit::SourceUnit;

pub struct ExternalCallInLoopRule;

impl ExternalCallInLoopRule {
    pub fn check(&self, unit: &SourceUnit, structure: &Structure) -> Vec<Candidate> {
        let normalized = unit.normalized();
        let mut candidates = Vec::new();

        for l in &structure.loops {
            let Some(body) = l.body.clone() else {
                continue;
            };
            let body_text = &normalized[body];
            if !contains_external_call(body_text) {
                continue;
            }

            let call_count: usize = EXTERNAL_CALL_MARKERS
                .iter()
                .map(|m| body_text.matches(m).count())
                .sum();
            let confidence = if call_count > 1 { 0.9 } else { 0.85 };

            // Reported at the loop's opening line; the loop is the unit that
            // reverts, not any single call inside it.
            let header_end = l.condition.clone().map(|c| c.end + 1).unwrap_or(l.keyword.end);
            let span = unit.span(l.keyword.start, header_end);
            candidates.push(Candidate {
                category: Category::ExternalCallInLoop,
                span,
                evidence: unit.evidence(&span).to_string(),
                confidence,
                message: format!(
                    "Loop body performs {call_count} external call(s); a single failing \
                     recipient reverts every iteration. Prefer a pull-payment pattern \
                     over pushing funds in a loop."
                ),
            });
        }

        candidates
    }
}
