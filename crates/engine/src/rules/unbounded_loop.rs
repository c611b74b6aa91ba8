//! Loops whose iteration bound is a dynamic collection length or an
//! unconstrained variable. Such loops can grow past the block gas limit and
//! permanently brick the function.

use super::Category;
use crate::finding::Candidate;
use crate::lex::{LoopInfo, Structure};
use crate::unit::SourceUnit;
use regex::Regex;
use std::sync::LazyLock;

static BOUND_IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[<>]=?\s*([A-Za-z_$][A-Za-z0-9_$.]*)").expect("static pattern")
});

pub struct UnboundedLoopRule;

impl UnboundedLoopRule {
    pub fn check(&self, unit: &SourceUnit, structure: &Structure) -> Vec<Candidate> {
        let normalized = unit.normalized();
        let mut candidates = Vec::new();

        for l in &structure.loops {
            let Some(cond_range) = l.condition.clone() else {
                continue;
            };
            let keyword = &normalized[l.keyword.clone()];
            let condition = if keyword == "for" {
                // Middle clause of `for (init; cond; post)`.
                normalized[cond_range.clone()]
                    .split(';')
                    .nth(1)
                    .unwrap_or("")
                    .to_string()
            } else {
                normalized[cond_range.clone()].to_string()
            };
            let condition = condition.trim();

            let verdict = classify(condition);
            let Some((confidence, reason)) = verdict else {
                continue;
            };

            let span = loop_header_span(unit, l, cond_range.end);
            candidates.push(Candidate {
                category: Category::UnboundedLoop,
                span,
                evidence: unit.evidence(&span).to_string(),
                confidence,
                message: format!(
                    "{reason}. If the bound grows unbounded the loop can exceed the \
                     block gas limit and the function becomes uncallable; cap the \
                     iteration count or process in batches."
                ),
            });
        }

        candidates
    }
}

fn classify(condition: &str) -> Option<(f64, &'static str)> {
    if condition.is_empty() || condition == "true" {
        return Some((0.8, "Loop has no terminating condition"));
    }
    if condition.contains(".length") {
        return Some((
            0.75,
            "Loop bound is the length of a dynamically sized collection",
        ));
    }
    let bound = BOUND_IDENT
        .captures(condition)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())?;
    if is_constant_name(bound) {
        return None;
    }
    Some((0.5, "Loop bound is a runtime variable with no visible cap"))
}

// SCREAMING_CASE names follow the Solidity constant convention.
fn is_constant_name(ident: &str) -> bool {
    ident.chars().any(|c| c.is_ascii_uppercase())
        && !ident.chars().any(|c| c.is_ascii_lowercase())
}

/// Span from the loop keyword through the closing parenthesis of its header.
fn loop_header_span(unit: &SourceUnit, l: &LoopInfo, cond_end: usize) -> crate::unit::Span {
    unit.span(l.keyword.start, cond_end + 1)
}
