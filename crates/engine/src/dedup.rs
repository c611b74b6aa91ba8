//! Candidate merging and deterministic ordering.
//!
//! Rules run independently and may report the same underlying problem more
//! than once (or two rules may overlap within a function). Candidates of the
//! same category are merged when they fall inside a proximity window or the
//! same function body, keeping the highest-confidence member. The survivors
//! are sorted by (line, category name, column) and numbered 1..n, so the same
//! input always yields the same IDs.

use crate::finding::{Candidate, Finding};
use crate::lex::Structure;
use crate::rules::Category;
use std::collections::BTreeMap;

pub fn dedup_and_order(
    candidates: Vec<Candidate>,
    structure: &Structure,
    line_window: usize,
) -> Vec<Finding> {
    let mut by_category: BTreeMap<Category, Vec<Candidate>> = BTreeMap::new();
    for c in candidates {
        by_category.entry(c.category).or_default().push(c);
    }

    let mut representatives = Vec::new();
    for (_, mut group) in by_category {
        group.sort_by_key(|c| (c.span.line, c.span.column, c.span.start));

        let mut cluster: Vec<Candidate> = Vec::new();
        for candidate in group {
            let same_cluster = cluster.last().is_some_and(|prev| {
                candidate.span.line.saturating_sub(prev.span.line) <= line_window
                    || same_function(structure, prev, &candidate)
            });
            if same_cluster {
                cluster.push(candidate);
            } else {
                if let Some(best) = take_best(cluster) {
                    representatives.push(best);
                }
                cluster = vec![candidate];
            }
        }
        if let Some(best) = take_best(cluster) {
            representatives.push(best);
        }
    }

    representatives.sort_by(|a, b| {
        (a.span.line, a.category.name(), a.span.column)
            .cmp(&(b.span.line, b.category.name(), b.span.column))
    });

    representatives
        .into_iter()
        .enumerate()
        .map(|(i, c)| c.into_finding(i + 1))
        .collect()
}

fn same_function(structure: &Structure, a: &Candidate, b: &Candidate) -> bool {
    let fa = structure.function_containing(a.span.start);
    let fb = structure.function_containing(b.span.start);
    match (fa, fb) {
        (Some(fa), Some(fb)) => fa.header.start == fb.header.start,
        _ => false,
    }
}

/// Highest confidence wins; ties go to the earliest span so re-runs are
/// stable.
fn take_best(cluster: Vec<Candidate>) -> Option<Candidate> {
    cluster.into_iter().reduce(|best, c| {
        if c.confidence > best.confidence {
            c
        } else {
            best
        }
    })
}
