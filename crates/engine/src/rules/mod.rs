//! The fixed vulnerability rule catalogue.
//!
//! Each category has exactly one checker: a pure function over the normalized
//! text and the structural index, emitting zero or more candidates. Checkers
//! share no mutable state, which is what lets the engine run them in parallel.
//! The catalogue is a closed enum rather than a registry keyed by name, so a
//! missing dispatch arm is a compile error, not a silently skipped rule.

pub mod call_in_loop;
pub mod reentrancy;
pub mod self_destruct;
pub mod tx_origin;
pub mod unbounded_loop;
pub mod unchecked_call;
pub mod weak_randomness;
pub mod zero_address;

use crate::cvss::{
    AttackComplexity, AttackVector, CvssVector, Impact, PrivilegesRequired, Scope, UserInteraction,
};
use crate::finding::Candidate;
use crate::lex::Structure;
use crate::unit::{SourceUnit, Span};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    Reentrancy,
    TxOriginAuth,
    UncheckedExternalCall,
    UnboundedLoop,
    SelfDestructUsage,
    ExternalCallInLoop,
    WeakRandomness,
    MissingZeroAddressCheck,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Reentrancy,
        Category::TxOriginAuth,
        Category::UncheckedExternalCall,
        Category::UnboundedLoop,
        Category::SelfDestructUsage,
        Category::ExternalCallInLoop,
        Category::WeakRandomness,
        Category::MissingZeroAddressCheck,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reentrancy => "Reentrancy",
            Self::TxOriginAuth => "TxOriginAuth",
            Self::UncheckedExternalCall => "UncheckedExternalCall",
            Self::UnboundedLoop => "UnboundedLoop",
            Self::SelfDestructUsage => "SelfDestructUsage",
            Self::ExternalCallInLoop => "ExternalCallInLoop",
            Self::WeakRandomness => "WeakRandomness",
            Self::MissingZeroAddressCheck => "MissingZeroAddressCheck",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    /// Default base vector used when the caller supplies no CVSS metrics for
    /// a finding of this category. Temporal and environmental groups are left
    /// absent; a human reviewer refines these.
    pub fn suggested_vector(&self) -> CvssVector {
        let v = |ac, pr, ui, c, i, a| CvssVector {
            attack_vector: AttackVector::Network,
            attack_complexity: ac,
            privileges_required: pr,
            user_interaction: ui,
            scope: Scope::Unchanged,
            confidentiality: c,
            integrity: i,
            availability: a,
            temporal: None,
            environmental: None,
        };
        use AttackComplexity as AC;
        use Impact as I;
        use PrivilegesRequired as PR;
        use UserInteraction as UI;
        match self {
            Self::Reentrancy => v(AC::High, PR::None, UI::None, I::None, I::High, I::High),
            Self::TxOriginAuth => v(AC::High, PR::None, UI::Required, I::None, I::High, I::None),
            Self::UncheckedExternalCall => v(AC::Low, PR::None, UI::None, I::None, I::Low, I::None),
            Self::UnboundedLoop => v(AC::High, PR::None, UI::None, I::None, I::None, I::Low),
            Self::SelfDestructUsage => v(AC::High, PR::High, UI::None, I::None, I::None, I::Low),
            Self::ExternalCallInLoop => v(AC::Low, PR::None, UI::None, I::None, I::None, I::High),
            Self::WeakRandomness => v(AC::Low, PR::None, UI::None, I::None, I::Low, I::None),
            Self::MissingZeroAddressCheck => {
                v(AC::High, PR::Low, UI::None, I::None, I::Low, I::None)
            }
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One checker per category, dispatched exhaustively.
pub enum Rule {
    Reentrancy(reentrancy::ReentrancyRule),
    TxOriginAuth(tx_origin::TxOriginAuthRule),
    UncheckedExternalCall(unchecked_call::UncheckedExternalCallRule),
    UnboundedLoop(unbounded_loop::UnboundedLoopRule),
    SelfDestructUsage(self_destruct::SelfDestructRule),
    ExternalCallInLoop(call_in_loop::ExternalCallInLoopRule),
    WeakRandomness(weak_randomness::WeakRandomnessRule),
    MissingZeroAddressCheck(zero_address::MissingZeroAddressCheckRule),
}

impl Rule {
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Reentrancy => Self::Reentrancy(reentrancy::ReentrancyRule),
            Category::TxOriginAuth => Self::TxOriginAuth(tx_origin::TxOriginAuthRule),
            Category::UncheckedExternalCall => {
                Self::UncheckedExternalCall(unchecked_call::UncheckedExternalCallRule)
            }
            Category::UnboundedLoop => Self::UnboundedLoop(unbounded_loop::UnboundedLoopRule),
            Category::SelfDestructUsage => {
                Self::SelfDestructUsage(self_destruct::SelfDestructRule)
            }
            Category::ExternalCallInLoop => {
                Self::ExternalCallInLoop(call_in_loop::ExternalCallInLoopRule)
            }
            Category::WeakRandomness => Self::WeakRandomness(weak_randomness::WeakRandomnessRule),
            Category::MissingZeroAddressCheck => {
                Self::MissingZeroAddressCheck(zero_address::MissingZeroAddressCheckRule)
            }
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Reentrancy(_) => Category::Reentrancy,
            Self::TxOriginAuth(_) => Category::TxOriginAuth,
            Self::UncheckedExternalCall(_) => Category::UncheckedExternalCall,
            Self::UnboundedLoop(_) => Category::UnboundedLoop,
            Self::SelfDestructUsage(_) => Category::SelfDestructUsage,
            Self::ExternalCallInLoop(_) => Category::ExternalCallInLoop,
            Self::WeakRandomness(_) => Category::WeakRandomness,
            Self::MissingZeroAddressCheck(_) => Category::MissingZeroAddressCheck,
        }
    }

    pub fn check(&self, unit: &SourceUnit, structure: &Structure) -> Vec<Candidate> {
        match self {
            Self::Reentrancy(r) => r.check(unit, structure),
            Self::TxOriginAuth(r) => r.check(unit, structure),
            Self::UncheckedExternalCall(r) => r.check(unit, structure),
            Self::UnboundedLoop(r) => r.check(unit, structure),
            Self::SelfDestructUsage(r) => r.check(unit, structure),
            Self::ExternalCallInLoop(r) => r.check(unit, structure),
            Self::WeakRandomness(r) => r.check(unit, structure),
            Self::MissingZeroAddressCheck(r) => r.check(unit, structure),
        }
    }
}

/// Immutable rule-set value constructed once per scan invocation. There is no
/// process-wide registry; two concurrent scans hold independent rule sets.
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(enabled: &BTreeSet<Category>) -> Self {
        let rules = Category::ALL
            .iter()
            .filter(|c| enabled.contains(c))
            .map(|&c| Rule::for_category(c))
            .collect();
        Self { rules }
    }

    pub fn all() -> Self {
        Self::new(&Category::ALL.iter().copied().collect())
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Span covering the non-whitespace content of one line; the usual location
/// a line-based checker reports.
pub(crate) fn trimmed_line_span(unit: &SourceUnit, line_start: usize, line: &str) -> Span {
    let lead = line.len() - line.trim_start().len();
    let content_end = line.trim_end().len();
    unit.span(line_start + lead, line_start + content_end.max(lead))
}

pub(crate) fn candidate_for_line(
    unit: &SourceUnit,
    category: Category,
    line_start: usize,
    line: &str,
    confidence: f64,
    message: String,
) -> Candidate {
    let span = trimmed_line_span(unit, line_start, line);
    Candidate {
        category,
        span,
        evidence: unit.evidence(&span).to_string(),
        confidence,
        message,
    }
}

/// External value-transfer / low-level call markers shared by several rules.
pub(crate) const EXTERNAL_CALL_MARKERS: [&str; 5] =
    [".call(", ".call{", ".send(", ".transfer(", ".delegatecall("];

pub(crate) fn contains_external_call(text: &str) -> bool {
    EXTERNAL_CALL_MARKERS.iter().any(|m| text.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_covers_every_category() {
        let set = RuleSet::all();
        assert_eq!(set.len(), Category::ALL.len());
        for (rule, category) in set.rules().iter().zip(Category::ALL) {
            assert_eq!(rule.category(), category);
        }
    }

    #[test]
    fn disabled_categories_are_excluded() {
        let enabled: BTreeSet<_> = [Category::Reentrancy, Category::SelfDestructUsage]
            .into_iter()
            .collect();
        let set = RuleSet::new(&enabled);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn category_names_round_trip() {
        for c in Category::ALL {
            assert_eq!(Category::from_name(c.name()), Some(c));
        }
        assert_eq!(Category::from_name("NotACategory"), None);
    }
}
