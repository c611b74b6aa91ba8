use crate::rules::Category;
use crate::unit::Span;
use serde::{Deserialize, Serialize};

/// One confirmed vulnerability finding, ordered and numbered by the
/// deduplicator. `evidence` is the exact raw-source slice covered by `span`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// 1-based rank in the deterministic (line, category, column) order.
    pub id: usize,
    pub category: Category,
    pub span: Span,
    pub evidence: String,
    /// In (0, 1]; raised by corroborating signals, lowered by mitigating ones.
    pub confidence: f64,
    pub message: String,
}

impl Finding {
    pub fn location(&self) -> String {
        format!("{}:{}", self.span.line, self.span.column)
    }
}

/// A rule-emitted candidate prior to deduplication. Identical to `Finding`
/// except that no identifier has been assigned yet.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub category: Category,
    pub span: Span,
    pub evidence: String,
    pub confidence: f64,
    pub message: String,
}

impl Candidate {
    pub fn into_finding(self, id: usize) -> Finding {
        Finding {
            id,
            category: self.category,
            span: self.span,
            evidence: self.evidence,
            confidence: self.confidence,
            message: self.message,
        }
    }
}
