//! The scan pipeline: normalize, index, run rules in parallel, deduplicate.

use crate::dedup::dedup_and_order;
use crate::error::{EngineError, ScanWarning};
use crate::finding::{Candidate, Finding};
use crate::lex::Structure;
use crate::rules::{Category, RuleSet};
use crate::summary::SourceSummary;
use crate::unit::SourceUnit;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Categories to run; defaults to the full catalogue.
    pub enabled: BTreeSet<Category>,
    /// Same-category candidates within this many lines collapse to one.
    pub dedup_line_window: usize,
    /// Sources larger than this are scanned as a prefix and marked truncated.
    pub max_source_bytes: usize,
    /// Wall-clock budget for one scan; overrun yields a partial result.
    pub deadline: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            enabled: Category::ALL.iter().copied().collect(),
            dedup_line_window: 3,
            max_source_bytes: 1 << 20,
            deadline: None,
        }
    }
}

/// Everything one scan produces. `truncated` is set whenever findings may be
/// incomplete (size ceiling or deadline); it is never silently dropped.
#[derive(Debug)]
pub struct ScanOutcome {
    pub findings: Vec<Finding>,
    pub warnings: Vec<ScanWarning>,
    pub truncated: bool,
    pub summary: SourceSummary,
}

pub struct ScanEngine {
    config: ScanConfig,
}

impl ScanEngine {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ScanConfig::default())
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn scan(&self, source: &str) -> Result<ScanOutcome, EngineError> {
        let started = Instant::now();
        let mut warnings = Vec::new();
        let mut truncated = false;

        let source = if source.len() > self.config.max_source_bytes {
            warn!(
                limit = self.config.max_source_bytes,
                actual = source.len(),
                "source exceeds size ceiling, scanning prefix"
            );
            warnings.push(ScanWarning::SizeCeilingExceeded {
                limit: self.config.max_source_bytes,
                actual: source.len(),
            });
            truncated = true;
            prefix_at_char_boundary(source, self.config.max_source_bytes)
        } else {
            source
        };

        let unit = SourceUnit::new(source);
        warnings.extend(unit.warnings().iter().cloned());
        let summary = SourceSummary::extract(&unit);

        if self.deadline_expired(started) {
            warnings.push(ScanWarning::DeadlineExpired { completed_rules: 0 });
            return Ok(ScanOutcome {
                findings: Vec::new(),
                warnings,
                truncated: true,
                summary,
            });
        }

        let structure = Structure::build(&unit);
        let rules = RuleSet::new(&self.config.enabled);
        debug!(rules = rules.len(), "running rule catalogue");

        let expired = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);
        let candidates: Vec<Candidate> = rules
            .rules()
            .par_iter()
            .flat_map(|rule| {
                if expired.load(Ordering::Relaxed) || self.deadline_expired(started) {
                    expired.store(true, Ordering::Relaxed);
                    return Vec::new();
                }
                let found = rule.check(&unit, &structure);
                completed.fetch_add(1, Ordering::Relaxed);
                debug!(rule = rule.category().name(), candidates = found.len(), "rule done");
                found
            })
            .collect();

        if expired.load(Ordering::Relaxed) {
            warnings.push(ScanWarning::DeadlineExpired {
                completed_rules: completed.load(Ordering::Relaxed),
            });
            truncated = true;
        }

        let findings = dedup_and_order(candidates, &structure, self.config.dedup_line_window);

        for finding in &findings {
            if finding.span.end > unit.len() || finding.span.start > finding.span.end {
                return Err(EngineError::Internal {
                    rule: finding.category.name(),
                    detail: format!(
                        "span {}..{} outside source of {} bytes",
                        finding.span.start,
                        finding.span.end,
                        unit.len()
                    ),
                });
            }
        }

        Ok(ScanOutcome {
            findings,
            warnings,
            truncated,
            summary,
        })
    }

    /// Caller-supplied bytes; invalid UTF-8 is converted lossily and noted.
    pub fn scan_bytes(&self, bytes: &[u8]) -> Result<ScanOutcome, EngineError> {
        match std::str::from_utf8(bytes) {
            Ok(text) => self.scan(text),
            Err(_) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                let mut outcome = self.scan(&text)?;
                outcome.warnings.insert(0, ScanWarning::InvalidUtf8);
                Ok(outcome)
            }
        }
    }

    fn deadline_expired(&self, started: Instant) -> bool {
        self.config
            .deadline
            .is_some_and(|d| started.elapsed() > d)
    }
}

fn prefix_at_char_boundary(source: &str, limit: usize) -> &str {
    let mut end = limit;
    while end > 0 && !source.is_char_boundary(end) {
        end -= 1;
    }
    &source[..end]
}
