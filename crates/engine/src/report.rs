//! Report assembly: attach CVSS scores to findings and render.

use crate::cvss::{CvssScore, CvssVector, SeverityBand};
use crate::engine::ScanOutcome;
use crate::error::ScanWarning;
use crate::finding::Finding;
use crate::rules::Category;
use crate::summary::SourceSummary;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A finding paired with its CVSS assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredFinding {
    #[serde(flatten)]
    pub finding: Finding,
    pub cvss: CvssScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub summary: SourceSummary,
    pub findings: Vec<ScoredFinding>,
    pub warnings: Vec<ScanWarning>,
    pub truncated: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeverityCount {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

/// Turns a [`ScanOutcome`] into a [`Report`]. Every finding is scored with
/// its category's suggested vector unless the caller registered an override
/// for that category.
#[derive(Debug, Default)]
pub struct ReportAssembler {
    overrides: BTreeMap<Category, CvssVector>,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vector(mut self, category: Category, vector: CvssVector) -> Self {
        self.overrides.insert(category, vector);
        self
    }

    pub fn assemble(&self, outcome: ScanOutcome) -> Report {
        let findings = outcome
            .findings
            .into_iter()
            .map(|finding| {
                let vector = self
                    .overrides
                    .get(&finding.category)
                    .copied()
                    .unwrap_or_else(|| finding.category.suggested_vector());
                ScoredFinding {
                    cvss: vector.score(),
                    finding,
                }
            })
            .collect();
        Report {
            summary: outcome.summary,
            findings,
            warnings: outcome.warnings,
            truncated: outcome.truncated,
        }
    }
}

impl Report {
    pub fn count_by_severity(&self) -> SeverityCount {
        let mut count = SeverityCount::default();
        for f in &self.findings {
            match f.cvss.severity {
                SeverityBand::Critical => count.critical += 1,
                SeverityBand::High => count.high += 1,
                SeverityBand::Medium => count.medium += 1,
                SeverityBand::Low => count.low += 1,
                SeverityBand::None => count.none += 1,
            }
        }
        count
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Scan Report\n\n");

        md.push_str("## Summary\n\n");
        if let Some(version) = &self.summary.solidity_version {
            md.push_str(&format!("- Solidity version: {}\n", version));
        }
        if let Some(license) = &self.summary.license {
            md.push_str(&format!("- License: {}\n", license));
        }
        if !self.summary.contracts.is_empty() {
            md.push_str(&format!(
                "- Contracts: {}\n",
                self.summary.contracts.join(", ")
            ));
        }

        let count = self.count_by_severity();
        md.push_str(&format!("- Critical: {}\n", count.critical));
        md.push_str(&format!("- High: {}\n", count.high));
        md.push_str(&format!("- Medium: {}\n", count.medium));
        md.push_str(&format!("- Low: {}\n\n", count.low));

        if self.truncated {
            md.push_str("> Scan was truncated; findings may be incomplete.\n\n");
        }
        if !self.warnings.is_empty() {
            md.push_str("## Warnings\n\n");
            for warning in &self.warnings {
                md.push_str(&format!("- {}\n", warning));
            }
            md.push('\n');
        }

        if !self.findings.is_empty() {
            md.push_str("## Findings\n\n");
            for f in &self.findings {
                md.push_str(&format!(
                    "### {}. {} ({} {:.1})\n\n",
                    f.finding.id,
                    f.finding.category,
                    f.cvss.severity,
                    f.cvss.overall_score
                ));
                md.push_str(&format!("**Location:** {}\n", f.finding.location()));
                md.push_str(&format!(
                    "**Confidence:** {:.2}\n",
                    f.finding.confidence
                ));
                md.push_str(&format!("**Vector:** `{}`\n\n", f.cvss.vector_string));
                md.push_str(&format!("{}\n\n", f.finding.message));
                md.push_str(&format!("```\n{}\n```\n\n", f.finding.evidence));
            }
        }

        md
    }
}
