//! Light contract metadata extraction for report headers.

use crate::unit::SourceUnit;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static PRAGMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pragma\s+solidity\s+([^;]+);").expect("static pattern"));

static LICENSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"//\s*SPDX-License-Identifier:\s*(\S+)").expect("static pattern")
});

static CONTRACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:contract|library|interface)\s+([A-Za-z_$][A-Za-z0-9_$]*)")
        .expect("static pattern")
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub solidity_version: Option<String>,
    pub license: Option<String>,
    pub contracts: Vec<String>,
}

impl SourceSummary {
    /// Declarations are read from normalized text so a `contract` keyword in
    /// a comment does not count; the SPDX tag lives in a comment, so it is
    /// read from the raw text.
    pub fn extract(unit: &SourceUnit) -> Self {
        let normalized = unit.normalized();
        Self {
            solidity_version: PRAGMA
                .captures(normalized)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string()),
            license: LICENSE
                .captures(unit.raw())
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
            contracts: CONTRACT
                .captures_iter(normalized)
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .collect(),
        }
    }
}
