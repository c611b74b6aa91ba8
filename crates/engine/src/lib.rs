//! Pattern-based vulnerability scanning for Solidity sources, with CVSS v3.1
//! scoring attached to every finding.
//!
//! The pipeline is deliberately lexical: sources are normalized (comments and
//! string literals blanked in place, so byte offsets survive), lightly indexed
//! into functions and loops, and then run through a closed catalogue of
//! pattern rules in parallel. Candidates are deduplicated into findings with
//! deterministic ordering and IDs, and [`report::ReportAssembler`] attaches a
//! CVSS assessment to each one.
//!
//! ```no_run
//! use solaudit_engine::engine::ScanEngine;
//! use solaudit_engine::report::ReportAssembler;
//!
//! # fn main() -> anyhow::Result<()> {
//! let source = std::fs::read_to_string("Vault.sol")?;
//! let outcome = ScanEngine::with_defaults().scan(&source)?;
//! let report = ReportAssembler::new().assemble(outcome);
//! println!("{}", report.to_markdown());
//! # Ok(())
//! # }
//! ```

pub mod cvss;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod finding;
pub mod lex;
pub mod normalize;
pub mod report;
pub mod rules;
pub mod summary;
pub mod unit;

pub use cvss::{CvssScore, CvssVector, SeverityBand};
pub use engine::{ScanConfig, ScanEngine, ScanOutcome};
pub use error::{CvssError, EngineError, ScanWarning};
pub use finding::Finding;
pub use report::{Report, ReportAssembler, ScoredFinding};
pub use rules::Category;
pub use summary::SourceSummary;
pub use unit::{SourceUnit, Span};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
