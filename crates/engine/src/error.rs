use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Recoverable conditions attached to a scan result. None of these abort the
/// scan; the normalizer degrades to best-effort and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanWarning {
    /// A string literal was still open at end of file. The remainder of the
    /// file was treated as ordinary code.
    UnterminatedString { line: usize },
    /// A block comment was still open at end of file.
    UnterminatedComment { line: usize },
    /// Input bytes were not valid UTF-8 and were converted lossily.
    InvalidUtf8,
    /// The source exceeded the configured size ceiling and only a prefix was
    /// scanned.
    SizeCeilingExceeded { limit: usize, actual: usize },
    /// The scan deadline expired before every rule ran; findings cover only
    /// the rules that completed.
    DeadlineExpired { completed_rules: usize },
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnterminatedString { line } => {
                write!(f, "unterminated string literal starting at line {line}")
            }
            Self::UnterminatedComment { line } => {
                write!(f, "unterminated block comment starting at line {line}")
            }
            Self::InvalidUtf8 => write!(f, "input was not valid UTF-8; converted lossily"),
            Self::SizeCeilingExceeded { limit, actual } => {
                write!(f, "source of {actual} bytes exceeds ceiling of {limit}; scanned prefix only")
            }
            Self::DeadlineExpired { completed_rules } => {
                write!(f, "scan deadline expired after {completed_rules} rule(s)")
            }
        }
    }
}

/// Non-recoverable engine failure. Rule checkers are pure pattern matches and
/// should never produce this; it exists so that a defect surfaces loudly
/// instead of being folded into a partial result.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("internal scanner error in rule '{rule}': {detail}")]
    Internal { rule: &'static str, detail: String },
}

/// CVSS validation failure. Raised before any score is computed, naming the
/// offending metric, and never downgraded to a warning: a wrong severity
/// number is worse than no number.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CvssError {
    #[error("unsupported CVSS version prefix '{0}', expected 'CVSS:3.1'")]
    UnsupportedVersion(String),
    #[error("malformed vector component '{0}', expected 'KEY:VALUE'")]
    MalformedComponent(String),
    #[error("unknown metric key '{0}'")]
    UnknownMetric(String),
    #[error("metric '{metric}' repeated in vector")]
    DuplicateMetric { metric: String },
    #[error("invalid value '{value}' for metric '{metric}'")]
    InvalidValue { metric: String, value: String },
    #[error("required base metric '{0}' is missing")]
    MissingMetric(&'static str),
}
