//! Immutable per-scan view of one contract source.
//!
//! A `SourceUnit` owns the raw text, the normalized text produced by the
//! blanking pass, and a line-start offset table for O(log n) offset to
//! (line, column) resolution. It is built once per scan invocation and
//! discarded afterwards; spans hand out byte ranges into it but never own it.

use crate::error::ScanWarning;
use crate::normalize::normalize;
use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` with its resolved 1-based position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

pub struct SourceUnit {
    raw: String,
    normalized: String,
    line_starts: Vec<usize>,
    warnings: Vec<ScanWarning>,
}

impl SourceUnit {
    pub fn new(raw: &str) -> Self {
        let (normalized, warnings) = normalize(raw);
        let mut line_starts = vec![0usize];
        for (i, b) in raw.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i + 1);
            }
        }
        Self {
            raw: raw.to_string(),
            normalized,
            line_starts,
            warnings,
        }
    }

    /// Accepts caller-supplied bytes that may not be valid UTF-8; conversion
    /// is lossy and surfaced as a warning rather than an error.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(s) => Self::new(s),
            Err(_) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                let mut unit = Self::new(&text);
                unit.warnings.insert(0, ScanWarning::InvalidUtf8);
                unit
            }
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Resolves a byte offset to a 1-based (line, column) pair.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line_idx + 1, offset - self.line_starts[line_idx] + 1)
    }

    /// Byte offset of the first character of a 1-based line.
    pub fn line_offset(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line.checked_sub(1)?).copied()
    }

    pub fn span(&self, start: usize, end: usize) -> Span {
        let (line, column) = self.line_col(start);
        Span {
            start,
            end,
            line,
            column,
        }
    }

    /// The matched slice of the *raw* text. Normalization preserves every
    /// offset, so a span found in normalized code resolves to the same bytes
    /// here.
    pub fn evidence(&self, span: &Span) -> &str {
        &self.raw[span.start..span.end]
    }

    /// Iterates 1-based line number, byte offset of the line start, and the
    /// normalized line content (without the trailing newline).
    pub fn normalized_lines(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        self.line_starts.iter().enumerate().map(move |(i, &start)| {
            let end = self
                .line_starts
                .get(i + 1)
                .map(|&next| next - 1)
                .unwrap_or(self.normalized.len());
            (i + 1, start, &self.normalized[start..end.max(start)])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_resolution_is_one_based() {
        let unit = SourceUnit::new("ab\ncd\nef");
        assert_eq!(unit.line_col(0), (1, 1));
        assert_eq!(unit.line_col(3), (2, 1));
        assert_eq!(unit.line_col(4), (2, 2));
        assert_eq!(unit.line_col(7), (3, 2));
    }

    #[test]
    fn line_col_round_trips_through_line_offset() {
        let unit = SourceUnit::new("first\nsecond line\nthird");
        for offset in [0, 3, 6, 10, 18, 22] {
            let (line, col) = unit.line_col(offset);
            let back = unit.line_offset(line).map(|o| o + col - 1);
            assert_eq!(back, Some(offset));
        }
    }

    #[test]
    fn evidence_matches_raw_slice() {
        let raw = "require(tx.origin == owner);";
        let unit = SourceUnit::new(raw);
        let pos = unit.normalized().find("tx.origin").expect("present");
        let span = unit.span(pos, pos + "tx.origin".len());
        assert_eq!(unit.evidence(&span), "tx.origin");
        assert_eq!(&raw[span.start..span.end], "tx.origin");
    }

    #[test]
    fn from_bytes_flags_invalid_utf8() {
        let unit = SourceUnit::from_bytes(&[0x66, 0x6f, 0xff, 0x6f]);
        assert_eq!(unit.warnings().first(), Some(&ScanWarning::InvalidUtf8));
    }

    #[test]
    fn normalized_lines_cover_whole_input() {
        let unit = SourceUnit::new("a\nbb\n\nccc");
        let lines: Vec<_> = unit.normalized_lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], (1, 0, "a"));
        assert_eq!(lines[2], (3, 5, ""));
        assert_eq!(lines[3], (4, 6, "ccc"));
    }
}
