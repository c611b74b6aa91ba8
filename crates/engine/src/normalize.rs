//! Source normalization pass.
//!
//! Blanks the contents of string literals and comments so that later pattern
//! checks cannot match inside them, while keeping the output byte-for-byte the
//! same length as the input. Newlines are always preserved, so every byte
//! offset and every (line, column) pair resolves identically in the raw and
//! normalized text.

use crate::error::ScanWarning;

const FILLER: u8 = b' ';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str(u8),
}

/// Returns the normalized text plus any recoverable conditions encountered.
///
/// An unterminated string or block comment at end of file is reported as a
/// warning and the remainder is left as ordinary code rather than failing the
/// scan. A newline inside a string literal terminates the literal; Solidity
/// does not allow raw newlines in strings, so the line after a malformed one
/// is scanned as code.
pub fn normalize(raw: &str) -> (String, Vec<ScanWarning>) {
    let bytes = raw.as_bytes();
    let mut out = bytes.to_vec();
    let mut warnings = Vec::new();

    let mut state = State::Code;
    let mut region_start_line = 1usize;
    let mut line = 1usize;
    let mut escaped = false;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            line += 1;
        }

        match state {
            State::Code => match b {
                b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'/' => {
                    state = State::LineComment;
                    out[i] = FILLER;
                    out[i + 1] = FILLER;
                    i += 2;
                    continue;
                }
                b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => {
                    state = State::BlockComment;
                    region_start_line = line;
                    out[i] = FILLER;
                    out[i + 1] = FILLER;
                    i += 2;
                    continue;
                }
                b'"' | b'\'' => {
                    state = State::Str(b);
                    region_start_line = line;
                    escaped = false;
                }
                _ => {}
            },
            State::LineComment => {
                if b == b'\n' {
                    state = State::Code;
                } else {
                    out[i] = FILLER;
                }
            }
            State::BlockComment => {
                if b == b'*' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
                    out[i] = FILLER;
                    out[i + 1] = FILLER;
                    state = State::Code;
                    i += 2;
                    continue;
                }
                if b != b'\n' {
                    out[i] = FILLER;
                }
            }
            State::Str(quote) => {
                if escaped {
                    escaped = false;
                    out[i] = FILLER;
                } else if b == b'\\' {
                    escaped = true;
                    out[i] = FILLER;
                } else if b == quote {
                    state = State::Code;
                } else if b == b'\n' {
                    // Malformed literal; resume scanning the next line as code.
                    state = State::Code;
                } else {
                    out[i] = FILLER;
                }
            }
        }
        i += 1;
    }

    match state {
        State::Str(_) => warnings.push(ScanWarning::UnterminatedString {
            line: region_start_line,
        }),
        State::BlockComment => warnings.push(ScanWarning::UnterminatedComment {
            line: region_start_line,
        }),
        _ => {}
    }

    // The blanking pass only ever rewrites ASCII bytes, so the output is
    // still valid UTF-8.
    let normalized = String::from_utf8(out).unwrap_or_else(|e| {
        String::from_utf8_lossy(e.as_bytes()).into_owned()
    });
    (normalized, warnings)
}
