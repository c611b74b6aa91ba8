//! Lexical span index over normalized text.
//!
//! The scanner deliberately stops short of an AST: rules work on a flat token
//! stream plus a cheap structural pass (function bodies, loop bodies) derived
//! from brace matching. Because the normalizer has already blanked strings and
//! comments, braces and keywords seen here are always real code.

use crate::unit::SourceUnit;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    Punct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Splits normalized text into identifier, number, and punctuation tokens
/// with byte spans. Whitespace (including filler bytes) is skipped; non-ASCII
/// bytes are skipped as well since no trigger token contains them.
pub fn tokenize(normalized: &str) -> Vec<Token> {
    let bytes = normalized.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if is_ident_start(b) {
            let start = i;
            while i < bytes.len() && is_ident_continue(bytes[i]) {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Ident,
                start,
                end: i,
            });
        } else if b.is_ascii_digit() {
            let start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
            {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number,
                start,
                end: i,
            });
        } else if b.is_ascii_whitespace() || !b.is_ascii() {
            i += 1;
        } else {
            tokens.push(Token {
                kind: TokenKind::Punct,
                start: i,
                end: i + 1,
            });
            i += 1;
        }
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Function,
    Modifier,
    Constructor,
}

/// One function-like declaration: its header slice and, when present, the
/// byte range of the brace-delimited body (exclusive of the braces).
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub kind: BlockKind,
    pub name: String,
    pub start_line: usize,
    /// Keyword through the byte before the body `{` (or the trailing `;`).
    pub header: Range<usize>,
    pub body: Option<Range<usize>>,
}

/// One `for`/`while` loop: keyword offset, parenthesized header, body range.
#[derive(Debug, Clone)]
pub struct LoopInfo {
    pub keyword: Range<usize>,
    pub start_line: usize,
    /// Content between the header parentheses, if well-formed.
    pub condition: Option<Range<usize>>,
    pub body: Option<Range<usize>>,
}

/// Structural index built once per scan and shared read-only by every rule.
pub struct Structure {
    pub functions: Vec<FunctionInfo>,
    pub loops: Vec<LoopInfo>,
}

impl Structure {
    pub fn build(unit: &SourceUnit) -> Self {
        let normalized = unit.normalized();
        let tokens = tokenize(normalized);
        let mut functions = Vec::new();
        let mut loops = Vec::new();

        for (idx, token) in tokens.iter().enumerate() {
            if token.kind != TokenKind::Ident {
                continue;
            }
            match token.text(normalized) {
                "function" | "modifier" | "constructor" => {
                    if let Some(info) = parse_function(unit, normalized, &tokens, idx) {
                        functions.push(info);
                    }
                }
                "for" | "while" => {
                    if let Some(info) = parse_loop(unit, normalized, &tokens, idx) {
                        loops.push(info);
                    }
                }
                _ => {}
            }
        }

        Self { functions, loops }
    }

    /// The innermost function whose body contains `offset`.
    pub fn function_containing(&self, offset: usize) -> Option<&FunctionInfo> {
        self.functions
            .iter()
            .filter(|f| {
                f.body
                    .as_ref()
                    .is_some_and(|b| b.contains(&offset))
            })
            .min_by_key(|f| f.body.as_ref().map(|b| b.end - b.start).unwrap_or(usize::MAX))
    }
}

fn parse_function(
    unit: &SourceUnit,
    normalized: &str,
    tokens: &[Token],
    idx: usize,
) -> Option<FunctionInfo> {
    let keyword = tokens[idx];
    let kind = match keyword.text(normalized) {
        "function" => BlockKind::Function,
        "modifier" => BlockKind::Modifier,
        "constructor" => BlockKind::Constructor,
        _ => return None,
    };

    let name = if kind == BlockKind::Constructor {
        "constructor".to_string()
    } else {
        let next = tokens.get(idx + 1)?;
        if next.kind != TokenKind::Ident {
            return None;
        }
        next.text(normalized).to_string()
    };

    // A `function` keyword must be followed by `name (`; this filters out
    // function-typed variable declarations well enough for a heuristic pass.
    let bytes = normalized.as_bytes();
    let mut i = keyword.end;
    let mut body = None;
    let mut header_end = normalized.len();
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                let close = match_brace(bytes, i)?;
                body = Some(i + 1..close);
                header_end = i;
                break;
            }
            b';' => {
                header_end = i;
                break;
            }
            _ => i += 1,
        }
    }

    let (start_line, _) = unit.line_col(keyword.start);
    Some(FunctionInfo {
        kind,
        name,
        start_line,
        header: keyword.start..header_end,
        body,
    })
}

fn parse_loop(
    unit: &SourceUnit,
    normalized: &str,
    tokens: &[Token],
    idx: usize,
) -> Option<LoopInfo> {
    let keyword = tokens[idx];
    let bytes = normalized.as_bytes();

    let open_paren = (keyword.end..bytes.len()).find(|&i| !bytes[i].is_ascii_whitespace())?;
    if bytes[open_paren] != b'(' {
        // `while` of a do/while tail or malformed input; skip.
        return None;
    }
    let close_paren = match_paren(bytes, open_paren)?;

    let mut body = None;
    let mut i = close_paren + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => {
                let close = match_brace(bytes, i)?;
                body = Some(i + 1..close);
                break;
            }
            b';' => {
                // Empty-bodied loop.
                body = Some(close_paren + 1..i);
                break;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => {
                // Single-statement body: runs to the terminating semicolon.
                let end = (i..bytes.len()).find(|&j| bytes[j] == b';')?;
                body = Some(i..end);
                break;
            }
        }
    }

    let (start_line, _) = unit.line_col(keyword.start);
    Some(LoopInfo {
        keyword: keyword.start..keyword.end,
        start_line,
        condition: Some(open_paren + 1..close_paren),
        body,
    })
}

fn match_brace(bytes: &[u8], open: usize) -> Option<usize> {
    match_delim(bytes, open, b'{', b'}')
}

fn match_paren(bytes: &[u8], open: usize) -> Option<usize> {
    match_delim(bytes, open, b'(', b')')
}

fn match_delim(bytes: &[u8], open: usize, open_ch: u8, close_ch: u8) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        if b == open_ch {
            depth += 1;
        } else if b == close_ch {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}
