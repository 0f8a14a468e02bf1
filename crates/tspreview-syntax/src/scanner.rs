//! Tokenizer for the TypeScript/TSX subset the parser understands.
//!
//! Keywords are scanned as `Identifier` tokens; the parser distinguishes them
//! by text (`is_identifier_text("export")`), since almost every TypeScript
//! keyword is contextual anyway.
//!
//! Template literals are scanned as a single token including their `${}`
//! substitutions. Regular expressions are only recognized on request
//! (`re_scan_slash_token`), because `/` is ambiguous without parser context.

use std::sync::Arc;

use bitflags::bitflags;

use crate::syntax_kind::SyntaxKind;

bitflags! {
    /// Flags describing the current token.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct TokenFlags: u8 {
        /// A line terminator occurred between the previous token and this one.
        const PRECEDING_LINE_BREAK = 1 << 0;
        /// A string, template, comment or regex ran into the end of input.
        const UNTERMINATED = 1 << 1;
        /// A numeric literal used `_` separators.
        const CONTAINS_SEPARATOR = 1 << 2;
    }
}

/// Saved scanner position for speculative parsing.
#[derive(Clone, Debug)]
pub struct ScannerSnapshot {
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    token_flags: TokenFlags,
}

pub struct ScannerState {
    text: Arc<str>,
    pos: usize,
    token_start: usize,
    token: SyntaxKind,
    token_value: String,
    token_flags: TokenFlags,
}

impl ScannerState {
    pub fn new(text: Arc<str>) -> Self {
        ScannerState {
            text,
            pos: 0,
            token_start: 0,
            token: SyntaxKind::Unknown,
            token_value: String::new(),
            token_flags: TokenFlags::empty(),
        }
    }

    #[inline]
    pub fn source_text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn source_arc(&self) -> Arc<str> {
        Arc::clone(&self.text)
    }

    #[inline]
    pub fn get_token(&self) -> SyntaxKind {
        self.token
    }

    #[inline]
    pub fn get_token_pos(&self) -> u32 {
        self.token_start as u32
    }

    #[inline]
    pub fn get_token_end(&self) -> u32 {
        self.pos as u32
    }

    /// Cooked value of the current token (identifier name, unescaped string).
    #[inline]
    pub fn get_token_value_ref(&self) -> &str {
        &self.token_value
    }

    /// Raw source text of the current token.
    pub fn get_token_text(&self) -> &str {
        self.text.get(self.token_start..self.pos).unwrap_or("")
    }

    #[inline]
    pub fn get_token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    /// Byte at `pos`, if any.
    #[inline]
    pub fn byte_at(&self, pos: usize) -> Option<u8> {
        self.text.as_bytes().get(pos).copied()
    }

    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Move the scan position. The next `scan()` starts at `pos`.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.text.len());
        self.token_start = self.pos;
    }

    pub fn save_state(&self) -> ScannerSnapshot {
        ScannerSnapshot {
            pos: self.pos,
            token_start: self.token_start,
            token: self.token,
            token_value: self.token_value.clone(),
            token_flags: self.token_flags,
        }
    }

    pub fn restore_state(&mut self, snapshot: ScannerSnapshot) {
        self.pos = snapshot.pos;
        self.token_start = snapshot.token_start;
        self.token = snapshot.token;
        self.token_value = snapshot.token_value;
        self.token_flags = snapshot.token_flags;
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    /// Skip whitespace and comments starting at `pos`; returns the new offset
    /// and whether a line break was crossed.
    pub fn skip_trivia_from(&self, mut pos: usize) -> (usize, bool) {
        let bytes = self.text.as_bytes();
        let mut line_break = false;
        while let Some(&b) = bytes.get(pos) {
            match b {
                b'\n' | b'\r' => {
                    line_break = true;
                    pos += 1;
                }
                b' ' | b'\t' | 0x0b | 0x0c => pos += 1,
                b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                    pos = match memchr::memchr(b'\n', &bytes[pos..]) {
                        Some(offset) => pos + offset,
                        None => bytes.len(),
                    };
                }
                b'/' if bytes.get(pos + 1) == Some(&b'*') => {
                    let body = &bytes[pos + 2..];
                    let close = memchr::memmem::find(body, b"*/");
                    let end = close.map_or(bytes.len(), |offset| pos + 2 + offset + 2);
                    if memchr::memchr2(b'\n', b'\r', &bytes[pos..end]).is_some() {
                        line_break = true;
                    }
                    pos = end;
                }
                0xc2..=0xf4 => {
                    // Non-ASCII whitespace (NBSP, BOM, line/paragraph separators).
                    let Some(ch) = self.text.get(pos..).and_then(|s| s.chars().next()) else {
                        break;
                    };
                    if ch == '\u{2028}' || ch == '\u{2029}' {
                        line_break = true;
                    } else if !(ch.is_whitespace() || ch == '\u{feff}') {
                        break;
                    }
                    pos += ch.len_utf8();
                }
                _ => break,
            }
        }
        (pos, line_break)
    }

    // =========================================================================
    // Tokens
    // =========================================================================

    pub fn scan(&mut self) -> SyntaxKind {
        let (pos, line_break) = self.skip_trivia_from(self.pos);
        self.pos = pos;
        self.token_start = pos;
        self.token_value.clear();
        self.token_flags = if line_break {
            TokenFlags::PRECEDING_LINE_BREAK
        } else {
            TokenFlags::empty()
        };

        let Some(b) = self.byte_at(pos) else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match b {
            b'"' | b'\'' => self.scan_string(b),
            b'`' => self.scan_template(),
            b'0'..=b'9' => self.scan_number(),
            b'.' if self.byte_at(pos + 1).is_some_and(|c| c.is_ascii_digit()) => self.scan_number(),
            b'#' if self.byte_at(pos + 1).is_some_and(is_identifier_start_byte) => {
                self.pos += 1;
                self.scan_identifier_rest();
                SyntaxKind::PrivateIdentifier
            }
            _ if is_identifier_start_byte(b) => {
                self.scan_identifier_rest();
                SyntaxKind::Identifier
            }
            _ if b >= 0x80 => {
                if self.peek_char().is_some_and(char::is_alphabetic) {
                    self.scan_identifier_rest();
                    SyntaxKind::Identifier
                } else {
                    self.pos += self.peek_char().map_or(1, char::len_utf8);
                    SyntaxKind::Unknown
                }
            }
            _ => self.scan_punctuation(b),
        };
        self.token
    }

    /// Re-scan a `/` or `/=` token as a regular expression literal.
    pub fn re_scan_slash_token(&mut self) -> SyntaxKind {
        if !matches!(
            self.token,
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken
        ) {
            return self.token;
        }
        let bytes = self.text.as_bytes();
        let mut pos = self.token_start + 1;
        let mut in_class = false;
        loop {
            match bytes.get(pos) {
                None | Some(b'\n') | Some(b'\r') => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    break;
                }
                Some(b'\\') => pos += 2,
                Some(b'[') => {
                    in_class = true;
                    pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    pos += 1;
                }
                Some(b'/') if !in_class => {
                    pos += 1;
                    break;
                }
                Some(_) => pos += 1,
            }
        }
        while bytes.get(pos).is_some_and(|b| b.is_ascii_alphanumeric()) {
            pos += 1;
        }
        self.pos = pos.min(bytes.len());
        self.token_value = self.get_token_text().to_string();
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    fn peek_char(&self) -> Option<char> {
        self.text.get(self.pos..).and_then(|s| s.chars().next())
    }

    fn scan_identifier_rest(&mut self) {
        let start = self.token_start;
        loop {
            match self.byte_at(self.pos) {
                Some(b) if is_identifier_part_byte(b) => self.pos += 1,
                Some(b) if b >= 0x80 => match self.peek_char() {
                    Some(ch) if ch.is_alphanumeric() => self.pos += ch.len_utf8(),
                    _ => break,
                },
                _ => break,
            }
        }
        let value_start = if self.byte_at(start) == Some(b'#') {
            start + 1
        } else {
            start
        };
        self.token_value = self
            .text
            .get(value_start..self.pos)
            .unwrap_or("")
            .to_string();
    }

    fn scan_number(&mut self) -> SyntaxKind {
        let bytes = self.text.as_bytes();
        let mut pos = self.pos;
        let radix_prefix = bytes.get(pos) == Some(&b'0')
            && matches!(
                bytes.get(pos + 1),
                Some(b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
            );
        if radix_prefix {
            pos += 2;
            while bytes
                .get(pos)
                .is_some_and(|b| b.is_ascii_hexdigit() || *b == b'_')
            {
                pos += 1;
            }
        } else {
            while bytes
                .get(pos)
                .is_some_and(|b| b.is_ascii_digit() || *b == b'_')
            {
                pos += 1;
            }
            if bytes.get(pos) == Some(&b'.') {
                pos += 1;
                while bytes
                    .get(pos)
                    .is_some_and(|b| b.is_ascii_digit() || *b == b'_')
                {
                    pos += 1;
                }
            }
            if matches!(bytes.get(pos), Some(b'e' | b'E')) {
                let mut exp = pos + 1;
                if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                    exp += 1;
                }
                if bytes.get(exp).is_some_and(u8::is_ascii_digit) {
                    pos = exp;
                    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
                        pos += 1;
                    }
                }
            }
        }
        let kind = if bytes.get(pos) == Some(&b'n') {
            pos += 1;
            SyntaxKind::BigIntLiteral
        } else {
            SyntaxKind::NumericLiteral
        };
        self.pos = pos;
        let text = self.get_token_text();
        let separated = text.contains('_');
        let value = text.replace('_', "");
        if separated {
            self.token_flags |= TokenFlags::CONTAINS_SEPARATOR;
        }
        self.token_value = value;
        kind
    }

    fn scan_string(&mut self, quote: u8) -> SyntaxKind {
        self.pos += 1;
        let mut value = String::new();
        loop {
            let Some(b) = self.byte_at(self.pos) else {
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            };
            if b == quote {
                self.pos += 1;
                break;
            }
            match b {
                b'\\' => {
                    self.pos += 1;
                    self.scan_escape(&mut value);
                }
                b'\n' | b'\r' => {
                    self.token_flags |= TokenFlags::UNTERMINATED;
                    break;
                }
                _ => {
                    let Some(ch) = self.peek_char() else {
                        break;
                    };
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        self.token_value = value;
        SyntaxKind::StringLiteral
    }

    /// Scan a whole template literal. Substitutions are skipped, keeping
    /// track of nested braces, strings, templates and comments.
    fn scan_template(&mut self) -> SyntaxKind {
        self.pos += 1;
        let mut value = String::new();
        let mut has_substitutions = false;
        loop {
            let Some(b) = self.byte_at(self.pos) else {
                self.token_flags |= TokenFlags::UNTERMINATED;
                break;
            };
            match b {
                b'`' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    self.scan_escape(&mut value);
                }
                b'$' if self.byte_at(self.pos + 1) == Some(b'{') => {
                    has_substitutions = true;
                    self.pos = self.skip_template_substitution(self.pos + 2);
                }
                _ => {
                    let Some(ch) = self.peek_char() else {
                        break;
                    };
                    value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
        self.token_value = value;
        if has_substitutions {
            SyntaxKind::TemplateLiteral
        } else {
            SyntaxKind::NoSubstitutionTemplateLiteral
        }
    }

    /// Skip from just after `${` to just after the matching `}`.
    fn skip_template_substitution(&self, mut pos: usize) -> usize {
        let bytes = self.text.as_bytes();
        let mut depth = 1u32;
        while let Some(&b) = bytes.get(pos) {
            match b {
                b'{' => {
                    depth += 1;
                    pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    pos += 1;
                    if depth == 0 {
                        return pos;
                    }
                }
                b'"' | b'\'' => pos = skip_quoted(bytes, pos),
                b'`' => pos = self.skip_nested_template(pos + 1),
                b'/' if matches!(bytes.get(pos + 1), Some(b'/' | b'*')) => {
                    pos = self.skip_trivia_from(pos).0;
                }
                _ => pos += 1,
            }
        }
        bytes.len()
    }

    fn skip_nested_template(&self, mut pos: usize) -> usize {
        let bytes = self.text.as_bytes();
        while let Some(&b) = bytes.get(pos) {
            match b {
                b'`' => return pos + 1,
                b'\\' => pos += 2,
                b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                    pos = self.skip_template_substitution(pos + 2);
                }
                _ => pos += 1,
            }
        }
        bytes.len()
    }

    /// Decode one escape sequence; `self.pos` is just after the backslash.
    fn scan_escape(&mut self, out: &mut String) {
        let Some(b) = self.byte_at(self.pos) else {
            return;
        };
        self.pos += 1;
        match b {
            b'n' => out.push('\n'),
            b't' => out.push('\t'),
            b'r' => out.push('\r'),
            b'b' => out.push('\u{8}'),
            b'f' => out.push('\u{c}'),
            b'v' => out.push('\u{b}'),
            b'0' if !self.byte_at(self.pos).is_some_and(|c| c.is_ascii_digit()) => {
                out.push('\0');
            }
            b'x' => {
                if let Some(ch) = self.scan_hex_digits(2) {
                    out.push(ch);
                }
            }
            b'u' => {
                if self.byte_at(self.pos) == Some(b'{') {
                    let close = self.text[self.pos..].find('}').map(|i| self.pos + i);
                    if let Some(close) = close {
                        let digits = &self.text[self.pos + 1..close];
                        if let Some(ch) = u32::from_str_radix(digits, 16)
                            .ok()
                            .and_then(char::from_u32)
                        {
                            out.push(ch);
                        }
                        self.pos = close + 1;
                    }
                } else if let Some(ch) = self.scan_hex_digits(4) {
                    out.push(ch);
                }
            }
            // Line continuation.
            b'\r' => {
                if self.byte_at(self.pos) == Some(b'\n') {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            _ => {
                // Identity escape; re-decode in case it is multi-byte.
                self.pos -= 1;
                if let Some(ch) = self.peek_char() {
                    out.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    fn scan_hex_digits(&mut self, count: usize) -> Option<char> {
        let digits = self.text.get(self.pos..self.pos + count)?;
        let code = u32::from_str_radix(digits, 16).ok()?;
        self.pos += count;
        char::from_u32(code)
    }

    fn scan_punctuation(&mut self, b: u8) -> SyntaxKind {
        let next = self.byte_at(self.pos + 1);
        let next2 = self.byte_at(self.pos + 2);
        let (kind, len) = match b {
            b'{' => (SyntaxKind::OpenBraceToken, 1),
            b'}' => (SyntaxKind::CloseBraceToken, 1),
            b'(' => (SyntaxKind::OpenParenToken, 1),
            b')' => (SyntaxKind::CloseParenToken, 1),
            b'[' => (SyntaxKind::OpenBracketToken, 1),
            b']' => (SyntaxKind::CloseBracketToken, 1),
            b';' => (SyntaxKind::SemicolonToken, 1),
            b',' => (SyntaxKind::CommaToken, 1),
            b':' => (SyntaxKind::ColonToken, 1),
            b'~' => (SyntaxKind::TildeToken, 1),
            b'@' => (SyntaxKind::AtToken, 1),
            b'#' => (SyntaxKind::HashToken, 1),
            b'.' if next == Some(b'.') && next2 == Some(b'.') => (SyntaxKind::DotDotDotToken, 3),
            b'.' => (SyntaxKind::DotToken, 1),
            b'?' => match (next, next2) {
                (Some(b'.'), c) if !c.is_some_and(|c| c.is_ascii_digit()) => {
                    (SyntaxKind::QuestionDotToken, 2)
                }
                (Some(b'?'), Some(b'=')) => (SyntaxKind::QuestionQuestionEqualsToken, 3),
                (Some(b'?'), _) => (SyntaxKind::QuestionQuestionToken, 2),
                _ => (SyntaxKind::QuestionToken, 1),
            },
            b'=' => match (next, next2) {
                (Some(b'='), Some(b'=')) => (SyntaxKind::EqualsEqualsEqualsToken, 3),
                (Some(b'='), _) => (SyntaxKind::EqualsEqualsToken, 2),
                (Some(b'>'), _) => (SyntaxKind::EqualsGreaterThanToken, 2),
                _ => (SyntaxKind::EqualsToken, 1),
            },
            b'!' => match (next, next2) {
                (Some(b'='), Some(b'=')) => (SyntaxKind::ExclamationEqualsEqualsToken, 3),
                (Some(b'='), _) => (SyntaxKind::ExclamationEqualsToken, 2),
                _ => (SyntaxKind::ExclamationToken, 1),
            },
            b'+' => match next {
                Some(b'+') => (SyntaxKind::PlusPlusToken, 2),
                Some(b'=') => (SyntaxKind::PlusEqualsToken, 2),
                _ => (SyntaxKind::PlusToken, 1),
            },
            b'-' => match next {
                Some(b'-') => (SyntaxKind::MinusMinusToken, 2),
                Some(b'=') => (SyntaxKind::MinusEqualsToken, 2),
                _ => (SyntaxKind::MinusToken, 1),
            },
            b'*' => match (next, next2) {
                (Some(b'*'), Some(b'=')) => (SyntaxKind::AsteriskAsteriskEqualsToken, 3),
                (Some(b'*'), _) => (SyntaxKind::AsteriskAsteriskToken, 2),
                (Some(b'='), _) => (SyntaxKind::AsteriskEqualsToken, 2),
                _ => (SyntaxKind::AsteriskToken, 1),
            },
            b'/' => match next {
                Some(b'=') => (SyntaxKind::SlashEqualsToken, 2),
                _ => (SyntaxKind::SlashToken, 1),
            },
            b'%' => match next {
                Some(b'=') => (SyntaxKind::PercentEqualsToken, 2),
                _ => (SyntaxKind::PercentToken, 1),
            },
            b'<' => match (next, next2) {
                (Some(b'<'), Some(b'=')) => (SyntaxKind::LessThanLessThanEqualsToken, 3),
                (Some(b'<'), _) => (SyntaxKind::LessThanLessThanToken, 2),
                (Some(b'='), _) => (SyntaxKind::LessThanEqualsToken, 2),
                _ => (SyntaxKind::LessThanToken, 1),
            },
            // `>` is always a single token; the expression parser joins
            // adjacent `>`/`=` tokens so type argument lists can close `>>`.
            b'>' => (SyntaxKind::GreaterThanToken, 1),
            b'&' => match (next, next2) {
                (Some(b'&'), Some(b'=')) => (SyntaxKind::AmpersandAmpersandEqualsToken, 3),
                (Some(b'&'), _) => (SyntaxKind::AmpersandAmpersandToken, 2),
                (Some(b'='), _) => (SyntaxKind::AmpersandEqualsToken, 2),
                _ => (SyntaxKind::AmpersandToken, 1),
            },
            b'|' => match (next, next2) {
                (Some(b'|'), Some(b'=')) => (SyntaxKind::BarBarEqualsToken, 3),
                (Some(b'|'), _) => (SyntaxKind::BarBarToken, 2),
                (Some(b'='), _) => (SyntaxKind::BarEqualsToken, 2),
                _ => (SyntaxKind::BarToken, 1),
            },
            b'^' => match next {
                Some(b'=') => (SyntaxKind::CaretEqualsToken, 2),
                _ => (SyntaxKind::CaretToken, 1),
            },
            _ => (SyntaxKind::Unknown, 1),
        };
        self.pos += len;
        kind
    }
}

#[inline]
pub fn is_identifier_start_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

#[inline]
pub fn is_identifier_part_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Skip a quoted string starting at the opening quote; returns the offset
/// after the closing quote (or the line end for unterminated strings).
fn skip_quoted(bytes: &[u8], start: usize) -> usize {
    let quote = bytes[start];
    let mut pos = start + 1;
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'\\' => pos += 2,
            b'\n' => return pos,
            _ if b == quote => return pos + 1,
            _ => pos += 1,
        }
    }
    bytes.len()
}

/// Numeric value of a numeric literal's cooked text (separators removed).
pub fn parse_numeric_literal(text: &str) -> f64 {
    let lower = text.get(..2).map(str::to_ascii_lowercase);
    let radix = match lower.as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => 10,
    };
    if radix != 10 {
        return u64::from_str_radix(&text[2..], radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    // Legacy octal (`017`) is rare in declarations; parse as decimal.
    text.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
#[path = "../tests/scanner_tests.rs"]
mod scanner_tests;
