//! Parser state: token cursor, diagnostics, speculative parsing, and the
//! balanced skipping used for function bodies and JSX.

use std::sync::Arc;

use tracing::trace;
use tspreview_common::{ByteSpan, DepthCounter, Diagnostic, RecursionProfile};

use crate::ast::SourceFile;
use crate::scanner::{ScannerSnapshot, ScannerState, is_identifier_part_byte, is_identifier_start_byte};
use crate::syntax_kind::{SyntaxKind, keyword_starts_expression};

/// Whether a file name enables JSX parsing.
pub fn file_allows_jsx(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    [".tsx", ".jsx", ".js", ".mjs", ".cjs"]
        .iter()
        .any(|ext| lower.ends_with(ext))
}

/// How `skip_balanced` interprets `/` and `<`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SkipMode {
    /// Statement and expression code: regex literals and JSX are recognized.
    Code,
    /// Type positions: `/` and `<` are plain punctuation.
    Type,
}

/// Token class remembered while skipping, for the regex/JSX heuristics.
#[derive(Clone, Copy, Debug)]
struct PrevToken {
    starts_expression: bool,
}

pub(crate) struct ParserSnapshot {
    scanner: ScannerSnapshot,
    current_token: SyntaxKind,
    prev_token_end: u32,
    diagnostics_len: usize,
    last_error_pos: Option<u32>,
}

pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) current_token: SyntaxKind,
    pub(crate) file_name: String,
    pub(crate) jsx: bool,
    pub(crate) nesting: DepthCounter,
    /// Inside the `extends` clause of a conditional type.
    pub(crate) in_conditional_extends: bool,
    prev_token_end: u32,
    diagnostics: Vec<Diagnostic>,
    last_error_pos: Option<u32>,
}

impl ParserState {
    pub fn new(file_name: String, source: String) -> Self {
        let jsx = file_allows_jsx(&file_name);
        let text: Arc<str> = Arc::from(source);
        ParserState {
            scanner: ScannerState::new(text),
            current_token: SyntaxKind::Unknown,
            file_name,
            jsx,
            nesting: DepthCounter::with_profile(RecursionProfile::ParserNesting),
            in_conditional_extends: false,
            prev_token_end: 0,
            diagnostics: Vec::new(),
            last_error_pos: None,
        }
    }

    /// Override JSX detection (`.vue`/`.svelte` script blocks are plain TS).
    pub fn with_jsx(mut self, jsx: bool) -> Self {
        self.jsx = jsx;
        self
    }

    pub fn parse_source_file(&mut self) -> SourceFile {
        self.next_token();
        let statements = self.parse_statement_list(false);
        trace!(
            file = %self.file_name,
            statements = statements.len(),
            diagnostics = self.diagnostics.len(),
            "parsed source file"
        );
        SourceFile {
            file_name: self.file_name.clone(),
            text: self.scanner.source_arc(),
            statements,
            jsx: self.jsx,
        }
    }

    pub fn get_diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    // =========================================================================
    // Token cursor
    // =========================================================================

    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.get_token_end();
        self.current_token = self.scanner.scan();
        self.current_token
    }

    #[inline]
    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.current_token == kind
    }

    #[inline]
    pub(crate) fn token_pos(&self) -> u32 {
        self.scanner.get_token_pos()
    }

    #[inline]
    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.get_token_end()
    }

    /// End offset of the last consumed token.
    #[inline]
    pub(crate) fn prev_end(&self) -> u32 {
        self.prev_token_end
    }

    /// Span from `start` to the end of the last consumed token.
    #[inline]
    pub(crate) fn span_from(&self, start: u32) -> ByteSpan {
        ByteSpan::new(start, self.prev_token_end.max(start))
    }

    #[inline]
    pub(crate) fn token_value(&self) -> &str {
        self.scanner.get_token_value_ref()
    }

    #[inline]
    pub(crate) fn has_preceding_line_break(&self) -> bool {
        self.scanner.has_preceding_line_break()
    }

    /// Current token is the word `text` (keywords scan as identifiers).
    #[inline]
    pub(crate) fn is_identifier_text(&self, text: &str) -> bool {
        self.current_token == SyntaxKind::Identifier && self.scanner.get_token_value_ref() == text
    }

    #[inline]
    pub(crate) fn is_identifier_or_keyword(&self) -> bool {
        self.current_token == SyntaxKind::Identifier
    }

    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_optional_identifier_text(&mut self, text: &str) -> bool {
        if self.is_identifier_text(text) {
            self.next_token();
            true
        } else {
            false
        }
    }

    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.parse_optional(kind) {
            return true;
        }
        self.parse_error_at_current_token(&format!("'{}' expected.", token_text(kind)));
        false
    }

    pub(crate) fn parse_expected_identifier_text(&mut self, text: &str) -> bool {
        if self.parse_optional_identifier_text(text) {
            return true;
        }
        self.parse_error_at_current_token(&format!("'{text}' expected."));
        false
    }

    /// `;`, or a position where automatic semicolon insertion applies.
    pub(crate) fn can_parse_semicolon(&self) -> bool {
        matches!(
            self.current_token,
            SyntaxKind::SemicolonToken | SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
        ) || self.has_preceding_line_break()
    }

    /// Consume a statement terminator. On failure, resynchronize at the next
    /// statement boundary.
    pub(crate) fn parse_semicolon(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return;
        }
        if self.can_parse_semicolon() {
            return;
        }
        self.parse_error_at_current_token("';' expected.");
        self.resync_after_error();
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    pub(crate) fn save(&self) -> ParserSnapshot {
        ParserSnapshot {
            scanner: self.scanner.save_state(),
            current_token: self.current_token,
            prev_token_end: self.prev_token_end,
            diagnostics_len: self.diagnostics.len(),
            last_error_pos: self.last_error_pos,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: ParserSnapshot) {
        self.scanner.restore_state(snapshot.scanner);
        self.current_token = snapshot.current_token;
        self.prev_token_end = snapshot.prev_token_end;
        self.diagnostics.truncate(snapshot.diagnostics_len);
        self.last_error_pos = snapshot.last_error_pos;
    }

    /// Run `f` and always rewind.
    pub(crate) fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let snapshot = self.save();
        let result = f(self);
        self.restore(snapshot);
        result
    }

    /// Run `f`; rewind if it returns `None` or reported a diagnostic.
    pub(crate) fn try_parse<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let snapshot = self.save();
        let diagnostics_before = self.diagnostics.len();
        match f(self) {
            Some(value) if self.diagnostics.len() == diagnostics_before => Some(value),
            _ => {
                self.restore(snapshot);
                None
            }
        }
    }

    /// Kind of the token after the current one.
    pub(crate) fn peek_token(&mut self) -> SyntaxKind {
        self.look_ahead(|p| p.next_token())
    }

    /// The next token is an identifier on the same line.
    pub(crate) fn next_is_identifier_on_same_line(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            p.is_identifier_or_keyword() && !p.has_preceding_line_break()
        })
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub(crate) fn parse_error_at(&mut self, start: u32, length: u32, message: &str) {
        // One error per position; cascades add no information.
        if self.last_error_pos == Some(start) {
            return;
        }
        self.last_error_pos = Some(start);
        self.diagnostics.push(Diagnostic::error(
            self.file_name.clone(),
            start,
            length,
            message,
        ));
    }

    pub(crate) fn parse_error_at_current_token(&mut self, message: &str) {
        let start = self.token_pos();
        let length = self.token_end().saturating_sub(start);
        self.parse_error_at(start, length, message);
    }

    /// Skip to the next statement boundary after a syntax error.
    pub(crate) fn resync_after_error(&mut self) {
        loop {
            match self.current_token {
                SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken => return,
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    return;
                }
                SyntaxKind::OpenBraceToken
                | SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken => self.skip_balanced(SkipMode::Code),
                _ => {
                    self.next_token();
                }
            }
            if self.has_preceding_line_break() {
                return;
            }
        }
    }

    // =========================================================================
    // Balanced skipping
    // =========================================================================

    /// Skip from an opening bracket through its matching closer, leaving the
    /// cursor on the following token.
    pub(crate) fn skip_balanced(&mut self, mode: SkipMode) {
        let mut depth = 0u32;
        let mut prev: Option<PrevToken> = None;
        loop {
            match self.current_token {
                SyntaxKind::EndOfFileToken => {
                    self.parse_error_at_current_token("'}' expected.");
                    return;
                }
                SyntaxKind::OpenBraceToken
                | SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken => depth += 1,
                SyntaxKind::CloseBraceToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.next_token();
                        return;
                    }
                }
                SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken
                    if mode == SkipMode::Code && prev.is_none_or(|t| t.starts_expression) =>
                {
                    self.current_token = self.scanner.re_scan_slash_token();
                }
                SyntaxKind::LessThanToken
                    if mode == SkipMode::Code
                        && self.jsx
                        && prev.is_none_or(|t| t.starts_expression)
                        && self.looks_like_jsx() =>
                {
                    self.skip_jsx_element();
                    prev = Some(PrevToken {
                        starts_expression: false,
                    });
                    continue;
                }
                _ => {}
            }
            prev = Some(self.classify_prev_token());
            self.next_token();
        }
    }

    fn classify_prev_token(&self) -> PrevToken {
        let starts_expression = if self.current_token == SyntaxKind::Identifier {
            keyword_starts_expression(self.token_value())
        } else {
            !self.current_token.ends_expression()
        };
        PrevToken { starts_expression }
    }

    // =========================================================================
    // JSX
    // =========================================================================

    /// At `<`: does a JSX element or fragment start here?
    ///
    /// `<T,>` and `<T extends U>` are generic arrow functions in `.tsx`.
    pub(crate) fn looks_like_jsx(&self) -> bool {
        let pos = self.token_end() as usize;
        match self.scanner.byte_at(pos) {
            Some(b'>') => true,
            Some(b) if is_identifier_start_byte(b) => {
                let name_end = self.scan_jsx_name(pos);
                let (after, _) = self.scanner.skip_trivia_from(name_end);
                if self.scanner.byte_at(after) == Some(b',') {
                    return false;
                }
                let rest = &self.scanner.source_text()[after.min(self.scanner.len())..];
                !(rest.starts_with("extends")
                    && rest
                        .as_bytes()
                        .get("extends".len())
                        .is_some_and(|b| b.is_ascii_whitespace()))
            }
            _ => false,
        }
    }

    /// Skip a JSX element starting at the current `<` token.
    pub(crate) fn skip_jsx_element(&mut self) {
        let start = self.token_pos() as usize;
        let end = self.skip_jsx_from(start);
        self.scanner.set_pos(end);
        self.next_token();
    }

    /// Character-level skip of the element whose `<` is at `lt`; returns the
    /// offset just past it. Embedded `{...}` expressions are skipped at the
    /// token level so strings, templates and nested JSX inside them work.
    fn skip_jsx_from(&mut self, lt: usize) -> usize {
        let len = self.scanner.len();
        if !self.nesting.enter() {
            self.parse_error_at(lt as u32, 1, "JSX nested too deeply.");
            return len;
        }
        let end = self.skip_jsx_from_inner(lt);
        self.nesting.leave();
        end
    }

    fn skip_jsx_from_inner(&mut self, lt: usize) -> usize {
        let len = self.scanner.len();
        let mut pos = self.scanner.skip_trivia_from(lt + 1).0;

        // Opening tag; fragments have no name.
        if self.scanner.byte_at(pos) != Some(b'>') {
            pos = self.scan_jsx_name(pos);
            loop {
                pos = self.scanner.skip_trivia_from(pos).0;
                match self.scanner.byte_at(pos) {
                    None => return len,
                    Some(b'/') if self.scanner.byte_at(pos + 1) == Some(b'>') => return pos + 2,
                    Some(b'>') => break,
                    Some(b'{') => pos = self.skip_jsx_embedded_expression(pos),
                    Some(b) if is_identifier_start_byte(b) => {
                        pos = self.scan_jsx_name(pos);
                        pos = self.scanner.skip_trivia_from(pos).0;
                        if self.scanner.byte_at(pos) == Some(b'=') {
                            pos = self.scanner.skip_trivia_from(pos + 1).0;
                            pos = match self.scanner.byte_at(pos) {
                                Some(quote @ (b'"' | b'\'')) => {
                                    let text = &self.scanner.source_text().as_bytes()[pos + 1..];
                                    match memchr::memchr(quote, text) {
                                        Some(offset) => pos + 1 + offset + 1,
                                        None => len,
                                    }
                                }
                                Some(b'{') => self.skip_jsx_embedded_expression(pos),
                                Some(b'<') => self.skip_jsx_from(pos),
                                _ => pos,
                            };
                        }
                    }
                    Some(_) => pos += 1,
                }
            }
        }
        pos += 1;

        // Children until the matching closing tag.
        loop {
            match self.scanner.byte_at(pos) {
                None => return len,
                Some(b'{') => pos = self.skip_jsx_embedded_expression(pos),
                Some(b'<') => {
                    let (after, _) = self.scanner.skip_trivia_from(pos + 1);
                    if self.scanner.byte_at(after) == Some(b'/') {
                        let text = &self.scanner.source_text().as_bytes()[after..];
                        return match memchr::memchr(b'>', text) {
                            Some(offset) => after + offset + 1,
                            None => len,
                        };
                    }
                    pos = self.skip_jsx_from(pos);
                }
                Some(_) => pos += 1,
            }
        }
    }

    /// Skip `{...}` inside JSX starting at the `{`; returns the offset after `}`.
    fn skip_jsx_embedded_expression(&mut self, brace: usize) -> usize {
        self.scanner.set_pos(brace);
        self.next_token();
        self.skip_balanced(SkipMode::Code);
        self.prev_end() as usize
    }

    /// JSX tag or attribute name: identifier characters plus `-`, `:` and `.`.
    fn scan_jsx_name(&self, mut pos: usize) -> usize {
        while let Some(b) = self.scanner.byte_at(pos) {
            if is_identifier_part_byte(b) || matches!(b, b'-' | b':' | b'.') || b >= 0x80 {
                pos += 1;
            } else {
                break;
            }
        }
        pos
    }
}

/// Display text of a punctuation token for diagnostics.
fn token_text(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::OpenBraceToken => "{",
        SyntaxKind::CloseBraceToken => "}",
        SyntaxKind::OpenParenToken => "(",
        SyntaxKind::CloseParenToken => ")",
        SyntaxKind::OpenBracketToken => "[",
        SyntaxKind::CloseBracketToken => "]",
        SyntaxKind::SemicolonToken => ";",
        SyntaxKind::CommaToken => ",",
        SyntaxKind::ColonToken => ":",
        SyntaxKind::LessThanToken => "<",
        SyntaxKind::GreaterThanToken => ">",
        SyntaxKind::EqualsToken => "=",
        SyntaxKind::EqualsGreaterThanToken => "=>",
        SyntaxKind::QuestionToken => "?",
        SyntaxKind::DotToken => ".",
        SyntaxKind::Identifier => "identifier",
        SyntaxKind::StringLiteral => "string literal",
        _ => "token",
    }
}
