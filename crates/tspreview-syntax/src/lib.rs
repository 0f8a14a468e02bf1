//! TypeScript/TSX syntax for the tspreview analyzer.
//!
//! - `scanner`: tokenizer over UTF-8 source text
//! - `syntax_kind`: token kinds
//! - `ast`: declaration-level syntax tree
//! - `parser`: recursive-descent parser producing `ast::SourceFile`

pub mod ast;
pub mod parser;
pub mod scanner;
pub mod syntax_kind;

use std::sync::Arc;

use ast::{Expression, StatementKind};

pub use ast::SourceFile;
pub use parser::{ParserState, file_allows_jsx};
pub use syntax_kind::SyntaxKind;
pub use tspreview_common::{ByteSpan, Diagnostic};

/// Parse `source` as the file `file_name`; JSX is enabled by extension.
pub fn parse_file(file_name: &str, source: &str) -> (SourceFile, Vec<Diagnostic>) {
    let mut parser = ParserState::new(file_name.to_string(), source.to_string());
    let file = parser.parse_source_file();
    (file, parser.into_diagnostics())
}

/// Parse a script block extracted from a single-file component. Script
/// blocks are TypeScript without JSX.
pub fn parse_script_block(file_name: &str, source: &str) -> (SourceFile, Vec<Diagnostic>) {
    let mut parser = ParserState::new(file_name.to_string(), source.to_string()).with_jsx(false);
    let file = parser.parse_source_file();
    (file, parser.into_diagnostics())
}

/// A standalone expression and the text its spans point into.
#[derive(Clone, Debug)]
pub struct ParsedExpression {
    pub text: Arc<str>,
    pub expr: Expression,
}

impl ParsedExpression {
    /// Source text of a sub-expression.
    pub fn source_of(&self, expr: &Expression) -> &str {
        expr.span.slice(&self.text)
    }
}

/// Parse `source` as a single expression (a serialized value, an `args`
/// literal). The text is parenthesized first so object literals are not
/// read as blocks.
pub fn parse_expression(source: &str) -> Result<ParsedExpression, Vec<Diagnostic>> {
    let wrapped = format!("({source}\n)");
    let mut parser = ParserState::new("expression.ts".to_string(), wrapped).with_jsx(false);
    let file = parser.parse_source_file();
    let diagnostics = parser.into_diagnostics();
    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }
    let text = file.text.clone();
    let mut statements = file.statements.into_iter();
    match (statements.next(), statements.next()) {
        (Some(statement), None) => match statement.kind {
            StatementKind::Expression(expr) => Ok(ParsedExpression { text, expr }),
            _ => Err(vec![not_an_expression(statement.span)]),
        },
        (first, _) => Err(vec![not_an_expression(
            first.map(|statement| statement.span).unwrap_or_default(),
        )]),
    }
}

fn not_an_expression(span: ByteSpan) -> Diagnostic {
    Diagnostic::error("expression.ts", span.start, span.len(), "expected a single expression")
}
