//! Tests for the tokenizer

use std::sync::Arc;

use super::*;

fn tokens(source: &str) -> Vec<(SyntaxKind, String)> {
    let mut scanner = ScannerState::new(Arc::from(source));
    let mut out = Vec::new();
    loop {
        let kind = scanner.scan();
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
        out.push((kind, scanner.get_token_text().to_string()));
    }
    out
}

fn kinds(source: &str) -> Vec<SyntaxKind> {
    tokens(source).into_iter().map(|(kind, _)| kind).collect()
}

#[test]
fn test_keywords_scan_as_identifiers() {
    let scanned = tokens("export interface Props");
    assert_eq!(scanned.len(), 3);
    assert!(scanned.iter().all(|(kind, _)| *kind == SyntaxKind::Identifier));
    assert_eq!(scanned[1].1, "interface");
}

#[test]
fn test_greater_than_is_always_single_token() {
    assert_eq!(
        kinds("a >>= b"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::EqualsToken,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_compound_punctuation() {
    assert_eq!(
        kinds("?. ?? ??= => ... === !== **"),
        vec![
            SyntaxKind::QuestionDotToken,
            SyntaxKind::QuestionQuestionToken,
            SyntaxKind::QuestionQuestionEqualsToken,
            SyntaxKind::EqualsGreaterThanToken,
            SyntaxKind::DotDotDotToken,
            SyntaxKind::EqualsEqualsEqualsToken,
            SyntaxKind::ExclamationEqualsEqualsToken,
            SyntaxKind::AsteriskAsteriskToken,
        ]
    );
}

#[test]
fn test_question_dot_before_digit_is_conditional() {
    // `a?.5:b` is a conditional with `.5`, not optional chaining.
    assert_eq!(
        kinds("a?.5:b"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::QuestionToken,
            SyntaxKind::NumericLiteral,
            SyntaxKind::ColonToken,
            SyntaxKind::Identifier,
        ]
    );
}

#[test]
fn test_string_escapes_are_cooked() {
    let mut scanner = ScannerState::new(Arc::from(r#""a\nA\u{1F600}\x41""#));
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert_eq!(scanner.get_token_value_ref(), "a\nA\u{1F600}A");
}

#[test]
fn test_unterminated_string_sets_flag() {
    let mut scanner = ScannerState::new(Arc::from("'abc\nnext"));
    assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
    assert!(scanner.get_token_flags().contains(TokenFlags::UNTERMINATED));
    assert_eq!(scanner.scan(), SyntaxKind::Identifier);
    assert!(scanner.has_preceding_line_break());
}

#[test]
fn test_template_with_substitutions_is_one_token() {
    let scanned = tokens("`a ${ { b: `c${d}` } } e` x");
    assert_eq!(scanned.len(), 2);
    assert_eq!(scanned[0].0, SyntaxKind::TemplateLiteral);
    assert_eq!(scanned[1].1, "x");
}

#[test]
fn test_no_substitution_template_value() {
    let mut scanner = ScannerState::new(Arc::from("`hello world`"));
    assert_eq!(scanner.scan(), SyntaxKind::NoSubstitutionTemplateLiteral);
    assert_eq!(scanner.get_token_value_ref(), "hello world");
}

#[test]
fn test_numeric_literals() {
    let mut scanner = ScannerState::new(Arc::from("1_000 0x1F 2.5e3 10n .5"));
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(scanner.get_token_value_ref(), "1000");
    assert!(scanner.get_token_flags().contains(TokenFlags::CONTAINS_SEPARATOR));
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(parse_numeric_literal(scanner.get_token_value_ref()), 31.0);
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(parse_numeric_literal(scanner.get_token_value_ref()), 2500.0);
    assert_eq!(scanner.scan(), SyntaxKind::BigIntLiteral);
    assert_eq!(scanner.scan(), SyntaxKind::NumericLiteral);
    assert_eq!(parse_numeric_literal(scanner.get_token_value_ref()), 0.5);
}

#[test]
fn test_comments_are_trivia() {
    let scanned = tokens("a /* block\n */ b // line\nc");
    let names: Vec<_> = scanned.iter().map(|(_, text)| text.as_str()).collect();
    assert_eq!(names, vec!["a", "b", "c"]);
}

#[test]
fn test_block_comment_line_break_counts() {
    let mut scanner = ScannerState::new(Arc::from("a /*\n*/ b"));
    scanner.scan();
    scanner.scan();
    assert!(scanner.has_preceding_line_break());
}

#[test]
fn test_regex_rescan() {
    let mut scanner = ScannerState::new(Arc::from("/[/]ab\\/c/gi;"));
    assert_eq!(scanner.scan(), SyntaxKind::SlashToken);
    assert_eq!(
        scanner.re_scan_slash_token(),
        SyntaxKind::RegularExpressionLiteral
    );
    assert_eq!(scanner.get_token_text(), "/[/]ab\\/c/gi");
    assert_eq!(scanner.scan(), SyntaxKind::SemicolonToken);
}

#[test]
fn test_private_identifier_value_excludes_hash() {
    let mut scanner = ScannerState::new(Arc::from("#count"));
    assert_eq!(scanner.scan(), SyntaxKind::PrivateIdentifier);
    assert_eq!(scanner.get_token_value_ref(), "count");
}

#[test]
fn test_unicode_identifier() {
    let scanned = tokens("const größe = 1");
    assert_eq!(scanned[1], (SyntaxKind::Identifier, "größe".to_string()));
}

#[test]
fn test_save_and_restore_state() {
    let mut scanner = ScannerState::new(Arc::from("a b c"));
    scanner.scan();
    let snapshot = scanner.save_state();
    scanner.scan();
    scanner.scan();
    assert_eq!(scanner.get_token_text(), "c");
    scanner.restore_state(snapshot);
    assert_eq!(scanner.get_token_text(), "a");
    scanner.scan();
    assert_eq!(scanner.get_token_text(), "b");
}
