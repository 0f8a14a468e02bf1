//! Parser state - expressions
//!
//! Expressions are parsed wherever the analyzer may need to inspect them:
//! variable initializers, default values, `export default` values, story
//! `args` assignments. Function bodies are skipped.

use tspreview_common::ByteSpan;

use super::state::{ParserState, SkipMode};
use crate::ast::*;
use crate::scanner::parse_numeric_literal;
use crate::syntax_kind::{SyntaxKind, is_reserved_word};

/// Binary operator precedence; `None` for non-binary tokens.
fn binary_precedence(op: &str) -> Option<u8> {
    Some(match op {
        "??" | "||" => 1,
        "&&" => 2,
        "|" => 3,
        "^" => 4,
        "&" => 5,
        "==" | "!=" | "===" | "!==" => 6,
        "<" | ">" | "<=" | ">=" | "instanceof" | "in" | "as" | "satisfies" => 7,
        "<<" | ">>" | ">>>" => 8,
        "+" | "-" => 9,
        "*" | "/" | "%" => 10,
        "**" => 11,
        _ => return None,
    })
}

impl ParserState {
    /// Comma-separated expression.
    pub(crate) fn parse_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let first = self.parse_assignment_expression();
        if !self.is_token(SyntaxKind::CommaToken) {
            return first;
        }
        let mut expressions = vec![first];
        while self.parse_optional(SyntaxKind::CommaToken) {
            expressions.push(self.parse_assignment_expression());
        }
        Expression::new(self.span_from(start), ExprKind::Sequence(expressions))
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Expression {
        let start = self.token_pos();
        if !self.nesting.enter() {
            self.parse_error_at_current_token("Expression nested too deeply.");
            if !matches!(
                self.current_token,
                SyntaxKind::EndOfFileToken
                    | SyntaxKind::CloseBraceToken
                    | SyntaxKind::CloseParenToken
                    | SyntaxKind::CloseBracketToken
            ) {
                self.next_token();
            }
            return Expression::new(self.span_from(start), ExprKind::Other);
        }
        let expression = self.parse_assignment_expression_worker();
        self.nesting.leave();
        expression
    }

    fn parse_assignment_expression_worker(&mut self) -> Expression {
        let start = self.token_pos();
        if let Some(arrow) = self.try_parse_arrow_function() {
            return arrow;
        }
        if self.is_identifier_text("yield")
            && self.look_ahead(|p| {
                p.next_token();
                !p.has_preceding_line_break()
                    && !matches!(
                        p.current_token,
                        SyntaxKind::CloseParenToken
                            | SyntaxKind::CloseBracketToken
                            | SyntaxKind::CloseBraceToken
                            | SyntaxKind::CommaToken
                            | SyntaxKind::SemicolonToken
                            | SyntaxKind::ColonToken
                            | SyntaxKind::EqualsToken
                    )
            })
        {
            self.next_token();
            self.parse_optional(SyntaxKind::AsteriskToken);
            self.parse_assignment_expression();
            return Expression::new(self.span_from(start), ExprKind::Other);
        }

        let left = self.parse_conditional_expression();
        let op = if self.current_token.is_assignment_operator() {
            let op = self.scanner.get_token_text().to_string();
            self.next_token();
            op
        } else if let Some(op) = self.shift_assignment_operator() {
            self.consume_binary_operator(op);
            op.to_string()
        } else {
            return left;
        };
        let value = self.parse_assignment_expression();
        Expression::new(
            self.span_from(start),
            ExprKind::Assign {
                op,
                target: Box::new(left),
                value: Box::new(value),
            },
        )
    }

    /// `>>=` / `>>>=` at the cursor (`>` always scans alone).
    fn shift_assignment_operator(&self) -> Option<&'static str> {
        if !self.is_token(SyntaxKind::GreaterThanToken) {
            return None;
        }
        let rest = &self.scanner.source_text().as_bytes()[self.token_pos() as usize..];
        [">>>=", ">>="]
            .into_iter()
            .find(|candidate| rest.starts_with(candidate.as_bytes()))
    }

    fn parse_conditional_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let test = self.parse_binary_expression(0);
        if !self.parse_optional(SyntaxKind::QuestionToken) {
            return test;
        }
        let consequent = self.parse_assignment_expression();
        self.parse_expected(SyntaxKind::ColonToken);
        let alternate = self.parse_assignment_expression();
        Expression::new(
            self.span_from(start),
            ExprKind::Conditional {
                test: Box::new(test),
                consequent: Box::new(consequent),
                alternate: Box::new(alternate),
            },
        )
    }

    /// Operator text of the current token if it is a binary operator.
    /// `>` tokens adjacent to `>`/`=` are joined (`>>`, `>=`, `>>>`).
    fn current_binary_operator(&mut self) -> Option<String> {
        let op = match self.current_token {
            SyntaxKind::GreaterThanToken => {
                let pos = self.token_pos() as usize;
                let text = self.scanner.source_text();
                let rest = &text.as_bytes()[pos..];
                let len = [">>>=", ">>>", ">>=", ">>", ">="]
                    .iter()
                    .find(|candidate| rest.starts_with(candidate.as_bytes()))
                    .map_or(1, |candidate| candidate.len());
                let op = text[pos..pos + len].to_string();
                if op.ends_with('=') && op.len() > 2 {
                    // `>>=` / `>>>=` are assignments.
                    return None;
                }
                op
            }
            SyntaxKind::Identifier => {
                let word = self.token_value();
                if !matches!(word, "instanceof" | "in" | "as" | "satisfies") {
                    return None;
                }
                if matches!(word, "as" | "satisfies") && self.has_preceding_line_break() {
                    return None;
                }
                word.to_string()
            }
            SyntaxKind::QuestionQuestionToken
            | SyntaxKind::BarBarToken
            | SyntaxKind::AmpersandAmpersandToken
            | SyntaxKind::BarToken
            | SyntaxKind::CaretToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::EqualsEqualsToken
            | SyntaxKind::ExclamationEqualsToken
            | SyntaxKind::EqualsEqualsEqualsToken
            | SyntaxKind::ExclamationEqualsEqualsToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::LessThanEqualsToken
            | SyntaxKind::LessThanLessThanToken
            | SyntaxKind::PlusToken
            | SyntaxKind::MinusToken
            | SyntaxKind::AsteriskToken
            | SyntaxKind::SlashToken
            | SyntaxKind::PercentToken
            | SyntaxKind::AsteriskAsteriskToken => self.scanner.get_token_text().to_string(),
            _ => return None,
        };
        Some(op)
    }

    /// Consume the operator returned by `current_binary_operator`.
    fn consume_binary_operator(&mut self, op: &str) {
        if self.is_token(SyntaxKind::GreaterThanToken) {
            let end = self.token_pos() as usize + op.len();
            self.scanner.set_pos(end);
        }
        self.next_token();
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> Expression {
        let start = self.token_pos();
        let mut left = self.parse_unary_expression();
        loop {
            let Some(op) = self.current_binary_operator() else {
                break;
            };
            let Some(precedence) = binary_precedence(&op) else {
                break;
            };
            if precedence <= min_precedence && !(op == "**" && precedence == min_precedence) {
                break;
            }
            self.consume_binary_operator(&op);
            left = match op.as_str() {
                "as" | "satisfies" => {
                    let ty = if self.is_identifier_text("const") {
                        let ty_start = self.token_pos();
                        self.next_token();
                        super::state_types::type_reference("const", self.span_from(ty_start))
                    } else {
                        self.parse_type()
                    };
                    let expr = Box::new(left);
                    let kind = if op == "as" {
                        ExprKind::As { expr, ty }
                    } else {
                        ExprKind::Satisfies { expr, ty }
                    };
                    Expression::new(self.span_from(start), kind)
                }
                _ => {
                    let right = self.parse_binary_expression(precedence);
                    Expression::new(
                        self.span_from(start),
                        ExprKind::Binary {
                            op,
                            left: Box::new(left),
                            right: Box::new(right),
                        },
                    )
                }
            };
        }
        left
    }

    fn parse_unary_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let op = match self.current_token {
            SyntaxKind::MinusToken => Some(UnaryOp::Minus),
            SyntaxKind::PlusToken => Some(UnaryOp::Plus),
            SyntaxKind::ExclamationToken => Some(UnaryOp::Not),
            SyntaxKind::TildeToken => Some(UnaryOp::BitNot),
            SyntaxKind::Identifier => match self.token_value() {
                "typeof" => Some(UnaryOp::TypeOf),
                "void" => Some(UnaryOp::Void),
                "delete" => Some(UnaryOp::Delete),
                "await" => Some(UnaryOp::Await),
                _ => None,
            },
            _ => None,
        };
        if let Some(op) = op
            && (op != UnaryOp::Await
                || self.look_ahead(|p| {
                    p.next_token();
                    !p.has_preceding_line_break() && p.can_token_start_expression()
                }))
        {
            self.next_token();
            let operand = self.parse_unary_expression();
            return Expression::new(
                self.span_from(start),
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
            );
        }

        if self.is_token(SyntaxKind::PlusPlusToken) || self.is_token(SyntaxKind::MinusMinusToken) {
            self.next_token();
            let operand = self.parse_unary_expression();
            return Expression::new(self.span_from(start), ExprKind::Update(Box::new(operand)));
        }

        // `<T>expr` type assertion (not in JSX files).
        if self.is_token(SyntaxKind::LessThanToken) && !self.jsx {
            self.next_token();
            let ty = self.parse_type();
            self.parse_expected(SyntaxKind::GreaterThanToken);
            let expr = self.parse_unary_expression();
            return Expression::new(
                self.span_from(start),
                ExprKind::TypeAssertion {
                    ty,
                    expr: Box::new(expr),
                },
            );
        }

        let expression = self.parse_left_hand_side_expression();
        if (self.is_token(SyntaxKind::PlusPlusToken) || self.is_token(SyntaxKind::MinusMinusToken))
            && !self.has_preceding_line_break()
        {
            self.next_token();
            return Expression::new(
                self.span_from(start),
                ExprKind::Update(Box::new(expression)),
            );
        }
        expression
    }

    pub(crate) fn can_token_start_expression(&self) -> bool {
        match self.current_token {
            SyntaxKind::Identifier
            | SyntaxKind::PrivateIdentifier
            | SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TemplateLiteral
            | SyntaxKind::OpenParenToken
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::SlashToken
            | SyntaxKind::SlashEqualsToken
            | SyntaxKind::MinusToken
            | SyntaxKind::PlusToken
            | SyntaxKind::ExclamationToken
            | SyntaxKind::TildeToken
            | SyntaxKind::PlusPlusToken
            | SyntaxKind::MinusMinusToken
            | SyntaxKind::AtToken => true,
            _ => false,
        }
    }

    // =========================================================================
    // Member access and calls
    // =========================================================================

    fn parse_left_hand_side_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let expression = if self.is_identifier_text("new") {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        self.parse_call_and_member_rest(start, expression, true)
    }

    /// Heritage clause expression: member accesses and calls; a trailing
    /// `<...>` belongs to the clause's type arguments.
    pub(crate) fn parse_heritage_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let expression = self.parse_primary_expression();
        self.parse_call_and_member_rest(start, expression, false)
    }

    fn parse_call_and_member_rest(
        &mut self,
        start: u32,
        mut expression: Expression,
        allow_type_arguments: bool,
    ) -> Expression {
        loop {
            match self.current_token {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let property = self.parse_identifier_name();
                    expression = Expression::new(
                        self.span_from(start),
                        ExprKind::Member {
                            object: Box::new(expression),
                            property,
                            optional: false,
                        },
                    );
                }
                SyntaxKind::QuestionDotToken => {
                    self.next_token();
                    if self.is_token(SyntaxKind::OpenParenToken) {
                        let args = self.parse_arguments();
                        expression = Expression::new(
                            self.span_from(start),
                            ExprKind::Call {
                                callee: Box::new(expression),
                                type_args: Vec::new(),
                                args,
                                optional: true,
                            },
                        );
                    } else if self.parse_optional(SyntaxKind::OpenBracketToken) {
                        let index = self.parse_expression();
                        self.parse_expected(SyntaxKind::CloseBracketToken);
                        expression = Expression::new(
                            self.span_from(start),
                            ExprKind::Index {
                                object: Box::new(expression),
                                index: Box::new(index),
                            },
                        );
                    } else {
                        let property = self.parse_identifier_name();
                        expression = Expression::new(
                            self.span_from(start),
                            ExprKind::Member {
                                object: Box::new(expression),
                                property,
                                optional: true,
                            },
                        );
                    }
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let index = self.parse_expression();
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    expression = Expression::new(
                        self.span_from(start),
                        ExprKind::Index {
                            object: Box::new(expression),
                            index: Box::new(index),
                        },
                    );
                }
                SyntaxKind::OpenParenToken => {
                    let args = self.parse_arguments();
                    expression = Expression::new(
                        self.span_from(start),
                        ExprKind::Call {
                            callee: Box::new(expression),
                            type_args: Vec::new(),
                            args,
                            optional: false,
                        },
                    );
                }
                SyntaxKind::ExclamationToken if !self.has_preceding_line_break() => {
                    self.next_token();
                    expression =
                        Expression::new(self.span_from(start), ExprKind::NonNull(Box::new(expression)));
                }
                SyntaxKind::NoSubstitutionTemplateLiteral | SyntaxKind::TemplateLiteral => {
                    self.next_token();
                    expression = Expression::new(
                        self.span_from(start),
                        ExprKind::TaggedTemplate(Box::new(expression)),
                    );
                }
                SyntaxKind::LessThanToken if allow_type_arguments => {
                    let Some(type_args) = self.try_parse_type_arguments_in_expression() else {
                        break;
                    };
                    if self.is_token(SyntaxKind::OpenParenToken) {
                        let args = self.parse_arguments();
                        expression = Expression::new(
                            self.span_from(start),
                            ExprKind::Call {
                                callee: Box::new(expression),
                                type_args,
                                args,
                                optional: false,
                            },
                        );
                    }
                    // Instantiation expression `f<T>` keeps the callee.
                }
                _ => break,
            }
        }
        expression
    }

    /// `<T, U>` followed by `(`, a template, or a token that cannot continue
    /// a binary expression; otherwise `<` is a comparison.
    fn try_parse_type_arguments_in_expression(&mut self) -> Option<Vec<TypeNode>> {
        self.try_parse(|p| {
            let args = p.parse_type_arguments();
            let follows = matches!(
                p.current_token,
                SyntaxKind::OpenParenToken
                    | SyntaxKind::NoSubstitutionTemplateLiteral
                    | SyntaxKind::TemplateLiteral
                    | SyntaxKind::CloseParenToken
                    | SyntaxKind::CloseBracketToken
                    | SyntaxKind::CommaToken
                    | SyntaxKind::SemicolonToken
                    | SyntaxKind::DotToken
                    | SyntaxKind::EndOfFileToken
            ) || p.has_preceding_line_break();
            follows.then_some(args)
        })
    }

    fn parse_arguments(&mut self) -> Vec<ArrayElement> {
        let mut args = Vec::new();
        self.parse_expected(SyntaxKind::OpenParenToken);
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let before = self.token_pos();
            if self.parse_optional(SyntaxKind::DotDotDotToken) {
                args.push(ArrayElement::Spread(self.parse_assignment_expression()));
            } else {
                args.push(ArrayElement::Expr(self.parse_assignment_expression()));
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == before {
                break;
            }
        }
        if !self.parse_expected(SyntaxKind::CloseParenToken) {
            self.recover_to_closer(SyntaxKind::CloseParenToken);
        }
        args
    }

    /// After a malformed list, skip to (and consume) `closer` at this depth.
    fn recover_to_closer(&mut self, closer: SyntaxKind) {
        loop {
            match self.current_token {
                SyntaxKind::EndOfFileToken => return,
                kind if kind == closer => {
                    self.next_token();
                    return;
                }
                SyntaxKind::CloseBraceToken
                | SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken => return,
                SyntaxKind::OpenBraceToken
                | SyntaxKind::OpenParenToken
                | SyntaxKind::OpenBracketToken => self.skip_balanced(SkipMode::Code),
                _ => {
                    self.next_token();
                }
            }
        }
    }

    fn parse_new_expression(&mut self) -> Expression {
        let start = self.token_pos();
        self.next_token();
        if self.parse_optional(SyntaxKind::DotToken) {
            // `new.target`
            self.parse_identifier_name();
            return Expression::new(self.span_from(start), ExprKind::Other);
        }
        let callee_start = self.token_pos();
        let mut callee = if self.is_identifier_text("new") {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        // Member accesses bind tighter than the `new` arguments.
        loop {
            if self.parse_optional(SyntaxKind::DotToken) {
                let property = self.parse_identifier_name();
                callee = Expression::new(
                    self.span_from(callee_start),
                    ExprKind::Member {
                        object: Box::new(callee),
                        property,
                        optional: false,
                    },
                );
            } else if self.parse_optional(SyntaxKind::OpenBracketToken) {
                let index = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                callee = Expression::new(
                    self.span_from(callee_start),
                    ExprKind::Index {
                        object: Box::new(callee),
                        index: Box::new(index),
                    },
                );
            } else {
                break;
            }
        }
        let type_args = if self.is_token(SyntaxKind::LessThanToken) {
            self.try_parse_type_arguments_in_expression()
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        let args = if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_arguments()
        } else {
            Vec::new()
        };
        Expression::new(
            self.span_from(start),
            ExprKind::New {
                callee: Box::new(callee),
                type_args,
                args,
            },
        )
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary_expression(&mut self) -> Expression {
        let start = self.token_pos();
        match self.current_token {
            SyntaxKind::Identifier => self.parse_word_expression(),
            SyntaxKind::PrivateIdentifier => {
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::Other)
            }
            SyntaxKind::NumericLiteral => {
                let value = parse_numeric_literal(self.token_value());
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::Number(value))
            }
            SyntaxKind::BigIntLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::BigInt(value))
            }
            SyntaxKind::StringLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::String(value))
            }
            SyntaxKind::NoSubstitutionTemplateLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                Expression::new(
                    self.span_from(start),
                    ExprKind::NoSubstitutionTemplate(value),
                )
            }
            SyntaxKind::TemplateLiteral => {
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::Template)
            }
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken => {
                self.current_token = self.scanner.re_scan_slash_token();
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::Regex)
            }
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_expression();
                self.parse_expected(SyntaxKind::CloseParenToken);
                Expression::new(self.span_from(start), ExprKind::Paren(Box::new(inner)))
            }
            SyntaxKind::OpenBracketToken => self.parse_array_literal(),
            SyntaxKind::OpenBraceToken => self.parse_object_literal(),
            SyntaxKind::LessThanToken if self.jsx && self.looks_like_jsx() => {
                self.skip_jsx_element();
                Expression::new(self.span_from(start), ExprKind::Jsx)
            }
            SyntaxKind::AtToken => {
                // Decorated class expression.
                while self.parse_optional(SyntaxKind::AtToken) {
                    self.parse_left_hand_side_expression();
                }
                self.parse_primary_expression()
            }
            _ => {
                self.parse_error_at_current_token("Expression expected.");
                Expression::new(ByteSpan::at(start), ExprKind::Other)
            }
        }
    }

    fn parse_word_expression(&mut self) -> Expression {
        let start = self.token_pos();
        let word = self.token_value().to_string();
        match word.as_str() {
            "function" => {
                let func = self.parse_function_expression(start, false);
                Expression::new(self.span_from(start), ExprKind::Function(Box::new(func)))
            }
            "async"
                if self.look_ahead(|p| {
                    p.next_token();
                    p.is_identifier_text("function") && !p.has_preceding_line_break()
                }) =>
            {
                self.next_token();
                let func = self.parse_function_expression(start, true);
                Expression::new(self.span_from(start), ExprKind::Function(Box::new(func)))
            }
            "class" => {
                let class = self.parse_class(start, false);
                Expression::new(self.span_from(start), ExprKind::Class(Box::new(class)))
            }
            "this" => {
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::This)
            }
            "super" => {
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::Super)
            }
            "null" => {
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::Null)
            }
            "true" | "false" => {
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::Boolean(word == "true"))
            }
            "import" => {
                // `import("m")` / `import.meta`
                self.next_token();
                if self.parse_optional(SyntaxKind::DotToken) {
                    self.parse_identifier_name();
                } else if self.is_token(SyntaxKind::OpenParenToken) {
                    self.parse_arguments();
                }
                Expression::new(self.span_from(start), ExprKind::Other)
            }
            _ => {
                if is_reserved_word(&word) {
                    self.parse_error_at_current_token("Expression expected.");
                }
                self.next_token();
                Expression::new(self.span_from(start), ExprKind::Identifier(word))
            }
        }
    }

    /// `function` keyword at the cursor (after `async`, if any).
    fn parse_function_expression(&mut self, start: u32, is_async: bool) -> Function {
        self.parse_expected_identifier_text("function");
        let is_generator = self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier_or_keyword() {
            Some(self.parse_identifier())
        } else {
            None
        };
        self.parse_function_rest(start, name, is_async, is_generator, false)
    }

    fn parse_array_literal(&mut self) -> Expression {
        let start = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::CommaToken) {
                elements.push(ArrayElement::Hole);
                continue;
            }
            let before = self.token_pos();
            if self.parse_optional(SyntaxKind::DotDotDotToken) {
                elements.push(ArrayElement::Spread(self.parse_assignment_expression()));
            } else {
                elements.push(ArrayElement::Expr(self.parse_assignment_expression()));
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == before {
                break;
            }
        }
        if !self.parse_expected(SyntaxKind::CloseBracketToken) {
            self.recover_to_closer(SyntaxKind::CloseBracketToken);
        }
        Expression::new(self.span_from(start), ExprKind::Array(elements))
    }

    fn parse_object_literal(&mut self) -> Expression {
        let start = self.token_pos();
        self.next_token();
        let mut properties = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let before = self.token_pos();
            if let Some(property) = self.parse_object_property() {
                properties.push(property);
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == before {
                break;
            }
        }
        if !self.parse_expected(SyntaxKind::CloseBraceToken) {
            self.recover_to_closer(SyntaxKind::CloseBraceToken);
        }
        Expression::new(self.span_from(start), ExprKind::Object(properties))
    }

    fn parse_object_property(&mut self) -> Option<ObjectProperty> {
        let start = self.token_pos();
        if self.parse_optional(SyntaxKind::DotDotDotToken) {
            return Some(ObjectProperty::Spread(self.parse_assignment_expression()));
        }

        let next_is_name = |p: &mut Self| {
            p.look_ahead(|q| {
                q.next_token();
                !matches!(
                    q.current_token,
                    SyntaxKind::CommaToken
                        | SyntaxKind::CloseBraceToken
                        | SyntaxKind::ColonToken
                        | SyntaxKind::OpenParenToken
                        | SyntaxKind::LessThanToken
                        | SyntaxKind::EqualsToken
                        | SyntaxKind::QuestionToken
                )
            })
        };

        if (self.is_identifier_text("get") || self.is_identifier_text("set")) && next_is_name(self) {
            let is_getter = self.is_identifier_text("get");
            self.next_token();
            let key = self.parse_property_name();
            self.parse_function_rest(start, None, false, false, false);
            let span = self.span_from(start);
            return Some(if is_getter {
                ObjectProperty::Getter { key, span }
            } else {
                ObjectProperty::Setter { key, span }
            });
        }

        let mut is_async = false;
        if self.is_identifier_text("async") && next_is_name(self) {
            self.next_token();
            is_async = true;
        }
        let is_generator = self.parse_optional(SyntaxKind::AsteriskToken);

        let key = self.parse_property_name();
        self.parse_optional(SyntaxKind::QuestionToken);

        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            let name = match &key {
                PropertyName::Ident(ident) => Some(ident.clone()),
                _ => None,
            };
            let func = self.parse_function_rest(start, name, is_async, is_generator, false);
            return Some(ObjectProperty::Method {
                key,
                func: Box::new(func),
            });
        }

        if self.parse_optional(SyntaxKind::ColonToken) {
            let value = self.parse_assignment_expression();
            return Some(ObjectProperty::KeyValue { key, value });
        }

        match key {
            PropertyName::Ident(ident) if !ident.name.is_empty() => {
                // Cover grammar `{ a = 1 }` only appears in destructuring targets.
                if self.parse_optional(SyntaxKind::EqualsToken) {
                    self.parse_assignment_expression();
                }
                Some(ObjectProperty::Shorthand(ident))
            }
            _ => {
                self.parse_error_at_current_token("':' expected.");
                None
            }
        }
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    fn try_parse_arrow_function(&mut self) -> Option<Expression> {
        let start = self.token_pos();
        match self.current_token {
            SyntaxKind::Identifier => {
                let is_async = self.is_identifier_text("async")
                    && self.look_ahead(|p| {
                        p.next_token();
                        !p.has_preceding_line_break()
                            && (p.is_token(SyntaxKind::OpenParenToken)
                                || p.is_token(SyntaxKind::LessThanToken)
                                || (p.is_identifier_or_keyword() && {
                                    p.next_token();
                                    p.is_token(SyntaxKind::EqualsGreaterThanToken)
                                }))
                    });
                if is_async {
                    return self.try_parse(|p| {
                        p.next_token();
                        p.parse_arrow_function_rest(start, true)
                    });
                }
                // `x => ...`
                let simple = self.look_ahead(|p| {
                    p.next_token();
                    p.is_token(SyntaxKind::EqualsGreaterThanToken) && !p.has_preceding_line_break()
                });
                if simple {
                    return self.try_parse(|p| p.parse_arrow_function_rest(start, false));
                }
                None
            }
            SyntaxKind::OpenParenToken => {
                let might_be_arrow = self.look_ahead(|p| {
                    p.skip_balanced(SkipMode::Type);
                    matches!(
                        p.current_token,
                        SyntaxKind::EqualsGreaterThanToken | SyntaxKind::ColonToken
                    )
                });
                if !might_be_arrow {
                    return None;
                }
                self.try_parse(|p| p.parse_arrow_function_rest(start, false))
            }
            SyntaxKind::LessThanToken => {
                if self.jsx && self.looks_like_jsx() {
                    return None;
                }
                self.try_parse(|p| p.parse_arrow_function_rest(start, false))
            }
            _ => None,
        }
    }

    /// Parameters (or a single identifier), optional return type, `=>` and
    /// the body. Returns `None` when this is not an arrow function.
    fn parse_arrow_function_rest(&mut self, start: u32, is_async: bool) -> Option<Expression> {
        let (type_params, params) = if self.is_identifier_or_keyword() {
            let ident = self.parse_identifier();
            let span = ident.span;
            let param = Param {
                span,
                pattern: BindingPattern::Identifier(ident),
                optional: false,
                rest: false,
                type_ann: None,
                default: None,
                modifiers: Modifiers::empty(),
            };
            (Vec::new(), vec![param])
        } else {
            let type_params = self.parse_type_parameters();
            if !self.is_token(SyntaxKind::OpenParenToken) {
                return None;
            }
            (type_params, self.parse_parameter_list())
        };
        let return_type = if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_return_type())
        } else {
            None
        };
        if !self.is_token(SyntaxKind::EqualsGreaterThanToken) || self.has_preceding_line_break() {
            return None;
        }
        self.next_token();
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_function_body()
        } else {
            let body_start = self.token_pos();
            let expression = self.parse_assignment_expression();
            FunctionBody {
                span: self.span_from(body_start),
                expression: Some(Box::new(expression)),
            }
        };
        let func = Function {
            span: self.span_from(start),
            name: None,
            is_async,
            is_generator: false,
            is_arrow: true,
            type_params,
            params,
            return_type,
            body: Some(body),
        };
        Some(Expression::new(
            self.span_from(start),
            ExprKind::Arrow(Box::new(func)),
        ))
    }
}
