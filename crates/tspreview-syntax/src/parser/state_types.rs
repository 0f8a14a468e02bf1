//! Parser state - type annotations, type parameters and type members

use smallvec::SmallVec;
use tspreview_common::ByteSpan;

use super::state::{ParserState, SkipMode};
use crate::ast::*;
use crate::scanner::parse_numeric_literal;
use crate::syntax_kind::SyntaxKind;

impl ParserState {
    /// Parse a type (functions, conditionals, unions, intersections, ...).
    pub(crate) fn parse_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        if !self.nesting.enter() {
            self.parse_error_at_current_token("Type nested too deeply.");
            self.skip_type_tokens();
            return TypeNode::new(self.span_from(start), TypeKind::Error);
        }
        let ty = self.parse_type_worker();
        self.nesting.leave();
        ty
    }

    fn parse_type_worker(&mut self) -> TypeNode {
        let start = self.token_pos();
        if self.is_start_of_function_type() {
            return self.parse_function_type(start, false);
        }
        if self.is_identifier_text("new")
            || (self.is_identifier_text("abstract")
                && self.look_ahead(|p| {
                    p.next_token();
                    p.is_identifier_text("new")
                }))
        {
            if self.is_identifier_text("abstract") {
                self.next_token();
            }
            self.next_token();
            return self.parse_function_type(start, true);
        }

        let check = self.parse_union_type();
        if self.in_conditional_extends
            || !self.is_identifier_text("extends")
            || self.has_preceding_line_break()
        {
            return check;
        }

        self.next_token();
        let saved = self.in_conditional_extends;
        self.in_conditional_extends = true;
        let extends = self.parse_type();
        self.in_conditional_extends = saved;
        self.parse_expected(SyntaxKind::QuestionToken);
        let saved = self.in_conditional_extends;
        self.in_conditional_extends = false;
        let true_type = self.parse_type();
        self.parse_expected(SyntaxKind::ColonToken);
        let false_type = self.parse_type();
        self.in_conditional_extends = saved;
        TypeNode::new(
            self.span_from(start),
            TypeKind::Conditional {
                check: Box::new(check),
                extends: Box::new(extends),
                true_type: Box::new(true_type),
                false_type: Box::new(false_type),
            },
        )
    }

    /// Return type annotation, which may be a type predicate.
    pub(crate) fn parse_return_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let saved = self.in_conditional_extends;
        self.in_conditional_extends = false;
        let result = if self.is_identifier_text("asserts")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_or_keyword() && !p.has_preceding_line_break()
            }) {
            self.next_token();
            self.next_token();
            let ty = if self.parse_optional_identifier_text("is") {
                Some(Box::new(self.parse_type()))
            } else {
                None
            };
            TypeNode::new(self.span_from(start), TypeKind::Predicate { asserts: true, ty })
        } else if self.is_identifier_or_keyword()
            && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_text("is") && !p.has_preceding_line_break()
            })
        {
            self.next_token();
            self.next_token();
            let ty = self.parse_type();
            TypeNode::new(
                self.span_from(start),
                TypeKind::Predicate {
                    asserts: false,
                    ty: Some(Box::new(ty)),
                },
            )
        } else {
            self.parse_type()
        };
        self.in_conditional_extends = saved;
        result
    }

    /// `<T>(...) =>` or `(...) =>`.
    fn is_start_of_function_type(&mut self) -> bool {
        if self.is_token(SyntaxKind::LessThanToken) {
            return true;
        }
        if !self.is_token(SyntaxKind::OpenParenToken) {
            return false;
        }
        self.look_ahead(|p| {
            p.skip_balanced(SkipMode::Type);
            p.is_token(SyntaxKind::EqualsGreaterThanToken)
        })
    }

    fn parse_function_type(&mut self, start: u32, is_constructor: bool) -> TypeNode {
        let type_params = self.parse_type_parameters();
        let params = self.parse_parameter_list();
        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
        let return_type = self.parse_return_type();
        TypeNode::new(
            self.span_from(start),
            TypeKind::Function(Box::new(FunctionType {
                type_params,
                params,
                return_type,
                is_constructor,
            })),
        )
    }

    fn parse_union_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let leading = self.parse_optional(SyntaxKind::BarToken);
        let first = self.parse_intersection_type();
        if !self.is_token(SyntaxKind::BarToken) {
            return if leading {
                TypeNode::new(self.span_from(start), first.kind)
            } else {
                first
            };
        }
        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::BarToken) {
            types.push(self.parse_intersection_type());
        }
        TypeNode::new(self.span_from(start), TypeKind::Union(types))
    }

    fn parse_intersection_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let leading = self.parse_optional(SyntaxKind::AmpersandToken);
        let first = self.parse_type_operator();
        if !self.is_token(SyntaxKind::AmpersandToken) {
            return if leading {
                TypeNode::new(self.span_from(start), first.kind)
            } else {
                first
            };
        }
        let mut types = vec![first];
        while self.parse_optional(SyntaxKind::AmpersandToken) {
            types.push(self.parse_type_operator());
        }
        TypeNode::new(self.span_from(start), TypeKind::Intersection(types))
    }

    fn parse_type_operator(&mut self) -> TypeNode {
        let start = self.token_pos();
        let op = match self.token_value() {
            "keyof" if self.is_token(SyntaxKind::Identifier) => Some(TypeOperatorKind::KeyOf),
            "unique" if self.is_token(SyntaxKind::Identifier) => Some(TypeOperatorKind::Unique),
            "readonly" if self.is_token(SyntaxKind::Identifier) => {
                Some(TypeOperatorKind::Readonly)
            }
            _ => None,
        };
        if let Some(op) = op
            && self.look_ahead(|p| {
                p.next_token();
                p.can_token_start_type()
            })
        {
            self.next_token();
            let ty = self.parse_type_operator();
            return TypeNode::new(
                self.span_from(start),
                TypeKind::TypeOperator {
                    op,
                    ty: Box::new(ty),
                },
            );
        }
        if self.is_identifier_text("infer")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_or_keyword()
            })
        {
            self.next_token();
            let name = self.parse_identifier();
            let constraint = self.try_parse_infer_constraint();
            return TypeNode::new(
                self.span_from(start),
                TypeKind::Infer { name, constraint },
            );
        }
        self.parse_postfix_type()
    }

    /// `infer U extends C`; the `extends` belongs to an enclosing conditional
    /// type when it is followed by `?`.
    fn try_parse_infer_constraint(&mut self) -> Option<Box<TypeNode>> {
        if !self.is_identifier_text("extends") {
            return None;
        }
        self.try_parse(|p| {
            p.next_token();
            let saved = p.in_conditional_extends;
            p.in_conditional_extends = true;
            let constraint = p.parse_type();
            p.in_conditional_extends = saved;
            if saved && p.is_token(SyntaxKind::QuestionToken) {
                return None;
            }
            Some(Box::new(constraint))
        })
    }

    fn parse_postfix_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let mut ty = self.parse_primary_type();
        while self.is_token(SyntaxKind::OpenBracketToken) && !self.has_preceding_line_break() {
            self.next_token();
            if self.parse_optional(SyntaxKind::CloseBracketToken) {
                ty = TypeNode::new(self.span_from(start), TypeKind::Array(Box::new(ty)));
            } else {
                let index = self.parse_type();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                ty = TypeNode::new(
                    self.span_from(start),
                    TypeKind::IndexedAccess {
                        object: Box::new(ty),
                        index: Box::new(index),
                    },
                );
            }
        }
        ty
    }

    pub(crate) fn can_token_start_type(&self) -> bool {
        match self.current_token {
            SyntaxKind::Identifier
            | SyntaxKind::StringLiteral
            | SyntaxKind::NumericLiteral
            | SyntaxKind::BigIntLiteral
            | SyntaxKind::NoSubstitutionTemplateLiteral
            | SyntaxKind::TemplateLiteral
            | SyntaxKind::OpenBraceToken
            | SyntaxKind::OpenBracketToken
            | SyntaxKind::OpenParenToken
            | SyntaxKind::LessThanToken
            | SyntaxKind::BarToken
            | SyntaxKind::AmpersandToken
            | SyntaxKind::MinusToken => true,
            _ => false,
        }
    }

    fn parse_primary_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let token = self.current_token;
        match token {
            SyntaxKind::Identifier => self.parse_word_type(),
            SyntaxKind::StringLiteral | SyntaxKind::NoSubstitutionTemplateLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                TypeNode::new(
                    self.span_from(start),
                    TypeKind::Literal(LiteralType::String(value)),
                )
            }
            SyntaxKind::TemplateLiteral => {
                self.next_token();
                TypeNode::new(self.span_from(start), TypeKind::TemplateLiteral)
            }
            SyntaxKind::NumericLiteral => {
                let value = parse_numeric_literal(self.token_value());
                self.next_token();
                TypeNode::new(
                    self.span_from(start),
                    TypeKind::Literal(LiteralType::Number(value)),
                )
            }
            SyntaxKind::BigIntLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                TypeNode::new(
                    self.span_from(start),
                    TypeKind::Literal(LiteralType::BigInt(value)),
                )
            }
            SyntaxKind::MinusToken
                if self.look_ahead(|p| {
                    p.next_token();
                    matches!(
                        p.current_token,
                        SyntaxKind::NumericLiteral | SyntaxKind::BigIntLiteral
                    )
                }) =>
            {
                self.next_token();
                let literal = if self.is_token(SyntaxKind::BigIntLiteral) {
                    LiteralType::BigInt(format!("-{}", self.token_value()))
                } else {
                    LiteralType::Number(-parse_numeric_literal(self.token_value()))
                };
                self.next_token();
                TypeNode::new(self.span_from(start), TypeKind::Literal(literal))
            }
            SyntaxKind::OpenBraceToken => {
                if self.is_start_of_mapped_type() {
                    self.parse_mapped_type()
                } else {
                    let members = self.parse_type_members();
                    TypeNode::new(self.span_from(start), TypeKind::TypeLiteral(members))
                }
            }
            SyntaxKind::OpenBracketToken => self.parse_tuple_type(),
            SyntaxKind::OpenParenToken => {
                self.next_token();
                let inner = self.parse_type();
                self.parse_expected(SyntaxKind::CloseParenToken);
                TypeNode::new(self.span_from(start), TypeKind::Paren(Box::new(inner)))
            }
            _ => {
                self.parse_error_at_current_token("Type expected.");
                if !self.is_type_terminator_token() {
                    self.next_token();
                }
                TypeNode::new(self.span_from(start), TypeKind::Error)
            }
        }
    }

    /// Tokens that close the enclosing construct; never consumed on error.
    fn is_type_terminator_token(&self) -> bool {
        matches!(
            self.current_token,
            SyntaxKind::CloseParenToken
                | SyntaxKind::CloseBracketToken
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::CommaToken
                | SyntaxKind::SemicolonToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::EqualsToken
                | SyntaxKind::EqualsGreaterThanToken
                | SyntaxKind::EndOfFileToken
        )
    }

    /// Skip the rest of a type after the nesting limit was hit.
    fn skip_type_tokens(&mut self) {
        while !self.is_type_terminator_token() {
            if matches!(
                self.current_token,
                SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken
            ) {
                self.skip_balanced(SkipMode::Type);
            } else {
                self.next_token();
            }
        }
    }

    /// Keyword types, `this`, `typeof`, `import(...)`, and type references.
    fn parse_word_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        let word = self.token_value().to_string();
        let followed_by_dot = self.look_ahead(|p| {
            p.next_token();
            p.is_token(SyntaxKind::DotToken)
        });

        if !followed_by_dot {
            if let Some(keyword) = KeywordType::from_text(&word) {
                self.next_token();
                return TypeNode::new(self.span_from(start), TypeKind::Keyword(keyword));
            }
            match word.as_str() {
                "this" => {
                    self.next_token();
                    return TypeNode::new(self.span_from(start), TypeKind::This);
                }
                "true" | "false" => {
                    self.next_token();
                    return TypeNode::new(
                        self.span_from(start),
                        TypeKind::Literal(LiteralType::Boolean(word == "true")),
                    );
                }
                _ => {}
            }
        }

        if word == "typeof" {
            self.next_token();
            if self.is_identifier_text("import") {
                let mut ty = self.parse_import_type(start);
                if let TypeKind::Import { is_typeof, .. } = &mut ty.kind {
                    *is_typeof = true;
                }
                return ty;
            }
            let name = self.parse_entity_name();
            let type_args = if self.is_token(SyntaxKind::LessThanToken)
                && !self.has_preceding_line_break()
            {
                self.parse_type_arguments()
            } else {
                Vec::new()
            };
            return TypeNode::new(
                self.span_from(start),
                TypeKind::TypeQuery { name, type_args },
            );
        }

        if word == "import"
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenParenToken)
            })
        {
            return self.parse_import_type(start);
        }

        self.parse_type_reference()
    }

    /// `import("m")` with an optional `.A.B` qualifier and type arguments.
    fn parse_import_type(&mut self, start: u32) -> TypeNode {
        self.parse_expected_identifier_text("import");
        self.parse_expected(SyntaxKind::OpenParenToken);
        let module = self.token_value().to_string();
        self.parse_expected(SyntaxKind::StringLiteral);
        // Import attributes: `import("m", { with: {...} })`.
        if self.parse_optional(SyntaxKind::CommaToken) && self.is_token(SyntaxKind::OpenBraceToken)
        {
            self.skip_balanced(SkipMode::Type);
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        let qualifier = if self.parse_optional(SyntaxKind::DotToken) {
            Some(self.parse_entity_name())
        } else {
            None
        };
        let type_args = if self.is_token(SyntaxKind::LessThanToken) && !self.has_preceding_line_break()
        {
            self.parse_type_arguments()
        } else {
            Vec::new()
        };
        TypeNode::new(
            self.span_from(start),
            TypeKind::Import {
                module,
                qualifier,
                type_args,
                is_typeof: false,
            },
        )
    }

    /// `A.B.C<Args>`.
    pub(crate) fn parse_type_reference(&mut self) -> TypeNode {
        let start = self.token_pos();
        let name = self.parse_entity_name();
        let type_args = if self.is_token(SyntaxKind::LessThanToken) && !self.has_preceding_line_break()
        {
            self.parse_type_arguments()
        } else {
            Vec::new()
        };
        TypeNode::new(
            self.span_from(start),
            TypeKind::Reference { name, type_args },
        )
    }

    pub(crate) fn parse_type_arguments(&mut self) -> Vec<TypeNode> {
        let mut args = Vec::new();
        if !self.parse_expected(SyntaxKind::LessThanToken) {
            return args;
        }
        while !self.is_token(SyntaxKind::GreaterThanToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            args.push(self.parse_type());
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        args
    }

    pub(crate) fn parse_type_parameters(&mut self) -> Vec<TypeParam> {
        let mut params = Vec::new();
        if !self.parse_optional(SyntaxKind::LessThanToken) {
            return params;
        }
        while !self.is_token(SyntaxKind::GreaterThanToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let start = self.token_pos();
            let mut is_const = false;
            // `const T`, `in T`, `out T`
            while matches!(self.token_value(), "const" | "in" | "out")
                && self.is_token(SyntaxKind::Identifier)
                && self.look_ahead(|p| {
                    p.next_token();
                    p.is_identifier_or_keyword()
                })
            {
                is_const |= self.is_identifier_text("const");
                self.next_token();
            }
            let name = self.parse_identifier();
            let constraint = if self.parse_optional_identifier_text("extends") {
                Some(self.parse_type())
            } else {
                None
            };
            let default = if self.parse_optional(SyntaxKind::EqualsToken) {
                Some(self.parse_type())
            } else {
                None
            };
            params.push(TypeParam {
                span: self.span_from(start),
                name,
                constraint,
                default,
                is_const,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::GreaterThanToken);
        params
    }

    fn parse_tuple_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let rest = self.parse_optional(SyntaxKind::DotDotDotToken);
            // Named member: `name: T` or `name?: T`.
            let is_named = self.is_identifier_or_keyword()
                && self.look_ahead(|p| {
                    p.next_token();
                    p.is_token(SyntaxKind::ColonToken)
                        || (p.is_token(SyntaxKind::QuestionToken) && {
                            p.next_token();
                            p.is_token(SyntaxKind::ColonToken)
                        })
                });
            let mut optional = false;
            let name = if is_named {
                let name = self.parse_identifier_name();
                optional = self.parse_optional(SyntaxKind::QuestionToken);
                self.parse_expected(SyntaxKind::ColonToken);
                Some(name)
            } else {
                None
            };
            let ty = self.parse_type();
            if !is_named && self.parse_optional(SyntaxKind::QuestionToken) {
                optional = true;
            }
            elements.push(TupleElement {
                name,
                ty,
                optional,
                rest,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        TypeNode::new(self.span_from(start), TypeKind::Tuple(elements))
    }

    // =========================================================================
    // Mapped types
    // =========================================================================

    fn is_start_of_mapped_type(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if p.is_token(SyntaxKind::PlusToken) || p.is_token(SyntaxKind::MinusToken) {
                p.next_token();
                if !p.is_identifier_text("readonly") {
                    return false;
                }
            }
            if p.is_identifier_text("readonly") {
                p.next_token();
            }
            if !p.is_token(SyntaxKind::OpenBracketToken) {
                return false;
            }
            p.next_token();
            if !p.is_identifier_or_keyword() {
                return false;
            }
            p.next_token();
            p.is_identifier_text("in")
        })
    }

    fn parse_mapped_type(&mut self) -> TypeNode {
        let start = self.token_pos();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut readonly = self.parse_mapped_modifier_prefix();
        if self.parse_optional_identifier_text("readonly") {
            if readonly == MappedModifier::None {
                readonly = MappedModifier::Add;
            }
        } else if readonly != MappedModifier::None {
            self.parse_error_at_current_token("'readonly' expected.");
        }
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let type_param = self.parse_identifier();
        self.parse_expected_identifier_text("in");
        let constraint = self.parse_type();
        let name_type = if self.parse_optional_identifier_text("as") {
            Some(self.parse_type())
        } else {
            None
        };
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let mut optional = self.parse_mapped_modifier_prefix();
        if optional != MappedModifier::None {
            self.parse_expected(SyntaxKind::QuestionToken);
        } else if self.parse_optional(SyntaxKind::QuestionToken) {
            optional = MappedModifier::Add;
        }
        let ty = if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.parse_optional(SyntaxKind::CommaToken);
        self.parse_expected(SyntaxKind::CloseBraceToken);
        TypeNode::new(
            self.span_from(start),
            TypeKind::Mapped(Box::new(MappedType {
                type_param,
                constraint,
                name_type,
                optional,
                readonly,
                ty,
            })),
        )
    }

    /// `+` or `-` before `readonly` / `?`.
    fn parse_mapped_modifier_prefix(&mut self) -> MappedModifier {
        if self.parse_optional(SyntaxKind::PlusToken) {
            MappedModifier::Add
        } else if self.parse_optional(SyntaxKind::MinusToken) {
            MappedModifier::Remove
        } else {
            MappedModifier::None
        }
    }

    // =========================================================================
    // Type members (interfaces and type literals)
    // =========================================================================

    pub(crate) fn parse_type_members(&mut self) -> Vec<TypeMember> {
        let mut members = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return members;
        }
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let before = self.token_pos();
            if let Some(member) = self.parse_type_member() {
                members.push(member);
            }
            if !self.parse_optional(SyntaxKind::SemicolonToken) {
                self.parse_optional(SyntaxKind::CommaToken);
            }
            if self.token_pos() == before {
                self.parse_error_at_current_token("Property or signature expected.");
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members
    }

    pub(crate) fn is_index_signature_start(&mut self) -> bool {
        self.look_ahead(|p| {
            p.next_token();
            if !p.is_identifier_or_keyword() {
                return false;
            }
            p.next_token();
            p.is_token(SyntaxKind::ColonToken)
        })
    }

    pub(crate) fn parse_index_signature(&mut self, readonly: bool) -> IndexSignature {
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let key_name = self.parse_identifier_name();
        self.parse_expected(SyntaxKind::ColonToken);
        let key_type = self.parse_type();
        self.parse_expected(SyntaxKind::CloseBracketToken);
        let ty = if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        IndexSignature {
            key_name,
            key_type,
            ty,
            readonly,
        }
    }

    fn parse_signature(&mut self) -> Signature {
        let type_params = self.parse_type_parameters();
        let params = self.parse_parameter_list();
        let return_type = if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_return_type())
        } else {
            None
        };
        Signature {
            type_params,
            params,
            return_type,
        }
    }

    fn parse_type_member(&mut self) -> Option<TypeMember> {
        let start = self.token_pos();

        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            let signature = self.parse_signature();
            return Some(TypeMember {
                span: self.span_from(start),
                kind: TypeMemberKind::Call(signature),
            });
        }

        if self.is_identifier_text("new")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenParenToken) || p.is_token(SyntaxKind::LessThanToken)
            })
        {
            self.next_token();
            let signature = self.parse_signature();
            return Some(TypeMember {
                span: self.span_from(start),
                kind: TypeMemberKind::Construct(signature),
            });
        }

        let mut readonly = false;
        if self.is_identifier_text("readonly")
            && self.look_ahead(|p| {
                p.next_token();
                !p.has_preceding_line_break()
                    && matches!(
                        p.current_token,
                        SyntaxKind::Identifier
                            | SyntaxKind::StringLiteral
                            | SyntaxKind::NumericLiteral
                            | SyntaxKind::OpenBracketToken
                    )
            })
        {
            self.next_token();
            readonly = true;
        }

        if self.is_token(SyntaxKind::OpenBracketToken) && self.is_index_signature_start() {
            let index = self.parse_index_signature(readonly);
            return Some(TypeMember {
                span: self.span_from(start),
                kind: TypeMemberKind::Index(index),
            });
        }

        if (self.is_identifier_text("get") || self.is_identifier_text("set"))
            && self.look_ahead(|p| {
                p.next_token();
                !p.has_preceding_line_break()
                    && matches!(
                        p.current_token,
                        SyntaxKind::Identifier
                            | SyntaxKind::StringLiteral
                            | SyntaxKind::NumericLiteral
                            | SyntaxKind::OpenBracketToken
                    )
            })
        {
            let is_getter = self.is_identifier_text("get");
            self.next_token();
            let name = self.parse_property_name();
            let signature = self.parse_signature();
            let kind = if is_getter {
                TypeMemberKind::GetAccessor {
                    name,
                    ty: signature.return_type,
                }
            } else {
                TypeMemberKind::SetAccessor {
                    name,
                    ty: signature.params.into_iter().next().and_then(|p| p.type_ann),
                }
            };
            return Some(TypeMember {
                span: self.span_from(start),
                kind,
            });
        }

        let name = self.parse_property_name();
        if matches!(&name, PropertyName::Ident(ident) if ident.name.is_empty()) {
            return None;
        }
        let optional = self.parse_optional(SyntaxKind::QuestionToken);

        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            let signature = self.parse_signature();
            return Some(TypeMember {
                span: self.span_from(start),
                kind: TypeMemberKind::Method {
                    name,
                    optional,
                    signature,
                },
            });
        }

        let ty = if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        Some(TypeMember {
            span: self.span_from(start),
            kind: TypeMemberKind::Property {
                name,
                optional,
                readonly,
                ty,
            },
        })
    }
}

/// A synthetic `Name` reference, used by callers that build types by hand.
pub fn type_reference(name: &str, span: ByteSpan) -> TypeNode {
    let mut segments: SmallVec<[Ident; 2]> = SmallVec::new();
    for part in name.split('.') {
        segments.push(Ident::new(part, span));
    }
    TypeNode::new(
        span,
        TypeKind::Reference {
            name: EntityName { segments, span },
            type_args: Vec::new(),
        },
    )
}
