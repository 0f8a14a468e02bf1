//! Parser state - statements, declarations, imports and exports

use smallvec::SmallVec;

use super::state::{ParserState, SkipMode};
use crate::ast::*;
use crate::syntax_kind::{SyntaxKind, is_reserved_word};

impl ParserState {
    // =========================================================================
    // Statement lists
    // =========================================================================

    /// Parse statements until end of file (or `}` inside a block).
    pub(crate) fn parse_statement_list(&mut self, in_block: bool) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            if self.is_token(SyntaxKind::EndOfFileToken) {
                if in_block {
                    self.parse_error_at_current_token("'}' expected.");
                }
                break;
            }
            if in_block && self.is_token(SyntaxKind::CloseBraceToken) {
                break;
            }
            let start = self.token_pos();
            let statement = self.parse_statement();
            if self.token_pos() == start && !self.is_token(SyntaxKind::EndOfFileToken) {
                self.parse_error_at_current_token("Declaration or statement expected.");
                self.next_token();
                self.resync_after_error();
            }
            if !matches!(statement.kind, StatementKind::Other) || !statement.span.is_empty() {
                statements.push(statement);
            }
        }
        statements
    }

    pub(crate) fn parse_statement(&mut self) -> Statement {
        let start = self.token_pos();
        let kind = match self.current_token {
            SyntaxKind::SemicolonToken => {
                self.next_token();
                StatementKind::Other
            }
            SyntaxKind::OpenBraceToken => {
                self.skip_balanced(SkipMode::Code);
                StatementKind::Other
            }
            SyntaxKind::AtToken => {
                self.skip_decorators();
                return self.parse_statement_with_start(start);
            }
            SyntaxKind::Identifier => return self.parse_statement_with_start(start),
            _ => self.parse_expression_statement(),
        };
        Statement {
            span: self.span_from(start),
            kind,
        }
    }

    /// Statement starting with a word (keyword or identifier), possibly after
    /// decorators that began at `start`.
    fn parse_statement_with_start(&mut self, start: u32) -> Statement {
        let word = self.token_value().to_string();
        let kind = match word.as_str() {
            "import" if !matches!(
                self.peek_token(),
                SyntaxKind::OpenParenToken | SyntaxKind::DotToken
            ) =>
            {
                self.parse_import_declaration()
            }
            "export" => self.parse_export_declaration(start),
            "declare" if self.next_is_identifier_on_same_line() => {
                self.next_token();
                self.parse_declaration_statement(Modifiers::DECLARE, start)
            }
            _ if self.is_declaration_start() => {
                self.parse_declaration_statement(Modifiers::empty(), start)
            }
            "if" | "for" | "while" | "do" | "switch" | "try" | "return" | "throw" | "break"
            | "continue" | "debugger" | "with" => {
                self.skip_control_statement();
                StatementKind::Other
            }
            _ if self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::ColonToken)
            }) && !is_reserved_word(&word) =>
            {
                // Labeled statement.
                self.next_token();
                self.next_token();
                return self.parse_statement();
            }
            _ => self.parse_expression_statement(),
        };
        Statement {
            span: self.span_from(start),
            kind,
        }
    }

    fn parse_expression_statement(&mut self) -> StatementKind {
        let expression = self.parse_expression();
        self.parse_semicolon();
        StatementKind::Expression(expression)
    }

    /// Skip `if`/`for`/`try`/... statements. Nothing inside control flow
    /// contributes declarations the analyzer cares about.
    fn skip_control_statement(&mut self) {
        self.next_token();
        loop {
            match self.current_token {
                SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken => return,
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    if !self.is_identifier_text("else") {
                        return;
                    }
                }
                SyntaxKind::OpenParenToken | SyntaxKind::OpenBracketToken => {
                    self.skip_balanced(SkipMode::Code);
                }
                SyntaxKind::OpenBraceToken => {
                    self.skip_balanced(SkipMode::Code);
                    let continues = ["else", "catch", "finally", "while"]
                        .iter()
                        .any(|word| self.is_identifier_text(word));
                    if !continues {
                        self.parse_optional(SyntaxKind::SemicolonToken);
                        return;
                    }
                }
                _ => {
                    self.next_token();
                }
            }
            if self.has_preceding_line_break()
                && self.is_token(SyntaxKind::Identifier)
                && self.is_declaration_start()
            {
                return;
            }
        }
    }

    fn skip_decorators(&mut self) {
        while self.parse_optional(SyntaxKind::AtToken) {
            // `@a.b.c` or `@a.b(args)`
            self.next_token();
            while self.parse_optional(SyntaxKind::DotToken) {
                self.next_token();
            }
            if self.is_token(SyntaxKind::OpenParenToken) {
                self.skip_balanced(SkipMode::Code);
            }
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Current word begins a declaration (`const`, `function`, `class`, ...).
    pub(crate) fn is_declaration_start(&mut self) -> bool {
        if !self.is_token(SyntaxKind::Identifier) {
            return false;
        }
        let word = self.token_value().to_string();
        match word.as_str() {
            "const" | "var" | "function" | "class" | "enum" => true,
            "let" => self.look_ahead(|p| {
                p.next_token();
                matches!(
                    p.current_token,
                    SyntaxKind::Identifier | SyntaxKind::OpenBraceToken | SyntaxKind::OpenBracketToken
                )
            }),
            "interface" | "type" | "using" => self.next_is_identifier_on_same_line(),
            "abstract" => self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_text("class") && !p.has_preceding_line_break()
            }),
            "async" => self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_text("function") && !p.has_preceding_line_break()
            }),
            "namespace" | "module" => self.look_ahead(|p| {
                p.next_token();
                (p.is_identifier_or_keyword() || p.is_token(SyntaxKind::StringLiteral))
                    && !p.has_preceding_line_break()
            }),
            "global" => self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenBraceToken)
            }),
            _ => false,
        }
    }

    fn parse_declaration_statement(&mut self, modifiers: Modifiers, start: u32) -> StatementKind {
        match self.parse_declaration(start) {
            Some(decl) => StatementKind::Declaration {
                exported: modifiers.contains(Modifiers::EXPORT),
                declare: modifiers.contains(Modifiers::DECLARE),
                decl,
            },
            None => {
                self.resync_after_error();
                StatementKind::Other
            }
        }
    }

    pub(crate) fn parse_declaration(&mut self, start: u32) -> Option<Declaration> {
        if self.is_token(SyntaxKind::AtToken) {
            self.skip_decorators();
        }
        let word = self.token_value().to_string();
        let decl = match word.as_str() {
            "const" if self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_text("enum")
            }) =>
            {
                self.next_token();
                Declaration::Enum(self.parse_enum_declaration(true))
            }
            "const" | "let" | "var" | "using" => {
                let statement = self.parse_variable_statement();
                self.parse_semicolon();
                Declaration::Variable(statement)
            }
            "function" => Declaration::Function(self.parse_function_declaration(start, false)),
            "async" => {
                self.next_token();
                Declaration::Function(self.parse_function_declaration(start, true))
            }
            "class" => Declaration::Class(self.parse_class(start, false)),
            "abstract" => {
                self.next_token();
                Declaration::Class(self.parse_class(start, true))
            }
            "interface" => Declaration::Interface(self.parse_interface_declaration()),
            "type" => Declaration::TypeAlias(self.parse_type_alias_declaration()),
            "enum" => Declaration::Enum(self.parse_enum_declaration(false)),
            "namespace" | "module" | "global" => {
                Declaration::Module(self.parse_module_declaration())
            }
            _ => {
                self.parse_error_at_current_token("Declaration expected.");
                return None;
            }
        };
        Some(decl)
    }

    pub(crate) fn parse_variable_statement(&mut self) -> VariableStatement {
        let kind = match self.token_value() {
            "let" => VarKind::Let,
            "var" => VarKind::Var,
            "using" => VarKind::Using,
            _ => VarKind::Const,
        };
        self.next_token();
        let mut declarations = Vec::new();
        loop {
            let start = self.token_pos();
            let name = self.parse_binding_pattern();
            // Definite assignment assertion: `let x!: T`.
            self.parse_optional(SyntaxKind::ExclamationToken);
            let type_ann = if self.parse_optional(SyntaxKind::ColonToken) {
                Some(self.parse_type())
            } else {
                None
            };
            let init = if self.parse_optional(SyntaxKind::EqualsToken) {
                Some(self.parse_assignment_expression())
            } else {
                None
            };
            declarations.push(VariableDeclarator {
                span: self.span_from(start),
                name,
                type_ann,
                init,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        VariableStatement { kind, declarations }
    }

    /// `function` keyword at the cursor (after `async`, if any).
    pub(crate) fn parse_function_declaration(&mut self, start: u32, is_async: bool) -> Function {
        self.parse_expected_identifier_text("function");
        let is_generator = self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier_or_keyword() && !self.is_token(SyntaxKind::OpenParenToken) {
            Some(self.parse_identifier())
        } else {
            None
        };
        self.parse_function_rest(start, name, is_async, is_generator, true)
    }

    /// Signature and body after the function name.
    pub(crate) fn parse_function_rest(
        &mut self,
        start: u32,
        name: Option<Ident>,
        is_async: bool,
        is_generator: bool,
        allow_missing_body: bool,
    ) -> Function {
        let type_params = self.parse_type_parameters();
        let params = self.parse_parameter_list();
        let return_type = if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_return_type())
        } else {
            None
        };
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            Some(self.parse_function_body())
        } else {
            if !allow_missing_body {
                self.parse_error_at_current_token("'{' expected.");
            }
            self.parse_optional(SyntaxKind::SemicolonToken);
            None
        };
        Function {
            span: self.span_from(start),
            name,
            is_async,
            is_generator,
            is_arrow: false,
            type_params,
            params,
            return_type,
            body,
        }
    }

    /// Skip a `{ ... }` function body.
    pub(crate) fn parse_function_body(&mut self) -> FunctionBody {
        let start = self.token_pos();
        self.skip_balanced(SkipMode::Code);
        FunctionBody {
            span: self.span_from(start),
            expression: None,
        }
    }

    // =========================================================================
    // Parameters and binding patterns
    // =========================================================================

    pub(crate) fn parse_parameter_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenParenToken) {
            return params;
        }
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let before = self.token_pos();
            if let Some(param) = self.parse_parameter() {
                params.push(param);
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
            if self.token_pos() == before {
                break;
            }
        }
        if !self.parse_expected(SyntaxKind::CloseParenToken) {
            // Recover to the closing parenthesis of this list.
            while !matches!(
                self.current_token,
                SyntaxKind::CloseParenToken
                    | SyntaxKind::OpenBraceToken
                    | SyntaxKind::EqualsGreaterThanToken
                    | SyntaxKind::EndOfFileToken
            ) {
                if self.is_token(SyntaxKind::OpenParenToken)
                    || self.is_token(SyntaxKind::OpenBracketToken)
                {
                    self.skip_balanced(SkipMode::Type);
                } else {
                    self.next_token();
                }
            }
            self.parse_optional(SyntaxKind::CloseParenToken);
        }
        params
    }

    /// One parameter; `this` parameters are parsed and dropped.
    fn parse_parameter(&mut self) -> Option<Param> {
        let start = self.token_pos();
        if self.is_token(SyntaxKind::AtToken) {
            self.skip_decorators();
        }
        let mut modifiers = Modifiers::empty();
        while self.is_token(SyntaxKind::Identifier) {
            let Some(modifier) = Modifiers::from_keyword(self.token_value()) else {
                break;
            };
            if !modifier.intersects(
                Modifiers::PUBLIC
                    | Modifiers::PRIVATE
                    | Modifiers::PROTECTED
                    | Modifiers::READONLY
                    | Modifiers::OVERRIDE,
            ) {
                break;
            }
            let is_modifier = self.look_ahead(|p| {
                p.next_token();
                matches!(
                    p.current_token,
                    SyntaxKind::Identifier
                        | SyntaxKind::OpenBraceToken
                        | SyntaxKind::OpenBracketToken
                        | SyntaxKind::DotDotDotToken
                )
            });
            if !is_modifier {
                break;
            }
            modifiers |= modifier;
            self.next_token();
        }
        let rest = self.parse_optional(SyntaxKind::DotDotDotToken);
        let is_this = self.is_identifier_text("this");
        let pattern = self.parse_binding_pattern();
        let optional = self.parse_optional(SyntaxKind::QuestionToken);
        let type_ann = if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        let default = if self.parse_optional(SyntaxKind::EqualsToken) {
            Some(self.parse_assignment_expression())
        } else {
            None
        };
        if is_this {
            return None;
        }
        Some(Param {
            span: self.span_from(start),
            pattern,
            optional,
            rest,
            type_ann,
            default,
            modifiers,
        })
    }

    pub(crate) fn parse_binding_pattern(&mut self) -> BindingPattern {
        match self.current_token {
            SyntaxKind::OpenBraceToken => self.parse_object_binding_pattern(),
            SyntaxKind::OpenBracketToken => self.parse_array_binding_pattern(),
            _ => BindingPattern::Identifier(self.parse_identifier()),
        }
    }

    fn parse_object_binding_pattern(&mut self) -> BindingPattern {
        let start = self.token_pos();
        self.next_token();
        let mut properties = Vec::new();
        let mut rest = None;
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::DotDotDotToken) {
                rest = Some(self.parse_identifier());
            } else {
                let before = self.token_pos();
                let key = self.parse_property_name();
                let value = if self.parse_optional(SyntaxKind::ColonToken) {
                    self.parse_binding_pattern()
                } else {
                    match &key {
                        PropertyName::Ident(ident) => BindingPattern::Identifier(ident.clone()),
                        _ => {
                            self.parse_error_at_current_token("':' expected.");
                            BindingPattern::Identifier(Ident::new("", key.span()))
                        }
                    }
                };
                let default = if self.parse_optional(SyntaxKind::EqualsToken) {
                    Some(self.parse_assignment_expression())
                } else {
                    None
                };
                properties.push(ObjectBindingProperty {
                    key,
                    value,
                    default,
                });
                if self.token_pos() == before {
                    self.next_token();
                }
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        BindingPattern::Object {
            span: self.span_from(start),
            properties,
            rest,
        }
    }

    fn parse_array_binding_pattern(&mut self) -> BindingPattern {
        let start = self.token_pos();
        self.next_token();
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.is_token(SyntaxKind::CommaToken) {
                elements.push(None);
                self.next_token();
                continue;
            }
            if self.parse_optional(SyntaxKind::DotDotDotToken) {
                rest = Some(Box::new(self.parse_binding_pattern()));
            } else {
                let pattern = self.parse_binding_pattern();
                let default = if self.parse_optional(SyntaxKind::EqualsToken) {
                    Some(self.parse_assignment_expression())
                } else {
                    None
                };
                elements.push(Some(ArrayBindingElement { pattern, default }));
            }
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        BindingPattern::Array {
            span: self.span_from(start),
            elements,
            rest,
        }
    }

    /// Identifier in a binding or declaration-name position. Reserved words
    /// are reported but still consumed.
    pub(crate) fn parse_identifier(&mut self) -> Ident {
        let start = self.token_pos();
        if !self.is_identifier_or_keyword() {
            self.parse_error_at_current_token("Identifier expected.");
            return Ident::new("", tspreview_common::ByteSpan::at(start));
        }
        let name = self.token_value().to_string();
        if is_reserved_word(&name) && name != "this" {
            self.parse_error_at_current_token("Identifier expected.");
        }
        self.next_token();
        Ident::new(name, self.span_from(start))
    }

    /// Any word, including reserved words (property names, `a.default`).
    pub(crate) fn parse_identifier_name(&mut self) -> Ident {
        let start = self.token_pos();
        if !self.is_identifier_or_keyword() && !self.is_token(SyntaxKind::PrivateIdentifier) {
            self.parse_error_at_current_token("Identifier expected.");
            return Ident::new("", tspreview_common::ByteSpan::at(start));
        }
        let name = self.token_value().to_string();
        self.next_token();
        Ident::new(name, self.span_from(start))
    }

    pub(crate) fn parse_property_name(&mut self) -> PropertyName {
        let start = self.token_pos();
        match self.current_token {
            SyntaxKind::StringLiteral | SyntaxKind::NoSubstitutionTemplateLiteral => {
                let value = self.token_value().to_string();
                self.next_token();
                PropertyName::String(value, self.span_from(start))
            }
            SyntaxKind::NumericLiteral => {
                let value = crate::scanner::parse_numeric_literal(self.token_value());
                self.next_token();
                PropertyName::Number(value, self.span_from(start))
            }
            SyntaxKind::PrivateIdentifier => PropertyName::PrivateName(self.parse_identifier_name()),
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let expression = self.parse_assignment_expression();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                PropertyName::Computed(Box::new(expression))
            }
            _ => PropertyName::Ident(self.parse_identifier_name()),
        }
    }

    pub(crate) fn parse_entity_name(&mut self) -> EntityName {
        let start = self.token_pos();
        let mut segments: SmallVec<[Ident; 2]> = SmallVec::new();
        segments.push(self.parse_identifier_name());
        while self.is_token(SyntaxKind::DotToken)
            && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_or_keyword()
            })
        {
            self.next_token();
            segments.push(self.parse_identifier_name());
        }
        EntityName {
            segments,
            span: self.span_from(start),
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    /// `class` keyword at the cursor.
    pub(crate) fn parse_class(&mut self, start: u32, is_abstract: bool) -> ClassDecl {
        self.parse_expected_identifier_text("class");
        let name = if self.is_identifier_or_keyword()
            && !self.is_identifier_text("extends")
            && !self.is_identifier_text("implements")
        {
            Some(self.parse_identifier())
        } else {
            None
        };
        let type_params = self.parse_type_parameters();
        let mut extends = None;
        let mut implements = Vec::new();
        loop {
            if self.parse_optional_identifier_text("extends") {
                let expression = self.parse_heritage_expression();
                let type_args = if self.is_token(SyntaxKind::LessThanToken) {
                    self.parse_type_arguments()
                } else {
                    Vec::new()
                };
                extends = Some(HeritageClause {
                    expression,
                    type_args,
                });
            } else if self.parse_optional_identifier_text("implements") {
                loop {
                    implements.push(self.parse_type_reference());
                    if !self.parse_optional(SyntaxKind::CommaToken) {
                        break;
                    }
                }
            } else {
                break;
            }
        }
        let members = self.parse_class_members();
        ClassDecl {
            span: self.span_from(start),
            name,
            type_params,
            extends,
            implements,
            members,
            is_abstract,
        }
    }

    fn parse_class_members(&mut self) -> Vec<ClassMember> {
        let mut members = Vec::new();
        if !self.parse_expected(SyntaxKind::OpenBraceToken) {
            return members;
        }
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            let before = self.token_pos();
            if let Some(member) = self.parse_class_member() {
                members.push(member);
            }
            if self.token_pos() == before {
                self.parse_error_at_current_token("Unexpected token. A member was expected.");
                self.next_token();
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        members
    }

    /// Word at the cursor is a modifier rather than a member name.
    fn is_class_member_modifier(&mut self) -> bool {
        if !self.is_token(SyntaxKind::Identifier) {
            return false;
        }
        let Some(modifier) = Modifiers::from_keyword(self.token_value()) else {
            return false;
        };
        if modifier.intersects(
            Modifiers::EXPORT
                | Modifiers::DEFAULT
                | Modifiers::CONST
                | Modifiers::IN
                | Modifiers::OUT,
        ) {
            return false;
        }
        self.look_ahead(|p| {
            p.next_token();
            !p.has_preceding_line_break()
                && matches!(
                    p.current_token,
                    SyntaxKind::Identifier
                        | SyntaxKind::PrivateIdentifier
                        | SyntaxKind::StringLiteral
                        | SyntaxKind::NumericLiteral
                        | SyntaxKind::OpenBracketToken
                        | SyntaxKind::OpenBraceToken
                        | SyntaxKind::AsteriskToken
                )
        })
    }

    fn parse_class_member(&mut self) -> Option<ClassMember> {
        let start = self.token_pos();
        if self.is_token(SyntaxKind::AtToken) {
            self.skip_decorators();
        }
        let mut modifiers = Modifiers::empty();
        while self.is_class_member_modifier() {
            if let Some(modifier) = Modifiers::from_keyword(self.token_value()) {
                modifiers |= modifier;
            }
            self.next_token();
        }

        if modifiers.contains(Modifiers::STATIC) && self.is_token(SyntaxKind::OpenBraceToken) {
            self.skip_balanced(SkipMode::Code);
            return Some(ClassMember {
                span: self.span_from(start),
                modifiers,
                kind: ClassMemberKind::StaticBlock,
            });
        }

        if self.is_token(SyntaxKind::OpenBracketToken) && self.is_index_signature_start() {
            let index = self.parse_index_signature(modifiers.contains(Modifiers::READONLY));
            self.parse_optional(SyntaxKind::SemicolonToken);
            return Some(ClassMember {
                span: self.span_from(start),
                modifiers,
                kind: ClassMemberKind::Index(index),
            });
        }

        let is_generator = self.parse_optional(SyntaxKind::AsteriskToken);

        if (self.is_identifier_text("get") || self.is_identifier_text("set"))
            && self.look_ahead(|p| {
                p.next_token();
                !matches!(
                    p.current_token,
                    SyntaxKind::OpenParenToken
                        | SyntaxKind::EqualsToken
                        | SyntaxKind::SemicolonToken
                        | SyntaxKind::ColonToken
                        | SyntaxKind::QuestionToken
                        | SyntaxKind::LessThanToken
                        | SyntaxKind::CloseBraceToken
                ) && !p.has_preceding_line_break()
            })
        {
            let is_getter = self.is_identifier_text("get");
            self.next_token();
            let name = self.parse_property_name();
            let func = self.parse_function_rest(start, None, false, false, true);
            let kind = if is_getter {
                ClassMemberKind::GetAccessor {
                    name,
                    return_type: func.return_type,
                }
            } else {
                ClassMemberKind::SetAccessor {
                    name,
                    param_type: func.params.into_iter().next().and_then(|p| p.type_ann),
                }
            };
            return Some(ClassMember {
                span: self.span_from(start),
                modifiers,
                kind,
            });
        }

        if self.is_identifier_text("constructor")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenParenToken)
            })
        {
            self.next_token();
            let func = self.parse_function_rest(start, None, false, false, true);
            return Some(ClassMember {
                span: self.span_from(start),
                modifiers,
                kind: ClassMemberKind::Constructor(func),
            });
        }

        let name = self.parse_property_name();
        let optional = self.parse_optional(SyntaxKind::QuestionToken);
        self.parse_optional(SyntaxKind::ExclamationToken);

        if self.is_token(SyntaxKind::OpenParenToken) || self.is_token(SyntaxKind::LessThanToken) {
            let func = self.parse_function_rest(
                start,
                None,
                modifiers.contains(Modifiers::ASYNC),
                is_generator,
                true,
            );
            return Some(ClassMember {
                span: self.span_from(start),
                modifiers,
                kind: ClassMemberKind::Method {
                    name,
                    optional,
                    func,
                },
            });
        }

        let type_ann = if self.parse_optional(SyntaxKind::ColonToken) {
            Some(self.parse_type())
        } else {
            None
        };
        let init = if self.parse_optional(SyntaxKind::EqualsToken) {
            Some(self.parse_assignment_expression())
        } else {
            None
        };
        self.parse_semicolon();
        Some(ClassMember {
            span: self.span_from(start),
            modifiers,
            kind: ClassMemberKind::Property {
                name,
                optional,
                type_ann,
                init,
            },
        })
    }

    // =========================================================================
    // Interfaces, type aliases, enums, modules
    // =========================================================================

    fn parse_interface_declaration(&mut self) -> InterfaceDecl {
        self.parse_expected_identifier_text("interface");
        let name = self.parse_identifier();
        let type_params = self.parse_type_parameters();
        let mut extends = Vec::new();
        if self.parse_optional_identifier_text("extends") {
            loop {
                extends.push(self.parse_type_reference());
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
        }
        let members = self.parse_type_members();
        InterfaceDecl {
            name,
            type_params,
            extends,
            members,
        }
    }

    fn parse_type_alias_declaration(&mut self) -> TypeAliasDecl {
        self.parse_expected_identifier_text("type");
        let name = self.parse_identifier();
        let type_params = self.parse_type_parameters();
        self.parse_expected(SyntaxKind::EqualsToken);
        let ty = self.parse_type();
        self.parse_semicolon();
        TypeAliasDecl {
            name,
            type_params,
            ty,
        }
    }

    fn parse_enum_declaration(&mut self, is_const: bool) -> EnumDecl {
        self.parse_expected_identifier_text("enum");
        let name = self.parse_identifier();
        let mut members = Vec::new();
        if self.parse_expected(SyntaxKind::OpenBraceToken) {
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                let start = self.token_pos();
                let member_name = self.parse_property_name();
                let init = if self.parse_optional(SyntaxKind::EqualsToken) {
                    Some(self.parse_assignment_expression())
                } else {
                    None
                };
                members.push(EnumMember {
                    span: self.span_from(start),
                    name: member_name,
                    init,
                });
                if !self.parse_optional(SyntaxKind::CommaToken) {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
        }
        EnumDecl {
            name,
            is_const,
            members,
        }
    }

    fn parse_module_declaration(&mut self) -> ModuleDecl {
        let name = if self.parse_optional_identifier_text("global") {
            ModuleName::Global
        } else {
            self.next_token(); // `namespace` / `module`
            if self.is_token(SyntaxKind::StringLiteral) {
                let start = self.token_pos();
                let value = self.token_value().to_string();
                self.next_token();
                ModuleName::String(value, self.span_from(start))
            } else {
                ModuleName::Identifier(self.parse_entity_name())
            }
        };
        let body = if self.parse_optional(SyntaxKind::OpenBraceToken) {
            let statements = self.parse_statement_list(true);
            self.parse_expected(SyntaxKind::CloseBraceToken);
            Some(statements)
        } else {
            self.parse_semicolon();
            None
        };
        ModuleDecl { name, body }
    }

    // =========================================================================
    // Imports
    // =========================================================================

    fn parse_import_declaration(&mut self) -> StatementKind {
        self.parse_expected_identifier_text("import");
        let mut import = ImportDecl {
            type_only: false,
            default: None,
            namespace: None,
            named: Vec::new(),
            source: String::new(),
            is_require: false,
        };

        if self.is_identifier_text("type")
            && self.look_ahead(|p| {
                p.next_token();
                (p.is_identifier_or_keyword() && !p.is_identifier_text("from"))
                    || p.is_token(SyntaxKind::OpenBraceToken)
                    || p.is_token(SyntaxKind::AsteriskToken)
            })
        {
            self.next_token();
            import.type_only = true;
        }

        if self.is_token(SyntaxKind::StringLiteral) {
            import.source = self.token_value().to_string();
            self.next_token();
            self.skip_import_attributes();
            self.parse_semicolon();
            return StatementKind::Import(import);
        }

        let has_default = self.is_identifier_or_keyword()
            && (!self.is_identifier_text("from")
                || self.look_ahead(|p| {
                    p.next_token();
                    p.is_identifier_text("from")
                        || p.is_token(SyntaxKind::EqualsToken)
                        || p.is_token(SyntaxKind::CommaToken)
                }));
        if has_default {
            let local = self.parse_identifier();
            if self.parse_optional(SyntaxKind::EqualsToken) {
                // `import X = require("m")` or `import X = A.B`.
                if self.is_identifier_text("require")
                    && self.look_ahead(|p| {
                        p.next_token();
                        p.is_token(SyntaxKind::OpenParenToken)
                    })
                {
                    self.next_token();
                    self.next_token();
                    if self.is_token(SyntaxKind::StringLiteral) {
                        import.source = self.token_value().to_string();
                        self.next_token();
                    }
                    self.parse_expected(SyntaxKind::CloseParenToken);
                    self.parse_semicolon();
                    import.namespace = Some(local);
                    import.is_require = true;
                    return StatementKind::Import(import);
                }
                self.parse_entity_name();
                self.parse_semicolon();
                return StatementKind::Other;
            }
            import.default = Some(local);
            if !self.parse_optional(SyntaxKind::CommaToken) {
                return self.finish_import(import);
            }
        }

        if self.parse_optional(SyntaxKind::AsteriskToken) {
            self.parse_expected_identifier_text("as");
            import.namespace = Some(self.parse_identifier());
        } else if self.is_token(SyntaxKind::OpenBraceToken) {
            import.named = self.parse_import_specifiers();
        }
        self.finish_import(import)
    }

    fn finish_import(&mut self, mut import: ImportDecl) -> StatementKind {
        self.parse_expected_identifier_text("from");
        if self.is_token(SyntaxKind::StringLiteral) {
            import.source = self.token_value().to_string();
            self.next_token();
        } else {
            self.parse_error_at_current_token("String literal expected.");
        }
        self.skip_import_attributes();
        self.parse_semicolon();
        StatementKind::Import(import)
    }

    /// `with { type: "json" }` / `assert { ... }`.
    fn skip_import_attributes(&mut self) {
        if (self.is_identifier_text("with") || self.is_identifier_text("assert"))
            && !self.has_preceding_line_break()
        {
            self.next_token();
            if self.is_token(SyntaxKind::OpenBraceToken) {
                self.skip_balanced(SkipMode::Code);
            }
        }
    }

    fn parse_import_specifiers(&mut self) -> Vec<ImportSpecifier> {
        let mut specifiers = Vec::new();
        self.next_token();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            // `{ type as t }` imports a binding named `type`.
            let type_only = self.is_identifier_text("type")
                && self.look_ahead(|p| {
                    p.next_token();
                    (p.is_identifier_or_keyword() && !p.is_identifier_text("as"))
                        || p.is_token(SyntaxKind::StringLiteral)
                });
            if type_only {
                self.next_token();
            }
            let imported = self.parse_module_export_name();
            let local = if self.parse_optional_identifier_text("as") {
                self.parse_identifier()
            } else {
                Ident::new(imported.name.clone(), imported.span)
            };
            specifiers.push(ImportSpecifier {
                imported: imported.name,
                local,
                type_only,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        specifiers
    }

    /// Identifier or string name in import/export specifiers.
    fn parse_module_export_name(&mut self) -> Ident {
        if self.is_token(SyntaxKind::StringLiteral) {
            let start = self.token_pos();
            let name = self.token_value().to_string();
            self.next_token();
            return Ident::new(name, self.span_from(start));
        }
        self.parse_identifier_name()
    }

    // =========================================================================
    // Exports
    // =========================================================================

    fn parse_export_declaration(&mut self, start: u32) -> StatementKind {
        self.parse_expected_identifier_text("export");

        if self.parse_optional(SyntaxKind::EqualsToken) {
            let expression = self.parse_assignment_expression();
            self.parse_semicolon();
            return StatementKind::ExportAssignment(expression);
        }

        if self.is_identifier_text("default") {
            self.next_token();
            return self.parse_export_default(start);
        }

        if self.is_identifier_text("as") {
            // `export as namespace X;`
            self.next_token();
            self.parse_optional_identifier_text("namespace");
            self.parse_identifier();
            self.parse_semicolon();
            return StatementKind::Other;
        }

        if self.is_identifier_text("import") {
            // `export import X = A.B;`
            self.resync_after_error();
            return StatementKind::Other;
        }

        let type_only = self.is_identifier_text("type")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_token(SyntaxKind::OpenBraceToken) || p.is_token(SyntaxKind::AsteriskToken)
            });
        if type_only {
            self.next_token();
        }

        if self.parse_optional(SyntaxKind::AsteriskToken) {
            let alias = if self.parse_optional_identifier_text("as") {
                Some(self.parse_module_export_name())
            } else {
                None
            };
            self.parse_expected_identifier_text("from");
            let source = self.token_value().to_string();
            self.parse_expected(SyntaxKind::StringLiteral);
            self.skip_import_attributes();
            self.parse_semicolon();
            return StatementKind::ExportAll(ExportAll {
                alias,
                source,
                type_only,
            });
        }

        if self.is_token(SyntaxKind::OpenBraceToken) {
            let specifiers = self.parse_export_specifiers();
            let source = if self.parse_optional_identifier_text("from") {
                let source = self.token_value().to_string();
                self.parse_expected(SyntaxKind::StringLiteral);
                self.skip_import_attributes();
                Some(source)
            } else {
                None
            };
            self.parse_semicolon();
            return StatementKind::ExportNamed(ExportNamed {
                specifiers,
                source,
                type_only,
            });
        }

        if self.is_token(SyntaxKind::AtToken) {
            self.skip_decorators();
        }

        let mut modifiers = Modifiers::EXPORT;
        if self.is_identifier_text("declare") {
            self.next_token();
            modifiers |= Modifiers::DECLARE;
        }
        if self.is_declaration_start() {
            return self.parse_declaration_statement(modifiers, start);
        }
        self.parse_error_at_current_token("Declaration expected.");
        self.resync_after_error();
        StatementKind::Other
    }

    fn parse_export_default(&mut self, start: u32) -> StatementKind {
        if self.is_token(SyntaxKind::AtToken) {
            self.skip_decorators();
        }
        let decl = if self.is_identifier_text("function") {
            Some(Declaration::Function(self.parse_function_declaration(start, false)))
        } else if self.is_identifier_text("async")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_text("function") && !p.has_preceding_line_break()
            })
        {
            self.next_token();
            Some(Declaration::Function(self.parse_function_declaration(start, true)))
        } else if self.is_identifier_text("class") {
            Some(Declaration::Class(self.parse_class(start, false)))
        } else if self.is_identifier_text("abstract")
            && self.look_ahead(|p| {
                p.next_token();
                p.is_identifier_text("class")
            })
        {
            self.next_token();
            Some(Declaration::Class(self.parse_class(start, true)))
        } else if self.is_identifier_text("interface") && self.next_is_identifier_on_same_line() {
            Some(Declaration::Interface(self.parse_interface_declaration()))
        } else {
            None
        };
        match decl {
            Some(decl) => StatementKind::ExportDefault(ExportDefault::Declaration(decl)),
            None => {
                let expression = self.parse_assignment_expression();
                self.parse_semicolon();
                StatementKind::ExportDefault(ExportDefault::Expression(expression))
            }
        }
    }

    fn parse_export_specifiers(&mut self) -> Vec<ExportSpecifier> {
        let mut specifiers = Vec::new();
        self.next_token();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            let type_only = self.is_identifier_text("type")
                && self.look_ahead(|p| {
                    p.next_token();
                    (p.is_identifier_or_keyword() && !p.is_identifier_text("as"))
                        || p.is_token(SyntaxKind::StringLiteral)
                });
            if type_only {
                self.next_token();
            }
            let local = self.parse_module_export_name();
            let exported = if self.parse_optional_identifier_text("as") {
                self.parse_module_export_name()
            } else {
                local.clone()
            };
            specifiers.push(ExportSpecifier {
                local,
                exported,
                type_only,
            });
            if !self.parse_optional(SyntaxKind::CommaToken) {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        specifiers
    }
}
