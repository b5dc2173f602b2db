use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::{DESCRIPTION, HEADER_RECOVERY, TYPE_FIRST};

impl Parser<'_> {
    pub fn parse_root(&mut self) {
        self.start_node(SyntaxKind::Root);

        if self.at_keyword("field") {
            self.parse_field_decl();
        } else if self.at_keyword("pointer") {
            self.parse_pointer_decl();
        } else if self.at_keyword("entrypoint") {
            self.parse_entrypoint_decl();
        } else {
            self.error_expected(
                DiagnosticKind::ExpectedDeclaration,
                "`field`, `pointer` or `entrypoint`",
            );
        }

        if !self.should_stop() {
            self.start_node(SyntaxKind::Error);
            self.error_expected(DiagnosticKind::TrailingTokens, "end of literal");
            while !self.should_stop() {
                self.bump();
            }
            self.finish_node();
        }

        self.flush_trivia();
        self.finish_node();
    }

    /// `field Type.name(vars) @directives "description" { selections }`
    fn parse_field_decl(&mut self) {
        self.start_node(SyntaxKind::FieldDecl);
        self.bump_remap(SyntaxKind::KwField);
        self.parse_decl_target();
        self.parse_decl_tail();
        self.finish_node();
    }

    /// `pointer Type.name to Target(vars) @directives { selections }`
    fn parse_pointer_decl(&mut self) {
        self.start_node(SyntaxKind::PointerDecl);
        self.bump_remap(SyntaxKind::KwPointer);
        self.parse_decl_target();

        if self.eat_keyword("to", SyntaxKind::KwTo) {
            if self.currently_is_one_of(TYPE_FIRST) {
                self.parse_type_annotation();
            } else {
                self.error_expected(DiagnosticKind::ExpectedTypeAnnotation, "a target type");
            }
        } else {
            self.error_expected(DiagnosticKind::ExpectedTo, "`to`");
            // `pointer User.friend User { .. }`: keep the target type anyway
            if self.currently_is(SyntaxKind::Id) {
                self.parse_type_annotation();
            }
        }

        self.parse_decl_tail();
        self.finish_node();
    }

    /// `entrypoint Type.name @directives`
    fn parse_entrypoint_decl(&mut self) {
        self.start_node(SyntaxKind::EntrypointDecl);
        self.bump_remap(SyntaxKind::KwEntrypoint);
        self.parse_decl_target();
        self.parse_directives();
        self.finish_node();
    }

    /// `Type.name`
    fn parse_decl_target(&mut self) {
        self.start_node(SyntaxKind::DeclTarget);
        if self.expect_name("a type name") && self.expect(SyntaxKind::Dot, "`.`") {
            self.expect_name("a field name");
        }
        self.finish_node();
    }

    /// Variables, directives, description and the selection set shared by field and pointer
    /// declarations.
    fn parse_decl_tail(&mut self) {
        if !self.currently_is_one_of(HEADER_RECOVERY) && !self.should_stop() {
            self.error_recover(
                DiagnosticKind::UnexpectedToken,
                "a selection set",
                HEADER_RECOVERY,
            );
        }

        if self.currently_is(SyntaxKind::ParenOpen) {
            self.parse_variable_defs();
        }
        self.parse_directives();
        if self.currently_is_one_of(DESCRIPTION) {
            self.start_node(SyntaxKind::Description);
            self.bump();
            self.finish_node();
        }

        if self.currently_is(SyntaxKind::BraceOpen) {
            self.parse_selection_set();
        } else {
            self.error_expected(
                DiagnosticKind::ExpectedSelectionSet,
                "a selection set `{ ... }`",
            );
        }
    }

    /// `($name: Type = default, ...)`
    fn parse_variable_defs(&mut self) {
        self.assert_current(SyntaxKind::ParenOpen);
        self.start_node(SyntaxKind::VariableDefs);
        self.push_delimiter();
        self.bump();

        while !self.should_stop() && !self.currently_is(SyntaxKind::ParenClose) {
            match self.current() {
                SyntaxKind::Comma => self.bump(),
                SyntaxKind::Dollar => self.parse_variable_def(),
                SyntaxKind::BraceOpen | SyntaxKind::At => break,
                _ => {
                    let found = self.current_text();
                    self.error_and_bump_msg(
                        DiagnosticKind::UnexpectedToken,
                        format!("expected a variable definition, found `{}`", found),
                    );
                }
            }
        }

        self.close_delimiter(
            SyntaxKind::ParenClose,
            DiagnosticKind::UnclosedParen,
            "variable list",
        );
        self.finish_node();
    }

    fn parse_variable_def(&mut self) {
        self.start_node(SyntaxKind::VariableDef);
        self.parse_variable();
        if self.expect(SyntaxKind::Colon, "`:` after the variable name") {
            if self.currently_is_one_of(TYPE_FIRST) {
                self.parse_type_annotation();
            } else {
                self.error_expected(DiagnosticKind::ExpectedTypeAnnotation, "a variable type");
            }
            if self.eat_token(SyntaxKind::Equals) {
                self.parse_value("a default value");
            }
        }
        self.finish_node();
    }

    /// `Name`, `[Type]`, either followed by `!`.
    pub(crate) fn parse_type_annotation(&mut self) {
        if !self.enter_recursion() {
            return;
        }

        let checkpoint = self.checkpoint();
        match self.current() {
            SyntaxKind::Id => {
                self.start_node(SyntaxKind::NamedType);
                self.bump();
                self.finish_node();
            }
            SyntaxKind::BracketOpen => {
                self.start_node(SyntaxKind::ListType);
                self.push_delimiter();
                self.bump();
                if self.currently_is_one_of(TYPE_FIRST) {
                    self.parse_type_annotation();
                } else {
                    self.error_expected(DiagnosticKind::ExpectedTypeAnnotation, "a list item type");
                }
                self.close_delimiter(
                    SyntaxKind::BracketClose,
                    DiagnosticKind::UnclosedBracket,
                    "list type",
                );
                self.finish_node();
            }
            _ => {
                self.error_expected(DiagnosticKind::ExpectedTypeAnnotation, "a type");
                self.exit_recursion();
                return;
            }
        }

        if self.currently_is(SyntaxKind::Bang) {
            self.start_node_at(checkpoint, SyntaxKind::NonNullType);
            self.bump();
            self.finish_node();
        }

        self.exit_recursion();
    }

    /// Consume an identifier or report `what` as missing.
    pub(crate) fn expect_name(&mut self, what: &str) -> bool {
        if self.eat_token(SyntaxKind::Id) {
            return true;
        }
        self.error_expected(DiagnosticKind::ExpectedName, what);
        false
    }
}
