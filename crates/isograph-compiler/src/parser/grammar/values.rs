use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;
use crate::parser::cst::token_sets::VALUE_FIRST;

impl Parser<'_> {
    /// Literal, variable, list or object value. Reports `what` when no value starts here.
    pub(crate) fn parse_value(&mut self, what: &str) {
        if !self.currently_is_one_of(VALUE_FIRST) {
            self.error_expected(DiagnosticKind::ExpectedValue, what);
            return;
        }
        if !self.enter_recursion() {
            return;
        }

        match self.current() {
            SyntaxKind::Dollar => self.parse_variable(),
            SyntaxKind::BracketOpen => self.parse_list_value(),
            SyntaxKind::BraceOpen => self.parse_object_value(),
            SyntaxKind::Id => {
                let kind = match self.current_text() {
                    "true" => SyntaxKind::KwTrue,
                    "false" => SyntaxKind::KwFalse,
                    "null" => SyntaxKind::KwNull,
                    _ => SyntaxKind::Id,
                };
                self.start_node(SyntaxKind::Literal);
                self.bump_remap(kind);
                self.finish_node();
            }
            _ => {
                self.start_node(SyntaxKind::Literal);
                self.bump();
                self.finish_node();
            }
        }

        self.exit_recursion();
    }

    /// `$name`
    pub(crate) fn parse_variable(&mut self) {
        self.assert_current(SyntaxKind::Dollar);
        self.start_node(SyntaxKind::Variable);
        self.bump();
        self.expect_name("a variable name");
        self.finish_node();
    }

    fn parse_list_value(&mut self) {
        self.start_node(SyntaxKind::ListValue);
        self.push_delimiter();
        self.bump();

        while !self.should_stop() && !self.currently_is(SyntaxKind::BracketClose) {
            if self.eat_token(SyntaxKind::Comma) {
                continue;
            }
            if self.currently_is_one_of(VALUE_FIRST) {
                self.parse_value("a list item");
                continue;
            }
            if self.currently_is(SyntaxKind::ParenClose) || self.currently_is(SyntaxKind::BraceClose)
            {
                break;
            }
            let found = self.current_text();
            self.error_and_bump_msg(
                DiagnosticKind::UnexpectedToken,
                format!("expected a list item, found `{}`", found),
            );
        }

        self.close_delimiter(
            SyntaxKind::BracketClose,
            DiagnosticKind::UnclosedBracket,
            "list",
        );
        self.finish_node();
    }

    fn parse_object_value(&mut self) {
        self.start_node(SyntaxKind::ObjectValue);
        self.push_delimiter();
        self.bump();

        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            match self.current() {
                SyntaxKind::Comma => self.bump(),
                SyntaxKind::Id => {
                    self.start_node(SyntaxKind::ObjectField);
                    self.bump();
                    if self.expect(SyntaxKind::Colon, "`:` after the field name") {
                        self.parse_value("a field value");
                    }
                    self.finish_node();
                }
                SyntaxKind::ParenClose | SyntaxKind::BracketClose => break,
                _ => {
                    let found = self.current_text();
                    self.error_and_bump_msg(
                        DiagnosticKind::UnexpectedToken,
                        format!("expected an object field, found `{}`", found),
                    );
                }
            }
        }

        self.close_delimiter(
            SyntaxKind::BraceClose,
            DiagnosticKind::UnclosedBrace,
            "object",
        );
        self.finish_node();
    }
}
