use crate::diagnostics::DiagnosticKind;
use crate::parser::Parser;
use crate::parser::cst::SyntaxKind;

impl Parser<'_> {
    /// `{ selection, selection ... }`
    ///
    /// Separators are optional: commas and newlines are both trivia-like here.
    pub(crate) fn parse_selection_set(&mut self) {
        self.assert_current(SyntaxKind::BraceOpen);
        if !self.enter_recursion() {
            return;
        }

        self.start_node(SyntaxKind::SelectionSet);
        self.push_delimiter();
        self.bump();

        while !self.should_stop() && !self.currently_is(SyntaxKind::BraceClose) {
            match self.current() {
                SyntaxKind::Comma => self.bump(),
                SyntaxKind::Id => self.parse_selection(),
                _ => {
                    let found = self.current_text();
                    self.error_and_bump_msg(
                        DiagnosticKind::UnexpectedToken,
                        format!("expected a field selection, found `{}`", found),
                    );
                }
            }
        }

        self.close_delimiter(
            SyntaxKind::BraceClose,
            DiagnosticKind::UnclosedBrace,
            "selection set",
        );
        self.finish_node();
        self.exit_recursion();
    }

    /// `alias: name(args) @directives { selections }`
    fn parse_selection(&mut self) {
        self.start_node(SyntaxKind::Selection);

        if self.next_is(SyntaxKind::Colon) {
            self.start_node(SyntaxKind::Alias);
            self.bump();
            self.bump();
            self.finish_node();
        }

        if !self.expect_name("a field name") {
            self.finish_node();
            return;
        }

        if self.currently_is(SyntaxKind::ParenOpen) {
            self.parse_arguments();
        }
        self.parse_directives();
        if self.currently_is(SyntaxKind::BraceOpen) {
            self.parse_selection_set();
        }

        self.finish_node();
    }

    /// `@name(args)*`
    pub(crate) fn parse_directives(&mut self) {
        while self.currently_is(SyntaxKind::At) && !self.should_stop() {
            self.start_node(SyntaxKind::Directive);
            self.bump();
            if self.expect_name("a directive name") && self.currently_is(SyntaxKind::ParenOpen) {
                self.parse_arguments();
            }
            self.finish_node();
        }
    }

    /// `(name: value, ...)`
    pub(crate) fn parse_arguments(&mut self) {
        self.assert_current(SyntaxKind::ParenOpen);
        self.start_node(SyntaxKind::Arguments);
        self.push_delimiter();
        self.bump();

        while !self.should_stop() && !self.currently_is(SyntaxKind::ParenClose) {
            match self.current() {
                SyntaxKind::Comma => self.bump(),
                SyntaxKind::Id => self.parse_argument(),
                SyntaxKind::BraceOpen | SyntaxKind::BraceClose => break,
                _ => {
                    let found = self.current_text();
                    self.error_and_bump_msg(
                        DiagnosticKind::UnexpectedToken,
                        format!("expected an argument, found `{}`", found),
                    );
                }
            }
        }

        self.close_delimiter(
            SyntaxKind::ParenClose,
            DiagnosticKind::UnclosedParen,
            "argument list",
        );
        self.finish_node();
    }

    fn parse_argument(&mut self) {
        self.start_node(SyntaxKind::Argument);
        self.bump();
        if self.expect(SyntaxKind::Colon, "`:` after the argument name") {
            self.parse_value("an argument value");
        }
        self.finish_node();
    }
}
