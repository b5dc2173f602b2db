//! Token cursor, tree building and error reporting shared by the grammar productions.

use rowan::{Checkpoint, GreenNodeBuilder, TextRange, TextSize};

use super::ParseLimits;
use super::ast::Root;
use super::cst::{SyntaxKind, SyntaxNode, TokenSet};
use super::lexer::{Token, lex, token_text};
use crate::compile::SourceId;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::{Error, PassResult};

/// Lookaheads allowed without consuming a token before the parser counts as stuck.
pub(super) const STALL_LIMIT: u32 = 256;

/// Work left for one literal: consumed tokens and nesting depth.
#[derive(Debug)]
struct Budget {
    steps: Option<u32>,
    max_depth: Option<u32>,
    depth: u32,
}

impl Budget {
    fn new(limits: ParseLimits) -> Self {
        Self {
            steps: limits.fuel,
            max_depth: limits.max_depth,
            depth: 0,
        }
    }

    fn step(&mut self) -> Result<(), Error> {
        match &mut self.steps {
            Some(0) => Err(Error::ExecFuelExhausted),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn descend(&mut self) -> Result<(), Error> {
        if self.max_depth.is_some_and(|max| self.depth >= max) {
            return Err(Error::RecursionLimitExceeded);
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Recursive-descent parser over the token stream of one literal.
///
/// Trivia is held back in `pending_trivia` and attached to whichever node or token comes next,
/// so nodes never start or end with whitespace.
pub struct Parser<'src> {
    source: &'src str,
    source_id: SourceId,
    tokens: Vec<Token>,
    cursor: usize,
    pending_trivia: Vec<Token>,
    builder: GreenNodeBuilder<'static>,
    diagnostics: Diagnostics,
    budget: Budget,
    /// Spans of the open `(`, `[` and `{` tokens, innermost last.
    openers: Vec<TextRange>,
    last_error_at: Option<TextSize>,
    pub(super) stall: u32,
    fatal: Option<Error>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, source_id: SourceId, limits: ParseLimits) -> Self {
        Self {
            source,
            source_id,
            tokens: lex(source),
            cursor: 0,
            pending_trivia: Vec::new(),
            builder: GreenNodeBuilder::new(),
            diagnostics: Diagnostics::new(),
            budget: Budget::new(limits),
            openers: Vec::new(),
            last_error_at: None,
            stall: STALL_LIMIT,
            fatal: None,
        }
    }

    /// Run the grammar from the root. Fuel and depth exhaustion discard the partial tree.
    pub fn parse(mut self) -> PassResult<Root> {
        self.parse_root();
        self.flush_trivia();
        if let Some(err) = self.fatal {
            return Err(err);
        }
        let root = Root::new(SyntaxNode::new_root(self.builder.finish()));
        Ok((root, self.diagnostics))
    }

    fn fail(&mut self, err: Error) {
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
    }

    // Cursor

    pub(super) fn current(&mut self) -> SyntaxKind {
        self.buffer_trivia();
        self.ensure_progress();
        self.tokens
            .get(self.cursor)
            .map_or(SyntaxKind::Error, |t| t.kind)
    }

    pub(super) fn current_span(&mut self) -> TextRange {
        self.buffer_trivia();
        match self.tokens.get(self.cursor) {
            Some(token) => token.span,
            None => TextRange::empty(TextSize::of(self.source)),
        }
    }

    /// Text of the current non-trivia token, empty at the end of the literal.
    pub(super) fn current_text(&mut self) -> &'src str {
        self.buffer_trivia();
        self.tokens
            .get(self.cursor)
            .map_or("", |token| token_text(self.source, token))
    }

    pub(super) fn currently_is(&mut self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(super) fn currently_is_one_of(&mut self, set: TokenSet) -> bool {
        set.contains(self.current())
    }

    /// Whether the current token is the identifier `keyword`.
    pub(super) fn at_keyword(&mut self, keyword: &str) -> bool {
        self.current() == SyntaxKind::Id && self.current_text() == keyword
    }

    /// Kind of the non-trivia token after the current one.
    pub(super) fn next_is(&mut self, kind: SyntaxKind) -> bool {
        self.buffer_trivia();
        self.ensure_progress();
        self.tokens[self.cursor.min(self.tokens.len())..]
            .iter()
            .filter(|t| !t.kind.is_trivia())
            .nth(1)
            .is_some_and(|t| t.kind == kind)
    }

    /// End of the literal (trailing trivia included) or a fatal error.
    pub(super) fn should_stop(&mut self) -> bool {
        self.buffer_trivia();
        self.cursor >= self.tokens.len() || self.fatal.is_some()
    }

    pub(super) fn buffer_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor)
            && token.kind.is_trivia()
        {
            self.pending_trivia.push(*token);
            self.cursor += 1;
        }
    }

    pub(super) fn flush_trivia(&mut self) {
        for token in std::mem::take(&mut self.pending_trivia) {
            self.builder
                .token(token.kind.into(), token_text(self.source, &token));
        }
    }

    // Tree

    pub(super) fn start_node(&mut self, kind: SyntaxKind) {
        self.flush_trivia();
        self.builder.start_node(kind.into());
    }

    pub(super) fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub(super) fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub(super) fn checkpoint(&mut self) -> Checkpoint {
        self.flush_trivia();
        self.builder.checkpoint()
    }

    pub(super) fn bump(&mut self) {
        let kind = self.current();
        self.bump_remap(kind);
    }

    /// Consume the current token, recording it in the tree as `kind`.
    ///
    /// Contextual keywords are lexed as `Id` and re-tagged here.
    pub(super) fn bump_remap(&mut self, kind: SyntaxKind) {
        self.buffer_trivia();
        let Some(&token) = self.tokens.get(self.cursor) else {
            return;
        };
        if let Err(err) = self.budget.step() {
            self.fail(err);
        }
        self.stall = STALL_LIMIT;
        self.flush_trivia();
        self.builder
            .token(kind.into(), token_text(self.source, &token));
        self.cursor += 1;
    }

    pub(super) fn eat_token(&mut self, kind: SyntaxKind) -> bool {
        let matched = self.currently_is(kind);
        if matched {
            self.bump();
        }
        matched
    }

    /// Eat the identifier `keyword`, recording it as `kind`.
    pub(super) fn eat_keyword(&mut self, keyword: &str, kind: SyntaxKind) -> bool {
        let matched = self.at_keyword(keyword);
        if matched {
            self.bump_remap(kind);
        }
        matched
    }

    /// Eat `kind` or report it missing. Never consumes on mismatch.
    pub(super) fn expect(&mut self, kind: SyntaxKind, what: &str) -> bool {
        self.eat_token(kind) || {
            self.error_expected(DiagnosticKind::UnexpectedToken, what);
            false
        }
    }

    // Nesting

    pub(super) fn enter_recursion(&mut self) -> bool {
        match self.budget.descend() {
            Ok(()) => {
                self.stall = STALL_LIMIT;
                true
            }
            Err(err) => {
                self.fail(err);
                false
            }
        }
    }

    pub(super) fn exit_recursion(&mut self) {
        self.budget.ascend();
        self.stall = STALL_LIMIT;
    }

    /// Remember the current opening token for `close_delimiter`.
    pub(super) fn push_delimiter(&mut self) {
        let span = self.current_span();
        self.openers.push(span);
    }

    /// Close the construct opened by the matching `push_delimiter`.
    ///
    /// A missing closer is reported once, spanning from the opener to the last real token, with
    /// the opener as related location.
    pub(super) fn close_delimiter(
        &mut self,
        close: SyntaxKind,
        kind: DiagnosticKind,
        construct: &str,
    ) {
        let opener = self.openers.pop();
        if self.eat_token(close) {
            return;
        }
        let Some(opener) = opener else {
            return;
        };
        let at = self.current_span();
        if !self.claim_error_position(at.start()) {
            return;
        }
        let end = self.tokens[..self.cursor]
            .iter()
            .rfind(|t| !t.kind.is_trivia())
            .map_or(at.end(), |t| t.span.end());
        self.diagnostics
            .report(
                self.source_id,
                kind,
                TextRange::new(opener.start(), end.max(opener.end())),
            )
            .related_to(format!("{} started here", construct), opener)
            .emit();
    }

    // Errors

    /// One diagnostic per source position; later reports at the same offset are cascades.
    fn claim_error_position(&mut self, at: TextSize) -> bool {
        if self.last_error_at == Some(at) {
            return false;
        }
        self.last_error_at = Some(at);
        true
    }

    pub(super) fn error_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let range = self.current_span();
        if self.claim_error_position(range.start()) {
            self.diagnostics
                .report(self.source_id, kind, range)
                .message(message)
                .emit();
        }
    }

    /// "expected {what}, found {current token}"
    pub(super) fn error_expected(&mut self, kind: DiagnosticKind, what: &str) {
        let found = match self.current_text() {
            "" => "end of input".to_string(),
            text => format!("`{}`", text),
        };
        self.error_msg(kind, format!("expected {}, found {}", what, found));
    }

    /// Report, then swallow the offending token into an `Error` node.
    pub(super) fn error_and_bump_msg(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        self.error_msg(kind, message);
        if !self.should_stop() {
            self.start_node(SyntaxKind::Error);
            self.bump();
            self.finish_node();
        }
    }

    /// Report, then skip to the next token in `recovery`, wrapping what was skipped in an
    /// `Error` node.
    pub(super) fn error_recover(&mut self, kind: DiagnosticKind, what: &str, recovery: TokenSet) {
        let skipping = !self.currently_is_one_of(recovery) && !self.should_stop();
        if skipping {
            self.start_node(SyntaxKind::Error);
        }
        self.error_expected(kind, what);
        if skipping {
            while !self.should_stop() && !self.currently_is_one_of(recovery) {
                self.bump();
            }
            self.finish_node();
        }
    }
}
