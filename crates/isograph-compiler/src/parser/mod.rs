//! Parser infrastructure for iso literals.
//!
//! # Architecture
//!
//! The parser produces a lossless concrete syntax tree (CST) via Rowan's green tree builder,
//! then lowers it into the owned [`Declaration`] model used by every later stage.
//!
//! - Zero-copy lexing: tokens carry spans, text sliced only when building tree nodes
//! - Trivia buffering: whitespace/comments collected, then attached as leading trivia
//! - Contextual keywords: `field`, `pointer`, `to`, `true`... are lexed as identifiers and
//!   re-tagged only in keyword position, so they stay valid field names
//!
//! # Recovery Strategy
//!
//! The parser is resilient: it always produces a tree.
//!
//! 1. Unexpected tokens get wrapped in `SyntaxKind::Error` nodes and consumed
//! 2. Missing expected tokens emit a diagnostic but don't consume (parent may handle)
//! 3. Unclosed delimiters are reported once, pointing back at the opener
//!
//! Fuel exhaustion (exec fuel, recursion depth) returns an actual error immediately.

pub mod ast;
pub mod cst;
pub mod lexer;

mod core;
mod grammar;
mod invariants;
mod lower;

#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod tests;

use std::fmt::Write;

use rowan::NodeOrToken;

pub use cst::{SyntaxKind, SyntaxNode, SyntaxToken};

pub use core::Parser;

use crate::PassResult;
use crate::compile::SourceId;
use crate::declaration::Declaration;

/// Parser limits. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseLimits {
    pub fuel: Option<u32>,
    pub max_depth: Option<u32>,
}

/// Parse one literal into its CST. Returns `Err` on fuel exhaustion.
pub fn parse_cst(source: &str, source_id: SourceId, limits: ParseLimits) -> PassResult<ast::Root> {
    Parser::new(source, source_id, limits).parse()
}

/// Parse one literal and lower it into a [`Declaration`].
///
/// The declaration is `None` when the literal is too broken to lower; parse diagnostics explain
/// why. A declaration may still come back alongside errors; callers drop it in that case.
pub fn parse_declaration(
    source: &str,
    source_id: SourceId,
    limits: ParseLimits,
) -> PassResult<Option<Declaration>> {
    let (root, mut diagnostics) = parse_cst(source, source_id, limits)?;
    let declaration = lower::lower(&root, source_id, &mut diagnostics);
    Ok((declaration, diagnostics))
}

/// Indented dump of a CST: node kinds, then tokens with their text.
pub fn dump_cst(node: &SyntaxNode, trivia: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = format_cst(node, 0, trivia, &mut out);
    out
}

fn format_cst(
    node: &SyntaxNode,
    indent: usize,
    trivia: bool,
    w: &mut impl Write,
) -> std::fmt::Result {
    let prefix = "  ".repeat(indent);
    writeln!(w, "{}{:?}", prefix, node.kind())?;
    for child in node.children_with_tokens() {
        match child {
            NodeOrToken::Node(n) => format_cst(&n, indent + 1, trivia, w)?,
            NodeOrToken::Token(t) => {
                if !trivia && t.kind().is_trivia() {
                    continue;
                }
                writeln!(w, "{}  {:?} {:?}", prefix, t.kind(), t.text())?;
            }
        }
    }
    Ok(())
}
