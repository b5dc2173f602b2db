mod message;
mod printer;


use rowan::TextRange;

use crate::compile::SourceId;

pub use message::{
    DiagnosticCategory, DiagnosticKind, DiagnosticMessage, RelatedInfo, Severity, Span,
};
pub use printer::DiagnosticsPrinter;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

#[must_use = "diagnostic not emitted, call .emit()"]
pub struct DiagnosticBuilder<'a> {
    diagnostics: &'a mut Diagnostics,
    message: DiagnosticMessage,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// Create a diagnostic located in one literal.
    ///
    /// Uses the kind's default message. Call `.message()` on the builder to override.
    pub fn report(
        &mut self,
        source: SourceId,
        kind: DiagnosticKind,
        range: TextRange,
    ) -> DiagnosticBuilder<'_> {
        self.report_at(kind, Span::new(source, range))
    }

    pub fn report_at(&mut self, kind: DiagnosticKind, span: Span) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(kind, Some(span)),
        }
    }

    /// Create a diagnostic that has no location in any literal.
    pub fn report_unlocated(&mut self, kind: DiagnosticKind) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder {
            diagnostics: self,
            message: DiagnosticMessage::new(kind, None),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|d| d.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.messages.iter().any(|d| d.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.messages.iter().filter(|d| d.is_warning()).count()
    }

    /// Whether any error is located in `source`.
    pub fn has_errors_in(&self, source: SourceId) -> bool {
        self.messages
            .iter()
            .any(|d| d.is_error() && d.span.is_some_and(|s| s.source == source))
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.messages.iter().map(|d| d.kind).collect()
    }

    /// Returns diagnostics with cascading parse errors suppressed.
    ///
    /// Suppression rules, applied only between diagnostics of the same literal:
    /// 1. Same position: a root-cause error beats a structural one in either order, otherwise
    ///    priority decides
    /// 2. Containment: when a higher-priority span strictly contains another, suppress the inner
    pub fn filtered(&self) -> Diagnostics {
        let mut suppressed = vec![false; self.messages.len()];

        for (i, a) in self.messages.iter().enumerate() {
            for (j, b) in self.messages.iter().enumerate() {
                if i == j || suppressed[i] || suppressed[j] {
                    continue;
                }
                let (Some(sa), Some(sb)) = (a.span, b.span) else {
                    continue;
                };
                if sa.source != sb.source {
                    continue;
                }

                if sa.range.start() == sb.range.start() {
                    if a.kind.outranks_at_same_position(&b.kind) {
                        suppressed[j] = true;
                    }
                    continue;
                }

                if span_strictly_contains(sa.range, sb.range) && a.kind.suppresses(&b.kind) {
                    suppressed[j] = true;
                }
            }
        }

        let messages = self
            .messages
            .iter()
            .zip(suppressed)
            .filter(|(_, s)| !s)
            .map(|(m, _)| m.clone())
            .collect();
        Diagnostics { messages }
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.messages.extend(other.messages);
    }

    /// Plain one-line-per-diagnostic dump, used by tests and logs.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for d in &self.messages {
            out.push_str(&d.to_string());
            out.push('\n');
        }
        out
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticMessage;
    type IntoIter = std::vec::IntoIter<DiagnosticMessage>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> DiagnosticBuilder<'a> {
    /// Provide custom detail for this diagnostic, rendered using the kind's template.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        let detail = msg.into();
        self.message.message = self.message.kind.message(Some(&detail));
        self
    }

    /// Point at a second location in the same literal.
    pub fn related_to(mut self, msg: impl Into<String>, range: TextRange) -> Self {
        let source = match self.message.span {
            Some(span) => span.source,
            None => return self,
        };
        self.message.related.push(RelatedInfo {
            span: Span::new(source, range),
            message: msg.into(),
        });
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn emit(self) {
        self.diagnostics.messages.push(self.message);
    }
}

fn span_strictly_contains(outer: TextRange, inner: TextRange) -> bool {
    outer.start() < inner.start() && inner.end() <= outer.end()
}
