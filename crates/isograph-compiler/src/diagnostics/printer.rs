//! Builder-pattern printer for rendering diagnostics.

use std::fmt::Write;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};
use rowan::TextRange;

use super::Diagnostics;
use super::message::{DiagnosticMessage, Severity};
use crate::compile::SourceMap;

pub struct DiagnosticsPrinter<'d, 's> {
    diagnostics: &'d Diagnostics,
    sources: Option<&'s SourceMap>,
    colored: bool,
}

impl<'d, 's> DiagnosticsPrinter<'d, 's> {
    pub fn new(diagnostics: &'d Diagnostics) -> Self {
        Self {
            diagnostics,
            sources: None,
            colored: false,
        }
    }

    pub fn sources(mut self, sources: &'s SourceMap) -> Self {
        self.sources = Some(sources);
        self
    }

    pub fn colored(mut self, value: bool) -> Self {
        self.colored = value;
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.format(&mut out);
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        let renderer = if self.colored {
            Renderer::styled()
        } else {
            Renderer::plain()
        };

        for (i, diag) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                w.write_char('\n')?;
            }
            match self.render_snippet(&renderer, diag) {
                Some(rendered) => write!(w, "{}", rendered)?,
                None => self.format_plain(w, diag)?,
            }
        }

        Ok(())
    }

    fn render_snippet(&self, renderer: &Renderer, diag: &DiagnosticMessage) -> Option<String> {
        let span = diag.span?;
        let sources = self.sources?;
        let source = sources.get(span.source)?;
        let content = source.content;

        let mut snippet = Snippet::source(content)
            .line_start(1)
            .path(source.kind.display_name())
            .annotation(
                AnnotationKind::Primary
                    .span(adjust_range(span.range, content.len()))
                    .label(&diag.message),
            );

        for related in &diag.related {
            snippet = snippet.annotation(
                AnnotationKind::Context
                    .span(adjust_range(related.span.range, content.len()))
                    .label(&related.message),
            );
        }

        let level = severity_to_level(diag.severity());
        let mut report: Vec<Group> = vec![level.primary_title(&diag.message).element(snippet)];
        for hint in &diag.hints {
            report.push(Group::with_title(Level::HELP.secondary_title(hint)));
        }

        Some(renderer.render(&report).to_string())
    }

    fn format_plain(&self, w: &mut impl Write, diag: &DiagnosticMessage) -> std::fmt::Result {
        match diag.span {
            None => write!(w, "{}: {}", diag.severity(), diag.message)?,
            Some(_) => write!(w, "{}", diag)?,
        }
        for hint in &diag.hints {
            write!(w, "\nhelp: {}", hint)?;
        }
        Ok(())
    }
}

fn severity_to_level(severity: Severity) -> Level<'static> {
    match severity {
        Severity::Error => Level::ERROR,
        Severity::Warning => Level::WARNING,
    }
}

fn adjust_range(range: TextRange, limit: usize) -> std::ops::Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();

    if start == end {
        return start..(start + 1).min(limit);
    }

    start..end
}

impl Diagnostics {
    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }

    pub fn render(&self, sources: &SourceMap) -> String {
        self.printer().sources(sources).render()
    }
}
