//! Directive legality.
//!
//! Every known directive has a static rule: where it may appear, which (boolean) arguments it
//! takes and which directives it cannot be combined with.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::compile::SourceId;
use crate::declaration::{Directive, Value};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DirectivePosition {
    FieldDeclaration,
    PointerDeclaration,
    EntrypointDeclaration,
    ScalarSelection,
    LinkedSelection,
    ResolverSelection,
    PointerSelection,
    LinkSelection,
}

impl fmt::Display for DirectivePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DirectivePosition::FieldDeclaration => "field declarations",
            DirectivePosition::PointerDeclaration => "pointer declarations",
            DirectivePosition::EntrypointDeclaration => "entrypoint declarations",
            DirectivePosition::ScalarSelection => "scalar selections",
            DirectivePosition::LinkedSelection => "linked selections",
            DirectivePosition::ResolverSelection => "resolver selections",
            DirectivePosition::PointerSelection => "pointer selections",
            DirectivePosition::LinkSelection => "link selections",
        };
        f.write_str(text)
    }
}

struct DirectiveRule {
    name: &'static str,
    positions: &'static [DirectivePosition],
    /// Argument names; every directive argument is a `Boolean`.
    arguments: &'static [&'static str],
    excludes: &'static [&'static str],
}

const RULES: &[DirectiveRule] = &[
    DirectiveRule {
        name: "component",
        positions: &[DirectivePosition::FieldDeclaration],
        arguments: &[],
        excludes: &["eager", "loadable"],
    },
    DirectiveRule {
        name: "eager",
        positions: &[DirectivePosition::FieldDeclaration],
        arguments: &[],
        excludes: &["component", "loadable"],
    },
    DirectiveRule {
        name: "loadable",
        positions: &[
            DirectivePosition::FieldDeclaration,
            DirectivePosition::ResolverSelection,
        ],
        arguments: &["lazyLoadArtifact"],
        excludes: &["updatable", "component", "eager"],
    },
    DirectiveRule {
        name: "updatable",
        positions: &[
            DirectivePosition::ScalarSelection,
            DirectivePosition::LinkedSelection,
        ],
        arguments: &[],
        excludes: &["loadable"],
    },
    DirectiveRule {
        name: "lazyLoad",
        positions: &[DirectivePosition::EntrypointDeclaration],
        arguments: &["reader", "normalization"],
        excludes: &[],
    },
];

fn rule(name: &str) -> Option<&'static DirectiveRule> {
    RULES.iter().find(|r| r.name == name)
}

/// Options of a `@loadable` selection or declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadableOptions {
    /// Ship the loaded field's reader artifact separately from the parent's.
    pub lazy_load_artifact: bool,
}

/// `@lazyLoad` on an entrypoint: which of its artifacts are fetched on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LazyLoad {
    pub reader: bool,
    pub normalization: bool,
}

/// The directives that survived validation, in decoded form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AppliedDirectives {
    pub component: bool,
    pub eager: bool,
    pub loadable: Option<LoadableOptions>,
    pub updatable: bool,
    pub lazy_load: Option<LazyLoad>,
}

pub(crate) fn validate_directives(
    directives: &[Directive],
    position: DirectivePosition,
    source: SourceId,
    diag: &mut Diagnostics,
) -> AppliedDirectives {
    let mut applied = AppliedDirectives::default();

    if position == DirectivePosition::PointerDeclaration {
        for directive in directives {
            diag.report(source, DiagnosticKind::DirectiveOnPointer, directive.span)
                .message(&directive.name.text)
                .emit();
        }
        return applied;
    }

    // First occurrence of every known directive, for the exclusion check
    let mut seen: IndexMap<&'static str, &Directive> = IndexMap::new();

    for directive in directives {
        let name = directive.name.text.as_str();
        let Some(rule) = rule(name) else {
            diag.report(source, DiagnosticKind::UnknownDirective, directive.span)
                .message(name)
                .emit();
            continue;
        };
        if seen.contains_key(rule.name) {
            diag.report(source, DiagnosticKind::DuplicateDirective, directive.span)
                .message(name)
                .emit();
            continue;
        }
        seen.insert(rule.name, directive);

        if !rule.positions.contains(&position) {
            let allowed = rule
                .positions
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(" and ");
            diag.report(source, DiagnosticKind::DirectiveNotAllowed, directive.span)
                .message(format!("`@{}` is not allowed on {}", name, position))
                .hint(format!("`@{}` is allowed on {}", name, allowed))
                .emit();
        }

        let flags = boolean_arguments(directive, rule, source, diag);
        let flag = |arg: &str| flags.get(arg).copied().unwrap_or(false);
        match rule.name {
            "component" => applied.component = true,
            "eager" => applied.eager = true,
            "loadable" => {
                applied.loadable = Some(LoadableOptions {
                    lazy_load_artifact: flag("lazyLoadArtifact"),
                })
            }
            "updatable" => applied.updatable = true,
            "lazyLoad" => {
                applied.lazy_load = Some(LazyLoad {
                    reader: flag("reader"),
                    normalization: flag("normalization"),
                })
            }
            _ => {}
        }
    }

    let present: Vec<_> = seen.iter().collect();
    for (i, (first, _)) in present.iter().enumerate() {
        for (second, directive) in &present[i + 1..] {
            let excluded = rule(first).is_some_and(|r| r.excludes.contains(second))
                || rule(second).is_some_and(|r| r.excludes.contains(first));
            if excluded {
                diag.report(source, DiagnosticKind::MutuallyExclusiveDirectives, directive.span)
                    .message(format!("`@{}` and `@{}`", first, second))
                    .emit();
            }
        }
    }

    applied
}

/// Decode the directive's arguments. Invalid ones are reported and left out.
fn boolean_arguments<'d>(
    directive: &'d Directive,
    rule: &DirectiveRule,
    source: SourceId,
    diag: &mut Diagnostics,
) -> IndexMap<&'d str, bool> {
    let mut flags = IndexMap::new();
    for arg in &directive.arguments {
        let name = arg.name.text.as_str();
        if !rule.arguments.contains(&name) {
            diag.report(source, DiagnosticKind::UnknownDirectiveArgument, arg.name.span)
                .message(name)
                .hint(known_arguments_hint(rule))
                .emit();
            continue;
        }
        match &arg.value.value {
            Value::Boolean(b) => {
                flags.insert(name, *b);
            }
            value if !value.is_constant() => {
                diag.report(
                    source,
                    DiagnosticKind::DirectiveArgumentNotConstant,
                    arg.value.span,
                )
                .message(format!("`{}: {}`", name, value))
                .emit();
            }
            value => {
                diag.report(
                    source,
                    DiagnosticKind::DirectiveArgumentTypeMismatch,
                    arg.value.span,
                )
                .message(format!("`{}` expects `Boolean`, found `{}`", name, value))
                .emit();
            }
        }
    }
    flags
}

fn known_arguments_hint(rule: &DirectiveRule) -> String {
    if rule.arguments.is_empty() {
        return format!("`@{}` takes no arguments", rule.name);
    }
    let names = rule
        .arguments
        .iter()
        .map(|a| format!("`{}`", a))
        .collect::<Vec<_>>()
        .join(", ");
    format!("`@{}` accepts {}", rule.name, names)
}
