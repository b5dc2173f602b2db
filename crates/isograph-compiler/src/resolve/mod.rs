//! Selection resolution.
//!
//! Walks every parsed declaration against the [`SchemaGraph`], classifies each selection by field
//! kind, validates directives, arguments and variables, and assigns canonical store keys.
//! Problems are collected per declaration; a declaration with any error produces no resolved
//! field, while its siblings still resolve.

mod directives;
mod fields;
mod values;

#[cfg(test)]
mod directives_tests;
#[cfg(test)]
mod fields_tests;

use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use crate::compile::SourceId;
use crate::declaration::{Declaration, DeclarationId, DeclarationKind, TypeAnnotation, Value};
use crate::diagnostics::{DiagnosticKind, Diagnostics, Span};
use crate::schema::{ArtifactKind, FieldId, SchemaGraph, TypeId};

pub use directives::{LazyLoad, LoadableOptions};

/// Variable holding the record id in `node(id: $id)` refetch queries. Fields that can be
/// refetched may not declare it themselves.
pub const REFETCH_ID_VARIABLE: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArgument {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSelection {
    /// Alias if given, otherwise the field name.
    pub response_name: String,
    pub field_name: String,
    pub field: FieldId,
    pub arguments: Vec<ResolvedArgument>,
    /// Field name plus one chunk per argument; the key in the normalized store.
    pub store_key: String,
    pub span: Span,
    pub kind: SelectionKind,
}

impl ResolvedSelection {
    pub fn is_loadable(&self) -> bool {
        matches!(
            self.kind,
            SelectionKind::Resolver {
                loadable: Some(_),
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionKind {
    Scalar {
        updatable: bool,
    },
    Linked {
        target: TypeId,
        inline_fragment: bool,
        updatable: bool,
        selections: Vec<ResolvedSelection>,
    },
    Resolver {
        artifact_kind: ArtifactKind,
        loadable: Option<LoadableOptions>,
    },
    Pointer {
        target: TypeId,
        selections: Vec<ResolvedSelection>,
    },
    Link,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariable {
    pub name: String,
    pub type_annotation: TypeAnnotation,
    pub default_value: Option<Value>,
}

/// A declared resolver or pointer field that passed resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub field: FieldId,
    pub declaration: DeclarationId,
    pub source: SourceId,
    pub parent: TypeId,
    /// `Eager` for pointers, which compute their link on read.
    pub artifact_kind: ArtifactKind,
    pub pointer_target: Option<TypeId>,
    pub variables: Vec<ResolvedVariable>,
    pub selections: Vec<ResolvedSelection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntrypoint {
    pub declaration: DeclarationId,
    pub field: FieldId,
    pub parent: TypeId,
    pub lazy_load: LazyLoad,
    pub span: Span,
}

/// Everything that resolved cleanly, keyed and ordered by declaration.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub fields: IndexMap<FieldId, ResolvedField>,
    pub entrypoints: Vec<ResolvedEntrypoint>,
}

impl Resolution {
    pub fn field(&self, id: FieldId) -> Option<&ResolvedField> {
        self.fields.get(&id)
    }
}

enum Resolved {
    Field(ResolvedField),
    Entrypoint(ResolvedEntrypoint),
}

/// Resolve all declarations. `declarations[i]` is `DeclarationId(i)`.
#[instrument(skip_all, fields(declarations = declarations.len()))]
pub fn resolve(schema: &SchemaGraph, declarations: &[Declaration]) -> (Resolution, Diagnostics) {
    let outcomes = map_in_order(declarations, |index, declaration| {
        let id = DeclarationId(index as u32);
        let mut diag = Diagnostics::new();
        let resolved = match declaration.kind {
            DeclarationKind::Entrypoint => {
                fields::resolve_entrypoint(schema, id, declaration, &mut diag)
                    .map(Resolved::Entrypoint)
            }
            DeclarationKind::Field | DeclarationKind::Pointer => {
                fields::resolve_field(schema, id, declaration, &mut diag).map(Resolved::Field)
            }
        };
        // A declaration with errors yields nothing
        let resolved = resolved.filter(|_| !diag.has_errors());
        (resolved, diag)
    });

    let mut resolution = Resolution::default();
    let mut diagnostics = Diagnostics::new();
    let mut entrypoint_fields: IndexMap<FieldId, DeclarationId> = IndexMap::new();

    for (resolved, diag) in outcomes {
        diagnostics.extend(diag);
        match resolved {
            Some(Resolved::Field(field)) => {
                debug!(field = %schema.qualified_name(field.field), "resolved field");
                resolution.fields.insert(field.field, field);
            }
            Some(Resolved::Entrypoint(entrypoint)) => {
                if entrypoint_fields.contains_key(&entrypoint.field) {
                    let declaration = &declarations[entrypoint.declaration.index()];
                    diagnostics
                        .report(
                            declaration.source,
                            DiagnosticKind::DuplicateEntrypoint,
                            declaration.field_name.span,
                        )
                        .message(schema.qualified_name(entrypoint.field))
                        .emit();
                    continue;
                }
                entrypoint_fields.insert(entrypoint.field, entrypoint.declaration);
                resolution.entrypoints.push(entrypoint);
            }
            None => {}
        }
    }

    info!(
        fields = resolution.fields.len(),
        entrypoints = resolution.entrypoints.len(),
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "resolution finished"
    );
    (resolution, diagnostics)
}

/// Apply `f` to every item, in parallel with the `parallel` feature, keeping input order.
#[cfg(feature = "parallel")]
pub(crate) fn map_in_order<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(usize, &T) -> R + Sync + Send,
{
    use rayon::prelude::*;
    items.par_iter().enumerate().map(|(i, item)| f(i, item)).collect()
}

/// Apply `f` to every item, in parallel with the `parallel` feature, keeping input order.
#[cfg(not(feature = "parallel"))]
pub(crate) fn map_in_order<T, R, F>(items: &[T], f: F) -> Vec<R>
where
    F: Fn(usize, &T) -> R,
{
    items.iter().enumerate().map(|(i, item)| f(i, item)).collect()
}
