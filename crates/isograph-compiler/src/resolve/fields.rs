//! Per-declaration resolution.

use super::directives::{AppliedDirectives, DirectivePosition, validate_directives};
use super::values::{ValueError, VariableScope, check_value, variable_satisfies};
use super::{
    REFETCH_ID_VARIABLE, ResolvedArgument, ResolvedEntrypoint, ResolvedField, ResolvedSelection,
    ResolvedVariable, SelectionKind,
};
use crate::artifact::refetch_sites;
use crate::declaration::{
    Declaration, DeclarationId, DeclarationKind, Selection, SpannedValue, TypeAnnotation,
    VariableDefinition, store_key,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::schema::{ArtifactKind, FieldDefinition, FieldId, FieldKind, SchemaGraph, TypeId};

pub(super) fn resolve_field(
    schema: &SchemaGraph,
    id: DeclarationId,
    declaration: &Declaration,
    diag: &mut Diagnostics,
) -> Option<ResolvedField> {
    let field = schema.field_by_name(&declaration.parent_type.text, &declaration.field_name.text)?;
    let def = schema.field(field);
    if def.declaration() != Some(id) {
        return None;
    }

    let position = match declaration.kind {
        DeclarationKind::Pointer => DirectivePosition::PointerDeclaration,
        _ => DirectivePosition::FieldDeclaration,
    };
    validate_directives(&declaration.directives, position, declaration.source, diag);

    let (artifact_kind, pointer_target) = match def.kind {
        FieldKind::Resolver(kind) => (kind, None),
        FieldKind::Pointer(target) => (ArtifactKind::Eager, Some(target)),
        _ => return None,
    };

    let mut resolver = FieldResolver {
        schema,
        declaration,
        diag,
        scope: VariableScope::new(&declaration.variables),
    };
    let variables = resolver.variable_definitions();
    let selections = resolver.selection_set(&declaration.selections, def.parent);
    resolver.check_reserved_variables(def.parent, &selections);
    resolver.report_unused_variables();

    Some(ResolvedField {
        field,
        declaration: id,
        source: declaration.source,
        parent: def.parent,
        artifact_kind,
        pointer_target,
        variables,
        selections,
    })
}

pub(super) fn resolve_entrypoint(
    schema: &SchemaGraph,
    id: DeclarationId,
    declaration: &Declaration,
    diag: &mut Diagnostics,
) -> Option<ResolvedEntrypoint> {
    let source = declaration.source;
    let applied = validate_directives(
        &declaration.directives,
        DirectivePosition::EntrypointDeclaration,
        source,
        diag,
    );

    let parent_name = &declaration.parent_type;
    let parent = schema
        .type_by_name(&parent_name.text)
        .filter(|t| schema.is_root_type(*t));
    let Some(parent) = parent else {
        diag.report(source, DiagnosticKind::InvalidEntrypoint, parent_name.span)
            .message(format!("`{}` is not a root operation type", parent_name.text))
            .emit();
        return None;
    };

    let field = schema
        .lookup_field(parent, &declaration.field_name.text)
        .filter(|f| {
            let def = schema.field(*f);
            def.declaration().is_some() && matches!(def.kind, FieldKind::Resolver(_))
        });
    let Some(field) = field else {
        diag.report(
            source,
            DiagnosticKind::InvalidEntrypoint,
            declaration.field_name.span,
        )
        .message(format!(
            "`{}` is not a declared resolver field",
            declaration.qualified_name()
        ))
        .emit();
        return None;
    };

    Some(ResolvedEntrypoint {
        declaration: id,
        field,
        parent,
        lazy_load: applied.lazy_load.unwrap_or_default(),
        span: declaration.span(declaration.span),
    })
}

struct FieldResolver<'a, 'd> {
    schema: &'a SchemaGraph,
    declaration: &'a Declaration,
    diag: &'d mut Diagnostics,
    scope: VariableScope<'a>,
}

impl FieldResolver<'_, '_> {
    fn variable_definitions(&mut self) -> Vec<ResolvedVariable> {
        let declaration = self.declaration;
        declaration
            .variables
            .iter()
            .map(|v| {
                self.check_variable_definition(v);
                ResolvedVariable {
                    name: v.name.text.clone(),
                    type_annotation: v.type_ref.annotation.clone(),
                    default_value: v.default_value.as_ref().map(|d| d.value.clone()),
                }
            })
            .collect()
    }

    fn check_variable_definition(&mut self, variable: &VariableDefinition) {
        let source = self.declaration.source;
        let annotation = &variable.type_ref.annotation;
        let is_input = self
            .schema
            .type_by_name(annotation.inner_name())
            .is_some_and(|t| self.schema.ty(t).kind.is_input());
        if !is_input {
            self.diag
                .report(source, DiagnosticKind::InvalidVariableType, variable.type_ref.span)
                .message(format!("`${}: {}`", variable.name.text, annotation))
                .emit();
            return;
        }

        let Some(default) = &variable.default_value else {
            return;
        };
        let mut no_variables = |name: &str, _: &TypeAnnotation| -> Result<(), ValueError> {
            Err(ValueError::Mismatch(format!(
                "`${}` cannot be used in a default value",
                name
            )))
        };
        if let Err(ValueError::Mismatch(detail) | ValueError::UndeclaredVariable(detail)) =
            check_value(self.schema, &default.value, annotation, &mut no_variables)
        {
            self.diag
                .report(source, DiagnosticKind::InvalidDefaultValue, default.span)
                .message(detail)
                .emit();
        }
    }

    /// `$id` belongs to the `node(id: $id)` wrapper, which a field gets when it is declared on a
    /// non-root type (loadable entrypoint) or contains a refetch site.
    fn check_reserved_variables(&mut self, parent: TypeId, selections: &[ResolvedSelection]) {
        let Some(variable) = self
            .declaration
            .variables
            .iter()
            .find(|v| v.name.text == REFETCH_ID_VARIABLE)
        else {
            return;
        };
        if self.schema.is_root_type(parent) && refetch_sites(parent, selections).is_empty() {
            return;
        }
        self.diag
            .report(self.declaration.source, DiagnosticKind::ReservedVariable, variable.name.span)
            .message(&variable.name.text)
            .emit();
    }

    fn report_unused_variables(&mut self) {
        let source = self.declaration.source;
        let unused: Vec<_> = self.scope.unused().collect();
        for variable in unused {
            self.diag
                .report(source, DiagnosticKind::UnusedVariable, variable.name.span)
                .message(&variable.name.text)
                .emit();
        }
    }

    fn selection_set(&mut self, selections: &[Selection], parent: TypeId) -> Vec<ResolvedSelection> {
        selections
            .iter()
            .filter_map(|s| self.selection(s, parent))
            .collect()
    }

    fn selection(&mut self, selection: &Selection, parent: TypeId) -> Option<ResolvedSelection> {
        let source = self.declaration.source;
        let schema = self.schema;

        let Some(field) = schema.lookup_field(parent, &selection.name.text) else {
            self.diag
                .report(source, DiagnosticKind::UnknownField, selection.name.span)
                .message(format!(
                    "{}.{}",
                    schema.type_name(parent),
                    selection.name.text
                ))
                .emit();
            return None;
        };
        let def = schema.field(field);

        let position = match def.kind {
            FieldKind::Scalar => DirectivePosition::ScalarSelection,
            FieldKind::Linked { .. } => DirectivePosition::LinkedSelection,
            FieldKind::Resolver(_) => DirectivePosition::ResolverSelection,
            FieldKind::Pointer(_) => DirectivePosition::PointerSelection,
            FieldKind::Link => DirectivePosition::LinkSelection,
        };
        let applied = validate_directives(&selection.directives, position, source, self.diag);
        let arguments = self.arguments(selection, def, applied.loadable.is_some());

        let kind = match def.kind {
            FieldKind::Scalar => {
                self.forbid_selection_set(selection, field);
                SelectionKind::Scalar {
                    updatable: applied.updatable,
                }
            }
            FieldKind::Link => {
                self.forbid_selection_set(selection, field);
                SelectionKind::Link
            }
            FieldKind::Resolver(artifact_kind) => {
                self.forbid_selection_set(selection, field);
                self.check_loadable(selection, field, artifact_kind, &applied);
                SelectionKind::Resolver {
                    artifact_kind,
                    loadable: applied.loadable,
                }
            }
            FieldKind::Linked {
                target,
                inline_fragment,
            } => SelectionKind::Linked {
                target,
                inline_fragment,
                updatable: applied.updatable,
                selections: self.nested_selections(selection, field, target)?,
            },
            FieldKind::Pointer(target) => {
                if schema.id_field(target).is_none() {
                    self.diag
                        .report(source, DiagnosticKind::PointerTargetRequiresId, selection.name.span)
                        .message(format!(
                            "`{}` points to `{}`",
                            schema.qualified_name(field),
                            schema.type_name(target)
                        ))
                        .emit();
                }
                SelectionKind::Pointer {
                    target,
                    selections: self.nested_selections(selection, field, target)?,
                }
            }
        };

        let store_key = store_key(
            &selection.name.text,
            arguments.iter().map(|a| (a.name.as_str(), &a.value)),
        );
        Some(ResolvedSelection {
            response_name: selection.response_name().text.clone(),
            field_name: selection.name.text.clone(),
            field,
            arguments,
            store_key,
            span: self.declaration.span(selection.span),
            kind,
        })
    }

    fn forbid_selection_set(&mut self, selection: &Selection, field: FieldId) {
        if selection.selection_set.is_some() {
            self.diag
                .report(
                    self.declaration.source,
                    DiagnosticKind::SelectionSetNotAllowed,
                    selection.name.span,
                )
                .message(format!("`{}`", self.schema.qualified_name(field)))
                .emit();
        }
    }

    fn nested_selections(
        &mut self,
        selection: &Selection,
        field: FieldId,
        target: TypeId,
    ) -> Option<Vec<ResolvedSelection>> {
        let source = self.declaration.source;
        match &selection.selection_set {
            Some(nested) if !nested.is_empty() => Some(self.selection_set(nested, target)),
            Some(_) => {
                self.diag
                    .report(source, DiagnosticKind::SelectionSetRequired, selection.name.span)
                    .message(format!(
                        "`{}` selects nothing",
                        self.schema.qualified_name(field)
                    ))
                    .emit();
                None
            }
            None => {
                self.diag
                    .report(source, DiagnosticKind::SelectionSetRequired, selection.name.span)
                    .message(format!("`{}`", self.schema.qualified_name(field)))
                    .emit();
                None
            }
        }
    }

    fn check_loadable(
        &mut self,
        selection: &Selection,
        field: FieldId,
        artifact_kind: ArtifactKind,
        applied: &AppliedDirectives,
    ) {
        let source = self.declaration.source;
        let schema = self.schema;
        if artifact_kind == ArtifactKind::LoadableAction && applied.loadable.is_none() {
            self.diag
                .report(source, DiagnosticKind::LoadableRequired, selection.name.span)
                .message(format!("`{}`", schema.qualified_name(field)))
                .emit();
        }
        let parent = schema.field(field).parent;
        if applied.loadable.is_some()
            && !schema.is_root_type(parent)
            && schema.id_field(parent).is_none()
        {
            self.diag
                .report(source, DiagnosticKind::LoadableRequiresId, selection.name.span)
                .message(format!("`{}` has no `id: ID!` field", schema.type_name(parent)))
                .emit();
        }
    }

    fn arguments(
        &mut self,
        selection: &Selection,
        def: &FieldDefinition,
        loadable: bool,
    ) -> Vec<ResolvedArgument> {
        let source = self.declaration.source;
        let mut resolved = Vec::with_capacity(selection.arguments.len());

        for arg in &selection.arguments {
            let Some(arg_def) = def.argument(&arg.name.text) else {
                self.diag
                    .report(source, DiagnosticKind::UnknownArgument, arg.name.span)
                    .message(&arg.name.text)
                    .emit();
                continue;
            };
            self.argument_value(&arg.name.text, &arg.value, &arg_def.type_annotation);
            resolved.push(ResolvedArgument {
                name: arg.name.text.clone(),
                value: arg.value.value.clone(),
            });
        }

        // Loadable selections may receive arguments at load time
        if !loadable {
            for arg_def in def.arguments.iter().filter(|a| a.is_required()) {
                if !selection.arguments.iter().any(|a| a.name.text == arg_def.name) {
                    self.diag
                        .report(source, DiagnosticKind::MissingArgument, selection.name.span)
                        .message(&arg_def.name)
                        .emit();
                }
            }
        }
        resolved
    }

    fn argument_value(&mut self, name: &str, value: &SpannedValue, expected: &TypeAnnotation) {
        let source = self.declaration.source;
        let scope = &mut self.scope;
        let mut variable = |var: &str, expected: &TypeAnnotation| {
            let Some(definition) = scope.use_variable(var) else {
                return Err(ValueError::UndeclaredVariable(var.to_string()));
            };
            if variable_satisfies(definition, expected) {
                Ok(())
            } else {
                Err(ValueError::Mismatch(format!(
                    "variable `${}` of type `{}` cannot be used as `{}`",
                    var, definition.type_ref.annotation, expected
                )))
            }
        };

        match check_value(self.schema, &value.value, expected, &mut variable) {
            Ok(()) => {}
            Err(ValueError::UndeclaredVariable(var)) => {
                self.diag
                    .report(source, DiagnosticKind::UndeclaredVariable, value.span)
                    .message(var)
                    .emit();
            }
            Err(ValueError::Mismatch(detail)) => {
                self.diag
                    .report(source, DiagnosticKind::ArgumentTypeMismatch, value.span)
                    .message(format!("`{}` {}", name, detail))
                    .emit();
            }
        }
    }
}
