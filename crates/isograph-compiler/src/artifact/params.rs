//! Shape of the value a field's resolver receives, renderable as a TypeScript type.

use std::fmt::Write;

use serde::Serialize;

use super::{ArtifactId, ArtifactKind};
use crate::declaration::TypeAnnotation;
use crate::resolve::{ResolvedSelection, SelectionKind};
use crate::schema::{FieldId, SchemaGraph, TypeKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterShape {
    /// `Type__field__param`
    pub type_name: String,
    pub fields: Vec<ParameterField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: ParameterType,
    /// Updatable fields are assignable and lose their `readonly` marker.
    pub updatable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum ParameterType {
    /// A server scalar, by GraphQL name.
    Scalar { name: String },
    Enum { values: Vec<String> },
    Nullable { inner: Box<ParameterType> },
    List { item: Box<ParameterType> },
    Object { fields: Vec<ParameterField> },
    ResolverOutput { artifact: ArtifactId },
    RefetchAction,
    Loadable { artifact: ArtifactId },
    Link,
}

pub(super) fn generate(
    schema: &SchemaGraph,
    id: &ArtifactId,
    selections: &[ResolvedSelection],
) -> ParameterShape {
    ParameterShape {
        type_name: format!("{}__param", id.stem()),
        fields: fields(schema, selections),
    }
}

fn fields(schema: &SchemaGraph, selections: &[ResolvedSelection]) -> Vec<ParameterField> {
    selections
        .iter()
        .map(|selection| {
            let (ty, updatable) = field_type(schema, selection);
            ParameterField {
                name: selection.response_name.clone(),
                ty,
                updatable,
            }
        })
        .collect()
}

fn field_type(schema: &SchemaGraph, selection: &ResolvedSelection) -> (ParameterType, bool) {
    let annotation = schema.field(selection.field).type_annotation.as_ref();
    match &selection.kind {
        SelectionKind::Scalar { updatable } => {
            let leaf = scalar_leaf(schema, annotation.map_or("String", |a| a.inner_name()));
            (wrap(annotation, leaf), *updatable)
        }
        SelectionKind::Linked {
            updatable,
            selections,
            ..
        } => {
            let leaf = ParameterType::Object {
                fields: fields(schema, selections),
            };
            (wrap(annotation, leaf), *updatable)
        }
        SelectionKind::Pointer { selections, .. } => {
            let leaf = ParameterType::Object {
                fields: fields(schema, selections),
            };
            (wrap(annotation, leaf), false)
        }
        SelectionKind::Resolver {
            artifact_kind: ArtifactKind::RefetchAction,
            loadable: None,
        } => (ParameterType::RefetchAction, false),
        SelectionKind::Resolver {
            artifact_kind,
            loadable: None,
        } => (
            ParameterType::ResolverOutput {
                artifact: declared_id(schema, selection.field, *artifact_kind),
            },
            false,
        ),
        SelectionKind::Resolver {
            artifact_kind,
            loadable: Some(_),
        } => (
            ParameterType::Loadable {
                artifact: declared_id(schema, selection.field, *artifact_kind),
            },
            false,
        ),
        SelectionKind::Link => (ParameterType::Link, false),
    }
}

fn declared_id(schema: &SchemaGraph, field: FieldId, artifact_kind: ArtifactKind) -> ArtifactId {
    let parent = schema.field(field).parent;
    ArtifactId::reader(
        schema.type_name(parent),
        schema.field_name(field),
        artifact_kind,
    )
}

fn scalar_leaf(schema: &SchemaGraph, name: &str) -> ParameterType {
    match schema.type_by_name(name).map(|id| schema.ty(id)) {
        Some(ty) if ty.kind == TypeKind::Enum => ParameterType::Enum {
            values: ty.enum_values.clone(),
        },
        _ => ParameterType::Scalar {
            name: name.to_string(),
        },
    }
}

/// Apply the list and nullability wrappers of `annotation` around `leaf`.
fn wrap(annotation: Option<&TypeAnnotation>, leaf: ParameterType) -> ParameterType {
    match annotation {
        None => leaf,
        Some(TypeAnnotation::NonNull(inner)) => wrap_non_null(inner, leaf),
        Some(other) => ParameterType::Nullable {
            inner: Box::new(wrap_non_null(other, leaf)),
        },
    }
}

fn wrap_non_null(annotation: &TypeAnnotation, leaf: ParameterType) -> ParameterType {
    match annotation {
        TypeAnnotation::Named(_) => leaf,
        TypeAnnotation::List(item) => ParameterType::List {
            item: Box::new(wrap(Some(item), leaf)),
        },
        TypeAnnotation::NonNull(inner) => wrap_non_null(inner, leaf),
    }
}

impl ParameterShape {
    pub fn to_typescript(&self) -> String {
        let mut out = String::new();
        let _ = write!(out, "export type {} = ", self.type_name);
        render_object(&self.fields, 0, &mut out);
        out.push_str(";\n");
        out
    }
}

impl ParameterType {
    pub fn to_typescript(&self) -> String {
        let mut out = String::new();
        render(self, 0, &mut out);
        out
    }
}

fn render_object(fields: &[ParameterField], indent: usize, out: &mut String) {
    if fields.is_empty() {
        out.push_str("{}");
        return;
    }
    out.push_str("{\n");
    let pad = "  ".repeat(indent + 1);
    for field in fields {
        out.push_str(&pad);
        if !field.updatable {
            out.push_str("readonly ");
        }
        let _ = write!(out, "{}: ", field.name);
        render(&field.ty, indent + 1, out);
        out.push_str(",\n");
    }
    out.push_str(&"  ".repeat(indent));
    out.push('}');
}

fn render(ty: &ParameterType, indent: usize, out: &mut String) {
    match ty {
        ParameterType::Scalar { name } => out.push_str(scalar_typescript(name)),
        ParameterType::Enum { values } => {
            let union = values
                .iter()
                .map(|v| format!("\"{}\"", v))
                .collect::<Vec<_>>()
                .join(" | ");
            out.push_str(&union);
        }
        ParameterType::Nullable { inner } => {
            out.push('(');
            render(inner, indent, out);
            out.push_str(" | null)");
        }
        ParameterType::List { item } => {
            out.push_str("ReadonlyArray<");
            render(item, indent, out);
            out.push('>');
        }
        ParameterType::Object { fields } => render_object(fields, indent, out),
        ParameterType::ResolverOutput { artifact } => {
            let _ = write!(out, "ReturnType<typeof {}__resolver>", artifact.stem());
        }
        ParameterType::RefetchAction => out.push_str("() => void"),
        ParameterType::Loadable { artifact } => {
            let _ = write!(
                out,
                "LoadableField<ReturnType<typeof {}__resolver>>",
                artifact.stem()
            );
        }
        ParameterType::Link => out.push_str("Link"),
    }
}

fn scalar_typescript(name: &str) -> &'static str {
    match name {
        "ID" | "String" => "string",
        "Int" | "Float" => "number",
        "Boolean" => "boolean",
        _ => "unknown",
    }
}
