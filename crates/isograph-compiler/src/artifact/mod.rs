//! Per-field artifacts: normalization AST, reader AST, parameter shape and updatable locations.
//!
//! Both trees are generated from the same resolved selections and address the store through the
//! same canonical store keys, so data written with one is always visible through the other.

mod dump;
mod normalization;
mod params;
mod reader;

#[cfg(test)]
mod artifact_tests;

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::declaration::Value;
use crate::resolve::{Resolution, ResolvedArgument, ResolvedField, map_in_order};
use crate::schema::{FieldId, SchemaGraph};

pub use crate::schema::ArtifactKind;
pub(crate) use normalization::concrete_type;
pub use dump::{dump_normalization_ast, dump_reader_ast};
pub use normalization::{NormalizationAst, NormalizationNode};
pub use params::{ParameterField, ParameterShape, ParameterType};
pub use reader::{
    ReaderAst, ReaderNode, RefetchSite, RefetchSiteKind, UpdatableDescriptor, UpdatableLocation,
    refetch_sites,
};

/// What an artifact is for: reading a field, or fetching it as an entrypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum ArtifactRole {
    Reader { artifact_kind: ArtifactKind },
    Entrypoint,
}

/// `(TypeName, FieldName, role)`: the key the source-rewriting layer imports artifacts by.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactId {
    pub type_name: String,
    pub field_name: String,
    pub role: ArtifactRole,
}

impl ArtifactId {
    pub fn reader(type_name: &str, field_name: &str, artifact_kind: ArtifactKind) -> Self {
        Self {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
            role: ArtifactRole::Reader { artifact_kind },
        }
    }

    pub fn entrypoint(type_name: &str, field_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
            role: ArtifactRole::Entrypoint,
        }
    }

    /// `Type__field`, the stem of generated module and type names.
    pub fn stem(&self) -> String {
        format!("{}__{}", self.type_name, self.field_name)
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            ArtifactRole::Reader { .. } => write!(f, "{}.{}", self.type_name, self.field_name),
            ArtifactRole::Entrypoint => {
                write!(f, "{}.{} (entrypoint)", self.type_name, self.field_name)
            }
        }
    }
}

/// An argument as handed to the runtime. Variables stay symbolic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgumentArtifact {
    pub name: String,
    pub value: ArgumentValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ArgumentValue {
    Variable { name: String },
    Literal { value: serde_json::Value },
    Enum { value: String },
    List { items: Vec<ArgumentValue> },
    Object { fields: Vec<ArgumentArtifact> },
}

impl From<&Value> for ArgumentValue {
    fn from(value: &Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Value::Variable(name) => ArgumentValue::Variable { name: name.clone() },
            Value::Int(i) => ArgumentValue::Literal {
                value: Json::from(*i),
            },
            Value::Float(text) => ArgumentValue::Literal {
                value: text
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map_or_else(|| Json::String(text.clone()), Json::Number),
            },
            Value::String(s) => ArgumentValue::Literal {
                value: Json::String(s.clone()),
            },
            Value::Boolean(b) => ArgumentValue::Literal {
                value: Json::Bool(*b),
            },
            Value::Null => ArgumentValue::Literal { value: Json::Null },
            Value::Enum(e) => ArgumentValue::Enum { value: e.clone() },
            Value::List(items) => ArgumentValue::List {
                items: items.iter().map(ArgumentValue::from).collect(),
            },
            Value::Object(fields) => ArgumentValue::Object {
                fields: fields
                    .iter()
                    .map(|(name, v)| ArgumentArtifact {
                        name: name.clone(),
                        value: v.into(),
                    })
                    .collect(),
            },
        }
    }
}

pub(crate) fn argument_artifacts(arguments: &[ResolvedArgument]) -> Vec<ArgumentArtifact> {
    arguments
        .iter()
        .map(|a| ArgumentArtifact {
            name: a.name.clone(),
            value: (&a.value).into(),
        })
        .collect()
}

/// Everything generated for one declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldArtifacts {
    pub id: ArtifactId,
    #[serde(skip)]
    pub field: FieldId,
    pub normalization_ast: NormalizationAst,
    pub reader_ast: ReaderAst,
    pub parameters: ParameterShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updatable: Option<UpdatableDescriptor>,
}

/// Reader artifact id of a declared field.
pub(crate) fn field_artifact_id(schema: &SchemaGraph, field: &ResolvedField) -> ArtifactId {
    ArtifactId::reader(
        schema.type_name(field.parent),
        schema.field_name(field.field),
        field.artifact_kind,
    )
}

pub fn generate_field_artifacts(schema: &SchemaGraph, field: &ResolvedField) -> FieldArtifacts {
    let id = field_artifact_id(schema, field);
    let normalization_ast = normalization::generate(schema, &field.selections);
    let (reader_ast, updatable) = reader::generate(schema, &field.selections);
    let parameters = params::generate(schema, &id, &field.selections);
    debug!(artifact = %id, "generated field artifacts");
    FieldArtifacts {
        id,
        field: field.field,
        normalization_ast,
        reader_ast,
        parameters,
        updatable,
    }
}

/// Artifacts for every resolved field, in declaration order.
#[instrument(skip_all, fields(fields = resolution.fields.len()))]
pub fn generate_all(schema: &SchemaGraph, resolution: &Resolution) -> IndexMap<FieldId, FieldArtifacts> {
    let fields: Vec<&ResolvedField> = resolution.fields.values().collect();
    let artifacts: IndexMap<_, _> = map_in_order(&fields, |_, field| {
        (field.field, generate_field_artifacts(schema, field))
    })
    .into_iter()
    .collect();
    info!(artifacts = artifacts.len(), "field artifacts generated");
    artifacts
}
