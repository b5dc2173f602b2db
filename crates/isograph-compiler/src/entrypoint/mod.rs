//! Entrypoint assembly.
//!
//! For every declared entrypoint, and every field selected with `@loadable` within the reader
//! closure of an entrypoint, walk the reader closure of the fetched field and emit one merged
//! query document, plus one refetch query per `__refetch` and pointer selection reached along the
//! way. A cycle check over the
//! resolver/pointer reference graph runs first; any cycle aborts assembly.

mod cycles;
mod hash;
mod merge;
mod query_text;

#[cfg(test)]
mod cycles_tests;
#[cfg(test)]
mod entrypoint_tests;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::artifact::{
    ArtifactId, NormalizationAst, RefetchSiteKind, field_artifact_id, refetch_sites,
};
use crate::compile::{CompilerConfig, QueryTextFormat};
use crate::declaration::TypeAnnotation;
use crate::resolve::{
    LazyLoad, REFETCH_ID_VARIABLE, Resolution, ResolvedField, ResolvedSelection, ResolvedVariable,
    SelectionKind, map_in_order,
};
use crate::schema::{FieldId, OperationKind, SchemaGraph, TypeId};

pub use cycles::{CycleError, check_cycles};
pub use hash::query_hash;
pub use merge::NormalizationKey;

use merge::{
    MergedSelectionMap, SelectionMerger, VariableContext, to_normalization_ast, used_variables,
};

/// An operation variable as declared in the query text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_annotation: String,
    /// GraphQL literal text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl QueryVariable {
    fn from_resolved(variable: &ResolvedVariable) -> Self {
        Self {
            name: variable.name.clone(),
            type_annotation: variable.type_annotation.to_string(),
            default_value: variable.default_value.as_ref().map(ToString::to_string),
        }
    }

    fn node_id() -> Self {
        Self {
            name: REFETCH_ID_VARIABLE.to_string(),
            type_annotation: TypeAnnotation::non_null(TypeAnnotation::named("ID")).to_string(),
            default_value: None,
        }
    }

    /// `$name: Type = default`
    pub fn definition(&self) -> String {
        match &self.default_value {
            Some(default) => format!("${}: {} = {}", self.name, self.type_annotation, default),
            None => format!("${}: {}", self.name, self.type_annotation),
        }
    }
}

/// A `node(id: $id)` query that re-requests one selection set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefetchQuery {
    /// Reader artifact whose `refetchQuery` index points here.
    pub owner: ArtifactId,
    pub index: u32,
    pub query_name: String,
    pub query_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_hash: Option<String>,
    pub variables: Vec<QueryVariable>,
    pub normalization_ast: NormalizationAst,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrypointArtifact {
    pub id: ArtifactId,
    pub operation_kind: OperationKind,
    pub query_name: String,
    pub query_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_hash: Option<String>,
    pub variables: Vec<QueryVariable>,
    pub normalization_ast: NormalizationAst,
    pub refetch_queries: Vec<RefetchQuery>,
    pub reader_artifact: ArtifactId,
    pub lazy_load: LazyLoad,
}

/// What to assemble: the fetched field and how its operation is named and shipped.
struct Plan<'a> {
    field: &'a ResolvedField,
    query_name: String,
    lazy_load: LazyLoad,
}

/// Assemble every entrypoint. Declared entrypoints come first, in declaration order, followed
/// by the `@loadable` fields they reach, in the order they are first selected.
#[instrument(skip_all, fields(entrypoints = resolution.entrypoints.len()))]
pub fn assemble(
    schema: &SchemaGraph,
    resolution: &Resolution,
    config: &CompilerConfig,
) -> Result<Vec<EntrypointArtifact>, CycleError> {
    check_cycles(schema, resolution)?;

    let plans = plan(schema, resolution);
    let assembler = Assembler {
        merger: SelectionMerger { schema, resolution },
        format: config.query_text_format,
        persisted_queries: config.persisted_queries,
    };
    let artifacts = map_in_order(&plans, |_, plan| assembler.entrypoint(plan));
    info!(artifacts = artifacts.len(), "entrypoints assembled");
    Ok(artifacts)
}

fn plan<'a>(schema: &SchemaGraph, resolution: &'a Resolution) -> Vec<Plan<'a>> {
    let mut plans: IndexMap<FieldId, Plan<'a>> = IndexMap::new();

    for entrypoint in &resolution.entrypoints {
        let Some(field) = resolution.field(entrypoint.field) else {
            continue;
        };
        plans.insert(
            entrypoint.field,
            Plan {
                field,
                query_name: schema.field_name(entrypoint.field).to_string(),
                lazy_load: entrypoint.lazy_load,
            },
        );
    }

    // Every planned entrypoint may reach further `@loadable` fields; those are planned in turn.
    let mut next = 0;
    while next < plans.len() {
        let mut owners = IndexSet::new();
        reader_closure(resolution, plans[next].field, &mut owners);
        next += 1;

        let mut loadable = Vec::new();
        for owner in owners.iter().filter_map(|id| resolution.field(*id)) {
            collect_loadable(&owner.selections, &mut loadable);
        }
        for selection in loadable {
            let Some(field) = resolution.field(selection.field) else {
                continue;
            };
            let lazy = matches!(
                selection.kind,
                SelectionKind::Resolver {
                    loadable: Some(options),
                    ..
                } if options.lazy_load_artifact
            );
            let plan = plans.entry(selection.field).or_insert_with(|| Plan {
                field,
                query_name: format!(
                    "{}__{}",
                    schema.type_name(field.parent),
                    schema.field_name(field.field)
                ),
                lazy_load: LazyLoad::default(),
            });
            plan.lazy_load.reader |= lazy;
        }
    }

    plans.into_values().collect()
}

fn collect_loadable<'a>(selections: &'a [ResolvedSelection], out: &mut Vec<&'a ResolvedSelection>) {
    for selection in selections {
        match &selection.kind {
            SelectionKind::Linked { selections, .. } | SelectionKind::Pointer { selections, .. } => {
                collect_loadable(selections, out)
            }
            SelectionKind::Resolver { loadable: Some(_), .. } => out.push(selection),
            _ => {}
        }
    }
}

/// `field` and every resolver or pointer field read while reading it, in preorder.
fn reader_closure(resolution: &Resolution, field: &ResolvedField, owners: &mut IndexSet<FieldId>) {
    if !owners.insert(field.field) {
        return;
    }
    selections_closure(resolution, &field.selections, owners);
}

fn selections_closure(
    resolution: &Resolution,
    selections: &[ResolvedSelection],
    owners: &mut IndexSet<FieldId>,
) {
    for selection in selections {
        match &selection.kind {
            SelectionKind::Linked { selections, .. } => {
                selections_closure(resolution, selections, owners)
            }
            SelectionKind::Pointer { selections, .. } => {
                if let Some(pointer) = resolution.field(selection.field) {
                    reader_closure(resolution, pointer, owners);
                }
                selections_closure(resolution, selections, owners);
            }
            SelectionKind::Resolver { loadable: None, .. } => {
                if let Some(resolver) = resolution.field(selection.field) {
                    reader_closure(resolution, resolver, owners);
                }
            }
            SelectionKind::Resolver { loadable: Some(_), .. }
            | SelectionKind::Scalar { .. }
            | SelectionKind::Link => {}
        }
    }
}

struct Assembler<'a> {
    merger: SelectionMerger<'a>,
    format: QueryTextFormat,
    persisted_queries: bool,
}

impl Assembler<'_> {
    fn entrypoint(&self, plan: &Plan<'_>) -> EntrypointArtifact {
        let schema = self.merger.schema;
        let field = plan.field;
        let context = VariableContext::symbolic(&field.variables);
        let merged = self.merger.merge(field.parent, &field.selections, &context);

        let mut variables: Vec<QueryVariable> =
            field.variables.iter().map(QueryVariable::from_resolved).collect();
        let (operation_kind, selections) = match schema.operation_kind(field.parent) {
            Some(kind) => (kind, merged),
            None => {
                variables.insert(0, QueryVariable::node_id());
                (
                    OperationKind::Query,
                    self.merger.node_wrapper(field.parent, merged),
                )
            }
        };

        let query_text = query_text::print_operation(
            operation_kind,
            &plan.query_name,
            &variables,
            &selections,
            self.format,
        );
        let refetch_queries = self.refetch_queries(field, &plan.query_name);
        let id = ArtifactId::entrypoint(schema.type_name(field.parent), schema.field_name(field.field));
        debug!(entrypoint = %id, refetch_queries = refetch_queries.len(), "assembled entrypoint");

        EntrypointArtifact {
            id,
            operation_kind,
            query_name: plan.query_name.clone(),
            query_hash: self.hash(&query_text),
            query_text,
            variables,
            normalization_ast: to_normalization_ast(&selections),
            refetch_queries,
            reader_artifact: field_artifact_id(schema, field),
            lazy_load: plan.lazy_load,
        }
    }

    fn hash(&self, query_text: &str) -> Option<String> {
        self.persisted_queries.then(|| query_hash(query_text))
    }

    /// Refetch queries of `root` and of every field whose reader runs inside it, once per
    /// `(owner, index)`.
    fn refetch_queries(&self, root: &ResolvedField, entrypoint_name: &str) -> Vec<RefetchQuery> {
        let mut owners: IndexSet<FieldId> = IndexSet::new();
        reader_closure(self.merger.resolution, root, &mut owners);

        let schema = self.merger.schema;
        let mut queries = Vec::new();
        for owner_id in owners {
            let Some(owner) = self.merger.resolution.field(owner_id) else {
                continue;
            };
            let owner_artifact = field_artifact_id(schema, owner);
            for site in refetch_sites(owner.parent, &owner.selections) {
                let (target, selections) = match site.kind {
                    RefetchSiteKind::Refetch { parent, selections } => (parent, selections),
                    RefetchSiteKind::Pointer { target, selections } => (target, selections),
                };
                let query_name = format!("{}__refetch__{}", entrypoint_name, queries.len());
                queries.push(self.refetch_query(
                    owner,
                    owner_artifact.clone(),
                    site.index,
                    query_name,
                    target,
                    selections,
                ));
            }
        }
        queries
    }

    fn refetch_query(
        &self,
        owner: &ResolvedField,
        owner_artifact: ArtifactId,
        index: u32,
        query_name: String,
        target: TypeId,
        selections: &[ResolvedSelection],
    ) -> RefetchQuery {
        let context = VariableContext::symbolic(&owner.variables);
        let inner = self.merger.merge(target, selections, &context);
        let wrapped: MergedSelectionMap = self.merger.node_wrapper(target, inner);

        let used = used_variables(&wrapped);
        let mut variables = vec![QueryVariable::node_id()];
        variables.extend(
            owner
                .variables
                .iter()
                .filter(|v| used.contains(&v.name))
                .map(QueryVariable::from_resolved),
        );

        let query_text = query_text::print_operation(
            OperationKind::Query,
            &query_name,
            &variables,
            &wrapped,
            self.format,
        );
        RefetchQuery {
            owner: owner_artifact,
            index,
            query_name,
            query_hash: self.hash(&query_text),
            query_text,
            variables,
            normalization_ast: to_normalization_ast(&wrapped),
        }
    }
}
