//! Read instructions for one field, plus its updatable locations and refetch sites.

use serde::Serialize;

use super::{ArgumentArtifact, ArtifactId, ArtifactKind, argument_artifacts};
use crate::resolve::{ResolvedSelection, SelectionKind};
use crate::schema::{FieldId, SchemaGraph, TypeId};

pub type ReaderAst = Vec<ReaderNode>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum ReaderNode {
    Scalar {
        alias: String,
        field_name: String,
        arguments: Vec<ArgumentArtifact>,
        store_key: String,
        is_updatable: bool,
    },
    Linked {
        alias: String,
        field_name: String,
        arguments: Vec<ArgumentArtifact>,
        store_key: String,
        /// Pointer fields: the reader artifact that computes the link.
        condition: Option<ArtifactId>,
        /// `asMember` fields: read the same record when its `__typename` matches.
        type_condition: Option<String>,
        is_updatable: bool,
        refetch_query: Option<u32>,
        selections: ReaderAst,
    },
    Resolver {
        alias: String,
        arguments: Vec<ArgumentArtifact>,
        reader_artifact: ArtifactId,
        refetch_query: Option<u32>,
    },
    Link {
        alias: String,
    },
    LoadablySelectedField {
        alias: String,
        field_name: String,
        query_arguments: Vec<ArgumentArtifact>,
        /// Reads what the deferred request needs from the parent record.
        refetch_reader_ast: ReaderAst,
        entrypoint: ArtifactId,
    },
}

/// Store locations writable through `@updatable` selections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatableDescriptor {
    pub locations: Vec<UpdatableLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatableLocation {
    /// Response names from the field's root to the selection.
    pub path: Vec<String>,
    pub store_key: String,
}

pub(super) fn generate(
    schema: &SchemaGraph,
    selections: &[ResolvedSelection],
) -> (ReaderAst, Option<UpdatableDescriptor>) {
    let mut generator = ReaderGenerator {
        schema,
        refetch_count: 0,
        path: Vec::new(),
        updatable: Vec::new(),
    };
    let ast = generator.selections(selections);
    let updatable = (!generator.updatable.is_empty()).then_some(UpdatableDescriptor {
        locations: generator.updatable,
    });
    (ast, updatable)
}

struct ReaderGenerator<'a> {
    schema: &'a SchemaGraph,
    refetch_count: u32,
    path: Vec<String>,
    updatable: Vec<UpdatableLocation>,
}

impl ReaderGenerator<'_> {
    fn selections(&mut self, selections: &[ResolvedSelection]) -> ReaderAst {
        selections.iter().map(|s| self.selection(s)).collect()
    }

    fn next_refetch(&mut self) -> u32 {
        let index = self.refetch_count;
        self.refetch_count += 1;
        index
    }

    fn mark_updatable(&mut self, selection: &ResolvedSelection) {
        let mut path = self.path.clone();
        path.push(selection.response_name.clone());
        self.updatable.push(UpdatableLocation {
            path,
            store_key: selection.store_key.clone(),
        });
    }

    fn nested(&mut self, selection: &ResolvedSelection, selections: &[ResolvedSelection]) -> ReaderAst {
        self.path.push(selection.response_name.clone());
        let ast = self.selections(selections);
        self.path.pop();
        ast
    }

    fn selection(&mut self, selection: &ResolvedSelection) -> ReaderNode {
        let schema = self.schema;
        let alias = selection.response_name.clone();
        let arguments = argument_artifacts(&selection.arguments);

        match &selection.kind {
            SelectionKind::Scalar { updatable } => {
                if *updatable {
                    self.mark_updatable(selection);
                }
                ReaderNode::Scalar {
                    alias,
                    field_name: selection.field_name.clone(),
                    arguments,
                    store_key: selection.store_key.clone(),
                    is_updatable: *updatable,
                }
            }
            SelectionKind::Linked {
                target,
                inline_fragment,
                updatable,
                selections,
            } => {
                if *updatable {
                    self.mark_updatable(selection);
                }
                ReaderNode::Linked {
                    alias,
                    field_name: selection.field_name.clone(),
                    arguments,
                    store_key: selection.store_key.clone(),
                    condition: None,
                    type_condition: inline_fragment
                        .then(|| schema.type_name(*target).to_string()),
                    is_updatable: *updatable,
                    refetch_query: None,
                    selections: self.nested(selection, selections),
                }
            }
            SelectionKind::Pointer { selections, .. } => {
                let refetch_query = Some(self.next_refetch());
                ReaderNode::Linked {
                    alias,
                    field_name: selection.field_name.clone(),
                    arguments,
                    store_key: selection.store_key.clone(),
                    condition: Some(declared_reader_id(schema, selection.field, ArtifactKind::Eager)),
                    type_condition: None,
                    is_updatable: false,
                    refetch_query,
                    selections: self.nested(selection, selections),
                }
            }
            SelectionKind::Resolver {
                artifact_kind,
                loadable: None,
            } => ReaderNode::Resolver {
                alias,
                arguments,
                reader_artifact: declared_reader_id(schema, selection.field, *artifact_kind),
                refetch_query: (*artifact_kind == ArtifactKind::RefetchAction)
                    .then(|| self.next_refetch()),
            },
            SelectionKind::Resolver {
                loadable: Some(_), ..
            } => {
                let field = schema.field(selection.field);
                ReaderNode::LoadablySelectedField {
                    alias,
                    field_name: selection.field_name.clone(),
                    query_arguments: arguments,
                    refetch_reader_ast: refetch_reader_ast(schema, field.parent),
                    entrypoint: ArtifactId::entrypoint(
                        schema.type_name(field.parent),
                        &selection.field_name,
                    ),
                }
            }
            SelectionKind::Link => ReaderNode::Link { alias },
        }
    }
}

fn declared_reader_id(schema: &SchemaGraph, field: FieldId, artifact_kind: ArtifactKind) -> ArtifactId {
    let def = schema.field(field);
    ArtifactId::reader(
        schema.type_name(def.parent),
        schema.field_name(field),
        artifact_kind,
    )
}

/// The parent's `id`, or nothing for root types, which need no identification.
fn refetch_reader_ast(schema: &SchemaGraph, parent: TypeId) -> ReaderAst {
    if schema.is_root_type(parent) || schema.id_field(parent).is_none() {
        return ReaderAst::new();
    }
    vec![ReaderNode::Scalar {
        alias: "id".to_string(),
        field_name: "id".to_string(),
        arguments: Vec::new(),
        store_key: "id".to_string(),
        is_updatable: false,
    }]
}

#[derive(Debug, Clone, Copy)]
pub enum RefetchSiteKind<'a> {
    /// `__refetch` inside a selection set on `parent`: re-request that selection set by id.
    Refetch {
        parent: TypeId,
        selections: &'a [ResolvedSelection],
    },
    /// A pointer selection: request `selections` on the record the pointer computes.
    Pointer {
        target: TypeId,
        selections: &'a [ResolvedSelection],
    },
}

/// A selection that needs its own refetch query; `index` matches the reader's `refetch_query`.
#[derive(Debug, Clone, Copy)]
pub struct RefetchSite<'a> {
    pub index: u32,
    pub kind: RefetchSiteKind<'a>,
}

/// Refetch sites of a field in reader order.
pub fn refetch_sites(
    parent: TypeId,
    selections: &[ResolvedSelection],
) -> Vec<RefetchSite<'_>> {
    let mut sites = Vec::new();
    collect_sites(parent, selections, &mut sites);
    sites
}

fn collect_sites<'a>(
    parent: TypeId,
    selections: &'a [ResolvedSelection],
    sites: &mut Vec<RefetchSite<'a>>,
) {
    for selection in selections {
        match &selection.kind {
            SelectionKind::Linked {
                target,
                selections: nested,
                ..
            } => collect_sites(*target, nested, sites),
            SelectionKind::Pointer {
                target,
                selections: nested,
            } => {
                let index = sites.len() as u32;
                sites.push(RefetchSite {
                    index,
                    kind: RefetchSiteKind::Pointer {
                        target: *target,
                        selections: nested,
                    },
                });
                collect_sites(*target, nested, sites);
            }
            SelectionKind::Resolver {
                artifact_kind: ArtifactKind::RefetchAction,
                loadable: None,
            } => {
                let index = sites.len() as u32;
                sites.push(RefetchSite {
                    index,
                    kind: RefetchSiteKind::Refetch { parent, selections },
                });
            }
            _ => {}
        }
    }
}
