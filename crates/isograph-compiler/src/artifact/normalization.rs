//! Network-write instructions for one field.

use serde::Serialize;

use super::{ArgumentArtifact, argument_artifacts};
use crate::resolve::{ResolvedSelection, SelectionKind};
use crate::schema::{SchemaGraph, TypeId, TypeKind};

pub type NormalizationAst = Vec<NormalizationNode>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum NormalizationNode {
    Scalar {
        field_name: String,
        arguments: Vec<ArgumentArtifact>,
        store_key: String,
    },
    Linked {
        field_name: String,
        arguments: Vec<ArgumentArtifact>,
        store_key: String,
        /// `None` for abstract targets; the runtime reads `__typename` instead.
        concrete_type: Option<String>,
        selections: NormalizationAst,
    },
    InlineFragment {
        type_name: String,
        selections: NormalizationAst,
    },
}

impl NormalizationNode {
    fn merge_key(&self) -> (&str, &str) {
        match self {
            NormalizationNode::Scalar { store_key, .. } => ("", store_key),
            NormalizationNode::Linked { store_key, .. } => ("", store_key),
            NormalizationNode::InlineFragment { type_name, .. } => ("...", type_name),
        }
    }

    fn selections_mut(&mut self) -> Option<&mut NormalizationAst> {
        match self {
            NormalizationNode::Scalar { .. } => None,
            NormalizationNode::Linked { selections, .. }
            | NormalizationNode::InlineFragment { selections, .. } => Some(selections),
        }
    }
}

pub(crate) fn concrete_type(schema: &SchemaGraph, target: TypeId) -> Option<String> {
    (schema.ty(target).kind == TypeKind::Object).then(|| schema.type_name(target).to_string())
}

/// Only server data is written: resolvers, pointers, links and loadable fields are skipped.
pub(super) fn generate(schema: &SchemaGraph, selections: &[ResolvedSelection]) -> NormalizationAst {
    let mut ast = NormalizationAst::new();
    for selection in selections {
        let node = match &selection.kind {
            SelectionKind::Scalar { .. } => NormalizationNode::Scalar {
                field_name: selection.field_name.clone(),
                arguments: argument_artifacts(&selection.arguments),
                store_key: selection.store_key.clone(),
            },
            SelectionKind::Linked {
                target,
                inline_fragment: true,
                selections,
                ..
            } => NormalizationNode::InlineFragment {
                type_name: schema.type_name(*target).to_string(),
                selections: generate(schema, selections),
            },
            SelectionKind::Linked {
                target, selections, ..
            } => NormalizationNode::Linked {
                field_name: selection.field_name.clone(),
                arguments: argument_artifacts(&selection.arguments),
                store_key: selection.store_key.clone(),
                concrete_type: concrete_type(schema, *target),
                selections: generate(schema, selections),
            },
            SelectionKind::Resolver { .. } | SelectionKind::Pointer { .. } | SelectionKind::Link => {
                continue;
            }
        };
        push_merged(&mut ast, node);
    }
    ast
}

/// Siblings with the same store key write the same location; keep one, union the children.
fn push_merged(ast: &mut NormalizationAst, node: NormalizationNode) {
    let existing = ast.iter_mut().find(|n| n.merge_key() == node.merge_key());
    let Some(existing) = existing else {
        ast.push(node);
        return;
    };
    let (Some(into), NormalizationNode::Linked { selections, .. } | NormalizationNode::InlineFragment { selections, .. }) =
        (existing.selections_mut(), node)
    else {
        return;
    };
    for child in selections {
        push_merged(into, child);
    }
}

