//! Server selections of an entrypoint, merged across every reader that runs on it.
//!
//! Resolvers and pointers are inlined with their arguments bound, `id` and `__typename` are
//! added where the store needs them, and selections are keyed so that one field selected twice
//! with the same arguments is requested once.

use std::collections::BTreeMap;

use indexmap::{IndexMap, IndexSet};

use crate::artifact::{
    ArgumentArtifact, ArgumentValue, NormalizationAst, NormalizationNode, concrete_type,
};
use crate::declaration::{Value, store_key};
use crate::resolve::{
    REFETCH_ID_VARIABLE, Resolution, ResolvedArgument, ResolvedField, ResolvedSelection,
    ResolvedVariable, SelectionKind,
};
use crate::schema::{FieldKind, SchemaGraph, TYPENAME_FIELD, TypeId};

/// Sort and identity key of a merged selection. `id` always comes first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NormalizationKey {
    Id,
    ServerField {
        name: String,
        arguments: Vec<(String, Value)>,
    },
    InlineFragment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MergedSelection {
    Scalar {
        field_name: String,
        arguments: Vec<(String, Value)>,
    },
    Linked {
        field_name: String,
        arguments: Vec<(String, Value)>,
        concrete_type: Option<String>,
        selections: MergedSelectionMap,
    },
    InlineFragment {
        type_name: String,
        selections: MergedSelectionMap,
    },
}

pub(crate) type MergedSelectionMap = BTreeMap<NormalizationKey, MergedSelection>;

impl MergedSelection {
    fn selections_mut(&mut self) -> Option<&mut MergedSelectionMap> {
        match self {
            MergedSelection::Scalar { .. } => None,
            MergedSelection::Linked { selections, .. }
            | MergedSelection::InlineFragment { selections, .. } => Some(selections),
        }
    }

    fn scalar(name: &str) -> Self {
        MergedSelection::Scalar {
            field_name: name.to_string(),
            arguments: Vec::new(),
        }
    }
}

pub(crate) fn merged_store_key(field_name: &str, arguments: &[(String, Value)]) -> String {
    store_key(field_name, arguments.iter().map(|(n, v)| (n.as_str(), v)))
}

/// Values of a field's variables while its selections are inlined.
#[derive(Debug, Clone, Default)]
pub(crate) struct VariableContext {
    bindings: IndexMap<String, Value>,
}

impl VariableContext {
    /// Variables of the field being fetched stay symbolic: they become operation variables.
    pub(crate) fn symbolic(variables: &[ResolvedVariable]) -> Self {
        let bindings = variables
            .iter()
            .map(|v| (v.name.clone(), Value::Variable(v.name.clone())))
            .collect();
        Self { bindings }
    }

    /// Bindings for `field`, selected with `arguments` under this context.
    ///
    /// A supplied argument wins over the variable's default. A variable with neither is unbound.
    fn child(&self, field: &ResolvedField, arguments: &[ResolvedArgument]) -> Self {
        let bindings = field
            .variables
            .iter()
            .filter_map(|variable| {
                let supplied = arguments
                    .iter()
                    .find(|a| a.name == variable.name)
                    .and_then(|a| self.bind(&a.value));
                let value = supplied.or_else(|| variable.default_value.clone())?;
                Some((variable.name.clone(), value))
            })
            .collect();
        Self { bindings }
    }

    /// `None` when the whole value is an unbound variable, so the argument is left out.
    fn bind(&self, value: &Value) -> Option<Value> {
        match value {
            Value::Variable(name) => self.bindings.get(name).cloned(),
            _ => Some(self.bind_nested(value)),
        }
    }

    fn bind_nested(&self, value: &Value) -> Value {
        match value {
            Value::Variable(name) => self.bindings.get(name).cloned().unwrap_or(Value::Null),
            Value::List(items) => Value::List(items.iter().map(|v| self.bind_nested(v)).collect()),
            Value::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.bind_nested(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn bind_arguments(&self, arguments: &[ResolvedArgument]) -> Vec<(String, Value)> {
        arguments
            .iter()
            .filter_map(|a| Some((a.name.clone(), self.bind(&a.value)?)))
            .collect()
    }
}

pub(crate) struct SelectionMerger<'a> {
    pub(crate) schema: &'a SchemaGraph,
    pub(crate) resolution: &'a Resolution,
}

impl SelectionMerger<'_> {
    pub(crate) fn merge(
        &self,
        parent: TypeId,
        selections: &[ResolvedSelection],
        context: &VariableContext,
    ) -> MergedSelectionMap {
        let mut map = MergedSelectionMap::new();
        self.merge_into(&mut map, parent, selections, context);
        map
    }

    fn merge_into(
        &self,
        map: &mut MergedSelectionMap,
        parent: TypeId,
        selections: &[ResolvedSelection],
        context: &VariableContext,
    ) {
        let schema = self.schema;
        for selection in selections {
            match &selection.kind {
                SelectionKind::Scalar { .. } => {
                    let arguments = context.bind_arguments(&selection.arguments);
                    let key = if arguments.is_empty() && schema.id_field(parent) == Some(selection.field) {
                        NormalizationKey::Id
                    } else {
                        NormalizationKey::ServerField {
                            name: selection.field_name.clone(),
                            arguments: arguments.clone(),
                        }
                    };
                    map.entry(key).or_insert_with(|| MergedSelection::Scalar {
                        field_name: selection.field_name.clone(),
                        arguments,
                    });
                }
                SelectionKind::Linked {
                    target,
                    inline_fragment: true,
                    selections: nested,
                    ..
                } => {
                    let type_name = schema.type_name(*target).to_string();
                    let entry = map
                        .entry(NormalizationKey::InlineFragment(type_name.clone()))
                        .or_insert_with(|| MergedSelection::InlineFragment {
                            type_name,
                            selections: MergedSelectionMap::new(),
                        });
                    if let Some(inner) = entry.selections_mut() {
                        self.merge_into(inner, *target, nested, context);
                        self.complete(inner, *target, true);
                    }
                }
                SelectionKind::Linked {
                    target,
                    selections: nested,
                    ..
                } => {
                    let arguments = context.bind_arguments(&selection.arguments);
                    let key = NormalizationKey::ServerField {
                        name: selection.field_name.clone(),
                        arguments: arguments.clone(),
                    };
                    let entry = map.entry(key).or_insert_with(|| MergedSelection::Linked {
                        field_name: selection.field_name.clone(),
                        arguments,
                        concrete_type: concrete_type(schema, *target),
                        selections: MergedSelectionMap::new(),
                    });
                    if let Some(inner) = entry.selections_mut() {
                        self.merge_into(inner, *target, nested, context);
                        self.complete(inner, *target, schema.ty(*target).kind.is_abstract());
                    }
                }
                SelectionKind::Resolver { loadable: None, .. } | SelectionKind::Pointer { .. } => {
                    // A pointer's own reader runs on the parent record; what is selected through
                    // it lives on another record and is fetched by its refetch query.
                    if let Some(field) = self.resolution.field(selection.field) {
                        let child = context.child(field, &selection.arguments);
                        self.merge_into(map, parent, &field.selections, &child);
                    }
                }
                // Deferred fields only need the parent's id, which `complete` adds.
                SelectionKind::Resolver { loadable: Some(_), .. } | SelectionKind::Link => {}
            }
        }
    }

    /// Add `id` on types that have one, and `__typename` where the record type is only known at
    /// runtime.
    pub(crate) fn complete(&self, map: &mut MergedSelectionMap, ty: TypeId, typename: bool) {
        if self.schema.id_field(ty).is_some() {
            map.entry(NormalizationKey::Id)
                .or_insert_with(|| MergedSelection::scalar("id"));
        }
        if typename {
            map.entry(NormalizationKey::ServerField {
                name: TYPENAME_FIELD.to_string(),
                arguments: Vec::new(),
            })
            .or_insert_with(|| MergedSelection::scalar(TYPENAME_FIELD));
        }
    }

    /// `node(id: $id) { ... on Target { selections } }`
    pub(crate) fn node_wrapper(&self, target: TypeId, mut inner: MergedSelectionMap) -> MergedSelectionMap {
        let schema = self.schema;
        self.complete(&mut inner, target, true);

        let type_name = schema.type_name(target).to_string();
        let mut node = MergedSelectionMap::new();
        node.insert(
            NormalizationKey::InlineFragment(type_name.clone()),
            MergedSelection::InlineFragment {
                type_name,
                selections: inner,
            },
        );

        let node_target = schema
            .lookup_field(schema.query_type(), "node")
            .and_then(|f| match schema.field(f).kind {
                FieldKind::Linked { target, .. } => Some(target),
                _ => None,
            });
        match node_target {
            Some(node_type) => self.complete(&mut node, node_type, true),
            None => self.complete(&mut node, target, true),
        }

        let arguments = vec![(
            "id".to_string(),
            Value::Variable(REFETCH_ID_VARIABLE.to_string()),
        )];
        let mut root = MergedSelectionMap::new();
        root.insert(
            NormalizationKey::ServerField {
                name: "node".to_string(),
                arguments: arguments.clone(),
            },
            MergedSelection::Linked {
                field_name: "node".to_string(),
                arguments,
                concrete_type: node_target.and_then(|t| concrete_type(schema, t)),
                selections: node,
            },
        );
        root
    }
}

/// Variables referenced anywhere in the merged selections, in first-use order.
pub(crate) fn used_variables(map: &MergedSelectionMap) -> IndexSet<String> {
    fn walk(map: &MergedSelectionMap, out: &mut IndexSet<String>) {
        for selection in map.values() {
            match selection {
                MergedSelection::Scalar { arguments, .. } => collect(arguments, out),
                MergedSelection::Linked {
                    arguments,
                    selections,
                    ..
                } => {
                    collect(arguments, out);
                    walk(selections, out);
                }
                MergedSelection::InlineFragment { selections, .. } => walk(selections, out),
            }
        }
    }

    fn collect(arguments: &[(String, Value)], out: &mut IndexSet<String>) {
        for (_, value) in arguments {
            out.extend(value.variables().into_iter().map(str::to_string));
        }
    }

    let mut out = IndexSet::new();
    walk(map, &mut out);
    out
}

pub(crate) fn to_normalization_ast(map: &MergedSelectionMap) -> NormalizationAst {
    map.values()
        .map(|selection| match selection {
            MergedSelection::Scalar {
                field_name,
                arguments,
            } => NormalizationNode::Scalar {
                field_name: field_name.clone(),
                arguments: argument_artifacts(arguments),
                store_key: merged_store_key(field_name, arguments),
            },
            MergedSelection::Linked {
                field_name,
                arguments,
                concrete_type,
                selections,
            } => NormalizationNode::Linked {
                field_name: field_name.clone(),
                arguments: argument_artifacts(arguments),
                store_key: merged_store_key(field_name, arguments),
                concrete_type: concrete_type.clone(),
                selections: to_normalization_ast(selections),
            },
            MergedSelection::InlineFragment {
                type_name,
                selections,
            } => NormalizationNode::InlineFragment {
                type_name: type_name.clone(),
                selections: to_normalization_ast(selections),
            },
        })
        .collect()
}

fn argument_artifacts(arguments: &[(String, Value)]) -> Vec<ArgumentArtifact> {
    arguments
        .iter()
        .map(|(name, value)| ArgumentArtifact {
            name: name.clone(),
            value: ArgumentValue::from(value),
        })
        .collect()
}
