//! Cycle detection over the resolver/pointer reference graph.
//!
//! Reading a field runs the readers of every resolver and pointer it selects, so a field that
//! reaches itself would never finish reading. `@loadable` selections are fetched and read
//! separately and do not count as references.

use indexmap::{IndexMap, IndexSet};

use crate::diagnostics::{DiagnosticKind, Diagnostics, Span};
use crate::resolve::{Resolution, ResolvedSelection, SelectionKind};
use crate::schema::{FieldId, SchemaGraph};

/// The first cycle found, plus one diagnostic per cycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cyclic selection: {}", .path.join(" -> "))]
pub struct CycleError {
    /// `Type.field` names; the first entry is repeated at the end.
    pub path: Vec<String>,
    pub diagnostics: Diagnostics,
}

type Edges = IndexMap<FieldId, IndexMap<FieldId, Span>>;

pub fn check_cycles(schema: &SchemaGraph, resolution: &Resolution) -> Result<(), CycleError> {
    let edges: Edges = resolution
        .fields
        .values()
        .map(|field| {
            let mut refs = IndexMap::new();
            collect_refs(resolution, &field.selections, &mut refs);
            (field.field, refs)
        })
        .collect();

    let mut diagnostics = Diagnostics::new();
    let mut first_path = None;
    for scc in find_sccs(&edges) {
        let cycle = cycle_path(&edges, &scc);
        let Some(&first) = cycle.first() else {
            continue;
        };
        let second = cycle.get(1).copied().unwrap_or(first);
        let mut path: Vec<String> = cycle.iter().map(|f| schema.qualified_name(*f)).collect();
        path.push(schema.qualified_name(first));

        let span = edges[&first][&second];
        diagnostics
            .report_at(DiagnosticKind::CyclicSelection, span)
            .message(path.join(" -> "))
            .emit();
        first_path.get_or_insert(path);
    }

    match first_path {
        Some(path) => Err(CycleError { path, diagnostics }),
        None => Ok(()),
    }
}

fn collect_refs(
    resolution: &Resolution,
    selections: &[ResolvedSelection],
    refs: &mut IndexMap<FieldId, Span>,
) {
    for selection in selections {
        match &selection.kind {
            SelectionKind::Resolver { loadable: None, .. } => {
                if resolution.field(selection.field).is_some() {
                    refs.entry(selection.field).or_insert(selection.span);
                }
            }
            SelectionKind::Pointer { selections, .. } => {
                if resolution.field(selection.field).is_some() {
                    refs.entry(selection.field).or_insert(selection.span);
                }
                collect_refs(resolution, selections, refs);
            }
            SelectionKind::Linked { selections, .. } => collect_refs(resolution, selections, refs),
            SelectionKind::Resolver { loadable: Some(_), .. }
            | SelectionKind::Scalar { .. }
            | SelectionKind::Link => {}
        }
    }
}

/// Tarjan's algorithm; keeps only components that contain a cycle.
fn find_sccs(edges: &Edges) -> Vec<Vec<FieldId>> {
    struct State<'a> {
        edges: &'a Edges,
        index: usize,
        stack: Vec<FieldId>,
        on_stack: IndexSet<FieldId>,
        indices: IndexMap<FieldId, usize>,
        lowlinks: IndexMap<FieldId, usize>,
        sccs: Vec<Vec<FieldId>>,
    }

    fn strongconnect(node: FieldId, state: &mut State<'_>) {
        state.indices.insert(node, state.index);
        state.lowlinks.insert(node, state.index);
        state.index += 1;
        state.stack.push(node);
        state.on_stack.insert(node);

        let edges = state.edges;
        for &next in edges.get(&node).into_iter().flat_map(|refs| refs.keys()) {
            if !edges.contains_key(&next) {
                continue;
            }
            if !state.indices.contains_key(&next) {
                strongconnect(next, state);
                let low = state.lowlinks[&next].min(state.lowlinks[&node]);
                state.lowlinks.insert(node, low);
            } else if state.on_stack.contains(&next) {
                let low = state.indices[&next].min(state.lowlinks[&node]);
                state.lowlinks.insert(node, low);
            }
        }

        if state.lowlinks[&node] == state.indices[&node] {
            let mut scc = Vec::new();
            while let Some(member) = state.stack.pop() {
                state.on_stack.swap_remove(&member);
                scc.push(member);
                if member == node {
                    break;
                }
            }
            scc.reverse();
            state.sccs.push(scc);
        }
    }

    let mut state = State {
        edges,
        index: 0,
        stack: Vec::new(),
        on_stack: IndexSet::new(),
        indices: IndexMap::new(),
        lowlinks: IndexMap::new(),
        sccs: Vec::new(),
    };
    for &node in edges.keys() {
        if !state.indices.contains_key(&node) {
            strongconnect(node, &mut state);
        }
    }

    state
        .sccs
        .into_iter()
        .filter(|scc| scc.len() > 1 || edges[&scc[0]].contains_key(&scc[0]))
        .collect()
}

/// An explicit cycle through the component, starting at its first member.
///
/// Tarjan components are not ordered as a cycle, so walk the edges to find one.
fn cycle_path(edges: &Edges, scc: &[FieldId]) -> Vec<FieldId> {
    fn walk(
        current: FieldId,
        start: FieldId,
        members: &IndexSet<FieldId>,
        edges: &Edges,
        visited: &mut IndexSet<FieldId>,
        path: &mut Vec<FieldId>,
    ) -> bool {
        if visited.contains(&current) {
            return current == start;
        }
        visited.insert(current);
        path.push(current);
        for &next in edges[&current].keys() {
            if members.contains(&next) && walk(next, start, members, edges, visited, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    let Some(&start) = scc.first() else {
        return Vec::new();
    };
    let members: IndexSet<FieldId> = scc.iter().copied().collect();
    let mut path = Vec::new();
    walk(start, start, &members, edges, &mut IndexSet::new(), &mut path);
    path
}
