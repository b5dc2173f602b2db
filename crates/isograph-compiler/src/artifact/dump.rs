//! Indented text rendering of artifact trees, one node per line.

use std::fmt::Write;

use super::{NormalizationAst, NormalizationNode, ReaderAst, ReaderNode};

pub fn dump_normalization_ast(ast: &NormalizationAst) -> String {
    let mut out = String::new();
    write_normalization(ast, 0, &mut out);
    out
}

fn write_normalization(ast: &NormalizationAst, depth: usize, out: &mut String) {
    for node in ast {
        out.push_str(&"  ".repeat(depth));
        match node {
            NormalizationNode::Scalar { store_key, .. } => {
                let _ = writeln!(out, "Scalar {}", store_key);
            }
            NormalizationNode::Linked {
                store_key,
                concrete_type,
                selections,
                ..
            } => {
                let _ = write!(out, "Linked {}", store_key);
                if let Some(ty) = concrete_type {
                    let _ = write!(out, ": {}", ty);
                }
                out.push('\n');
                write_normalization(selections, depth + 1, out);
            }
            NormalizationNode::InlineFragment {
                type_name,
                selections,
            } => {
                let _ = writeln!(out, "InlineFragment {}", type_name);
                write_normalization(selections, depth + 1, out);
            }
        }
    }
}

pub fn dump_reader_ast(ast: &ReaderAst) -> String {
    let mut out = String::new();
    write_reader(ast, 0, &mut out);
    out
}

fn write_key(alias: &str, store_key: &str, out: &mut String) {
    out.push_str(alias);
    if alias != store_key {
        let _ = write!(out, " = {}", store_key);
    }
}

fn write_reader(ast: &ReaderAst, depth: usize, out: &mut String) {
    for node in ast {
        out.push_str(&"  ".repeat(depth));
        match node {
            ReaderNode::Scalar {
                alias,
                store_key,
                is_updatable,
                ..
            } => {
                out.push_str("Scalar ");
                write_key(alias, store_key, out);
                if *is_updatable {
                    out.push_str(" @updatable");
                }
                out.push('\n');
            }
            ReaderNode::Linked {
                alias,
                store_key,
                condition,
                type_condition,
                is_updatable,
                refetch_query,
                selections,
                ..
            } => {
                out.push_str("Linked ");
                write_key(alias, store_key, out);
                if let Some(condition) = condition {
                    let _ = write!(out, " via {}", condition);
                }
                if let Some(ty) = type_condition {
                    let _ = write!(out, " on {}", ty);
                }
                if *is_updatable {
                    out.push_str(" @updatable");
                }
                if let Some(index) = refetch_query {
                    let _ = write!(out, " refetch #{}", index);
                }
                out.push('\n');
                write_reader(selections, depth + 1, out);
            }
            ReaderNode::Resolver {
                alias,
                reader_artifact,
                refetch_query,
                ..
            } => {
                let _ = write!(out, "Resolver {} -> {}", alias, reader_artifact);
                if let Some(index) = refetch_query {
                    let _ = write!(out, " refetch #{}", index);
                }
                out.push('\n');
            }
            ReaderNode::Link { alias } => {
                let _ = writeln!(out, "Link {}", alias);
            }
            ReaderNode::LoadablySelectedField {
                alias,
                entrypoint,
                refetch_reader_ast,
                ..
            } => {
                let _ = writeln!(out, "Loadable {} -> {}", alias, entrypoint);
                write_reader(refetch_reader_ast, depth + 1, out);
            }
        }
    }
}
