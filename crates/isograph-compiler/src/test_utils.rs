//! Shared fixtures for pipeline tests.

use crate::compile::{CompilationBuilder, CompilationOutput, CompilerConfig, SourceId, SourceMap};
use crate::declaration::Declaration;
use crate::parser::{ParseLimits, parse_declaration};
use crate::schema::{SchemaDocument, SchemaGraph, SchemaOptions, build_schema};
use crate::{Diagnostics, Error};

/// A small social-coding schema used across the test suites.
pub const FIXTURE_SCHEMA: &str = r#"{
  "queryType": "Query",
  "mutationType": "Mutation",
  "types": [
    { "name": "Query", "kind": "object", "fields": [
      { "name": "viewer", "type": "User!" },
      { "name": "user", "type": "User", "arguments": [ { "name": "id", "type": "ID!" } ] },
      { "name": "node", "type": "Node", "arguments": [ { "name": "id", "type": "ID!" } ] },
      { "name": "search", "type": "[SearchResult!]!", "arguments": [
        { "name": "text", "type": "String!" },
        { "name": "order", "type": "Order", "defaultValue": "ASC" }
      ] }
    ] },
    { "name": "Mutation", "kind": "object", "fields": [
      { "name": "renameUser", "type": "User", "arguments": [
        { "name": "id", "type": "ID!" },
        { "name": "name", "type": "String!" }
      ] }
    ] },
    { "name": "Node", "kind": "interface", "fields": [ { "name": "id", "type": "ID!" } ] },
    { "name": "User", "kind": "object", "implements": ["Node"], "fields": [
      { "name": "id", "type": "ID!" },
      { "name": "name", "type": "String!" },
      { "name": "email", "type": "String" },
      { "name": "avatarUrl", "type": "String", "arguments": [ { "name": "size", "type": "Int" } ] },
      { "name": "bestFriendId", "type": "ID" },
      { "name": "repositories", "type": "[Repository!]!", "arguments": [
        { "name": "first", "type": "Int" },
        { "name": "filter", "type": "RepoFilter" }
      ] }
    ] },
    { "name": "Repository", "kind": "object", "implements": ["Node"], "fields": [
      { "name": "id", "type": "ID!" },
      { "name": "title", "type": "String!" },
      { "name": "stars", "type": "Int!" },
      { "name": "createdAt", "type": "Date" },
      { "name": "owner", "type": "User!" }
    ] },
    { "name": "Bot", "kind": "object", "fields": [ { "name": "handle", "type": "String!" } ] },
    { "name": "SearchResult", "kind": "union", "members": ["User", "Bot"] },
    { "name": "Order", "kind": "enum", "values": ["ASC", "DESC"] },
    { "name": "RepoFilter", "kind": "inputObject", "fields": [
      { "name": "text", "type": "String" },
      { "name": "minStars", "type": "Int!" },
      { "name": "order", "type": "Order" }
    ] },
    { "name": "Date", "kind": "scalar" }
  ]
}"#;

pub fn fixture_schema() -> SchemaDocument {
    SchemaDocument::from_json(FIXTURE_SCHEMA).expect("fixture schema is valid JSON")
}

/// Parse literals that must be free of syntax errors; `result[i]` is `DeclarationId(i)`.
#[track_caller]
pub fn parse_literals(literals: &[&str]) -> Vec<Declaration> {
    literals
        .iter()
        .enumerate()
        .map(|(i, literal)| {
            let (declaration, diagnostics) =
                parse_declaration(literal, SourceId(i as u32), ParseLimits::default())
                    .expect("no fuel limits");
            if diagnostics.has_errors() {
                panic!("literal {} has parse errors:\n{}", i, diagnostics.dump());
            }
            declaration.expect("valid literal lowers")
        })
        .collect()
}

/// Fixture schema merged with the given literals.
#[track_caller]
pub fn fixture_graph(literals: &[&str]) -> (SchemaGraph, Vec<Declaration>) {
    let declarations = parse_literals(literals);
    match build_schema(&fixture_schema(), &declarations, SchemaOptions::default()) {
        Ok(graph) => (graph, declarations),
        Err(err) => panic!("expected schema to build, got: {}", err),
    }
}

/// Run the whole pipeline on the fixture schema.
pub fn run(literals: &[&str], config: CompilerConfig) -> Result<CompilationOutput, Error> {
    let source_map = SourceMap::from_literals(literals.iter().copied());
    let schema = fixture_schema();
    CompilationBuilder::new(&source_map, &schema)
        .with_config(config)
        .parse()?
        .analyze()?
        .generate()
}

#[track_caller]
pub fn expect_valid(literals: &[&str]) -> CompilationOutput {
    expect_valid_with(literals, CompilerConfig::default())
}

#[track_caller]
pub fn expect_valid_with(literals: &[&str], config: CompilerConfig) -> CompilationOutput {
    match run(literals, config) {
        Ok(output) if !output.diagnostics.has_errors() => output,
        Ok(output) => panic!(
            "expected valid literals, got errors:\n{}",
            output.diagnostics.dump()
        ),
        Err(err) => panic!("expected valid literals, got: {}", err),
    }
}

/// Dump of every diagnostic of a run that must fail, fatal or not.
#[track_caller]
pub fn expect_invalid(literals: &[&str]) -> String {
    let diagnostics: Diagnostics = match run(literals, CompilerConfig::default()) {
        Ok(output) => output.diagnostics,
        Err(Error::SchemaBuild(diagnostics)) | Err(Error::Compilation(diagnostics)) => diagnostics,
        Err(Error::CyclicSelection(cycle)) => cycle.diagnostics,
        Err(err) => panic!("unexpected fatal error: {}", err),
    };
    if !diagnostics.has_errors() {
        panic!("expected errors, got none");
    }
    diagnostics.filtered().dump()
}
