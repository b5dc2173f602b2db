//! Isograph compiler: iso literal parser, schema graph, resolver and artifact generator.
//!
//! This crate provides the compilation pipeline for iso literals:
//! - `parser` - lexer, CST, and lowering into the declaration model
//! - `declaration` - owned declarations, values and type annotations
//! - `schema` - the merged schema graph (server types plus declared fields)
//! - `resolve` - selection resolution, directive and argument validation
//! - `artifact` - normalization and reader ASTs per declared field
//! - `entrypoint` - cycle detection, merged query documents, query text and hashes
//! - `compile` - the staged pipeline facade, configuration and source registry
//! - `diagnostics` - error reporting

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod artifact;
pub mod compile;
pub mod declaration;
pub mod diagnostics;
pub mod entrypoint;
pub mod parser;
pub mod resolve;
pub mod schema;

#[cfg(test)]
pub mod test_utils;

/// Result type for passes that produce both output and diagnostics.
///
/// Each pass returns its typed output alongside any diagnostics it collected.
/// Fatal errors (fuel exhaustion, a broken schema, a selection cycle) use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

pub use artifact::{ArtifactId, ArtifactKind, ArtifactRole, FieldArtifacts};
pub use compile::{
    CompilationBuilder, CompilationOutput, CompilerConfig, QueryTextFormat, SourceId, SourceMap,
    compile,
};
pub use diagnostics::{Diagnostics, DiagnosticsPrinter, Severity, Span};
pub use entrypoint::{CycleError, EntrypointArtifact};
pub use schema::SchemaDocument;

/// Errors that abort a compilation run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Execution fuel exhausted (too many parser operations).
    #[error("execution limit exceeded")]
    ExecFuelExhausted,

    /// Recursion fuel exhausted (literal nested too deeply).
    #[error("recursion limit exceeded")]
    RecursionLimitExceeded,

    /// The schema graph could not be built; nothing else can run.
    #[error("schema construction failed with {} errors", .0.error_count())]
    SchemaBuild(Diagnostics),

    /// A field selects itself without crossing a `@loadable` boundary.
    #[error(transparent)]
    CyclicSelection(CycleError),

    /// Raised by [`compile`] when any literal or field failed.
    #[error("compilation failed with {} errors", .0.error_count())]
    Compilation(Diagnostics),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
