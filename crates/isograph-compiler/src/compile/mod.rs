//! Staged compilation pipeline.
//!
//! ```text
//! CompilationBuilder::new(&source_map, &schema).with_config(config)
//!     .parse()?      // CompilationParsed: declarations + parse diagnostics
//!     .analyze()?    // CompilationAnalyzed: schema graph + resolved fields
//!     .generate()?   // CompilationOutput: field and entrypoint artifacts
//! ```
//!
//! Each stage keeps the diagnostics of the previous one. A literal with parse errors and a field
//! with resolution errors are dropped; everything else still compiles. A broken schema document
//! and a selection cycle abort the run.

mod config;
mod source_map;

#[cfg(test)]
mod config_tests;

use tracing::{debug, info, instrument, warn};

use crate::artifact::{FieldArtifacts, generate_all};
use crate::declaration::Declaration;
use crate::diagnostics::Diagnostics;
use crate::entrypoint::{EntrypointArtifact, assemble};
use crate::parser::parse_declaration;
use crate::resolve::{Resolution, resolve};
use crate::schema::{SchemaDocument, SchemaGraph, build_schema};
use crate::{Error, Result};

pub use config::{CompilerConfig, QueryTextFormat};
pub use source_map::{Source, SourceId, SourceKind, SourceMap};

pub struct CompilationBuilder<'a> {
    source_map: &'a SourceMap,
    schema: &'a SchemaDocument,
    config: CompilerConfig,
}

impl<'a> CompilationBuilder<'a> {
    pub fn new(source_map: &'a SourceMap, schema: &'a SchemaDocument) -> Self {
        Self {
            source_map,
            schema,
            config: CompilerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// Parse every registered literal. Fuel exhaustion is fatal.
    #[instrument(skip_all, fields(literals = self.source_map.len()))]
    pub fn parse(self) -> Result<CompilationParsed<'a>> {
        let limits = self.config.parse_limits();
        let mut declarations = Vec::new();
        let mut diagnostics = Diagnostics::new();

        for source in self.source_map.iter() {
            let (declaration, diag) = parse_declaration(source.content, source.id, limits)?;
            let failed = diag.has_errors();
            diagnostics.extend(diag);
            match declaration {
                Some(declaration) if !failed => declarations.push(declaration),
                _ => warn!(source = source.id.as_u32(), path = source.kind.display_name(), "literal dropped"),
            }
        }

        info!(
            declarations = declarations.len(),
            errors = diagnostics.error_count(),
            "literals parsed"
        );
        Ok(CompilationParsed {
            builder: self,
            declarations,
            diagnostics,
        })
    }
}

pub struct CompilationParsed<'a> {
    builder: CompilationBuilder<'a>,
    declarations: Vec<Declaration>,
    diagnostics: Diagnostics,
}

impl CompilationParsed<'_> {
    /// Declarations that parsed cleanly; `declarations()[i]` is `DeclarationId(i)`.
    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Build the schema graph and resolve every declaration against it.
    #[instrument(skip_all, fields(declarations = self.declarations.len()))]
    pub fn analyze(self) -> Result<CompilationAnalyzed> {
        let config = &self.builder.config;
        let schema = build_schema(self.builder.schema, &self.declarations, config.schema_options())?;
        debug!(types = schema.type_count(), fields = schema.field_count(), "schema graph built");

        let (resolution, diag) = resolve(&schema, &self.declarations);
        let mut diagnostics = self.diagnostics;
        diagnostics.extend(diag);

        Ok(CompilationAnalyzed {
            config: self.builder.config,
            schema,
            resolution,
            diagnostics,
        })
    }
}

pub struct CompilationAnalyzed {
    config: CompilerConfig,
    schema: SchemaGraph,
    resolution: Resolution,
    diagnostics: Diagnostics,
}

impl CompilationAnalyzed {
    pub fn schema(&self) -> &SchemaGraph {
        &self.schema
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Generate field artifacts and assemble entrypoints. A selection cycle is fatal.
    #[instrument(skip_all, fields(fields = self.resolution.fields.len()))]
    pub fn generate(self) -> Result<CompilationOutput> {
        let fields = generate_all(&self.schema, &self.resolution)
            .into_values()
            .collect();
        let entrypoints =
            assemble(&self.schema, &self.resolution, &self.config).map_err(Error::CyclicSelection)?;

        Ok(CompilationOutput {
            schema: self.schema,
            fields,
            entrypoints,
            diagnostics: self.diagnostics,
        })
    }
}

/// Everything one run produced, plus the diagnostics of the literals and fields it dropped.
#[derive(Debug, Clone)]
pub struct CompilationOutput {
    pub schema: SchemaGraph,
    /// One bundle per declared field, in declaration order.
    pub fields: Vec<FieldArtifacts>,
    pub entrypoints: Vec<EntrypointArtifact>,
    pub diagnostics: Diagnostics,
}

impl CompilationOutput {
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldArtifacts> {
        self.fields
            .iter()
            .find(|f| f.id.type_name == type_name && f.id.field_name == field_name)
    }

    pub fn entrypoint(&self, query_name: &str) -> Option<&EntrypointArtifact> {
        self.entrypoints.iter().find(|e| e.query_name == query_name)
    }
}

/// Run the whole pipeline; any error diagnostic turns into [`Error::Compilation`].
pub fn compile(
    source_map: &SourceMap,
    schema: &SchemaDocument,
    config: CompilerConfig,
) -> Result<CompilationOutput> {
    let output = CompilationBuilder::new(source_map, schema)
        .with_config(config)
        .parse()?
        .analyze()?
        .generate()?;
    if output.diagnostics.has_errors() {
        return Err(Error::Compilation(output.diagnostics));
    }
    Ok(output)
}
