//! The merged schema graph.
//!
//! Built once per run from the external [`SchemaDocument`] plus every declared resolver and
//! pointer field, then queried read-only by the resolver, the artifact generator and the
//! entrypoint assembler.

mod build;
mod document;
mod graph;


pub use build::{
    BUILTIN_SCALARS, LINK_FIELD, REFETCH_FIELD, SchemaOptions, TYPENAME_FIELD, build_schema,
};
pub use document::{ArgumentDocument, FieldDocument, SchemaDocument, TypeDocument, TypeDocumentKind};
pub use graph::{
    ArgumentDefinition, ArtifactKind, FieldDefinition, FieldId, FieldKind, FieldOrigin,
    OperationKind, SchemaGraph, TypeDefinition, TypeId, TypeKind,
};
