//! Arena-allocated schema graph.
//!
//! Types and fields live in `Vec`s indexed by [`TypeId`] / [`FieldId`]; names are interned.
//! Resolver fields that reference each other form a graph of plain indices, so cycles never
//! become ownership cycles.

use indexmap::IndexMap;
use isograph_core::{Interner, Symbol};
use serde::Serialize;

use crate::declaration::{DeclarationId, TypeAnnotation, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(pub(crate) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId(pub(crate) u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FieldId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Scalar,
    Enum,
    InputObject,
}

impl TypeKind {
    /// Object, interface or union: may own selectable fields.
    pub fn is_composite(self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Interface | TypeKind::Union)
    }

    pub fn is_abstract(self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Union)
    }

    /// Scalar, enum or input object: may be used as a variable type.
    pub fn is_input(self) -> bool {
        matches!(self, TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject)
    }
}

/// What a resolver field's artifact is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ArtifactKind {
    /// Renders UI; the runtime wraps it as a component.
    Component,
    /// Plain derived value, computed on read.
    Eager,
    /// Synthesized `__refetch`: re-requests the parent record by id.
    RefetchAction,
    /// Declared `@loadable`: fetched by its own request.
    LoadableAction,
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Component => write!(f, "Component"),
            ArtifactKind::Eager => write!(f, "Eager"),
            ArtifactKind::RefetchAction => write!(f, "RefetchAction"),
            ArtifactKind::LoadableAction => write!(f, "LoadableAction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Scalar,
    /// Server object field. `inline_fragment` marks synthesized `asMember` fields.
    Linked {
        target: TypeId,
        inline_fragment: bool,
    },
    Resolver(ArtifactKind),
    Pointer(TypeId),
    /// The record's own store link.
    Link,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOrigin {
    Server,
    Synthesized,
    Declared(DeclarationId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentDefinition {
    pub name: String,
    pub type_annotation: TypeAnnotation,
    pub default_value: Option<Value>,
}

impl ArgumentDefinition {
    /// Non-null without a default.
    pub fn is_required(&self) -> bool {
        self.type_annotation.is_non_null() && self.default_value.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct TypeDefinition {
    pub id: TypeId,
    pub name: Symbol,
    pub kind: TypeKind,
    pub fields: IndexMap<Symbol, FieldId>,
    /// Concrete object types of an interface or union; the type itself for objects.
    pub concrete_types: Vec<TypeId>,
    pub enum_values: Vec<String>,
    pub input_fields: Vec<ArgumentDefinition>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub id: FieldId,
    pub parent: TypeId,
    pub name: Symbol,
    pub kind: FieldKind,
    /// Output type for server fields; target type for pointers.
    pub type_annotation: Option<TypeAnnotation>,
    pub arguments: Vec<ArgumentDefinition>,
    pub origin: FieldOrigin,
    pub description: Option<String>,
}

impl FieldDefinition {
    pub fn argument(&self, name: &str) -> Option<&ArgumentDefinition> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn declaration(&self) -> Option<DeclarationId> {
        match self.origin {
            FieldOrigin::Declared(id) => Some(id),
            _ => None,
        }
    }
}

/// GraphQL operation that a root type answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationKind {
    Query,
    Mutation,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
        }
    }
}

/// Server types merged with declared resolver and pointer fields. Immutable once built.
#[derive(Debug, Clone)]
pub struct SchemaGraph {
    pub(crate) interner: Interner,
    pub(crate) types: Vec<TypeDefinition>,
    pub(crate) fields: Vec<FieldDefinition>,
    pub(crate) types_by_name: IndexMap<Symbol, TypeId>,
    pub(crate) query_type: TypeId,
    pub(crate) mutation_type: Option<TypeId>,
}

impl SchemaGraph {
    pub fn ty(&self, id: TypeId) -> &TypeDefinition {
        &self.types[id.index()]
    }

    pub fn field(&self, id: FieldId) -> &FieldDefinition {
        &self.fields[id.index()]
    }

    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        let symbol = self.interner.get(name)?;
        self.types_by_name.get(&symbol).copied()
    }

    pub fn type_name(&self, id: TypeId) -> &str {
        self.interner.resolve(self.ty(id).name)
    }

    pub fn field_name(&self, id: FieldId) -> &str {
        self.interner.resolve(self.field(id).name)
    }

    /// `Type.field`
    pub fn qualified_name(&self, id: FieldId) -> String {
        let field = self.field(id);
        format!("{}.{}", self.type_name(field.parent), self.field_name(id))
    }

    pub fn lookup_field(&self, parent: TypeId, name: &str) -> Option<FieldId> {
        let symbol = self.interner.get(name)?;
        self.ty(parent).fields.get(&symbol).copied()
    }

    /// Lookup by `(TypeName, FieldName)`.
    pub fn field_by_name(&self, type_name: &str, field_name: &str) -> Option<FieldId> {
        self.lookup_field(self.type_by_name(type_name)?, field_name)
    }

    /// The `id: ID!` field, if the type has one.
    pub fn id_field(&self, id: TypeId) -> Option<FieldId> {
        let field = self.lookup_field(id, "id")?;
        let def = self.field(field);
        let is_id = def.origin == FieldOrigin::Server
            && def
                .type_annotation
                .as_ref()
                .is_some_and(|t| t.is_non_null() && t.nullable() == &TypeAnnotation::named("ID"));
        is_id.then_some(field)
    }

    pub fn query_type(&self) -> TypeId {
        self.query_type
    }

    pub fn mutation_type(&self) -> Option<TypeId> {
        self.mutation_type
    }

    pub fn operation_kind(&self, id: TypeId) -> Option<OperationKind> {
        if id == self.query_type {
            Some(OperationKind::Query)
        } else if Some(id) == self.mutation_type {
            Some(OperationKind::Mutation)
        } else {
            None
        }
    }

    pub fn is_root_type(&self, id: TypeId) -> bool {
        self.operation_kind(id).is_some()
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.iter()
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter()
    }

    pub fn fields_of(&self, id: TypeId) -> impl Iterator<Item = &FieldDefinition> {
        self.ty(id).fields.values().map(|f| self.field(*f))
    }

    /// Fields contributed by iso literals, in declaration order.
    pub fn declared_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields
            .iter()
            .filter(|f| matches!(f.origin, FieldOrigin::Declared(_)))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}
