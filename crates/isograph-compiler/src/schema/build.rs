//! Schema graph construction.
//!
//! Every problem is collected; if any was found the whole run aborts with
//! [`Error::SchemaBuild`], because every later stage depends on the graph.

use indexmap::IndexMap;
use isograph_core::{Interner, Symbol};
use tracing::{debug, info, instrument};

use super::document::{ArgumentDocument, FieldDocument, SchemaDocument, TypeDocumentKind};
use super::graph::{
    ArgumentDefinition, ArtifactKind, FieldDefinition, FieldId, FieldKind, FieldOrigin,
    SchemaGraph, TypeDefinition, TypeId, TypeKind,
};
use crate::Error;
use crate::declaration::{Declaration, DeclarationId, DeclarationKind, TypeAnnotation, Value};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

pub const BUILTIN_SCALARS: [&str; 5] = ["ID", "String", "Int", "Float", "Boolean"];

pub const TYPENAME_FIELD: &str = "__typename";
pub const LINK_FIELD: &str = "link";
pub const REFETCH_FIELD: &str = "__refetch";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaOptions {
    pub generate_refetch_field: bool,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            generate_refetch_field: true,
        }
    }
}

/// Build the merged graph from the schema document and the parsed declarations.
///
/// `declarations[i]` is identified by `DeclarationId(i)`; entrypoint declarations contribute no
/// field.
#[instrument(skip_all, fields(types = document.types.len(), declarations = declarations.len()))]
pub fn build_schema(
    document: &SchemaDocument,
    declarations: &[Declaration],
    options: SchemaOptions,
) -> Result<SchemaGraph, Error> {
    let mut builder = SchemaBuilder::new(options);

    builder.add_builtin_scalars();
    builder.add_document_types(document);
    builder.link_abstract_types(document);
    let roots = builder.root_types(document);
    builder.add_server_fields(document);
    builder.add_synthesized_fields();
    builder.add_declared_fields(declarations);

    let SchemaBuilder {
        interner,
        types,
        fields,
        types_by_name,
        diagnostics,
        ..
    } = builder;

    if diagnostics.has_errors() {
        info!(errors = diagnostics.error_count(), "schema construction failed");
        return Err(Error::SchemaBuild(diagnostics));
    }
    let Some((query_type, mutation_type)) = roots else {
        return Err(Error::SchemaBuild(diagnostics));
    };

    info!(
        types = types.len(),
        fields = fields.len(),
        "schema graph built"
    );
    Ok(SchemaGraph {
        interner,
        types,
        fields,
        types_by_name,
        query_type,
        mutation_type,
    })
}

struct SchemaBuilder {
    options: SchemaOptions,
    interner: Interner,
    types: Vec<TypeDefinition>,
    fields: Vec<FieldDefinition>,
    types_by_name: IndexMap<Symbol, TypeId>,
    diagnostics: Diagnostics,
}

impl SchemaBuilder {
    fn new(options: SchemaOptions) -> Self {
        Self {
            options,
            interner: Interner::new(),
            types: Vec::new(),
            fields: Vec::new(),
            types_by_name: IndexMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn type_id(&self, name: &str) -> Option<TypeId> {
        let symbol = self.interner.get(name)?;
        self.types_by_name.get(&symbol).copied()
    }

    fn kind_of(&self, id: TypeId) -> TypeKind {
        self.types[id.index()].kind
    }

    fn add_type(&mut self, name: &str, kind: TypeKind, description: Option<String>) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        let symbol = self.interner.intern(name);
        self.types.push(TypeDefinition {
            id,
            name: symbol,
            kind,
            fields: IndexMap::new(),
            concrete_types: if kind == TypeKind::Object {
                vec![id]
            } else {
                Vec::new()
            },
            enum_values: Vec::new(),
            input_fields: Vec::new(),
            description,
        });
        self.types_by_name.insert(symbol, id);
        id
    }

    /// Returns `None` when the type already has a field with this name.
    fn add_field(&mut self, parent: TypeId, name: &str, def: PendingField) -> Option<FieldId> {
        let symbol = self.interner.intern(name);
        if self.types[parent.index()].fields.contains_key(&symbol) {
            return None;
        }
        let id = FieldId(self.fields.len() as u32);
        self.fields.push(FieldDefinition {
            id,
            parent,
            name: symbol,
            kind: def.kind,
            type_annotation: def.type_annotation,
            arguments: def.arguments,
            origin: def.origin,
            description: def.description,
        });
        self.types[parent.index()].fields.insert(symbol, id);
        Some(id)
    }

    fn add_builtin_scalars(&mut self) {
        for name in BUILTIN_SCALARS {
            self.add_type(name, TypeKind::Scalar, None);
        }
    }

    fn add_document_types(&mut self, document: &SchemaDocument) {
        for doc in &document.types {
            if let Some(existing) = self.type_id(&doc.name) {
                // Introspection output lists the built-in scalars again
                let builtin = existing.index() < BUILTIN_SCALARS.len();
                if builtin && doc.kind == TypeDocumentKind::Scalar {
                    continue;
                }
                self.diagnostics
                    .report_unlocated(DiagnosticKind::DuplicateType)
                    .message(&doc.name)
                    .emit();
                continue;
            }
            let kind = match doc.kind {
                TypeDocumentKind::Object => TypeKind::Object,
                TypeDocumentKind::Interface => TypeKind::Interface,
                TypeDocumentKind::Union => TypeKind::Union,
                TypeDocumentKind::Scalar => TypeKind::Scalar,
                TypeDocumentKind::Enum => TypeKind::Enum,
                TypeDocumentKind::InputObject => TypeKind::InputObject,
            };
            let id = self.add_type(&doc.name, kind, doc.description.clone());
            self.types[id.index()].enum_values = doc.values.clone();
        }
    }

    /// Fill `concrete_types` of unions (from members) and interfaces (from implementors).
    fn link_abstract_types(&mut self, document: &SchemaDocument) {
        for doc in &document.types {
            let Some(id) = self.type_id(&doc.name) else {
                continue;
            };
            for member in &doc.members {
                let owner = format!("union `{}`", doc.name);
                match self.type_id(member) {
                    Some(m) if self.kind_of(m) == TypeKind::Object => {
                        self.types[id.index()].concrete_types.push(m);
                    }
                    Some(_) => self.not_an_object(member, &owner),
                    None => self.unknown_type(member, &owner),
                }
            }
            for interface in &doc.implements {
                let owner = format!("type `{}`", doc.name);
                match self.type_id(interface) {
                    Some(i) if self.kind_of(i) == TypeKind::Interface => {
                        if self.kind_of(id) == TypeKind::Object {
                            self.types[i.index()].concrete_types.push(id);
                        }
                    }
                    Some(_) => {
                        self.diagnostics
                            .report_unlocated(DiagnosticKind::InvalidTypeAnnotation)
                            .message(format!("`{}` is not an interface, implemented by {}", interface, owner))
                            .emit();
                    }
                    None => self.unknown_type(interface, &owner),
                }
            }
        }
    }

    fn unknown_type(&mut self, name: &str, referenced_by: &str) {
        self.diagnostics
            .report_unlocated(DiagnosticKind::UnknownType)
            .message(name)
            .hint(format!("referenced by {}", referenced_by))
            .emit();
    }

    fn not_an_object(&mut self, name: &str, referenced_by: &str) {
        self.diagnostics
            .report_unlocated(DiagnosticKind::InvalidTypeAnnotation)
            .message(format!("`{}` is not an object type, used by {}", name, referenced_by))
            .emit();
    }

    fn root_types(&mut self, document: &SchemaDocument) -> Option<(TypeId, Option<TypeId>)> {
        let query = self.root_type(&document.query_type);
        let mutation = match &document.mutation_type {
            Some(name) => Some(self.root_type(name)?),
            None => None,
        };
        Some((query?, mutation))
    }

    fn root_type(&mut self, name: &str) -> Option<TypeId> {
        match self.type_id(name) {
            Some(id) if self.kind_of(id) == TypeKind::Object => Some(id),
            _ => {
                self.diagnostics
                    .report_unlocated(DiagnosticKind::UnknownRootType)
                    .message(format!("`{}`", name))
                    .emit();
                None
            }
        }
    }

    fn add_server_fields(&mut self, document: &SchemaDocument) {
        for doc in &document.types {
            let Some(parent) = self.type_id(&doc.name) else {
                continue;
            };
            match self.kind_of(parent) {
                TypeKind::InputObject => {
                    let input_fields = doc
                        .fields
                        .iter()
                        .filter_map(|f| self.input_field(&doc.name, f))
                        .collect();
                    self.types[parent.index()].input_fields = input_fields;
                }
                TypeKind::Object | TypeKind::Interface => {
                    for field in &doc.fields {
                        self.server_field(parent, &doc.name, field);
                    }
                }
                _ => {}
            }
        }
    }

    fn server_field(&mut self, parent: TypeId, parent_name: &str, field: &FieldDocument) {
        let owner = format!("{}.{}", parent_name, field.name);
        let Some(annotation) = self.parse_type(&field.type_name, &owner) else {
            return;
        };
        let Some(target) = self.type_id(annotation.inner_name()) else {
            self.unknown_type(annotation.inner_name(), &format!("field `{}`", owner));
            return;
        };
        let kind = match self.kind_of(target) {
            TypeKind::Object | TypeKind::Interface | TypeKind::Union => FieldKind::Linked {
                target,
                inline_fragment: false,
            },
            _ => FieldKind::Scalar,
        };
        let arguments = field
            .arguments
            .iter()
            .filter_map(|a| self.argument(a, &owner))
            .collect();

        let pending = PendingField {
            kind,
            type_annotation: Some(annotation),
            arguments,
            origin: FieldOrigin::Server,
            description: field.description.clone(),
        };
        if self.add_field(parent, &field.name, pending).is_none() {
            self.diagnostics
                .report_unlocated(DiagnosticKind::DuplicateField)
                .message(owner)
                .emit();
        }
    }

    fn input_field(&mut self, parent_name: &str, field: &FieldDocument) -> Option<ArgumentDefinition> {
        let owner = format!("{}.{}", parent_name, field.name);
        let annotation = self.parse_type(&field.type_name, &owner)?;
        self.check_input_type(&annotation, &owner)?;
        let default_value = field
            .default_value
            .as_ref()
            .map(|v| self.json_value(v, &annotation));
        Some(ArgumentDefinition {
            name: field.name.clone(),
            type_annotation: annotation,
            default_value,
        })
    }

    fn argument(&mut self, arg: &ArgumentDocument, owner: &str) -> Option<ArgumentDefinition> {
        let owner = format!("argument `{}` of `{}`", arg.name, owner);
        let annotation = self.parse_type(&arg.type_name, &owner)?;
        self.check_input_type(&annotation, &owner)?;
        let default_value = arg
            .default_value
            .as_ref()
            .map(|v| self.json_value(v, &annotation));
        Some(ArgumentDefinition {
            name: arg.name.clone(),
            type_annotation: annotation,
            default_value,
        })
    }

    fn parse_type(&mut self, text: &str, owner: &str) -> Option<TypeAnnotation> {
        match text.parse::<TypeAnnotation>() {
            Ok(annotation) => Some(annotation),
            Err(err) => {
                self.diagnostics
                    .report_unlocated(DiagnosticKind::InvalidTypeAnnotation)
                    .message(format!("{} on {}", err, owner))
                    .emit();
                None
            }
        }
    }

    fn check_input_type(&mut self, annotation: &TypeAnnotation, owner: &str) -> Option<()> {
        match self.type_id(annotation.inner_name()) {
            Some(id) if self.kind_of(id).is_input() => Some(()),
            Some(_) => {
                self.diagnostics
                    .report_unlocated(DiagnosticKind::InvalidTypeAnnotation)
                    .message(format!(
                        "`{}` is not an input type, used by {}",
                        annotation.inner_name(),
                        owner
                    ))
                    .emit();
                None
            }
            None => {
                self.unknown_type(annotation.inner_name(), owner);
                None
            }
        }
    }

    /// Defaults in the document are JSON; strings become enum values where an enum is expected.
    fn json_value(&self, json: &serde_json::Value, expected: &TypeAnnotation) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.to_string()),
            },
            serde_json::Value::String(s) => {
                let is_enum = self
                    .type_id(expected.inner_name())
                    .is_some_and(|id| self.kind_of(id) == TypeKind::Enum);
                if is_enum {
                    Value::Enum(s.clone())
                } else {
                    Value::String(s.clone())
                }
            }
            serde_json::Value::Array(items) => {
                let item_type = expected.list_item().unwrap_or(expected);
                Value::List(items.iter().map(|i| self.json_value(i, item_type)).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.json_value(v, &TypeAnnotation::named("String"))))
                    .collect(),
            ),
        }
    }

    /// `__typename`, `asMember`, `link` and `__refetch`.
    ///
    /// A server field with the same name wins over the synthesized one.
    fn add_synthesized_fields(&mut self) {
        for index in 0..self.types.len() {
            let id = TypeId(index as u32);
            let kind = self.kind_of(id);
            if !kind.is_composite() {
                continue;
            }

            self.add_field(
                id,
                TYPENAME_FIELD,
                PendingField::synthesized(
                    FieldKind::Scalar,
                    Some(TypeAnnotation::non_null(TypeAnnotation::named("String"))),
                ),
            );

            if kind.is_abstract() {
                let members = self.types[index].concrete_types.clone();
                for member in members {
                    let member_name = self.interner.resolve(self.types[member.index()].name).to_string();
                    self.add_field(
                        id,
                        &format!("as{}", member_name),
                        PendingField::synthesized(
                            FieldKind::Linked {
                                target: member,
                                inline_fragment: true,
                            },
                            Some(TypeAnnotation::named(member_name.clone())),
                        ),
                    );
                }
                continue;
            }

            if self.has_id_field(id) {
                self.add_field(id, LINK_FIELD, PendingField::synthesized(FieldKind::Link, None));
                if self.options.generate_refetch_field {
                    self.add_field(
                        id,
                        REFETCH_FIELD,
                        PendingField::synthesized(
                            FieldKind::Resolver(ArtifactKind::RefetchAction),
                            None,
                        ),
                    );
                }
            }
        }
    }

    fn has_id_field(&self, id: TypeId) -> bool {
        let Some(symbol) = self.interner.get("id") else {
            return false;
        };
        self.types[id.index()]
            .fields
            .get(&symbol)
            .map(|f| &self.fields[f.index()])
            .is_some_and(|f| {
                f.type_annotation.as_ref().is_some_and(|t| {
                    t.is_non_null() && t.nullable() == &TypeAnnotation::named("ID")
                })
            })
    }

    fn add_declared_fields(&mut self, declarations: &[Declaration]) {
        for (index, decl) in declarations.iter().enumerate() {
            if decl.kind == DeclarationKind::Entrypoint {
                continue;
            }
            let declaration_id = DeclarationId(index as u32);

            let Some(parent) = self.type_id(&decl.parent_type.text) else {
                self.diagnostics
                    .report(decl.source, DiagnosticKind::UnknownParentType, decl.parent_type.span)
                    .message(decl.qualified_name())
                    .emit();
                continue;
            };
            if !self.kind_of(parent).is_composite() {
                self.diagnostics
                    .report(decl.source, DiagnosticKind::InvalidParentType, decl.parent_type.span)
                    .emit();
                continue;
            }

            let (kind, type_annotation) = match (&decl.kind, &decl.target) {
                (DeclarationKind::Pointer, Some(target)) => {
                    let target_name = target.annotation.inner_name();
                    match self.type_id(target_name) {
                        Some(t) if self.kind_of(t).is_composite() => {
                            (FieldKind::Pointer(t), Some(target.annotation.clone()))
                        }
                        _ => {
                            self.diagnostics
                                .report(decl.source, DiagnosticKind::UnknownPointerTarget, target.span)
                                .message(format!("`{}`", target_name))
                                .emit();
                            continue;
                        }
                    }
                }
                _ => (FieldKind::Resolver(declared_artifact_kind(decl)), None),
            };

            let arguments = decl
                .variables
                .iter()
                .map(|v| ArgumentDefinition {
                    name: v.name.text.clone(),
                    type_annotation: v.type_ref.annotation.clone(),
                    default_value: v.default_value.as_ref().map(|d| d.value.clone()),
                })
                .collect();

            let pending = PendingField {
                kind,
                type_annotation,
                arguments,
                origin: FieldOrigin::Declared(declaration_id),
                description: decl.description.clone(),
            };
            if self.add_field(parent, &decl.field_name.text, pending).is_none() {
                self.diagnostics
                    .report(decl.source, DiagnosticKind::DuplicateField, decl.field_name.span)
                    .message(decl.qualified_name())
                    .emit();
                continue;
            }
            debug!(field = %decl.qualified_name(), kind = %decl.kind, "declared field added");
        }
    }
}

/// `@component` and `@loadable` select the artifact kind; anything else is eager.
fn declared_artifact_kind(decl: &Declaration) -> ArtifactKind {
    let has = |name: &str| decl.directives.iter().any(|d| d.name.text == name);
    if has("component") {
        ArtifactKind::Component
    } else if has("loadable") {
        ArtifactKind::LoadableAction
    } else {
        ArtifactKind::Eager
    }
}

struct PendingField {
    kind: FieldKind,
    type_annotation: Option<TypeAnnotation>,
    arguments: Vec<ArgumentDefinition>,
    origin: FieldOrigin,
    description: Option<String>,
}

impl PendingField {
    fn synthesized(kind: FieldKind, type_annotation: Option<TypeAnnotation>) -> Self {
        Self {
            kind,
            type_annotation,
            arguments: Vec::new(),
            origin: FieldOrigin::Synthesized,
            description: None,
        }
    }
}
