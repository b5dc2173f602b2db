//! Owned declaration model produced by the literal parser.
//!
//! The rowan tree is not `Send`, so every literal is lowered into these plain structures before
//! resolution. Spans are byte ranges inside the literal identified by [`Declaration::source`].

mod value;

#[cfg(test)]
mod value_tests;

use rowan::TextRange;

use crate::compile::SourceId;
use crate::diagnostics::Span;

pub use value::{TypeAnnotation, TypeAnnotationError, Value, escape_alias_text};

/// An identifier with its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub text: String,
    pub span: TextRange,
}

impl Name {
    pub fn new(text: impl Into<String>, span: TextRange) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Position of a declaration in the run's declaration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclarationId(pub(crate) u32);

impl DeclarationId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Field,
    Pointer,
    Entrypoint,
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeclarationKind::Field => write!(f, "field"),
            DeclarationKind::Pointer => write!(f, "pointer"),
            DeclarationKind::Entrypoint => write!(f, "entrypoint"),
        }
    }
}

/// One parsed iso literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub source: SourceId,
    pub kind: DeclarationKind,
    pub parent_type: Name,
    pub field_name: Name,
    /// Target type of a pointer declaration.
    pub target: Option<TypeRef>,
    pub variables: Vec<VariableDefinition>,
    pub directives: Vec<Directive>,
    pub description: Option<String>,
    /// Empty for entrypoints.
    pub selections: Vec<Selection>,
    pub span: TextRange,
}

impl Declaration {
    pub fn span(&self, range: TextRange) -> Span {
        Span::new(self.source, range)
    }

    /// `Type.field`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.parent_type.text, self.field_name.text)
    }
}

/// A type annotation with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub annotation: TypeAnnotation,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: Name,
    pub type_ref: TypeRef,
    pub default_value: Option<SpannedValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpannedValue {
    pub value: Value,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: Name,
    pub value: SpannedValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub span: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub alias: Option<Name>,
    pub name: Name,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    /// `None` when the selection has no braces; `Some(vec![])` for `{ }`.
    pub selection_set: Option<Vec<Selection>>,
    pub span: TextRange,
}

impl Selection {
    /// The alias if present, otherwise the field name.
    pub fn response_name(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    pub fn directive(&self, name: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.name.text == name)
    }
}

/// Canonical store key of a selection: the field name, followed by one chunk per argument.
///
/// `x(a: $v, b: 10)` becomes `x____a___v_v____b___l_10`. Without arguments the key is the bare
/// field name; with arguments the names are escaped like any other alias text, so two
/// selections of one field share a key only when their arguments are equal.
pub fn store_key<'a>(
    field_name: &str,
    arguments: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> String {
    let mut arguments = arguments.into_iter().peekable();
    if arguments.peek().is_none() {
        return field_name.to_string();
    }
    let mut key = escape_alias_text(field_name);
    for (name, value) in arguments {
        key.push_str("____");
        key.push_str(&escape_alias_text(name));
        key.push_str("___");
        key.push_str(&value.alias_chunk());
    }
    key
}
