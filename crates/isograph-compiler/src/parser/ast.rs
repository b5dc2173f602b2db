//! Typed AST wrappers over CST nodes.
//!
//! Each struct wraps a `SyntaxNode` and provides typed accessors.
//! Cast is infallible for correct `SyntaxKind`; validation happens during lowering.

use super::cst::{SyntaxKind, SyntaxNode, SyntaxToken};

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(SyntaxNode);

        impl $name {
            pub fn cast(node: SyntaxNode) -> Option<Self> {
                (node.kind() == SyntaxKind::$kind).then(|| Self(node))
            }

            pub fn as_cst(&self) -> &SyntaxNode {
                &self.0
            }
        }
    };
}

ast_node!(Root, Root);
ast_node!(FieldDecl, FieldDecl);
ast_node!(PointerDecl, PointerDecl);
ast_node!(EntrypointDecl, EntrypointDecl);
ast_node!(DeclTarget, DeclTarget);
ast_node!(VariableDefs, VariableDefs);
ast_node!(VariableDef, VariableDef);
ast_node!(Variable, Variable);
ast_node!(NamedType, NamedType);
ast_node!(ListType, ListType);
ast_node!(NonNullType, NonNullType);
ast_node!(Description, Description);
ast_node!(SelectionSet, SelectionSet);
ast_node!(Selection, Selection);
ast_node!(Alias, Alias);
ast_node!(Arguments, Arguments);
ast_node!(Argument, Argument);
ast_node!(Directive, Directive);
ast_node!(Literal, Literal);
ast_node!(ListValue, ListValue);
ast_node!(ObjectValue, ObjectValue);
ast_node!(ObjectField, ObjectField);

fn child_token(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|t| t.kind() == kind)
}

fn child<N>(node: &SyntaxNode, cast: fn(SyntaxNode) -> Option<N>) -> Option<N> {
    node.children().find_map(cast)
}

/// One of the three declaration forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Decl {
    Field(FieldDecl),
    Pointer(PointerDecl),
    Entrypoint(EntrypointDecl),
}

impl Decl {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::FieldDecl => FieldDecl::cast(node).map(Decl::Field),
            SyntaxKind::PointerDecl => PointerDecl::cast(node).map(Decl::Pointer),
            SyntaxKind::EntrypointDecl => EntrypointDecl::cast(node).map(Decl::Entrypoint),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Decl::Field(n) => n.as_cst(),
            Decl::Pointer(n) => n.as_cst(),
            Decl::Entrypoint(n) => n.as_cst(),
        }
    }

    pub fn target(&self) -> Option<DeclTarget> {
        child(self.as_cst(), DeclTarget::cast)
    }

    pub fn directives(&self) -> impl Iterator<Item = Directive> + '_ {
        self.as_cst().children().filter_map(Directive::cast)
    }
}

/// Type annotation: `Name`, `[T]`, `T!`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    Named(NamedType),
    List(ListType),
    NonNull(NonNullType),
}

impl TypeExpr {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::NamedType => NamedType::cast(node).map(TypeExpr::Named),
            SyntaxKind::ListType => ListType::cast(node).map(TypeExpr::List),
            SyntaxKind::NonNullType => NonNullType::cast(node).map(TypeExpr::NonNull),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            TypeExpr::Named(n) => n.as_cst(),
            TypeExpr::List(n) => n.as_cst(),
            TypeExpr::NonNull(n) => n.as_cst(),
        }
    }
}

/// Argument or default value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Variable(Variable),
    Literal(Literal),
    List(ListValue),
    Object(ObjectValue),
}

impl Value {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        match node.kind() {
            SyntaxKind::Variable => Variable::cast(node).map(Value::Variable),
            SyntaxKind::Literal => Literal::cast(node).map(Value::Literal),
            SyntaxKind::ListValue => ListValue::cast(node).map(Value::List),
            SyntaxKind::ObjectValue => ObjectValue::cast(node).map(Value::Object),
            _ => None,
        }
    }

    pub fn as_cst(&self) -> &SyntaxNode {
        match self {
            Value::Variable(n) => n.as_cst(),
            Value::Literal(n) => n.as_cst(),
            Value::List(n) => n.as_cst(),
            Value::Object(n) => n.as_cst(),
        }
    }
}

impl Root {
    /// Wraps the tree produced by the parser, whose top node is always `Root`.
    pub(super) fn new(node: SyntaxNode) -> Self {
        debug_assert_eq!(node.kind(), SyntaxKind::Root);
        Self(node)
    }

    pub fn declaration(&self) -> Option<Decl> {
        self.0.children().find_map(Decl::cast)
    }
}

impl FieldDecl {
    pub fn variable_defs(&self) -> Option<VariableDefs> {
        child(&self.0, VariableDefs::cast)
    }

    pub fn description(&self) -> Option<Description> {
        child(&self.0, Description::cast)
    }

    pub fn selection_set(&self) -> Option<SelectionSet> {
        child(&self.0, SelectionSet::cast)
    }
}

impl PointerDecl {
    pub fn target_type(&self) -> Option<TypeExpr> {
        child(&self.0, TypeExpr::cast)
    }

    pub fn variable_defs(&self) -> Option<VariableDefs> {
        child(&self.0, VariableDefs::cast)
    }

    pub fn description(&self) -> Option<Description> {
        child(&self.0, Description::cast)
    }

    pub fn selection_set(&self) -> Option<SelectionSet> {
        child(&self.0, SelectionSet::cast)
    }
}

impl DeclTarget {
    pub fn type_name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Id)
    }

    /// The identifier after the dot.
    pub fn field_name(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .skip_while(|t| t.kind() != SyntaxKind::Dot)
            .find(|t| t.kind() == SyntaxKind::Id)
    }
}

impl VariableDefs {
    pub fn defs(&self) -> impl Iterator<Item = VariableDef> + '_ {
        self.0.children().filter_map(VariableDef::cast)
    }
}

impl VariableDef {
    pub fn variable(&self) -> Option<Variable> {
        child(&self.0, Variable::cast)
    }

    pub fn type_annotation(&self) -> Option<TypeExpr> {
        child(&self.0, TypeExpr::cast)
    }

    /// The value after `=`, if any.
    pub fn default_value(&self) -> Option<Value> {
        let mut after_equals = false;
        for element in self.0.children_with_tokens() {
            match element {
                rowan::NodeOrToken::Token(t) if t.kind() == SyntaxKind::Equals => {
                    after_equals = true;
                }
                rowan::NodeOrToken::Node(n) if after_equals => return Value::cast(n),
                _ => {}
            }
        }
        None
    }
}

impl Variable {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Id)
    }
}

impl NamedType {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Id)
    }
}

impl ListType {
    pub fn item(&self) -> Option<TypeExpr> {
        child(&self.0, TypeExpr::cast)
    }
}

impl NonNullType {
    pub fn inner(&self) -> Option<TypeExpr> {
        child(&self.0, TypeExpr::cast)
    }
}

impl Description {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0.children_with_tokens().find_map(|it| {
            it.into_token().filter(|t| {
                matches!(
                    t.kind(),
                    SyntaxKind::StringValue | SyntaxKind::BlockStringValue
                )
            })
        })
    }
}

impl SelectionSet {
    pub fn selections(&self) -> impl Iterator<Item = Selection> + '_ {
        self.0.children().filter_map(Selection::cast)
    }
}

impl Selection {
    pub fn alias(&self) -> Option<Alias> {
        child(&self.0, Alias::cast)
    }

    /// The field name (the alias lives in its own `Alias` node).
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Id)
    }

    pub fn arguments(&self) -> Option<Arguments> {
        child(&self.0, Arguments::cast)
    }

    pub fn directives(&self) -> impl Iterator<Item = Directive> + '_ {
        self.0.children().filter_map(Directive::cast)
    }

    pub fn selection_set(&self) -> Option<SelectionSet> {
        child(&self.0, SelectionSet::cast)
    }
}

impl Alias {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Id)
    }
}

impl Arguments {
    pub fn arguments(&self) -> impl Iterator<Item = Argument> + '_ {
        self.0.children().filter_map(Argument::cast)
    }
}

impl Argument {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Id)
    }

    pub fn value(&self) -> Option<Value> {
        child(&self.0, Value::cast)
    }
}

impl Directive {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Id)
    }

    pub fn arguments(&self) -> Option<Arguments> {
        child(&self.0, Arguments::cast)
    }
}

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        self.0
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|t| !t.kind().is_trivia())
    }
}

impl ListValue {
    pub fn items(&self) -> impl Iterator<Item = Value> + '_ {
        self.0.children().filter_map(Value::cast)
    }
}

impl ObjectValue {
    pub fn fields(&self) -> impl Iterator<Item = ObjectField> + '_ {
        self.0.children().filter_map(ObjectField::cast)
    }
}

impl ObjectField {
    pub fn name(&self) -> Option<SyntaxToken> {
        child_token(&self.0, SyntaxKind::Id)
    }

    pub fn value(&self) -> Option<Value> {
        child(&self.0, Value::cast)
    }
}
