//! Lowering from the rowan tree into the owned declaration model.
//!
//! Checks that need the whole construct (duplicate names, integer range) run here and report
//! parse diagnostics. Missing pieces were already reported by the grammar and simply drop the
//! enclosing construct.

use indexmap::IndexMap;
use rowan::TextRange;

use super::ast;
use super::cst::{SyntaxKind, SyntaxToken};
use crate::compile::SourceId;
use crate::declaration::{
    Argument, Declaration, DeclarationKind, Directive, Name, Selection, SpannedValue,
    TypeAnnotation, TypeRef, Value, VariableDefinition,
};
use crate::diagnostics::{DiagnosticKind, Diagnostics};

pub(crate) fn lower(
    root: &ast::Root,
    source: SourceId,
    diagnostics: &mut Diagnostics,
) -> Option<Declaration> {
    let decl = root.declaration()?;
    Lowering {
        source,
        diagnostics,
    }
    .declaration(&decl)
}

struct Lowering<'d> {
    source: SourceId,
    diagnostics: &'d mut Diagnostics,
}

impl Lowering<'_> {
    fn declaration(&mut self, decl: &ast::Decl) -> Option<Declaration> {
        let target = decl.target()?;
        let parent_type = name(&target.type_name()?);
        let field_name = name(&target.field_name()?);
        let directives = decl.directives().filter_map(|d| self.directive(&d)).collect();
        let span = decl.as_cst().text_range();

        let (kind, target, variables, description, selections) = match decl {
            ast::Decl::Field(field) => (
                DeclarationKind::Field,
                None,
                field.variable_defs(),
                field.description(),
                field.selection_set(),
            ),
            ast::Decl::Pointer(pointer) => {
                let target_type = pointer.target_type()?;
                let target = TypeRef {
                    annotation: type_annotation(&target_type)?,
                    span: target_type.as_cst().text_range(),
                };
                (
                    DeclarationKind::Pointer,
                    Some(target),
                    pointer.variable_defs(),
                    pointer.description(),
                    pointer.selection_set(),
                )
            }
            ast::Decl::Entrypoint(_) => (DeclarationKind::Entrypoint, None, None, None, None),
        };

        let selections = match (kind, selections) {
            (DeclarationKind::Entrypoint, _) => Vec::new(),
            (_, Some(set)) => self.selection_set(&set),
            (_, None) => return None,
        };

        Some(Declaration {
            source: self.source,
            kind,
            parent_type,
            field_name,
            target,
            variables: variables
                .map(|defs| self.variable_defs(&defs))
                .unwrap_or_default(),
            directives,
            description: description
                .and_then(|d| d.token())
                .map(|t| string_contents(&t)),
            selections,
            span,
        })
    }

    fn variable_defs(&mut self, defs: &ast::VariableDefs) -> Vec<VariableDefinition> {
        let mut seen: IndexMap<String, TextRange> = IndexMap::new();
        let mut out = Vec::new();

        for def in defs.defs() {
            let Some(token) = def.variable().and_then(|v| v.name()) else {
                continue;
            };
            let Some(type_expr) = def.type_annotation() else {
                continue;
            };
            let Some(annotation) = type_annotation(&type_expr) else {
                continue;
            };
            let var_name = name(&token);
            let var_range = def.variable().map_or(var_name.span, |v| v.as_cst().text_range());

            if let Some(first) = seen.get(&var_name.text) {
                self.diagnostics
                    .report(self.source, DiagnosticKind::DuplicateVariable, var_range)
                    .message(&var_name.text)
                    .related_to("first defined here", *first)
                    .emit();
                continue;
            }
            seen.insert(var_name.text.clone(), var_range);

            let default_value = def.default_value().and_then(|v| self.spanned_value(&v));
            out.push(VariableDefinition {
                name: var_name,
                type_ref: TypeRef {
                    annotation,
                    span: type_expr.as_cst().text_range(),
                },
                default_value,
            });
        }

        out
    }

    fn selection_set(&mut self, set: &ast::SelectionSet) -> Vec<Selection> {
        let mut seen: IndexMap<String, TextRange> = IndexMap::new();
        let mut out = Vec::new();

        for selection in set.selections() {
            let Some(lowered) = self.selection(&selection) else {
                continue;
            };
            let response_name = lowered.response_name();
            if let Some(first) = seen.get(&response_name.text) {
                self.diagnostics
                    .report(
                        self.source,
                        DiagnosticKind::DuplicateResponseName,
                        response_name.span,
                    )
                    .message(&response_name.text)
                    .related_to("first selected here", *first)
                    .hint("give one of them an alias, e.g. `other: field`")
                    .emit();
                continue;
            }
            seen.insert(response_name.text.clone(), response_name.span);
            out.push(lowered);
        }

        out
    }

    fn selection(&mut self, selection: &ast::Selection) -> Option<Selection> {
        let field_name = name(&selection.name()?);
        let alias = selection
            .alias()
            .and_then(|a| a.name())
            .map(|t| name(&t));
        let arguments = selection
            .arguments()
            .map(|args| self.arguments(&args))
            .unwrap_or_default();
        let directives = selection
            .directives()
            .filter_map(|d| self.directive(&d))
            .collect();
        let selection_set = selection.selection_set().map(|set| self.selection_set(&set));

        Some(Selection {
            alias,
            name: field_name,
            arguments,
            directives,
            selection_set,
            span: selection.as_cst().text_range(),
        })
    }

    fn directive(&mut self, directive: &ast::Directive) -> Option<Directive> {
        let directive_name = name(&directive.name()?);
        let arguments = directive
            .arguments()
            .map(|args| self.arguments(&args))
            .unwrap_or_default();
        Some(Directive {
            name: directive_name,
            arguments,
            span: directive.as_cst().text_range(),
        })
    }

    fn arguments(&mut self, args: &ast::Arguments) -> Vec<Argument> {
        let mut seen: IndexMap<String, TextRange> = IndexMap::new();
        let mut out = Vec::new();

        for arg in args.arguments() {
            let Some(token) = arg.name() else {
                continue;
            };
            let arg_name = name(&token);
            let Some(value) = arg.value().and_then(|v| self.spanned_value(&v)) else {
                continue;
            };

            if let Some(first) = seen.get(&arg_name.text) {
                self.diagnostics
                    .report(self.source, DiagnosticKind::DuplicateArgument, arg_name.span)
                    .message(&arg_name.text)
                    .related_to("first provided here", *first)
                    .emit();
                continue;
            }
            seen.insert(arg_name.text.clone(), arg_name.span);
            out.push(Argument {
                name: arg_name,
                value,
            });
        }

        out
    }

    fn spanned_value(&mut self, value: &ast::Value) -> Option<SpannedValue> {
        Some(SpannedValue {
            value: self.value(value)?,
            span: value.as_cst().text_range(),
        })
    }

    fn value(&mut self, value: &ast::Value) -> Option<Value> {
        match value {
            ast::Value::Variable(var) => Some(Value::Variable(var.name()?.text().to_string())),
            ast::Value::Literal(lit) => self.literal(&lit.token()?),
            ast::Value::List(list) => {
                let items: Option<Vec<Value>> = list.items().map(|item| self.value(&item)).collect();
                items.map(Value::List)
            }
            ast::Value::Object(object) => {
                let mut fields = Vec::new();
                for field in object.fields() {
                    let key = field.name()?.text().to_string();
                    let item = self.value(&field.value()?)?;
                    fields.push((key, item));
                }
                Some(Value::Object(fields))
            }
        }
    }

    fn literal(&mut self, token: &SyntaxToken) -> Option<Value> {
        let text = token.text();
        match token.kind() {
            SyntaxKind::IntValue => match text.parse::<i64>() {
                Ok(i) => Some(Value::Int(i)),
                Err(_) => {
                    self.diagnostics
                        .report(self.source, DiagnosticKind::IntegerOutOfRange, token.text_range())
                        .message(text)
                        .emit();
                    None
                }
            },
            SyntaxKind::FloatValue => Some(Value::Float(text.to_string())),
            SyntaxKind::StringValue | SyntaxKind::BlockStringValue => {
                Some(Value::String(string_contents(token)))
            }
            SyntaxKind::KwTrue => Some(Value::Boolean(true)),
            SyntaxKind::KwFalse => Some(Value::Boolean(false)),
            SyntaxKind::KwNull => Some(Value::Null),
            SyntaxKind::Id => Some(Value::Enum(text.to_string())),
            _ => None,
        }
    }
}

fn name(token: &SyntaxToken) -> Name {
    Name::new(token.text(), token.text_range())
}

fn type_annotation(type_expr: &ast::TypeExpr) -> Option<TypeAnnotation> {
    match type_expr {
        ast::TypeExpr::Named(named) => Some(TypeAnnotation::named(named.name()?.text())),
        ast::TypeExpr::List(list) => Some(TypeAnnotation::list(type_annotation(&list.item()?)?)),
        ast::TypeExpr::NonNull(non_null) => Some(TypeAnnotation::non_null(type_annotation(
            &non_null.inner()?,
        )?)),
    }
}

/// Decoded contents of a string or block string token.
fn string_contents(token: &SyntaxToken) -> String {
    let text = token.text();
    if token.kind() == SyntaxKind::BlockStringValue {
        let inner = text
            .strip_prefix("\"\"\"")
            .and_then(|t| t.strip_suffix("\"\"\""))
            .unwrap_or(text);
        return dedent_block(inner);
    }
    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text);
    unescape(inner)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Strip common indentation and blank leading/trailing lines.
fn dedent_block(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let mut out: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| if i == 0 { *l } else { l.get(indent..).unwrap_or("") })
        .collect();
    while out.first().is_some_and(|l| l.trim().is_empty()) {
        out.remove(0);
    }
    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }
    out.join("\n")
}
