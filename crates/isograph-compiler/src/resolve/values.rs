//! Argument and default value checking against GraphQL input types.

use crate::declaration::{TypeAnnotation, Value, VariableDefinition};
use crate::schema::{SchemaGraph, TypeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ValueError {
    UndeclaredVariable(String),
    Mismatch(String),
}

/// Check `value` against `expected`, delegating variable references to `variable`.
pub(crate) fn check_value(
    schema: &SchemaGraph,
    value: &Value,
    expected: &TypeAnnotation,
    variable: &mut dyn FnMut(&str, &TypeAnnotation) -> Result<(), ValueError>,
) -> Result<(), ValueError> {
    match (value, expected) {
        (Value::Variable(name), _) => variable(name, expected),
        (Value::Null, TypeAnnotation::NonNull(_)) => Err(mismatch(value, expected)),
        (Value::Null, _) => Ok(()),
        (_, TypeAnnotation::NonNull(inner)) => check_value(schema, value, inner, variable),
        (Value::List(items), TypeAnnotation::List(item)) => {
            for v in items {
                check_value(schema, v, item, variable)?;
            }
            Ok(())
        }
        // A single value is coerced into a one-item list
        (_, TypeAnnotation::List(item)) => check_value(schema, value, item, variable),
        (Value::List(_), TypeAnnotation::Named(_)) => Err(mismatch(value, expected)),
        (_, TypeAnnotation::Named(name)) => check_named(schema, value, name, expected, variable),
    }
}

fn check_named(
    schema: &SchemaGraph,
    value: &Value,
    name: &str,
    expected: &TypeAnnotation,
    variable: &mut dyn FnMut(&str, &TypeAnnotation) -> Result<(), ValueError>,
) -> Result<(), ValueError> {
    let Some(type_id) = schema.type_by_name(name) else {
        return Ok(());
    };
    let ty = schema.ty(type_id);
    let accepted = match ty.kind {
        TypeKind::Scalar => match name {
            "Int" => matches!(value, Value::Int(_)),
            "Float" => matches!(value, Value::Int(_) | Value::Float(_)),
            "String" => matches!(value, Value::String(_)),
            "Boolean" => matches!(value, Value::Boolean(_)),
            "ID" => matches!(value, Value::String(_) | Value::Int(_)),
            // Custom scalars have opaque serializations
            _ => true,
        },
        TypeKind::Enum => match value {
            Value::Enum(v) => ty.enum_values.iter().any(|e| e == v),
            _ => false,
        },
        TypeKind::InputObject => {
            let Value::Object(fields) = value else {
                return Err(mismatch(value, expected));
            };
            for (key, field_value) in fields {
                let Some(def) = ty.input_fields.iter().find(|f| &f.name == key) else {
                    return Err(ValueError::Mismatch(format!(
                        "`{}` has no field `{}`",
                        name, key
                    )));
                };
                check_value(schema, field_value, &def.type_annotation, variable)?;
            }
            if let Some(missing) = ty
                .input_fields
                .iter()
                .find(|f| f.is_required() && !fields.iter().any(|(k, _)| k == &f.name))
            {
                return Err(ValueError::Mismatch(format!(
                    "missing field `{}` of `{}`",
                    missing.name, name
                )));
            }
            true
        }
        _ => false,
    };
    if accepted {
        Ok(())
    } else {
        Err(mismatch(value, expected))
    }
}

fn mismatch(value: &Value, expected: &TypeAnnotation) -> ValueError {
    ValueError::Mismatch(format!("expected `{}`, found `{}`", expected, value))
}

/// Whether `variable` may be passed where `expected` is required.
///
/// A nullable variable with a default satisfies a non-null location.
pub(crate) fn variable_satisfies(variable: &VariableDefinition, expected: &TypeAnnotation) -> bool {
    let declared = &variable.type_ref.annotation;
    declared.satisfies(expected)
        || (expected.is_non_null()
            && variable.default_value.is_some()
            && declared.satisfies(expected.nullable()))
}

/// Variables of one declaration, with usage tracking.
pub(crate) struct VariableScope<'a> {
    definitions: &'a [VariableDefinition],
    used: Vec<bool>,
}

impl<'a> VariableScope<'a> {
    pub(crate) fn new(definitions: &'a [VariableDefinition]) -> Self {
        Self {
            definitions,
            used: vec![false; definitions.len()],
        }
    }

    /// Look up and mark as used.
    pub(crate) fn use_variable(&mut self, name: &str) -> Option<&'a VariableDefinition> {
        let index = self.definitions.iter().position(|d| d.name.text == name)?;
        self.used[index] = true;
        Some(&self.definitions[index])
    }

    pub(crate) fn unused(&self) -> impl Iterator<Item = &'a VariableDefinition> + '_ {
        self.definitions
            .iter()
            .zip(&self.used)
            .filter(|(_, used)| !**used)
            .map(|(d, _)| d)
    }
}
