//! GraphQL operation text for merged selections.

use super::QueryVariable;
use super::merge::{MergedSelection, MergedSelectionMap, merged_store_key};
use crate::compile::QueryTextFormat;
use crate::declaration::Value;
use crate::schema::OperationKind;

pub(crate) fn print_operation(
    operation: OperationKind,
    name: &str,
    variables: &[QueryVariable],
    selections: &MergedSelectionMap,
    format: QueryTextFormat,
) -> String {
    let mut printer = Printer {
        out: String::new(),
        format,
    };
    printer.out.push_str(&format!("{} {}", operation, name));
    if !variables.is_empty() {
        let defs: Vec<String> = variables.iter().map(QueryVariable::definition).collect();
        printer.out.push_str(&format!("({})", defs.join(", ")));
    }
    printer.out.push(' ');
    printer.selection_set(selections, 0);
    if format == QueryTextFormat::Pretty {
        printer.out.push('\n');
    }
    printer.out
}

struct Printer {
    out: String,
    format: QueryTextFormat,
}

impl Printer {
    fn line_break(&mut self, depth: usize) {
        match self.format {
            QueryTextFormat::Pretty => {
                self.out.push('\n');
                self.out.push_str(&"  ".repeat(depth));
            }
            QueryTextFormat::Compact => self.out.push(' '),
        }
    }

    fn selection_set(&mut self, selections: &MergedSelectionMap, depth: usize) {
        self.out.push('{');
        for selection in selections.values() {
            self.line_break(depth + 1);
            self.selection(selection, depth + 1);
        }
        self.line_break(depth);
        self.out.push('}');
    }

    fn selection(&mut self, selection: &MergedSelection, depth: usize) {
        match selection {
            MergedSelection::Scalar {
                field_name,
                arguments,
            } => self.field(field_name, arguments),
            MergedSelection::Linked {
                field_name,
                arguments,
                selections,
                ..
            } => {
                self.field(field_name, arguments);
                self.out.push(' ');
                self.selection_set(selections, depth);
            }
            MergedSelection::InlineFragment {
                type_name,
                selections,
            } => {
                self.out.push_str("... on ");
                self.out.push_str(type_name);
                self.out.push(' ');
                self.selection_set(selections, depth);
            }
        }
    }

    /// Fields with arguments are aliased by their store key so that differently-argumented
    /// selections of one field never share a response name.
    fn field(&mut self, field_name: &str, arguments: &[(String, Value)]) {
        if arguments.is_empty() {
            self.out.push_str(field_name);
            return;
        }
        let args: Vec<String> = arguments
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect();
        self.out.push_str(&format!(
            "{}: {}({})",
            merged_store_key(field_name, arguments),
            field_name,
            args.join(", ")
        ));
    }
}
