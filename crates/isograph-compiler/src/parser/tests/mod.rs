mod lower_tests;
mod recovery_tests;

use super::{ParseLimits, dump_cst, parse_cst, parse_declaration};
use crate::compile::SourceId;
use crate::declaration::Declaration;

#[track_caller]
fn expect_valid_cst(source: &str) -> String {
    let (root, diagnostics) =
        parse_cst(source, SourceId::default(), ParseLimits::default()).expect("no fuel limits");
    if !diagnostics.is_empty() {
        panic!(
            "expected valid literal, got errors:\n{}",
            diagnostics.dump()
        );
    }
    dump_cst(root.as_cst(), false)
}

#[track_caller]
fn expect_invalid(source: &str) -> String {
    let (_, diagnostics) =
        parse_declaration(source, SourceId::default(), ParseLimits::default())
            .expect("no fuel limits");
    if !diagnostics.has_errors() {
        panic!("expected parse errors, got none");
    }
    diagnostics.filtered().dump()
}

#[track_caller]
fn expect_declaration(source: &str) -> Declaration {
    let (declaration, diagnostics) =
        parse_declaration(source, SourceId::default(), ParseLimits::default())
            .expect("no fuel limits");
    if !diagnostics.is_empty() {
        panic!(
            "expected valid literal, got errors:\n{}",
            diagnostics.dump()
        );
    }
    declaration.expect("valid literal lowers")
}
