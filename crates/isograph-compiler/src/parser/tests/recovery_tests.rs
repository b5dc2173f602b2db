use super::{ParseLimits, expect_invalid, parse_cst};
use crate::Error;
use crate::compile::SourceId;

#[test]
fn missing_closing_brace() {
    let res = expect_invalid("field User.x { name");

    insta::assert_snapshot!(res, @"error at 13..19: missing closing `}` (related: selection set started here at 13..14)");
}

#[test]
fn missing_closing_paren() {
    let res = expect_invalid("field User.x { a(n: 1 }");

    insta::assert_snapshot!(res, @"error at 16..21: missing closing `)` (related: argument list started here at 16..17)");
}

#[test]
fn unknown_declaration_keyword() {
    let res = expect_invalid("fragment Foo");

    insta::assert_snapshot!(res, @"error at 0..8: expected `field`, `pointer` or `entrypoint`, found `fragment` (hint: e.g., `field User.avatar { url }` or `entrypoint Query.HomePage`)");
}

#[test]
fn pointer_without_to() {
    let res = expect_invalid("pointer User.bestFriend User { id }");

    insta::assert_snapshot!(res, @"error at 24..28: expected `to`, found `User` (hint: e.g., `pointer User.bestFriend to User { ... }`)");
}

#[test]
fn tokens_after_declaration() {
    let res = expect_invalid("entrypoint Query.Home extra");

    insta::assert_snapshot!(res, @"error at 22..27: expected end of literal, found `extra`");
}

#[test]
fn garbage_inside_selection_set() {
    let res = expect_invalid("field User.x { name ^^ id }");

    insta::assert_snapshot!(res, @"error at 20..22: expected a field selection, found `^^`");
}

#[test]
fn missing_selection_set() {
    let res = expect_invalid("field User.x");

    insta::assert_snapshot!(res, @"error at 12..12: expected a selection set `{ ... }`, found end of input");
}

#[test]
fn duplicate_response_name() {
    let res = expect_invalid("field User.x { name name }");

    insta::assert_snapshot!(res, @"error at 20..24: `name` is selected twice in this selection set (related: first selected here at 15..19) (hint: give one of them an alias, e.g. `other: field`)");
}

#[test]
fn duplicate_argument() {
    let res = expect_invalid("field User.x { a(n: 1, n: 2) }");

    insta::assert_snapshot!(res, @"error at 23..24: argument `n` is provided twice (related: first provided here at 17..18)");
}

#[test]
fn integer_out_of_range() {
    let res = expect_invalid("field User.x { a(n: 99999999999999999999) }");

    insta::assert_snapshot!(res, @"error at 20..40: integer literal out of range: 99999999999999999999");
}

#[test]
fn recursion_limit_is_fatal() {
    let limits = ParseLimits {
        fuel: None,
        max_depth: Some(2),
    };
    let result = parse_cst("field A.b { a { b { c } } }", SourceId::default(), limits);

    assert!(matches!(result, Err(Error::RecursionLimitExceeded)));
}

#[test]
fn exec_fuel_is_fatal() {
    let limits = ParseLimits {
        fuel: Some(3),
        max_depth: None,
    };
    let result = parse_cst("field A.b { a b c d }", SourceId::default(), limits);

    assert!(matches!(result, Err(Error::ExecFuelExhausted)));
}
