use crate::Error;
use crate::compile::CompilerConfig;
use crate::test_utils::{expect_invalid, expect_valid, run};

#[test]
fn resolver_cycle_is_fatal() {
    let dump = expect_invalid(&["field User.A { B }", "field User.B { A }"]);

    insta::assert_snapshot!(dump, @"error at 15..16: cyclic selection: User.A -> User.B -> User.A (hint: add `@loadable` to one selection in the cycle to defer it)");
}

#[test]
fn self_selection_is_a_cycle() {
    let dump = expect_invalid(&["field User.Me { name Me }"]);

    insta::assert_snapshot!(dump, @"error at 21..23: cyclic selection: User.Me -> User.Me (hint: add `@loadable` to one selection in the cycle to defer it)");
}

#[test]
fn pointer_cycle_through_resolver() {
    let dump = expect_invalid(&[
        "pointer User.bestFriend to User { Friendly }",
        "field User.Friendly { bestFriend { name } }",
    ]);

    insta::assert_snapshot!(dump, @"error at 34..42: cyclic selection: User.bestFriend -> User.Friendly -> User.bestFriend (hint: add `@loadable` to one selection in the cycle to defer it)");
}

#[test]
fn cycle_error_carries_the_path() {
    let literals = ["field User.A { B }", "field User.B { C }", "field User.C { A }"];
    let Err(Error::CyclicSelection(cycle)) = run(&literals, CompilerConfig::default()) else {
        panic!("expected a cycle");
    };

    assert_eq!(cycle.path, ["User.A", "User.B", "User.C", "User.A"]);
    assert_eq!(
        cycle.to_string(),
        "cyclic selection: User.A -> User.B -> User.C -> User.A"
    );
}

#[test]
fn loadable_selection_breaks_the_cycle() {
    let output = expect_valid(&[
        "field User.A { B @loadable }",
        "field User.B { A }",
        "field Query.Home { viewer { A } }",
        "entrypoint Query.Home",
    ]);

    assert_eq!(output.fields.len(), 3);
    assert!(output.entrypoint("User__B").is_some());
}
