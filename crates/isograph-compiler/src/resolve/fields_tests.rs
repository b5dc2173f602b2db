use indoc::indoc;

use super::{Resolution, ResolvedArgument, SelectionKind, resolve};
use crate::declaration::Value;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::schema::ArtifactKind;
use crate::test_utils::fixture_graph;

fn resolve_all(literals: &[&str]) -> (Resolution, Diagnostics) {
    let (graph, declarations) = fixture_graph(literals);
    resolve(&graph, &declarations)
}

#[track_caller]
fn expect_errors(literals: &[&str]) -> String {
    let (_, diagnostics) = resolve_all(literals);
    assert!(diagnostics.has_errors(), "expected resolution errors");
    diagnostics.dump()
}

#[test]
fn resolves_nested_selections() {
    let (resolution, diagnostics) = resolve_all(&[indoc! {r#"
        field Query.Home($first: Int) {
          viewer {
            name
            repositories(first: $first, filter: { minStars: 10 }) { title }
            link
          }
        }
    "#}]);
    assert!(diagnostics.is_empty(), "{}", diagnostics.dump());

    let home = &resolution.fields[0];
    assert_eq!(home.artifact_kind, ArtifactKind::Eager);
    assert_eq!(home.variables[0].name, "first");

    let SelectionKind::Linked { selections, .. } = &home.selections[0].kind else {
        panic!("viewer is linked");
    };
    assert_eq!(selections[0].kind, SelectionKind::Scalar { updatable: false });
    assert_eq!(selections[0].store_key, "name");

    let repos = &selections[1];
    assert_eq!(
        repos.store_key,
        "repositories____first___v_first____filter___o_minStars__l_10_c"
    );
    assert_eq!(
        repos.arguments[0],
        ResolvedArgument {
            name: "first".to_string(),
            value: Value::Variable("first".to_string()),
        }
    );
    assert_eq!(selections[2].kind, SelectionKind::Link);
}

#[test]
fn arguments_give_distinct_store_keys() {
    let (resolution, diagnostics) = resolve_all(&[
        "field User.Repos { ten: repositories(first: 10) { title }, twenty: repositories(first: 20) { title } }",
    ]);
    assert!(diagnostics.is_empty(), "{}", diagnostics.dump());

    let keys: Vec<_> = resolution.fields[0]
        .selections
        .iter()
        .map(|s| (s.response_name.as_str(), s.store_key.as_str()))
        .collect();
    assert_eq!(
        keys,
        [
            ("ten", "repositories____first___l_10"),
            ("twenty", "repositories____first___l_20")
        ]
    );
}

#[test]
fn unknown_field_names_type_and_field() {
    let dump = expect_errors(&["field User.x { nope }"]);

    insta::assert_snapshot!(dump, @"error at 15..19: `User.nope` is not a field");
}

#[test]
fn selection_set_shape_follows_field_kind() {
    let dump = expect_errors(&[
        "field User.Avatar { avatarUrl }",
        "field User.a { name { id } }",
        "field User.b { repositories }",
        "field User.c { Avatar { id } }",
        "field User.d { repositories { } }",
    ]);

    insta::assert_snapshot!(dump, @r"
    error at 15..19: field cannot have a selection set: `User.name`
    error at 15..27: field requires a selection set: `User.repositories`
    error at 15..21: field cannot have a selection set: `User.Avatar`
    error at 15..27: field requires a selection set: `User.repositories` selects nothing
    ");
}

#[test]
fn argument_type_errors() {
    let dump = expect_errors(&[
        r#"field User.a { avatarUrl(size: "big") }"#,
        "field Query.b { search(text: \"x\", order: SIDEWAYS) { __typename } }",
        r#"field User.c { repositories(filter: { text: "rust" }) { title } }"#,
        "field User.d { avatarUrl(color: 1) }",
    ]);

    insta::assert_snapshot!(dump, @r#"
    error at 31..36: argument type mismatch: `size` expected `Int`, found `"big"`
    error at 41..49: argument type mismatch: `order` expected `Order`, found `SIDEWAYS`
    error at 36..52: argument type mismatch: `filter` missing field `minStars` of `RepoFilter`
    error at 25..30: `color` is not an argument of this field
    "#);
}

#[test]
fn accepts_coercible_arguments() {
    let (resolution, diagnostics) = resolve_all(&[
        r#"field Query.Search { search(text: "x", order: DESC) { __typename } user(id: 4) { name } }"#,
    ]);

    assert!(diagnostics.is_empty(), "{}", diagnostics.dump());
    assert_eq!(resolution.fields.len(), 1);
}

#[test]
fn missing_required_argument() {
    let dump = expect_errors(&["field Query.x { user { name } }"]);

    insta::assert_snapshot!(dump, @"error at 16..20: missing required argument `id`");
}

#[test]
fn variables_must_be_declared_and_compatible() {
    let dump = expect_errors(&[
        "field Query.a { user(id: $who) { name } }",
        "field Query.b($who: String) { user(id: $who) { name } }",
    ]);

    insta::assert_snapshot!(dump, @r"
    error at 25..29: variable `$who` is not declared
    error at 39..43: argument type mismatch: `id` variable `$who` of type `String` cannot be used as `ID!`
    ");
}

#[test]
fn variable_satisfies_location() {
    let (resolution, diagnostics) = resolve_all(&[
        "field Query.a($who: ID!) { user(id: $who) { name } }",
        "field Query.b($who: ID = \"1\") { user(id: $who) { name } }",
    ]);

    assert!(diagnostics.is_empty(), "{}", diagnostics.dump());
    assert_eq!(resolution.fields.len(), 2);
}

#[test]
fn variable_definition_errors() {
    let dump = expect_errors(&[
        "field Query.a($u: User) { viewer { name } }",
        "field Query.b($n: Int = \"ten\") { viewer { avatarUrl(size: $n) } }",
    ]);

    insta::assert_snapshot!(dump, @r#"
    error at 18..22: variable type must be an input type: `$u: User`
    warning at 15..16: variable `$u` is never used
    error at 24..29: default value does not match the variable type: expected `Int`, found `"ten"`
    "#);
}

#[test]
fn unused_variable_is_a_warning() {
    let (resolution, diagnostics) =
        resolve_all(&["field Query.x($unused: Int) { viewer { name } }"]);

    assert_eq!(resolution.fields.len(), 1);
    assert!(!diagnostics.has_errors());
    insta::assert_snapshot!(diagnostics.dump(), @"warning at 15..21: variable `$unused` is never used");
}

#[test]
fn loadable_rules() {
    let dump = expect_errors(&[
        "field Query.Details @loadable { viewer { name } }",
        "field Query.Home { Details }",
        "field Bot.Card { handle }",
        "field Bot.Wrapper { Card @loadable }",
    ]);

    insta::assert_snapshot!(dump, @r"
    error at 19..26: field must be selected with `@loadable`: `Query.Details` (hint: select it as `field @loadable`)
    error at 20..24: `@loadable` requires a refetchable parent type: `Bot` has no `id: ID!` field
    ");
}

#[test]
fn loadable_selection_waives_required_arguments() {
    let (resolution, diagnostics) = resolve_all(&[
        "field Query.Details($id: ID!) @loadable { user(id: $id) { name } }",
        "field Query.Home { Details @loadable }",
    ]);

    assert!(diagnostics.is_empty(), "{}", diagnostics.dump());
    assert!(resolution.fields[1].selections[0].is_loadable());
}

#[test]
fn id_variable_is_reserved_where_refetch_queries_bind_it() {
    let (resolution, diagnostics) = resolve_all(&[
        "field User.Details($id: ID) @loadable { email }",
        "field Query.Home($id: ID!) { user(id: $id) { name __refetch } }",
        "field Query.Page($id: ID!) { user(id: $id) { name } }",
    ]);

    assert_eq!(resolution.fields.len(), 1);
    insta::assert_snapshot!(diagnostics.dump(), @r"
    error at 20..22: variable `$id` is reserved for refetch queries (hint: rename it; refetch queries bind `$id` to the refetched record)
    warning at 20..22: variable `$id` is never used
    error at 18..20: variable `$id` is reserved for refetch queries (hint: rename it; refetch queries bind `$id` to the refetched record)
    ");
}

#[test]
fn pointer_selections() {
    let (resolution, diagnostics) = resolve_all(&[
        "pointer User.bestFriend to User { bestFriendId }",
        "field User.Friend { bestFriend { name } }",
    ]);
    assert!(diagnostics.is_empty(), "{}", diagnostics.dump());

    let pointer = &resolution.fields[0];
    assert!(pointer.pointer_target.is_some());
    assert!(matches!(
        resolution.fields[1].selections[0].kind,
        SelectionKind::Pointer { .. }
    ));

    let dump = expect_errors(&[
        "pointer User.bot to Bot { bestFriendId }",
        "field User.x { bot { handle } }",
    ]);
    insta::assert_snapshot!(dump, @"error at 15..18: pointer target type has no `id` field: `User.bot` points to `Bot`");
}

#[test]
fn entrypoint_rules() {
    let dump = expect_errors(&[
        "field User.Avatar { avatarUrl }",
        "field Query.Home { viewer { name } }",
        "entrypoint User.Avatar",
        "entrypoint Query.viewer",
        "entrypoint Query.Home",
        "entrypoint Query.Home",
    ]);

    insta::assert_snapshot!(dump, @r"
    error at 11..15: invalid entrypoint: `User` is not a root operation type
    error at 17..23: invalid entrypoint: `Query.viewer` is not a declared resolver field
    error at 17..21: `Query.Home` is declared as an entrypoint twice
    ");
}

#[test]
fn failing_field_does_not_affect_siblings() {
    let (resolution, diagnostics) = resolve_all(&[
        "field User.Broken { nope }",
        "field User.Fine { name }",
    ]);

    assert_eq!(diagnostics.kinds(), [DiagnosticKind::UnknownField]);
    assert_eq!(resolution.fields.len(), 1);
    assert_eq!(resolution.fields[0].declaration.index(), 1);
}
