use super::{LazyLoad, LoadableOptions, Resolution, SelectionKind, resolve};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
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

const AVATAR: &str = "field User.Avatar @component { avatarUrl }";

#[test]
fn loadable_and_updatable_are_exclusive() {
    let dump = expect_errors(&["field User.x { name @loadable @updatable }"]);

    insta::assert_snapshot!(dump, @r"
    error at 20..29: `@loadable` is not allowed on scalar selections (hint: `@loadable` is allowed on field declarations and resolver selections)
    error at 30..40: `@loadable` and `@updatable` cannot be used together (hint: keep only one of the two directives)
    ");
}

#[test]
fn loadable_and_updatable_are_exclusive_on_linked_fields() {
    let (resolution, diagnostics) =
        resolve_all(&["field User.x { repositories @loadable @updatable { title } }"]);

    assert!(resolution.fields.is_empty());
    assert_eq!(
        diagnostics.kinds(),
        [
            DiagnosticKind::DirectiveNotAllowed,
            DiagnosticKind::MutuallyExclusiveDirectives
        ]
    );
}

#[test]
fn loadable_accepts_boolean_lazy_load_artifact() {
    for (literal, expected) in [
        (
            "field User.Profile { Avatar @loadable(lazyLoadArtifact: true) }",
            true,
        ),
        (
            "field User.Profile { Avatar @loadable(lazyLoadArtifact: false) }",
            false,
        ),
        ("field User.Profile { Avatar @loadable }", false),
    ] {
        let (resolution, diagnostics) = resolve_all(&[AVATAR, literal]);
        assert!(diagnostics.is_empty(), "{}", diagnostics.dump());

        let profile = &resolution.fields[1];
        assert_eq!(
            profile.selections[0].kind,
            SelectionKind::Resolver {
                artifact_kind: crate::schema::ArtifactKind::Component,
                loadable: Some(LoadableOptions {
                    lazy_load_artifact: expected
                }),
            }
        );
    }
}

#[test]
fn loadable_rejects_non_boolean_argument() {
    let dump = expect_errors(&[
        AVATAR,
        "field User.Profile { Avatar @loadable(lazyLoadArtifact: 123) }",
    ]);

    insta::assert_snapshot!(dump, @"error at 56..59: directive argument type mismatch: `lazyLoadArtifact` expects `Boolean`, found `123`");
}

#[test]
fn loadable_rejects_unknown_argument() {
    let dump = expect_errors(&[AVATAR, "field User.Profile { Avatar @loadable(asdf: true) }"]);

    insta::assert_snapshot!(dump, @"error at 38..42: `asdf` is not an argument of this directive (hint: `@loadable` accepts `lazyLoadArtifact`)");
}

#[test]
fn loadable_rejects_variable_argument() {
    let (_, diagnostics) = resolve_all(&[
        AVATAR,
        "field User.Profile($flag: Boolean) { Avatar @loadable(lazyLoadArtifact: $flag) }",
    ]);

    assert_eq!(
        diagnostics.kinds(),
        [
            DiagnosticKind::DirectiveArgumentNotConstant,
            DiagnosticKind::UnusedVariable
        ]
    );
}

#[test]
fn unknown_directives_are_each_reported() {
    let dump = expect_errors(&["field User.x { name @hello @there }"]);

    insta::assert_snapshot!(dump, @r"
    error at 20..26: unknown directive `@hello`
    error at 27..33: unknown directive `@there`
    ");
}

#[test]
fn pointer_declarations_reject_every_directive() {
    let dump = expect_errors(&[
        "pointer User.bestFriend to User @directives @allowed { bestFriendId }",
    ]);

    insta::assert_snapshot!(dump, @r"
    error at 32..43: `@directives` is not allowed on a pointer declaration
    error at 44..52: `@allowed` is not allowed on a pointer declaration
    ");
}

#[test]
fn duplicate_and_conflicting_declaration_directives() {
    let dump = expect_errors(&[
        "field User.x @component @component { name }",
        "field User.y @component @loadable { name }",
    ]);

    insta::assert_snapshot!(dump, @r"
    error at 24..34: `@component` is applied twice
    error at 24..33: `@component` and `@loadable` cannot be used together (hint: keep only one of the two directives)
    ");
}

#[test]
fn updatable_on_scalar_and_linked_selections() {
    let (resolution, diagnostics) = resolve_all(&[
        "field User.Editor { name @updatable, repositories @updatable { title } }",
    ]);
    assert!(diagnostics.is_empty(), "{}", diagnostics.dump());

    let selections = &resolution.fields[0].selections;
    assert_eq!(selections[0].kind, SelectionKind::Scalar { updatable: true });
    assert!(matches!(
        selections[1].kind,
        SelectionKind::Linked {
            updatable: true,
            ..
        }
    ));
}

#[test]
fn lazy_load_on_entrypoints() {
    let (resolution, diagnostics) = resolve_all(&[
        "field Query.Home { viewer { name } }",
        "entrypoint Query.Home @lazyLoad(reader: true)",
    ]);
    assert!(diagnostics.is_empty(), "{}", diagnostics.dump());

    assert_eq!(
        resolution.entrypoints[0].lazy_load,
        LazyLoad {
            reader: true,
            normalization: false
        }
    );
}

#[test]
fn lazy_load_is_only_for_entrypoints() {
    let (_, diagnostics) = resolve_all(&["field Query.Home @lazyLoad { viewer { name } }"]);

    assert_eq!(diagnostics.kinds(), [DiagnosticKind::DirectiveNotAllowed]);
}
