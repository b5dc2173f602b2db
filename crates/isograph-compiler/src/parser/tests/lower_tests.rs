use indoc::indoc;

use super::expect_declaration;
use crate::declaration::{DeclarationKind, TypeAnnotation, Value};

#[test]
fn lowers_field_declaration() {
    let input = indoc! {r#"
    field Query.HomePage($first: Int = 10) @component """
        Home page.
    """ {
      viewer {
        repos: repositories(first: $first) @updatable { name }
      }
    }
    "#};

    let decl = expect_declaration(input);

    assert_eq!(decl.kind, DeclarationKind::Field);
    assert_eq!(decl.qualified_name(), "Query.HomePage");
    assert_eq!(decl.description.as_deref(), Some("Home page."));
    assert_eq!(decl.directives.len(), 1);
    assert_eq!(decl.directives[0].name.text, "component");

    let variable = &decl.variables[0];
    assert_eq!(variable.name.text, "first");
    assert_eq!(variable.type_ref.annotation, TypeAnnotation::named("Int"));
    assert_eq!(
        variable.default_value.as_ref().map(|v| &v.value),
        Some(&Value::Int(10))
    );

    let viewer = &decl.selections[0];
    let repos = &viewer.selection_set.as_ref().expect("linked")[0];
    assert_eq!(repos.response_name().text, "repos");
    assert_eq!(repos.name.text, "repositories");
    assert_eq!(
        repos.arguments[0].value.value,
        Value::Variable("first".to_string())
    );
    assert!(repos.directive("updatable").is_some());
}

#[test]
fn lowers_values() {
    let input = r#"field Query.x { a(s: "a\tb", f: -1.5e3, e: DESC, l: [true, false, null], o: {k: $v}) }"#;

    let decl = expect_declaration(input);

    let values: Vec<_> = decl.selections[0]
        .arguments
        .iter()
        .map(|a| (a.name.text.as_str(), a.value.value.clone()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("s", Value::String("a\tb".to_string())),
            ("f", Value::Float("-1.5e3".to_string())),
            ("e", Value::Enum("DESC".to_string())),
            (
                "l",
                Value::List(vec![
                    Value::Boolean(true),
                    Value::Boolean(false),
                    Value::Null
                ])
            ),
            (
                "o",
                Value::Object(vec![("k".to_string(), Value::Variable("v".to_string()))])
            ),
        ]
    );
}

#[test]
fn lowers_pointer_target() {
    let decl = expect_declaration("pointer User.friends to [User!]! { id }");

    assert_eq!(decl.kind, DeclarationKind::Pointer);
    let target = decl.target.expect("pointer has a target");
    assert_eq!(target.annotation.to_string(), "[User!]!");
    assert_eq!(target.annotation.inner_name(), "User");
}

#[test]
fn entrypoint_has_no_selections() {
    let decl = expect_declaration("entrypoint Query.HomePage");

    assert_eq!(decl.kind, DeclarationKind::Entrypoint);
    assert!(decl.selections.is_empty());
}

#[test]
fn empty_selection_set_is_kept() {
    let decl = expect_declaration("field User.x { linked { } }");

    assert_eq!(decl.selections[0].selection_set, Some(vec![]));
}

#[test]
fn parsing_is_deterministic() {
    let input = "field User.x($a: Int) @loadable(lazyLoadArtifact: true) { b(c: $a) { d } }";

    assert_eq!(expect_declaration(input), expect_declaration(input));
}
