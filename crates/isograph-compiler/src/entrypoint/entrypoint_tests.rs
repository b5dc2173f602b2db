use indoc::indoc;

use super::{NormalizationKey, query_hash};
use crate::artifact::{ArtifactKind, ArtifactRole, dump_normalization_ast};
use crate::compile::{CompilerConfig, QueryTextFormat};
use crate::declaration::Value;
use crate::schema::OperationKind;
use crate::test_utils::{expect_valid, expect_valid_with};

#[test]
fn declared_entrypoint_query() {
    let output = expect_valid(&[
        indoc! {"
            field Query.Home($first: Int = 3) {
              viewer {
                name
                repositories(first: $first) { title }
              }
            }
        "},
        "entrypoint Query.Home",
    ]);
    let home = &output.entrypoints[0];

    assert_eq!(home.operation_kind, OperationKind::Query);
    assert_eq!(home.id.role, ArtifactRole::Entrypoint);
    assert_eq!(
        home.reader_artifact.role,
        ArtifactRole::Reader {
            artifact_kind: ArtifactKind::Eager
        }
    );
    assert_eq!(home.query_hash, None);
    insta::assert_snapshot!(home.query_text, @r"
    query Home($first: Int = 3) {
      viewer {
        id
        name
        repositories____first___v_first: repositories(first: $first) {
          id
          title
        }
      }
    }
    ");
    insta::assert_snapshot!(dump_normalization_ast(&home.normalization_ast), @r"
    Linked viewer: User
      Scalar id
      Scalar name
      Linked repositories____first___v_first: Repository
        Scalar id
        Scalar title
    ");
}

#[test]
fn resolver_arguments_are_bound_when_inlined() {
    let output = expect_valid(&[
        "field User.Avatar($size: Int = 50) { avatarUrl(size: $size) }",
        "field User.Badge($size: Int) { avatarUrl(size: $size) email }",
        indoc! {"
            field Query.Page($big: Int) {
              viewer {
                Avatar
                small: Avatar(size: 16)
                big: Avatar(size: $big)
                Badge
              }
            }
        "},
        "entrypoint Query.Page",
    ]);

    insta::assert_snapshot!(output.entrypoints[0].query_text, @r"
    query Page($big: Int) {
      viewer {
        id
        avatarUrl
        avatarUrl____size___v_big: avatarUrl(size: $big)
        avatarUrl____size___l_16: avatarUrl(size: 16)
        avatarUrl____size___l_50: avatarUrl(size: 50)
        email
      }
    }
    ");
}

#[test]
fn refetch_and_loadable_entrypoints() {
    let output = expect_valid(&[
        "field User.Details @loadable { email }",
        "field User.Card { name Details @loadable __refetch }",
        "field Query.Home { viewer { Card } }",
        "entrypoint Query.Home",
    ]);
    let names: Vec<_> = output.entrypoints.iter().map(|e| e.query_name.as_str()).collect();
    assert_eq!(names, ["Home", "User__Details"]);

    let home = &output.entrypoints[0];
    insta::assert_snapshot!(home.query_text, @r"
    query Home {
      viewer {
        id
        name
      }
    }
    ");

    let refetch = &home.refetch_queries[0];
    assert_eq!(home.refetch_queries.len(), 1);
    assert_eq!(refetch.owner.to_string(), "User.Card");
    assert_eq!(refetch.index, 0);
    insta::assert_snapshot!(refetch.query_text, @r"
    query Home__refetch__0($id: ID!) {
      node____id___v_id: node(id: $id) {
        id
        __typename
        ... on User {
          id
          __typename
          name
        }
      }
    }
    ");

    let details = &output.entrypoints[1];
    assert_eq!(details.id.to_string(), "User.Details (entrypoint)");
    assert_eq!(
        details.reader_artifact.role,
        ArtifactRole::Reader {
            artifact_kind: ArtifactKind::LoadableAction
        }
    );
    insta::assert_snapshot!(details.query_text, @r"
    query User__Details($id: ID!) {
      node____id___v_id: node(id: $id) {
        id
        __typename
        ... on User {
          id
          __typename
          email
        }
      }
    }
    ");
}

#[test]
fn pointer_selections_get_refetch_queries() {
    let output = expect_valid(&[
        "pointer User.bestFriend to User { bestFriendId }",
        "field Query.Friends { viewer { bestFriend { name } } }",
        "entrypoint Query.Friends",
    ]);
    let friends = &output.entrypoints[0];

    insta::assert_snapshot!(dump_normalization_ast(&friends.normalization_ast), @r"
    Linked viewer: User
      Scalar id
      Scalar bestFriendId
    ");
    let refetch = &friends.refetch_queries[0];
    assert_eq!(refetch.owner.to_string(), "Query.Friends");
    insta::assert_snapshot!(dump_normalization_ast(&refetch.normalization_ast), @r"
    Linked node____id___v_id
      Scalar id
      Scalar __typename
      InlineFragment User
        Scalar id
        Scalar __typename
        Scalar name
    ");
}

#[test]
fn abstract_fields_select_typename() {
    let output = expect_valid(&[
        r#"field Query.Results { search(text: "x") { asUser { name } asBot { handle } } }"#,
        "entrypoint Query.Results",
    ]);

    insta::assert_snapshot!(output.entrypoints[0].query_text, @r#"
    query Results {
      search____text___s_x: search(text: "x") {
        __typename
        ... on Bot {
          __typename
          handle
        }
        ... on User {
          id
          __typename
          name
        }
      }
    }
    "#);
}

#[test]
fn compact_text_and_persisted_hash() {
    let config = CompilerConfig::default()
        .with_query_text_format(QueryTextFormat::Compact)
        .with_persisted_queries(true);
    let output = expect_valid_with(
        &[
            "field Mutation.Rename($id: ID!, $name: String!) { renameUser(id: $id, name: $name) { name } }",
            "entrypoint Mutation.Rename",
        ],
        config,
    );
    let rename = &output.entrypoints[0];

    assert_eq!(rename.operation_kind, OperationKind::Mutation);
    insta::assert_snapshot!(rename.query_text, @"mutation Rename($id: ID!, $name: String!) { renameUser____id___v_id____name___v_name: renameUser(id: $id, name: $name) { id name } }");
    assert_eq!(rename.query_hash.as_deref(), Some(query_hash(&rename.query_text).as_str()));
}

#[test]
fn hash_is_sha256_hex() {
    assert_eq!(
        query_hash(""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn lazy_load_options() {
    let output = expect_valid(&[
        "field Query.Details @loadable { viewer { name } }",
        "field Query.Home { Details @loadable(lazyLoadArtifact: true) }",
        "entrypoint Query.Home @lazyLoad(normalization: true)",
    ]);
    let names: Vec<_> = output.entrypoints.iter().map(|e| e.query_name.as_str()).collect();
    assert_eq!(names, ["Home", "Query__Details"]);

    assert!(output.entrypoints[0].lazy_load.normalization);
    assert!(!output.entrypoints[0].lazy_load.reader);
    assert!(output.entrypoints[1].lazy_load.reader);

    let json = serde_json::to_value(&output.entrypoints[1]).unwrap();
    assert_eq!(json["operationKind"], "query");
    assert_eq!(json["lazyLoad"]["reader"], true);
    assert_eq!(json["id"]["role"]["kind"], "Entrypoint");
    assert!(json.get("queryHash").is_none());
}

#[test]
fn unbound_variables_are_left_out() {
    let output = expect_valid(&[
        "field User.Repos($text: String) { repositories(first: 5, filter: { minStars: 1, text: $text }) { title } }",
        "field Query.Home { viewer { Repos } }",
        "entrypoint Query.Home",
    ]);

    insta::assert_snapshot!(output.entrypoints[0].query_text, @r"
    query Home {
      viewer {
        id
        repositories____first___l_5____filter___o_minStars__l_1_text__l_null_c: repositories(first: 5, filter: {minStars: 1, text: null}) {
          id
          title
        }
      }
    }
    ");
}

#[test]
fn normalization_keys_put_id_first() {
    let mut keys = vec![
        NormalizationKey::InlineFragment("User".to_string()),
        NormalizationKey::ServerField {
            name: "name".to_string(),
            arguments: vec![("size".to_string(), Value::Int(1))],
        },
        NormalizationKey::ServerField {
            name: "name".to_string(),
            arguments: Vec::new(),
        },
        NormalizationKey::Id,
    ];
    keys.sort();

    assert_eq!(keys[0], NormalizationKey::Id);
    assert!(matches!(&keys[1], NormalizationKey::ServerField { arguments, .. } if arguments.is_empty()));
    assert!(matches!(keys[3], NormalizationKey::InlineFragment(_)));
}

#[test]
fn loadable_fields_outside_every_entrypoint_are_not_planned() {
    let output = expect_valid(&[
        "field User.Details @loadable { email }",
        "field User.Orphan { Details @loadable }",
        "field User.Summary @loadable { name }",
        "field User.Card { Summary @loadable }",
        "field Query.Home { viewer { Card } }",
        "entrypoint Query.Home",
    ]);
    let names: Vec<_> = output.entrypoints.iter().map(|e| e.query_name.as_str()).collect();

    assert_eq!(names, ["Home", "User__Summary"]);
    assert!(output.field("User", "Orphan").is_some());
}

#[test]
fn loadable_entrypoints_plan_the_loadables_they_reach() {
    let output = expect_valid(&[
        "field User.Details @loadable { email }",
        "field User.Summary @loadable { name Details @loadable }",
        "field Query.Home { viewer { Summary @loadable } }",
        "entrypoint Query.Home",
    ]);
    let names: Vec<_> = output.entrypoints.iter().map(|e| e.query_name.as_str()).collect();

    assert_eq!(names, ["Home", "User__Summary", "User__Details"]);
}

#[test]
fn arguments_differing_only_in_punctuation_get_distinct_keys() {
    let output = expect_valid(&[
        r#"field Query.Results { a: search(text: "a b") { asBot { handle } } b: search(text: "a-b") { asBot { handle } } }"#,
        "entrypoint Query.Results",
    ]);

    insta::assert_snapshot!(output.entrypoints[0].query_text, @r#"
    query Results {
      search____text___s_a_x20_b: search(text: "a b") {
        __typename
        ... on Bot {
          __typename
          handle
        }
      }
      search____text___s_a_x2D_b: search(text: "a-b") {
        __typename
        ... on Bot {
          __typename
          handle
        }
      }
    }
    "#);
}
