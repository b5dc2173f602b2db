use std::collections::BTreeSet;

use indexmap::IndexMap;
use indoc::indoc;

use super::{
    ArtifactKind, ArtifactRole, FieldArtifacts, NormalizationAst, NormalizationNode, ReaderAst,
    ReaderNode, RefetchSiteKind, UpdatableLocation, dump_normalization_ast, dump_reader_ast,
    generate_all, refetch_sites,
};
use crate::resolve::{Resolution, resolve};
use crate::schema::{FieldId, SchemaGraph};
use crate::test_utils::fixture_graph;

fn generate(literals: &[&str]) -> (SchemaGraph, Resolution, IndexMap<FieldId, FieldArtifacts>) {
    let (graph, declarations) = fixture_graph(literals);
    let (resolution, diagnostics) = resolve(&graph, &declarations);
    assert!(!diagnostics.has_errors(), "{}", diagnostics.dump());
    let artifacts = generate_all(&graph, &resolution);
    (graph, resolution, artifacts)
}

/// Every store location written, as the path of store keys from the root record.
///
/// Inline fragments write into the record they are in and add no path segment.
fn normalization_store_keys(ast: &NormalizationAst) -> BTreeSet<Vec<String>> {
    let mut keys = BTreeSet::new();
    collect_normalization_keys(ast, &mut Vec::new(), &mut keys);
    keys
}

fn collect_normalization_keys(
    ast: &NormalizationAst,
    path: &mut Vec<String>,
    keys: &mut BTreeSet<Vec<String>>,
) {
    for node in ast {
        match node {
            NormalizationNode::Scalar { store_key, .. } => {
                path.push(store_key.clone());
                keys.insert(path.clone());
                path.pop();
            }
            NormalizationNode::Linked {
                store_key,
                selections,
                ..
            } => {
                path.push(store_key.clone());
                keys.insert(path.clone());
                collect_normalization_keys(selections, path, keys);
                path.pop();
            }
            NormalizationNode::InlineFragment { selections, .. } => {
                collect_normalization_keys(selections, path, keys);
            }
        }
    }
}

/// Every store location read, as the path of store keys from the root record.
///
/// Resolver, link and loadable nodes have no store location; pointer subtrees read other records
/// and are skipped entirely.
fn reader_store_keys(ast: &ReaderAst) -> BTreeSet<Vec<String>> {
    let mut keys = BTreeSet::new();
    collect_reader_keys(ast, &mut Vec::new(), &mut keys);
    keys
}

fn collect_reader_keys(
    ast: &ReaderAst,
    path: &mut Vec<String>,
    keys: &mut BTreeSet<Vec<String>>,
) {
    for node in ast {
        match node {
            ReaderNode::Scalar { store_key, .. } => {
                path.push(store_key.clone());
                keys.insert(path.clone());
                path.pop();
            }
            ReaderNode::Linked {
                condition: Some(_), ..
            } => {}
            ReaderNode::Linked {
                type_condition: Some(_),
                selections,
                ..
            } => collect_reader_keys(selections, path, keys),
            ReaderNode::Linked {
                store_key,
                selections,
                ..
            } => {
                path.push(store_key.clone());
                keys.insert(path.clone());
                collect_reader_keys(selections, path, keys);
                path.pop();
            }
            ReaderNode::Resolver { .. }
            | ReaderNode::Link { .. }
            | ReaderNode::LoadablySelectedField { .. } => {}
        }
    }
}

const PROFILE: &str = indoc! {"
    field User.Profile($size: Int) {
      name
      avatarUrl(size: $size)
      small: avatarUrl(size: 16)
      repositories(first: 3) { title owner { name } }
      link
    }
"};

const RESULTS: &str = indoc! {r#"
    field Query.Results {
      search(text: "rust") {
        __typename
        asUser { name }
        asBot { handle }
      }
      me: viewer { name }
      viewer { email }
    }
"#};

#[test]
fn server_selections_use_store_keys() {
    let (_, _, artifacts) = generate(&[PROFILE]);
    let profile = &artifacts[0];

    assert_eq!(
        profile.id.role,
        ArtifactRole::Reader {
            artifact_kind: ArtifactKind::Eager
        }
    );
    insta::assert_snapshot!(dump_normalization_ast(&profile.normalization_ast), @r"
    Scalar name
    Scalar avatarUrl____size___v_size
    Scalar avatarUrl____size___l_16
    Linked repositories____first___l_3: Repository
      Scalar title
      Linked owner: User
        Scalar name
    ");
    insta::assert_snapshot!(dump_reader_ast(&profile.reader_ast), @r"
    Scalar name
    Scalar avatarUrl = avatarUrl____size___v_size
    Scalar small = avatarUrl____size___l_16
    Linked repositories = repositories____first___l_3
      Scalar title
      Linked owner
        Scalar name
    Link link
    ");
    assert_eq!(profile.updatable, None);
}

#[test]
fn abstract_fields_and_merged_siblings() {
    let (_, _, artifacts) = generate(&[RESULTS]);
    let results = &artifacts[0];

    insta::assert_snapshot!(dump_normalization_ast(&results.normalization_ast), @r"
    Linked search____text___s_rust
      Scalar __typename
      InlineFragment User
        Scalar name
      InlineFragment Bot
        Scalar handle
    Linked viewer: User
      Scalar name
      Scalar email
    ");
    insta::assert_snapshot!(dump_reader_ast(&results.reader_ast), @r"
    Linked search = search____text___s_rust
      Scalar __typename
      Linked asUser on User
        Scalar name
      Linked asBot on Bot
        Scalar handle
    Linked me = viewer
      Scalar name
    Linked viewer
      Scalar email
    ");
}

#[test]
fn both_trees_address_the_same_store_locations() {
    let (_, _, artifacts) = generate(&[
        "field User.Avatar @component { avatarUrl }",
        PROFILE,
        RESULTS,
        "field User.Mixed { Avatar, name, ten: repositories(first: 10) { title }, twenty: repositories(first: 20) { title } }",
    ]);

    for field in artifacts.values() {
        assert_eq!(
            normalization_store_keys(&field.normalization_ast),
            reader_store_keys(&field.reader_ast),
            "{}",
            field.id
        );
    }

    let mixed = &artifacts[3];
    let keys: Vec<_> = normalization_store_keys(&mixed.normalization_ast)
        .into_iter()
        .map(|path| path.join("/"))
        .collect();
    assert_eq!(
        keys,
        [
            "name",
            "repositories____first___l_10",
            "repositories____first___l_10/title",
            "repositories____first___l_20",
            "repositories____first___l_20/title",
        ]
    );
}

#[test]
fn reader_only_nodes() {
    let (graph, resolution, artifacts) = generate(&[
        "field User.Avatar @component { avatarUrl }",
        "pointer User.bestFriend to User { bestFriendId }",
        "field User.Details @loadable { email }",
        indoc! {"
            field User.Card @component {
              Avatar
              __refetch
              bestFriend { name __refetch }
              Details @loadable
            }
        "},
    ]);

    let pointer = &artifacts[1];
    assert_eq!(
        pointer.id.role,
        ArtifactRole::Reader {
            artifact_kind: ArtifactKind::Eager
        }
    );
    insta::assert_snapshot!(dump_reader_ast(&pointer.reader_ast), @"Scalar bestFriendId");

    let card = &artifacts[3];
    assert!(card.normalization_ast.is_empty());
    insta::assert_snapshot!(dump_reader_ast(&card.reader_ast), @r"
    Resolver Avatar -> User.Avatar
    Resolver __refetch -> User.__refetch refetch #0
    Linked bestFriend via User.bestFriend refetch #1
      Scalar name
      Resolver __refetch -> User.__refetch refetch #2
    Loadable Details -> User.Details (entrypoint)
      Scalar id
    ");

    let resolved = &resolution.fields[3];
    let sites = refetch_sites(resolved.parent, &resolved.selections);
    let summary: Vec<_> = sites
        .iter()
        .map(|site| match site.kind {
            RefetchSiteKind::Refetch { parent, .. } => {
                format!("{} refetch {}", site.index, graph.type_name(parent))
            }
            RefetchSiteKind::Pointer { target, .. } => {
                format!("{} pointer {}", site.index, graph.type_name(target))
            }
        })
        .collect();
    assert_eq!(summary, ["0 refetch User", "1 pointer User", "2 refetch User"]);
}

#[test]
fn loadable_root_fields_need_no_refetch_reader() {
    let (_, _, artifacts) = generate(&[
        "field Query.Details @loadable { viewer { name } }",
        "field Query.Home { Details @loadable }",
    ]);

    insta::assert_snapshot!(dump_reader_ast(&artifacts[1].reader_ast), @"Loadable Details -> Query.Details (entrypoint)");
}

#[test]
fn updatable_locations() {
    let (_, _, artifacts) = generate(&[
        "field User.Editor { name @updatable, repos: repositories(first: 2) { title @updatable, stars } }",
    ]);
    let editor = &artifacts[0];

    insta::assert_snapshot!(dump_reader_ast(&editor.reader_ast), @r"
    Scalar name @updatable
    Linked repos = repositories____first___l_2
      Scalar title @updatable
      Scalar stars
    ");
    let locations = editor
        .updatable
        .as_ref()
        .map(|u| u.locations.clone())
        .unwrap_or_default();
    assert_eq!(
        locations,
        [
            UpdatableLocation {
                path: vec!["name".to_string()],
                store_key: "name".to_string(),
            },
            UpdatableLocation {
                path: vec!["repos".to_string(), "title".to_string()],
                store_key: "title".to_string(),
            },
        ]
    );
}

#[test]
fn arguments_serialize_as_tagged_values() {
    let (_, _, artifacts) = generate(&[
        "field User.Top { repositories(filter: { minStars: 10, order: DESC }) { title } }",
    ]);
    let super::ReaderNode::Linked { arguments, .. } = &artifacts[0].reader_ast[0] else {
        panic!("repositories is linked");
    };

    let json = serde_json::to_string_pretty(arguments).unwrap();
    insta::assert_snapshot!(json, @r#"
    [
      {
        "name": "filter",
        "value": {
          "kind": "Object",
          "fields": [
            {
              "name": "minStars",
              "value": {
                "kind": "Literal",
                "value": 10
              }
            },
            {
              "name": "order",
              "value": {
                "kind": "Enum",
                "value": "DESC"
              }
            }
          ]
        }
      }
    ]
    "#);
}
