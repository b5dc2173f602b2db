use super::{CompilerConfig, QueryTextFormat};

#[test]
fn missing_keys_take_defaults() {
    let config = CompilerConfig::from_json(r#"{ "queryTextFormat": "compact", "persistedQueries": true }"#)
        .expect("valid config");

    assert_eq!(config.query_text_format, QueryTextFormat::Compact);
    assert!(config.persisted_queries);
    assert!(config.generate_refetch_field);
    assert_eq!(config.parse_fuel, 1_000_000);
    assert_eq!(config.parse_max_depth, 512);
}

#[test]
fn empty_document_is_the_default() {
    let config = CompilerConfig::from_json("{}").expect("valid config");

    assert_eq!(config, CompilerConfig::default());
}

#[test]
fn rejects_unknown_format() {
    let err = CompilerConfig::from_json(r#"{ "queryTextFormat": "fancy" }"#).unwrap_err();

    assert!(err.to_string().contains("fancy"), "{}", err);
}

#[test]
fn disabling_refetch_field_removes_it_from_the_schema() {
    let config = CompilerConfig::from_json(r#"{ "generateRefetchField": false }"#).expect("valid config");
    let output = crate::test_utils::run(&["field User.x { __refetch }"], config)
        .expect("resolution errors are not fatal");

    assert_eq!(
        output.diagnostics.dump(),
        "error at 15..24: `User.__refetch` is not a field\n"
    );
}
