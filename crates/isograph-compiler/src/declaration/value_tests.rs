use super::{TypeAnnotation, Value, store_key};

fn ty(s: &str) -> TypeAnnotation {
    s.parse().expect("valid annotation")
}

#[test]
fn alias_chunks() {
    let value = Value::Object(vec![
        ("text".to_string(), Value::String("hello world".to_string())),
        ("order".to_string(), Value::Enum("ASC".to_string())),
    ]);
    insta::assert_snapshot!(value.alias_chunk(), @"o_text__s_hello_x20_world_order__e_ASC_c");

    let list = Value::List(vec![Value::Int(1), Value::Variable("x".to_string())]);
    insta::assert_snapshot!(list.alias_chunk(), @"a_l_1_v_x_a");

    insta::assert_snapshot!(Value::Int(-3).alias_chunk(), @"l__x2D_3");
    insta::assert_snapshot!(Value::Float("2.5".to_string()).alias_chunk(), @"l_2_x2E_5");
    insta::assert_snapshot!(Value::Null.alias_chunk(), @"l_null");
}

#[test]
fn store_key_with_arguments() {
    let v = Value::Variable("v".to_string());
    let ten = Value::Int(10);
    let key = store_key("x", [("a", &v), ("b", &ten)]);
    insta::assert_snapshot!(key, @"x____a___v_v____b___l_10");
}

#[test]
fn store_key_without_arguments() {
    assert_eq!(store_key("name", []), "name");
}

#[test]
fn distinct_literals_have_distinct_keys() {
    let a = store_key("repositories", [("first", &Value::Int(10))]);
    let b = store_key("repositories", [("first", &Value::Int(20))]);
    assert_ne!(a, b);
}

#[test]
fn punctuation_and_underscores_do_not_collide() {
    let key = |value: Value| store_key("search", [("text", &value)]);
    let text = |s: &str| Value::String(s.to_string());

    let keys = [
        key(text("a b")),
        key(text("a-b")),
        key(text("a_b")),
        key(Value::List(vec![text("a"), text("b")])),
        key(Value::List(vec![text("a_s_b")])),
        key(Value::Enum("a_b".to_string())),
    ];
    insta::assert_snapshot!(keys.join("\n"), @r"
    search____text___s_a_x20_b
    search____text___s_a_x2D_b
    search____text___s_a_x5F_b
    search____text___a_s_a_s_b_a
    search____text___a_s_a_x5F_s_x5F_b_a
    search____text___e_a_x5F_b
    ");
}

#[test]
fn argument_names_are_escaped() {
    let one = Value::Int(1);
    let a = store_key("f", [("first_page", &one)]);
    let b = store_key("f_first", [("page", &one)]);
    insta::assert_snapshot!(a, @"f____first_x5F_page___l_1");
    insta::assert_snapshot!(b, @"f_x5F_first____page___l_1");
}

#[test]
fn value_display() {
    let value = Value::Object(vec![
        ("q".to_string(), Value::String("say \"hi\"\n".to_string())),
        (
            "ids".to_string(),
            Value::List(vec![Value::Int(1), Value::Null, Value::Variable("id".to_string())]),
        ),
    ]);
    insta::assert_snapshot!(value.to_string(), @r#"{q: "say \"hi\"\n", ids: [1, null, $id]}"#);
}

#[test]
fn substitute_variables() {
    let value = Value::List(vec![
        Value::Variable("a".to_string()),
        Value::Variable("b".to_string()),
    ]);
    let replaced = value.substitute(&|name| (name == "a").then_some(Value::Int(1)));
    assert_eq!(
        replaced,
        Value::List(vec![Value::Int(1), Value::Variable("b".to_string())])
    );
    assert_eq!(value.variables(), vec!["a", "b"]);
    assert!(!value.is_constant());
}

#[test]
fn type_annotation_round_trips_through_display() {
    for text in ["ID", "ID!", "[Int]", "[Int!]!", "[[String]!]"] {
        assert_eq!(ty(text).to_string(), text);
    }
}

#[test]
fn invalid_type_annotations() {
    for text in ["", "!", "[Int", "Int!!", "1Int", "[Int]]", "Foo Bar"] {
        assert!(text.parse::<TypeAnnotation>().is_err(), "{text:?} should fail");
    }
}

#[test]
fn satisfies_rules() {
    assert!(ty("Int!").satisfies(&ty("Int")));
    assert!(ty("Int!").satisfies(&ty("Int!")));
    assert!(!ty("Int").satisfies(&ty("Int!")));
    assert!(ty("[Int!]!").satisfies(&ty("[Int]")));
    assert!(!ty("[Int]").satisfies(&ty("Int")));
    assert!(!ty("String").satisfies(&ty("Int")));
    assert!(!ty("[[Int]]").satisfies(&ty("[Int]")));
}
