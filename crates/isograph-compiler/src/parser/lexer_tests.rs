use super::cst::SyntaxKind;
use super::lexer::{lex, token_text};

fn dump(source: &str) -> String {
    lex(source)
        .iter()
        .filter(|t| !t.kind.is_trivia())
        .map(|t| format!("{:?} {:?}", t.kind, token_text(source, t)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn declaration_header() {
    insta::assert_snapshot!(dump("field User.Avatar @component"), @r#"
    Id "field"
    Id "User"
    Dot "."
    Id "Avatar"
    At "@"
    Id "component"
    "#);
}

#[test]
fn numbers() {
    insta::assert_snapshot!(dump("0 -12 3.5 1e3 -2.0E-4"), @r#"
    IntValue "0"
    IntValue "-12"
    FloatValue "3.5"
    FloatValue "1e3"
    FloatValue "-2.0E-4"
    "#);
}

#[test]
fn strings_and_block_strings() {
    insta::assert_snapshot!(dump(r#""a \"b\"" """multi
line""""#), @r#"
    StringValue "\"a \\\"b\\\"\""
    BlockStringValue "\"\"\"multi\nline\"\"\""
    "#);
}

#[test]
fn variables_and_types() {
    insta::assert_snapshot!(dump("($first: [Int!]! = 10)"), @r#"
    ParenOpen "("
    Dollar "$"
    Id "first"
    Colon ":"
    BracketOpen "["
    Id "Int"
    Bang "!"
    BracketClose "]"
    Bang "!"
    Equals "="
    IntValue "10"
    ParenClose ")"
    "#);
}

#[test]
fn comments_are_trivia() {
    let tokens = lex("# leading\nid");
    let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![SyntaxKind::LineComment, SyntaxKind::Newline, SyntaxKind::Id]
    );
}

#[test]
fn garbage_coalesces() {
    insta::assert_snapshot!(dump("id ^^%% name"), @r#"
    Id "id"
    Garbage "^^%%"
    Id "name"
    "#);
}

#[test]
fn trailing_garbage() {
    insta::assert_snapshot!(dump("id ~~"), @r#"
    Id "id"
    Garbage "~~"
    "#);
}
