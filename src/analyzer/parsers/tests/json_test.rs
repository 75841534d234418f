use crate::analyzer::error_handling::{Collecting, ErrorRecord, Raising};
use crate::analyzer::parsers::json::*;
use crate::Error;
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_parse_document() {
    let value = parse_json(r#"{"a": [1, -2.5, null, true]}"#).unwrap();
    assert_eq!(value, Some(json!({"a": [1.0, -2.5, null, true]})));
}

#[test]
fn test_parse_nested_with_whitespace() {
    let text = r#"
        {
            "name" : "kumiki",
            "tags" : [ ],
            "meta" : { "depth" : 2e1, "ok" : false }
        }
    "#;
    let value = parse_json(text).unwrap().unwrap();
    assert_eq!(
        value,
        json!({
            "name": "kumiki",
            "tags": [],
            "meta": {"depth": 20.0, "ok": false}
        })
    );
}

#[test]
fn test_scalars_at_top_level() {
    assert_eq!(parse_json("null").unwrap(), Some(json!(null)));
    assert_eq!(parse_json(" 0.125 ").unwrap(), Some(json!(0.125)));
    assert_eq!(parse_json(r#""x""#).unwrap(), Some(json!("x")));
    // 先頭のゼロは許可しない
    assert_eq!(parse_json("012").unwrap(), None);
}

#[test]
fn test_string_escapes() {
    assert_eq!(parse_json(r#""\u0041""#).unwrap(), Some(json!("A")));
    assert_eq!(
        parse_json(r#""\ud83d\ude00""#).unwrap(),
        Some(json!("\u{1F600}"))
    );
    assert_eq!(
        parse_json(r#""tab\tquote\"slash\/""#).unwrap(),
        Some(json!("tab\tquote\"slash/"))
    );
}

#[test]
fn test_unpaired_surrogate_fails() {
    assert_eq!(parse_json(r#""\ud800""#).unwrap(), None);
    assert_eq!(parse_json(r#""\udc00""#).unwrap(), None);
}

#[test]
fn test_whitespace_inside_string_is_kept() {
    assert_eq!(parse_json(r#"[ " a b " ]"#).unwrap(), Some(json!([" a b "])));
}

#[test]
fn test_control_characters_must_be_escaped() {
    assert_eq!(parse_json("\"a\u{1}b\"").unwrap(), None);
}

#[test]
fn test_missing_value_is_committed() {
    let parser = JsonParser::new().unwrap();
    let error = parser.parse_with(r#"{"a": }"#, &mut Raising).unwrap_err();
    match error {
        Error::Expectation(record) => assert_eq!(record.position, 6),
        other => panic!("Unexpected error type: {:?}", other),
    }
}

#[test]
fn test_trailing_comma_is_committed() {
    let parser = JsonParser::new().unwrap();
    let mut reported = Vec::new();
    let mut handler = Collecting::new(|record: &ErrorRecord| reported.push(record.clone()));
    let result = parser.parse_with("[1, 2,]", &mut handler).unwrap();
    assert_eq!(result, None);
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].position, 6);
}

#[test]
fn test_prefix_parse_stops_after_document() {
    let parser = JsonParser::new().unwrap();
    let input: Vec<char> = "[true] trailing".chars().collect();
    let outcome = parser.prefix_parse("[true] trailing").unwrap();
    assert_eq!(outcome.value, Some(json!([true])));
    assert_eq!(outcome.consumed, 6);
    assert_eq!(outcome.unconsumed(&input).iter().collect::<String>(), " trailing");
}
