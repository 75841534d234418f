use kumiki::{
    analyzer::error_handling::{format_error_context, ErrorCollector},
    analyzer::parsers::JsonParser,
    prelude::*,
    Error,
};

#[test]
fn test_error_collector_gathers_failures() {
    let parser = JsonParser::new().unwrap();
    let mut collector = ErrorCollector::new();

    assert_eq!(parser.parse_with("[1, 2", &mut collector).unwrap(), None);
    assert_eq!(parser.parse_with("{\"a\" 1}", &mut collector).unwrap(), None);
    assert_eq!(
        parser.parse_with("[true]", &mut collector).unwrap(),
        Some(serde_json::json!([true]))
    );

    assert!(collector.has_errors());
    assert_eq!(collector.errors().len(), 2);
    assert_eq!(collector.errors()[0].position, 5);
    assert_eq!(collector.errors()[1].position, 5);
    assert!(collector.format_report().starts_with("1. expected"));

    collector.clear();
    assert!(!collector.has_errors());
}

#[test]
fn test_furthest_failure_wins() {
    let grammar = alt(
        seq(lit("let"), seq(lit(' '), lit('x'))),
        seq(lit('l'), lit('o')),
    );
    let input: Vec<char> = "let y".chars().collect();
    let outcome = prefix_parse(&input, &grammar).unwrap();
    let error = outcome.error.unwrap();
    assert_eq!(error.position, 4);
    assert_eq!(error.expected, "'x'");
}

#[test]
fn test_label_names_the_failure() {
    let key = label(plus(range('a', 'z')), "key");
    let input: Vec<char> = "=1".chars().collect();
    let outcome = prefix_parse(&input, &key).unwrap();
    assert_eq!(outcome.error.unwrap().expected, "key");
}

#[test]
fn test_error_context_rendering() {
    let parser = JsonParser::new().unwrap();
    let text = "{\n  \"a\": tru\n}";
    let outcome = parser.prefix_parse(text).unwrap();
    let record = outcome.error.unwrap();
    let rendered = format_error_context(text, &record);
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "   2 |   \"a\": tru");
    assert!(lines[2].ends_with('^'));
}

#[test]
fn test_configuration_errors_are_not_parse_failures() {
    let mut rules = Rules::<char>::new();
    let start = rules.declare::<()>("start");
    let missing = rules.declare::<()>("missing");
    rules.define(start, seq(lit('a'), missing)).unwrap();

    let input: Vec<char> = "a".chars().collect();
    let result = Runner::new(&start, &rules).parse(&input);
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::Undefined { ref name })) if name == "missing"
    ));

    assert!(matches!(
        repeat::<_, ()>(3, Some(1), lit('a')),
        Err(ConfigError::InvalidBounds { min: 3, max: 1 })
    ));
}
