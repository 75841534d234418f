//! JSON grammar producing [`serde_json::Value`].
//!
//! Numbers are read as `f64`. Whitespace between tokens is skipped; strings
//! and numbers are lexemes. A `\uXXXX` high surrogate is carried to the
//! following low surrogate through the [`FirstSurrogate`] slot.

use serde_json::{Map, Number, Value};

use crate::analyzer::prelude::*;
use crate::config::ParseConfig;
use crate::error::KumikiResult;

/// Pending high surrogate of an escaped surrogate pair.
pub struct FirstSurrogate;

impl Slot for FirstSurrogate {
    type Value = u32;
}

const HIGH_SURROGATES: std::ops::RangeInclusive<u32> = 0xd800..=0xdbff;
const LOW_SURROGATES: std::ops::RangeInclusive<u32> = 0xdc00..=0xdfff;

pub struct JsonParser {
    grammar: Grammar<char, Value>,
}

impl JsonParser {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rules = Rules::new();
        let document = rules.declare::<Value>("JSON document");
        let value = rules.declare::<Value>("value");
        let object = rules.declare::<Value>("object");
        let member = rules.declare::<(String, Value)>("object_element");
        let array = rules.declare::<Value>("array");
        let string = rules.declare::<String>("string");
        let number = rules.declare::<Value>("number");
        let escape = rules.declare::<u32>("\\uXXXX hexadecimal escape sequence");
        let string_char = rules.declare::<char>(
            "code point (code points <= U+001F must be escaped)",
        );

        rules.define(document, with_slot::<FirstSurrogate, _>(0, value))?;
        rules.define(value, parse_value(number, string, array, object))?;
        rules.define(object, parse_object(member))?;
        rules.define(member, parse_member(string, value))?;
        rules.define(array, parse_array(value))?;
        rules.define(string, parse_string(string_char))?;
        rules.define(number, parse_number())?;
        rules.define(escape, parse_escape()?)?;
        rules.define(string_char, parse_string_char(escape))?;

        let grammar = Grammar::new(rules, document)?.with_config(config);
        Ok(Self { grammar })
    }

    pub fn parse(&self, text: &str) -> KumikiResult<Option<Value>> {
        self.parse_with(text, &mut Silent)
    }

    pub fn parse_with(
        &self,
        text: &str,
        handler: &mut dyn ErrorHandler,
    ) -> KumikiResult<Option<Value>> {
        let input: Vec<char> = text.chars().collect();
        self.grammar
            .runner()
            .with_skipper(parse_whitespace())
            .parse_with(&input, handler)
    }

    pub fn prefix_parse(&self, text: &str) -> KumikiResult<PrefixOutcome<Value>> {
        let input: Vec<char> = text.chars().collect();
        self.grammar
            .runner()
            .with_skipper(parse_whitespace())
            .prefix_parse(&input)
    }
}

/// Parses a complete JSON document.
pub fn parse_json(text: &str) -> KumikiResult<Option<Value>> {
    JsonParser::new()?.parse(text)
}

fn parse_whitespace() -> impl Parser<char, ()> {
    label(omit(one_of("\t\n\r ")), "whitespace")
}

fn parse_value(
    number: Rule<Value>,
    string: Rule<String>,
    array: Rule<Value>,
    object: Rule<Value>,
) -> impl Parser<char, Value> {
    choice(vec![
        Box::new(number),
        Box::new(map(bool_(), Value::Bool)),
        Box::new(parse_null()),
        Box::new(map(string, Value::String)),
        Box::new(array),
        Box::new(object),
    ])
}

fn parse_null() -> impl Parser<char, Value> {
    label(seq(lit("null"), attr(Value::Null)), "null")
}

fn parse_object(member: Rule<(String, Value)>) -> impl Parser<char, Value> {
    let members = optional(list(member, lit(',')));
    map(
        seq(lit('{'), seq(members, expect(lit('}')))),
        |members: Option<Vec<(String, Value)>>| {
            Value::Object(members.unwrap_or_default().into_iter().collect::<Map<_, _>>())
        },
    )
}

fn parse_member(string: Rule<String>, value: Rule<Value>) -> impl Parser<char, (String, Value)> {
    seq(string, seq(expect(lit(':')), expect(value)))
}

fn parse_array(value: Rule<Value>) -> impl Parser<char, Value> {
    let elements = optional(list(value, lit(',')));
    map(
        seq(lit('['), seq(elements, expect(lit(']')))),
        |elements: Option<Vec<Value>>| Value::Array(elements.unwrap_or_default()),
    )
}

fn parse_string(string_char: Rule<char>) -> impl Parser<char, String> {
    lexeme(seq(
        lit('"'),
        seq(star(string_char).collect::<String>(), expect(lit('"'))),
    ))
}

fn parse_string_char(escape: Rule<u32>) -> impl Parser<char, char> {
    choice(vec![
        Box::new(parse_surrogate_pair(escape)),
        Box::new(try_map(escape, char::from_u32)),
        Box::new(seq(lit('\\'), expect(parse_single_escaped_char()))),
        Box::new(
            satisfy(|c: &char| (*c != '"' && *c != '\\' && *c > '\u{1f}').then_some(*c))
                .describe("unescaped code point"),
        ),
    ])
}

fn parse_escape() -> Result<impl Parser<char, u32>, ConfigError> {
    let unit = hex::<u32>().digits(4, 4)?;
    Ok(seq(lit("\\u"), expect(label(unit, "four hexadecimal digits"))))
}

fn parse_surrogate_pair(escape: Rule<u32>) -> impl Parser<char, char> {
    let high = action(escape, |unit: &mut u32, ctx: &mut Context<'_, char>| {
        if !HIGH_SURROGATES.contains(&*unit) {
            ctx.reject();
        } else if let Some(pending) = ctx.slot_mut::<FirstSurrogate>() {
            *pending = *unit;
        } else {
            ctx.reject();
        }
    });
    let low = action(escape, |unit: &mut u32, ctx: &mut Context<'_, char>| {
        let first = ctx.slot::<FirstSurrogate>().copied();
        match first {
            Some(first) if LOW_SURROGATES.contains(&*unit) => {
                *unit = 0x10000 + ((first - 0xd800) << 10) + (*unit - 0xdc00);
            }
            _ => ctx.reject(),
        }
    });
    try_map(seq(high, low), |(_, code_point): (u32, u32)| {
        char::from_u32(code_point)
    })
}

fn parse_single_escaped_char() -> impl Parser<char, char> {
    label(
        symbols([
            ('"', '"'),
            ('\\', '\\'),
            ('/', '/'),
            ('b', '\u{8}'),
            ('f', '\u{c}'),
            ('n', '\n'),
            ('r', '\r'),
            ('t', '\t'),
        ]),
        "'\"', '\\', '/', 'b', 'f', 'n', 'r', or 't'",
    )
}

fn parse_number() -> impl Parser<char, Value> {
    let integer = alt(omit(seq(range('1', '9'), star(digit()))), omit(sym('0')));
    let fraction = optional(omit(seq(lit('.'), plus(digit()))));
    let exponent = optional(omit(seq(
        one_of("eE"),
        seq(optional(one_of("+-")), plus(digit())),
    )));
    let text = raw_into::<String, _, _>(lexeme(seq(
        optional(lit('-')),
        seq(integer, seq(fraction, exponent)),
    )));
    try_map(text, |text: String| {
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
    })
}
