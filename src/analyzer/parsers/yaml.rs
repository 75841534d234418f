//! YAML scalar grammar.
//!
//! A scalar resolves to the first type that reads it completely: strict
//! float, integer (`0x` hex, leading-zero octal, decimal), boolean, null, and
//! otherwise a string. Strings may be double-quoted with escapes,
//! single-quoted with `''`, or plain. Plain scalars fold continuation lines
//! indented deeper than the current block indentation into single spaces.

use crate::analyzer::prelude::*;
use crate::ast::Scalar;
use crate::error::KumikiResult;

/// Indentation of the enclosing block.
pub struct Indent;

impl Slot for Indent {
    type Value = usize;
}

const UNSAFE_FIRST: &str = " \t\r\n!\"#%&'*,:>?@[\\]`{|}";
const UNSAFE_PLAIN: &str = " \t\r\n,:#[]{}";

pub struct ScalarParser {
    grammar: Grammar<char, Scalar>,
    indent: usize,
}

impl ScalarParser {
    pub fn new(indent: usize) -> Result<Self, ConfigError> {
        let mut rules = Rules::new();
        let scalar = rules.declare::<Scalar>("scalar");
        let scalar_value = rules.declare::<Scalar>("scalar_value");
        let integer_value = rules.declare::<i64>("integer_value");
        let null_value = rules.declare::<Scalar>("null_value");
        let char_esc = rules.declare::<char>("char_esc");
        let double_quoted = rules.declare::<String>("double_quoted");
        let single_quoted = rules.declare::<String>("single_quoted");
        let unquoted = rules.declare::<String>("unquoted");

        rules.define(scalar, with_slot::<Indent, _>(indent, scalar_value))?;
        rules.define(
            scalar_value,
            parse_scalar_value(integer_value, null_value, double_quoted, single_quoted, unquoted),
        )?;
        rules.define(integer_value, parse_integer())?;
        rules.define(null_value, parse_null())?;
        rules.define(char_esc, parse_char_esc()?)?;
        rules.define(double_quoted, parse_double_quoted(char_esc))?;
        rules.define(single_quoted, parse_single_quoted())?;
        rules.define(unquoted, parse_unquoted())?;

        let grammar = Grammar::new(rules, scalar)?;
        Ok(Self { grammar, indent })
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn parse(&self, text: &str) -> KumikiResult<Option<Scalar>> {
        self.grammar.parse_str(text)
    }

    pub fn prefix_parse(&self, text: &str) -> KumikiResult<PrefixOutcome<Scalar>> {
        self.grammar.prefix_parse_str(text)
    }
}

/// Parses a top-level scalar.
pub fn parse_scalar(text: &str) -> KumikiResult<Option<Scalar>> {
    ScalarParser::new(0)?.parse(text)
}

fn parse_scalar_value(
    integer_value: Rule<i64>,
    null_value: Rule<Scalar>,
    double_quoted: Rule<String>,
    single_quoted: Rule<String>,
    unquoted: Rule<String>,
) -> impl Parser<char, Scalar> {
    let bool_value = symbols([
        ("true", true),
        ("false", false),
        ("on", true),
        ("off", false),
        ("yes", true),
        ("no", false),
    ])
    .no_case();
    let string_value = choice(vec![
        Box::new(double_quoted),
        Box::new(single_quoted),
        Box::new(unquoted),
    ]);
    let value = choice(vec![
        Box::new(resolved(map(strict_float::<f64>(), Scalar::Float))),
        Box::new(resolved(map(integer_value, Scalar::Integer))),
        Box::new(resolved(map(bool_value, Scalar::Bool))),
        Box::new(resolved(null_value)),
        Box::new(map(string_value, Scalar::String)),
    ]);
    // 行末の空白は値に含めない
    seq(value, omit(star(one_of(" \t"))))
}

/// A typed reading only counts if no plain text follows on the same line.
fn resolved<P>(parser: P) -> impl Parser<char, Scalar>
where
    P: Parser<char, Scalar>,
{
    seq(
        parser,
        not_(seq(star(one_of(" \t")), none_of(UNSAFE_PLAIN))),
    )
}

fn parse_integer() -> impl Parser<char, i64> {
    choice(vec![
        Box::new(seq(lit_no_case("0x"), expect(hex::<i64>()))),
        Box::new(seq(lit('0'), oct::<i64>())),
        Box::new(int::<i64>()),
    ])
}

fn parse_null() -> impl Parser<char, Scalar> {
    seq(alt(lit_no_case("null"), lit('~')), attr(Scalar::Null))
}

fn parse_char_esc() -> Result<impl Parser<char, char>, ConfigError> {
    let short = hex::<u32>().digits(4, 4)?;
    let long = hex::<u32>().digits(8, 8)?;
    let escaped = choice(vec![
        Box::new(try_map(seq(lit('u'), expect(short)), char::from_u32)),
        Box::new(try_map(seq(lit('U'), expect(long)), char::from_u32)),
        Box::new(map(one_of("btnfr/\\\"'"), unescape)),
    ]);
    Ok(seq(lit('\\'), expect(escaped)))
}

fn unescape(c: char) -> char {
    match c {
        'b' => '\u{8}',
        't' => '\t',
        'n' => '\n',
        'f' => '\u{c}',
        'r' => '\r',
        other => other,
    }
}

fn parse_double_quoted(char_esc: Rule<char>) -> impl Parser<char, String> {
    let content = star(alt(char_esc, none_of("\""))).collect::<String>();
    seq(lit('"'), seq(content, expect(lit('"'))))
}

fn parse_single_quoted() -> impl Parser<char, String> {
    let quote = seq(lit("''"), attr('\''));
    let content = star(alt(quote, none_of("'"))).collect::<String>();
    seq(lit('\''), seq(content, expect(lit('\''))))
}

fn parse_line_break() -> impl Parser<char, ()> {
    alt(lit("\r\n"), alt(lit('\n'), lit('\r')))
}

/// A line break followed by more blanks than the block indentation.
fn parse_continuation() -> impl Parser<char, ()> {
    let blanks = action(
        plus(one_of(" \t")),
        |blanks: &mut Vec<char>, ctx: &mut Context<'_, char>| {
            let indent = ctx.slot::<Indent>().copied().unwrap_or(0);
            if blanks.len() <= indent {
                ctx.reject();
            }
        },
    );
    omit(seq(parse_line_break(), blanks))
}

fn parse_unquoted() -> impl Parser<char, String> {
    let space = alt(omit(one_of(" \t")), parse_continuation());
    let folded = map(seq(omit(plus(space)), none_of(UNSAFE_PLAIN)), |c: char| {
        format!(" {}", c)
    });
    let plain = map(none_of(UNSAFE_PLAIN), |c: char| c.to_string());
    let rest = star(alt(folded, plain)).collect::<String>();
    map(seq(none_of(UNSAFE_FIRST), rest), |(first, rest): (char, String)| {
        format!("{}{}", first, rest)
    })
}
