use std::marker::PhantomData;

use super::context::Context;
use super::core::{ParseError, ParseResult, Parser};
use super::cursor::{Cursor, Symbol};

// Every primitive runs the active skipper before matching and rewinds past
// it again on failure.

/// Literal pattern text, written as a `char` or a string.
pub trait IntoPattern {
    fn into_pattern(self) -> Vec<char>;
}

impl IntoPattern for char {
    fn into_pattern(self) -> Vec<char> {
        vec![self]
    }
}

impl IntoPattern for &str {
    fn into_pattern(self) -> Vec<char> {
        self.chars().collect()
    }
}

impl IntoPattern for String {
    fn into_pattern(self) -> Vec<char> {
        self.chars().collect()
    }
}

fn same_char(found: char, expected: char, no_case: bool) -> bool {
    found == expected || (no_case && found.to_lowercase().eq(expected.to_lowercase()))
}

fn matches_at<I: Symbol>(cursor: &Cursor<'_, I>, pattern: &[char], no_case: bool) -> bool {
    pattern.iter().enumerate().all(|(offset, expected)| {
        cursor
            .peek_at(offset)
            .is_some_and(|found| same_char(found.to_char(), *expected, no_case))
    })
}

fn describe_pattern(pattern: &[char]) -> String {
    match pattern {
        [c] => format!("{:?}", c),
        _ => format!("{:?}", pattern.iter().collect::<String>()),
    }
}

/// Matches fixed text; synthesizes nothing.
#[derive(Debug, Clone)]
pub struct Lit {
    pattern: Vec<char>,
    no_case: bool,
}

impl Lit {
    pub fn new(pattern: impl IntoPattern) -> Self {
        Self {
            pattern: pattern.into_pattern(),
            no_case: false,
        }
    }

    pub fn no_case(mut self) -> Self {
        self.no_case = true;
        self
    }

    fn describe(&self) -> String {
        describe_pattern(&self.pattern)
    }
}

impl<I: Symbol> Parser<I, ()> for Lit {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<()> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        if matches_at(cursor, &self.pattern, self.no_case) {
            cursor.advance(self.pattern.len());
            Ok(())
        } else {
            ctx.expected(cursor.position(), || self.describe());
            cursor.rewind(mark);
            Err(ParseError::Mismatch)
        }
    }
}

/// Matches fixed text and synthesizes the input as written.
#[derive(Debug, Clone)]
pub struct Text {
    literal: Lit,
}

impl Text {
    pub fn new(pattern: impl IntoPattern) -> Self {
        Self {
            literal: Lit::new(pattern),
        }
    }

    pub fn no_case(mut self) -> Self {
        self.literal = self.literal.no_case();
        self
    }
}

impl<I: Symbol> Parser<I, String> for Text {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<String> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        let start = cursor.position();
        match self.literal.parse(cursor, ctx) {
            Ok(()) => Ok(cursor.input()[start..cursor.position()]
                .iter()
                .map(|s| s.to_char())
                .collect()),
            Err(e) => {
                cursor.rewind(mark);
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone)]
enum ClassKind {
    Any,
    Exact(char),
    OneOf(Vec<char>),
    NoneOf(Vec<char>),
    Range(char, char),
}

/// Matches a single symbol from a class and synthesizes it.
#[derive(Debug, Clone)]
pub struct Class {
    kind: ClassKind,
}

impl Class {
    pub fn any() -> Self {
        Self {
            kind: ClassKind::Any,
        }
    }

    pub fn exact(c: char) -> Self {
        Self {
            kind: ClassKind::Exact(c),
        }
    }

    pub fn one_of(set: &str) -> Self {
        Self {
            kind: ClassKind::OneOf(set.chars().collect()),
        }
    }

    pub fn none_of(set: &str) -> Self {
        Self {
            kind: ClassKind::NoneOf(set.chars().collect()),
        }
    }

    pub fn range(low: char, high: char) -> Self {
        Self {
            kind: ClassKind::Range(low, high),
        }
    }

    fn accepts(&self, c: char) -> bool {
        match &self.kind {
            ClassKind::Any => true,
            ClassKind::Exact(e) => c == *e,
            ClassKind::OneOf(set) => set.contains(&c),
            ClassKind::NoneOf(set) => !set.contains(&c),
            ClassKind::Range(low, high) => (*low..=*high).contains(&c),
        }
    }

    fn describe(&self) -> String {
        match &self.kind {
            ClassKind::Any => "any symbol".to_string(),
            ClassKind::Exact(c) => format!("{:?}", c),
            ClassKind::OneOf(set) => format!("one of {:?}", set.iter().collect::<String>()),
            ClassKind::NoneOf(set) => format!("none of {:?}", set.iter().collect::<String>()),
            ClassKind::Range(low, high) => format!("{:?}..={:?}", low, high),
        }
    }
}

impl<I: Symbol> Parser<I, I> for Class {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<I> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        match cursor.peek() {
            Some(symbol) if self.accepts(symbol.to_char()) => {
                cursor.bump();
                Ok(symbol)
            }
            _ => {
                ctx.expected(cursor.position(), || self.describe());
                cursor.rewind(mark);
                Err(ParseError::Mismatch)
            }
        }
    }
}

/// Matches one symbol for which the predicate returns a value.
pub struct Satisfy<F> {
    predicate: F,
    description: String,
}

impl<F> Satisfy<F> {
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            description: "matching symbol".to_string(),
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl<I, O, F> Parser<I, O> for Satisfy<F>
where
    I: Symbol,
    F: Fn(&I) -> Option<O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        if let Some(value) = cursor.peek().and_then(|symbol| (self.predicate)(&symbol)) {
            cursor.bump();
            return Ok(value);
        }
        ctx.expected(cursor.position(), || self.description.clone());
        cursor.rewind(mark);
        Err(ParseError::Mismatch)
    }
}

/// Longest-match lookup table from key text to value.
#[derive(Debug, Clone)]
pub struct Symbols<T> {
    entries: Vec<(Vec<char>, T)>,
    no_case: bool,
}

impl<T: Clone> Symbols<T> {
    pub fn new<K, E>(entries: E) -> Self
    where
        K: IntoPattern,
        E: IntoIterator<Item = (K, T)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, value)| (key.into_pattern(), value))
                .collect(),
            no_case: false,
        }
    }

    pub fn no_case(mut self) -> Self {
        self.no_case = true;
        self
    }

    pub fn add(mut self, key: impl IntoPattern, value: T) -> Self {
        self.entries.push((key.into_pattern(), value));
        self
    }

    fn describe(&self) -> String {
        let keys: Vec<String> = self
            .entries
            .iter()
            .map(|(key, _)| describe_pattern(key))
            .collect();
        format!("one of {}", keys.join(", "))
    }
}

impl<I: Symbol, T: Clone> Parser<I, T> for Symbols<T> {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<T> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        let best = self
            .entries
            .iter()
            .filter(|(key, _)| !key.is_empty() && matches_at(cursor, key, self.no_case))
            .fold(None, |best: Option<&(Vec<char>, T)>, entry| match best {
                Some(held) if held.0.len() >= entry.0.len() => Some(held),
                _ => Some(entry),
            });
        match best {
            Some((key, value)) => {
                cursor.advance(key.len());
                Ok(value.clone())
            }
            None => {
                ctx.expected(cursor.position(), || self.describe());
                cursor.rewind(mark);
                Err(ParseError::Mismatch)
            }
        }
    }
}

/// Succeeds only at the end of input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eoi;

impl<I: Symbol> Parser<I, ()> for Eoi {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<()> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        if cursor.at_end() {
            Ok(())
        } else {
            ctx.expected(cursor.position(), || "end of input".to_string());
            cursor.rewind(mark);
            Err(ParseError::Mismatch)
        }
    }
}

/// Always succeeds without consuming input.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eps;

impl<I> Parser<I, ()> for Eps {
    fn parse(&self, _cursor: &mut Cursor<'_, I>, _ctx: &mut Context<'_, I>) -> ParseResult<()> {
        Ok(())
    }
}

/// Succeeds without consuming input, synthesizing a constant.
#[derive(Debug, Clone)]
pub struct Attr<V> {
    value: V,
}

impl<V: Clone> Attr<V> {
    pub fn new(value: V) -> Self {
        Self { value }
    }
}

impl<I, V: Clone> Parser<I, V> for Attr<V> {
    fn parse(&self, _cursor: &mut Cursor<'_, I>, _ctx: &mut Context<'_, I>) -> ParseResult<V> {
        Ok(self.value.clone())
    }
}

/// Always fails, reporting `message` as the expectation.
pub struct Fail<O> {
    message: String,
    _output: PhantomData<fn() -> O>,
}

impl<O> Fail<O> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            _output: PhantomData,
        }
    }
}

impl<I, O> Parser<I, O> for Fail<O> {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        ctx.expected(cursor.position(), || self.message.clone());
        Err(ParseError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::driver::{parse_str, prefix_parse, skip_parse_str};
    use crate::analyzer::prelude::{one_of, omit, plus};

    #[test]
    fn test_lit() {
        assert_eq!(parse_str("abc", &Lit::new("abc")).unwrap(), Some(()));
        assert_eq!(parse_str("abd", &Lit::new("abc")).unwrap(), None);
        assert_eq!(parse_str("ABC", &Lit::new("abc").no_case()).unwrap(), Some(()));
    }

    #[test]
    fn test_text_keeps_input_spelling() {
        assert_eq!(
            parse_str("TrUe", &Text::new("true").no_case()).unwrap(),
            Some("TrUe".to_string())
        );
    }

    #[test]
    fn test_classes() {
        assert_eq!(parse_str("q", &Class::any()).unwrap(), Some('q'));
        assert_eq!(parse_str("5", &Class::range('0', '9')).unwrap(), Some('5'));
        assert_eq!(parse_str("x", &Class::range('0', '9')).unwrap(), None);
        assert_eq!(parse_str("b", &Class::one_of("abc")).unwrap(), Some('b'));
        assert_eq!(parse_str("\"", &Class::none_of("\"")).unwrap(), None);
        // 入力が空なら失敗
        assert_eq!(parse_str("", &Class::any()).unwrap(), None);
    }

    #[test]
    fn test_byte_input() {
        let outcome = prefix_parse(b"7z".as_slice(), &Class::range('0', '9')).unwrap();
        assert_eq!(outcome.value, Some(b'7'));
        assert_eq!(outcome.consumed, 1);
    }

    #[test]
    fn test_satisfy() {
        let digit = Satisfy::new(|c: &char| c.to_digit(10)).describe("digit");
        assert_eq!(parse_str("7", &digit).unwrap(), Some(7));

        let chars: Vec<char> = "x".chars().collect();
        let outcome = prefix_parse(&chars, &digit).unwrap();
        assert_eq!(outcome.error.unwrap().expected, "digit");
    }

    #[test]
    fn test_symbols_longest_match() {
        let table = Symbols::new([("no", 1), ("none", 2), ("n", 3)]);
        assert_eq!(parse_str("none", &table).unwrap(), Some(2));
        assert_eq!(parse_str("no", &table).unwrap(), Some(1));

        let bools = Symbols::new([("yes", true), ("no", false)]).no_case();
        assert_eq!(parse_str("YES", &bools).unwrap(), Some(true));
    }

    #[test]
    fn test_eoi_eps_attr_fail() {
        assert_eq!(parse_str("", &Eoi).unwrap(), Some(()));
        assert_eq!(parse_str("", &Eps).unwrap(), Some(()));
        assert_eq!(parse_str("", &Attr::new(42u8)).unwrap(), Some(42));

        let chars: Vec<char> = "abc".chars().collect();
        let outcome = prefix_parse(&chars, &Fail::<u8>::new("nothing")).unwrap();
        assert_eq!(outcome.value, None);
        assert_eq!(outcome.error.unwrap().expected, "nothing");
    }

    #[test]
    fn test_primitives_pre_skip() {
        let ws = omit(plus(one_of(" ")));
        assert_eq!(skip_parse_str("   abc", &Lit::new("abc"), ws).unwrap(), Some(()));
    }
}
