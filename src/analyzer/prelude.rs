//! Constructor functions for every primitive and combinator, plus the types
//! a grammar author needs. `use kumiki::prelude::*;` is the usual entry point.

use std::sync::Arc;

pub use super::attribute::{Attribute, Either};
pub use super::combinators::*;
pub use super::context::{Context, Slot};
pub use super::core::{BoxedParser, ParseError, ParseResult, Parser, Skipper};
pub use super::cursor::{Cursor, Span, Symbol};
pub use super::driver::{
    parse, parse_str, parse_with, prefix_parse, prefix_parse_str, skip_parse, skip_parse_str,
    Grammar, PrefixOutcome, Runner,
};
pub use super::error_handling::{
    Collecting, ErrorCollector, ErrorHandler, ErrorRecord, Raising, Silent,
};
pub use super::numeric::{Float, Int, Integral, UInt};
pub use super::primitives::{Attr, Class, Eoi, Eps, Fail, IntoPattern, Lit, Satisfy, Symbols, Text};
pub use super::rule::{Rule, RuleId, Rules};
pub use crate::error::ConfigError;

// プリミティブ

/// Fixed text, no attribute.
pub fn lit(pattern: impl IntoPattern) -> Lit {
    Lit::new(pattern)
}

pub fn lit_no_case(pattern: impl IntoPattern) -> Lit {
    Lit::new(pattern).no_case()
}

/// Fixed text, synthesized as written in the input.
pub fn string(pattern: impl IntoPattern) -> Text {
    Text::new(pattern)
}

pub fn string_no_case(pattern: impl IntoPattern) -> Text {
    Text::new(pattern).no_case()
}

pub fn any() -> Class {
    Class::any()
}

/// A single specific symbol, synthesized.
pub fn sym(c: char) -> Class {
    Class::exact(c)
}

pub fn one_of(set: &str) -> Class {
    Class::one_of(set)
}

pub fn none_of(set: &str) -> Class {
    Class::none_of(set)
}

pub fn range(low: char, high: char) -> Class {
    Class::range(low, high)
}

pub fn digit() -> Class {
    Class::range('0', '9')
}

/// Space, tab, carriage return or line feed.
pub fn space() -> Class {
    Class::one_of(" \t\r\n")
}

pub fn satisfy<F>(predicate: F) -> Satisfy<F> {
    Satisfy::new(predicate)
}

pub fn symbols<K, T, E>(entries: E) -> Symbols<T>
where
    K: IntoPattern,
    T: Clone,
    E: IntoIterator<Item = (K, T)>,
{
    Symbols::new(entries)
}

pub fn bool_() -> Symbols<bool> {
    Symbols::new([("true", true), ("false", false)])
}

pub fn eoi() -> Eoi {
    Eoi
}

pub fn eps() -> Eps {
    Eps
}

/// Matches nothing and synthesizes `value`.
pub fn attr<V: Clone>(value: V) -> Attr<V> {
    Attr::new(value)
}

pub fn fail<O>(message: &str) -> Fail<O> {
    Fail::new(message)
}

// 数値

pub fn uint<T: Integral>() -> UInt<T> {
    UInt::with_radix(10)
}

pub fn hex<T: Integral>() -> UInt<T> {
    UInt::with_radix(16)
}

pub fn oct<T: Integral>() -> UInt<T> {
    UInt::with_radix(8)
}

pub fn bin<T: Integral>() -> UInt<T> {
    UInt::with_radix(2)
}

pub fn int<T: Integral>() -> Int<T> {
    Int::new()
}

pub fn float<T>() -> Float<T> {
    Float::new()
}

/// Real number that must contain a decimal point.
pub fn strict_float<T>() -> Float<T> {
    Float::new().strict()
}

// 合成

pub fn seq<A, B, OA, OB>(first: A, second: B) -> Seq<A, B, OA, OB> {
    Seq::new(first, second)
}

pub fn choice<I, O>(parsers: Vec<BoxedParser<I, O>>) -> Choice<I, O> {
    Choice::new(parsers)
}

pub fn alt<A, B>(first: A, second: B) -> Alt<A, B> {
    Alt::new(first, second)
}

pub fn either<A, B, OA, OB>(first: A, second: B) -> EitherOf<A, B, OA, OB> {
    EitherOf::new(first, second)
}

/// Zero or more.
pub fn star<P, O>(parser: P) -> Repeat<P, O> {
    Repeat::new(parser, 0, None)
}

/// One or more.
pub fn plus<P, O>(parser: P) -> Repeat<P, O> {
    Repeat::new(parser, 1, None)
}

/// Between `min` and `max` repetitions; `None` leaves the upper bound open.
pub fn repeat<P, O>(
    min: usize,
    max: Option<usize>,
    parser: P,
) -> Result<Repeat<P, O>, ConfigError> {
    match max {
        Some(max) if min > max => Err(ConfigError::InvalidBounds { min, max }),
        _ => Ok(Repeat::new(parser, min, max)),
    }
}

/// Exactly `n` repetitions.
pub fn repeat_n<P, O>(n: usize, parser: P) -> Repeat<P, O> {
    Repeat::new(parser, n, Some(n))
}

pub fn list<P, S, O, OS>(item: P, separator: S) -> List<P, S, O, OS> {
    List::new(item, separator)
}

pub fn optional<P>(parser: P) -> Optional<P> {
    Optional::new(parser)
}

pub fn not_<P, O>(parser: P) -> Not<P, O> {
    Not::new(parser)
}

pub fn ahead<P, O>(parser: P) -> Ahead<P, O> {
    Ahead::new(parser)
}

/// `parser` where `excluded` does not match.
pub fn except<P, X, OX>(parser: P, excluded: X) -> Except<P, X, OX> {
    Except::new(parser, excluded)
}

pub fn expect<P>(parser: P) -> Expect<P> {
    Expect::new(parser)
}

pub fn attempt<P>(parser: P) -> Attempt<P> {
    Attempt::new(parser)
}

pub fn skip<I, S, OS, P>(skipper: S, parser: P) -> Skip<I, P>
where
    I: 'static,
    S: Parser<I, OS> + Send + Sync + 'static,
    OS: 'static,
{
    let skipper: Skipper<I> = Arc::new(Omit::new(skipper));
    Skip::new(skipper, parser)
}

pub fn lexeme<P>(parser: P) -> Lexeme<P> {
    Lexeme::new(parser)
}

pub fn omit<P, O>(parser: P) -> Omit<P, O> {
    Omit::new(parser)
}

pub fn raw<P, O>(parser: P) -> Raw<P, O> {
    Raw::new(parser)
}

/// Matched input collected into `C`, e.g. `raw_into::<String, _, _>(p)`.
pub fn raw_into<C, P, O>(parser: P) -> RawInto<P, O, C> {
    RawInto::new(parser)
}

// 属性とアクション

pub fn map<I, P, F, A, B>(parser: P, f: F) -> Map<I, P, F, A>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    Map::new(parser, f)
}

pub fn try_map<I, P, F, A, B>(parser: P, f: F) -> TryMap<I, P, F, A>
where
    P: Parser<I, A>,
    F: Fn(A) -> Option<B>,
{
    TryMap::new(parser, f)
}

pub fn action<I, O, P, F>(parser: P, f: F) -> Action<I, P, F>
where
    P: Parser<I, O>,
    F: Fn(&mut O, &mut Context<'_, I>),
{
    Action::new(parser, f)
}

pub fn with_slot<T: Slot, P>(value: T::Value, parser: P) -> WithSlot<T, P> {
    WithSlot::new(value, parser)
}

pub fn label<P>(parser: P, name: impl Into<String>) -> Label<P> {
    Label::new(parser, name)
}
