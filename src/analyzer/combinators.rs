use std::iter;
use std::marker::PhantomData;

use tracing::{debug, trace};

use super::attribute::{Attribute, Either, Join, Joined};
use super::context::{Context, Slot};
use super::core::{BoxedParser, ParseError, ParseResult, Parser, Skipper};
use super::cursor::{Cursor, Span, Symbol};

// シーケンス

/// `first` then `second`; the attributes are joined with unit sides dropped.
pub struct Seq<A, B, OA, OB> {
    first: A,
    second: B,
    _phantom: PhantomData<fn() -> (OA, OB)>,
}

impl<A, B, OA, OB> Seq<A, B, OA, OB> {
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, OA, OB> Parser<I, Joined<OA, OB>> for Seq<A, B, OA, OB>
where
    A: Parser<I, OA>,
    B: Parser<I, OB>,
    OA: Attribute,
    OB: Attribute,
    (OA::Kind, OB::Kind): Join<OA, OB>,
{
    fn parse(
        &self,
        cursor: &mut Cursor<'_, I>,
        ctx: &mut Context<'_, I>,
    ) -> ParseResult<Joined<OA, OB>> {
        let mark = cursor.mark();
        let left = self.first.parse(cursor, ctx)?;
        match self.second.parse(cursor, ctx) {
            Ok(right) => Ok(<(OA::Kind, OB::Kind) as Join<OA, OB>>::join(left, right)),
            Err(e) => {
                cursor.rewind(mark);
                Err(e)
            }
        }
    }
}

// 選択

/// Ordered alternation over boxed parsers. The first alternative that
/// matches wins; a committed failure stops the search.
pub struct Choice<I, O> {
    parsers: Vec<BoxedParser<I, O>>,
}

impl<I, O> Choice<I, O> {
    pub fn new(parsers: Vec<BoxedParser<I, O>>) -> Self {
        Self { parsers }
    }
}

impl<I, O> Parser<I, O> for Choice<I, O> {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let mark = cursor.mark();
        for parser in &self.parsers {
            match parser.parse(cursor, ctx) {
                Ok(value) => return Ok(value),
                Err(ParseError::Mismatch) => cursor.rewind(mark),
                Err(e) => return Err(e),
            }
        }
        trace!(
            target: "parser::choice",
            position = mark.position(),
            alternatives = self.parsers.len(),
            "no alternative matched"
        );
        Err(ParseError::Mismatch)
    }
}

/// Two-way alternation with equal attribute types.
pub struct Alt<A, B> {
    first: A,
    second: B,
}

impl<A, B> Alt<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<I, O, A, B> Parser<I, O> for Alt<A, B>
where
    A: Parser<I, O>,
    B: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let mark = cursor.mark();
        match self.first.parse(cursor, ctx) {
            Err(ParseError::Mismatch) => {
                cursor.rewind(mark);
                self.second.parse(cursor, ctx)
            }
            other => other,
        }
    }
}

/// Two-way alternation with differing attribute types.
pub struct EitherOf<A, B, OA, OB> {
    first: A,
    second: B,
    _phantom: PhantomData<fn() -> (OA, OB)>,
}

impl<A, B, OA, OB> EitherOf<A, B, OA, OB> {
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, OA, OB> Parser<I, Either<OA, OB>> for EitherOf<A, B, OA, OB>
where
    A: Parser<I, OA>,
    B: Parser<I, OB>,
{
    fn parse(
        &self,
        cursor: &mut Cursor<'_, I>,
        ctx: &mut Context<'_, I>,
    ) -> ParseResult<Either<OA, OB>> {
        let mark = cursor.mark();
        match self.first.parse(cursor, ctx) {
            Ok(value) => Ok(Either::Left(value)),
            Err(ParseError::Mismatch) => {
                cursor.rewind(mark);
                self.second.parse(cursor, ctx).map(Either::Right)
            }
            Err(e) => Err(e),
        }
    }
}

// 繰り返し

/// Bounded repetition collecting into `C`.
///
/// An iteration that succeeds without consuming input ends the loop once the
/// minimum count is reached, so `star(eps())` terminates.
pub struct Repeat<P, O, C = Vec<O>> {
    parser: P,
    min: usize,
    max: Option<usize>,
    _phantom: PhantomData<fn() -> (O, C)>,
}

impl<P, O, C> Repeat<P, O, C> {
    pub fn new(parser: P, min: usize, max: Option<usize>) -> Self {
        Self {
            parser,
            min,
            max,
            _phantom: PhantomData,
        }
    }

    /// Collects into another container, e.g. `String` for characters.
    pub fn collect<D>(self) -> Repeat<P, O, D> {
        Repeat::new(self.parser, self.min, self.max)
    }
}

impl<I, O, C, P> Parser<I, C> for Repeat<P, O, C>
where
    P: Parser<I, O>,
    C: Default + Extend<O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<C> {
        let start = cursor.mark();
        let mut items = C::default();
        let mut count = 0;
        while self.max.map_or(true, |max| count < max) {
            if let Err(e) = ctx.check_cancelled(cursor.position()) {
                cursor.rewind(start);
                return Err(e);
            }
            let before = cursor.mark();
            match self.parser.parse(cursor, ctx) {
                Ok(item) => {
                    items.extend(iter::once(item));
                    count += 1;
                    if cursor.mark() == before && count >= self.min {
                        break;
                    }
                }
                Err(ParseError::Mismatch) => {
                    cursor.rewind(before);
                    break;
                }
                Err(e) => {
                    cursor.rewind(start);
                    return Err(e);
                }
            }
        }
        trace!(
            target: "parser::repeat",
            position = cursor.position(),
            count,
            min = self.min,
            "repetition stopped"
        );
        if count < self.min {
            cursor.rewind(start);
            return Err(ParseError::Mismatch);
        }
        Ok(items)
    }
}

/// One or more `item`s separated by `separator`. A trailing separator is
/// left unconsumed.
pub struct List<P, S, O, OS, C = Vec<O>> {
    item: P,
    separator: S,
    _phantom: PhantomData<fn() -> (O, OS, C)>,
}

impl<P, S, O, OS, C> List<P, S, O, OS, C> {
    pub fn new(item: P, separator: S) -> Self {
        Self {
            item,
            separator,
            _phantom: PhantomData,
        }
    }

    pub fn collect<D>(self) -> List<P, S, O, OS, D> {
        List::new(self.item, self.separator)
    }
}

impl<I, P, S, O, OS, C> Parser<I, C> for List<P, S, O, OS, C>
where
    P: Parser<I, O>,
    S: Parser<I, OS>,
    C: Default + Extend<O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<C> {
        let start = cursor.mark();
        let mut items = C::default();
        items.extend(iter::once(self.item.parse(cursor, ctx)?));
        loop {
            if let Err(e) = ctx.check_cancelled(cursor.position()) {
                cursor.rewind(start);
                return Err(e);
            }
            let before = cursor.mark();
            match self.separator.parse(cursor, ctx) {
                Ok(_) => {}
                Err(ParseError::Mismatch) => break,
                Err(e) => {
                    cursor.rewind(start);
                    return Err(e);
                }
            }
            match self.item.parse(cursor, ctx) {
                Ok(item) => items.extend(iter::once(item)),
                Err(ParseError::Mismatch) => {
                    cursor.rewind(before);
                    break;
                }
                Err(e) => {
                    cursor.rewind(start);
                    return Err(e);
                }
            }
            if cursor.mark() == before {
                break;
            }
        }
        Ok(items)
    }
}

/// Zero or one; never fails softly.
pub struct Optional<P> {
    parser: P,
}

impl<P> Optional<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<I, O, P> Parser<I, Option<O>> for Optional<P>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<Option<O>> {
        let mark = cursor.mark();
        match self.parser.parse(cursor, ctx) {
            Ok(value) => Ok(Some(value)),
            Err(ParseError::Mismatch) => {
                cursor.rewind(mark);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

// 先読み

/// Negative lookahead: succeeds, consuming nothing, where `parser` fails.
pub struct Not<P, O> {
    parser: P,
    _phantom: PhantomData<fn() -> O>,
}

impl<P, O> Not<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, ()> for Not<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<()> {
        let mark = cursor.mark();
        ctx.begin_quiet();
        let result = self.parser.parse(cursor, ctx);
        ctx.end_quiet();
        cursor.rewind(mark);
        match result {
            Ok(_) => {
                ctx.expected(mark.position(), || "something else".to_string());
                Err(ParseError::Mismatch)
            }
            Err(ParseError::Mismatch) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Positive lookahead: succeeds, consuming nothing, where `parser` matches.
pub struct Ahead<P, O> {
    parser: P,
    _phantom: PhantomData<fn() -> O>,
}

impl<P, O> Ahead<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, ()> for Ahead<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<()> {
        let mark = cursor.mark();
        let result = self.parser.parse(cursor, ctx);
        cursor.rewind(mark);
        result.map(|_| ())
    }
}

/// `parser` where `excluded` does not match at the same position.
pub struct Except<P, X, OX> {
    parser: P,
    excluded: X,
    description: String,
    _phantom: PhantomData<fn() -> OX>,
}

impl<P, X, OX> Except<P, X, OX> {
    pub fn new(parser: P, excluded: X) -> Self {
        Self {
            parser,
            excluded,
            description: "something else".to_string(),
            _phantom: PhantomData,
        }
    }

    /// Names the excluded input in the expectation recorded when it matches.
    pub fn excluding(mut self, name: &str) -> Self {
        self.description = format!("anything but {}", name);
        self
    }
}

impl<I, O, OX, P, X> Parser<I, O> for Except<P, X, OX>
where
    P: Parser<I, O>,
    X: Parser<I, OX>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let mark = cursor.mark();
        ctx.begin_quiet();
        let excluded = self.excluded.parse(cursor, ctx);
        ctx.end_quiet();
        cursor.rewind(mark);
        match excluded {
            Ok(_) => {
                ctx.expected(mark.position(), || self.description.clone());
                Err(ParseError::Mismatch)
            }
            Err(ParseError::Mismatch) => self.parser.parse(cursor, ctx),
            Err(e) => Err(e),
        }
    }
}

// カット

/// Expectation point: a soft failure of `parser` becomes
/// [`ParseError::Committed`].
pub struct Expect<P> {
    parser: P,
}

impl<P> Expect<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<I, O, P> Parser<I, O> for Expect<P>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        match self.parser.parse(cursor, ctx) {
            Err(ParseError::Mismatch) => {
                debug!(
                    target: "parser::expect",
                    position = cursor.position(),
                    rule = ctx.current_rule(),
                    "expectation failed"
                );
                Err(ParseError::Committed)
            }
            other => other,
        }
    }
}

/// Turns a committed failure of `parser` back into a soft one.
pub struct Attempt<P> {
    parser: P,
}

impl<P> Attempt<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<I, O, P> Parser<I, O> for Attempt<P>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let mark = cursor.mark();
        match self.parser.parse(cursor, ctx) {
            Err(ParseError::Committed) => {
                cursor.rewind(mark);
                Err(ParseError::Mismatch)
            }
            other => other,
        }
    }
}

// スキップ

/// Runs `parser` with `skipper` as the ambient skipper.
pub struct Skip<I, P> {
    skipper: Skipper<I>,
    parser: P,
}

impl<I, P> Skip<I, P> {
    pub fn new(skipper: Skipper<I>, parser: P) -> Self {
        Self { skipper, parser }
    }
}

impl<I, O, P> Parser<I, O> for Skip<I, P>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let outer = ctx.replace_skipper(Some(self.skipper.clone()));
        let suspended = ctx.suspend_skip(false);
        let result = self.parser.parse(cursor, ctx);
        ctx.suspend_skip(suspended);
        ctx.replace_skipper(outer);
        result
    }
}

/// Skips once, then runs `parser` with skipping suspended.
pub struct Lexeme<P> {
    parser: P,
}

impl<P> Lexeme<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<I, O, P> Parser<I, O> for Lexeme<P>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        let suspended = ctx.suspend_skip(true);
        let result = self.parser.parse(cursor, ctx);
        ctx.suspend_skip(suspended);
        if result.is_err() {
            cursor.rewind(mark);
        }
        result
    }
}

// 属性の変換

/// Discards the attribute of `parser`.
pub struct Omit<P, O> {
    parser: P,
    _phantom: PhantomData<fn() -> O>,
}

impl<P, O> Omit<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, ()> for Omit<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<()> {
        self.parser.parse(cursor, ctx).map(|_| ())
    }
}

/// Synthesizes the span of input matched by `parser`.
pub struct Raw<P, O> {
    parser: P,
    _phantom: PhantomData<fn() -> O>,
}

impl<P, O> Raw<P, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, P> Parser<I, Span> for Raw<P, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<Span> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        let start = cursor.mark();
        match self.parser.parse(cursor, ctx) {
            Ok(_) => Ok(cursor.span_from(start)),
            Err(e) => {
                cursor.rewind(mark);
                Err(e)
            }
        }
    }
}

/// Collects the symbols matched by `parser` into `C`.
pub struct RawInto<P, O, C> {
    raw: Raw<P, O>,
    _phantom: PhantomData<fn() -> C>,
}

impl<P, O, C> RawInto<P, O, C> {
    pub fn new(parser: P) -> Self {
        Self {
            raw: Raw::new(parser),
            _phantom: PhantomData,
        }
    }
}

impl<I, O, C, P> Parser<I, C> for RawInto<P, O, C>
where
    I: Symbol,
    P: Parser<I, O>,
    C: FromIterator<I>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<C> {
        let span = self.raw.parse(cursor, ctx)?;
        Ok(span.slice(cursor.input()).iter().copied().collect())
    }
}

/// Maps the attribute through `f`.
pub struct Map<I, P, F, A> {
    parser: P,
    f: F,
    _phantom: PhantomData<fn(I) -> A>,
}

impl<I, P, F, A> Map<I, P, F, A> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for Map<I, P, F, A>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<B> {
        self.parser.parse(cursor, ctx).map(&self.f)
    }
}

/// Maps the attribute through a partial `f`; `None` is a soft failure.
pub struct TryMap<I, P, F, A> {
    parser: P,
    f: F,
    _phantom: PhantomData<fn(I) -> A>,
}

impl<I, P, F, A> TryMap<I, P, F, A> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, A, B, P, F> Parser<I, B> for TryMap<I, P, F, A>
where
    P: Parser<I, A>,
    F: Fn(A) -> Option<B>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<B> {
        let mark = cursor.mark();
        let value = self.parser.parse(cursor, ctx)?;
        match (self.f)(value) {
            Some(mapped) => Ok(mapped),
            None => {
                ctx.expected(mark.position(), || "valid value".to_string());
                cursor.rewind(mark);
                Err(ParseError::Mismatch)
            }
        }
    }
}

/// Semantic action over the attribute of `parser`.
///
/// The action may rewrite the attribute in place and read or write context
/// slots. Calling [`Context::reject`] fails the match softly.
pub struct Action<I, P, F> {
    parser: P,
    f: F,
    _input: PhantomData<fn(I)>,
}

impl<I, P, F> Action<I, P, F> {
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _input: PhantomData,
        }
    }
}

impl<I, O, P, F> Parser<I, O> for Action<I, P, F>
where
    P: Parser<I, O>,
    F: Fn(&mut O, &mut Context<'_, I>),
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let mark = cursor.mark();
        let mut value = self.parser.parse(cursor, ctx)?;
        ctx.set_pass(true);
        (self.f)(&mut value, ctx);
        if ctx.take_pass() {
            Ok(value)
        } else {
            trace!(target: "parser::action", position = mark.position(), "action rejected match");
            ctx.expected(mark.position(), || "valid value".to_string());
            cursor.rewind(mark);
            Err(ParseError::Mismatch)
        }
    }
}

// コンテキスト

/// Binds slot `T` to a fresh copy of `value` while `parser` runs.
pub struct WithSlot<T: Slot, P> {
    value: T::Value,
    parser: P,
    _slot: PhantomData<fn() -> T>,
}

impl<T: Slot, P> WithSlot<T, P> {
    pub fn new(value: T::Value, parser: P) -> Self {
        Self {
            value,
            parser,
            _slot: PhantomData,
        }
    }
}

impl<I, O, T, P> Parser<I, O> for WithSlot<T, P>
where
    T: Slot,
    T::Value: Clone,
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        ctx.push_slot::<T>(self.value.clone());
        let result = self.parser.parse(cursor, ctx);
        ctx.pop_slot::<T>();
        result
    }
}

/// Names `parser` in diagnostics when it fails without progress.
pub struct Label<P> {
    parser: P,
    name: String,
}

impl<P> Label<P> {
    pub fn new(parser: P, name: impl Into<String>) -> Self {
        Self {
            parser,
            name: name.into(),
        }
    }
}

impl<I, O, P> Parser<I, O> for Label<P>
where
    P: Parser<I, O>,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let start = cursor.position();
        let result = self.parser.parse(cursor, ctx);
        if matches!(result, Err(ParseError::Mismatch | ParseError::Committed)) {
            ctx.relabel(start, &self.name);
        }
        result
    }
}
