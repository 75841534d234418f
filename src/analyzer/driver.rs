//! # Parse Drivers
//!
//! Entry points that own a [`Cursor`] and a [`Context`] for one call:
//!
//! - [`parse`] succeeds only if the whole input is consumed.
//! - [`skip_parse`] does the same with an ambient skipper, which also runs
//!   once more after the grammar so trailing ignorable input is accepted.
//! - [`prefix_parse`] reports how far matching got, whether or not the
//!   grammar matched, in a [`PrefixOutcome`].
//!
//! All of them return `Ok(None)` for an ordinary failed parse. `Err` is
//! reserved for configuration errors, exhausted nesting depth,
//! cancellation, and committed failures raised by the
//! [`Raising`](super::error_handling::Raising) handler.
//!
//! [`Runner`] is the builder form with a configuration, skipper, cancellation
//! flag and rule table. [`Grammar`] bundles a validated rule table with its
//! start rule.

use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tracing::debug;

use super::combinators::Omit;
use super::context::Context;
use super::core::{ParseError, Parser, Skipper};
use super::cursor::{Cursor, Symbol};
use super::error_handling::{Disposition, ErrorHandler, ErrorRecord, Silent};
use super::rule::{Rule, Rules};
use crate::config::ParseConfig;
use crate::error::{ConfigError, Error, KumikiResult};

/// Result of a prefix parse.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixOutcome<O> {
    /// Attribute of the matched prefix, if the grammar matched.
    pub value: Option<O>,
    /// End of the matched prefix; `0` when nothing matched.
    pub consumed: usize,
    /// Furthest position any branch reached.
    pub furthest: usize,
    /// Furthest failure recorded, if any branch failed.
    pub error: Option<ErrorRecord>,
}

impl<O> PrefixOutcome<O> {
    pub fn is_match(&self) -> bool {
        self.value.is_some()
    }

    /// Input left after the furthest position reached.
    pub fn remainder<'a, I>(&self, input: &'a [I]) -> &'a [I] {
        input.get(self.furthest..).unwrap_or(&[])
    }

    /// Input left after the matched prefix.
    pub fn unconsumed<'a, I>(&self, input: &'a [I]) -> &'a [I] {
        input.get(self.consumed..).unwrap_or(&[])
    }

    /// Whether matching ran into the end of input rather than a symbol it
    /// could not accept.
    pub fn stopped_at_end(&self, input_len: usize) -> bool {
        self.furthest >= input_len
    }
}

/// Configurable parse invocation over a parser and a rule table.
pub struct Runner<'p, I, O, P: ?Sized> {
    parser: &'p P,
    rules: &'p Rules<I>,
    config: ParseConfig,
    skipper: Option<Skipper<I>>,
    cancel: Option<Arc<AtomicBool>>,
    _output: PhantomData<fn() -> O>,
}

impl<'p, I, O, P> Runner<'p, I, O, P>
where
    I: Symbol,
    P: Parser<I, O> + ?Sized,
{
    pub fn new(parser: &'p P, rules: &'p Rules<I>) -> Self {
        Self {
            parser,
            rules,
            config: ParseConfig::default(),
            skipper: None,
            cancel: None,
            _output: PhantomData,
        }
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_skipper<S, OS>(mut self, skipper: S) -> Self
    where
        S: Parser<I, OS> + Send + Sync + 'static,
        OS: 'static,
    {
        self.skipper = Some(Arc::new(Omit::new(skipper)));
        self
    }

    pub fn with_shared_skipper(mut self, skipper: Skipper<I>) -> Self {
        self.skipper = Some(skipper);
        self
    }

    /// Polled on every rule entry and repetition step.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn parse(&self, input: &[I]) -> KumikiResult<Option<O>> {
        self.parse_with(input, &mut Silent)
    }

    pub fn parse_with(
        &self,
        input: &[I],
        handler: &mut dyn ErrorHandler,
    ) -> KumikiResult<Option<O>> {
        Ok(self.run(input, handler, true)?.value)
    }

    pub fn prefix_parse(&self, input: &[I]) -> KumikiResult<PrefixOutcome<O>> {
        self.prefix_parse_with(input, &mut Silent)
    }

    pub fn prefix_parse_with(
        &self,
        input: &[I],
        handler: &mut dyn ErrorHandler,
    ) -> KumikiResult<PrefixOutcome<O>> {
        self.run(input, handler, false)
    }

    fn run(
        &self,
        input: &[I],
        handler: &mut dyn ErrorHandler,
        complete: bool,
    ) -> KumikiResult<PrefixOutcome<O>> {
        let mut cursor = Cursor::new(input);
        let mut ctx = Context::with_config(self.rules, handler, &self.config);
        ctx.replace_skipper(self.skipper.clone());
        ctx.set_cancel(self.cancel.clone());

        let (value, committed) = match self.parser.parse(&mut cursor, &mut ctx) {
            Ok(value) if complete => {
                ctx.skip(&mut cursor)?;
                if cursor.at_end() {
                    (Some(value), false)
                } else {
                    ctx.expected(cursor.position(), || "end of input".to_string());
                    (None, false)
                }
            }
            Ok(value) => (Some(value), false),
            Err(ParseError::Mismatch) => (None, false),
            Err(ParseError::Committed) => (None, true),
            Err(fatal) => {
                debug!(target: "parser::driver", error = %fatal, "parse aborted");
                return Err(fatal.into());
            }
        };

        let consumed = if value.is_some() { cursor.position() } else { 0 };
        let furthest = ctx
            .furthest()
            .map_or(consumed, |record| record.position.max(consumed));

        let error = if value.is_some() {
            ctx.furthest().cloned()
        } else {
            let (record, disposition) = ctx.report(cursor.position(), committed);
            debug!(
                target: "parser::driver",
                position = record.position,
                expected = %record.expected,
                committed,
                "parse failed"
            );
            if disposition == Disposition::Raise {
                return Err(Error::Expectation(record));
            }
            Some(record)
        };

        debug!(
            target: "parser::driver",
            matched = value.is_some(),
            consumed,
            furthest,
            len = input.len(),
            "parse finished"
        );
        Ok(PrefixOutcome {
            value,
            consumed,
            furthest,
            error,
        })
    }
}

/// Parses all of `input`.
pub fn parse<I, O, P>(input: &[I], parser: &P) -> KumikiResult<Option<O>>
where
    I: Symbol,
    P: Parser<I, O> + ?Sized,
{
    let rules = Rules::new();
    Runner::new(parser, &rules).parse(input)
}

/// Parses all of `input`, reporting failure to `handler`.
pub fn parse_with<I, O, P>(
    input: &[I],
    parser: &P,
    handler: &mut dyn ErrorHandler,
) -> KumikiResult<Option<O>>
where
    I: Symbol,
    P: Parser<I, O> + ?Sized,
{
    let rules = Rules::new();
    Runner::new(parser, &rules).parse_with(input, handler)
}

/// Parses all of `input` with `skipper` as the ambient skipper.
pub fn skip_parse<I, O, P, S, OS>(input: &[I], parser: &P, skipper: S) -> KumikiResult<Option<O>>
where
    I: Symbol,
    P: Parser<I, O> + ?Sized,
    S: Parser<I, OS> + Send + Sync + 'static,
    OS: 'static,
{
    let rules = Rules::new();
    Runner::new(parser, &rules)
        .with_skipper(skipper)
        .parse(input)
}

/// Parses as much of `input` as the grammar accepts.
pub fn prefix_parse<I, O, P>(input: &[I], parser: &P) -> KumikiResult<PrefixOutcome<O>>
where
    I: Symbol,
    P: Parser<I, O> + ?Sized,
{
    let rules = Rules::new();
    Runner::new(parser, &rules).prefix_parse(input)
}

/// [`parse`] over the characters of `text`.
pub fn parse_str<O, P>(text: &str, parser: &P) -> KumikiResult<Option<O>>
where
    P: Parser<char, O> + ?Sized,
{
    let input: Vec<char> = text.chars().collect();
    parse(&input, parser)
}

pub fn skip_parse_str<O, P, S, OS>(text: &str, parser: &P, skipper: S) -> KumikiResult<Option<O>>
where
    P: Parser<char, O> + ?Sized,
    S: Parser<char, OS> + Send + Sync + 'static,
    OS: 'static,
{
    let input: Vec<char> = text.chars().collect();
    skip_parse(&input, parser, skipper)
}

pub fn prefix_parse_str<O, P>(text: &str, parser: &P) -> KumikiResult<PrefixOutcome<O>>
where
    P: Parser<char, O> + ?Sized,
{
    let input: Vec<char> = text.chars().collect();
    prefix_parse(&input, parser)
}

/// A rule table whose rules are all defined, with a start rule.
pub struct Grammar<I, O> {
    rules: Rules<I>,
    start: Rule<O>,
    config: ParseConfig,
}

impl<I, O> Grammar<I, O>
where
    I: Symbol,
    O: 'static,
{
    /// Fails if any rule is undefined or `start` belongs to another table.
    pub fn new(rules: Rules<I>, start: Rule<O>) -> Result<Self, ConfigError> {
        rules.validate()?;
        if !rules.owns(start.id()) {
            return Err(ConfigError::ForeignRule {
                index: start.id().index(),
            });
        }
        Ok(Self {
            rules,
            start,
            config: ParseConfig::default(),
        })
    }

    pub fn with_config(mut self, config: ParseConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    pub fn rules(&self) -> &Rules<I> {
        &self.rules
    }

    pub fn start(&self) -> Rule<O> {
        self.start
    }

    pub fn runner(&self) -> Runner<'_, I, O, Rule<O>> {
        Runner::new(&self.start, &self.rules).with_config(self.config.clone())
    }

    pub fn parse(&self, input: &[I]) -> KumikiResult<Option<O>> {
        self.runner().parse(input)
    }

    pub fn skip_parse<S, OS>(&self, input: &[I], skipper: S) -> KumikiResult<Option<O>>
    where
        S: Parser<I, OS> + Send + Sync + 'static,
        OS: 'static,
    {
        self.runner().with_skipper(skipper).parse(input)
    }

    pub fn prefix_parse(&self, input: &[I]) -> KumikiResult<PrefixOutcome<O>> {
        self.runner().prefix_parse(input)
    }
}

impl<O: 'static> Grammar<char, O> {
    pub fn parse_str(&self, text: &str) -> KumikiResult<Option<O>> {
        let input: Vec<char> = text.chars().collect();
        self.parse(&input)
    }

    pub fn prefix_parse_str(&self, text: &str) -> KumikiResult<PrefixOutcome<O>> {
        let input: Vec<char> = text.chars().collect();
        self.prefix_parse(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::error_handling::{Collecting, Raising};
    use crate::analyzer::prelude::*;
    use std::sync::atomic::Ordering;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn test_full_consumption_required() {
        let digits = plus(digit());
        assert_eq!(parse_str("123", &digits).unwrap().map(|v| v.len()), Some(3));
        assert_eq!(parse_str("123x", &digits).unwrap(), None);
    }

    #[test]
    fn test_skip_parse_accepts_trailing_skippable_input() {
        let word = plus(range('a', 'z')).collect::<String>();
        assert_eq!(
            skip_parse_str("  word  ", &word, space()).unwrap(),
            Some("word".to_string())
        );
    }

    #[test]
    fn test_prefix_outcome_on_partial_input() {
        let input = chars("ab!");
        let outcome = prefix_parse(&input, &plus(range('a', 'z'))).unwrap();
        assert_eq!(outcome.consumed, 2);
        assert_eq!(outcome.furthest, 2);
        assert_eq!(outcome.unconsumed(&input), &['!']);
        assert!(!outcome.stopped_at_end(input.len()));
    }

    #[test]
    fn test_handlers_see_failures() {
        let mut seen = Vec::new();
        let mut handler = Collecting::new(|record: &ErrorRecord| seen.push(record.clone()));
        let result = parse_with(&chars("x"), &lit('a'), &mut handler).unwrap();
        assert_eq!(result, None);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].expected, "'a'");
    }

    #[test]
    fn test_raising_ignores_soft_failures() {
        let result = parse_with(&chars("x"), &lit('a'), &mut Raising).unwrap();
        assert_eq!(result, None);

        let committed = seq(lit('a'), expect(lit('b')));
        let error = parse_with(&chars("ax"), &committed, &mut Raising).unwrap_err();
        match error {
            Error::Expectation(record) => assert_eq!(record.position, 1),
            other => panic!("Unexpected error type: {:?}", other),
        }
    }

    #[test]
    fn test_cancelled_runner() {
        let flag = Arc::new(AtomicBool::new(true));
        let letters = star(any());
        let rules = Rules::new();
        let result = Runner::new(&letters, &rules)
            .with_cancel(flag.clone())
            .parse(&chars("abc"));
        assert!(matches!(result, Err(Error::Cancelled { position: 0 })));

        flag.store(false, Ordering::Relaxed);
        let result = Runner::new(&letters, &rules)
            .with_cancel(flag)
            .parse(&chars("abc"));
        assert_eq!(result.unwrap(), Some(vec!['a', 'b', 'c']));
    }

    #[test]
    fn test_grammar_requires_complete_rules() {
        let mut rules = Rules::<char>::new();
        let start = rules.declare::<()>("start");
        let _dangling = rules.declare::<()>("dangling");
        rules.define(start, lit("ok")).unwrap();
        assert!(matches!(
            Grammar::new(rules, start),
            Err(ConfigError::Incomplete { ref names }) if names == &vec!["dangling".to_string()]
        ));
    }

    #[test]
    fn test_depth_limit_is_fatal() {
        let mut rules = Rules::<char>::new();
        let nest = rules.declare::<()>("nest");
        rules
            .define(nest, alt(seq(lit('('), seq(nest, lit(')'))), eps()))
            .unwrap();
        let grammar = Grammar::new(rules, nest).unwrap().with_config(ParseConfig {
            max_depth: 4,
            ..ParseConfig::default()
        });
        assert_eq!(grammar.parse_str("(())").unwrap(), Some(()));
        assert!(matches!(
            grammar.parse_str("(((((())))))"),
            Err(Error::DepthExceeded { limit: 4, .. })
        ));
    }
}
