//! # Kumiki: recursive-descent parser combinators
//!
//! Kumiki builds parsers out of small values that all implement one
//! capability, [`Parser`](analyzer::Parser): try to match at the cursor,
//! and either synthesize an attribute or fail with the cursor restored.
//!
//! ## Building blocks
//!
//! - Primitives ([`analyzer::primitives`], [`analyzer::numeric`]): literals,
//!   character classes, symbol tables, integers and reals.
//! - Combinators ([`analyzer::combinators`]): sequence, alternation,
//!   repetition, lookahead, expectation points, skipping and semantic
//!   actions.
//! - Rules ([`analyzer::rule`]): named, forward-declared parsers for
//!   recursive grammars.
//! - Drivers ([`analyzer::driver`]): full, skipping and prefix parses.
//!
//! Everything a grammar author needs is in the [`prelude`]:
//!
//! ```
//! use kumiki::prelude::*;
//!
//! let pair = seq(uint::<u32>(), seq(lit(','), uint::<u32>()));
//! assert_eq!(parse_str("4,2", &pair).unwrap(), Some((4, 2)));
//! ```
//!
//! ## Attributes
//!
//! The shape of a synthesized value follows the grammar: sequences build
//! tuples, repetitions build collections, and parsers with no value of their
//! own (literals, lookaheads, `omit`) vanish from the surrounding tuple. See
//! [`analyzer::attribute`].
//!
//! ## Failure
//!
//! An ordinary failed parse is `Ok(None)`, with the furthest failure kept for
//! diagnostics. Grammar configuration errors, exceeded nesting depth and
//! cancellation are reported as [`Error`].
//!
//! ## Example grammars
//!
//! [`analyzer::parsers`] holds an arithmetic calculator, a JSON reader and a
//! YAML scalar reader, with evaluation of calculator expressions in [`eval`].

pub mod analyzer;
pub mod ast;
pub mod config;
pub mod error;
pub mod eval;

pub use analyzer::prelude;
pub use error::*;
