use std::sync::Arc;

use thiserror::Error;

use super::context::Context;
use super::cursor::Cursor;
use crate::error::ConfigError;

// パーサートレイト

/// A grammar expression that can be run against a cursor.
///
/// On success the cursor sits just past the consumed input and the
/// synthesized attribute is returned. On any failure the cursor is back
/// where it was when `parse` was called.
pub trait Parser<I, O> {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O>;
}

pub type ParseResult<O> = Result<O, ParseError>;

/// Outcome of a failed parse step.
///
/// `Mismatch` is soft: alternatives and repetitions recover from it.
/// `Committed` is raised past an expectation point and is never backtracked
/// over. The remaining variants abort the whole parse.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("No match")]
    Mismatch,
    #[error("Committed failure")]
    Committed,
    #[error("Grammar configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Nesting depth limit of {limit} exceeded at position {position}")]
    DepthExceeded { limit: usize, position: usize },
    #[error("Parse cancelled at position {position}")]
    Cancelled { position: usize },
}

impl ParseError {
    pub fn is_soft(&self) -> bool {
        matches!(self, ParseError::Mismatch)
    }

    /// Errors that no combinator may swallow.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ParseError::Mismatch | ParseError::Committed)
    }
}

impl<I, O, P> Parser<I, O> for &P
where
    P: Parser<I, O> + ?Sized,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        (**self).parse(cursor, ctx)
    }
}

impl<I, O, P> Parser<I, O> for Box<P>
where
    P: Parser<I, O> + ?Sized,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        (**self).parse(cursor, ctx)
    }
}

impl<I, O, P> Parser<I, O> for Arc<P>
where
    P: Parser<I, O> + ?Sized,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        (**self).parse(cursor, ctx)
    }
}

/// Type-erased parser, as stored in alternation lists and rule tables.
pub type BoxedParser<I, O> = Box<dyn Parser<I, O> + Send + Sync>;

/// Type-erased skipper shared by every parser running under it.
pub type Skipper<I> = Arc<dyn Parser<I, ()> + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(ParseError::Mismatch.is_soft());
        assert!(!ParseError::Committed.is_soft());
        assert!(!ParseError::Committed.is_fatal());
        assert!(ParseError::Cancelled { position: 3 }.is_fatal());
        assert!(ParseError::DepthExceeded {
            limit: 1,
            position: 0
        }
        .is_fatal());
    }
}
