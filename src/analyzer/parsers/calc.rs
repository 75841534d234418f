//! Arithmetic calculator grammar.
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := factor (('*' | '/') factor)*
//! factor     := uint | '(' expression ')' | '-' factor | '+' factor
//! ```
//!
//! Operators are left-associative. Whitespace between tokens is skipped
//! unless disabled in the [`ParseConfig`].

use tracing::debug;

use crate::analyzer::prelude::*;
use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::config::ParseConfig;
use crate::error::KumikiResult;
use crate::eval::{compile, evaluate, Instruction};

pub struct Calculator {
    grammar: Grammar<char, Expr>,
}

impl Calculator {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rules = Rules::new();
        let expression = rules.declare::<Expr>("expression");
        let term = rules.declare::<Expr>("term");
        let factor = rules.declare::<Expr>("factor");

        rules.define(expression, parse_expression(term))?;
        rules.define(term, parse_term(factor))?;
        rules.define(factor, parse_factor(expression, factor))?;

        let grammar = Grammar::new(rules, expression)?.with_config(config);
        Ok(Self { grammar })
    }

    pub fn parse(&self, text: &str) -> KumikiResult<Option<Expr>> {
        let input: Vec<char> = text.chars().collect();
        if self.grammar.config().skip_whitespace {
            self.grammar.skip_parse(&input, space())
        } else {
            self.grammar.parse(&input)
        }
    }

    /// Parses as much of `text` as forms an expression.
    pub fn prefix_parse(&self, text: &str) -> KumikiResult<PrefixOutcome<Expr>> {
        let input: Vec<char> = text.chars().collect();
        let runner = self.grammar.runner();
        if self.grammar.config().skip_whitespace {
            runner.with_skipper(space()).prefix_parse(&input)
        } else {
            runner.prefix_parse(&input)
        }
    }

    pub fn evaluate(&self, text: &str) -> KumikiResult<Option<f64>> {
        let result = self.parse(text)?.map(|expr| evaluate(&expr));
        debug!(target: "calc", text, ?result, "evaluated");
        Ok(result)
    }

    /// Stack machine code for `text`.
    pub fn compile(&self, text: &str) -> KumikiResult<Option<Vec<Instruction>>> {
        Ok(self.parse(text)?.map(|expr| compile(&expr)))
    }
}

/// Left-folds `operand (operator operand)*`, keeping the folded tree within
/// the nesting limit.
struct Chain<P> {
    links: P,
}

impl<P> Parser<char, Expr> for Chain<P>
where
    P: Parser<char, (Expr, Vec<(BinaryOp, Expr)>)>,
{
    fn parse(&self, cursor: &mut Cursor<'_, char>, ctx: &mut Context<'_, char>) -> ParseResult<Expr> {
        let mark = cursor.mark();
        let (first, rest) = self.links.parse(cursor, ctx)?;
        let limit = ctx.max_depth();
        let mut height = first.height();
        let mut expr = first;
        for (op, right) in rest {
            height = height.max(right.height()) + 1;
            if height > limit {
                let position = mark.position();
                debug!(target: "calc", limit, position, "operator chain exceeds the nesting limit");
                cursor.rewind(mark);
                return Err(ParseError::DepthExceeded { limit, position });
            }
            expr = Expr::binary(op, expr, right);
        }
        Ok(expr)
    }
}

fn chain<O>(operand: Rule<Expr>, operator: O) -> impl Parser<char, Expr>
where
    O: Parser<char, BinaryOp>,
{
    Chain {
        links: seq(operand, star(seq(operator, operand))),
    }
}

fn parse_expression(term: Rule<Expr>) -> impl Parser<char, Expr> {
    chain(term, symbols([("+", BinaryOp::Add), ("-", BinaryOp::Subtract)]))
}

fn parse_term(factor: Rule<Expr>) -> impl Parser<char, Expr> {
    chain(factor, symbols([("*", BinaryOp::Mult), ("/", BinaryOp::Divide)]))
}

fn parse_factor(expression: Rule<Expr>, factor: Rule<Expr>) -> impl Parser<char, Expr> {
    choice(vec![
        Box::new(parse_number()),
        Box::new(parse_group(expression)),
        Box::new(parse_negation(factor)),
        Box::new(parse_unary_plus(factor)),
    ])
}

fn parse_number() -> impl Parser<char, Expr> {
    map(uint::<u32>(), Expr::Number)
}

fn parse_group(expression: Rule<Expr>) -> impl Parser<char, Expr> {
    seq(lit('('), seq(expression, lit(')')))
}

fn parse_negation(factor: Rule<Expr>) -> impl Parser<char, Expr> {
    map(seq(lit('-'), factor), |operand: Expr| {
        Expr::unary(UnaryOp::Negate, operand)
    })
}

fn parse_unary_plus(factor: Rule<Expr>) -> impl Parser<char, Expr> {
    seq(lit('+'), factor)
}
