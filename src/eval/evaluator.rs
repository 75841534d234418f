use thiserror::Error;
use tracing::trace;

use crate::ast::{BinaryOp, Expr, UnaryOp};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Stack underflow at instruction {index} ({instruction})")]
    StackUnderflow { index: usize, instruction: String },
    #[error("Program left {count} values on the stack")]
    UnbalancedStack { count: usize },
    #[error("Empty program")]
    EmptyProgram,
}

pub type EvalResult<T> = Result<T, EvalError>;

/// Recursive evaluator over calculator expressions.
///
/// Arithmetic is `f64`; division by zero follows IEEE semantics.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn eval(&self, expr: &Expr) -> f64 {
        match expr {
            Expr::Number(n) => f64::from(*n),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand);
                match op {
                    UnaryOp::Negate => -value,
                }
            }
            Expr::Binary { op, left, right } => {
                let (left, right) = (self.eval(left), self.eval(right));
                let result = apply(*op, left, right);
                trace!(target: "eval", %op, left, right, result, "binary");
                result
            }
        }
    }
}

pub fn evaluate(expr: &Expr) -> f64 {
    Evaluator::new().eval(expr)
}

pub(crate) fn apply(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Subtract => left - right,
        BinaryOp::Mult => left * right,
        BinaryOp::Divide => left / right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate() {
        // (3 + 4) * 5 - 2 * 3
        let expr = Expr::binary(
            BinaryOp::Subtract,
            Expr::binary(
                BinaryOp::Mult,
                Expr::binary(BinaryOp::Add, Expr::Number(3), Expr::Number(4)),
                Expr::Number(5),
            ),
            Expr::binary(BinaryOp::Mult, Expr::Number(2), Expr::Number(3)),
        );
        assert_eq!(evaluate(&expr), 29.0);
    }

    #[test]
    fn test_negate_and_divide() {
        let expr = Expr::binary(
            BinaryOp::Divide,
            Expr::unary(UnaryOp::Negate, Expr::Number(7)),
            Expr::Number(2),
        );
        assert_eq!(evaluate(&expr), -3.5);

        let by_zero = Expr::binary(BinaryOp::Divide, Expr::Number(1), Expr::Number(0));
        assert!(evaluate(&by_zero).is_infinite());
    }
}
