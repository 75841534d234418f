//! Stack machine code for calculator expressions.
//!
//! Compiling `(3+4)*5` yields:
//!
//! ```text
//! push 3
//! push 4
//! add
//! push 5
//! mult
//! ```

use core::fmt;

use tracing::debug;

use super::evaluator::{apply, EvalError, EvalResult};
use crate::ast::{BinaryOp, Expr, UnaryOp};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Instruction {
    Push(u32),
    Binary(BinaryOp),
    Negate,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Push(n) => write!(f, "push {}", n),
            Instruction::Binary(op) => write!(f, "{}", op),
            Instruction::Negate => write!(f, "{}", UnaryOp::Negate),
        }
    }
}

/// Post-order code for `expr`.
pub fn compile(expr: &Expr) -> Vec<Instruction> {
    let mut code = Vec::new();
    emit(expr, &mut code);
    code
}

fn emit(expr: &Expr, code: &mut Vec<Instruction>) {
    match expr {
        Expr::Number(n) => code.push(Instruction::Push(*n)),
        Expr::Unary {
            op: UnaryOp::Negate,
            operand,
        } => {
            emit(operand, code);
            code.push(Instruction::Negate);
        }
        Expr::Binary { op, left, right } => {
            emit(left, code);
            emit(right, code);
            code.push(Instruction::Binary(*op));
        }
    }
}

/// Runs `code` and returns the single value left on the stack.
pub fn execute(code: &[Instruction]) -> EvalResult<f64> {
    let mut stack: Vec<f64> = Vec::new();
    for (index, instruction) in code.iter().enumerate() {
        let underflow = || EvalError::StackUnderflow {
            index,
            instruction: instruction.to_string(),
        };
        match instruction {
            Instruction::Push(n) => stack.push(f64::from(*n)),
            Instruction::Negate => {
                let top = stack.last_mut().ok_or_else(underflow)?;
                *top = -*top;
            }
            Instruction::Binary(op) => {
                // ( a, b -- c )
                let second = stack.pop().ok_or_else(underflow)?;
                let first = stack.pop().ok_or_else(underflow)?;
                stack.push(apply(*op, first, second));
            }
        }
    }
    match stack.as_slice() {
        [result] => {
            debug!(target: "eval", instructions = code.len(), result, "executed");
            Ok(*result)
        }
        [] => Err(EvalError::EmptyProgram),
        values => Err(EvalError::UnbalancedStack {
            count: values.len(),
        }),
    }
}
