pub mod evaluator;
pub mod stack;

pub use evaluator::{evaluate, EvalError, EvalResult, Evaluator};
pub use stack::{compile, execute, Instruction};
