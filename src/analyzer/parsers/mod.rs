//! Grammars built on the combinator engine.

pub mod calc;
pub mod json;
pub mod yaml;

pub use calc::Calculator;
pub use json::{parse_json, JsonParser};
pub use yaml::{parse_scalar, ScalarParser};

#[cfg(test)]
mod tests;
