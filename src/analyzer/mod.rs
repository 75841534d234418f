pub mod attribute;
pub mod combinators;
pub mod context;
pub mod core;
pub mod cursor;
pub mod driver;
pub mod error_handling;
pub mod numeric;
pub mod parsers;
pub mod prelude;
pub mod primitives;
pub mod rule;

pub use core::ParseError;
pub use core::ParseResult;
pub use core::Parser;
pub use driver::{Grammar, PrefixOutcome, Runner};

pub use crate::ast;
