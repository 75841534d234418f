use thiserror::Error;

use crate::analyzer::core::ParseError;
use crate::analyzer::error_handling::ErrorRecord;
use crate::eval::EvalError;

/// Mistakes in how a grammar or a parse run was put together.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Rule `{name}` is already defined")]
    AlreadyDefined { name: String },
    #[error("Rule `{name}` is used but never defined")]
    Undefined { name: String },
    #[error("Rules declared but never defined: {}", .names.join(", "))]
    Incomplete { names: Vec<String> },
    #[error("Rule #{index} belongs to another rule table")]
    ForeignRule { index: usize },
    #[error("Rule `{name}` was defined with a different attribute type")]
    TypeMismatch { name: String },
    #[error("Invalid repetition bounds: min {min} is greater than max {max}")]
    InvalidBounds { min: usize, max: usize },
    #[error("Invalid radix {radix}: must be between 2 and 36")]
    InvalidRadix { radix: u32 },
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Nesting depth limit of {limit} exceeded at position {position}")]
    DepthExceeded { limit: usize, position: usize },
    #[error("Parse cancelled at position {position}")]
    Cancelled { position: usize },
    // committed failure raised by the error handler
    #[error("Parse error: {0}")]
    Expectation(ErrorRecord),
    #[error("Eval error: {0}")]
    Eval(#[from] EvalError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type KumikiResult<T> = Result<T, Error>;

impl From<ParseError> for Error {
    fn from(error: ParseError) -> Self {
        match error {
            ParseError::Config(e) => Error::Config(e),
            ParseError::DepthExceeded { limit, position } => Error::DepthExceeded { limit, position },
            ParseError::Cancelled { position } => Error::Cancelled { position },
            // soft and committed failures are resolved by the driver
            e @ (ParseError::Mismatch | ParseError::Committed) => Error::internal(e.to_string()),
        }
    }
}

// エラー作成用のヘルパー関数
impl Error {
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Error::Internal(message.into())
    }
}
