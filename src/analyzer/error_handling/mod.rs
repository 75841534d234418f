//! # Error Handling
//!
//! Diagnostics produced while parsing.
//!
//! Every failing step reports what it expected at which position. The
//! [`Context`](super::context::Context) keeps only the furthest such report,
//! an [`ErrorRecord`]. When the whole parse fails, the record is handed to an
//! [`ErrorHandler`], which decides whether the failure is returned quietly
//! (`Ok(None)` from the drivers) or raised as
//! [`Error::Expectation`](crate::Error::Expectation).

use std::fmt;

/// The furthest failure observed during a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    /// Input position of the failure.
    pub position: usize,
    /// Human-readable description of what was expected there.
    pub expected: String,
    /// Innermost rule active when the failure was recorded.
    pub rule: Option<String>,
    pub(crate) depth: usize,
}

impl ErrorRecord {
    pub fn new(position: usize, expected: impl Into<String>) -> Self {
        Self {
            position,
            expected: expected.into(),
            rule: None,
            depth: 0,
        }
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {} at position {}", self.expected, self.position)?;
        if let Some(rule) = &self.rule {
            write!(f, " (in {})", rule)?;
        }
        Ok(())
    }
}

/// What a driver does with a failed parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Report failure through the normal return value.
    Fail,
    /// Raise the record as an error.
    Raise,
}

/// Receives the furthest error record when a parse fails.
///
/// `committed` tells whether the failure passed an expectation point.
pub trait ErrorHandler {
    fn on_failure(&mut self, record: &ErrorRecord, committed: bool) -> Disposition;
}

/// Discards diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ErrorHandler for Silent {
    fn on_failure(&mut self, _record: &ErrorRecord, _committed: bool) -> Disposition {
        Disposition::Fail
    }
}

/// Forwards every failure to a callback.
pub struct Collecting<F> {
    callback: F,
}

impl<F> Collecting<F>
where
    F: FnMut(&ErrorRecord),
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ErrorHandler for Collecting<F>
where
    F: FnMut(&ErrorRecord),
{
    fn on_failure(&mut self, record: &ErrorRecord, _committed: bool) -> Disposition {
        (self.callback)(record);
        Disposition::Fail
    }
}

/// Raises committed failures; ordinary mismatches are reported as failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct Raising;

impl ErrorHandler for Raising {
    fn on_failure(&mut self, record: &ErrorRecord, committed: bool) -> Disposition {
        if committed {
            tracing::debug!(target: "parser::error", %record, "raising committed failure");
            Disposition::Raise
        } else {
            Disposition::Fail
        }
    }
}

/// Keeps every reported failure for later inspection.
#[derive(Debug, Default, Clone)]
pub struct ErrorCollector {
    errors: Vec<ErrorRecord>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, record: ErrorRecord) {
        self.errors.push(record);
    }

    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Multi-line report of all collected failures.
    pub fn format_report(&self) -> String {
        let mut message = String::new();
        for (i, record) in self.errors.iter().enumerate() {
            message.push_str(&format!("{}. {}\n", i + 1, record));
        }
        message
    }
}

impl ErrorHandler for ErrorCollector {
    fn on_failure(&mut self, record: &ErrorRecord, _committed: bool) -> Disposition {
        self.add_error(record.clone());
        Disposition::Fail
    }
}

/// Renders `input` around `position` with a caret under the failure.
pub fn format_error_context(input: &str, record: &ErrorRecord) -> String {
    let mut line_start = 0;
    let mut line_no = 1;
    for (i, c) in input.chars().enumerate() {
        if i >= record.position {
            break;
        }
        if c == '\n' {
            line_start = i + 1;
            line_no += 1;
        }
    }
    let line: String = input
        .chars()
        .skip(line_start)
        .take_while(|c| *c != '\n')
        .collect();
    let column = record.position - line_start;
    format!(
        "{}\n{:>4} | {}\n     | {}^",
        record,
        line_no,
        line,
        " ".repeat(column)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_display() {
        let record = ErrorRecord::new(4, "':'").with_rule("object element");
        assert_eq!(
            record.to_string(),
            "expected ':' at position 4 (in object element)"
        );
    }

    #[test]
    fn test_raising_only_raises_committed() {
        let record = ErrorRecord::new(0, "digit");
        let mut handler = Raising;
        assert_eq!(handler.on_failure(&record, false), Disposition::Fail);
        assert_eq!(handler.on_failure(&record, true), Disposition::Raise);
    }

    #[test]
    fn test_collecting_handlers() {
        let mut seen = Vec::new();
        {
            let mut handler = Collecting::new(|r: &ErrorRecord| seen.push(r.position));
            handler.on_failure(&ErrorRecord::new(2, "x"), false);
            handler.on_failure(&ErrorRecord::new(5, "y"), true);
        }
        assert_eq!(seen, vec![2, 5]);

        let mut collector = ErrorCollector::new();
        collector.on_failure(&ErrorRecord::new(1, "digit"), false);
        assert!(collector.has_errors());
        assert_eq!(collector.format_report(), "1. expected digit at position 1\n");
        collector.clear();
        assert!(!collector.has_errors());
    }

    #[test]
    fn test_format_error_context_points_at_column() {
        let record = ErrorRecord::new(6, "value");
        let rendered = format_error_context("[1,\n  ]", &record);
        assert!(rendered.ends_with("   2 |   ]\n     |   ^"));
    }
}
