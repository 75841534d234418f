use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, trace};

use super::core::{ParseError, ParseResult, Skipper};
use super::cursor::Cursor;
use super::error_handling::{Disposition, ErrorHandler, ErrorRecord};
use super::rule::Rules;
use crate::config::ParseConfig;

/// Key type of a scoped context slot.
///
/// ```
/// use kumiki::analyzer::context::Slot;
///
/// struct Indent;
/// impl Slot for Indent {
///     type Value = usize;
/// }
/// ```
pub trait Slot: 'static {
    type Value: 'static;
}

/// Per-invocation parse state.
///
/// One context is created for each top-level parse call and threaded through
/// every parser. It is never shared between calls, so concurrent parses with
/// the same grammar are independent.
pub struct Context<'g, I> {
    rules: &'g Rules<I>,
    handler: &'g mut dyn ErrorHandler,
    skipper: Option<Skipper<I>>,
    skip_suspended: bool,
    pass: bool,
    quiet: usize,
    slots: HashMap<TypeId, Vec<Box<dyn Any>>>,
    furthest: Option<ErrorRecord>,
    rule_stack: Vec<&'g str>,
    max_depth: usize,
    trace_rules: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'g, I> Context<'g, I> {
    pub fn new(rules: &'g Rules<I>, handler: &'g mut dyn ErrorHandler) -> Self {
        Self::with_config(rules, handler, &ParseConfig::default())
    }

    pub fn with_config(
        rules: &'g Rules<I>,
        handler: &'g mut dyn ErrorHandler,
        config: &ParseConfig,
    ) -> Self {
        Self {
            rules,
            handler,
            skipper: None,
            skip_suspended: false,
            pass: true,
            quiet: 0,
            slots: HashMap::new(),
            furthest: None,
            rule_stack: Vec::new(),
            max_depth: config.max_depth,
            trace_rules: config.trace_rules,
            cancel: None,
        }
    }

    pub fn rules(&self) -> &'g Rules<I> {
        self.rules
    }

    // ---- semantic actions ----

    /// Marks the running semantic action as failed. The enclosing parser
    /// then fails softly and rewinds.
    pub fn reject(&mut self) {
        self.pass = false;
    }

    pub fn set_pass(&mut self, pass: bool) {
        self.pass = pass;
    }

    pub fn passed(&self) -> bool {
        self.pass
    }

    /// Resets the pass flag and returns whether it was still set.
    pub(crate) fn take_pass(&mut self) -> bool {
        std::mem::replace(&mut self.pass, true)
    }

    // ---- slots ----

    /// Innermost value bound for `T`, if any.
    pub fn slot<T: Slot>(&self) -> Option<&T::Value> {
        self.slots
            .get(&TypeId::of::<T>())
            .and_then(|stack| stack.last())
            .and_then(|value| value.downcast_ref::<T::Value>())
    }

    pub fn slot_mut<T: Slot>(&mut self) -> Option<&mut T::Value> {
        self.slots
            .get_mut(&TypeId::of::<T>())
            .and_then(|stack| stack.last_mut())
            .and_then(|value| value.downcast_mut::<T::Value>())
    }

    pub(crate) fn push_slot<T: Slot>(&mut self, value: T::Value) {
        self.slots
            .entry(TypeId::of::<T>())
            .or_default()
            .push(Box::new(value));
    }

    pub(crate) fn pop_slot<T: Slot>(&mut self) {
        if let Some(stack) = self.slots.get_mut(&TypeId::of::<T>()) {
            stack.pop();
        }
    }

    // ---- skipping ----

    pub(crate) fn replace_skipper(&mut self, skipper: Option<Skipper<I>>) -> Option<Skipper<I>> {
        std::mem::replace(&mut self.skipper, skipper)
    }

    /// Sets the suspension flag and returns its previous value.
    pub(crate) fn suspend_skip(&mut self, suspended: bool) -> bool {
        std::mem::replace(&mut self.skip_suspended, suspended)
    }

    pub fn skipping(&self) -> bool {
        self.skipper.is_some() && !self.skip_suspended
    }

    /// Runs the active skipper until it stops making progress.
    ///
    /// The skipper runs with skipping suspended and records no diagnostics.
    pub fn skip(&mut self, cursor: &mut Cursor<'_, I>) -> ParseResult<()> {
        if self.skip_suspended {
            return Ok(());
        }
        let Some(skipper) = self.skipper.clone() else {
            return Ok(());
        };
        self.skip_suspended = true;
        self.quiet += 1;
        let result = loop {
            let mark = cursor.mark();
            match skipper.parse(cursor, self) {
                Ok(()) if cursor.position() > mark.position() => {}
                Ok(()) => break Ok(()),
                Err(e) if e.is_fatal() => break Err(e),
                Err(_) => {
                    cursor.rewind(mark);
                    break Ok(());
                }
            }
        };
        self.quiet -= 1;
        self.skip_suspended = false;
        result
    }

    // ---- diagnostics ----

    pub(crate) fn begin_quiet(&mut self) {
        self.quiet += 1;
    }

    pub(crate) fn end_quiet(&mut self) {
        self.quiet = self.quiet.saturating_sub(1);
    }

    /// Reports that `describe()` was expected at `position`.
    ///
    /// The furthest report wins. At equal positions a report from a deeper
    /// rule replaces the held one; otherwise the first report stays.
    pub fn expected<D>(&mut self, position: usize, describe: D)
    where
        D: FnOnce() -> String,
    {
        if self.quiet > 0 {
            return;
        }
        let depth = self.rule_stack.len();
        let replace = match &self.furthest {
            None => true,
            Some(held) => {
                position > held.position || (position == held.position && depth > held.depth)
            }
        };
        if replace {
            self.furthest = Some(ErrorRecord {
                position,
                expected: describe(),
                rule: self.rule_stack.last().map(|name| name.to_string()),
                depth,
            });
        }
    }

    /// Renames the held record after a sub-parser that failed without
    /// progressing past `start`.
    pub(crate) fn relabel(&mut self, start: usize, name: &str) {
        if self.quiet > 0 {
            return;
        }
        let depth = self.rule_stack.len();
        let rule = self.rule_stack.last().map(|name| name.to_string());
        match &mut self.furthest {
            Some(held) if held.position == start => {
                held.expected = name.to_string();
                held.rule = rule;
                held.depth = depth;
            }
            Some(_) => {}
            None => {
                self.furthest = Some(ErrorRecord {
                    position: start,
                    expected: name.to_string(),
                    rule,
                    depth,
                })
            }
        }
    }

    pub fn furthest(&self) -> Option<&ErrorRecord> {
        self.furthest.as_ref()
    }

    /// Hands the furthest record to the error handler.
    pub(crate) fn report(&mut self, position: usize, committed: bool) -> (ErrorRecord, Disposition) {
        let record = self
            .furthest
            .clone()
            .unwrap_or_else(|| ErrorRecord::new(position, "valid input"));
        let disposition = self.handler.on_failure(&record, committed);
        (record, disposition)
    }

    // ---- rule frames ----

    pub fn depth(&self) -> usize {
        self.rule_stack.len()
    }

    /// Nesting limit from the [`ParseConfig`](crate::config::ParseConfig).
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn current_rule(&self) -> Option<&'g str> {
        self.rule_stack.last().copied()
    }

    pub(crate) fn set_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) {
        self.cancel = cancel;
    }

    /// Fails with [`ParseError::Cancelled`] once the cancellation flag is set.
    pub fn check_cancelled(&self, position: usize) -> ParseResult<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => {
                debug!(target: "parser::cancel", position, "parse cancelled");
                Err(ParseError::Cancelled { position })
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn enter_rule(&mut self, name: &'g str, position: usize) -> ParseResult<()> {
        self.check_cancelled(position)?;
        if self.rule_stack.len() >= self.max_depth {
            debug!(
                target: "parser::rule",
                rule = name,
                position,
                limit = self.max_depth,
                "nesting depth limit exceeded"
            );
            return Err(ParseError::DepthExceeded {
                limit: self.max_depth,
                position,
            });
        }
        self.rule_stack.push(name);
        if self.trace_rules {
            debug!(target: "parser::rule", rule = name, position, depth = self.rule_stack.len(), "enter");
        } else {
            trace!(target: "parser::rule", rule = name, position, "enter");
        }
        Ok(())
    }

    pub(crate) fn exit_rule(&mut self, position: usize, matched: bool) {
        let name = self.rule_stack.pop().unwrap_or_default();
        if self.trace_rules {
            debug!(target: "parser::rule", rule = name, position, matched, "exit");
        } else {
            trace!(target: "parser::rule", rule = name, position, matched, "exit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::error_handling::Silent;

    struct Depth;
    impl Slot for Depth {
        type Value = u32;
    }

    #[test]
    fn test_slots_shadow_and_restore() {
        let rules = Rules::<char>::new();
        let mut silent = Silent;
        let mut ctx = Context::new(&rules, &mut silent);

        assert_eq!(ctx.slot::<Depth>(), None);
        ctx.push_slot::<Depth>(1);
        ctx.push_slot::<Depth>(2);
        assert_eq!(ctx.slot::<Depth>(), Some(&2));
        if let Some(v) = ctx.slot_mut::<Depth>() {
            *v += 10;
        }
        assert_eq!(ctx.slot::<Depth>(), Some(&12));
        ctx.pop_slot::<Depth>();
        assert_eq!(ctx.slot::<Depth>(), Some(&1));
    }

    #[test]
    fn test_furthest_record_keeps_first_at_same_depth() {
        let rules = Rules::<char>::new();
        let mut silent = Silent;
        let mut ctx = Context::new(&rules, &mut silent);

        ctx.expected(3, || "'a'".to_string());
        ctx.expected(3, || "'b'".to_string());
        ctx.expected(1, || "'c'".to_string());
        assert_eq!(ctx.furthest().map(|r| r.expected.as_str()), Some("'a'"));

        ctx.expected(4, || "'d'".to_string());
        assert_eq!(ctx.furthest().map(|r| r.position), Some(4));
    }

    #[test]
    fn test_deeper_rule_wins_tie() {
        let rules = Rules::<char>::new();
        let mut silent = Silent;
        let mut ctx = Context::new(&rules, &mut silent);

        ctx.expected(2, || "outer".to_string());
        ctx.enter_rule("inner", 2).unwrap();
        ctx.expected(2, || "inner".to_string());
        ctx.exit_rule(2, false);

        let record = ctx.furthest().unwrap();
        assert_eq!(record.expected, "inner");
        assert_eq!(record.rule.as_deref(), Some("inner"));
    }

    #[test]
    fn test_quiet_suppresses_records() {
        let rules = Rules::<char>::new();
        let mut silent = Silent;
        let mut ctx = Context::new(&rules, &mut silent);

        ctx.begin_quiet();
        ctx.expected(9, || "hidden".to_string());
        ctx.end_quiet();
        assert!(ctx.furthest().is_none());
    }

    #[test]
    fn test_depth_limit() {
        let rules = Rules::<char>::new();
        let mut silent = Silent;
        let config = ParseConfig {
            max_depth: 1,
            ..ParseConfig::default()
        };
        let mut ctx = Context::with_config(&rules, &mut silent, &config);

        assert!(ctx.enter_rule("a", 0).is_ok());
        assert_eq!(
            ctx.enter_rule("b", 0),
            Err(ParseError::DepthExceeded {
                limit: 1,
                position: 0
            })
        );
    }

    #[test]
    fn test_cancellation_flag() {
        let rules = Rules::<char>::new();
        let mut silent = Silent;
        let mut ctx = Context::new(&rules, &mut silent);
        let flag = Arc::new(AtomicBool::new(false));
        ctx.set_cancel(Some(flag.clone()));

        assert!(ctx.check_cancelled(0).is_ok());
        flag.store(true, Ordering::Relaxed);
        assert_eq!(
            ctx.check_cancelled(5),
            Err(ParseError::Cancelled { position: 5 })
        );
    }
}
