//! Named, recursive rules.
//!
//! Rules are declared first and defined later, which is how mutually
//! recursive grammars are written:
//!
//! ```
//! use kumiki::prelude::*;
//!
//! let mut rules = Rules::<char>::new();
//! let nested = rules.declare::<u32>("nested");
//! rules
//!     .define(nested, alt(seq(lit('('), seq(nested, lit(')'))), attr(0u32)))
//!     .unwrap();
//! let grammar = Grammar::new(rules, nested).unwrap();
//! assert_eq!(grammar.parse_str("((()))").unwrap(), Some(0));
//! ```

use std::any::Any;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU32, Ordering};

use super::context::Context;
use super::core::{BoxedParser, ParseError, ParseResult, Parser};
use super::cursor::{Cursor, Symbol};
use crate::error::ConfigError;

static NEXT_TABLE: AtomicU32 = AtomicU32::new(1);

/// Identity of a rule: its table and its index in that table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId {
    table: u32,
    index: usize,
}

/// Handle to a declared rule producing `O`.
///
/// Handles are plain copies of the rule's identity. Parsing through a handle
/// looks the definition up in the rule table of the running context, so the
/// same handle can be used before and after the rule is defined.
pub struct Rule<O> {
    id: RuleId,
    _output: PhantomData<fn() -> O>,
}

impl RuleId {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<O> Rule<O> {
    pub fn id(&self) -> RuleId {
        self.id
    }
}

impl<O> Clone for Rule<O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<O> Copy for Rule<O> {}

impl<O> std::fmt::Debug for Rule<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("id", &self.id).finish()
    }
}

struct RuleEntry {
    name: String,
    definition: Option<Box<dyn Any + Send + Sync>>,
}

/// Arena of rule definitions.
pub struct Rules<I> {
    table: u32,
    entries: Vec<RuleEntry>,
    _input: PhantomData<fn(I)>,
}

impl<I> Default for Rules<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Rules<I> {
    pub fn new() -> Self {
        Self {
            table: NEXT_TABLE.fetch_add(1, Ordering::Relaxed),
            entries: Vec::new(),
            _input: PhantomData,
        }
    }

    /// Declares a rule without defining it.
    pub fn declare<O: 'static>(&mut self, name: impl Into<String>) -> Rule<O> {
        let index = self.entries.len();
        self.entries.push(RuleEntry {
            name: name.into(),
            definition: None,
        });
        Rule {
            id: RuleId {
                table: self.table,
                index,
            },
            _output: PhantomData,
        }
    }

    pub fn name(&self, id: RuleId) -> Option<&str> {
        self.entry(id).ok().map(|entry| entry.name.as_str())
    }

    pub fn is_defined(&self, id: RuleId) -> bool {
        self.entry(id)
            .map(|entry| entry.definition.is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of declared rules that have no definition yet.
    pub fn undefined(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|entry| entry.definition.is_none())
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Fails if any declared rule is still undefined.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let names = self.undefined();
        if names.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Incomplete {
                names: names.into_iter().map(str::to_string).collect(),
            })
        }
    }

    /// Whether `id` was declared in this table.
    pub fn owns(&self, id: RuleId) -> bool {
        id.table == self.table && id.index < self.entries.len()
    }

    fn entry(&self, id: RuleId) -> Result<&RuleEntry, ConfigError> {
        if id.table != self.table {
            return Err(ConfigError::ForeignRule { index: id.index });
        }
        self.entries
            .get(id.index)
            .ok_or(ConfigError::ForeignRule { index: id.index })
    }
}

impl<I: Symbol> Rules<I> {
    /// Binds `parser` as the definition of `rule`. A rule is defined once.
    pub fn define<O, P>(&mut self, rule: Rule<O>, parser: P) -> Result<(), ConfigError>
    where
        O: 'static,
        P: Parser<I, O> + Send + Sync + 'static,
    {
        if rule.id.table != self.table {
            return Err(ConfigError::ForeignRule {
                index: rule.id.index,
            });
        }
        let entry = self
            .entries
            .get_mut(rule.id.index)
            .ok_or(ConfigError::ForeignRule {
                index: rule.id.index,
            })?;
        if entry.definition.is_some() {
            return Err(ConfigError::AlreadyDefined {
                name: entry.name.clone(),
            });
        }
        let boxed: BoxedParser<I, O> = Box::new(parser);
        entry.definition = Some(Box::new(boxed));
        tracing::trace!(target: "parser::rule", rule = %entry.name, "defined");
        Ok(())
    }

    fn resolve<O: 'static>(&self, rule: Rule<O>) -> Result<(&str, &BoxedParser<I, O>), ConfigError> {
        let entry = self.entry(rule.id)?;
        let definition = entry
            .definition
            .as_ref()
            .ok_or_else(|| ConfigError::Undefined {
                name: entry.name.clone(),
            })?;
        let parser = definition
            .downcast_ref::<BoxedParser<I, O>>()
            .ok_or_else(|| ConfigError::TypeMismatch {
                name: entry.name.clone(),
            })?;
        Ok((entry.name.as_str(), parser))
    }
}

impl<I, O> Parser<I, O> for Rule<O>
where
    I: Symbol,
    O: 'static,
{
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<O> {
        let rules = ctx.rules();
        let (name, definition) = rules.resolve(*self).map_err(ParseError::Config)?;
        let start = cursor.position();
        ctx.enter_rule(name, start)?;
        let result = definition.parse(cursor, ctx);
        ctx.exit_rule(cursor.position(), result.is_ok());
        if matches!(result, Err(ParseError::Mismatch | ParseError::Committed)) {
            ctx.relabel(start, name);
        }
        result
    }
}
