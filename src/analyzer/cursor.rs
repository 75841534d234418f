use std::fmt;

/// An element of the input sequence.
///
/// Text grammars run over `char`, byte grammars over `u8`. Literals and
/// character classes are written as `char` and compared through
/// [`Symbol::to_char`], so both alphabets share the same primitives.
pub trait Symbol: Copy + PartialEq + PartialOrd + fmt::Debug + Send + Sync + 'static {
    fn to_char(self) -> char;
}

impl Symbol for char {
    fn to_char(self) -> char {
        self
    }
}

impl Symbol for u8 {
    fn to_char(self) -> char {
        char::from(self)
    }
}

/// Half-open range `[start, end)` of input positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The matched elements of `input`. Out-of-range spans yield an empty slice.
    pub fn slice<'a, I>(&self, input: &'a [I]) -> &'a [I] {
        input.get(self.start..self.end).unwrap_or(&[])
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Saved cursor position, restored with [`Cursor::rewind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Mark(usize);

impl Mark {
    pub fn position(self) -> usize {
        self.0
    }
}

/// Read position over a borrowed input slice.
///
/// Every parser receives the cursor mutably; on failure it must leave the
/// cursor where it found it, which is what [`Cursor::mark`] and
/// [`Cursor::rewind`] are for.
#[derive(Debug, Clone)]
pub struct Cursor<'a, I> {
    input: &'a [I],
    pos: usize,
}

impl<'a, I> Cursor<'a, I> {
    pub fn new(input: &'a [I]) -> Self {
        Self { input, pos: 0 }
    }

    pub fn at(input: &'a [I], pos: usize) -> Self {
        Self {
            input,
            pos: pos.min(input.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn mark(&self) -> Mark {
        Mark(self.pos)
    }

    pub fn rewind(&mut self, mark: Mark) {
        self.pos = mark.0;
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Moves forward by `n`, clamped to the end of input.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    pub fn remaining(&self) -> &'a [I] {
        &self.input[self.pos..]
    }

    pub fn input(&self) -> &'a [I] {
        self.input
    }

    pub fn span_from(&self, mark: Mark) -> Span {
        Span::new(mark.0, self.pos)
    }
}

impl<'a, I: Copy> Cursor<'a, I> {
    pub fn peek(&self) -> Option<I> {
        self.input.get(self.pos).copied()
    }

    pub fn peek_at(&self, offset: usize) -> Option<I> {
        self.input.get(self.pos + offset).copied()
    }

    /// Consumes and returns the next element.
    pub fn bump(&mut self) -> Option<I> {
        let next = self.peek()?;
        self.pos += 1;
        Some(next)
    }
}
