//! # Numeric Parsers
//!
//! Integer parsers accumulate with checked arithmetic in the target type, so
//! out-of-range input is an ordinary mismatch rather than a wrapped value.
//! Real numbers are scanned lexically and converted with [`str::parse`];
//! results that overflow to infinity are rejected as well.

use std::marker::PhantomData;
use std::str::FromStr;

use super::context::Context;
use super::core::{ParseError, ParseResult, Parser};
use super::cursor::{Cursor, Symbol};
use crate::error::ConfigError;

/// Integer types the numeric parsers can produce.
pub trait Integral: Copy + Send + Sync + 'static {
    const ZERO: Self;

    fn checked_mul_small(self, n: u32) -> Option<Self>;
    fn checked_add_small(self, n: u32) -> Option<Self>;
    fn checked_sub_small(self, n: u32) -> Option<Self>;
}

macro_rules! impl_integral {
    ($($ty:ty),+) => {
        $(
            impl Integral for $ty {
                const ZERO: Self = 0;

                fn checked_mul_small(self, n: u32) -> Option<Self> {
                    <$ty>::try_from(n).ok().and_then(|n| self.checked_mul(n))
                }

                fn checked_add_small(self, n: u32) -> Option<Self> {
                    <$ty>::try_from(n).ok().and_then(|n| self.checked_add(n))
                }

                fn checked_sub_small(self, n: u32) -> Option<Self> {
                    <$ty>::try_from(n).ok().and_then(|n| self.checked_sub(n))
                }
            }
        )+
    };
}

impl_integral!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Reads between `min` and `max` digits. `None` on too few digits or overflow.
fn scan_digits<I: Symbol, T: Integral>(
    cursor: &mut Cursor<'_, I>,
    radix: u32,
    min: usize,
    max: usize,
    negative: bool,
) -> Option<T> {
    let mut value = T::ZERO;
    let mut count = 0;
    while count < max {
        let Some(digit) = cursor.peek().and_then(|s| s.to_char().to_digit(radix)) else {
            break;
        };
        value = value.checked_mul_small(radix)?;
        value = if negative {
            value.checked_sub_small(digit)?
        } else {
            value.checked_add_small(digit)?
        };
        cursor.bump();
        count += 1;
    }
    (count >= min).then_some(value)
}

fn radix_name(radix: u32) -> &'static str {
    match radix {
        2 => "binary digits",
        8 => "octal digits",
        16 => "hexadecimal digits",
        _ => "digits",
    }
}

/// Unsigned integer in a fixed radix.
#[derive(Debug, Clone, Copy)]
pub struct UInt<T> {
    radix: u32,
    min_digits: usize,
    max_digits: usize,
    _output: PhantomData<fn() -> T>,
}

impl<T> UInt<T> {
    pub fn new(radix: u32) -> Result<Self, ConfigError> {
        if !(2..=36).contains(&radix) {
            return Err(ConfigError::InvalidRadix { radix });
        }
        Ok(Self::with_radix(radix))
    }

    /// Radices the prelude constructors know to be valid.
    pub(crate) const fn with_radix(radix: u32) -> Self {
        Self {
            radix,
            min_digits: 1,
            max_digits: usize::MAX,
            _output: PhantomData,
        }
    }

    /// Restricts the digit count; `digits(4, 4)` reads exactly four.
    pub fn digits(mut self, min: usize, max: usize) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidBounds { min, max });
        }
        self.min_digits = min;
        self.max_digits = max;
        Ok(self)
    }
}

impl<I: Symbol, T: Integral> Parser<I, T> for UInt<T> {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<T> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        let start = cursor.position();
        match scan_digits(cursor, self.radix, self.min_digits, self.max_digits, false) {
            Some(value) => Ok(value),
            None => {
                ctx.expected(start, || radix_name(self.radix).to_string());
                cursor.rewind(mark);
                Err(ParseError::Mismatch)
            }
        }
    }
}

/// Optionally signed decimal integer.
#[derive(Debug, Clone, Copy)]
pub struct Int<T> {
    _output: PhantomData<fn() -> T>,
}

impl<T> Int<T> {
    pub fn new() -> Self {
        Self {
            _output: PhantomData,
        }
    }
}

impl<T> Default for Int<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Symbol, T: Integral> Parser<I, T> for Int<T> {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<T> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        let start = cursor.position();
        let negative = match cursor.peek().map(Symbol::to_char) {
            Some('-') => {
                cursor.bump();
                true
            }
            Some('+') => {
                cursor.bump();
                false
            }
            _ => false,
        };
        match scan_digits(cursor, 10, 1, usize::MAX, negative) {
            Some(value) => Ok(value),
            None => {
                ctx.expected(start, || "integer".to_string());
                cursor.rewind(mark);
                Err(ParseError::Mismatch)
            }
        }
    }
}

/// Floating-point types the real parser can produce.
pub trait FloatValue: FromStr + Copy + Send + Sync + 'static {
    fn is_finite_value(self) -> bool;
}

impl FloatValue for f32 {
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

impl FloatValue for f64 {
    fn is_finite_value(self) -> bool {
        self.is_finite()
    }
}

/// Real number: `[+-] digits [. digits] [(e|E) [+-] digits]`.
///
/// Either side of the decimal point may be empty, not both. In strict mode
/// the decimal point is required, so plain integers do not match.
#[derive(Debug, Clone, Copy)]
pub struct Float<T> {
    strict: bool,
    _output: PhantomData<fn() -> T>,
}

impl<T> Float<T> {
    pub fn new() -> Self {
        Self {
            strict: false,
            _output: PhantomData,
        }
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }
}

impl<T> Default for Float<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn take_digits<I: Symbol>(cursor: &mut Cursor<'_, I>, text: &mut String) -> usize {
    let mut count = 0;
    while let Some(c) = cursor.peek().map(Symbol::to_char).filter(char::is_ascii_digit) {
        text.push(c);
        cursor.bump();
        count += 1;
    }
    count
}

impl<T> Float<T> {
    fn scan<I: Symbol>(&self, cursor: &mut Cursor<'_, I>) -> Option<String> {
        let mut text = String::new();
        if let Some(sign) = cursor.peek().map(Symbol::to_char).filter(|c| *c == '+' || *c == '-') {
            text.push(sign);
            cursor.bump();
        }
        let whole = take_digits(cursor, &mut text);
        let mut fraction = 0;
        let dot = cursor.peek().map(Symbol::to_char) == Some('.');
        if dot {
            text.push('.');
            cursor.bump();
            fraction = take_digits(cursor, &mut text);
        }
        if whole + fraction == 0 || (self.strict && !dot) {
            return None;
        }
        if let Some(e) = cursor.peek().map(Symbol::to_char).filter(|c| *c == 'e' || *c == 'E') {
            let before = cursor.mark();
            let len = text.len();
            text.push(e);
            cursor.bump();
            if let Some(sign) = cursor.peek().map(Symbol::to_char).filter(|c| *c == '+' || *c == '-') {
                text.push(sign);
                cursor.bump();
            }
            if take_digits(cursor, &mut text) == 0 {
                cursor.rewind(before);
                text.truncate(len);
            }
        }
        Some(text)
    }
}

impl<I: Symbol, T: FloatValue> Parser<I, T> for Float<T> {
    fn parse(&self, cursor: &mut Cursor<'_, I>, ctx: &mut Context<'_, I>) -> ParseResult<T> {
        let mark = cursor.mark();
        ctx.skip(cursor)?;
        let start = cursor.position();
        let value = self
            .scan(cursor)
            .and_then(|text| text.parse::<T>().ok())
            .filter(|value| value.is_finite_value());
        match value {
            Some(value) => Ok(value),
            None => {
                ctx.expected(start, || "real number".to_string());
                cursor.rewind(mark);
                Err(ParseError::Mismatch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::driver::{parse_str, prefix_parse};

    #[test]
    fn test_uint() {
        assert_eq!(parse_str("12345", &UInt::<u32>::new(10).unwrap()).unwrap(), Some(12345));
        assert_eq!(parse_str("ff", &UInt::<u8>::new(16).unwrap()).unwrap(), Some(255));
        assert_eq!(parse_str("777", &UInt::<u16>::new(8).unwrap()).unwrap(), Some(511));
        assert_eq!(parse_str("-1", &UInt::<u32>::new(10).unwrap()).unwrap(), None);
    }

    #[test]
    fn test_uint_overflow_is_a_mismatch() {
        // u8 の範囲外
        assert_eq!(parse_str("256", &UInt::<u8>::new(10).unwrap()).unwrap(), None);
        assert_eq!(parse_str("255", &UInt::<u8>::new(10).unwrap()).unwrap(), Some(255));
        assert_eq!(
            parse_str("99999999999999999999", &UInt::<u64>::new(10).unwrap()).unwrap(),
            None
        );
    }

    #[test]
    fn test_fixed_digit_count() {
        let hex4 = UInt::<u32>::new(16).unwrap().digits(4, 4).unwrap();
        let chars: Vec<char> = "00e9f".chars().collect();
        let outcome = prefix_parse(&chars, &hex4).unwrap();
        assert_eq!(outcome.value, Some(0xe9));
        assert_eq!(outcome.consumed, 4);
        assert_eq!(parse_str("0e9", &hex4).unwrap(), None);
    }

    #[test]
    fn test_invalid_uint_configuration() {
        assert!(matches!(
            UInt::<u32>::new(40),
            Err(ConfigError::InvalidRadix { radix: 40 })
        ));
        assert!(matches!(UInt::<u32>::new(1), Err(ConfigError::InvalidRadix { radix: 1 })));
        assert!(UInt::<u32>::new(36).is_ok());
        assert!(matches!(
            UInt::<u32>::new(16).unwrap().digits(4, 2),
            Err(ConfigError::InvalidBounds { min: 4, max: 2 })
        ));
    }

    #[test]
    fn test_zero_minimum_digits() {
        // 数字が無くてもゼロとして成功する
        let optional = UInt::<u32>::new(10).unwrap().digits(0, 3).unwrap();
        let chars: Vec<char> = "x".chars().collect();
        let outcome = prefix_parse(&chars, &optional).unwrap();
        assert_eq!(outcome.value, Some(0));
        assert_eq!(outcome.consumed, 0);
        assert_eq!(parse_str("1234", &optional).unwrap(), None);
    }

    #[test]
    fn test_int_bounds() {
        assert_eq!(parse_str("-128", &Int::<i8>::new()).unwrap(), Some(-128));
        assert_eq!(parse_str("+127", &Int::<i8>::new()).unwrap(), Some(127));
        assert_eq!(parse_str("128", &Int::<i8>::new()).unwrap(), None);
        assert_eq!(parse_str("-", &Int::<i32>::new()).unwrap(), None);
    }

    #[test]
    fn test_float_forms() {
        let real = Float::<f64>::new();
        assert_eq!(parse_str("1.5", &real).unwrap(), Some(1.5));
        assert_eq!(parse_str("-.5", &real).unwrap(), Some(-0.5));
        assert_eq!(parse_str("2.", &real).unwrap(), Some(2.0));
        assert_eq!(parse_str("1e3", &real).unwrap(), Some(1000.0));
        assert_eq!(parse_str("42", &real).unwrap(), Some(42.0));
        assert_eq!(parse_str(".", &real).unwrap(), None);
    }

    #[test]
    fn test_float_exponent_without_digits_is_left_unconsumed() {
        let chars: Vec<char> = "3e+x".chars().collect();
        let outcome = prefix_parse(&chars, &Float::<f64>::new()).unwrap();
        assert_eq!(outcome.value, Some(3.0));
        assert_eq!(outcome.consumed, 1);
    }

    #[test]
    fn test_strict_float_requires_a_dot() {
        let strict = Float::<f64>::new().strict();
        assert_eq!(parse_str("10", &strict).unwrap(), None);
        assert_eq!(parse_str("10.25", &strict).unwrap(), Some(10.25));
    }

    #[test]
    fn test_float_overflow() {
        assert_eq!(parse_str("1e39", &Float::<f32>::new()).unwrap(), None);
        assert_eq!(parse_str("1e39", &Float::<f64>::new()).unwrap(), Some(1e39));
    }
}
