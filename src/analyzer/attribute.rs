//! Attribute composition for sequences.
//!
//! Every attribute type carries a [`Attribute::Kind`]: [`UnitKind`] for `()`
//! and [`ValueKind`] for everything else. A sequence joins the attributes of
//! its two halves through [`Join`], which drops unit sides:
//!
//! | left   | right  | joined     |
//! |--------|--------|------------|
//! | `()`   | `()`   | `()`       |
//! | `()`   | `R`    | `R`        |
//! | `L`    | `()`   | `L`        |
//! | `L`    | `R`    | `(L, R)`   |
//!
//! User AST types opt in with [`impl_attribute!`](crate::impl_attribute).

use std::collections::{BTreeMap, HashMap};

use super::cursor::Span;

/// Marker kind of the unit attribute.
pub struct UnitKind;

/// Marker kind of every value-carrying attribute.
pub struct ValueKind;

pub trait Attribute {
    type Kind;
}

impl Attribute for () {
    type Kind = UnitKind;
}

pub trait Join<L, R> {
    type Output: Attribute;

    fn join(left: L, right: R) -> Self::Output;
}

impl Join<(), ()> for (UnitKind, UnitKind) {
    type Output = ();

    fn join(_: (), _: ()) -> Self::Output {}
}

impl<R: Attribute> Join<(), R> for (UnitKind, ValueKind) {
    type Output = R;

    fn join(_: (), right: R) -> Self::Output {
        right
    }
}

impl<L: Attribute> Join<L, ()> for (ValueKind, UnitKind) {
    type Output = L;

    fn join(left: L, _: ()) -> Self::Output {
        left
    }
}

impl<L, R> Join<L, R> for (ValueKind, ValueKind) {
    type Output = (L, R);

    fn join(left: L, right: R) -> Self::Output {
        (left, right)
    }
}

/// Attribute of a two-element sequence.
pub type Joined<L, R> =
    <(<L as Attribute>::Kind, <R as Attribute>::Kind) as Join<L, R>>::Output;

/// Declares types as value-carrying attributes.
///
/// ```
/// #[derive(Debug, Clone)]
/// struct Ident(String);
/// kumiki::impl_attribute!(Ident);
/// ```
#[macro_export]
macro_rules! impl_attribute {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::analyzer::attribute::Attribute for $ty {
                type Kind = $crate::analyzer::attribute::ValueKind;
            }
        )+
    };
}

crate::impl_attribute!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64,
    String, Span, serde_json::Value,
    serde_json::Map<String, serde_json::Value>
);

impl<T> Attribute for Vec<T> {
    type Kind = ValueKind;
}

impl<T> Attribute for Option<T> {
    type Kind = ValueKind;
}

impl<T> Attribute for Box<T> {
    type Kind = ValueKind;
}

impl<K, V, S> Attribute for HashMap<K, V, S> {
    type Kind = ValueKind;
}

impl<K, V> Attribute for BTreeMap<K, V> {
    type Kind = ValueKind;
}

impl<A, B> Attribute for (A, B) {
    type Kind = ValueKind;
}

impl<A, B, C> Attribute for (A, B, C) {
    type Kind = ValueKind;
}

impl<A, B, C, D> Attribute for (A, B, C, D) {
    type Kind = ValueKind;
}

/// Attribute of a heterogeneous alternation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R> Attribute for Either<L, R> {
    type Kind = ValueKind;
}

impl<T> Either<T, T> {
    pub fn into_inner(self) -> T {
        match self {
            Either::Left(value) | Either::Right(value) => value,
        }
    }
}

impl<L, R> Either<L, R> {
    pub fn left(self) -> Option<L> {
        match self {
            Either::Left(value) => Some(value),
            Either::Right(_) => None,
        }
    }

    pub fn right(self) -> Option<R> {
        match self {
            Either::Left(_) => None,
            Either::Right(value) => Some(value),
        }
    }
}
