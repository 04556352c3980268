//! Typed property values
//!
//! Conversion between raw [`ComposedValue`]s and Rust values happens in three
//! layers:
//!
//! - [`PrimitiveValue`]: one raw string (or absent) ↔ one value
//! - [`ListElement`]: the content of one `[...]` ↔ one value
//! - [`PropertyValue`]: all values of a property ↔ one value
//!
//! Primitive types get the upper two layers from [`impl_property_value!`];
//! the combinators ([`Compose`], [`List`], [`EList`], [`Union`]) implement
//! them by hand.

use crate::ast::ComposedValue;

/// A value stored as a single raw string
pub trait PrimitiveValue: Sized {
    fn from_primitive(raw: Option<&str>) -> Option<Self>;

    /// `None` is written as an empty value
    fn to_primitive(&self) -> Option<String>;
}

/// A value occupying one `[...]`
pub trait ListElement: Sized {
    fn from_value(value: &ComposedValue) -> Option<Self>;
    fn to_value(&self) -> ComposedValue;
}

/// The typed form of a property's whole value list
pub trait PropertyValue: Sized {
    fn from_values(values: &[ComposedValue]) -> Option<Self>;
    fn to_values(&self) -> Vec<ComposedValue>;
}

/// Implements [`ListElement`] and [`PropertyValue`] for types that already
/// implement [`PrimitiveValue`], treating them as a single uncomposed value.
#[macro_export]
macro_rules! impl_property_value {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::schema::ListElement for $ty {
            fn from_value(value: &$crate::ast::ComposedValue) -> Option<Self> {
                match value {
                    $crate::ast::ComposedValue::Single(raw) => {
                        <$ty as $crate::schema::PrimitiveValue>::from_primitive(raw.as_deref())
                    }
                    $crate::ast::ComposedValue::Compose(..) => None,
                }
            }

            fn to_value(&self) -> $crate::ast::ComposedValue {
                $crate::ast::ComposedValue::Single(
                    <$ty as $crate::schema::PrimitiveValue>::to_primitive(self),
                )
            }
        }

        impl $crate::schema::PropertyValue for $ty {
            fn from_values(values: &[$crate::ast::ComposedValue]) -> Option<Self> {
                <$ty as $crate::schema::ListElement>::from_value(values.first()?)
            }

            fn to_values(&self) -> Vec<$crate::ast::ComposedValue> {
                vec![<$ty as $crate::schema::ListElement>::to_value(self)]
            }
        }
    )+};
}

// ── Primitive parsing ─────────────────────────────────────

fn split_sign(raw: &str) -> &str {
    raw.strip_prefix('+')
        .or_else(|| raw.strip_prefix('-'))
        .unwrap_or(raw)
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `[+-]digits`
pub fn parse_number(raw: &str) -> Option<i64> {
    if !all_digits(split_sign(raw)) {
        return None;
    }
    raw.strip_prefix('+').unwrap_or(raw).parse().ok()
}

/// `[+-]digits[.digits]`
pub fn parse_real(raw: &str) -> Option<f64> {
    let unsigned = split_sign(raw);
    let valid = match unsigned.split_once('.') {
        Some((whole, fraction)) => all_digits(whole) && all_digits(fraction),
        None => all_digits(unsigned),
    };
    if !valid {
        return None;
    }
    raw.strip_prefix('+').unwrap_or(raw).parse().ok()
}

fn format_real(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ── Primitive types ───────────────────────────────────────

impl PrimitiveValue for i64 {
    fn from_primitive(raw: Option<&str>) -> Option<Self> {
        parse_number(raw?)
    }

    fn to_primitive(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// A finite real number; NaN and the infinities have no written form
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Real(f64);

impl Real {
    pub fn new(value: f64) -> Option<Self> {
        value.is_finite().then_some(Real(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<Real> for f64 {
    fn from(real: Real) -> f64 {
        real.0
    }
}

impl TryFrom<f64> for Real {
    type Error = f64;

    fn try_from(value: f64) -> Result<Self, f64> {
        Real::new(value).ok_or(value)
    }
}

impl PrimitiveValue for Real {
    fn from_primitive(raw: Option<&str>) -> Option<Self> {
        parse_real(raw?).and_then(Real::new)
    }

    fn to_primitive(&self) -> Option<String> {
        Some(format_real(self.0))
    }
}

impl PrimitiveValue for String {
    fn from_primitive(raw: Option<&str>) -> Option<Self> {
        Some(raw.unwrap_or_default().to_string())
    }

    fn to_primitive(&self) -> Option<String> {
        Some(self.clone())
    }
}

/// The `Double` type: normal or emphasized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emphasis {
    Normal,
    Emphasized,
}

impl PrimitiveValue for Emphasis {
    fn from_primitive(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "1" => Some(Emphasis::Normal),
            "2" => Some(Emphasis::Emphasized),
            _ => None,
        }
    }

    fn to_primitive(&self) -> Option<String> {
        let raw = match self {
            Emphasis::Normal => "1",
            Emphasis::Emphasized => "2",
        };
        Some(raw.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl PrimitiveValue for Color {
    fn from_primitive(raw: Option<&str>) -> Option<Self> {
        match raw? {
            "B" => Some(Color::Black),
            "W" => Some(Color::White),
            _ => None,
        }
    }

    fn to_primitive(&self) -> Option<String> {
        let raw = match self {
            Color::Black => "B",
            Color::White => "W",
        };
        Some(raw.to_string())
    }
}

/// The `None` type: an empty value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Empty;

impl PrimitiveValue for Empty {
    fn from_primitive(raw: Option<&str>) -> Option<Self> {
        match raw {
            None | Some("") => Some(Empty),
            Some(_) => None,
        }
    }

    fn to_primitive(&self) -> Option<String> {
        None
    }
}

crate::impl_property_value!(i64, Real, Emphasis, Color, Empty);

// Text may carry an unescaped ':' which the lexer splits; rejoin it here.
impl ListElement for String {
    fn from_value(value: &ComposedValue) -> Option<Self> {
        match value {
            ComposedValue::Single(raw) => String::from_primitive(raw.as_deref()),
            ComposedValue::Compose(first, second) => Some(format!(
                "{}:{}",
                first.as_deref().unwrap_or_default(),
                second.as_deref().unwrap_or_default()
            )),
        }
    }

    fn to_value(&self) -> ComposedValue {
        ComposedValue::Single(self.to_primitive())
    }
}

impl PropertyValue for String {
    fn from_values(values: &[ComposedValue]) -> Option<Self> {
        String::from_value(values.first()?)
    }

    fn to_values(&self) -> Vec<ComposedValue> {
        vec![self.to_value()]
    }
}

// ── Combinators ───────────────────────────────────────────

/// A `first:second` pair
#[derive(Debug, Clone, PartialEq)]
pub struct Compose<A, B> {
    pub first: A,
    pub second: B,
}

impl<A, B> Compose<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Compose { first, second }
    }
}

impl<A: PrimitiveValue, B: PrimitiveValue> ListElement for Compose<A, B> {
    fn from_value(value: &ComposedValue) -> Option<Self> {
        match value {
            ComposedValue::Compose(first, second) => Some(Compose {
                first: A::from_primitive(first.as_deref())?,
                second: B::from_primitive(second.as_deref())?,
            }),
            ComposedValue::Single(_) => None,
        }
    }

    fn to_value(&self) -> ComposedValue {
        ComposedValue::Compose(self.first.to_primitive(), self.second.to_primitive())
    }
}

impl<A: PrimitiveValue, B: PrimitiveValue> PropertyValue for Compose<A, B> {
    fn from_values(values: &[ComposedValue]) -> Option<Self> {
        Self::from_value(values.first()?)
    }

    fn to_values(&self) -> Vec<ComposedValue> {
        vec![self.to_value()]
    }
}

/// One or more values
#[derive(Debug, Clone, PartialEq)]
pub struct List<T>(pub Vec<T>);

impl<T: ListElement> PropertyValue for List<T> {
    fn from_values(values: &[ComposedValue]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values
            .iter()
            .map(T::from_value)
            .collect::<Option<Vec<_>>>()
            .map(List)
    }

    fn to_values(&self) -> Vec<ComposedValue> {
        self.0.iter().map(ListElement::to_value).collect()
    }
}

/// Zero or more values; the empty list is written as `[]`
#[derive(Debug, Clone, PartialEq)]
pub struct EList<T>(pub Vec<T>);

impl<T: ListElement> PropertyValue for EList<T> {
    fn from_values(values: &[ComposedValue]) -> Option<Self> {
        if let Some(List(items)) = List::<T>::from_values(values) {
            return Some(EList(items));
        }
        match values {
            [] => Some(EList(Vec::new())),
            [single] => Empty::from_value(single).map(|_| EList(Vec::new())),
            _ => None,
        }
    }

    fn to_values(&self) -> Vec<ComposedValue> {
        if self.0.is_empty() {
            vec![ComposedValue::Single(None)]
        } else {
            self.0.iter().map(ListElement::to_value).collect()
        }
    }
}

/// A value of one of two types; reading tries `First` before `Second`
#[derive(Debug, Clone, PartialEq)]
pub enum Union<A, B> {
    First(A),
    Second(B),
}

impl<A: PropertyValue, B: PropertyValue> PropertyValue for Union<A, B> {
    fn from_values(values: &[ComposedValue]) -> Option<Self> {
        A::from_values(values)
            .map(Union::First)
            .or_else(|| B::from_values(values).map(Union::Second))
    }

    fn to_values(&self) -> Vec<ComposedValue> {
        match self {
            Union::First(a) => a.to_values(),
            Union::Second(b) => b.to_values(),
        }
    }
}
