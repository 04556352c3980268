//! Go (`GM[1]`)
//!
//! Points are two letters, column then row: `a`–`z` for 1–26 and `A`–`Z`
//! for 27–52. An empty move value is a pass.

use std::fmt;

use crate::schema::{
    Definition, EList, PrimitiveValue, PropertyEntry, Primitive, Real, TypeSpec,
};

use super::Game;

/// Largest coordinate a letter can encode
pub const MAX_COORDINATE: u8 = 52;

pub struct Go;

impl Game for Go {
    type Point = GoPoint;
    type Move = GoMove;
    type Stone = GoPoint;

    const NAME: &'static str = "Go";
    const GAME_TYPE: i64 = 1;

    fn properties() -> Vec<PropertyEntry> {
        vec![
            PropertyEntry::new("TB", TypeSpec::elist(Primitive::Point)),
            PropertyEntry::new("TW", TypeSpec::elist(Primitive::Point)),
            PropertyEntry::new("HA", TypeSpec::Single(Primitive::Number)),
            PropertyEntry::new("KM", TypeSpec::Single(Primitive::Real)),
        ]
    }
}

pub const TERRITORY_BLACK: Definition<EList<GoPoint>> = Definition::new("TB");
pub const TERRITORY_WHITE: Definition<EList<GoPoint>> = Definition::new("TW");
pub const HANDICAP: Definition<i64> = Definition::new("HA");
pub const KOMI: Definition<Real> = Definition::new("KM");

// ── Coordinates ───────────────────────────────────────────

fn decode(letter: char) -> Option<u8> {
    match letter {
        'a'..='z' => Some(letter as u8 - b'a' + 1),
        'A'..='Z' => Some(letter as u8 - b'A' + 27),
        _ => None,
    }
}

fn encode(coordinate: u8) -> char {
    match coordinate {
        1..=26 => (b'a' + coordinate - 1) as char,
        _ => (b'A' + coordinate - 27) as char,
    }
}

/// A board intersection, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GoPoint {
    column: u8,
    row: u8,
}

impl GoPoint {
    /// `None` unless both coordinates are in `1..=52`
    pub fn new(column: u8, row: u8) -> Option<Self> {
        let valid = |c: u8| (1..=MAX_COORDINATE).contains(&c);
        if valid(column) && valid(row) {
            Some(GoPoint { column, row })
        } else {
            None
        }
    }

    pub fn column(&self) -> u8 {
        self.column
    }

    pub fn row(&self) -> u8 {
        self.row
    }
}

impl fmt::Display for GoPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", encode(self.column), encode(self.row))
    }
}

impl PrimitiveValue for GoPoint {
    fn from_primitive(raw: Option<&str>) -> Option<Self> {
        let mut letters = raw?.chars();
        let column = decode(letters.next()?)?;
        let row = decode(letters.next()?)?;
        if letters.next().is_some() {
            return None;
        }
        GoPoint::new(column, row)
    }

    fn to_primitive(&self) -> Option<String> {
        Some(self.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoMove {
    Play(GoPoint),
    Pass,
}

impl PrimitiveValue for GoMove {
    fn from_primitive(raw: Option<&str>) -> Option<Self> {
        match raw {
            None | Some("") => Some(GoMove::Pass),
            Some(_) => GoPoint::from_primitive(raw).map(GoMove::Play),
        }
    }

    fn to_primitive(&self) -> Option<String> {
        match self {
            GoMove::Play(point) => point.to_primitive(),
            GoMove::Pass => None,
        }
    }
}

crate::impl_property_value!(GoPoint, GoMove);
