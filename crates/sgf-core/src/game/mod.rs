//! Game capability trait
//!
//! Everything game-specific the core needs: how points, moves and stones
//! are written, and which extra properties the game defines.

pub mod go;

use std::fmt;

use crate::schema::{ListElement, PrimitiveValue, PropertyEntry, PropertySchema, PropertyValue};

/// A value type a game plugs into the schema (point, move or stone)
pub trait GameValue:
    PrimitiveValue + ListElement + PropertyValue + Clone + PartialEq + fmt::Debug
{
}

impl<T> GameValue for T where
    T: PrimitiveValue + ListElement + PropertyValue + Clone + PartialEq + fmt::Debug
{
}

/// A game the format can record
pub trait Game: Sized + 'static {
    type Point: GameValue;
    type Move: GameValue;
    type Stone: GameValue;

    /// Human-readable name
    const NAME: &'static str;

    /// Value of the `GM` root property for this game
    const GAME_TYPE: i64;

    /// Game-only entries; they shadow general entries with the same identifier
    fn properties() -> Vec<PropertyEntry> {
        Vec::new()
    }

    fn schema() -> PropertySchema {
        PropertySchema::for_game::<Self>()
    }
}

/// Placeholder game for records of unknown type: points, moves and stones
/// are opaque strings, so only game-independent properties are checked.
pub struct AnyGame;

impl Game for AnyGame {
    type Point = String;
    type Move = String;
    type Stone = String;

    const NAME: &'static str = "Any";
    const GAME_TYPE: i64 = 0;
}
