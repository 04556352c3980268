//! Typed handles for well-known properties
//!
//! A [`Definition`] pairs an identifier with the Rust type of its value so
//! the tree model can read and write properties without string plumbing.
//! Game-independent properties are constants; properties whose value type
//! depends on the game are generic functions.

use std::fmt;
use std::marker::PhantomData;

use crate::ast::Property;
use crate::game::Game;

use super::value::{Color, Compose, EList, Emphasis, Empty, List, PropertyValue, Real, Union};

/// Identifier plus value type of a property
pub struct Definition<V> {
    name: &'static str,
    inherit: bool,
    _value: PhantomData<fn() -> V>,
}

impl<V> Definition<V> {
    pub const fn new(name: &'static str) -> Self {
        Definition {
            name,
            inherit: false,
            _value: PhantomData,
        }
    }

    /// A definition whose value is inherited from ancestors when absent
    pub const fn inherited(name: &'static str) -> Self {
        Definition {
            name,
            inherit: true,
            _value: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn inherits(&self) -> bool {
        self.inherit
    }
}

impl<V> Clone for Definition<V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Definition<V> {}

impl<V> fmt::Debug for Definition<V> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("inherit", &self.inherit)
            .finish()
    }
}

impl Property {
    /// Raw property holding `value` under the definition's identifier
    pub fn from_definition<V: PropertyValue>(definition: &Definition<V>, value: &V) -> Self {
        Property::new(definition.name(), value.to_values())
    }
}

// ── Move ──────────────────────────────────────────────────

pub fn black<G: Game>() -> Definition<G::Move> {
    Definition::new("B")
}

pub fn white<G: Game>() -> Definition<G::Move> {
    Definition::new("W")
}

pub const BLACK_TIME_LEFT: Definition<Real> = Definition::new("BL");
pub const WHITE_TIME_LEFT: Definition<Real> = Definition::new("WL");
pub const BAD_MOVE: Definition<Emphasis> = Definition::new("BM");
pub const DOUBTFUL: Definition<Empty> = Definition::new("DO");
pub const INTERESTING: Definition<Empty> = Definition::new("IT");
pub const KO: Definition<Empty> = Definition::new("KO");
pub const MOVE_NUMBER: Definition<i64> = Definition::new("MN");
pub const OTHER_MOVES_BLACK: Definition<i64> = Definition::new("OB");
pub const OTHER_MOVES_WHITE: Definition<i64> = Definition::new("OW");
pub const TESUJI: Definition<Emphasis> = Definition::new("TE");

// ── Setup ─────────────────────────────────────────────────

pub fn add_black<G: Game>() -> Definition<List<G::Stone>> {
    Definition::new("AB")
}

pub fn add_white<G: Game>() -> Definition<List<G::Stone>> {
    Definition::new("AW")
}

pub fn add_empty<G: Game>() -> Definition<List<G::Point>> {
    Definition::new("AE")
}

pub const PLAYER_TO_PLAY: Definition<Color> = Definition::new("PL");

// ── Annotation and markup ─────────────────────────────────

pub const COMMENT: Definition<String> = Definition::new("C");
pub const NODE_NAME: Definition<String> = Definition::new("N");
pub const VALUE: Definition<Real> = Definition::new("V");
pub const EVEN_POSITION: Definition<Emphasis> = Definition::new("DM");
pub const GOOD_FOR_BLACK: Definition<Emphasis> = Definition::new("GB");
pub const GOOD_FOR_WHITE: Definition<Emphasis> = Definition::new("GW");
pub const HOTSPOT: Definition<Emphasis> = Definition::new("HO");
pub const UNCLEAR: Definition<Emphasis> = Definition::new("UC");
pub const PRINT_MOVE_MODE: Definition<i64> = Definition::inherited("PM");
pub const FIGURE: Definition<Union<Empty, Compose<i64, String>>> = Definition::new("FG");

pub fn arrows<G: Game>() -> Definition<List<Compose<G::Point, G::Point>>> {
    Definition::new("AR")
}

pub fn lines<G: Game>() -> Definition<List<Compose<G::Point, G::Point>>> {
    Definition::new("LN")
}

pub fn labels<G: Game>() -> Definition<List<Compose<G::Point, String>>> {
    Definition::new("LB")
}

pub fn circles<G: Game>() -> Definition<List<G::Point>> {
    Definition::new("CR")
}

pub fn marks<G: Game>() -> Definition<List<G::Point>> {
    Definition::new("MA")
}

pub fn selected<G: Game>() -> Definition<List<G::Point>> {
    Definition::new("SL")
}

pub fn squares<G: Game>() -> Definition<List<G::Point>> {
    Definition::new("SQ")
}

pub fn triangles<G: Game>() -> Definition<List<G::Point>> {
    Definition::new("TR")
}

pub fn dim_points<G: Game>() -> Definition<EList<G::Point>> {
    Definition::inherited("DD")
}

pub fn view<G: Game>() -> Definition<EList<G::Point>> {
    Definition::inherited("VW")
}

// ── Root ──────────────────────────────────────────────────

pub const APPLICATION: Definition<Compose<String, i64>> = Definition::new("AP");
pub const CHARSET: Definition<String> = Definition::new("CA");
pub const FILE_FORMAT: Definition<i64> = Definition::new("FF");
pub const GAME_TYPE: Definition<i64> = Definition::new("GM");
pub const STYLE: Definition<i64> = Definition::new("ST");
pub const SIZE: Definition<Union<i64, Compose<i64, i64>>> = Definition::new("SZ");

// ── Game info ─────────────────────────────────────────────

pub const ANNOTATOR: Definition<String> = Definition::new("AN");
pub const BLACK_RANK: Definition<String> = Definition::new("BR");
pub const BLACK_TEAM: Definition<String> = Definition::new("BT");
pub const COPYRIGHT: Definition<String> = Definition::new("CP");
pub const DATE: Definition<String> = Definition::new("DT");
pub const EVENT: Definition<String> = Definition::new("EV");
pub const GAME_COMMENT: Definition<String> = Definition::new("GC");
pub const GAME_NAME: Definition<String> = Definition::new("GN");
pub const OPENING: Definition<String> = Definition::new("ON");
pub const OVERTIME: Definition<String> = Definition::new("OT");
pub const PLAYER_BLACK: Definition<String> = Definition::new("PB");
pub const PLACE: Definition<String> = Definition::new("PC");
pub const PLAYER_WHITE: Definition<String> = Definition::new("PW");
pub const RESULT: Definition<String> = Definition::new("RE");
pub const ROUND: Definition<String> = Definition::new("RO");
pub const RULES: Definition<String> = Definition::new("RU");
pub const SOURCE: Definition<String> = Definition::new("SO");
pub const TIME_LIMIT: Definition<Real> = Definition::new("TM");
pub const USER: Definition<String> = Definition::new("US");
pub const WHITE_RANK: Definition<String> = Definition::new("WR");
pub const WHITE_TEAM: Definition<String> = Definition::new("WT");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::go::Go;
    use crate::schema::PropertySchema;

    #[test]
    fn test_definitions_match_schema() {
        let schema = PropertySchema::for_game::<Go>();
        let names_and_inherit = [
            (black::<Go>().name(), black::<Go>().inherits()),
            (add_black::<Go>().name(), add_black::<Go>().inherits()),
            (dim_points::<Go>().name(), dim_points::<Go>().inherits()),
            (view::<Go>().name(), view::<Go>().inherits()),
            (labels::<Go>().name(), labels::<Go>().inherits()),
            (PRINT_MOVE_MODE.name(), PRINT_MOVE_MODE.inherits()),
            (COMMENT.name(), COMMENT.inherits()),
            (SIZE.name(), SIZE.inherits()),
            (FIGURE.name(), FIGURE.inherits()),
            (APPLICATION.name(), APPLICATION.inherits()),
            (TIME_LIMIT.name(), TIME_LIMIT.inherits()),
        ];
        for (name, inherit) in names_and_inherit {
            let entry = schema.lookup(name).expect("definition missing from schema");
            assert_eq!(entry.inherit, inherit, "inherit flag differs for {}", name);
        }
    }

    #[test]
    fn test_property_from_definition() {
        use crate::ast::ComposedValue;
        let property = Property::from_definition(&SIZE, &Union::Second(Compose::new(19, 13)));
        assert_eq!(property.identifier, "SZ");
        assert_eq!(property.values, vec![ComposedValue::compose("19", "13")]);
    }

    #[test]
    fn test_definition_is_copy() {
        let d = COMMENT;
        let e = d;
        assert_eq!(d.name(), e.name());
        assert!(format!("{:?}", d).contains("\"C\""));
    }
}
