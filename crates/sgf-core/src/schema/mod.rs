//! Property schema: maps identifiers to expected value types
//!
//! A schema is built once per game from the general FF4 table plus the
//! game's own entries (which shadow general ones with the same identifier).
//! The parser consults it to validate values while parsing; the tree model's
//! typed accessors use the value types in [`value`] for the same rules.

pub mod definitions;
pub mod value;

use std::collections::HashMap;
use std::fmt;

use crate::game::Game;

pub use definitions::Definition;
pub use value::{
    Color, Compose, EList, Emphasis, Empty, List, ListElement, PrimitiveValue, PropertyValue,
    Real, Union,
};

// ── Type descriptions ─────────────────────────────────────

/// The leaf value types of the format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    None,
    Number,
    Real,
    /// Emphasis marker, `1` or `2`
    Double,
    Color,
    SimpleText,
    Text,
    Point,
    Move,
    Stone,
    /// Anything; used for identifiers the schema does not know
    Unknown,
}

impl Primitive {
    /// Text-like primitives keep an unescaped `:` as part of the value
    pub fn tolerates_colon(self) -> bool {
        matches!(self, Primitive::SimpleText | Primitive::Text | Primitive::Unknown)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Primitive::None => "None",
            Primitive::Number => "Number",
            Primitive::Real => "Real",
            Primitive::Double => "Double",
            Primitive::Color => "Color",
            Primitive::SimpleText => "SimpleText",
            Primitive::Text => "Text",
            Primitive::Point => "Point",
            Primitive::Move => "Move",
            Primitive::Stone => "Stone",
            Primitive::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// Shape of the content of one `[...]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    Single(Primitive),
    Compose(Primitive, Primitive),
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ValueShape::Single(p) => write!(f, "{}", p),
            ValueShape::Compose(a, b) => write!(f, "Compose<{}, {}>", a, b),
        }
    }
}

/// Expected type of a whole property (all of its values)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSpec {
    Single(Primitive),
    Compose(Primitive, Primitive),
    /// One or more values
    List(ValueShape),
    /// Like `List`, but `[]` stands for the empty list
    EList(ValueShape),
    /// Either alternative; the first is tried first
    Union(Box<TypeSpec>, Box<TypeSpec>),
}

impl TypeSpec {
    pub fn list(primitive: Primitive) -> Self {
        TypeSpec::List(ValueShape::Single(primitive))
    }

    pub fn elist(primitive: Primitive) -> Self {
        TypeSpec::EList(ValueShape::Single(primitive))
    }

    pub fn list_of_compose(first: Primitive, second: Primitive) -> Self {
        TypeSpec::List(ValueShape::Compose(first, second))
    }

    pub fn union(first: TypeSpec, second: TypeSpec) -> Self {
        TypeSpec::Union(Box::new(first), Box::new(second))
    }

    /// Fallback type for identifiers missing from the schema.
    ///
    /// Accepts one or more `[...]` values, each taken verbatim (colons
    /// included), so private properties such as `XX[a][b:c]` keep every value.
    pub fn unknown() -> Self {
        TypeSpec::list(Primitive::Unknown)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TypeSpec::Single(p) => write!(f, "{}", p),
            TypeSpec::Compose(a, b) => write!(f, "Compose<{}, {}>", a, b),
            TypeSpec::List(shape) => write!(f, "List<{}>", shape),
            TypeSpec::EList(shape) => write!(f, "EList<{}>", shape),
            TypeSpec::Union(a, b) => write!(f, "Union<{}, {}>", a, b),
        }
    }
}

// ── Entries ───────────────────────────────────────────────

/// One row of the schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyEntry {
    pub name: String,
    pub spec: TypeSpec,
    /// Absent values resolve to the nearest ancestor's value
    pub inherit: bool,
}

impl PropertyEntry {
    pub fn new(name: impl Into<String>, spec: TypeSpec) -> Self {
        PropertyEntry {
            name: name.into(),
            spec,
            inherit: false,
        }
    }

    pub fn inherited(mut self) -> Self {
        self.inherit = true;
        self
    }
}

// ── Schema ────────────────────────────────────────────────

/// Identifier → entry table plus the game's coordinate validators
#[derive(Debug, Clone)]
pub struct PropertySchema {
    entries: HashMap<String, PropertyEntry>,
    point: fn(Option<&str>) -> bool,
    move_: fn(Option<&str>) -> bool,
    stone: fn(Option<&str>) -> bool,
}

impl PropertySchema {
    /// General FF4 properties with game-specific values left unchecked
    pub fn general() -> Self {
        let mut schema = PropertySchema {
            entries: HashMap::new(),
            point: accept_any,
            move_: accept_any,
            stone: accept_any,
        };
        schema.extend(general_entries());
        schema
    }

    /// General properties merged with `G`'s additions, validating with `G`'s types
    pub fn for_game<G: Game>() -> Self {
        let mut schema = Self::general();
        schema.point = accepts_value::<G::Point>;
        schema.move_ = accepts_value::<G::Move>;
        schema.stone = accepts_value::<G::Stone>;
        schema.extend(G::properties());
        schema
    }

    /// Adds or shadows an entry
    pub fn insert(&mut self, entry: PropertyEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn extend(&mut self, entries: impl IntoIterator<Item = PropertyEntry>) {
        for entry in entries {
            self.insert(entry);
        }
    }

    pub fn lookup(&self, identifier: &str) -> Option<&PropertyEntry> {
        self.entries.get(identifier)
    }

    /// Like [`lookup`](Self::lookup) but total: unknown identifiers get [`TypeSpec::unknown`]
    pub fn resolve(&self, identifier: &str) -> TypeSpec {
        self.lookup(identifier)
            .map(|entry| entry.spec.clone())
            .unwrap_or_else(TypeSpec::unknown)
    }

    pub fn is_inherited(&self, identifier: &str) -> bool {
        self.lookup(identifier).map_or(false, |entry| entry.inherit)
    }

    /// Whether `raw` is a valid textual form of `primitive`
    pub fn accepts(&self, primitive: Primitive, raw: Option<&str>) -> bool {
        match primitive {
            Primitive::None => accepts_value::<Empty>(raw),
            Primitive::Number => accepts_value::<i64>(raw),
            Primitive::Real => accepts_value::<Real>(raw),
            Primitive::Double => accepts_value::<Emphasis>(raw),
            Primitive::Color => accepts_value::<Color>(raw),
            Primitive::SimpleText | Primitive::Text | Primitive::Unknown => true,
            Primitive::Point => (self.point)(raw),
            Primitive::Move => (self.move_)(raw),
            Primitive::Stone => (self.stone)(raw),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &PropertyEntry> {
        self.entries.values()
    }
}

fn accept_any(_: Option<&str>) -> bool {
    true
}

fn accepts_value<T: PrimitiveValue>(raw: Option<&str>) -> bool {
    T::from_primitive(raw).is_some()
}

/// FF4 properties shared by every game
pub fn general_entries() -> Vec<PropertyEntry> {
    use Primitive::*;
    let single = |name: &str, p: Primitive| PropertyEntry::new(name, TypeSpec::Single(p));
    let list = |name: &str, p: Primitive| PropertyEntry::new(name, TypeSpec::list(p));

    vec![
        // move
        single("B", Move),
        single("BL", Real),
        single("BM", Double),
        single("DO", None),
        single("IT", None),
        single("KO", None),
        single("MN", Number),
        single("OB", Number),
        single("OW", Number),
        single("TE", Double),
        single("W", Move),
        single("WL", Real),
        // setup
        list("AB", Stone),
        list("AE", Point),
        list("AW", Stone),
        single("PL", Color),
        // node annotation and markup
        PropertyEntry::new("AR", TypeSpec::list_of_compose(Point, Point)),
        single("C", Text),
        list("CR", Point),
        PropertyEntry::new("DD", TypeSpec::elist(Point)).inherited(),
        single("DM", Double),
        PropertyEntry::new(
            "FG",
            TypeSpec::union(
                TypeSpec::Single(None),
                TypeSpec::Compose(Number, SimpleText),
            ),
        ),
        single("GB", Double),
        single("GW", Double),
        single("HO", Double),
        PropertyEntry::new("LB", TypeSpec::list_of_compose(Point, SimpleText)),
        PropertyEntry::new("LN", TypeSpec::list_of_compose(Point, Point)),
        list("MA", Point),
        single("N", SimpleText),
        single("PM", Number).inherited(),
        list("SL", Point),
        list("SQ", Point),
        list("TR", Point),
        single("UC", Double),
        single("V", Real),
        PropertyEntry::new("VW", TypeSpec::elist(Point)).inherited(),
        // root
        PropertyEntry::new("AP", TypeSpec::Compose(SimpleText, Number)),
        single("CA", SimpleText),
        single("FF", Number),
        single("GM", Number),
        single("ST", Number),
        PropertyEntry::new(
            "SZ",
            TypeSpec::union(TypeSpec::Single(Number), TypeSpec::Compose(Number, Number)),
        ),
        // game info
        single("AN", SimpleText),
        single("BR", SimpleText),
        single("BT", SimpleText),
        single("CP", SimpleText),
        single("DT", SimpleText),
        single("EV", SimpleText),
        single("GC", Text),
        single("GN", SimpleText),
        single("ON", SimpleText),
        single("OT", SimpleText),
        single("PB", SimpleText),
        single("PC", SimpleText),
        single("PW", SimpleText),
        single("RE", SimpleText),
        single("RO", SimpleText),
        single("RU", SimpleText),
        single("SO", SimpleText),
        single("TM", Real),
        single("US", SimpleText),
        single("WR", SimpleText),
        single("WT", SimpleText),
    ]
}
