//! SGF syntax tree: the schema-agnostic parse result
//!
//! These types mirror the grammar one-to-one:
//!
//! ```text
//! Collection    := GameTree*
//! GameTree      := '(' Sequence GameTree* ')'
//! Sequence      := Node+
//! Node          := ';' Property*
//! Property      := Identifier PropValue+
//! PropValue     := '[' ComposedValue ']'
//! ComposedValue := Value (':' Value)?
//! ```
//!
//! Payloads are raw, unescaped strings. Typing happens in the parser (as
//! validation) and in the tree model (as conversion on read and write).

use serde::{Deserialize, Serialize};

/// Top-level container; may hold any number of game trees
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Collection {
    pub game_trees: Vec<GameTree>,
}

/// A sequence followed by its variations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameTree {
    /// Never empty when produced by the parser
    pub sequence: Sequence,
    pub game_trees: Vec<GameTree>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sequence {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub properties: Vec<Property>,
}

/// An identifier with its raw values.
///
/// Shared by the syntax tree and the mutable tree model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub identifier: String,
    pub values: Vec<ComposedValue>,
}

impl Property {
    pub fn new(identifier: impl Into<String>, values: Vec<ComposedValue>) -> Self {
        Property {
            identifier: identifier.into(),
            values,
        }
    }
}

/// Content of one `[...]`: a single value or a `first:second` pair.
///
/// `None` serializes as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComposedValue {
    Single(Option<String>),
    Compose(Option<String>, Option<String>),
}

impl ComposedValue {
    pub fn single(value: impl Into<String>) -> Self {
        ComposedValue::Single(Some(value.into()))
    }

    pub fn compose(first: impl Into<String>, second: impl Into<String>) -> Self {
        ComposedValue::Compose(Some(first.into()), Some(second.into()))
    }

    /// The whole value when single, the left half when composed
    pub fn first(&self) -> Option<&str> {
        match self {
            ComposedValue::Single(value) | ComposedValue::Compose(value, _) => value.as_deref(),
        }
    }

    /// The right half; `None` for single values
    pub fn second(&self) -> Option<&str> {
        match self {
            ComposedValue::Single(_) => None,
            ComposedValue::Compose(_, value) => value.as_deref(),
        }
    }

    pub fn is_composed(&self) -> bool {
        matches!(self, ComposedValue::Compose(..))
    }
}

impl Collection {
    pub fn new(game_trees: Vec<GameTree>) -> Self {
        Collection { game_trees }
    }

    /// Total number of nodes in every game tree
    pub fn node_count(&self) -> usize {
        self.game_trees.iter().map(GameTree::node_count).sum()
    }
}

impl GameTree {
    pub fn new(sequence: Sequence, game_trees: Vec<GameTree>) -> Self {
        GameTree {
            sequence,
            game_trees,
        }
    }

    pub fn node_count(&self) -> usize {
        self.sequence.nodes.len()
            + self
                .game_trees
                .iter()
                .map(GameTree::node_count)
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composed_value_accessors() {
        let single = ComposedValue::single("ab");
        assert_eq!(single.first(), Some("ab"));
        assert_eq!(single.second(), None);
        assert!(!single.is_composed());

        let pair = ComposedValue::compose("19", "13");
        assert_eq!(pair.first(), Some("19"));
        assert_eq!(pair.second(), Some("13"));
        assert!(pair.is_composed());

        assert_eq!(ComposedValue::Compose(None, Some("x".into())).first(), None);
    }

    #[test]
    fn test_node_count_includes_variations() {
        let leaf = |id: &str| GameTree::new(
            Sequence {
                nodes: vec![Node {
                    properties: vec![Property::new(id, vec![ComposedValue::single("aa")])],
                }],
            },
            vec![],
        );
        let root = GameTree::new(
            Sequence {
                nodes: vec![Node::default(), Node::default()],
            },
            vec![leaf("B"), leaf("W")],
        );
        assert_eq!(Collection::new(vec![root]).node_count(), 4);
    }

    #[test]
    fn test_ast_json_serialization() {
        let property = Property::new("SZ", vec![ComposedValue::compose("19", "13")]);
        let json = serde_json::to_string(&property).unwrap();
        let back: Property = serde_json::from_str(&json).unwrap();
        assert_eq!(property, back);
    }
}
