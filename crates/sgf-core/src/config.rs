//! Parser configuration and format constants

use serde::{Deserialize, Serialize};
use std::env;

/// Escapes the next character inside a property value
pub const ESCAPE_CHAR: char = '\\';

/// Characters the serializer must escape inside a property value
pub const ESCAPED_CHARS: [char; 3] = [ESCAPE_CHAR, ']', ':'];

/// Maximum nesting of `(...)` game trees accepted by the parser.
/// Bounds the recursion of the descent; linear move sequences do not nest.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 512;

/// Environment variable overriding [`DEFAULT_MAX_TREE_DEPTH`]
pub const MAX_TREE_DEPTH_ENV: &str = "SGF_MAX_TREE_DEPTH";

/// Runtime parser settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Deepest game-tree nesting accepted before failing with `MaxDepthExceeded`
    pub max_tree_depth: usize,
}

impl ParserConfig {
    pub fn with_max_tree_depth(mut self, depth: usize) -> Self {
        self.max_tree_depth = depth;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: env::var(MAX_TREE_DEPTH_ENV)
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|depth| *depth > 0)
                .unwrap_or(DEFAULT_MAX_TREE_DEPTH),
        }
    }
}
