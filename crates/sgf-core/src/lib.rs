//! SGF Core: parser and tree model for Smart Game Format records
//!
//! This is the single implementation of the format's semantics.
//! The CLI and the language bindings (Python, Go) all call into it.
//!
//! # Architecture
//!
//! ```text
//! SGF Text → Tokenizer → Tokens → Parser (+ PropertySchema) → Syntax Tree
//!                                                                  ↓
//!                                          GameCollection (mutable tree model)
//!                                                                  ↓
//!                                          Normalizer → Canonical Text → SHA-256
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: same input always produces identical output
//! - **Fail-fast**: lexing and parsing stop at the first error, with a span
//! - **Typed**: every value is checked against the game's property schema
//! - **Canonical**: one serialized form per record
//!
//! # Example
//!
//! ```
//! use sgf_core::definitions::{black, FILE_FORMAT};
//! use sgf_core::go::{Go, GoMove};
//!
//! let game = sgf_core::parse::<Go>("(;FF[4];B[pd])").unwrap();
//! let root = game.roots()[0];
//! assert_eq!(game.property_value(root, &FILE_FORMAT), Some(4));
//!
//! let first = game.children(root)[0];
//! assert!(matches!(game.property_value(first, &black::<Go>()), Some(GoMove::Play(_))));
//! assert_eq!(game.to_sgf(), "(;FF[4];B[pd])");
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod normalizer;
pub mod parser;
pub mod schema;
pub mod tree;

pub use config::ParserConfig;
pub use error::{Error, LexError, ParseError, Result};
pub use game::{go, Game};
pub use parser::ast;
pub use parser::tokenizer::{Span, Token, TokenKind};
pub use schema::definitions;
pub use schema::{Definition, PropertySchema, TypeSpec};
pub use tree::{GameCollection, Node, NodeId, NodeRef};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse `text` into a game tree using `G`'s schema
///
/// # Errors
/// The first `LexError` or `ParseError` in the input.
pub fn parse<G: Game>(text: &str) -> Result<GameCollection<G>> {
    GameCollection::from_sgf(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{black, COMMENT};
    use crate::go::{Go, GoMove, GoPoint};

    #[test]
    fn test_parse_entry_point() {
        let game = parse::<Go>("(;FF[4]GM[1];B[aa];W[bb])").unwrap();
        assert_eq!(game.len(), 3);
        assert_eq!(game.to_sgf(), "(;FF[4]GM[1];B[aa];W[bb])");
    }

    #[test]
    fn test_errors_carry_spans() {
        let err = parse::<Go>("(;FF[4]\n;DM[3])").unwrap_err();
        let span = err.span().unwrap();
        assert_eq!((span.line, span.column), (2, 5));
        assert!(err.to_string().contains("Type mismatch"));
    }

    #[test]
    fn test_build_edit_serialize() {
        let mut game = GameCollection::<Go>::new();
        let root = game.push_root(Node::new().with(&definitions::FILE_FORMAT, 4));
        let mv = GoMove::Play(GoPoint::new(16, 4).unwrap());
        let child = game
            .append_child(root, Node::new().with(&black::<Go>(), mv))
            .unwrap();
        game.add_property(child, &COMMENT, "a]b".to_string());
        assert_eq!(game.to_sgf(), r"(;FF[4];B[pd]C[a\]b])");

        let reparsed = parse::<Go>(&game.to_sgf()).unwrap();
        assert_eq!(reparsed, game);
    }

    #[test]
    fn test_text_round_trips_byte_for_byte() {
        for input in ["(;C[a:b:c])", r"(;C[x\:y:z]LB[aa:1:2])", r"(;GN[a\]b\\c])"] {
            assert_eq!(parse::<Go>(input).unwrap().to_sgf(), input);
        }
    }

    #[test]
    fn test_version_matches_manifest() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_syntax_tree_json() {
        let game = parse::<Go>("(;SZ[19:13]C[hi])").unwrap();
        let json = serde_json::to_string(&game.to_syntax()).unwrap();
        let back: ast::Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(GameCollection::<Go>::from_syntax(&back), game);
    }

    #[test]
    fn test_determinism_100_iterations() {
        let input = "(;FF[4]GM[1]SZ[19];B[pd](;W[dp];B[pp])(;W[dd]))";
        let first = parse::<Go>(input).unwrap().to_sgf();
        for i in 0..100 {
            let result = parse::<Go>(input).unwrap().to_sgf();
            assert_eq!(first, result, "Non-determinism at iteration {}", i);
        }
    }
}
