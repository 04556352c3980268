//! Canonical normalizer: converts SGF text to its canonical form
//!
//! The canonical form has no whitespace between tokens, one `;` per node,
//! values written directly after their identifier, and escaping reapplied
//! to every `\` and `]` inside a value. A `:` is escaped everywhere except
//! in the second half of a composed value, where it is already literal.
//!
//! # Pipeline
//!
//! `SGF text → tokenize → parse → serialize_canonical → SHA-256`
//!
//! # Guarantees
//!
//! - **Idempotent**: `normalize(normalize(x)) == normalize(x)`
//! - **Deterministic**: same input always produces same output
//! - **Lossless**: re-parsing the output yields the same syntax tree

use sha2::{Digest, Sha256};

use crate::config::{ESCAPED_CHARS, ESCAPE_CHAR};
use crate::parser::ast::*;
use crate::schema::PropertySchema;
use crate::Result;

// ── Public API ─────────────────────────────────────────────

/// Normalize SGF text to canonical form.
///
/// Uses the general schema, so game-specific values are not checked.
///
/// # Errors
/// Returns the first lex or parse error of the input.
pub fn normalize(text: &str) -> Result<String> {
    normalize_with_schema(text, &PropertySchema::general())
}

pub fn normalize_with_schema(text: &str, schema: &PropertySchema) -> Result<String> {
    let collection = crate::parser::parse_text(text, schema)?;
    Ok(serialize_canonical(&collection))
}

// ── Canonical Serializer ───────────────────────────────────

/// Serialize a syntax tree to canonical SGF text
pub fn serialize_canonical(collection: &Collection) -> String {
    let mut out = String::new();
    for tree in &collection.game_trees {
        serialize_game_tree(&mut out, tree);
    }
    out
}

fn serialize_game_tree(out: &mut String, tree: &GameTree) {
    out.push('(');
    for node in &tree.sequence.nodes {
        serialize_node(out, node);
    }
    for variation in &tree.game_trees {
        serialize_game_tree(out, variation);
    }
    out.push(')');
}

fn serialize_node(out: &mut String, node: &Node) {
    out.push(';');
    write_properties(out, &node.properties);
}

/// Canonical text of a property list, without the leading `;`
pub fn serialize_properties(properties: &[Property]) -> String {
    let mut out = String::new();
    write_properties(&mut out, properties);
    out
}

fn write_properties(out: &mut String, properties: &[Property]) {
    for property in properties {
        out.push_str(&property.identifier);
        for value in &property.values {
            out.push('[');
            match value {
                ComposedValue::Single(raw) => write_escaped(out, raw.as_deref(), true),
                ComposedValue::Compose(first, second) => {
                    write_escaped(out, first.as_deref(), true);
                    out.push(':');
                    // the parser folds every later colon into the second half
                    write_escaped(out, second.as_deref(), false);
                }
            }
            out.push(']');
        }
    }
}

// ── Pretty printer ─────────────────────────────────────────

/// Human-oriented layout: one node per line, variations indented.
/// Parses back to the same syntax tree as the canonical form.
pub fn serialize_pretty(collection: &Collection) -> String {
    let mut out = String::new();
    for tree in &collection.game_trees {
        write_pretty(&mut out, tree, 0);
        out.push('\n');
    }
    out
}

fn write_pretty(out: &mut String, tree: &GameTree, depth: usize) {
    let indent = "  ".repeat(depth);
    out.push_str(&indent);
    out.push('(');
    for (i, node) in tree.sequence.nodes.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(&indent);
            out.push(' ');
        }
        serialize_node(out, node);
    }
    for variation in &tree.game_trees {
        out.push('\n');
        write_pretty(out, variation, depth + 1);
    }
    out.push(')');
}

// ── Escaping ───────────────────────────────────────────────

/// Escape a raw value for use between `[` and `]`
pub fn escape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    write_escaped(&mut out, Some(raw), true);
    out
}

fn write_escaped(out: &mut String, raw: Option<&str>, escape_colon: bool) {
    for c in raw.unwrap_or_default().chars() {
        if ESCAPED_CHARS.contains(&c) && (escape_colon || c != ':') {
            out.push(ESCAPE_CHAR);
        }
        out.push(c);
    }
}

// ── SHA-256 Hash Computation ──────────────────────────────

/// SHA-256 of the canonical serialization, as lowercase hex
pub fn compute_canonical_hash(collection: &Collection) -> String {
    let canonical = serialize_canonical(collection);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{go::Go, AnyGame, Game};
    use crate::parser::parse_text;
    use proptest::prelude::*;
    use std::fs;
    use std::path::Path;

    fn read_fixture(path: &str) -> String {
        let full = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../../tests/fixtures/conformance")
            .join(path);
        fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", full.display(), e))
    }

    fn parse_general(text: &str) -> Collection {
        crate::parser::parse_text(text, &PropertySchema::general()).unwrap()
    }

    // ── Basic normalization ────────────────────────────

    #[test]
    fn test_normalize_strips_whitespace() {
        let input = "(\n  ;FF[4] GM[1]\n  ;B[aa]\n  ;W[bb]\n)\n";
        assert_eq!(normalize(input).unwrap(), "(;FF[4]GM[1];B[aa];W[bb])");
    }

    #[test]
    fn test_normalize_keeps_whitespace_inside_values() {
        assert_eq!(
            normalize("( ;C[ two  words ] )").unwrap(),
            "(;C[ two  words ])"
        );
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize("").unwrap(), "");
    }

    #[test]
    fn test_normalize_reports_errors() {
        assert!(normalize("(;FF[4]").is_err());
        assert!(normalize("(;ff[4])").is_err());
    }

    #[test]
    fn test_normalize_does_not_check_coordinates() {
        assert_eq!(normalize("(;B[??])").unwrap(), "(;B[??])");
        assert!(normalize_with_schema("(;B[??])", &Go::schema()).is_err());
    }

    // ── Escaping ───────────────────────────────────────

    #[test]
    fn test_escaped_bracket_round_trip() {
        let collection = parse_general(r"(;C[a\]b])");
        let value = &collection.game_trees[0].sequence.nodes[0].properties[0].values[0];
        assert_eq!(value, &ComposedValue::single("a]b"));
        assert_eq!(serialize_canonical(&collection), r"(;C[a\]b])");
    }

    #[test]
    fn test_escape_value() {
        assert_eq!(escape_value(r"a]b"), r"a\]b");
        assert_eq!(escape_value(r"a\b"), r"a\\b");
        assert_eq!(escape_value("a:b"), r"a\:b");
        assert_eq!(escape_value("plain [text]"), r"plain [text\]");
    }

    #[test]
    fn test_redundant_escapes_are_dropped() {
        assert_eq!(normalize(r"(;C[\a\b])").unwrap(), "(;C[ab])");
    }

    #[test]
    fn test_compose_separator_is_not_escaped() {
        assert_eq!(normalize("(;SZ[19:13])").unwrap(), "(;SZ[19:13])");
        assert_eq!(normalize("(;C[Note: x])").unwrap(), "(;C[Note: x])");
    }

    #[test]
    fn test_later_colons_stay_literal() {
        for input in ["(;C[a:b:c])", "(;LB[aa:x:y])", "(;XX[p:q:r])", r"(;C[:\\:\]:])"] {
            assert_eq!(normalize(input).unwrap(), input);
            assert_eq!(normalize_with_schema(input, &Go::schema()).unwrap(), input);
        }
    }

    #[test]
    fn test_escaped_colon_in_second_point() {
        let input = r"(;AR[a:b\:c])";
        let once = normalize_with_schema(input, &AnyGame::schema()).unwrap();
        assert_eq!(once, "(;AR[a:b:c])");
        let first = parse_text(input, &AnyGame::schema()).unwrap();
        assert_eq!(parse_text(&once, &AnyGame::schema()).unwrap(), first);
    }

    #[test]
    fn test_serialize_properties() {
        let collection = parse_general("(;SZ[19:13]C[a\\]b])");
        let node = &collection.game_trees[0].sequence.nodes[0];
        assert_eq!(serialize_properties(&node.properties), "SZ[19:13]C[a\\]b]");
    }

    // ── Pretty printer ─────────────────────────────────

    #[test]
    fn test_pretty_layout() {
        let collection = parse_general("(;FF[4];B[aa](;W[bb];B[cc])(;W[dd]))");
        assert_eq!(
            serialize_pretty(&collection),
            "(;FF[4]\n ;B[aa]\n  (;W[bb]\n   ;B[cc])\n  (;W[dd]))\n"
        );
    }

    #[test]
    fn test_pretty_parses_back_to_same_tree() {
        let input = read_fixture("valid/variations.sgf");
        let collection = parse_general(&input);
        let pretty = serialize_pretty(&collection);
        assert_eq!(parse_general(&pretty), collection);
    }

    // ── Hash ───────────────────────────────────────────

    #[test]
    fn test_hash_is_sha256_hex() {
        let hash = compute_canonical_hash(&parse_general("(;FF[4])"));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_ignores_whitespace() {
        let a = compute_canonical_hash(&parse_general("(;FF[4];B[aa])"));
        let b = compute_canonical_hash(&parse_general("( ;FF[4]\n ;B[aa] )"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_records_different_hashes() {
        let a = compute_canonical_hash(&parse_general("(;B[aa])"));
        let b = compute_canonical_hash(&parse_general("(;B[ab])"));
        assert_ne!(a, b);
    }

    // ── Idempotence and determinism ────────────────────

    #[test]
    fn test_idempotence() {
        let input = "( ;FF[4]C[a\\]b: c] (;B[aa] ;W[bb]) (;B[cc]) )";
        let once = normalize(input).unwrap();
        let twice = normalize(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_determinism_100_iterations() {
        let input = read_fixture("valid/variations.sgf");
        let first = normalize(&input).unwrap();
        for i in 0..100 {
            let result = normalize(&input).unwrap();
            assert_eq!(first, result, "Non-determinism at iteration {}", i);
        }
    }

    // ── Conformance fixtures ───────────────────────────

    #[test]
    fn test_normalize_conformance_valid_fixtures() {
        for name in ["minimal.sgf", "linear.sgf", "variations.sgf", "escapes.sgf", "go_game.sgf"] {
            let input = read_fixture(&format!("valid/{}", name));
            let normalized = normalize_with_schema(&input, &Go::schema())
                .unwrap_or_else(|e| panic!("{} failed: {}", name, e));
            assert_eq!(normalize(&normalized).unwrap(), normalized, "{}", name);
        }
    }

    #[test]
    fn test_normalize_conformance_invalid_fixtures() {
        for name in ["bad_double.sgf", "unclosed.sgf", "lowercase.sgf", "bad_point.sgf"] {
            let input = read_fixture(&format!("invalid/{}", name));
            assert!(
                normalize_with_schema(&input, &Go::schema()).is_err(),
                "{} should fail",
                name
            );
        }
    }

    // ── Properties ─────────────────────────────────────

    proptest! {
        #[test]
        fn prop_escaping_preserves_raw_text(raw in "[a-z\\]\\\\: \\[]{0,24}") {
            let text = format!("(;C[{}])", escape_value(&raw));
            let collection = parse_general(&text);
            let value = &collection.game_trees[0].sequence.nodes[0].properties[0].values[0];
            let expected = if raw.is_empty() { None } else { Some(raw.as_str()) };
            prop_assert_eq!(value.first(), expected);
            prop_assert!(!value.is_composed());
            prop_assert_eq!(serialize_canonical(&collection), text);
        }

        #[test]
        fn prop_round_trip_without_whitespace(
            moves in prop::collection::vec(("[BW]", "[a-s]{2}"), 1..20),
            comment in "[a-zA-Z0-9 .,!?:\\]\\\\]{0,16}",
            branches in prop::collection::vec(
                prop::collection::vec(("[BW]", "[a-s]{2}", "[a-z:]{0,6}"), 1..4),
                0..4,
            ),
        ) {
            // colons stay unescaped, so texts come back as composed values
            let comment = comment.replace('\\', "\\\\").replace(']', "\\]");
            let mut text = format!("(;FF[4]GM[1]C[{}]", comment);
            for (color, point) in &moves {
                text.push_str(&format!(";{}[{}]", color, point));
            }
            for branch in &branches {
                text.push('(');
                for (color, point, name) in branch {
                    text.push_str(&format!(";{}[{}]N[{}]", color, point, name));
                }
                text.push(')');
            }
            text.push(')');
            let collection = parse_text(&text, &Go::schema()).unwrap();
            prop_assert_eq!(serialize_canonical(&collection), text);
        }
    }
}
