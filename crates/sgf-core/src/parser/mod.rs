//! SGF Parser: tokenizer, syntax tree types, and recursive descent parser
//!
//! Converts a token stream into a [`Collection`] following the grammar in
//! [`ast`], type-checking every property value against a [`PropertySchema`].
//!
//! Repetition (`GameTree*`, `Node+`, `Property*`, `PropValue+`) is greedy:
//! the parser keeps taking elements until one fails on its leading token,
//! then restores the cursor and stops. A failure after the leading token was
//! accepted is a real error and propagates. Union-typed properties try the
//! first alternative, restore the cursor on failure, and try the second.

pub mod ast;
pub mod tokenizer;

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::schema::{Primitive, PropertySchema, TypeSpec, ValueShape};

use ast::{Collection, ComposedValue, GameTree, Node, Property, Sequence};
use tokenizer::{Span, Token, TokenClass, TokenKind};

/// Parse a token stream into a syntax tree
///
/// # Guarantees
/// - Deterministic: same tokens and schema always produce the same tree
/// - Fail-fast: the first error is returned, no partial tree
///
/// # Errors
/// `UnexpectedToken` / `UnexpectedEndOfInput` for structural problems,
/// `TypeMismatch` when a value does not fit its schema type.
pub fn parse(tokens: &[Token], schema: &PropertySchema) -> Result<Collection, ParseError> {
    parse_with_config(tokens, schema, &ParserConfig::default())
}

pub fn parse_with_config(
    tokens: &[Token],
    schema: &PropertySchema,
    config: &ParserConfig,
) -> Result<Collection, ParseError> {
    let collection = Parser::new(tokens, schema, config).parse_collection()?;
    log::debug!(
        "parsed {} game tree(s), {} node(s) from {} tokens",
        collection.game_trees.len(),
        collection.node_count(),
        tokens.len()
    );
    Ok(collection)
}

/// Tokenize and parse `text` in one call
pub fn parse_text(text: &str, schema: &PropertySchema) -> crate::Result<Collection> {
    parse_text_with_config(text, schema, &ParserConfig::default())
}

pub fn parse_text_with_config(
    text: &str,
    schema: &PropertySchema,
    config: &ParserConfig,
) -> crate::Result<Collection> {
    let tokens = tokenizer::tokenize(text)?;
    Ok(parse_with_config(&tokens, schema, config)?)
}

/// Recursive descent parser over a token slice
pub struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    schema: &'a PropertySchema,
    max_depth: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], schema: &'a PropertySchema, config: &ParserConfig) -> Self {
        Parser {
            tokens,
            position: 0,
            schema,
            max_depth: config.max_tree_depth,
            depth: 0,
        }
    }

    // ── Grammar ────────────────────────────────────────────

    /// `Collection := GameTree*`, consuming the whole stream
    pub fn parse_collection(&mut self) -> Result<Collection, ParseError> {
        let game_trees = self.many(Self::parse_game_tree)?;
        if let Some(token) = self.peek() {
            return Err(unexpected(TokenClass::LeftParen, token));
        }
        Ok(Collection::new(game_trees))
    }

    /// `GameTree := '(' Sequence GameTree* ')'`
    fn parse_game_tree(&mut self) -> Result<GameTree, ParseError> {
        let open = self.expect(TokenClass::LeftParen)?.span;
        if self.depth >= self.max_depth {
            return Err(ParseError::MaxDepthExceeded {
                limit: self.max_depth,
                span: open,
            });
        }
        self.depth += 1;
        let sequence = self.parse_sequence()?;
        let game_trees = self.many(Self::parse_game_tree)?;
        self.expect(TokenClass::RightParen)?;
        self.depth -= 1;
        Ok(GameTree::new(sequence, game_trees))
    }

    /// `Sequence := Node+`
    fn parse_sequence(&mut self) -> Result<Sequence, ParseError> {
        let first = self.parse_node()?;
        let mut nodes = vec![first];
        nodes.extend(self.many(Self::parse_node)?);
        Ok(Sequence { nodes })
    }

    /// `Node := ';' Property*`
    fn parse_node(&mut self) -> Result<Node, ParseError> {
        self.expect(TokenClass::Semicolon)?;
        let properties = self.many(Self::parse_property)?;
        Ok(Node { properties })
    }

    /// `Property := Identifier PropValue+`, typed by the schema
    fn parse_property(&mut self) -> Result<Property, ParseError> {
        let identifier = self.expect_identifier()?;
        let spec = self.schema.resolve(&identifier);
        log::trace!("property {} as {}", identifier, spec);
        let values = self.parse_values(&spec)?;
        Ok(Property::new(identifier, values))
    }

    fn parse_values(&mut self, spec: &TypeSpec) -> Result<Vec<ComposedValue>, ParseError> {
        match spec {
            TypeSpec::Single(primitive) => {
                Ok(vec![self.parse_value(ValueShape::Single(*primitive))?])
            }
            TypeSpec::Compose(first, second) => {
                Ok(vec![self.parse_value(ValueShape::Compose(*first, *second))?])
            }
            TypeSpec::List(shape) => self.parse_list(*shape),
            TypeSpec::EList(shape) => {
                let start = self.position;
                match self.parse_list(*shape) {
                    Ok(values) => Ok(values),
                    Err(list_error) => {
                        self.position = start;
                        self.parse_value(ValueShape::Single(Primitive::None))
                            .map(|empty| vec![empty])
                            .map_err(|_| list_error)
                    }
                }
            }
            TypeSpec::Union(first, second) => self.parse_union(spec, first, second),
        }
    }

    fn parse_list(&mut self, shape: ValueShape) -> Result<Vec<ComposedValue>, ParseError> {
        let first = self.parse_value(shape)?;
        let mut values = vec![first];
        values.extend(self.many(|parser| parser.parse_value(shape))?);
        Ok(values)
    }

    fn parse_union(
        &mut self,
        union: &TypeSpec,
        first: &TypeSpec,
        second: &TypeSpec,
    ) -> Result<Vec<ComposedValue>, ParseError> {
        let start = self.position;
        let first_error = match self.parse_values(first) {
            Ok(values) => return Ok(values),
            Err(e) => e,
        };
        self.position = start;
        let second_error = match self.parse_values(second) {
            Ok(values) => return Ok(values),
            Err(e) => e,
        };
        self.position = start;

        // structural failures are reported as-is, only typing failures merge
        for error in [first_error, second_error] {
            if !matches!(error, ParseError::TypeMismatch { .. }) {
                return Err(error);
            }
        }
        let (value, span) = self.raw_value_at(start);
        Err(ParseError::TypeMismatch {
            expected: union.to_string(),
            value,
            span,
        })
    }

    /// `PropValue := '[' Value (':' Value)* ']'`, checked against `shape`
    fn parse_value(&mut self, shape: ValueShape) -> Result<ComposedValue, ParseError> {
        self.expect(TokenClass::LeftBracket)?;
        let (first, span) = self.expect_value()?;
        let mut parts = vec![first];
        while let Some(Token {
            kind: TokenKind::Colon,
            ..
        }) = self.peek()
        {
            self.advance();
            parts.push(self.expect_value()?.0);
        }
        self.expect(TokenClass::RightBracket)?;
        self.type_value(shape, parts, span)
    }

    // ── Typing ─────────────────────────────────────────────

    fn type_value(
        &self,
        shape: ValueShape,
        parts: Vec<String>,
        span: Span,
    ) -> Result<ComposedValue, ParseError> {
        let mismatch = |parts: &[String]| ParseError::TypeMismatch {
            expected: shape.to_string(),
            value: parts.join(":"),
            span,
        };

        match shape {
            ValueShape::Single(primitive) => {
                if parts.len() == 1 {
                    let raw = raw(&parts[0]);
                    if self.schema.accepts(primitive, raw) {
                        return Ok(ComposedValue::Single(raw.map(str::to_string)));
                    }
                } else if primitive.tolerates_colon() {
                    return Ok(split_compose(&parts));
                }
                Err(mismatch(&parts))
            }
            ValueShape::Compose(first, second) => {
                // colons after the separator belong to the second half
                if parts.len() >= 2
                    && self.schema.accepts(first, raw(&parts[0]))
                    && self.schema.accepts(second, raw(&parts[1..].join(":")))
                {
                    return Ok(split_compose(&parts));
                }
                Err(mismatch(&parts))
            }
        }
    }

    // ── Repetition ─────────────────────────────────────────

    /// Zero or more `parse_one`; stops (cursor restored) when an attempt
    /// fails without getting past its leading token.
    fn many<T>(
        &mut self,
        mut parse_one: impl FnMut(&mut Self) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        let mut items = Vec::new();
        loop {
            let checkpoint = self.position;
            match parse_one(self) {
                Ok(item) => items.push(item),
                Err(_) if self.position == checkpoint => return Ok(items),
                Err(e) => return Err(e),
            }
        }
    }

    // ── Token helpers ──────────────────────────────────────

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn expect(&mut self, class: TokenClass) -> Result<&'a Token, ParseError> {
        match self.peek() {
            Some(token) if token.kind.class() == class => {
                self.advance();
                Ok(token)
            }
            Some(token) => Err(unexpected(class, token)),
            None => Err(ParseError::UnexpectedEndOfInput { expected: class }),
        }
    }

    fn expect_identifier(&mut self) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => {
                self.advance();
                Ok(name.clone())
            }
            Some(token) => Err(unexpected(TokenClass::Identifier, token)),
            None => Err(ParseError::UnexpectedEndOfInput {
                expected: TokenClass::Identifier,
            }),
        }
    }

    fn expect_value(&mut self) -> Result<(String, Span), ParseError> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Value(text),
                span,
            }) => {
                self.advance();
                Ok((text.clone(), *span))
            }
            Some(token) => Err(unexpected(TokenClass::Value, token)),
            None => Err(ParseError::UnexpectedEndOfInput {
                expected: TokenClass::Value,
            }),
        }
    }

    /// Text of the value starting at `position` (a `[`), for diagnostics
    fn raw_value_at(&self, position: usize) -> (String, Span) {
        let mut text = String::new();
        let mut span = self.tokens.get(position).map(|t| t.span);
        for token in self.tokens.iter().skip(position + 1) {
            match &token.kind {
                TokenKind::Value(v) => {
                    if text.is_empty() {
                        span = Some(token.span);
                    }
                    text.push_str(v);
                }
                TokenKind::Colon => text.push(':'),
                _ => break,
            }
        }
        (text, span.unwrap_or_else(Span::start))
    }
}

fn unexpected(expected: TokenClass, found: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        expected,
        found: found.kind.to_string(),
        span: found.span,
    }
}

/// Empty payloads are stored as `None`
fn raw(text: &str) -> Option<&str> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn split_compose(parts: &[String]) -> ComposedValue {
    let second = parts[1..].join(":");
    ComposedValue::Compose(
        raw(&parts[0]).map(str::to_string),
        raw(&second).map(str::to_string),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::game::{go::Go, Game};
    use crate::schema::PropertyEntry;

    fn parse_go(text: &str) -> crate::Result<Collection> {
        parse_text(text, &Go::schema())
    }

    fn values(collection: &Collection, identifier: &str) -> Vec<ComposedValue> {
        collection.game_trees[0]
            .sequence
            .nodes
            .iter()
            .flat_map(|n| n.properties.iter())
            .find(|p| p.identifier == identifier)
            .map(|p| p.values.clone())
            .unwrap_or_default()
    }

    fn parse_error(text: &str) -> ParseError {
        match parse_go(text) {
            Err(Error::Parse(e)) => e,
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    // ── Structure ──────────────────────────────────────

    #[test]
    fn test_parse_linear_game() {
        let collection = parse_go("(;FF[4];B[ab];B[ba])").unwrap();
        assert_eq!(collection.game_trees.len(), 1);
        let tree = &collection.game_trees[0];
        assert_eq!(tree.sequence.nodes.len(), 3);
        assert!(tree.game_trees.is_empty());
    }

    #[test]
    fn test_parse_variations() {
        let collection = parse_go("(;FF[4];B[ab](;W[bb])(;W[cc]))").unwrap();
        let tree = &collection.game_trees[0];
        assert_eq!(tree.sequence.nodes.len(), 2);
        assert_eq!(tree.game_trees.len(), 2);
        assert_eq!(collection.node_count(), 4);
    }

    #[test]
    fn test_parse_multiple_roots() {
        let collection = parse_go("(;FF[4])(;FF[4]C[second])").unwrap();
        assert_eq!(collection.game_trees.len(), 2);
    }

    #[test]
    fn test_parse_empty_collection() {
        assert_eq!(parse_go("").unwrap(), Collection::default());
        assert_eq!(parse_go("  \n").unwrap(), Collection::default());
    }

    #[test]
    fn test_parse_node_without_properties() {
        let collection = parse_go("(;;;)").unwrap();
        assert_eq!(collection.game_trees[0].sequence.nodes.len(), 3);
    }

    #[test]
    fn test_parse_list_values() {
        let collection = parse_go("(;AB[aa][bb][cc])").unwrap();
        assert_eq!(values(&collection, "AB").len(), 3);
    }

    // ── Structural errors ──────────────────────────────

    #[test]
    fn test_game_tree_needs_a_node() {
        let err = parse_error("()");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenClass::Semicolon,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_close_paren() {
        assert_eq!(
            parse_error("(;FF[4]"),
            ParseError::UnexpectedEndOfInput {
                expected: TokenClass::RightParen
            }
        );
    }

    #[test]
    fn test_trailing_garbage() {
        let err = parse_error("(;FF[4]);");
        match err {
            ParseError::UnexpectedToken { expected, span, .. } => {
                assert_eq!(expected, TokenClass::LeftParen);
                assert_eq!(span.offset, 8);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_property_needs_a_value() {
        let err = parse_error("(;C;B[aa])");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenClass::LeftBracket,
                ..
            }
        ));
    }

    #[test]
    fn test_single_valued_property_rejects_second_value() {
        let err = parse_error("(;B[aa][bb])");
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: TokenClass::RightParen,
                ..
            }
        ));
    }

    // ── Typing ─────────────────────────────────────────

    #[test]
    fn test_double_rejects_three() {
        let err = parse_error("(;DM[3])");
        match err {
            ParseError::TypeMismatch {
                expected,
                value,
                span,
            } => {
                assert_eq!(expected, "Double");
                assert_eq!(value, "3");
                assert_eq!(span.offset, 5);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_number_rejects_decimal() {
        assert!(matches!(
            parse_error("(;FF[4.0])"),
            ParseError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_color_and_real() {
        assert!(parse_go("(;PL[B]KM[6.5])").is_ok());
        assert!(matches!(parse_error("(;PL[X])"), ParseError::TypeMismatch { .. }));
        assert!(matches!(parse_error("(;KM[abc])"), ParseError::TypeMismatch { .. }));
    }

    #[test]
    fn test_bad_list_element_fails_fast() {
        let err = parse_error("(;AB[aa][zz9])");
        match err {
            ParseError::TypeMismatch { expected, value, .. } => {
                assert_eq!(expected, "Stone");
                assert_eq!(value, "zz9");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_pass_move() {
        let collection = parse_go("(;B[])").unwrap();
        assert_eq!(values(&collection, "B"), vec![ComposedValue::Single(None)]);
    }

    #[test]
    fn test_union_disambiguation() {
        let square = parse_go("(;SZ[19])").unwrap();
        assert_eq!(values(&square, "SZ"), vec![ComposedValue::single("19")]);

        let rect = parse_go("(;SZ[19:13])").unwrap();
        assert_eq!(values(&rect, "SZ"), vec![ComposedValue::compose("19", "13")]);

        match parse_error("(;SZ[big])") {
            ParseError::TypeMismatch { expected, value, .. } => {
                assert_eq!(expected, "Union<Number, Compose<Number, Number>>");
                assert_eq!(value, "big");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_union_without_value_is_structural_error() {
        assert!(matches!(
            parse_error("(;SZ)"),
            ParseError::UnexpectedToken {
                expected: TokenClass::LeftBracket,
                ..
            }
        ));
        assert_eq!(
            parse_error("(;SZ"),
            ParseError::UnexpectedEndOfInput {
                expected: TokenClass::LeftBracket
            }
        );
    }

    #[test]
    fn test_union_with_empty_alternative() {
        let empty = parse_go("(;FG[])").unwrap();
        assert_eq!(values(&empty, "FG"), vec![ComposedValue::Single(None)]);
        let figure = parse_go("(;FG[257:Figure 1])").unwrap();
        assert_eq!(
            values(&figure, "FG"),
            vec![ComposedValue::compose("257", "Figure 1")]
        );
    }

    #[test]
    fn test_elist_accepts_empty() {
        let empty = parse_go("(;TB[])").unwrap();
        assert_eq!(values(&empty, "TB"), vec![ComposedValue::Single(None)]);
        let points = parse_go("(;TB[aa][bb])").unwrap();
        assert_eq!(values(&points, "TB").len(), 2);
        assert!(matches!(parse_error("(;TB[a])"), ParseError::TypeMismatch { .. }));
    }

    #[test]
    fn test_compose_property() {
        let collection = parse_go("(;AP[CGoban:3]LB[aa:A][bb:B])").unwrap();
        assert_eq!(values(&collection, "AP"), vec![ComposedValue::compose("CGoban", "3")]);
        assert_eq!(values(&collection, "LB").len(), 2);
        assert!(matches!(
            parse_error("(;AR[aa])"),
            ParseError::TypeMismatch { .. }
        ));
    }

    #[test]
    fn test_text_tolerates_colon() {
        let collection = parse_go("(;C[Note: read this])").unwrap();
        assert_eq!(
            values(&collection, "C"),
            vec![ComposedValue::compose("Note", " read this")]
        );
        assert!(matches!(parse_error("(;MN[1:2])"), ParseError::TypeMismatch { .. }));
    }

    #[test]
    fn test_unknown_identifier_is_opaque() {
        let collection = parse_go("(;XX[anything][goes:here])").unwrap();
        assert_eq!(values(&collection, "XX").len(), 2);
    }

    #[test]
    fn test_game_entries_shadow_general_ones() {
        let mut schema = Go::schema();
        schema.insert(PropertyEntry::new("C", TypeSpec::Single(Primitive::Number)));
        assert!(parse_text("(;C[12])", &schema).is_ok());
        assert!(parse_text("(;C[twelve])", &schema).is_err());
    }

    #[test]
    fn test_escaped_value_is_one_value() {
        let collection = parse_go(r"(;C[a\]b])").unwrap();
        assert_eq!(values(&collection, "C"), vec![ComposedValue::single("a]b")]);
    }

    #[test]
    fn test_lex_error_propagates() {
        assert!(matches!(parse_go("(;b[aa])"), Err(Error::Lex(_))));
    }

    // ── Depth limit ────────────────────────────────────

    #[test]
    fn test_max_depth() {
        let config = ParserConfig::default().with_max_tree_depth(2);
        let schema = Go::schema();
        assert!(parse_text_with_config("(;(;))", &schema, &config).is_ok());
        let err = parse_text_with_config("(;(;(;)))", &schema, &config).unwrap_err();
        assert!(matches!(
            err,
            Error::Parse(ParseError::MaxDepthExceeded { limit: 2, .. })
        ));
    }

    #[test]
    fn test_long_sequence_does_not_nest() {
        let config = ParserConfig::default().with_max_tree_depth(1);
        let text = format!("({})", ";B[aa]".repeat(5000));
        let collection = parse_text_with_config(&text, &Go::schema(), &config).unwrap();
        assert_eq!(collection.node_count(), 5000);
    }

    #[test]
    fn test_parse_determinism_100_iterations() {
        let input = "(;FF[4]GM[1]SZ[19]KM[6.5];B[pd](;W[dp];B[pp])(;W[dd]C[alt: line]))";
        let first = parse_go(input).unwrap();
        for i in 0..100 {
            let result = parse_go(input).unwrap();
            assert_eq!(first, result, "Non-determinism at iteration {}", i);
        }
    }
}
