//! SGF Tokenizer: converts SGF text into a flat token stream
//!
//! Handles: structural punctuation, property identifiers, and bracketed
//! property values (including escapes and the `:` compose separator).
//! Whitespace between tokens is discarded.
//!
//! Guarantees:
//! - Deterministic: same input always produces same token stream
//! - All-or-nothing: the first invalid character fails the whole call

use serde::{Deserialize, Serialize};

use crate::config::ESCAPE_CHAR;
use crate::error::LexError;

/// Token types for SGF syntax
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    LeftParen,    // (
    RightParen,   // )
    Semicolon,    // ;
    Colon,        // :
    LeftBracket,  // [
    RightBracket, // ]

    /// Run of uppercase ASCII letters
    Identifier(String),
    /// Unescaped text between `[` and `]` (or a `:` inside them)
    Value(String),
}

impl TokenKind {
    /// The payload-free class of this token, used in diagnostics
    pub fn class(&self) -> TokenClass {
        match self {
            TokenKind::LeftParen => TokenClass::LeftParen,
            TokenKind::RightParen => TokenClass::RightParen,
            TokenKind::Semicolon => TokenClass::Semicolon,
            TokenKind::Colon => TokenClass::Colon,
            TokenKind::LeftBracket => TokenClass::LeftBracket,
            TokenKind::RightBracket => TokenClass::RightBracket,
            TokenKind::Identifier(_) => TokenClass::Identifier,
            TokenKind::Value(_) => TokenClass::Value,
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenKind::Identifier(name) => write!(f, "identifier '{}'", name),
            TokenKind::Value(value) => write!(f, "value '{}'", value),
            other => write!(f, "{}", other.class()),
        }
    }
}

/// Token kind without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    LeftParen,
    RightParen,
    Semicolon,
    Colon,
    LeftBracket,
    RightBracket,
    Identifier,
    Value,
}

impl std::fmt::Display for TokenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TokenClass::LeftParen => write!(f, "'('"),
            TokenClass::RightParen => write!(f, "')'"),
            TokenClass::Semicolon => write!(f, "';'"),
            TokenClass::Colon => write!(f, "':'"),
            TokenClass::LeftBracket => write!(f, "'['"),
            TokenClass::RightBracket => write!(f, "']'"),
            TokenClass::Identifier => write!(f, "property identifier"),
            TokenClass::Value => write!(f, "property value"),
        }
    }
}

/// Position in source text for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl Span {
    /// Span of the very first character of a document
    pub fn start() -> Self {
        Span {
            line: 1,
            column: 1,
            offset: 0,
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Token with source position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Tokenizer for SGF source text
pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    offset: usize,
    line: usize,
    column: usize,
}

impl Tokenizer {
    /// Create a new tokenizer for the given input text
    pub fn new(text: &str) -> Self {
        Tokenizer {
            input: text.chars().collect(),
            position: 0,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire input into a stream of spanned tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let span = self.current_span();
            match ch {
                '(' => self.single(&mut tokens, TokenKind::LeftParen, span),
                ')' => self.single(&mut tokens, TokenKind::RightParen, span),
                ';' => self.single(&mut tokens, TokenKind::Semicolon, span),
                ']' => self.single(&mut tokens, TokenKind::RightBracket, span),
                '[' => {
                    self.single(&mut tokens, TokenKind::LeftBracket, span);
                    self.read_value(&mut tokens, span)?;
                }
                c if c.is_whitespace() => {
                    self.advance();
                }
                c if c.is_ascii_uppercase() => tokens.push(self.read_identifier(span)),
                c => {
                    return Err(LexError::InvalidCharacter { character: c, span });
                }
            }
        }

        log::trace!("tokenized {} characters into {} tokens", self.input.len(), tokens.len());
        Ok(tokens)
    }

    // ── Character helpers ──────────────────────────────────

    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied();
        if let Some(c) = ch {
            self.position += 1;
            self.offset += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        ch
    }

    fn current_span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
            offset: self.offset,
        }
    }

    fn single(&mut self, tokens: &mut Vec<Token>, kind: TokenKind, span: Span) {
        self.advance();
        tokens.push(Token::new(kind, span));
    }

    // ── Identifiers ────────────────────────────────────────

    fn read_identifier(&mut self, span: Span) -> Token {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_uppercase() {
                break;
            }
            name.push(ch);
            self.advance();
        }
        Token::new(TokenKind::Identifier(name), span)
    }

    // ── Values ─────────────────────────────────────────────

    /// Reads everything up to the unescaped `]`, leaving it for the main loop.
    fn read_value(&mut self, tokens: &mut Vec<Token>, open: Span) -> Result<(), LexError> {
        let mut value = String::new();
        let mut start = self.current_span();

        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedValue { span: open }),
                Some(']') => {
                    tokens.push(Token::new(TokenKind::Value(value), start));
                    return Ok(());
                }
                Some(':') => {
                    let colon = self.current_span();
                    tokens.push(Token::new(TokenKind::Value(std::mem::take(&mut value)), start));
                    tokens.push(Token::new(TokenKind::Colon, colon));
                    self.advance();
                    start = self.current_span();
                }
                Some(ESCAPE_CHAR) => {
                    self.advance();
                    match self.advance() {
                        Some(escaped) => value.push(escaped),
                        None => return Err(LexError::UnterminatedValue { span: open }),
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
    }
}

/// Tokenize `text` in one call
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    Tokenizer::new(text).tokenize()
}
