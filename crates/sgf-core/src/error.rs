//! Error types for the SGF core
//!
//! All fallible operations return `Result<T, Error>`.
//! Lexing and parsing fail fast: the first error is returned and no
//! partial token stream or tree is produced.

use crate::parser::tokenizer::{Span, TokenClass};

/// Failure while turning text into tokens
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Invalid character '{character}' at {span}")]
    InvalidCharacter { character: char, span: Span },

    #[error("Unterminated property value starting at {span}")]
    UnterminatedValue { span: Span },
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            LexError::InvalidCharacter { span, .. } | LexError::UnterminatedValue { span } => *span,
        }
    }
}

/// Failure while turning tokens into a syntax tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at {span}")]
    UnexpectedToken {
        expected: TokenClass,
        found: String,
        span: Span,
    },

    #[error("Type mismatch: expected {expected}, found '{value}' at {span}")]
    TypeMismatch {
        expected: String,
        value: String,
        span: Span,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: TokenClass },

    #[error("Game tree nesting exceeds the limit of {limit} at {span}")]
    MaxDepthExceeded { limit: usize, span: Span },
}

impl ParseError {
    /// Source position of the error, when the input has not run out
    pub fn span(&self) -> Option<Span> {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::TypeMismatch { span, .. }
            | ParseError::MaxDepthExceeded { span, .. } => Some(*span),
            ParseError::UnexpectedEndOfInput { .. } => None,
        }
    }
}

/// SGF core error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

impl Error {
    pub fn span(&self) -> Option<Span> {
        match self {
            Error::Lex(e) => Some(e.span()),
            Error::Parse(e) => e.span(),
        }
    }
}

/// Result type alias for SGF operations
pub type Result<T> = std::result::Result<T, Error>;
