//! Error types for selection parsing.

use thiserror::Error;

/// A character the lexer could not place, with the selection it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("selection syntax error: {message}\n  {input}\n  {caret}", caret = caret(*.position, .input))]
pub struct LexError {
    /// What went wrong.
    pub message: String,
    /// Byte offset into `input`.
    pub position: usize,
    /// Selection being tokenized.
    pub input: String,
}

impl LexError {
    /// Creates an error at byte `position` of `input`.
    pub fn new(message: impl Into<String>, position: usize, input: &str) -> Self {
        Self {
            message: message.into(),
            position,
            input: input.to_string(),
        }
    }
}

/// A caret under byte `position` of `input`.
fn caret(position: usize, input: &str) -> String {
    format!("{}^", " ".repeat(position.min(input.len())))
}

/// A token sequence the grammar rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}{message}", at_token(*.token_index))]
pub struct ParseError {
    /// What went wrong.
    pub message: String,
    /// Offending token, or `None` at end of input.
    pub token_index: Option<usize>,
}

impl ParseError {
    /// Creates an error at `token_index`.
    pub fn new(message: impl Into<String>, token_index: Option<usize>) -> Self {
        Self {
            message: message.into(),
            token_index,
        }
    }
}

/// Prefix naming the token a parse error points at.
fn at_token(index: Option<usize>) -> String {
    index.map(|i| format!("at token {i}: ")).unwrap_or_default()
}

/// Any failure turning a selection string into an expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectError {
    /// Tokenizing failed.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The token stream did not match the grammar.
    #[error("selection syntax error in '{expr}': {source}")]
    Parse {
        /// The selection string being parsed.
        expr: String,
        /// The underlying parse failure.
        #[source]
        source: ParseError,
    },
}

impl SelectError {
    /// The bare message, without position context.
    pub fn message(&self) -> &str {
        match self {
            Self::Lex(err) => &err.message,
            Self::Parse { source, .. } => &source.message,
        }
    }
}
