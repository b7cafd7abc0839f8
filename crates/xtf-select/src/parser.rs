//! Selection parser.
//!
//! Parses a token stream into a selection AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! expr    → path ("|" path)*
//! path    → step ("::" step)* docs?
//! step    → target filter*
//! target  → "*" | "**" | NAME | QUOTED | NUMBER
//! filter  → "[" (range | "siblings" | "topChoices") "]"
//! docs    → "#" (range | "all")
//! range   → NUMBER ("-" NUMBER)?
//! ```
//!
//! Ranges are 1-based and inclusive. A bare number in target position is a
//! group name, so `1999::*` selects the children of the group named `1999`.

use std::mem;

use crate::{
    ast::{DocWindow, Filter, RankRange, SelectExpr, SelectPath, Step, Target},
    error::{ParseError, SelectError},
    lexer::{Token, tokenize},
};

/// Recursive descent parser for selection expressions.
struct Parser {
    /// Token stream to parse.
    tokens: Vec<Token>,
    /// Current position in token stream.
    position: usize,
}

impl Parser {
    /// Creates a new parser from a token stream.
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Parses the token stream into a selection expression.
    fn parse(mut self) -> Result<Option<SelectExpr>, ParseError> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expr = self.parse_expr()?;

        if self.position < self.tokens.len() {
            return Err(ParseError::new(
                format!("unexpected token: {:?}", self.tokens[self.position]),
                Some(self.position),
            ));
        }

        Ok(Some(expr))
    }

    /// Parses: expr → path ("|" path)*
    fn parse_expr(&mut self) -> Result<SelectExpr, ParseError> {
        let mut paths = vec![self.parse_path()?];

        while self.check(&Token::Pipe) {
            self.advance();
            paths.push(self.parse_path()?);
        }

        Ok(SelectExpr { paths })
    }

    /// Parses: path → step ("::" step)* docs?
    fn parse_path(&mut self) -> Result<SelectPath, ParseError> {
        let mut steps = vec![self.parse_step()?];

        while self.check(&Token::PathSep) {
            self.advance();
            steps.push(self.parse_step()?);
        }

        let docs = if self.check(&Token::Hash) {
            self.advance();
            Some(self.parse_docs()?)
        } else {
            None
        };

        Ok(SelectPath { steps, docs })
    }

    /// Parses: step → target filter*
    fn parse_step(&mut self) -> Result<Step, ParseError> {
        let target = match self.peek().cloned() {
            Some(Token::Star) => Target::Children,
            Some(Token::DoubleStar) => Target::Descendants,
            Some(Token::Name(name)) | Some(Token::Quoted(name)) => Target::Named(name),
            Some(Token::Number(n)) => Target::Named(n.to_string()),
            Some(other) => {
                return Err(ParseError::new(
                    format!("expected group name, '*' or '**', found {other:?}"),
                    Some(self.position),
                ));
            }
            None => return Err(ParseError::new("unexpected end of selection", None)),
        };
        self.advance();

        let mut filters = Vec::new();
        while self.check(&Token::LBracket) {
            filters.push(self.parse_filter()?);
        }

        Ok(Step { target, filters })
    }

    /// Parses: filter → "[" (range | "siblings" | "topChoices") "]"
    fn parse_filter(&mut self) -> Result<Filter, ParseError> {
        self.advance(); // consume [

        let filter = match self.peek().cloned() {
            Some(Token::Number(_)) => Filter::Range(self.parse_range()?),
            Some(Token::Name(word)) if word == "siblings" => {
                self.advance();
                Filter::Siblings
            }
            Some(Token::Name(word)) if word == "topChoices" => {
                self.advance();
                Filter::TopChoices
            }
            Some(Token::Name(word)) => {
                return Err(ParseError::new(
                    format!("unknown filter '{word}' (expected a range, siblings or topChoices)"),
                    Some(self.position),
                ));
            }
            _ => {
                return Err(ParseError::new(
                    "expected a range, siblings or topChoices after '['",
                    Some(self.position),
                ));
            }
        };

        if !self.check(&Token::RBracket) {
            return Err(ParseError::new("expected ']'", Some(self.position)));
        }
        self.advance(); // consume ]

        Ok(filter)
    }

    /// Parses: docs → range | "all" (after the '#').
    fn parse_docs(&mut self) -> Result<DocWindow, ParseError> {
        match self.peek().cloned() {
            Some(Token::Name(word)) if word == "all" => {
                self.advance();
                Ok(DocWindow::All)
            }
            Some(Token::Number(_)) => Ok(DocWindow::Range(self.parse_range()?)),
            _ => Err(ParseError::new(
                "expected a range or 'all' after '#'",
                Some(self.position),
            )),
        }
    }

    /// Parses: range → NUMBER ("-" NUMBER)?
    fn parse_range(&mut self) -> Result<RankRange, ParseError> {
        let start_index = self.position;
        let first = self.expect_number()?;

        let last = if self.check(&Token::Dash) {
            self.advance();
            self.expect_number()?
        } else {
            first
        };

        RankRange::new(first, last).ok_or_else(|| {
            let message = if first == 0 {
                "ranks start at 1".to_string()
            } else {
                format!("range {first}-{last} ends before it starts")
            };
            ParseError::new(message, Some(start_index))
        })
    }

    /// Consumes a number token.
    fn expect_number(&mut self) -> Result<u32, ParseError> {
        match self.peek() {
            Some(Token::Number(n)) => {
                let n = *n;
                self.advance();
                Ok(n)
            }
            _ => Err(ParseError::new("expected a number", Some(self.position))),
        }
    }

    /// Returns the current token without consuming it.
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    /// Checks if the current token matches the given token.
    fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| mem::discriminant(t) == mem::discriminant(token))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }
}

/// Parses a selection string into an AST.
///
/// Returns `Ok(None)` for empty selections, `Ok(Some(expr))` for valid ones,
/// or `Err(SelectError)` for invalid syntax.
pub fn parse(input: &str) -> Result<Option<SelectExpr>, SelectError> {
    let tokens = tokenize(input)?;
    Parser::new(tokens)
        .parse()
        .map_err(|source| SelectError::Parse {
            expr: input.to_string(),
            source,
        })
}
