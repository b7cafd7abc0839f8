//! Selection lexer (tokenizer).
//!
//! Converts a selection string into a stream of tokens for the parser.
//! Inside a word, `-` only splits a leading run of digits, so `1-5` is a
//! range while `Non-fiction` stays one name.

use crate::error::LexError;

/// A token in the selection language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A bare word (group name or keyword).
    Name(String),

    /// A quoted group name (the quotes are stripped).
    Quoted(String),

    /// An unsigned integer.
    Number(u32),

    /// `*`
    Star,

    /// `**`
    DoubleStar,

    /// `::` path separator.
    PathSep,

    /// `|` union separator.
    Pipe,

    /// `[`
    LBracket,

    /// `]`
    RBracket,

    /// `-` inside a range.
    Dash,

    /// `#` introducing a document window.
    Hash,
}

/// Characters that end a bare word.
fn ends_word(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '*' | '[' | ']' | '#' | '|' | '"' | ':')
}

/// Single-character punctuation tokens.
fn punct(ch: char) -> Option<Token> {
    match ch {
        '|' => Some(Token::Pipe),
        '[' => Some(Token::LBracket),
        ']' => Some(Token::RBracket),
        '#' => Some(Token::Hash),
        '-' => Some(Token::Dash),
        _ => None,
    }
}

/// Scans a selection string by byte offset.
struct Scanner<'a> {
    /// Selection being tokenized.
    input: &'a str,
    /// Byte offset of the next unread character.
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Unread input.
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// The next unread character.
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consumes `ch` if it is next.
    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    /// An error at byte `at`.
    fn fail(&self, message: impl Into<String>, at: usize) -> LexError {
        LexError::new(message, at, self.input)
    }

    /// The token starting at the next non-blank character, if any.
    fn token(&mut self) -> Result<Option<Token>, LexError> {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();

        let at = self.pos;
        let Some(ch) = self.peek() else {
            return Ok(None);
        };

        if let Some(token) = punct(ch) {
            self.pos += 1;
            return Ok(Some(token));
        }
        match ch {
            '*' => {
                self.pos += 1;
                Ok(Some(if self.eat('*') {
                    Token::DoubleStar
                } else {
                    Token::Star
                }))
            }
            ':' => {
                self.pos += 1;
                if self.eat(':') {
                    Ok(Some(Token::PathSep))
                } else {
                    Err(self.fail("expected '::'", at))
                }
            }
            '"' => self.quoted(at),
            _ => self.word(at).map(Some),
        }
    }

    /// A quoted group name starting at the opening quote.
    fn quoted(&mut self, at: usize) -> Result<Option<Token>, LexError> {
        let body = &self.rest()[1..];
        let Some(len) = body.find('"') else {
            return Err(self.fail("unclosed quote", at));
        };
        self.pos += len + 2;
        Ok(Some(Token::Quoted(body[..len].to_string())))
    }

    /// A bare word, or a number when it is all digits. A `-` only ends a
    /// word made of digits so far.
    fn word(&mut self, at: usize) -> Result<Token, LexError> {
        let rest = self.rest();
        let mut end = rest.len();
        for (i, ch) in rest.char_indices() {
            let digits = rest[..i].bytes().all(|b| b.is_ascii_digit());
            if ends_word(ch) || (ch == '-' && digits) {
                end = i;
                break;
            }
        }
        if end == 0 {
            return Err(self.fail("unexpected character", at));
        }

        let word = &rest[..end];
        self.pos += end;
        if !word.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Token::Name(word.to_string()));
        }
        word.parse::<u32>()
            .map(Token::Number)
            .map_err(|_| self.fail(format!("number out of range: {word}"), at))
    }
}

/// Tokenizes a selection string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut scanner = Scanner { input, pos: 0 };
    let mut tokens = Vec::new();
    while let Some(token) = scanner.token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
