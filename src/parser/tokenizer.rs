// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Tokenizer for FHIRPath expressions
//!
//! Works directly on the byte slice of the input and hands out zero-copy
//! string slices for identifiers, numbers and string literals. Escape
//! sequences inside string literals are left untouched here and processed by
//! the parser.

use super::error::{ParseError, ParseResult};

/// Token with zero-copy string slices
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'input> {
    // Literals
    /// Integer literal (e.g., 42)
    Integer(i64),
    /// Decimal literal as string slice, parsed on demand (e.g., 3.14)
    Decimal(&'input str),
    /// String literal content between the quotes, escapes unprocessed
    String(&'input str),
    /// Identifier, plain or back-quoted
    Identifier(&'input str),

    // Operators
    /// Equality operator (=)
    Equal,
    /// Inequality operator (!=)
    NotEqual,
    /// Less than operator (<)
    LessThan,
    /// Less than or equal operator (<=)
    LessThanOrEqual,
    /// Greater than operator (>)
    GreaterThan,
    /// Greater than or equal operator (>=)
    GreaterThanOrEqual,
    /// Logical AND operator (and keyword)
    And,
    /// Logical OR operator (or keyword)
    Or,
    /// Logical XOR operator (xor keyword)
    Xor,
    /// Logical implication operator (implies keyword)
    Implies,
    /// Union operator (|)
    Union,

    // Punctuation
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left square bracket [
    LeftBracket,
    /// Right square bracket ]
    RightBracket,
    /// Dot operator (.) for property access
    Dot,
    /// Comma separator (,)
    Comma,

    // Special variables and keywords
    /// Special variable $this representing the current focus item
    DollarThis,
    /// Boolean literal true
    True,
    /// Boolean literal false
    False,
}

impl<'input> Token<'input> {
    /// Get keyword from string
    #[inline]
    pub fn from_keyword(s: &str) -> Option<Token<'static>> {
        match s {
            "true" => Some(Token::True),
            "false" => Some(Token::False),
            "and" => Some(Token::And),
            "or" => Some(Token::Or),
            "xor" => Some(Token::Xor),
            "implies" => Some(Token::Implies),
            _ => None,
        }
    }

    /// Get identifier string
    #[inline]
    pub fn as_identifier(&self) -> Option<&'input str> {
        match self {
            Token::Identifier(s) => Some(s),
            _ => None,
        }
    }
}

/// Fast character classification lookup table
/// true = valid identifier character, false = not valid
static ID_CHAR_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = matches!(i as u8,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_'
        );
        i += 1;
    }
    table
};

/// Identifier start character table
static ID_START_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = matches!(i as u8, b'A'..=b'Z' | b'a'..=b'z' | b'_');
        i += 1;
    }
    table
};

#[inline(always)]
fn lookup_single_char_operator(byte: u8) -> Option<Token<'static>> {
    match byte {
        b'.' => Some(Token::Dot),
        b'(' => Some(Token::LeftParen),
        b')' => Some(Token::RightParen),
        b',' => Some(Token::Comma),
        b'[' => Some(Token::LeftBracket),
        b']' => Some(Token::RightBracket),
        b'|' => Some(Token::Union),
        _ => None,
    }
}

/// Tokenizer for FHIRPath expressions
#[derive(Clone)]
pub struct Tokenizer<'input> {
    input: &'input str,
    bytes: &'input [u8],
    pos: usize,
    end: usize,
    token_start: usize,
}

impl<'input> Tokenizer<'input> {
    /// Create a new tokenizer
    #[inline]
    pub fn new(input: &'input str) -> Self {
        let bytes = input.as_bytes();
        Self {
            input,
            bytes,
            pos: 0,
            end: bytes.len(),
            token_start: 0,
        }
    }

    /// Lookup for operators that may span two characters
    /// Returns (token, consumed_bytes) or None if the byte starts no operator
    #[inline(always)]
    fn lookup_two_char_operator(first: u8, second: Option<u8>) -> Option<(Token<'static>, usize)> {
        match (first, second) {
            (b'!', Some(b'=')) => Some((Token::NotEqual, 2)),
            (b'<', Some(b'=')) => Some((Token::LessThanOrEqual, 2)),
            (b'>', Some(b'=')) => Some((Token::GreaterThanOrEqual, 2)),

            // Single character fallbacks
            (b'=', _) => Some((Token::Equal, 1)),
            (b'<', _) => Some((Token::LessThan, 1)),
            (b'>', _) => Some((Token::GreaterThan, 1)),

            _ => None,
        }
    }

    /// Input slice between byte positions; callers only split at ASCII bytes
    #[inline(always)]
    fn slice(&self, start: usize, end: usize) -> &'input str {
        &self.input[start..end]
    }

    #[inline(always)]
    fn is_id_start(ch: u8) -> bool {
        ID_START_TABLE[ch as usize]
    }

    #[inline(always)]
    fn is_id_continue(ch: u8) -> bool {
        ID_CHAR_TABLE[ch as usize]
    }

    #[inline(always)]
    fn skip_whitespace(&mut self) {
        while self.pos < self.end {
            match self.bytes[self.pos] {
                b' ' | b'\t' | b'\r' | b'\n' => self.pos += 1,
                _ => break,
            }
        }
    }

    #[inline]
    fn parse_identifier(&mut self) -> &'input str {
        let start = self.pos;
        while self.pos < self.end && Self::is_id_continue(self.bytes[self.pos]) {
            self.pos += 1;
        }
        self.slice(start, self.pos)
    }

    /// Integer or decimal literal; a dot only belongs to the number when a digit follows it
    fn parse_number(&mut self) -> ParseResult<Token<'input>> {
        let start = self.pos;
        while self.pos < self.end && self.bytes[self.pos].is_ascii_digit() {
            self.pos += 1;
        }

        let has_fraction = self.pos + 1 < self.end
            && self.bytes[self.pos] == b'.'
            && self.bytes[self.pos + 1].is_ascii_digit();

        if has_fraction {
            self.pos += 1;
            while self.pos < self.end && self.bytes[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
            return Ok(Token::Decimal(self.slice(start, self.pos)));
        }

        let text = self.slice(start, self.pos);
        text.parse::<i64>()
            .map(Token::Integer)
            .map_err(|_| ParseError::InvalidLiteral {
                literal_type: "integer".to_string(),
                value: text.to_string(),
                position: start,
            })
    }

    /// String literal parsing with minimal escape handling
    #[inline]
    fn parse_string_literal(&mut self) -> ParseResult<&'input str> {
        let quote_pos = self.pos;
        self.pos += 1; // Skip opening quote
        let start = self.pos;

        while self.pos < self.end {
            match self.bytes[self.pos] {
                b'\'' => {
                    let content = self.slice(start, self.pos);
                    self.pos += 1; // Skip closing quote
                    return Ok(content);
                }
                b'\\' => {
                    self.pos += if self.pos + 1 < self.end { 2 } else { 1 };
                }
                _ => self.pos += 1,
            }
        }

        Err(ParseError::UnclosedString {
            position: quote_pos,
        })
    }

    /// Back-quoted identifier such as `` `div` ``
    fn parse_delimited_identifier(&mut self) -> ParseResult<&'input str> {
        self.pos += 1; // Skip opening backtick
        let start = self.pos;

        while self.pos < self.end {
            if self.bytes[self.pos] == b'`' {
                let content = self.slice(start, self.pos);
                self.pos += 1;
                return Ok(content);
            }
            self.pos += 1;
        }

        Err(ParseError::ExpectedToken {
            expected: "closing '`'".to_string(),
            position: self.pos,
        })
    }

    fn unexpected_char(&self) -> ParseError {
        let token = self.input[self.pos..]
            .chars()
            .next()
            .map(String::from)
            .unwrap_or_default();
        ParseError::UnexpectedToken {
            token,
            position: self.pos,
        }
    }

    /// Produce the next token, or `None` at the end of input
    pub fn next_token(&mut self) -> ParseResult<Option<Token<'input>>> {
        self.skip_whitespace();
        self.token_start = self.pos;

        if self.pos >= self.end {
            return Ok(None);
        }

        let byte = self.bytes[self.pos];

        if let Some(token) = lookup_single_char_operator(byte) {
            self.pos += 1;
            return Ok(Some(token));
        }

        let token = match byte {
            b'=' | b'!' | b'<' | b'>' => {
                let second = self.bytes.get(self.pos + 1).copied();
                match Self::lookup_two_char_operator(byte, second) {
                    Some((token, consumed)) => {
                        self.pos += consumed;
                        token
                    }
                    None => return Err(self.unexpected_char()),
                }
            }
            b'$' => {
                let remaining = &self.bytes[self.pos..];
                if remaining.starts_with(b"$this")
                    && (remaining.len() == 5 || !Self::is_id_continue(remaining[5]))
                {
                    self.pos += 5;
                    Token::DollarThis
                } else {
                    return Err(self.unexpected_char());
                }
            }
            b'0'..=b'9' => self.parse_number()?,
            b'\'' => Token::String(self.parse_string_literal()?),
            b'`' => Token::Identifier(self.parse_delimited_identifier()?),
            ch if Self::is_id_start(ch) => {
                let ident = self.parse_identifier();
                Token::from_keyword(ident).unwrap_or(Token::Identifier(ident))
            }
            _ => return Err(self.unexpected_char()),
        };

        Ok(Some(token))
    }

    /// Byte offset at which the most recently returned token starts
    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Current byte offset
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Tokenize the remaining input
    pub fn tokenize_all(&mut self) -> ParseResult<Vec<Token<'input>>> {
        let mut tokens = Vec::with_capacity(16);
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }
}

/// Tokenize a complete expression
pub fn tokenize(input: &str) -> ParseResult<Vec<Token<'_>>> {
    Tokenizer::new(input).tokenize_all()
}
