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

//! Pratt parser for FHIRPath expressions
//!
//! Primary expressions and postfix invocations (`.name`, `.fn(..)`, `[i]`) bind
//! tightest; binary operators are folded by precedence climbing using
//! [`BinaryOperator::precedence`].

use super::error::{ParseError, ParseResult};
use super::tokenizer::{Token, Tokenizer};
use crate::ast::{Arguments, BinaryOperator, ExpressionNode, LiteralValue};

/// Map a token onto the binary operator it introduces
#[inline(always)]
fn token_to_binary_op(token: &Token<'_>) -> Option<BinaryOperator> {
    match token {
        Token::Equal => Some(BinaryOperator::Equal),
        Token::NotEqual => Some(BinaryOperator::NotEqual),
        Token::LessThan => Some(BinaryOperator::LessThan),
        Token::LessThanOrEqual => Some(BinaryOperator::LessThanOrEqual),
        Token::GreaterThan => Some(BinaryOperator::GreaterThan),
        Token::GreaterThanOrEqual => Some(BinaryOperator::GreaterThanOrEqual),
        Token::And => Some(BinaryOperator::And),
        Token::Or => Some(BinaryOperator::Or),
        Token::Xor => Some(BinaryOperator::Xor),
        Token::Implies => Some(BinaryOperator::Implies),
        Token::Union => Some(BinaryOperator::Union),
        _ => None,
    }
}

/// Pratt parser over a [`Tokenizer`]
pub struct PrattParser<'input> {
    tokenizer: Tokenizer<'input>,
    current_token: Option<Token<'input>>,
    current_pos: usize,
}

impl<'input> PrattParser<'input> {
    /// Create new parser
    #[inline]
    pub fn new(input: &'input str) -> Self {
        Self {
            tokenizer: Tokenizer::new(input),
            current_token: None,
            current_pos: 0,
        }
    }

    #[inline(always)]
    fn advance(&mut self) -> ParseResult<()> {
        self.current_token = self.tokenizer.next_token()?;
        self.current_pos = self.tokenizer.token_start();
        Ok(())
    }

    #[inline(always)]
    fn current(&self) -> Option<&Token<'input>> {
        self.current_token.as_ref()
    }

    fn expect(&mut self, expected: Token<'input>, description: &str) -> ParseResult<()> {
        match &self.current_token {
            Some(token) if *token == expected => self.advance(),
            _ => Err(ParseError::ExpectedToken {
                expected: description.to_string(),
                position: self.current_pos,
            }),
        }
    }

    fn unexpected(&self) -> ParseError {
        match &self.current_token {
            Some(token) => ParseError::UnexpectedToken {
                token: format!("{token:?}"),
                position: self.current_pos,
            },
            None => ParseError::UnexpectedEndOfInput {
                position: self.current_pos,
            },
        }
    }

    /// Parse primary expression (literals, identifiers, parenthesized expressions)
    fn parse_primary(&mut self) -> ParseResult<ExpressionNode> {
        let position = self.current_pos;
        let token = match self.current_token.clone() {
            Some(token) => token,
            None => return Err(self.unexpected()),
        };

        match token {
            Token::Identifier(name) => {
                self.advance()?;
                if let Some(Token::LeftParen) = self.current() {
                    let args = self.parse_arguments()?;
                    Ok(ExpressionNode::function_call(name, args))
                } else {
                    Ok(ExpressionNode::identifier(name))
                }
            }
            Token::Integer(value) => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Integer(value)))
            }
            Token::Decimal(value) => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Decimal(
                    value.to_string(),
                )))
            }
            Token::String(value) => {
                self.advance()?;
                let processed = Self::process_string_escapes(value, position)?;
                Ok(ExpressionNode::literal(LiteralValue::String(processed)))
            }
            Token::True => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Boolean(true)))
            }
            Token::False => {
                self.advance()?;
                Ok(ExpressionNode::literal(LiteralValue::Boolean(false)))
            }
            Token::DollarThis => {
                self.advance()?;
                Ok(ExpressionNode::variable("this"))
            }
            Token::LeftParen => {
                self.advance()?;
                let inner = self.parse_expression_with_precedence(0)?;
                self.expect(Token::RightParen, "')'")?;
                Ok(inner)
            }
            _ => Err(self.unexpected()),
        }
    }

    /// Parse a parenthesized argument list; the current token must be `(`
    fn parse_arguments(&mut self) -> ParseResult<Arguments> {
        self.expect(Token::LeftParen, "'('")?;

        let mut args = Arguments::new();
        if let Some(Token::RightParen) = self.current() {
            self.advance()?;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression_with_precedence(0)?);

            match self.current() {
                Some(Token::Comma) => self.advance()?,
                Some(Token::RightParen) => {
                    self.advance()?;
                    break;
                }
                _ => {
                    return Err(ParseError::ExpectedToken {
                        expected: "',' or ')' in function arguments".to_string(),
                        position: self.current_pos,
                    });
                }
            }
        }

        Ok(args)
    }

    /// Parse postfix expressions (method calls, indexing, path navigation)
    fn parse_postfix(&mut self, mut left: ExpressionNode) -> ParseResult<ExpressionNode> {
        loop {
            match self.current() {
                Some(Token::Dot) => {
                    self.advance()?;
                    let name = match self.current().and_then(Token::as_identifier) {
                        Some(name) => name,
                        None => {
                            return Err(ParseError::ExpectedToken {
                                expected: "identifier after '.'".to_string(),
                                position: self.current_pos,
                            });
                        }
                    };
                    self.advance()?;

                    left = if let Some(Token::LeftParen) = self.current() {
                        let args = self.parse_arguments()?;
                        ExpressionNode::method_call(left, name, args)
                    } else {
                        ExpressionNode::path(left, name)
                    };
                }
                Some(Token::LeftBracket) => {
                    self.advance()?;
                    let index = self.parse_expression_with_precedence(0)?;
                    self.expect(Token::RightBracket, "']'")?;
                    left = ExpressionNode::index(left, index);
                }
                _ => break,
            }
        }
        Ok(left)
    }

    /// Core precedence-climbing loop
    fn parse_expression_with_precedence(
        &mut self,
        min_precedence: u8,
    ) -> ParseResult<ExpressionNode> {
        let mut left = self.parse_primary()?;
        left = self.parse_postfix(left)?;

        while let Some(op) = self.current().and_then(token_to_binary_op) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance()?;

            let next_min_precedence = if op.is_left_associative() {
                precedence + 1
            } else {
                precedence
            };
            let right = self.parse_expression_with_precedence(next_min_precedence)?;
            left = ExpressionNode::binary_op(op, left, right);
        }

        Ok(left)
    }

    /// Parse complete input
    pub fn parse(&mut self) -> ParseResult<ExpressionNode> {
        self.advance()?;
        let expr = self.parse_expression_with_precedence(0)?;

        // Ensure we consumed all input
        if self.current_token.is_some() {
            return Err(self.unexpected());
        }

        Ok(expr)
    }

    /// Process escape sequences in string literals, including Unicode escapes
    fn process_string_escapes(input: &str, position: usize) -> ParseResult<String> {
        let mut result = String::with_capacity(input.len());
        let mut chars = input.chars();

        while let Some(ch) = chars.next() {
            if ch != '\\' {
                result.push(ch);
                continue;
            }

            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('r') => result.push('\r'),
                Some('f') => result.push('\u{000C}'),
                Some('\\') => result.push('\\'),
                Some('\'') => result.push('\''),
                Some('"') => result.push('"'),
                Some('`') => result.push('`'),
                Some('/') => result.push('/'),
                Some('u') => {
                    let hex_chars: String = chars.by_ref().take(4).collect();
                    let decoded = if hex_chars.len() == 4 {
                        u32::from_str_radix(&hex_chars, 16)
                            .ok()
                            .and_then(char::from_u32)
                    } else {
                        None
                    };
                    match decoded {
                        Some(unicode_char) => result.push(unicode_char),
                        None => {
                            return Err(ParseError::InvalidEscape {
                                sequence: format!("\\u{hex_chars}"),
                                position,
                            });
                        }
                    }
                }
                Some(escaped_ch) => {
                    // Unknown escape sequence - keep literally
                    result.push('\\');
                    result.push(escaped_ch);
                }
                None => {
                    return Err(ParseError::InvalidEscape {
                        sequence: "\\".to_string(),
                        position,
                    });
                }
            }
        }

        Ok(result)
    }
}

/// Parse an expression string into an AST
#[inline]
pub fn parse_expression_pratt(input: &str) -> ParseResult<ExpressionNode> {
    PrattParser::new(input).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_expressions() {
        let result = parse_expression_pratt("Patient").unwrap();
        assert_eq!(result, ExpressionNode::identifier("Patient"));

        let result = parse_expression_pratt("Patient.name").unwrap();
        assert_eq!(
            result,
            ExpressionNode::path(ExpressionNode::identifier("Patient"), "name")
        );
    }

    #[test]
    fn test_union_binds_tighter_than_equality() {
        let result = parse_expression_pratt("a | b = c").unwrap();
        match result {
            ExpressionNode::BinaryOp(data) => {
                assert_eq!(data.op, BinaryOperator::Equal);
                assert!(matches!(
                    data.left,
                    ExpressionNode::BinaryOp(ref inner) if inner.op == BinaryOperator::Union
                ));
            }
            other => panic!("Expected equality at the root, got {other:?}"),
        }
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let result = parse_expression_pratt("a or b and c").unwrap();
        match result {
            ExpressionNode::BinaryOp(data) => {
                assert_eq!(data.op, BinaryOperator::Or);
                assert!(matches!(
                    data.right,
                    ExpressionNode::BinaryOp(ref inner) if inner.op == BinaryOperator::And
                ));
            }
            other => panic!("Expected or at the root, got {other:?}"),
        }
    }

    #[test]
    fn test_implies_is_right_associative() {
        let result = parse_expression_pratt("a implies b implies c").unwrap();
        match result {
            ExpressionNode::BinaryOp(data) => {
                assert_eq!(data.op, BinaryOperator::Implies);
                assert!(matches!(data.left, ExpressionNode::Identifier(_)));
                assert!(matches!(
                    data.right,
                    ExpressionNode::BinaryOp(ref inner) if inner.op == BinaryOperator::Implies
                ));
            }
            other => panic!("Expected implies at the root, got {other:?}"),
        }
    }

    #[test]
    fn test_function_calls() {
        let result = parse_expression_pratt("exists()").unwrap();
        assert!(matches!(result, ExpressionNode::FunctionCall(_)));

        let result = parse_expression_pratt("name.where(use = 'official').given.first()").unwrap();
        match result {
            ExpressionNode::MethodCall(data) => {
                assert_eq!(data.method, "first");
                assert!(data.args.is_empty());
            }
            other => panic!("Expected method call, got {other:?}"),
        }
    }

    #[test]
    fn test_indexer_and_variables() {
        let result = parse_expression_pratt("entry[0].resource").unwrap();
        assert!(matches!(result, ExpressionNode::Path { .. }));

        let result = parse_expression_pratt("$this = 'a'").unwrap();
        match result {
            ExpressionNode::BinaryOp(data) => {
                assert_eq!(data.left, ExpressionNode::variable("this"));
            }
            other => panic!("Expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn test_string_escapes() {
        let result = parse_expression_pratt(r"'it\'s A'").unwrap();
        assert_eq!(
            result,
            ExpressionNode::literal(LiteralValue::String("it's A".to_string()))
        );

        assert!(matches!(
            parse_expression_pratt(r"'\u00'"),
            Err(ParseError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_expression_pratt("name.").unwrap_err(),
            ParseError::ExpectedToken {
                expected: "identifier after '.'".to_string(),
                position: 5,
            }
        );
        assert_eq!(
            parse_expression_pratt("").unwrap_err(),
            ParseError::UnexpectedEndOfInput { position: 0 }
        );
        assert!(matches!(
            parse_expression_pratt("name name"),
            Err(ParseError::UnexpectedToken { position: 5, .. })
        ));
        assert!(matches!(
            parse_expression_pratt("where(a = 1"),
            Err(ParseError::ExpectedToken { .. })
        ));
    }
}
