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

//! FHIRPath expression parser
//!
//! Converts expression text into an [`ExpressionNode`] tree using a
//! hand-written tokenizer and a Pratt parser.

pub mod error;
pub mod pratt;
pub mod tokenizer;

pub use error::{ParseError, ParseResult};
pub use pratt::parse_expression_pratt;
pub use tokenizer::{Token, Tokenizer};

use crate::ast::ExpressionNode;

/// Parse a FHIRPath expression string into an AST
pub fn parse_expression(input: &str) -> crate::error::Result<ExpressionNode> {
    parse_expression_pratt(input).map_err(Into::into)
}
