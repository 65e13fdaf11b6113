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
//! The capability a directive needs from the template engine
//!
//! Directives never talk to Handlebars directly. They read the invocation's
//! scope and arguments and ask it to render one of the two bodies, which keeps
//! the query logic testable without a template registry.

use crate::error::FhirPathError;
use serde_json::Value;
use thiserror::Error;

/// Name of the hash argument holding the FHIRPath expression
pub const EXPRESSION_ARGUMENT: &str = "expression";

/// Loop metadata exposed to each iteration of an iterating body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopPosition {
    /// Zero-based index of the item
    pub index: usize,
    /// Whether this is the first item
    pub first: bool,
    /// Whether this is the last item
    pub last: bool,
}

impl LoopPosition {
    /// Position of item `index` in a sequence of `total` items
    pub fn new(index: usize, total: usize) -> Self {
        Self {
            index,
            first: index == 0,
            last: index + 1 == total,
        }
    }
}

/// The context a body is rendered with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BodyScope<'a> {
    /// The scope the directive itself was invoked with
    Current,
    /// A value bound by the directive
    Bound(&'a Value),
    /// One item of an iteration
    Item {
        /// The item rendered as the body's context
        value: &'a Value,
        /// Where the item sits in the iteration
        position: LoopPosition,
    },
}

/// Errors raised by a directive before or while querying
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectiveError {
    /// The block was invoked without a context parameter
    #[error("Helper '{directive}' requires a context parameter")]
    MissingContext {
        /// Directive name
        directive: &'static str,
    },

    /// A required hash argument was not supplied
    #[error("Helper '{directive}' requires the '{argument}' argument")]
    MissingArgument {
        /// Directive name
        directive: &'static str,
        /// Argument name
        argument: &'static str,
    },

    /// A hash argument had the wrong JSON type
    #[error("Helper '{directive}' expects '{argument}' to be a string, got {found}")]
    InvalidArgument {
        /// Directive name
        directive: &'static str,
        /// Argument name
        argument: &'static str,
        /// JSON type that was supplied
        found: &'static str,
    },

    /// The FHIRPath expression failed to parse or evaluate
    #[error(transparent)]
    Query(#[from] FhirPathError),
}

/// One invocation of a block directive inside a template
///
/// Implementations own everything engine specific: where the scope and root
/// come from, how arguments are looked up and how bodies are rendered.
pub trait BlockInvocation {
    /// Error produced by rendering; directive failures convert into it
    type Error: From<DirectiveError>;

    /// Name the directive was registered under
    fn directive(&self) -> &'static str;

    /// The block's context parameter, `None` when the block was given none
    fn scope(&self) -> Option<&Value>;

    /// The document the whole render started from
    fn root(&self) -> &Value;

    /// A named argument of the invocation
    fn argument(&self, name: &str) -> Option<&Value>;

    /// Render the primary body
    fn render_body(&mut self, scope: BodyScope<'_>) -> Result<(), Self::Error>;

    /// Render the `{{else}}` body; renders nothing when the block has none
    fn render_alternative(&mut self) -> Result<(), Self::Error>;
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Read the expression argument of an invocation
pub fn expression_argument<I>(invocation: &I) -> Result<&str, DirectiveError>
where
    I: BlockInvocation + ?Sized,
{
    let directive = invocation.directive();
    match invocation.argument(EXPRESSION_ARGUMENT) {
        Some(Value::String(expression)) => Ok(expression.as_str()),
        None | Some(Value::Null) => Err(DirectiveError::MissingArgument {
            directive,
            argument: EXPRESSION_ARGUMENT,
        }),
        Some(other) => Err(DirectiveError::InvalidArgument {
            directive,
            argument: EXPRESSION_ARGUMENT,
            found: json_type_name(other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_loop_position() {
        assert_eq!(
            LoopPosition::new(0, 3),
            LoopPosition {
                index: 0,
                first: true,
                last: false
            }
        );
        assert_eq!(
            LoopPosition::new(2, 3),
            LoopPosition {
                index: 2,
                first: false,
                last: true
            }
        );
        let only = LoopPosition::new(0, 1);
        assert!(only.first && only.last);
    }

    #[test]
    fn test_error_messages() {
        let err = DirectiveError::MissingArgument {
            directive: "if-fhir",
            argument: EXPRESSION_ARGUMENT,
        };
        assert_eq!(
            err.to_string(),
            "Helper 'if-fhir' requires the 'expression' argument"
        );

        let err: DirectiveError = FhirPathError::unknown_function("foo").into();
        assert_eq!(err.to_string(), "Unknown function: foo");
    }
}
