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

//! Error types for FHIRPath evaluation
//!
//! Every failure raised while parsing or evaluating an expression is a
//! [`FhirPathError`]. Template directives never recover from these; they are
//! handed back to the render caller.

use thiserror::Error;

/// Result type alias for FHIRPath operations
pub type Result<T> = std::result::Result<T, FhirPathError>;

/// Error type for FHIRPath parsing and evaluation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FhirPathError {
    /// Parsing errors
    #[error("Parse error at position {position}: {message}")]
    ParseError {
        /// Position in the input where the parse error occurred
        position: usize,
        /// Human-readable error message
        message: String,
    },

    /// Type errors during evaluation
    #[error("Type error: {message}")]
    TypeError {
        /// Human-readable type error message
        message: String,
    },

    /// Runtime evaluation errors
    #[error("Evaluation error: {message}{}",
        expression.as_ref().map(|e| format!(" in expression: {e}")).unwrap_or_default()
    )]
    EvaluationError {
        /// Human-readable evaluation error message
        message: String,
        /// Expression being evaluated when error occurred
        expression: Option<String>,
    },

    /// Unknown function
    #[error("Unknown function: {function_name}")]
    UnknownFunction {
        /// Name of the unknown function
        function_name: String,
    },

    /// Invalid argument count
    #[error("Function '{function_name}' expects {expected} arguments, got {actual}")]
    InvalidArgumentCount {
        /// Name of the function with invalid argument count
        function_name: String,
        /// Expected number of arguments, as written in the signature (e.g. "0 or 1")
        expected: String,
        /// Actual number of arguments received
        actual: usize,
    },
}

impl FhirPathError {
    /// Create a parse error
    pub fn parse_error(position: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            position,
            message: message.into(),
        }
    }

    /// Create a type error
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::TypeError {
            message: message.into(),
        }
    }

    /// Create an evaluation error
    pub fn evaluation_error(message: impl Into<String>) -> Self {
        Self::EvaluationError {
            message: message.into(),
            expression: None,
        }
    }

    /// Create an unknown function error
    pub fn unknown_function(function_name: impl Into<String>) -> Self {
        Self::UnknownFunction {
            function_name: function_name.into(),
        }
    }

    /// Create an invalid argument count error
    pub fn invalid_argument_count(
        function_name: impl Into<String>,
        expected: impl Into<String>,
        actual: usize,
    ) -> Self {
        Self::InvalidArgumentCount {
            function_name: function_name.into(),
            expected: expected.into(),
            actual,
        }
    }

    /// Attach the expression text to an evaluation error
    ///
    /// Other variants are returned unchanged; they already carry enough context.
    pub fn with_expression(self, source: &str) -> Self {
        match self {
            Self::EvaluationError {
                message,
                expression: None,
            } => Self::EvaluationError {
                message,
                expression: Some(source.to_string()),
            },
            other => other,
        }
    }

    /// Whether this error originates from the parser
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FhirPathError::parse_error(4, "Unexpected token ')'");
        assert_eq!(
            err.to_string(),
            "Parse error at position 4: Unexpected token ')'"
        );

        let err = FhirPathError::invalid_argument_count("where", "1", 0);
        assert_eq!(
            err.to_string(),
            "Function 'where' expects 1 arguments, got 0"
        );
    }

    #[test]
    fn test_with_expression() {
        let err = FhirPathError::evaluation_error("boom").with_expression("Patient.name");
        assert_eq!(
            err.to_string(),
            "Evaluation error: boom in expression: Patient.name"
        );

        let err = FhirPathError::unknown_function("foo").with_expression("foo()");
        assert!(matches!(err, FhirPathError::UnknownFunction { .. }));
        assert!(!err.is_parse_error());
    }
}
