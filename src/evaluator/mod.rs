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
//! Tree-walking evaluation of parsed FHIRPath expressions
//!
//! Every expression evaluates against a focus collection and produces a new
//! collection. Navigation lives in [`navigation`], operators in `operations`
//! and the supported function library in `functions`.

mod functions;
pub mod navigation;
mod operations;

pub use navigation::{navigate, navigate_path};
pub use operations::{to_boolean, union, values_equal};

use crate::ast::{ExpressionNode, LiteralValue};
use crate::error::{FhirPathError, Result};
use crate::model::{Collection, to_collection};
use serde_json::{Number, Value};

/// Stateless evaluator for parsed expressions
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    /// Create a new evaluator
    pub fn new() -> Self {
        Self
    }

    /// Evaluate an expression with `input` as the initial focus
    pub fn evaluate(&self, node: &ExpressionNode, input: &Value) -> Result<Collection> {
        let focus = to_collection(input);
        self.evaluate_node(node, &focus)
    }

    pub(crate) fn evaluate_node(
        &self,
        node: &ExpressionNode,
        focus: &[Value],
    ) -> Result<Collection> {
        match node {
            ExpressionNode::Literal(literal) => literal_to_collection(literal),
            ExpressionNode::Identifier(name) => Ok(navigate(focus, name)),
            ExpressionNode::Path { base, path } => {
                let base = self.evaluate_node(base, focus)?;
                Ok(navigate(&base, path))
            }
            ExpressionNode::BinaryOp(data) => self.evaluate_binary_operation(data, focus),
            ExpressionNode::FunctionCall(data) => {
                self.evaluate_function(&data.name, &data.args, focus.to_vec())
            }
            ExpressionNode::MethodCall(data) => {
                let base = self.evaluate_node(&data.base, focus)?;
                self.evaluate_function(&data.method, &data.args, base)
            }
            ExpressionNode::Index { base, index } => self.evaluate_index(base, index, focus),
            ExpressionNode::Variable(name) => match name.as_str() {
                "this" => Ok(focus.to_vec()),
                other => Err(FhirPathError::evaluation_error(format!(
                    "Unknown variable: ${other}"
                ))),
            },
        }
    }

    fn evaluate_index(
        &self,
        base: &ExpressionNode,
        index: &ExpressionNode,
        focus: &[Value],
    ) -> Result<Collection> {
        let index = self.evaluate_node(index, focus)?;
        let position = match index.as_slice() {
            [] => return Ok(Vec::new()),
            [Value::Number(n)] => n.as_i64().ok_or_else(|| {
                FhirPathError::type_error(format!("Index must be an integer, got {n}"))
            })?,
            [other] => {
                return Err(FhirPathError::type_error(format!(
                    "Index must be an integer, got {other}"
                )));
            }
            _ => {
                return Err(FhirPathError::evaluation_error(
                    "Index expression returned more than one value",
                ));
            }
        };

        let mut base = self.evaluate_node(base, focus)?;
        let item = usize::try_from(position)
            .ok()
            .filter(|&i| i < base.len())
            .map(|i| base.swap_remove(i));
        Ok(item.into_iter().collect())
    }
}

fn literal_to_collection(literal: &LiteralValue) -> Result<Collection> {
    let value = match literal {
        LiteralValue::Boolean(b) => Value::Bool(*b),
        LiteralValue::Integer(i) => Value::from(*i),
        LiteralValue::String(s) => Value::String(s.clone()),
        LiteralValue::Decimal(text) => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| FhirPathError::type_error(format!("Invalid decimal literal: {text}")))?,
    };
    Ok(vec![value])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn eval(expression: &str, input: &Value) -> Result<Collection> {
        let ast = parse_expression(expression)?;
        Evaluator::new().evaluate(&ast, input)
    }

    #[test]
    fn test_literals() {
        assert_eq!(eval("'text'", &Value::Null).unwrap(), vec![json!("text")]);
        assert_eq!(eval("42", &Value::Null).unwrap(), vec![json!(42)]);
        assert_eq!(eval("1.5", &Value::Null).unwrap(), vec![json!(1.5)]);
        assert_eq!(eval("true", &Value::Null).unwrap(), vec![json!(true)]);
    }

    #[test]
    fn test_this_is_the_focus() {
        let doc = json!({"a": 1});
        assert_eq!(eval("$this", &doc).unwrap(), vec![doc.clone()]);
        assert_eq!(eval("$this", &Value::Null).unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn test_indexer() {
        let doc = json!({"items": ["a", "b", "c"]});
        assert_eq!(eval("items[0]", &doc).unwrap(), vec![json!("a")]);
        assert_eq!(eval("items[2]", &doc).unwrap(), vec![json!("c")]);
        assert!(eval("items[3]", &doc).unwrap().is_empty());
        assert!(matches!(
            eval("items['x']", &doc),
            Err(FhirPathError::TypeError { .. })
        ));
    }

    #[test]
    fn test_unknown_function() {
        let err = eval("frobnicate()", &json!({})).unwrap_err();
        assert_eq!(
            err,
            FhirPathError::UnknownFunction {
                function_name: "frobnicate".to_string()
            }
        );
    }
}
