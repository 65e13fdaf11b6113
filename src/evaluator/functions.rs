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
//! Function library: filtering, projection, existence and subsetting

use super::Evaluator;
use super::operations::{boolean_result, to_boolean, union};
use crate::ast::ExpressionNode;
use crate::error::{FhirPathError, Result};
use crate::model::Collection;
use serde_json::Value;
use std::slice;

fn check_arity(name: &str, args: &[ExpressionNode], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{min} or {max}")
    };
    Err(FhirPathError::invalid_argument_count(
        name,
        expected,
        args.len(),
    ))
}

impl Evaluator {
    /// Evaluate a function against its input collection
    ///
    /// Criteria and projection arguments are evaluated once per input item
    /// with that item as the focus.
    pub(super) fn evaluate_function(
        &self,
        name: &str,
        args: &[ExpressionNode],
        mut input: Collection,
    ) -> Result<Collection> {
        match name {
            "where" => {
                check_arity(name, args, 1, 1)?;
                self.filter(&args[0], input)
            }
            "select" => {
                check_arity(name, args, 1, 1)?;
                let mut result = Collection::new();
                for item in &input {
                    result.extend(self.evaluate_node(&args[0], slice::from_ref(item))?);
                }
                Ok(result)
            }
            "exists" => {
                check_arity(name, args, 0, 1)?;
                let matched = match args.first() {
                    Some(criteria) => self.filter(criteria, input)?,
                    None => input,
                };
                Ok(vec![Value::Bool(!matched.is_empty())])
            }
            "empty" => {
                check_arity(name, args, 0, 0)?;
                Ok(vec![Value::Bool(input.is_empty())])
            }
            "first" => {
                check_arity(name, args, 0, 0)?;
                input.truncate(1);
                Ok(input)
            }
            "last" => {
                check_arity(name, args, 0, 0)?;
                Ok(input.pop().into_iter().collect())
            }
            "tail" => {
                check_arity(name, args, 0, 0)?;
                Ok(input.into_iter().skip(1).collect())
            }
            "count" => {
                check_arity(name, args, 0, 0)?;
                Ok(vec![Value::from(input.len())])
            }
            "not" => {
                check_arity(name, args, 0, 0)?;
                Ok(boolean_result(to_boolean(&input)?.map(|b| !b)))
            }
            "distinct" => {
                check_arity(name, args, 0, 0)?;
                Ok(union(&input, &[]))
            }
            _ => Err(FhirPathError::unknown_function(name)),
        }
    }

    fn filter(&self, criteria: &ExpressionNode, input: Collection) -> Result<Collection> {
        let mut result = Collection::with_capacity(input.len());
        for item in input {
            let matched = self.evaluate_node(criteria, slice::from_ref(&item))?;
            if to_boolean(&matched)? == Some(true) {
                result.push(item);
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_expression;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn eval(expression: &str) -> Result<Collection> {
        let doc = json!({
            "resourceType": "Foo",
            "bar": [
                {"val": "a", "flag": true},
                {"val": "b", "flag": false},
                {"val": "c"}
            ],
            "tags": ["x", "y", "x"]
        });
        let ast = parse_expression(expression)?;
        Evaluator::new().evaluate(&ast, &doc)
    }

    #[test]
    fn test_where_and_select() {
        assert_eq!(
            eval("bar.where(val = 'b').val").unwrap(),
            vec![json!("b")]
        );
        assert_eq!(eval("bar.where(flag).val").unwrap(), vec![json!("a")]);
        assert_eq!(
            eval("bar.select(val)").unwrap(),
            vec![json!("a"), json!("b"), json!("c")]
        );
        assert_eq!(
            eval("bar.where($this.val != 'a').count()").unwrap(),
            vec![json!(2)]
        );
    }

    #[test]
    fn test_existence() {
        assert_eq!(eval("bar.exists()").unwrap(), vec![json!(true)]);
        assert_eq!(eval("missing.exists()").unwrap(), vec![json!(false)]);
        assert_eq!(eval("bar.exists(val = 'z')").unwrap(), vec![json!(false)]);
        assert_eq!(eval("missing.empty()").unwrap(), vec![json!(true)]);
        assert_eq!(eval("Foo.exists()").unwrap(), vec![json!(true)]);
    }

    #[test]
    fn test_subsetting() {
        assert_eq!(eval("bar.val.first()").unwrap(), vec![json!("a")]);
        assert_eq!(eval("bar.val.last()").unwrap(), vec![json!("c")]);
        assert_eq!(
            eval("bar.val.tail()").unwrap(),
            vec![json!("b"), json!("c")]
        );
        assert!(eval("missing.first()").unwrap().is_empty());
        assert_eq!(eval("tags.distinct()").unwrap(), vec![json!("x"), json!("y")]);
    }

    #[test]
    fn test_not() {
        assert_eq!(eval("bar.first().flag.not()").unwrap(), vec![json!(false)]);
        assert!(eval("missing.not()").unwrap().is_empty());
    }

    #[test]
    fn test_argument_count() {
        assert_eq!(
            eval("bar.where()").unwrap_err(),
            FhirPathError::invalid_argument_count("where", "1", 0)
        );
        assert_eq!(
            eval("bar.exists(val, flag)").unwrap_err(),
            FhirPathError::invalid_argument_count("exists", "0 or 1", 2)
        );
    }

    #[test]
    fn test_where_requires_singleton_criteria() {
        assert!(eval("$this.where(tags)").is_err());
    }
}
