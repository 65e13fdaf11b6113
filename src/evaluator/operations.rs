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
//! Operator evaluation: equality, ordering, boolean logic and union

use super::Evaluator;
use crate::ast::{BinaryOpData, BinaryOperator};
use crate::error::{FhirPathError, Result};
use crate::model::Collection;
use serde_json::Value;
use std::cmp::Ordering;

impl Evaluator {
    pub(super) fn evaluate_binary_operation(
        &self,
        data: &BinaryOpData,
        focus: &[Value],
    ) -> Result<Collection> {
        let left = self.evaluate_node(&data.left, focus)?;
        let right = self.evaluate_node(&data.right, focus)?;

        match data.op {
            BinaryOperator::Union => Ok(union(&left, &right)),
            BinaryOperator::Equal => Ok(boolean_result(equals(&left, &right))),
            BinaryOperator::NotEqual => Ok(boolean_result(equals(&left, &right).map(|b| !b))),
            BinaryOperator::LessThan
            | BinaryOperator::LessThanOrEqual
            | BinaryOperator::GreaterThan
            | BinaryOperator::GreaterThanOrEqual => {
                let ordering = compare(data.op, &left, &right)?;
                Ok(boolean_result(ordering.map(|ord| match data.op {
                    BinaryOperator::LessThan => ord == Ordering::Less,
                    BinaryOperator::LessThanOrEqual => ord != Ordering::Greater,
                    BinaryOperator::GreaterThan => ord == Ordering::Greater,
                    _ => ord != Ordering::Less,
                })))
            }
            BinaryOperator::And => {
                let (l, r) = (to_boolean(&left)?, to_boolean(&right)?);
                Ok(boolean_result(match (l, r) {
                    (Some(false), _) | (_, Some(false)) => Some(false),
                    (Some(true), Some(true)) => Some(true),
                    _ => None,
                }))
            }
            BinaryOperator::Or => {
                let (l, r) = (to_boolean(&left)?, to_boolean(&right)?);
                Ok(boolean_result(match (l, r) {
                    (Some(true), _) | (_, Some(true)) => Some(true),
                    (Some(false), Some(false)) => Some(false),
                    _ => None,
                }))
            }
            BinaryOperator::Xor => {
                let (l, r) = (to_boolean(&left)?, to_boolean(&right)?);
                Ok(boolean_result(l.zip(r).map(|(l, r)| l != r)))
            }
            BinaryOperator::Implies => {
                let (l, r) = (to_boolean(&left)?, to_boolean(&right)?);
                Ok(boolean_result(match (l, r) {
                    (Some(true), r) => r,
                    (Some(false), _) | (None, Some(true)) => Some(true),
                    (None, _) => None,
                }))
            }
        }
    }
}

pub(super) fn boolean_result(value: Option<bool>) -> Collection {
    value.map(Value::Bool).into_iter().collect()
}

/// Item equality; numbers compare by value regardless of representation
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64() == r.as_f64(),
        _ => left == right,
    }
}

/// Collection equality, `None` when either side is empty
fn equals(left: &[Value], right: &[Value]) -> Option<bool> {
    if left.is_empty() || right.is_empty() {
        return None;
    }
    if left.len() != right.len() {
        return Some(false);
    }
    Some(left.iter().zip(right).all(|(l, r)| values_equal(l, r)))
}

fn compare(op: BinaryOperator, left: &[Value], right: &[Value]) -> Result<Option<Ordering>> {
    let (l, r) = match (left, right) {
        ([], _) | (_, []) => return Ok(None),
        ([l], [r]) => (l, r),
        _ => {
            return Err(FhirPathError::evaluation_error(format!(
                "Operator '{}' requires single values on both sides",
                op.symbol()
            )));
        }
    };

    match (l, r) {
        (Value::Number(a), Value::Number(b)) => Ok(a
            .as_f64()
            .zip(b.as_f64())
            .and_then(|(a, b)| a.partial_cmp(&b))),
        (Value::String(a), Value::String(b)) => Ok(Some(a.cmp(b))),
        _ => Err(FhirPathError::type_error(format!(
            "Cannot compare {l} and {r} with '{}'",
            op.symbol()
        ))),
    }
}

/// Convert a collection to a boolean using singleton evaluation
///
/// An empty collection is `None`, a single boolean is itself and any other
/// single item is `true`. More than one item is an error.
pub fn to_boolean(collection: &[Value]) -> Result<Option<bool>> {
    match collection {
        [] => Ok(None),
        [Value::Bool(b)] => Ok(Some(*b)),
        [_] => Ok(Some(true)),
        _ => Err(FhirPathError::evaluation_error(format!(
            "Expected a single boolean value, got {} items",
            collection.len()
        ))),
    }
}

/// Merge two collections, dropping duplicates and keeping first-seen order
pub fn union(left: &[Value], right: &[Value]) -> Collection {
    let mut result = Collection::with_capacity(left.len() + right.len());
    for item in left.iter().chain(right) {
        if !result.iter().any(|existing| values_equal(existing, item)) {
            result.push(item.clone());
        }
    }
    result
}
