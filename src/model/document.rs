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

//! Structural view over JSON documents

use serde_json::{Map, Value};

/// Ordered sequence of values produced by evaluating an expression
pub type Collection = Vec<Value>;

/// Shape of a document node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    /// Object with named fields
    Mapping(&'a Map<String, Value>),
    /// Ordered array of nodes
    Sequence(&'a [Value]),
    /// String, number or boolean
    Scalar(&'a Value),
    /// `null`, or a field that is not present
    Absent,
}

impl<'a> Node<'a> {
    /// Classify a JSON value
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Node::Mapping(map),
            Value::Array(items) => Node::Sequence(items),
            Value::Null => Node::Absent,
            scalar => Node::Scalar(scalar),
        }
    }

    /// Named child of a mapping, [`Node::Absent`] for anything else
    pub fn field(&self, name: &str) -> Node<'a> {
        match *self {
            Node::Mapping(map) => map.get(name).map(Node::of).unwrap_or(Node::Absent),
            _ => Node::Absent,
        }
    }

    /// String content of a scalar string node
    pub fn as_str(&self) -> Option<&'a str> {
        match *self {
            Node::Scalar(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The `resourceType` of a mapping that represents a resource
    pub fn resource_type(&self) -> Option<&'a str> {
        self.field("resourceType").as_str()
    }

    /// The logical `id` of a mapping that represents a resource
    pub fn id(&self) -> Option<&'a str> {
        self.field("id").as_str()
    }

    /// Whether the node carries no content
    ///
    /// Absent nodes, empty strings, empty mappings and empty sequences are
    /// empty. `false` and `0` are values and therefore not empty.
    pub fn is_empty(&self) -> bool {
        match *self {
            Node::Absent => true,
            Node::Mapping(map) => map.is_empty(),
            Node::Sequence(items) => items.is_empty(),
            Node::Scalar(Value::String(s)) => s.is_empty(),
            Node::Scalar(_) => false,
        }
    }
}

/// Turn an evaluation context into the collection an expression starts from
///
/// Arrays contribute their items, `null` contributes nothing, any other value
/// is a singleton.
pub fn to_collection(value: &Value) -> Collection {
    match Node::of(value) {
        Node::Sequence(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .cloned()
            .collect(),
        Node::Absent => Vec::new(),
        _ => vec![value.clone()],
    }
}

/// Whether a single value should be treated as "no match"
pub fn is_empty_value(value: &Value) -> bool {
    Node::of(value).is_empty()
}

/// Whether a query result should be treated as "no match"
///
/// True for an empty sequence and for a sequence made only of absent values.
/// Every directive uses this same definition.
pub fn is_empty_result(result: &[Value]) -> bool {
    result
        .iter()
        .all(|value| matches!(Node::of(value), Node::Absent))
}
