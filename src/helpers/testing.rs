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
//! Recording invocation used by directive unit tests

use super::invocation::{BlockInvocation, BodyScope, DirectiveError, LoopPosition};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Rendered {
    /// Primary body with the invocation's own scope
    Current,
    /// Primary body with a bound value
    Bound(Value),
    /// Primary body for one iteration
    Item(Value, LoopPosition),
    /// The `{{else}}` body
    Alternative,
}

#[derive(Debug)]
pub(crate) struct RecordingInvocation {
    pub scope: Option<Value>,
    pub root: Value,
    pub arguments: Map<String, Value>,
    pub rendered: Vec<Rendered>,
}

impl RecordingInvocation {
    /// Invocation whose scope is the root document, like `{{#x this expression="..."}}`
    pub fn new(root: Value, expression: &str) -> Self {
        let mut arguments = Map::new();
        arguments.insert("expression".to_string(), Value::from(expression));
        Self {
            scope: Some(root.clone()),
            root,
            arguments,
            rendered: Vec::new(),
        }
    }
}

impl BlockInvocation for RecordingInvocation {
    type Error = DirectiveError;

    fn directive(&self) -> &'static str {
        "test"
    }

    fn scope(&self) -> Option<&Value> {
        self.scope.as_ref()
    }

    fn root(&self) -> &Value {
        &self.root
    }

    fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.get(name)
    }

    fn render_body(&mut self, scope: BodyScope<'_>) -> Result<(), DirectiveError> {
        self.rendered.push(match scope {
            BodyScope::Current => Rendered::Current,
            BodyScope::Bound(value) => Rendered::Bound(value.clone()),
            BodyScope::Item { value, position } => Rendered::Item(value.clone(), position),
        });
        Ok(())
    }

    fn render_alternative(&mut self) -> Result<(), DirectiveError> {
        self.rendered.push(Rendered::Alternative);
        Ok(())
    }
}
