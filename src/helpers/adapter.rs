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
//! Handlebars binding for the FHIRPath directives

use super::invocation::{BlockInvocation, BodyScope, DirectiveError};
use super::Directive;
use crate::engine::FhirPathEngine;
use handlebars::{
    BlockContext, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderError, RenderErrorReason, Renderable, Template,
};
use serde_json::Value;
use std::sync::Arc;

impl From<DirectiveError> for RenderError {
    fn from(err: DirectiveError) -> Self {
        RenderErrorReason::NestedError(Box::new(err)).into()
    }
}

/// A block helper call seen through [`BlockInvocation`]
pub struct HandlebarsInvocation<'a, 'reg, 'rc> {
    directive: &'static str,
    helper: &'a Helper<'rc>,
    registry: &'reg Handlebars<'reg>,
    context: &'rc Context,
    render_context: &'a mut RenderContext<'reg, 'rc>,
    out: &'a mut dyn Output,
}

impl<'a, 'reg: 'rc, 'rc> HandlebarsInvocation<'a, 'reg, 'rc> {
    /// Wrap the arguments Handlebars passes to [`HelperDef::call`]
    pub fn new(
        directive: &'static str,
        helper: &'a Helper<'rc>,
        registry: &'reg Handlebars<'reg>,
        context: &'rc Context,
        render_context: &'a mut RenderContext<'reg, 'rc>,
        out: &'a mut dyn Output,
    ) -> Self {
        Self {
            directive,
            helper,
            registry,
            context,
            render_context,
            out,
        }
    }

    /// A block context whose `this` is the helper's context parameter
    fn parameter_block(&self) -> Option<BlockContext<'rc>> {
        let param = self.helper.param(0)?;
        let mut block = BlockContext::new();
        match param.context_path() {
            Some(path) => *block.base_path_mut() = path.clone(),
            None => block.set_base_value(param.value().clone()),
        }
        Some(block)
    }

    fn render_template(
        &mut self,
        template: Option<&'rc Template>,
        block: Option<BlockContext<'rc>>,
    ) -> Result<(), RenderError> {
        let Some(template) = template else {
            return Ok(());
        };

        let pushed = block.is_some();
        if let Some(block) = block {
            self.render_context.push_block(block);
        }
        let result = template.render(self.registry, self.context, self.render_context, self.out);
        if pushed {
            self.render_context.pop_block();
        }
        result
    }
}

impl<'reg: 'rc, 'rc> BlockInvocation for HandlebarsInvocation<'_, 'reg, 'rc> {
    type Error = RenderError;

    fn directive(&self) -> &'static str {
        self.directive
    }

    fn scope(&self) -> Option<&Value> {
        self.helper.param(0).map(|param| param.value())
    }

    fn root(&self) -> &Value {
        self.context.data()
    }

    fn argument(&self, name: &str) -> Option<&Value> {
        self.helper.hash_get(name).map(|param| param.value())
    }

    fn render_body(&mut self, scope: BodyScope<'_>) -> Result<(), RenderError> {
        let block = match scope {
            BodyScope::Current => self.parameter_block(),
            BodyScope::Bound(value) => {
                let mut block = BlockContext::new();
                block.set_base_value(value.clone());
                Some(block)
            }
            BodyScope::Item { value, position } => {
                let mut block = BlockContext::new();
                block.set_base_value(value.clone());
                block.set_local_var("index", Value::from(position.index));
                block.set_local_var("first", Value::Bool(position.first));
                block.set_local_var("last", Value::Bool(position.last));
                Some(block)
            }
        };
        let template = self.helper.template();
        self.render_template(template, block)
    }

    fn render_alternative(&mut self) -> Result<(), RenderError> {
        let template = self.helper.inverse();
        let block = self.parameter_block();
        self.render_template(template, block)
    }
}

/// A registered FHIRPath block helper
#[derive(Debug, Clone)]
pub struct FhirHelper {
    directive: Directive,
    engine: Arc<FhirPathEngine>,
}

impl FhirHelper {
    /// Create a helper for `directive` backed by `engine`
    pub fn new(directive: Directive, engine: Arc<FhirPathEngine>) -> Self {
        Self { directive, engine }
    }

    /// The directive this helper runs
    pub fn directive(&self) -> Directive {
        self.directive
    }
}

impl HelperDef for FhirHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let mut invocation = HandlebarsInvocation::new(self.directive.name(), h, r, ctx, rc, out);
        self.directive.invoke(&self.engine, &mut invocation)
    }
}
