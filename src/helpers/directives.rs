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
//! Conditional, iterating and scoping directives

use super::invocation::{
    BlockInvocation, BodyScope, DirectiveError, LoopPosition, expression_argument,
};
use crate::engine::FhirPathEngine;
use crate::model::{Collection, is_empty_result, is_empty_value};
use log::debug;

/// Evaluate the invocation's expression against its scope
pub(crate) fn query<I>(
    engine: &FhirPathEngine,
    invocation: &I,
) -> Result<Collection, DirectiveError>
where
    I: BlockInvocation + ?Sized,
{
    let scope = invocation
        .scope()
        .ok_or(DirectiveError::MissingContext {
            directive: invocation.directive(),
        })?;
    let expression = expression_argument(invocation)?;
    let result = engine.evaluate(scope, expression)?;
    debug!(
        "{}: `{expression}` matched {} item(s)",
        invocation.directive(),
        result.len()
    );
    Ok(result)
}

/// Render the body when the expression matches anything, otherwise the alternative
pub fn if_fhir<I: BlockInvocation>(
    engine: &FhirPathEngine,
    invocation: &mut I,
) -> Result<(), I::Error> {
    let result = query(engine, invocation)?;
    if is_empty_result(&result) {
        invocation.render_alternative()
    } else {
        invocation.render_body(BodyScope::Current)
    }
}

/// Render the body only when the expression matches nothing
///
/// There is no alternative branch: a non-empty result renders nothing.
pub fn unless_fhir<I: BlockInvocation>(
    engine: &FhirPathEngine,
    invocation: &mut I,
) -> Result<(), I::Error> {
    let result = query(engine, invocation)?;
    if is_empty_result(&result) {
        invocation.render_body(BodyScope::Current)
    } else {
        Ok(())
    }
}

/// Render the body once per matched item, or the alternative when nothing matched
pub fn each_fhir<I: BlockInvocation>(
    engine: &FhirPathEngine,
    invocation: &mut I,
) -> Result<(), I::Error> {
    let items = query(engine, invocation)?;
    if is_empty_result(&items) {
        return invocation.render_alternative();
    }

    let total = items.len();
    for (index, value) in items.iter().enumerate() {
        invocation.render_body(BodyScope::Item {
            value,
            position: LoopPosition::new(index, total),
        })?;
    }
    Ok(())
}

/// Render the body with the first matched item as its context
pub fn with_fhir<I: BlockInvocation>(
    engine: &FhirPathEngine,
    invocation: &mut I,
) -> Result<(), I::Error> {
    let result = query(engine, invocation)?;
    match result.first() {
        Some(first) if !is_empty_value(first) => invocation.render_body(BodyScope::Bound(first)),
        _ => invocation.render_alternative(),
    }
}
