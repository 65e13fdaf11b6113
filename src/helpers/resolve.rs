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
//! Reference resolution against the render root
//!
//! A reference such as `Patient/123` is looked up in every place a FHIR
//! document keeps resources: bundle entries (current and legacy field names)
//! and contained resources. Lookups always start from the root of the render,
//! never from the current scope.

use super::directives::query;
use super::invocation::{BlockInvocation, BodyScope};
use crate::engine::FhirPathEngine;
use crate::evaluator::navigate_path;
use crate::model::{Node, Reference};
use log::{debug, trace};
use serde_json::Value;

/// A place in a document where resources are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainmentConvention {
    /// Human readable name used in logs
    pub name: &'static str,
    /// Field path from the document root to the candidate resources
    pub path: &'static [&'static str],
}

/// Conventions searched by resolution, in priority order
pub const CONTAINMENT_CONVENTIONS: &[ContainmentConvention] = &[
    ContainmentConvention {
        name: "bundle entry",
        path: &["entry", "resource"],
    },
    ContainmentConvention {
        name: "legacy bundle entry",
        path: &["entry", "content"],
    },
    ContainmentConvention {
        name: "contained resource",
        path: &["contained"],
    },
];

/// Find the resource `reference` points at using the standard conventions
pub fn find_resource(root: &Value, reference: &Reference<'_>) -> Option<Value> {
    find_resource_in(root, reference, CONTAINMENT_CONVENTIONS)
}

/// Find the resource `reference` points at, searching `conventions` in order
///
/// The first matching candidate wins; duplicates later in the search are ignored.
pub fn find_resource_in(
    root: &Value,
    reference: &Reference<'_>,
    conventions: &[ContainmentConvention],
) -> Option<Value> {
    conventions.iter().find_map(|convention| {
        let found = navigate_path(root, convention.path)
            .into_iter()
            .find(|candidate| reference.matches(Node::of(candidate)));
        if found.is_some() {
            trace!("Resolved {reference} as a {}", convention.name);
        }
        found
    })
}

/// Render the body with the resource referenced by the expression's first result
pub fn resolve_fhir<I: BlockInvocation>(
    engine: &FhirPathEngine,
    invocation: &mut I,
) -> Result<(), I::Error> {
    let result = query(engine, invocation)?;

    let Some(text) = result.first().and_then(Value::as_str) else {
        debug!("{}: expression did not produce a reference string", invocation.directive());
        return invocation.render_alternative();
    };
    let Some(reference) = Reference::parse(text) else {
        debug!("{}: malformed reference `{text}`", invocation.directive());
        return invocation.render_alternative();
    };

    match find_resource(invocation.root(), &reference) {
        Some(resource) => invocation.render_body(BodyScope::Bound(&resource)),
        None => {
            debug!("{}: no resource found for {reference}", invocation.directive());
            invocation.render_alternative()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing::{RecordingInvocation, Rendered};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn bundle() -> Value {
        json!({
            "resourceType": "Bundle",
            "entry": [
                {
                    "resource": {
                        "resourceType": "Foo",
                        "id": "1",
                        "bar": {"reference": "Bar/1"},
                        "baz": {"reference": "Baz/9"},
                        "partOf": {"reference": "Foo/1"},
                        "local": {"reference": "#inline"},
                        "count": 3
                    }
                },
                {"resource": {"resourceType": "Bar", "id": "1", "val": "new"}},
                {"content": {"resourceType": "Bar", "id": "1", "val": "legacy"}},
                {"content": {"resourceType": "Baz", "id": "9", "val": "legacy"}}
            ],
            "contained": [
                {"resourceType": "Bar", "id": "1", "val": "contained"},
                {"resourceType": "Qux", "id": "5", "val": "contained"}
            ]
        })
    }

    #[test]
    fn test_convention_priority() {
        let doc = bundle();
        let bar = find_resource(&doc, &Reference::parse("Bar/1").unwrap()).unwrap();
        assert_eq!(bar["val"], json!("new"));

        let baz = find_resource(&doc, &Reference::parse("Baz/9").unwrap()).unwrap();
        assert_eq!(baz["val"], json!("legacy"));

        let qux = find_resource(&doc, &Reference::parse("Qux/5").unwrap()).unwrap();
        assert_eq!(qux["val"], json!("contained"));

        assert_eq!(find_resource(&doc, &Reference::parse("Bar/2").unwrap()), None);
    }

    #[test]
    fn test_custom_conventions() {
        let doc = bundle();
        let contained_only = &CONTAINMENT_CONVENTIONS[2..];
        let bar = find_resource_in(&doc, &Reference::parse("Bar/1").unwrap(), contained_only);
        assert_eq!(bar.unwrap()["val"], json!("contained"));
    }

    fn resolve(expression: &str) -> Vec<Rendered> {
        let engine = FhirPathEngine::new();
        let mut invocation = RecordingInvocation::new(bundle(), expression);
        resolve_fhir(&engine, &mut invocation).unwrap();
        invocation.rendered
    }

    #[test]
    fn test_resolve_binds_resource() {
        assert_eq!(
            resolve("entry.resource.Foo.bar.reference"),
            vec![Rendered::Bound(json!({"resourceType": "Bar", "id": "1", "val": "new"}))]
        );
        assert_eq!(
            resolve("entry.resource.Foo.partOf.reference"),
            vec![Rendered::Bound(bundle()["entry"][0]["resource"].clone())]
        );
    }

    #[test]
    fn test_resolve_falls_back_to_alternative() {
        assert_eq!(resolve("entry.resource.Foo.missing.reference"), vec![Rendered::Alternative]);
        assert_eq!(resolve("entry.resource.Foo.local.reference"), vec![Rendered::Alternative]);
        assert_eq!(resolve("entry.resource.Foo.count"), vec![Rendered::Alternative]);
        assert_eq!(resolve("'Nope/1'"), vec![Rendered::Alternative]);
    }

    #[test]
    fn test_resolve_is_root_relative() {
        let engine = FhirPathEngine::new();
        let doc = bundle();
        let mut invocation = RecordingInvocation::new(doc.clone(), "bar.reference");
        invocation.scope = Some(doc["entry"][0]["resource"].clone());
        resolve_fhir(&engine, &mut invocation).unwrap();
        assert_eq!(
            invocation.rendered,
            vec![Rendered::Bound(json!({"resourceType": "Bar", "id": "1", "val": "new"}))]
        );
    }
}
