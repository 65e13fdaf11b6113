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
//! FHIRPath block helpers for Handlebars
//!
//! Five block helpers are provided, each taking a context parameter and an
//! `expression` hash argument:
//!
//! - `if-fhir`: renders the body when the expression matches anything
//! - `unless-fhir`: renders the body when the expression matches nothing
//! - `each-fhir`: renders the body once per match with `@index`, `@first` and `@last`
//! - `with-fhir`: renders the body with the first match as context
//! - `resolve-fhir`: resolves a `Type/Id` reference against the render root
//!
//! ```
//! use handlebars::Handlebars;
//! use serde_json::json;
//!
//! let mut handlebars = Handlebars::new();
//! handlebars_fhirpath::register_with(&mut handlebars);
//!
//! let patient = json!({"resourceType": "Patient", "name": [{"family": "Chalmers"}]});
//! let output = handlebars
//!     .render_template(
//!         r#"{{#with-fhir this expression="Patient.name.family"}}{{this}}{{/with-fhir}}"#,
//!         &patient,
//!     )
//!     .unwrap();
//! assert_eq!(output, "Chalmers");
//! ```

mod adapter;
mod directives;
mod invocation;
mod resolve;
#[cfg(test)]
mod testing;

pub use adapter::{FhirHelper, HandlebarsInvocation};
pub use directives::{each_fhir, if_fhir, unless_fhir, with_fhir};
pub use invocation::{
    BlockInvocation, BodyScope, DirectiveError, EXPRESSION_ARGUMENT, LoopPosition,
    expression_argument,
};
pub use resolve::{
    CONTAINMENT_CONVENTIONS, ContainmentConvention, find_resource, find_resource_in, resolve_fhir,
};

use crate::engine::FhirPathEngine;
use handlebars::Handlebars;
use log::debug;
use std::fmt;
use std::sync::Arc;

/// The block helpers provided by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `if-fhir`
    If,
    /// `unless-fhir`
    Unless,
    /// `each-fhir`
    Each,
    /// `with-fhir`
    With,
    /// `resolve-fhir`
    Resolve,
}

impl Directive {
    /// Every directive, in registration order
    pub const ALL: [Directive; 5] = [
        Directive::If,
        Directive::Unless,
        Directive::Each,
        Directive::With,
        Directive::Resolve,
    ];

    /// The helper name used in templates
    pub fn name(self) -> &'static str {
        match self {
            Directive::If => "if-fhir",
            Directive::Unless => "unless-fhir",
            Directive::Each => "each-fhir",
            Directive::With => "with-fhir",
            Directive::Resolve => "resolve-fhir",
        }
    }

    /// Look a directive up by its helper name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|directive| directive.name() == name)
    }

    /// Run the directive for one invocation
    pub fn invoke<I: BlockInvocation>(
        self,
        engine: &FhirPathEngine,
        invocation: &mut I,
    ) -> Result<(), I::Error> {
        match self {
            Directive::If => if_fhir(engine, invocation),
            Directive::Unless => unless_fhir(engine, invocation),
            Directive::Each => each_fhir(engine, invocation),
            Directive::With => with_fhir(engine, invocation),
            Directive::Resolve => resolve_fhir(engine, invocation),
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Register every directive with a new default engine
pub fn register_with(handlebars: &mut Handlebars<'_>) {
    register_with_engine(handlebars, Arc::new(FhirPathEngine::new()));
}

/// Register every directive, sharing `engine` between them
pub fn register_with_engine(handlebars: &mut Handlebars<'_>, engine: Arc<FhirPathEngine>) {
    for directive in Directive::ALL {
        handlebars.register_helper(
            directive.name(),
            Box::new(FhirHelper::new(directive, Arc::clone(&engine))),
        );
    }
    debug!("Registered {} FHIRPath helpers", Directive::ALL.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_directive_names() {
        let names: Vec<_> = Directive::ALL.iter().map(|d| d.name()).collect();
        assert_eq!(
            names,
            vec!["if-fhir", "unless-fhir", "each-fhir", "with-fhir", "resolve-fhir"]
        );
        assert_eq!(Directive::from_name("each-fhir"), Some(Directive::Each));
        assert_eq!(Directive::from_name("each"), None);
        assert_eq!(Directive::Resolve.to_string(), "resolve-fhir");
    }

    #[test]
    fn test_register_with() {
        let mut handlebars = Handlebars::new();
        register_with(&mut handlebars);
        let output = handlebars
            .render_template(
                r#"{{#if-fhir this expression="a"}}yes{{else}}no{{/if-fhir}}"#,
                &serde_json::json!({"a": 1}),
            )
            .unwrap();
        assert_eq!(output, "yes");
    }
}
