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
//! FHIRPath block helpers for Handlebars templates
//!
//! Templates over FHIR resources can branch, iterate, rescope and follow
//! references with FHIRPath expressions:
//!
//! ```handlebars
//! {{#each-fhir this expression="Patient.name.given"}}{{@index}}: {{this}}{{/each-fhir}}
//! {{#resolve-fhir this expression="Observation.subject.reference"}}
//!   {{id}}
//! {{else}}
//!   unknown
//! {{/resolve-fhir}}
//! ```
//!
//! Register the helpers with [`register_with`], or with [`register_with_engine`]
//! to share a configured [`FhirPathEngine`]. The engine can also be used on its
//! own to evaluate the supported FHIRPath subset against `serde_json` values.

pub mod ast;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod helpers;
pub mod model;
pub mod parser;

pub use engine::{DEFAULT_EXPRESSION_CACHE_SIZE, EngineConfig, FhirPathEngine};
pub use error::{FhirPathError, Result};
pub use helpers::{
    BlockInvocation, BodyScope, Directive, DirectiveError, FhirHelper, HandlebarsInvocation,
    LoopPosition, register_with, register_with_engine,
};
pub use model::{Collection, Node, Reference};
pub use parser::{ParseError, parse_expression as parse};
