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

//! Literal resource references of the form `Type/Id`

use super::Node;
use std::fmt;

/// A parsed `Type/Id` reference
///
/// Only the two-part relative form is recognised. Absolute URLs, fragment
/// references (`#id`) and ids containing further `/` separators do not parse
/// and therefore never resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    /// Resource type, e.g. `Patient`
    pub resource_type: &'a str,
    /// Logical id of the resource
    pub id: &'a str,
}

impl<'a> Reference<'a> {
    /// Split a reference string on its single `/` separator
    pub fn parse(reference: &'a str) -> Option<Self> {
        let (resource_type, id) = reference.split_once('/')?;
        if resource_type.is_empty() || id.is_empty() || id.contains('/') {
            return None;
        }
        Some(Self { resource_type, id })
    }

    /// Whether `candidate` is the resource this reference points at
    pub fn matches(&self, candidate: Node<'_>) -> bool {
        candidate.resource_type() == Some(self.resource_type) && candidate.id() == Some(self.id)
    }
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}
