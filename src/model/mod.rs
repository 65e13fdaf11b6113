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

//! Data model for documents traversed by FHIRPath
//!
//! Documents are plain `serde_json::Value` trees. [`Node`] gives them an
//! explicit structural shape so navigation and the emptiness checks can
//! pattern-match instead of relying on truthiness.

mod document;
mod reference;

pub use document::{Collection, Node, is_empty_result, is_empty_value, to_collection};
pub use reference::Reference;
