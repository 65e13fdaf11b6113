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
//! Property navigation over JSON documents

use crate::model::{Collection, Node, to_collection};
use serde_json::Value;

/// Whether a member name reads as a resource type name (`Patient`, `Bundle`)
#[inline]
fn is_type_name(name: &str) -> bool {
    name.as_bytes().first().is_some_and(u8::is_ascii_uppercase)
}

/// Append a child value to `out`, flattening sequences and dropping absent values
fn push_flattened(child: &Value, out: &mut Collection) {
    match Node::of(child) {
        Node::Sequence(items) => out.extend(items.iter().filter(|item| !item.is_null()).cloned()),
        Node::Absent => {}
        Node::Mapping(_) | Node::Scalar(_) => out.push(child.clone()),
    }
}

/// Navigate one member name from every item of the focus
///
/// A name starting with an upper-case letter also acts as a type filter: a
/// resource whose `resourceType` equals the name is passed through unchanged,
/// which is what makes `Patient.name` work on a Patient resource.
pub fn navigate(focus: &[Value], name: &str) -> Collection {
    let type_name = is_type_name(name);
    let mut result = Collection::with_capacity(focus.len());

    for item in focus {
        if type_name && Node::of(item).resource_type() == Some(name) {
            result.push(item.clone());
            continue;
        }
        if let Value::Object(map) = item {
            if let Some(child) = map.get(name) {
                push_flattened(child, &mut result);
            }
        }
    }

    result
}

/// Navigate a fixed sequence of member names starting at `root`
pub fn navigate_path(root: &Value, path: &[&str]) -> Collection {
    path.iter()
        .fold(to_collection(root), |focus, name| navigate(&focus, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_navigate_flattens_sequences() {
        let doc = json!({"bar": [{"val": "a"}, {"val": "b"}, null, {"other": 1}]});
        let bars = navigate(&[doc], "bar");
        assert_eq!(bars.len(), 3);
        assert_eq!(navigate(&bars, "val"), vec![json!("a"), json!("b")]);
    }

    #[test]
    fn test_type_name_passes_matching_resource() {
        let doc = json!({"resourceType": "Foo", "bar": {"val": "d"}});
        assert_eq!(navigate(&[doc.clone()], "Foo"), vec![doc.clone()]);
        assert_eq!(navigate(&[doc.clone()], "Bar"), Vec::<Value>::new());
        assert_eq!(navigate(&[doc], "bar"), vec![json!({"val": "d"})]);
    }

    #[test]
    fn test_type_name_falls_back_to_field() {
        let doc = json!({"Foo": "field"});
        assert_eq!(navigate(&[doc], "Foo"), vec![json!("field")]);
    }

    #[test]
    fn test_navigate_path() {
        let bundle = json!({
            "entry": [
                {"resource": {"resourceType": "Foo"}},
                {"content": {"resourceType": "Bar"}},
                {"resource": {"resourceType": "Baz"}}
            ]
        });
        let resources = navigate_path(&bundle, &["entry", "resource"]);
        assert_eq!(
            resources,
            vec![json!({"resourceType": "Foo"}), json!({"resourceType": "Baz"})]
        );
        assert!(navigate_path(&bundle, &["contained"]).is_empty());
    }

    #[test]
    fn test_scalars_have_no_children() {
        assert!(navigate(&[json!("text"), json!(1)], "length").is_empty());
    }
}
