//! Intrinsic functions understood by the orchestrator.
//!
//! Each helper returns a JSON fragment that can be placed anywhere inside resource properties
//! or output values. [`references`] walks such a document and collects the logical ids it
//! points at, which is how implicit dependencies are discovered.

use super::LogicalId;
use serde_json::{Value, json};
use std::collections::BTreeSet;

const REF: &str = "Ref";
const GET_ATT: &str = "Fn::GetAtt";
const PSEUDO_PREFIX: &str = "AWS::";

/// `{"Ref": id}`: the primary identifier of a resource.
#[must_use]
pub fn reference(id: &LogicalId) -> Value {
    json!({ REF: id })
}

/// `{"Fn::GetAtt": [id, attribute]}`.
#[must_use]
pub fn attribute(id: &LogicalId, attribute: &str) -> Value {
    json!({ GET_ATT: [id, attribute] })
}

/// `{"Fn::Join": [separator, parts]}`.
#[must_use]
pub fn join(separator: &str, parts: impl IntoIterator<Item = Value>) -> Value {
    json!({ "Fn::Join": [separator, parts.into_iter().collect::<Vec<_>>()] })
}

/// `{"Fn::Select": [index, list]}`.
#[must_use]
pub fn select(index: usize, list: Value) -> Value {
    json!({ "Fn::Select": [index, list] })
}

/// `{"Fn::Base64": value}`, used for instance user data.
#[must_use]
pub fn base64(value: Value) -> Value {
    json!({ "Fn::Base64": value })
}

/// Availability zones of the deployment region.
#[must_use]
pub fn availability_zones() -> Value {
    json!({ "Fn::GetAZs": { REF: "AWS::Region" } })
}

/// A pseudo parameter such as `AWS::Region`. Not a resource reference.
#[must_use]
pub fn pseudo(name: &'static str) -> Value {
    json!({ REF: name })
}

/// Logical ids referenced through `Ref` or `Fn::GetAtt` anywhere inside `value`.
///
/// Pseudo parameters (`AWS::...`) are skipped.
#[must_use]
pub fn references(value: &Value) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    collect(value, &mut found);
    found
}

/// `(logical id, attribute)` pairs read through `Fn::GetAtt` anywhere inside `value`.
#[must_use]
pub fn attribute_reads(value: &Value) -> BTreeSet<(String, String)> {
    let mut found = BTreeSet::new();
    collect_attributes(value, &mut found);
    found
}

fn collect_attributes(value: &Value, found: &mut BTreeSet<(String, String)>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::Array(args)) = map.get(GET_ATT) {
                    if let [Value::String(target), Value::String(attribute)] = args.as_slice() {
                        found.insert((target.clone(), attribute.clone()));
                    }
                    return;
                }
            }
            map.values().for_each(|v| collect_attributes(v, found));
        }
        Value::Array(items) => items.iter().for_each(|v| collect_attributes(v, found)),
        _ => {}
    }
}

fn collect(value: &Value, found: &mut BTreeSet<String>) {
    match value {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(target)) = map.get(REF) {
                    if !target.starts_with(PSEUDO_PREFIX) {
                        found.insert(target.clone());
                    }
                    return;
                }
                if let Some(Value::Array(args)) = map.get(GET_ATT) {
                    if let Some(Value::String(target)) = args.first() {
                        found.insert(target.clone());
                    }
                    return;
                }
            }
            map.values().for_each(|v| collect(v, found));
        }
        Value::Array(items) => items.iter().for_each(|v| collect(v, found)),
        _ => {}
    }
}
