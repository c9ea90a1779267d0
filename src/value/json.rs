//! Descriptor-guided conversion between [`Value`] and `serde_json::Value`.

use serde_json::{Map, Number, Value as Json};

use super::{ANONYMOUS_COMPOSITE, Composite, TypeDescriptor, Value};

/// Decode `json` as `descriptor`.
///
/// Shapes are transparent: the inner type drives decoding. `Any` decodes
/// untyped, mapping integral numbers to integers and objects to anonymous
/// composites.
pub(crate) fn from_json(json: Json, descriptor: &TypeDescriptor) -> Result<Value, String> {
    match (descriptor, json) {
        (TypeDescriptor::Unit, _) | (_, Json::Null) => Ok(Value::Null),
        (TypeDescriptor::Any, json) => Ok(untyped(json)),
        (TypeDescriptor::Shaped(_, inner), json) => from_json(json, inner),
        (TypeDescriptor::Bool, Json::Bool(value)) => Ok(Value::Bool(value)),
        (TypeDescriptor::Integer, Json::Number(number)) => number
            .as_i64()
            .map(Value::Integer)
            .ok_or_else(|| format!("{number} is not a 64-bit integer")),
        (TypeDescriptor::Float, Json::Number(number)) => number
            .as_f64()
            .map(Value::Float)
            .ok_or_else(|| format!("{number} is not a float")),
        (TypeDescriptor::Char, Json::String(text)) => single_char(&text).map(Value::Char),
        (TypeDescriptor::Text, Json::String(text)) => Ok(Value::Text(text)),
        (TypeDescriptor::Composite(name), Json::Object(object)) => {
            Ok(Value::Composite(composite(name, object)))
        }
        (TypeDescriptor::Sequence(inner), Json::Array(items)) => items
            .into_iter()
            .map(|item| from_json(item, inner))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Sequence),
        (descriptor, json) => Err(format!("expected {descriptor}, found {}", json_kind(&json))),
    }
}

fn single_char(text: &str) -> Result<char, String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(format!("{text:?} is not a single character")),
    }
}

fn composite(name: &str, object: Map<String, Json>) -> Composite {
    object
        .into_iter()
        .fold(Composite::new(name), |record, (field, value)| {
            record.with(field, untyped(value))
        })
}

fn untyped(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(value) => Value::Bool(value),
        Json::Number(number) => number
            .as_i64()
            .map_or_else(|| Value::Float(number.as_f64().unwrap_or(f64::NAN)), Value::Integer),
        Json::String(text) => Value::Text(text),
        Json::Array(items) => Value::Sequence(items.into_iter().map(untyped).collect()),
        Json::Object(object) => Value::Composite(composite(ANONYMOUS_COMPOSITE, object)),
    }
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Encode `value` as JSON. Bytes become arrays of octets; non-finite floats
/// become null.
pub(crate) fn to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(value) => Json::Bool(*value),
        Value::Integer(value) => Json::Number((*value).into()),
        Value::Float(value) => Number::from_f64(*value).map_or(Json::Null, Json::Number),
        Value::Char(value) => Json::String(value.to_string()),
        Value::Text(value) => Json::String(value.clone()),
        Value::Bytes(bytes) => Json::Array(bytes.iter().map(|byte| Json::from(*byte)).collect()),
        Value::Sequence(items) => Json::Array(items.iter().map(to_json).collect()),
        Value::Composite(record) => Json::Object(
            record
                .fields()
                .map(|(name, value)| (name.to_owned(), to_json(value)))
                .collect(),
        ),
    }
}
