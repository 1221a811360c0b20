//! Helpers for the untyped documents exchanged with authorization servers.
//!
//! Token responses and resource owner profiles are both represented as
//! [`serde_json::Value`] trees, whether they arrived as JSON or as an
//! `application/x-www-form-urlencoded` body.

use serde_json::{Map, Value};
use url::form_urlencoded;

/// Deepest bracket nesting honoured when decoding form keys, matching PHP's
/// `max_input_nesting_level`. Anything past it is kept as one literal key.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Looks up a value by a dotted key path such as `data.username`.
///
/// The key is always split on `.`, so a literal key containing dots is never
/// matched. Missing keys and non-object values along the path yield `None`;
/// this function never fails.
pub fn value_by_key<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(document, |current, segment| current.as_object()?.get(segment))
}

/// Renders a scalar value as a string. Objects, arrays and nulls yield `None`.
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decodes an HTML form query string (`a=1&b=two+words`) into a document.
///
/// Keys using bracket notation are nested: `error[message]=x` produces
/// `{"error": {"message": "x"}}` and `scope[]=a&scope[]=b` produces a list.
/// Repeated flat keys keep the last value. Nesting stops at
/// [`MAX_NESTING_DEPTH`]; the remainder of the key becomes a literal segment.
pub fn parse_form_document(input: &str) -> Map<String, Value> {
    let mut document = Map::new();

    for (key, value) in form_urlencoded::parse(input.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        let (base, segments) = split_key(&key);
        let slot = document.entry(base).or_insert(Value::Null);
        insert_segments(slot, &segments, Value::String(value.into_owned()));
    }

    document
}

/// Encodes key/value pairs as an `application/x-www-form-urlencoded` body.
pub fn encode_form<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn split_key(key: &str) -> (&str, Vec<&str>) {
    let Some(open) = key.find('[').filter(|&open| open > 0) else {
        return (key, Vec::new());
    };

    let (base, mut rest) = key.split_at(open);
    let mut segments = Vec::new();
    while let Some(inner) = rest.strip_prefix('[') {
        if segments.len() == MAX_NESTING_DEPTH {
            segments.push(rest);
            break;
        }
        let Some(close) = inner.find(']') else {
            break;
        };
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }

    if segments.is_empty() {
        (key, segments)
    } else {
        (base, segments)
    }
}

fn insert_segments(slot: &mut Value, segments: &[&str], value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        *slot = value;
        return;
    };

    if segment.is_empty() {
        let mut child = Value::Null;
        insert_segments(&mut child, rest, value);
        match slot {
            Value::Array(items) => items.push(child),
            other => *other = Value::Array(vec![child]),
        }
        return;
    }

    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(map) = slot {
        let child = map.entry(*segment).or_insert(Value::Null);
        insert_segments(child, rest, value);
    }
}
