use serde_json::Value;

/// Text form of a loosely typed JSON scalar.
///
/// Upstream APIs are inconsistent about quoting ids and scores, so strings and
/// numbers are both accepted. Anything else is treated as missing.
pub fn json_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Reads a loosely typed JSON scalar as an unsigned integer.
pub fn json_u32(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
