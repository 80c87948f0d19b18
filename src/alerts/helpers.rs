use serde_json::Value;

use super::types::SlackPayload;

pub(crate) fn format_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => format!("\"{}\"", s),
        Some(Value::Array(items)) => format!("<{} item(s)>", items.len()),
        Some(other) => other.to_string(),
        None => "<none>".to_string(),
    }
}

pub(crate) fn format_payload(payload: &SlackPayload, max_fields: usize) -> String {
    let mut output = format!(
        "channel={}, text={}",
        format_value(payload.field("channel")),
        format_value(payload.field("text"))
    );

    let rest: Vec<_> = payload
        .fields()
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "channel" | "text"))
        .collect();

    if !rest.is_empty() {
        output.push_str(", fields={");
        for (i, (key, value)) in rest.iter().take(max_fields).enumerate() {
            if i > 0 {
                output.push_str(", ");
            }
            output.push_str(&format!("{}={}", key, format_value(Some(*value))));
        }
        if rest.len() > max_fields {
            output.push_str(&format!(", ... +{}", rest.len() - max_fields));
        }
        output.push('}');
    }

    output
}

pub(crate) fn check_fields(payload: &SlackPayload, expected: &[(String, Value)]) -> bool {
    expected
        .iter()
        .all(|(key, value)| payload.field(key) == Some(value))
}
