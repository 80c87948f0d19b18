use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A Slack incoming-webhook message as posted by the system under test.
///
/// The payload is kept as the JSON object that was received, field order,
/// explicit nulls and number precision included. The accessors below read the
/// well-known Slack fields without requiring them to have any particular type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlackPayload {
    fields: Map<String, Value>,
}

impl SlackPayload {
    /// Creates a plain text message for the given channel.
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self::default()
            .with_field("channel", channel.into())
            .with_field("text", text.into())
    }

    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Adds or replaces a top-level field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The `channel` field, when it is a string.
    pub fn channel(&self) -> Option<&str> {
        self.str_field("channel")
    }

    /// The `text` field, when it is a string.
    pub fn text(&self) -> Option<&str> {
        self.str_field("text")
    }

    /// The `username` field, when it is a string.
    pub fn username(&self) -> Option<&str> {
        self.str_field("username")
    }

    /// Looks up any top-level field as JSON.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// The acknowledgment body the webhook endpoint answers with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub message: String,
    pub error: String,
}

impl Ack {
    pub fn ok() -> Self {
        Self {
            message: "ok".to_string(),
            error: String::new(),
        }
    }

    pub fn decode_failure() -> Self {
        Self {
            message: String::new(),
            error: "could not decode slack payload".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_channel_and_text() {
        let payload: SlackPayload =
            serde_json::from_str(r##"{"channel":"#eng","text":"alert A"}"##).unwrap();

        assert_eq!(payload, SlackPayload::new("#eng", "alert A"));
        assert_eq!(payload.channel(), Some("#eng"));
        assert_eq!(payload.text(), Some("alert A"));
        assert_eq!(payload.fields().len(), 2);
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let original = json!({
            "channel": "#eng",
            "text": "heuristic triggered",
            "blocks": [{"type": "section", "text": {"type": "mrkdwn", "text": "*hi*"}}],
            "unfurl_links": false,
            "thread_ts": "1700000000.000100"
        });

        let payload: SlackPayload = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(payload.fields().len(), 5);
        assert_eq!(payload.field("unfurl_links"), Some(&json!(false)));
        assert_eq!(serde_json::to_value(&payload).unwrap(), original);
    }

    #[test]
    fn test_explicit_null_is_kept() {
        let raw = r#"{"channel":null,"text":"a"}"#;
        let payload: SlackPayload = serde_json::from_str(raw).unwrap();

        assert_eq!(payload.channel(), None);
        assert_eq!(payload.field("channel"), Some(&Value::Null));
        assert_eq!(serde_json::to_string(&payload).unwrap(), raw);
    }

    #[test]
    fn test_known_fields_of_any_type_are_accepted() {
        let raw = r#"{"text":{"type":"mrkdwn","text":"*hi*"},"blocks":{"a":1},"channel":42}"#;
        let payload: SlackPayload = serde_json::from_str(raw).unwrap();

        assert_eq!(payload.text(), None);
        assert_eq!(payload.channel(), None);
        assert_eq!(payload.field("blocks"), Some(&json!({"a": 1})));
        assert_eq!(serde_json::to_string(&payload).unwrap(), raw);
    }

    #[test]
    fn test_large_numbers_keep_precision() {
        let raw = r#"{"n":123456789012345678901234567890,"f":0.10000000000000000000001}"#;
        let payload: SlackPayload = serde_json::from_str(raw).unwrap();

        assert_eq!(serde_json::to_string(&payload).unwrap(), raw);
    }

    #[test]
    fn test_rejects_non_object_bodies() {
        assert!(serde_json::from_str::<SlackPayload>("not-json").is_err());
        assert!(serde_json::from_str::<SlackPayload>("{not json").is_err());
        assert!(serde_json::from_str::<SlackPayload>("null").is_err());
        assert!(serde_json::from_str::<SlackPayload>(r#"["text"]"#).is_err());
        assert!(serde_json::from_str::<SlackPayload>(r#""text""#).is_err());
        assert!(serde_json::from_str::<SlackPayload>(r#"{"text":"a"} {"text":"b"}"#).is_err());
    }

    #[test]
    fn test_field_lookup() {
        let payload = SlackPayload::new("#eng", "alert A");

        assert_eq!(payload.field("channel"), Some(&json!("#eng")));
        assert_eq!(payload.field("text"), Some(&json!("alert A")));
        assert_eq!(payload.field("username"), None);
        assert_eq!(payload.username(), None);
    }

    #[test]
    fn test_ack_bodies() {
        assert_eq!(
            serde_json::to_value(Ack::ok()).unwrap(),
            json!({"message": "ok", "error": ""})
        );
        assert_eq!(
            serde_json::to_value(Ack::decode_failure()).unwrap(),
            json!({"message": "", "error": "could not decode slack payload"})
        );
    }
}
