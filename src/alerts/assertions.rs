use serde_json::Value;

use super::helpers::{check_fields, format_payload};
use super::types::SlackPayload;

/// A builder for constructing assertions over captured alerts.
#[derive(Debug)]
pub struct AlertAssertion<'a> {
    alerts: &'a [SlackPayload],
    text: Option<String>,
    text_containing: Option<String>,
    channel: Option<String>,
    username: Option<String>,
    fields: Vec<(String, Value)>,
}

impl<'a> AlertAssertion<'a> {
    pub(crate) fn new(alerts: &'a [SlackPayload], text: Option<String>) -> Self {
        Self {
            alerts,
            text,
            text_containing: None,
            channel: None,
            username: None,
            fields: Vec::new(),
        }
    }

    /// Requires the alert to be posted to this channel.
    #[must_use]
    pub fn with_channel<S: Into<String>>(mut self, channel: S) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Requires the alert text to contain this fragment.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use mock_slack::AlertLog;
    /// # let log = AlertLog::new();
    /// log.expect_alert()
    ///     .with_text_containing("balance enforcement")
    ///     .assert_exists();
    /// ```
    #[must_use]
    pub fn with_text_containing<S: Into<String>>(mut self, fragment: S) -> Self {
        self.text_containing = Some(fragment.into());
        self
    }

    #[must_use]
    pub fn with_username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Requires a top-level field to equal the given JSON value.
    ///
    /// Works for any field the payload carried, whatever its JSON type. Can be
    /// called multiple times; all fields must match.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use mock_slack::AlertLog;
    /// # let log = AlertLog::new();
    /// log.expect_alert_with_text("alert A")
    ///     .with_field("unfurl_links", false)
    ///     .assert_exists();
    /// ```
    #[must_use]
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Asserts that at least one alert matches all specified criteria.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if no match is found.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_exists(&self) {
        if !self.matches_any() {
            panic!("{}", self.build_error_message());
        }
    }

    /// Asserts that no alerts match the specified criteria.
    ///
    /// # Panics
    ///
    /// Panics if any alerts match the criteria.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_not_exists(&self) {
        if self.matches_any() {
            panic!(
                "Expected no alerts to match, but found {} matching.\nCriteria: {}",
                self.count(),
                self.format_criteria()
            );
        }
    }

    /// Asserts that exactly the specified number of alerts match.
    ///
    /// # Panics
    ///
    /// Panics if the count doesn't match.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_count(&self, expected: usize) {
        let actual = self.count();
        if actual != expected {
            panic!(
                "Expected {} matching alerts, but found {}.\nCriteria: {}\n\n{}",
                expected,
                actual,
                self.format_criteria(),
                self.format_matching_alerts()
            );
        }
    }

    /// Asserts that at least the specified number of alerts match.
    ///
    /// # Panics
    ///
    /// Panics if fewer alerts match.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_at_least(&self, min: usize) {
        let actual = self.count();
        if actual < min {
            panic!(
                "Expected at least {} matching alerts, but found {}.\nCriteria: {}",
                min,
                actual,
                self.format_criteria()
            );
        }
    }

    /// Asserts that no more than the specified number of alerts match.
    ///
    /// # Panics
    ///
    /// Panics if more alerts match.
    #[allow(clippy::panic)]
    #[track_caller]
    pub fn assert_at_most(&self, max: usize) {
        let actual = self.count();
        if actual > max {
            panic!(
                "Expected at most {} matching alerts, but found {}.\nCriteria: {}",
                max,
                actual,
                self.format_criteria()
            );
        }
    }

    /// Returns the number of alerts that match the criteria.
    #[must_use = "the count should be used"]
    pub fn count(&self) -> usize {
        self.alerts.iter().filter(|a| self.matches(a)).count()
    }

    /// Returns all alerts that match the criteria, in arrival order.
    #[must_use = "the matching alerts should be used"]
    pub fn get_all(&self) -> Vec<&'a SlackPayload> {
        self.alerts.iter().filter(|a| self.matches(a)).collect()
    }

    fn matches_any(&self) -> bool {
        self.alerts.iter().any(|a| self.matches(a))
    }

    fn matches(&self, alert: &SlackPayload) -> bool {
        if let Some(expected_text) = &self.text
            && alert.text() != Some(expected_text.as_str())
        {
            return false;
        }

        if let Some(fragment) = &self.text_containing
            && !alert
                .text()
                .is_some_and(|text| text.contains(fragment.as_str()))
        {
            return false;
        }

        if let Some(expected_channel) = &self.channel
            && alert.channel() != Some(expected_channel.as_str())
        {
            return false;
        }

        if let Some(expected_username) = &self.username
            && alert.username() != Some(expected_username.as_str())
        {
            return false;
        }

        check_fields(alert, &self.fields)
    }

    pub(crate) fn format_criteria(&self) -> String {
        let mut criteria = Vec::new();
        if let Some(text) = &self.text {
            criteria.push(format!("text={:?}", text));
        }
        if let Some(fragment) = &self.text_containing {
            criteria.push(format!("text_containing={:?}", fragment));
        }
        if let Some(channel) = &self.channel {
            criteria.push(format!("channel={:?}", channel));
        }
        if let Some(username) = &self.username {
            criteria.push(format!("username={:?}", username));
        }
        if !self.fields.is_empty() {
            criteria.push(format!("fields={:?}", self.fields));
        }
        if criteria.is_empty() {
            return "<any alert>".to_string();
        }
        criteria.join(", ")
    }

    fn format_matching_alerts(&self) -> String {
        let matching = self.get_all();
        if matching.is_empty() {
            return String::new();
        }

        let mut output = String::from("Matching alerts:\n");
        for (idx, alert) in matching.iter().enumerate() {
            output.push_str(&format!("  [{}] {}\n", idx, format_payload(alert, 3)));
        }
        output
    }

    fn build_error_message(&self) -> String {
        let mut msg = String::from("No alerts matched the assertion.\n\n");
        msg.push_str(&format!("Expected:\n  {}\n\n", self.format_criteria()));
        msg.push_str(&format!("Found {} alert(s) in receiver", self.alerts.len()));

        if !self.alerts.is_empty() {
            msg.push_str(":\n");
            for (idx, alert) in self.alerts.iter().enumerate().take(10) {
                msg.push_str(&format!("  [{}] {}\n", idx, format_payload(alert, 3)));
            }

            if self.alerts.len() > 10 {
                msg.push_str(&format!("  ... and {} more\n", self.alerts.len() - 10));
            }
        }

        msg
    }
}
