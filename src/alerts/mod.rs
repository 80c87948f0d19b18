mod assertions;
mod helpers;
mod types;

pub use assertions::AlertAssertion;
pub use types::{Ack, SlackPayload};

use helpers::format_payload;

/// The ordered record of Slack payloads captured by the receiver.
///
/// Entries are kept in the order their requests were decoded. The log only
/// shrinks through [`AlertLog::clear`].
#[derive(Debug, Clone, Default)]
pub struct AlertLog {
    alerts: Vec<SlackPayload>,
}

impl AlertLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, payload: SlackPayload) {
        self.alerts.push(payload);
    }

    pub fn alerts(&self) -> &[SlackPayload] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }

    pub fn dump(&self) -> String {
        let mut output = format!("Mock Slack receiver: {} alert(s)\n", self.alerts.len());
        for (idx, alert) in self.alerts.iter().enumerate() {
            output.push_str(&format!("\n[{}] {}", idx, format_payload(alert, 5)));
        }
        output
    }

    pub fn expect_alert_with_text<S: Into<String>>(&self, text: S) -> AlertAssertion<'_> {
        AlertAssertion::new(&self.alerts, Some(text.into()))
    }

    /// Starts building an assertion without pinning the alert text.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use mock_slack::AlertLog;
    /// # let log = AlertLog::new();
    /// log.expect_alert()
    ///     .with_channel("#eng")
    ///     .assert_at_least(2);
    /// ```
    pub fn expect_alert(&self) -> AlertAssertion<'_> {
        AlertAssertion::new(&self.alerts, None)
    }
}
