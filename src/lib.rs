//! A mock Slack incoming-webhook receiver for end-to-end tests.
//!
//! This library stands in for the Slack webhook endpoint an alerting system
//! posts to. It accepts JSON payloads on `/`, records them in arrival order,
//! answers with the same acknowledgment bodies the real endpoint uses, and
//! exposes what it captured through a fluent assertion API.
//!
//! # Features
//!
//! - **Drop-in Endpoint**: Point the system under test at [`ServerHandle::url`]
//! - **Faithful Capture**: Payloads are kept as received, nulls and all
//! - **Fluent Assertion API**: Match on channel, text, or any top-level field
//! - **Async Waiting**: Wait for alerts posted from background tasks
//! - **Graceful Shutdown**: The listener is released on shutdown
//!
//! # Quick Start
//!
//! ```no_run
//! use mock_slack::MockSlackServer;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Bind to an OS-assigned port on loopback
//!     let server = MockSlackServer::new("127.0.0.1", 0).start().await?;
//!
//!     // Configure your alerting pipeline with server.url() and trigger it...
//!
//!     server.wait_for_alerts(1, Duration::from_secs(5)).await?;
//!     server
//!         .with_log(|log| {
//!             log.expect_alert()
//!                 .with_channel("#eng")
//!                 .with_text_containing("balance_enforcement")
//!                 .assert_exists();
//!         })
//!         .await;
//!
//!     // Reuse the receiver for the next case
//!     server.clear_alerts().await;
//!
//!     server.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Wire Contract
//!
//! | Path | Body | Status | Response |
//! |------|------|--------|----------|
//! | `/` | JSON object | 200 | `{"message":"ok", "error":""}` |
//! | `/` | anything else | 400 | `{"message":"", "error":"could not decode slack payload"}` |
//! | other | any | 404 | `404 page not found` |

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod alerts;
mod error;
mod server;

pub use alerts::{Ack, AlertAssertion, AlertLog, SlackPayload};
pub use error::MockServerError;
pub use server::{MockSlackServer, MockSlackServerBuilder, ServerHandle};
