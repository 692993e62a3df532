//! Long-poll firehose transport
//!
//! Each `recv` issues one request and returns its response as a frame. The
//! newest event timestamp seen becomes the `since_time` cursor of the next
//! request, so a response is never redelivered. The cursor survives
//! reconnects.

use super::{Frame, Transport};
use crate::config::TransportConfig;
use crate::error::{MeterstreamError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::wire;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Extra time granted on top of the server-side poll timeout
const RESPONSE_MARGIN: Duration = Duration::from_secs(15);

/// Polls the firehose endpoint in a loop
pub struct PollTransport {
    config: TransportConfig,
    client: Option<reqwest::Client>,
    since: Option<i64>,
    logger: StructuredLogger,
}

impl PollTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            config: config.clone(),
            client: None,
            since: None,
            logger: get_logger("poll"),
        }
    }

    /// Cursor sent with the next request
    pub fn since(&self) -> Option<i64> {
        self.since
    }
}

#[async_trait]
impl Transport for PollTransport {
    fn name(&self) -> &'static str {
        "poll"
    }

    async fn connect(&mut self) -> Result<()> {
        let client = reqwest::Client::builder()
            .connect_timeout(self.config.connect_timeout())
            .timeout(Duration::from_secs(self.config.poll_timeout_secs) + RESPONSE_MARGIN)
            .build()?;
        self.client = Some(client);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>> {
        let Some(client) = self.client.as_ref() else {
            return Err(MeterstreamError::transport("poll client is not connected"));
        };
        let url = self.config.poll_url();
        let query = self.config.poll_query(self.since);
        self.logger.trace(&format!("GET {} {:?}", url, query));

        let response = client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MeterstreamError::transport(format!(
                "firehose request returned HTTP {}",
                status
            )));
        }
        let body = response.text().await?;

        match serde_json::from_str::<Value>(&body) {
            Ok(value) => {
                if let Some(cursor) = wire::firehose_cursor(&value) {
                    self.since = Some(cursor);
                }
                Ok(Some(Frame::Json(value)))
            }
            // let the dashboard log and drop it
            Err(_) => Ok(Some(Frame::Text(body))),
        }
    }

    async fn close(&mut self) {
        self.client = None;
    }
}
