use std::time::Duration;

use chatdigest_core::{decode_ack, DeliveryOutcome, PipelineError, Result};
use reqwest::{Client, StatusCode};
use tracing::{debug, info};

pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Posts plain-text messages to the group-messaging webhook.
#[derive(Clone, Debug)]
pub struct WebhookClient {
    url: String,
    http: Client,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DELIVERY_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Configuration(format!("http client: {e}")))?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    /// Sends `msg` to destination `to` and interprets the acknowledgement.
    ///
    /// Transport errors and non-200 statuses are errors; a decoded acknowledgement with
    /// a non-success code is [`DeliveryOutcome::Rejected`].
    pub async fn send(&self, to: &str, msg: &str) -> Result<DeliveryOutcome> {
        info!(to, chars = msg.chars().count(), "sending message");
        let resp = self
            .http
            .post(&self.url)
            .form(&[("to", to), ("msg", msg)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PipelineError::external("request timed out")
                } else if e.is_connect() {
                    PipelineError::external(format!(
                        "connection failed, check the network or webot_url: {e}"
                    ))
                } else {
                    PipelineError::external(format!("HTTP request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(PipelineError::external(format!(
                "HTTP request failed with status {status}"
            )));
        }
        let body = resp
            .text()
            .await
            .map_err(|e| PipelineError::external(format!("reading response failed: {e}")))?;
        debug!(%body, "webhook response");

        Ok(decode_ack(&body)?.outcome())
    }
}
