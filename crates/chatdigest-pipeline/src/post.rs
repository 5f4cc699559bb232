use std::path::Path;

use chatdigest_client::WebhookClient;
use chatdigest_core::{DeliveryOutcome, PipelineError, Result};
use tracing::{info, warn};

use crate::util::read_text;

/// Sends the trimmed contents of `input` to `room`.
///
/// Empty content is still sent. A rejected acknowledgement is an
/// [`PipelineError::ExternalToolFailure`] carrying the webhook's message.
pub async fn post_file(client: &WebhookClient, input: &Path, room: &str) -> Result<()> {
    let message = read_text(input, "input file")?.trim().to_string();
    if message.is_empty() {
        warn!("message content is empty, sending anyway");
    }

    match client.send(room, &message).await? {
        DeliveryOutcome::Delivered => {
            info!(room, "message delivered");
            Ok(())
        }
        DeliveryOutcome::Rejected { code, message } => Err(PipelineError::external(match code {
            Some(code) => format!("message delivery failed (code {code}): {message}"),
            None => format!("message delivery failed: {message}"),
        })),
    }
}
