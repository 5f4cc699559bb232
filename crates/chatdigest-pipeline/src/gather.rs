use std::path::PathBuf;

use chatdigest_client::ChatlogClient;
use chatdigest_core::{compose_gathered, PipelineError, Result};
use tracing::info;

use crate::artifacts::write_output;
use crate::util::read_text;

#[derive(Clone, Debug)]
pub struct GatherOptions {
    pub prompt: PathBuf,
    pub output: PathBuf,
    pub rooms: Vec<String>,
    /// Messages per room.
    pub limit: u32,
}

#[derive(Clone, Debug)]
pub struct GatherReport {
    pub output_path: PathBuf,
    /// Rooms that answered, in request order.
    pub rooms: Vec<String>,
    pub bytes: u64,
}

/// Appends the recent log of every answering room to the prompt file's text.
///
/// Fails with [`PipelineError::MissingInput`] carrying the session overview when no
/// room produced data.
pub async fn gather_prompt(client: &ChatlogClient, opts: &GatherOptions) -> Result<GatherReport> {
    let prompt = read_text(&opts.prompt, "prompt file")?;
    let gathered = client.gather(&opts.rooms, opts.limit).await?;
    if gathered.blocks.is_empty() {
        return Err(PipelineError::MissingInput(format!(
            "no chat logs could be fetched; available sessions:\n{}",
            gathered.sessions
        )));
    }

    let bytes = write_output(&opts.output, &compose_gathered(&prompt, &gathered.blocks))?;
    let rooms = gathered.blocks.into_iter().map(|b| b.label).collect::<Vec<_>>();
    info!(output = %opts.output.display(), rooms = rooms.len(), bytes, "gathered prompt written");
    Ok(GatherReport {
        output_path: opts.output.clone(),
        rooms,
        bytes,
    })
}
