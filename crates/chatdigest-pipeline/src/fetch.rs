use std::path::PathBuf;

use chatdigest_client::ChatlogClient;
use chatdigest_core::{filter_lines, format_digest, Result, TimeRange, DISPLAY_FORMAT};
use chrono::NaiveDateTime;
use tracing::info;

use crate::artifacts::{digest_output_path, write_output};

#[derive(Clone, Debug)]
pub struct FetchOptions {
    pub room: String,
    /// File, existing directory, or `None` for the generated name in `.`.
    pub output: Option<PathBuf>,
    pub hours: u32,
    /// Lines containing this user id are dropped; empty keeps everything.
    pub exclude: String,
}

#[derive(Clone, Debug)]
pub struct FetchReport {
    pub range: TimeRange,
    pub output_path: PathBuf,
    pub bytes: u64,
}

/// Transcript of the last `hours` -> exclusion filter -> digest header -> output file.
///
/// `started_at` anchors the lookback window and is recorded as the generation time.
pub async fn fetch_digest(
    client: &ChatlogClient,
    opts: &FetchOptions,
    started_at: NaiveDateTime,
) -> Result<FetchReport> {
    let range = TimeRange::lookback(started_at, opts.hours)?;
    info!(
        start = %range.start.format(DISPLAY_FORMAT),
        end = %range.end.format(DISPLAY_FORMAT),
        hours = opts.hours,
        "query window"
    );

    let mut transcript = client.fetch_transcript(&opts.room, &range).await?;
    info!(chars = transcript.chars().count(), "transcript received");

    if !opts.exclude.is_empty() {
        info!(user = %opts.exclude, "filtering user");
        transcript = filter_lines(&transcript, &opts.exclude);
    }

    let doc = format_digest(&opts.room, &range, opts.hours, started_at, &transcript);
    let output_path = digest_output_path(opts.output.as_deref(), &opts.room, range.end);
    let bytes = write_output(&output_path, &doc)?;
    info!(output = %output_path.display(), bytes, "digest written");
    Ok(FetchReport {
        range,
        output_path,
        bytes,
    })
}
