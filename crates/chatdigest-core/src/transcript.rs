use chrono::NaiveDateTime;

use crate::timerange::{TimeRange, DISPLAY_FORMAT};

/// Drops every line containing `excluded`. An empty filter keeps the transcript as is.
pub fn filter_lines(transcript: &str, excluded: &str) -> String {
    if excluded.is_empty() {
        return transcript.to_string();
    }
    transcript
        .split('\n')
        .filter(|line| !line.contains(excluded))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Room id made safe for use in a file name.
pub fn clean_room_id(room_id: &str) -> String {
    room_id.replace(['@', ':'], "_")
}

/// Default digest file name: `<clean_id>_chatlog_YYYYMMDD.md`.
pub fn digest_file_name(room_id: &str, at: NaiveDateTime) -> String {
    format!("{}_chatlog_{}.md", clean_room_id(room_id), at.format("%Y%m%d"))
}

/// Wraps a fetched transcript in the Markdown header block.
pub fn format_digest(
    room_id: &str,
    range: &TimeRange,
    hours: u32,
    generated_at: NaiveDateTime,
    transcript: &str,
) -> String {
    format!(
        "# Chat Log\n\n\
         **Room ID**: {room_id}\n\
         **Time Range**: {} ~ {}\n\
         **Lookback**: last {hours} hours\n\
         **Generated At**: {}\n\n\
         ---\n\n\
         ## Transcript\n\n\
         {transcript}",
        range.start.format(DISPLAY_FORMAT),
        range.end.format(DISPLAY_FORMAT),
        generated_at.format(DISPLAY_FORMAT),
    )
}
