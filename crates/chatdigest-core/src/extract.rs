use std::sync::OnceLock;

use regex::Regex;

use crate::error::{PipelineError, Result};

pub const START_MARKER: &str = "<!-- start -->";
pub const END_MARKER: &str = "<!-- end -->";

const FENCE: &str = "```";

/// What to do when the generator output carries no marker pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarkerPolicy {
    /// Missing markers fail the run.
    #[default]
    Strict,
    /// Missing markers make the whole trimmed output the payload.
    Lenient,
}

fn marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pat = format!(
            "(?s){}(.*?){}",
            regex::escape(START_MARKER),
            regex::escape(END_MARKER)
        );
        Regex::new(&pat).expect("marker pattern is valid")
    })
}

/// Returns the trimmed text between the first start marker and the first end marker after it.
///
/// A marker pair enclosing only whitespace is [`PipelineError::EmptyPayload`] under
/// either policy.
pub fn extract_marked(raw: &str, policy: MarkerPolicy) -> Result<String> {
    match marker_re().captures(raw) {
        Some(caps) => {
            let payload = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            if payload.is_empty() {
                return Err(PipelineError::EmptyPayload(
                    "extracted content between markers is empty".into(),
                ));
            }
            Ok(payload.to_string())
        }
        None => match policy {
            MarkerPolicy::Strict => Err(PipelineError::MissingMarkers {
                start: START_MARKER,
                end: END_MARKER,
            }),
            MarkerPolicy::Lenient => {
                tracing::warn!("no markers in generator output; using the whole output");
                Ok(raw.trim().to_string())
            }
        },
    }
}

/// Pulls the body out of a fenced code block, preferring a fence tagged with `lang`.
///
/// Text without a usable fence comes back trimmed and otherwise unchanged.
pub fn extract_fenced(raw: &str, lang: &str) -> String {
    let text = raw.trim();
    let tagged = format!("{FENCE}{lang}");

    if let Some(pos) = text.find(&tagged) {
        let start = pos + tagged.len();
        if let Some(end) = text.rfind(FENCE) {
            if end > start {
                return text[start..end].trim().to_string();
            }
        }
        return text.to_string();
    }

    let parts: Vec<&str> = text.split(FENCE).collect();
    if parts.len() >= 3 {
        let body = parts[1].trim();
        let tag_line = format!("{lang}\n");
        return match body.strip_prefix(&tag_line) {
            Some(rest) => rest.trim().to_string(),
            None => body.to_string(),
        };
    }
    text.to_string()
}
