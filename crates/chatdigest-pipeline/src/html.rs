use std::path::{Path, PathBuf};

use chatdigest_core::{extract_fenced, Result};
use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::artifacts::{write_output, FsArtifactStore, PromptKind};
use crate::generator::Generator;
use crate::util::read_text;

pub const DEFAULT_TITLE: &str = "AI News Digest";

/// Title from a leading `#` heading, or [`DEFAULT_TITLE`].
pub fn markdown_title(markdown: &str) -> String {
    match markdown.trim().lines().next() {
        Some(first) if first.starts_with('#') => first.trim_start_matches('#').trim().to_string(),
        _ => DEFAULT_TITLE.to_string(),
    }
}

pub fn html_prompt(title: &str, markdown: &str) -> String {
    format!(
        "Convert the following Markdown into a clearly structured HTML page that is light on cognitive load.\n\
         \n\
         Requirements:\n\
         1. Use a complete HTML5 document (<!DOCTYPE html>, <html>, <head>, <body>).\n\
         2. Use the document title in the <title> tag: {title}\n\
         3. Add CSS so the page is clean, attractive and easy to read.\n\
         4. Make the layout responsive for mobile and desktop.\n\
         5. Keep the content hierarchy clear.\n\
         6. Make sure emoji and formatting render correctly.\n\
         7. Use suitable fonts and spacing.\n\
         8. Add restrained colour and visual accents.\n\
         9. Output the complete HTML directly, not wrapped in a Markdown code block.\n\
         \n\
         Markdown content:\n\
         \n\
         {markdown}\n\
         \n\
         Output the complete HTML code only.\n"
    )
}

pub fn looks_like_html(s: &str) -> bool {
    let s = s.trim_start();
    s.starts_with("<!DOCTYPE") || s.starts_with("<html")
}

#[derive(Clone, Debug)]
pub struct HtmlReport {
    pub prompt_path: PathBuf,
    pub output_path: PathBuf,
    pub bytes: u64,
}

/// Markdown file -> generator -> fenced HTML -> output file.
pub fn render_html<G: Generator + ?Sized>(
    input: &Path,
    output: &Path,
    store: &FsArtifactStore,
    generator: &G,
    started_at: NaiveDateTime,
) -> Result<HtmlReport> {
    let markdown = read_text(input, "input file")?;
    let title = markdown_title(&markdown);
    let prompt = html_prompt(&title, &markdown);

    let prompt_path = store.write_prompt(PromptKind::Html, started_at, &prompt)?;
    let persisted = read_text(&prompt_path, "prompt file")?;
    let raw = generator.generate(&persisted)?;

    let html = extract_fenced(&raw, "html");
    if !looks_like_html(&html) {
        warn!("generated content doesn't appear to be a complete HTML document");
    }

    let bytes = write_output(output, &html)?;
    info!(output = %output.display(), bytes, "html written");
    Ok(HtmlReport {
        prompt_path,
        output_path: output.to_path_buf(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_from_heading() {
        assert_eq!(markdown_title("\n## Daily AI Brief \nbody"), "Daily AI Brief");
        assert_eq!(markdown_title("no heading\n# later"), DEFAULT_TITLE);
        assert_eq!(markdown_title(""), DEFAULT_TITLE);
    }

    #[test]
    fn prompt_embeds_title_and_markdown() {
        let p = html_prompt("T1", "# T1\n- item");
        assert!(p.contains("<title> tag: T1\n"));
        assert!(p.contains("Markdown content:\n\n# T1\n- item\n"));
    }

    #[test]
    fn html_detection() {
        assert!(looks_like_html("  <!DOCTYPE html><html></html>"));
        assert!(looks_like_html("<html lang=\"en\"></html>"));
        assert!(!looks_like_html("Sure! Here's the page"));
    }
}
