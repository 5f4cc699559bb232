use std::path::PathBuf;

use chatdigest_core::{
    extract_marked, InstructionPlacement, MarkerPolicy, PipelineError, PromptBuilder, Result, SourceDoc,
};
use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::artifacts::{write_output, FsArtifactStore, PromptKind};
use crate::generator::Generator;
use crate::util::read_text;

#[derive(Clone, Debug)]
pub struct AnalyzeOptions {
    pub template: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub placement: InstructionPlacement,
    pub markers: MarkerPolicy,
}

#[derive(Clone, Debug)]
pub struct AnalyzeReport {
    pub prompt_path: PathBuf,
    pub output_path: PathBuf,
    pub bytes: u64,
    pub skipped: Vec<PathBuf>,
}

/// Template + log files -> generator -> marked payload -> output file.
pub fn run_analysis<G: Generator + ?Sized>(
    opts: &AnalyzeOptions,
    store: &FsArtifactStore,
    generator: &G,
    started_at: NaiveDateTime,
) -> Result<AnalyzeReport> {
    if opts.inputs.is_empty() {
        return Err(PipelineError::MissingInput("no log files provided".into()));
    }
    if !opts.template.exists() {
        return Err(PipelineError::MissingInput(format!(
            "prompt file {} not found",
            opts.template.display()
        )));
    }

    let mut skipped = Vec::new();
    let mut sources = Vec::new();
    for path in &opts.inputs {
        if !path.exists() {
            warn!(path = %path.display(), "log file not found, skipping");
            skipped.push(path.clone());
            continue;
        }
        sources.push(SourceDoc::new(path.display().to_string(), read_text(path, "log file")?));
    }
    if sources.is_empty() {
        return Err(PipelineError::MissingInput("no valid log files found".into()));
    }

    let template = read_text(&opts.template, "prompt file")?;
    let prompt = PromptBuilder::new(opts.placement)
        .template(template)
        .sources(sources)
        .build();

    let prompt_path = store.write_prompt(PromptKind::Analysis, started_at, &prompt)?;
    let persisted = read_text(&prompt_path, "prompt file")?;
    let raw = generator.generate(&persisted)?;
    let payload = extract_marked(&raw, opts.markers)?;

    let output_path = opts
        .output
        .clone()
        .unwrap_or_else(|| store.default_output_path(started_at));
    let bytes = write_output(&output_path, &payload)?;
    info!(output = %output_path.display(), bytes, "analysis written");

    Ok(AnalyzeReport {
        prompt_path,
        output_path,
        bytes,
        skipped,
    })
}
