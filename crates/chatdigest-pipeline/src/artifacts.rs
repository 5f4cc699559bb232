use std::path::{Path, PathBuf};

use chatdigest_core::{digest_file_name, PipelineError, Result};
use chrono::NaiveDateTime;

/// Which pipeline a persisted prompt belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    Analysis,
    Html,
}

impl PromptKind {
    fn stem_and_ext(self) -> (&'static str, &'static str) {
        match self {
            PromptKind::Analysis => ("combined_prompt", "md"),
            PromptKind::Html => ("html_prompt", "txt"),
        }
    }
}

/// Flat-file store rooted at the working directory. Prompt files are kept after the run.
#[derive(Clone, Debug)]
pub struct FsArtifactStore {
    pub root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn prompt_path(&self, kind: PromptKind, started_at: NaiveDateTime) -> PathBuf {
        let (stem, ext) = kind.stem_and_ext();
        self.root
            .join(format!("{stem}_{}.{ext}", started_at.format("%Y%m%d_%H%M%S")))
    }

    /// `output_YYYYMMDD.md` under the root.
    pub fn default_output_path(&self, at: NaiveDateTime) -> PathBuf {
        self.root.join(format!("output_{}.md", at.format("%Y%m%d")))
    }

    /// Writes the prompt verbatim and returns its path.
    pub fn write_prompt(&self, kind: PromptKind, started_at: NaiveDateTime, prompt: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)?;
        let path = self.prompt_path(kind, started_at);
        std::fs::write(&path, prompt)?;
        tracing::info!(path = %path.display(), "prompt saved");
        Ok(path)
    }
}

/// Writes `content` and checks that a non-empty file landed on disk. Returns its size.
pub fn write_output(path: &Path, content: &str) -> Result<u64> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    let meta = std::fs::metadata(path).map_err(|_| {
        PipelineError::MissingInput(format!("output file {} was not created", path.display()))
    })?;
    if meta.len() == 0 {
        return Err(PipelineError::EmptyPayload(format!("output file {} is empty", path.display())));
    }
    Ok(meta.len())
}

/// Where a transcript digest goes: no path means the default name in the current
/// directory, an existing directory gets the default name inside it, anything else is
/// taken as the file path.
pub fn digest_output_path(output: Option<&Path>, room_id: &str, at: NaiveDateTime) -> PathBuf {
    let name = digest_file_name(room_id, at);
    match output {
        None => PathBuf::from(".").join(name),
        Some(p) if p.as_os_str().is_empty() => PathBuf::from(".").join(name),
        Some(p) if p.is_dir() => p.join(name),
        Some(p) => p.to_path_buf(),
    }
}
