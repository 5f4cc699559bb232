use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required file or argument is absent.
    #[error("missing input: {0}")]
    MissingInput(String),

    /// Non-zero subprocess exit, non-200 HTTP status, or a transport error.
    #[error("{context}")]
    ExternalToolFailure {
        context: String,
        stdout: String,
        stderr: String,
    },

    #[error("empty payload: {0}")]
    EmptyPayload(String),

    #[error("no content found between {start} and {end} markers")]
    MissingMarkers { start: &'static str, end: &'static str },

    #[error("parse failure: {0}")]
    ParseFailure(String),

    /// An argument value the pipeline cannot act on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// External failure with no captured process output (HTTP status, transport).
    pub fn external(context: impl Into<String>) -> Self {
        Self::ExternalToolFailure {
            context: context.into(),
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
