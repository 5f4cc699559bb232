use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use chatdigest_core::{PipelineError, Result};

/// Environment overrides for the generator subprocess.
///
/// Applied on top of the inherited environment of the child only; the current
/// process environment is left alone. `GeneratorConfig` fills all three by default,
/// so runs from cron or launchd reach the tool without a login shell environment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GeneratorEnv {
    /// Prepended to the inherited `PATH`.
    pub path_prefix: Option<PathBuf>,
    /// Exported as `ANTHROPIC_BASE_URL`.
    pub base_url: Option<String>,
    /// Exported as `NODE_EXTRA_CA_CERTS`.
    pub extra_ca_certs: Option<PathBuf>,
}

impl GeneratorEnv {
    /// Variables to set on the child, given the inherited `PATH`.
    pub fn vars(&self, inherited_path: Option<OsString>) -> Vec<(OsString, OsString)> {
        let mut out = Vec::new();
        if let Some(prefix) = &self.path_prefix {
            let mut dirs = vec![prefix.clone()];
            if let Some(p) = &inherited_path {
                dirs.extend(std::env::split_paths(p));
            }
            let joined = std::env::join_paths(dirs).unwrap_or_else(|_| prefix.clone().into_os_string());
            out.push(("PATH".into(), joined));
        }
        if let Some(url) = &self.base_url {
            out.push(("ANTHROPIC_BASE_URL".into(), url.into()));
        }
        if let Some(ca) = &self.extra_ca_certs {
            out.push(("NODE_EXTRA_CA_CERTS".into(), ca.clone().into_os_string()));
        }
        out
    }
}

/// Turns a prompt into raw text.
pub trait Generator {
    fn generate(&self, prompt: &str) -> Result<String>;
}

impl<F> Generator for F
where
    F: Fn(&str) -> Result<String>,
{
    fn generate(&self, prompt: &str) -> Result<String> {
        self(prompt)
    }
}

/// Runs an external LLM command line tool as `<program> <args..> <prompt>` and captures stdout.
///
/// There is no timeout; the call returns when the tool exits.
#[derive(Clone, Debug)]
pub struct CommandGenerator {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: GeneratorEnv,
}

impl CommandGenerator {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, env: GeneratorEnv) -> Self {
        Self {
            program: program.into(),
            args,
            env,
        }
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, prompt: &str) -> Result<String> {
        tracing::info!(program = %self.program.display(), args = ?self.args, prompt_len = prompt.len(), "running generator");
        let out = Command::new(&self.program)
            .args(&self.args)
            .arg(prompt)
            .envs(self.env.vars(std::env::var_os("PATH")))
            .output()
            .map_err(|e| PipelineError::external(format!("failed to run {}: {e}", self.program.display())))?;

        let stdout = String::from_utf8_lossy(&out.stdout).to_string();
        if !out.status.success() {
            return Err(PipelineError::ExternalToolFailure {
                context: format!("{} exited with {}", self.program.display(), out.status),
                stdout,
                stderr: String::from_utf8_lossy(&out.stderr).to_string(),
            });
        }
        Ok(stdout)
    }
}
