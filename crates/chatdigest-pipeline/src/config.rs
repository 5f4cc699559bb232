use std::path::{Path, PathBuf};

use chatdigest_core::{PipelineError, Result};
use serde::{Deserialize, Serialize};

use crate::generator::{CommandGenerator, GeneratorEnv};

pub const DEFAULT_MCP_PATH: &str = "mcp.json";
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

/// Chat-log service endpoint, read from `mcpServers.chatlog.url` in mcp.json.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatlogConfig {
    pub server_url: String,
}

impl ChatlogConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::Configuration(format!("{} not found", path.display())))
            }
            Err(e) => return Err(e.into()),
        };
        let value: serde_json::Value = serde_json::from_str(&s)
            .map_err(|e| PipelineError::Configuration(format!("parse {}: {e}", path.display())))?;
        let url = value
            .pointer("/mcpServers/chatlog/url")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                PipelineError::Configuration(format!(
                    "{} is missing key mcpServers.chatlog.url",
                    path.display()
                ))
            })?;
        Ok(Self {
            server_url: url.to_string(),
        })
    }
}

/// Contents of config.yml.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub webot_url: Option<String>,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default = "default_path_prefix")]
    pub path_prefix: Option<String>,
    /// `null` in config.yml leaves `ANTHROPIC_BASE_URL` unset on the child.
    #[serde(default = "default_base_url")]
    pub base_url: Option<String>,
    /// `null` in config.yml leaves `NODE_EXTRA_CA_CERTS` unset on the child.
    #[serde(default = "default_extra_ca_certs")]
    pub extra_ca_certs: Option<String>,
}

fn default_program() -> String {
    "claude".to_string()
}

fn default_args() -> Vec<String> {
    vec!["-p".to_string()]
}

fn default_path_prefix() -> Option<String> {
    Some("/opt/homebrew/bin".to_string())
}

fn default_base_url() -> Option<String> {
    Some("https://gaccode.com/claudecode".to_string())
}

fn default_extra_ca_certs() -> Option<String> {
    Some("/opt/homebrew/lib/node_modules/@anthropic-ai/claude-code/ca.pem".to_string())
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            path_prefix: default_path_prefix(),
            base_url: default_base_url(),
            extra_ca_certs: default_extra_ca_certs(),
        }
    }
}

fn expand(s: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(s).to_string())
}

impl GeneratorConfig {
    pub fn to_generator(&self) -> CommandGenerator {
        let env = GeneratorEnv {
            path_prefix: self.path_prefix.as_deref().map(expand),
            base_url: self.base_url.clone(),
            extra_ca_certs: self.extra_ca_certs.as_deref().map(expand),
        };
        CommandGenerator::new(expand(&self.program), self.args.clone(), env)
    }
}

impl AppConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::Configuration(format!("{} not found", path.display())))
            }
            Err(e) => return Err(e.into()),
        };
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&s)
            .map_err(|e| PipelineError::Configuration(format!("parse {}: {e}", path.display())))
    }

    /// Like [`AppConfig::load_from`] but an absent file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn webhook_url(&self) -> Result<&str> {
        match self.webot_url.as_deref().map(str::trim) {
            None => Err(PipelineError::Configuration("webot_url is missing".into())),
            Some("") => Err(PipelineError::Configuration("webot_url is empty".into())),
            Some(url) => Ok(url),
        }
    }
}
