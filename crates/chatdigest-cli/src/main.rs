use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chatdigest_client::{ChatlogClient, WebhookClient};
use chatdigest_core::{InstructionPlacement, MarkerPolicy, PipelineError, NO_MATCH};
use chatdigest_pipeline::{
    fetch_digest, gather_prompt, now_local, post_file, render_html, run_analysis, AnalyzeOptions, AppConfig,
    ChatlogConfig, FetchOptions, FsArtifactStore, GatherOptions, DEFAULT_CONFIG_PATH, DEFAULT_MCP_PATH,
};

#[derive(Parser)]
#[command(name = "chatdigest", version, about = "Chat-log digests through an LLM command line tool")]
struct Cli {
    /// Log request and pipeline details (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Chat-log service config (JSON, mcpServers.chatlog.url)
    #[arg(long, global = true, default_value = DEFAULT_MCP_PATH)]
    mcp: PathBuf,

    /// Webhook and generator config (YAML)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze log files with a prompt template and save the marked answer
    Analyze {
        /// Prompt template file
        #[arg(short, long, default_value = "prompt.md")]
        prompt: PathBuf,
        /// Input log files
        #[arg(short = 'i', long = "input", num_args = 1..)]
        inputs: Vec<PathBuf>,
        /// Output file (default: output_YYYYMMDD.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Put the output-format instructions before the template
        #[arg(long)]
        instructions_first: bool,
        /// Use the whole generator output when the markers are missing
        #[arg(long)]
        lenient: bool,
        /// Additional log files
        files: Vec<PathBuf>,
    },

    /// Convert a Markdown file to a standalone HTML page
    Html {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Save the recent transcript of a chat room as Markdown
    Fetch {
        /// Room id, e.g. 27587714869@chatroom
        #[arg(short = 'w', long = "wechat-id", visible_alias = "wid")]
        room: String,
        /// Output file or directory (default: generated name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Lookback window in hours
        #[arg(short = 't', long, default_value_t = 24)]
        hours: u32,
        /// Drop lines mentioning this user id
        #[arg(long, default_value = "")]
        nouser: String,
    },

    /// Send a plain-text file to a group through the webhook
    Post {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short = 'w', long = "wechat-id", visible_alias = "wid")]
        room: String,
    },

    /// Print the id of the first room whose name contains TERM, or null
    RoomId { term: String },

    /// Fetch recent messages of several rooms and append them to a prompt
    Gather {
        #[arg(short, long)]
        prompt: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Room id to include (repeatable)
        #[arg(long = "room", required = true)]
        rooms: Vec<String>,
        /// Messages per room
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
}

fn main() -> ExitCode {
    let started_at = now_local();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    init_tracing(cli.verbose);

    match run(cli, started_at) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn report_error(e: &anyhow::Error) {
    println!("Error: {e:#}");
    if let Some(PipelineError::ExternalToolFailure { stdout, stderr, .. }) = e.downcast_ref::<PipelineError>() {
        if !stdout.is_empty() {
            println!("Command output: {stdout}");
        }
        if !stderr.is_empty() {
            println!("Command error: {stderr}");
        }
    }
}

/// Drives one future on a single-threaded runtime.
fn block_on<F: Future>(fut: F) -> Result<F::Output> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    Ok(rt.block_on(fut))
}

fn run(cli: Cli, started_at: NaiveDateTime) -> Result<()> {
    match cli.cmd {
        Command::Analyze {
            prompt,
            mut inputs,
            output,
            instructions_first,
            lenient,
            files,
        } => {
            inputs.extend(files);
            let cfg = AppConfig::load_or_default(&cli.config)?;
            let generator = cfg.generator.to_generator();
            let store = FsArtifactStore::new(std::env::current_dir()?);
            let opts = AnalyzeOptions {
                template: prompt,
                inputs,
                output,
                placement: if instructions_first {
                    InstructionPlacement::First
                } else {
                    InstructionPlacement::Last
                },
                markers: if lenient { MarkerPolicy::Lenient } else { MarkerPolicy::Strict },
            };
            let report = run_analysis(&opts, &store, &generator, started_at)?;
            println!("Analysis complete. Results saved to: {}", report.output_path.display());
            println!("Combined prompt file kept at: {}", report.prompt_path.display());
        }
        Command::Html { input, output } => {
            let cfg = AppConfig::load_or_default(&cli.config)?;
            let generator = cfg.generator.to_generator();
            let store = FsArtifactStore::new(std::env::current_dir()?);
            let report = render_html(&input, &output, &store, &generator, started_at)?;
            println!("HTML generation complete. Output saved to: {}", report.output_path.display());
            println!("File size: {} bytes", report.bytes);
            println!("Prompt file kept at: {}", report.prompt_path.display());
        }
        Command::Fetch {
            room,
            output,
            hours,
            nouser,
        } => {
            let client = chatlog_client(&cli.mcp)?;
            println!("Fetching chat log for {room}...");
            let opts = FetchOptions {
                room,
                output,
                hours,
                exclude: nouser,
            };
            let report = block_on(fetch_digest(&client, &opts, started_at))??;
            println!("Chat log saved to: {}", report.output_path.display());
        }
        Command::Post { input, room } => {
            let cfg = AppConfig::load_from(&cli.config)?;
            let url = cfg.webhook_url()?;
            println!("Using webot_url: {url}");
            let client = WebhookClient::new(url)?;
            println!("Sending message to {room}...");
            block_on(post_file(&client, &input, &room))??;
            println!("Message sent");
        }
        Command::RoomId { term } => println!("{}", room_id(&cli.mcp, &term)),
        Command::Gather {
            prompt,
            output,
            rooms,
            limit,
        } => {
            let client = chatlog_client(&cli.mcp)?;
            let opts = GatherOptions {
                prompt,
                output,
                rooms,
                limit,
            };
            let report = block_on(gather_prompt(&client, &opts))??;
            println!("Result written to: {}", report.output_path.display());
        }
    }
    Ok(())
}

fn chatlog_client(mcp: &Path) -> Result<ChatlogClient> {
    let chat = ChatlogConfig::load_from(mcp)?;
    info!(server = %chat.server_url, "connecting to chat-log service");
    Ok(ChatlogClient::new(chat.server_url))
}

/// Room id for `term`, or the `null` sentinel on any failure.
fn room_id(mcp: &Path, term: &str) -> String {
    let cfg = match ChatlogConfig::load_from(mcp) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "no chat-log config");
            return NO_MATCH.to_string();
        }
    };
    let client = ChatlogClient::new(cfg.server_url);
    match block_on(client.lookup_room_id(term)) {
        Ok(Some(id)) => id,
        _ => NO_MATCH.to_string(),
    }
}
