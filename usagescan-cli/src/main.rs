use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use usagescan_upload::{
    MemoryArchive, UploadForm, UploadHandler, UploadRequest, UploadedFile,
};

mod config;
mod state;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "usagescan", version, about = "Summarize usage CSV exports against a threshold")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a CSV through the upload pipeline and print the JSON reply
    Summarize {
        /// Path to the CSV file
        #[arg(long)]
        csv: PathBuf,

        /// Usage threshold (non-negative number)
        #[arg(long)]
        threshold: String,

        /// Also archive into an in-memory store and print the stored record
        #[arg(long)]
        archive: bool,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },

    /// Manage ~/.usagescan/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,

    /// Print the effective config (file + environment overrides)
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    init_tracing(&cfg.runtime.log_level);

    match cli.command {
        Command::Summarize {
            csv,
            threshold,
            archive,
            compact,
        } => {
            summarize(&cfg, &csv, threshold, archive, compact).await?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("{}", s.trim_end());
            }
        },
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only the JSON reply.
fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

async fn summarize(
    cfg: &Config,
    csv: &Path,
    threshold: String,
    archive: bool,
    compact: bool,
) -> Result<()> {
    let bytes = std::fs::read(csv).with_context(|| format!("read {}", csv.display()))?;
    let file_name = csv
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("no file name in {}", csv.display()))?;
    debug!(file = %file_name, size = bytes.len(), "loaded csv");

    let mut handler = UploadHandler::new(cfg.file_limits(), cfg.runtime.environment);
    let memory = archive.then(|| Arc::new(MemoryArchive::new(cfg.archive.clone())));
    if let Some(memory) = &memory {
        handler = handler.with_archive(memory.clone());
    }

    let request = UploadRequest::post(UploadForm::new(
        UploadedFile::new(file_name, bytes),
        threshold,
    ));
    let reply = handler.handle(request).await;

    println!("{}", render_json(&reply.body, compact)?);

    if let Some(memory) = &memory {
        for record in memory.records() {
            info!(id = %record.id, key = %record.s3_key, "record captured");
            let json = serde_json::to_string(&record).context("serialize record")?;
            println!("{}", render_json(&json, compact)?);
        }
    }

    if !reply.is_success() {
        bail!("upload rejected with status {}", reply.status);
    }
    Ok(())
}

fn render_json(body: &str, compact: bool) -> Result<String> {
    if compact {
        return Ok(body.to_string());
    }
    let value: serde_json::Value = serde_json::from_str(body).context("parse reply body")?;
    Ok(serde_json::to_string_pretty(&value)?)
}
