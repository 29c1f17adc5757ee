//! vi-replay: run a key sequence through the modal engine and print the
//! resulting buffer.
use anyhow::{Context, Result};
use clap::Parser;
use core_actions::Engine;
use core_config::load_from;
use core_events::parse_notation;
use core_model::EditorModel;
use core_text::Buffer;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

mod report;

/// Environment variable holding the log filter (`VI_LOG=actions=trace`).
const LOG_ENV: &str = "VI_LOG";

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "vi-replay", version, about = "Replay vi keys over a text file")]
struct Args {
    /// Keys in notation form, e.g. `3dw` or `cwnew<Esc>`.
    keys: String,
    /// File to edit; the text is read from stdin when omitted.
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Configuration file (overrides discovery of `vi-engine.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Also print every non-empty register.
    #[arg(short, long)]
    registers: bool,
    /// Write logs to this file (filtered by `VI_LOG`).
    #[arg(long = "log")]
    log: Option<PathBuf>,
}

fn configure_logging(path: Option<&Path>) -> Option<WorkerGuard> {
    let path = path?;
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = path.file_name()?;
    let file_appender = tracing_appender::rolling::never(dir, name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env(LOG_ENV))
        .with_writer(nb_writer)
        .with_ansi(false)
        .try_init()
    {
        Ok(()) => Some(guard),
        // Global subscriber already installed; dropping the guard stops the writer.
        Err(_) => None,
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
            Ok(text)
        }
    }
}

fn replay(name: &str, text: &str, keys: &str, options: core_config::Options) -> Result<(Engine, EditorModel)> {
    let chars = parse_notation(keys).with_context(|| format!("parsing keys {keys:?}"))?;
    let mut engine = Engine::new(&options);
    let mut model = EditorModel::new(Box::new(Buffer::from_str(name, text)), options);
    let effect = engine.feed_keys(&mut model, &chars);
    debug!(target: "replay", ?effect, keys = chars.len(), "replayed");
    Ok((engine, model))
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(args.log.as_deref());
    let config = load_from(args.config.clone())?;
    let text = read_input(args.file.as_deref())?;
    let name = args
        .file
        .as_ref()
        .map_or_else(|| "[stdin]".to_string(), |p| p.display().to_string());
    info!(target: "replay", buffer = %name, keys = %args.keys, "startup");

    let (engine, model) = replay(&name, &text, &args.keys, config.options)?;
    let out = report::render(&engine, &model, args.registers);
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
