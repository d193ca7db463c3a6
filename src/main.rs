//! csproj-langversion: sets LangVersion in generated C# projects from csc.rsp

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use csproj_langversion::{LineEnding, Mode, Runner, SyncConfig};

#[derive(Parser, Debug)]
#[command(
    name = "csproj-langversion",
    version,
    about = "Sync the LangVersion of generated C# projects with csc.rsp"
)]
struct Cli {
    /// Project files, or directories whose .csproj files are processed
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Directory Include paths are resolved against (default: the project's directory)
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Line separator written after the XML declaration
    #[arg(long, value_enum)]
    line_ending: Option<LineEnding>,

    /// YAML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit with status 1 if any project would change, without writing
    #[arg(long, conflicts_with = "stdout")]
    check: bool,

    /// Print reconciled projects instead of rewriting them
    #[arg(long)]
    stdout: bool,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.stdout {
            Mode::Stdout
        } else {
            Mode::Write
        }
    }

    fn sync_config(&self) -> anyhow::Result<SyncConfig> {
        let mut config = match &self.config {
            Some(path) => SyncConfig::load(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SyncConfig::default(),
        };
        if let Some(root) = &self.project_root {
            config.project_root = Some(root.clone());
        }
        if let Some(line_ending) = self.line_ending {
            config.line_ending = line_ending;
        }
        Ok(config)
    }
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let mode = cli.mode();
    let config = cli.sync_config()?;

    let runner = Runner::new(config, mode);
    let summary = runner.run_paths(&cli.paths, &mut io::stdout().lock());
    tracing::info!(
        "{} project(s): {} changed, {} failed",
        summary.processed,
        summary.changed,
        summary.failed
    );
    Ok(summary.exit_code(mode))
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            tracing::error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}
