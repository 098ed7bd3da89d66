use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tiltsave_core::{SessionName, Settings};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tiltsave")]
#[command(about = "Rename, convert and archive a Tilt Brush sketch session", long_about = None)]
struct Cli {
    /// Tilt Brush documents folder [env: TILTSAVE_SESSION_ROOT]
    #[arg(long, global = true)]
    session_root: Option<PathBuf>,
    /// Folder receiving archived sessions [env: TILTSAVE_ARCHIVE_ROOT]
    #[arg(long, global = true)]
    archive_root: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Name the unsaved sketch, convert it and archive the whole session
    Save {
        /// New session name; prompted for when omitted
        #[arg(short, long)]
        name: Option<SessionName>,
        /// Stem of the sketch to save, e.g. Untitled_2 (default: the first one)
        #[arg(short, long)]
        sketch: Option<String>,
    },
    /// List unsaved sketches and their assets as JSON
    List,
    /// Convert a .tilt sketch between file and directory form
    Convert {
        path: PathBuf,
        /// Deflate archive members when packing
        #[arg(short, long)]
        compress: bool,
    },
}

fn settings(cli: &Cli) -> Settings {
    let mut settings = Settings::from_env();
    if let Some(root) = &cli.session_root {
        settings = settings.with_session_root(root);
    }
    if let Some(root) = &cli.archive_root {
        settings = settings.with_archive_root(root);
    }
    settings
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = settings(&cli);

    match cli.command {
        Commands::Save { name, sketch } => commands::save::run(&settings, name, sketch),
        Commands::List => commands::list::run(&settings),
        Commands::Convert { path, compress } => commands::convert::run(&path, compress),
    }
}
