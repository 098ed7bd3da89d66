use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tiltsave_convert::TiltConverter;
use tiltsave_core::{save_session, Cleanup, Selection, SessionName, Settings};

/// Reads one line from stdin after printing the prompt.
fn prompt_name() -> Result<String> {
    print!("Enter session name:");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("reading session name")?;
    Ok(line)
}

pub(crate) fn run(settings: &Settings, name: Option<SessionName>, sketch: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => SessionName::parse(&prompt_name()?)?,
    };
    let selection = sketch.map_or(Selection::First, Selection::Stem);
    tracing::info!(%name, ?selection, "saving session");

    let report = save_session(settings, &name, &TiltConverter, &selection)?;

    if let Cleanup::Failed(reason) = &report.cleanup {
        eprintln!(
            "Unable to remove {}: {reason}. Delete it manually.",
            settings.session_root.display()
        );
    }
    println!("Saved {name} to {}", report.archive_path.display());
    Ok(())
}
