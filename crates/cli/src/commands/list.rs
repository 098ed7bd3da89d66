use anyhow::{Context, Result};
use tiltsave_core::{list_sessions, Settings};

pub(crate) fn run(settings: &Settings) -> Result<()> {
    let sessions = list_sessions(&settings.layout(), &settings.sketch_prefix).with_context(|| {
        format!("listing sessions in {}", settings.session_root.display())
    })?;
    println!("{}", serde_json::to_string_pretty(&sessions)?);
    Ok(())
}
