use std::path::Path;

use anyhow::{Context, Result};
use tiltsave_convert::TiltConverter;

pub(crate) fn run(path: &Path, compress: bool) -> Result<()> {
    let form = TiltConverter::convert_path(path, compress)
        .with_context(|| format!("converting {}", path.display()))?;
    println!("Converted {} to {form} format", path.display());
    Ok(())
}
