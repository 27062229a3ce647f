//! Initialize calcforge in a project directory

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use calcforge::config::Config;
use calcforge::output::Output;

/// Write the default config to `path`.
pub fn cmd_init(path: &Path, force: bool, out: &Output) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        );
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let config = Config::default();
    fs::write(path, config.to_markdown()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    out.success(&format!("Wrote {}", path.display()));
    out.detail(&format!(
        "Specs are read from {}",
        config.generation.specs_dir.display()
    ));
    out.detail(&format!(
        "Components are written to {}",
        config.generation.out_dir.display()
    ));
    Ok(())
}
