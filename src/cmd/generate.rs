//! `calcforge generate`

use anyhow::{Context, Result};

use calcforge::config::Config;
use calcforge::generate::{GenerateSettings, GenerationSummary, Generator};
use calcforge::output::Output;

pub fn cmd_generate(config: &Config, dry_run: bool, out: &Output) -> Result<GenerationSummary> {
    let settings = GenerateSettings::from_config(&config.generation, dry_run)?;
    let summary = Generator::new(settings, out)
        .run()
        .context("Generation failed")?;

    match &summary.manifest {
        Some(path) => out.info(&format!("Manifest written to {}", path.display())),
        None => out.info("Dry run: nothing was written"),
    }
    Ok(summary)
}
