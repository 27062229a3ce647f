//! Utility commands: version, man page and shell completions.

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::cli::Cli;

/// Show version information
pub fn cmd_version(verbose: bool) -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("calcforge {}", VERSION);

    if verbose {
        const GIT_SHA: &str = env!("GIT_SHA");
        const BUILD_DATE: &str = env!("BUILD_DATE");
        println!("commit: {}", GIT_SHA);
        println!("built: {}", BUILD_DATE);
    }

    Ok(())
}

/// Write `calcforge.1` into `out_dir` (the current directory by default).
pub fn cmd_man(out_dir: Option<&Path>) -> Result<PathBuf> {
    let man = clap_mangen::Man::new(Cli::command());
    let mut buffer = Vec::new();
    man.render(&mut buffer)
        .context("Failed to render man page")?;

    let output_dir = out_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let man_path = output_dir.join("calcforge.1");
    fs::write(&man_path, buffer)
        .with_context(|| format!("Failed to write {}", man_path.display()))?;

    println!("Man page written to: {}", man_path.display());
    Ok(man_path)
}

/// Print a completion script for `shell` to stdout.
pub fn cmd_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "calcforge", &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_man_page_is_written() {
        let tmp = TempDir::new().unwrap();
        let path = cmd_man(Some(&tmp.path().join("man"))).unwrap();
        let page = fs::read_to_string(path).unwrap();
        assert!(page.contains("calcforge"));
    }
}
