//! CLI argument definitions for calcforge.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use calcforge::config::Overrides;
use calcforge::output::{Output, OutputMode};

#[derive(Parser)]
#[command(name = "calcforge")]
#[command(version)]
#[command(about = "Calculator component generator and site diagnostics", long_about = None)]
#[command(
    after_help = "GETTING STARTED:\n    calcforge init             Write .calcforge/config.md with the defaults\n    calcforge generate         Build components from content/calculators\n    calcforge check            Run the enabled tools and write the report"
)]
pub struct Cli {
    /// Config file (defaults to .calcforge/config.md)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Emit one JSON event per line
    #[arg(long, global = true, conflicts_with = "quiet")]
    pub json: bool,

    /// Suppress all non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn output(&self) -> Output {
        let mode = if self.json {
            OutputMode::Json
        } else if self.quiet {
            OutputMode::Quiet
        } else {
            OutputMode::Human
        };
        Output::new(mode)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate components, then run diagnostics
    Run {
        /// Skip component generation
        #[arg(long)]
        no_generate: bool,
        /// Skip diagnostics
        #[arg(long)]
        no_check: bool,
        #[command(flatten)]
        generate: GenerateArgs,
        #[command(flatten)]
        check: CheckArgs,
    },
    /// Generate calculator components from spec documents
    Generate(GenerateArgs),
    /// Run analysis tools and write the diagnostics report
    Check(CheckArgs),
    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Show version information
    Version {
        /// Show build details
        #[arg(short, long)]
        verbose: bool,
    },
    /// Generate shell completion script
    Completion {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Generate man page
    Man {
        /// Output directory for the man page
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Directory holding spec documents
    #[arg(long, value_name = "DIR")]
    pub specs_dir: Option<PathBuf>,
    /// Directory components are written to
    #[arg(long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
    /// Number of specs processed at once
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<usize>,
    /// Report what would be generated without writing
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Run only this tool (can be specified multiple times)
    #[arg(long = "tool", value_name = "NAME")]
    pub tools: Vec<String>,
    /// Directory the reports are written to
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,
    /// Length of the top-offender rankings
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,
}

/// Config overrides from whichever argument groups a command has.
pub fn overrides(generate: Option<&GenerateArgs>, check: Option<&CheckArgs>) -> Overrides {
    let mut overrides = Overrides::default();
    if let Some(args) = generate {
        overrides.specs_dir = args.specs_dir.clone();
        overrides.out_dir = args.out_dir.clone();
        overrides.jobs = args.jobs;
    }
    if let Some(args) = check {
        overrides.report_dir = args.report_dir.clone();
        overrides.top = args.top;
    }
    overrides
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_accepts_both_groups() {
        let cli = Cli::try_parse_from([
            "calcforge",
            "run",
            "--no-check",
            "--jobs",
            "2",
            "--tool",
            "lint",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Run {
                no_generate,
                no_check,
                generate,
                check,
            } => {
                assert!(!no_generate);
                assert!(no_check);
                assert_eq!(generate.jobs, Some(2));
                assert_eq!(check.tools, vec!["lint"]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_completion_shell() {
        let cli = Cli::try_parse_from(["calcforge", "completion", "zsh"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Completion { shell: Shell::Zsh }
        ));
    }

    #[test]
    fn test_json_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["calcforge", "--json", "--quiet", "check"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let generate = GenerateArgs {
            out_dir: Some(PathBuf::from("out")),
            ..GenerateArgs::default()
        };
        let check = CheckArgs {
            top: Some(3),
            ..CheckArgs::default()
        };
        let overrides = overrides(Some(&generate), Some(&check));
        assert_eq!(overrides.out_dir, Some(PathBuf::from("out")));
        assert_eq!(overrides.top, Some(3));
        assert!(overrides.specs_dir.is_none());
    }
}
