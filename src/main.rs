//! CLI entry point and command handlers for calcforge.

mod cli;
mod cmd;

use anyhow::Result;
use clap::Parser;

use cli::{overrides, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let out = cli.output();
    let config_flag = cli.config.as_deref();

    match &cli.command {
        Commands::Run {
            no_generate,
            no_check,
            generate,
            check,
        } => {
            let config = cmd::load_config(config_flag, &overrides(Some(generate), Some(check)))?;
            if !no_generate {
                cmd::generate::cmd_generate(&config, generate.dry_run, &out)?;
            }
            if !no_check {
                cmd::check::cmd_check(&config, &check.tools, &out)?;
            }
            Ok(())
        }
        Commands::Generate(args) => {
            let config = cmd::load_config(config_flag, &overrides(Some(args), None))?;
            cmd::generate::cmd_generate(&config, args.dry_run, &out)?;
            Ok(())
        }
        Commands::Check(args) => {
            let config = cmd::load_config(config_flag, &overrides(None, Some(args)))?;
            cmd::check::cmd_check(&config, &args.tools, &out)?;
            Ok(())
        }
        Commands::Init { force } => cmd::init::cmd_init(&cmd::config_path(config_flag), *force, &out),
        Commands::Version { verbose } => cmd::util::cmd_version(*verbose),
        Commands::Completion { shell } => cmd::util::cmd_completion(*shell),
        Commands::Man { out_dir } => cmd::util::cmd_man(out_dir.as_deref()).map(|_| ()),
    }
}
