mod cli;
mod commands;
mod config;
mod format;
mod logging;
mod testutil;
mod tool;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use format::BlackFormatter;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns whether every file passed.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Command::Check { files, black } => {
            let (_, config) = config::resolve_config(cli.config.as_deref())?;
            let formatter = BlackFormatter::from_config(&black.apply(config.black));
            let result = commands::cmd_check(&formatter, &files)?;
            output(&result, cli.json, commands::format_check_human)?;
            Ok(!result.has_failures())
        }
        Command::Fix {
            files,
            no_warnings,
            black,
        } => {
            let (_, config) = config::resolve_config(cli.config.as_deref())?;
            let formatter = BlackFormatter::from_config(&black.apply(config.black));
            let result = commands::cmd_fix(&formatter, &files, !no_warnings)?;
            output(&result, cli.json, commands::format_fix_human)?;
            Ok(result.failures.is_empty())
        }
        Command::Config { show_path } => {
            let (path, config) = config::resolve_config(cli.config.as_deref())?;
            if show_path {
                println!("{}", path.display());
                return Ok(true);
            }
            let result = commands::cmd_config(&path, config);
            output(&result, cli.json, commands::format_config_human)?;
            Ok(true)
        }
    }
}

fn output<T: serde::Serialize>(result: &T, json: bool, human_fn: fn(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        let text = human_fn(result);
        if !text.is_empty() {
            println!("{}", text);
        }
    }
    Ok(())
}
