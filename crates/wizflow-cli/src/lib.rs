//! Wizflow CLI - drive workspaces from the command line
//!
//! Subcommands:
//! - `inspect <workspace>`: scenarios, nodes and how each `tplFile` resolves
//! - `run <workspace> --scenario <id> [--answers <json>]`: scripted walk
//! - `interpolate <workspace> <template> [--set path=value]...`
//!
//! The library half exists so the commands can be tested without spawning
//! the binary.

#![warn(unreachable_pub)]

mod commands;
mod logging;

pub use commands::{inspect, interpolate, run, RunOptions};
pub use logging::init_tracing;

use anyhow::Context as _;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use wizflow_flow::EngineConfig;

/// Build the argument parser
#[must_use]
pub fn command() -> Command {
    let workspace_arg = Arg::new("workspace")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Workspace file (.json, .yaml or .yml)");

    Command::new("wizflow")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Low-code wizard engine")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Engine configuration (.toml or .yaml)"),
        )
        .arg(
            Arg::new("log")
                .long("log")
                .global(true)
                .help("Log filter directive, overrides RUST_LOG and the config file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("inspect")
                .about("Show scenarios, nodes and template resolution")
                .arg(workspace_arg.clone())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the normalized workspace as JSON"),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Walk a scenario with scripted answers")
                .arg(workspace_arg.clone())
                .arg(
                    Arg::new("scenario")
                        .long("scenario")
                        .short('s')
                        .required(true)
                        .help("Scenario id"),
                )
                .arg(
                    Arg::new("answers")
                        .long("answers")
                        .help("Answers keyed by node id: inline JSON or a JSON file path"),
                )
                .arg(
                    Arg::new("llm-prefix")
                        .long("llm-prefix")
                        .default_value("[llm] ")
                        .help("Prefix of the echoed completion for unanswered llmQuery nodes"),
                ),
        )
        .subcommand(
            Command::new("interpolate")
                .about("Render a template against a workspace context")
                .arg(workspace_arg)
                .arg(Arg::new("template").required(true).help("Template text"))
                .arg(
                    Arg::new("set")
                        .long("set")
                        .action(ArgAction::Append)
                        .help("Context override as path=value (JSON when it parses)"),
                ),
        )
}

/// Load configuration and apply command-line overrides
///
/// # Errors
/// Returns error if the configuration file cannot be loaded.
pub fn load_config(matches: &ArgMatches) -> anyhow::Result<EngineConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(filter) = matches.get_one::<String>("log") {
        config.log.filter.clone_from(filter);
    }
    if matches.get_flag("log-json") {
        config.log.json = true;
    }
    Ok(config)
}

/// Run the selected subcommand and return its output
///
/// # Errors
/// Returns error if the workspace cannot be loaded or the command fails.
pub async fn execute(matches: &ArgMatches, config: &EngineConfig) -> anyhow::Result<String> {
    match matches.subcommand() {
        Some(("inspect", args)) => {
            let path = required_path(args)?;
            inspect(path, config, args.get_flag("json"))
        }
        Some(("run", args)) => {
            let path = required_path(args)?;
            let options = RunOptions {
                scenario: args
                    .get_one::<String>("scenario")
                    .cloned()
                    .context("--scenario is required")?,
                answers: args.get_one::<String>("answers").cloned(),
                llm_prefix: args
                    .get_one::<String>("llm-prefix")
                    .cloned()
                    .unwrap_or_default(),
            };
            run(path, config, &options).await
        }
        Some(("interpolate", args)) => {
            let path = required_path(args)?;
            let template = args
                .get_one::<String>("template")
                .context("template is required")?;
            let overrides: Vec<String> = args
                .get_many::<String>("set")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            interpolate(path, template, &overrides)
        }
        Some((other, _)) => anyhow::bail!("unknown subcommand '{other}'"),
        None => anyhow::bail!("no subcommand given"),
    }
}

fn required_path(args: &ArgMatches) -> anyhow::Result<&PathBuf> {
    args.get_one::<PathBuf>("workspace")
        .context("workspace path is required")
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
