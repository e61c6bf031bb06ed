//! # doolally CLI entry point
//!
//! Parses command-line arguments, resolves configuration, installs logging
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

use doolally_cli::config::{CliConfig, LogFormat};
use doolally_cli::input::load_document;
use doolally_cli::list::run_list;
use doolally_cli::schema::run_schema;
use doolally_cli::validate::run_validate;
use doolally_schemas::Catalog;

/// Validate service payloads against the doolally schema catalog.
#[derive(Parser, Debug)]
#[command(name = "doolally", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List catalog schemas.
    List,

    /// Print the JSON-Schema document for a catalog schema.
    Schema {
        /// Schema name, e.g. KVElementReq.
        name: String,

        /// Print on a single line.
        #[arg(long)]
        compact: bool,
    },

    /// Validate a JSON or YAML document against a catalog schema.
    Validate {
        /// Schema name, e.g. InsertKVValuesReq.
        name: String,

        /// Document to validate; JSON is read from stdin when omitted.
        path: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(1);
        }
    };
    if let Err(e) = doolally_cli::init_tracing(&config) {
        eprintln!("error: {e}");
        return ExitCode::from(1);
    }

    tracing::debug!(?config, "doolally starting");

    match run(cli.command, &config) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Config file, then environment, then flags.
fn resolve_config(cli: &Cli) -> anyhow::Result<CliConfig> {
    let config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let config = config.with_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config.with_flags(cli.verbose, cli.log_format))
}

fn run(command: Commands, config: &CliConfig) -> anyhow::Result<u8> {
    let catalog = Catalog::new().context("failed to build schema catalog")?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::List => run_list(&catalog, &mut stdout),
        Commands::Schema { name, compact } => {
            run_schema(&catalog, &name, config.output.pretty && !compact, &mut stdout)
        }
        Commands::Validate { name, path } => {
            let document = load_document(path.as_deref())?;
            run_validate(&catalog, &name, &document, &mut stdout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_list() {
        let cli = Cli::try_parse_from(["doolally", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
        assert!(cli.log_format.is_none());
    }

    #[test]
    fn cli_parse_schema() {
        let cli = Cli::try_parse_from(["doolally", "schema", "KVElementReq", "--compact"]).unwrap();
        if let Commands::Schema { name, compact } = cli.command {
            assert_eq!(name, "KVElementReq");
            assert!(compact);
        } else {
            panic!("expected schema command");
        }
    }

    #[test]
    fn cli_parse_validate_with_path() {
        let cli =
            Cli::try_parse_from(["doolally", "validate", "InsertKVValuesReq", "doc.yaml"]).unwrap();
        if let Commands::Validate { name, path } = cli.command {
            assert_eq!(name, "InsertKVValuesReq");
            assert_eq!(path, Some(PathBuf::from("doc.yaml")));
        } else {
            panic!("expected validate command");
        }
    }

    #[test]
    fn cli_parse_validate_from_stdin() {
        let cli = Cli::try_parse_from(["doolally", "validate", "SessionResp"]).unwrap();
        assert!(matches!(cli.command, Commands::Validate { path: None, .. }));
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "doolally",
            "list",
            "-vv",
            "--log-format",
            "json",
            "--config",
            "doolally.yaml",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.config, Some(PathBuf::from("doolally.yaml")));
    }

    #[test]
    fn cli_parse_rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["doolally", "--log-format", "xml", "list"]).is_err());
    }

    #[test]
    fn cli_parse_validate_requires_name() {
        assert!(Cli::try_parse_from(["doolally", "validate"]).is_err());
    }

    #[test]
    fn config_file_and_flags_combine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doolally.yaml");
        std::fs::write(&path, "output:\n  pretty: false\n").unwrap();
        let cli = Cli::try_parse_from([
            "doolally",
            "-v",
            "--config",
            path.to_str().unwrap(),
            "list",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert!(!config.output.pretty);
        assert_eq!(config.log.level, "info");
    }
}
