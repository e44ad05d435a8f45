// SPDX-FileCopyrightText: 2026 PRR Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PRR - a small telecommunications network registry.
//!
//! This is the binary entry point: configuration, logging, and subcommand
//! dispatch.

mod display;
mod shell;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use prr_config::PrrConfig;
use prr_core::PrrError;
use prr_core::types::rounded;
use prr_network::{Network, import_file};

/// PRR - clients, terminals, and the communications between them.
#[derive(Parser, Debug)]
#[command(name = "prr", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch the interactive command shell.
    Shell {
        /// Import this network file before the first prompt.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Import a network file and print its records.
    Import {
        file: PathBuf,
        /// Print a JSON summary instead of records.
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML.
    Config,
}

/// Structured output for `import --json`.
#[derive(Debug, Serialize)]
struct ImportSummary {
    clients: Vec<String>,
    terminals: Vec<String>,
    paid: i64,
    debt: i64,
}

impl ImportSummary {
    fn of(network: &Network) -> Self {
        let balance = network.global_balance();
        Self {
            clients: network
                .clients()
                .filter_map(|c| network.client_record(c.key().as_str()).ok())
                .collect(),
            terminals: network.terminals().map(ToString::to_string).collect(),
            paid: rounded(balance.paid),
            debt: rounded(balance.debt),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => prr_config::load_and_validate_path(path),
        None => prr_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            prr_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.log.level);

    let result = match cli.command {
        Some(Commands::Shell { file }) => shell::run_shell(&config, file.as_deref()),
        Some(Commands::Import { file, json }) => run_import(&config, &file, json),
        Some(Commands::Config) => print_config(&config),
        None => {
            println!("prr: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("prr: {}", display::describe(&e));
        std::process::exit(1);
    }
}

fn run_import(config: &PrrConfig, file: &Path, json: bool) -> Result<(), PrrError> {
    let network = import_file(file, config)?;
    let summary = ImportSummary::of(&network);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        for line in summary.clients.iter().chain(&summary.terminals) {
            println!("{line}");
        }
    }
    Ok(())
}

fn print_config(config: &PrrConfig) -> Result<(), PrrError> {
    let rendered = toml::to_string_pretty(config).map_err(|e| PrrError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let level = log_level.to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "prr={level},prr_network={level},prr_config={level},prr_tariff={level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = prr_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["prr", "import", "net.txt", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Import { json: true, .. })
        ));

        let cli = Cli::try_parse_from(["prr", "--config", "x.toml", "shell"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Some(Commands::Shell { file: None })));
    }

    #[test]
    fn import_summary_serializes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CLIENT|c1|Ana|1\nBASIC|t1|c1|OFF").unwrap();
        let network = import_file(file.path(), &PrrConfig::default()).unwrap();

        let summary = ImportSummary::of(&network);
        assert_eq!(summary.terminals, vec!["t1|c1|OFF|0|0"]);
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"clients\":[\"CLIENT|c1|Ana|1|NORMAL|YES|1|0|0\"]"));
        assert!(json.contains("\"debt\":0"));
    }

    #[test]
    fn effective_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&PrrConfig::default()).unwrap();
        assert!(rendered.contains("[tariff.gold]"));
        assert!(rendered.contains("delivery = \"queued\""));
    }
}
