// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf, process::ExitCode};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use davsync_core::{APP_NAME, Config, SqliteStore};
use davsync_vcard::Contact;
use futures::{FutureExt, future::BoxFuture};
use tokio::fs;
use tracing_subscriber::EnvFilter;

use crate::cmd_contact::{CmdAdd, CmdDelete, CmdList};
use crate::cmd_sync::CmdSync;
use crate::config::parse_config;

/// Run the davsync command-line interface.
///
/// Errors are printed to stderr and turn into a failing exit code.
pub async fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let result = match Cli::parse() {
        Ok(cli) => cli.run().await,
        Err(e) => Err(e),
    };
    report(result)
}

fn report(result: Result<(), Box<dyn Error>>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            ExitCode::FAILURE
        }
    }
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    #[must_use]
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Two-way contact synchronization with CardDAV address books.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $DAVSYNC_CONFIG, then \
$XDG_CONFIG_HOME/davsync/config.toml on Linux and MacOS, \
%APPDATA%/davsync/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .subcommand(CmdSync::command())
            .subcommand(CmdList::command())
            .subcommand(CmdAdd::command())
            .subcommand(CmdDelete::command())
    }

    /// Parse the command-line arguments
    ///
    /// # Errors
    ///
    /// Fails if the arguments are invalid.
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(&matches)
    }

    /// Parse the specified arguments
    ///
    /// # Errors
    ///
    /// Fails if the arguments are invalid.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(&matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    ///
    /// # Errors
    ///
    /// Fails on an unknown subcommand.
    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let command = match matches.subcommand() {
            Some((CmdSync::NAME, matches)) => Commands::Sync(CmdSync::from(matches)),
            Some((CmdList::NAME, matches)) => Commands::List(CmdList::from(matches)),
            Some((CmdAdd::NAME, matches)) => Commands::Add(CmdAdd::from(matches)?),
            Some((CmdDelete::NAME, matches)) => Commands::Delete(CmdDelete::from(matches)?),
            Some((name, _)) => return Err(format!("Unknown command: {name}").into()),
            None => return Err("No command given".into()),
        };

        let config = matches.get_one("config").cloned();
        Ok(Cli { config, command })
    }

    /// Run the command
    ///
    /// # Errors
    ///
    /// Fails if loading the configuration, opening the store or the command fails.
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Synchronize with the address book
    Sync(CmdSync),

    /// List local contacts
    List(CmdList),

    /// Add a local contact
    Add(CmdAdd),

    /// Delete a local contact
    Delete(CmdDelete),
}

impl Commands {
    /// Run the command with the given configuration
    ///
    /// # Errors
    ///
    /// Fails if loading the configuration, opening the store or the command fails.
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        match self {
            Commands::Sync(a)   => Self::run_with(config, |c, s| a.run(c, s).boxed()).await,
            Commands::List(a)   => Self::run_with(config, |c, s| a.run(c, s).boxed()).await,
            Commands::Add(a)    => Self::run_with(config, |c, s| a.run(c, s).boxed()).await,
            Commands::Delete(a) => Self::run_with(config, |c, s| a.run(c, s).boxed()).await,
        }
    }

    async fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(
            &'a Config,
            &'a SqliteStore<Contact>,
        ) -> BoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration...");
        let config = parse_config(config).await?;
        let store = open_store(&config).await?;

        f(&config, &store).await?;

        store.close().await;
        Ok(())
    }
}

async fn open_store(config: &Config) -> Result<SqliteStore<Contact>, Box<dyn Error>> {
    let Some(path) = config.database_path() else {
        tracing::warn!("no state directory available, contacts are kept in memory only");
        return Ok(SqliteStore::open(None).await?);
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| format!("Failed to create state directory {}: {e}", dir.display()))?;
    }
    Ok(SqliteStore::open(Some(&path)).await?)
}
