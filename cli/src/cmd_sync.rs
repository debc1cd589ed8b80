// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgMatches, Command, arg};
use colored::Colorize;
use davsync_carddav::CardDavClient;
use davsync_core::{Config, HttpAssetFetcher, SqliteStore, SyncManager, VCardCodec};
use davsync_vcard::Contact;

#[derive(Debug, Clone, Copy)]
pub struct CmdSync {
    pub manual: bool,
}

impl CmdSync {
    pub const NAME: &str = "sync";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Synchronize local contacts with the address book")
            .arg(arg!(--manual "List the whole address book even if its change tag is unchanged"))
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            manual: matches.get_flag("manual"),
        }
    }

    /// Run one sync attempt and print its counters.
    pub async fn run(
        self,
        config: &Config,
        store: &SqliteStore<Contact>,
    ) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "synchronizing...");

        let client = CardDavClient::new(config.carddav.clone())?;
        let assets = HttpAssetFetcher::new(&config.carddav);
        let stats = SyncManager::new(store, &client, &VCardCodec, &assets)
            .with_options(config.sync_options(self.manual))
            .run()
            .await?;

        if stats.unchanged {
            println!("{} {}", "Up to date:".green(), "address book unchanged".italic());
        } else {
            println!("{} {stats}", "Synced:".green());
        }
        Ok(())
    }
}
