// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

use clap::{ArgAction, ArgMatches, Command, arg};
use colored::Colorize;
use davsync_core::{Config, LocalStore, SqliteStore};
use davsync_vcard::{Contact, TypedValue};

use crate::contact_formatter::ContactFormatter;

#[derive(Debug, Clone, Copy)]
pub struct CmdList;

impl CmdList {
    pub const NAME: &str = "list";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("ls")
            .about("List local contacts with their sync state")
    }

    pub fn from(_matches: &ArgMatches) -> Self {
        Self
    }

    pub async fn run(
        self,
        _config: &Config,
        store: &SqliteStore<Contact>,
    ) -> Result<(), Box<dyn Error>> {
        tracing::debug!("listing contacts...");
        let records = store.list_all().await?;
        if records.is_empty() {
            println!("{}", "No contacts".italic());
        } else {
            print!("{}", ContactFormatter.format(&records));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdAdd {
    pub name: String,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

impl CmdAdd {
    pub const NAME: &str = "add";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("Add a contact, uploaded on the next sync")
            .arg(arg!(<NAME> "Formatted name of the contact"))
            .arg(arg!(-e --email <EMAIL> "Email address").action(ArgAction::Append))
            .arg(arg!(-p --phone <PHONE> "Phone number").action(ArgAction::Append))
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let name = matches
            .get_one::<String>("NAME")
            .ok_or("Name is required")?
            .clone();
        if name.trim().is_empty() {
            return Err("Name must not be empty".into());
        }

        let values = |id: &str| -> Vec<String> {
            matches
                .get_many::<String>(id)
                .map(|v| v.cloned().collect())
                .unwrap_or_default()
        };
        Ok(Self {
            name,
            emails: values("email"),
            phones: values("phone"),
        })
    }

    pub async fn run(
        self,
        _config: &Config,
        store: &SqliteStore<Contact>,
    ) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "adding contact...");
        let contact = Contact {
            emails: self.emails.into_iter().map(TypedValue::new).collect(),
            phones: self.phones.into_iter().map(TypedValue::new).collect(),
            ..Contact::with_name(self.name)
        };

        let id = store.create(&contact).await?;
        println!("{} contact #{id}", "Added".green());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CmdDelete {
    pub file_name: String,
}

impl CmdDelete {
    pub const NAME: &str = "delete";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("rm")
            .about("Delete a contact, removed from the server on the next sync")
            .arg(arg!(<FILE_NAME> "File name of the contact, as shown by `list`"))
    }

    pub fn from(matches: &ArgMatches) -> Result<Self, Box<dyn Error>> {
        let file_name = matches
            .get_one::<String>("FILE_NAME")
            .ok_or("File name is required")?
            .clone();
        Ok(Self { file_name })
    }

    pub async fn run(
        self,
        _config: &Config,
        store: &SqliteStore<Contact>,
    ) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "deleting contact...");
        let record = store
            .find_by_file_name(&self.file_name)
            .await?
            .ok_or_else(|| format!("No contact named {}", self.file_name))?;

        store.mark_deleted(record.id).await?;
        println!("{} {}", "Deleted".red(), self.file_name);
        Ok(())
    }
}
