// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;

use colored::Colorize;
use davsync_core::LocalRecord;
use davsync_vcard::Contact;

const UNNAMED: &str = "(unnamed)";

/// Renders local contacts as a table of id, sync state, name and file name.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactFormatter;

impl ContactFormatter {
    pub fn format(self, records: &[LocalRecord<Contact>]) -> String {
        let rows: Vec<(String, String, String)> = records
            .iter()
            .map(|r| {
                let name = r.payload.display_name().unwrap_or_default();
                let file_name = r.file_name.as_deref().unwrap_or("").to_string();
                (format!("#{}", r.id), name, file_name)
            })
            .collect();

        let id_width = rows.iter().map(|(id, ..)| id.len()).max().unwrap_or(0);
        let name_width = rows
            .iter()
            .map(|(_, name, _)| name.chars().count())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for (record, (id, name, file_name)) in records.iter().zip(rows) {
            let padding = name_width - name.chars().count();
            let file_name = if file_name.is_empty() {
                UNNAMED.to_string()
            } else {
                file_name
            };
            let _ = writeln!(
                out,
                "{id:>id_width$} {} {name}{} {}",
                Self::state(record),
                " ".repeat(padding),
                file_name.dimmed(),
            );
        }
        out
    }

    fn state(record: &LocalRecord<Contact>) -> String {
        if record.deleted {
            "deleted".red().to_string()
        } else if record.etag.is_none() {
            "new    ".green().to_string()
        } else if record.dirty {
            "changed".yellow().to_string()
        } else {
            "synced ".normal().to_string()
        }
    }
}
