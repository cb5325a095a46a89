// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{NewCategory, TransactionKind};
use crate::store;
use crate::utils::{arg, maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let kind: TransactionKind = arg(sub, "kind")?.parse()?;
            store::add_category(
                conn,
                &NewCategory {
                    name: name.to_string(),
                    kind,
                },
            )?;
            println!("Added {} category '{}'", kind, name);
        }
        Some(("list", sub)) => {
            let categories = store::list_categories(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &categories)? {
                let data = categories
                    .into_iter()
                    .map(|c| vec![c.name, c.kind.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Kind"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            store::delete_category(conn, name)?;
            println!("Removed category '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
