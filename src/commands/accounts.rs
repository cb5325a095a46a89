// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::NewAccount;
use crate::store;
use crate::utils::{arg, get_currency, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = arg(sub, "name")?;
            let balance = parse_decimal(arg(sub, "balance")?)?;
            store::add_account(
                conn,
                &NewAccount {
                    name: name.to_string(),
                    balance,
                },
            )?;
            println!("Added account '{}' (balance {})", name, balance);
        }
        Some(("list", sub)) => {
            let accounts = store::list_accounts(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
                let ccy = get_currency(conn)?;
                let data = accounts
                    .iter()
                    .map(|a| vec![a.name.clone(), format!("{:.2}", a.balance), ccy.clone()])
                    .collect();
                println!("{}", pretty_table(&["Name", "Balance", "CCY"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            store::delete_account(conn, name)?;
            println!("Removed account '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
