// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::utils::{arg, get_currency, get_forecast_months, pretty_table, set_setting};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = arg(sub, "key")?;
            let value = arg(sub, "value")?;
            let value = if key == "currency" {
                value.to_uppercase()
            } else {
                value.to_string()
            };
            set_setting(conn, key, &value)?;
            println!("{} set to {}", key, value);
        }
        Some(("show", _)) | None => {
            let rows = vec![
                vec!["database".into(), db::db_path()?.display().to_string()],
                vec!["currency".into(), get_currency(conn)?],
                vec![
                    "forecast_months".into(),
                    get_forecast_months(conn)?.to_string(),
                ],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
