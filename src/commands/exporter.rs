// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::arg;
use anyhow::{Result, anyhow};
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(conn, sub),
        _ => Ok(()),
    }
}

const HEADER: [&str; 12] = [
    "id",
    "created_at",
    "kind",
    "description",
    "amount",
    "card",
    "account",
    "category",
    "recurrence",
    "due_day",
    "purchase_method",
    "installments",
];

fn export_transactions(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = arg(sub, "format")?.to_lowercase();
    let out = arg(sub, "out")?;

    let mut stmt = conn.prepare(
        "SELECT t.id, t.created_at, t.kind, t.description, t.amount, k.name, a.name, c.name,
                t.recurrence, t.due_day, t.purchase_method, t.installment_count
         FROM transactions t
         LEFT JOIN cards k ON t.card_id=k.id
         LEFT JOIN accounts a ON t.account_id=a.id
         LEFT JOIN categories c ON t.category_id=c.id
         ORDER BY t.created_at, t.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok([
            r.get::<_, i64>(0)?.to_string(),
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, Option<String>>(5)?.unwrap_or_default(),
            r.get::<_, Option<String>>(6)?.unwrap_or_default(),
            r.get::<_, Option<String>>(7)?.unwrap_or_default(),
            r.get::<_, String>(8)?,
            r.get::<_, Option<i64>>(9)?
                .map(|d| d.to_string())
                .unwrap_or_default(),
            r.get::<_, Option<String>>(10)?.unwrap_or_default(),
            r.get::<_, Option<i64>>(11)?
                .map(|n| n.to_string())
                .unwrap_or_default(),
        ])
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(HEADER)?;
            for row in rows {
                wtr.write_record(row?)?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let row = row?;
                let obj: serde_json::Map<String, serde_json::Value> = HEADER
                    .iter()
                    .zip(row)
                    .map(|(k, v)| {
                        let v = if v.is_empty() { json!(null) } else { json!(v) };
                        (k.to_string(), v)
                    })
                    .collect();
                items.push(serde_json::Value::Object(obj));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
