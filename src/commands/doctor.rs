// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::YearMonth;
use crate::models::PaymentMethod;
use crate::projection::{current_statement_window, open_statements};
use crate::store;
use crate::utils::{pretty_table, today_arg};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let rows = diagnose(conn, today_arg(m)?)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Returns `[issue, detail]` rows for cards and ledger entries that the
/// projections will ignore or miscount.
pub fn diagnose(conn: &Connection, today: NaiveDate) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Card cycle configuration
    for card in store::list_cards(conn)? {
        match (card.due_day, card.closing_offset_days) {
            (Some(_), None) | (None, Some(_)) => rows.push(vec![
                "card_cycle_incomplete".into(),
                format!("{}: due day and closing offset must both be set", card.name),
            ]),
            (Some(_), Some(_)) if card.payment_method == PaymentMethod::Debit => {
                rows.push(vec![
                    "debit_card_with_cycle".into(),
                    format!("{}: cycle fields are ignored for debit cards", card.name),
                ])
            }
            (None, None) if card.payment_method.has_statement() => rows.push(vec![
                "card_without_cycle".into(),
                format!("{}: no open statement is tracked", card.name),
            ]),
            _ => {}
        }

        // 2) Due days that do not exist in every month
        if let Some((due, offset)) = card.cycle() {
            let start = YearMonth::of(today);
            let failing: Vec<String> = (0..12)
                .map(|k| start.add_months(k))
                .filter(|m| current_statement_window(m.first_day(), due, offset).is_err())
                .map(|m| m.to_string())
                .collect();
            if !failing.is_empty() {
                rows.push(vec![
                    "due_day_out_of_month".into(),
                    format!(
                        "{}: due day {} skips the open statement in {}",
                        card.name,
                        due,
                        failing.join(", ")
                    ),
                ]);
            }
        }
    }

    // 3) Open statements above the credit limit
    for statement in open_statements(conn, today)? {
        if statement.over_limit() {
            rows.push(vec![
                "over_credit_limit".into(),
                format!(
                    "{}: {:.2} open against a limit of {:.2}",
                    statement.card, statement.total, statement.credit_limit
                ),
            ]);
        }
    }

    // 4) Ledger entries whose card or account is gone
    let mut stmt = conn.prepare(
        "SELECT id, kind, description FROM transactions
         WHERE (kind='expense' AND card_id IS NULL) OR (kind='income' AND account_id IS NULL)
         ORDER BY id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let kind: String = r.get(1)?;
        let description: String = r.get(2)?;
        rows.push(vec![
            "orphan_transaction".into(),
            format!("#{} {} '{}' lost its card or account", id, kind, description),
        ]);
    }

    Ok(rows)
}
