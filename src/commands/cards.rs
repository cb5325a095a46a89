// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{NewCard, PaymentMethod, checked_total};
use crate::projection::open_statements;
use crate::store;
use crate::utils::{
    arg, fmt_money, get_currency, maybe_print_json, opt_arg, parse_decimal, pretty_table,
    today_arg,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = arg(sub, "name")?;
            store::delete_card(conn, name)?;
            println!("Removed card '{}'", name);
        }
        Some(("statement", sub)) => statement(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_day(sub: &clap::ArgMatches, id: &str) -> Result<Option<u32>> {
    opt_arg(sub, id)
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("Invalid --{} '{}'", id, s))
        })
        .transpose()
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let new = NewCard {
        name: arg(sub, "name")?.to_string(),
        account: arg(sub, "account")?.to_string(),
        payment_method: arg(sub, "method")?.parse::<PaymentMethod>()?,
        due_day: parse_day(sub, "due-day")?,
        closing_offset_days: parse_day(sub, "closing-offset")?,
        credit_limit: parse_decimal(arg(sub, "limit")?)?,
    };
    store::add_card(conn, &new)?;
    match (new.due_day, new.closing_offset_days) {
        (Some(due), Some(offset)) => println!(
            "Added {} card '{}' on '{}' (due day {}, closes {} days before)",
            new.payment_method, new.name, new.account, due, offset
        ),
        _ => println!(
            "Added {} card '{}' on '{}'",
            new.payment_method, new.name, new.account
        ),
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cards = store::list_cards(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cards)? {
        return Ok(());
    }
    let accounts = store::list_accounts(conn)?;
    let data = cards
        .iter()
        .map(|c| {
            let account = accounts
                .iter()
                .find(|a| a.id == c.account_id)
                .map(|a| a.name.clone())
                .unwrap_or_default();
            vec![
                c.name.clone(),
                account,
                c.payment_method.to_string(),
                c.due_day.map(|d| d.to_string()).unwrap_or_default(),
                c.closing_offset_days
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                format!("{:.2}", c.credit_limit),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Card", "Account", "Method", "Due Day", "Closing Offset", "Limit"],
            data
        )
    );
    Ok(())
}

fn statement(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_arg(sub)?;
    let statements = open_statements(conn, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &statements)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let total = checked_total(statements.iter().map(|s| s.total))?;
    let mut data = Vec::new();
    for s in &statements {
        let (window, closes, due) = match &s.window {
            Some(w) => (
                format!("{} .. {}", w.start, w.end),
                w.closing.to_string(),
                w.due.to_string(),
            ),
            None => (
                s.issue.clone().unwrap_or_default(),
                String::new(),
                String::new(),
            ),
        };
        let flag = if s.over_limit() { " (over limit)" } else { "" };
        data.push(vec![
            s.card.clone(),
            window,
            closes,
            due,
            format!("{}{}", fmt_money(&s.total, &ccy), flag),
        ]);
    }
    data.push(vec![
        "TOTAL".into(),
        String::new(),
        String::new(),
        String::new(),
        fmt_money(&total, &ccy),
    ]);
    println!(
        "{}",
        pretty_table(&["Card", "Open Window", "Closes", "Due", "Total"], data)
    );
    Ok(())
}
