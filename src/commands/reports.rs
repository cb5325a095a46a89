// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::YearMonth;
use crate::models::TransactionKind;
use crate::projection::{
    available_this_month, forecast, installment_schedule, installment_total_for_month,
    recurring_total,
};
use crate::store;
use crate::utils::{
    arg, fmt_money, get_currency, get_forecast_months, maybe_print_json, opt_arg, parse_month,
    pretty_table, today_arg,
};
use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("available", sub)) => available(conn, sub)?,
        Some(("forecast", sub)) => forecast_report(conn, sub)?,
        Some(("recurring", sub)) => recurring(conn, sub)?,
        Some(("installments", sub)) => installments(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_arg(sub: &clap::ArgMatches) -> Result<YearMonth> {
    match opt_arg(sub, "month") {
        Some(s) => parse_month(s),
        None => Ok(YearMonth::of(today_arg(sub)?)),
    }
}

fn available(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_arg(sub)?;
    let report = available_this_month(conn, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let data = vec![
        vec![
            "Account balances".into(),
            fmt_money(&report.account_balances, &ccy),
        ],
        vec![
            "+ Recurring income".into(),
            fmt_money(&report.recurring_income, &ccy),
        ],
        vec![
            "- Recurring expenses".into(),
            fmt_money(&report.recurring_expense, &ccy),
        ],
        vec![
            "- Open card statements".into(),
            fmt_money(&report.open_statements, &ccy),
        ],
        vec![
            format!("Available in {}", report.month),
            fmt_money(&report.available, &ccy),
        ],
    ];
    println!("{}", pretty_table(&["", "Amount"], data));
    Ok(())
}

fn forecast_report(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_arg(sub)?;
    let months = match sub.get_one::<u32>("months") {
        Some(n) => *n as usize,
        None => get_forecast_months(conn)?,
    };
    let rows = forecast(conn, today, months)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &rows)? {
        return Ok(());
    }
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.month.to_string(),
                format!("{:.2}", r.total_income),
                format!("{:.2}", r.total_expense),
                format!("{:.2}", r.net_balance),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Net"], data)
    );
    Ok(())
}

#[derive(Serialize)]
struct RecurringReport {
    kind: TransactionKind,
    month: YearMonth,
    exclude_current_month: bool,
    total: rust_decimal::Decimal,
}

fn recurring(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let kind: TransactionKind = arg(sub, "kind")?.parse()?;
    let month = month_arg(sub)?;
    let exclude = sub.get_flag("exclude-current");
    let report = RecurringReport {
        kind,
        month,
        exclude_current_month: exclude,
        total: recurring_total(conn, kind, month, exclude)?,
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        let ccy = get_currency(conn)?;
        println!(
            "{}",
            pretty_table(
                &["Kind", "Month", "Recurring Total"],
                vec![vec![
                    kind.to_string(),
                    month.to_string(),
                    fmt_money(&report.total, &ccy)
                ]],
            )
        );
    }
    Ok(())
}

fn installments(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_arg(sub)?;
    let purchases = store::installment_transactions(conn)?;
    let due: Vec<_> = purchases
        .iter()
        .flat_map(installment_schedule)
        .filter(|i| i.month == month)
        .collect();
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &due)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let total = installment_total_for_month(&purchases, month)?;
    let mut data: Vec<Vec<String>> = due
        .iter()
        .map(|i| {
            vec![
                i.transaction_id.to_string(),
                i.description.clone(),
                format!("{}/{}", i.number, i.count),
                format!("{:.2}", i.amount),
            ]
        })
        .collect();
    data.push(vec![
        String::new(),
        format!("Total for {}", month),
        String::new(),
        fmt_money(&total, &ccy),
    ]);
    println!(
        "{}",
        pretty_table(&["ID", "Purchase", "Installment", "Amount"], data)
    );
    Ok(())
}
