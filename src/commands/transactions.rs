// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{NewTransaction, PaymentPlan, PurchaseMethod, Recurrence, TransactionKind};
use crate::store;
use crate::utils::{
    arg, maybe_print_json, opt_arg, parse_datetime, parse_decimal, parse_month, pretty_table,
};
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let raw = arg(sub, "id")?;
            let id = raw
                .parse::<i64>()
                .with_context(|| format!("Invalid id '{}'", raw))?;
            let removed = store::delete_transaction(conn, id)?;
            println!(
                "Removed {} #{} '{}' ({})",
                removed.kind, removed.id, removed.description, removed.amount
            );
        }
        _ => {}
    }
    Ok(())
}

fn parse_count(sub: &clap::ArgMatches, id: &str) -> Result<Option<u32>> {
    opt_arg(sub, id)
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("Invalid --{} '{}'", id, s))
        })
        .transpose()
}

/// Builds the typed insert request from command-line arguments.
pub fn new_transaction(sub: &clap::ArgMatches) -> Result<NewTransaction> {
    let kind: TransactionKind = arg(sub, "kind")?.parse()?;
    let installment_count = parse_count(sub, "installments")?;
    let created_at = match opt_arg(sub, "date") {
        Some(s) => parse_datetime(s)?,
        None => chrono::Local::now().naive_local(),
    };
    Ok(NewTransaction {
        kind,
        description: arg(sub, "description")?.to_string(),
        amount: parse_decimal(arg(sub, "amount")?)?,
        category: opt_arg(sub, "category").map(str::to_string),
        card: opt_arg(sub, "card").map(str::to_string),
        account: opt_arg(sub, "account").map(str::to_string),
        recurrence: if sub.get_flag("recurring") {
            Recurrence::Recurring
        } else {
            Recurrence::OneOff
        },
        due_day: parse_count(sub, "due-day")?,
        purchase_method: opt_arg(sub, "method")
            .map(str::parse::<PurchaseMethod>)
            .transpose()?,
        payment_plan: if installment_count.is_some() {
            PaymentPlan::Installment
        } else {
            PaymentPlan::LumpSum
        },
        installment_count,
        created_at: Some(created_at),
    })
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let new = new_transaction(sub)?;
    let id = store::insert_transaction(conn, &new)?;
    let target = new.card.as_deref().or(new.account.as_deref()).unwrap_or("");
    match new.installment_count {
        Some(n) => println!(
            "Recorded {} #{} {} in {} installments on '{}' ({})",
            new.kind, id, new.amount, n, target, new.description
        ),
        None => println!(
            "Recorded {} #{} {} on '{}' ({})",
            new.kind, id, new.amount, target, new.description
        ),
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.created_at.clone(),
                    r.kind.clone(),
                    r.description.clone(),
                    r.amount.clone(),
                    r.source.clone(),
                    r.category.clone(),
                    r.plan.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &[
                    "ID",
                    "Created",
                    "Kind",
                    "Description",
                    "Amount",
                    "Card/Account",
                    "Category",
                    "Plan"
                ],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub created_at: String,
    pub kind: String,
    pub description: String,
    pub amount: String,
    pub source: String,
    pub category: String,
    pub plan: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let mut sql = String::from(
        "SELECT t.id, t.created_at, t.kind, t.description, t.amount,
                COALESCE(k.name, a.name), c.name, t.recurrence, t.due_day,
                t.purchase_method, t.payment_plan, t.installment_count
         FROM transactions t
         LEFT JOIN cards k ON t.card_id=k.id
         LEFT JOIN accounts a ON t.account_id=a.id
         LEFT JOIN categories c ON t.category_id=c.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = opt_arg(sub, "month") {
        sql.push_str(" AND substr(t.created_at,1,7)=?");
        params_vec.push(parse_month(month)?.to_string());
    }
    if let Some(kind) = opt_arg(sub, "kind") {
        sql.push_str(" AND t.kind=?");
        params_vec.push(kind.parse::<TransactionKind>()?.to_string());
    }
    if let Some(card) = opt_arg(sub, "card") {
        sql.push_str(" AND k.name=?");
        params_vec.push(card.into());
    }
    if let Some(cat) = opt_arg(sub, "category") {
        sql.push_str(" AND c.name=?");
        params_vec.push(cat.into());
    }
    sql.push_str(" ORDER BY t.created_at DESC, t.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let recurrence: Recurrence = r.get(7)?;
        let due_day: Option<u32> = r.get(8)?;
        let method: Option<PurchaseMethod> = r.get(9)?;
        let plan: PaymentPlan = r.get(10)?;
        let count: Option<u32> = r.get(11)?;

        let mut plan_desc = match (plan, count) {
            (PaymentPlan::Installment, Some(n)) => format!("{}x", n),
            _ => plan.to_string(),
        };
        if let Some(m) = method {
            plan_desc = format!("{} {}", m, plan_desc);
        }
        if recurrence == Recurrence::Recurring {
            plan_desc.push_str(&format!(", monthly on day {}", due_day.unwrap_or_default()));
        }

        data.push(TransactionRow {
            id: r.get(0)?,
            created_at: r.get(1)?,
            kind: r.get(2)?,
            description: r.get(3)?,
            amount: r.get(4)?,
            source: r.get::<_, Option<String>>(5)?.unwrap_or_default(),
            category: r.get::<_, Option<String>>(6)?.unwrap_or_default(),
            plan: plan_desc,
        });
    }
    Ok(data)
}
