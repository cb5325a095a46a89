// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cardcycle::models::{NewAccount, NewCard, NewCategory, NewTransaction, PaymentMethod, TransactionKind};
use cardcycle::{cli, commands::exporter, db, store};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    store::add_account(
        &conn,
        &NewAccount {
            name: "Checking".into(),
            balance: Decimal::ZERO,
        },
    )
    .unwrap();
    store::add_card(
        &conn,
        &NewCard {
            name: "Visa".into(),
            account: "Checking".into(),
            payment_method: PaymentMethod::Credit,
            due_day: Some(10),
            closing_offset_days: Some(5),
            credit_limit: Decimal::ZERO,
        },
    )
    .unwrap();
    conn
}

#[test]
fn export_transactions_json_includes_all_fields() {
    let mut conn = base_conn();
    store::add_category(
        &conn,
        &NewCategory {
            name: "Groceries".into(),
            kind: TransactionKind::Expense,
        },
    )
    .unwrap();
    store::insert_transaction(
        &mut conn,
        &NewTransaction::expense("Corner Shop", "12.34".parse().unwrap(), "Visa")
            .category("Groceries")
            .installments(2)
            .at(NaiveDate::from_ymd_opt(2025, 1, 2)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap()),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "cardcycle",
        "export",
        "transactions",
        "--format",
        "json",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": "1",
                "created_at": "2025-01-02 09:30:00",
                "kind": "expense",
                "description": "Corner Shop",
                "amount": "12.34",
                "card": "Visa",
                "account": null,
                "category": "Groceries",
                "recurrence": "one-off",
                "due_day": null,
                "purchase_method": "credit",
                "installments": "2"
            }
        ])
    );
}

#[test]
fn export_transactions_csv_writes_header() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "cardcycle",
        "export",
        "transactions",
        "--out",
        &out_str,
    ]);
    let (_, export_m) = matches.subcommand().unwrap();
    exporter::handle(&conn, export_m).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert_eq!(
        contents.trim_end(),
        "id,created_at,kind,description,amount,card,account,category,recurrence,due_day,purchase_method,installments"
    );
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "cardcycle",
        "export",
        "transactions",
        "--format",
        "xml",
        "--out",
        &out_str,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        assert!(exporter::handle(&conn, export_m).is_err());
    } else {
        panic!("no export subcommand");
    }
    assert!(!out_path.exists());
}
