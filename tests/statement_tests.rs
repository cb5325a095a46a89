// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cardcycle::db;
use cardcycle::error::LedgerError;
use cardcycle::models::{NewAccount, NewCard, NewTransaction, PaymentMethod, PurchaseMethod};
use cardcycle::projection::{open_statement_total, open_statements};
use cardcycle::store;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn at(y: i32, m: u32, day: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(12, 30, 0).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn card(name: &str, method: PaymentMethod, cycle: Option<(u32, u32)>) -> NewCard {
    NewCard {
        name: name.into(),
        account: "Checking".into(),
        payment_method: method,
        due_day: cycle.map(|c| c.0),
        closing_offset_days: cycle.map(|c| c.1),
        credit_limit: dec("1000"),
    }
}

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    store::add_account(
        &conn,
        &NewAccount {
            name: "Checking".into(),
            balance: dec("5000"),
        },
    )
    .unwrap();
    store::add_card(&conn, &card("Visa", PaymentMethod::Credit, Some((10, 5)))).unwrap();
    conn
}

fn spend(conn: &mut Connection, card: &str, amount: &str, when: NaiveDateTime) {
    store::insert_transaction(
        conn,
        &NewTransaction::expense("purchase", dec(amount), card).at(when),
    )
    .unwrap();
}

#[test]
fn purchase_after_closing_is_in_open_statement() {
    let mut conn = setup();
    spend(&mut conn, "Visa", "300", at(2024, 6, 6));
    spend(&mut conn, "Visa", "150", at(2024, 6, 4));

    let total = open_statement_total(&conn, d(2024, 6, 15)).unwrap();
    assert_eq!(total, dec("300"));
}

#[test]
fn closing_day_purchase_moves_to_next_cycle() {
    let mut conn = setup();
    spend(&mut conn, "Visa", "40", at(2024, 6, 5));
    spend(&mut conn, "Visa", "70", at(2024, 7, 4));
    spend(&mut conn, "Visa", "25", at(2024, 7, 5));

    assert_eq!(open_statement_total(&conn, d(2024, 6, 15)).unwrap(), dec("110"));
    assert_eq!(open_statement_total(&conn, d(2024, 7, 15)).unwrap(), dec("25"));
}

#[test]
fn cards_without_cycle_contribute_nothing() {
    let mut conn = setup();
    store::add_card(&conn, &card("Plain", PaymentMethod::Credit, None)).unwrap();
    store::add_card(&conn, &card("Debit", PaymentMethod::Debit, None)).unwrap();
    spend(&mut conn, "Plain", "80", at(2024, 6, 10));
    spend(&mut conn, "Debit", "20", at(2024, 6, 10));
    spend(&mut conn, "Visa", "10", at(2024, 6, 10));

    let statements = open_statements(&conn, d(2024, 6, 15)).unwrap();
    assert_eq!(statements.len(), 1);
    assert_eq!(statements[0].card, "Visa");
    assert_eq!(open_statement_total(&conn, d(2024, 6, 15)).unwrap(), dec("10"));
}

#[test]
fn hybrid_card_counts_only_credit_purchases() {
    let mut conn = setup();
    store::add_card(&conn, &card("Combo", PaymentMethod::Hybrid, Some((20, 7)))).unwrap();
    store::insert_transaction(
        &mut conn,
        &NewTransaction::expense("groceries", dec("45.50"), "Combo")
            .purchase_method(PurchaseMethod::Credit)
            .at(at(2024, 6, 14)),
    )
    .unwrap();
    store::insert_transaction(
        &mut conn,
        &NewTransaction::expense("coffee", dec("4.50"), "Combo")
            .purchase_method(PurchaseMethod::Debit)
            .at(at(2024, 6, 14)),
    )
    .unwrap();

    // Combo window for 2024-06: [06-13, 07-12]
    let statements = open_statements(&conn, d(2024, 6, 15)).unwrap();
    let combo = statements.iter().find(|s| s.card == "Combo").unwrap();
    assert_eq!(combo.window.unwrap().start, d(2024, 6, 13));
    assert_eq!(combo.total, dec("45.50"));
}

#[test]
fn totals_accumulate_across_cards() {
    let mut conn = setup();
    store::add_card(&conn, &card("Master", PaymentMethod::Credit, Some((1, 10)))).unwrap();
    spend(&mut conn, "Visa", "100", at(2024, 6, 20));
    // Master window for 2024-06: [05-22, 06-20]
    spend(&mut conn, "Master", "60", at(2024, 5, 25));
    spend(&mut conn, "Master", "999", at(2024, 6, 21));

    assert_eq!(open_statement_total(&conn, d(2024, 6, 15)).unwrap(), dec("160"));
}

#[test]
fn due_day_missing_this_month_skips_the_card() {
    let mut conn = setup();
    store::add_card(&conn, &card("Late", PaymentMethod::Credit, Some((31, 3)))).unwrap();
    spend(&mut conn, "Late", "500", at(2024, 4, 10));
    spend(&mut conn, "Visa", "30", at(2024, 4, 10));

    let statements = open_statements(&conn, d(2024, 4, 12)).unwrap();
    let late = statements.iter().find(|s| s.card == "Late").unwrap();
    assert!(late.window.is_none());
    assert!(late.issue.as_deref().unwrap().contains("31"));
    assert_eq!(late.total, Decimal::ZERO);
    assert_eq!(open_statement_total(&conn, d(2024, 4, 12)).unwrap(), dec("30"));
}

#[test]
fn over_limit_is_flagged() {
    let mut conn = setup();
    spend(&mut conn, "Visa", "1000.01", at(2024, 6, 10));
    let statements = open_statements(&conn, d(2024, 6, 15)).unwrap();
    assert!(statements[0].over_limit());
}

#[test]
fn oversized_stored_amounts_fail_instead_of_panicking() {
    let conn = setup();
    for _ in 0..2 {
        conn.execute(
            "INSERT INTO transactions(kind, description, amount, card_id, purchase_method, created_at)
             VALUES ('expense', 'imported', '70000000000000000000000000000', 1, 'credit', '2024-06-06 10:00:00')",
            [],
        )
        .unwrap();
    }
    let err = open_statement_total(&conn, d(2024, 6, 15)).unwrap_err();
    assert!(matches!(err, LedgerError::Overflow(_)), "{:?}", err);
}
