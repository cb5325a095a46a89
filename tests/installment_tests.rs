// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cardcycle::calendar::YearMonth;
use cardcycle::models::{
    MAX_INSTALLMENTS, PaymentPlan, PurchaseMethod, Recurrence, Transaction, TransactionKind,
};
use cardcycle::projection::{installment_schedule, installment_total_for_month};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn ym(s: &str) -> YearMonth {
    s.parse().unwrap()
}

fn purchase(id: i64, amount: &str, count: u32, y: i32, m: u32, day: u32) -> Transaction {
    Transaction {
        id,
        kind: TransactionKind::Expense,
        description: format!("purchase {}", id),
        amount: dec(amount),
        category: None,
        card_id: Some(1),
        account_id: None,
        recurrence: Recurrence::OneOff,
        due_day: None,
        purchase_method: Some(PurchaseMethod::Credit),
        payment_plan: PaymentPlan::Installment,
        installment_count: Some(count),
        created_at: NaiveDate::from_ymd_opt(y, m, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap(),
    }
}

#[test]
fn twelve_installments_of_one_hundred() {
    let rows = vec![purchase(1, "1200", 12, 2024, 1, 15)];
    assert_eq!(installment_total_for_month(&rows, ym("2024-01")).unwrap(), dec("100"));
    assert_eq!(installment_total_for_month(&rows, ym("2024-07")).unwrap(), dec("100"));
    assert_eq!(installment_total_for_month(&rows, ym("2024-12")).unwrap(), dec("100"));
    assert_eq!(installment_total_for_month(&rows, ym("2025-01")).unwrap(), Decimal::ZERO);
    assert_eq!(installment_total_for_month(&rows, ym("2023-12")).unwrap(), Decimal::ZERO);
}

#[test]
fn schedule_wraps_into_next_year() {
    let rows = vec![purchase(1, "600", 6, 2024, 10, 31)];
    let schedule = installment_schedule(&rows[0]);
    let months: Vec<String> = schedule.iter().map(|i| i.month.to_string()).collect();
    assert_eq!(
        months,
        ["2024-10", "2024-11", "2024-12", "2025-01", "2025-02", "2025-03"]
    );
    assert_eq!(schedule[3].number, 4);
    assert_eq!(schedule[3].count, 6);
    assert_eq!(installment_total_for_month(&rows, ym("2025-03")).unwrap(), dec("100"));
    assert_eq!(installment_total_for_month(&rows, ym("2025-04")).unwrap(), Decimal::ZERO);
}

#[test]
fn overlapping_purchases_add_up() {
    let rows = vec![
        purchase(1, "1200", 12, 2024, 1, 15),
        purchase(2, "300", 3, 2024, 6, 1),
        purchase(3, "90", 2, 2024, 8, 20),
    ];
    assert_eq!(installment_total_for_month(&rows, ym("2024-06")).unwrap(), dec("200"));
    assert_eq!(installment_total_for_month(&rows, ym("2024-08")).unwrap(), dec("245"));
    assert_eq!(installment_total_for_month(&rows, ym("2024-09")).unwrap(), dec("145"));
}

#[test]
fn uneven_split_drifts_by_at_most_a_cent_per_installment() {
    let cases = [
        ("100", 3),
        ("1000", 7),
        ("99.99", 12),
        ("0.05", 2),
        ("1234.56", 11),
        ("10", 6),
    ];
    let cent = dec("0.01");
    for (amount, n) in cases {
        let t = purchase(1, amount, n, 2024, 2, 29);
        let schedule = installment_schedule(&t);
        assert_eq!(schedule.len(), n as usize);
        let sum: Decimal = schedule.iter().map(|i| i.amount).sum();
        let drift = (sum - t.amount).abs();
        assert!(
            drift <= cent * Decimal::from(n),
            "{} / {} drifted by {}",
            amount,
            n,
            drift
        );
    }

    let t = purchase(1, "100", 3, 2024, 1, 1);
    let sum: Decimal = installment_schedule(&t).iter().map(|i| i.amount).sum();
    assert_eq!(sum, dec("99.99"));
}

#[test]
fn non_installment_rows_are_ignored() {
    let mut lump = purchase(1, "500", 2, 2024, 5, 1);
    lump.payment_plan = PaymentPlan::LumpSum;
    lump.installment_count = None;

    let mut single = purchase(2, "500", 1, 2024, 5, 1);
    single.installment_count = Some(1);

    let mut income = purchase(3, "500", 2, 2024, 5, 1);
    income.kind = TransactionKind::Income;

    let rows = vec![lump, single, income];
    assert_eq!(installment_total_for_month(&rows, ym("2024-05")).unwrap(), Decimal::ZERO);
    assert!(installment_schedule(&rows[1]).is_empty());
}

#[test]
fn half_cent_splits_round_up() {
    let t = purchase(1, "0.05", 2, 2024, 3, 1);
    let amounts: Vec<Decimal> = installment_schedule(&t).iter().map(|i| i.amount).collect();
    assert_eq!(amounts, [dec("0.03"), dec("0.03")]);
}

#[test]
fn longest_plan_reaches_its_last_month() {
    let rows = vec![purchase(1, "6000", MAX_INSTALLMENTS, 2024, 1, 15)];
    let last = ym("2024-01").add_months(MAX_INSTALLMENTS as i32 - 1);
    assert_eq!(installment_total_for_month(&rows, last).unwrap(), dec("10"));
    assert_eq!(
        installment_total_for_month(&rows, last.succ()).unwrap(),
        Decimal::ZERO
    );
}

#[test]
fn out_of_range_stored_counts_are_ignored() {
    let rows = vec![
        purchase(1, "300000000000", 3_000_000_000, 2024, 1, 15),
        purchase(2, "1200", 12, 2024, 1, 15),
    ];
    assert!(installment_schedule(&rows[0]).is_empty());
    assert_eq!(installment_total_for_month(&rows, ym("2024-01")).unwrap(), dec("100"));
}
