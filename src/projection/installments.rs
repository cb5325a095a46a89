// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::calendar::YearMonth;
use crate::error::LedgerResult;
use crate::models::{MAX_INSTALLMENTS, PaymentPlan, Transaction, TransactionKind, checked_total};
use crate::store;

#[derive(Debug, Clone, Serialize)]
pub struct Installment {
    pub transaction_id: i64,
    pub description: String,
    /// 1-based position, e.g. 3 of 12.
    pub number: u32,
    pub count: u32,
    pub month: YearMonth,
    pub amount: Decimal,
}

/// Plan length of `t`; rows with a count outside `2..=MAX_INSTALLMENTS` are ignored.
fn installment_count(t: &Transaction) -> Option<u32> {
    if t.kind != TransactionKind::Expense || t.payment_plan != PaymentPlan::Installment {
        return None;
    }
    t.installment_count
        .filter(|n| (2..=MAX_INSTALLMENTS).contains(n))
}

/// Even split rounded to cents, half a cent rounding up. The remainder is not
/// folded into the last installment, so the schedule may drift from `amount`
/// by under a cent per installment.
fn per_installment(amount: Decimal, count: u32) -> Decimal {
    (amount / Decimal::from(count))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Full schedule of a purchase; empty for non-installment rows.
pub fn installment_schedule(t: &Transaction) -> Vec<Installment> {
    let Some(count) = installment_count(t) else {
        return Vec::new();
    };
    let first = YearMonth::of(t.purchase_date());
    let amount = per_installment(t.amount, count);
    (0..count)
        .map(|k| Installment {
            transaction_id: t.id,
            description: t.description.clone(),
            number: k + 1,
            count,
            month: first.add_months(k as i32),
            amount,
        })
        .collect()
}

/// The installment of `t` falling in `target`, if any.
pub fn installment_in_month(t: &Transaction, target: YearMonth) -> Option<Installment> {
    let count = installment_count(t)?;
    let k = YearMonth::of(t.purchase_date()).months_until(target);
    let k = u32::try_from(k).ok().filter(|k| *k < count)?;
    Some(Installment {
        transaction_id: t.id,
        description: t.description.clone(),
        number: k + 1,
        count,
        month: target,
        amount: per_installment(t.amount, count),
    })
}

/// Sum of installments due in `target` across `transactions`.
pub fn installment_total_for_month(
    transactions: &[Transaction],
    target: YearMonth,
) -> LedgerResult<Decimal> {
    checked_total(
        transactions
            .iter()
            .filter_map(|t| installment_in_month(t, target))
            .map(|i| i.amount),
    )
}

/// Loads the installment purchases from the store and totals `target`.
pub fn installment_total_in_store(conn: &Connection, target: YearMonth) -> LedgerResult<Decimal> {
    let rows = store::installment_transactions(conn)?;
    let total = installment_total_for_month(&rows, target)?;
    tracing::debug!(month = %target, purchases = rows.len(), %total, "installment total");
    Ok(total)
}
