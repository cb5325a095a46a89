// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use super::installments::installment_total_for_month;
use super::recurring::recurring_total;
use super::statement::open_statement_total;
use crate::calendar::YearMonth;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{TransactionKind, checked_total};
use crate::store;

/// Terms of the current month's available balance.
#[derive(Debug, Clone, Serialize)]
pub struct AvailableBalance {
    pub month: YearMonth,
    pub account_balances: Decimal,
    pub recurring_income: Decimal,
    pub recurring_expense: Decimal,
    pub open_statements: Decimal,
    pub available: Decimal,
}

/// Longest forecast horizon, in months.
pub const MAX_FORECAST_MONTHS: usize = 1200;

#[derive(Debug, Clone, Serialize)]
pub struct MonthProjection {
    pub month: YearMonth,
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_balance: Decimal,
}

/// Account balances plus pending recurring flows, minus open card statements.
#[tracing::instrument(level = "debug", skip(conn))]
pub fn available_this_month(conn: &Connection, today: NaiveDate) -> LedgerResult<AvailableBalance> {
    let month = YearMonth::of(today);
    let account_balances = store::total_account_balance(conn)?;
    let recurring_income = recurring_total(conn, TransactionKind::Income, month, true)?;
    let recurring_expense = recurring_total(conn, TransactionKind::Expense, month, true)?;
    let open_statements = open_statement_total(conn, today)?;
    let available = checked_total([
        account_balances,
        recurring_income,
        -recurring_expense,
        -open_statements,
    ])?;
    tracing::debug!(%account_balances, %recurring_income, %recurring_expense, %open_statements, %available);
    Ok(AvailableBalance {
        month,
        account_balances,
        recurring_income,
        recurring_expense,
        open_statements,
        available,
    })
}

/// One standalone row per month after `today`'s month; nothing carries over
/// from one row to the next.
#[tracing::instrument(level = "debug", skip(conn))]
pub fn forecast(
    conn: &Connection,
    today: NaiveDate,
    months_ahead: usize,
) -> LedgerResult<Vec<MonthProjection>> {
    if months_ahead > MAX_FORECAST_MONTHS {
        return Err(LedgerError::validation(format!(
            "forecast horizon {} exceeds {} months",
            months_ahead, MAX_FORECAST_MONTHS
        )));
    }
    let installments = store::installment_transactions(conn)?;
    let start = YearMonth::of(today);
    let mut rows = Vec::with_capacity(months_ahead);
    for step in 1..=months_ahead as i32 {
        let month = start.add_months(step);
        let total_income = recurring_total(conn, TransactionKind::Income, month, false)?;
        let total_expense = checked_total([
            recurring_total(conn, TransactionKind::Expense, month, false)?,
            installment_total_for_month(&installments, month)?,
        ])?;
        let row = MonthProjection {
            month,
            total_income,
            total_expense,
            net_balance: checked_total([total_income, -total_expense])?,
        };
        tracing::debug!(month = %row.month, income = %row.total_income, expense = %row.total_expense, net = %row.net_balance, "forecast row");
        rows.push(row);
    }
    Ok(rows)
}
