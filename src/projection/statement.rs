// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use super::cycle::{StatementWindow, current_statement_window};
use crate::error::LedgerResult;
use crate::models::{Card, checked_total};
use crate::store;

#[derive(Debug, Clone, Serialize)]
pub struct CardStatement {
    pub card: String,
    pub credit_limit: Decimal,
    /// `None` when the card's due day does not exist in one of the months involved.
    pub window: Option<StatementWindow>,
    pub total: Decimal,
    pub issue: Option<String>,
}

impl CardStatement {
    pub fn over_limit(&self) -> bool {
        self.credit_limit > Decimal::ZERO && self.total > self.credit_limit
    }
}

fn card_statement(conn: &Connection, card: &Card, today: NaiveDate) -> LedgerResult<CardStatement> {
    let mut statement = CardStatement {
        card: card.name.clone(),
        credit_limit: card.credit_limit,
        window: None,
        total: Decimal::ZERO,
        issue: None,
    };
    let Some((due_day, offset)) = card.cycle() else {
        return Ok(statement);
    };
    match current_statement_window(today, due_day, offset) {
        Ok(window) => {
            statement.total = store::card_expense_total(conn, card.id, window.start, window.end)?;
            tracing::debug!(
                card = %card.name,
                start = %window.start,
                end = %window.end,
                total = %statement.total,
                "open statement"
            );
            statement.window = Some(window);
        }
        Err(err) => {
            tracing::warn!(card = %card.name, %err, "card skipped: invalid cycle for this month");
            statement.issue = Some(err.to_string());
        }
    }
    Ok(statement)
}

/// Open statement detail for every credit or hybrid card with a configured cycle.
pub fn open_statements(conn: &Connection, today: NaiveDate) -> LedgerResult<Vec<CardStatement>> {
    store::cards_with_cycle(conn)?
        .iter()
        .map(|card| card_statement(conn, card, today))
        .collect()
}

/// Sum of all currently open statements. Misconfigured cards contribute nothing.
pub fn open_statement_total(conn: &Connection, today: NaiveDate) -> LedgerResult<Decimal> {
    checked_total(open_statements(conn, today)?.iter().map(|s| s.total))
}
