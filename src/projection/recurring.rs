// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::calendar::YearMonth;
use crate::error::LedgerResult;
use crate::models::TransactionKind;
use crate::store;

/// Monthly total of recurring rows of `kind` as seen from `as_of`.
///
/// Each recurring row stands for one full-amount occurrence per month, no
/// matter when it was recorded. With `exclude_current_month`, rows created
/// in `as_of` are skipped since their first occurrence is already in the
/// account balance.
pub fn recurring_total(
    conn: &Connection,
    kind: TransactionKind,
    as_of: YearMonth,
    exclude_current_month: bool,
) -> LedgerResult<Decimal> {
    let exclude = exclude_current_month.then_some(as_of);
    let total = store::recurring_amount(conn, kind, exclude)?;
    tracing::debug!(%kind, month = %as_of, exclude_current_month, %total, "recurring total");
    Ok(total)
}
