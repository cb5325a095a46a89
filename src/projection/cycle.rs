// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::calendar::{CalendarError, YearMonth};

/// Date range of the statement that will close next, inclusive on both ends.
///
/// `start` is the previous closing date (a closing day opens the new cycle)
/// and `end` is the day before the upcoming closing date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatementWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub closing: NaiveDate,
    pub due: NaiveDate,
}

impl StatementWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn previous_closing(&self) -> NaiveDate {
        self.start
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

fn closing_for(due: NaiveDate, closing_offset_days: u32) -> Result<NaiveDate, CalendarError> {
    due.checked_sub_days(Days::new(closing_offset_days as u64))
        .ok_or(CalendarError::Overflow(due))
}

/// Open statement window for a card with the given cycle configuration.
///
/// The upcoming statement is due on `due_day` of the month after `today`;
/// the previous one was due on `due_day` of `today`'s month. Each closes
/// `closing_offset_days` before its due date. A `due_day` missing from
/// either month is an error rather than being clamped.
pub fn current_statement_window(
    today: NaiveDate,
    due_day: u32,
    closing_offset_days: u32,
) -> Result<StatementWindow, CalendarError> {
    let this_month = YearMonth::of(today);

    let previous_due = this_month.day(due_day)?;
    let due = this_month.succ().day(due_day)?;

    let previous_closing = closing_for(previous_due, closing_offset_days)?;
    let closing = closing_for(due, closing_offset_days)?;
    let end = closing.pred_opt().ok_or(CalendarError::Overflow(closing))?;

    Ok(StatementWindow {
        start: previous_closing,
        end,
        closing,
        due,
    })
}
