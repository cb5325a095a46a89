// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Billing-cycle and balance-projection engine.
//!
//! Every entry point takes "today" explicitly; nothing here reads the clock.

pub mod cycle;
pub mod forecast;
pub mod installments;
pub mod recurring;
pub mod statement;

pub use cycle::{StatementWindow, current_statement_window};
pub use forecast::{
    AvailableBalance, MAX_FORECAST_MONTHS, MonthProjection, available_this_month, forecast,
};
pub use installments::{
    Installment, installment_schedule, installment_total_for_month, installment_total_in_store,
};
pub use recurring::recurring_total;
pub use statement::{CardStatement, open_statement_total, open_statements};
