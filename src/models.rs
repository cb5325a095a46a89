// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, LedgerResult};

/// Largest amount, balance or credit limit the ledger accepts.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Longest installment plan accepted, in months.
pub const MAX_INSTALLMENTS: u32 = 600;

/// Rejects amounts outside `0..=MAX_AMOUNT`.
pub fn check_amount(what: &str, amount: Decimal) -> Result<(), LedgerError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(LedgerError::validation(format!("{} must not be negative", what)));
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::validation(format!(
            "{} {} exceeds the maximum of {}",
            what, amount, MAX_AMOUNT
        )));
    }
    Ok(())
}

/// Sums amounts, failing instead of panicking on overflow.
pub fn checked_total(amounts: impl IntoIterator<Item = Decimal>) -> LedgerResult<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, a| {
        acc.checked_add(a)
            .ok_or_else(|| LedgerError::Overflow(format!("{} + {}", acc, a)))
    })
}

/// Declares a lowercase text-backed enum stored as TEXT in SQLite.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = LedgerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(LedgerError::validation(format!(
                        "invalid {} '{}' (expected one of: {})",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    ))),
                }
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

text_enum!(TransactionKind {
    Expense => "expense",
    Income => "income",
});

text_enum!(Recurrence {
    OneOff => "one-off",
    Recurring => "recurring",
});

text_enum!(PurchaseMethod {
    Credit => "credit",
    Debit => "debit",
});

text_enum!(PaymentPlan {
    LumpSum => "lump-sum",
    Installment => "installment",
});

text_enum!(
    /// How a card settles purchases. Hybrid cards accept both credit and debit.
    PaymentMethod {
        Credit => "credit",
        Debit => "debit",
        Hybrid => "hybrid",
    }
);

impl PaymentMethod {
    pub fn accepts(&self, purchase: PurchaseMethod) -> bool {
        match self {
            PaymentMethod::Hybrid => true,
            PaymentMethod::Credit => purchase == PurchaseMethod::Credit,
            PaymentMethod::Debit => purchase == PurchaseMethod::Debit,
        }
    }

    /// Whether the card runs a statement cycle at all.
    pub fn has_statement(&self) -> bool {
        matches!(self, PaymentMethod::Credit | PaymentMethod::Hybrid)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: TransactionKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub name: String,
    pub account_id: i64,
    pub payment_method: PaymentMethod,
    pub due_day: Option<u32>,
    pub closing_offset_days: Option<u32>,
    pub credit_limit: Decimal,
}

impl Card {
    /// Returns `(due_day, closing_offset_days)` when the card has a statement cycle.
    pub fn cycle(&self) -> Option<(u32, u32)> {
        if !self.payment_method.has_statement() {
            return None;
        }
        match (self.due_day, self.closing_offset_days) {
            (Some(due), Some(offset)) => Some((due, offset)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub card_id: Option<i64>,
    pub account_id: Option<i64>,
    pub recurrence: Recurrence,
    pub due_day: Option<u32>,
    pub purchase_method: Option<PurchaseMethod>,
    pub payment_plan: PaymentPlan,
    pub installment_count: Option<u32>,
    pub created_at: NaiveDateTime,
}

impl Transaction {
    pub fn purchase_date(&self) -> NaiveDate {
        self.created_at.date()
    }
}

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub balance: Decimal,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub kind: TransactionKind,
}

#[derive(Debug, Clone)]
pub struct NewCard {
    pub name: String,
    pub account: String,
    pub payment_method: PaymentMethod,
    pub due_day: Option<u32>,
    pub closing_offset_days: Option<u32>,
    pub credit_limit: Decimal,
}

impl NewCard {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::validation("card name is required"));
        }
        check_amount("credit limit", self.credit_limit)?;
        match (self.due_day, self.closing_offset_days) {
            (None, None) => {}
            (Some(due), Some(offset)) => {
                if !(1..=31).contains(&due) {
                    return Err(LedgerError::validation(format!(
                        "due day {} is outside 1..=31",
                        due
                    )));
                }
                if offset > 31 {
                    return Err(LedgerError::validation(format!(
                        "closing offset {} is outside 0..=31",
                        offset
                    )));
                }
                if self.payment_method == PaymentMethod::Debit {
                    return Err(LedgerError::validation(
                        "debit cards do not have a statement cycle",
                    ));
                }
            }
            _ => {
                return Err(LedgerError::validation(
                    "due day and closing offset must be given together",
                ));
            }
        }
        Ok(())
    }
}

/// Ledger insert request. References are names; the store resolves them.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub description: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub card: Option<String>,
    pub account: Option<String>,
    pub recurrence: Recurrence,
    pub due_day: Option<u32>,
    pub purchase_method: Option<PurchaseMethod>,
    pub payment_plan: PaymentPlan,
    pub installment_count: Option<u32>,
    pub created_at: Option<NaiveDateTime>,
}

impl NewTransaction {
    pub fn expense(description: &str, amount: Decimal, card: &str) -> Self {
        Self {
            kind: TransactionKind::Expense,
            description: description.to_string(),
            amount,
            category: None,
            card: Some(card.to_string()),
            account: None,
            recurrence: Recurrence::OneOff,
            due_day: None,
            purchase_method: None,
            payment_plan: PaymentPlan::LumpSum,
            installment_count: None,
            created_at: None,
        }
    }

    pub fn income(description: &str, amount: Decimal, account: &str) -> Self {
        Self {
            kind: TransactionKind::Income,
            card: None,
            account: Some(account.to_string()),
            ..Self::expense(description, amount, "")
        }
    }

    pub fn recurring(mut self, due_day: u32) -> Self {
        self.recurrence = Recurrence::Recurring;
        self.due_day = Some(due_day);
        self
    }

    pub fn installments(mut self, count: u32) -> Self {
        self.payment_plan = PaymentPlan::Installment;
        self.installment_count = Some(count);
        self
    }

    pub fn purchase_method(mut self, method: PurchaseMethod) -> Self {
        self.purchase_method = Some(method);
        self
    }

    pub fn category(mut self, name: &str) -> Self {
        self.category = Some(name.to_string());
        self
    }

    pub fn at(mut self, created_at: NaiveDateTime) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Field-level checks that need no store access.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.description.trim().is_empty() {
            return Err(LedgerError::validation("description is required"));
        }
        check_amount("amount", self.amount)?;

        match self.kind {
            TransactionKind::Expense => {
                if self.card.as_deref().is_none_or(|c| c.trim().is_empty()) {
                    return Err(LedgerError::validation("expense requires a card"));
                }
                if self.account.is_some() {
                    return Err(LedgerError::validation(
                        "expense settles through its card, not an account",
                    ));
                }
            }
            TransactionKind::Income => {
                if self.account.as_deref().is_none_or(|a| a.trim().is_empty()) {
                    return Err(LedgerError::validation("income requires an account"));
                }
                if self.card.is_some() {
                    return Err(LedgerError::validation("income cannot reference a card"));
                }
                if self.purchase_method.is_some() {
                    return Err(LedgerError::validation(
                        "purchase method only applies to expenses",
                    ));
                }
                if self.payment_plan == PaymentPlan::Installment {
                    return Err(LedgerError::validation(
                        "installment plans only apply to expenses",
                    ));
                }
            }
        }

        match (self.recurrence, self.due_day) {
            (Recurrence::Recurring, Some(day)) if (1..=31).contains(&day) => {}
            (Recurrence::Recurring, Some(day)) => {
                return Err(LedgerError::validation(format!(
                    "due day {} is outside 1..=31",
                    day
                )));
            }
            (Recurrence::Recurring, None) => {
                return Err(LedgerError::validation(
                    "recurring transactions require a due day",
                ));
            }
            (Recurrence::OneOff, Some(_)) => {
                return Err(LedgerError::validation(
                    "due day only applies to recurring transactions",
                ));
            }
            (Recurrence::OneOff, None) => {}
        }

        match (self.payment_plan, self.installment_count) {
            (PaymentPlan::Installment, Some(n)) if (2..=MAX_INSTALLMENTS).contains(&n) => {}
            (PaymentPlan::Installment, _) => {
                return Err(LedgerError::validation(format!(
                    "installment plans require an installment count between 2 and {}",
                    MAX_INSTALLMENTS
                )));
            }
            (PaymentPlan::LumpSum, Some(_)) => {
                return Err(LedgerError::validation(
                    "installment count requires an installment plan",
                ));
            }
            (PaymentPlan::LumpSum, None) => {}
        }

        if self.purchase_method == Some(PurchaseMethod::Debit)
            && self.payment_plan == PaymentPlan::Installment
        {
            return Err(LedgerError::validation(
                "debit purchases must be paid as a lump sum",
            ));
        }
        Ok(())
    }
}
