// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! SQLite-backed ledger store.
//!
//! Reads feed the projection engine; writes keep account balances in step
//! with the ledger. Inserting or deleting a transaction and adjusting the
//! linked balance always happen inside one SQLite transaction.

use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ToSql, params};
use rust_decimal::Decimal;

use crate::calendar::YearMonth;
use crate::error::{LedgerError, LedgerResult, unique_conflict};
use crate::models::{
    Account, Card, Category, NewAccount, NewCard, NewCategory, NewTransaction, PaymentMethod,
    PaymentPlan, PurchaseMethod, Transaction, TransactionKind, check_amount, checked_total,
};

const TRANSACTION_COLUMNS: &str = "t.id, t.kind, t.description, t.amount, c.name, t.card_id, \
     t.account_id, t.recurrence, t.due_day, t.purchase_method, t.payment_plan, \
     t.installment_count, t.created_at";

pub(crate) fn get_decimal(r: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.trim().parse::<Decimal>().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            Box::new(LedgerError::InvalidAmount(s)),
        )
    })
}

fn sum_amounts(conn: &Connection, sql: &str, args: &[&dyn ToSql]) -> LedgerResult<Decimal> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(args, |r| get_decimal(r, 0))?;
    let amounts = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    checked_total(amounts)
}

fn account_from_row(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        balance: get_decimal(r, 2)?,
    })
}

fn card_from_row(r: &Row<'_>) -> rusqlite::Result<Card> {
    Ok(Card {
        id: r.get(0)?,
        name: r.get(1)?,
        account_id: r.get(2)?,
        payment_method: r.get(3)?,
        due_day: r.get(4)?,
        closing_offset_days: r.get(5)?,
        credit_limit: get_decimal(r, 6)?,
    })
}

fn transaction_from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        kind: r.get(1)?,
        description: r.get(2)?,
        amount: get_decimal(r, 3)?,
        category: r.get(4)?,
        card_id: r.get(5)?,
        account_id: r.get(6)?,
        recurrence: r.get(7)?,
        due_day: r.get(8)?,
        purchase_method: r.get(9)?,
        payment_plan: r.get(10)?,
        installment_count: r.get(11)?,
        created_at: r.get(12)?,
    })
}

// ── Accounts ─────────────────────────────────────────────────────

pub fn add_account(conn: &Connection, new: &NewAccount) -> LedgerResult<i64> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("account name is required"));
    }
    check_amount("opening balance", new.balance.abs())?;
    conn.execute(
        "INSERT INTO accounts(name, balance) VALUES (?1, ?2)",
        params![name, new.balance.to_string()],
    )
    .map_err(|e| unique_conflict(e, "Account", name))?;
    Ok(conn.last_insert_rowid())
}

pub fn account_by_name(conn: &Connection, name: &str) -> LedgerResult<Account> {
    conn.query_row(
        "SELECT id, name, balance FROM accounts WHERE name=?1",
        params![name.trim()],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Account", name.trim()))
}

pub fn account_by_id(conn: &Connection, id: i64) -> LedgerResult<Account> {
    conn.query_row(
        "SELECT id, name, balance FROM accounts WHERE id=?1",
        params![id],
        account_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Account", id))
}

pub fn list_accounts(conn: &Connection) -> LedgerResult<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT id, name, balance FROM accounts ORDER BY name")?;
    let rows = stmt.query_map([], account_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Blocked while any card still settles through the account.
pub fn delete_account(conn: &Connection, name: &str) -> LedgerResult<()> {
    let account = account_by_name(conn, name)?;
    let cards: i64 = conn.query_row(
        "SELECT COUNT(*) FROM cards WHERE account_id=?1",
        params![account.id],
        |r| r.get(0),
    )?;
    if cards > 0 {
        return Err(LedgerError::IntegrityConflict(format!(
            "account '{}' is still referenced by {} card(s)",
            account.name, cards
        )));
    }
    conn.execute("DELETE FROM accounts WHERE id=?1", params![account.id])?;
    tracing::info!(account = %account.name, "account removed");
    Ok(())
}

pub fn total_account_balance(conn: &Connection) -> LedgerResult<Decimal> {
    sum_amounts(conn, "SELECT balance FROM accounts", params![])
}

fn adjust_balance(conn: &Connection, account_id: i64, delta: Decimal) -> LedgerResult<()> {
    let account = account_by_id(conn, account_id)?;
    let balance = account.balance.checked_add(delta).ok_or_else(|| {
        LedgerError::Overflow(format!("{} balance {} + {}", account.name, account.balance, delta))
    })?;
    conn.execute(
        "UPDATE accounts SET balance=?1 WHERE id=?2",
        params![balance.to_string(), account_id],
    )?;
    tracing::debug!(account = %account.name, %delta, %balance, "balance adjusted");
    Ok(())
}

// ── Categories ───────────────────────────────────────────────────

pub fn add_category(conn: &Connection, new: &NewCategory) -> LedgerResult<i64> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("category name is required"));
    }
    conn.execute(
        "INSERT INTO categories(name, kind) VALUES (?1, ?2)",
        params![name, new.kind],
    )
    .map_err(|e| unique_conflict(e, "Category", name))?;
    Ok(conn.last_insert_rowid())
}

pub fn category_by_name(conn: &Connection, name: &str) -> LedgerResult<Category> {
    conn.query_row(
        "SELECT id, name, kind FROM categories WHERE name=?1",
        params![name.trim()],
        |r| {
            Ok(Category {
                id: r.get(0)?,
                name: r.get(1)?,
                kind: r.get(2)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Category", name.trim()))
}

pub fn list_categories(conn: &Connection) -> LedgerResult<Vec<Category>> {
    let mut stmt = conn.prepare("SELECT id, name, kind FROM categories ORDER BY kind, name")?;
    let rows = stmt.query_map([], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            kind: r.get(2)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn delete_category(conn: &Connection, name: &str) -> LedgerResult<()> {
    let category = category_by_name(conn, name)?;
    conn.execute("DELETE FROM categories WHERE id=?1", params![category.id])?;
    Ok(())
}

// ── Cards ────────────────────────────────────────────────────────

pub fn add_card(conn: &Connection, new: &NewCard) -> LedgerResult<i64> {
    new.validate()?;
    let account = account_by_name(conn, &new.account)?;
    let name = new.name.trim();
    conn.execute(
        "INSERT INTO cards(name, account_id, payment_method, due_day, closing_offset_days, credit_limit)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            name,
            account.id,
            new.payment_method,
            new.due_day,
            new.closing_offset_days,
            new.credit_limit.to_string()
        ],
    )
    .map_err(|e| unique_conflict(e, "Card", name))?;
    Ok(conn.last_insert_rowid())
}

pub fn card_by_name(conn: &Connection, name: &str) -> LedgerResult<Card> {
    conn.query_row(
        "SELECT id, name, account_id, payment_method, due_day, closing_offset_days, credit_limit
         FROM cards WHERE name=?1",
        params![name.trim()],
        card_from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found("Card", name.trim()))
}

fn card_by_id(conn: &Connection, id: i64) -> LedgerResult<Option<Card>> {
    Ok(conn
        .query_row(
            "SELECT id, name, account_id, payment_method, due_day, closing_offset_days, credit_limit
             FROM cards WHERE id=?1",
            params![id],
            card_from_row,
        )
        .optional()?)
}

pub fn list_cards(conn: &Connection) -> LedgerResult<Vec<Card>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, account_id, payment_method, due_day, closing_offset_days, credit_limit
         FROM cards ORDER BY name",
    )?;
    let rows = stmt.query_map([], card_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Credit and hybrid cards with both cycle fields configured.
pub fn cards_with_cycle(conn: &Connection) -> LedgerResult<Vec<Card>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, account_id, payment_method, due_day, closing_offset_days, credit_limit
         FROM cards
         WHERE payment_method IN ('credit','hybrid')
           AND due_day IS NOT NULL AND closing_offset_days IS NOT NULL
         ORDER BY name",
    )?;
    let rows = stmt.query_map([], card_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn delete_card(conn: &Connection, name: &str) -> LedgerResult<()> {
    let card = card_by_name(conn, name)?;
    conn.execute("DELETE FROM cards WHERE id=?1", params![card.id])?;
    tracing::info!(card = %card.name, "card removed");
    Ok(())
}

/// Sum of credit purchases on `card_id` dated within `[start, end]`.
pub fn card_expense_total(
    conn: &Connection,
    card_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> LedgerResult<Decimal> {
    sum_amounts(
        conn,
        "SELECT amount FROM transactions
         WHERE card_id=?1 AND kind='expense' AND purchase_method='credit'
           AND substr(created_at,1,10) BETWEEN ?2 AND ?3",
        params![card_id, start.to_string(), end.to_string()],
    )
}

// ── Transactions ─────────────────────────────────────────────────

/// Sum of recurring rows of `kind`, optionally skipping rows created in `exclude`.
pub fn recurring_amount(
    conn: &Connection,
    kind: TransactionKind,
    exclude: Option<YearMonth>,
) -> LedgerResult<Decimal> {
    match exclude {
        Some(month) => sum_amounts(
            conn,
            "SELECT amount FROM transactions
             WHERE kind=?1 AND recurrence='recurring' AND substr(created_at,1,7)<>?2",
            params![kind, month.to_string()],
        ),
        None => sum_amounts(
            conn,
            "SELECT amount FROM transactions WHERE kind=?1 AND recurrence='recurring'",
            params![kind],
        ),
    }
}

pub fn installment_transactions(conn: &Connection) -> LedgerResult<Vec<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions t LEFT JOIN categories c ON t.category_id=c.id
         WHERE t.kind='expense' AND t.payment_plan='installment'
         ORDER BY t.created_at, t.id",
        TRANSACTION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], transaction_from_row)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub fn get_transaction(conn: &Connection, id: i64) -> LedgerResult<Transaction> {
    let sql = format!(
        "SELECT {} FROM transactions t LEFT JOIN categories c ON t.category_id=c.id WHERE t.id=?1",
        TRANSACTION_COLUMNS
    );
    conn.query_row(&sql, params![id], transaction_from_row)
        .optional()?
        .ok_or_else(|| LedgerError::not_found("Transaction", id))
}

/// Account and signed delta a ledger row applies to balances, if any.
fn balance_effect(
    conn: &Connection,
    kind: TransactionKind,
    purchase_method: Option<PurchaseMethod>,
    card_id: Option<i64>,
    account_id: Option<i64>,
    amount: Decimal,
) -> LedgerResult<Option<(i64, Decimal)>> {
    match kind {
        TransactionKind::Income => Ok(account_id.map(|id| (id, amount))),
        TransactionKind::Expense if purchase_method == Some(PurchaseMethod::Debit) => {
            let card = match card_id {
                Some(id) => card_by_id(conn, id)?,
                None => None,
            };
            Ok(card.map(|c| (c.account_id, -amount)))
        }
        TransactionKind::Expense => Ok(None),
    }
}

/// Validates, inserts and applies the balance effect atomically.
pub fn insert_transaction(conn: &mut Connection, new: &NewTransaction) -> LedgerResult<i64> {
    new.validate()?;
    let tx = conn.transaction()?;

    let mut purchase_method = new.purchase_method;
    let card = match new.card.as_deref() {
        Some(name) => Some(card_by_name(&tx, name)?),
        None => None,
    };
    if let Some(card) = &card {
        let method = match purchase_method {
            Some(m) => m,
            None => match card.payment_method {
                PaymentMethod::Credit => PurchaseMethod::Credit,
                PaymentMethod::Debit => PurchaseMethod::Debit,
                PaymentMethod::Hybrid => {
                    return Err(LedgerError::validation(format!(
                        "card '{}' is hybrid; choose a purchase method",
                        card.name
                    )));
                }
            },
        };
        if !card.payment_method.accepts(method) {
            return Err(LedgerError::validation(format!(
                "card '{}' ({}) does not accept {} purchases",
                card.name, card.payment_method, method
            )));
        }
        if method == PurchaseMethod::Debit && new.payment_plan == PaymentPlan::Installment {
            return Err(LedgerError::validation(
                "debit purchases must be paid as a lump sum",
            ));
        }
        purchase_method = Some(method);
    }

    let account = match new.account.as_deref() {
        Some(name) => Some(account_by_name(&tx, name)?),
        None => None,
    };

    let category_id = match new.category.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => {
            let category = category_by_name(&tx, name)?;
            if category.kind != new.kind {
                return Err(LedgerError::validation(format!(
                    "category '{}' is for {} entries, not {}",
                    category.name, category.kind, new.kind
                )));
            }
            Some(category.id)
        }
        _ => None,
    };

    let card_id = card.as_ref().map(|c| c.id);
    let account_id = account.as_ref().map(|a| a.id);
    tx.execute(
        "INSERT INTO transactions(kind, description, amount, category_id, card_id, account_id,
            recurrence, due_day, purchase_method, payment_plan, installment_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
            COALESCE(?12, datetime('now','localtime')))",
        params![
            new.kind,
            new.description.trim(),
            new.amount.to_string(),
            category_id,
            card_id,
            account_id,
            new.recurrence,
            new.due_day,
            purchase_method,
            new.payment_plan,
            new.installment_count,
            new.created_at
        ],
    )?;
    let id = tx.last_insert_rowid();

    if let Some((acct, delta)) = balance_effect(
        &tx,
        new.kind,
        purchase_method,
        card_id,
        account_id,
        new.amount,
    )? {
        adjust_balance(&tx, acct, delta)?;
    }
    tx.commit()?;
    tracing::info!(id, kind = %new.kind, amount = %new.amount, "transaction recorded");
    Ok(id)
}

/// Deletes a transaction and reverses its balance effect atomically.
pub fn delete_transaction(conn: &mut Connection, id: i64) -> LedgerResult<Transaction> {
    let tx = conn.transaction()?;
    let existing = get_transaction(&tx, id)?;
    match balance_effect(
        &tx,
        existing.kind,
        existing.purchase_method,
        existing.card_id,
        existing.account_id,
        existing.amount,
    )? {
        Some((acct, delta)) => adjust_balance(&tx, acct, -delta)?,
        None if existing.kind == TransactionKind::Income
            || existing.purchase_method == Some(PurchaseMethod::Debit) =>
        {
            tracing::warn!(id, "linked account or card is gone; balance left untouched");
        }
        None => {}
    }
    tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    tx.commit()?;
    tracing::info!(id, "transaction removed");
    Ok(existing)
}
