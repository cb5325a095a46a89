// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

use crate::calendar::CalendarError;

/// Failures raised by the ledger store and the projection engine.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },
    #[error("Integrity conflict: {0}")]
    IntegrityConflict(String),
    #[error(transparent)]
    InvalidCalendar(#[from] CalendarError),
    #[error("Invalid stored amount '{0}'")]
    InvalidAmount(String),
    #[error("Amount overflow: {0}")]
    Overflow(String),
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Turns a UNIQUE constraint violation into an [`LedgerError::IntegrityConflict`].
pub(crate) fn unique_conflict(err: rusqlite::Error, entity: &str, name: &str) -> LedgerError {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            LedgerError::IntegrityConflict(format!("{} '{}' already exists", entity, name))
        }
        other => LedgerError::Database(other),
    }
}
