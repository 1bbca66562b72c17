// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors raised by the scheduling and ledger engine and by the stores behind it.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("Unrecognized appointment status '{0}' (expected scheduled|confirmed|completed|canceled|no_show)")]
    InvalidStatus(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Appointment {appointment_id} has {count} linked financial record(s); remove them first")]
    LinkedRecords { appointment_id: i64, count: usize },

    #[error("Storage timed out: {0}")]
    Timeout(String),

    #[error("Storage failure: {0}")]
    Persistence(String),
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        EngineError::NotFound { entity, id }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::Validation { .. } | EngineError::InvalidStatus(_)
        )
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, EngineError::Persistence(_) | EngineError::Timeout(_))
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
            {
                EngineError::Timeout(err.to_string())
            }
            _ => EngineError::Persistence(err.to_string()),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
