// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{AppointmentStatus, FinancialRecord, FinancialType};
use crate::store::Store;

pub fn linked_records(appointment_id: i64, all: &[FinancialRecord]) -> Vec<FinancialRecord> {
    all.iter()
        .filter(|r| r.appointment_id == Some(appointment_id))
        .cloned()
        .collect()
}

pub fn has_linked_records(appointment_id: i64, all: &[FinancialRecord]) -> bool {
    all.iter().any(|r| r.appointment_id == Some(appointment_id))
}

/// Deletion gate: `LinkedRecords` while any record still references the appointment.
pub fn ensure_deletable(appointment_id: i64, all: &[FinancialRecord]) -> EngineResult<()> {
    let count = all
        .iter()
        .filter(|r| r.appointment_id == Some(appointment_id))
        .count();
    if count > 0 {
        return Err(EngineError::LinkedRecords {
            appointment_id,
            count,
        });
    }
    Ok(())
}

/// Deletes an appointment unless financial records are linked to it.
/// Nothing is cascaded.
pub fn delete_appointment<S: Store + ?Sized>(store: &S, id: i64) -> EngineResult<()> {
    store
        .appointment(id)?
        .ok_or_else(|| EngineError::not_found("Appointment", id))?;
    let linked = store.records_for_appointment(id)?;
    if let Err(err) = ensure_deletable(id, &linked) {
        warn!(appointment = id, linked = linked.len(), "deletion refused");
        return Err(err);
    }
    store.delete_appointment(id)?;
    info!(appointment = id, "appointment deleted");
    Ok(())
}

/// Deletes a client unless appointments still reference it.
pub fn delete_client<S: Store + ?Sized>(store: &S, id: i64) -> EngineResult<()> {
    store
        .client(id)?
        .ok_or_else(|| EngineError::not_found("Client", id))?;
    let appts = store.appointments_for_client(id)?;
    if !appts.is_empty() {
        return Err(EngineError::validation(
            "client",
            format!("client {} still has {} appointment(s)", id, appts.len()),
        ));
    }
    store.delete_client(id)?;
    info!(client = id, "client deleted");
    Ok(())
}

/// Findings of a ledger/schedule consistency sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// Record references an appointment id that no longer resolves.
    DanglingLink { record_id: i64, appointment_id: i64 },
    /// Amount sign disagrees with the record type.
    SignMismatch { record_id: i64 },
    /// Completed appointment without any linked record. Informational.
    UnpaidCompleted { appointment_id: i64 },
}

pub fn audit<S: Store + ?Sized>(store: &S) -> EngineResult<Vec<Issue>> {
    let appts = store.all_appointments()?;
    let records = store.all_records()?;
    let mut issues = Vec::new();

    for r in &records {
        if let Some(aid) = r.appointment_id {
            if !appts.iter().any(|a| a.id == aid) {
                issues.push(Issue::DanglingLink {
                    record_id: r.id,
                    appointment_id: aid,
                });
            }
        }
        let wrong_sign = match r.r#type {
            FinancialType::Income => r.amount < Decimal::ZERO,
            FinancialType::Expense => r.amount > Decimal::ZERO,
        };
        if wrong_sign {
            issues.push(Issue::SignMismatch { record_id: r.id });
        }
    }
    for a in appts
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed)
    {
        if !has_linked_records(a.id, &records) {
            issues.push(Issue::UnpaidCompleted {
                appointment_id: a.id,
            });
        }
    }
    Ok(issues)
}
