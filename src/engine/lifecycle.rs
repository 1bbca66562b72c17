// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Appointment status lifecycle.
//!
//! The status set is flat: any status may be replaced by any other. The one
//! transition with side effects is *execute*, which completes the appointment
//! and optionally books its payment as a linked financial record.
//!
//! Every store-backed operation re-reads the appointment after writing and
//! returns that copy, never a locally patched one.

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, FinancialRecord, FinancialType, Location,
    NewAppointment, NewFinancialRecord,
};
use crate::store::Store;

/// Returns a copy of `appt` carrying `status`. Date, time and duration are never touched.
pub fn transition(appt: &Appointment, status: AppointmentStatus) -> Appointment {
    Appointment {
        status,
        ..appt.clone()
    }
}

/// Payment captured while executing an appointment. `amount` is a magnitude;
/// the stored sign follows `type`.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub amount: Decimal,
    pub description: String,
    pub r#type: FinancialType,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub appointment: Appointment,
    pub record: Option<NewFinancialRecord>,
}

/// Pure half of execute: the completed appointment plus the record to write,
/// if the payment has a strictly positive amount.
pub fn plan_execution(
    appt: &Appointment,
    payment: Option<&PaymentInput>,
    today: NaiveDate,
) -> ExecutionPlan {
    let record = payment.filter(|p| p.amount > Decimal::ZERO).map(|p| {
        let description = if p.description.trim().is_empty() {
            format!("{} - {}", appt.r#type, appt.client_name)
        } else {
            p.description.trim().to_string()
        };
        NewFinancialRecord {
            amount: p.r#type.signed(p.amount),
            description,
            date: today,
            r#type: p.r#type,
            category: p.category.clone(),
            client_id: Some(appt.client_id),
            appointment_id: Some(appt.id),
        }
    });
    ExecutionPlan {
        appointment: transition(appt, AppointmentStatus::Completed),
        record,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Execution {
    pub appointment: Appointment,
    pub financial_record: Option<FinancialRecord>,
}

#[derive(Debug, Clone)]
pub struct AppointmentDraft {
    pub client_id: i64,
    pub r#type: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration: u32,
    pub location: Location,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

pub fn create<S: Store + ?Sized>(store: &S, draft: AppointmentDraft) -> EngineResult<Appointment> {
    let client = store
        .client(draft.client_id)?
        .ok_or_else(|| EngineError::not_found("Client", draft.client_id))?;
    let kind = draft.r#type.trim();
    if kind.is_empty() {
        return Err(EngineError::validation("type", "must not be empty"));
    }
    validate_duration(draft.duration)?;
    let new = NewAppointment {
        client_id: client.id,
        client_name: client.name,
        r#type: kind.to_string(),
        date: draft.date,
        time: draft.time,
        duration: draft.duration,
        location: draft.location,
        status: draft.status.unwrap_or(AppointmentStatus::Scheduled),
        notes: draft.notes.filter(|n| !n.trim().is_empty()),
    };
    store.create_appointment(&new)
}

/// Explicit edit. The only path allowed to move date, time or duration.
pub fn update<S: Store + ?Sized>(
    store: &S,
    id: i64,
    patch: &AppointmentPatch,
) -> EngineResult<Appointment> {
    if patch.is_empty() {
        return Err(EngineError::validation("patch", "nothing to update"));
    }
    if let Some(d) = patch.duration {
        validate_duration(d)?;
    }
    if let Some(t) = &patch.r#type {
        if t.trim().is_empty() {
            return Err(EngineError::validation("type", "must not be empty"));
        }
    }
    require(store, id)?;
    store.update_appointment(id, patch)?;
    info!(appointment = id, "appointment updated");
    refresh(store, id)
}

pub fn set_status<S: Store + ?Sized>(
    store: &S,
    id: i64,
    status: AppointmentStatus,
) -> EngineResult<Appointment> {
    let current = require(store, id)?;
    store.update_appointment(id, &AppointmentPatch::status(status))?;
    info!(appointment = id, from = %current.status, to = %status, "status changed");
    refresh(store, id)
}

/// Same as [`set_status`] for a raw status value; unknown values fail with `InvalidStatus`.
pub fn set_status_str<S: Store + ?Sized>(store: &S, id: i64, raw: &str) -> EngineResult<Appointment> {
    let status: AppointmentStatus = raw.parse()?;
    set_status(store, id, status)
}

/// Completes the appointment and books the payment, as one unit of work.
pub fn execute<S: Store + ?Sized>(
    store: &S,
    id: i64,
    payment: Option<&PaymentInput>,
    today: NaiveDate,
) -> EngineResult<Execution> {
    let original = require(store, id)?;
    let plan = plan_execution(&original, payment, today);
    if payment.is_some() && plan.record.is_none() {
        debug!(appointment = id, "non-positive payment amount, no record booked");
    }
    let financial_record = store.commit_execution(&original, plan.record.as_ref())?;
    info!(
        appointment = id,
        record = ?financial_record.as_ref().map(|r| r.id),
        "appointment executed"
    );
    Ok(Execution {
        appointment: refresh(store, id)?,
        financial_record,
    })
}

fn require<S: Store + ?Sized>(store: &S, id: i64) -> EngineResult<Appointment> {
    store
        .appointment(id)?
        .ok_or_else(|| EngineError::not_found("Appointment", id))
}

fn refresh<S: Store + ?Sized>(store: &S, id: i64) -> EngineResult<Appointment> {
    require(store, id)
}

fn validate_duration(minutes: u32) -> EngineResult<()> {
    if minutes == 0 {
        return Err(EngineError::validation("duration", "must be a positive number of minutes"));
    }
    Ok(())
}
