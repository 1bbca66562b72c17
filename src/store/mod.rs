// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence interface consumed by the engine.
//!
//! The query methods have in-memory defaults built on the engine filters;
//! backends that can filter natively (SQLite) override them.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::NaiveDate;
use tracing::{error, warn};

use crate::engine::schedule;
use crate::error::EngineResult;
use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, Client, FinancialRecord, NewAppointment,
    NewClient, NewFinancialRecord, RecordPatch,
};

pub trait ClientStore {
    fn all_clients(&self) -> EngineResult<Vec<Client>>;
    fn client(&self, id: i64) -> EngineResult<Option<Client>>;
    fn create_client(&self, new: &NewClient) -> EngineResult<Client>;
    fn delete_client(&self, id: i64) -> EngineResult<()>;
}

pub trait AppointmentStore {
    fn all_appointments(&self) -> EngineResult<Vec<Appointment>>;
    fn appointment(&self, id: i64) -> EngineResult<Option<Appointment>>;
    fn create_appointment(&self, new: &NewAppointment) -> EngineResult<Appointment>;
    /// Fails with `NotFound` when `id` does not resolve.
    fn update_appointment(&self, id: i64, patch: &AppointmentPatch) -> EngineResult<Appointment>;
    fn delete_appointment(&self, id: i64) -> EngineResult<()>;

    fn appointments_on(&self, date: NaiveDate) -> EngineResult<Vec<Appointment>> {
        Ok(schedule::by_date(&self.all_appointments()?, date))
    }

    fn appointments_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<Appointment>> {
        Ok(schedule::by_date_range(&self.all_appointments()?, start, end))
    }

    fn appointments_for_client(&self, client_id: i64) -> EngineResult<Vec<Appointment>> {
        Ok(schedule::by_client(&self.all_appointments()?, client_id))
    }

    fn appointments_with_status(
        &self,
        status: AppointmentStatus,
    ) -> EngineResult<Vec<Appointment>> {
        Ok(schedule::by_status(&self.all_appointments()?, status))
    }
}

pub trait FinancialStore {
    fn all_records(&self) -> EngineResult<Vec<FinancialRecord>>;
    fn record(&self, id: i64) -> EngineResult<Option<FinancialRecord>>;
    fn create_record(&self, new: &NewFinancialRecord) -> EngineResult<FinancialRecord>;
    fn update_record(&self, id: i64, patch: &RecordPatch) -> EngineResult<FinancialRecord>;
    fn delete_record(&self, id: i64) -> EngineResult<()>;

    fn records_for_appointment(&self, appointment_id: i64) -> EngineResult<Vec<FinancialRecord>> {
        Ok(self
            .all_records()?
            .into_iter()
            .filter(|r| r.appointment_id == Some(appointment_id))
            .collect())
    }

    fn records_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<FinancialRecord>> {
        Ok(self
            .all_records()?
            .into_iter()
            .filter(|r| start <= r.date && r.date <= end)
            .collect())
    }
}

pub trait Store: ClientStore + AppointmentStore + FinancialStore {
    /// Writes the two halves of an appointment execution: the status change
    /// to `completed` and the optional payment record.
    ///
    /// The default is two-phase: status first, then the record. If the record
    /// write fails the previous status is restored before the error is
    /// returned. Backends with transactions override this with an atomic commit.
    fn commit_execution(
        &self,
        original: &Appointment,
        record: Option<&NewFinancialRecord>,
    ) -> EngineResult<Option<FinancialRecord>> {
        self.update_appointment(
            original.id,
            &AppointmentPatch::status(AppointmentStatus::Completed),
        )?;
        let Some(new) = record else {
            return Ok(None);
        };
        match self.create_record(new) {
            Ok(created) => Ok(Some(created)),
            Err(err) => {
                warn!(
                    appointment = original.id,
                    status = %original.status,
                    "payment write failed, restoring previous status: {err}"
                );
                if let Err(undo) =
                    self.update_appointment(original.id, &AppointmentPatch::status(original.status))
                {
                    error!(
                        appointment = original.id,
                        "could not restore status after failed payment write: {undo}"
                    );
                }
                Err(err)
            }
        }
    }
}
