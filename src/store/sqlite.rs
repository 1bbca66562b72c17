// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Appointment, AppointmentPatch, AppointmentStatus, Client, FinancialRecord, NewAppointment,
    NewClient, NewFinancialRecord, RecordPatch, hhmm,
};

use super::{AppointmentStore, ClientStore, FinancialStore, Store};

const APPOINTMENT_COLS: &str =
    "id, client_id, client_name, type, date, time, duration, location, status, notes";
const RECORD_COLS: &str =
    "id, amount, description, date, type, category, client_id, appointment_id";

pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn query_appointments(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> EngineResult<Vec<Appointment>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, row_to_appointment)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn query_records(
        &self,
        sql: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> EngineResult<Vec<FinancialRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, row_to_record)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

fn row_to_client(r: &Row) -> rusqlite::Result<Client> {
    Ok(Client {
        id: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        phone: r.get(3)?,
    })
}

fn row_to_appointment(r: &Row) -> rusqlite::Result<Appointment> {
    let time: String = r.get(5)?;
    let time = NaiveTime::parse_from_str(&time, hhmm::FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(Appointment {
        id: r.get(0)?,
        client_id: r.get(1)?,
        client_name: r.get(2)?,
        r#type: r.get(3)?,
        date: r.get(4)?,
        time,
        duration: r.get(6)?,
        location: r.get(7)?,
        status: r.get(8)?,
        notes: r.get(9)?,
    })
}

fn row_to_record(r: &Row) -> rusqlite::Result<FinancialRecord> {
    let amount: String = r.get(1)?;
    let amount = amount
        .parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    Ok(FinancialRecord {
        id: r.get(0)?,
        amount,
        description: r.get(2)?,
        date: r.get(3)?,
        r#type: r.get(4)?,
        category: r.get(5)?,
        client_id: r.get(6)?,
        appointment_id: r.get(7)?,
    })
}

fn fmt_time(t: &NaiveTime) -> String {
    t.format(hhmm::FORMAT).to_string()
}

impl ClientStore for SqliteStore<'_> {
    fn all_clients(&self) -> EngineResult<Vec<Client>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, email, phone FROM clients ORDER BY name, id")?;
        let rows = stmt.query_map([], row_to_client)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn client(&self, id: i64) -> EngineResult<Option<Client>> {
        let c = self
            .conn
            .query_row(
                "SELECT id, name, email, phone FROM clients WHERE id=?1",
                params![id],
                row_to_client,
            )
            .optional()?;
        Ok(c)
    }

    fn create_client(&self, new: &NewClient) -> EngineResult<Client> {
        self.conn.execute(
            "INSERT INTO clients(name, email, phone) VALUES (?1, ?2, ?3)",
            params![new.name, new.email, new.phone],
        )?;
        let id = self.conn.last_insert_rowid();
        self.client(id)?
            .ok_or_else(|| EngineError::Persistence(format!("client {} vanished after insert", id)))
    }

    fn delete_client(&self, id: i64) -> EngineResult<()> {
        let n = self
            .conn
            .execute("DELETE FROM clients WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(EngineError::not_found("Client", id));
        }
        Ok(())
    }
}

impl AppointmentStore for SqliteStore<'_> {
    fn all_appointments(&self) -> EngineResult<Vec<Appointment>> {
        self.query_appointments(
            &format!("SELECT {APPOINTMENT_COLS} FROM appointments ORDER BY id"),
            &[],
        )
    }

    fn appointment(&self, id: i64) -> EngineResult<Option<Appointment>> {
        let a = self
            .conn
            .query_row(
                &format!("SELECT {APPOINTMENT_COLS} FROM appointments WHERE id=?1"),
                params![id],
                row_to_appointment,
            )
            .optional()?;
        Ok(a)
    }

    fn create_appointment(&self, new: &NewAppointment) -> EngineResult<Appointment> {
        self.conn.execute(
            "INSERT INTO appointments(client_id, client_name, type, date, time, duration, location, status, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                new.client_id,
                new.client_name,
                new.r#type,
                new.date,
                fmt_time(&new.time),
                new.duration,
                new.location,
                new.status,
                new.notes
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(appointment = id, date = %new.date, "appointment created");
        self.appointment(id)?.ok_or_else(|| {
            EngineError::Persistence(format!("appointment {} vanished after insert", id))
        })
    }

    fn update_appointment(&self, id: i64, patch: &AppointmentPatch) -> EngineResult<Appointment> {
        let mut appt = self
            .appointment(id)?
            .ok_or_else(|| EngineError::not_found("Appointment", id))?;
        patch.apply(&mut appt);
        self.conn.execute(
            "UPDATE appointments SET type=?1, date=?2, time=?3, duration=?4, location=?5, status=?6, notes=?7
             WHERE id=?8",
            params![
                appt.r#type,
                appt.date,
                fmt_time(&appt.time),
                appt.duration,
                appt.location,
                appt.status,
                appt.notes,
                id
            ],
        )?;
        Ok(appt)
    }

    fn delete_appointment(&self, id: i64) -> EngineResult<()> {
        let n = self
            .conn
            .execute("DELETE FROM appointments WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(EngineError::not_found("Appointment", id));
        }
        Ok(())
    }

    fn appointments_on(&self, date: NaiveDate) -> EngineResult<Vec<Appointment>> {
        self.query_appointments(
            &format!("SELECT {APPOINTMENT_COLS} FROM appointments WHERE date=?1 ORDER BY time, id"),
            &[&date],
        )
    }

    fn appointments_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<Appointment>> {
        self.query_appointments(
            &format!(
                "SELECT {APPOINTMENT_COLS} FROM appointments WHERE date BETWEEN ?1 AND ?2 ORDER BY date, time, id"
            ),
            &[&start, &end],
        )
    }

    fn appointments_for_client(&self, client_id: i64) -> EngineResult<Vec<Appointment>> {
        self.query_appointments(
            &format!(
                "SELECT {APPOINTMENT_COLS} FROM appointments WHERE client_id=?1 ORDER BY date DESC, time DESC, id"
            ),
            &[&client_id],
        )
    }

    fn appointments_with_status(
        &self,
        status: AppointmentStatus,
    ) -> EngineResult<Vec<Appointment>> {
        self.query_appointments(
            &format!("SELECT {APPOINTMENT_COLS} FROM appointments WHERE status=?1 ORDER BY id"),
            &[&status],
        )
    }
}

impl FinancialStore for SqliteStore<'_> {
    fn all_records(&self) -> EngineResult<Vec<FinancialRecord>> {
        self.query_records(
            &format!("SELECT {RECORD_COLS} FROM financial_records ORDER BY id"),
            &[],
        )
    }

    fn record(&self, id: i64) -> EngineResult<Option<FinancialRecord>> {
        let r = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLS} FROM financial_records WHERE id=?1"),
                params![id],
                row_to_record,
            )
            .optional()?;
        Ok(r)
    }

    fn create_record(&self, new: &NewFinancialRecord) -> EngineResult<FinancialRecord> {
        self.conn.execute(
            "INSERT INTO financial_records(amount, description, date, type, category, client_id, appointment_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                new.amount.to_string(),
                new.description,
                new.date,
                new.r#type,
                new.category,
                new.client_id,
                new.appointment_id
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(record = id, amount = %new.amount, "financial record created");
        self.record(id)?.ok_or_else(|| {
            EngineError::Persistence(format!("financial record {} vanished after insert", id))
        })
    }

    fn update_record(&self, id: i64, patch: &RecordPatch) -> EngineResult<FinancialRecord> {
        let mut rec = self
            .record(id)?
            .ok_or_else(|| EngineError::not_found("Financial record", id))?;
        patch.apply(&mut rec);
        self.conn.execute(
            "UPDATE financial_records SET amount=?1, description=?2, date=?3, type=?4, category=?5
             WHERE id=?6",
            params![
                rec.amount.to_string(),
                rec.description,
                rec.date,
                rec.r#type,
                rec.category,
                id
            ],
        )?;
        Ok(rec)
    }

    fn delete_record(&self, id: i64) -> EngineResult<()> {
        let n = self
            .conn
            .execute("DELETE FROM financial_records WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(EngineError::not_found("Financial record", id));
        }
        Ok(())
    }

    fn records_for_appointment(&self, appointment_id: i64) -> EngineResult<Vec<FinancialRecord>> {
        self.query_records(
            &format!("SELECT {RECORD_COLS} FROM financial_records WHERE appointment_id=?1 ORDER BY id"),
            &[&appointment_id],
        )
    }

    fn records_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<FinancialRecord>> {
        self.query_records(
            &format!(
                "SELECT {RECORD_COLS} FROM financial_records WHERE date BETWEEN ?1 AND ?2 ORDER BY id"
            ),
            &[&start, &end],
        )
    }
}

impl Store for SqliteStore<'_> {
    /// Both writes run inside one SQLite transaction; dropping it on any
    /// error rolls back the status change.
    fn commit_execution(
        &self,
        original: &Appointment,
        record: Option<&NewFinancialRecord>,
    ) -> EngineResult<Option<FinancialRecord>> {
        let tx = self.conn.unchecked_transaction()?;
        let n = self.conn.execute(
            "UPDATE appointments SET status=?1 WHERE id=?2",
            params![AppointmentStatus::Completed, original.id],
        )?;
        if n == 0 {
            return Err(EngineError::not_found("Appointment", original.id));
        }
        let created = match record {
            Some(new) => Some(self.create_record(new)?),
            None => None,
        };
        tx.commit().map_err(|e| {
            error!(appointment = original.id, "execution commit failed: {e}");
            EngineError::from(e)
        })?;
        Ok(created)
    }
}
