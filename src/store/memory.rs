// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::cell::RefCell;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    Appointment, AppointmentPatch, Client, FinancialRecord, NewAppointment, NewClient,
    NewFinancialRecord, RecordPatch,
};

use super::{AppointmentStore, ClientStore, FinancialStore, Store};

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    clients: Vec<Client>,
    appointments: Vec<Appointment>,
    records: Vec<FinancialRecord>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Vector-backed store. Single-threaded; ids are shared across entity kinds.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RefCell<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClientStore for MemoryStore {
    fn all_clients(&self) -> EngineResult<Vec<Client>> {
        let mut out = self.state.borrow().clients.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn client(&self, id: i64) -> EngineResult<Option<Client>> {
        Ok(self.state.borrow().clients.iter().find(|c| c.id == id).cloned())
    }

    fn create_client(&self, new: &NewClient) -> EngineResult<Client> {
        let mut st = self.state.borrow_mut();
        let client = Client {
            id: st.next_id(),
            name: new.name.clone(),
            email: new.email.clone(),
            phone: new.phone.clone(),
        };
        st.clients.push(client.clone());
        Ok(client)
    }

    fn delete_client(&self, id: i64) -> EngineResult<()> {
        let mut st = self.state.borrow_mut();
        let before = st.clients.len();
        st.clients.retain(|c| c.id != id);
        if st.clients.len() == before {
            return Err(EngineError::not_found("Client", id));
        }
        for r in st.records.iter_mut().filter(|r| r.client_id == Some(id)) {
            r.client_id = None;
        }
        Ok(())
    }
}

impl AppointmentStore for MemoryStore {
    fn all_appointments(&self) -> EngineResult<Vec<Appointment>> {
        Ok(self.state.borrow().appointments.clone())
    }

    fn appointment(&self, id: i64) -> EngineResult<Option<Appointment>> {
        Ok(self
            .state
            .borrow()
            .appointments
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    fn create_appointment(&self, new: &NewAppointment) -> EngineResult<Appointment> {
        let mut st = self.state.borrow_mut();
        let appt = Appointment {
            id: st.next_id(),
            client_id: new.client_id,
            client_name: new.client_name.clone(),
            r#type: new.r#type.clone(),
            date: new.date,
            time: new.time,
            duration: new.duration,
            location: new.location,
            status: new.status,
            notes: new.notes.clone(),
        };
        st.appointments.push(appt.clone());
        Ok(appt)
    }

    fn update_appointment(&self, id: i64, patch: &AppointmentPatch) -> EngineResult<Appointment> {
        let mut st = self.state.borrow_mut();
        let appt = st
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::not_found("Appointment", id))?;
        patch.apply(appt);
        Ok(appt.clone())
    }

    fn delete_appointment(&self, id: i64) -> EngineResult<()> {
        let mut st = self.state.borrow_mut();
        let before = st.appointments.len();
        st.appointments.retain(|a| a.id != id);
        if st.appointments.len() == before {
            return Err(EngineError::not_found("Appointment", id));
        }
        Ok(())
    }
}

impl FinancialStore for MemoryStore {
    fn all_records(&self) -> EngineResult<Vec<FinancialRecord>> {
        Ok(self.state.borrow().records.clone())
    }

    fn record(&self, id: i64) -> EngineResult<Option<FinancialRecord>> {
        Ok(self.state.borrow().records.iter().find(|r| r.id == id).cloned())
    }

    fn create_record(&self, new: &NewFinancialRecord) -> EngineResult<FinancialRecord> {
        let mut st = self.state.borrow_mut();
        let rec = FinancialRecord {
            id: st.next_id(),
            amount: new.amount,
            description: new.description.clone(),
            date: new.date,
            r#type: new.r#type,
            category: new.category.clone(),
            client_id: new.client_id,
            appointment_id: new.appointment_id,
        };
        st.records.push(rec.clone());
        Ok(rec)
    }

    fn update_record(&self, id: i64, patch: &RecordPatch) -> EngineResult<FinancialRecord> {
        let mut st = self.state.borrow_mut();
        let rec = st
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| EngineError::not_found("Financial record", id))?;
        patch.apply(rec);
        Ok(rec.clone())
    }

    fn delete_record(&self, id: i64) -> EngineResult<()> {
        let mut st = self.state.borrow_mut();
        let before = st.records.len();
        st.records.retain(|r| r.id != id);
        if st.records.len() == before {
            return Err(EngineError::not_found("Financial record", id));
        }
        Ok(())
    }
}

impl Store for MemoryStore {}
