// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Appointment, AppointmentStatus, CalendarCell};

// All filters clone into a fresh Vec and rely on the stable `sort_by`,
// so equal keys keep their input order.

/// Appointments on `date`, earliest time first.
pub fn by_date(all: &[Appointment], date: NaiveDate) -> Vec<Appointment> {
    let mut out: Vec<Appointment> = all.iter().filter(|a| a.date == date).cloned().collect();
    out.sort_by(|a, b| a.time.cmp(&b.time));
    out
}

/// Appointments with `start <= date <= end`, ordered by (date, time).
pub fn by_date_range(all: &[Appointment], start: NaiveDate, end: NaiveDate) -> Vec<Appointment> {
    let mut out: Vec<Appointment> = all
        .iter()
        .filter(|a| start <= a.date && a.date <= end)
        .cloned()
        .collect();
    sort_chronological(&mut out);
    out
}

/// A client's history, most recent first.
pub fn by_client(all: &[Appointment], client_id: i64) -> Vec<Appointment> {
    let mut out: Vec<Appointment> = all
        .iter()
        .filter(|a| a.client_id == client_id)
        .cloned()
        .collect();
    out.sort_by(|a, b| (b.date, b.time).cmp(&(a.date, a.time)));
    out
}

/// Input order is preserved.
pub fn by_status(all: &[Appointment], status: AppointmentStatus) -> Vec<Appointment> {
    all.iter().filter(|a| a.status == status).cloned().collect()
}

pub fn sort_chronological(appts: &mut [Appointment]) {
    appts.sort_by(|a, b| (a.date, a.time).cmp(&(b.date, b.time)));
}

#[derive(Debug, Clone, Serialize)]
pub struct AgendaDay {
    #[serde(flatten)]
    pub cell: CalendarCell,
    pub appointments: Vec<Appointment>,
}

/// Pairs every calendar cell with the appointments falling on it.
pub fn agenda(cells: &[CalendarCell], all: &[Appointment]) -> Vec<AgendaDay> {
    cells
        .iter()
        .map(|cell| AgendaDay {
            cell: *cell,
            appointments: by_date(all, cell.date),
        })
        .collect()
}
