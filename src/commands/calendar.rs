// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::calendar;
use crate::engine::schedule::{self, AgendaDay};
use crate::models::ViewMode;
use crate::store::{AppointmentStore, SqliteStore};
use crate::utils::{fmt_time, maybe_print_json, parse_date, pretty_table, today};
use anyhow::Result;
use chrono::Datelike;
use rusqlite::Connection;

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let days = agenda_for(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &days)? {
        return Ok(());
    }
    let mode = sub.get_one::<String>("view").unwrap().parse::<ViewMode>()?;
    match mode {
        ViewMode::Month => println!("{}", month_grid(&days)),
        ViewMode::Day | ViewMode::Week => {
            let rows = days
                .iter()
                .map(|d| {
                    let slots = d
                        .appointments
                        .iter()
                        .map(|a| {
                            format!(
                                "{} {} ({}, {})",
                                fmt_time(&a.time),
                                a.client_name,
                                a.r#type,
                                a.status.label()
                            )
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    vec![
                        format!("{} {}", d.cell.date.format("%a"), d.cell.date),
                        slots,
                    ]
                })
                .collect();
            println!("{}", pretty_table(&["Day", "Appointments"], rows));
        }
    }
    Ok(())
}

/// Builds the grid for the requested view and loads its appointments with a
/// single range query covering every visible cell.
pub fn agenda_for(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<AgendaDay>> {
    let store = SqliteStore::new(conn);
    let mode = sub.get_one::<String>("view").unwrap().parse::<ViewMode>()?;
    let anchor = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let anchor = match sub.get_one::<i32>("offset") {
        Some(steps) => calendar::shift(mode, anchor, *steps),
        None => anchor,
    };
    let cells = calendar::cells(mode, anchor);
    let (start, end) = calendar::visible_range(mode, anchor);
    let appts = store.appointments_between(start, end)?;
    Ok(schedule::agenda(&cells, &appts))
}

fn month_grid(days: &[AgendaDay]) -> comfy_table::Table {
    let rows = days
        .chunks(7)
        .map(|week| {
            week.iter()
                .map(|d| {
                    let day = if d.cell.is_current_period {
                        d.cell.date.day().to_string()
                    } else {
                        format!("({})", d.cell.date.day())
                    };
                    match d.appointments.len() {
                        0 => day,
                        n => format!("{}\n{} appt", day, n),
                    }
                })
                .collect()
        })
        .collect();
    pretty_table(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"], rows)
}
