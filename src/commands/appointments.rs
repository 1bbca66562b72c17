// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::lifecycle::{self, AppointmentDraft, PaymentInput};
use crate::engine::{reconcile, schedule};
use crate::error::EngineError;
use crate::models::{Appointment, AppointmentPatch, AppointmentStatus, FinancialType, Location};
use crate::store::{AppointmentStore, FinancialStore, SqliteStore};
use crate::utils::{
    fmt_money, fmt_time, maybe_print_json, parse_date, parse_decimal, parse_id, parse_time,
    pretty_table, today, trimmed,
};
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("status", sub)) => status(conn, sub)?,
        Some(("execute", sub)) => execute(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let draft = AppointmentDraft {
        client_id: parse_id(sub.get_one::<String>("client").unwrap())?,
        r#type: sub.get_one::<String>("type").unwrap().to_string(),
        date: parse_date(sub.get_one::<String>("date").unwrap())?,
        time: parse_time(sub.get_one::<String>("time").unwrap())?,
        duration: *sub.get_one::<u32>("duration").unwrap(),
        location: sub.get_one::<String>("location").unwrap().parse::<Location>()?,
        status: trimmed(sub, "status")
            .map(|s| s.parse::<AppointmentStatus>())
            .transpose()?,
        notes: trimmed(sub, "notes"),
    };
    let appt = lifecycle::create(&store, draft)?;
    println!(
        "Scheduled #{} for {} on {} at {} ({} min)",
        appt.id,
        appt.client_name,
        appt.date,
        fmt_time(&appt.time),
        appt.duration
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", appointment_table(&data));
    }
    Ok(())
}

/// Resolves `appt list` arguments. One primary query is sent to the store
/// (date, range, client, or everything); the remaining criteria narrow it.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Appointment>> {
    let store = SqliteStore::new(conn);
    let client = trimmed(sub, "client").map(|s| parse_id(&s)).transpose()?;
    let status = trimmed(sub, "status")
        .map(|s| s.parse::<AppointmentStatus>())
        .transpose()?;

    let mut rows = if let Some(d) = sub.get_one::<String>("date") {
        store.appointments_on(parse_date(d)?)?
    } else if let (Some(from), Some(to)) = (
        sub.get_one::<String>("from"),
        sub.get_one::<String>("to"),
    ) {
        store.appointments_between(parse_date(from)?, parse_date(to)?)?
    } else if let Some(c) = client {
        store.appointments_for_client(c)?
    } else if let Some(s) = status {
        let mut rows = store.appointments_with_status(s)?;
        schedule::sort_chronological(&mut rows);
        rows
    } else {
        let mut all = store.all_appointments()?;
        schedule::sort_chronological(&mut all);
        all
    };

    if let Some(c) = client {
        rows.retain(|a| a.client_id == c);
    }
    if let Some(s) = status {
        rows = schedule::by_status(&rows, s);
    }
    Ok(rows)
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let appt = store
        .appointment(id)?
        .ok_or_else(|| EngineError::not_found("Appointment", id))?;
    let linked = store.records_for_appointment(id)?;
    if !maybe_print_json(
        sub.get_flag("json"),
        sub.get_flag("jsonl"),
        &serde_json::json!({ "appointment": appt, "financial_records": linked }),
    )? {
        println!("{}", appointment_table(std::slice::from_ref(&appt)));
        if let Some(notes) = &appt.notes {
            println!("Notes: {}", notes);
        }
        let ccy = crate::config::load(conn)?.currency;
        for r in &linked {
            println!(
                "Linked record #{}: {} on {} ({})",
                r.id,
                fmt_money(&r.amount, &ccy),
                r.date,
                r.description
            );
        }
    }
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let patch = AppointmentPatch {
        r#type: sub.get_one::<String>("type").map(|s| s.trim().to_string()),
        date: sub
            .get_one::<String>("date")
            .map(|s| parse_date(s))
            .transpose()?,
        time: sub
            .get_one::<String>("time")
            .map(|s| parse_time(s))
            .transpose()?,
        duration: sub.get_one::<u32>("duration").copied(),
        location: sub
            .get_one::<String>("location")
            .map(|s| s.parse::<Location>())
            .transpose()?,
        status: None,
        notes: sub.get_one::<String>("notes").map(|s| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }),
    };
    let appt = lifecycle::update(&store, id, &patch)?;
    println!(
        "Updated #{}: {} {} ({} min, {})",
        appt.id,
        appt.date,
        fmt_time(&appt.time),
        appt.duration,
        appt.location
    );
    Ok(())
}

fn status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let raw = sub.get_one::<String>("status").unwrap();
    let appt = lifecycle::set_status_str(&store, id, raw)?;
    println!("Appointment #{} is now {}", appt.id, appt.status.label());
    Ok(())
}

fn execute(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let payment = match trimmed(sub, "amount") {
        Some(raw) => Some(PaymentInput {
            amount: parse_decimal(&raw)?,
            description: trimmed(sub, "description").unwrap_or_default(),
            r#type: sub.get_one::<String>("type").unwrap().parse::<FinancialType>()?,
            category: trimmed(sub, "category"),
        }),
        None => None,
    };
    let outcome = lifecycle::execute(&store, id, payment.as_ref(), today())
        .with_context(|| format!("Executing appointment {} failed", id))?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &outcome)? {
        println!(
            "Appointment #{} {}",
            outcome.appointment.id,
            outcome.appointment.status.label()
        );
        if let Some(r) = &outcome.financial_record {
            let ccy = crate::config::load(conn)?.currency;
            println!(
                "Booked {} #{}: {} ({})",
                r.r#type,
                r.id,
                fmt_money(&r.amount, &ccy),
                r.description
            );
        }
    }
    Ok(())
}

fn remove(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    reconcile::delete_appointment(&store, id)?;
    println!("Removed appointment #{}", id);
    Ok(())
}

pub fn appointment_table(data: &[Appointment]) -> comfy_table::Table {
    let rows = data
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.date.to_string(),
                fmt_time(&a.time),
                a.client_name.clone(),
                a.r#type.clone(),
                a.duration.to_string(),
                a.location.to_string(),
                a.status.label().to_string(),
            ]
        })
        .collect();
    pretty_table(
        &["ID", "Date", "Time", "Client", "Type", "Min", "Location", "Status"],
        rows,
    )
}
