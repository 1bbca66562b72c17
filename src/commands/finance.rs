// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::ledger::{self, DateRange, FilterCriteria, Period, RecordDraft};
use crate::models::{FinancialRecord, FinancialType, RecordPatch};
use crate::store::{FinancialStore, SqliteStore};
use crate::utils::{
    fmt_money, maybe_print_json, parse_date, parse_decimal, parse_id, pretty_table, today, trimmed,
};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        Some(("breakdown", sub)) => breakdown(conn, sub)?,
        Some(("rm", sub)) => {
            let store = SqliteStore::new(conn);
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            store.delete_record(id)?;
            println!("Removed financial record #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let draft = RecordDraft {
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        description: sub.get_one::<String>("description").unwrap().to_string(),
        date: match sub.get_one::<String>("date") {
            Some(d) => parse_date(d)?,
            None => today(),
        },
        r#type: sub.get_one::<String>("type").unwrap().parse::<FinancialType>()?,
        category: trimmed(sub, "category"),
        client_id: trimmed(sub, "client").map(|s| parse_id(&s)).transpose()?,
        appointment_id: trimmed(sub, "appointment").map(|s| parse_id(&s)).transpose()?,
    };
    let rec = ledger::record(&store, draft)?;
    let ccy = crate::config::load(conn)?.currency;
    println!(
        "Recorded {} #{}: {} on {} ({})",
        rec.r#type,
        rec.id,
        fmt_money(&rec.amount, &ccy),
        rec.date,
        rec.description
    );
    Ok(())
}

fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let store = SqliteStore::new(conn);
    let id = parse_id(sub.get_one::<String>("id").unwrap())?;
    let patch = RecordPatch {
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        description: sub.get_one::<String>("description").map(|s| s.trim().to_string()),
        date: sub
            .get_one::<String>("date")
            .map(|s| parse_date(s))
            .transpose()?,
        r#type: sub
            .get_one::<String>("type")
            .map(|s| s.parse::<FinancialType>())
            .transpose()?,
        category: sub.get_one::<String>("category").map(|s| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }),
    };
    let rec = ledger::update_record(&store, id, &patch)?;
    let ccy = crate::config::load(conn)?.currency;
    println!(
        "Updated {} #{}: {} on {} ({})",
        rec.r#type,
        rec.id,
        fmt_money(&rec.amount, &ccy),
        rec.date,
        rec.description
    );
    Ok(())
}

/// Period defaults to `custom` when a range bound is given, else `all`.
pub fn criteria_from(sub: &clap::ArgMatches) -> Result<FilterCriteria> {
    let from = trimmed(sub, "from").map(|s| parse_date(&s)).transpose()?;
    let to = trimmed(sub, "to").map(|s| parse_date(&s)).transpose()?;
    let period = match sub.get_one::<String>("period") {
        Some(p) => p.parse::<Period>()?,
        None if from.is_some() || to.is_some() => Period::Custom,
        None => Period::All,
    };
    Ok(FilterCriteria {
        client_id: trimmed(sub, "client").map(|s| parse_id(&s)).transpose()?,
        category: trimmed(sub, "category"),
        r#type: trimmed(sub, "type")
            .map(|s| s.parse::<FinancialType>())
            .transpose()?,
        period,
        date_range: (from.is_some() || to.is_some()).then_some(DateRange {
            start: from,
            end: to,
        }),
    })
}

/// Filtered records, newest first. A bounded period is pushed down to the
/// store as a range query before the in-memory criteria run.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<FinancialRecord>> {
    let store = SqliteStore::new(conn);
    let criteria = criteria_from(sub)?;
    let now = today();
    let candidates = match ledger::period_bounds(&criteria, now) {
        Some((start, end)) => store.records_between(start, end)?,
        None => store.all_records()?,
    };
    let mut rows = ledger::filter(&candidates, &criteria, now);
    rows.sort_by(|a, b| (b.date, b.id).cmp(&(a.date, a.id)));
    if let Some(limit) = sub.try_get_one::<usize>("limit").ok().flatten() {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.to_string(),
                    r.r#type.to_string(),
                    r.description.clone(),
                    format!("{:.2}", r.amount),
                    r.category.clone().unwrap_or_default(),
                    r.client_id.map(|c| c.to_string()).unwrap_or_default(),
                    r.appointment_id.map(|a| a.to_string()).unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Type", "Description", "Amount", "Category", "Client", "Appt"],
                rows,
            )
        );
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    let s = ledger::summarize(&data)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let ccy = crate::config::load(conn)?.currency;
        println!(
            "{}",
            pretty_table(
                &["Income", "Expenses", "Balance"],
                vec![vec![
                    fmt_money(&s.income, &ccy),
                    fmt_money(&s.expenses, &ccy),
                    fmt_money(&s.balance, &ccy),
                ]],
            )
        );
    }
    Ok(())
}

fn breakdown(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    let by = sub.get_one::<String>("by").unwrap();
    let groups = if by == "month" {
        ledger::by_month(&data)?
    } else {
        ledger::by_category(&data)?
    };
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &groups)? {
        let header = if by == "month" { "Month" } else { "Category" };
        let rows = groups
            .iter()
            .map(|g| {
                vec![
                    g.key.clone(),
                    format!("{:.2}", g.summary.income),
                    format!("{:.2}", g.summary.expenses),
                    format!("{:.2}", g.summary.balance),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&[header, "Income", "Expenses", "Balance"], rows)
        );
    }
    Ok(())
}
